//! Mount lifecycle.
//!
//! A [`Mount`] is alive from creation until [`Mount::teardown`]. Anything
//! that outlives a frame (the portrait loader thread, the frame loop itself)
//! holds a [`Liveness`] handle and checks it before touching field state, so
//! work that finishes after teardown is dropped instead of applied.
//!
//! ```ignore
//! let mount = Mount::new();
//! let mut load = PendingLoad::spawn(mount.liveness(), move || load_all(&paths))?;
//!
//! // every frame
//! if let LoadStatus::Ready(images) = load.poll() {
//!     field = Some(ParticleField::from_images(&images, &config));
//! }
//!
//! // on close
//! mount.teardown();
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

/// Read-only view of a mount's liveness flag.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Owner of the liveness flag.
#[derive(Debug)]
pub struct Mount {
    alive: Arc<AtomicBool>,
}

impl Mount {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// A handle that observes this mount's teardown.
    pub fn liveness(&self) -> Liveness {
        Liveness(Arc::clone(&self.alive))
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Mark the mount dead.
    ///
    /// Returns `true` only for the call that performed the teardown; later
    /// calls are no-ops.
    pub fn teardown(&self) -> bool {
        let was_alive = self.alive.swap(false, Ordering::AcqRel);
        if was_alive {
            log::debug!("mount torn down");
        }
        was_alive
    }
}

impl Default for Mount {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of polling a [`PendingLoad`].
#[derive(Debug)]
pub enum LoadStatus<T> {
    /// Still running.
    Pending,
    /// Finished while the mount was alive.
    Ready(T),
    /// Finished after teardown; the value was dropped.
    Discarded,
    /// Already delivered, or the loader thread died.
    Closed,
}

/// Work running on a background thread, delivered by polling.
#[derive(Debug)]
pub struct PendingLoad<T> {
    rx: Receiver<T>,
    liveness: Liveness,
}

impl<T: Send + 'static> PendingLoad<T> {
    /// Run `load` on a new thread.
    pub fn spawn<F>(liveness: Liveness, load: F) -> std::io::Result<Self>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("portrait-loader".into())
            .spawn(move || {
                // the receiver may already be gone after teardown
                let _ = tx.send(load());
            })?;
        Ok(Self { rx, liveness })
    }

    /// Check for a result without blocking.
    ///
    /// A result that arrives after teardown is reported as
    /// [`LoadStatus::Discarded`] and never handed out.
    pub fn poll(&mut self) -> LoadStatus<T> {
        match self.rx.try_recv() {
            Ok(value) => {
                if self.liveness.is_alive() {
                    LoadStatus::Ready(value)
                } else {
                    log::debug!("discarding load that finished after teardown");
                    drop(value);
                    LoadStatus::Discarded
                }
            }
            Err(TryRecvError::Empty) => LoadStatus::Pending,
            Err(TryRecvError::Disconnected) => LoadStatus::Closed,
        }
    }
}
