//! Integration tests for the particle field.
//!
//! Portraits are synthesised in memory: a transparent canvas with opaque
//! black "ink" pixels at known coordinates.

use std::thread;
use std::time::Duration;

use image::{Rgba, RgbaImage};
use silkfield::{
    AvoidanceRegion, FieldConfig, FrameInputs, LoadStatus, Mount, MotionConfig, ParticleField, PendingLoad,
    Progress, SamplerConfig, ScrollBridge, Vec2, Vec3, PADDING_POSITION,
};

// ============================================================================
// Helpers
// ============================================================================

fn portrait(size: u32, ink: &[(u32, u32)]) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(size, size, Rgba([255, 255, 255, 0]));
    for &(x, y) in ink {
        image.put_pixel(x, y, Rgba([0, 0, 0, 255]));
    }
    image
}

fn disc(size: u32, radius: f32) -> RgbaImage {
    let c = size as f32 / 2.0;
    let ink: Vec<(u32, u32)> = (0..size)
        .flat_map(|y| (0..size).map(move |x| (x, y)))
        .filter(|&(x, y)| {
            let dx = x as f32 - c;
            let dy = y as f32 - c;
            dx * dx + dy * dy < radius * radius
        })
        .collect();
    portrait(size, &ink)
}

fn config() -> FieldConfig {
    FieldConfig::default()
        .with_seed(11)
        .with_sampler(SamplerConfig::default().with_drop_probability(0.0))
}

fn still_config() -> FieldConfig {
    config().with_motion(MotionConfig::still())
}

fn two_state_field(config: &FieldConfig) -> ParticleField {
    ParticleField::from_images(&[disc(48, 16.0), disc(48, 20.0)], config)
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_three_and_five_pixel_portraits() {
    let a = portrait(4, &[(0, 0), (2, 1), (3, 3)]);
    let b = portrait(4, &[(0, 0), (1, 0), (2, 2), (3, 2), (1, 3)]);
    let field = ParticleField::from_images(&[a, b], &config());

    let particles = field.particles();
    assert_eq!(particles.count(), 5);
    assert_eq!(particles.target(0)[3], PADDING_POSITION);
    assert_eq!(particles.target(0)[4], PADDING_POSITION);
    assert_eq!(particles.target_colors(0)[3].w, 0.0);
    assert!(particles.is_padding(0, 4));
    assert!(!particles.is_padding(1, 4));

    // 4px tall image scaled to 160 units: 40 units per pixel, centred.
    let expected = [(-80.0, 80.0), (0.0, 40.0), (40.0, -40.0)];
    for (i, (x, y)) in expected.iter().enumerate() {
        let p = particles.target(0)[i];
        assert!((p.x - x).abs() < 1e-4 && (p.y - y).abs() < 1e-4, "particle {}: {:?}", i, p);
    }
}

#[test]
fn test_buffers_are_index_aligned() {
    let field = two_state_field(&config());
    let p = field.particles();
    let n = p.count();
    assert!(n > 0);
    assert_eq!(p.positions().len(), n);
    assert_eq!(p.colors().len(), n);
    assert_eq!(p.target(0).len(), n);
    assert_eq!(p.target(1).len(), n);
    assert_eq!(p.initial().len(), n);
    assert_eq!(p.morph_offsets().len(), n);
    assert_eq!(p.burst_directions().len(), n);
    assert!(p.morph_offsets().iter().all(|o| (0.0..1.0).contains(o)));
}

#[test]
fn test_blank_portrait_gives_empty_field() {
    let mut field = ParticleField::from_images(&[portrait(16, &[]), portrait(16, &[])], &config());
    assert!(field.is_empty());
    assert!(field.topologies().iter().all(|t| t.is_empty()));
    assert!(field.cilia().emitters().is_empty());

    field.step(&FrameInputs::new(Progress::new(1.0, 0.5, 0.5), 1.0, 0.016).with_pointer(Some(Vec3::ZERO)));
    assert!(field.particles().positions().is_empty());
}

#[test]
fn test_same_seed_same_field() {
    let a = two_state_field(&config());
    let b = two_state_field(&config());
    assert_eq!(a.particles().initial(), b.particles().initial());
    assert_eq!(a.particles().target(1), b.particles().target(1));
    assert_eq!(a.topologies(), b.topologies());
    assert_eq!(a.cilia().emitters(), b.cilia().emitters());
}

#[test]
fn test_topology_edges_within_max_distance() {
    let config = config();
    let field = two_state_field(&config);
    assert!(field.topologies().iter().any(|t| !t.is_empty()));

    for (state, topology) in field.topologies().iter().enumerate() {
        let targets = field.particles().target(state);
        for [a, b] in topology.edges() {
            let d = targets[*a as usize].distance(targets[*b as usize]);
            assert!(d < config.topology.max_distance, "state {} edge {}-{}: {}", state, a, b, d);
            assert!(!field.particles().is_padding(state, *a as usize));
            assert!(!field.particles().is_padding(state, *b as usize));
        }
    }
}

#[test]
fn test_cilia_emitters_are_live() {
    let a = portrait(4, &[(0, 0), (2, 1), (3, 3)]);
    let b = portrait(4, &[(0, 0), (1, 0), (2, 2), (3, 2), (1, 3)]);
    let field = ParticleField::from_images(&[a, b], &config());
    let emitters = field.cilia().emitters();
    assert_eq!(emitters.len(), 3);
    assert!(emitters.iter().all(|&i| i < 3));
}

// ============================================================================
// Progress mapping
// ============================================================================

#[test]
fn test_formation_zero_is_initial() {
    let field = two_state_field(&config());
    let p = field.particles();
    for morph in [0.0, 0.4, 1.0] {
        for i in 0..p.count() {
            assert_eq!(p.formation_position(i, 0.0, morph), p.initial()[i]);
        }
    }
}

#[test]
fn test_formed_unmorphed_is_first_target() {
    let mut field = two_state_field(&still_config());
    field.step(&FrameInputs::new(Progress::formed(), 0.0, 0.016));
    assert_eq!(field.particles().positions(), field.particles().target(0));
}

#[test]
fn test_full_morph_reaches_last_target() {
    let mut field = two_state_field(&still_config());
    for i in 0..field.count() {
        assert_eq!(field.particles().local_morph(i, 1.0).2, 1.0);
    }
    field.step(&FrameInputs::new(Progress::new(1.0, 1.0, 0.0), 0.0, 0.016));
    assert_eq!(field.particles().positions(), field.particles().target(1));
}

#[test]
fn test_burst_adds_direction() {
    let mut field = two_state_field(&still_config());
    field.step(&FrameInputs::new(Progress::new(1.0, 0.3, 1.0), 2.0, 0.016));

    let p = field.particles();
    for i in 0..p.count() {
        let before = p.formation_position(i, 1.0, 0.3);
        let added = p.positions()[i] - before;
        assert!((added - p.burst_directions()[i]).length() < 1e-3, "particle {}", i);
    }
}

#[test]
fn test_burst_ignores_ambient_motion() {
    // default motion has breathing and drift; both vanish at burst == 1
    let mut field = two_state_field(&config());
    field.step(&FrameInputs::new(Progress::new(1.0, 0.0, 1.0), 5.0, 0.25));
    let p = field.particles();
    for i in 0..p.count() {
        let expected = p.target(0)[i] + p.burst_directions()[i];
        assert!((p.positions()[i] - expected).length() < 1e-3, "particle {}", i);
    }
}

#[test]
fn test_scroll_to_end_fades_everything() {
    let config = still_config();
    let mut field = two_state_field(&config);
    let mut bridge = ScrollBridge::new(config.timeline.clone());
    bridge.set_scroll(1.0);

    let mut time = 0.0;
    for _ in 0..300 {
        let (progress, _) = bridge.advance(time, 1.0 / 30.0);
        field.step(&FrameInputs::new(progress, time, 1.0 / 30.0));
        time += 1.0 / 30.0;
    }
    assert!(field.particles().colors().iter().all(|c| c.w < 1e-3));
    assert!(field.silk().vertices().iter().all(|v| v.alpha() < 1e-3));
}

// ============================================================================
// Avoidance
// ============================================================================

#[test]
fn test_avoidance_centre_and_far_away() {
    let region = AvoidanceRegion::new(Vec3::new(5.0, -3.0, 0.0), Vec2::new(20.0, 8.0));
    for index in 0..16 {
        assert!(region.displacement(region.center, index, 40.0).length() > 0.0);
    }
    let far = Vec3::new(500.0, 500.0, 0.0);
    assert_eq!(region.displacement(far, 0, 40.0), Vec3::ZERO);
}

#[test]
fn test_avoidance_is_frame_local() {
    let mut field = two_state_field(&still_config());
    let region = AvoidanceRegion::new(Vec3::ZERO, Vec2::new(15.0, 15.0));

    field.step(&FrameInputs::new(Progress::formed(), 0.0, 0.016).with_avoidance(Some(region)));
    let pushed = field.particles().positions().to_vec();
    assert_ne!(pushed.as_slice(), field.particles().target(0));
    for p in &pushed {
        // nothing left deep inside the zone
        assert!(region.normalized_distance_sq(*p).unwrap() > 0.05);
    }

    field.step(&FrameInputs::new(Progress::formed(), 0.0, 0.016));
    assert_eq!(field.particles().positions(), field.particles().target(0));
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_teardown_discards_late_load() {
    let mount = Mount::new();
    let (gate_tx, gate_rx) = std::sync::mpsc::channel::<()>();
    let mut load = PendingLoad::spawn(mount.liveness(), move || {
        let _ = gate_rx.recv();
        vec![disc(32, 10.0)]
    })
    .unwrap();

    assert!(mount.teardown());
    assert!(!mount.teardown());
    gate_tx.send(()).unwrap();

    let mut status = load.poll();
    for _ in 0..500 {
        if !matches!(status, LoadStatus::Pending) {
            break;
        }
        thread::sleep(Duration::from_millis(2));
        status = load.poll();
    }
    assert!(matches!(status, LoadStatus::Discarded));
    // the discarded portraits are gone for good
    assert!(matches!(load.poll(), LoadStatus::Closed));
    assert!(!mount.is_alive());
}
