//! Error types for silkfield.
//!
//! Portrait loading, configuration parsing, GPU initialization and the
//! windowed runner each have their own error enum. None of these are fatal
//! to the runner: a field that fails to load simply never appears.

use std::fmt;

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur while loading a portrait image.
#[derive(Debug)]
pub enum SampleError {
    /// Failed to decode the image.
    ImageLoad(image::ImageError),
    /// Failed to read the file from disk.
    Io(std::io::Error),
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleError::ImageLoad(e) => write!(f, "Failed to decode portrait: {}", e),
            SampleError::Io(e) => write!(f, "Failed to read portrait file: {}", e),
        }
    }
}

impl std::error::Error for SampleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SampleError::ImageLoad(e) => Some(e),
            SampleError::Io(e) => Some(e),
        }
    }
}

impl From<image::ImageError> for SampleError {
    fn from(e: image::ImageError) -> Self {
        SampleError::ImageLoad(e)
    }
}

impl From<std::io::Error> for SampleError {
    fn from(e: std::io::Error) -> Self {
        SampleError::Io(e)
    }
}

/// Errors that can occur when loading a [`FieldConfig`](crate::FieldConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    Io(std::io::Error),
    /// The config file is not valid JSON for this schema.
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read config: {}", e),
            ConfigError::Parse(e) => write!(f, "Invalid config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Errors that can occur when running the windowed field.
#[derive(Debug)]
pub enum FieldError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// Configuration could not be loaded.
    Config(ConfigError),
    /// No portrait path provided.
    NoPortrait,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            FieldError::Window(e) => write!(f, "Failed to create window: {}", e),
            FieldError::Gpu(e) => write!(f, "GPU error: {}", e),
            FieldError::Config(e) => write!(f, "Config error: {}", e),
            FieldError::NoPortrait => write!(f, "No portrait provided. Use .with_portrait() to add one."),
        }
    }
}

impl std::error::Error for FieldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FieldError::EventLoop(e) => Some(e),
            FieldError::Window(e) => Some(e),
            FieldError::Gpu(e) => Some(e),
            FieldError::Config(e) => Some(e),
            FieldError::NoPortrait => None,
        }
    }
}

impl From<winit::error::EventLoopError> for FieldError {
    fn from(e: winit::error::EventLoopError) -> Self {
        FieldError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for FieldError {
    fn from(e: winit::error::OsError) -> Self {
        FieldError::Window(e)
    }
}

impl From<GpuError> for FieldError {
    fn from(e: GpuError) -> Self {
        FieldError::Gpu(e)
    }
}

impl From<ConfigError> for FieldError {
    fn from(e: ConfigError) -> Self {
        FieldError::Config(e)
    }
}
