//! Error types for particle-field.
//!
//! This module provides error types for GPU initialization, font loading,
//! configuration validation, and running the render loop.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("Failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    /// Failed to create GPU device.
    #[error("Failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface reports no usable texture format.
    #[error("Surface has no supported texture format for this adapter")]
    NoSurfaceFormat,
}

/// Errors that can occur while loading the font used for text shapes.
#[derive(Debug, Error)]
pub enum FontError {
    /// Failed to read the font file from disk.
    #[error("Failed to read font file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file was read but is not a usable TrueType/OpenType font.
    #[error("{0} is not a valid TrueType/OpenType font")]
    Invalid(PathBuf),
    /// No font path was given and none of the known system fonts exist.
    #[error("No font found. Pass --font <path> or set PARTICLE_FIELD_FONT.")]
    NotFound,
}

/// Invalid simulation configuration, rejected at construction time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The particle store cannot be empty.
    #[error("Particle count must be greater than zero")]
    ZeroParticles,
    /// The particle buffers would not fit in the address space.
    #[error("Particle count {0} is too large")]
    TooManyParticles(usize),
    /// A palette needs at least one color.
    #[error("Palette must contain at least one color")]
    EmptyPalette,
    /// Phrase keys are single alphanumeric characters.
    #[error("Phrase key {0:?} must be a single alphanumeric character")]
    InvalidKey(String),
    /// Two phrase keys collide once case is ignored.
    #[error("Phrase key {0:?} is mapped more than once")]
    DuplicateKey(char),
    /// A mapped phrase would produce no shape at all.
    #[error("Phrase for key {0:?} is empty")]
    EmptyPhrase(char),
}

/// Errors that can occur when running a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Failed to create event loop.
    #[error("Failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// The text rasterizer could not be created.
    #[error("Font error: {0}")]
    Font(#[from] FontError),
    /// Invalid builder configuration.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// Failed to write a debug mask image.
    #[error("Failed to export shape mask: {0}")]
    MaskExport(#[from] image::ImageError),
    /// The GPU ran out of memory while presenting a frame.
    #[error("Surface ran out of memory")]
    OutOfMemory,
}
