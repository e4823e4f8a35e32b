use std::path::PathBuf;

use thiserror::Error;

use crate::pixels::SurfaceSize;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid value for {name}: {message}")]
    Invalid { name: String, message: String },
}

/// Failures reported by an embedded engine implementation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine's virtual input surface does not exist (yet, or any more).
    #[error("engine input surface is not available")]
    NotReady,

    #[error("engine has no off-screen surface")]
    NoSurface,

    /// The engine has not produced pixels matching the requested size.
    #[error("engine has no {0} frame available")]
    NoFrame(SurfaceSize),

    #[error("engine connection lost: {0}")]
    Disconnected(String),

    #[error("failed to launch engine: {0}")]
    Launch(String),
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("no surface has been registered")]
    NoSurface,

    #[error(
        "surface handle generation {handle} is stale (current generation {current})"
    )]
    StaleHandle { handle: u64, current: u64 },

    #[error("stale transfer: buffer is {buffer} but the surface is {surface}")]
    StaleSize {
        buffer: SurfaceSize,
        surface: SurfaceSize,
    },

    #[error("pixel buffer holds {actual} bytes, the surface needs {expected}")]
    BufferLength { expected: usize, actual: usize },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read shader '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("shader parse failed: {0}")]
    Parse(String),

    #[error("shader validation failed: {0}")]
    Validation(String),

    #[error("render pipeline creation failed: {0}")]
    Pipeline(String),
}

#[derive(Debug, Error)]
pub enum PresentError {
    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error("pixel buffer is {buffer} but the presentation texture is {texture}")]
    SizeMismatch {
        buffer: SurfaceSize,
        texture: SurfaceSize,
    },
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Present(#[from] PresentError),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error("window creation failed: {0}")]
    Window(String),

    #[error("GPU initialization failed: {0}")]
    Gpu(String),

    #[error("event loop failed: {0}")]
    EventLoop(String),
}
