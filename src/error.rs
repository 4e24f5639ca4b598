use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while bringing the engine up or running a frame.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("window error: {0}")]
    Window(String),

    #[error("failed to load mesh '{}': {source}", path.display())]
    MeshLoad {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("mesh '{0}' not found in any resource location")]
    MeshNotFound(String),

    #[error("failed to set up logging: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("invalid command line: {0}")]
    Cli(String),

    #[error("no viewport has been added to the render target")]
    NoViewport,

    #[error("camera '{0}' is not attached to a scene node")]
    CameraDetached(String),
}

impl From<minifb::Error> for EngineError {
    fn from(e: minifb::Error) -> Self {
        EngineError::Window(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
