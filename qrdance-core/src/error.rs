/// Error type shared by the core modules
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QrDanceError {
    #[error("Animation catalog is empty")]
    EmptyCatalog,

    #[error("Mixer has {actions} actions but the catalog has {entries} entries")]
    ActionCountMismatch { actions: usize, entries: usize },

    #[error("Animation index {index} is out of range for a catalog of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Decode result has {found} locator points, expected at least 4")]
    TooFewLocatorPoints { found: usize },

    #[error("Invalid overlay size {width}x{height}")]
    InvalidOverlaySize { width: u32, height: u32 },
}

pub type Result<T> = std::result::Result<T, QrDanceError>;
