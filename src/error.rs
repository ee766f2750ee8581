use thiserror::Error;

/// Per-frame failures of the overlay core.
///
/// None of these are fatal: the caller drops the frame and moves on to the
/// next one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OverlayError {
    #[error("invalid activation tensor shape {0:?}: expected [channels, height, width] with non-zero sizes")]
    InvalidShape(Vec<usize>),

    #[error("unreadable background frame: {0}")]
    InvalidBackground(String),

    #[error("mask buffer holds {actual} bytes, which does not match {height}x{width} RGBA")]
    InvalidMaskBuffer {
        actual: usize,
        height: u32,
        width: u32,
    },

    #[error("output size must be at least one pixel")]
    InvalidOutputSize,
}

pub type Result<T> = std::result::Result<T, OverlayError>;
