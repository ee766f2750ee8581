mod orientation;
mod sequence;

pub use orientation::{DeviceOrientation, VideoOrientation};
pub use sequence::{image_files, ImageSequence};

use crate::overlay::CameraFrame;
use anyhow::Result;

/// Trait for camera capture sources
pub trait CaptureSource {
    /// Capture a single upright frame, or `None` once the stream has ended
    fn capture_frame(&mut self) -> Result<Option<CameraFrame>>;

    /// Orientation applied to every delivered frame
    fn orientation(&self) -> VideoOrientation;
}
