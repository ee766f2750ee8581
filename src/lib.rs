//! Segmentation mask overlay for camera frames.
//!
//! A model's activation tensor is rasterized into a tinted RGBA mask, then
//! composited over a square crop of the camera frame it came from.

pub mod capture;
pub mod error;
pub mod output;
pub mod overlay;
pub mod pipeline;
pub mod segmentation;

pub use error::{OverlayError, Result};
pub use overlay::{
    composite, rasterize, CameraFrame, CompositeFrame, FrameCompositor, MaskBitmap,
    MaskRasterizer, PixelFormat, TintColor,
};
pub use segmentation::ActivationTensor;
