mod composite;
mod rasterize;
pub mod types;

pub use composite::{composite, crop_rect, CropRect, FrameCompositor};
pub use rasterize::{rasterize, MaskRasterizer};
pub use types::{CameraFrame, CompositeFrame, MaskBitmap, PixelFormat, TintColor};
