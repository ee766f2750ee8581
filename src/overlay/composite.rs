use super::types::{CameraFrame, CompositeFrame};
use crate::error::{OverlayError, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Centered square region of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub side: u32,
}

impl CropRect {
    /// True when the rectangle covers the whole `width x height` frame
    pub fn is_identity(&self, width: u32, height: u32) -> bool {
        self.x == 0 && self.y == 0 && self.side == width && self.side == height
    }
}

/// Largest centered square inside a `width x height` frame
pub fn crop_rect(width: u32, height: u32) -> CropRect {
    let side = width.min(height);
    CropRect {
        x: (width - side) / 2,
        y: (height - side) / 2,
        side,
    }
}

/// Draws a tinted mask over a square-cropped camera frame
#[derive(Debug, Clone, Copy)]
pub struct FrameCompositor {
    output_size: u32,
    filter: FilterType,
}

impl FrameCompositor {
    pub fn new(output_size: u32) -> Result<Self> {
        if output_size == 0 {
            return Err(OverlayError::InvalidOutputSize);
        }
        Ok(Self {
            output_size,
            filter: FilterType::Triangle,
        })
    }

    /// Resampling filter used when scaling either layer to the canvas
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    pub fn output_size(&self) -> u32 {
        self.output_size
    }

    /// Composite one frame.
    ///
    /// # Arguments
    /// * `mask` - Straight-alpha RGBA bytes, row-major
    /// * `mask_size` - `(height, width)` of the mask
    /// * `background` - Camera frame, assumed already upright
    ///
    /// The background is center-cropped to a square and stretched to the
    /// canvas. The mask is stretched independently, so a non-square mask is
    /// distorted to fill the square. The mask is then blended source-over.
    pub fn composite(
        &self,
        mask: &[u8],
        mask_size: (u32, u32),
        background: &CameraFrame,
    ) -> Result<CompositeFrame> {
        let _span = tracing::debug_span!("composite").entered();

        let mask_image = mask_image(mask, mask_size)?;
        let background = background.to_rgba()?;

        let (width, height) = background.dimensions();
        let crop = crop_rect(width, height);
        tracing::trace!(?crop, width, height, "square crop");

        let cropped = if crop.is_identity(width, height) {
            background
        } else {
            imageops::crop_imm(&background, crop.x, crop.y, crop.side, crop.side).to_image()
        };

        let mut canvas = self.fit(cropped);
        let overlay = self.fit(mask_image);
        blend_over(&mut canvas, &overlay);

        Ok(canvas)
    }

    fn fit(&self, image: RgbaImage) -> RgbaImage {
        let size = self.output_size;
        if image.dimensions() == (size, size) {
            image
        } else {
            imageops::resize(&image, size, size, self.filter)
        }
    }
}

/// Composite with the default filter
pub fn composite(
    mask: &[u8],
    mask_size: (u32, u32),
    background: &CameraFrame,
    output_size: u32,
) -> Result<CompositeFrame> {
    FrameCompositor::new(output_size)?.composite(mask, mask_size, background)
}

/// Source-over blend of `layer` onto an opaque canvas of the same size.
/// Straight alpha; channels are rounded to nearest.
fn blend_over(canvas: &mut RgbaImage, layer: &RgbaImage) {
    for (dst, src) in canvas.pixels_mut().zip(layer.pixels()) {
        let alpha = src[3] as u32;
        if alpha == 0 {
            continue;
        }
        for (d, s) in dst.0.iter_mut().zip(src.0).take(3) {
            let mixed = s as u32 * alpha + *d as u32 * (255 - alpha);
            *d = ((mixed + 127) / 255) as u8;
        }
        dst[3] = 255;
    }
}

fn mask_image(mask: &[u8], (height, width): (u32, u32)) -> Result<RgbaImage> {
    let invalid = || OverlayError::InvalidMaskBuffer {
        actual: mask.len(),
        height,
        width,
    };

    let expected = (height as usize)
        .checked_mul(width as usize)
        .and_then(|pixels| pixels.checked_mul(4));
    if height == 0 || width == 0 || expected != Some(mask.len()) {
        return Err(invalid());
    }

    RgbaImage::from_raw(width, height, mask.to_vec()).ok_or_else(invalid)
}
