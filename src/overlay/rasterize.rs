use super::types::{MaskBitmap, TintColor};
use crate::error::{OverlayError, Result};
use ndarray::{ArrayViewD, Axis, Ix2};

/// Turns a segmentation activation tensor into a tinted RGBA bitmap
#[derive(Debug, Clone, Copy, Default)]
pub struct MaskRasterizer {
    tint: TintColor,
}

impl MaskRasterizer {
    pub fn new(tint: TintColor) -> Self {
        Self { tint }
    }

    pub fn tint(&self) -> TintColor {
        self.tint
    }

    /// Rasterize a `[channels, height, width]` tensor.
    ///
    /// Only channel 0 is read. Each output pixel is
    /// `[r, g, b, a] = to_u8(val * tint.{r,g,b,a})` in row-major order, with
    /// straight alpha.
    pub fn rasterize(&self, tensor: ArrayViewD<'_, f32>) -> Result<MaskBitmap> {
        let _span = tracing::debug_span!("rasterize").entered();

        let shape = tensor.shape();
        if shape.len() != 3 || shape.iter().any(|&d| d == 0) {
            return Err(OverlayError::InvalidShape(shape.to_vec()));
        }
        let (height, width) = (shape[1], shape[2]);
        let (Ok(h32), Ok(w32)) = (u32::try_from(height), u32::try_from(width)) else {
            return Err(OverlayError::InvalidShape(shape.to_vec()));
        };

        let plane = tensor
            .index_axis(Axis(0), 0)
            .into_dimensionality::<Ix2>()
            .map_err(|_| OverlayError::InvalidShape(shape.to_vec()))?;

        let tint = self.tint.channels();
        let mut data = Vec::with_capacity(height * width * 4);

        // Logical iteration order is row-major regardless of memory layout
        for &val in plane.iter() {
            for channel in tint {
                data.push(to_u8(val * channel));
            }
        }

        Ok(MaskBitmap {
            height: h32,
            width: w32,
            data,
        })
    }
}

/// Rasterize `tensor` with `tint`
pub fn rasterize(tensor: ArrayViewD<'_, f32>, tint: TintColor) -> Result<MaskBitmap> {
    MaskRasterizer::new(tint).rasterize(tensor)
}

/// Round half up, then clamp into `[0, 255]`. NaN maps to 0.
#[inline]
fn to_u8(x: f32) -> u8 {
    if x.is_nan() {
        return 0;
    }
    (x + 0.5).floor().clamp(0.0, 255.0) as u8
}
