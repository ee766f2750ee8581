use crate::error::{OverlayError, Result};
use image::{Rgba, RgbaImage};
use std::str::FromStr;
use thiserror::Error;

/// Final displayed image, always `output_size x output_size`
pub type CompositeFrame = RgbaImage;

/// Per-channel multipliers applied to every mask activation.
///
/// Channels are conceptually in `[0, 255]`; products outside that range are
/// clamped by the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TintColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl TintColor {
    /// Translucent yellow
    pub const DEFAULT: TintColor = TintColor::new(255.0, 255.0, 0.0, 100.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn channels(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for TintColor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseTintError {
    #[error("expected four comma-separated channels (r,g,b,a), got {0}")]
    ChannelCount(usize),
    #[error("invalid channel value {0:?}")]
    Channel(String),
}

impl FromStr for TintColor {
    type Err = ParseTintError;

    /// Parses `r,g,b,a`, e.g. `255,255,0,100`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(ParseTintError::ChannelCount(parts.len()));
        }

        let mut channels = [0.0f32; 4];
        for (slot, part) in channels.iter_mut().zip(&parts) {
            let value: f32 = part
                .parse()
                .map_err(|_| ParseTintError::Channel(part.to_string()))?;
            if !value.is_finite() {
                return Err(ParseTintError::Channel(part.to_string()));
            }
            *slot = value;
        }

        let [r, g, b, a] = channels;
        Ok(Self::new(r, g, b, a))
    }
}

/// Row-major RGBA bytes produced by the rasterizer.
///
/// Alpha is straight (not premultiplied).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskBitmap {
    pub height: u32,
    pub width: u32,
    pub data: Vec<u8>,
}

impl MaskBitmap {
    /// `(height, width)`, the order the compositor expects
    pub fn size(&self) -> (u32, u32) {
        (self.height, self.width)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// RGBA bytes at row `y`, column `x`, or `None` outside the bitmap
    pub fn pixel(&self, y: u32, x: u32) -> Option<[u8; 4]> {
        if y >= self.height || x >= self.width {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        self.data.get(offset..offset + 4)?.try_into().ok()
    }
}

/// Byte layout of a camera frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb8,
    Rgba8,
    /// Camera-native 32-bit BGRA
    Bgra8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 | PixelFormat::Bgra8 => 4,
        }
    }
}

/// One captured camera image. The overlay core only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl CameraFrame {
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format,
            data,
        }
    }

    pub fn from_rgba(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, PixelFormat::Rgba8, image.into_raw())
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Decode into an opaque RGBA image.
    ///
    /// The background is always drawn fully opaque, so any source alpha is
    /// discarded.
    pub fn to_rgba(&self) -> Result<RgbaImage> {
        if self.width == 0 || self.height == 0 {
            return Err(OverlayError::InvalidBackground(format!(
                "empty frame {}x{}",
                self.width, self.height
            )));
        }

        let bpp = self.format.bytes_per_pixel();
        let expected = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|pixels| pixels.checked_mul(bpp))
            .ok_or_else(|| {
                OverlayError::InvalidBackground(format!(
                    "frame size {}x{} overflows",
                    self.width, self.height
                ))
            })?;
        if self.data.len() != expected {
            return Err(OverlayError::InvalidBackground(format!(
                "{:?} frame {}x{} needs {} bytes, buffer has {}",
                self.format,
                self.width,
                self.height,
                expected,
                self.data.len()
            )));
        }

        let image = RgbaImage::from_fn(self.width, self.height, |x, y| {
            let idx = (y as usize * self.width as usize + x as usize) * bpp;
            let px = &self.data[idx..idx + bpp];
            match self.format {
                PixelFormat::Rgb8 | PixelFormat::Rgba8 => Rgba([px[0], px[1], px[2], 255]),
                PixelFormat::Bgra8 => Rgba([px[2], px[1], px[0], 255]),
            }
        });

        Ok(image)
    }
}
