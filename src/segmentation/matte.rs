use super::types::{ActivationTensor, SegmentationModel};
use crate::capture::image_files;
use crate::overlay::CameraFrame;
use anyhow::{bail, Context, Result};
use image::GrayImage;
use ndarray::Array3;
use std::path::{Path, PathBuf};

/// Convert a grayscale matte into a `[1, height, width]` activation tensor
///
/// Luma 0 maps to 0.0 and 255 to 1.0.
pub fn tensor_from_luma(matte: &GrayImage) -> ActivationTensor {
    let (width, height) = matte.dimensions();
    Array3::from_shape_fn((1, height as usize, width as usize), |(_, y, x)| {
        matte.get_pixel(x as u32, y as u32)[0] as f32 / 255.0
    })
    .into_dyn()
}

/// Replays precomputed mattes, one per frame, in file name order
///
/// Stands in for live inference: the frame contents are not inspected.
pub struct MatteSequence {
    paths: Vec<PathBuf>,
    next: usize,
}

impl MatteSequence {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let paths = image_files(dir)?;
        if paths.is_empty() {
            bail!("No matte images found in {}", dir.display());
        }

        tracing::info!("Loaded {} mattes from {}", paths.len(), dir.display());

        Ok(Self { paths, next: 0 })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Mattes not yet replayed
    pub fn remaining(&self) -> usize {
        self.paths.len().saturating_sub(self.next)
    }
}

impl SegmentationModel for MatteSequence {
    fn segment(&mut self, _frame: &CameraFrame) -> Result<ActivationTensor> {
        let _span = tracing::debug_span!("matte_segment").entered();

        let Some(path) = self.paths.get(self.next) else {
            bail!("Matte sequence exhausted after {} frames", self.paths.len());
        };
        self.next += 1;

        let matte = image::open(path)
            .with_context(|| format!("Failed to load matte {}", path.display()))?
            .to_luma8();

        Ok(tensor_from_luma(&matte))
    }

    fn skip_frame(&mut self) {
        self.next += 1;
    }

    fn reset_state(&mut self) {
        tracing::info!("Rewinding matte sequence");
        self.next = 0;
    }
}
