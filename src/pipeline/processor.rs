use crate::error::Result;
use crate::overlay::{CameraFrame, CompositeFrame, FrameCompositor, MaskRasterizer};
use crate::segmentation::ActivationTensor;
use std::time::{Duration, Instant};

/// One unit of work for the frame worker
#[derive(Debug, Clone)]
pub struct FrameJob {
    pub index: u64,
    pub tensor: ActivationTensor,
    pub background: CameraFrame,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FrameTimings {
    pub rasterize: Duration,
    pub composite: Duration,
}

/// Rasterizes a mask and composites it over its camera frame.
///
/// Holds configuration only, so consecutive frames never share state.
#[derive(Debug, Clone, Copy)]
pub struct FrameProcessor {
    rasterizer: MaskRasterizer,
    compositor: FrameCompositor,
}

impl FrameProcessor {
    pub fn new(rasterizer: MaskRasterizer, compositor: FrameCompositor) -> Self {
        Self {
            rasterizer,
            compositor,
        }
    }

    pub fn process(
        &self,
        tensor: &ActivationTensor,
        background: &CameraFrame,
    ) -> Result<CompositeFrame> {
        self.process_timed(tensor, background).map(|(frame, _)| frame)
    }

    pub fn process_timed(
        &self,
        tensor: &ActivationTensor,
        background: &CameraFrame,
    ) -> Result<(CompositeFrame, FrameTimings)> {
        let rasterize_start = Instant::now();
        let mask = self.rasterizer.rasterize(tensor.view())?;
        let rasterize = rasterize_start.elapsed();

        let composite_start = Instant::now();
        let frame = self
            .compositor
            .composite(mask.as_bytes(), mask.size(), background)?;
        let composite = composite_start.elapsed();

        Ok((
            frame,
            FrameTimings {
                rasterize,
                composite,
            },
        ))
    }
}
