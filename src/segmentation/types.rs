use crate::overlay::CameraFrame;
use anyhow::Result;
use ndarray::ArrayD;

/// Per-pixel segmentation confidence with shape `[channels, height, width]`.
/// Values are expected in `[0, 1]`; only channel 0 is rendered.
pub type ActivationTensor = ArrayD<f32>;

/// Trait for segmentation models
/// Allows swapping between inference backends or replayed output
pub trait SegmentationModel {
    /// Produce the activation tensor for one frame
    ///
    /// # Returns
    /// * Tensor of shape `[1, height, width]`
    fn segment(&mut self, frame: &CameraFrame) -> Result<ActivationTensor>;

    /// Note that the frame at this position was lost before segmentation,
    /// so models that track position stay aligned with the capture source
    fn skip_frame(&mut self) {}

    /// Reset internal state
    ///
    /// Call this when switching cameras or starting a new session
    fn reset_state(&mut self) {
        // Default implementation: no-op for stateless models
    }
}
