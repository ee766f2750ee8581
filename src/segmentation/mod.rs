mod matte;
pub mod types;

pub use matte::{tensor_from_luma, MatteSequence};
pub use types::{ActivationTensor, SegmentationModel};
