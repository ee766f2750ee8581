mod png_sequence;

pub use png_sequence::PngSequenceSink;

use crate::overlay::CompositeFrame;
use anyhow::Result;

/// Trait for output destinations
pub trait OutputSink {
    /// Present one composited frame
    fn write_frame(&mut self, index: u64, frame: &CompositeFrame) -> Result<()>;

    /// Number of frames presented so far
    fn frames_written(&self) -> u64;
}
