use super::OutputSink;
use crate::overlay::CompositeFrame;
use anyhow::{Context, Result};
use image::imageops;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes composited frames as `frame_NNNNNN.png` into a directory
pub struct PngSequenceSink {
    dir: PathBuf,
    mirror: bool,
    written: u64,
}

impl PngSequenceSink {
    /// Create the sink, making `dir` if needed
    ///
    /// With `mirror` set, frames are flipped horizontally before writing so a
    /// front camera reads like a mirror.
    pub fn new<P: AsRef<Path>>(dir: P, mirror: bool) -> Result<Self> {
        let dir = dir.as_ref();
        tracing::info!(
            "Writing frames to {} (mirror={})",
            dir.display(),
            mirror
        );

        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        Ok(Self {
            dir: dir.to_path_buf(),
            mirror,
            written: 0,
        })
    }

    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{:06}.png", index))
    }
}

impl OutputSink for PngSequenceSink {
    fn write_frame(&mut self, index: u64, frame: &CompositeFrame) -> Result<()> {
        let path = self.frame_path(index);

        let result = if self.mirror {
            imageops::flip_horizontal(frame).save(&path)
        } else {
            frame.save(&path)
        };
        result.with_context(|| format!("Failed to write frame {}", path.display()))?;

        self.written += 1;
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.written
    }
}
