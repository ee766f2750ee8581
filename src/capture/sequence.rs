use super::{CaptureSource, VideoOrientation};
use crate::overlay::CameraFrame;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Image files directly inside `dir`, sorted by file name
pub fn image_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list {}", dir.display()))?
            .path();
        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if path.is_file() && is_image {
            paths.push(path);
        }
    }

    paths.sort();
    Ok(paths)
}

/// Camera stand-in that delivers frames from a directory of still images
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    next: usize,
    orientation: VideoOrientation,
}

impl ImageSequence {
    pub fn open<P: AsRef<Path>>(dir: P, orientation: VideoOrientation) -> Result<Self> {
        let dir = dir.as_ref();
        tracing::info!(
            "Opening frame sequence {} ({:?})",
            dir.display(),
            orientation
        );

        let paths = image_files(dir)?;
        tracing::info!("Found {} frames", paths.len());

        Ok(Self {
            paths,
            next: 0,
            orientation,
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl CaptureSource for ImageSequence {
    fn capture_frame(&mut self) -> Result<Option<CameraFrame>> {
        let Some(path) = self.paths.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;

        let decoded = image::open(path)
            .with_context(|| format!("Failed to decode frame {}", path.display()))?
            .to_rgba8();

        let upright = self.orientation.upright(decoded);
        Ok(Some(CameraFrame::from_rgba(upright)))
    }

    fn orientation(&self) -> VideoOrientation {
        self.orientation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn lists_only_images_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::new(1, 1).save(dir.path().join("b.png")).unwrap();
        RgbImage::new(1, 1).save(dir.path().join("a.PNG")).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let names: Vec<String> = image_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PNG", "b.png"]);
    }

    #[test]
    fn delivers_upright_frames_until_exhausted() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(4, 2, Rgb([9, 8, 7]))
            .save(dir.path().join("000.png"))
            .unwrap();

        let mut source = ImageSequence::open(dir.path(), VideoOrientation::Portrait).unwrap();
        assert_eq!(source.len(), 1);

        let frame = source.capture_frame().unwrap().unwrap();
        assert_eq!(frame.dimensions(), (2, 4));
        assert_eq!(&frame.data[..4], &[9, 8, 7, 255]);

        assert!(source.capture_frame().unwrap().is_none());
    }
}
