use super::mailbox::FramePublisher;
use super::processor::FrameJob;
use crate::capture::CaptureSource;
use crate::segmentation::SegmentationModel;
use anyhow::{bail, Result};
use std::time::{Duration, Instant};

/// A source failing this many frames in a row is treated as dead
const MAX_CONSECUTIVE_FAILURES: u32 = 30;

/// Pacing and length of a capture run
#[derive(Debug, Clone, Copy, Default)]
pub struct ProducerConfig {
    /// Frames per second handed to the worker (0 = unthrottled)
    pub target_fps: u32,
    /// Stop after this many source frames, published or skipped
    pub max_frames: Option<u64>,
}

/// Frame counts reported when the producer finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerStats {
    /// Frames segmented and handed to the worker
    pub published: u64,
    /// Frames lost to capture or segmentation errors
    pub skipped: u64,
}

/// Capture, segment and publish frames until the source runs dry, the frame
/// limit is reached, or the worker stops listening.
///
/// A frame that fails to capture or segment is logged and skipped; its index
/// is not reused, so job indices follow source positions.
pub fn run_producer<C, M>(
    capture: &mut C,
    model: &mut M,
    publisher: FramePublisher<FrameJob>,
    config: ProducerConfig,
) -> Result<ProducerStats>
where
    C: CaptureSource,
    M: SegmentationModel,
{
    let frame_duration = (config.target_fps > 0)
        .then(|| Duration::from_secs_f32(1.0 / config.target_fps as f32));
    let mut stats = ProducerStats::default();
    let mut index = 0u64;
    let mut consecutive_failures = 0u32;
    let mut total_capture_time = Duration::ZERO;
    let mut total_segment_time = Duration::ZERO;

    tracing::info!("Starting capture loop ({:?})", capture.orientation());

    loop {
        if publisher.is_closed() {
            tracing::warn!("Frame worker is gone, stopping capture at frame {}", index);
            break;
        }
        if config.max_frames.is_some_and(|max| index >= max) {
            break;
        }

        let loop_start = Instant::now();
        let frame_index = index;
        index += 1;

        // Capture frame
        let capture_start = Instant::now();
        let background = match capture.capture_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(err) => {
                tracing::warn!("Skipping frame {}: {:#}", frame_index, err);
                model.skip_frame();
                stats.skipped += 1;
                consecutive_failures += 1;
                if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                    bail!("{} consecutive frames failed, giving up", consecutive_failures);
                }
                continue;
            }
        };
        total_capture_time += capture_start.elapsed();

        // Segmentation
        let segment_start = Instant::now();
        let tensor = match model.segment(&background) {
            Ok(tensor) => tensor,
            Err(err) => {
                tracing::warn!("Skipping frame {}: {:#}", frame_index, err);
                stats.skipped += 1;
                consecutive_failures += 1;
                if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                    bail!("{} consecutive frames failed, giving up", consecutive_failures);
                }
                continue;
            }
        };
        total_segment_time += segment_start.elapsed();
        consecutive_failures = 0;

        let job = FrameJob {
            index: frame_index,
            tensor,
            background,
        };
        if publisher.publish(job) {
            tracing::debug!("Worker busy, superseded a pending frame");
        }
        stats.published += 1;

        // Log stats every 30 frames
        if stats.published % 30 == 0 {
            let published = stats.published as f64;
            tracing::info!(
                "Frame {}: capture={:.1}ms, segment={:.1}ms",
                frame_index,
                total_capture_time.as_secs_f64() * 1000.0 / published,
                total_segment_time.as_secs_f64() * 1000.0 / published
            );
        }

        // Frame rate limiting
        if let Some(frame_duration) = frame_duration {
            let elapsed = loop_start.elapsed();
            if elapsed < frame_duration {
                std::thread::sleep(frame_duration - elapsed);
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{ImageSequence, VideoOrientation};
    use crate::pipeline::frame_slot;
    use crate::segmentation::MatteSequence;
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use std::fs;
    use std::path::Path;

    fn write_frames(dir: &Path, count: u8) {
        for i in 0..count {
            RgbImage::from_pixel(2, 2, Rgb([i * 10, 0, 0]))
                .save(dir.join(format!("{i:03}.png")))
                .unwrap();
        }
    }

    fn write_mattes(dir: &Path, levels: &[u8]) {
        for (i, level) in levels.iter().enumerate() {
            GrayImage::from_pixel(2, 2, Luma([*level]))
                .save(dir.join(format!("{i:03}.png")))
                .unwrap();
        }
    }

    fn unthrottled(max_frames: usize) -> ProducerConfig {
        ProducerConfig {
            target_fps: 0,
            max_frames: Some(max_frames as u64),
        }
    }

    #[test]
    fn corrupt_files_skip_only_their_own_frame() {
        let frames = tempfile::tempdir().unwrap();
        let mattes = tempfile::tempdir().unwrap();
        write_frames(frames.path(), 4);
        write_mattes(mattes.path(), &[0, 0, 0, 255]);
        fs::write(frames.path().join("001.png"), b"truncated").unwrap();
        fs::write(mattes.path().join("002.png"), b"truncated").unwrap();

        let mut capture = ImageSequence::open(frames.path(), VideoOrientation::LandscapeRight).unwrap();
        let mut model = MatteSequence::open(mattes.path()).unwrap();
        let (tx, rx) = frame_slot();

        let stats = run_producer(&mut capture, &mut model, tx, unthrottled(4)).unwrap();
        assert_eq!(stats, ProducerStats { published: 2, skipped: 2 });

        // Frame 3 still pairs with matte 3 after the skips
        let job = rx.recv().unwrap();
        assert_eq!(job.index, 3);
        assert_eq!(job.tensor[[0, 0, 0]], 1.0);
        assert_eq!(job.background.to_rgba().unwrap().get_pixel(0, 0)[0], 30);
        assert_eq!(rx.dropped(), 1);
        assert!(rx.recv().is_none());
    }

    #[test]
    fn stops_at_the_frame_limit() {
        let frames = tempfile::tempdir().unwrap();
        let mattes = tempfile::tempdir().unwrap();
        write_frames(frames.path(), 3);
        write_mattes(mattes.path(), &[255]);

        let mut capture = ImageSequence::open(frames.path(), VideoOrientation::LandscapeRight).unwrap();
        let mut model = MatteSequence::open(mattes.path()).unwrap();
        let (tx, rx) = frame_slot();

        let limit = capture.len().min(model.len());
        let stats = run_producer(&mut capture, &mut model, tx, unthrottled(limit)).unwrap();
        assert_eq!(stats, ProducerStats { published: 1, skipped: 0 });
        assert_eq!(rx.recv().unwrap().index, 0);
    }

    #[test]
    fn stops_once_the_subscriber_is_gone() {
        let frames = tempfile::tempdir().unwrap();
        let mattes = tempfile::tempdir().unwrap();
        write_frames(frames.path(), 2);
        write_mattes(mattes.path(), &[0, 0]);

        let mut capture = ImageSequence::open(frames.path(), VideoOrientation::LandscapeRight).unwrap();
        let mut model = MatteSequence::open(mattes.path()).unwrap();
        let (tx, rx) = frame_slot();
        drop(rx);

        let stats = run_producer(&mut capture, &mut model, tx, unthrottled(2)).unwrap();
        assert_eq!(stats, ProducerStats::default());
        assert_eq!(model.remaining(), 2);
    }

    struct BrokenCamera;

    impl CaptureSource for BrokenCamera {
        fn capture_frame(&mut self) -> Result<Option<crate::overlay::CameraFrame>> {
            bail!("device disconnected")
        }

        fn orientation(&self) -> VideoOrientation {
            VideoOrientation::Portrait
        }
    }

    #[test]
    fn dead_source_gives_up() {
        let mattes = tempfile::tempdir().unwrap();
        write_mattes(mattes.path(), &[0]);

        let mut model = MatteSequence::open(mattes.path()).unwrap();
        let (tx, _rx) = frame_slot();
        let config = ProducerConfig {
            target_fps: 0,
            max_frames: None,
        };

        let err = run_producer(&mut BrokenCamera, &mut model, tx, config).unwrap_err();
        assert!(err.to_string().contains("consecutive frames failed"));
    }
}
