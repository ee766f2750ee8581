use super::mailbox::FrameSubscriber;
use super::processor::{FrameJob, FrameProcessor};
use crate::output::OutputSink;
use anyhow::{Context, Result};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Frame counts reported when the worker finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Frames composited and handed to the sink
    pub processed: u64,
    /// Frames rejected by the overlay core
    pub failed: u64,
    /// Frames superseded before the worker reached them
    pub dropped: u64,
}

/// Run the frame processor on a dedicated thread.
///
/// The worker drains `frames` until every publisher is gone. A frame the
/// overlay core rejects is logged and skipped; a sink failure stops the
/// worker.
pub fn spawn_worker<S>(
    processor: FrameProcessor,
    frames: FrameSubscriber<FrameJob>,
    mut sink: S,
) -> Result<JoinHandle<Result<WorkerStats>>>
where
    S: OutputSink + Send + 'static,
{
    thread::Builder::new()
        .name("frame-worker".into())
        .spawn(move || run_worker(&processor, &frames, &mut sink))
        .context("Failed to spawn frame worker")
}

fn run_worker<S: OutputSink>(
    processor: &FrameProcessor,
    frames: &FrameSubscriber<FrameJob>,
    sink: &mut S,
) -> Result<WorkerStats> {
    let mut stats = WorkerStats::default();
    let mut total_rasterize_time = Duration::ZERO;
    let mut total_composite_time = Duration::ZERO;

    tracing::info!("Frame worker started");

    while let Some(job) = frames.recv() {
        let (frame, timings) = match processor.process_timed(&job.tensor, &job.background) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!("Dropping frame {}: {}", job.index, err);
                stats.failed += 1;
                continue;
            }
        };

        sink.write_frame(job.index, &frame)
            .with_context(|| format!("Failed to present frame {}", job.index))?;

        stats.processed += 1;
        total_rasterize_time += timings.rasterize;
        total_composite_time += timings.composite;

        // Log stats every 30 frames
        if stats.processed % 30 == 0 {
            let n = stats.processed as f64;
            let avg_rasterize_ms = total_rasterize_time.as_secs_f64() * 1000.0 / n;
            let avg_composite_ms = total_composite_time.as_secs_f64() * 1000.0 / n;
            tracing::info!(
                "Frame {}: rasterize={:.2}ms, composite={:.2}ms, dropped={}, failed={}",
                job.index,
                avg_rasterize_ms,
                avg_composite_ms,
                frames.dropped(),
                stats.failed
            );
        }
    }

    stats.dropped = frames.dropped();
    tracing::info!(
        "Frame worker finished: processed={}, failed={}, dropped={}",
        stats.processed,
        stats.failed,
        stats.dropped
    );

    Ok(stats)
}
