use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::imageops::FilterType;
use mask_overlay::capture::{DeviceOrientation, ImageSequence, VideoOrientation};
use mask_overlay::output::PngSequenceSink;
use mask_overlay::pipeline::{frame_slot, run_producer, spawn_worker, FrameProcessor, ProducerConfig};
use mask_overlay::segmentation::{tensor_from_luma, MatteSequence};
use mask_overlay::{CameraFrame, FrameCompositor, MaskRasterizer, TintColor};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite a single matte over a single background image
    Composite {
        /// Background (camera) image
        #[arg(long)]
        background: PathBuf,

        /// Grayscale matte, 0 = background, 255 = foreground
        #[arg(long)]
        matte: PathBuf,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        overlay: OverlayArgs,
    },

    /// Replay a directory of frames and mattes through the frame worker
    Replay {
        /// Directory of camera frames, processed in file name order
        #[arg(long)]
        frames: PathBuf,

        /// Directory of mattes, one per frame, in file name order
        #[arg(long)]
        mattes: PathBuf,

        /// Output directory for composited frames
        #[arg(short, long)]
        output: PathBuf,

        /// Frames per second delivered to the worker (0 = unthrottled)
        #[arg(long, default_value_t = 30)]
        fps: u32,

        /// Device orientation the frames were captured in
        #[arg(long, value_enum, default_value_t = DeviceOrientation::LandscapeLeft)]
        orientation: DeviceOrientation,

        /// Flip output horizontally, as a front camera preview does
        #[arg(long)]
        mirror: bool,

        #[command(flatten)]
        overlay: OverlayArgs,
    },
}

#[derive(Args, Debug)]
struct OverlayArgs {
    /// Side length of the square output image
    #[arg(long, default_value_t = 224)]
    size: u32,

    /// Mask tint as r,g,b,a multipliers
    #[arg(long, default_value = "255,255,0,100")]
    tint: TintColor,

    /// Resampling filter used when scaling to the output size
    #[arg(long, value_enum, default_value_t = Filter::Triangle)]
    filter: Filter,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Filter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<Filter> for FilterType {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::Nearest => FilterType::Nearest,
            Filter::Triangle => FilterType::Triangle,
            Filter::CatmullRom => FilterType::CatmullRom,
            Filter::Gaussian => FilterType::Gaussian,
            Filter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl OverlayArgs {
    fn processor(&self) -> Result<FrameProcessor> {
        let compositor = FrameCompositor::new(self.size)
            .context("Invalid output size")?
            .with_filter(self.filter.into());
        let rasterizer = MaskRasterizer::new(self.tint);

        let size = compositor.output_size();
        tracing::debug!("Output: {}x{}", size, size);
        tracing::debug!("Tint: {:?}", rasterizer.tint());

        Ok(FrameProcessor::new(rasterizer, compositor))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    match cli.command {
        Command::Composite {
            background,
            matte,
            output,
            overlay,
        } => run_composite(&background, &matte, &output, &overlay),
        Command::Replay {
            frames,
            mattes,
            output,
            fps,
            orientation,
            mirror,
            overlay,
        } => {
            let orientation = VideoOrientation::from_device(orientation);
            let mut capture = ImageSequence::open(&frames, orientation)
                .context("Failed to open frame sequence")?;
            let mut model =
                MatteSequence::open(&mattes).context("Failed to open matte sequence")?;
            let sink = PngSequenceSink::new(&output, mirror)
                .context("Failed to initialize output")?;

            if capture.len() != model.len() {
                tracing::warn!(
                    "{} frames but {} mattes; stopping at the shorter",
                    capture.len(),
                    model.len()
                );
            }

            tracing::info!("Target FPS: {}", fps);

            let (publisher, subscriber) = frame_slot();
            let worker = spawn_worker(overlay.processor()?, subscriber, sink)?;

            let config = ProducerConfig {
                target_fps: fps,
                max_frames: Some(capture.len().min(model.len()) as u64),
            };
            let produced = run_producer(&mut capture, &mut model, publisher, config);

            // A sink failure closes the mailbox early; report it ahead of producer errors
            let stats = worker
                .join()
                .map_err(|_| anyhow!("Frame worker panicked"))??;
            let produced = produced?;
            tracing::info!(
                "Replayed {} frames ({} skipped): {} written, {} failed, {} superseded",
                produced.published,
                produced.skipped,
                stats.processed,
                stats.failed,
                stats.dropped
            );
            Ok(())
        }
    }
}

fn run_composite(
    background: &Path,
    matte: &Path,
    output: &Path,
    overlay: &OverlayArgs,
) -> Result<()> {
    let frame = image::open(background)
        .with_context(|| format!("Failed to load background {}", background.display()))?
        .to_rgba8();
    let matte = image::open(matte)
        .with_context(|| format!("Failed to load matte {}", matte.display()))?
        .to_luma8();

    let tensor = tensor_from_luma(&matte);
    let composited = overlay
        .processor()?
        .process(&tensor, &CameraFrame::from_rgba(frame))
        .context("Failed to composite frame")?;

    composited
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!("Wrote {}", output.display());

    Ok(())
}
