use anyhow::Result;
use mask_overlay::output::OutputSink;
use mask_overlay::pipeline::{frame_slot, spawn_worker, FrameJob, FrameProcessor};
use mask_overlay::{
    ActivationTensor, CameraFrame, CompositeFrame, FrameCompositor, MaskRasterizer, PixelFormat,
    TintColor,
};
use ndarray::{Array3, ArrayD, IxDyn};
use std::sync::{Arc, Mutex};

/// Keeps presented frames in memory
#[derive(Clone, Default)]
struct RecordingSink {
    frames: Arc<Mutex<Vec<(u64, CompositeFrame)>>>,
}

impl OutputSink for RecordingSink {
    fn write_frame(&mut self, index: u64, frame: &CompositeFrame) -> Result<()> {
        self.frames.lock().unwrap().push((index, frame.clone()));
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frames.lock().unwrap().len() as u64
    }
}

fn processor(size: u32) -> FrameProcessor {
    FrameProcessor::new(
        MaskRasterizer::new(TintColor::DEFAULT),
        FrameCompositor::new(size).unwrap(),
    )
}

fn gray_frame(width: u32, height: u32, level: u8) -> CameraFrame {
    let data = [level, level, level, 255].repeat((width * height) as usize);
    CameraFrame::new(width, height, PixelFormat::Bgra8, data)
}

fn uniform_tensor(height: usize, width: usize, value: f32) -> ActivationTensor {
    Array3::from_elem((1, height, width), value).into_dyn()
}

#[test]
fn consecutive_frames_do_not_interfere() {
    // Crops land exactly on the output size, so no resampling is involved
    let processor = processor(16);
    let frame_a = gray_frame(24, 16, 20);
    let frame_b = gray_frame(16, 16, 200);
    let tensor_a = uniform_tensor(8, 8, 0.0);
    let tensor_b = uniform_tensor(8, 8, 1.0);

    let first_a = processor.process(&tensor_a, &frame_a).unwrap();
    let b = processor.process(&tensor_b, &frame_b).unwrap();
    let second_a = processor.process(&tensor_a, &frame_a).unwrap();

    assert_eq!(first_a, second_a);
    assert_ne!(first_a, b);
    assert!(first_a.pixels().all(|p| p.0 == [20, 20, 20, 255]));
}

#[test]
fn failed_frame_does_not_affect_the_next() {
    let processor = processor(8);
    let broken = CameraFrame::new(8, 8, PixelFormat::Rgba8, Vec::new());
    let tensor = uniform_tensor(4, 4, 0.0);

    assert!(processor.process(&tensor, &broken).is_err());
    let ok = processor.process(&tensor, &gray_frame(8, 8, 77)).unwrap();
    assert!(ok.pixels().all(|p| p.0 == [77, 77, 77, 255]));
}

#[test]
fn worker_processes_only_the_latest_pending_frame() {
    let (publisher, subscriber) = frame_slot();
    for index in 0..5 {
        publisher.publish(FrameJob {
            index,
            tensor: uniform_tensor(4, 4, 0.0),
            background: gray_frame(8, 8, index as u8),
        });
    }
    drop(publisher);

    let sink = RecordingSink::default();
    let worker = spawn_worker(processor(8), subscriber, sink.clone()).unwrap();
    let stats = worker.join().unwrap().unwrap();

    assert_eq!(stats.processed, 1);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.dropped, 4);

    let frames = sink.frames.lock().unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].0, 4);
    assert_eq!(frames[0].1.get_pixel(0, 0).0, [4, 4, 4, 255]);
}

#[test]
fn worker_skips_invalid_frames_and_keeps_going() {
    let (publisher, subscriber) = frame_slot();
    let sink = RecordingSink::default();
    let worker = spawn_worker(processor(8), subscriber, sink.clone()).unwrap();

    // Either rejected by the worker or superseded by the next frame
    publisher.publish(FrameJob {
        index: 0,
        tensor: ArrayD::zeros(IxDyn(&[4, 4])),
        background: gray_frame(8, 8, 1),
    });
    publisher.publish(FrameJob {
        index: 1,
        tensor: uniform_tensor(4, 4, 0.0),
        background: gray_frame(8, 8, 2),
    });
    drop(publisher);

    let stats = worker.join().unwrap().unwrap();
    assert_eq!(stats.processed, 1);
    assert_eq!(stats.failed + stats.dropped, 1);

    let frames = sink.frames.lock().unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].0, 1);
    assert_eq!(frames[0].1.get_pixel(3, 3).0, [2, 2, 2, 255]);
}
