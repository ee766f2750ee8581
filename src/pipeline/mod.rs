mod mailbox;
mod processor;
mod producer;
mod worker;

pub use mailbox::{frame_slot, FramePublisher, FrameSubscriber};
pub use processor::{FrameJob, FrameProcessor, FrameTimings};
pub use producer::{run_producer, ProducerConfig, ProducerStats};
pub use worker::{spawn_worker, WorkerStats};
