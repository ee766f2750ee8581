use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

struct Slot<T> {
    frame: Option<T>,
    publishers: usize,
    subscribed: bool,
    dropped: u64,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        // Slot state stays consistent even if a holder panicked
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Producer half of a single-frame mailbox
pub struct FramePublisher<T> {
    shared: Arc<Shared<T>>,
}

/// Consumer half of a single-frame mailbox
pub struct FrameSubscriber<T> {
    shared: Arc<Shared<T>>,
}

/// Create a mailbox that holds at most one pending frame.
///
/// Publishing while a frame is still pending replaces it, so the consumer
/// always picks up the most recent frame once it is free.
pub fn frame_slot<T>() -> (FramePublisher<T>, FrameSubscriber<T>) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(Slot {
            frame: None,
            publishers: 1,
            subscribed: true,
            dropped: 0,
        }),
        ready: Condvar::new(),
    });

    (
        FramePublisher {
            shared: Arc::clone(&shared),
        },
        FrameSubscriber { shared },
    )
}

impl<T> FramePublisher<T> {
    /// Hand a frame to the consumer. Returns true if a pending frame was
    /// discarded to make room.
    pub fn publish(&self, frame: T) -> bool {
        let mut slot = self.shared.lock();
        let replaced = slot.frame.replace(frame).is_some();
        if replaced {
            slot.dropped += 1;
        }
        drop(slot);

        self.shared.ready.notify_one();
        replaced
    }

    /// True once the subscriber is gone and nothing will read published frames
    pub fn is_closed(&self) -> bool {
        !self.shared.lock().subscribed
    }
}

impl<T> Clone for FramePublisher<T> {
    fn clone(&self) -> Self {
        self.shared.lock().publishers += 1;
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Drop for FramePublisher<T> {
    fn drop(&mut self) {
        self.shared.lock().publishers -= 1;
        self.shared.ready.notify_all();
    }
}

impl<T> FrameSubscriber<T> {
    /// Block until a frame is available.
    ///
    /// Returns `None` once every publisher is gone and nothing is pending.
    pub fn recv(&self) -> Option<T> {
        let mut slot = self.shared.lock();
        loop {
            if let Some(frame) = slot.frame.take() {
                return Some(frame);
            }
            if slot.publishers == 0 {
                return None;
            }
            slot = self
                .shared
                .ready
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Take the pending frame without blocking
    pub fn try_recv(&self) -> Option<T> {
        self.shared.lock().frame.take()
    }

    /// Frames replaced before the consumer reached them
    pub fn dropped(&self) -> u64 {
        self.shared.lock().dropped
    }
}

impl<T> Drop for FrameSubscriber<T> {
    fn drop(&mut self) {
        let mut slot = self.shared.lock();
        slot.subscribed = false;
        slot.frame = None;
    }
}
