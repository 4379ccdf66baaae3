//! Bounded FIFO channel connecting producer contexts to the playback worker.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::consts::QUEUE_CAPACITY;
use crate::request::ToneRequest;

#[cfg(not(feature = "heap-queue"))]
type Slots = heapless::Deque<ToneRequest, QUEUE_CAPACITY>;

#[cfg(feature = "heap-queue")]
type Slots = std::collections::VecDeque<ToneRequest>;

struct Inner {
    slots: Slots,
    closed: bool,
}

impl Inner {
    fn new() -> Self {
        #[cfg(not(feature = "heap-queue"))]
        let slots = Slots::new();
        #[cfg(feature = "heap-queue")]
        let slots = Slots::with_capacity(QUEUE_CAPACITY);

        Self {
            slots,
            closed: false,
        }
    }

    fn is_full(&self) -> bool {
        self.slots.len() >= QUEUE_CAPACITY
    }

    fn push(&mut self, request: ToneRequest) {
        // Callers check is_full() under the same lock first
        #[cfg(not(feature = "heap-queue"))]
        let _ = self.slots.push_back(request);
        #[cfg(feature = "heap-queue")]
        self.slots.push_back(request);
    }
}

/// Bounded FIFO of [`ToneRequest`] values, capacity [`QUEUE_CAPACITY`].
///
/// The queue is the only synchronization point between producers and the
/// single worker. Producers wait a short bounded time for a free slot; the
/// worker blocks without timeout since it has nothing else to do.
pub struct ToneQueue {
    inner: Mutex<Inner>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl ToneQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::new()),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    /// Attempt to enqueue, waiting at most `wait` for a free slot.
    ///
    /// Returns `false` if the queue stayed full past the deadline or has
    /// been closed. A full queue means tones are already backed up, and
    /// dropping the newest request beats stalling the caller.
    pub fn try_send(&self, request: ToneRequest, wait: Duration) -> bool {
        let deadline = Instant::now() + wait;
        let mut inner = self.inner.lock().unwrap();
        while inner.is_full() && !inner.closed {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                return false;
            };
            let (guard, timeout) = self.not_full.wait_timeout(inner, remaining).unwrap();
            inner = guard;
            if timeout.timed_out() && inner.is_full() {
                return false;
            }
        }
        if inner.closed {
            return false;
        }
        inner.push(request);
        self.not_empty.notify_one();
        true
    }

    /// Worker-only. Blocks until a request arrives; `None` once the queue
    /// has been closed.
    pub fn recv(&self) -> Option<ToneRequest> {
        let mut inner = self.inner.lock().unwrap();
        loop {
            if let Some(request) = inner.slots.pop_front() {
                self.not_full.notify_one();
                return Some(request);
            }
            if inner.closed {
                return None;
            }
            inner = self.not_empty.wait(inner).unwrap();
        }
    }

    /// Close the queue: discard pending requests and wake all waiters.
    /// Subsequent sends are rejected.
    pub fn close(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.closed = true;
        inner.slots.clear();
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Number of pending requests.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ToneQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    const WAIT: Duration = Duration::from_millis(10);

    fn request(tag: u32) -> ToneRequest {
        ToneRequest::new(tag, 0, 100, 1, 2048)
    }

    #[test]
    fn fifo_order() {
        let queue = ToneQueue::new();
        assert!(queue.try_send(request(1), WAIT));
        assert!(queue.try_send(request(2), WAIT));
        assert_eq!(queue.recv().unwrap().frequency1, 1);
        assert_eq!(queue.recv().unwrap().frequency1, 2);
    }

    #[test]
    fn rejects_when_full_and_leaves_length_unchanged() {
        let queue = ToneQueue::new();
        for i in 0..QUEUE_CAPACITY as u32 {
            assert!(queue.try_send(request(i + 1), WAIT));
        }
        assert!(!queue.try_send(request(99), Duration::from_millis(5)));
        assert_eq!(queue.len(), QUEUE_CAPACITY);
    }

    #[test]
    fn bounded_wait_succeeds_when_slot_frees() {
        let queue = Arc::new(ToneQueue::new());
        for i in 0..QUEUE_CAPACITY as u32 {
            assert!(queue.try_send(request(i + 1), WAIT));
        }
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                queue.recv()
            })
        };
        assert!(queue.try_send(request(99), Duration::from_millis(500)));
        assert!(consumer.join().unwrap().is_some());
    }

    #[test]
    fn recv_blocks_until_send() {
        let queue = Arc::new(ToneQueue::new());
        let worker = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.recv())
        };
        thread::sleep(Duration::from_millis(20));
        assert!(queue.try_send(request(7), WAIT));
        assert_eq!(worker.join().unwrap().unwrap().frequency1, 7);
    }

    #[test]
    fn close_discards_pending_and_rejects_sends() {
        let queue = ToneQueue::new();
        assert!(queue.try_send(request(1), WAIT));
        queue.close();
        assert_eq!(queue.len(), 0);
        assert!(queue.recv().is_none());
        assert!(!queue.try_send(request(2), WAIT));
    }

    #[test]
    fn close_unblocks_waiting_receiver() {
        let queue = Arc::new(ToneQueue::new());
        let worker = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.recv())
        };
        thread::sleep(Duration::from_millis(20));
        queue.close();
        assert!(worker.join().unwrap().is_none());
    }
}
