use super::chunker::Chunk;
use crate::error::{PipelineError, Result};
use crossbeam::channel::{
    Receiver, RecvTimeoutError, SendTimeoutError, Sender, bounded,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// How long a blocked `put` waits before re-checking that consumers remain
const PUT_RECHECK_INTERVAL: Duration = Duration::from_millis(50);

/// Entry carried by the task queue
#[derive(Debug)]
pub enum QueueItem {
    Work(Chunk),
    /// Poison pill: tells exactly one consumer to stop
    Stop,
}

/// Snapshot of queue counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub tasks_added: usize,
    pub tasks_taken: usize,
    pub pills_sent: usize,
    pub current_size: usize,
}

/// Bounded multi-producer multi-consumer FIFO of chunks and stop markers.
///
/// The queue owns both ends of a crossbeam channel so neither side ever
/// observes a disconnect while the queue is alive. Consumers register through
/// [`TaskQueue::register_consumer`]; once every registered consumer has gone,
/// a producer blocked on a full queue gets [`PipelineError::NoConsumers`]
/// instead of waiting forever.
pub struct TaskQueue {
    tx: Sender<QueueItem>,
    rx: Receiver<QueueItem>,
    capacity: usize,
    consumers: AtomicUsize,
    tasks_added: AtomicUsize,
    tasks_taken: AtomicUsize,
    pills_sent: AtomicUsize,
}

impl TaskQueue {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(PipelineError::InvalidArgument(
                "queue capacity must be at least 1".to_string(),
            ));
        }

        let (tx, rx) = bounded(capacity);
        Ok(Self {
            tx,
            rx,
            capacity,
            consumers: AtomicUsize::new(0),
            tasks_added: AtomicUsize::new(0),
            tasks_taken: AtomicUsize::new(0),
            pills_sent: AtomicUsize::new(0),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Register a consumer. The registration ends when the handle is dropped.
    pub fn register_consumer(&self) -> ConsumerHandle<'_> {
        self.consumers.fetch_add(1, Ordering::SeqCst);
        ConsumerHandle { queue: self }
    }

    pub fn consumer_count(&self) -> usize {
        self.consumers.load(Ordering::SeqCst)
    }

    /// Enqueue an item, blocking while the queue is full.
    pub fn put(&self, item: QueueItem) -> Result<()> {
        let is_work = matches!(item, QueueItem::Work(_));
        let mut pending = item;

        loop {
            match self.tx.send_timeout(pending, PUT_RECHECK_INTERVAL) {
                Ok(()) => break,
                Err(SendTimeoutError::Timeout(item)) => {
                    if self.consumer_count() == 0 {
                        let chunk_id = match &item {
                            QueueItem::Work(chunk) => Some(chunk.id),
                            QueueItem::Stop => None,
                        };
                        return Err(PipelineError::NoConsumers { chunk_id });
                    }
                    pending = item;
                }
                Err(SendTimeoutError::Disconnected(_)) => {
                    return Err(PipelineError::QueueDisconnected);
                }
            }
        }

        if is_work {
            self.tasks_added.fetch_add(1, Ordering::Relaxed);
        } else {
            self.pills_sent.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    /// Enqueue every chunk in order. Returns the number of chunks enqueued.
    pub fn put_many(&self, chunks: Vec<Chunk>) -> Result<usize> {
        let count = chunks.len();
        for chunk in chunks {
            self.put(QueueItem::Work(chunk))?;
        }
        tracing::debug!("Added {} tasks to queue", count);
        Ok(count)
    }

    /// Enqueue `count` stop markers.
    ///
    /// Call only after the last chunk was enqueued; FIFO order then guarantees
    /// the markers are drained after all real work.
    pub fn send_poison_pills(&self, count: usize) -> Result<()> {
        for _ in 0..count {
            self.put(QueueItem::Stop)?;
        }
        tracing::debug!("Sent {} poison pills", count);
        Ok(())
    }

    /// Dequeue the next item, waiting at most `timeout`.
    pub fn get(&self, timeout: Duration) -> Result<QueueItem> {
        match self.rx.recv_timeout(timeout) {
            Ok(item) => {
                if matches!(item, QueueItem::Work(_)) {
                    self.tasks_taken.fetch_add(1, Ordering::Relaxed);
                }
                Ok(item)
            }
            Err(RecvTimeoutError::Timeout) => Err(PipelineError::QueueTimeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(PipelineError::QueueDisconnected),
        }
    }

    /// Approximate number of queued items
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            tasks_added: self.tasks_added.load(Ordering::Relaxed),
            tasks_taken: self.tasks_taken.load(Ordering::Relaxed),
            pills_sent: self.pills_sent.load(Ordering::Relaxed),
            current_size: self.len(),
        }
    }
}

/// Registration of one consumer; dropping it (also during unwinding)
/// deregisters the consumer.
pub struct ConsumerHandle<'a> {
    queue: &'a TaskQueue,
}

impl ConsumerHandle<'_> {
    pub fn queue(&self) -> &TaskQueue {
        self.queue
    }
}

impl Drop for ConsumerHandle<'_> {
    fn drop(&mut self) {
        self.queue.consumers.fetch_sub(1, Ordering::SeqCst);
    }
}
