use std::{
    collections::{HashSet, VecDeque},
    fmt,
    hash::Hash,
};

use parking_lot::Mutex;

// Identity of a queued item; a second item with the same key is not queued
pub trait QueueKey {
    type Key: Eq + Hash + Clone + fmt::Debug;

    fn queue_key(&self) -> Self::Key;
}

// FIFO of pending work shared between the worker and whoever feeds it.
// The head is only taken out by `complete_front` once its work succeeded;
// `requeue_front` moves a failed head to the back, so it stays queued.
#[derive(Debug)]
pub struct WorkQueue<T: QueueKey> {
    inner: Mutex<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T: QueueKey> {
    order: VecDeque<T>,
    keys: HashSet<T::Key>,
}

impl<T: QueueKey + Clone> WorkQueue<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Pending {
                order: VecDeque::new(),
                keys: HashSet::new(),
            }),
        }
    }

    // false when an item with the same key is already pending
    pub fn push_back(&self, item: T) -> bool {
        let mut inner = self.inner.lock();
        if !inner.keys.insert(item.queue_key()) {
            return false;
        }
        inner.order.push_back(item);
        true
    }

    pub fn front(&self) -> Option<T> {
        self.inner.lock().order.front().cloned()
    }

    pub fn complete_front(&self) -> Option<T> {
        let mut inner = self.inner.lock();
        let item = inner.order.pop_front()?;
        inner.keys.remove(&item.queue_key());
        Some(item)
    }

    pub fn requeue_front(&self) {
        let mut inner = self.inner.lock();
        if let Some(item) = inner.order.pop_front() {
            inner.order.push_back(item);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().order.is_empty()
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.inner.lock().order.iter().cloned().collect()
    }
}

impl<T: QueueKey + Clone> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: QueueKey + Clone> FromIterator<T> for WorkQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let queue = Self::new();
        for item in iter {
            queue.push_back(item);
        }
        queue
    }
}
