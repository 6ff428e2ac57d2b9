//! Bounded, newest-first history buffers for alerts and incidents.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A fixed-capacity buffer that keeps the most recent `cap` items,
/// newest first. Pushing beyond capacity silently drops the oldest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundedHistory<T> {
    cap:   usize,
    items: VecDeque<T>,
}

impl<T> BoundedHistory<T> {
    /// `cap` must be at least 1; config validation enforces this before
    /// any buffer is built.
    pub fn new(cap: usize) -> Self {
        assert!(cap > 0, "history capacity must be > 0");
        Self {
            cap,
            items: VecDeque::with_capacity(cap),
        }
    }

    /// Insert the newest item at the front, evicting the oldest if full.
    pub fn push(&mut self, item: T) {
        if self.items.len() == self.cap {
            self.items.pop_back();
        }
        self.items.push_front(item);
    }

    /// Newest-first iteration.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// The most recent item, if any.
    pub fn latest(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Newest-first snapshot of the contents.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_newest_first() {
        let mut h = BoundedHistory::new(3);
        h.push(1);
        h.push(2);
        h.push(3);
        assert_eq!(h.to_vec(), vec![3, 2, 1]);
        assert_eq!(h.latest(), Some(&3));
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let mut h = BoundedHistory::new(3);
        for n in 1..=5 {
            h.push(n);
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.to_vec(), vec![5, 4, 3]);
    }

    #[test]
    fn capacity_one_holds_only_latest() {
        let mut h = BoundedHistory::new(1);
        h.push("a");
        h.push("b");
        assert_eq!(h.to_vec(), vec!["b"]);
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn zero_capacity_panics() {
        let _ = BoundedHistory::<u8>::new(0);
    }
}
