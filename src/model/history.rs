use super::color::Color;

/// Maximum number of colors the history retains.
pub const HISTORY_CAPACITY: usize = 8;

/// Observer invoked with the full snapshot after every history mutation.
/// The conversation view uses this to refresh its swatch strip.
pub type HistoryObserver = Box<dyn Fn(&[Color]) + Send>;

/// Bounded, insertion-ordered record of recently used colors, most-recent
/// first. No two entries share a canonical hex form; external indexing is
/// 1-based (1 = newest).
#[derive(Default)]
pub struct ColorHistory {
    entries: Vec<Color>,
    observers: Vec<HistoryObserver>,
}

impl ColorHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a color: any existing entry with the same hex is removed, the
    /// color is prepended, and the list is truncated to capacity.
    pub fn add(&mut self, color: Color) {
        let hex = color.hex();
        self.entries.retain(|c| c.hex() != hex);
        self.entries.insert(0, color);
        self.entries.truncate(HISTORY_CAPACITY);
        self.notify();
    }

    /// Fetch by 1-based index (1 = newest).
    pub fn get(&self, index: usize) -> Option<Color> {
        index
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.notify();
    }

    pub fn snapshot(&self) -> Vec<Color> {
        self.entries.clone()
    }

    /// Register an observer; it fires after every subsequent mutation.
    pub fn subscribe(&mut self, observer: HistoryObserver) {
        self.observers.push(observer);
    }

    fn notify(&self) {
        for observer in &self.observers {
            observer(&self.entries);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn newest_entry_is_first() {
        let mut history = ColorHistory::new();
        history.add(Color::from_u8(0xFF, 0, 0));
        history.add(Color::from_u8(0, 0, 0xFF));
        assert_eq!(history.get(1).unwrap().hex(), "#0000FF");
        assert_eq!(history.get(2).unwrap().hex(), "#FF0000");
    }

    #[test]
    fn duplicate_add_moves_to_front_without_growing() {
        let mut history = ColorHistory::new();
        history.add(Color::from_u8(0xFF, 0, 0));
        history.add(Color::from_u8(0, 0, 0xFF));
        history.add(Color::from_u8(0xFF, 0, 0));
        assert_eq!(history.len(), 2);
        assert_eq!(history.get(1).unwrap().hex(), "#FF0000");
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut history = ColorHistory::new();
        for i in 0..=HISTORY_CAPACITY {
            history.add(Color::from_u8(i as u8, 0, 0));
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        // the very first add (#000000) was evicted
        assert!(history.snapshot().iter().all(|c| c.hex() != "#000000"));
    }

    #[test]
    fn entries_stay_pairwise_distinct_under_churn() {
        let mut history = ColorHistory::new();
        for i in 0..40u8 {
            history.add(Color::from_u8(i % 12, 0, 0));
        }
        let hexes: Vec<String> = history.snapshot().iter().map(Color::hex).collect();
        let mut deduped = hexes.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(hexes.len(), deduped.len());
        assert!(history.len() <= HISTORY_CAPACITY);
    }

    #[test]
    fn one_based_indexing_bounds() {
        let mut history = ColorHistory::new();
        history.add(Color::from_u8(1, 2, 3));
        assert!(history.get(0).is_none());
        assert!(history.get(2).is_none());
        assert!(history.get(1).is_some());
    }

    #[test]
    fn observers_fire_on_add_and_clear() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let mut history = ColorHistory::new();
        history.subscribe(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        history.add(Color::from_u8(0xFF, 0, 0));
        history.clear();
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
