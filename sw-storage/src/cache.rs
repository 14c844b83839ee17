use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// De-duplicates in-flight row handles by id.
///
/// `fetch` either returns the still-live handle from a prior fetch this
/// tick, or builds a fresh one via `build` and remembers it weakly.
#[derive(Debug)]
pub struct RowCache<T> {
    entries: HashMap<u64, Weak<T>>,
}

impl<T> Default for RowCache<T> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<T> RowCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch(&mut self, id: u64, build: impl FnOnce() -> T) -> Rc<T> {
        if let Some(existing) = self.entries.get(&id).and_then(Weak::upgrade) {
            return existing;
        }
        let row = Rc::new(build());
        self.entries.insert(id, Rc::downgrade(&row));
        row
    }

    /// Drop the cached handle for `id`, as happens when the backing row is
    /// removed from the table.
    pub fn evict(&mut self, id: u64) {
        self.entries.remove(&id);
    }

    /// Number of entries whose weak handle is still live.
    pub fn live_count(&self) -> usize {
        self.entries.values().filter(|w| w.strong_count() > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_fetch_returns_the_same_handle() {
        let mut cache = RowCache::new();
        let first = cache.fetch(1, || 42u32);
        let second = cache.fetch(1, || panic!("build should not run twice"));
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn dropping_every_handle_allows_a_fresh_build() {
        let mut cache = RowCache::new();
        {
            let handle = cache.fetch(1, || 42u32);
            assert_eq!(*handle, 42);
        }
        cache.evict(1);
        assert_eq!(cache.live_count(), 0);
        let rebuilt = cache.fetch(1, || 7u32);
        assert_eq!(*rebuilt, 7);
    }
}
