//! Shared component memo.
//!
//! Keyed by `(ProviderKey, Fingerprint)`: an indicator configuration applied
//! to one exact bar sequence. Every strategy of that indicator on that ticker
//! reads the same `Arc<Components>`, so the components are computed once per
//! run rather than once per task.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use sigbench_core::components::Components;
use sigbench_core::fingerprint::{Fingerprint, ProviderKey};

#[derive(Debug, Default)]
pub struct SignalMemo {
    entries: DashMap<(ProviderKey, Fingerprint), Arc<Components>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl SignalMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached components, or `compute` them and cache the result.
    ///
    /// `compute` runs outside any shard lock. Two tasks racing on the same key
    /// may both compute; the first insert wins and both get that value.
    pub fn get_or_compute<F>(&self, key: &ProviderKey, fingerprint: &Fingerprint, compute: F) -> Arc<Components>
    where
        F: FnOnce() -> Components,
    {
        let memo_key = (key.clone(), fingerprint.clone());
        if let Some(hit) = self.entries.get(&memo_key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(provider = %key, "memo hit");
            return Arc::clone(hit.value());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(provider = %key, "memo miss");
        let computed = Arc::new(compute());
        Arc::clone(self.entries.entry(memo_key).or_insert(computed).value())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn key(name: &str) -> ProviderKey {
        ProviderKey::new(name, &BTreeMap::new())
    }

    fn fp(tag: &str) -> Fingerprint {
        Fingerprint(tag.to_string())
    }

    #[test]
    fn second_lookup_hits() {
        let memo = SignalMemo::new();
        let mut calls = 0;
        let a = memo.get_or_compute(&key("RSI"), &fp("x"), || {
            calls += 1;
            Components::new(3)
        });
        let b = memo.get_or_compute(&key("RSI"), &fp("x"), || {
            calls += 1;
            Components::new(3)
        });
        assert_eq!(calls, 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!((memo.hits(), memo.misses()), (1, 1));
    }

    #[test]
    fn key_and_fingerprint_both_discriminate() {
        let memo = SignalMemo::new();
        memo.get_or_compute(&key("RSI"), &fp("x"), || Components::new(1));
        memo.get_or_compute(&key("RSI"), &fp("y"), || Components::new(1));
        memo.get_or_compute(&key("MACD"), &fp("x"), || Components::new(1));
        assert_eq!(memo.len(), 3);
        assert_eq!(memo.hits(), 0);
    }

    #[test]
    fn concurrent_readers_share_one_entry() {
        let memo = Arc::new(SignalMemo::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let memo = Arc::clone(&memo);
                std::thread::spawn(move || {
                    memo.get_or_compute(&key("Volume"), &fp("z"), || Components::new(10))
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(memo.len(), 1);
        for r in &results[1..] {
            assert!(Arc::ptr_eq(&results[0], r));
        }
    }
}
