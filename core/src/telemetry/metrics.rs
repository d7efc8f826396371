use std::sync::Mutex;

#[derive(Debug, Default)]
struct Counters {
    cache_hits: usize,
    live_fetches: usize,
    sample_fallbacks: usize,
}

/// Tallies of how each page load was satisfied. Shared behind an `Arc`
/// between loaders; a poisoned lock drops the observation rather than
/// failing the load.
#[derive(Debug, Default)]
pub struct IngestMetrics {
    counters: Mutex<Counters>,
}

impl IngestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cache_hit(&self) {
        if let Ok(mut counters) = self.counters.lock() {
            counters.cache_hits += 1;
        }
    }

    pub fn record_live_fetch(&self) {
        if let Ok(mut counters) = self.counters.lock() {
            counters.live_fetches += 1;
        }
    }

    pub fn record_sample_fallback(&self) {
        if let Ok(mut counters) = self.counters.lock() {
            counters.sample_fallbacks += 1;
        }
    }

    /// (cache hits, live fetches, sample fallbacks)
    pub fn snapshot(&self) -> (usize, usize, usize) {
        match self.counters.lock() {
            Ok(counters) => (
                counters.cache_hits,
                counters.live_fetches,
                counters.sample_fallbacks,
            ),
            Err(_) => (0, 0, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let metrics = IngestMetrics::new();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_live_fetch();
        metrics.record_sample_fallback();
        assert_eq!(metrics.snapshot(), (2, 1, 1));
    }
}
