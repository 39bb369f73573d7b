// Application state module
// Process-wide read-only configuration plus a few atomic counters

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use super::types::Config;

/// Application state, constructed once in `main` and shared via `Arc`
pub struct AppState {
    pub config: Config,

    // Cached config value for lock-free access on the request path
    pub cached_access_log: Arc<AtomicBool>,

    // Monotonic sequence for tagging relay subprocesses in the log
    relay_seq: AtomicU64,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            cached_access_log: Arc::new(AtomicBool::new(config.logging.access_log)),
            relay_seq: AtomicU64::new(0),
        }
    }

    /// Allocate the next relay id (first id is 1)
    pub fn next_relay_id(&self) -> u64 {
        self.relay_seq.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_ids_are_sequential() {
        let cfg = Config::load_from("no-such-config-file").unwrap();
        let state = AppState::new(&cfg);
        assert_eq!(state.next_relay_id(), 1);
        assert_eq!(state.next_relay_id(), 2);
        assert_eq!(state.next_relay_id(), 3);
    }
}
