use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Sliding-window request limiter keyed by client identity.
#[derive(Debug, Clone)]
pub struct ClientRateLimiter {
    history: Arc<Mutex<HashMap<String, Vec<Instant>>>>,
    window: Duration,
    max_requests: usize,
}

impl ClientRateLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            history: Arc::new(Mutex::new(HashMap::new())),
            window,
            max_requests,
        }
    }

    pub fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut history = self.history.lock();
        let hits = history.entry(key.to_string()).or_default();

        hits.retain(|hit| now.duration_since(*hit) <= self.window);
        if hits.len() >= self.max_requests {
            return false;
        }

        hits.push(now);
        true
    }
}
