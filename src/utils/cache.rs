//! Time-Based Cache
//!
//! Holds provider responses for a fixed time-to-live.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Simple time-based cache
pub struct Cache<T> {
    data: HashMap<String, (T, Instant)>,
    ttl: Duration,
}

impl<T: Clone> Cache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            data: HashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        self.data.get(key).and_then(|(value, inserted)| {
            if inserted.elapsed() < self.ttl {
                Some(value.clone())
            } else {
                None
            }
        })
    }

    pub fn set(&mut self, key: impl Into<String>, value: T) {
        self.data.insert(key.into(), (value, Instant::now()));
    }
}
