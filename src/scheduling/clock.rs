use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// Source of wall-clock timestamps for the engine. Injectable so tests get
/// deterministic created_at/started_at values.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a fixed instant, advanced explicitly.
#[derive(Debug)]
pub struct FixedClock {
    instant: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            instant: Mutex::new(at),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut instant = self.instant.lock().expect("clock lock poisoned");
        *instant = *instant + by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock().expect("clock lock poisoned")
    }
}
