use std::thread;
use std::time::Duration;

pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);

/// Courtesy delay between two entries; a fixed rate, no backoff.
pub trait Pacer: Send + Sync {
    fn pause(&self, delay: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleepPacer;

impl Pacer for ThreadSleepPacer {
    fn pause(&self, delay: Duration) {
        if delay.is_zero() {
            return;
        }
        thread::sleep(delay);
    }
}
