use std::thread;
use std::time::Duration;
use log::info;

pub trait Sleep {
    fn sleep(&self, duration: Duration);
}

impl<S: Sleep + ?Sized> Sleep for &S {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Blocks the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

pub fn page_delay<S: Sleep>(sleeper: &S, delay: Duration) {
    if delay.is_zero() {
        return;
    }
    info!("Waiting for {:?} (Page Delay)...", delay);
    sleeper.sleep(delay);
}

/// `2^attempt` seconds, saturating.
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt))
}
