//! Bounded, fixed-interval polling for eventually-consistent node state.
//!
//! Node state here (container boot, discovery, relay propagation) changes on
//! the order of seconds, so polling sleeps a fixed interval on the calling
//! thread between attempts. The only way to stop a wait early is the deadline.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollSettings {
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    pub fn wait_for<F>(&self, condition: F) -> bool
    where
        F: FnMut() -> bool,
    {
        wait_for_condition(self.timeout, self.interval, condition)
    }

    pub fn wait_for_value<T, F>(&self, probe: F) -> Option<T>
    where
        F: FnMut() -> Option<T>,
    {
        wait_for_value(self.timeout, self.interval, probe)
    }
}

/// Evaluates `condition` every `interval` until it returns `true` or
/// `timeout` elapses. Returns whether the condition was met.
pub fn wait_for_condition<F>(timeout: Duration, interval: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    wait_for_value(timeout, interval, || condition().then_some(())).is_some()
}

/// Like [`wait_for_condition`], but keeps the first value the probe yields.
///
/// Returns no later than `timeout + interval` (plus one probe evaluation).
pub fn wait_for_value<T, F>(timeout: Duration, interval: Duration, mut probe: F) -> Option<T>
where
    F: FnMut() -> Option<T>,
{
    let started = Instant::now();
    while started.elapsed() < timeout {
        if let Some(value) = probe() {
            return Some(value);
        }
        std::thread::sleep(interval);
    }
    None
}
