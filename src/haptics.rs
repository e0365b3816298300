//! Fire-and-forget haptic output.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Duration of the pulse fired at a scroll extreme
pub const PULSE_DURATION: Duration = Duration::from_millis(20);

/// Platform vibration service
pub trait Vibrator {
    /// Whether the device has a motor at all
    fn has_vibrator(&self) -> bool;

    /// Requests a pulse; never blocks and never reports back
    fn vibrate(&self, duration: Duration);
}

/// Device without a vibration motor
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVibrator;

impl Vibrator for NoVibrator {
    fn has_vibrator(&self) -> bool {
        false
    }

    fn vibrate(&self, _duration: Duration) {}
}

/// Counts requested pulses so another thread can act on them.
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct PulseCounter {
    pending: Arc<AtomicUsize>,
}

impl PulseCounter {
    pub fn new() -> Self {
        PulseCounter::default()
    }

    /// Takes every pulse requested since the last call
    pub fn take(&self) -> usize {
        self.pending.swap(0, Ordering::AcqRel)
    }
}

impl Vibrator for PulseCounter {
    fn has_vibrator(&self) -> bool {
        true
    }

    fn vibrate(&self, duration: Duration) {
        log::trace!("haptic pulse requested ({} ms)", duration.as_millis());
        self.pending.fetch_add(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_clones_share_pulses() {
        let counter = PulseCounter::new();
        let handle = counter.clone();
        handle.vibrate(PULSE_DURATION);
        handle.vibrate(PULSE_DURATION);
        assert_eq!(counter.take(), 2);
        assert_eq!(counter.take(), 0);
    }
}
