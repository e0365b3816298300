//! Decouples sensor delivery from drawing.
//!
//! The sensor stage runs on its own thread and publishes each tilt angle
//! into a single-slot [`LatestValue`]. The draw loop takes whatever is
//! newest when it gets around to redrawing; older angles are overwritten,
//! never queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info};

use crate::config::ReferencePolicy;
use crate::orientation::OrientationFilter;
use crate::sensor::GravitySource;

/// Single-slot channel holding only the most recent value.
///
/// Clones share the slot.
#[derive(Debug)]
pub struct LatestValue<T> {
    slot: Arc<Mutex<Option<T>>>,
}

impl<T> Clone for LatestValue<T> {
    fn clone(&self) -> Self {
        LatestValue {
            slot: self.slot.clone(),
        }
    }
}

impl<T> Default for LatestValue<T> {
    fn default() -> Self {
        LatestValue {
            slot: Arc::new(Mutex::new(None)),
        }
    }
}

impl<T> LatestValue<T> {
    pub fn new() -> Self {
        LatestValue::default()
    }

    /// Replaces any value not yet taken
    pub fn publish(&self, value: T) {
        *self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(value);
    }

    /// Takes the newest value, leaving the slot empty
    pub fn take(&self) -> Option<T> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

/// Shared run/pause switches for the sensor stage
#[derive(Debug, Clone)]
pub struct SessionControl {
    running: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
}

impl Default for SessionControl {
    fn default() -> Self {
        SessionControl {
            running: Arc::new(AtomicBool::new(true)),
            paused: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl SessionControl {
    /// Stops sensor delivery until [`SessionControl::resume`]
    pub fn pause(&self) {
        if !self.paused.swap(true, Ordering::AcqRel) {
            info!("sensor delivery paused");
        }
    }

    pub fn resume(&self) {
        if self.paused.swap(false, Ordering::AcqRel) {
            info!("sensor delivery resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Ends the session; the sensor stage exits at its next sample
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Sensor thread turning gravity samples into published tilt angles
pub struct SensorStage {
    control: SessionControl,
    handle: Option<JoinHandle<()>>,
}

impl SensorStage {
    /// Starts sampling `source` every `period`, publishing angles to `angles`
    pub fn spawn(
        mut source: Box<dyn GravitySource>,
        policy: ReferencePolicy,
        period: Duration,
        angles: LatestValue<f64>,
        control: SessionControl,
    ) -> std::io::Result<Self> {
        let thread_control = control.clone();
        let handle = thread::Builder::new()
            .name("sensor".into())
            .spawn(move || {
                let control = thread_control;
                let mut filter = OrientationFilter::new(policy);
                let mut delivered = 0u64;
                while control.is_running() {
                    if control.is_paused() {
                        thread::sleep(period);
                        continue;
                    }
                    let Some(sample) = source.next_sample() else {
                        debug!("gravity source exhausted after {} samples", delivered);
                        break;
                    };
                    angles.publish(filter.update(sample.gravity, sample.orientation));
                    delivered += 1;
                    thread::sleep(period);
                }
            })?;
        Ok(SensorStage {
            control,
            handle: Some(handle),
        })
    }

    /// Stops the thread and waits for it to finish
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.control.stop();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("sensor thread panicked");
            }
        }
    }
}

impl Drop for SensorStage {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::DeviceOrientation;
    use crate::sensor::ReplaySource;
    use std::path::Path;

    #[test]
    fn newest_value_wins() {
        let slot = LatestValue::new();
        let producer = slot.clone();
        producer.publish(1.0);
        producer.publish(2.0);
        assert_eq!(slot.take(), Some(2.0));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn pause_and_resume_toggle() {
        let control = SessionControl::default();
        control.pause();
        assert!(control.is_paused());
        control.resume();
        assert!(!control.is_paused());
        control.stop();
        assert!(!control.is_running());
    }

    #[test]
    fn stage_publishes_replayed_angles() {
        let replay = ReplaySource::parse(
            "0 9.8 0\n-9.8 0 0\n-9.8 0 0\n",
            Path::new("inline"),
            DeviceOrientation::Portrait,
        )
        .unwrap();
        let angles = LatestValue::new();
        let mut stage = SensorStage::spawn(
            Box::new(replay),
            ReferencePolicy::CaptureOnce,
            Duration::from_millis(1),
            angles.clone(),
            SessionControl::default(),
        )
        .unwrap();

        // The replay runs dry quickly; joining guarantees the last publish
        if let Some(handle) = stage.handle.take() {
            handle.join().unwrap();
        }
        let angle = angles.take().unwrap();
        assert!(angle > 0.0 && angle < std::f64::consts::FRAC_PI_2);
    }
}
