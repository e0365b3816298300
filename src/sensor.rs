//! Sources of gravity samples for the orientation filter.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::math::Vector3;
use crate::orientation::DeviceOrientation;

/// Standard gravity, in m/s²
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// One reading from the gravity sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravitySample {
    pub gravity: Vector3,
    /// Orientation the device reported alongside the reading
    pub orientation: DeviceOrientation,
}

/// Anything that delivers gravity samples, one per sensor callback
pub trait GravitySource: Send {
    /// Next sample, or `None` once the source is exhausted
    fn next_sample(&mut self) -> Option<GravitySample>;
}

/// Replays samples recorded as text, one `x y z [portrait|landscape]` per
/// line. Blank lines and `#` comments are skipped.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    samples: VecDeque<GravitySample>,
}

impl ReplaySource {
    pub fn from_file(path: &Path, orientation: DeviceOrientation) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents, path, orientation)
    }

    /// Parses replay text; `origin` only labels errors
    pub fn parse(contents: &str, origin: &Path, orientation: DeviceOrientation) -> Result<Self> {
        let mut samples = VecDeque::new();
        for (index, line) in contents.lines().enumerate() {
            let content = line.split('#').next().unwrap_or_default().trim();
            if content.is_empty() {
                continue;
            }
            let sample = parse_sample(content, orientation).ok_or_else(|| Error::ReplayParse {
                path: PathBuf::from(origin),
                line: index + 1,
                content: content.to_owned(),
            })?;
            samples.push_back(sample);
        }
        Ok(ReplaySource { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

fn parse_sample(content: &str, default_orientation: DeviceOrientation) -> Option<GravitySample> {
    let mut fields = content.split_whitespace();
    let mut axis = || fields.next()?.parse::<f64>().ok();
    let gravity = Vector3::new(axis()?, axis()?, axis()?);
    let orientation = match fields.next() {
        None => default_orientation,
        Some("portrait") => DeviceOrientation::Portrait,
        Some("landscape") => DeviceOrientation::Landscape,
        Some(_) => return None,
    };
    if fields.next().is_some() {
        return None;
    }
    Some(GravitySample {
        gravity,
        orientation,
    })
}

impl GravitySource for ReplaySource {
    fn next_sample(&mut self) -> Option<GravitySample> {
        self.samples.pop_front()
    }
}

/// Gravity of a device held upright and rolled by a controllable angle.
///
/// The roll is shared through [`TiltHandle`] so input handling can steer
/// the sensor stage from another thread.
#[derive(Debug, Clone)]
pub struct SimulatedTilt {
    roll: Arc<Mutex<f64>>,
    orientation: DeviceOrientation,
}

/// Steers a [`SimulatedTilt`]
#[derive(Debug, Clone)]
pub struct TiltHandle {
    roll: Arc<Mutex<f64>>,
}

impl SimulatedTilt {
    pub fn new(orientation: DeviceOrientation) -> (Self, TiltHandle) {
        let roll = Arc::new(Mutex::new(0.0));
        let handle = TiltHandle { roll: roll.clone() };
        (SimulatedTilt { roll, orientation }, handle)
    }

    /// Gravity that yields a tilt angle of `roll` radians against the
    /// upright reference
    pub fn gravity_for(roll: f64, orientation: DeviceOrientation) -> Vector3 {
        let (sin, cos) = roll.sin_cos();
        match orientation {
            DeviceOrientation::Portrait => {
                Vector3::new(-STANDARD_GRAVITY * sin, STANDARD_GRAVITY * cos, 0.0)
            }
            DeviceOrientation::Landscape => {
                Vector3::new(STANDARD_GRAVITY * cos, STANDARD_GRAVITY * sin, 0.0)
            }
        }
    }
}

impl GravitySource for SimulatedTilt {
    fn next_sample(&mut self) -> Option<GravitySample> {
        let roll = *self.roll.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Some(GravitySample {
            gravity: Self::gravity_for(roll, self.orientation),
            orientation: self.orientation,
        })
    }
}

impl TiltHandle {
    /// Rolls the simulated device by `delta` radians
    pub fn nudge(&self, delta: f64) {
        let mut roll = self.roll.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *roll += delta;
    }

    /// Returns the simulated device to upright
    pub fn center(&self) {
        *self.roll.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = 0.0;
    }

    pub fn roll(&self) -> f64 {
        *self.roll.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReferencePolicy;
    use crate::orientation::OrientationFilter;

    #[test]
    fn replay_parses_samples_and_comments() {
        let text = "# recorded upright\n0 9.8 0\n\n1.5 9.6 0.2 landscape # turned\n";
        let mut source =
            ReplaySource::parse(text, Path::new("trace.txt"), DeviceOrientation::Portrait).unwrap();
        assert_eq!(source.len(), 2);

        let first = source.next_sample().unwrap();
        assert_eq!(first.gravity, Vector3::new(0.0, 9.8, 0.0));
        assert_eq!(first.orientation, DeviceOrientation::Portrait);
        assert_eq!(source.next_sample().unwrap().orientation, DeviceOrientation::Landscape);
        assert!(source.next_sample().is_none());
    }

    #[test]
    fn replay_reports_bad_lines() {
        let err = ReplaySource::parse("0 1 2\n0 nine 2\n", Path::new("t"), DeviceOrientation::Portrait)
            .unwrap_err();
        match err {
            Error::ReplayParse { line, content, .. } => {
                assert_eq!(line, 2);
                assert_eq!(content, "0 nine 2");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(ReplaySource::parse("1 2", Path::new("t"), DeviceOrientation::Portrait).is_err());
        assert!(ReplaySource::parse("1 2 3 4", Path::new("t"), DeviceOrientation::Portrait).is_err());
    }

    #[test]
    fn simulated_roll_becomes_tilt_angle() {
        for orientation in [DeviceOrientation::Portrait, DeviceOrientation::Landscape] {
            let (mut source, handle) = SimulatedTilt::new(orientation);
            let mut filter = OrientationFilter::new(ReferencePolicy::CaptureOnce);
            let upright = source.next_sample().unwrap();
            filter.update(upright.gravity, upright.orientation);

            handle.nudge(0.25);
            let mut angle = 0.0;
            for _ in 0..60 {
                let sample = source.next_sample().unwrap();
                angle = filter.update(sample.gravity, sample.orientation);
            }
            assert!((angle - 0.25).abs() < 1e-6, "{orientation:?}: {angle}");

            handle.center();
            assert_eq!(handle.roll(), 0.0);
        }
    }
}
