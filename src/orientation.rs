//! Gravity sample smoothing and tilt angle extraction.

use log::{debug, trace};

use crate::config::ReferencePolicy;
use crate::math::{Vector2, Vector3};

/// Weight given to each new raw sample
pub const LOW_PASS_ALPHA: f64 = 0.7;
/// Below this in-plane gravity (m/s²) the tilt angle is meaningless
pub const MIN_PLANAR_GRAVITY: f64 = 1e-3;

/// How the device is being held when the reference is captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DeviceOrientation {
    Portrait,
    Landscape,
}

/// Exponential smoothing over 3-axis samples, seeded by the first sample
#[derive(Debug, Clone)]
pub struct LowPassFilter {
    alpha: f64,
    value: Option<Vector3>,
}

impl Default for LowPassFilter {
    fn default() -> Self {
        LowPassFilter::new(LOW_PASS_ALPHA)
    }
}

impl LowPassFilter {
    pub fn new(alpha: f64) -> Self {
        LowPassFilter { alpha, value: None }
    }

    /// Current estimate, `None` until the first sample
    pub fn value(&self) -> Option<Vector3> {
        self.value
    }

    pub fn filter(&mut self, raw: Vector3) -> Vector3 {
        let next = match self.value {
            Some(previous) => previous + (raw - previous) * self.alpha,
            None => raw,
        };
        self.value = Some(next);
        next
    }
}

/// Unit "up" along the axis that is vertical for `orientation`, pointing
/// the same way as gravity along that axis.
///
/// `None` while gravity has no component along that axis.
pub fn reference_up(gravity: Vector3, orientation: DeviceOrientation) -> Option<Vector2> {
    let axis = match orientation {
        DeviceOrientation::Portrait => Vector2::J,
        DeviceOrientation::Landscape => Vector2::I,
    };
    let along = gravity.flatten().project(axis).dot(axis);
    if along == 0.0 || along.is_nan() {
        return None;
    }
    Some(axis.mult(along.signum()))
}

/// Turns raw gravity samples into a signed tilt angle
#[derive(Debug, Clone)]
pub struct OrientationFilter {
    low_pass: LowPassFilter,
    policy: ReferencePolicy,
    /// Captured reference and the orientation it was captured in
    reference: Option<(Vector2, DeviceOrientation)>,
    last_angle: f64,
}

impl OrientationFilter {
    pub fn new(policy: ReferencePolicy) -> Self {
        OrientationFilter {
            low_pass: LowPassFilter::default(),
            policy,
            reference: None,
            last_angle: 0.0,
        }
    }

    pub fn filtered_gravity(&self) -> Option<Vector3> {
        self.low_pass.value()
    }

    pub fn reference_up(&self) -> Option<Vector2> {
        self.reference.map(|(up, _)| up)
    }

    /// Last valid tilt angle
    pub fn angle(&self) -> f64 {
        self.last_angle
    }

    /// Filters a raw sample and returns the tilt angle in [-π, π].
    ///
    /// Degenerate samples return the previous angle unchanged.
    pub fn update(&mut self, raw: Vector3, orientation: DeviceOrientation) -> f64 {
        let gravity = self.low_pass.filter(raw);

        let recapture = match (self.reference, self.policy) {
            (None, _) => true,
            (Some((_, captured)), ReferencePolicy::FollowOrientation) => captured != orientation,
            (Some(_), ReferencePolicy::CaptureOnce) => false,
        };
        if recapture {
            if let Some(up) = reference_up(gravity, orientation) {
                debug!("reference up captured as {:?} in {:?}", up, orientation);
                self.reference = Some((up, orientation));
            }
        }
        let Some((up, _)) = self.reference else {
            return self.last_angle;
        };

        let planar = gravity.flatten();
        if !(planar.magnitude() >= MIN_PLANAR_GRAVITY) {
            trace!("planar gravity too small, holding angle {:.4}", self.last_angle);
            return self.last_angle;
        }
        let angle = planar.angle_to(up);
        if angle.is_nan() {
            return self.last_angle;
        }
        self.last_angle = angle;
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    const UPRIGHT: Vector3 = Vector3::new(0.0, 9.81, 0.0);

    #[test]
    fn first_sample_seeds_filter() {
        let mut filter = LowPassFilter::default();
        assert_eq!(filter.filter(Vector3::new(1.0, 2.0, 3.0)), Vector3::new(1.0, 2.0, 3.0));
        let next = filter.filter(Vector3::new(2.0, 2.0, 3.0));
        assert!((next.x - 1.7).abs() < 1e-12);
    }

    #[test]
    fn steady_input_does_not_drift() {
        let mut filter = LowPassFilter::default();
        let seed = Vector3::new(0.3, 9.7, 1.1);
        for _ in 0..1000 {
            assert_eq!(filter.filter(seed), seed);
        }
    }

    #[test]
    fn reference_follows_gravity_sign() {
        assert_eq!(reference_up(UPRIGHT, DeviceOrientation::Portrait), Some(Vector2::J));
        assert_eq!(
            reference_up(Vector3::new(0.0, -9.81, 0.0), DeviceOrientation::Portrait),
            Some(-Vector2::J)
        );
        assert_eq!(
            reference_up(Vector3::new(-9.81, 0.5, 0.0), DeviceOrientation::Landscape),
            Some(-Vector2::I)
        );
        assert_eq!(reference_up(Vector3::K, DeviceOrientation::Portrait), None);
    }

    #[test]
    fn upright_device_has_zero_tilt() {
        let mut filter = OrientationFilter::new(ReferencePolicy::CaptureOnce);
        assert_eq!(filter.update(UPRIGHT, DeviceOrientation::Portrait), 0.0);
        assert_eq!(filter.reference_up(), Some(Vector2::J));
    }

    #[test]
    fn tilt_right_is_negative() {
        let mut filter = OrientationFilter::new(ReferencePolicy::CaptureOnce);
        filter.update(UPRIGHT, DeviceOrientation::Portrait);
        let tilted = Vector3::new(9.81, 9.81, 0.0);
        let mut angle = 0.0;
        for _ in 0..50 {
            angle = filter.update(tilted, DeviceOrientation::Portrait);
        }
        assert!((angle + FRAC_PI_4).abs() < 1e-6);
    }

    #[test]
    fn flat_device_holds_last_angle() {
        let mut filter = OrientationFilter::new(ReferencePolicy::CaptureOnce);
        let seed = Vector3::new(-1.0, 9.0, 0.0);
        let held = filter.update(seed, DeviceOrientation::Portrait);
        assert!(held > 0.0);

        // Pick the raw sample that drives the filtered gravity to a planar
        // part pointing the other way, but too small to trust
        let target = Vector3::new(4e-4, -4e-4, 9.81);
        let raw = seed + (target - seed) * (1.0 / LOW_PASS_ALPHA);
        let angle = filter.update(raw, DeviceOrientation::Portrait);

        let planar = filter.filtered_gravity().unwrap().flatten();
        assert!(planar.magnitude() < MIN_PLANAR_GRAVITY);
        assert!(planar.x > 0.0 && planar.y < 0.0);
        assert_eq!(angle, held);
        assert_eq!(filter.angle(), held);
    }

    #[test]
    fn reference_waits_for_a_usable_sample() {
        let mut filter = OrientationFilter::new(ReferencePolicy::CaptureOnce);
        assert_eq!(filter.update(Vector3::K, DeviceOrientation::Portrait), 0.0);
        assert_eq!(filter.reference_up(), None);
        filter.update(UPRIGHT, DeviceOrientation::Portrait);
        assert_eq!(filter.reference_up(), Some(Vector2::J));
    }

    #[test]
    fn capture_once_ignores_rotation() {
        let mut filter = OrientationFilter::new(ReferencePolicy::CaptureOnce);
        filter.update(UPRIGHT, DeviceOrientation::Portrait);
        filter.update(Vector3::new(9.81, 0.0, 0.0), DeviceOrientation::Landscape);
        assert_eq!(filter.reference_up(), Some(Vector2::J));
    }

    #[test]
    fn follow_orientation_recaptures() {
        let mut filter = OrientationFilter::new(ReferencePolicy::FollowOrientation);
        filter.update(UPRIGHT, DeviceOrientation::Portrait);
        filter.update(Vector3::new(9.81, 0.0, 0.0), DeviceOrientation::Landscape);
        assert_eq!(filter.reference_up(), Some(Vector2::I));
    }
}
