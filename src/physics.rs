//! Tilt angle to scroll position transfer function and haptic ticks.

use std::f64::consts::PI;

use crate::haptics::{Vibrator, PULSE_DURATION};

/// Widest angular sweep the sighting arm subtends, in radians
pub const MAX_ANGULAR_WIDTH: f64 = PI / 5.0;
/// Shape of the easing curve; smaller is closer to linear
pub const EASING_ADJUSTMENT: f64 = 0.4;
/// Scroll percentage quantum for haptic ticks
pub const TICK_GRANULARITY: f64 = 0.1;

/// Sinusoidal easing of a normalized angle in [-1, 1].
///
/// Odd, monotonic, and maps -1, 0, 1 onto themselves.
pub fn sinusoidal(angle: f64) -> f64 {
    (PI / 2.0 * angle * EASING_ADJUSTMENT).sin() / (PI / 2.0 * EASING_ADJUSTMENT).sin()
}

/// Widest text that fits in the arm's sweep at the given display density
pub fn max_text_width(arm_length_inches: f64, pixels_per_inch: f64) -> f64 {
    arm_length_inches * pixels_per_inch * MAX_ANGULAR_WIDTH * 2.0
}

/// Geometry reported by the renderer that shapes the transfer function
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    /// Full width of the scaled text path
    pub text_width: f64,
    /// Maximum displayable text width
    pub max_text_width: f64,
    /// Width of the visible viewport
    pub bounds_width: f64,
}

/// Where a tilt angle puts the text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPosition {
    /// Normalized scroll position in [0, 1]
    pub percent: f64,
    /// Horizontal shift of the text path, in pixels
    pub offset: f32,
}

impl ScrollMetrics {
    /// Total sweep, either side of neutral, that covers the full scroll range
    pub fn angular_span(&self) -> f64 {
        MAX_ANGULAR_WIDTH * (self.text_width + self.bounds_width) / self.max_text_width
    }

    /// Normalized scroll position for a signed tilt angle
    pub fn percent(&self, angle: f64) -> f64 {
        let span = self.angular_span();
        if !(span.is_finite() && span > 0.0) || angle.is_nan() {
            return 0.5;
        }
        let capped = angle.clamp(-span, span) / span;
        sinusoidal(capped) / 2.0 + 0.5
    }

    /// Pixel offset for a scroll percentage
    pub fn offset(&self, percent: f64) -> f32 {
        (percent * self.text_width - self.bounds_width / 2.0) as f32
    }

    pub fn position(&self, angle: f64) -> ScrollPosition {
        let percent = self.percent(angle);
        ScrollPosition {
            percent,
            offset: self.offset(percent),
        }
    }
}

/// Fires a pulse whenever the quantized scroll position newly reaches
/// either end of the scroll range.
#[derive(Debug)]
pub struct HapticTicker<V> {
    vibrator: V,
    enabled: bool,
    /// Last quantized position, in units of [`TICK_GRANULARITY`]
    last_tick: Option<i64>,
}

impl<V: Vibrator> HapticTicker<V> {
    pub fn new(vibrator: V, enabled: bool) -> Self {
        HapticTicker {
            vibrator,
            enabled,
            last_tick: None,
        }
    }

    /// Last quantized scroll position seen, if any
    pub fn last_tick(&self) -> Option<f64> {
        self.last_tick.map(|tick| tick as f64 * TICK_GRANULARITY)
    }

    /// Records a new scroll percentage; returns whether a pulse fired
    pub fn update(&mut self, percent: f64) -> bool {
        let tick = (percent / TICK_GRANULARITY).round() as i64;
        let max_tick = (1.0 / TICK_GRANULARITY).round() as i64;
        if self.last_tick == Some(tick) {
            return false;
        }
        self.last_tick = Some(tick);

        let at_extreme = tick == 0 || tick == max_tick;
        if at_extreme && self.enabled && self.vibrator.has_vibrator() {
            self.vibrator.vibrate(PULSE_DURATION);
            return true;
        }
        false
    }
}
