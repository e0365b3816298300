use crate::graphics::Color;
use crate::physics;

/// Default sighting arm length, in inches
pub const DEFAULT_ARM_LENGTH: u32 = 16;

/// When the reference "up" direction is captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferencePolicy {
    /// Capture from the first usable sample and keep it for the session
    #[default]
    CaptureOnce,
    /// Capture again whenever the device orientation changes
    FollowOrientation,
}

/// Text and backdrop colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub foreground: Color,
    pub background: Color,
}

impl ColorScheme {
    /// Black text on white
    pub const LIGHT: ColorScheme = ColorScheme {
        foreground: Color::BLACK,
        background: Color::WHITE,
    };
    /// White text on black
    pub const DARK: ColorScheme = ColorScheme {
        foreground: Color::WHITE,
        background: Color::BLACK,
    };

    pub fn for_dark_mode(dark_mode: bool) -> Self {
        if dark_mode {
            ColorScheme::DARK
        } else {
            ColorScheme::LIGHT
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme::LIGHT
    }
}

/// Session configuration, fixed once the scroller is built
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollConfig {
    /// Length of the sighting arm, in inches
    pub arm_length_inches: f64,
    /// Display density, in pixels per inch
    pub display_density: f64,
    /// Whether haptic ticks are wanted at all
    pub vibrate_enabled: bool,
    pub colors: ColorScheme,
    pub reference_policy: ReferencePolicy,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        ScrollConfig {
            arm_length_inches: DEFAULT_ARM_LENGTH as f64,
            display_density: 160.0,
            vibrate_enabled: true,
            colors: ColorScheme::default(),
            reference_policy: ReferencePolicy::default(),
        }
    }
}

impl ScrollConfig {
    /// Widest text the arm can sweep across on this display
    pub fn max_text_width(&self) -> f32 {
        physics::max_text_width(self.arm_length_inches, self.display_density) as f32
    }
}

/// Effective arm length for the shell's range toggle; short range halves it
pub fn effective_arm_length(arm_length: u32, long_range: bool) -> u32 {
    if long_range {
        arm_length
    } else {
        arm_length / 2
    }
}
