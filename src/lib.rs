//! Tilt-driven scrolling text.
//!
//! A line of text is turned into a vector path, scaled to fill a surface,
//! and scrolled horizontally as the device is tilted, as if read through a
//! sight at the end of an arm of a given length.

pub mod config;
pub mod error;
pub mod font;
pub mod graphics;
pub mod haptics;
pub mod math;
pub mod orientation;
pub mod path;
pub mod physics;
pub mod renderer;
pub mod scroller;
pub mod sensor;
pub mod session;
pub mod terminal;

pub use config::{ColorScheme, ReferencePolicy, ScrollConfig};
pub use error::{Error, Result};
pub use graphics::{Color, PixelBuffer};
pub use math::{Vector2, Vector3};
pub use orientation::{DeviceOrientation, OrientationFilter};
pub use path::Rect;
pub use renderer::{PathTextRenderer, TextRenderer};
pub use scroller::{Padding, TextScroller};
