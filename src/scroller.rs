//! The scrolling text view: one renderer, its viewport, and the tilt
//! transfer function that positions the text inside it.

use log::trace;

use crate::config::ScrollConfig;
use crate::error::Result;
use crate::graphics::PixelBuffer;
use crate::haptics::Vibrator;
use crate::path::Rect;
use crate::physics::{HapticTicker, ScrollMetrics, ScrollPosition};
use crate::renderer::TextRenderer;

/// Space reserved around the text, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Padding {
    pub const fn vertical(amount: u32) -> Self {
        Padding {
            left: 0,
            top: amount,
            right: 0,
            bottom: amount,
        }
    }
}

/// Result of feeding one tilt angle to the scroller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSample {
    pub position: ScrollPosition,
    /// Whether a haptic pulse fired for this sample
    pub pulsed: bool,
}

/// Scrolls a line of text in response to tilt
pub struct TextScroller<R, V> {
    renderer: R,
    haptics: HapticTicker<V>,
    config: ScrollConfig,
    padding: Padding,
    bounds: Option<Rect>,
    offset: f32,
    /// Last tilt angle fed in, re-applied when the text is laid out again
    angle: Option<f64>,
    /// Set by a resize until the renderer has laid the text out again
    relayout: bool,
}

impl<R: TextRenderer, V: Vibrator> TextScroller<R, V> {
    /// Builds a scroller showing `text` with the session configuration
    pub fn new(mut renderer: R, vibrator: V, text: &str, config: ScrollConfig) -> Self {
        renderer.set_text(text);
        renderer.set_foreground(config.colors.foreground);
        renderer.set_background(config.colors.background);
        TextScroller {
            renderer,
            haptics: HapticTicker::new(vibrator, config.vibrate_enabled),
            config,
            padding: Padding::default(),
            bounds: None,
            offset: 0.0,
            angle: None,
            relayout: true,
        }
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn haptics(&self) -> &HapticTicker<V> {
        &self.haptics
    }

    /// Current horizontal offset of the text
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Padding-adjusted viewport, once the surface has a size
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Adapts to a new surface size
    pub fn resize(&mut self, width: u32, height: u32) {
        let padding = self.padding;
        let inner_width = width.saturating_sub(padding.left + padding.right);
        let inner_height = height.saturating_sub(padding.top + padding.bottom);
        let bounds = Rect::from_origin_size(
            padding.left as f32,
            padding.top as f32,
            inner_width as f32,
            inner_height as f32,
        );

        self.bounds = Some(bounds);
        self.renderer.set_bounds(bounds);
        self.renderer.set_max_width(self.config.max_text_width());
        self.relayout = true;
    }

    /// Geometry the transfer function currently works with
    pub fn metrics(&self) -> ScrollMetrics {
        let max_text_width = self
            .renderer
            .max_width()
            .unwrap_or_else(|| self.config.max_text_width());
        ScrollMetrics {
            text_width: self.renderer.width() as f64,
            max_text_width: max_text_width as f64,
            bounds_width: self.bounds.map_or(0.0, |bounds| bounds.width() as f64),
        }
    }

    /// Moves the text for a signed tilt angle in radians
    pub fn move_to(&mut self, angle: f64) -> ScrollSample {
        let position = self.metrics().position(angle);
        self.offset = position.offset;
        self.angle = Some(angle);
        let pulsed = self.haptics.update(position.percent);
        trace!(
            "angle {:.4} -> percent {:.4}, offset {:.1}{}",
            angle,
            position.percent,
            position.offset,
            if pulsed { " (pulse)" } else { "" }
        );
        ScrollSample { position, pulsed }
    }

    /// Draws the text at the current offset.
    ///
    /// After a resize the text width changes, so the offset for the last
    /// angle is worked out again against the new layout first. That
    /// reposition does not count as a haptic tick.
    pub fn render(&mut self, frame: &mut PixelBuffer) -> Result<()> {
        if self.relayout {
            self.renderer.layout()?;
            self.relayout = false;
            if let Some(angle) = self.angle {
                self.offset = self.metrics().position(angle).offset;
                trace!("relaid out, offset for angle {:.4} is now {:.1}", angle, self.offset);
            }
        }
        self.renderer.render(frame, self.offset)
    }
}
