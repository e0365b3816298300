//! Renders a line of text as a scaled vector path inside a viewport.
//!
//! Layout is a two-state machine. Every setter moves it to
//! [`Layout::Dirty`]; the next render rebuilds the scaled path once and moves
//! it to [`Layout::Clean`], after which rendering at any offset only redraws
//! the cached geometry.

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::font::{BlockFont, GlyphOutliner};
use crate::graphics::{Color, PixelBuffer};
use crate::path::{Path, Rect};

/// Default text color
pub const FOREGROUND_COLOR: Color = Color::BLACK;
/// Default backdrop color
pub const BACKGROUND_COLOR: Color = Color::WHITE;

/// Capability shared by every text renderer the scroller can drive
pub trait TextRenderer {
    fn set_text(&mut self, text: &str);
    fn set_bounds(&mut self, bounds: Rect);
    fn set_max_width(&mut self, max_width: f32);
    fn set_foreground(&mut self, color: Color);
    fn set_background(&mut self, color: Color);

    /// The maximum displayable text width, if it has been set
    fn max_width(&self) -> Option<f32>;

    /// Full width of the scrollable text as of the last layout pass
    fn width(&self) -> f32;

    /// Brings the layout up to date with the inputs set so far
    fn layout(&mut self) -> Result<()> {
        Ok(())
    }

    /// Draws the visible window of text at `offset` into `frame`
    fn render(&mut self, frame: &mut PixelBuffer, offset: f32) -> Result<()>;
}

/// Settings the layout is rebuilt from
#[derive(Debug, Clone)]
struct LayoutInputs {
    text: Option<String>,
    bounds: Option<Rect>,
    max_width: Option<f32>,
    foreground: Color,
    background: Color,
}

impl Default for LayoutInputs {
    fn default() -> Self {
        LayoutInputs {
            text: None,
            bounds: None,
            max_width: None,
            foreground: FOREGROUND_COLOR,
            background: BACKGROUND_COLOR,
        }
    }
}

/// Cached result of a layout pass
#[derive(Debug, Clone)]
struct Geometry {
    /// Text outline after scaling
    path: Path,
    /// Bounds of the scaled outline
    path_bounds: Rect,
    /// Where the offscreen surface lands on the frame
    viewport: Rect,
    /// Offscreen surface the path is painted into
    surface: PixelBuffer,
}

impl Geometry {
    /// Geometry that draws nothing but the backdrop
    fn empty(viewport: Rect) -> Self {
        Geometry {
            path: Path::new(),
            path_bounds: Rect::default(),
            viewport,
            surface: surface_for(&viewport),
        }
    }
}

#[derive(Debug)]
enum Layout {
    Dirty {
        inputs: LayoutInputs,
        /// Last good geometry, kept as a fallback for degenerate rebuilds
        stale: Option<Geometry>,
    },
    Clean {
        inputs: LayoutInputs,
        geometry: Geometry,
    },
}

impl Default for Layout {
    fn default() -> Self {
        Layout::Dirty {
            inputs: LayoutInputs::default(),
            stale: None,
        }
    }
}

impl Layout {
    /// Applies `change` to the inputs and marks the layout dirty
    fn invalidate(&mut self, change: impl FnOnce(&mut LayoutInputs)) {
        let (mut inputs, stale) = match std::mem::take(self) {
            Layout::Dirty { inputs, stale } => (inputs, stale),
            Layout::Clean { inputs, geometry } => (inputs, Some(geometry)),
        };
        change(&mut inputs);
        *self = Layout::Dirty { inputs, stale };
    }

    fn inputs(&self) -> &LayoutInputs {
        match self {
            Layout::Dirty { inputs, .. } | Layout::Clean { inputs, .. } => inputs,
        }
    }

    fn geometry(&self) -> Option<&Geometry> {
        match self {
            Layout::Dirty { stale, .. } => stale.as_ref(),
            Layout::Clean { geometry, .. } => Some(geometry),
        }
    }
}

/// Renders text by converting it to a path, scaling the path to the bounds
/// height under a maximum width, and painting a window of it.
#[derive(Debug)]
pub struct PathTextRenderer<F = BlockFont> {
    outliner: F,
    layout: Layout,
}

impl Default for PathTextRenderer<BlockFont> {
    fn default() -> Self {
        PathTextRenderer::new(BlockFont::default())
    }
}

impl<F: GlyphOutliner> PathTextRenderer<F> {
    pub fn new(outliner: F) -> Self {
        PathTextRenderer {
            outliner,
            layout: Layout::default(),
        }
    }

    /// Whether the next render has to rebuild the layout
    pub fn is_dirty(&self) -> bool {
        matches!(self.layout, Layout::Dirty { .. })
    }

    /// Bounds of the scaled text path as of the last layout pass
    pub fn text_bounds(&self) -> Option<Rect> {
        self.layout.geometry().map(|geometry| geometry.path_bounds)
    }
}

/// Validates the inputs and scales the text outline to fit them.
///
/// Returns `Ok(None)` when the inputs are complete but the result would have
/// no area.
fn build_geometry<F: GlyphOutliner>(outliner: &F, inputs: &LayoutInputs) -> Result<Option<Geometry>> {
    let text = inputs.text.as_deref().ok_or(Error::MissingText)?;
    let bounds = inputs.bounds.ok_or(Error::MissingBounds)?;
    let max_width = inputs.max_width.ok_or(Error::MissingMaxWidth)?;

    let mut path = outliner.text_path(text);
    let text_bounds = match path.bounds() {
        Some(text_bounds) if text_bounds.width() > 0.0 && text_bounds.height() > 0.0 => text_bounds,
        _ => return Ok(None),
    };
    if bounds.is_empty() || max_width <= 0.0 {
        return Ok(None);
    }

    // Fit the height exactly, then shrink uniformly if too wide
    let scale = bounds.height() / text_bounds.height();
    let width = (text_bounds.width() * scale).min(max_width);
    let scale = width / text_bounds.width();

    path.scale(scale);
    let path_bounds = text_bounds.scaled(scale);
    debug!(
        "text layout rebuilt: scale {:.4}, path {:.1}x{:.1}, viewport {:.0}x{:.0}",
        scale,
        path_bounds.width(),
        path_bounds.height(),
        bounds.width(),
        bounds.height()
    );

    Ok(Some(Geometry {
        path,
        path_bounds,
        viewport: bounds,
        surface: surface_for(&bounds),
    }))
}

/// Offscreen surface covering the viewport, truncated to whole pixels
fn surface_for(viewport: &Rect) -> PixelBuffer {
    PixelBuffer::new(
        viewport.width().max(0.0) as usize,
        viewport.height().max(0.0) as usize,
    )
}

impl<F: GlyphOutliner> TextRenderer for PathTextRenderer<F> {
    fn set_text(&mut self, text: &str) {
        let text = text.to_owned();
        self.layout.invalidate(|inputs| inputs.text = Some(text));
    }

    fn set_bounds(&mut self, bounds: Rect) {
        self.layout.invalidate(|inputs| inputs.bounds = Some(bounds));
    }

    fn set_max_width(&mut self, max_width: f32) {
        // NaN stands for "unset", as in an unconfigured sighting arm
        let max_width = Some(max_width).filter(|width| !width.is_nan());
        self.layout.invalidate(|inputs| inputs.max_width = max_width);
    }

    fn set_foreground(&mut self, color: Color) {
        self.layout.invalidate(|inputs| inputs.foreground = color);
    }

    fn set_background(&mut self, color: Color) {
        self.layout.invalidate(|inputs| inputs.background = color);
    }

    fn max_width(&self) -> Option<f32> {
        self.layout.inputs().max_width
    }

    fn width(&self) -> f32 {
        self.text_bounds().map_or(0.0, |bounds| bounds.width())
    }

    /// Rebuilds the layout if any input changed since the last pass
    fn layout(&mut self) -> Result<()> {
        let (inputs, stale) = match std::mem::take(&mut self.layout) {
            Layout::Dirty { inputs, stale } => (inputs, stale),
            clean @ Layout::Clean { .. } => {
                self.layout = clean;
                return Ok(());
            }
        };

        let geometry = match build_geometry(&self.outliner, &inputs) {
            Ok(Some(geometry)) => geometry,
            Ok(None) => {
                warn!("degenerate text layout, keeping previous geometry");
                match stale {
                    Some(geometry) => geometry,
                    None => Geometry::empty(inputs.bounds.unwrap_or_default()),
                }
            }
            Err(err) => {
                self.layout = Layout::Dirty { inputs, stale };
                return Err(err);
            }
        };
        self.layout = Layout::Clean { inputs, geometry };
        Ok(())
    }

    fn render(&mut self, frame: &mut PixelBuffer, offset: f32) -> Result<()> {
        self.layout()?;
        let Layout::Clean { inputs, geometry } = &mut self.layout else {
            return Ok(());
        };

        let Geometry {
            path,
            path_bounds,
            viewport,
            surface,
        } = geometry;

        // Paint the path into the offscreen surface, vertically centred
        surface.erase();
        let dx = -path_bounds.left - offset;
        let dy = -path_bounds.top + (viewport.height() - path_bounds.height()) / 2.0;
        surface.fill_path(path, dx, dy, inputs.foreground);

        // Backdrop first, then the text layer on top
        frame.fill(inputs.background);
        frame.draw_buffer(surface, viewport.left as isize, viewport.top as isize);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> PathTextRenderer {
        let mut renderer = PathTextRenderer::default();
        renderer.set_text("HELLO");
        renderer.set_bounds(Rect::new(0.0, 0.0, 100.0, 20.0));
        renderer.set_max_width(400.0);
        renderer
    }

    #[test]
    fn render_requires_every_input() {
        let mut frame = PixelBuffer::new(10, 10);

        let mut renderer = PathTextRenderer::default();
        assert!(matches!(renderer.render(&mut frame, 0.0), Err(Error::MissingText)));
        renderer.set_text("A");
        assert!(matches!(renderer.render(&mut frame, 0.0), Err(Error::MissingBounds)));
        renderer.set_bounds(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(matches!(renderer.render(&mut frame, 0.0), Err(Error::MissingMaxWidth)));
        renderer.set_max_width(f32::NAN);
        assert!(matches!(renderer.render(&mut frame, 0.0), Err(Error::MissingMaxWidth)));
        renderer.set_max_width(100.0);
        assert!(renderer.render(&mut frame, 0.0).is_ok());
        assert!(!renderer.is_dirty());
    }

    #[test]
    fn setters_mark_layout_dirty() {
        let mut renderer = configured();
        let mut frame = PixelBuffer::new(100, 20);
        renderer.render(&mut frame, 0.0).unwrap();
        assert!(!renderer.is_dirty());

        renderer.set_foreground(Color::WHITE);
        assert!(renderer.is_dirty());
        renderer.render(&mut frame, 0.0).unwrap();
        renderer.set_text("HI");
        assert!(renderer.is_dirty());
    }

    #[test]
    fn height_fits_bounds_when_uncapped() {
        let mut renderer = configured();
        renderer.layout().unwrap();
        let bounds = renderer.text_bounds().unwrap();
        assert!((bounds.height() - 20.0).abs() < 1e-3);
        assert!(renderer.width() <= 400.0);
    }

    #[test]
    fn width_cap_preserves_aspect() {
        let mut renderer = configured();
        renderer.set_max_width(50.0);
        renderer.layout().unwrap();
        let bounds = renderer.text_bounds().unwrap();
        assert!((bounds.width() - 50.0).abs() < 1e-3);
        assert!(bounds.height() < 20.0);

        let natural = BlockFont::default().text_path("HELLO").bounds().unwrap();
        let ratio = natural.width() / natural.height();
        assert!((bounds.width() / bounds.height() - ratio).abs() < 1e-3);
    }

    #[test]
    fn blank_text_falls_back_to_previous_geometry() {
        let mut renderer = configured();
        renderer.layout().unwrap();
        let width = renderer.width();

        renderer.set_text("   ");
        renderer.layout().unwrap();
        assert!(!renderer.is_dirty());
        assert_eq!(renderer.width(), width);
    }

    #[test]
    fn blank_text_without_history_draws_backdrop() {
        let mut renderer = PathTextRenderer::default();
        renderer.set_text(" ");
        renderer.set_bounds(Rect::new(0.0, 0.0, 4.0, 4.0));
        renderer.set_max_width(10.0);
        let mut frame = PixelBuffer::new(4, 4);
        renderer.render(&mut frame, 0.0).unwrap();
        assert_eq!(renderer.width(), 0.0);
        assert_eq!(frame.pixel(2, 2), Some(BACKGROUND_COLOR));
    }

    #[test]
    fn narrow_text_is_left_anchored() {
        let mut renderer = PathTextRenderer::default();
        renderer.set_text("I");
        renderer.set_bounds(Rect::new(0.0, 0.0, 60.0, 14.0));
        renderer.set_max_width(1000.0);
        let mut frame = PixelBuffer::new(60, 14);
        renderer.render(&mut frame, 0.0).unwrap();

        // Middle bar of the I lands inside the leftmost glyph cell
        let lit = (0..60).filter(|&x| frame.pixel(x, 7) == Some(FOREGROUND_COLOR)).collect::<Vec<_>>();
        assert!(!lit.is_empty());
        assert!(*lit.last().unwrap() < 20);
        assert_eq!(frame.pixel(59, 7), Some(BACKGROUND_COLOR));
    }
}
