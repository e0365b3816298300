// Rendering behaviour of the path text renderer and the renderer seam.

use tiltscroll::haptics::NoVibrator;
use tiltscroll::{
    Color, PathTextRenderer, PixelBuffer, Rect, ScrollConfig, TextRenderer, TextScroller,
};

fn renderer(text: &str, width: f32, height: f32, max_width: f32) -> PathTextRenderer {
    let mut renderer = PathTextRenderer::default();
    renderer.set_text(text);
    renderer.set_bounds(Rect::new(0.0, 0.0, width, height));
    renderer.set_max_width(max_width);
    renderer
}

#[test]
fn same_offset_renders_identical_frames() {
    let mut renderer = renderer("HELLO", 200.0, 40.0, 800.0);
    let mut first = PixelBuffer::new(200, 40);
    let mut second = PixelBuffer::new(200, 40);

    renderer.render(&mut first, 12.5).unwrap();
    renderer.render(&mut second, 12.5).unwrap();
    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[test]
fn offset_change_reuses_layout() {
    let mut renderer = renderer("HELLO", 200.0, 40.0, 800.0);
    let mut frame = PixelBuffer::new(200, 40);
    renderer.render(&mut frame, 0.0).unwrap();
    let before = frame.clone();
    let bounds = renderer.text_bounds();

    renderer.render(&mut frame, 60.0).unwrap();
    assert!(!renderer.is_dirty());
    assert_eq!(renderer.text_bounds(), bounds);
    assert_ne!(frame, before);
}

#[test]
fn scaled_text_respects_bounds_and_cap() {
    let cases = [
        ("HELLO", 1000.0, 200.0, 4000.0),
        ("HELLO", 1000.0, 200.0, 300.0),
        ("a much longer line of text", 320.0, 48.0, 201.0),
        ("I", 50.0, 30.0, 1000.0),
        ("Wg!", 80.0, 17.0, 500.0),
    ];
    for (text, width, height, max_width) in cases {
        let mut renderer = renderer(text, width, height, max_width);
        renderer.layout().unwrap();
        let bounds = renderer.text_bounds().unwrap();

        assert!(bounds.width() <= max_width + 1e-3, "{text}: {bounds:?}");
        assert!(bounds.height() <= height + 1.0, "{text}: {bounds:?}");
        let capped = (bounds.width() - max_width).abs() < 1e-3;
        if !capped {
            assert!((bounds.height() - height).abs() <= 1.0, "{text}: {bounds:?}");
        }
    }
}

#[test]
fn frame_has_backdrop_outside_viewport() {
    let mut renderer = PathTextRenderer::default();
    renderer.set_text("HELLO");
    renderer.set_bounds(Rect::new(0.0, 3.0, 60.0, 17.0));
    renderer.set_max_width(1000.0);
    renderer.set_foreground(Color::WHITE);
    renderer.set_background(Color::BLACK);

    let mut frame = PixelBuffer::new(60, 20);
    renderer.render(&mut frame, -5.0).unwrap();

    for x in 0..60 {
        assert_eq!(frame.pixel(x, 0), Some(Color::BLACK));
        assert_eq!(frame.pixel(x, 19), Some(Color::BLACK));
    }
    // Text starts five pixels in when scrolled back by five
    for y in 3..17 {
        assert_eq!(frame.pixel(2, y), Some(Color::BLACK));
    }
    assert!((3..17).any(|y| frame.pixel(5, y) == Some(Color::WHITE)));
}

/// Renderer standing in for the path renderer
#[derive(Default)]
struct FixedWidthRenderer {
    text: Option<String>,
    bounds: Option<Rect>,
    max_width: Option<f32>,
    renders: Vec<f32>,
}

impl TextRenderer for FixedWidthRenderer {
    fn set_text(&mut self, text: &str) {
        self.text = Some(text.to_owned());
    }

    fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
    }

    fn set_max_width(&mut self, max_width: f32) {
        self.max_width = Some(max_width);
    }

    fn set_foreground(&mut self, _color: Color) {}

    fn set_background(&mut self, _color: Color) {}

    fn max_width(&self) -> Option<f32> {
        self.max_width
    }

    fn width(&self) -> f32 {
        600.0
    }

    fn render(&mut self, _frame: &mut PixelBuffer, offset: f32) -> tiltscroll::Result<()> {
        self.renders.push(offset);
        Ok(())
    }
}

#[test]
fn scroller_drives_any_renderer() {
    let config = ScrollConfig {
        arm_length_inches: 10.0,
        display_density: 100.0,
        ..ScrollConfig::default()
    };
    let mut scroller = TextScroller::new(FixedWidthRenderer::default(), NoVibrator, "HEY", config);
    scroller.resize(400, 50);
    assert_eq!(scroller.renderer().text.as_deref(), Some("HEY"));
    assert_eq!(scroller.renderer().bounds, Some(Rect::new(0.0, 0.0, 400.0, 50.0)));

    let span = scroller.metrics().angular_span();
    let expected = tiltscroll::physics::MAX_ANGULAR_WIDTH * 1000.0 / config.max_text_width() as f64;
    assert!((span - expected).abs() < 1e-6);

    scroller.move_to(span);
    let mut frame = PixelBuffer::new(400, 50);
    scroller.render(&mut frame).unwrap();
    assert_eq!(scroller.renderer().renders, vec![400.0]);
}
