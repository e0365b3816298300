//! Text to vector outline conversion.
//!
//! The renderer only needs a single run of glyph outlines, so the outline
//! source is a small capability trait. [`FontOutliner`] lays text out with a
//! TrueType font through `rusttype`. The built-in [`BlockFont`] turns the
//! classic 5x7 dot-matrix ASCII set into filled rectangles and is used when
//! no font file is given.

use std::path::{Path as FilePath, PathBuf};

use log::debug;
use rusttype::{point, Font, OutlineBuilder, Scale};

use crate::error::{Error, Result};
use crate::path::{Path, Rect};

/// Produces the vector outline of a run of text.
///
/// The outline is laid out on a baseline at `y = 0` with glyphs extending
/// upwards into negative `y`, starting at `x = 0`.
pub trait GlyphOutliner {
    fn text_path(&self, text: &str) -> Path;
}

impl<G: GlyphOutliner + ?Sized> GlyphOutliner for Box<G> {
    fn text_path(&self, text: &str) -> Path {
        (**self).text_path(text)
    }
}

/// Line segments each quadratic or cubic curve is flattened into
const CURVE_SEGMENTS: usize = 8;

/// Collects glyph outlines into a [`Path`], flattening curves.
///
/// Points are shifted by the glyph's pen position before they are stored.
struct PathOutline {
    path: Path,
    origin: (f32, f32),
    current: (f32, f32),
}

impl PathOutline {
    fn new() -> Self {
        PathOutline {
            path: Path::new(),
            origin: (0.0, 0.0),
            current: (0.0, 0.0),
        }
    }

    fn set_origin(&mut self, x: f32, y: f32) {
        self.origin = (x, y);
    }

    fn into_path(self) -> Path {
        self.path
    }

    fn flatten(&mut self, point_at: impl Fn(f32) -> (f32, f32)) {
        for step in 1..=CURVE_SEGMENTS {
            let (x, y) = point_at(step as f32 / CURVE_SEGMENTS as f32);
            self.line_to(x, y);
        }
    }
}

impl OutlineBuilder for PathOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        self.current = (x, y);
        self.path.move_to(x + self.origin.0, y + self.origin.1);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.current = (x, y);
        self.path.line_to(x + self.origin.0, y + self.origin.1);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x0, y0) = self.current;
        self.flatten(|t| {
            let u = 1.0 - t;
            (
                u * u * x0 + 2.0 * u * t * x1 + t * t * x,
                u * u * y0 + 2.0 * u * t * y1 + t * t * y,
            )
        });
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x0, y0) = self.current;
        self.flatten(|t| {
            let u = 1.0 - t;
            let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
            (
                a * x0 + b * x1 + c * x2 + d * x,
                a * y0 + b * y1 + c * y2 + d * y,
            )
        });
    }

    fn close(&mut self) {
        self.path.close();
    }
}

/// Outlines text with a TrueType or OpenType font
pub struct FontOutliner {
    font: Font<'static>,
    scale: Scale,
}

impl std::fmt::Debug for FontOutliner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontOutliner")
            .field("glyphs", &self.font.glyph_count())
            .field("scale", &self.scale)
            .finish()
    }
}

impl FontOutliner {
    /// Parses font data, `None` if it is not a usable font
    pub fn from_bytes(data: Vec<u8>, text_size: f32) -> Option<Self> {
        let font = Font::try_from_vec(data)?;
        Some(FontOutliner {
            font,
            scale: Scale::uniform(text_size),
        })
    }

    pub fn from_file(path: &FilePath) -> Result<Self> {
        let data = std::fs::read(path)?;
        let outliner = FontOutliner::from_bytes(data, DEFAULT_TEXT_SIZE).ok_or_else(|| {
            Error::InvalidFont {
                path: PathBuf::from(path),
            }
        })?;
        debug!(
            "loaded {} glyphs from {}",
            outliner.font.glyph_count(),
            path.display()
        );
        Ok(outliner)
    }
}

impl GlyphOutliner for FontOutliner {
    fn text_path(&self, text: &str) -> Path {
        let mut outline = PathOutline::new();
        for glyph in self.font.layout(text, self.scale, point(0.0, 0.0)) {
            let pen = glyph.position();
            outline.set_origin(pen.x, pen.y);
            // Outlines come back with y pointing down, baseline at zero
            glyph.unpositioned().build_outline(&mut outline);
        }
        outline.into_path()
    }
}

/// Number of pixel rows in a glyph
const GLYPH_ROWS: usize = 7;
/// Number of pixel columns in a glyph
const GLYPH_COLUMNS: usize = 5;
/// Horizontal advance per glyph, in dots, including one dot of spacing
const GLYPH_ADVANCE: f32 = 6.0;
/// Text size the outline is produced at
pub const DEFAULT_TEXT_SIZE: f32 = 100.0;

/// Column bitmaps for printable ASCII, bit 0 is the top row
const GLYPHS: [[u8; GLYPH_COLUMNS]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00], // !
    [0x00, 0x07, 0x00, 0x07, 0x00], // "
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // $
    [0x23, 0x13, 0x08, 0x64, 0x62], // %
    [0x36, 0x49, 0x55, 0x22, 0x50], // &
    [0x00, 0x05, 0x03, 0x00, 0x00], // '
    [0x00, 0x1C, 0x22, 0x41, 0x00], // (
    [0x00, 0x41, 0x22, 0x1C, 0x00], // )
    [0x14, 0x08, 0x3E, 0x08, 0x14], // *
    [0x08, 0x08, 0x3E, 0x08, 0x08], // +
    [0x00, 0x50, 0x30, 0x00, 0x00], // ,
    [0x08, 0x08, 0x08, 0x08, 0x08], // -
    [0x00, 0x60, 0x60, 0x00, 0x00], // .
    [0x20, 0x10, 0x08, 0x04, 0x02], // /
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // 0
    [0x00, 0x42, 0x7F, 0x40, 0x00], // 1
    [0x42, 0x61, 0x51, 0x49, 0x46], // 2
    [0x21, 0x41, 0x45, 0x4B, 0x31], // 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], // 4
    [0x27, 0x45, 0x45, 0x45, 0x39], // 5
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // 6
    [0x01, 0x71, 0x09, 0x05, 0x03], // 7
    [0x36, 0x49, 0x49, 0x49, 0x36], // 8
    [0x06, 0x49, 0x49, 0x29, 0x1E], // 9
    [0x00, 0x36, 0x36, 0x00, 0x00], // :
    [0x00, 0x56, 0x36, 0x00, 0x00], // ;
    [0x08, 0x14, 0x22, 0x41, 0x00], // <
    [0x14, 0x14, 0x14, 0x14, 0x14], // =
    [0x00, 0x41, 0x22, 0x14, 0x08], // >
    [0x02, 0x01, 0x51, 0x09, 0x06], // ?
    [0x32, 0x49, 0x79, 0x41, 0x3E], // @
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // A
    [0x7F, 0x49, 0x49, 0x49, 0x36], // B
    [0x3E, 0x41, 0x41, 0x41, 0x22], // C
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // D
    [0x7F, 0x49, 0x49, 0x49, 0x41], // E
    [0x7F, 0x09, 0x09, 0x01, 0x01], // F
    [0x3E, 0x41, 0x41, 0x51, 0x32], // G
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // H
    [0x00, 0x41, 0x7F, 0x41, 0x00], // I
    [0x20, 0x40, 0x41, 0x3F, 0x01], // J
    [0x7F, 0x08, 0x14, 0x22, 0x41], // K
    [0x7F, 0x40, 0x40, 0x40, 0x40], // L
    [0x7F, 0x02, 0x04, 0x02, 0x7F], // M
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // N
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // O
    [0x7F, 0x09, 0x09, 0x09, 0x06], // P
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // Q
    [0x7F, 0x09, 0x19, 0x29, 0x46], // R
    [0x46, 0x49, 0x49, 0x49, 0x31], // S
    [0x01, 0x01, 0x7F, 0x01, 0x01], // T
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // U
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // V
    [0x7F, 0x20, 0x18, 0x20, 0x7F], // W
    [0x63, 0x14, 0x08, 0x14, 0x63], // X
    [0x03, 0x04, 0x78, 0x04, 0x03], // Y
    [0x61, 0x51, 0x49, 0x45, 0x43], // Z
    [0x00, 0x00, 0x7F, 0x41, 0x41], // [
    [0x02, 0x04, 0x08, 0x10, 0x20], // \
    [0x41, 0x41, 0x7F, 0x00, 0x00], // ]
    [0x04, 0x02, 0x01, 0x02, 0x04], // ^
    [0x40, 0x40, 0x40, 0x40, 0x40], // _
    [0x00, 0x01, 0x02, 0x04, 0x00], // `
    [0x20, 0x54, 0x54, 0x54, 0x78], // a
    [0x7F, 0x48, 0x44, 0x44, 0x38], // b
    [0x38, 0x44, 0x44, 0x44, 0x20], // c
    [0x38, 0x44, 0x44, 0x48, 0x7F], // d
    [0x38, 0x54, 0x54, 0x54, 0x18], // e
    [0x08, 0x7E, 0x09, 0x01, 0x02], // f
    [0x08, 0x14, 0x54, 0x54, 0x3C], // g
    [0x7F, 0x08, 0x04, 0x04, 0x78], // h
    [0x00, 0x44, 0x7D, 0x40, 0x00], // i
    [0x20, 0x40, 0x44, 0x3D, 0x00], // j
    [0x00, 0x7F, 0x10, 0x28, 0x44], // k
    [0x00, 0x41, 0x7F, 0x40, 0x00], // l
    [0x7C, 0x04, 0x18, 0x04, 0x78], // m
    [0x7C, 0x08, 0x04, 0x04, 0x78], // n
    [0x38, 0x44, 0x44, 0x44, 0x38], // o
    [0x7C, 0x14, 0x14, 0x14, 0x08], // p
    [0x08, 0x14, 0x14, 0x18, 0x7C], // q
    [0x7C, 0x08, 0x04, 0x04, 0x08], // r
    [0x48, 0x54, 0x54, 0x54, 0x20], // s
    [0x04, 0x3F, 0x44, 0x40, 0x20], // t
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // u
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // v
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // w
    [0x44, 0x28, 0x10, 0x28, 0x44], // x
    [0x0C, 0x50, 0x50, 0x50, 0x3C], // y
    [0x44, 0x64, 0x54, 0x4C, 0x44], // z
    [0x00, 0x08, 0x36, 0x41, 0x00], // {
    [0x00, 0x00, 0x7F, 0x00, 0x00], // |
    [0x00, 0x41, 0x36, 0x08, 0x00], // }
    [0x02, 0x01, 0x02, 0x04, 0x02], // ~
];

/// Drawn for characters outside printable ASCII
const MISSING_GLYPH: [u8; GLYPH_COLUMNS] = [0x7F, 0x41, 0x41, 0x41, 0x7F];

/// Dot-matrix outline font rendered as filled rectangles
#[derive(Debug, Clone, Copy)]
pub struct BlockFont {
    text_size: f32,
    /// Horizontal widening of every dot, as a fraction of a dot
    embolden: f32,
}

impl Default for BlockFont {
    fn default() -> Self {
        BlockFont {
            text_size: DEFAULT_TEXT_SIZE,
            embolden: 0.2,
        }
    }
}

impl BlockFont {
    pub fn new(text_size: f32) -> Self {
        BlockFont {
            text_size,
            ..BlockFont::default()
        }
    }

    /// Size of one dot; cap height spans seven dots out of a ten dot em
    fn dot(&self) -> f32 {
        self.text_size / 10.0
    }

    fn glyph(c: char) -> &'static [u8; GLYPH_COLUMNS] {
        let code = c as u32;
        if (0x20..0x7F).contains(&code) {
            &GLYPHS[(code - 0x20) as usize]
        } else {
            &MISSING_GLYPH
        }
    }
}

impl GlyphOutliner for BlockFont {
    fn text_path(&self, text: &str) -> Path {
        let dot = self.dot();
        let grow = self.embolden * dot / 2.0;
        let top = -(GLYPH_ROWS as f32) * dot;
        let mut path = Path::new();

        for (index, c) in text.chars().enumerate() {
            let origin = index as f32 * GLYPH_ADVANCE * dot;
            for (column, bits) in Self::glyph(c).iter().enumerate() {
                let left = origin + column as f32 * dot - grow;
                let right = origin + (column + 1) as f32 * dot + grow;

                // Merge vertical runs of set bits into a single rectangle
                let mut row = 0;
                while row < GLYPH_ROWS {
                    if bits & (1 << row) == 0 {
                        row += 1;
                        continue;
                    }
                    let start = row;
                    while row < GLYPH_ROWS && bits & (1 << row) != 0 {
                        row += 1;
                    }
                    path.add_rect(Rect::new(
                        left,
                        top + start as f32 * dot,
                        right,
                        top + row as f32 * dot,
                    ));
                }
            }
        }
        path
    }
}
