use crate::path::Path;

/// RGBA color, 8 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb8(0, 0, 0);
    pub const WHITE: Color = Color::rgb8(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba8(0, 0, 0, 0);

    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    pub fn as_rgba8(&self) -> (u8, u8, u8, u8) {
        (self.r, self.g, self.b, self.a)
    }

    /// Source-over blend of `self` onto `dst`
    fn over(self, dst: Color) -> Color {
        match self.a {
            0 => dst,
            255 => self,
            a => {
                let a = a as u32;
                let inv = 255 - a;
                let blend = |s: u8, d: u8| ((s as u32 * a + d as u32 * inv + 127) / 255) as u8;
                Color::rgba8(
                    blend(self.r, dst.r),
                    blend(self.g, dst.g),
                    blend(self.b, dst.b),
                    (a + (dst.a as u32 * inv + 127) / 255).min(255) as u8,
                )
            }
        }
    }
}

/// Owned RGBA pixel buffer, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixel_data: Vec<u8>,
}

impl PixelBuffer {
    /// Creates a fully transparent buffer
    pub fn new(width: usize, height: usize) -> Self {
        PixelBuffer {
            width,
            height,
            pixel_data: vec![0u8; width * height * 4],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixel_data
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y * self.width + x) * 4;
        let p = &self.pixel_data[offset..offset + 4];
        Some(Color::rgba8(p[0], p[1], p[2], p[3]))
    }

    fn set_pixel(&mut self, offset: usize, color: Color) {
        let pixel_offset = offset * 4;
        let (r, g, b, a) = color.as_rgba8();
        self.pixel_data[pixel_offset] = r;
        self.pixel_data[pixel_offset + 1] = g;
        self.pixel_data[pixel_offset + 2] = b;
        self.pixel_data[pixel_offset + 3] = a;
    }

    /// Overwrites every pixel with `color`
    pub fn fill(&mut self, color: Color) {
        let (r, g, b, a) = color.as_rgba8();
        for pixel in self.pixel_data.chunks_exact_mut(4) {
            pixel.copy_from_slice(&[r, g, b, a]);
        }
    }

    /// Resets the buffer to transparent
    pub fn erase(&mut self) {
        self.fill(Color::TRANSPARENT);
    }

    /// Fills `path` translated by `(dx, dy)` using the non-zero winding rule.
    ///
    /// Coverage is sampled once at each pixel centre, so the output only
    /// depends on the geometry and never on previous contents.
    pub fn fill_path(&mut self, path: &Path, dx: f32, dy: f32, color: Color) {
        let edges = path.edges(dx, dy);
        if edges.is_empty() || self.width == 0 || self.height == 0 {
            return;
        }

        // Only scan rows the path can touch
        let (min_y, max_y) = edges.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |acc, e| {
            (acc.0.min(e[1]).min(e[3]), acc.1.max(e[1]).max(e[3]))
        });
        let first_row = (min_y - 0.5).ceil().max(0.0) as usize;
        let last_row = ((max_y - 0.5).floor().min(self.height as f32 - 1.0)).max(-1.0);
        if last_row < 0.0 {
            return;
        }
        let last_row = last_row as usize;

        let mut crossings: Vec<(f32, i32)> = Vec::new();
        for y in first_row..=last_row {
            let sample_y = y as f32 + 0.5;
            crossings.clear();

            for &[x0, y0, x1, y1] in &edges {
                // Half-open span so shared vertices are counted once
                let winding = if y0 <= sample_y && sample_y < y1 {
                    1
                } else if y1 <= sample_y && sample_y < y0 {
                    -1
                } else {
                    continue;
                };
                let t = (sample_y - y0) / (y1 - y0);
                crossings.push((x0 + t * (x1 - x0), winding));
            }
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                if winding == 0 {
                    continue;
                }
                let start = (pair[0].0 - 0.5).ceil().max(0.0) as usize;
                let end = ((pair[1].0 - 0.5).ceil().min(self.width as f32)).max(0.0) as usize;
                for x in start..end {
                    self.set_pixel(y * self.width + x, color);
                }
            }
        }
    }

    /// Composites `src` onto this buffer with its top-left corner at
    /// `(left, top)`, clipping to both buffers.
    pub fn draw_buffer(&mut self, src: &PixelBuffer, left: isize, top: isize) {
        for sy in 0..src.height {
            let dy = top + sy as isize;
            if dy < 0 || dy >= self.height as isize {
                continue;
            }
            for sx in 0..src.width {
                let dx = left + sx as isize;
                if dx < 0 || dx >= self.width as isize {
                    continue;
                }
                let offset = dy as usize * self.width + dx as usize;
                let (Some(color), Some(dst)) = (src.pixel(sx, sy), self.pixel(dx as usize, dy as usize))
                else {
                    continue;
                };
                self.set_pixel(offset, color.over(dst));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Rect;

    #[test]
    fn fill_covers_pixel_centres_inside_rect() {
        let mut buffer = PixelBuffer::new(6, 6);
        let mut path = Path::new();
        path.add_rect(Rect::new(1.0, 1.0, 4.0, 3.0));
        buffer.fill_path(&path, 0.0, 0.0, Color::BLACK);

        assert_eq!(buffer.pixel(1, 1), Some(Color::BLACK));
        assert_eq!(buffer.pixel(3, 2), Some(Color::BLACK));
        assert_eq!(buffer.pixel(4, 2), Some(Color::TRANSPARENT));
        assert_eq!(buffer.pixel(1, 3), Some(Color::TRANSPARENT));
        assert_eq!(buffer.pixel(0, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn translation_moves_coverage_and_clips() {
        let mut buffer = PixelBuffer::new(4, 4);
        let mut path = Path::new();
        path.add_rect(Rect::new(0.0, 0.0, 3.0, 3.0));
        buffer.fill_path(&path, -2.0, 2.0, Color::WHITE);

        assert_eq!(buffer.pixel(0, 2), Some(Color::WHITE));
        assert_eq!(buffer.pixel(1, 2), Some(Color::TRANSPARENT));
        assert_eq!(buffer.pixel(0, 1), Some(Color::TRANSPARENT));
    }

    #[test]
    fn overlapping_contours_fill_once() {
        let mut buffer = PixelBuffer::new(5, 1);
        let mut path = Path::new();
        path.add_rect(Rect::new(0.0, 0.0, 3.0, 1.0));
        path.add_rect(Rect::new(2.0, 0.0, 4.0, 1.0));
        buffer.fill_path(&path, 0.0, 0.0, Color::BLACK);

        for x in 0..4 {
            assert_eq!(buffer.pixel(x, 0), Some(Color::BLACK));
        }
        assert_eq!(buffer.pixel(4, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn transparent_source_keeps_backdrop() {
        let mut frame = PixelBuffer::new(3, 3);
        frame.fill(Color::WHITE);
        let mut layer = PixelBuffer::new(2, 2);
        layer.erase();
        let mut dot = Path::new();
        dot.add_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        layer.fill_path(&dot, 0.0, 0.0, Color::BLACK);

        frame.draw_buffer(&layer, 1, 1);
        assert_eq!(frame.pixel(1, 1), Some(Color::BLACK));
        assert_eq!(frame.pixel(2, 2), Some(Color::WHITE));
        assert_eq!(frame.pixel(0, 0), Some(Color::WHITE));
    }
}
