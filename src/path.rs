/// Axis-aligned rectangle in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Rect {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle of the given size anchored at `(left, top)`
    pub fn from_origin_size(left: f32, top: f32, width: f32, height: f32) -> Self {
        Rect::new(left, top, left + width, top + height)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Maps the rectangle through a uniform scale about the origin
    pub fn scaled(&self, scale: f32) -> Rect {
        Rect::new(
            self.left * scale,
            self.top * scale,
            self.right * scale,
            self.bottom * scale,
        )
    }
}

/// A single drawing command in a path
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    Close,
}

/// Polygonal vector path made of closed contours
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    pub fn new() -> Self {
        Path::default()
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(PathCommand::MoveTo(x, y));
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(PathCommand::LineTo(x, y));
    }

    pub fn close(&mut self) {
        self.commands.push(PathCommand::Close);
    }

    /// Appends an axis-aligned rectangle as a clockwise contour
    pub fn add_rect(&mut self, rect: Rect) {
        self.move_to(rect.left, rect.top);
        self.line_to(rect.right, rect.top);
        self.line_to(rect.right, rect.bottom);
        self.line_to(rect.left, rect.bottom);
        self.close();
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Tight bounding box of every point in the path, `None` when empty
    pub fn bounds(&self) -> Option<Rect> {
        let mut bounds: Option<Rect> = None;
        for command in &self.commands {
            let (x, y) = match *command {
                PathCommand::MoveTo(x, y) | PathCommand::LineTo(x, y) => (x, y),
                PathCommand::Close => continue,
            };
            let point = Rect::new(x, y, x, y);
            bounds = Some(match bounds {
                Some(current) => current.union(&point),
                None => point,
            });
        }
        bounds
    }

    /// Applies a uniform scale about the origin in place
    pub fn scale(&mut self, scale: f32) {
        self.transform(|x, y| (x * scale, y * scale));
    }

    fn transform(&mut self, map: impl Fn(f32, f32) -> (f32, f32)) {
        for command in self.commands.iter_mut() {
            *command = match *command {
                PathCommand::MoveTo(x, y) => {
                    let (x, y) = map(x, y);
                    PathCommand::MoveTo(x, y)
                }
                PathCommand::LineTo(x, y) => {
                    let (x, y) = map(x, y);
                    PathCommand::LineTo(x, y)
                }
                PathCommand::Close => PathCommand::Close,
            };
        }
    }

    /// Flattens the path into directed edges, closing every contour.
    ///
    /// Each edge is `[x0, y0, x1, y1]` offset by `(dx, dy)`.
    pub fn edges(&self, dx: f32, dy: f32) -> Vec<[f32; 4]> {
        let mut edges = Vec::new();
        let mut start: Option<(f32, f32)> = None;
        let mut current: Option<(f32, f32)> = None;

        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(x, y) => {
                    // An unclosed contour is closed implicitly, as a fill would
                    if let (Some(s), Some(c)) = (start, current) {
                        if s != c {
                            edges.push([c.0 + dx, c.1 + dy, s.0 + dx, s.1 + dy]);
                        }
                    }
                    start = Some((x, y));
                    current = Some((x, y));
                }
                PathCommand::LineTo(x, y) => {
                    if let Some(c) = current {
                        edges.push([c.0 + dx, c.1 + dy, x + dx, y + dy]);
                    } else {
                        start = Some((x, y));
                    }
                    current = Some((x, y));
                }
                PathCommand::Close => {
                    if let (Some(s), Some(c)) = (start, current) {
                        if s != c {
                            edges.push([c.0 + dx, c.1 + dy, s.0 + dx, s.1 + dy]);
                        }
                        current = Some(s);
                    }
                }
            }
        }
        if let (Some(s), Some(c)) = (start, current) {
            if s != c {
                edges.push([c.0 + dx, c.1 + dy, s.0 + dx, s.1 + dy]);
            }
        }
        edges
    }
}
