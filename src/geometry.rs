use serde::{Deserialize, Serialize};

/// A point in viewport or surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset_from(self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Raise each dimension to at least the matching dimension of `floor`.
    pub fn at_least(self, floor: Size) -> Size {
        Size::new(self.width.max(floor.width), self.height.max(floor.height))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn left(&self) -> f32 {
        self.origin.x
    }

    pub fn top(&self) -> f32 {
        self.origin.y
    }

    pub fn right(&self) -> f32 {
        self.origin.x + self.size.width
    }

    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }
}

/// The host viewport together with the bands floating windows may not cover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub size: Size,
    pub header: f32,
    pub footer: f32,
    /// Width kept free on the right when a window is maximized.
    pub side_panel: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32, header: f32, footer: f32) -> Self {
        Self {
            size: Size::new(width, height),
            header,
            footer,
            side_panel: 400.0,
        }
    }

    pub fn with_side_panel(mut self, side_panel: f32) -> Self {
        self.side_panel = side_panel;
        self
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    /// Clamp a window origin so a window of `size` stays between the header
    /// and footer bands and inside the horizontal extent. When the window is
    /// larger than the band the lower bound wins.
    pub fn clamp_origin(&self, origin: Point, size: Size) -> Point {
        let max_x = self.width() - size.width;
        let max_y = self.height() - self.footer - size.height;
        Point::new(
            origin.x.min(max_x).max(0.0),
            origin.y.min(max_y).max(self.header),
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0, 60.0, 40.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_origin_keeps_window_inside_bands() {
        let viewport = Viewport::new(1200.0, 800.0, 60.0, 40.0);
        let size = Size::new(600.0, 500.0);

        assert_eq!(
            viewport.clamp_origin(Point::new(-50.0, 0.0), size),
            Point::new(0.0, 60.0)
        );
        assert_eq!(
            viewport.clamp_origin(Point::new(900.0, 700.0), size),
            Point::new(600.0, 260.0)
        );
    }

    #[test]
    fn oversized_window_pins_to_top_left_of_band() {
        let viewport = Viewport::new(400.0, 300.0, 60.0, 40.0);
        let origin = viewport.clamp_origin(Point::new(50.0, 90.0), Size::new(600.0, 500.0));
        assert_eq!(origin, Point::new(0.0, 60.0));
    }
}
