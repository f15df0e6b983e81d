use crate::geometry::{Point, Rect, Size};

/// Device-agnostic pointer input delivered to the canvas and the window
/// controllers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Down(Point),
    Move(Point),
    Up,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TouchInput {
    pub phase: TouchPhase,
    pub touches: Vec<Point>,
}

impl TouchInput {
    /// Translate a touch event into the pointer event a mouse would have
    /// produced. Only the first touch is tracked.
    pub fn to_pointer(&self) -> Option<PointerInput> {
        match self.phase {
            TouchPhase::Start => self.touches.first().map(|p| PointerInput::Down(*p)),
            TouchPhase::Move => self.touches.first().map(|p| PointerInput::Move(*p)),
            TouchPhase::End => Some(PointerInput::Up),
        }
    }
}

/// Relation between where the surface is displayed and its backing store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMapping {
    pub displayed: Rect,
    pub backing: Size,
}

impl SurfaceMapping {
    pub fn new(displayed: Rect, backing: Size) -> Self {
        Self { displayed, backing }
    }

    pub fn scale(&self) -> (f32, f32) {
        let ratio = |backing: f32, shown: f32| if shown > 0.0 { backing / shown } else { 1.0 };
        (
            ratio(self.backing.width, self.displayed.size.width),
            ratio(self.backing.height, self.displayed.size.height),
        )
    }

    /// Map viewport coordinates into surface coordinates.
    pub fn map(&self, viewport: Point) -> Point {
        let (sx, sy) = self.scale();
        let local = viewport.offset_from(self.displayed.origin);
        Point::new(local.x * sx, local.y * sy)
    }

    pub fn map_input(&self, input: PointerInput) -> PointerInput {
        match input {
            PointerInput::Down(p) => PointerInput::Down(self.map(p)),
            PointerInput::Move(p) => PointerInput::Move(self.map(p)),
            other => other,
        }
    }
}
