use crate::geometry::{Point, Size};
use crate::window_manager::registry::{WindowError, WindowRegistry, MIN_WINDOW_SIZE};

/// Space kept free to the right of a window being resized.
pub const RESIZE_RIGHT_MARGIN: f32 = 20.0;
/// Space kept free below a window being resized.
pub const RESIZE_BOTTOM_MARGIN: f32 = 60.0;

#[derive(Debug, Clone, PartialEq)]
pub enum ResizeState {
    Idle,
    Resizing { window: String, last: Point },
}

/// Grows or shrinks one window at a time from its bottom-right handle.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeController {
    state: ResizeState,
}

impl Default for ResizeController {
    fn default() -> Self {
        Self {
            state: ResizeState::Idle,
        }
    }
}

impl ResizeController {
    pub fn state(&self) -> &ResizeState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, ResizeState::Idle)
    }

    pub fn active_window(&self) -> Option<&str> {
        match &self.state {
            ResizeState::Resizing { window, .. } => Some(window),
            ResizeState::Idle => None,
        }
    }

    pub fn on_pointer_down(
        &mut self,
        registry: &mut WindowRegistry,
        id: &str,
        pointer: Point,
    ) -> Result<(), WindowError> {
        self.cancel();
        if !registry.get(id)?.is_visible() {
            return Err(WindowError::NotVisible(id.to_string()));
        }
        registry.bring_to_front(id)?;
        tracing::debug!(id, "resize started");
        self.state = ResizeState::Resizing {
            window: id.to_string(),
            last: pointer,
        };
        Ok(())
    }

    /// Apply the delta since the previous event. Returns the size written to
    /// the registry.
    pub fn on_pointer_move(
        &mut self,
        registry: &mut WindowRegistry,
        pointer: Point,
    ) -> Result<Option<Size>, WindowError> {
        let ResizeState::Resizing { window, last } = &mut self.state else {
            return Ok(None);
        };
        let delta = pointer.offset_from(*last);
        *last = pointer;
        let window = window.as_str();

        let rect = registry.get(window)?.rect;
        let viewport = registry.viewport();
        let cap = Size::new(
            viewport.width() - rect.left() - RESIZE_RIGHT_MARGIN,
            viewport.height() - rect.top() - RESIZE_BOTTOM_MARGIN,
        );
        let grown = Size::new(rect.size.width + delta.x, rect.size.height + delta.y);
        let size = Size::new(grown.width.min(cap.width), grown.height.min(cap.height))
            .at_least(MIN_WINDOW_SIZE);
        let size = registry.set_size(window, size)?;
        Ok(Some(size))
    }

    pub fn on_pointer_up(&mut self) {
        if let ResizeState::Resizing { window, .. } = &self.state {
            tracing::debug!(id = %window, "resize finished");
        }
        self.state = ResizeState::Idle;
    }

    pub fn cancel(&mut self) {
        self.state = ResizeState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Rect, Viewport};
    use crate::window_manager::registry::{default_windows, DRAWING_WINDOW};

    fn registry() -> WindowRegistry {
        let mut registry =
            WindowRegistry::new(Viewport::new(1200.0, 800.0, 60.0, 40.0), &default_windows());
        registry.open(DRAWING_WINDOW).unwrap();
        registry
            .set_geometry(DRAWING_WINDOW, Rect::new(100.0, 100.0, 600.0, 500.0))
            .unwrap();
        registry
    }

    #[test]
    fn oversized_delta_is_capped_by_viewport() {
        let mut registry = registry();
        let mut resize = ResizeController::default();
        resize
            .on_pointer_down(&mut registry, DRAWING_WINDOW, Point::new(700.0, 600.0))
            .unwrap();
        let size = resize
            .on_pointer_move(&mut registry, Point::new(1700.0, 1600.0))
            .unwrap();
        assert_eq!(size, Some(Size::new(1080.0, 640.0)));
    }

    #[test]
    fn shrinking_stops_at_floor() {
        let mut registry = registry();
        let mut resize = ResizeController::default();
        resize
            .on_pointer_down(&mut registry, DRAWING_WINDOW, Point::new(700.0, 600.0))
            .unwrap();
        let size = resize
            .on_pointer_move(&mut registry, Point::new(0.0, 0.0))
            .unwrap();
        assert_eq!(size, Some(MIN_WINDOW_SIZE));
    }

    #[test]
    fn deltas_are_incremental() {
        let mut registry = registry();
        let mut resize = ResizeController::default();
        resize
            .on_pointer_down(&mut registry, DRAWING_WINDOW, Point::new(700.0, 600.0))
            .unwrap();
        resize
            .on_pointer_move(&mut registry, Point::new(710.0, 605.0))
            .unwrap();
        let size = resize
            .on_pointer_move(&mut registry, Point::new(730.0, 615.0))
            .unwrap();
        assert_eq!(size, Some(Size::new(630.0, 515.0)));
        assert_eq!(
            registry.get(DRAWING_WINDOW).unwrap().rect.origin,
            Point::new(100.0, 100.0)
        );

        resize.on_pointer_up();
        assert_eq!(
            resize
                .on_pointer_move(&mut registry, Point::new(900.0, 900.0))
                .unwrap(),
            None
        );
    }
}
