use crate::geometry::Point;
use crate::window_manager::drag::DragController;
use crate::window_manager::registry::{WindowError, WindowRegistry};
use crate::window_manager::resize::ResizeController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize,
}

/// Owns both window controllers so that only one gesture is live at a time.
/// Starting either kind cancels whatever was active.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureController {
    drag: DragController,
    resize: ResizeController,
}

impl GestureController {
    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn resize(&self) -> &ResizeController {
        &self.resize
    }

    pub fn active(&self) -> Option<(GestureKind, &str)> {
        if let Some(id) = self.drag.active_window() {
            return Some((GestureKind::Drag, id));
        }
        self.resize
            .active_window()
            .map(|id| (GestureKind::Resize, id))
    }

    pub fn is_active(&self) -> bool {
        self.drag.is_active() || self.resize.is_active()
    }

    pub fn start_drag(
        &mut self,
        registry: &mut WindowRegistry,
        id: &str,
        pointer: Point,
    ) -> Result<(), WindowError> {
        self.resize.cancel();
        self.drag.on_pointer_down(registry, id, pointer)
    }

    pub fn start_resize(
        &mut self,
        registry: &mut WindowRegistry,
        id: &str,
        pointer: Point,
    ) -> Result<(), WindowError> {
        self.drag.cancel();
        self.resize.on_pointer_down(registry, id, pointer)
    }

    pub fn on_pointer_move(
        &mut self,
        registry: &mut WindowRegistry,
        pointer: Point,
    ) -> Result<(), WindowError> {
        if self.drag.is_active() {
            self.drag.on_pointer_move(registry, pointer)?;
        } else if self.resize.is_active() {
            self.resize.on_pointer_move(registry, pointer)?;
        }
        Ok(())
    }

    /// Pointer released or left the tracked area.
    pub fn on_pointer_up(&mut self) {
        self.drag.on_pointer_up();
        self.resize.on_pointer_up();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Viewport;
    use crate::window_manager::registry::{default_windows, AI_WINDOW, DRAWING_WINDOW};

    fn registry() -> WindowRegistry {
        let mut registry = WindowRegistry::new(Viewport::default(), &default_windows());
        registry.open(AI_WINDOW).unwrap();
        registry.open(DRAWING_WINDOW).unwrap();
        registry
    }

    #[test]
    fn resize_start_cancels_drag() {
        let mut registry = registry();
        let mut gestures = GestureController::default();
        gestures
            .start_drag(&mut registry, AI_WINDOW, Point::new(310.0, 220.0))
            .unwrap();
        gestures
            .start_resize(&mut registry, DRAWING_WINDOW, Point::new(700.0, 610.0))
            .unwrap();

        assert_eq!(gestures.active(), Some((GestureKind::Resize, DRAWING_WINDOW)));
        assert!(!gestures.drag().is_active());

        let ai_before = registry.get(AI_WINDOW).unwrap().rect;
        gestures
            .on_pointer_move(&mut registry, Point::new(720.0, 630.0))
            .unwrap();
        assert_eq!(registry.get(AI_WINDOW).unwrap().rect, ai_before);

        gestures.on_pointer_up();
        assert_eq!(gestures.active(), None);
    }

    #[test]
    fn failed_start_leaves_no_gesture() {
        let mut registry = registry();
        let mut gestures = GestureController::default();
        gestures
            .start_drag(&mut registry, AI_WINDOW, Point::new(310.0, 220.0))
            .unwrap();
        assert!(gestures
            .start_resize(&mut registry, "missing", Point::new(0.0, 0.0))
            .is_err());
        assert!(!gestures.is_active());
    }
}
