use crate::geometry::Point;
use crate::window_manager::registry::{WindowError, WindowRegistry};

#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    Dragging {
        window: String,
        /// Pointer position relative to the window origin at grab time.
        offset: Point,
    },
}

/// Moves one window at a time with the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct DragController {
    state: DragState,
}

impl Default for DragController {
    fn default() -> Self {
        Self {
            state: DragState::Idle,
        }
    }
}

impl DragController {
    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    pub fn active_window(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging { window, .. } => Some(window),
            DragState::Idle => None,
        }
    }

    /// Grab `id` by its drag handle. Any previous drag is dropped first.
    pub fn on_pointer_down(
        &mut self,
        registry: &mut WindowRegistry,
        id: &str,
        pointer: Point,
    ) -> Result<(), WindowError> {
        self.cancel();
        let window = registry.get(id)?;
        if !window.is_visible() {
            return Err(WindowError::NotVisible(id.to_string()));
        }
        let offset = pointer.offset_from(window.rect.origin);
        registry.bring_to_front(id)?;
        tracing::debug!(id, "drag started");
        self.state = DragState::Dragging {
            window: id.to_string(),
            offset,
        };
        Ok(())
    }

    /// Follow the pointer. Returns the clamped origin written to the registry.
    pub fn on_pointer_move(
        &mut self,
        registry: &mut WindowRegistry,
        pointer: Point,
    ) -> Result<Option<Point>, WindowError> {
        let DragState::Dragging { window, offset } = &self.state else {
            return Ok(None);
        };
        let target = pointer.offset_from(*offset);
        let origin = registry.set_position(window, target)?;
        Ok(Some(origin))
    }

    pub fn on_pointer_up(&mut self) {
        if let DragState::Dragging { window, .. } = &self.state {
            tracing::debug!(id = %window, "drag finished");
        }
        self.state = DragState::Idle;
    }

    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}
