//! Floating windows: registry, drag and resize gestures, and the tray of
//! minimized windows.

pub mod drag;
pub mod gesture;
pub mod registry;
pub mod resize;
pub mod tray;

pub use gesture::{GestureController, GestureKind};
pub use registry::{
    default_windows, ResizeObserver, Visibility, Window, WindowError, WindowRegistry,
    WindowSpec, AI_WINDOW, DRAWING_WINDOW, PDF_WINDOW,
};
