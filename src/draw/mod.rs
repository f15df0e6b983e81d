pub mod canvas;
pub mod coords;
pub mod history;
pub mod model;
pub mod stroke;
pub mod surface;

pub use canvas::{DrawError, DrawingCanvas};
pub use coords::{PointerInput, SurfaceMapping, TouchInput, TouchPhase};
pub use history::{DrawHistory, Snapshot, DEFAULT_HISTORY_CAPACITY};
pub use model::{Color, DrawMode, PenSettings};
