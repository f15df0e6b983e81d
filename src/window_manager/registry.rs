use crate::geometry::{Point, Rect, Size, Viewport};

pub const MIN_WINDOW_SIZE: Size = Size::new(300.0, 200.0);
pub const DEFAULT_WINDOW_SIZE: Size = Size::new(600.0, 500.0);
/// Geometry used when un-maximizing a window that never had a saved one.
pub const DEFAULT_RESTORE_RECT: Rect = Rect::new(200.0, 150.0, 600.0, 500.0);
pub const FIRST_Z_ORDER: u32 = 500;

/// Margin kept around a maximized window and when refitting after a viewport
/// change.
const EDGE_GAP: f32 = 20.0;

pub const DRAWING_WINDOW: &str = "drawing";
pub const PDF_WINDOW: &str = "pdf";
pub const AI_WINDOW: &str = "ai";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Minimized,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaximizeState {
    Normal,
    Maximized { saved: Option<Rect> },
}

/// Static description of a window known at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub id: &'static str,
    pub title: &'static str,
    pub hosts_surface: bool,
}

pub fn default_windows() -> Vec<WindowSpec> {
    vec![
        WindowSpec {
            id: DRAWING_WINDOW,
            title: "Drawing Canvas",
            hosts_surface: true,
        },
        WindowSpec {
            id: PDF_WINDOW,
            title: "PDF Viewer",
            hosts_surface: false,
        },
        WindowSpec {
            id: AI_WINDOW,
            title: "AI Assistant",
            hosts_surface: false,
        },
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub id: String,
    pub title: String,
    pub rect: Rect,
    pub z: u32,
    pub visibility: Visibility,
    pub maximize: MaximizeState,
    /// Resizes of this window are forwarded to [`ResizeObserver`]s.
    pub hosts_surface: bool,
    minimized_seq: Option<u64>,
}

impl Window {
    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    pub fn is_maximized(&self) -> bool {
        matches!(self.maximize, MaximizeState::Maximized { .. })
    }

    pub(crate) fn minimized_seq(&self) -> Option<u64> {
        self.minimized_seq
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    UnknownWindow(String),
    NotVisible(String),
}

impl std::fmt::Display for WindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowError::UnknownWindow(id) => write!(f, "no window with id '{id}'"),
            WindowError::NotVisible(id) => write!(f, "window '{id}' is not visible"),
        }
    }
}

impl std::error::Error for WindowError {}

/// Notified when a surface-hosting window changes size.
pub trait ResizeObserver {
    fn window_resized(&mut self, id: &str, size: Size);
}

/// Source of z-order values. Values are handed out once, in increasing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZOrderPool {
    next: u32,
}

impl ZOrderPool {
    pub fn starting_at(first: u32) -> Self {
        Self { next: first }
    }

    pub fn issue(&mut self) -> u32 {
        let z = self.next;
        self.next = self.next.saturating_add(1);
        z
    }

    pub fn peek(&self) -> u32 {
        self.next
    }
}

pub struct WindowRegistry {
    windows: Vec<Window>,
    viewport: Viewport,
    z_pool: ZOrderPool,
    minimize_counter: u64,
    observers: Vec<Box<dyn ResizeObserver>>,
}

impl WindowRegistry {
    /// Lay out `specs` in a cascade below the header. All windows start closed.
    pub fn new(viewport: Viewport, specs: &[WindowSpec]) -> Self {
        let mut z_pool = ZOrderPool::starting_at(FIRST_Z_ORDER);
        let windows = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let step = i as f32;
                Window {
                    id: spec.id.to_string(),
                    title: spec.title.to_string(),
                    rect: Rect {
                        origin: Point::new(100.0 + 100.0 * step, viewport.header + 50.0 + 50.0 * step),
                        size: DEFAULT_WINDOW_SIZE,
                    },
                    z: z_pool.issue(),
                    visibility: Visibility::Closed,
                    maximize: MaximizeState::Normal,
                    hosts_surface: spec.hosts_surface,
                    minimized_seq: None,
                }
            })
            .collect();
        tracing::info!(count = specs.len(), "window management initialised");
        Self {
            windows,
            viewport,
            z_pool,
            minimize_counter: 0,
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn ResizeObserver>) {
        self.observers.push(observer);
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    /// Windows sorted back to front.
    pub fn stacking_order(&self) -> Vec<&Window> {
        let mut sorted: Vec<&Window> = self.windows.iter().collect();
        sorted.sort_by_key(|w| w.z);
        sorted
    }

    pub fn get(&self, id: &str) -> Result<&Window, WindowError> {
        self.windows.iter().find(|w| w.id == id).ok_or_else(|| {
            tracing::error!(id, "window not found");
            WindowError::UnknownWindow(id.to_string())
        })
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Window, WindowError> {
        self.windows.iter_mut().find(|w| w.id == id).ok_or_else(|| {
            tracing::error!(id, "window not found");
            WindowError::UnknownWindow(id.to_string())
        })
    }

    pub fn bring_to_front(&mut self, id: &str) -> Result<u32, WindowError> {
        let z = self.z_pool.peek();
        let window = self.get_mut(id)?;
        window.z = z;
        self.z_pool.issue();
        Ok(z)
    }

    /// Bring a visible window to the front. Hidden windows are left alone.
    pub fn focus(&mut self, id: &str) -> Result<bool, WindowError> {
        if !self.get(id)?.is_visible() {
            return Ok(false);
        }
        self.bring_to_front(id)?;
        Ok(true)
    }

    /// Show a window and raise it.
    pub fn open(&mut self, id: &str) -> Result<(), WindowError> {
        let window = self.get_mut(id)?;
        window.visibility = Visibility::Visible;
        window.minimized_seq = None;
        self.bring_to_front(id)?;
        tracing::debug!(id, "window opened");
        Ok(())
    }

    /// Floor the size and clamp the origin into the viewport bands.
    pub fn set_geometry(&mut self, id: &str, rect: Rect) -> Result<Rect, WindowError> {
        let size = rect.size.at_least(MIN_WINDOW_SIZE);
        let origin = self.viewport.clamp_origin(rect.origin, size);
        self.apply_rect(id, Rect { origin, size })
    }

    /// Move a window, keeping its size, clamped into the viewport bands.
    pub fn set_position(&mut self, id: &str, origin: Point) -> Result<Point, WindowError> {
        let size = self.get(id)?.rect.size;
        let origin = self.viewport.clamp_origin(origin, size);
        self.get_mut(id)?.rect.origin = origin;
        Ok(origin)
    }

    /// Set the size without touching the origin. Only the minimum floor is
    /// enforced here; callers own any viewport cap.
    pub fn set_size(&mut self, id: &str, size: Size) -> Result<Size, WindowError> {
        let origin = self.get(id)?.rect.origin;
        let rect = self.apply_rect(
            id,
            Rect {
                origin,
                size: size.at_least(MIN_WINDOW_SIZE),
            },
        )?;
        Ok(rect.size)
    }

    fn apply_rect(&mut self, id: &str, rect: Rect) -> Result<Rect, WindowError> {
        let window = self.get_mut(id)?;
        let resized = window.rect.size != rect.size;
        window.rect = rect;
        let notify = resized && window.hosts_surface;
        if notify {
            for observer in &mut self.observers {
                observer.window_resized(id, rect.size);
            }
        }
        Ok(rect)
    }

    pub fn minimize(&mut self, id: &str) -> Result<(), WindowError> {
        let seq = self.minimize_counter + 1;
        let window = self.get_mut(id)?;
        window.visibility = Visibility::Minimized;
        window.minimized_seq = Some(seq);
        self.minimize_counter = seq;
        tracing::debug!(id, "window minimized");
        Ok(())
    }

    pub fn restore(&mut self, id: &str) -> Result<(), WindowError> {
        let window = self.get_mut(id)?;
        window.visibility = Visibility::Visible;
        window.minimized_seq = None;
        self.bring_to_front(id)?;
        tracing::debug!(id, "window restored");
        Ok(())
    }

    pub fn close(&mut self, id: &str) -> Result<(), WindowError> {
        let window = self.get_mut(id)?;
        window.visibility = Visibility::Closed;
        window.minimized_seq = None;
        tracing::debug!(id, "window closed");
        Ok(())
    }

    /// The rectangle a maximized window occupies: everything between the
    /// bands, minus the side panel and a margin.
    pub fn maximized_rect(&self) -> Rect {
        let vp = self.viewport;
        let size = Size::new(
            vp.width() - vp.side_panel - EDGE_GAP,
            vp.height() - vp.header - vp.footer - 2.0 * EDGE_GAP,
        )
        .at_least(MIN_WINDOW_SIZE);
        Rect {
            origin: Point::new(EDGE_GAP, vp.header + EDGE_GAP),
            size,
        }
    }

    /// Returns `true` when the window ends up maximized.
    pub fn toggle_maximize(&mut self, id: &str) -> Result<bool, WindowError> {
        let target = self.maximized_rect();
        let window = self.get_mut(id)?;
        let (next_rect, next_state) = match window.maximize {
            MaximizeState::Normal => (
                target,
                MaximizeState::Maximized {
                    saved: Some(window.rect),
                },
            ),
            MaximizeState::Maximized { saved } => (
                saved.unwrap_or(DEFAULT_RESTORE_RECT),
                MaximizeState::Normal,
            ),
        };
        window.maximize = next_state;
        self.apply_rect(id, next_rect)?;
        let maximized = matches!(next_state, MaximizeState::Maximized { .. });
        tracing::debug!(id, maximized, "window maximize toggled");
        Ok(maximized)
    }

    /// Highest visible window, if any.
    pub fn top_visible(&self) -> Option<&Window> {
        self.windows
            .iter()
            .filter(|w| w.is_visible())
            .max_by_key(|w| w.z)
    }

    /// Adopt a new viewport and pull visible windows back inside it.
    pub fn fit_to_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        for window in self.windows.iter_mut().filter(|w| w.is_visible()) {
            let size = window.rect.size;
            let mut origin = window.rect.origin;
            if window.rect.right() > viewport.width() {
                origin.x = (viewport.width() - size.width - EDGE_GAP).max(0.0);
            }
            if window.rect.bottom() > viewport.height() - viewport.footer {
                origin.y = (viewport.height() - viewport.footer - size.height - EDGE_GAP)
                    .max(viewport.header + EDGE_GAP);
            }
            if window.rect.top() < viewport.header {
                origin.y = viewport.header + EDGE_GAP;
            }
            window.rect.origin = origin;
        }
    }
}
