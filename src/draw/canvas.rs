use crate::draw::coords::PointerInput;
use crate::draw::history::{DrawHistory, Snapshot};
use crate::draw::model::{Color, DrawMode, PenSettings};
use crate::draw::stroke::StrokeRenderer;
use crate::draw::surface::Surface;
use crate::geometry::{Point, Size};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use image::RgbaImage;
use std::fs;
use std::path::{Path, PathBuf};

/// Smallest backing store the canvas is reallocated to.
pub const MIN_SURFACE_SIZE: Size = Size::new(300.0, 200.0);
/// Space taken by the window chrome and toolbar around the canvas.
pub const WINDOW_CHROME: Size = Size::new(60.0, 180.0);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    /// The drawing mode cannot change while a stroke is being drawn.
    StrokeInProgress,
}

impl std::fmt::Display for DrawError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawError::StrokeInProgress => write!(f, "finish the current stroke first"),
        }
    }
}

impl std::error::Error for DrawError {}

/// Backing-store size for a canvas hosted in a window of `window` size.
pub fn surface_size_for_window(window: Size) -> (u32, u32) {
    let width = (window.width - WINDOW_CHROME.width).max(MIN_SURFACE_SIZE.width);
    let height = (window.height - WINDOW_CHROME.height).max(MIN_SURFACE_SIZE.height);
    (width.round() as u32, height.round() as u32)
}

pub fn sketch_filename(now: DateTime<Utc>) -> String {
    format!("padboard-sketch-{}.png", now.timestamp_millis())
}

/// The drawing window's model: a surface, its undo history and the active
/// stroke.
pub struct DrawingCanvas {
    surface: Surface,
    history: DrawHistory,
    renderer: StrokeRenderer,
    mode: DrawMode,
    pen: PenSettings,
}

impl DrawingCanvas {
    /// Create a blank canvas. The blank state becomes history entry 0.
    pub fn new(width: u32, height: u32, history_capacity: usize) -> Result<Self> {
        let surface = Surface::new(width, height);
        let initial = surface.encode()?;
        tracing::info!(width, height, "drawing canvas initialised");
        Ok(Self {
            surface,
            history: DrawHistory::new(initial, history_capacity),
            renderer: StrokeRenderer::default(),
            mode: DrawMode::Pen,
            pen: PenSettings::default(),
        })
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn history(&self) -> &DrawHistory {
        &self.history
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn pen(&self) -> PenSettings {
        self.pen
    }

    pub fn is_drawing(&self) -> bool {
        self.renderer.is_active()
    }

    pub fn set_mode(&mut self, mode: DrawMode) -> Result<(), DrawError> {
        if self.renderer.is_active() && mode != self.mode {
            tracing::warn!(?mode, "mode switch rejected while stroke is active");
            return Err(DrawError::StrokeInProgress);
        }
        self.mode = mode;
        tracing::debug!(?mode, "drawing mode changed");
        Ok(())
    }

    /// Pen color and size apply from the next stroke on.
    pub fn set_pen_color(&mut self, color: Color) {
        self.pen.color = color;
    }

    pub fn set_pen_size(&mut self, size: u32) {
        self.pen.size = size.clamp(1, 100);
    }

    pub fn set_pen(&mut self, pen: PenSettings) {
        self.set_pen_color(pen.color);
        self.set_pen_size(pen.size);
    }

    /// Feed one pointer event in surface coordinates.
    pub fn handle_pointer(&mut self, input: PointerInput) -> Result<()> {
        match input {
            PointerInput::Down(point) => self.begin_stroke(point),
            PointerInput::Move(point) => {
                self.renderer.extend_stroke(&mut self.surface, point);
                Ok(())
            }
            PointerInput::Up | PointerInput::Leave => self.end_stroke(),
        }
    }

    pub fn begin_stroke(&mut self, point: Point) -> Result<()> {
        // A missed pointer-up must not merge two strokes into one entry.
        self.end_stroke()?;
        let config = self.mode.config(self.pen);
        self.renderer.begin_stroke(&mut self.surface, point, config);
        Ok(())
    }

    pub fn end_stroke(&mut self) -> Result<()> {
        if self.renderer.end_stroke() {
            self.commit()?;
        }
        Ok(())
    }

    /// Snapshot the surface into history.
    pub fn commit(&mut self) -> Result<()> {
        let snapshot = self.surface.encode()?;
        self.history.commit(snapshot);
        Ok(())
    }

    /// Returns `false` when there was nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        self.end_stroke()?;
        let Some(snapshot) = self.history.undo().cloned() else {
            tracing::debug!("nothing to undo");
            return Ok(false);
        };
        self.surface.restore(&snapshot)?;
        tracing::debug!(index = self.history.index(), "undo performed");
        Ok(true)
    }

    pub fn redo(&mut self) -> Result<bool> {
        self.end_stroke()?;
        let Some(snapshot) = self.history.redo().cloned() else {
            tracing::debug!("nothing to redo");
            return Ok(false);
        };
        self.surface.restore(&snapshot)?;
        tracing::debug!(index = self.history.index(), "redo performed");
        Ok(true)
    }

    /// Repaint the surface from history entry `index` without moving the cursor.
    pub fn restore(&mut self, index: usize) -> Result<()> {
        let snapshot: Snapshot = self
            .history
            .get(index)
            .cloned()
            .with_context(|| format!("no history entry {index}"))?;
        self.surface.restore(&snapshot)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.renderer.end_stroke();
        self.surface.clear();
        self.commit()?;
        tracing::info!("canvas cleared");
        Ok(())
    }

    /// Replace the content with an encoded image stretched to the canvas.
    pub fn import_image(&mut self, bytes: &[u8]) -> Result<()> {
        let image = image::load_from_memory(bytes)
            .context("decode imported image")?
            .to_rgba8();
        self.renderer.end_stroke();
        self.surface.fill_with_image(&image);
        self.commit()?;
        tracing::info!(width = image.width(), height = image.height(), "image imported");
        Ok(())
    }

    /// Paint a prepared bitmap (text label, shape stamp) and commit it.
    pub fn paste_image(&mut self, image: &RgbaImage, at: Point) -> Result<()> {
        self.renderer.end_stroke();
        self.surface
            .overlay_image(image, at.x.round() as i64, at.y.round() as i64);
        self.commit()
    }

    /// Reallocate the backing store, keeping existing pixels at the origin.
    /// History is not touched.
    pub fn resize_backing(&mut self, width: u32, height: u32) {
        self.surface.resize(width, height);
        tracing::debug!(width, height, "canvas resized");
    }

    pub fn fit_to_window(&mut self, window: Size) {
        let (width, height) = surface_size_for_window(window);
        self.resize_backing(width, height);
    }

    pub fn export_png(&self, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("create export folder {}", dir.display()))?;
        let path = dir.join(sketch_filename(now));
        self.surface.save_png(&path)?;
        tracing::info!(path = %path.display(), "canvas exported");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::history::DEFAULT_HISTORY_CAPACITY;
    use chrono::TimeZone;

    fn canvas() -> DrawingCanvas {
        DrawingCanvas::new(60, 40, DEFAULT_HISTORY_CAPACITY).unwrap()
    }

    fn stroke(canvas: &mut DrawingCanvas, from: (f32, f32), to: (f32, f32)) {
        canvas
            .handle_pointer(PointerInput::Down(Point::new(from.0, from.1)))
            .unwrap();
        canvas
            .handle_pointer(PointerInput::Move(Point::new(to.0, to.1)))
            .unwrap();
        canvas.handle_pointer(PointerInput::Up).unwrap();
    }

    #[test]
    fn completed_stroke_commits_one_entry() {
        let mut canvas = canvas();
        assert_eq!(canvas.history().len(), 1);
        stroke(&mut canvas, (5.0, 20.0), (50.0, 20.0));
        assert_eq!(canvas.history().len(), 2);
        assert_eq!(canvas.surface().pixel(20, 20), Color::BLACK);
    }

    #[test]
    fn pointer_leave_also_ends_stroke() {
        let mut canvas = canvas();
        canvas
            .handle_pointer(PointerInput::Down(Point::new(1.0, 1.0)))
            .unwrap();
        canvas.handle_pointer(PointerInput::Leave).unwrap();
        assert!(!canvas.is_drawing());
        assert_eq!(canvas.history().len(), 2);
    }

    #[test]
    fn mode_switch_mid_stroke_is_rejected() {
        let mut canvas = canvas();
        canvas
            .handle_pointer(PointerInput::Down(Point::new(1.0, 1.0)))
            .unwrap();
        assert_eq!(canvas.set_mode(DrawMode::Eraser), Err(DrawError::StrokeInProgress));
        assert_eq!(canvas.mode(), DrawMode::Pen);

        canvas.handle_pointer(PointerInput::Up).unwrap();
        assert_eq!(canvas.set_mode(DrawMode::Eraser), Ok(()));
    }

    #[test]
    fn undo_restores_blank_and_redo_restores_stroke() {
        let mut canvas = canvas();
        stroke(&mut canvas, (5.0, 20.0), (50.0, 20.0));

        assert!(canvas.undo().unwrap());
        assert_eq!(canvas.surface().pixel(20, 20).a, 0);
        assert!(!canvas.undo().unwrap());

        assert!(canvas.redo().unwrap());
        assert_eq!(canvas.surface().pixel(20, 20), Color::BLACK);
        assert!(!canvas.redo().unwrap());
    }

    #[test]
    fn clear_is_undoable() {
        let mut canvas = canvas();
        stroke(&mut canvas, (5.0, 20.0), (50.0, 20.0));
        canvas.clear().unwrap();
        assert_eq!(canvas.surface().pixel(20, 20).a, 0);
        assert_eq!(canvas.history().len(), 3);

        canvas.undo().unwrap();
        assert_eq!(canvas.surface().pixel(20, 20), Color::BLACK);
    }

    #[test]
    fn fit_to_window_respects_floor_and_keeps_pixels() {
        let mut canvas = canvas();
        stroke(&mut canvas, (5.0, 20.0), (50.0, 20.0));
        canvas.fit_to_window(Size::new(700.0, 600.0));
        assert_eq!(canvas.surface().width(), 640);
        assert_eq!(canvas.surface().height(), 420);
        assert_eq!(canvas.surface().pixel(20, 20), Color::BLACK);

        canvas.fit_to_window(Size::new(100.0, 100.0));
        assert_eq!(canvas.surface().width(), 300);
        assert_eq!(canvas.surface().height(), 200);
        assert_eq!(canvas.history().len(), 2);
    }

    #[test]
    fn import_replaces_content_and_commits() {
        let mut canvas = canvas();
        let mut source = RgbaImage::new(2, 2);
        for px in source.pixels_mut() {
            *px = image::Rgba([0, 0, 255, 255]);
        }
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(source)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .unwrap();

        canvas.import_image(&png).unwrap();
        assert_eq!(canvas.history().len(), 2);
        let px = canvas.surface().pixel(30, 20);
        assert!(px.b > 250 && px.a > 250 && px.r < 5);
        assert!(canvas.import_image(b"not an image").is_err());
        assert_eq!(canvas.history().len(), 2);
    }

    #[test]
    fn sketch_filename_uses_unix_millis() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(sketch_filename(now), "padboard-sketch-1700000000123.png");
    }
}
