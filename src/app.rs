use crate::ai::{ChatSession, CompletionService, GeminiClient};
use crate::draw::canvas::surface_size_for_window;
use crate::draw::{DrawMode, DrawingCanvas, PointerInput, SurfaceMapping};
use crate::geometry::{Point, Size};
use crate::notes::{AutoSave, Notebook};
use crate::pdf::{self, DocumentWriter, PdfViewer, SelectedFile, SimplePdfWriter};
use crate::settings::Settings;
use crate::storage::LocalStore;
use crate::window_manager::registry::DEFAULT_WINDOW_SIZE;
use crate::window_manager::{
    default_windows, tray, GestureController, ResizeObserver, WindowRegistry, DRAWING_WINDOW,
};
use anyhow::{Context, Result};
use std::cell::{Ref, RefCell, RefMut};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// A message for the user, shown as a toast by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    NewPage,
    OpenDrawing,
    ExportNotes,
    Undo,
    Redo,
    CloseTopWindow,
}

impl Shortcut {
    /// Map a key name (as reported by the host, e.g. `"N"` or `"Escape"`)
    /// plus the command modifier to a shortcut.
    pub fn from_key(command: bool, key: &str) -> Option<Self> {
        if key.eq_ignore_ascii_case("escape") {
            return Some(Shortcut::CloseTopWindow);
        }
        if !command {
            return None;
        }
        match key.to_ascii_uppercase().as_str() {
            "N" => Some(Shortcut::NewPage),
            "D" => Some(Shortcut::OpenDrawing),
            "S" => Some(Shortcut::ExportNotes),
            "Z" => Some(Shortcut::Undo),
            "Y" => Some(Shortcut::Redo),
            _ => None,
        }
    }
}

/// Keeps the canvas backing store in step with its window.
struct CanvasResizer(Rc<RefCell<DrawingCanvas>>);

impl ResizeObserver for CanvasResizer {
    fn window_resized(&mut self, id: &str, size: Size) {
        match self.0.try_borrow_mut() {
            Ok(mut canvas) => canvas.fit_to_window(size),
            Err(_) => tracing::warn!(id, "canvas busy; skipped resize"),
        }
    }
}

/// Everything the workspace owns. The host renders it and forwards input.
pub struct Padboard {
    settings: Settings,
    registry: WindowRegistry,
    gestures: GestureController,
    canvas: Rc<RefCell<DrawingCanvas>>,
    notebook: Notebook,
    current_page: usize,
    store: LocalStore,
    autosave: AutoSave,
    chat: ChatSession,
    viewer: PdfViewer,
    writer: Box<dyn DocumentWriter>,
    notices: Vec<Notice>,
}

impl Padboard {
    pub fn new(settings: Settings, viewport: Size, now: Instant) -> Result<Self> {
        let service = Arc::new(GeminiClient::new(&settings.ai)?);
        if settings.ai.resolved_api_key().is_none() {
            tracing::warn!("no AI API key configured; assistant replies will fail");
        }
        Self::with_service(settings, viewport, service, now)
    }

    /// Build the workspace around a given completion service.
    pub fn with_service(
        settings: Settings,
        viewport: Size,
        service: Arc<dyn CompletionService>,
        now: Instant,
    ) -> Result<Self> {
        let (width, height) = surface_size_for_window(DEFAULT_WINDOW_SIZE);
        let mut canvas = DrawingCanvas::new(width, height, settings.history_capacity)?;
        canvas.set_pen(settings.pen());
        let canvas = Rc::new(RefCell::new(canvas));

        let mut registry = WindowRegistry::new(
            settings.viewport(viewport.width, viewport.height),
            &default_windows(),
        );
        registry.add_observer(Box::new(CanvasResizer(Rc::clone(&canvas))));

        let store = LocalStore::open(settings.storage_path());
        let notebook = Notebook::load(&store);
        let autosave = AutoSave::new(settings.autosave_interval(), now);

        Ok(Self {
            settings,
            registry,
            gestures: GestureController::default(),
            canvas,
            notebook,
            current_page: 1,
            store,
            autosave,
            chat: ChatSession::new(service),
            viewer: PdfViewer::default(),
            writer: Box::new(SimplePdfWriter::default()),
            notices: Vec::new(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    pub fn gestures(&self) -> &GestureController {
        &self.gestures
    }

    pub fn canvas(&self) -> Ref<'_, DrawingCanvas> {
        self.canvas.borrow()
    }

    pub fn canvas_mut(&self) -> RefMut<'_, DrawingCanvas> {
        self.canvas.borrow_mut()
    }

    pub fn notebook(&self) -> &Notebook {
        &self.notebook
    }

    pub fn notebook_mut(&mut self) -> &mut Notebook {
        &mut self.notebook
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn select_page(&mut self, number: usize) {
        if (1..=self.notebook.len()).contains(&number) {
            self.current_page = number;
        }
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn viewer(&self) -> &PdfViewer {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut PdfViewer {
        &mut self.viewer
    }

    pub fn set_document_writer(&mut self, writer: Box<dyn DocumentWriter>) {
        self.writer = writer;
    }

    pub fn notify(&mut self, kind: NoticeKind, text: impl Into<String>) {
        let text = text.into();
        match kind {
            NoticeKind::Error => tracing::warn!("{text}"),
            _ => tracing::info!("{text}"),
        }
        self.notices.push(Notice { kind, text });
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Report an error as a notice.
    fn report<T, E: std::fmt::Display>(&mut self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.notify(NoticeKind::Error, e.to_string());
                None
            }
        }
    }

    // Windows

    pub fn set_viewport(&mut self, size: Size) {
        let viewport = self.settings.viewport(size.width, size.height);
        if viewport != self.registry.viewport() {
            self.registry.fit_to_viewport(viewport);
        }
    }

    pub fn open_window(&mut self, id: &str) -> bool {
        let result = self.registry.open(id);
        self.report(result).is_some()
    }

    pub fn focus_window(&mut self, id: &str) {
        let result = self.registry.focus(id);
        self.report(result);
    }

    pub fn close_window(&mut self, id: &str) {
        if self.gestures.active().is_some_and(|(_, active)| active == id) {
            self.gestures.on_pointer_up();
        }
        let result = self.registry.close(id);
        self.report(result);
    }

    pub fn minimize_window(&mut self, id: &str) {
        let result = self.registry.minimize(id);
        self.report(result);
    }

    pub fn toggle_maximize(&mut self, id: &str) {
        let result = self.registry.toggle_maximize(id);
        self.report(result);
    }

    pub fn activate_tray(&mut self, id: &str) {
        let result = tray::activate(&mut self.registry, id);
        self.report(result);
    }

    pub fn tray_entries(&self) -> Vec<tray::TrayEntry> {
        tray::entries(&self.registry)
    }

    pub fn begin_window_drag(&mut self, id: &str, pointer: Point) {
        let result = self.gestures.start_drag(&mut self.registry, id, pointer);
        self.report(result);
    }

    pub fn begin_window_resize(&mut self, id: &str, pointer: Point) {
        let result = self.gestures.start_resize(&mut self.registry, id, pointer);
        self.report(result);
    }

    pub fn pointer_moved(&mut self, pointer: Point) {
        if let Err(e) = self.gestures.on_pointer_move(&mut self.registry, pointer) {
            tracing::error!("window gesture aborted: {e}");
            self.gestures.on_pointer_up();
        }
    }

    pub fn pointer_released(&mut self) {
        self.gestures.on_pointer_up();
    }

    // Canvas

    /// Pointer event in viewport coordinates over the displayed canvas.
    pub fn canvas_pointer(&mut self, input: PointerInput, mapping: &SurfaceMapping) {
        let result = self.canvas.borrow_mut().handle_pointer(mapping.map_input(input));
        self.report(result);
    }

    pub fn set_draw_mode(&mut self, mode: DrawMode) {
        let result = self.canvas.borrow_mut().set_mode(mode);
        self.report(result);
    }

    pub fn undo(&mut self) -> bool {
        let result = self.canvas.borrow_mut().undo();
        self.report(result).unwrap_or(false)
    }

    pub fn redo(&mut self) -> bool {
        let result = self.canvas.borrow_mut().redo();
        self.report(result).unwrap_or(false)
    }

    pub fn clear_canvas(&mut self) {
        let result = self.canvas.borrow_mut().clear();
        self.report(result);
    }

    pub fn import_image(&mut self, bytes: &[u8]) {
        let result = self.canvas.borrow_mut().import_image(bytes);
        if self.report(result).is_some() {
            self.notify(NoticeKind::Success, "Image imported");
        }
    }

    /// Load an image file chosen in a picker onto the canvas.
    pub fn import_image_file(&mut self, path: &Path) {
        let result = std::fs::read(path).with_context(|| format!("read {}", path.display()));
        if let Some(bytes) = self.report(result.map_err(|e| format!("{e:#}"))) {
            self.import_image(&bytes);
        }
    }

    pub fn export_sketch(&mut self, now: chrono::DateTime<chrono::Utc>) -> Option<PathBuf> {
        let result = self
            .canvas
            .borrow()
            .export_png(&self.settings.export_dir(), now);
        let path = self.report(result)?;
        self.notify(
            NoticeKind::Success,
            format!("Sketch saved to {}", path.display()),
        );
        Some(path)
    }

    // Notes

    pub fn add_page(&mut self) -> usize {
        let number = self.notebook.add_page();
        self.current_page = number;
        number
    }

    pub fn remove_page(&mut self, number: usize) -> bool {
        let result = self.notebook.remove_page(number);
        if self.report(result).is_none() {
            return false;
        }
        self.current_page = self.current_page.min(self.notebook.len()).max(1);
        true
    }

    pub fn save_now(&mut self, now: Instant) {
        self.autosave.reset(now);
        if let Err(e) = self.notebook.save(&mut self.store) {
            tracing::error!("error saving notes: {e:#}");
            self.notify(NoticeKind::Error, "Could not save notes");
        }
    }

    pub fn export_notes(&mut self, date: chrono::NaiveDate) -> Option<PathBuf> {
        let result = pdf::export_notes(
            &self.notebook,
            &self.settings.export_dir(),
            date,
            self.writer.as_ref(),
        );
        let path = match result {
            Ok(path) => path,
            Err(e) => {
                self.notify(NoticeKind::Error, format!("{e:#}"));
                return None;
            }
        };
        self.notify(
            NoticeKind::Success,
            format!("Notes exported to {}", path.display()),
        );
        Some(path)
    }

    // PDF

    pub fn import_pdf(&mut self, files: Vec<SelectedFile>) -> bool {
        let result = pdf::import(files);
        let Some(document) = self.report(result) else {
            return false;
        };
        self.viewer.load(document);
        self.open_window(crate::window_manager::PDF_WINDOW);
        true
    }

    /// Import the PDF chosen in a picker.
    pub fn open_pdf_file(&mut self, path: &Path) -> bool {
        let result = SelectedFile::read(path).map_err(|e| format!("{e:#}"));
        match self.report(result) {
            Some(file) => self.import_pdf(vec![file]),
            None => false,
        }
    }

    // Chat

    pub fn send_chat(&mut self, message: &str) -> bool {
        let notes = self.notebook.numbered_text();
        let result = self.chat.send(message, &notes);
        self.report(result).is_some()
    }

    // Frame

    pub fn handle_shortcut(&mut self, shortcut: Shortcut) {
        tracing::debug!(?shortcut, "shortcut");
        match shortcut {
            Shortcut::NewPage => {
                self.add_page();
            }
            Shortcut::OpenDrawing => {
                self.open_window(DRAWING_WINDOW);
            }
            Shortcut::ExportNotes => {
                self.export_notes(chrono::Local::now().date_naive());
            }
            Shortcut::Undo => {
                self.undo();
            }
            Shortcut::Redo => {
                self.redo();
            }
            Shortcut::CloseTopWindow => {
                if let Some(id) = self.registry.top_visible().map(|w| w.id.clone()) {
                    self.close_window(&id);
                }
            }
        }
    }

    /// Per-frame housekeeping: deliver chat replies and autosave when due.
    /// Returns `true` when something changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let replies = self.chat.poll();
        let mut changed = replies > 0;
        if self.autosave.poll(now) {
            if let Err(e) = self.notebook.save(&mut self.store) {
                tracing::error!("autosave failed: {e:#}");
            }
            changed = true;
        }
        changed
    }

    /// Flush state that must survive the session.
    pub fn shutdown(&mut self, now: Instant) {
        self.save_now(now);
        tracing::info!("padboard shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiError;
    use crate::geometry::Rect;
    use crate::window_manager::{AI_WINDOW, PDF_WINDOW};
    use std::time::Duration;
    use tempfile::TempDir;

    struct Offline;

    impl CompletionService for Offline {
        fn complete(&self, _prompt: &str) -> Result<String, AiError> {
            Err(AiError::Transport("offline".into()))
        }
    }

    fn app(dir: &TempDir) -> Padboard {
        let settings = Settings {
            storage_path: Some(dir.path().join("store.json")),
            export_dir: Some(dir.path().join("out")),
            ..Default::default()
        };
        Padboard::with_service(
            settings,
            Size::new(1200.0, 800.0),
            Arc::new(Offline),
            Instant::now(),
        )
        .unwrap()
    }

    #[test]
    fn shortcuts_map_from_key_names() {
        assert_eq!(Shortcut::from_key(true, "n"), Some(Shortcut::NewPage));
        assert_eq!(Shortcut::from_key(false, "N"), None);
        assert_eq!(Shortcut::from_key(false, "Escape"), Some(Shortcut::CloseTopWindow));
        assert_eq!(Shortcut::from_key(true, "Q"), None);
    }

    #[test]
    fn escape_closes_topmost_window() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.open_window(DRAWING_WINDOW);
        app.open_window(AI_WINDOW);
        app.handle_shortcut(Shortcut::CloseTopWindow);
        assert!(!app.registry().get(AI_WINDOW).unwrap().is_visible());
        assert!(app.registry().get(DRAWING_WINDOW).unwrap().is_visible());
    }

    #[test]
    fn unknown_window_becomes_notice() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        assert!(!app.open_window("nope"));
        assert_eq!(app.take_notices()[0].kind, NoticeKind::Error);
        assert!(app.notices().is_empty());
    }

    #[test]
    fn resizing_drawing_window_refits_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.open_window(DRAWING_WINDOW);
        let rect = app.registry().get(DRAWING_WINDOW).unwrap().rect;
        app.begin_window_resize(DRAWING_WINDOW, Point::new(rect.right(), rect.bottom()));
        app.pointer_moved(Point::new(rect.right() + 100.0, rect.bottom() + 50.0));
        app.pointer_released();

        let size = app.registry().get(DRAWING_WINDOW).unwrap().rect.size;
        assert_eq!(size, Size::new(700.0, 550.0));
        let (w, h) = (app.canvas().surface().width(), app.canvas().surface().height());
        assert_eq!((w, h), (640, 370));
    }

    #[test]
    fn canvas_pointer_maps_displayed_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        let backing = app.canvas().surface().size();
        // Displayed at half size.
        let mapping = SurfaceMapping::new(
            Rect::new(10.0, 10.0, backing.width / 2.0, backing.height / 2.0),
            backing,
        );
        app.canvas_pointer(PointerInput::Down(Point::new(20.0, 20.0)), &mapping);
        app.canvas_pointer(PointerInput::Move(Point::new(30.0, 20.0)), &mapping);
        app.canvas_pointer(PointerInput::Up, &mapping);

        let canvas = app.canvas();
        assert_eq!(canvas.history().len(), 2);
        assert_eq!(canvas.surface().pixel(30, 20).a, 255);
    }

    #[test]
    fn removing_last_page_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        assert!(!app.remove_page(1));
        assert_eq!(app.take_notices()[0].text, "Cannot remove the last page!");

        app.handle_shortcut(Shortcut::NewPage);
        assert_eq!(app.current_page(), 2);
        assert!(app.remove_page(2));
        assert_eq!(app.current_page(), 1);
    }

    #[test]
    fn autosave_persists_notes() {
        let dir = tempfile::tempdir().unwrap();
        let start = Instant::now();
        let mut app = app(&dir);
        app.notebook_mut().page_mut(1).unwrap().content = "kept".into();
        app.tick(start + Duration::from_secs(31));

        let reopened = self::app(&dir);
        assert_eq!(reopened.notebook().pages()[0].content, "kept");
    }

    #[test]
    fn offline_chat_gets_connectivity_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        assert!(app.send_chat("hi"));
        let start = Instant::now();
        while app.chat().pending_count() > 0 && start.elapsed() < Duration::from_secs(5) {
            app.tick(Instant::now());
            std::thread::sleep(Duration::from_millis(5));
        }
        let last = app.chat().messages().last().unwrap();
        assert!(last.body.text().starts_with("Sorry, I'm having trouble"));
    }

    struct PlainText;

    impl DocumentWriter for PlainText {
        fn extension(&self) -> &str {
            "txt"
        }

        fn write(&self, pages: &[String], out: &mut dyn std::io::Write) -> Result<()> {
            out.write_all(pages.join("\n---\n").as_bytes())?;
            Ok(())
        }
    }

    #[test]
    fn export_uses_configured_writer() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.set_document_writer(Box::new(PlainText));
        app.notebook_mut().page_mut(1).unwrap().content = "one".into();
        app.add_page();
        app.notebook_mut().page_mut(2).unwrap().content = "two".into();

        let date = chrono::NaiveDate::from_ymd_opt(2024, 2, 3).unwrap();
        let path = app.export_notes(date).unwrap();
        assert_eq!(path.file_name().unwrap(), "Padboard-Notes-2024-02-03.txt");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "one\n---\ntwo");
    }

    #[test]
    fn invalid_pdf_leaves_viewer_closed() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        let files = vec![SelectedFile {
            name: "x.png".into(),
            path: None,
            mime: None,
            bytes: vec![1, 2, 3],
        }];
        assert!(!app.import_pdf(files));
        assert!(app.viewer().document().is_none());
        assert!(!app.registry().get(PDF_WINDOW).unwrap().is_visible());
        assert_eq!(app.take_notices()[0].text, "Please select a valid PDF file.");
    }

    #[test]
    fn picked_pdf_opens_viewer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slides.pdf");
        let mut bytes = Vec::new();
        SimplePdfWriter::default()
            .write(&["one".to_string(), "two".to_string()], &mut bytes)
            .unwrap();
        std::fs::write(&path, bytes).unwrap();

        let mut app = app(&dir);
        assert!(app.open_pdf_file(&path));
        assert_eq!(app.viewer().label().as_deref(), Some("Page 1 of 2"));
        assert!(app.registry().get(PDF_WINDOW).unwrap().is_visible());

        assert!(!app.open_pdf_file(&dir.path().join("missing.pdf")));
        assert!(app.take_notices().last().unwrap().text.contains("missing.pdf"));
    }

    #[test]
    fn picked_image_replaces_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 255, 255]))
            .save(&path)
            .unwrap();

        let mut app = app(&dir);
        app.import_image_file(&path);
        assert_eq!(app.canvas().history().len(), 2);
        assert_eq!(app.take_notices().last().unwrap().text, "Image imported");
    }
}
