mod canvas_view;
mod chat_panel;
mod page_editor;
mod pdf_panel;
mod toast_log_dialog;

pub use canvas_view::CanvasView;
pub use chat_panel::ChatPanel;
pub use page_editor::PageEditor;
pub use pdf_panel::PdfPanel;
pub use toast_log_dialog::ToastLogDialog;

use crate::app::{NoticeKind, Padboard, Shortcut};
use crate::geometry::{Point, Size};
use crate::pdf::SelectedFile;
use crate::toast_log::{append_toast_log, TOAST_LOG_FILE};
use crate::window_manager::{Window, AI_WINDOW, DRAWING_WINDOW, PDF_WINDOW};
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use std::path::Path;
use std::time::{Duration, Instant};

const TITLE_BAR_HEIGHT: f32 = 28.0;
const RESIZE_HANDLE: f32 = 14.0;
const CONTENT_MARGIN: f32 = 8.0;

fn push_toast(toasts: &mut Toasts, toast: Toast) {
    append_toast_log(Path::new(TOAST_LOG_FILE), toast.text.text());
    toasts.add(toast);
}

fn to_point(pos: egui::Pos2) -> Point {
    Point::new(pos.x, pos.y)
}

enum WindowAction {
    Focus(String),
    Minimize(String),
    ToggleMaximize(String),
    Close(String),
    StartDrag(String, Point),
    StartResize(String, Point),
}

pub struct PadboardApp {
    board: Padboard,
    toasts: Toasts,
    enable_toasts: bool,
    toast_duration: f32,
    canvas_view: CanvasView,
    chat_panel: ChatPanel,
    pdf_panel: PdfPanel,
    page_editor: PageEditor,
    toast_log: ToastLogDialog,
}

impl PadboardApp {
    pub fn new(board: Padboard) -> Self {
        let enable_toasts = board.settings().enable_toasts;
        let toast_duration = board.settings().toast_duration;
        Self {
            board,
            toasts: Toasts::new().anchor(egui::Align2::RIGHT_TOP, [10.0, 10.0]),
            enable_toasts,
            toast_duration,
            canvas_view: CanvasView::default(),
            chat_panel: ChatPanel::default(),
            pdf_panel: PdfPanel::default(),
            page_editor: PageEditor::default(),
            toast_log: ToastLogDialog::default(),
        }
    }

    pub fn board(&self) -> &Padboard {
        &self.board
    }

    /// Images go onto the canvas; everything else is offered to the PDF
    /// viewer, which rejects non-PDF files.
    pub fn handle_dropped_files(&mut self, files: Vec<egui::DroppedFile>) {
        for file in files {
            let selected = match (&file.path, &file.bytes) {
                (Some(path), _) => match SelectedFile::read(path) {
                    Ok(selected) => selected,
                    Err(e) => {
                        self.board.notify(NoticeKind::Error, format!("{e:#}"));
                        continue;
                    }
                },
                (None, Some(bytes)) => SelectedFile {
                    name: file.name.clone(),
                    path: None,
                    mime: (!file.mime.is_empty()).then(|| file.mime.clone()),
                    bytes: bytes.to_vec(),
                },
                (None, None) => continue,
            };
            let ext = Path::new(&selected.name)
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase);
            match ext.as_deref() {
                Some("png" | "jpg" | "jpeg") => {
                    self.board.import_image(&selected.bytes);
                    self.board.open_window(DRAWING_WINDOW);
                }
                _ => {
                    self.board.import_pdf(vec![selected]);
                }
            }
        }
    }

    fn show_notices(&mut self) {
        for notice in self.board.take_notices() {
            if !self.enable_toasts {
                append_toast_log(Path::new(TOAST_LOG_FILE), &notice.text);
                continue;
            }
            let kind = match notice.kind {
                NoticeKind::Info => ToastKind::Info,
                NoticeKind::Success => ToastKind::Success,
                NoticeKind::Error => ToastKind::Error,
            };
            push_toast(
                &mut self.toasts,
                Toast {
                    text: notice.text.into(),
                    kind,
                    options: ToastOptions::default()
                        .duration_in_seconds(self.toast_duration as f64),
                },
            );
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let typing = ctx.wants_keyboard_input();
        let shortcuts: Vec<Shortcut> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|e| match e {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } => Shortcut::from_key(modifiers.command, key.name()),
                    _ => None,
                })
                .collect()
        });
        for shortcut in shortcuts {
            // Let the text editor keep its own undo.
            if typing && matches!(shortcut, Shortcut::Undo | Shortcut::Redo) {
                continue;
            }
            self.board.handle_shortcut(shortcut);
        }
    }

    fn header(&mut self, ctx: &egui::Context) {
        let height = self.board.settings().header_height;
        egui::TopBottomPanel::top("header")
            .exact_height(height)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.heading("Padboard");
                    ui.separator();
                    if ui.button("New Page").on_hover_text("Ctrl+N").clicked() {
                        self.board.add_page();
                    }
                    if ui.button("Drawing").on_hover_text("Ctrl+D").clicked() {
                        self.board.open_window(DRAWING_WINDOW);
                    }
                    if ui.button("PDF Viewer").clicked() {
                        self.board.open_window(PDF_WINDOW);
                    }
                    if ui.button("AI Assistant").clicked() {
                        self.board.open_window(AI_WINDOW);
                    }
                    ui.separator();
                    if ui.button("Save").clicked() {
                        self.board.save_now(Instant::now());
                        self.board.notify(NoticeKind::Success, "Notes saved");
                    }
                    if ui.button("Export PDF").on_hover_text("Ctrl+S").clicked() {
                        self.board.export_notes(chrono::Local::now().date_naive());
                    }
                    if ui.button("Notices").clicked() {
                        self.toast_log.open();
                    }
                });
            });
    }

    fn footer(&mut self, ctx: &egui::Context) {
        let height = self.board.settings().footer_height;
        egui::TopBottomPanel::bottom("footer")
            .exact_height(height)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    let entries = self.board.tray_entries();
                    for entry in entries {
                        if ui.button(&entry.title).on_hover_text("Restore").clicked() {
                            self.board.activate_tray(&entry.id);
                        }
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(format!(
                            "Page {} of {}",
                            self.board.current_page(),
                            self.board.notebook().len()
                        ));
                    });
                });
            });
    }

    fn pages_panel(&mut self, ctx: &egui::Context) {
        let width = self.board.settings().side_panel_width;
        egui::SidePanel::right("pages")
            .exact_width(width)
            .resizable(false)
            .show(ctx, |ui| {
                ui.heading("Pages");
                ui.horizontal(|ui| {
                    if ui.button("Add").clicked() {
                        self.board.add_page();
                    }
                    if ui.button("Remove").clicked() {
                        let current = self.board.current_page();
                        self.board.remove_page(current);
                    }
                });
                ui.separator();
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let current = self.board.current_page();
                    let previews: Vec<String> = self
                        .board
                        .notebook()
                        .pages()
                        .iter()
                        .map(|p| crate::notes::plain_text(&p.content))
                        .collect();
                    for (i, preview) in previews.iter().enumerate() {
                        let number = i + 1;
                        let first_line = preview.lines().next().unwrap_or_default();
                        let label = format!("Page {number}  {first_line}");
                        if ui.selectable_label(current == number, label).clicked() {
                            self.board.select_page(number);
                        }
                    }
                });
            });
    }

    fn editor(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.page_editor.ui(ui, &mut self.board);
        });
    }

    fn window_contents(&mut self, ui: &mut egui::Ui, id: &str) {
        match id {
            DRAWING_WINDOW => self.canvas_view.ui(ui, &mut self.board),
            PDF_WINDOW => self.pdf_panel.ui(ui, &mut self.board),
            AI_WINDOW => self.chat_panel.ui(ui, &mut self.board),
            other => {
                ui.label(format!("Unknown window '{other}'"));
            }
        }
    }

    fn show_window(
        &mut self,
        ctx: &egui::Context,
        window: &Window,
        actions: &mut Vec<WindowAction>,
    ) -> egui::LayerId {
        let area_id = egui::Id::new(("padboard_window", window.id.as_str()));
        let rect = egui::Rect::from_min_size(
            egui::pos2(window.rect.origin.x, window.rect.origin.y),
            egui::vec2(window.rect.size.width, window.rect.size.height),
        );
        let response = egui::Area::new(area_id)
            .fixed_pos(rect.min)
            .order(egui::Order::Middle)
            .movable(false)
            .show(ctx, |ui| {
                let (full, _) = ui.allocate_exact_size(rect.size(), egui::Sense::hover());
                let painter = ui.painter().clone();
                let visuals = ui.visuals().clone();
                painter.rect(full, 6.0, visuals.window_fill(), visuals.window_stroke());

                if ui.rect_contains_pointer(full) && ui.input(|i| i.pointer.primary_pressed()) {
                    actions.push(WindowAction::Focus(window.id.clone()));
                }

                let bar_rect =
                    egui::Rect::from_min_size(full.min, egui::vec2(full.width(), TITLE_BAR_HEIGHT));
                let bar = ui.interact(bar_rect, area_id.with("bar"), egui::Sense::click_and_drag());
                painter.rect_filled(
                    bar_rect,
                    egui::Rounding {
                        nw: 6.0,
                        ne: 6.0,
                        sw: 0.0,
                        se: 0.0,
                    },
                    visuals.faint_bg_color,
                );
                painter.text(
                    bar_rect.left_center() + egui::vec2(CONTENT_MARGIN, 0.0),
                    egui::Align2::LEFT_CENTER,
                    &window.title,
                    egui::FontId::proportional(14.0),
                    visuals.text_color(),
                );
                if bar.drag_started() {
                    if let Some(p) = bar.interact_pointer_pos() {
                        actions.push(WindowAction::StartDrag(window.id.clone(), to_point(p)));
                    }
                }
                if bar.double_clicked() {
                    actions.push(WindowAction::ToggleMaximize(window.id.clone()));
                }

                let max_label = if window.is_maximized() { "❐" } else { "□" };
                let controls = [
                    ("×", WindowAction::Close(window.id.clone())),
                    (max_label, WindowAction::ToggleMaximize(window.id.clone())),
                    ("–", WindowAction::Minimize(window.id.clone())),
                ];
                for (i, (label, action)) in controls.into_iter().enumerate() {
                    let button_rect = egui::Rect::from_min_size(
                        egui::pos2(
                            bar_rect.right() - 28.0 * (i as f32 + 1.0),
                            bar_rect.top() + 2.0,
                        ),
                        egui::vec2(24.0, 24.0),
                    );
                    if ui
                        .put(button_rect, egui::Button::new(label).frame(false))
                        .clicked()
                    {
                        actions.push(action);
                    }
                }

                let content_rect = egui::Rect::from_min_max(
                    egui::pos2(full.left() + CONTENT_MARGIN, bar_rect.bottom() + 4.0),
                    egui::pos2(
                        full.right() - CONTENT_MARGIN,
                        full.bottom() - RESIZE_HANDLE,
                    ),
                );
                let mut content =
                    ui.child_ui(content_rect, egui::Layout::top_down(egui::Align::Min));
                content.set_clip_rect(content_rect);
                self.window_contents(&mut content, &window.id);

                let handle_rect = egui::Rect::from_min_max(
                    full.max - egui::vec2(RESIZE_HANDLE, RESIZE_HANDLE),
                    full.max,
                );
                let handle = ui.interact(handle_rect, area_id.with("resize"), egui::Sense::drag());
                let stroke = visuals.widgets.noninteractive.fg_stroke;
                for step in [4.0, 8.0, 12.0] {
                    painter.line_segment(
                        [
                            egui::pos2(full.right() - step, full.bottom() - 2.0),
                            egui::pos2(full.right() - 2.0, full.bottom() - step),
                        ],
                        stroke,
                    );
                }
                if handle.drag_started() {
                    if let Some(p) = handle.interact_pointer_pos() {
                        actions.push(WindowAction::StartResize(window.id.clone(), to_point(p)));
                    }
                }
            });
        response.response.layer_id
    }

    fn floating_windows(&mut self, ctx: &egui::Context) {
        let windows: Vec<Window> = self
            .board
            .registry()
            .stacking_order()
            .into_iter()
            .filter(|w| w.is_visible())
            .cloned()
            .collect();
        let mut actions = Vec::new();
        for window in &windows {
            let layer = self.show_window(ctx, window, &mut actions);
            // Paint order follows the registry's z values.
            ctx.move_to_top(layer);
        }

        for action in actions {
            match action {
                WindowAction::Focus(id) => self.board.focus_window(&id),
                WindowAction::Minimize(id) => self.board.minimize_window(&id),
                WindowAction::ToggleMaximize(id) => self.board.toggle_maximize(&id),
                WindowAction::Close(id) => self.board.close_window(&id),
                WindowAction::StartDrag(id, p) => self.board.begin_window_drag(&id, p),
                WindowAction::StartResize(id, p) => self.board.begin_window_resize(&id, p),
            }
        }
    }

    fn track_gestures(&mut self, ctx: &egui::Context) {
        if !self.board.gestures().is_active() {
            return;
        }
        let (pos, released) = ctx.input(|i| (i.pointer.latest_pos(), i.pointer.any_released()));
        if let Some(p) = pos {
            self.board.pointer_moved(to_point(p));
        }
        if released || !ctx.input(|i| i.pointer.primary_down()) {
            self.board.pointer_released();
        }
    }
}

impl eframe::App for PadboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.enable_toasts {
            self.toasts.show(ctx);
        }

        let screen = ctx.screen_rect();
        self.board
            .set_viewport(Size::new(screen.width(), screen.height()));
        self.handle_keys(ctx);
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if !dropped.is_empty() {
            self.handle_dropped_files(dropped);
        }
        self.track_gestures(ctx);
        self.board.tick(Instant::now());

        self.header(ctx);
        self.footer(ctx);
        self.pages_panel(ctx);
        self.editor(ctx);
        self.floating_windows(ctx);
        self.toast_log.ui(ctx);
        self.show_notices();

        if self.board.chat().pending_count() > 0 || self.board.gestures().is_active() {
            ctx.request_repaint_after(Duration::from_millis(100));
        } else {
            ctx.request_repaint_after(self.board.settings().autosave_interval());
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.board.shutdown(Instant::now());
    }
}
