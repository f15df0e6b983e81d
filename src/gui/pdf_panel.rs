use crate::app::Padboard;
use crate::pdf::{PageRenderer, PdfiumRenderer};
use eframe::egui;

#[derive(Debug, Clone, PartialEq)]
struct RenderKey {
    name: String,
    page: usize,
    scale: f32,
}

/// Navigation bar and page view of the PDF window.
#[derive(Default)]
pub struct PdfPanel {
    renderer: Option<Box<dyn PageRenderer>>,
    /// Set when PDFium could not be loaded; pages are not drawn in-app.
    unavailable: Option<String>,
    texture: Option<egui::TextureHandle>,
    rendered: Option<RenderKey>,
}

impl PdfPanel {
    pub fn pick_and_import(board: &mut Padboard) {
        if let Some(path) = rfd::FileDialog::new().add_filter("PDF", &["pdf"]).pick_file() {
            board.open_pdf_file(&path);
        }
    }

    fn renderer(&mut self) -> Option<&mut Box<dyn PageRenderer>> {
        if self.renderer.is_none() && self.unavailable.is_none() {
            match PdfiumRenderer::new() {
                Ok(r) => self.renderer = Some(Box::new(r)),
                Err(e) => {
                    tracing::warn!("PDF pages will not render: {e:#}");
                    self.unavailable = Some(format!("{e:#}"));
                }
            }
        }
        self.renderer.as_mut()
    }

    fn refresh(&mut self, ctx: &egui::Context, board: &Padboard) {
        let viewer = board.viewer();
        let Some(doc) = viewer.document() else {
            self.texture = None;
            self.rendered = None;
            return;
        };
        let key = RenderKey {
            name: doc.name.clone(),
            page: viewer.page(),
            scale: viewer.scale(),
        };
        if self.rendered.as_ref() == Some(&key) {
            return;
        }
        let Some(renderer) = self.renderer() else {
            return;
        };
        match renderer.render_page(doc, key.page, key.scale) {
            Ok(img) => {
                let size = [img.width() as usize, img.height() as usize];
                let image = egui::ColorImage::from_rgba_unmultiplied(size, img.as_raw());
                self.texture =
                    Some(ctx.load_texture("pdf_page", image, egui::TextureOptions::LINEAR));
            }
            Err(e) => {
                tracing::error!("error rendering page: {e:#}");
                self.texture = None;
            }
        }
        self.rendered = Some(key);
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, board: &mut Padboard) {
        ui.horizontal_wrapped(|ui| {
            if ui.button("Open PDF").clicked() {
                Self::pick_and_import(board);
            }
            let loaded = board.viewer().document().is_some();
            if ui.add_enabled(loaded, egui::Button::new("◀")).clicked() {
                board.viewer_mut().prev_page();
            }
            if let Some(label) = board.viewer().label() {
                ui.label(label);
            }
            if ui.add_enabled(loaded, egui::Button::new("▶")).clicked() {
                board.viewer_mut().next_page();
            }
            ui.separator();
            if ui.add_enabled(loaded, egui::Button::new("−")).clicked() {
                board.viewer_mut().zoom_out();
            }
            ui.label(format!("{:.0}%", board.viewer().scale() * 100.0));
            if ui.add_enabled(loaded, egui::Button::new("+")).clicked() {
                board.viewer_mut().zoom_in();
            }
            if ui.add_enabled(loaded, egui::Button::new("Reset")).clicked() {
                board.viewer_mut().reset_zoom();
            }
            let path = board.viewer().document().and_then(|d| d.path.clone());
            if let Some(path) = path {
                if ui.button("Open in Default Viewer").clicked() {
                    if let Err(e) = open::that(&path) {
                        board.notify(
                            crate::app::NoticeKind::Error,
                            format!("Failed to open PDF: {e}"),
                        );
                    }
                }
            }
            if ui.add_enabled(loaded, egui::Button::new("Close")).clicked() {
                board.viewer_mut().close();
            }
        });
        ui.separator();

        self.refresh(ui.ctx(), board);
        match (&self.texture, &self.unavailable) {
            (Some(tex), _) => {
                egui::ScrollArea::both()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.add(egui::Image::new(tex).fit_to_exact_size(tex.size_vec2()));
                    });
            }
            (None, Some(reason)) if board.viewer().document().is_some() => {
                ui.centered_and_justified(|ui| {
                    ui.label(format!(
                        "Pages cannot be drawn here ({reason}). Use Open in Default Viewer."
                    ));
                });
            }
            _ => {
                ui.centered_and_justified(|ui| {
                    ui.label("Open a PDF to view it here.");
                });
            }
        }
    }
}
