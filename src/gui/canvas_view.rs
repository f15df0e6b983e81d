use crate::app::Padboard;
use crate::draw::{Color, DrawMode, PointerInput, SurfaceMapping};
use crate::geometry::{Point, Rect};
use eframe::egui;

fn to_point(pos: egui::Pos2) -> Point {
    Point::new(pos.x, pos.y)
}

fn to_rect(rect: egui::Rect) -> Rect {
    Rect::new(rect.min.x, rect.min.y, rect.width(), rect.height())
}

/// Inputs for the frame a drag is recognised: the press point, then the
/// distance covered before the drag threshold was crossed.
fn drag_start_inputs(origin: Option<Point>, current: Option<Point>) -> Vec<PointerInput> {
    let Some(start) = origin.or(current) else {
        return Vec::new();
    };
    let mut inputs = vec![PointerInput::Down(start)];
    if let Some(p) = current.filter(|p| *p != start) {
        inputs.push(PointerInput::Move(p));
    }
    inputs
}

/// Toolbar and drawing area of the drawing window.
#[derive(Default)]
pub struct CanvasView {
    texture: Option<egui::TextureHandle>,
    revision: Option<u64>,
    stroking: bool,
}

impl CanvasView {
    fn refresh_texture(&mut self, ctx: &egui::Context, board: &Padboard) {
        let canvas = board.canvas();
        let surface = canvas.surface();
        if self.revision == Some(surface.revision()) && self.texture.is_some() {
            return;
        }
        let size = [surface.width() as usize, surface.height() as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, surface.rgba_pixels());
        match &mut self.texture {
            Some(tex) => tex.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.texture =
                    Some(ctx.load_texture("drawing_canvas", image, egui::TextureOptions::LINEAR));
            }
        }
        self.revision = Some(surface.revision());
    }

    fn toolbar(&mut self, ui: &mut egui::Ui, board: &mut Padboard) {
        ui.horizontal_wrapped(|ui| {
            let current = board.canvas().mode();
            for mode in DrawMode::ALL {
                if ui.selectable_label(current == mode, mode.label()).clicked() {
                    board.set_draw_mode(mode);
                }
            }
            ui.separator();

            let pen = board.canvas().pen();
            let mut color = egui::Color32::from_rgba_unmultiplied(
                pen.color.r,
                pen.color.g,
                pen.color.b,
                pen.color.a,
            );
            if egui::color_picker::color_edit_button_srgba(
                ui,
                &mut color,
                egui::color_picker::Alpha::Opaque,
            )
            .changed()
            {
                let [r, g, b, a] = color.to_srgba_unmultiplied();
                board.canvas_mut().set_pen_color(Color::rgba(r, g, b, a));
            }
            let mut size = pen.size;
            if ui
                .add(egui::DragValue::new(&mut size).clamp_range(1..=50).suffix(" px"))
                .changed()
            {
                board.canvas_mut().set_pen_size(size);
            }
            ui.separator();

            let (can_undo, can_redo) = {
                let canvas = board.canvas();
                (canvas.history().can_undo(), canvas.history().can_redo())
            };
            if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                board.undo();
            }
            if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                board.redo();
            }
            if ui.button("Clear").clicked() {
                board.clear_canvas();
            }
            if ui.button("Import").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Image", &["png", "jpg", "jpeg"])
                    .pick_file()
                {
                    board.import_image_file(&path);
                }
            }
            if ui.button("Save PNG").clicked() {
                board.export_sketch(chrono::Utc::now());
            }
        });
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, board: &mut Padboard) {
        self.toolbar(ui, board);
        ui.separator();
        self.refresh_texture(ui.ctx(), board);
        let Some(tex) = &self.texture else {
            return;
        };

        let backing = board.canvas().surface().size();
        let avail = ui.available_size();
        let fit = (avail.x / backing.width)
            .min(avail.y / backing.height)
            .clamp(0.1, 1.0);
        let display = egui::vec2(backing.width * fit, backing.height * fit);
        let (rect, resp) = ui.allocate_exact_size(display, egui::Sense::drag());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, egui::Color32::WHITE);
        painter.image(
            tex.id(),
            rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        let mapping = SurfaceMapping::new(to_rect(rect), backing);
        let pointer = resp.interact_pointer_pos().map(to_point);
        if resp.drag_started() {
            let origin = ui.input(|i| i.pointer.press_origin()).map(to_point);
            for input in drag_start_inputs(origin, pointer) {
                board.canvas_pointer(input, &mapping);
                self.stroking = true;
            }
        } else if self.stroking && resp.dragged() {
            match pointer {
                Some(p) if rect.contains(egui::pos2(p.x, p.y)) => {
                    board.canvas_pointer(PointerInput::Move(p), &mapping)
                }
                _ => {
                    board.canvas_pointer(PointerInput::Leave, &mapping);
                    self.stroking = false;
                }
            }
        }
        if self.stroking && resp.drag_released() {
            board.canvas_pointer(PointerInput::Up, &mapping);
            self.stroking = false;
        }
    }
}
