use crate::app::Padboard;
use crate::notes::{apply_format, has_markup, to_markdown, Format};
use eframe::egui;
use egui::text::{CCursor, CCursorRange};
use egui::widgets::text_edit::TextEditState;

/// Page text area with a bold / italic / list toolbar.
#[derive(Default)]
pub struct PageEditor;

impl PageEditor {
    pub fn ui(&mut self, ui: &mut egui::Ui, board: &mut Padboard) {
        let current = board.current_page();
        let Some(page) = board.notebook_mut().page_mut(current) else {
            return;
        };
        if has_markup(&page.content) {
            page.content = to_markdown(&page.content);
            tracing::debug!(page = current, "converted page markup to markdown");
        }
        let id = egui::Id::new(("page_editor", current));

        let mut format = None;
        ui.horizontal(|ui| {
            if ui
                .button(egui::RichText::new("B").strong())
                .on_hover_text("Bold")
                .clicked()
            {
                format = Some(Format::Bold);
            }
            if ui
                .button(egui::RichText::new("I").italics())
                .on_hover_text("Italic")
                .clicked()
            {
                format = Some(Format::Italic);
            }
            if ui.button("• List").on_hover_text("Bulleted list").clicked() {
                format = Some(Format::Bullet);
            }
        });
        if let Some(format) = format {
            let ctx = ui.ctx();
            let mut state = TextEditState::load(ctx, id).unwrap_or_default();
            let selection = match state.cursor.char_range() {
                Some(range) => {
                    let [start, end] = range.sorted();
                    start.index..end.index
                }
                None => {
                    let end = page.content.chars().count();
                    end..end
                }
            };
            let selected = apply_format(&mut page.content, selection, format);
            state.cursor.set_char_range(Some(CCursorRange::two(
                CCursor::new(selected.start),
                CCursor::new(selected.end),
            )));
            state.store(ctx, id);
            ctx.memory_mut(|m| m.request_focus(id));
        }

        egui::TextEdit::multiline(&mut page.content)
            .id(id)
            .desired_width(f32::INFINITY)
            .min_size(ui.available_size())
            .show(ui);
    }
}
