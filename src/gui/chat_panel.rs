use crate::ai::{MessageBody, Sender};
use crate::app::Padboard;
use eframe::egui;
use egui_commonmark::{CommonMarkCache, CommonMarkViewer};

const QUICK_ACTIONS: [(&str, &str); 3] = [
    ("Analyze", "Analyze my notes"),
    ("Questions", "Generate study questions"),
    ("Summarize", "Summarize my notes"),
];

#[derive(Default)]
pub struct ChatPanel {
    input: String,
    cache: CommonMarkCache,
}

impl ChatPanel {
    pub fn ui(&mut self, ui: &mut egui::Ui, board: &mut Padboard) {
        ui.horizontal(|ui| {
            for (label, message) in QUICK_ACTIONS {
                if ui.button(label).clicked() {
                    board.send_chat(message);
                }
            }
        });
        ui.separator();

        let input_height = 32.0;
        egui::ScrollArea::vertical()
            .max_height((ui.available_height() - input_height).max(40.0))
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for msg in board.chat().messages() {
                    match (msg.sender, &msg.body) {
                        (Sender::User, body) => {
                            ui.with_layout(egui::Layout::top_down(egui::Align::Max), |ui| {
                                egui::Frame::group(ui.style())
                                    .fill(ui.visuals().selection.bg_fill)
                                    .show(ui, |ui| {
                                        ui.label(body.text());
                                    });
                            });
                        }
                        (Sender::Assistant, MessageBody::Pending) => {
                            ui.label(egui::RichText::new(MessageBody::Pending.text()).italics());
                        }
                        (Sender::Assistant, MessageBody::Text(text)) => {
                            egui::Frame::group(ui.style()).show(ui, |ui| {
                                CommonMarkViewer::new(format!("chat_msg_{}", msg.id))
                                    .show(ui, &mut self.cache, text);
                            });
                        }
                    }
                    ui.add_space(4.0);
                }
            });

        ui.horizontal(|ui| {
            let resp = ui.add(
                egui::TextEdit::singleline(&mut self.input)
                    .hint_text("Ask me anything...")
                    .desired_width(ui.available_width() - 60.0),
            );
            let enter = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Send").clicked() || enter {
                if board.send_chat(&self.input) {
                    self.input.clear();
                }
                resp.request_focus();
            }
        });
    }
}
