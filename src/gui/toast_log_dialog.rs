use crate::toast_log::TOAST_LOG_FILE;
use eframe::egui;

/// Shows the tail of the notice log.
#[derive(Default)]
pub struct ToastLogDialog {
    pub open: bool,
    lines: Vec<String>,
}

impl ToastLogDialog {
    pub fn open(&mut self) {
        self.lines = read_last_lines(TOAST_LOG_FILE, 20);
        self.open = true;
    }

    pub fn ui(&mut self, ctx: &egui::Context) {
        if !self.open {
            return;
        }
        let mut close = false;
        egui::Window::new("Notices")
            .resizable(true)
            .default_size((360.0, 200.0))
            .open(&mut self.open)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    if self.lines.is_empty() {
                        ui.weak("No notices yet");
                    }
                    for line in &self.lines {
                        ui.label(line);
                    }
                });
                ui.horizontal(|ui| {
                    if ui.button("Refresh").clicked() {
                        self.lines = read_last_lines(TOAST_LOG_FILE, 20);
                    }
                    if ui.button("Close").clicked() {
                        close = true;
                    }
                });
            });
        if close {
            self.open = false;
        }
    }
}

fn read_last_lines(path: &str, count: usize) -> Vec<String> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    let mut lines: Vec<String> = content.lines().map(str::to_owned).collect();
    if lines.len() > count {
        lines.drain(0..lines.len() - count);
    }
    lines
}
