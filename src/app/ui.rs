use super::ActionProgress;
use super::FilesUploader;
use crate::upload::FileRow;
use crate::utils::file_size::FileSizeUtils;
use eframe::egui::{self, Align, Color32, RichText};
use rfd::FileDialog;
use std::time::Instant;

enum RowAction {
    Remove(String),
    Copy(String),
    Open(String),
}

impl FilesUploader {
    pub fn render(&mut self, ctx: &egui::Context) {
        let mut actions = Vec::new();

        egui::CentralPanel::default().show(ctx, |ui| {
            let total_height = ui.available_height();
            let footer_height = 40.0;
            let footer_margin = 15.0;
            let content_height = total_height - footer_height - footer_margin;

            egui::ScrollArea::vertical()
                .max_height(content_height)
                .show(ui, |ui| {
                    ui.add_space(20.0);
                    ui.vertical_centered(|ui| {
                        ui.heading("Files");
                        ui.add_space(5.0);
                        ui.label(
                            RichText::new("Upload files and share them with a link")
                                .color(ui.visuals().text_color().gamma_multiply(0.7)),
                        );
                    });

                    ui.add_space(20.0);
                    self.render_drop_zone(ui);

                    ui.add_space(20.0);
                    let now = Instant::now();
                    for row in self.coordinator.rows() {
                        self.render_row(ui, row, now, &mut actions);
                        ui.add_space(6.0);
                    }

                    ui.add_space(10.0);
                    let submit = self.coordinator.submit_control();
                    if submit.visible {
                        ui.vertical_centered(|ui| {
                            let label = if self.coordinator.is_submitting() {
                                "⏳ Uploading..."
                            } else {
                                "📤 Upload Files"
                            };
                            let button =
                                egui::Button::new(label).min_size(egui::vec2(200.0, 40.0));
                            if ui.add_enabled(submit.enabled, button).clicked() {
                                self.start_upload();
                            }
                        });
                    }

                    if !matches!(self.state.progress, ActionProgress::NotStarted) {
                        ui.add_space(20.0);
                        ui.group(|ui| {
                            let fraction = self.state.progress.get_progress_percentage();
                            let progress_bar = egui::ProgressBar::new(fraction)
                                .show_percentage()
                                .animate(false)
                                .fill(self.palette.accent);
                            ui.add(progress_bar);
                            ui.label(self.state.progress.get_status_text());
                        });
                    }

                    ui.add_space(20.0);
                });

            ui.with_layout(egui::Layout::bottom_up(Align::Center), |ui| {
                ui.add_space(footer_margin);
                self.render_footer(ui);
            });
        });

        for action in actions {
            match action {
                RowAction::Remove(name) => self.remove_file(&name),
                RowAction::Copy(name) => self.copy_url(ctx, &name),
                RowAction::Open(url) => self.open_url(&url),
            }
        }
    }

    fn render_drop_zone(&mut self, ui: &mut egui::Ui) {
        let mut frame = egui::Frame::group(ui.style()).inner_margin(16.0);
        if self.state.drop_hovered {
            frame = frame
                .fill(self.palette.drop_hover)
                .stroke(egui::Stroke::new(1.5, self.palette.accent));
        }

        frame.show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.label("Drag and drop files here, or");
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("📄 Select Files").clicked() {
                        if let Some(paths) = FileDialog::new().pick_files() {
                            self.add_paths(paths);
                        }
                    }
                    if ui.button("📁 Select Folder").clicked() {
                        if let Some(path) = FileDialog::new().pick_folder() {
                            self.add_paths(vec![path]);
                        }
                    }
                });
                ui.add_space(4.0);
                ui.label(
                    RichText::new(format!(
                        "Max {} per file",
                        FileSizeUtils::format_size(self.coordinator.max_file_size())
                    ))
                    .small()
                    .color(self.palette.muted),
                );
            });
        });
    }

    fn render_row(
        &self,
        ui: &mut egui::Ui,
        row: &FileRow,
        now: Instant,
        actions: &mut Vec<RowAction>,
    ) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(row.kind.icon()).size(20.0));
                ui.vertical(|ui| {
                    ui.label(RichText::new(&row.name).strong());
                    ui.label(
                        RichText::new(FileSizeUtils::format_size(row.size))
                            .small()
                            .color(self.palette.muted),
                    );
                });

                ui.with_layout(egui::Layout::right_to_left(Align::Center), |ui| {
                    if ui.small_button("✖").on_hover_text("Remove").clicked() {
                        actions.push(RowAction::Remove(row.name.clone()));
                    }
                    let status = RichText::new(row.status.to_string());
                    if row.status.is_error() {
                        ui.label(status.color(self.palette.error));
                    } else {
                        ui.label(status);
                    }
                });
            });

            let fill = if row.status.is_error() {
                self.palette.error
            } else if row.uploaded {
                self.palette.success
            } else {
                self.palette.accent
            };
            ui.add(egui::ProgressBar::new(row.progress as f32 / 100.0).fill(fill));

            if let Some(error) = &row.error_message {
                ui.colored_label(self.palette.error, error);
            }

            if let Some(url) = &row.result_url {
                ui.horizontal(|ui| {
                    let mut shown = url.clone();
                    ui.add(
                        egui::TextEdit::singleline(&mut shown)
                            .desired_width(ui.available_width() - 150.0)
                            .font(egui::TextStyle::Monospace),
                    );

                    let copy = if self.coordinator.is_showing_copied(&row.name, now) {
                        egui::Button::new(RichText::new("✔ Copied").color(Color32::WHITE))
                            .fill(self.palette.copied)
                    } else {
                        egui::Button::new("📋 Copy")
                    };
                    if ui.add(copy).clicked() {
                        actions.push(RowAction::Copy(row.name.clone()));
                    }
                    if ui.button("🔗 Open").clicked() {
                        actions.push(RowAction::Open(url.clone()));
                    }
                });
            }
        });
    }

    fn render_footer(&self, ui: &mut egui::Ui) {
        ui.label(
            RichText::new(format!("Uploading to {}", self.endpoint))
                .small()
                .color(self.palette.muted),
        );

        if let Some(error) = &self.state.error_message {
            ui.add_space(5.0);
            ui.vertical_centered(|ui| {
                ui.colored_label(self.palette.error, error);
            });
        }
    }
}
