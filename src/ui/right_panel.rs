use chrono::{Local, TimeZone};
use eframe::egui;

use super::app::UiState;

pub fn draw_right_panel(ctx: &egui::Context, ui_state: &UiState) {
    egui::SidePanel::right("right")
        .resizable(true)
        .default_width(300.0)
        .min_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Purane Qisse");
            ui.separator();

            let Some(snapshot) = &ui_state.snapshot else {
                return;
            };

            egui::ScrollArea::vertical().show(ui, |ui| {
                if snapshot.archive.is_empty() {
                    ui.label("None");
                }
                // Newest first.
                for entry in snapshot.archive.iter().rev() {
                    ui.collapsing(format!("{} · {}", format_time(entry.created_at), entry.id), |ui| {
                        ui.label(&entry.story);
                        let names: Vec<String> = entry
                            .participant_ids
                            .iter()
                            .map(|id| ui_state.display_name(id))
                            .collect();
                        ui.small(names.join(", "));
                    });
                }

                ui.separator();
                ui.heading("Completed");
                for qissa in snapshot.qissas.iter().filter(|q| q.completed) {
                    ui.collapsing(&qissa.title, |ui| {
                        for line in &qissa.lines {
                            ui.label(format!("• {}", line.text));
                        }
                    });
                }
            });
        });
}

fn format_time(ms: i64) -> String {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|t| t.format("%d %b %H:%M").to_string())
        .unwrap_or_else(|| "?".into())
}
