use eframe::egui;
use mehfil::engine::round::{LINES_PER_ROUND, MAX_LINE_CHARS};
use mehfil::engine::EngineCommand;

use super::app::{bubble, MehfilApp};

const OWN_LINE: egui::Color32 = egui::Color32::from_rgb(40, 70, 120);
const OTHER_LINE: egui::Color32 = egui::Color32::from_rgb(90, 60, 120);

pub fn draw_center_panel(ctx: &egui::Context, app: &mut MehfilApp) {
    let Some(snapshot) = app.ui.snapshot.clone() else {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label("Loading…");
        });
        return;
    };
    let round = &snapshot.round;

    // ---------- Input bar ----------
    egui::TopBottomPanel::bottom("round_input").show(ctx, |ui| {
        if !round.active {
            ui.horizontal(|ui| {
                ui.label("Participants");
                ui.add(
                    egui::TextEdit::singleline(&mut app.ui.participants_input)
                        .hint_text("ids, comma separated (empty for solo)"),
                );
                if ui.button("Start round").clicked() {
                    let participants = app
                        .ui
                        .participants_input
                        .split(',')
                        .map(str::trim)
                        .filter(|id| !id.is_empty())
                        .map(str::to_string)
                        .collect();
                    app.send_command(EngineCommand::StartRound(participants));
                    app.ui.finished_story = None;
                }
            });
            return;
        }

        let my_turn = snapshot.current_author.as_deref() == Some(snapshot.local_id.as_str());
        let mut send_now = false;

        ui.horizontal(|ui| {
            let response = ui.add_sized(
                [ui.available_width() - 140.0, 24.0],
                egui::TextEdit::singleline(&mut app.ui.line_input)
                    .char_limit(MAX_LINE_CHARS)
                    .hint_text("Agli line…"),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                send_now = true;
            }
            if ui
                .add_enabled(my_turn, egui::Button::new("Send"))
                .clicked()
            {
                send_now = true;
            }
            if ui.button("Finish").clicked() {
                app.send_command(EngineCommand::FinishRound);
            }
        });

        let text = app.ui.line_input.trim().to_string();
        if send_now && my_turn && !text.is_empty() {
            app.send_command(EngineCommand::AddLine(text));
            app.ui.line_input.clear();
        }
    });

    // ---------- Round ----------
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Qissa");

        if let Some(story) = &app.ui.finished_story {
            ui.separator();
            ui.label(egui::RichText::new(story).italics().size(18.0));
            if ui.small_button("Dismiss").clicked() {
                app.ui.finished_story = None;
            }
        }

        if !round.active {
            ui.label("No round in progress.");
            return;
        }

        ui.label(format!("{} / {} lines", round.lines.len(), LINES_PER_ROUND));
        if let Some(author) = &snapshot.current_author {
            ui.label(format!("Next: {}", app.ui.display_name(author)));
        }
        ui.separator();

        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in &round.lines {
                    let color = if line.author_id == snapshot.local_id {
                        OWN_LINE
                    } else {
                        OTHER_LINE
                    };
                    ui.add_space(6.0);
                    bubble(
                        ui,
                        color,
                        &format!("{}: {}", app.ui.display_name(&line.author_id), line.text),
                    );
                }
            });
    });
}
