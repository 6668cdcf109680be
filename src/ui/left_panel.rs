use eframe::egui;
use mehfil::config::save_settings;
use mehfil::engine::round::MAX_LINE_CHARS;
use mehfil::engine::EngineCommand;
use tracing::warn;

use super::app::MehfilApp;

pub fn draw_left_panel(ctx: &egui::Context, app: &mut MehfilApp) {
    egui::SidePanel::left("left")
        .resizable(false)
        .default_width(240.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                draw_presence(ui, app);
                ui.separator();
                draw_qissa_goi(ui, app);
                ui.separator();
                draw_settings(ui, app);
            });
        });
}

fn draw_presence(ui: &mut egui::Ui, app: &mut MehfilApp) {
    let Some(snapshot) = &app.ui.snapshot else {
        return;
    };

    ui.heading(app.ui.display_name(&snapshot.local_id));
    ui.label(format!("{} online", snapshot.active_users));

    if let Some(status) = &app.ui.status {
        ui.colored_label(egui::Color32::LIGHT_RED, status);
        if ui.small_button("OK").clicked() {
            app.ui.status = None;
        }
    }
}

/* -------- Turn-timed Qissa -------- */

fn draw_qissa_goi(ui: &mut egui::Ui, app: &mut MehfilApp) {
    let Some(snapshot) = app.ui.snapshot.clone() else {
        return;
    };

    ui.heading("Qissa Goi");

    if let Some(notification) = snapshot.notification.as_ref().filter(|n| n.is_new) {
        ui.horizontal(|ui| {
            ui.label(format!("Naya qissa: {}", notification.title));
            if ui.small_button("Join").clicked() {
                app.send_command(EngineCommand::JoinActiveQissa);
            }
            if ui.small_button("✕").clicked() {
                app.send_command(EngineCommand::DismissNotification);
            }
        });
    }

    match &snapshot.active_qissa {
        Some(qissa) => {
            ui.label(egui::RichText::new(&qissa.title).strong());
            for line in &qissa.lines {
                ui.label(format!("• {}", line.text));
            }

            let turn = &snapshot.turn;
            ui.label(format!("{} log", turn.participants.len()));
            if !turn.participants.contains(&snapshot.local_id) {
                if ui.button("Join").clicked() {
                    app.send_command(EngineCommand::JoinActiveQissa);
                }
            } else if let Some(current) = &turn.turn {
                ui.label(format!(
                    "{} ki baari · {}s",
                    app.ui.display_name(&current.user_id),
                    turn.time_remaining
                ));
            } else {
                ui.label("Intezaar kijiye jab tak doosre aayein.");
            }

            ui.add(
                egui::TextEdit::singleline(&mut app.ui.turn_input)
                    .char_limit(MAX_LINE_CHARS)
                    .hint_text("Apni line…"),
            );
            ui.horizontal(|ui| {
                let text = app.ui.turn_input.trim().to_string();
                if ui
                    .add_enabled(turn.is_my_turn && !text.is_empty(), egui::Button::new("Likho"))
                    .clicked()
                {
                    app.send_command(EngineCommand::SubmitTurnLine(text));
                    app.ui.turn_input.clear();
                }
                if ui
                    .add_enabled(turn.is_my_turn, egui::Button::new("Skip"))
                    .clicked()
                {
                    app.send_command(EngineCommand::NextTurn);
                }
                if ui.button("Complete").clicked() {
                    app.send_command(EngineCommand::CompleteQissa(qissa.id.clone()));
                }
            });
        }
        None => {
            ui.label("Koi qissa nahi chal raha.");
        }
    }

    ui.horizontal(|ui| {
        ui.text_edit_singleline(&mut app.ui.qissa_title);
        let title = app.ui.qissa_title.trim().to_string();
        if ui
            .add_enabled(!title.is_empty(), egui::Button::new("New"))
            .clicked()
        {
            app.send_command(EngineCommand::StartNewQissa(title));
            app.ui.qissa_title.clear();
        }
    });
}

/* -------- Settings -------- */

fn draw_settings(ui: &mut egui::Ui, app: &mut MehfilApp) {
    ui.collapsing("Settings", |ui| {
        let settings = &mut app.ui.settings;

        ui.label("UI Scale");
        ui.add(egui::Slider::new(&mut settings.ui_scale, 0.75..=2.0));

        ui.label("Poll interval (ms)");
        ui.add(egui::DragValue::new(&mut settings.poll_interval_ms).range(100..=10_000));

        ui.label("Poll jitter (ms)");
        ui.add(egui::DragValue::new(&mut settings.poll_jitter_ms).range(0..=5_000));

        ui.label("Log filter");
        ui.text_edit_singleline(&mut settings.log_filter);

        if ui.button("Save").clicked() {
            // Poll and log changes take effect on next launch.
            if let Err(err) = save_settings(settings) {
                warn!(error = %err, "failed to save settings");
            }
        }
    });
}
