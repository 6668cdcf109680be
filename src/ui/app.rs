use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use eframe::egui;
use mehfil::config::{data_dir, AppSettings};
use mehfil::engine::{identity, Engine, EngineCommand, EngineResponse, SystemClock};
use mehfil::model::{CousinProfile, QissaSnapshot};
use mehfil::store::{FileStore, KvStore};
use tracing::warn;

use super::center_panel::draw_center_panel;
use super::left_panel::draw_left_panel;
use super::right_panel::draw_right_panel;

/* =========================
   UI State
   ========================= */

#[derive(Default)]
pub struct UiState {
    pub line_input: String,
    pub turn_input: String,
    pub participants_input: String,
    pub qissa_title: String,

    pub snapshot: Option<QissaSnapshot>,
    pub profile: Option<CousinProfile>,

    /// Story of the round that just finished, shown until dismissed.
    pub finished_story: Option<String>,
    pub status: Option<String>,

    pub settings: AppSettings,
}

impl UiState {
    /// Profile name for ourselves, otherwise the first block of the id.
    pub fn display_name(&self, id: &str) -> String {
        if let Some(profile) = self.profile.as_ref().filter(|p| p.id == id) {
            return profile.preferred_name.clone();
        }
        id.split('-').next().unwrap_or(id).to_string()
    }
}

/* =========================
   App
   ========================= */

pub struct MehfilApp {
    pub ui: UiState,

    cmd_tx: mpsc::Sender<EngineCommand>,
    resp_rx: mpsc::Receiver<EngineResponse>,
}

impl MehfilApp {
    pub fn new(settings: AppSettings) -> anyhow::Result<Self> {
        let dir = data_dir(&settings);
        let store: Arc<dyn KvStore> = Arc::new(
            FileStore::open(&dir).with_context(|| format!("opening store at {}", dir.display()))?,
        );

        let local_id = identity::load_or_create_id(store.as_ref())?;
        let profile = identity::load_profile(store.as_ref())?;

        let (cmd_tx, resp_rx) =
            Engine::spawn(store, Arc::new(SystemClock), local_id, settings.poll());

        Ok(Self {
            ui: UiState {
                profile,
                settings,
                ..Default::default()
            },
            cmd_tx,
            resp_rx,
        })
    }

    pub fn send_command(&self, cmd: EngineCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            warn!("engine thread is gone");
        }
    }

    fn drain_responses(&mut self) {
        while let Ok(resp) = self.resp_rx.try_recv() {
            match resp {
                EngineResponse::Snapshot(snapshot) => {
                    self.ui.snapshot = Some(*snapshot);
                }
                EngineResponse::RoundArchived(entry) => {
                    self.ui.finished_story = Some(entry.story);
                }
                EngineResponse::NotEnoughCousins { active } => {
                    self.ui.status = Some(format!(
                        "Kam se kam do log hone chahiye Qissa Goi ke liye ({active} online)."
                    ));
                }
                EngineResponse::StoreFailed(message) => {
                    self.ui.status = Some(format!("Storage error: {message}"));
                }
            }
        }
    }
}

impl Drop for MehfilApp {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }
}

/* =========================
   egui App
   ========================= */

impl eframe::App for MehfilApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.ui.settings.ui_scale);

        self.drain_responses();

        draw_left_panel(ctx, self);
        draw_right_panel(ctx, &self.ui);
        draw_center_panel(ctx, self);

        // Snapshots arrive from the engine thread between input events.
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}

/* =========================
   UI Helpers
   ========================= */

pub fn bubble(ui: &mut egui::Ui, color: egui::Color32, text: &str) {
    egui::Frame::new()
        .fill(color)
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).color(egui::Color32::WHITE));
        });
}
