use std::time::Duration;

use chrono::Local;
use client_core::{ControllerSnapshot, DisplayOutcome};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use egui::{Color32, RichText};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::widgets::{character_count_label, prediction_card};

const ERROR_COLOR: Color32 = Color32::from_rgb(239, 68, 68);
const ACCENT_COLOR: Color32 = Color32::from_rgb(126, 34, 206);

pub struct PredictorApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    api_base_url: String,
    input: String,
    snapshot: ControllerSnapshot,
    status: Option<String>,
    backend_error: Option<UiError>,
}

impl PredictorApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        api_base_url: String,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            api_base_url,
            input: String::new(),
            snapshot: ControllerSnapshot::default(),
            status: None,
            backend_error: None,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Snapshot(snapshot) => self.snapshot = snapshot,
                UiEvent::Error(err) => {
                    tracing::warn!(context = ?err.context(), "{}", err.message());
                    self.backend_error = Some(err);
                }
            }
        }
    }

    fn can_submit(&self) -> bool {
        !self.snapshot.is_pending()
            && self
                .backend_error
                .as_ref()
                .map_or(true, |err| !err.blocks_submission())
    }

    fn show_form(&mut self, ui: &mut egui::Ui) {
        let response = ui.add(
            egui::TextEdit::multiline(&mut self.input)
                .hint_text("Paste or type a news article here...")
                .desired_rows(10)
                .desired_width(f32::INFINITY),
        );
        if response.changed() {
            dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::UpdateInput {
                    text: self.input.clone(),
                },
                &mut self.status,
            );
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
            ui.label(RichText::new(character_count_label(&self.input)).small().weak());
        });

        ui.add_space(8.0);
        let pending = self.snapshot.is_pending();
        let can_submit = self.can_submit();
        let button_text = if pending { "Analyzing..." } else { "Check News" };
        let button = egui::Button::new(RichText::new(button_text).size(18.0).strong())
            .min_size(egui::vec2(ui.available_width(), 40.0));
        ui.horizontal(|ui| {
            if ui.add_enabled(can_submit, button).clicked() {
                dispatch_backend_command(&self.cmd_tx, BackendCommand::Submit, &mut self.status);
            }
            if pending {
                ui.add(egui::Spinner::new());
            }
        });
    }

    fn show_outcome(&self, ui: &mut egui::Ui) {
        ui.add_space(16.0);
        match self.snapshot.outcome() {
            DisplayOutcome::Nothing => {}
            DisplayOutcome::Pending { previous } => {
                if let Some(previous) = previous {
                    prediction_card(ui, previous, true);
                }
            }
            DisplayOutcome::Error(message) => {
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new(message).strong().color(ERROR_COLOR));
                });
            }
            DisplayOutcome::Prediction(prediction) => {
                prediction_card(ui, prediction, false);
                if let Some(checked_at) = self.snapshot.checked_at {
                    ui.add_space(6.0);
                    ui.label(
                        RichText::new(format!(
                            "Checked at {}",
                            checked_at.with_timezone(&Local).format("%H:%M:%S")
                        ))
                        .small()
                        .weak(),
                    );
                }
            }
        }
    }
}

impl eframe::App for PredictorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(
                        RichText::new("Fake News Detector")
                            .size(30.0)
                            .strong()
                            .color(ACCENT_COLOR),
                    );
                    ui.label(
                        RichText::new("Text classification by the prediction service").weak(),
                    );
                });
                ui.add_space(12.0);

                self.show_form(ui);

                if let Some(err) = &self.backend_error {
                    ui.add_space(8.0);
                    ui.label(RichText::new(err.message()).color(ERROR_COLOR));
                }
                if let Some(status) = &self.status {
                    ui.add_space(8.0);
                    ui.label(RichText::new(status).color(ERROR_COLOR));
                }

                self.show_outcome(ui);

                ui.add_space(16.0);
                ui.vertical_centered(|ui| {
                    ui.label(
                        RichText::new(format!("Service: {}", self.api_base_url))
                            .small()
                            .weak(),
                    );
                });
            });
        });

        if self.snapshot.is_pending() {
            ctx.request_repaint_after(Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
