use eframe::egui;
use egui::{Color32, RichText};
use shared::domain::{Label, Prediction};

const REAL_COLOR: Color32 = Color32::from_rgb(22, 101, 52);
const REAL_FILL: Color32 = Color32::from_rgb(34, 197, 94);
const REAL_BG: Color32 = Color32::from_rgb(220, 252, 231);
const FAKE_COLOR: Color32 = Color32::from_rgb(153, 27, 27);
const FAKE_FILL: Color32 = Color32::from_rgb(239, 68, 68);
const FAKE_BG: Color32 = Color32::from_rgb(254, 226, 226);
const UNCERTAIN_COLOR: Color32 = Color32::from_rgb(133, 77, 14);
const UNCERTAIN_BG: Color32 = Color32::from_rgb(254, 249, 195);

pub fn character_count_label(text: &str) -> String {
    format!("{} characters", text.chars().count())
}

/// Bar width for a percentage; out-of-range values from the service are clamped.
pub fn bar_fraction(percent: f64) -> f32 {
    if percent.is_nan() {
        return 0.0;
    }
    (percent / 100.0).clamp(0.0, 1.0) as f32
}

fn label_colors(label: Label) -> (Color32, Color32) {
    match label {
        Label::Real => (REAL_COLOR, REAL_BG),
        Label::Fake => (FAKE_COLOR, FAKE_BG),
        Label::Uncertain => (UNCERTAIN_COLOR, UNCERTAIN_BG),
    }
}

pub fn prediction_card(ui: &mut egui::Ui, prediction: &Prediction, dimmed: bool) {
    let (text_color, bg) = label_colors(prediction.label);
    let (text_color, bg) = if dimmed {
        (text_color.gamma_multiply(0.5), bg.gamma_multiply(0.5))
    } else {
        (text_color, bg)
    };

    egui::Frame::new()
        .fill(bg)
        .corner_radius(12.0)
        .inner_margin(16.0)
        .show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new(prediction.label.headline())
                        .size(22.0)
                        .strong()
                        .color(text_color),
                );
                ui.label(
                    RichText::new(format!("Confidence: {}%", prediction.confidence))
                        .size(16.0)
                        .color(text_color),
                );
            });
        });

    ui.add_space(12.0);
    probability_bar(ui, "Fake Probability", prediction.probabilities.fake, FAKE_FILL);
    ui.add_space(6.0);
    probability_bar(ui, "Real Probability", prediction.probabilities.real, REAL_FILL);
}

fn probability_bar(ui: &mut egui::Ui, caption: &str, percent: f64, fill: Color32) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(caption).strong().color(fill));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(RichText::new(format!("{percent}%")).strong().color(fill));
        });
    });
    ui.add(
        egui::ProgressBar::new(bar_fraction(percent))
            .fill(fill)
            .desired_height(14.0),
    );
}
