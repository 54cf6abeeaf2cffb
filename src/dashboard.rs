// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Dashboard cards, alert banners, and header rendering.
//!
//! All widgets here are pure functions of the latest reading snapshot;
//! severity colors and badge texts come from the classify layer.

use egui;
use firesense_client::classify::{
    celsius_to_fahrenheit, co_severity, humidity_severity, temperature_severity, Severity,
};

/// Badge/bar color for a severity level
#[must_use]
pub fn severity_color(severity: Severity) -> egui::Color32 {
    match severity {
        Severity::Normal => egui::Color32::from_rgb(70, 160, 90),
        Severity::Warning => egui::Color32::from_rgb(210, 160, 40),
        Severity::Danger => egui::Color32::from_rgb(200, 55, 55),
    }
}

/// Temperature bar fill, full scale at 50 °C
#[must_use]
pub fn temperature_bar_fraction(celsius: f64) -> f32 {
    ((celsius / 50.0).clamp(0.0, 1.0)) as f32
}

/// Humidity bar fill, full scale at 100%
#[must_use]
pub fn humidity_bar_fraction(percent: f64) -> f32 {
    ((percent / 100.0).clamp(0.0, 1.0)) as f32
}

/// Shared frame styling for dashboard cards
#[must_use]
pub fn card_frame(ui: &egui::Ui) -> egui::Frame {
    egui::Frame::group(ui.style())
        .fill(egui::Color32::from_rgba_unmultiplied(30, 34, 40, 240))
        .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(55, 62, 70)))
        .corner_radius(6.0)
        .inner_margin(egui::Margin::same(10))
}

fn card_title(ui: &mut egui::Ui, icon: &str, title: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(icon).size(13.0));
        ui.label(egui::RichText::new(title)
            .color(egui::Color32::from_rgb(210, 220, 230))
            .size(12.0)
            .strong());
    });
    ui.add_space(4.0);
}

/// Small filled badge in the card corner style
pub fn draw_badge(ui: &mut egui::Ui, text: &str, fill: egui::Color32) {
    egui::Frame::new()
        .fill(fill)
        .corner_radius(4.0)
        .inner_margin(egui::Margin::symmetric(8, 3))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text)
                .color(egui::Color32::WHITE)
                .size(10.0)
                .strong());
        });
}

fn draw_level_bar(ui: &mut egui::Ui, fraction: f32, fill: egui::Color32) {
    let (rect, _response) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), 8.0),
        egui::Sense::hover(),
    );
    let painter = ui.painter();

    painter.rect_filled(rect, 4.0, egui::Color32::from_rgb(50, 55, 62));

    let filled = egui::Rect::from_min_size(
        rect.min,
        egui::vec2(rect.width() * fraction.clamp(0.0, 1.0), rect.height()),
    );
    painter.rect_filled(filled, 4.0, fill);
}

/// Header strip: title, online dot, signal and battery indicators
pub fn draw_header(
    ui: &mut egui::Ui,
    is_online: bool,
    signal_bars: u8,
    battery_percent: f64,
) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("🎥").size(22.0));

        ui.vertical(|ui| {
            ui.label(egui::RichText::new("EmberWatch")
                .color(egui::Color32::from_rgb(230, 235, 240))
                .size(18.0)
                .strong());
            ui.label(egui::RichText::new("Emergency Monitoring & Detection")
                .color(egui::Color32::from_rgb(150, 155, 160))
                .size(10.0));
        });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(egui::RichText::new(format!("🔋 {:.0}%", battery_percent))
                .color(egui::Color32::from_rgb(200, 200, 200))
                .size(11.0));

            ui.add_space(8.0);

            ui.label(egui::RichText::new(format!("📶 {}/4", signal_bars))
                .color(egui::Color32::from_rgb(200, 200, 200))
                .size(11.0));

            ui.add_space(8.0);

            let (dot_color, text) = if is_online {
                (egui::Color32::from_rgb(80, 220, 80), "Online")
            } else {
                (egui::Color32::from_rgb(220, 70, 70), "Offline")
            };
            ui.label(egui::RichText::new(text)
                .color(egui::Color32::from_rgb(200, 200, 200))
                .size(11.0));
            ui.label(egui::RichText::new("●").color(dot_color).size(10.0));
        });
    });
}

/// Alert banners shown above the grid while an alarm is active
pub fn draw_alerts(ui: &mut egui::Ui, fire_active: bool, co_alarm: bool) {
    if !fire_active && !co_alarm {
        return;
    }

    if fire_active {
        egui::Frame::new()
            .fill(egui::Color32::from_rgba_unmultiplied(200, 40, 40, 40))
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(220, 60, 60)))
            .corner_radius(6.0)
            .inner_margin(egui::Margin::same(8))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("⚠").size(14.0)
                        .color(egui::Color32::from_rgb(255, 90, 90)));
                    ui.label(egui::RichText::new("FIRE DETECTED!")
                        .color(egui::Color32::from_rgb(255, 150, 150))
                        .size(12.0)
                        .strong());
                    ui.label(egui::RichText::new(
                        "Immediate evacuation required. Emergency services have been notified.")
                        .color(egui::Color32::from_rgb(255, 170, 170))
                        .size(11.0));
                });
            });
        ui.add_space(4.0);
    }

    if co_alarm {
        egui::Frame::new()
            .fill(egui::Color32::from_rgba_unmultiplied(200, 170, 40, 40))
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(220, 190, 60)))
            .corner_radius(6.0)
            .inner_margin(egui::Margin::same(8))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("⚠").size(14.0)
                        .color(egui::Color32::from_rgb(255, 210, 90)));
                    ui.label(egui::RichText::new("HIGH CO LEVELS DETECTED!")
                        .color(egui::Color32::from_rgb(255, 225, 140))
                        .size(12.0)
                        .strong());
                    ui.label(egui::RichText::new(
                        "Carbon monoxide concentration is above safe limits.")
                        .color(egui::Color32::from_rgb(255, 230, 160))
                        .size(11.0));
                });
            });
        ui.add_space(4.0);
    }

    ui.add_space(4.0);
}

/// Fire detection card with the round indicator
pub fn draw_fire_card(ui: &mut egui::Ui, fire_detected: bool) {
    card_frame(ui).show(ui, |ui| {
        ui.set_width(ui.available_width());
        card_title(ui, "🔥", "Fire Detection");

        ui.vertical_centered(|ui| {
            // Round indicator
            let (rect, _response) =
                ui.allocate_exact_size(egui::vec2(56.0, 56.0), egui::Sense::hover());
            let color = if fire_detected {
                egui::Color32::from_rgb(220, 60, 60)
            } else {
                egui::Color32::from_rgb(70, 180, 90)
            };
            ui.painter().circle_filled(rect.center(), 28.0, color);
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "🔥",
                egui::FontId::proportional(22.0),
                egui::Color32::WHITE,
            );

            ui.add_space(6.0);

            let (badge_text, badge_color) = if fire_detected {
                ("FIRE DETECTED", egui::Color32::from_rgb(200, 55, 55))
            } else {
                ("NO FIRE", egui::Color32::from_rgb(70, 160, 90))
            };
            draw_badge(ui, badge_text, badge_color);
        });
    });
}

/// Carbon monoxide card with the threshold legend
pub fn draw_co_card(ui: &mut egui::Ui, co_ppm: f64) {
    let severity = co_severity(co_ppm);

    card_frame(ui).show(ui, |ui| {
        ui.set_width(ui.available_width());
        card_title(ui, "💨", "Carbon Monoxide");

        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new(format!("{:.1} ppm", co_ppm))
                .color(egui::Color32::from_rgb(230, 235, 240))
                .size(24.0)
                .strong());

            ui.add_space(4.0);
            draw_badge(ui, severity.co_label(), severity_color(severity));
            ui.add_space(6.0);

            ui.label(egui::RichText::new("Safe: <30 ppm | Warning: 30-50 ppm | Danger: >50 ppm")
                .color(egui::Color32::from_rgb(140, 145, 150))
                .size(9.0));
        });
    });
}

/// Temperature card with Fahrenheit subtitle and level bar
pub fn draw_temperature_card(ui: &mut egui::Ui, celsius: f64) {
    let severity = temperature_severity(celsius);

    card_frame(ui).show(ui, |ui| {
        ui.set_width(ui.available_width());
        card_title(ui, "🌡", "Temperature");

        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(egui::RichText::new(format!("{:.1}°C", celsius))
                    .color(egui::Color32::from_rgb(230, 235, 240))
                    .size(24.0)
                    .strong());
                ui.label(egui::RichText::new(format!("{:.1}°F", celsius_to_fahrenheit(celsius)))
                    .color(egui::Color32::from_rgb(150, 155, 160))
                    .size(11.0));
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                draw_badge(ui, severity.temperature_label(), severity_color(severity));
            });
        });

        ui.add_space(8.0);
        draw_level_bar(ui, temperature_bar_fraction(celsius), severity_color(severity));
    });
}

/// Humidity card with level bar
pub fn draw_humidity_card(ui: &mut egui::Ui, percent: f64) {
    let severity = humidity_severity(percent);

    // Normal humidity fills blue, elevated tiers take the severity color
    let bar_color = match severity {
        Severity::Normal => egui::Color32::from_rgb(70, 130, 200),
        _ => severity_color(severity),
    };

    card_frame(ui).show(ui, |ui| {
        ui.set_width(ui.available_width());
        card_title(ui, "💧", "Humidity");

        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(egui::RichText::new(format!("{:.1}%", percent))
                    .color(egui::Color32::from_rgb(230, 235, 240))
                    .size(24.0)
                    .strong());
                ui.label(egui::RichText::new("Relative Humidity")
                    .color(egui::Color32::from_rgb(150, 155, 160))
                    .size(11.0));
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                draw_badge(ui, severity.humidity_label(), severity_color(severity));
            });
        });

        ui.add_space(8.0);
        draw_level_bar(ui, humidity_bar_fraction(percent), bar_color);
    });
}

/// Bottom strip with system indicator dots
pub fn draw_system_strip(ui: &mut egui::Ui, battery_percent: f64, camera_active: bool) {
    ui.horizontal(|ui| {
        let dot = |ui: &mut egui::Ui, color: egui::Color32, text: String| {
            ui.label(egui::RichText::new("●").color(color).size(9.0));
            ui.label(egui::RichText::new(text)
                .color(egui::Color32::from_rgb(190, 195, 200))
                .size(10.0));
            ui.add_space(14.0);
        };

        let green = egui::Color32::from_rgb(80, 220, 80);
        let grey = egui::Color32::from_rgb(130, 135, 140);
        let yellow = egui::Color32::from_rgb(220, 190, 60);

        dot(ui, green, "Drone Online".to_string());
        dot(ui, green, "Sensors Active".to_string());
        dot(
            ui,
            if camera_active { green } else { grey },
            "Video Stream".to_string(),
        );
        dot(ui, yellow, format!("Battery: {:.0}%", battery_percent));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_bar_clamps() {
        assert_eq!(temperature_bar_fraction(25.0), 0.5);
        assert_eq!(temperature_bar_fraction(75.0), 1.0);
        assert_eq!(temperature_bar_fraction(-5.0), 0.0);
    }

    #[test]
    fn test_humidity_bar_tracks_percent() {
        assert_eq!(humidity_bar_fraction(90.0), 0.9);
        assert_eq!(humidity_bar_fraction(120.0), 1.0);
    }

    #[test]
    fn test_severity_colors_distinct() {
        let normal = severity_color(Severity::Normal);
        let warning = severity_color(Severity::Warning);
        let danger = severity_color(Severity::Danger);
        assert_ne!(normal, warning);
        assert_ne!(warning, danger);
    }
}
