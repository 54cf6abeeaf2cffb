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

//! Trend plot window for the retained reading history.

use chrono::Utc;
use egui;
use egui_plot::{Line, Plot, PlotPoints};
use firesense_client::ReadingSample;

pub struct TrendPane {
    pub visible: bool,
}

impl TrendPane {
    pub fn new(visible: bool) -> Self {
        Self { visible }
    }

    /// Render the trend window. X axis is seconds before now.
    pub fn render(&mut self, ctx: &egui::Context, history: &[ReadingSample]) {
        if !self.visible {
            return;
        }

        let mut visible = self.visible;

        egui::Window::new("Trends")
            .default_pos(egui::pos2(60.0, 60.0))
            .default_width(420.0)
            .resizable(true)
            .collapsible(true)
            .open(&mut visible)
            .show(ctx, |ui| {
                if history.len() < 2 {
                    ui.label(egui::RichText::new("Collecting samples...")
                        .color(egui::Color32::from_rgb(150, 150, 150))
                        .size(11.0)
                        .italics());
                    return;
                }

                let now = Utc::now();
                let age_secs = |sample: &ReadingSample| {
                    -((now - sample.timestamp).num_milliseconds() as f64 / 1000.0)
                };

                plot_series(
                    ui,
                    "temperature_trend",
                    "Temperature (°C)",
                    egui::Color32::from_rgb(220, 120, 70),
                    history.iter().map(|s| [age_secs(s), s.temperature_c]),
                );

                plot_series(
                    ui,
                    "humidity_trend",
                    "Humidity (%)",
                    egui::Color32::from_rgb(70, 130, 200),
                    history.iter().map(|s| [age_secs(s), s.humidity_pct]),
                );

                plot_series(
                    ui,
                    "co_trend",
                    "CO (ppm)",
                    egui::Color32::from_rgb(180, 180, 90),
                    history.iter().map(|s| [age_secs(s), s.co_ppm]),
                );
            });

        self.visible = visible;
    }
}

fn plot_series(
    ui: &mut egui::Ui,
    id: &str,
    name: &str,
    color: egui::Color32,
    points: impl Iterator<Item = [f64; 2]>,
) {
    ui.label(egui::RichText::new(name)
        .color(egui::Color32::from_rgb(170, 175, 180))
        .size(10.0)
        .strong());

    let line = Line::new(name, PlotPoints::from_iter(points))
        .color(color)
        .width(1.5);

    Plot::new(id)
        .height(100.0)
        .include_y(0.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show_x(false)
        .show(ui, |plot_ui| {
            plot_ui.line(line);
        });

    ui.add_space(6.0);
}
