//! Control panel

use std::path::{Path, PathBuf};

use modelview_core::ModelStats;
use modelview_gpu::{LoadReport, RenderMode, Renderer};

use crate::config::DefaultModel;

/// Slider ranges
pub const FOV_RANGE: std::ops::RangeInclusive<f32> = 10.0..=90.0;
pub const MOVEMENT_SPEED_RANGE: std::ops::RangeInclusive<f32> = 0.0..=10.0;
pub const LOOK_AROUND_SPEED_RANGE: std::ops::RangeInclusive<f32> = 0.0..=2.0;

/// A change requested through the panel, applied after the frame's UI pass
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    LoadModel(PathBuf),
    SetRenderMode(RenderMode),
    SetFov(f32),
    SetMovementSpeed(f32),
    SetLookAroundSpeed(f32),
    ResetCamera,
}

/// Panel state that persists across frames
#[derive(Debug, Clone)]
pub struct UiState {
    /// Index into the default model list
    pub selected_model: usize,
    pub model_path: String,
    pub render_mode: RenderMode,
    pub fov: f32,
    pub movement_speed: f32,
    pub look_around_speed: f32,
    /// Result of the last load
    pub status: String,
}

impl UiState {
    /// Initial values mirror the renderer's current settings
    pub fn new(renderer: &Renderer, models: &[DefaultModel]) -> Self {
        let model_path = models
            .first()
            .map(|model| model.path.display().to_string())
            .unwrap_or_default();
        Self {
            selected_model: 0,
            model_path,
            render_mode: renderer.render_mode(),
            fov: renderer.camera_fov(),
            movement_speed: renderer.camera_movement_speed(),
            look_around_speed: renderer.camera_look_around_speed(),
            status: "no model loaded".to_string(),
        }
    }

    /// Select a default model and copy its path into the path field.
    /// Out-of-range indices are ignored.
    pub fn select_default_model(&mut self, index: usize, models: &[DefaultModel]) {
        if let Some(model) = models.get(index) {
            self.selected_model = index;
            self.model_path = model.path.display().to_string();
        }
    }

    pub fn report_loaded(&mut self, path: &Path, report: &LoadReport) {
        self.status = format!("{}: {}", path.display(), report.stats);
        if !report.failed_textures.is_empty() {
            self.status
                .push_str(&format!(" ({} failed)", report.failed_textures.len()));
        }
    }

    pub fn report_error(&mut self, path: &Path, error: &dyn std::fmt::Display) {
        self.status = format!("failed to load {}: {error}", path.display());
    }

    /// Draw the panel and collect the requested changes
    pub fn show(&mut self, ctx: &egui::Context, models: &[DefaultModel], stats: ModelStats) -> Vec<UiAction> {
        let mut actions = Vec::new();

        egui::Window::new("modelview")
            .default_pos([10.0, 10.0])
            .resizable(false)
            .show(ctx, |ui| {
                let mut selected = self.selected_model;
                let selected_name = models
                    .get(selected)
                    .map(|model| model.name.as_str())
                    .unwrap_or("");
                egui::ComboBox::from_label("default model")
                    .selected_text(selected_name)
                    .show_ui(ui, |ui| {
                        for (index, model) in models.iter().enumerate() {
                            ui.selectable_value(&mut selected, index, model.name.as_str());
                        }
                    });
                if selected != self.selected_model {
                    self.select_default_model(selected, models);
                }

                ui.horizontal(|ui| {
                    ui.label("custom model filepath");
                    ui.text_edit_singleline(&mut self.model_path);
                });
                if ui.button("load model").clicked() {
                    actions.push(UiAction::LoadModel(PathBuf::from(self.model_path.trim())));
                }

                ui.separator();

                let previous_mode = self.render_mode;
                egui::ComboBox::from_label("render mode")
                    .selected_text(self.render_mode.label())
                    .show_ui(ui, |ui| {
                        for mode in RenderMode::ALL {
                            ui.selectable_value(&mut self.render_mode, mode, mode.label());
                        }
                    });
                if self.render_mode != previous_mode {
                    actions.push(UiAction::SetRenderMode(self.render_mode));
                }

                if ui.add(egui::Slider::new(&mut self.fov, FOV_RANGE).text("fov")).changed() {
                    actions.push(UiAction::SetFov(self.fov));
                }
                if ui
                    .add(egui::Slider::new(&mut self.movement_speed, MOVEMENT_SPEED_RANGE).text("movement speed"))
                    .changed()
                {
                    actions.push(UiAction::SetMovementSpeed(self.movement_speed));
                }
                if ui
                    .add(egui::Slider::new(&mut self.look_around_speed, LOOK_AROUND_SPEED_RANGE).text("look around speed"))
                    .changed()
                {
                    actions.push(UiAction::SetLookAroundSpeed(self.look_around_speed));
                }
                if ui.button("reset camera").clicked() {
                    actions.push(UiAction::ResetCamera);
                }

                ui.separator();
                ui.label(self.status.as_str());
                ui.label(stats.to_string());
                ui.small("W/A/S/D move, J/K up/down, right drag to look around");
            });

        actions
    }
}
