use std::env;
use std::path::{Path, PathBuf};

use eframe::egui::{self, ViewportCommand};

use crate::association::{self, AssociationManager, AssociationResult, UnassociationResult};
use crate::config::{LauncherConfig, SlicerEntry};
use crate::launch::{self, target_display_name, LaunchError};

pub const APP_TITLE: &str = "Slicer Launcher";
const SLICER_LIST_MAX_HEIGHT: f32 = 220.0;
const BUTTON_SIZE: [f32; 2] = [120.0, 24.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UiAction {
    Associate,
    Unassociate,
    Launch,
    Close,
}

pub struct SlicerLauncherApp {
    config: LauncherConfig,
    config_path: PathBuf,
    target_file: Option<PathBuf>,
    selected_index: Option<usize>,
    status_line: String,
}

impl SlicerLauncherApp {
    pub fn new(
        config: LauncherConfig,
        config_path: PathBuf,
        target_file: Option<PathBuf>,
        initial_status: Option<String>,
    ) -> Self {
        let selected_index = (!config.slicers.is_empty()).then_some(0);
        Self {
            config,
            config_path,
            target_file,
            selected_index,
            status_line: initial_status.unwrap_or_default(),
        }
    }

    fn selected_slicer(&self) -> Option<&SlicerEntry> {
        self.selected_index
            .and_then(|index| self.config.slicers.get(index))
    }

    fn launch_selected(&mut self, ctx: &egui::Context) {
        let Some(slicer) = self.selected_slicer().cloned() else {
            show_message(
                rfd::MessageLevel::Warning,
                "No Selection",
                "Please select a slicer to launch",
            );
            return;
        };

        match launch::launch(Path::new(&slicer.path), self.target_file.as_deref()) {
            Ok(()) => ctx.send_viewport_cmd(ViewportCommand::Close),
            Err(err) => {
                log::error!("{err}");
                let message = match &err {
                    LaunchError::HandlerNotFound(_) => format!(
                        "{err}\n\nPlease update the path in {}",
                        self.config_path.display()
                    ),
                    LaunchError::Spawn { .. } => err.to_string(),
                };
                self.status_line = format!("Could not launch {}.", slicer.name);
                show_message(rfd::MessageLevel::Error, "Error", &message);
            }
        }
    }

    fn associate_files(&mut self) {
        let mut store = match association::system_store() {
            Ok(store) => store,
            Err(err) => {
                show_message(rfd::MessageLevel::Info, "Info", &err.to_string());
                return;
            }
        };

        let handler_path = match env::current_exe() {
            Ok(path) => path,
            Err(err) => {
                show_message(
                    rfd::MessageLevel::Error,
                    "Error",
                    &format!("Failed to locate the launcher executable:\n{err}"),
                );
                return;
            }
        };

        let result = AssociationManager::new(store.as_mut())
            .associate(&self.config.file_extensions, &handler_path);
        self.status_line = association_status(&result);
        if result.is_success() {
            show_message(
                rfd::MessageLevel::Info,
                "File Association Complete",
                &result.summary(),
            );
        } else {
            show_message(
                rfd::MessageLevel::Error,
                "File Association Failed",
                &result.summary(),
            );
        }
    }

    fn unassociate_files(&mut self) {
        let mut store = match association::system_store() {
            Ok(store) => store,
            Err(err) => {
                show_message(rfd::MessageLevel::Info, "Info", &err.to_string());
                return;
            }
        };

        let confirmed = confirm(
            "Confirm Unassociation",
            "This will remove Slicer Launcher associations for all configured file types.\n\n\
             The files will revert to their previous default programs.\n\n\
             Continue?",
        );
        if !confirmed {
            return;
        }

        let result =
            AssociationManager::new(store.as_mut()).unassociate(&self.config.file_extensions);
        self.status_line = unassociation_status(&result);
        show_message(
            rfd::MessageLevel::Info,
            "Unassociation Complete",
            &result.summary(),
        );
    }

    fn show_menu_bar(&self, ctx: &egui::Context, action: &mut Option<UiAction>) {
        egui::TopBottomPanel::top("menubar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Associate File Types").clicked() {
                        *action = Some(UiAction::Associate);
                        ui.close_menu();
                    }
                    if ui.button("Restore Previous Associations").clicked() {
                        *action = Some(UiAction::Unassociate);
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Launch").clicked() {
                        *action = Some(UiAction::Launch);
                        ui.close_menu();
                    }
                    if ui.button("Close").clicked() {
                        *action = Some(UiAction::Close);
                        ui.close_menu();
                    }
                });
            });
        });
    }

    fn show_footer(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("footer")
            .show_separator_line(false)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                if !self.status_line.is_empty() {
                    ui.label(self.status_line.as_str());
                }
                ui.vertical_centered(|ui| {
                    ui.label(
                        egui::RichText::new(format!(
                            "Config file: {}\nEdit this file to add/remove slicers",
                            self.config_path.display()
                        ))
                        .small()
                        .color(egui::Color32::GRAY),
                    );
                });
                ui.add_space(6.0);
            });
    }
}

impl eframe::App for SlicerLauncherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut action = None::<UiAction>;
        let mut clicked_index = None::<usize>;

        ctx.input_mut(|input| {
            if input.consume_key(egui::Modifiers::COMMAND, egui::Key::W) {
                action = Some(UiAction::Close);
            } else if input.consume_key(egui::Modifiers::NONE, egui::Key::Enter) {
                action = Some(UiAction::Launch);
            }
        });

        self.show_menu_bar(ctx, &mut action);
        self.show_footer(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Select a Slicer");
                if let Some(target) = self.target_file.as_deref() {
                    ui.label(format!("File: {}", target_display_name(target)));
                }
            });
            ui.add_space(8.0);

            egui::ScrollArea::vertical()
                .id_salt("slicer-list")
                .max_height(SLICER_LIST_MAX_HEIGHT)
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    if self.config.slicers.is_empty() {
                        ui.label("No slicers configured.");
                    }
                    for (index, slicer) in self.config.slicers.iter().enumerate() {
                        let selected = self.selected_index == Some(index);
                        let response = ui.selectable_label(selected, slicer.name.as_str());
                        if response.clicked() {
                            clicked_index = Some(index);
                        }
                        if response.double_clicked() {
                            clicked_index = Some(index);
                            action = Some(UiAction::Launch);
                        }
                    }
                });

            ui.add_space(10.0);
            ui.horizontal(|ui| {
                let buttons_width = BUTTON_SIZE[0] * 2.0 + ui.spacing().item_spacing.x;
                ui.add_space(((ui.available_width() - buttons_width) / 2.0).max(0.0));
                if ui
                    .add_sized(BUTTON_SIZE, egui::Button::new("Launch"))
                    .clicked()
                {
                    action = Some(UiAction::Launch);
                }
                if ui
                    .add_sized(BUTTON_SIZE, egui::Button::new("Close"))
                    .clicked()
                {
                    action = Some(UiAction::Close);
                }
            });
        });

        if let Some(index) = clicked_index {
            self.selected_index = Some(index);
        }

        match action {
            Some(UiAction::Associate) => self.associate_files(),
            Some(UiAction::Unassociate) => self.unassociate_files(),
            Some(UiAction::Launch) => self.launch_selected(ctx),
            Some(UiAction::Close) => ctx.send_viewport_cmd(ViewportCommand::Close),
            None => {}
        }
    }
}

fn association_status(result: &AssociationResult) -> String {
    if result.failed.is_empty() {
        format!("Associated {} file type(s).", result.succeeded.len())
    } else {
        format!(
            "Associated {} file type(s), {} failed.",
            result.succeeded.len(),
            result.failed.len()
        )
    }
}

fn unassociation_status(result: &UnassociationResult) -> String {
    if result.failed.is_empty() {
        format!("Removed {} association(s).", result.removed.len())
    } else {
        format!(
            "Removed {} association(s), {} failed.",
            result.removed.len(),
            result.failed.len()
        )
    }
}

fn show_message(level: rfd::MessageLevel, title: &str, description: &str) {
    rfd::MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(description)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

fn confirm(title: &str, description: &str) -> bool {
    let answer = rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Warning)
        .set_title(title)
        .set_description(description)
        .set_buttons(rfd::MessageButtons::YesNo)
        .show();
    matches!(answer, rfd::MessageDialogResult::Yes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::association::ExtensionFailure;

    fn app_with(config: LauncherConfig) -> SlicerLauncherApp {
        SlicerLauncherApp::new(config, PathBuf::from("slicer_config.json"), None, None)
    }

    #[test]
    fn first_slicer_is_selected_by_default() {
        let app = app_with(LauncherConfig::default());
        assert_eq!(app.selected_index, Some(0));
        assert_eq!(
            app.selected_slicer().map(|slicer| slicer.name.as_str()),
            Some("Bambu Studio")
        );
    }

    #[test]
    fn empty_config_has_no_selection() {
        let app = app_with(LauncherConfig {
            slicers: Vec::new(),
            file_extensions: Vec::new(),
        });
        assert_eq!(app.selected_index, None);
        assert!(app.selected_slicer().is_none());
    }

    #[test]
    fn initial_status_is_shown() {
        let app = SlicerLauncherApp::new(
            LauncherConfig::default(),
            PathBuf::from("slicer_config.json"),
            Some(PathBuf::from("benchy.3mf")),
            Some("Failed to load config".to_string()),
        );
        assert_eq!(app.status_line, "Failed to load config");
        assert_eq!(app.target_file, Some(PathBuf::from("benchy.3mf")));
    }

    #[test]
    fn status_lines_count_outcomes() {
        let partial = AssociationResult {
            succeeded: vec![".3mf".to_string()],
            failed: vec![ExtensionFailure::new(".stl", "denied")],
        };
        assert_eq!(
            association_status(&partial),
            "Associated 1 file type(s), 1 failed."
        );
        assert_eq!(
            unassociation_status(&UnassociationResult::default()),
            "Removed 0 association(s)."
        );
    }
}
