//! The mod arranger window: a profile picker, the draggable load order and a save button.

use eframe::egui;
use egui::{Color32, Vec2};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::mod_settings::{ModEntry, ModSettings, ModSettingsError};
use crate::profiles::{GameDataError, GamePaths};
use crate::{DdList, DdListError, EventDispatcher, ItemStyle, ListLayout};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    GameData(#[from] GameDataError),
    #[error(transparent)]
    Settings(#[from] ModSettingsError),
    #[error(transparent)]
    List(#[from] DdListError),
    #[error("Wait for the drag to finish before saving")]
    Dragging,
    #[error("No profile selected")]
    NoProfile,
}

/// The load order of one profile being edited.
struct Session {
    profile: String,
    settings: ModSettings,
    list: DdList<ModEntry>,
}

impl Session {
    fn open(paths: &GamePaths, profile: &str, layout: ListLayout) -> Result<Self, AppError> {
        let mut settings = ModSettings::load(&paths.mod_settings_path(profile))?;
        settings.extend_names(paths.scan_mod_names()?);

        let mut list = DdList::new(layout);
        for entry in settings.order() {
            let item = list.create_item(entry.clone(), ItemStyle::default());
            list.append(item)?;
        }

        Ok(Self {
            profile: profile.to_owned(),
            settings,
            list,
        })
    }

    fn save(&mut self) -> Result<(), AppError> {
        if self.list.is_dragging() {
            return Err(AppError::Dragging);
        }

        let order: Vec<ModEntry> = self.list.values().cloned().collect();
        for entry in &order {
            debug!(
                kind = %entry.kind,
                uuid = %entry.uuid,
                name = self.settings.display_name(&entry.uuid),
                "ordered mod"
            );
        }
        self.settings.apply_order(order)?;
        self.settings.save()?;
        Ok(())
    }
}

enum Status {
    Idle,
    Info(String),
    Error(String),
}

pub struct ArrangerApp {
    paths: GamePaths,
    layout: ListLayout,
    profiles: Vec<String>,
    selected: Option<usize>,
    session: Option<Session>,
    dispatcher: EventDispatcher,
    status: Status,
}

impl ArrangerApp {
    /// Lists the profiles and opens `profile`, or the only profile if there is just one.
    pub fn new(
        paths: GamePaths,
        layout: ListLayout,
        profile: Option<&str>,
    ) -> Result<Self, AppError> {
        let (profiles, selected) = paths.choose_profile(profile)?;
        let mut app = Self {
            paths,
            layout,
            profiles,
            selected: None,
            session: None,
            dispatcher: EventDispatcher::new(),
            status: Status::Idle,
        };
        if let Some(index) = selected {
            app.open_profile(index);
        }
        Ok(app)
    }

    pub fn profiles(&self) -> &[String] {
        &self.profiles
    }

    pub fn current_profile(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.profile.as_str())
    }

    /// The list of the open profile.
    pub fn list(&self) -> Option<&DdList<ModEntry>> {
        self.session.as_ref().map(|session| &session.list)
    }

    pub fn list_mut(&mut self) -> Option<&mut DdList<ModEntry>> {
        self.session.as_mut().map(|session| &mut session.list)
    }

    /// Last error shown in the status line.
    pub fn last_error(&self) -> Option<&str> {
        match &self.status {
            Status::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }

    /// Window size fitting the list, capped to a reasonable screen height.
    pub fn preferred_window_size(&self) -> Vec2 {
        let list_height = self.list().map_or(200.0, DdList::height);
        let width = self.layout.item_width + self.layout.offset_x * 2.0;
        Vec2::new(width + 40.0, (list_height + 100.0).min(800.0))
    }

    pub fn open_profile(&mut self, index: usize) {
        let Some(profile) = self.profiles.get(index).cloned() else {
            return;
        };
        self.selected = Some(index);
        match Session::open(&self.paths, &profile, self.layout) {
            Ok(session) => {
                info!(
                    "Using profile {profile} with {} mods",
                    session.list.len()
                );
                self.status = Status::Info(format!("Profile {profile}"));
                self.session = Some(session);
            }
            Err(err) => {
                error!("Failed to open profile {profile}: {err}");
                self.status = Status::Error(err.to_string());
                self.session = None;
            }
        }
    }

    /// Writes the current order of the list into the profile's settings file.
    pub fn save(&mut self) -> Result<(), AppError> {
        let session = self.session.as_mut().ok_or(AppError::NoProfile)?;
        let result = session.save();
        self.status = match &result {
            Ok(()) => Status::Info("Save complete!".to_owned()),
            Err(err) => {
                error!("Save failed: {err}");
                Status::Error(err.to_string())
            }
        };
        result
    }

    fn profile_picker(&mut self, ui: &mut egui::Ui) {
        let mut choice = self.selected;
        let text = choice
            .and_then(|index| self.profiles.get(index))
            .map_or("Select profile", String::as_str);
        egui::ComboBox::from_label("Profile")
            .selected_text(text)
            .show_ui(ui, |ui| {
                for (index, name) in self.profiles.iter().enumerate() {
                    ui.selectable_value(&mut choice, Some(index), name.as_str());
                }
            });

        if choice != self.selected {
            if let Some(index) = choice {
                self.open_profile(index);
            }
        }
    }

    fn actions(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let can_save = self
                .session
                .as_ref()
                .map_or(false, |session| !session.list.is_dragging());
            if ui
                .add_enabled(can_save, egui::Button::new("Save"))
                .clicked()
            {
                // the outcome is shown in the status line
                let _ = self.save();
            }

            match &self.status {
                Status::Idle => {}
                Status::Info(message) => {
                    ui.label(message.as_str());
                }
                Status::Error(message) => {
                    ui.colored_label(Color32::RED, message.as_str());
                }
            }
        });
    }

    fn mod_list(&mut self, ui: &mut egui::Ui) {
        let Some(session) = &mut self.session else {
            ui.label("Select a profile to arrange its mods.");
            return;
        };

        let settings = &session.settings;
        egui::ScrollArea::vertical().show(ui, |ui| {
            session.list.ui(ui, &mut self.dispatcher, |ui, item| {
                ui.label(settings.display_name(&item.value().uuid));
            });
        });
    }
}

impl eframe::App for ArrangerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("profile").show(ctx, |ui| self.profile_picker(ui));
        egui::TopBottomPanel::bottom("actions").show(ctx, |ui| self.actions(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.mod_list(ui));
    }
}
