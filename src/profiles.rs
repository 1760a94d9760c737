//! Locating the game's profiles and installed mods.
//!
//! The data directory holds one folder per player profile under `PlayerProfiles`, each with a
//! `modsettings.lsx`, and the installed mod packages under `Mods`. Package files are named
//! `<Name>_<UUID>.pak`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::UserDirs;
use thiserror::Error;
use tracing::{debug, warn};

const GAME_DATA_DIR: &str = "Larian Studios/Divinity Original Sin 2 Definitive Edition";
const PROFILES_DIR: &str = "PlayerProfiles";
const MODS_DIR: &str = "Mods";
pub const MOD_SETTINGS_FILE: &str = "modsettings.lsx";

#[derive(Debug, Error)]
pub enum GameDataError {
    #[error("No documents directory available to locate the game data")]
    NoDocumentsDir,
    #[error("Failed to read {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("No player profiles found in {0}")]
    NoProfiles(PathBuf),
    #[error("Unknown profile {name:?}, available: {available}")]
    UnknownProfile { name: String, available: String },
}

/// The game data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamePaths {
    data_dir: PathBuf,
}

impl GamePaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The data directory inside the user's documents folder.
    pub fn from_documents() -> Result<Self, GameDataError> {
        let dirs = UserDirs::new().ok_or(GameDataError::NoDocumentsDir)?;
        let documents = dirs.document_dir().ok_or(GameDataError::NoDocumentsDir)?;
        Ok(Self::new(documents.join(GAME_DATA_DIR)))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.data_dir.join(PROFILES_DIR)
    }

    pub fn mods_dir(&self) -> PathBuf {
        self.data_dir.join(MODS_DIR)
    }

    pub fn mod_settings_path(&self, profile: &str) -> PathBuf {
        self.profiles_dir().join(profile).join(MOD_SETTINGS_FILE)
    }

    /// Names of the profile directories, sorted.
    pub fn list_profiles(&self) -> Result<Vec<String>, GameDataError> {
        let dir = self.profiles_dir();
        let entries = std::fs::read_dir(&dir).map_err(|source| GameDataError::ReadDir {
            path: dir.clone(),
            source,
        })?;

        let mut profiles = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| GameDataError::ReadDir {
                path: dir.clone(),
                source,
            })?;
            if !entry.path().is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => profiles.push(name),
                Err(name) => warn!("Skipping profile with non UTF-8 name {name:?}"),
            }
        }
        profiles.sort();

        if profiles.is_empty() {
            return Err(GameDataError::NoProfiles(dir));
        }
        Ok(profiles)
    }

    /// Picks `requested` among the profiles, or the only profile when nothing is requested.
    /// Returns `None` when several profiles exist and none was requested.
    pub fn choose_profile(
        &self,
        requested: Option<&str>,
    ) -> Result<(Vec<String>, Option<usize>), GameDataError> {
        let profiles = self.list_profiles()?;
        let chosen = match requested {
            Some(name) => Some(profiles.iter().position(|p| p == name).ok_or_else(|| {
                GameDataError::UnknownProfile {
                    name: name.to_owned(),
                    available: profiles.join(", "),
                }
            })?),
            None if profiles.len() == 1 => Some(0),
            None => None,
        };
        Ok((profiles, chosen))
    }

    /// Display names of the packages in the `Mods` directory, keyed by UUID. A missing directory
    /// yields an empty table.
    pub fn scan_mod_names(&self) -> Result<HashMap<String, String>, GameDataError> {
        let dir = self.mods_dir();
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!("No mods directory at {}", dir.display());
                return Ok(HashMap::new());
            }
            Err(source) => return Err(GameDataError::ReadDir { path: dir, source }),
        };

        let mut names = HashMap::new();
        for entry in entries {
            let entry = entry.map_err(|source| GameDataError::ReadDir {
                path: dir.clone(),
                source,
            })?;
            let file_name = entry.file_name();
            let Some((name, uuid)) = file_name.to_str().and_then(parse_package_name) else {
                debug!("Ignoring {:?} in mods directory", file_name);
                continue;
            };
            names.insert(uuid.to_owned(), name.to_owned());
        }
        Ok(names)
    }
}

/// Splits `<Name>_<UUID>.pak` into name and UUID. The UUID follows the last underscore.
pub fn parse_package_name(file_name: &str) -> Option<(&str, &str)> {
    let dot = file_name.rfind('.')?;
    let (stem, extension) = file_name.split_at(dot);
    if !extension.eq_ignore_ascii_case(".pak") {
        return None;
    }

    let (name, uuid) = stem.rsplit_once('_')?;
    if name.is_empty() || uuid.is_empty() {
        return None;
    }
    Some((name, uuid))
}
