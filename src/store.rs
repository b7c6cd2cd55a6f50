//! # Profile Store Module
//!
//! Persists the capture history, the favorites list and the user's
//! preferences as JSON documents in a data directory.
//!
//! - History is newest-first and capped (20 entries by default)
//! - Favorites are deduplicated by profile id
//! - Full-size images can be stripped before writing; thumbnails are kept
//! - A document that fails to parse is logged and read as empty
//! - Writes go to a temp file in the same directory and are renamed into place

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::errors::{error_logging, AppError, AppResult};
use crate::observability;
use crate::preferences::UserPreferences;
use crate::profile::BeerProfile;

pub const HISTORY_FILE: &str = "history.json";
pub const FAVORITES_FILE: &str = "favorites.json";
pub const PREFERENCES_FILE: &str = "preferences.json";
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Settings for a [`ProfileStore`]
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub history_limit: usize,
    /// Drop `imageData` before persisting
    pub strip_images: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".beersnap"),
            history_limit: DEFAULT_HISTORY_LIMIT,
            strip_images: true,
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(AppError::Config("data_dir cannot be empty".to_string()));
        }
        if self.history_limit == 0 {
            return Err(AppError::Config(
                "history_limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// JSON-file backed history, favorites and preferences
#[derive(Debug)]
pub struct ProfileStore {
    config: StoreConfig,
    // Serializes read-modify-write cycles within the process
    write_lock: Mutex<()>,
}

impl ProfileStore {
    /// Open (and create if needed) the data directory
    pub fn open(config: StoreConfig) -> AppResult<Self> {
        config.validate()?;
        std::fs::create_dir_all(&config.data_dir).map_err(|e| {
            error_logging::log_storage_error(&e, "create_data_dir", config.data_dir.to_str(), None);
            AppError::FileSystem(format!(
                "Cannot create data directory {}: {}",
                config.data_dir.display(),
                e
            ))
        })?;
        info!(data_dir = %config.data_dir.display(), "Profile store opened");
        Ok(Self {
            config,
            write_lock: Mutex::new(()),
        })
    }

    fn path(&self, file: &str) -> PathBuf {
        self.config.data_dir.join(file)
    }

    fn prepare(&self, profile: &BeerProfile) -> BeerProfile {
        if self.config.strip_images {
            profile.stripped_for_storage()
        } else {
            profile.clone()
        }
    }

    /// Newest-first capture history
    pub fn history(&self) -> AppResult<Vec<BeerProfile>> {
        self.read_document(HISTORY_FILE)
    }

    /// Prepend a profile and trim the list to the configured limit.
    ///
    /// Returns the list as persisted.
    pub fn save_to_history(&self, profile: &BeerProfile) -> AppResult<Vec<BeerProfile>> {
        let _span = observability::store_span("save_to_history").entered();
        let _guard = self.write_lock.lock();

        let mut history: Vec<BeerProfile> = self.read_document(HISTORY_FILE)?;
        history.insert(0, self.prepare(profile));
        history.truncate(self.config.history_limit);

        self.write_document(HISTORY_FILE, &history)?;
        observability::record_history_save(history.len());
        debug!(id = %profile.id, entries = history.len(), "Saved profile to history");
        Ok(history)
    }

    pub fn clear_history(&self) -> AppResult<()> {
        let _guard = self.write_lock.lock();
        self.write_document(HISTORY_FILE, &Vec::<BeerProfile>::new())?;
        info!("History cleared");
        Ok(())
    }

    /// Look a profile up in history, then in favorites
    pub fn find(&self, id: &str) -> AppResult<Option<BeerProfile>> {
        let found = self
            .history()?
            .into_iter()
            .find(|p| p.id == id);
        if found.is_some() {
            return Ok(found);
        }
        Ok(self.favorites()?.into_iter().find(|p| p.id == id))
    }

    pub fn favorites(&self) -> AppResult<Vec<BeerProfile>> {
        self.read_document(FAVORITES_FILE)
    }

    pub fn is_favorite(&self, id: &str) -> AppResult<bool> {
        Ok(self.favorites()?.iter().any(|p| p.id == id))
    }

    /// Add the profile to favorites, or remove it if it is already there.
    ///
    /// Returns `true` when the profile is a favorite afterwards.
    pub fn toggle_favorite(&self, profile: &BeerProfile) -> AppResult<bool> {
        let _span = observability::store_span("toggle_favorite").entered();
        let _guard = self.write_lock.lock();

        let mut favorites: Vec<BeerProfile> = self.read_document(FAVORITES_FILE)?;
        let before = favorites.len();
        favorites.retain(|p| p.id != profile.id);

        let added = favorites.len() == before;
        if added {
            favorites.insert(0, self.prepare(profile));
        }

        self.write_document(FAVORITES_FILE, &favorites)?;
        debug!(id = %profile.id, added, "Toggled favorite");
        Ok(added)
    }

    /// Stored preferences, or defaults when none were saved
    pub fn preferences(&self) -> AppResult<UserPreferences> {
        let path = self.path(PREFERENCES_FILE);
        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(prefs) => Ok(prefs),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring unreadable preferences");
                    Ok(UserPreferences::default())
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(UserPreferences::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_preferences(&self, prefs: &UserPreferences) -> AppResult<()> {
        prefs.validate()?;
        let _guard = self.write_lock.lock();
        self.write_document(PREFERENCES_FILE, prefs)
    }

    fn read_document<T: DeserializeOwned + Default>(&self, file: &str) -> AppResult<T> {
        let path = self.path(file);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => {
                error_logging::log_storage_error(&e, "read_document", path.to_str(), None);
                return Err(e.into());
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Stored document is corrupt, starting empty");
                Ok(T::default())
            }
        }
    }

    fn write_document<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> AppResult<()> {
        let path = self.path(file);
        write_json_atomically(&self.config.data_dir, &path, value).map_err(|e| {
            error_logging::log_storage_error(&e, "write_document", path.to_str(), None);
            e
        })
    }
}

fn write_json_atomically<T: Serialize + ?Sized>(dir: &Path, path: &Path, value: &T) -> AppResult<()> {
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut temp, value)?;
    temp.write_all(b"\n")?;
    temp.as_file().sync_all()?;
    temp.persist(path)
        .map_err(|e| AppError::Storage(format!("Cannot replace {}: {}", path.display(), e.error)))?;
    Ok(())
}
