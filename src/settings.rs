use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use crate::models::Language;
use crate::trials::TrialConfig;

pub const DATABASE_ENV: &str = "COGNILAB_DB";
pub const SETTINGS_ENV: &str = "COGNILAB_SETTINGS";

const DEFAULT_DATABASE_FILE: &str = "cognilab.sqlite3";
const DEFAULT_SETTINGS_FILE: &str = "cognilab.settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabSettings {
    pub database_path: PathBuf,
    pub default_language: Language,
    pub trial_config: TrialConfig,
}

impl Default for LabSettings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            default_language: Language::default(),
            trial_config: TrialConfig::default(),
        }
    }
}

/// `COGNILAB_SETTINGS`, or `cognilab.settings.json` in the working directory.
pub fn settings_path_from_env() -> PathBuf {
    std::env::var_os(SETTINGS_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<LabSettings>,
}

impl SettingsStore {
    /// A missing or unreadable file yields the defaults; the file is only
    /// written on the first update.
    pub fn new(path: PathBuf) -> Self {
        let data = if path.exists() {
            match read_settings(&path) {
                Ok(settings) => settings,
                Err(err) => {
                    warn!("Ignoring settings at {}: {err:#}", path.display());
                    LabSettings::default()
                }
            }
        } else {
            LabSettings::default()
        };

        Self {
            path,
            data: RwLock::new(data),
        }
    }

    pub fn from_env() -> Self {
        Self::new(settings_path_from_env())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> LabSettings {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn trial_config(&self) -> TrialConfig {
        self.settings().trial_config
    }

    pub fn default_language(&self) -> Language {
        self.settings().default_language
    }

    /// `COGNILAB_DB` wins over the stored path.
    pub fn database_path(&self) -> PathBuf {
        std::env::var_os(DATABASE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| self.settings().database_path)
    }

    pub fn update<F>(&self, apply: F) -> Result<LabSettings>
    where
        F: FnOnce(&mut LabSettings),
    {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = guard.clone();
        apply(&mut next);
        self.persist(&next)?;
        *guard = next.clone();
        Ok(next)
    }

    pub fn update_trial_config(&self, config: TrialConfig) -> Result<()> {
        self.update(|settings| settings.trial_config = config)
            .map(|_| ())
    }

    pub fn set_default_language(&self, language: Language) -> Result<()> {
        self.update(|settings| settings.default_language = language)
            .map(|_| ())
    }

    pub fn reload(&self) -> Result<()> {
        let data = read_settings(&self.path)?;
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        *guard = data;
        Ok(())
    }

    fn persist(&self, data: &LabSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

fn read_settings(path: &Path) -> Result<LabSettings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse settings in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        assert_eq!(store.settings(), LabSettings::default());
        assert!(!store.path().exists());
    }

    #[test]
    fn unreadable_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let store = SettingsStore::new(path);
        assert_eq!(store.trial_config(), TrialConfig::default());
        assert!(store.reload().is_err());
    }

    #[test]
    fn updates_are_persisted_and_reloaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(path.clone());

        let config = TrialConfig {
            rotation_per_cell: 3,
            ..TrialConfig::default()
        };
        store.update_trial_config(config.clone()).unwrap();
        store.set_default_language(Language::He).unwrap();

        let reopened = SettingsStore::new(path);
        assert_eq!(reopened.trial_config(), config);
        assert_eq!(reopened.default_language(), Language::He);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "trialConfig": { "scanningPerTercile": 4 } }"#).unwrap();

        let settings = SettingsStore::new(path).settings();
        assert_eq!(settings.trial_config.scanning_per_tercile, 4);
        assert_eq!(settings.trial_config.bouba_main_trials, 12);
        assert_eq!(settings.database_path, PathBuf::from(DEFAULT_DATABASE_FILE));
    }
}
