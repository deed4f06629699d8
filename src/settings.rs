use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use crate::reader::{Direction, ReaderConfig};

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = ".mangokrat_settings.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// "rtl" or "ltr"; manga defaults to right-to-left.
    #[serde(default = "default_direction")]
    pub direction: String,

    #[serde(default = "default_zoom_max")]
    pub zoom_max: f32,

    /// Window width (logical pixels) below which spreads collapse to a
    /// single page.
    #[serde(default = "default_breakpoint")]
    pub single_page_breakpoint: f32,

    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_direction() -> String {
    "rtl".to_string()
}

fn default_zoom_max() -> f32 {
    2.0
}

fn default_breakpoint() -> f32 {
    900.0
}

fn default_catalog_path() -> String {
    "catalog.json".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            direction: default_direction(),
            zoom_max: default_zoom_max(),
            single_page_breakpoint: default_breakpoint(),
            catalog_path: default_catalog_path(),
        }
    }
}

static SETTINGS: Lazy<RwLock<Settings>> = Lazy::new(|| RwLock::new(Settings::default()));

fn settings_path() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(SETTINGS_FILENAME))
}

pub fn load_settings() {
    let Some(path) = settings_path() else {
        warn!("Could not determine home directory, using default settings");
        return;
    };

    if !path.exists() {
        info!(
            "Settings file not found at {:?}, creating with defaults",
            path
        );
        if let Ok(settings) = SETTINGS.read() {
            save_settings_to_file(&settings, &path);
        }
        return;
    }

    match fs::read_to_string(&path) {
        Ok(content) => match serde_yaml::from_str::<Settings>(&content) {
            Ok(mut settings) => {
                debug!("Loaded settings from {:?}", path);

                if settings.version < CURRENT_VERSION {
                    migrate_settings(&mut settings);
                    save_settings_to_file(&settings, &path);
                }

                if let Ok(mut global) = SETTINGS.write() {
                    *global = settings;
                }
            }
            Err(e) => {
                error!("Failed to parse settings file {:?}: {}", path, e);
            }
        },
        Err(e) => {
            error!("Failed to read settings file {:?}: {}", path, e);
        }
    }
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );

    // Future migrations go here:
    // if settings.version < 2 {
    //     migrate_v1_to_v2(settings);
    // }

    settings.version = CURRENT_VERSION;
}

pub fn save_settings() {
    let Some(path) = settings_path() else {
        warn!("Could not determine home directory, cannot save settings");
        return;
    };

    if let Ok(settings) = SETTINGS.read() {
        save_settings_to_file(&settings, &path);
    }
}

fn save_settings_to_file(settings: &Settings, path: &PathBuf) {
    match serde_yaml::to_string(settings) {
        Ok(content) => match fs::write(path, content) {
            Ok(()) => debug!("Saved settings to {:?}", path),
            Err(e) => error!("Failed to save settings to {:?}: {}", path, e),
        },
        Err(e) => error!("Failed to serialize settings: {}", e),
    }
}

// Public API for accessing/modifying settings

pub fn get_catalog_path() -> String {
    SETTINGS
        .read()
        .map(|s| s.catalog_path.clone())
        .unwrap_or_else(|_| default_catalog_path())
}

pub fn initial_direction() -> Direction {
    let direction = SETTINGS
        .read()
        .map(|s| s.direction.clone())
        .unwrap_or_else(|_| default_direction());
    match direction.to_ascii_lowercase().as_str() {
        "ltr" => Direction::Ltr,
        _ => Direction::Rtl,
    }
}

pub fn set_direction(direction: Direction) {
    if let Ok(mut settings) = SETTINGS.write() {
        settings.direction = direction.label().to_ascii_lowercase();
    }
    save_settings();
}

/// Reader tunables derived from the loaded settings.
pub fn reader_config() -> ReaderConfig {
    let defaults = ReaderConfig::default();
    SETTINGS
        .read()
        .map(|s| ReaderConfig {
            zoom_max: s.zoom_max.max(defaults.zoom_min),
            single_page_breakpoint: s.single_page_breakpoint,
            ..defaults
        })
        .unwrap_or(defaults)
}
