//! Saved printer settings
//!
//! A small JSON record remembering the last used parameters. The engine
//! never sees this format; the CLI resolves it into `RunOptions`.

use anyhow::{Context, Result};
use card_impose::constants::{
    DEFAULT_CARD_HEIGHT_MM, DEFAULT_CARD_WIDTH_MM, DEFAULT_DPI, DEFAULT_GAP_MM,
};
use card_impose::preprocess::default_workers;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_SETTINGS_FILE: &str = "card_printer_config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterSettings {
    pub dpi: u32,
    pub card_width: f32,
    pub card_height: f32,
    pub gap: f32,
    pub show_crop: bool,
    pub include_back: bool,
    pub workers: usize,
    /// Back image used last time, empty when none
    pub last_logo: String,
    pub last_folder: String,
}

impl Default for PrinterSettings {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            card_width: DEFAULT_CARD_WIDTH_MM,
            card_height: DEFAULT_CARD_HEIGHT_MM,
            gap: DEFAULT_GAP_MM,
            show_crop: true,
            include_back: true,
            workers: default_workers(),
            last_logo: String::new(),
            last_folder: String::new(),
        }
    }
}

impl PrinterSettings {
    /// Load settings, falling back to defaults when the file does not exist
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let settings = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse settings {}", path.display()))?;
        Ok(settings)
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = PrinterSettings::load_or_default(dir.path().join("none.json"))
            .await
            .unwrap();
        assert_eq!(settings, PrinterSettings::default());
    }

    #[tokio::test]
    async fn test_partial_record_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"dpi": 600, "card_width": 63, "last_folder": "cards"}"#).unwrap();

        let settings = PrinterSettings::load_or_default(&path).await.unwrap();
        assert_eq!(settings.dpi, 600);
        assert_eq!(settings.card_width, 63.0);
        assert_eq!(settings.card_height, DEFAULT_CARD_HEIGHT_MM);
        assert_eq!(settings.last_folder, "cards");
        assert!(settings.include_back);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let settings = PrinterSettings {
            dpi: 300,
            show_crop: false,
            last_logo: "back.png".to_string(),
            ..PrinterSettings::default()
        };

        settings.save(&path).await.unwrap();
        let loaded = PrinterSettings::load_or_default(&path).await.unwrap();
        assert_eq!(loaded, settings);
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, b"{ not json").unwrap();

        assert!(PrinterSettings::load_or_default(&path).await.is_err());
    }
}
