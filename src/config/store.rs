// Settings store - persisted config and user patch
//
// The stored block is framed by head/tail sentinel words. A mismatch on
// either one means the block is corrupt and the caller falls back to
// defaults; the on-disk representation itself is RON.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::synth::patch::PatchParams;

use super::ConfigParams;

const HEAD_SENTINEL: u32 = 0xFEED_FACE;
const TAIL_SENTINEL: u32 = 0xE0DB_C0DE;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] ron::Error),

    #[error("parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("settings block corrupt (sentinel mismatch)")]
    Corrupt,
}

/// Everything the store persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSettings {
    pub config: ConfigParams,
    pub user_patch: PatchParams,
}

impl Default for StoredSettings {
    fn default() -> Self {
        Self {
            config: ConfigParams::default(),
            user_patch: PatchParams::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SettingsBlock {
    head_sentinel: u32,
    settings: StoredSettings,
    tail_sentinel: u32,
}

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The per-user default location, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hexsynth").join("settings.ron"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate the settings block. Sentinel mismatch yields
    /// `StoreError::Corrupt`; loaded values are clamped into legal ranges.
    pub fn load(&self) -> Result<StoredSettings, StoreError> {
        let text = fs::read_to_string(&self.path)?;
        let block: SettingsBlock = ron::from_str(&text)?;
        if block.head_sentinel != HEAD_SENTINEL || block.tail_sentinel != TAIL_SENTINEL {
            return Err(StoreError::Corrupt);
        }
        let mut settings = block.settings;
        settings.config.sanitize();
        settings.user_patch.sanitize();
        Ok(settings)
    }

    /// Load, falling back to defaults on any error (the error is logged, not
    /// propagated; the synth must come up regardless).
    pub fn load_or_default(&self) -> StoredSettings {
        match self.load() {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!(
                    "settings store unavailable ({}), using defaults: {}",
                    self.path.display(),
                    e
                );
                StoredSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &StoredSettings) -> Result<(), StoreError> {
        let block = SettingsBlock {
            head_sentinel: HEAD_SENTINEL,
            settings: settings.clone(),
            tail_sentinel: TAIL_SENTINEL,
        };
        let text = ron::ser::to_string_pretty(&block, ron::ser::PrettyConfig::default())?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, text)?;
        Ok(())
    }
}
