// intro/cooldown.rs

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::cooldown::STATE_FILE_NAME;
use crate::config::app_config_dir;
use crate::error::IntroError;

/// Where the "intro last shown" timestamp lives
pub trait CooldownStore {
    fn read(&self) -> Result<Option<i64>, IntroError>;
    fn write(&mut self, epoch_ms: i64) -> Result<(), IntroError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct IntroState {
    #[serde(rename = "lastIntroShown", default)]
    last_intro_shown: Option<i64>,
}

/// JSON file in the user's config dir
pub struct FileCooldownStore {
    path: PathBuf,
}

impl FileCooldownStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileCooldownStore { path: path.into() }
    }

    /// `<config dir>/portfolio-intro/intro_state.json`, or the working
    /// directory when the platform has no config dir
    pub fn default_location() -> Self {
        let dir = app_config_dir().unwrap_or_else(|| PathBuf::from("."));
        FileCooldownStore::new(dir.join(STATE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CooldownStore for FileCooldownStore {
    fn read(&self) -> Result<Option<i64>, IntroError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path).map_err(|source| IntroError::StateIo {
            path: self.path.clone(),
            source,
        })?;
        let state: IntroState = serde_json::from_str(&data)?;
        Ok(state.last_intro_shown)
    }

    fn write(&mut self, epoch_ms: i64) -> Result<(), IntroError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| IntroError::StateIo {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let data = serde_json::to_string_pretty(&IntroState {
            last_intro_shown: Some(epoch_ms),
        })?;
        fs::write(&self.path, data).map_err(|source| IntroError::StateIo {
            path: self.path.clone(),
            source,
        })
    }
}

/// In-memory store, for `--skip-cooldown` runs and tests
#[derive(Debug, Default)]
pub struct MemoryCooldownStore {
    pub value: Option<i64>,
}

impl CooldownStore for MemoryCooldownStore {
    fn read(&self) -> Result<Option<i64>, IntroError> {
        Ok(self.value)
    }

    fn write(&mut self, epoch_ms: i64) -> Result<(), IntroError> {
        self.value = Some(epoch_ms);
        Ok(())
    }
}

/// True when the intro was shown less than `window_secs` ago. A timestamp
/// from the future (clock moved back) does not suppress the intro.
pub fn within_cooldown(now_ms: i64, last_shown_ms: Option<i64>, window_secs: i64) -> bool {
    match last_shown_ms {
        Some(last) => match (now_ms.checked_sub(last), window_secs.checked_mul(1000)) {
            (Some(elapsed), Some(window_ms)) => (0..window_ms).contains(&elapsed),
            _ => false,
        },
        None => false,
    }
}

/// Reads the stored timestamp and decides whether to skip. When the intro is
/// going to play, records `now_ms`. Store failures are logged and treated as
/// "never shown".
pub fn check_and_mark(store: &mut dyn CooldownStore, now_ms: i64, window_secs: i64) -> bool {
    let last = store.read().unwrap_or_else(|e| {
        warn!("[Cooldown] Could not read intro state: {}. Showing intro.", e);
        None
    });

    if within_cooldown(now_ms, last, window_secs) {
        if let Some(elapsed) = last.and_then(|last| now_ms.checked_sub(last)) {
            debug!("[Cooldown] Intro shown {} ms ago, skipping", elapsed);
        }
        return true;
    }

    if let Err(e) = store.write(now_ms) {
        warn!("[Cooldown] Could not record intro timestamp: {}", e);
    }
    false
}
