// config.rs

use crate::error::IntroError;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name under the platform config dir for settings and state
pub const APP_DIR_NAME: &str = "portfolio-intro";

/// Optional settings override file, looked up inside the config dir
pub const SETTINGS_FILE_NAME: &str = "intro_settings.json";

/// Window resolution constants
pub mod resolution {
    pub const WIDTH: f64 = 1280.0;
    pub const HEIGHT: f64 = 720.0;
    pub const BACKGROUND: [f32; 4] = [0.02, 0.02, 0.02, 1.0]; // #050505
}

/// Exit sequence offsets, seconds after the ENTRAR activation
pub mod timeline {
    pub const FLASH_OFFSET: f64 = 1.7;
    pub const COMPLETE_OFFSET: f64 = 2.0;
    pub const FLASH_FADE_IN: f64 = 0.12;
    pub const READY_FADE_IN: f64 = 0.8;
    pub const READY_FADE_OUT: f64 = 0.3;
}

/// Fake loading bar
pub mod progress {
    pub const TICK_MS: u64 = 30;
    pub const MIN_STEP: u32 = 1;
    pub const MAX_STEP: u32 = 3;
    pub const MAX_PROGRESS: u32 = 100;
}

/// Particle cloud
pub mod particles {
    pub const COUNT: usize = 4000;
    /// Per-frame values in the motion formulas assume this refresh rate
    pub const REFERENCE_FPS: f64 = 60.0;
    pub const COLLAPSE_GRAVITY: f64 = 0.02;
    /// Phase multiplier at the start of the collapse
    pub const COLLAPSE_SPEEDUP: f64 = 4.0;
    /// Extra phase multiplier gained per second of collapse
    pub const COLLAPSE_RAMP: f64 = 6.0;
    pub const SYSTEM_SPIN_Y: f64 = 0.001;
    pub const SYSTEM_SPIN_Z: f64 = 0.0005;
    pub const COLOR: [f32; 4] = [0.0, 0.95, 1.0, 0.6]; // #00f2ff
    pub const BASE_RADIUS: f64 = 0.07;
}

/// Node network behind the particles
pub mod network {
    pub const NODE_COUNT: usize = 90;
    pub const NEIGHBORS: usize = 3;
    pub const SHELL_INNER: f64 = 60.0;
    pub const SHELL_OUTER: f64 = 80.0;
    pub const LIGHT_PATH_RADIUS: f64 = 70.0;
    pub const LIGHT_INNER_RADIUS: f64 = 15.0;
    pub const LIGHT_OUTER_RADIUS: f64 = 60.0;
    pub const PULSE_SPEED: f64 = 3.0;
    pub const PULSE_FREQ: f64 = 6.0;
    pub const PULSE_WEIGHT: f64 = 0.35;
    pub const COLLAPSE_SPIN: f64 = 0.8;
    pub const COLLAPSE_DROP: f64 = 40.0;
    pub const BASE_COLOR: [f32; 4] = [0.25, 0.0, 0.6, 0.15];
    pub const ACTIVE_COLOR: [f32; 4] = [0.0, 0.95, 1.0, 0.9];
}

/// Glow shell around the scene
pub mod glow {
    pub const RADIUS: f64 = 150.0;
    pub const SEGMENTS: usize = 10;
    pub const COLOR: [f32; 4] = [0.66, 0.0, 1.0, 0.03]; // #a800ff
}

/// Orbiting camera
pub mod camera {
    pub const START_DISTANCE: f64 = 100.0;
    pub const FOV_DEGREES: f64 = 75.0;
    pub const AUTO_ROTATE_SPEED: f64 = 0.5;
    pub const MIN_POLAR: f64 = std::f64::consts::PI / 3.0;
    pub const MAX_POLAR: f64 = std::f64::consts::PI / 1.5;
    pub const SHAKE_INTENSITY: f64 = 2.5;
    pub const SHAKE_DECAY: f64 = 1.2;
    pub const SHAKE_FREQUENCY: f64 = 38.0;
}

/// Repeat-visit suppression
pub mod cooldown {
    pub const WINDOW_SECS: i64 = 60;
    /// One year
    pub const MAX_WINDOW_SECS: i64 = 365 * 24 * 60 * 60;
    pub const STATE_FILE_NAME: &str = "intro_state.json";
}

/// Audio cue clips
pub mod audio {
    pub const FADE_WINDOW: f64 = 0.5;
    pub const WHOOSH_CLIP: &str = "whoosh";
    pub const IMPACT_CLIP: &str = "impact";

    pub const WHOOSH_VOLUME: f32 = 0.6;
    pub const WHOOSH_RATE: f32 = 1.0;
    /// Clip offset where the whoosh has faded out
    pub const WHOOSH_END: f64 = 1.6;

    pub const IMPACT_VOLUME: f32 = 0.9;
    pub const IMPACT_RATE: f32 = 1.0;
    /// Skips the silent lead-in of the impact clip
    pub const IMPACT_START: f64 = 0.2;
    pub const CLIP_FILES: [(&str, &str); 2] = [(WHOOSH_CLIP, "whoosh.ogg"), (IMPACT_CLIP, "impact.ogg")];
}

/// Runtime knobs that can be overridden by `intro_settings.json`.
/// Missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntroSettings {
    pub particle_count: usize,
    pub node_count: usize,
    pub progress_tick_ms: u64,
    pub progress_min_step: u32,
    pub progress_max_step: u32,
    pub flash_offset: f64,
    pub complete_offset: f64,
    pub cooldown_secs: i64,
    pub master_volume: f32,
    pub seed: Option<u64>,
}

impl Default for IntroSettings {
    fn default() -> Self {
        IntroSettings {
            particle_count: particles::COUNT,
            node_count: network::NODE_COUNT,
            progress_tick_ms: progress::TICK_MS,
            progress_min_step: progress::MIN_STEP,
            progress_max_step: progress::MAX_STEP,
            flash_offset: timeline::FLASH_OFFSET,
            complete_offset: timeline::COMPLETE_OFFSET,
            cooldown_secs: cooldown::WINDOW_SECS,
            master_volume: 1.0,
            seed: None,
        }
    }
}

impl IntroSettings {
    /// Reads and validates a settings file.
    pub fn load(path: &Path) -> Result<Self, IntroError> {
        let data = fs::read_to_string(path).map_err(|source| IntroError::StateIo {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: IntroSettings = serde_json::from_str(&data)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Settings from the config dir if present and valid, defaults otherwise.
    pub fn load_or_default() -> Self {
        let Some(path) = settings_path() else {
            return IntroSettings::default();
        };
        if !path.exists() {
            return IntroSettings::default();
        }
        match IntroSettings::load(&path) {
            Ok(settings) => {
                info!("[Config] Loaded intro settings from {:?}", path);
                settings
            }
            Err(e) => {
                warn!("[Config] Ignoring {:?}: {}. Using defaults.", path, e);
                IntroSettings::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), IntroError> {
        if self.flash_offset < 0.0 || self.flash_offset >= self.complete_offset {
            return Err(IntroError::Timeline {
                flash: self.flash_offset,
                complete: self.complete_offset,
            });
        }
        if self.progress_tick_ms == 0 {
            return Err(IntroError::Settings("progressTickMs must be positive".into()));
        }
        if self.progress_min_step == 0 || self.progress_min_step > self.progress_max_step {
            return Err(IntroError::Settings(format!(
                "progress steps must satisfy 0 < min <= max (got {}..={})",
                self.progress_min_step, self.progress_max_step
            )));
        }
        if !(0..=cooldown::MAX_WINDOW_SECS).contains(&self.cooldown_secs) {
            return Err(IntroError::Settings(format!(
                "cooldownSecs {} outside 0..={}",
                self.cooldown_secs,
                cooldown::MAX_WINDOW_SECS
            )));
        }
        if !(0.0..=1.0).contains(&self.master_volume) {
            return Err(IntroError::Settings(format!(
                "masterVolume {} outside 0.0..=1.0",
                self.master_volume
            )));
        }
        Ok(())
    }
}

/// `<config dir>/portfolio-intro`, if the platform has a config dir
pub fn app_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME))
}

fn settings_path() -> Option<PathBuf> {
    app_config_dir().map(|dir| dir.join(SETTINGS_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        assert!(IntroSettings::default().validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "particleCount": 500, "seed": 7 }}"#).unwrap();

        let settings = IntroSettings::load(file.path()).unwrap();
        assert_eq!(
            settings,
            IntroSettings {
                particle_count: 500,
                seed: Some(7),
                ..IntroSettings::default()
            }
        );
    }

    #[test]
    fn flash_after_completion_is_rejected() {
        let settings = IntroSettings {
            flash_offset: 2.5,
            complete_offset: 2.0,
            ..IntroSettings::default()
        };
        assert!(matches!(settings.validate(), Err(IntroError::Timeline { .. })));
    }

    #[test]
    fn cooldown_window_must_be_in_range() {
        for secs in [-1, i64::MAX / 10, cooldown::MAX_WINDOW_SECS + 1] {
            let settings = IntroSettings {
                cooldown_secs: secs,
                ..IntroSettings::default()
            };
            assert!(matches!(settings.validate(), Err(IntroError::Settings(_))));
        }

        let off = IntroSettings {
            cooldown_secs: 0,
            ..IntroSettings::default()
        };
        assert!(off.validate().is_ok());
    }

    #[test]
    fn malformed_file_is_a_format_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            IntroSettings::load(file.path()),
            Err(IntroError::StateFormat(_))
        ));
    }
}
