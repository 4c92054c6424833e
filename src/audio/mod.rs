// audio/mod.rs

use log::{debug, info, warn};
use rodio::mixer::Mixer;
use rodio::{source::Source, Decoder, OutputStream, Sink};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::audio::{CLIP_FILES, FADE_WINDOW};
use crate::error::IntroError;

/// One sound to play: which clip, how loud, how fast, and which slice of it.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioCue {
    pub clip: String,
    pub volume: f32,
    pub rate: f32,
    /// Offset into the clip where playback begins, seconds
    pub start: f64,
    /// Offset into the clip where playback has faded out and stops
    pub end: Option<f64>,
}

impl AudioCue {
    pub fn new(clip: &str, volume: f32) -> Self {
        AudioCue {
            clip: clip.to_string(),
            volume,
            rate: 1.0,
            start: 0.0,
            end: None,
        }
    }

    pub fn starting_at(mut self, start: f64) -> Self {
        self.start = start.max(0.0);
        self
    }

    pub fn ending_at(mut self, end: f64) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }
}

/// Anything that can play cues. `now` is the session clock in seconds.
pub trait CuePlayer {
    fn play_cue(&mut self, cue: &AudioCue, now: f64) -> Result<(), IntroError>;
    fn update(&mut self, now: f64);
}

/// Volume at `position` seconds into the clip: `base` until the fade window
/// before `end`, then linearly down to zero at `end`.
pub fn fade_volume(base: f32, position: f64, end: Option<f64>, window: f64) -> f32 {
    let Some(end) = end else {
        return base;
    };
    if position >= end {
        return 0.0;
    }
    let fade_start = end - window.max(0.0);
    if position <= fade_start || window <= 0.0 {
        return base;
    }
    let remaining = (end - position) / window;
    base * remaining.clamp(0.0, 1.0) as f32
}

struct ActiveCue {
    sink: Sink,
    clip: String,
    base_volume: f32,
    rate: f64,
    start: f64,
    end: Option<f64>,
    started_at: f64,
}

impl ActiveCue {
    fn clip_position(&self, now: f64) -> f64 {
        self.start + (now - self.started_at).max(0.0) * self.rate
    }
}

pub struct AudioManager {
    _stream: OutputStream,
    mixer: Mixer,
    clips: HashMap<String, PathBuf>,
    active: Vec<ActiveCue>,
    master_volume: f32,
}

impl AudioManager {
    pub fn new(master_volume: f32) -> Result<Self, IntroError> {
        info!("[AudioManager] Initializing audio system...");

        let stream = rodio::OutputStreamBuilder::open_default_stream()
            .map_err(|e| IntroError::AudioStream(e.to_string()))?;
        let mixer = stream.mixer().clone();

        info!("[AudioManager] Audio system initialized successfully");

        Ok(AudioManager {
            _stream: stream,
            mixer,
            clips: HashMap::new(),
            active: Vec::new(),
            master_volume,
        })
    }

    /// Check a clip decodes and associate it with a name
    pub fn load_clip(&mut self, name: &str, path: &Path) -> Result<(), IntroError> {
        debug!("[AudioManager] Loading clip '{}' from {:?}", name, path);

        let decoder = open_decoder(path)?;
        debug!(
            "[AudioManager] '{}' decoded OK - sample_rate: {}, channels: {}, duration: {:?}",
            name,
            decoder.sample_rate(),
            decoder.channels(),
            decoder.total_duration()
        );

        self.clips.insert(name.to_string(), path.to_path_buf());
        Ok(())
    }

    /// Load every intro clip found in the sfx directory. Missing clips are
    /// logged; their cues will fail quietly later.
    pub fn load_sfx_directory(&mut self, exe_dir: &Path) -> Result<(), IntroError> {
        let potential_sfx_dirs = [
            Some(Path::new("sfx").to_path_buf()),
            Some(exe_dir.join("sfx")),
            exe_dir.parent().map(|p| p.join("sfx")),
            Some(Path::new("assets").join("sfx")),
        ];

        let sfx_dir = potential_sfx_dirs
            .into_iter()
            .flatten()
            .find(|dir| dir.exists())
            .ok_or_else(|| IntroError::ClipMissing("sfx directory".to_string()))?;

        info!("[AudioManager] Found sound effects directory at: {:?}", sfx_dir.display());

        for (name, filename) in CLIP_FILES.iter() {
            let path = sfx_dir.join(filename);
            match self.load_clip(name, &path) {
                Ok(()) => info!("[AudioManager] Loaded: {} from {}", name, path.display()),
                Err(e) => warn!("[AudioManager] Failed to load {}: {}", name, e),
            }
        }

        Ok(())
    }
}

impl CuePlayer for AudioManager {
    fn play_cue(&mut self, cue: &AudioCue, now: f64) -> Result<(), IntroError> {
        let path = self
            .clips
            .get(&cue.clip)
            .ok_or_else(|| IntroError::ClipMissing(cue.clip.clone()))?
            .clone();

        let source = open_decoder(&path)?;

        // The start offset only makes sense once the clip length is known
        let start = match source.total_duration() {
            Some(total) if cue.start > total.as_secs_f64() => {
                warn!(
                    "[AudioManager] Start {:.2}s is past the end of '{}' ({:.2}s), playing from 0",
                    cue.start,
                    cue.clip,
                    total.as_secs_f64()
                );
                0.0
            }
            _ => cue.start,
        };

        let base_volume = cue.volume * self.master_volume;
        let sink = Sink::connect_new(&self.mixer);
        sink.set_volume(fade_volume(base_volume, start, cue.end, FADE_WINDOW));
        sink.set_speed(cue.rate);
        sink.append(source.skip_duration(Duration::from_secs_f64(start)));
        if sink.is_paused() {
            sink.play();
        }

        debug!("[AudioManager] Cue '{}' started at {:.2}s (clip offset {:.2}s)", cue.clip, now, start);

        self.active.push(ActiveCue {
            sink,
            clip: cue.clip.clone(),
            base_volume,
            rate: cue.rate as f64,
            start,
            end: cue.end,
            started_at: now,
        });
        Ok(())
    }

    fn update(&mut self, now: f64) {
        self.active.retain(|cue| {
            let position = cue.clip_position(now);
            if let Some(end) = cue.end {
                if position >= end {
                    cue.sink.pause();
                    debug!("[AudioManager] Cue '{}' faded out", cue.clip);
                    return false;
                }
            }
            cue.sink
                .set_volume(fade_volume(cue.base_volume, position, cue.end, FADE_WINDOW));
            !cue.sink.empty()
        });
    }
}

fn open_decoder(path: &Path) -> Result<impl Source + Send + 'static, IntroError> {
    let file = File::open(path).map_err(|source| IntroError::ClipOpen {
        path: path.to_path_buf(),
        source,
    })?;
    Decoder::try_from(file).map_err(|e| IntroError::ClipDecode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Stand-in when no output device is available: cues are accepted and dropped
#[derive(Debug, Default)]
pub struct SilentAudio;

impl CuePlayer for SilentAudio {
    fn play_cue(&mut self, cue: &AudioCue, now: f64) -> Result<(), IntroError> {
        debug!("[SilentAudio] Dropping cue '{}' at {:.2}s", cue.clip, now);
        Ok(())
    }

    fn update(&mut self, _now: f64) {}
}
