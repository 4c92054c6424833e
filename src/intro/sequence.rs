// intro/sequence.rs

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::audio::{AudioCue, CuePlayer};
use crate::config::audio::{
    IMPACT_CLIP, IMPACT_RATE, IMPACT_START, IMPACT_VOLUME, WHOOSH_CLIP, WHOOSH_END, WHOOSH_RATE,
    WHOOSH_VOLUME,
};
use crate::config::timeline::{FLASH_FADE_IN, READY_FADE_IN, READY_FADE_OUT};
use crate::config::IntroSettings;
use crate::error::IntroError;
use crate::intro::cooldown::{check_and_mark, CooldownStore};
use crate::intro::progress::{ProgressDriver, ProgressEvent};
use crate::intro::{IntroScene, SceneFlags};
use crate::utils::math::smoothstep;
use crate::utils::timeline::{Timeline, TimerHandle};

/// Lifecycle of one mounted intro. Transitions only move forward:
/// `Idle -> Loading -> Ready -> Exiting -> Finished`, or
/// `Bypassed -> Finished` when the cooldown skips the intro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroPhase {
    Bypassed,
    Idle,
    Loading,
    Ready,
    Exiting,
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
enum ExitEvent {
    Flash,
    Cue(AudioCue),
    Complete,
}

pub fn whoosh_cue() -> AudioCue {
    AudioCue::new(WHOOSH_CLIP, WHOOSH_VOLUME)
        .with_rate(WHOOSH_RATE)
        .ending_at(WHOOSH_END)
}

pub fn impact_cue() -> AudioCue {
    AudioCue::new(IMPACT_CLIP, IMPACT_VOLUME)
        .with_rate(IMPACT_RATE)
        .starting_at(IMPACT_START)
}

pub type CompletionCallback = Box<dyn FnOnce()>;

/// The intro session: owns the scene, the progress bar, the exit timeline and
/// the shared flags, and hands control back through `on_complete`.
pub struct IntroSession {
    settings: IntroSettings,
    phase: IntroPhase,
    flags: SceneFlags,
    progress: ProgressDriver,
    scene: IntroScene,
    timeline: Timeline<ExitEvent>,
    exit_timers: Vec<TimerHandle>,
    on_complete: Option<CompletionCallback>,
    rng: StdRng,
    clock: f64,
    ready_at: Option<f64>,
    exit_started_at: Option<f64>,
    flash_at: Option<f64>,
    torn_down: bool,
}

impl IntroSession {
    /// Decides between playing and bypassing from the cooldown store, then
    /// builds the scene. The session clock starts at 0.
    pub fn mount(
        settings: IntroSettings,
        now_epoch_ms: i64,
        store: &mut dyn CooldownStore,
        on_complete: CompletionCallback,
    ) -> Result<Self, IntroError> {
        settings.validate()?;

        let bypass = check_and_mark(store, now_epoch_ms, settings.cooldown_secs);
        let seed = settings.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);

        let (phase, scene) = if bypass {
            info!("[Intro] Shown within the last {}s, bypassing", settings.cooldown_secs);
            (IntroPhase::Bypassed, IntroScene::new(0, 0, &mut rng))
        } else {
            info!(
                "[Intro] Mounting with {} particles, {} nodes, seed {}",
                settings.particle_count, settings.node_count, seed
            );
            (
                IntroPhase::Idle,
                IntroScene::new(settings.particle_count, settings.node_count, &mut rng),
            )
        };

        Ok(IntroSession {
            progress: ProgressDriver::new(
                settings.progress_tick_ms,
                settings.progress_min_step,
                settings.progress_max_step,
            ),
            settings,
            phase,
            flags: SceneFlags::default(),
            scene,
            timeline: Timeline::new(),
            exit_timers: Vec::new(),
            on_complete: Some(on_complete),
            rng,
            clock: 0.0,
            ready_at: None,
            exit_started_at: None,
            flash_at: None,
            torn_down: false,
        })
    }

    /// One frame. `now` is seconds since mount.
    pub fn update(&mut self, now: f64, audio: &mut dyn CuePlayer) {
        if self.torn_down {
            return;
        }
        let dt = (now - self.clock).max(0.0);
        self.clock = self.clock.max(now);

        match self.phase {
            IntroPhase::Bypassed => self.complete(),
            IntroPhase::Idle => {
                self.progress.start();
                self.phase = IntroPhase::Loading;
                debug!("[Intro] Loading started");
            }
            IntroPhase::Loading => {
                if let Some(ProgressEvent::Completed) = self.progress.update(dt, &mut self.rng) {
                    self.phase = IntroPhase::Ready;
                    self.ready_at = Some(self.clock);
                    info!("[Intro] Loading complete at {:.2}s", self.clock);
                }
            }
            IntroPhase::Ready | IntroPhase::Exiting | IntroPhase::Finished => {}
        }

        for event in self.timeline.poll(self.clock) {
            self.dispatch(event, audio);
        }

        self.scene.update(dt, self.flags);
        audio.update(self.clock);
    }

    /// The call-to-action. Only the first activation while `Ready` starts
    /// the exit sequence; anything else is ignored.
    pub fn enter(&mut self, now: f64, audio: &mut dyn CuePlayer) -> bool {
        if self.torn_down || self.phase != IntroPhase::Ready {
            debug!("[Intro] Ignoring activation in phase {:?}", self.phase);
            return false;
        }
        let now = self.clock.max(now);
        self.clock = now;

        self.phase = IntroPhase::Exiting;
        self.exit_started_at = Some(now);
        self.flags.exiting = true;
        self.flags.collapsing = true;
        self.scene.spawn_eagle();
        self.scene.camera.shake.start();

        let flash_at = now + self.settings.flash_offset;
        self.exit_timers = vec![
            self.timeline.schedule(flash_at, ExitEvent::Flash),
            self.timeline.schedule(flash_at, ExitEvent::Cue(impact_cue())),
            self.timeline
                .schedule(now + self.settings.complete_offset, ExitEvent::Complete),
        ];

        info!("[Intro] Exit sequence started at {:.2}s", now);
        self.play(&whoosh_cue(), audio);
        true
    }

    fn dispatch(&mut self, event: ExitEvent, audio: &mut dyn CuePlayer) {
        match event {
            ExitEvent::Flash => {
                self.flags.flash = true;
                self.flash_at = Some(self.clock);
                debug!("[Intro] Flash at {:.2}s", self.clock);
            }
            ExitEvent::Cue(cue) => self.play(&cue, audio),
            ExitEvent::Complete => {
                self.exit_timers.clear();
                self.complete();
            }
        }
    }

    fn play(&mut self, cue: &AudioCue, audio: &mut dyn CuePlayer) {
        if let Err(e) = audio.play_cue(cue, self.clock) {
            warn!("[Intro] Audio cue '{}' failed: {}. Continuing without it.", cue.clip, e);
        }
    }

    fn complete(&mut self) {
        self.phase = IntroPhase::Finished;
        if let Some(on_complete) = self.on_complete.take() {
            info!("[Intro] Handing control back at {:.2}s", self.clock);
            on_complete();
        }
    }

    /// Releases every pending timer. After this no callback fires.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        let timeline = &mut self.timeline;
        let cancelled = self
            .exit_timers
            .drain(..)
            .filter(|&handle| timeline.cancel(handle))
            .count();
        if cancelled > 0 {
            debug!("[Intro] Teardown cancelled {} pending timers", cancelled);
        }
        self.on_complete = None;
        self.torn_down = true;
    }

    pub fn phase(&self) -> IntroPhase {
        self.phase
    }

    pub fn flags(&self) -> SceneFlags {
        self.flags
    }

    pub fn progress(&self) -> u32 {
        self.progress.progress()
    }

    pub fn progress_fraction(&self) -> f64 {
        self.progress.fraction()
    }

    pub fn scene(&self) -> &IntroScene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut IntroScene {
        &mut self.scene
    }

    pub fn is_finished(&self) -> bool {
        self.phase == IntroPhase::Finished
    }

    pub fn pending_timers(&self) -> usize {
        self.timeline.pending()
    }

    /// Opacity of the ready screen: fades in after loading completes and back
    /// out once the exit sequence starts
    pub fn ready_fade(&self) -> f64 {
        let fade_in = match self.ready_at {
            Some(at) => ((self.clock - at) / READY_FADE_IN).clamp(0.0, 1.0),
            None => return 0.0,
        };
        match self.exit_elapsed() {
            Some(elapsed) => fade_in * (1.0 - elapsed / READY_FADE_OUT).clamp(0.0, 1.0),
            None => fade_in,
        }
    }

    /// Opacity of the white flash overlay
    pub fn flash_alpha(&self) -> f64 {
        match self.flash_at {
            Some(at) => smoothstep(at, at + FLASH_FADE_IN, self.clock).max(0.35),
            None => 0.0,
        }
    }

    /// Seconds since the exit sequence began
    pub fn exit_elapsed(&self) -> Option<f64> {
        self.exit_started_at.map(|at| self.clock - at)
    }
}

impl Drop for IntroSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intro::cooldown::MemoryCooldownStore;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    const NOW_MS: i64 = 1_760_000_000_000;
    const FRAME: f64 = 1.0 / 60.0;

    #[derive(Default)]
    struct RecordingAudio {
        played: Vec<(String, f64)>,
        reject: bool,
    }

    impl CuePlayer for RecordingAudio {
        fn play_cue(&mut self, cue: &AudioCue, now: f64) -> Result<(), IntroError> {
            self.played.push((cue.clip.clone(), now));
            if self.reject {
                Err(IntroError::AudioStream("playback blocked until user gesture".into()))
            } else {
                Ok(())
            }
        }

        fn update(&mut self, _now: f64) {}
    }

    fn small_settings() -> IntroSettings {
        IntroSettings {
            particle_count: 64,
            node_count: 16,
            seed: Some(99),
            ..IntroSettings::default()
        }
    }

    fn counter() -> (Rc<Cell<u32>>, CompletionCallback) {
        let count = Rc::new(Cell::new(0));
        let inner = Rc::clone(&count);
        (count, Box::new(move || inner.set(inner.get() + 1)))
    }

    /// Mounts and runs frames until the call-to-action is available.
    fn ready_session(audio: &mut RecordingAudio) -> (IntroSession, Rc<Cell<u32>>, f64) {
        let (count, callback) = counter();
        let mut store = MemoryCooldownStore::default();
        let mut session = IntroSession::mount(small_settings(), NOW_MS, &mut store, callback).unwrap();

        let mut now = 0.0;
        for _ in 0..2000 {
            if session.phase() == IntroPhase::Ready {
                break;
            }
            now += FRAME;
            session.update(now, audio);
        }
        assert_eq!(session.phase(), IntroPhase::Ready);
        (session, count, now)
    }

    #[test]
    fn loading_progresses_to_ready_once() {
        let (count, callback) = counter();
        let mut store = MemoryCooldownStore::default();
        let mut audio = RecordingAudio::default();
        let mut session = IntroSession::mount(small_settings(), NOW_MS, &mut store, callback).unwrap();
        assert_eq!(session.phase(), IntroPhase::Idle);

        let mut now = 0.0;
        let mut last_progress = 0;
        let mut ready_transitions = 0;
        let mut was_ready = false;
        for _ in 0..600 {
            now += FRAME;
            session.update(now, &mut audio);
            assert!(session.progress() >= last_progress);
            assert!(session.progress() <= 100);
            last_progress = session.progress();

            let is_ready = session.phase() == IntroPhase::Ready;
            if is_ready && !was_ready {
                ready_transitions += 1;
            }
            was_ready = is_ready;
        }
        assert_eq!(ready_transitions, 1);
        assert_eq!(session.progress(), 100);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn exit_timeline_scenario() {
        let mut audio = RecordingAudio::default();
        let (mut session, count, t0) = ready_session(&mut audio);
        assert!(session.enter(t0, &mut audio));

        let flash = small_settings().flash_offset;
        let complete = small_settings().complete_offset;
        let mut completed_at = None;
        let mut t = t0;
        let mut frame = 0;
        while t - t0 < 3.0 {
            // jittery frame pacing
            frame += 1;
            t += if frame % 9 == 0 { 0.07 } else { FRAME };
            session.update(t, &mut audio);

            assert!(session.flags().collapsing);
            assert_eq!(session.flags().flash, t >= t0 + flash);
            if count.get() == 1 && completed_at.is_none() {
                completed_at = Some(t);
            }
            if t < t0 + complete {
                assert_eq!(count.get(), 0);
            }
        }

        assert_eq!(count.get(), 1);
        let completed_at = completed_at.unwrap();
        assert!(completed_at >= t0 + complete && completed_at < t0 + complete + 0.08);
        assert_eq!(session.phase(), IntroPhase::Finished);
        assert!(session.flags().flash);
    }

    #[test]
    fn second_activation_is_a_no_op() {
        let mut audio = RecordingAudio::default();
        let (mut session, count, t0) = ready_session(&mut audio);

        assert!(session.enter(t0, &mut audio));
        assert!(!session.enter(t0 + 0.1, &mut audio));
        assert!(!session.enter(t0 + 0.5, &mut audio));
        assert_eq!(session.pending_timers(), 3);

        session.update(t0 + 10.0, &mut audio);
        assert!(!session.enter(t0 + 10.5, &mut audio));
        session.update(t0 + 20.0, &mut audio);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn activation_before_ready_is_ignored() {
        let (count, callback) = counter();
        let mut store = MemoryCooldownStore::default();
        let mut audio = RecordingAudio::default();
        let mut session = IntroSession::mount(small_settings(), NOW_MS, &mut store, callback).unwrap();

        assert!(!session.enter(0.0, &mut audio));
        session.update(FRAME, &mut audio);
        assert!(!session.enter(FRAME, &mut audio));
        assert_eq!(session.phase(), IntroPhase::Loading);
        assert!(!session.flags().exiting);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn one_late_frame_fires_flash_before_completion() {
        let mut audio = RecordingAudio::default();
        let (mut session, count, t0) = ready_session(&mut audio);
        session.enter(t0, &mut audio);

        // host stalls for a whole second past the end
        session.update(t0 + 3.0, &mut audio);

        assert!(session.flags().flash);
        assert!(session.is_finished());
        assert_eq!(count.get(), 1);
        let clips: Vec<&str> = audio.played.iter().map(|(clip, _)| clip.as_str()).collect();
        assert_eq!(clips, vec![WHOOSH_CLIP, IMPACT_CLIP]);
    }

    #[test]
    fn rejected_audio_does_not_disturb_visuals() {
        let mut audio = RecordingAudio {
            reject: true,
            ..RecordingAudio::default()
        };
        let (mut session, count, t0) = ready_session(&mut audio);
        assert!(session.enter(t0, &mut audio));

        session.update(t0 + 1.69, &mut audio);
        assert!(!session.flags().flash);
        session.update(t0 + 1.7, &mut audio);
        assert!(session.flags().flash);
        session.update(t0 + 1.99, &mut audio);
        assert_eq!(count.get(), 0);
        session.update(t0 + 2.0, &mut audio);
        assert_eq!(count.get(), 1);

        // both cues were attempted, at their scheduled times
        assert_eq!(audio.played.len(), 2);
        assert_eq!(audio.played[0].0, WHOOSH_CLIP);
        assert!((audio.played[1].1 - (t0 + 1.7)).abs() < 1e-9);
    }

    #[test]
    fn teardown_cancels_pending_callbacks() {
        let mut audio = RecordingAudio::default();
        let (mut session, count, t0) = ready_session(&mut audio);
        session.enter(t0, &mut audio);
        session.update(t0 + 0.5, &mut audio);

        session.teardown();
        assert_eq!(session.pending_timers(), 0);
        session.update(t0 + 5.0, &mut audio);

        assert_eq!(count.get(), 0);
        assert!(!session.flags().flash);
        assert_eq!(audio.played.len(), 1);
    }

    #[test]
    fn dropping_the_session_cancels_the_callback() {
        let mut audio = RecordingAudio::default();
        let (mut session, count, t0) = ready_session(&mut audio);
        session.enter(t0, &mut audio);
        drop(session);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn recent_cooldown_bypasses_the_intro() {
        let (count, callback) = counter();
        let mut store = MemoryCooldownStore { value: Some(NOW_MS - 45_000) };
        let mut audio = RecordingAudio::default();
        let mut session = IntroSession::mount(small_settings(), NOW_MS, &mut store, callback).unwrap();

        assert_eq!(session.phase(), IntroPhase::Bypassed);
        assert_eq!(session.scene().particles.len(), 0);
        assert!(!session.enter(0.0, &mut audio));

        session.update(FRAME, &mut audio);
        session.update(2.0 * FRAME, &mut audio);
        assert!(session.is_finished());
        assert_eq!(count.get(), 1);
        assert!(audio.played.is_empty());
    }

    #[test]
    fn stale_or_missing_cooldown_plays_the_intro() {
        for stored in [Some(NOW_MS - 90_000), None] {
            let (_, callback) = counter();
            let mut store = MemoryCooldownStore { value: stored };
            let mut audio = RecordingAudio::default();
            let mut session = IntroSession::mount(small_settings(), NOW_MS, &mut store, callback).unwrap();

            assert_eq!(session.phase(), IntroPhase::Idle);
            session.update(FRAME, &mut audio);
            assert_eq!(session.phase(), IntroPhase::Loading);
            assert_eq!(store.value, Some(NOW_MS));
        }
    }

    #[test]
    fn exit_spawns_eagle_and_shakes_camera() {
        let mut audio = RecordingAudio::default();
        let (mut session, _, t0) = ready_session(&mut audio);
        assert!(session.scene().eagle.is_none());

        session.enter(t0, &mut audio);
        assert!(session.scene().eagle.is_some());
        assert!(session.scene().camera.shake.is_active());
        assert_eq!(session.exit_elapsed(), Some(0.0));
    }

    #[test]
    fn exit_fades_the_call_to_action_out() {
        let mut audio = RecordingAudio::default();
        let (mut session, _, t0) = ready_session(&mut audio);
        session.update(t0 + 5.0, &mut audio);
        assert_eq!(session.ready_fade(), 1.0);

        session.enter(t0 + 5.0, &mut audio);
        session.update(t0 + 5.0 + READY_FADE_OUT / 2.0, &mut audio);
        let halfway = session.ready_fade();
        assert!(halfway > 0.0 && halfway < 1.0);

        session.update(t0 + 5.0 + READY_FADE_OUT, &mut audio);
        assert_eq!(session.ready_fade(), 0.0);
    }

    #[test]
    fn teardown_after_partial_exit_cancels_only_what_is_left() {
        let mut audio = RecordingAudio::default();
        let (mut session, count, t0) = ready_session(&mut audio);
        session.enter(t0, &mut audio);
        assert_eq!(session.pending_timers(), 3);

        // flash and impact cue have fired, completion is still pending
        session.update(t0 + 1.8, &mut audio);
        assert!(session.flags().flash);
        assert_eq!(session.pending_timers(), 1);

        session.teardown();
        assert_eq!(session.pending_timers(), 0);
        session.update(t0 + 5.0, &mut audio);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn out_of_range_cooldown_is_rejected_at_mount() {
        let (_, callback) = counter();
        let mut store = MemoryCooldownStore::default();
        let settings = IntroSettings {
            cooldown_secs: -60,
            ..small_settings()
        };
        assert!(matches!(
            IntroSession::mount(settings, NOW_MS, &mut store, callback),
            Err(IntroError::Settings(_))
        ));
        // nothing was recorded for a session that never mounted
        assert_eq!(store.value, None);
    }

    #[test]
    fn cues_use_the_configured_clips() {
        let whoosh = whoosh_cue();
        assert_eq!(whoosh.start, 0.0);
        assert_eq!(whoosh.end, Some(WHOOSH_END));
        assert_eq!(whoosh.rate, WHOOSH_RATE);

        let impact = impact_cue();
        assert_eq!(impact.start, IMPACT_START);
        assert_eq!(impact.end, None);
    }

    #[test]
    fn invalid_timeline_is_rejected_at_mount() {
        let (_, callback) = counter();
        let mut store = MemoryCooldownStore::default();
        let settings = IntroSettings {
            flash_offset: 2.0,
            complete_offset: 1.7,
            ..small_settings()
        };
        assert!(matches!(
            IntroSession::mount(settings, NOW_MS, &mut store, callback),
            Err(IntroError::Timeline { .. })
        ));
    }

    #[test]
    fn overlay_fades_are_bounded() {
        let mut audio = RecordingAudio::default();
        let (mut session, _, t0) = ready_session(&mut audio);
        assert_eq!(session.flash_alpha(), 0.0);
        session.update(t0 + 5.0, &mut audio);
        assert_eq!(session.ready_fade(), 1.0);

        session.enter(t0 + 5.0, &mut audio);
        session.update(t0 + 6.75, &mut audio);
        let alpha = session.flash_alpha();
        assert!(alpha > 0.0 && alpha <= 1.0);
    }
}
