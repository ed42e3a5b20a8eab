//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects and an ambient bass loop, no sample
//! files. The manager is an owned resource with an explicit lifecycle; every
//! call is a silent no-op until the context is running and sound is enabled.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::settings::Settings;
use crate::sim::SoundCue;

#[cfg(target_arch = "wasm32")]
use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

/// Ambient bass line (Hz), one note per beat
pub const BASS_LINE: [f32; 8] = [55.0, 55.0, 65.41, 49.0, 55.0, 55.0, 43.65, 49.0];

/// Ambient beat length
pub const BEAT_MS: f64 = 220.0;

/// Level-up arpeggio (C5 E5 G5 C6)
const LEVEL_UP_NOTES: [f32; 4] = [523.25, 659.25, 783.99, 1046.50];

/// Where the audio context is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioLifecycle {
    /// `init` not called yet
    #[default]
    Uninitialized,
    /// Created but blocked until a user gesture resumes it
    Suspended,
    Running,
    /// No audio on this platform (or context creation failed)
    Unavailable,
}

/// One ambient beat to voice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientStep {
    pub bass_hz: f32,
    pub hi_hat: bool,
}

/// Beat clock for the ambient loop
///
/// Poll it with the current time; it yields at most one step per call and
/// never bursts to catch up after a stall.
#[derive(Debug, Clone)]
pub struct AmbientSequencer {
    next_beat_ms: f64,
    count: usize,
}

impl AmbientSequencer {
    /// First beat lands one beat after `now_ms`
    pub fn new(now_ms: f64) -> Self {
        Self {
            next_beat_ms: now_ms + BEAT_MS,
            count: 0,
        }
    }

    pub fn poll(&mut self, now_ms: f64) -> Option<AmbientStep> {
        if now_ms < self.next_beat_ms {
            return None;
        }

        let step = AmbientStep {
            bass_hz: BASS_LINE[self.count % BASS_LINE.len()],
            hi_hat: self.count % 2 == 1,
        };
        self.count += 1;
        self.next_beat_ms += BEAT_MS;
        if self.next_beat_ms <= now_ms {
            // Fell behind (tab throttled); drop the missed beats
            self.next_beat_ms = now_ms + BEAT_MS;
        }
        Some(step)
    }
}

/// Fill a buffer with white noise in [-1, 1)
pub fn fill_noise(rng: &mut impl Rng, samples: &mut [f32]) {
    for s in samples.iter_mut() {
        *s = rng.random_range(-1.0..1.0);
    }
}

/// Audio manager for the game
pub struct AudioManager {
    #[cfg(target_arch = "wasm32")]
    ctx: Option<AudioContext>,
    lifecycle: AudioLifecycle,
    enabled: bool,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    /// Ambient loop requested by the game, independent of `enabled`
    ambient_wanted: bool,
    ambient: Option<AmbientSequencer>,
    noise_rng: Pcg32,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    /// Create the manager. No audio context exists until `init`.
    pub fn new() -> Self {
        Self {
            #[cfg(target_arch = "wasm32")]
            ctx: None,
            lifecycle: AudioLifecycle::Uninitialized,
            enabled: false,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 1.0,
            ambient_wanted: false,
            ambient: None,
            noise_rng: Pcg32::seed_from_u64(0x5eed),
        }
    }

    pub fn lifecycle(&self) -> AudioLifecycle {
        self.lifecycle
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_ambient_playing(&self) -> bool {
        self.ambient.is_some()
    }

    /// Create or resume the audio context. Call from a user gesture.
    /// Safe to call any number of times.
    #[cfg(target_arch = "wasm32")]
    pub fn init(&mut self) {
        if self.lifecycle == AudioLifecycle::Unavailable {
            return;
        }
        if self.ctx.is_none() {
            match AudioContext::new() {
                Ok(ctx) => {
                    self.noise_rng = Pcg32::seed_from_u64(js_sys::Date::now() as u64);
                    self.ctx = Some(ctx);
                }
                Err(e) => {
                    log::warn!("Failed to create AudioContext - audio disabled: {:?}", e);
                    self.lifecycle = AudioLifecycle::Unavailable;
                    return;
                }
            }
        }
        if let Some(ctx) = &self.ctx {
            if ctx.state() == AudioContextState::Suspended {
                let _ = ctx.resume();
            }
        }
        self.refresh_lifecycle();
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn init(&mut self) {
        if self.lifecycle == AudioLifecycle::Uninitialized {
            log::info!("No audio output on this platform");
            self.lifecycle = AudioLifecycle::Unavailable;
        }
    }

    /// Re-read the context state (resume completes asynchronously)
    #[cfg(target_arch = "wasm32")]
    fn refresh_lifecycle(&mut self) {
        if let Some(ctx) = &self.ctx {
            self.lifecycle = match ctx.state() {
                AudioContextState::Running => AudioLifecycle::Running,
                AudioContextState::Suspended => AudioLifecycle::Suspended,
                _ => AudioLifecycle::Unavailable,
            };
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn refresh_lifecycle(&mut self) {}

    /// Turn sound on or off. Turning it on initializes the context and
    /// restarts the ambient loop if the game had asked for one.
    pub fn set_enabled(&mut self, enabled: bool, now_ms: f64) {
        self.enabled = enabled;
        if enabled {
            self.init();
            if self.ambient_wanted && self.ambient.is_none() {
                self.ambient = Some(AmbientSequencer::new(now_ms));
            }
        } else {
            self.ambient = None;
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Set ambient loop volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Take volumes and the sound switch from saved preferences.
    ///
    /// Does not create the audio context; `init` still needs a user gesture.
    pub fn apply_settings(&mut self, settings: &Settings, now_ms: f64) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_music_volume(settings.music_volume);
        self.enabled = settings.sound_enabled;
        if !self.enabled {
            self.ambient = None;
        } else if self.ambient_wanted && self.ambient.is_none() {
            self.ambient = Some(AmbientSequencer::new(now_ms));
        }
    }

    fn sfx_gain(&self) -> f32 {
        if self.enabled { self.master_volume * self.sfx_volume } else { 0.0 }
    }

    fn music_gain(&self) -> f32 {
        if self.enabled { self.master_volume * self.music_volume } else { 0.0 }
    }

    /// Begin the ambient loop (plays once sound is enabled and running)
    pub fn start_ambient(&mut self, now_ms: f64) {
        self.ambient_wanted = true;
        if self.enabled {
            self.ambient = Some(AmbientSequencer::new(now_ms));
        }
    }

    pub fn stop_ambient(&mut self) {
        self.ambient_wanted = false;
        self.ambient = None;
    }

    /// Voice the next ambient beat if it is due
    pub fn tick_ambient(&mut self, now_ms: f64) {
        self.refresh_lifecycle();
        let vol = self.music_gain();
        let Some(seq) = self.ambient.as_mut() else { return };
        let Some(step) = seq.poll(now_ms) else { return };
        if vol > 0.0 && self.lifecycle == AudioLifecycle::Running {
            self.play_beat(step, vol);
        }
    }

    /// Play a sound cue. Never fails; silent unless enabled and running.
    pub fn play(&mut self, cue: SoundCue) {
        let vol = self.sfx_gain();
        if vol <= 0.0 {
            return;
        }
        self.refresh_lifecycle();
        if self.lifecycle != AudioLifecycle::Running {
            return;
        }

        match cue {
            SoundCue::Shoot => self.play_shoot(vol),
            SoundCue::ExplosionSmall => self.play_explosion(vol, false),
            SoundCue::ExplosionLarge => self.play_explosion(vol, true),
            SoundCue::Hit => self.play_hit(vol),
            SoundCue::LevelUp => self.play_level_up(vol),
        }
    }

    // === Sound generators ===

    #[cfg(not(target_arch = "wasm32"))]
    fn play_shoot(&self, _vol: f32) {}
    #[cfg(not(target_arch = "wasm32"))]
    fn play_explosion(&mut self, _vol: f32, _large: bool) {}
    #[cfg(not(target_arch = "wasm32"))]
    fn play_hit(&self, _vol: f32) {}
    #[cfg(not(target_arch = "wasm32"))]
    fn play_level_up(&self, _vol: f32) {}
    #[cfg(not(target_arch = "wasm32"))]
    fn play_beat(&self, _step: AmbientStep, _vol: f32) {}
}

#[cfg(target_arch = "wasm32")]
impl AudioManager {
    /// Create an oscillator routed through a gain node to the speakers
    fn create_osc(&self, freq: f32, osc_type: OscillatorType) -> Option<(&AudioContext, OscillatorNode, GainNode)> {
        let ctx = self.ctx.as_ref()?;
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((ctx, osc, gain))
    }

    /// Shoot - short falling blip
    fn play_shoot(&self, vol: f32) {
        let Some((ctx, osc, gain)) = self.create_osc(880.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        osc.frequency().set_value_at_time(880.0, t).ok();
        osc.frequency().exponential_ramp_to_value_at_time(110.0, t + 0.1).ok();
        gain.gain().set_value_at_time(vol * 0.03, t).ok();
        gain.gain().exponential_ramp_to_value_at_time(0.001, t + 0.1).ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.1).ok();
    }

    /// Explosion - filtered noise burst; the large one is longer and deeper
    fn play_explosion(&mut self, vol: f32, large: bool) {
        use web_sys::BiquadFilterType;

        let Some(ctx) = self.ctx.clone() else { return };
        let (seconds, peak, cutoff, floor) = if large {
            (0.6, 0.5, 1200.0, 30.0)
        } else {
            (0.3, 0.4, 1000.0, 40.0)
        };

        let rate = ctx.sample_rate();
        let len = (rate * seconds as f32) as u32;
        let Ok(buffer) = ctx.create_buffer(1, len, rate) else { return };
        let mut noise = vec![0.0f32; len as usize];
        fill_noise(&mut self.noise_rng, &mut noise);
        if buffer.copy_to_channel(&mut noise, 0).is_err() {
            return;
        }

        let (Ok(source), Ok(filter), Ok(gain)) = (
            ctx.create_buffer_source(),
            ctx.create_biquad_filter(),
            ctx.create_gain(),
        ) else {
            return;
        };
        let t = ctx.current_time();

        source.set_buffer(Some(&buffer));
        filter.set_type(BiquadFilterType::Lowpass);
        filter.frequency().set_value_at_time(cutoff, t).ok();
        filter
            .frequency()
            .exponential_ramp_to_value_at_time(floor, t + seconds * 0.66)
            .ok();
        gain.gain().set_value_at_time(vol * peak, t).ok();
        gain.gain().exponential_ramp_to_value_at_time(0.01, t + seconds).ok();

        if source.connect_with_audio_node(&filter).is_err()
            || filter.connect_with_audio_node(&gain).is_err()
            || gain.connect_with_audio_node(&ctx.destination()).is_err()
        {
            return;
        }
        source.start().ok();
    }

    /// Hit - low sawtooth growl
    fn play_hit(&self, vol: f32) {
        let Some((ctx, osc, gain)) = self.create_osc(60.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        osc.frequency().set_value_at_time(60.0, t).ok();
        osc.frequency().linear_ramp_to_value_at_time(20.0, t + 0.2).ok();
        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain().linear_ramp_to_value_at_time(0.0, t + 0.2).ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.2).ok();
    }

    /// Level up - rising square arpeggio
    fn play_level_up(&self, vol: f32) {
        for (i, freq) in LEVEL_UP_NOTES.iter().enumerate() {
            if let Some((ctx, osc, gain)) = self.create_osc(*freq, OscillatorType::Square) {
                let t = ctx.current_time() + i as f64 * 0.1;
                gain.gain().set_value_at_time(0.0, t).ok();
                gain.gain().linear_ramp_to_value_at_time(vol * 0.08, t + 0.05).ok();
                gain.gain().linear_ramp_to_value_at_time(0.0, t + 0.15).ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.25).ok();
            }
        }
    }

    /// One ambient beat: bass note plus an optional hi-hat tick
    fn play_beat(&self, step: AmbientStep, vol: f32) {
        let beat = BEAT_MS / 1000.0;
        if let Some((ctx, osc, gain)) = self.create_osc(step.bass_hz, OscillatorType::Sawtooth) {
            let t = ctx.current_time();
            gain.gain().set_value_at_time(vol * 0.05, t).ok();
            gain.gain().exponential_ramp_to_value_at_time(0.001, t + beat).ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + beat).ok();
        }

        if step.hi_hat {
            if let Some((ctx, osc, gain)) = self.create_osc(10_000.0, OscillatorType::Square) {
                let t = ctx.current_time();
                gain.gain().set_value_at_time(vol * 0.008, t).ok();
                gain.gain().linear_ramp_to_value_at_time(0.0, t + 0.05).ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.05).ok();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequencer_walks_bass_line() {
        let mut seq = AmbientSequencer::new(0.0);
        assert_eq!(seq.poll(100.0), None);

        let mut notes = Vec::new();
        let mut hats = Vec::new();
        for beat in 1..=9 {
            let step = seq.poll(beat as f64 * BEAT_MS).expect("beat due");
            notes.push(step.bass_hz);
            hats.push(step.hi_hat);
        }
        assert_eq!(&notes[..8], &BASS_LINE);
        assert_eq!(notes[8], BASS_LINE[0]);
        assert_eq!(hats[..4], [false, true, false, true]);
    }

    #[test]
    fn test_sequencer_one_step_per_poll() {
        let mut seq = AmbientSequencer::new(0.0);
        assert!(seq.poll(BEAT_MS).is_some());
        assert!(seq.poll(BEAT_MS + 1.0).is_none());
    }

    #[test]
    fn test_sequencer_skips_missed_beats() {
        let mut seq = AmbientSequencer::new(0.0);
        // Tab was throttled for ten beats
        assert!(seq.poll(BEAT_MS * 10.0).is_some());
        assert!(seq.poll(BEAT_MS * 10.0 + 1.0).is_none());
        assert!(seq.poll(BEAT_MS * 11.0).is_some());
    }

    #[test]
    fn test_noise_range() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut buf = [0.0f32; 512];
        fill_noise(&mut rng, &mut buf);
        assert!(buf.iter().all(|s| (-1.0..1.0).contains(s)));
        assert!(buf.iter().any(|s| *s != 0.0));
    }

    #[test]
    fn test_calls_are_safe_before_init() {
        let mut audio = AudioManager::new();
        assert_eq!(audio.lifecycle(), AudioLifecycle::Uninitialized);
        audio.play(SoundCue::Shoot);
        audio.start_ambient(0.0);
        audio.tick_ambient(1_000.0);
        audio.stop_ambient();
        assert_eq!(audio.lifecycle(), AudioLifecycle::Uninitialized);
    }

    #[test]
    fn test_native_init_is_unavailable_and_idempotent() {
        let mut audio = AudioManager::new();
        audio.init();
        audio.init();
        assert_eq!(audio.lifecycle(), AudioLifecycle::Unavailable);
        audio.set_enabled(true, 0.0);
        audio.play(SoundCue::ExplosionLarge);
        assert_eq!(audio.lifecycle(), AudioLifecycle::Unavailable);
    }

    #[test]
    fn test_disable_stops_ambient_and_enable_restores_it() {
        let mut audio = AudioManager::new();
        audio.set_enabled(true, 0.0);
        audio.start_ambient(0.0);
        assert!(audio.is_ambient_playing());

        audio.set_enabled(false, 100.0);
        assert!(!audio.is_ambient_playing());
        assert!(!audio.is_enabled());

        audio.set_enabled(true, 200.0);
        assert!(audio.is_ambient_playing());

        audio.stop_ambient();
        audio.set_enabled(false, 300.0);
        audio.set_enabled(true, 400.0);
        assert!(!audio.is_ambient_playing());
    }

    #[test]
    fn test_ambient_waits_for_enable() {
        let mut audio = AudioManager::new();
        audio.start_ambient(0.0);
        assert!(!audio.is_ambient_playing());
        audio.set_enabled(true, 50.0);
        assert!(audio.is_ambient_playing());
    }

    #[test]
    fn test_saved_sound_switch_is_applied() {
        let mut audio = AudioManager::new();
        let mut settings = Settings {
            sound_enabled: true,
            master_volume: 0.5,
            sfx_volume: 0.4,
            music_volume: 0.2,
            ..Settings::default()
        };
        audio.apply_settings(&settings, 0.0);
        assert!(audio.is_enabled());
        assert_eq!(audio.lifecycle(), AudioLifecycle::Uninitialized);
        assert_eq!(audio.sfx_gain(), 0.5 * 0.4);
        assert_eq!(audio.music_gain(), 0.5 * 0.2);

        // A session started afterwards gets its ambient loop straight away
        audio.start_ambient(10.0);
        assert!(audio.is_ambient_playing());

        settings.sound_enabled = false;
        audio.apply_settings(&settings, 20.0);
        assert!(!audio.is_enabled());
        assert!(!audio.is_ambient_playing());
        assert_eq!(audio.sfx_gain(), 0.0);

        settings.sound_enabled = true;
        audio.apply_settings(&settings, 30.0);
        assert!(audio.is_ambient_playing());
    }

    #[test]
    fn test_volumes_clamped() {
        let mut audio = AudioManager::new();
        audio.set_enabled(true, 0.0);
        audio.set_master_volume(2.0);
        audio.set_sfx_volume(-1.0);
        audio.set_music_volume(0.5);
        assert_eq!(audio.sfx_gain(), 0.0);
        assert_eq!(audio.music_gain(), 0.5);
        audio.set_enabled(false, 0.0);
        assert_eq!(audio.music_gain(), 0.0);
    }
}
