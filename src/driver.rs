//! Loop driver
//!
//! Owns the session and decides, frame by frame, whether the simulation runs.
//! The browser glue schedules `requestAnimationFrame` callbacks; each callback
//! carries the epoch it was scheduled under. Stopping or restarting a session
//! bumps the epoch, so a callback queued before the stop finds itself stale
//! and touches nothing.

use glam::Vec2;

use crate::consts::SIM_DT;
use crate::sim::{GameEvent, GamePhase, GameState, SoundCue, TickInput, maybe_spawn, tick};
use crate::tuning::Difficulty;

/// How long the destroyed craft stays on screen before the game over screen
pub const WRECK_DISPLAY_MS: f64 = 1_200.0;

/// Top-level UI phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppPhase {
    #[default]
    Menu,
    /// Waiting on the mission briefing
    LoadingMission,
    Playing,
    GameOver,
}

/// What a scheduled frame did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Scheduled under an old epoch; nothing ran, do not reschedule
    Stale,
    /// Render target not ready; nothing ran, reschedule
    Skipped,
    /// One tick ran, reschedule
    Continue,
    /// The session ended this frame; do not reschedule
    Ended,
}

impl FrameOutcome {
    pub fn should_reschedule(self) -> bool {
        matches!(self, FrameOutcome::Skipped | FrameOutcome::Continue)
    }
}

/// Notifications for the page (audio, HUD, game over screen)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Sound(SoundCue),
    Score(u64),
    LevelUp(u8),
    GameOver { score: u64 },
}

impl From<GameEvent> for HostEvent {
    fn from(event: GameEvent) -> Self {
        match event {
            GameEvent::Sound(cue) => HostEvent::Sound(cue),
            GameEvent::ScoreChanged(score) => HostEvent::Score(score),
            GameEvent::LevelUp(level) => HostEvent::LevelUp(level),
            GameEvent::GameOver { score } => HostEvent::GameOver { score },
        }
    }
}

/// Session state machine over menu, briefing, playing and game over
#[derive(Debug, Default)]
pub struct LoopDriver {
    phase: AppPhase,
    state: Option<GameState>,
    epoch: u64,
    /// Handle of the animation frame request currently in flight
    pending: Option<i32>,
    /// Frame time the last session ended at
    ended_at_ms: Option<f64>,
    outbox: Vec<HostEvent>,
}

impl LoopDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> AppPhase {
        self.phase
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Session state, present from the first start onwards
    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    /// Wait for a mission briefing. Any running session is stopped first.
    pub fn begin_briefing(&mut self) -> Option<i32> {
        self.stop(AppPhase::LoadingMission)
    }

    /// Briefing arrived: back to the menu. Returns false when the wait was
    /// abandoned in the meantime (a session started or another request began).
    pub fn briefing_ready(&mut self, epoch: u64) -> bool {
        if self.phase == AppPhase::LoadingMission && self.epoch == epoch {
            self.phase = AppPhase::Menu;
            true
        } else {
            false
        }
    }

    /// Reset the session and enter `Playing`. Returns the epoch frames must
    /// be scheduled under.
    pub fn start(&mut self, difficulty: Difficulty, seed: u64) -> u64 {
        self.epoch += 1;
        self.pending = None;
        self.ended_at_ms = None;
        self.state = Some(GameState::new(difficulty, seed));
        self.phase = AppPhase::Playing;
        self.outbox.clear();
        self.outbox.push(HostEvent::Score(0));
        log::info!(
            "Session started: {} (seed {}, epoch {})",
            difficulty.profile().label,
            seed,
            self.epoch
        );
        self.epoch
    }

    /// Leave the current session. Invalidates every frame scheduled so far and
    /// hands back the in-flight request handle so the caller can cancel it.
    pub fn stop(&mut self, next: AppPhase) -> Option<i32> {
        if self.phase == AppPhase::Playing {
            log::info!("Session stopped (epoch {})", self.epoch);
        }
        self.epoch += 1;
        self.phase = next;
        self.pending.take()
    }

    /// Remember the animation frame handle scheduled for `epoch`
    pub fn set_pending(&mut self, epoch: u64, handle: i32) {
        if self.is_current(epoch) {
            self.pending = Some(handle);
        }
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        epoch == self.epoch && self.phase == AppPhase::Playing
    }

    /// Run one scheduled frame: spawn, then one fixed tick.
    ///
    /// The render pass is the caller's job and only happens when this
    /// returns `Continue` or `Ended`.
    pub fn frame(
        &mut self,
        epoch: u64,
        now_ms: f64,
        pointer: Option<Vec2>,
        surface_ready: bool,
    ) -> FrameOutcome {
        if !self.is_current(epoch) {
            return FrameOutcome::Stale;
        }
        self.pending = None;
        if !surface_ready {
            return FrameOutcome::Skipped;
        }
        let Some(state) = self.state.as_mut() else {
            return FrameOutcome::Stale;
        };

        maybe_spawn(state, now_ms);
        tick(state, &TickInput { pointer, now_ms }, SIM_DT);

        let ended = state.phase == GamePhase::GameOver;
        self.outbox
            .extend(state.drain_events().into_iter().map(HostEvent::from));

        if ended {
            self.stop(AppPhase::GameOver);
            self.ended_at_ms = Some(now_ms);
            FrameOutcome::Ended
        } else {
            FrameOutcome::Continue
        }
    }

    /// Whether a render-only frame under `epoch` should still draw the
    /// finished session. Nothing is simulated while the wreck is shown.
    pub fn show_wreck(&self, epoch: u64, now_ms: f64) -> bool {
        self.phase == AppPhase::GameOver
            && epoch == self.epoch
            && self
                .ended_at_ms
                .is_some_and(|ended| now_ms - ended < WRECK_DISPLAY_MS)
    }

    /// Take everything queued for the page since the last drain
    pub fn drain_host_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.outbox)
    }
}
