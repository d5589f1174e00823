//! Game context and frame driver
//!
//! `Game` owns the simulation state and its collaborators. The host calls
//! `frame` once per display refresh and `handle_input` for every raw event;
//! both run to completion on the same thread, so there is a single writer.

use crate::audio::{AudioSink, CueController, ScheduledStop, StopToken};
use crate::clock::FrameClock;
use crate::input::{Command, InputRouter, RawInput};
use crate::renderer::{FrameView, RenderSink};
use crate::settings::Settings;
use crate::sim::{Controls, Effect, GameEvent, GameMode, GameState, ModeEvent, tick, transition};

pub struct Game<A: AudioSink> {
    state: GameState,
    clock: FrameClock,
    router: InputRouter,
    cues: CueController,
    audio: A,
    controls: Controls,
    /// Stops the host still has to schedule
    scheduled: Vec<ScheduledStop>,
    /// Timestamp of the latest frame, for drawing
    last_frame_at: f64,
}

impl<A: AudioSink> Game<A> {
    pub fn new(state: GameState, audio: A) -> Self {
        let controls = Controls::for_mode(state.mode);
        Self {
            state,
            clock: FrameClock::new(),
            router: InputRouter::new(),
            cues: CueController::new(),
            audio,
            controls,
            scheduled: Vec::new(),
            last_frame_at: 0.0,
        }
    }

    /// One display refresh: simulate if running, then render regardless
    pub fn frame(&mut self, now: f64, renderer: &mut dyn RenderSink) -> Vec<GameEvent> {
        let dt = self.clock.advance(now);
        self.last_frame_at = now;

        let events = if self.state.mode == GameMode::Running {
            tick(&mut self.state, dt)
        } else {
            Vec::new()
        };

        for event in &events {
            match *event {
                GameEvent::Scored { score } => log::debug!("Score: {}", score),
                GameEvent::NewBest { best } => log::info!("New best score: {}", best),
                GameEvent::Spawned { .. } => {}
                GameEvent::Collision(kind) => {
                    log::info!("Run over ({:?}) with score {}", kind, self.state.score());
                    self.dispatch(ModeEvent::Crash, now);
                }
            }
        }

        renderer.render(&self.view());
        events
    }

    /// Route one raw host event
    pub fn handle_input(&mut self, input: &RawInput, now: f64) {
        if input.is_gesture() {
            self.cues.unlock();
        }
        if let Some(command) = self.router.route(input) {
            self.command(command, now);
        }
    }

    /// Execute a logical command against the current mode
    pub fn command(&mut self, command: Command, now: f64) {
        let mode = self.state.mode;
        match command {
            Command::Primary => match mode {
                GameMode::Running => self.flap(now),
                _ => self.start_or_resume(now),
            },
            Command::StartIfIdle => {
                if mode != GameMode::Running {
                    self.start_or_resume(now);
                }
            }
            Command::PauseToggle => match mode {
                GameMode::Running => {
                    self.dispatch(ModeEvent::Pause, now);
                }
                GameMode::Paused => {
                    self.dispatch(ModeEvent::Resume, now);
                }
                _ => {}
            },
            Command::Pause => {
                self.dispatch(ModeEvent::Pause, now);
            }
            Command::Restart => {
                self.dispatch(ModeEvent::Restart, now);
            }
        }
    }

    fn start_or_resume(&mut self, now: f64) {
        // Starting counts as a gesture even when it came from a button
        self.cues.unlock();
        let event = if self.state.mode == GameMode::Paused {
            ModeEvent::Resume
        } else {
            ModeEvent::Start
        };
        self.dispatch(event, now);
    }

    /// Apply a mode event through the transition table; false if ignored
    pub fn dispatch(&mut self, event: ModeEvent, now: f64) -> bool {
        let Some(t) = transition(self.state.mode, event) else {
            log::debug!("Ignoring {:?} in {}", event, self.state.mode.as_str());
            return false;
        };

        for effect in t.effects {
            match effect {
                Effect::ResetRun => self.state.reset_run(),
                Effect::StopTransientCue => self.cues.stop_transient(&mut self.audio),
                Effect::PlayTerminalCue => {
                    if let Some(stop) = self.cues.play_terminal(&mut self.audio) {
                        self.scheduled.push(stop);
                    }
                }
            }
        }

        self.state.mode = t.to;
        self.controls = Controls::for_mode(t.to);
        if t.to == GameMode::Running {
            self.clock.resync(now);
        }
        log::info!("Mode {} -> {}", t.from.as_str(), t.to.as_str());
        true
    }

    /// Upward impulse plus the (rate-limited) transient cue
    fn flap(&mut self, now: f64) {
        let velocity = self.state.tuning.flap_velocity;
        self.state.avatar.flap(velocity);
        if let Some(stop) = self.cues.request_transient(now, &mut self.audio) {
            self.scheduled.push(stop);
        }
    }

    /// A host timer for `token` elapsed
    pub fn fire_stop(&mut self, token: StopToken) -> bool {
        self.cues.fire(token, &mut self.audio)
    }

    /// Stops created since the last call; the host must schedule each one
    pub fn take_scheduled_stops(&mut self) -> Vec<ScheduledStop> {
        std::mem::take(&mut self.scheduled)
    }

    /// The window lost focus; key-up events may never arrive
    pub fn focus_lost(&mut self) {
        self.router.release_all();
    }

    pub fn audio_unlocked(&self) -> bool {
        self.cues.is_unlocked()
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.cues.set_volume_percent(settings.flap_volume);
        self.cues.set_muted(settings.muted);
    }

    /// Snapshot for the render sink
    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            avatar: &self.state.avatar,
            obstacles: &self.state.obstacles,
            score: self.state.score(),
            best: self.state.best(),
            mode: self.state.mode,
            tuning: &self.state.tuning,
            time_ms: self.last_frame_at,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.state.mode
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// Asset swaps go through here; they take effect on the next cue
    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }
}
