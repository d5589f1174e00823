//! Audio cues
//!
//! `CueController` decides when cues start and stop; an `AudioSink` makes the
//! noise. Forced stops are one-shot timers identified by a `StopToken`, so a
//! timer that fires after its cue was superseded does nothing.

use crate::consts::{TERMINAL_CUE_MAX_MS, TRANSIENT_CUE_COOLDOWN_MS, TRANSIENT_CUE_MAX_MS};

/// The two cues the game plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Repeatable flap sound
    Transient,
    /// Played once when a run ends
    Terminal,
}

/// Playback backend. Failures stay inside the sink.
pub trait AudioSink {
    /// Start the transient cue from the beginning at `volume` (0.0 - 1.0)
    fn play_transient(&mut self, volume: f32);
    fn stop_transient(&mut self);
    fn play_terminal(&mut self);
    fn stop_terminal(&mut self);
}

/// Sink that plays nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play_transient(&mut self, _volume: f32) {}
    fn stop_transient(&mut self) {}
    fn play_terminal(&mut self) {}
    fn stop_terminal(&mut self) {}
}

/// Identifies one scheduled stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopToken(u64);

/// A stop the host must schedule: call `fire` with `token` after `delay_ms`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledStop {
    pub token: StopToken,
    pub cue: Cue,
    pub delay_ms: f64,
}

/// Cue policy: gesture unlock, transient cooldown, and forced stops
#[derive(Debug)]
pub struct CueController {
    unlocked: bool,
    last_transient_at: Option<f64>,
    live_transient: Option<StopToken>,
    live_terminal: Option<StopToken>,
    next_token: u64,
    /// Transient cue volume (0.0 - 1.0)
    volume: f32,
    muted: bool,
}

impl Default for CueController {
    fn default() -> Self {
        Self::new()
    }
}

impl CueController {
    pub fn new() -> Self {
        Self {
            unlocked: false,
            last_transient_at: None,
            live_transient: None,
            live_terminal: None,
            next_token: 1,
            volume: 1.0,
            muted: false,
        }
    }

    /// Browsers refuse playback before a user gesture
    pub fn unlock(&mut self) {
        if !self.unlocked {
            log::debug!("Audio unlocked by user gesture");
        }
        self.unlocked = true;
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Set transient cue volume from a 0-100 percentage
    pub fn set_volume_percent(&mut self, percent: f32) {
        self.volume = (percent / 100.0).clamp(0.0, 1.0);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn allocate(&mut self) -> StopToken {
        let token = StopToken(self.next_token);
        self.next_token += 1;
        token
    }

    /// Start the transient cue unless it started less than the cooldown ago
    ///
    /// Restarting cancels the previous cue's stop timer.
    pub fn request_transient(&mut self, now: f64, sink: &mut dyn AudioSink) -> Option<ScheduledStop> {
        if !self.unlocked || self.muted {
            return None;
        }
        if let Some(last) = self.last_transient_at {
            if now - last < TRANSIENT_CUE_COOLDOWN_MS {
                return None;
            }
        }
        self.last_transient_at = Some(now);
        self.stop_transient(sink);
        sink.play_transient(self.volume);

        let token = self.allocate();
        self.live_transient = Some(token);
        log::debug!("Transient cue started ({:?})", token);
        Some(ScheduledStop {
            token,
            cue: Cue::Transient,
            delay_ms: TRANSIENT_CUE_MAX_MS,
        })
    }

    /// Stop the transient cue now and cancel its pending stop
    pub fn stop_transient(&mut self, sink: &mut dyn AudioSink) {
        self.live_transient = None;
        sink.stop_transient();
    }

    /// Play the terminal cue from the start, capped in length
    pub fn play_terminal(&mut self, sink: &mut dyn AudioSink) -> Option<ScheduledStop> {
        if !self.unlocked || self.muted {
            return None;
        }
        sink.play_terminal();
        let token = self.allocate();
        self.live_terminal = Some(token);
        Some(ScheduledStop {
            token,
            cue: Cue::Terminal,
            delay_ms: TERMINAL_CUE_MAX_MS,
        })
    }

    /// A scheduled stop elapsed; returns true if it still applied
    pub fn fire(&mut self, token: StopToken, sink: &mut dyn AudioSink) -> bool {
        if self.live_transient == Some(token) {
            self.live_transient = None;
            sink.stop_transient();
            true
        } else if self.live_terminal == Some(token) {
            self.live_terminal = None;
            sink.stop_terminal();
            true
        } else {
            false
        }
    }

    pub fn has_pending_transient_stop(&self) -> bool {
        self.live_transient.is_some()
    }
}

/// Web Audio / HTML audio backend (browser only)
#[cfg(target_arch = "wasm32")]
pub mod web {
    use web_sys::{AudioContext, GainNode, HtmlAudioElement, OscillatorNode, OscillatorType};

    use super::AudioSink;
    use crate::assets::AssetSlot;

    /// Plays user clips when loaded, synthesized cues otherwise
    pub struct WebAudioSink {
        ctx: Option<AudioContext>,
        pub transient_clip: AssetSlot<HtmlAudioElement>,
        pub terminal_clip: AssetSlot<HtmlAudioElement>,
        /// Oscillator of the synthesized transient cue, so it can be cut short
        synth_transient: Option<OscillatorNode>,
    }

    impl Default for WebAudioSink {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudioSink {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - synthesized cues disabled");
            }
            Self {
                ctx,
                transient_clip: AssetSlot::empty(),
                terminal_clip: AssetSlot::empty(),
                synth_transient: None,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn restart_clip(clip: &HtmlAudioElement, volume: f64) {
            clip.set_loop(false);
            clip.set_current_time(0.0);
            clip.set_volume(volume);
            // Autoplay rejections surface as a rejected promise; nobody awaits it
            if clip.play().is_err() {
                log::warn!("Audio clip refused to play");
            }
        }

        fn halt_clip(clip: &HtmlAudioElement) {
            let _ = clip.pause();
            clip.set_current_time(0.0);
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Flap - short rising whoosh
        fn synth_flap(&mut self, vol: f32) {
            let Some(ctx) = &self.ctx else { return };
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            let Some((osc, gain)) = Self::create_osc(ctx, 300.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                .ok();
            osc.frequency().set_value_at_time(300.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(700.0, t + 0.12)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.2).ok();
            self.synth_transient = Some(osc);
        }

        /// Crash - sad descending thump
        fn synth_crash(&self) {
            let Some(ctx) = &self.ctx else { return };
            for (i, freq) in [400.0, 300.0, 200.0].iter().enumerate() {
                let delay = i as f64 * 0.15;
                if let Some((osc, gain)) = Self::create_osc(ctx, *freq, OscillatorType::Sine) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(0.35, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.3).ok();
                }
            }
        }
    }

    impl AudioSink for WebAudioSink {
        fn play_transient(&mut self, volume: f32) {
            if let Some(clip) = self.transient_clip.ready() {
                Self::restart_clip(clip, volume as f64);
            } else {
                self.synth_flap(volume);
            }
        }

        fn stop_transient(&mut self) {
            if let Some(clip) = self.transient_clip.get() {
                Self::halt_clip(clip);
            }
            if let Some(osc) = self.synth_transient.take() {
                let _ = osc.stop();
            }
        }

        fn play_terminal(&mut self) {
            if let Some(clip) = self.terminal_clip.ready() {
                Self::restart_clip(clip, 1.0);
            } else {
                self.synth_crash();
            }
        }

        fn stop_terminal(&mut self) {
            if let Some(clip) = self.terminal_clip.get() {
                Self::halt_clip(clip);
            }
        }
    }
}
