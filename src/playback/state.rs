//! Pure playback transition function.
//!
//! [`Machine::reduce`] maps `(machine, event)` to the next machine plus the
//! [`Effect`]s the caller must apply to the decoder. Nothing here touches a
//! real media backend.

use std::fmt;

/// Lifecycle state of a playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    /// No source assigned.
    Disabled,
    Loading,
    Playing,
    Paused,
    /// Loaded and ready, not advancing.
    Stopped,
    /// Decode or network failure. Only a new source leaves this state.
    Error,
}

impl PlaybackState {
    pub const ALL: [PlaybackState; 6] = [
        PlaybackState::Disabled,
        PlaybackState::Loading,
        PlaybackState::Playing,
        PlaybackState::Paused,
        PlaybackState::Stopped,
        PlaybackState::Error,
    ];

    fn has_source(&self) -> bool {
        !matches!(self, PlaybackState::Disabled | PlaybackState::Error)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disabled => "disabled",
            Self::Loading => "loading",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Inputs to the machine: decoder lifecycle signals and user commands.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    SourceAssigned,
    Ready,
    TimeUpdate { current_time: f64, duration: f64 },
    Ended,
    DecodeError,
    Play,
    Pause,
    Stop,
    /// The source was withdrawn; the session goes back to `Disabled`.
    Ejected,
}

/// Side effects requested by a transition, applied in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// (Re)load the current resource from the start.
    Load,
    StartDecoder,
    PauseDecoder,
    NotifyProgress { current_time: f64, duration: f64 },
    NotifyEnded,
}

/// Which user commands are currently enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub play: bool,
    pub pause: bool,
    pub stop: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Machine {
    pub state: PlaybackState,
    /// Fraction of the resource played, always within `[0, 1]`.
    pub progress: f64,
    pub autoplay: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub machine: Machine,
    pub effects: Vec<Effect>,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Machine {
    pub fn new(autoplay: bool) -> Self {
        Self {
            state: PlaybackState::Disabled,
            progress: 0.0,
            autoplay,
        }
    }

    pub fn controls(&self) -> Controls {
        use PlaybackState::*;
        Controls {
            play: matches!(self.state, Stopped | Paused),
            pause: matches!(self.state, Playing),
            stop: matches!(self.state, Playing | Paused),
        }
    }

    pub fn reduce(self, event: &PlaybackEvent) -> Transition {
        use PlaybackState::*;

        let mut next = self;
        let mut effects = Vec::new();
        match (self.state, event) {
            (_, PlaybackEvent::SourceAssigned) => {
                next.state = Loading;
                next.progress = 0.0;
                effects.push(Effect::Load);
            }
            (Loading, PlaybackEvent::Ready) => {
                if self.autoplay {
                    next.state = Playing;
                    effects.push(Effect::StartDecoder);
                } else {
                    next.state = Stopped;
                }
            }
            (state, PlaybackEvent::DecodeError) if state.has_source() => {
                next.state = Error;
            }
            (Stopped, PlaybackEvent::Play) => {
                next.state = Playing;
                next.progress = 0.0;
                effects.push(Effect::StartDecoder);
            }
            (Paused, PlaybackEvent::Play) => {
                next.state = Playing;
                effects.push(Effect::StartDecoder);
            }
            (Playing, PlaybackEvent::Pause) => {
                next.state = Paused;
                effects.push(Effect::PauseDecoder);
            }
            (Playing | Paused, PlaybackEvent::Stop) => {
                next.state = Stopped;
                next.progress = 0.0;
                effects.push(Effect::PauseDecoder);
                effects.push(Effect::Load);
            }
            (
                state,
                PlaybackEvent::TimeUpdate {
                    current_time,
                    duration,
                },
            ) if state.has_source() => {
                next.progress = progress_ratio(*current_time, *duration);
                effects.push(Effect::NotifyProgress {
                    current_time: *current_time,
                    duration: *duration,
                });
            }
            (Playing | Paused, PlaybackEvent::Ended) => {
                next.state = Stopped;
                effects.push(Effect::Load);
                effects.push(Effect::NotifyEnded);
            }
            (Disabled, PlaybackEvent::Ejected) => {}
            (_, PlaybackEvent::Ejected) => {
                next.state = Disabled;
                next.progress = 0.0;
                effects.push(Effect::PauseDecoder);
            }
            _ => {}
        }
        Transition {
            machine: next,
            effects,
        }
    }
}

/// `current_time / duration`, clamped to `[0, 1]`; 0 when the duration is unknown.
pub fn progress_ratio(current_time: f64, duration: f64) -> f64 {
    if !duration.is_finite() || duration <= 0.0 || !current_time.is_finite() {
        return 0.0;
    }
    (current_time / duration).clamp(0.0, 1.0)
}
