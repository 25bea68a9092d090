//! 播放状态机：由解码器事件与用户命令驱动的播放会话。
//!
//! # Playback Module
//!
//! A [`Player`] owns one [`MediaDecoder`] and walks it through
//! `Disabled → Loading → Stopped ⇄ Playing ⇄ Paused` (plus `Error`) as
//! decoder signals and user commands arrive. Transition logic lives in the
//! pure [`Machine::reduce`]; the player only applies the resulting
//! [`Effect`]s.
//!
//! ```text
//! Disabled ──SourceAssigned──▶ Loading ──Ready──▶ Stopped
//! Stopped  ──Play──▶ Playing ──Pause──▶ Paused ──Play──▶ Playing
//! Playing/Paused ──Stop or Ended──▶ Stopped
//! any loaded state ──DecodeError──▶ Error ──SourceAssigned──▶ Loading
//! ```
//!
//! Decoder signals carry the generation of the source they were loaded
//! with; signals from a replaced source are dropped, so a late `Ready` can
//! never land on a newer `Loading` session.

mod player;
mod state;

pub use player::{
    AudioSource, DecoderError, DecoderEvent, DecoderSignal, EventSink, MediaDecoder, Player,
};
pub use state::{
    progress_ratio, Controls, Effect, Machine, PlaybackEvent, PlaybackState, Transition,
};
