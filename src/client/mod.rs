//! 客户端：选择格式、请求合成并驱动播放。
//!
//! # Client Module
//!
//! [`Controller`] ties the pieces together on the listening side: a format
//! selection runs through the [`Ingestor`](crate::ingest::Ingestor), the
//! resulting markup goes to a [`SpeechService`] (the HTTP server via
//! [`HttpSpeechClient`], or a [`SynthesisCache`](crate::synthesis::SynthesisCache)
//! in-process), and the audio lands in a [`Player`](crate::playback::Player).

mod controller;
mod http;

pub use controller::{Controller, Status};
pub use http::{HttpSpeechClient, SpeechService};
