//! # speechcast
//!
//! 文档转语音流水线：把纯文本、HTML 与聊天 JSON 转换为 SSML，合成音频并缓存，再交给播放状态机。
//!
//! Document-to-speech pipeline. A document arrives in one of several source
//! formats, is normalized into speech markup (SSML), synthesized into audio
//! through an external provider with a cache in front of it, and played back
//! through an explicit state machine.
//!
//! ## Flow
//!
//! ```text
//! FormatKey ─▶ SourceFetcher ─▶ FormatAdapter ─▶ SpeechDocument ─▶ SSML
//!                                                                    │
//!                     Player ◀── audio bytes ◀── SynthesisCache ◀───┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use speechcast::adapters::{adapter_for, FormatAdapter};
//! use speechcast::format::{FormatKey, RawSource};
//!
//! fn main() -> speechcast::Result<()> {
//!     let source = RawSource::text("AMZN\t3232.58\tUSD");
//!     let adapter = adapter_for(FormatKey::Text);
//!     let document = adapter.adapt(&source)?;
//!     println!("{}", document.render(adapter.render_options()));
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`ssml`] | Markup builder, document model, render and parse |
//! | [`adapters`] | Text, markup and structured-data adapters |
//! | [`ingest`] | Source fetching and the ingestion pipeline |
//! | [`synthesis`] | Synthesis provider, audio stores, format-keyed cache |
//! | [`playback`] | Playback state machine and player session |
//! | [`client`] | Speech client and the select/play controller |
//! | [`server`] | HTTP routes `GET /getFormat` and `POST /tts` |
//! | [`config`] | YAML configuration with environment overrides |

pub mod adapters;
pub mod client;
pub mod config;
pub mod format;
pub mod ingest;
pub mod playback;
pub mod server;
pub mod ssml;
pub mod synthesis;

// Re-export main types for convenience
pub use client::{Controller, HttpSpeechClient, SpeechService, Status};
pub use config::Config;
pub use format::{ContentKind, FormatKey, RawSource};
pub use ingest::{Ingested, Ingestor};
pub use playback::{PlaybackState, Player};
pub use ssml::{SpeechDocument, SsmlBuilder};
pub use synthesis::SynthesisCache;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
