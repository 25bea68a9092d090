//! 语音合成模块：合成服务抽象、Google TTS 客户端与按格式缓存。
//!
//! # Synthesis Module
//!
//! Turns a [`SpeechDocument`](crate::ssml::SpeechDocument) into audio bytes.
//! The provider is an opaque external service, injected once as an
//! `Arc<dyn SynthesisProvider>`; [`SynthesisCache`] sits in front of it so a
//! given cache key is synthesized at most once.

pub mod cache;
mod provider;
mod types;

pub use cache::{
    AudioStore, CacheKey, CacheKeyGenerator, CacheKeying, CacheStats, FileStore, MemoryStore,
    SynthesisCache,
};
pub use provider::{GoogleTtsProvider, GoogleTtsProviderBuilder, SynthesisProvider};
pub use types::{AudioEncoding, SynthesisRequest, VoiceGender, VoiceSpec};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
    #[error("synthesis provider error: {0}")]
    Provider(String),

    #[error("synthesis provider returned HTTP {status}: {body}")]
    ProviderStatus { status: u16, body: String },

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("audio cache error: {0}")]
    Cache(String),

    #[error("synthesis configuration error: {0}")]
    Configuration(String),

    #[error("synthesis request cancelled")]
    Cancelled,
}
