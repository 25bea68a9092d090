//! Synthesis cache: serve stored audio, otherwise synthesize once and persist.

use super::backend::AudioStore;
use super::key::{CacheKey, CacheKeyGenerator, CacheKeying};
use crate::format::FormatKey;
use crate::ssml::SpeechDocument;
use crate::synthesis::provider::SynthesisProvider;
use crate::synthesis::types::{AudioEncoding, SynthesisRequest, VoiceSpec};
use crate::synthesis::SynthesisError;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub provider_calls: u64,
    pub errors: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    provider_calls: AtomicU64,
    errors: AtomicU64,
}

impl AtomicStats {
    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            provider_calls: self.provider_calls.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

type Slot = Arc<tokio::sync::Mutex<()>>;

/// Format-keyed synthesis cache with a single-flight guard per key.
///
/// Concurrent first requests for the same key wait on one provider call and
/// are then served from the store, so each key is billed at most once.
pub struct SynthesisCache {
    provider: Arc<dyn SynthesisProvider>,
    store: Arc<dyn AudioStore>,
    keys: CacheKeyGenerator,
    voice: VoiceSpec,
    encoding: AudioEncoding,
    inflight: Mutex<HashMap<CacheKey, Slot>>,
    stats: AtomicStats,
}

impl SynthesisCache {
    pub fn new(provider: Arc<dyn SynthesisProvider>, store: Arc<dyn AudioStore>) -> Self {
        Self {
            provider,
            store,
            keys: CacheKeyGenerator::default(),
            voice: VoiceSpec::default(),
            encoding: AudioEncoding::default(),
            inflight: Mutex::new(HashMap::new()),
            stats: AtomicStats::default(),
        }
    }

    pub fn with_voice(mut self, voice: VoiceSpec) -> Self {
        self.voice = voice;
        self
    }

    pub fn with_encoding(mut self, encoding: AudioEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_keying(mut self, keying: CacheKeying) -> Self {
        self.keys = CacheKeyGenerator::new(keying);
        self
    }

    pub fn encoding(&self) -> AudioEncoding {
        self.encoding
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    pub fn key_for(&self, format: FormatKey, ssml: &str) -> CacheKey {
        self.keys.generate(format, ssml, &self.voice, self.encoding)
    }

    /// Return cached audio for `format`, or send `ssml` to the provider as
    /// given and persist the result.
    pub async fn synthesize(&self, format: FormatKey, ssml: &str) -> Result<Bytes, SynthesisError> {
        let key = self.key_for(format, ssml);

        if let Some(audio) = self.lookup(&key).await {
            info!(key = %key, "cache entry found, sending");
            return Ok(audio);
        }

        // Drop order matters: the turn, then our slot handle, then membership.
        let membership = Inflight::join(self, &key);
        let slot = membership.slot();
        let _turn = slot.lock().await;
        let audio = self.fill(&key, ssml).await?;
        Ok(audio)
    }

    /// Synthesize the compact rendering of `document`.
    pub async fn synthesize_document(
        &self,
        format: FormatKey,
        document: &SpeechDocument,
    ) -> Result<Bytes, SynthesisError> {
        self.synthesize(format, &document.to_ssml()).await
    }

    async fn fill(&self, key: &CacheKey, ssml: &str) -> Result<Bytes, SynthesisError> {
        // Another request may have filled the entry while we waited.
        if let Some(audio) = self.lookup(key).await {
            debug!(key = %key, "entry filled by concurrent request");
            return Ok(audio);
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        info!(key = %key, provider = self.provider.name(), "cache entry not found, synthesizing");
        self.stats.provider_calls.fetch_add(1, Ordering::Relaxed);
        let request = SynthesisRequest {
            ssml,
            voice: &self.voice,
            encoding: self.encoding,
        };
        let audio = self.provider.synthesize(&request).await.map_err(|e| {
            self.stats.errors.fetch_add(1, Ordering::Relaxed);
            warn!(key = %key, error = %e, "synthesis failed");
            e
        })?;

        // The provider call is already billed; a failed write only costs a future re-synthesis.
        if let Err(e) = self.store.put(key, &audio).await {
            self.stats.errors.fetch_add(1, Ordering::Relaxed);
            warn!(key = %key, error = %e, "failed to persist synthesized audio");
        } else {
            debug!(key = %key, bytes = audio.len(), store = self.store.name(), "audio cached");
        }
        Ok(audio)
    }

    async fn lookup(&self, key: &CacheKey) -> Option<Bytes> {
        match self.store.get(key).await {
            Ok(Some(audio)) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(audio)
            }
            Ok(None) => None,
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key = %key, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }
}

/// Membership in the single-flight map for one key.
///
/// Dropping it, including when the request future is cancelled mid-call,
/// removes the entry once no request holds the slot any more.
struct Inflight<'a> {
    cache: &'a SynthesisCache,
    key: CacheKey,
}

impl<'a> Inflight<'a> {
    fn join(cache: &'a SynthesisCache, key: &CacheKey) -> Self {
        Self {
            cache,
            key: key.clone(),
        }
    }

    fn slot(&self) -> Slot {
        let mut inflight = self.cache.inflight.lock().unwrap_or_else(|p| p.into_inner());
        inflight.entry(self.key.clone()).or_default().clone()
    }
}

impl Drop for Inflight<'_> {
    fn drop(&mut self) {
        let mut inflight = self.cache.inflight.lock().unwrap_or_else(|p| p.into_inner());
        // Only the map's own reference left.
        if inflight
            .get(&self.key)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            inflight.remove(&self.key);
        }
    }
}
