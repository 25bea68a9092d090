//! Cache key generation.

use crate::format::FormatKey;
use crate::synthesis::types::{AudioEncoding, VoiceSpec};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// How cached audio is identified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKeying {
    /// One entry per format key. A changed payload under the same format is
    /// served the previously synthesized audio.
    #[default]
    Format,
    /// One entry per (format, markup, voice, encoding) digest.
    ContentHash,
}

/// Identity of one cached audio entry; also its file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    stem: String,
}

impl CacheKey {
    pub fn new(stem: impl Into<String>) -> Self {
        Self { stem: stem.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.stem
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.stem)
    }
}

impl From<FormatKey> for CacheKey {
    fn from(format: FormatKey) -> Self {
        Self::new(format.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CacheKeyGenerator {
    keying: CacheKeying,
}

impl CacheKeyGenerator {
    pub fn new(keying: CacheKeying) -> Self {
        Self { keying }
    }

    pub fn keying(&self) -> CacheKeying {
        self.keying
    }

    pub fn generate(
        &self,
        format: FormatKey,
        ssml: &str,
        voice: &VoiceSpec,
        encoding: AudioEncoding,
    ) -> CacheKey {
        match self.keying {
            CacheKeying::Format => CacheKey::from(format),
            CacheKeying::ContentHash => {
                let mut parts: BTreeMap<&str, String> = BTreeMap::new();
                parts.insert("format", format.as_str().into());
                parts.insert("ssml", ssml.into());
                parts.insert("language", voice.language_code.clone());
                parts.insert("gender", voice.gender.as_str().into());
                if let Some(name) = &voice.name {
                    parts.insert("voice", name.clone());
                }
                parts.insert("encoding", encoding.as_str().into());
                let canonical = serde_json::to_string(&parts).unwrap_or_default();
                let mut hasher = Sha256::new();
                hasher.update(canonical.as_bytes());
                let hash: String = hasher
                    .finalize()
                    .iter()
                    .take(12)
                    .map(|b| format!("{:02x}", b))
                    .collect();
                CacheKey::new(format!("{}-{}", format, hash))
            }
        }
    }
}
