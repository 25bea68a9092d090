//! Synthesized-audio cache.
//!
//! Synthesis calls are billed by the provider, so audio is stored after the
//! first successful call and served from the store afterwards. Entries are
//! never expired.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`SynthesisCache`] | Lookup, single-flight synthesis, persistence, statistics |
//! | [`AudioStore`] | Trait for storage backends |
//! | [`FileStore`] | One file per key (`text.mp3`, `markup.mp3`, ...) |
//! | [`MemoryStore`] | In-process map, mainly for tests |
//! | [`CacheKeyGenerator`] | Format keying or content-hash keying |

mod backend;
mod key;
mod manager;

pub use backend::{AudioStore, FileStore, MemoryStore};
pub use key::{CacheKey, CacheKeyGenerator, CacheKeying};
pub use manager::{CacheStats, SynthesisCache};
