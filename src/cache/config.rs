//! Cache configuration.
//!
//! Controls whether results are cached and for how long each entity kind lives.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

// Default values for cache configuration
const DEFAULT_FILM_TTL_SECS: u64 = 60 * 5;
const DEFAULT_GENRE_TTL_SECS: u64 = 60;
const DEFAULT_PERSON_TTL_SECS: u64 = 60 * 5;
const DEFAULT_MEMORY_CAPACITY: usize = 10_000;

/// Cache configuration from `kinoteka.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Consult and populate the cache at all.
    pub enabled: bool,
    /// Lifetime of cached film documents and film listings.
    pub film_ttl_seconds: u64,
    /// Lifetime of cached genre lookups.
    pub genre_ttl_seconds: u64,
    /// Lifetime of cached person documents and person searches.
    pub person_ttl_seconds: u64,
    /// Maximum entries held by the in-memory store.
    pub memory_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            film_ttl_seconds: DEFAULT_FILM_TTL_SECS,
            genre_ttl_seconds: DEFAULT_GENRE_TTL_SECS,
            person_ttl_seconds: DEFAULT_PERSON_TTL_SECS,
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            film_ttl_seconds: settings.film_ttl.as_secs(),
            genre_ttl_seconds: settings.genre_ttl.as_secs(),
            person_ttl_seconds: settings.person_ttl.as_secs(),
            memory_capacity: settings.memory_capacity.get(),
        }
    }
}

impl CacheConfig {
    pub fn film_ttl(&self) -> Duration {
        Duration::from_secs(self.film_ttl_seconds)
    }

    pub fn genre_ttl(&self) -> Duration {
        Duration::from_secs(self.genre_ttl_seconds)
    }

    pub fn person_ttl(&self) -> Duration {
        Duration::from_secs(self.person_ttl_seconds)
    }

    /// Returns the memory capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn memory_capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.memory_capacity).unwrap_or(NonZeroUsize::MIN)
    }
}
