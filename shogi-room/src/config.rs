//! Process configuration (spec 6, "Configuration/environment").

use std::time::Duration;

/// Listen port, clock defaults, and GC cadence, all overridable by
/// environment variable with the defaults spec.md names.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub port: u16,
    pub initial_seconds: u32,
    pub byoyomi_seconds: u32,
    pub gc_interval: Duration,
    pub inactivity_threshold: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 3001,
            initial_seconds: 600,
            byoyomi_seconds: 30,
            gc_interval: Duration::from_secs(60 * 60),
            inactivity_threshold: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl Config {
    /// Read overrides from the environment, falling back to spec.md's
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let default = Config::default();
        Config {
            port: env_u16("SHOGI_ROOM_PORT").unwrap_or(default.port),
            initial_seconds: env_u32("SHOGI_ROOM_INITIAL_SECONDS").unwrap_or(default.initial_seconds),
            byoyomi_seconds: env_u32("SHOGI_ROOM_BYOYOMI_SECONDS").unwrap_or(default.byoyomi_seconds),
            gc_interval: env_u32("SHOGI_ROOM_GC_INTERVAL_SECS")
                .map(|s| Duration::from_secs(s as u64))
                .unwrap_or(default.gc_interval),
            inactivity_threshold: env_u32("SHOGI_ROOM_INACTIVITY_SECS")
                .map(|s| Duration::from_secs(s as u64))
                .unwrap_or(default.inactivity_threshold),
        }
    }
}

fn env_u16(key: &str) -> Option<u16> {
    std::env::var(key).ok()?.parse().ok()
}

fn env_u32(key: &str) -> Option<u32> {
    std::env::var(key).ok()?.parse().ok()
}
