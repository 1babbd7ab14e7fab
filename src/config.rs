//! Server configuration from environment variables.
//!
//! HOST (e.g. 0.0.0.0), PORT (e.g. 8080), INACTIVITY_HOURS, CLEANUP_INTERVAL_MINUTES,
//! ADMINS (comma-separated user names), SESSION_KEY (at least 64 bytes).

use std::time::Duration;

/// Minimum length of a cookie signing key.
pub const SESSION_KEY_MIN_LEN: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tournaments not accessed for this long are removed.
    pub inactivity_timeout: Duration,
    /// How often the idle sweep runs.
    pub cleanup_interval: Duration,
    /// Users allowed to change any tournament.
    pub admins: Vec<String>,
    /// Cookie signing key; a random one is generated when absent.
    pub session_key: Option<Vec<u8>>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_inactivity_hours() -> u64 {
    12
}

fn default_cleanup_minutes() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            inactivity_timeout: Duration::from_secs(default_inactivity_hours() * 3600),
            cleanup_interval: Duration::from_secs(default_cleanup_minutes() * 60),
            admins: Vec::new(),
            session_key: None,
        }
    }
}

/// Parse `key` with `lookup`, falling back to `default` (with a warning) when unparsable.
fn parse_or<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {}={:?}", key, raw);
            default
        }),
        None => default,
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("HOST")
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(default_host);
        let port = parse_or(&lookup, "PORT", default_port());
        let hours = parse_or(&lookup, "INACTIVITY_HOURS", default_inactivity_hours());
        let minutes = parse_or(&lookup, "CLEANUP_INTERVAL_MINUTES", default_cleanup_minutes()).max(1);
        let admins = lookup("ADMINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        let session_key = lookup("SESSION_KEY").and_then(|key| {
            if key.len() >= SESSION_KEY_MIN_LEN {
                Some(key.into_bytes())
            } else {
                log::warn!(
                    "SESSION_KEY is shorter than {} bytes, using a random key",
                    SESSION_KEY_MIN_LEN
                );
                None
            }
        });
        Self {
            host,
            port,
            inactivity_timeout: Duration::from_secs(hours.saturating_mul(3600)),
            cleanup_interval: Duration::from_secs(minutes.saturating_mul(60)),
            admins,
            session_key,
        }
    }

    pub fn is_admin(&self, user: &str) -> bool {
        self.admins.iter().any(|a| a == user)
    }
}
