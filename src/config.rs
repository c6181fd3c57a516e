//! Centralized configuration: Redis keys, setting names, defaults and the
//! environment-supplied bot configuration.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use teloxide::types::UserId;

/// **Redis Keys:** where the moderation rule set and settings live.
pub mod key {
    /// Set of forbidden words (stored lowercased).
    pub const FORBIDDEN_WORDS: &str = "mod:forbidden_words";
    /// Set of allow-listed link strings.
    pub const ALLOWED_LINKS: &str = "mod:allowed_links";
    /// Set of admin user ids (the owner is implicit and never stored here).
    pub const ADMINS: &str = "mod:admins";
    /// Hash of tunable settings, see [`setting`](super::setting) for fields.
    pub const SETTINGS: &str = "mod:settings";
}

/// **Settings Hash Fields:** keys within the `mod:settings` hash.
pub mod setting {
    /// Mute duration in seconds.
    pub const MUTE_TIME: &str = "mute_time";
    /// Punishment for link violations: `"mute"` or `"ban"`.
    pub const LINK_PUNISH: &str = "link_punish";
    /// Anti-link filtering toggle: `"on"` or `"off"`.
    pub const ANTI_LINKS: &str = "anti_links";
    /// Enforcement scope: `"topics"` (forum topics only) or `"chat"` (whole chat).
    pub const ENFORCE_SCOPE: &str = "enforce_scope";
    /// Allow-list matching policy: `"exact"` or `"substring"`.
    pub const LINK_ALLOW_MATCH: &str = "link_allow_match";
}

/// Default mute duration in seconds (10 minutes).
pub const DEFAULT_MUTE_SECS: u64 = 600;

/// Default violation log path, overridable via `VIOLATION_LOG`.
pub const DEFAULT_LOG_PATH: &str = "violations.log";

/// Default Redis URL, overridable via `REDIS_URL`.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1/";

/// Startup configuration read from the environment.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// The always-privileged owner; cannot be removed from the admin set.
    pub owner_id: UserId,
    pub redis_url: String,
    pub log_path: PathBuf,
}

impl BotConfig {
    /// Read `OWNER_ID` (required), `REDIS_URL` and `VIOLATION_LOG` from the
    /// environment.
    pub fn from_env() -> Result<Self> {
        let owner_id = env::var("OWNER_ID")
            .context("OWNER_ID must be set in .env file")?
            .parse::<u64>()
            .context("OWNER_ID must be a numeric Telegram user id")?;
        let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string());
        let log_path = env::var("VIOLATION_LOG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_PATH));
        Ok(BotConfig {
            owner_id: UserId(owner_id),
            redis_url,
            log_path,
        })
    }
}
