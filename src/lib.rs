pub mod admin_handlers;
pub mod config;
pub mod enforcement;
pub mod handlers;
pub mod pipeline;
pub mod platform;
pub mod rules;
pub mod store;
pub mod violation_log;

use anyhow::Result;
use teloxide::types::UserId;

use crate::config::BotConfig;
use crate::store::{ConfigStore, RedisConfigStore};
use crate::violation_log::ViolationLog;

/// Shared state handed to every handler: the config store, the violation
/// log sink and the startup configuration. Generic over the store so the
/// admin surface can be exercised against [`store::MemoryConfigStore`].
pub struct AppContext<S: ConfigStore = RedisConfigStore> {
    pub store: S,
    pub log: ViolationLog,
    pub config: BotConfig,
}

impl AppContext<RedisConfigStore> {
    pub fn new(config: BotConfig) -> Result<Self> {
        let store = RedisConfigStore::new(&config.redis_url)?;
        let log = ViolationLog::new(config.log_path.clone());
        Ok(AppContext { store, log, config })
    }
}

impl<S: ConfigStore> AppContext<S> {
    pub fn with_store(store: S, log: ViolationLog, config: BotConfig) -> Self {
        AppContext { store, log, config }
    }

    /// The owner is always privileged; everyone else must be in the stored
    /// admin set. A store failure denies, never grants.
    pub fn is_admin(&self, user: UserId) -> bool {
        if user == self.config.owner_id {
            return true;
        }
        match self.store.is_admin(user) {
            Ok(is_admin) => is_admin,
            Err(e) => {
                log::warn!("admin lookup failed for user {user}: {e:#}");
                false
            }
        }
    }
}
