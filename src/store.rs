//! The configuration store: forbidden words, allowed links, admins and
//! tunable settings, each operation independently atomic per key.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{Context, Result};
use redis::Commands;
use teloxide::types::UserId;

use crate::config::key;

/// Read/write access to the moderation rule set and settings.
///
/// Uniqueness of words, links and admins is enforced at the store level.
/// The pipeline only reads; mutation happens through the admin surface.
pub trait ConfigStore: Send + Sync {
    fn forbidden_words(&self) -> Result<Vec<String>>;
    /// Returns `true` if the word was not present before.
    fn add_forbidden_word(&self, word: &str) -> Result<bool>;
    fn remove_forbidden_word(&self, word: &str) -> Result<bool>;

    fn allowed_links(&self) -> Result<HashSet<String>>;
    fn add_allowed_link(&self, link: &str) -> Result<bool>;
    fn remove_allowed_link(&self, link: &str) -> Result<bool>;

    /// `Ok(None)` when the key has never been set; callers apply defaults.
    fn setting(&self, key: &str) -> Result<Option<String>>;
    fn set_setting(&self, key: &str, value: &str) -> Result<()>;

    fn admins(&self) -> Result<Vec<UserId>>;
    fn is_admin(&self, user: UserId) -> Result<bool>;
    fn add_admin(&self, user: UserId) -> Result<bool>;
    fn remove_admin(&self, user: UserId) -> Result<bool>;
}

/// Redis-backed [`ConfigStore`]: words, links and admins as sets, settings
/// as a hash.
pub struct RedisConfigStore {
    client: redis::Client,
}

impl RedisConfigStore {
    pub fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).context("failed to open Redis client")?;
        Ok(RedisConfigStore { client })
    }

    fn conn(&self) -> Result<redis::Connection> {
        self.client
            .get_connection()
            .context("failed to get Redis connection")
    }
}

impl ConfigStore for RedisConfigStore {
    fn forbidden_words(&self) -> Result<Vec<String>> {
        let mut conn = self.conn()?;
        let mut words: Vec<String> = conn.smembers(key::FORBIDDEN_WORDS)?;
        // smembers order is unspecified; keep evaluation reporting stable.
        words.sort();
        Ok(words)
    }

    fn add_forbidden_word(&self, word: &str) -> Result<bool> {
        let mut conn = self.conn()?;
        let added: i64 = conn.sadd(key::FORBIDDEN_WORDS, word)?;
        Ok(added > 0)
    }

    fn remove_forbidden_word(&self, word: &str) -> Result<bool> {
        let mut conn = self.conn()?;
        let removed: i64 = conn.srem(key::FORBIDDEN_WORDS, word)?;
        Ok(removed > 0)
    }

    fn allowed_links(&self) -> Result<HashSet<String>> {
        let mut conn = self.conn()?;
        Ok(conn.smembers(key::ALLOWED_LINKS)?)
    }

    fn add_allowed_link(&self, link: &str) -> Result<bool> {
        let mut conn = self.conn()?;
        let added: i64 = conn.sadd(key::ALLOWED_LINKS, link)?;
        Ok(added > 0)
    }

    fn remove_allowed_link(&self, link: &str) -> Result<bool> {
        let mut conn = self.conn()?;
        let removed: i64 = conn.srem(key::ALLOWED_LINKS, link)?;
        Ok(removed > 0)
    }

    fn setting(&self, key_name: &str) -> Result<Option<String>> {
        let mut conn = self.conn()?;
        Ok(conn.hget(key::SETTINGS, key_name)?)
    }

    fn set_setting(&self, key_name: &str, value: &str) -> Result<()> {
        let mut conn = self.conn()?;
        let _: () = conn.hset(key::SETTINGS, key_name, value)?;
        Ok(())
    }

    fn admins(&self) -> Result<Vec<UserId>> {
        let mut conn = self.conn()?;
        let ids: Vec<u64> = conn.smembers(key::ADMINS)?;
        Ok(ids.into_iter().map(UserId).collect())
    }

    fn is_admin(&self, user: UserId) -> Result<bool> {
        let mut conn = self.conn()?;
        Ok(conn.sismember(key::ADMINS, user.0)?)
    }

    fn add_admin(&self, user: UserId) -> Result<bool> {
        let mut conn = self.conn()?;
        let added: i64 = conn.sadd(key::ADMINS, user.0)?;
        Ok(added > 0)
    }

    fn remove_admin(&self, user: UserId) -> Result<bool> {
        let mut conn = self.conn()?;
        let removed: i64 = conn.srem(key::ADMINS, user.0)?;
        Ok(removed > 0)
    }
}

#[derive(Default)]
struct MemoryInner {
    words: Vec<String>,
    links: HashSet<String>,
    admins: HashSet<u64>,
    settings: HashMap<String, String>,
}

/// In-process [`ConfigStore`] used by the test suite. Words keep insertion
/// order, which makes the reported match deterministic.
#[derive(Default)]
pub struct MemoryConfigStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ConfigStore for MemoryConfigStore {
    fn forbidden_words(&self) -> Result<Vec<String>> {
        Ok(self.lock().words.clone())
    }

    fn add_forbidden_word(&self, word: &str) -> Result<bool> {
        let mut inner = self.lock();
        if inner.words.iter().any(|w| w == word) {
            return Ok(false);
        }
        inner.words.push(word.to_string());
        Ok(true)
    }

    fn remove_forbidden_word(&self, word: &str) -> Result<bool> {
        let mut inner = self.lock();
        let before = inner.words.len();
        inner.words.retain(|w| w != word);
        Ok(inner.words.len() < before)
    }

    fn allowed_links(&self) -> Result<HashSet<String>> {
        Ok(self.lock().links.clone())
    }

    fn add_allowed_link(&self, link: &str) -> Result<bool> {
        Ok(self.lock().links.insert(link.to_string()))
    }

    fn remove_allowed_link(&self, link: &str) -> Result<bool> {
        Ok(self.lock().links.remove(link))
    }

    fn setting(&self, key_name: &str) -> Result<Option<String>> {
        Ok(self.lock().settings.get(key_name).cloned())
    }

    fn set_setting(&self, key_name: &str, value: &str) -> Result<()> {
        self.lock()
            .settings
            .insert(key_name.to_string(), value.to_string());
        Ok(())
    }

    fn admins(&self) -> Result<Vec<UserId>> {
        let mut ids: Vec<u64> = self.lock().admins.iter().copied().collect();
        ids.sort_unstable();
        Ok(ids.into_iter().map(UserId).collect())
    }

    fn is_admin(&self, user: UserId) -> Result<bool> {
        Ok(self.lock().admins.contains(&user.0))
    }

    fn add_admin(&self, user: UserId) -> Result<bool> {
        Ok(self.lock().admins.insert(user.0))
    }

    fn remove_admin(&self, user: UserId) -> Result<bool> {
        Ok(self.lock().admins.remove(&user.0))
    }
}
