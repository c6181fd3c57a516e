//! Append-only violation log, one line per enforcement attempt.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use teloxide::types::{ChatId, ThreadId, UserId};

/// One enforcement record. Never written unless a punitive action was
/// attempted for the message.
#[derive(Debug, Clone)]
pub struct ViolationRecord {
    pub timestamp: DateTime<Utc>,
    pub user_id: UserId,
    pub user_name: Option<String>,
    pub chat_id: ChatId,
    pub chat_title: Option<String>,
    pub topic_id: Option<ThreadId>,
    pub action: String,
    pub reason: String,
}

impl ViolationRecord {
    pub fn to_line(&self) -> String {
        let topic = self
            .topic_id
            .map(|t| t.0 .0.to_string())
            .unwrap_or_else(|| "none".to_string());
        format!(
            "[{}] USER:{}(id={}) CHAT:{}(id={}) TOPIC:{} ACTION:{} REASON:{}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.user_name.as_deref().unwrap_or("-"),
            self.user_id,
            self.chat_title.as_deref().unwrap_or("-"),
            self.chat_id,
            topic,
            self.action,
            self.reason
        )
    }
}

/// File-backed append-only log. Appends are serialized under a mutex so
/// concurrent handlers never interleave partial lines.
pub struct ViolationLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ViolationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ViolationLog {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &ViolationRecord) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open violation log {}", self.path.display()))?;
        writeln!(file, "{}", record.to_line())
            .with_context(|| format!("failed to append to violation log {}", self.path.display()))?;
        Ok(())
    }

    /// All raw log lines; an absent file reads as empty.
    pub fn read_all(&self) -> Result<Vec<String>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read violation log {}", self.path.display()))
            }
        };
        let lines: io::Result<Vec<String>> = BufReader::new(file).lines().collect();
        lines.with_context(|| format!("failed to read violation log {}", self.path.display()))
    }

    /// Truncate the log to empty.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        File::create(&self.path)
            .with_context(|| format!("failed to clear violation log {}", self.path.display()))?;
        Ok(())
    }
}
