//! Rule evaluation: classify a message against the current rule set and
//! settings. Evaluation is a pure function over its inputs.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;

use crate::config::{setting, DEFAULT_MUTE_SECS};
use crate::store::ConfigStore;

/// Punishment applied for link violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPunishment {
    Mute,
    Ban,
}

impl LinkPunishment {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkPunishment::Mute => "mute",
            LinkPunishment::Ban => "ban",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "mute" => Some(LinkPunishment::Mute),
            "ban" => Some(LinkPunishment::Ban),
            _ => None,
        }
    }
}

/// Whether moderation applies only inside forum topics or to the whole chat.
///
/// The legacy bot only watched messages inside topics; both behaviors exist
/// in the wild, so this is a setting rather than a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnforceScope {
    TopicsOnly,
    ChatWide,
}

impl EnforceScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnforceScope::TopicsOnly => "topics",
            EnforceScope::ChatWide => "chat",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "topics" => Some(EnforceScope::TopicsOnly),
            "chat" => Some(EnforceScope::ChatWide),
            _ => None,
        }
    }
}

/// How the link allow-list exempts a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAllowMatch {
    /// The trimmed message text must equal an entry character-for-character.
    Exact,
    /// The message text must contain an entry.
    Substring,
}

impl LinkAllowMatch {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkAllowMatch::Exact => "exact",
            LinkAllowMatch::Substring => "substring",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "exact" => Some(LinkAllowMatch::Exact),
            "substring" => Some(LinkAllowMatch::Substring),
            _ => None,
        }
    }
}

/// Tunable moderation settings. Every field resolves to a defined value:
/// absent or unparsable store entries fall back to the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub mute_duration: Duration,
    pub link_punishment: LinkPunishment,
    pub anti_links: bool,
    pub enforce_scope: EnforceScope,
    pub link_allow_match: LinkAllowMatch,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            mute_duration: Duration::from_secs(DEFAULT_MUTE_SECS),
            link_punishment: LinkPunishment::Ban,
            anti_links: true,
            enforce_scope: EnforceScope::TopicsOnly,
            link_allow_match: LinkAllowMatch::Exact,
        }
    }
}

impl Settings {
    /// Load settings from the store, defaulting each key independently.
    pub fn load(store: &dyn ConfigStore) -> Result<Self> {
        let defaults = Settings::default();
        let mute_duration = store
            .setting(setting::MUTE_TIME)?
            .and_then(|v| v.parse::<u64>().ok())
            // A mute duration must be positive; zero is treated as unset.
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.mute_duration);
        let link_punishment = store
            .setting(setting::LINK_PUNISH)?
            .and_then(|v| LinkPunishment::from_str(&v))
            .unwrap_or(defaults.link_punishment);
        let anti_links = store
            .setting(setting::ANTI_LINKS)?
            .map(|v| v != "off")
            .unwrap_or(defaults.anti_links);
        let enforce_scope = store
            .setting(setting::ENFORCE_SCOPE)?
            .and_then(|v| EnforceScope::from_str(&v))
            .unwrap_or(defaults.enforce_scope);
        let link_allow_match = store
            .setting(setting::LINK_ALLOW_MATCH)?
            .and_then(|v| LinkAllowMatch::from_str(&v))
            .unwrap_or(defaults.link_allow_match);
        Ok(Settings {
            mute_duration,
            link_punishment,
            anti_links,
            enforce_scope,
            link_allow_match,
        })
    }
}

/// The outcome of evaluating one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    /// The message contains this forbidden word as a whole token.
    ForbiddenWord(String),
    /// The message contains a link not exempted by the allow-list.
    ForbiddenLink,
}

/// The rule set a message is evaluated against, loaded fresh per evaluation.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub forbidden_words: Vec<String>,
    pub allowed_links: HashSet<String>,
}

impl RuleSet {
    pub fn load(store: &dyn ConfigStore) -> Result<Self> {
        Ok(RuleSet {
            forbidden_words: store.forbidden_words()?,
            allowed_links: store.allowed_links()?,
        })
    }
}

/// Classify `text` against the rule set.
///
/// Words are checked first and win over links: the first rule-set word that
/// equals a whole whitespace-delimited token (case-insensitive) is reported.
/// Substrings of tokens never match. The link check only runs when no word
/// matched and anti-links are enabled: any literal `http://` or `https://`
/// violates unless the allow-list exempts the message under the configured
/// match policy. Empty or whitespace-only text never violates.
pub fn evaluate(text: &str, rules: &RuleSet, settings: &Settings) -> Verdict {
    let lowered = text.to_lowercase();
    let tokens: HashSet<&str> = lowered.split_whitespace().collect();
    for word in &rules.forbidden_words {
        if tokens.contains(word.to_lowercase().as_str()) {
            return Verdict::ForbiddenWord(word.clone());
        }
    }

    if settings.anti_links && contains_link(text) {
        let exempt = match settings.link_allow_match {
            LinkAllowMatch::Exact => rules.allowed_links.contains(text.trim()),
            LinkAllowMatch::Substring => {
                rules.allowed_links.iter().any(|link| text.contains(link.as_str()))
            }
        };
        if !exempt {
            return Verdict::ForbiddenLink;
        }
    }

    Verdict::Allow
}

fn contains_link(text: &str) -> bool {
    text.contains("http://") || text.contains("https://")
}
