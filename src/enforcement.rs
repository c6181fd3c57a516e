//! Translating a verdict into a concrete moderation action against the
//! platform, with each side effect isolated from the others.

use std::fmt;
use std::time::Duration;

use chrono::Utc;

use crate::pipeline::ChatEvent;
use crate::platform::{ModerationApi, PlatformError};
use crate::rules::{LinkPunishment, Settings, Verdict};

/// The punitive action a verdict maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Mute(Duration),
    Ban,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Mute(duration) => write!(f, "MUTE {} min", duration.as_secs() / 60),
            Action::Ban => write!(f, "BAN"),
        }
    }
}

/// What happened when an action was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionOutcome {
    pub action: Action,
    /// The platform accepted the restriction/ban.
    pub applied: bool,
    /// The platform refused because the bot lacks rights over the target.
    pub forbidden: bool,
}

impl ActionOutcome {
    /// Action text for the violation log; a refused attempt is marked so the
    /// audit trail stays honest about what actually happened.
    pub fn describe(&self) -> String {
        if self.forbidden {
            format!("{} (forbidden)", self.action)
        } else {
            self.action.to_string()
        }
    }
}

/// Map a verdict to the action it implies. Word violations always mute,
/// whatever the link-punishment setting says.
pub fn action_for(verdict: &Verdict, settings: &Settings) -> Option<Action> {
    match verdict {
        Verdict::Allow => None,
        Verdict::ForbiddenWord(_) => Some(Action::Mute(settings.mute_duration)),
        Verdict::ForbiddenLink => match settings.link_punishment {
            LinkPunishment::Mute => Some(Action::Mute(settings.mute_duration)),
            LinkPunishment::Ban => Some(Action::Ban),
        },
    }
}

/// Applies actions through a [`ModerationApi`].
pub struct PunishmentExecutor<'a, A: ModerationApi> {
    api: &'a A,
}

impl<'a, A: ModerationApi> PunishmentExecutor<'a, A> {
    pub fn new(api: &'a A) -> Self {
        PunishmentExecutor { api }
    }

    /// Delete the offending message, then restrict or ban its author.
    ///
    /// A failed deletion never blocks the punishment. A `Forbidden` refusal
    /// of the punishment is swallowed into the outcome; other failures are
    /// logged and leave the action unapplied.
    pub async fn execute(&self, action: Action, event: &ChatEvent) -> ActionOutcome {
        if let Err(e) = self.api.delete_message(event.chat_id, event.message_id).await {
            log::warn!(
                "could not delete message {} in chat {}: {}",
                event.message_id.0,
                event.chat_id,
                e
            );
        }

        let result = match action {
            Action::Mute(duration) => {
                let until = Utc::now() + chrono::Duration::seconds(duration.as_secs() as i64);
                self.api.restrict_user(event.chat_id, event.user_id, until).await
            }
            Action::Ban => self.api.ban_user(event.chat_id, event.user_id).await,
        };

        match result {
            Ok(()) => ActionOutcome {
                action,
                applied: true,
                forbidden: false,
            },
            Err(PlatformError::Forbidden) => {
                log::info!(
                    "no rights to punish user {} in chat {}, skipping",
                    event.user_id,
                    event.chat_id
                );
                ActionOutcome {
                    action,
                    applied: false,
                    forbidden: true,
                }
            }
            Err(e) => {
                log::warn!(
                    "failed to apply {} to user {} in chat {}: {}",
                    action,
                    event.user_id,
                    event.chat_id,
                    e
                );
                ActionOutcome {
                    action,
                    applied: false,
                    forbidden: false,
                }
            }
        }
    }
}
