//! Per-message moderation orchestration: exemption gates, evaluation,
//! enforcement, audit logging and the public notice.

use chrono::Utc;
use teloxide::types::{ChatId, Message, MessageId, ThreadId, UserId};
use teloxide::utils::html;

use crate::enforcement::{action_for, Action, ActionOutcome, PunishmentExecutor};
use crate::platform::ModerationApi;
use crate::rules::{self, EnforceScope, RuleSet, Settings, Verdict};
use crate::store::ConfigStore;
use crate::violation_log::{ViolationLog, ViolationRecord};

/// Immutable view of one inbound message, extracted from the platform type.
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub chat_id: ChatId,
    pub chat_title: Option<String>,
    pub message_id: MessageId,
    pub topic_id: Option<ThreadId>,
    pub user_id: UserId,
    pub user_name: Option<String>,
    pub text: String,
    pub is_private: bool,
}

impl ChatEvent {
    /// `None` when the message has no sender or no text/caption to evaluate.
    pub fn from_message(msg: &Message) -> Option<Self> {
        let from = msg.from.as_ref()?;
        let text = msg.text().or_else(|| msg.caption())?;
        Some(ChatEvent {
            chat_id: msg.chat.id,
            chat_title: msg.chat.title().map(str::to_owned),
            message_id: msg.id,
            topic_id: msg.thread_id,
            user_id: from.id,
            user_name: from.username.clone(),
            text: text.to_owned(),
            is_private: msg.chat.is_private(),
        })
    }
}

/// How the pipeline disposed of one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Not subject to moderation; no evaluation performed.
    Exempt,
    /// Evaluated clean, or the store was unavailable (never escalate on a
    /// read error).
    Allowed,
    /// A punitive action was attempted.
    Enforced(ActionOutcome),
}

/// Structured notice data; rendering to platform markup is kept separate.
#[derive(Debug)]
pub struct Notice<'a> {
    pub user_name: Option<&'a str>,
    pub user_id: UserId,
    pub action: Action,
    pub reason: &'static str,
}

/// Render a notice as Telegram HTML.
pub fn render_notice_html(notice: &Notice<'_>) -> String {
    let name = html::bold(notice.user_name.unwrap_or("without a nickname"));
    let taken = match notice.action {
        Action::Mute(duration) => format!("was muted for {} min", duration.as_secs() / 60),
        Action::Ban => "was banned".to_string(),
    };
    format!(
        "User {} (id={}) posted a {} and {}.\nPlease follow the chat rules.",
        name, notice.user_id, notice.reason, taken
    )
}

fn reason_text(verdict: &Verdict) -> &'static str {
    match verdict {
        Verdict::ForbiddenWord(_) => "forbidden word",
        Verdict::ForbiddenLink => "forbidden link",
        Verdict::Allow => "",
    }
}

/// Orchestrates moderation for one message at a time. No shared mutable
/// state beyond the store and the log sink, so handlers can run it
/// concurrently.
pub struct ModerationPipeline<'a, S: ConfigStore, A: ModerationApi> {
    store: &'a S,
    api: &'a A,
    log: &'a ViolationLog,
}

impl<'a, S: ConfigStore, A: ModerationApi> ModerationPipeline<'a, S, A> {
    pub fn new(store: &'a S, api: &'a A, log: &'a ViolationLog) -> Self {
        ModerationPipeline { store, api, log }
    }

    /// Run the full pipeline for one message. Infallible by design: every
    /// external failure is logged and contained so one step can never
    /// prevent the remaining steps, or another message, from proceeding.
    pub async fn moderate(&self, event: &ChatEvent) -> PipelineOutcome {
        if event.is_private {
            return PipelineOutcome::Exempt;
        }

        let settings = match Settings::load(self.store) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("settings unavailable, skipping moderation: {e:#}");
                return PipelineOutcome::Allowed;
            }
        };

        if settings.enforce_scope == EnforceScope::TopicsOnly && event.topic_id.is_none() {
            return PipelineOutcome::Exempt;
        }

        let rule_set = match RuleSet::load(self.store) {
            Ok(rule_set) => rule_set,
            Err(e) => {
                log::error!("rule set unavailable, skipping moderation: {e:#}");
                return PipelineOutcome::Allowed;
            }
        };

        let verdict = rules::evaluate(&event.text, &rule_set, &settings);
        let Some(action) = action_for(&verdict, &settings) else {
            return PipelineOutcome::Allowed;
        };

        let outcome = PunishmentExecutor::new(self.api).execute(action, event).await;

        // The attempt is the audit trail, so the record is written even when
        // the platform refused the punishment.
        let record = ViolationRecord {
            timestamp: Utc::now(),
            user_id: event.user_id,
            user_name: event.user_name.clone(),
            chat_id: event.chat_id,
            chat_title: event.chat_title.clone(),
            topic_id: event.topic_id,
            action: outcome.describe(),
            reason: reason_text(&verdict).to_string(),
        };
        if let Err(e) = self.log.append(&record) {
            log::error!("failed to append violation record: {e:#}");
        }

        if !outcome.forbidden {
            let notice = Notice {
                user_name: event.user_name.as_deref(),
                user_id: event.user_id,
                action: outcome.action,
                reason: reason_text(&verdict),
            };
            if let Err(e) = self
                .api
                .send_notice(event.chat_id, event.topic_id, render_notice_html(&notice))
                .await
            {
                log::warn!("failed to send violation notice in chat {}: {}", event.chat_id, e);
            }
        }

        PipelineOutcome::Enforced(outcome)
    }
}
