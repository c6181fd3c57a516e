//! End-to-end pipeline scenarios against an in-memory store and a recording
//! platform double, so the suite runs without Redis or a live bot.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chat_warden::config::setting;
use chat_warden::enforcement::Action;
use chat_warden::pipeline::{ChatEvent, ModerationPipeline, PipelineOutcome};
use chat_warden::platform::{ModerationApi, PlatformError};
use chat_warden::store::{ConfigStore, MemoryConfigStore};
use chat_warden::violation_log::ViolationLog;
use chrono::{DateTime, Utc};
use teloxide::types::{ChatId, MessageId, ThreadId, UserId};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Delete(MessageId),
    Restrict(UserId),
    Ban(UserId),
    Notice(String),
}

#[derive(Default)]
struct RecordingApi {
    calls: Mutex<Vec<Call>>,
    /// Punishment calls answer `Forbidden` (target is a chat admin).
    forbid_punishment: bool,
    /// Message deletion answers a transport failure.
    fail_delete: bool,
}

impl RecordingApi {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ModerationApi for RecordingApi {
    async fn delete_message(&self, _chat: ChatId, message: MessageId) -> Result<(), PlatformError> {
        self.push(Call::Delete(message));
        if self.fail_delete {
            Err(PlatformError::Transport("message can't be deleted".to_string()))
        } else {
            Ok(())
        }
    }

    async fn restrict_user(
        &self,
        _chat: ChatId,
        user: UserId,
        _until: DateTime<Utc>,
    ) -> Result<(), PlatformError> {
        self.push(Call::Restrict(user));
        if self.forbid_punishment {
            Err(PlatformError::Forbidden)
        } else {
            Ok(())
        }
    }

    async fn ban_user(&self, _chat: ChatId, user: UserId) -> Result<(), PlatformError> {
        self.push(Call::Ban(user));
        if self.forbid_punishment {
            Err(PlatformError::Forbidden)
        } else {
            Ok(())
        }
    }

    async fn send_notice(
        &self,
        _chat: ChatId,
        _topic: Option<ThreadId>,
        html: String,
    ) -> Result<(), PlatformError> {
        self.push(Call::Notice(html));
        Ok(())
    }
}

struct Fixture {
    store: MemoryConfigStore,
    api: RecordingApi,
    log: ViolationLog,
    _dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        Fixture {
            store: MemoryConfigStore::new(),
            api: RecordingApi::default(),
            log: ViolationLog::new(dir.path().join("violations.log")),
            _dir: dir,
        }
    }

    async fn moderate(&self, event: &ChatEvent) -> PipelineOutcome {
        ModerationPipeline::new(&self.store, &self.api, &self.log)
            .moderate(event)
            .await
    }

    fn notices(&self) -> Vec<String> {
        self.api
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Notice(html) => Some(html),
                _ => None,
            })
            .collect()
    }
}

fn topic_event(text: &str) -> ChatEvent {
    ChatEvent {
        chat_id: ChatId(-100200),
        chat_title: Some("testing".to_string()),
        message_id: MessageId(5),
        topic_id: Some(ThreadId(MessageId(42))),
        user_id: UserId(7),
        user_name: Some("alice".to_string()),
        text: text.to_string(),
        is_private: false,
    }
}

#[tokio::test]
async fn forbidden_word_mutes_and_logs() {
    // Scenario A
    let fx = Fixture::new();
    fx.store.add_forbidden_word("spam").unwrap();

    let outcome = fx.moderate(&topic_event("don't spam here")).await;
    let PipelineOutcome::Enforced(outcome) = outcome else {
        panic!("expected enforcement, got {outcome:?}");
    };
    assert_eq!(outcome.action, Action::Mute(Duration::from_secs(600)));
    assert!(outcome.applied);
    assert!(!outcome.forbidden);

    let calls = fx.api.calls();
    assert_eq!(calls[0], Call::Delete(MessageId(5)));
    assert_eq!(calls[1], Call::Restrict(UserId(7)));
    assert!(matches!(calls[2], Call::Notice(_)));

    let lines = fx.log.read_all().unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("ACTION:MUTE 10 min"), "{}", lines[0]);
    assert!(lines[0].contains("REASON:forbidden word"), "{}", lines[0]);
}

#[tokio::test]
async fn allowlisted_link_passes_without_any_action() {
    // Scenario B
    let fx = Fixture::new();
    fx.store.add_allowed_link("https://example.com/rules").unwrap();

    let outcome = fx.moderate(&topic_event("https://example.com/rules")).await;
    assert_eq!(outcome, PipelineOutcome::Allowed);
    assert!(fx.api.calls().is_empty());
    assert!(fx.log.read_all().unwrap().is_empty());
}

#[tokio::test]
async fn link_violation_bans_by_default() {
    // Scenario C
    let fx = Fixture::new();

    let outcome = fx.moderate(&topic_event("check this https://evil.example")).await;
    let PipelineOutcome::Enforced(outcome) = outcome else {
        panic!("expected enforcement, got {outcome:?}");
    };
    assert_eq!(outcome.action, Action::Ban);
    assert!(outcome.applied);

    assert!(fx.api.calls().contains(&Call::Ban(UserId(7))));
    let lines = fx.log.read_all().unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("ACTION:BAN"), "{}", lines[0]);
    assert!(lines[0].contains("REASON:forbidden link"), "{}", lines[0]);
}

#[tokio::test]
async fn private_chats_are_exempt() {
    // Scenario D
    let fx = Fixture::new();
    fx.store.add_forbidden_word("spam").unwrap();

    let mut event = topic_event("spam everywhere");
    event.is_private = true;
    event.topic_id = None;

    let outcome = fx.moderate(&event).await;
    assert_eq!(outcome, PipelineOutcome::Exempt);
    assert!(fx.api.calls().is_empty());
    assert!(fx.log.read_all().unwrap().is_empty());
}

#[tokio::test]
async fn refused_punishment_is_swallowed_and_marked() {
    // Scenario E: the target is a chat admin the bot cannot restrict.
    let fx = Fixture {
        api: RecordingApi {
            forbid_punishment: true,
            ..RecordingApi::default()
        },
        ..Fixture::new()
    };
    fx.store.add_forbidden_word("spam").unwrap();

    let outcome = fx.moderate(&topic_event("spam again")).await;
    let PipelineOutcome::Enforced(outcome) = outcome else {
        panic!("expected enforcement attempt, got {outcome:?}");
    };
    assert!(!outcome.applied);
    assert!(outcome.forbidden);

    // No public notice for a refused attempt.
    assert!(fx.notices().is_empty());

    // The attempt is still on the audit trail, marked as refused.
    let lines = fx.log.read_all().unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("ACTION:MUTE 10 min (forbidden)"), "{}", lines[0]);
}

#[tokio::test]
async fn failed_deletion_does_not_block_the_punishment() {
    let fx = Fixture {
        api: RecordingApi {
            fail_delete: true,
            ..RecordingApi::default()
        },
        ..Fixture::new()
    };
    fx.store.add_forbidden_word("spam").unwrap();

    let outcome = fx.moderate(&topic_event("spam spam")).await;
    let PipelineOutcome::Enforced(outcome) = outcome else {
        panic!("expected enforcement, got {outcome:?}");
    };
    assert!(outcome.applied);
    assert!(fx.api.calls().contains(&Call::Restrict(UserId(7))));
}

#[tokio::test]
async fn messages_outside_topics_are_exempt_by_default() {
    let fx = Fixture::new();
    fx.store.add_forbidden_word("spam").unwrap();

    let mut event = topic_event("spam outside any topic");
    event.topic_id = None;

    assert_eq!(fx.moderate(&event).await, PipelineOutcome::Exempt);
    assert!(fx.api.calls().is_empty());
}

#[tokio::test]
async fn chat_wide_scope_moderates_topicless_messages() {
    let fx = Fixture::new();
    fx.store.add_forbidden_word("spam").unwrap();
    fx.store.set_setting(setting::ENFORCE_SCOPE, "chat").unwrap();

    let mut event = topic_event("spam outside any topic");
    event.topic_id = None;

    let outcome = fx.moderate(&event).await;
    assert!(matches!(outcome, PipelineOutcome::Enforced(_)));
}

#[tokio::test]
async fn configured_mute_duration_reaches_action_and_notice() {
    let fx = Fixture::new();
    fx.store.add_forbidden_word("spam").unwrap();
    fx.store.set_setting(setting::MUTE_TIME, "300").unwrap();

    let outcome = fx.moderate(&topic_event("spam here")).await;
    let PipelineOutcome::Enforced(outcome) = outcome else {
        panic!("expected enforcement, got {outcome:?}");
    };
    assert_eq!(outcome.action, Action::Mute(Duration::from_secs(300)));

    let notices = fx.notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].contains("5 min"), "{}", notices[0]);
    assert!(notices[0].contains("<b>alice</b>"), "{}", notices[0]);
}

#[tokio::test]
async fn link_punishment_mute_mode_mutes_instead_of_banning() {
    let fx = Fixture::new();
    fx.store.set_setting(setting::LINK_PUNISH, "mute").unwrap();

    let outcome = fx.moderate(&topic_event("https://evil.example")).await;
    let PipelineOutcome::Enforced(outcome) = outcome else {
        panic!("expected enforcement, got {outcome:?}");
    };
    assert_eq!(outcome.action, Action::Mute(Duration::from_secs(600)));
    assert!(fx.api.calls().contains(&Call::Restrict(UserId(7))));
}

#[tokio::test]
async fn anti_links_off_lets_links_through() {
    let fx = Fixture::new();
    fx.store.set_setting(setting::ANTI_LINKS, "off").unwrap();

    let outcome = fx.moderate(&topic_event("https://evil.example")).await;
    assert_eq!(outcome, PipelineOutcome::Allowed);
    assert!(fx.api.calls().is_empty());
}

#[tokio::test]
async fn missing_display_name_falls_back_in_the_notice() {
    let fx = Fixture::new();
    fx.store.add_forbidden_word("spam").unwrap();

    let mut event = topic_event("spam here");
    event.user_name = None;

    fx.moderate(&event).await;
    let notices = fx.notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].contains("without a nickname"), "{}", notices[0]);
}
