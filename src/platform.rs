//! The messaging-platform client seam: the moderation core talks to Telegram
//! through [`ModerationApi`] so enforcement can be exercised without a live
//! bot connection.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use teloxide::payloads::{RestrictChatMemberSetters, SendMessageSetters};
use teloxide::prelude::*;
use teloxide::types::{ChatPermissions, MessageId, ParseMode, ThreadId};
use teloxide::{ApiError, RequestError};
use thiserror::Error;

/// Errors the pipeline must tell apart. Only `Forbidden` is swallowed
/// (the bot lacks rights over the target, e.g. a chat administrator);
/// everything else is an operational failure to log and move past.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("bot lacks rights over the target")]
    Forbidden,
    #[error("platform request failed: {0}")]
    Transport(String),
}

/// The platform calls the moderation core needs.
#[async_trait]
pub trait ModerationApi: Send + Sync {
    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<(), PlatformError>;
    /// Restrict a user from sending messages until the given expiry.
    async fn restrict_user(
        &self,
        chat: ChatId,
        user: UserId,
        until: DateTime<Utc>,
    ) -> Result<(), PlatformError>;
    async fn ban_user(&self, chat: ChatId, user: UserId) -> Result<(), PlatformError>;
    /// Send an HTML-formatted notice into the chat, scoped to a topic when set.
    async fn send_notice(
        &self,
        chat: ChatId,
        topic: Option<ThreadId>,
        html: String,
    ) -> Result<(), PlatformError>;
}

/// [`ModerationApi`] over a live teloxide [`Bot`].
pub struct TelegramApi {
    bot: Bot,
}

impl TelegramApi {
    pub fn new(bot: Bot) -> Self {
        TelegramApi { bot }
    }
}

fn classify(err: RequestError) -> PlatformError {
    match &err {
        RequestError::Api(api) if matches!(
            api,
            ApiError::NotEnoughRightsToRestrict | ApiError::CantRestrictSelf
        ) =>
        {
            PlatformError::Forbidden
        }
        _ => PlatformError::Transport(err.to_string()),
    }
}

#[async_trait]
impl ModerationApi for TelegramApi {
    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<(), PlatformError> {
        self.bot
            .delete_message(chat, message)
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn restrict_user(
        &self,
        chat: ChatId,
        user: UserId,
        until: DateTime<Utc>,
    ) -> Result<(), PlatformError> {
        self.bot
            .restrict_chat_member(chat, user, ChatPermissions::empty())
            .until_date(until)
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn ban_user(&self, chat: ChatId, user: UserId) -> Result<(), PlatformError> {
        self.bot
            .ban_chat_member(chat, user)
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn send_notice(
        &self,
        chat: ChatId,
        topic: Option<ThreadId>,
        html: String,
    ) -> Result<(), PlatformError> {
        let request = self.bot.send_message(chat, html).parse_mode(ParseMode::Html);
        let request = match topic {
            Some(topic) => request.message_thread_id(topic),
            None => request,
        };
        request.await.map(|_| ()).map_err(classify)
    }
}
