use std::sync::Arc;

use teloxide::prelude::*;

use crate::pipeline::{ChatEvent, ModerationPipeline, PipelineOutcome};
use crate::platform::TelegramApi;
use crate::AppContext;

/// Moderate one inbound group message. Never propagates an error upward;
/// a failure here must not affect any other message.
pub async fn handle_message(bot: Bot, message: Message, ctx: Arc<AppContext>) {
    let Some(event) = ChatEvent::from_message(&message) else {
        return;
    };
    let api = TelegramApi::new(bot);
    let pipeline = ModerationPipeline::new(&ctx.store, &api, &ctx.log);
    match pipeline.moderate(&event).await {
        PipelineOutcome::Enforced(outcome) => {
            log::info!(
                "enforced {} against user {} in chat {}",
                outcome.describe(),
                event.user_id,
                event.chat_id
            );
        }
        PipelineOutcome::Exempt | PipelineOutcome::Allowed => {}
    }
}
