use std::sync::Arc;

use teloxide::dispatching::{Dispatcher, UpdateFilterExt};
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::Me;
use teloxide::utils::command::BotCommands;
use teloxide::RequestError;

use crate::admin_handlers::{handle_admin_command, AdminCommand};
use crate::handlers::handle_message;
use crate::AppContext;

/// Route one update: admin commands live in private chats, everything in a
/// group goes through moderation.
pub async fn message_handler(
    bot: Bot,
    msg: Message,
    me: Me,
    ctx: Arc<AppContext>,
) -> Result<(), RequestError> {
    if msg.chat.is_private() {
        if let Some(text) = msg.text() {
            if let Ok(cmd) = AdminCommand::parse(text, me.username()) {
                return handle_admin_command(bot, msg, cmd, ctx).await;
            }
        }
        return Ok(());
    }
    handle_message(bot, msg, ctx).await;
    Ok(())
}

/// Build and run the dispatcher. Each update is handled as an independent
/// task; cross-message ordering is not preserved.
pub async fn run_dispatcher(bot: Bot, ctx: Arc<AppContext>) {
    // Commands arrive in mention form (`/words@BotName`) too, so the real
    // username is needed for parsing.
    let me = match bot.get_me().await {
        Ok(me) => me,
        Err(e) => {
            log::error!("failed to fetch the bot identity, cannot start: {e}");
            return;
        }
    };

    let handler = dptree::entry().branch(Update::filter_message().endpoint(message_handler));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![ctx, me])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
