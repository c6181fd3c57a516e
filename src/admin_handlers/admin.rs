use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::InputFile;
use teloxide::utils::command::BotCommands;

use crate::admin_handlers::AdminCommand;
use crate::config::setting;
use crate::rules::{EnforceScope, LinkAllowMatch, LinkPunishment};
use crate::store::ConfigStore;
use crate::AppContext;

/// Handle one admin command from a private chat. Authorization is the owner
/// id plus the stored admin set.
pub async fn handle_admin_command(
    bot: Bot,
    msg: Message,
    cmd: AdminCommand,
    ctx: Arc<AppContext>,
) -> ResponseResult<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;

    if !ctx.is_admin(user.id) {
        bot.send_message(chat_id, "You are not an admin of this bot.").await?;
        return Ok(());
    }

    // The log download sends a document, everything else replies with text.
    if let AdminCommand::GetLog = cmd {
        match ctx.log.read_all() {
            Ok(lines) if lines.is_empty() => {
                bot.send_message(chat_id, "The violation log is empty.").await?;
            }
            Ok(_) => {
                bot.send_document(chat_id, InputFile::file(ctx.log.path().to_path_buf()))
                    .await?;
            }
            Err(e) => {
                log::error!("failed to read violation log: {e:#}");
                bot.send_message(chat_id, "Could not read the violation log.").await?;
            }
        }
        return Ok(());
    }

    let reply = match apply_command(&ctx, &cmd) {
        Ok(reply) => reply,
        Err(e) => {
            log::error!("admin command failed: {e:#}");
            "Storage is unavailable, try again later.".to_string()
        }
    };
    bot.send_message(chat_id, reply).await?;
    Ok(())
}

/// Apply one admin command to the store and log, returning the reply text.
pub fn apply_command<S: ConfigStore>(ctx: &AppContext<S>, cmd: &AdminCommand) -> Result<String> {
    let store = &ctx.store;
    let reply = match cmd {
        AdminCommand::Help => AdminCommand::descriptions().to_string(),
        AdminCommand::AddWord { word } => {
            let word = word.trim().to_lowercase();
            if word.is_empty() {
                "Give me a word to forbid.".to_string()
            } else if store.add_forbidden_word(&word)? {
                format!("Added forbidden word '{word}'.")
            } else {
                format!("'{word}' is already forbidden.")
            }
        }
        AdminCommand::DelWord { word } => {
            let word = word.trim().to_lowercase();
            if store.remove_forbidden_word(&word)? {
                format!("Removed forbidden word '{word}'.")
            } else {
                format!("'{word}' was not forbidden.")
            }
        }
        AdminCommand::Words => {
            let words = store.forbidden_words()?;
            if words.is_empty() {
                "No forbidden words configured.".to_string()
            } else {
                format!("Forbidden words:\n{}", words.join("\n"))
            }
        }
        AdminCommand::AddLink { link } => {
            let link = link.trim();
            if link.is_empty() {
                "Give me a link to allow.".to_string()
            } else if store.add_allowed_link(link)? {
                format!("Allow-listed '{link}'.")
            } else {
                format!("'{link}' is already allow-listed.")
            }
        }
        AdminCommand::DelLink { link } => {
            let link = link.trim();
            if store.remove_allowed_link(link)? {
                format!("Removed '{link}' from the allow-list.")
            } else {
                format!("'{link}' is not on the allow-list.")
            }
        }
        AdminCommand::Links => {
            let mut links: Vec<String> = store.allowed_links()?.into_iter().collect();
            links.sort();
            if links.is_empty() {
                "The link allow-list is empty.".to_string()
            } else {
                format!("Allowed links:\n{}", links.join("\n"))
            }
        }
        AdminCommand::SetMute { minutes } => {
            if *minutes == 0 {
                "Mute time must be at least one minute.".to_string()
            } else {
                match minutes.checked_mul(60) {
                    Some(seconds) => {
                        store.set_setting(setting::MUTE_TIME, &seconds.to_string())?;
                        format!("Mute time set to {minutes} min.")
                    }
                    None => "Mute time is too large.".to_string(),
                }
            }
        }
        AdminCommand::LinkPunish { mode } => match LinkPunishment::from_str(mode.trim()) {
            Some(punishment) => {
                store.set_setting(setting::LINK_PUNISH, punishment.as_str())?;
                format!("Link violations now get {}.", punishment.as_str().to_uppercase())
            }
            None => "Usage: /link_punish <mute|ban>".to_string(),
        },
        AdminCommand::AntiLinks { state } => match state.trim() {
            "on" | "off" => {
                store.set_setting(setting::ANTI_LINKS, state.trim())?;
                format!("Anti-links: {}.", state.trim().to_uppercase())
            }
            _ => "Usage: /anti_links <on|off>".to_string(),
        },
        AdminCommand::Scope { scope } => match EnforceScope::from_str(scope.trim()) {
            Some(scope) => {
                store.set_setting(setting::ENFORCE_SCOPE, scope.as_str())?;
                match scope {
                    EnforceScope::TopicsOnly => "Enforcing inside forum topics only.".to_string(),
                    EnforceScope::ChatWide => "Enforcing across the whole chat.".to_string(),
                }
            }
            None => "Usage: /scope <topics|chat>".to_string(),
        },
        AdminCommand::LinkMatch { policy } => match LinkAllowMatch::from_str(policy.trim()) {
            Some(policy) => {
                store.set_setting(setting::LINK_ALLOW_MATCH, policy.as_str())?;
                format!("Allow-list matching is now {}.", policy.as_str())
            }
            None => "Usage: /link_match <exact|substring>".to_string(),
        },
        AdminCommand::ClearLog => {
            ctx.log.clear()?;
            "Violation log cleared.".to_string()
        }
        AdminCommand::AddAdmin { user_id } => {
            if store.add_admin(teloxide::types::UserId(*user_id))? {
                format!("User {user_id} is now an admin.")
            } else {
                format!("User {user_id} is already an admin.")
            }
        }
        AdminCommand::DelAdmin { user_id } => {
            if *user_id == ctx.config.owner_id.0 {
                "The owner cannot be removed.".to_string()
            } else if store.remove_admin(teloxide::types::UserId(*user_id))? {
                format!("User {user_id} is no longer an admin.")
            } else {
                format!("User {user_id} was not an admin.")
            }
        }
        AdminCommand::Admins => {
            let mut lines = vec![format!("{} (owner)", ctx.config.owner_id)];
            for admin in store.admins()? {
                lines.push(admin.to_string());
            }
            format!("Admins:\n{}", lines.join("\n"))
        }
        // Handled in handle_admin_command.
        AdminCommand::GetLog => String::new(),
    };
    Ok(reply)
}
