use std::env;
use std::sync::Arc;

use dotenv::dotenv;
use teloxide::prelude::*;

use chat_warden::admin_handlers::run_dispatcher;
use chat_warden::config::BotConfig;
use chat_warden::AppContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    dotenv().ok();
    log::info!("Starting the chat moderation bot...");

    let bot_token = env::var("BOT_TOKEN").expect("BOT_TOKEN must be set in .env file");
    let config = BotConfig::from_env()?;
    let ctx = Arc::new(AppContext::new(config)?);

    let bot = Bot::new(bot_token);

    run_dispatcher(bot, ctx).await;
    Ok(())
}
