#![warn(missing_docs)]
//! A Telegram bot that turns video links into direct media links.
//!
//! Users send a link from Instagram or another supported video site and get
//! back a direct, hot-linkable URL resolved by `yt-dlp`. The owner can
//! broadcast a message to every chat the bot has seen, and a small HTTP
//! endpoint answers health checks.

/// The main handler for the bot's logic.
pub mod bot_handler;
/// The configuration for the application.
pub mod config;
/// The dispatcher for routing updates to the correct handlers.
pub mod dispatcher;
/// Resolving page URLs to direct media URLs.
pub mod extractor;
/// The HTTP health endpoint.
pub mod health;
/// Finding supported links in message text.
pub mod link;
/// The service for sending messages to the user.
pub mod messaging;
/// The store of chats that talked to the bot.
pub mod storage;

use std::{net::SocketAddr, sync::Arc};

use teloxide::prelude::*;

use crate::{
    bot_handler::BotHandler,
    config::Config,
    extractor::{DefaultLinkExtractor, YtDlpProbe},
    messaging::{MessagingService, TelegramMessagingService},
    storage::FileUserStore,
};

/// Runs the bot.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    // The health endpoint comes up before Telegram is contacted, so the
    // platform sees the process as alive even while Telegram is unreachable.
    let listener = health::bind(SocketAddr::from(([0, 0, 0, 0], config.port))).await?;
    tokio::spawn(async move {
        if let Err(e) = health::serve(listener).await {
            tracing::error!("Error in health endpoint: {e}");
        }
    });

    let bot = Bot::new(config.bot_token.clone());
    let messaging_service = Arc::new(TelegramMessagingService::new(
        bot.clone(),
        &config.updates_url,
        &config.support_url,
    )?);

    if let Err(e) = messaging_service.set_commands().await {
        tracing::warn!("Failed to set bot commands: {e}");
    }

    let user_store = Arc::new(FileUserStore::new(&config.users_file));
    let probe = Arc::new(YtDlpProbe::new(config.yt_dlp_bin.clone(), config.max_video_height));
    let link_extractor = Arc::new(DefaultLinkExtractor::new(
        probe,
        config.extract_max_attempts,
        config.extract_retry_delay,
        config.max_concurrent_extractions,
    ));

    let handler = Arc::new(BotHandler::new(
        messaging_service,
        user_store,
        link_extractor,
        UserId(config.owner_id),
        config.supported_domains.clone(),
    ));
    let mut dispatcher = dispatcher::BotDispatcher::new(handler).build(bot);
    tracing::info!("Bot is live and polling...");

    dispatcher.dispatch().await;

    Ok(())
}
