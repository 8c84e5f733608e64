mod commands;
mod media_link;
#[cfg(test)]
mod test_helpers;

use std::sync::Arc;

pub use commands::broadcast::BroadcastSummary;
use commands::Context;
use teloxide::{
    prelude::*,
    types::Message,
    utils::command::{BotCommands, ParseError},
};
use thiserror::Error;

use crate::{
    extractor::LinkExtractor,
    link::SupportedDomains,
    messaging::{MessagingError, MessagingService},
    storage::{StorageError, UserStore},
};

/// Errors a handler can return to the dispatcher.
#[derive(Debug, Error)]
pub enum BotHandlerError {
    /// A reply could not be sent.
    #[error("Failed to send message: {0}")]
    Messaging(#[from] MessagingError),
    /// The user store could not be read.
    #[error("User store error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type used by all handlers.
pub type BotHandlerResult<T> = Result<T, BotHandlerError>;

/// Commands the bot understands. Broadcast commands are hidden from the
/// public command menu.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Bot info & how to use", parse_with = rest_of_message)]
    Start(String),
    #[command(rename = "send", hide, parse_with = rest_of_message)]
    SendAll(String),
    #[command(hide, parse_with = rest_of_message)]
    Broadcast(String),
}

// Keeps everything after the command word, including line breaks, and lets an
// empty argument through so the owner gets the usage hint.
fn rest_of_message(input: String) -> Result<(String,), ParseError> {
    Ok((input,))
}

/// Encapsulates the services the handlers talk to.
pub struct BotHandler {
    messaging_service: Arc<dyn MessagingService>,
    user_store: Arc<dyn UserStore>,
    link_extractor: Arc<dyn LinkExtractor>,
    owner_id: UserId,
    supported_domains: SupportedDomains,
}

impl BotHandler {
    /// Creates a new `BotHandler` instance.
    pub fn new(
        messaging_service: Arc<dyn MessagingService>,
        user_store: Arc<dyn UserStore>,
        link_extractor: Arc<dyn LinkExtractor>,
        owner_id: UserId,
        supported_domains: SupportedDomains,
    ) -> Self {
        Self { messaging_service, user_store, link_extractor, owner_id, supported_domains }
    }

    /// Dispatches the incoming command to the appropriate handler.
    pub async fn handle_commands(&self, msg: &Message, cmd: Command) -> BotHandlerResult<()> {
        let ctx = Context::from_message(self, msg);

        match cmd {
            // Only a bare `/start` greets, `/start <link>` is handled as a link.
            Command::Start(args) if !args.trim().is_empty() => self.handle_message(msg).await,
            Command::Start(_) => commands::start::handle(ctx).await,
            Command::SendAll(text) | Command::Broadcast(text) => {
                commands::broadcast::handle(ctx, &text).await
            }
        }
    }

    /// Handles any other message: remembers the chat and answers links.
    pub async fn handle_message(&self, msg: &Message) -> BotHandlerResult<()> {
        let ctx = Context::from_message(self, msg);
        let text = msg.text().or_else(|| msg.caption()).unwrap_or_default();

        media_link::handle(ctx, text).await
    }

    /// Records the chat in the user store. Failures are logged, they never
    /// keep the user from getting an answer.
    async fn remember_chat(&self, chat_id: ChatId) {
        match self.user_store.save(chat_id).await {
            Ok(true) => tracing::info!("New chat: {chat_id}"),
            Ok(false) => {}
            Err(e) => tracing::error!("Failed to remember chat {chat_id}: {e}"),
        }
    }
}
