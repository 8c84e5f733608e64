use std::sync::Arc;

use teloxide::{
    dispatching::{DefaultKey, UpdateHandler},
    dptree::deps,
    prelude::*,
    types::Update,
};

use crate::bot_handler::{BotHandler, BotHandlerError, Command};

/// Encapsulates the dispatcher logic for the bot.
pub struct BotDispatcher {
    handler: Arc<BotHandler>,
}

impl BotDispatcher {
    /// Creates a new `BotDispatcher`.
    pub fn new(handler: Arc<BotHandler>) -> Self {
        Self { handler }
    }

    /// Builds the dispatcher using the provided `bot` instance.
    #[must_use = "This function returns a Dispatcher that should not be ignored"]
    pub fn build(&self, bot: Bot) -> Dispatcher<Bot, BotHandlerError, DefaultKey> {
        Dispatcher::builder(bot, schema())
            .dependencies(deps![self.handler.clone()])
            .enable_ctrlc_handler()
            .build()
    }
}

/// The update handler tree.
///
/// Commands are tried first; every other message, including unknown
/// commands, goes to the link handler.
pub fn schema() -> UpdateHandler<BotHandlerError> {
    let commands_branch = Update::filter_message().filter_command::<Command>().endpoint(
        |msg: Message, cmd: Command, handler: Arc<BotHandler>| async move {
            handler.handle_commands(&msg, cmd).await
        },
    );

    let messages_branch = Update::filter_message().endpoint(
        |msg: Message, handler: Arc<BotHandler>| async move { handler.handle_message(&msg).await },
    );

    dptree::entry().branch(commands_branch).branch(messages_branch)
}
