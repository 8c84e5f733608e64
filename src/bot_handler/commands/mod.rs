pub mod broadcast;
pub mod start;

use teloxide::types::{ChatId, Message, MessageId, UserId};

use crate::bot_handler::BotHandler;

/// Context groups the data needed by all handlers.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub handler: &'a BotHandler,
    pub chat_id: ChatId,
    pub sender_id: Option<UserId>,
    pub message_id: MessageId,
}

impl<'a> Context<'a> {
    pub fn from_message(handler: &'a BotHandler, message: &Message) -> Self {
        Self {
            handler,
            chat_id: message.chat.id,
            sender_id: message.from.as_ref().map(|user| user.id),
            message_id: message.id,
        }
    }
}
