mod keyboards;
mod utils;

use async_trait::async_trait;
use mockall::automock;
use teloxide::{
    prelude::*,
    types::{ChatAction, ChatId, MessageId, ParseMode, ReplyParameters},
    utils::command::BotCommands,
};
use thiserror::Error;
use tokio::sync::OnceCell;
use url::Url;

use crate::{
    bot_handler::{BroadcastSummary, Command},
    extractor::MediaLink,
};

/// Errors of the messaging service.
#[derive(Debug, Error)]
pub enum MessagingError {
    /// The Telegram API rejected the request or could not be reached.
    #[error("Teloxide API request failed: {0}")]
    TeloxideRequest(#[from] teloxide::RequestError),
    /// A configured button URL is not a valid URL.
    #[error("Invalid keyboard URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

type Result<T> = std::result::Result<T, MessagingError>;

/// Trait for sending messages to the user.
#[automock]
#[async_trait]
pub trait MessagingService: Send + Sync {
    /// Publishes the public command menu. Only `/start` is listed.
    async fn set_commands(&self) -> Result<()>;

    /// Shows a chat action such as "typing" or "recording video".
    async fn send_chat_action(&self, chat_id: ChatId, action: ChatAction) -> Result<()>;

    /// Sends the welcome message with the links keyboard.
    async fn send_start_msg(&self, chat_id: ChatId) -> Result<()>;

    /// Sends an HTML text message as is. Used to deliver broadcasts.
    async fn send_text_message(&self, chat_id: ChatId, text: &str) -> Result<()>;

    /// Tells the owner how to use the broadcast command.
    async fn send_broadcast_usage_msg(&self, chat_id: ChatId) -> Result<()>;

    /// Reports how many chats a broadcast reached.
    async fn send_broadcast_summary_msg(
        &self,
        chat_id: ChatId,
        summary: BroadcastSummary,
    ) -> Result<()>;

    /// Replies to the message that carried the link with the direct media
    /// link.
    async fn send_direct_link_msg(
        &self,
        chat_id: ChatId,
        reply_to: MessageId,
        link: MediaLink,
    ) -> Result<()>;

    /// Replies to the message that carried the link when it couldn't be
    /// resolved.
    async fn send_extraction_failed_msg(
        &self,
        chat_id: ChatId,
        reply_to: MessageId,
    ) -> Result<()>;
}

/// Telegram messaging service.
pub struct TelegramMessagingService {
    bot: Bot,
    updates_url: Url,
    support_url: Url,
    bot_username: OnceCell<Option<String>>,
}

impl TelegramMessagingService {
    /// Creates the service. Fails if one of the button URLs is invalid.
    pub fn new(bot: Bot, updates_url: &str, support_url: &str) -> Result<Self> {
        Ok(Self {
            bot,
            updates_url: Url::parse(updates_url)?,
            support_url: Url::parse(support_url)?,
            bot_username: OnceCell::new(),
        })
    }

    /// The bot's own username, fetched once and cached.
    async fn bot_username(&self) -> Result<Option<&str>> {
        let username = self
            .bot_username
            .get_or_try_init(|| async {
                let me = self.bot.get_me().await?;
                Ok::<_, MessagingError>(me.user.username.clone())
            })
            .await?;
        Ok(username.as_deref())
    }

    async fn send_html(&self, chat_id: ChatId, text: impl Into<String>) -> Result<()> {
        self.bot
            .send_message(chat_id, text)
            .parse_mode(ParseMode::Html)
            .await
            .map(|_| ())
            .map_err(MessagingError::TeloxideRequest)
    }

    async fn reply_html(
        &self,
        chat_id: ChatId,
        reply_to: MessageId,
        text: impl Into<String>,
    ) -> Result<()> {
        self.bot
            .send_message(chat_id, text)
            .parse_mode(ParseMode::Html)
            .reply_parameters(ReplyParameters::new(reply_to))
            .await
            .map(|_| ())
            .map_err(MessagingError::TeloxideRequest)
    }
}

#[async_trait]
impl MessagingService for TelegramMessagingService {
    async fn set_commands(&self) -> Result<()> {
        self.bot
            .set_my_commands(Command::bot_commands())
            .await
            .map(|_| ())
            .map_err(MessagingError::TeloxideRequest)
    }

    async fn send_chat_action(&self, chat_id: ChatId, action: ChatAction) -> Result<()> {
        self.bot
            .send_chat_action(chat_id, action)
            .await
            .map(|_| ())
            .map_err(MessagingError::TeloxideRequest)
    }

    async fn send_start_msg(&self, chat_id: ChatId) -> Result<()> {
        let username = self.bot_username().await?;
        let keyboard =
            keyboards::build_start_keyboard(&self.updates_url, &self.support_url, username)?;

        self.bot
            .send_message(chat_id, utils::WELCOME_TEXT)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await
            .map(|_| ())
            .map_err(MessagingError::TeloxideRequest)
    }

    async fn send_text_message(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.send_html(chat_id, text).await
    }

    async fn send_broadcast_usage_msg(&self, chat_id: ChatId) -> Result<()> {
        self.send_html(chat_id, "Usage: /send &lt;message&gt;").await
    }

    async fn send_broadcast_summary_msg(
        &self,
        chat_id: ChatId,
        summary: BroadcastSummary,
    ) -> Result<()> {
        self.send_html(chat_id, utils::format_broadcast_summary(&summary)).await
    }

    async fn send_direct_link_msg(
        &self,
        chat_id: ChatId,
        reply_to: MessageId,
        link: MediaLink,
    ) -> Result<()> {
        self.reply_html(chat_id, reply_to, utils::format_direct_link(&link)).await
    }

    async fn send_extraction_failed_msg(
        &self,
        chat_id: ChatId,
        reply_to: MessageId,
    ) -> Result<()> {
        self.reply_html(chat_id, reply_to, utils::EXTRACTION_FAILED_TEXT).await
    }
}
