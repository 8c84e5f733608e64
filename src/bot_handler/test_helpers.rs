use std::{ops::ControlFlow, sync::Arc};

use serde_json::{Value, json};
use teloxide::{
    dptree::deps,
    types::{ChatId, Me, Message, MessageId, Update, UserId},
};

use super::*;
use crate::{
    dispatcher,
    extractor::{MediaLink, MockLinkExtractor},
    link::SupportedDomains,
    messaging::MockMessagingService,
    storage::MockUserStore,
};

pub const CHAT_ID: ChatId = ChatId(123);
pub const USER_ID: UserId = UserId(123);
pub const OWNER_ID: UserId = UserId(5290407067);
pub const MESSAGE_ID: MessageId = MessageId(7);
pub const BOT_USERNAME: &str = "reelsman_bot";

// Test harness to encapsulate common test setup and actions.
pub struct TestHarness {
    bot_handler: Arc<BotHandler>,
}

impl TestHarness {
    // Creates a new TestHarness with mock services.
    pub fn new(
        mock_messaging: MockMessagingService,
        mock_user_store: MockUserStore,
        mock_extractor: MockLinkExtractor,
    ) -> Self {
        let bot_handler = BotHandler::new(
            Arc::new(mock_messaging),
            Arc::new(mock_user_store),
            Arc::new(mock_extractor),
            OWNER_ID,
            SupportedDomains::default(),
        );

        Self { bot_handler: Arc::new(bot_handler) }
    }

    // Simulates `/start` sent by a regular user.
    pub async fn start(&self) -> BotHandlerResult<()> {
        let msg = mock_message(CHAT_ID, Some(USER_ID), "/start");
        self.bot_handler.handle_commands(&msg, Command::Start(String::new())).await
    }

    // Simulates `/send <text>` sent by `sender_id`.
    pub async fn broadcast(&self, sender_id: Option<UserId>, text: &str) -> BotHandlerResult<()> {
        let msg = mock_message(CHAT_ID, sender_id, &format!("/send {text}"));
        self.bot_handler.handle_commands(&msg, Command::SendAll(text.to_string())).await
    }

    // Simulates a plain text message sent by a regular user.
    pub async fn message(&self, text: &str) -> BotHandlerResult<()> {
        self.bot_handler.handle_message(&mock_message(CHAT_ID, Some(USER_ID), text)).await
    }

    // Simulates a photo with a caption sent by a regular user.
    pub async fn caption(&self, caption: &str) -> BotHandlerResult<()> {
        self.bot_handler.handle_message(&mock_caption_message(CHAT_ID, Some(USER_ID), caption)).await
    }

    // Feeds a text message through the full dispatcher tree, the way a live
    // update arrives.
    pub async fn dispatch(&self, sender_id: Option<UserId>, text: &str) -> BotHandlerResult<()> {
        // Parsed from a string: teloxide's `UpdateKind` deserializer needs
        // borrowed keys and silently yields `UpdateKind::Error` from a `Value`.
        let update: Update = serde_json::from_str(
            &json!({
                "update_id": 1,
                "message": message_json(CHAT_ID, sender_id, json!({ "text": text })),
            })
            .to_string(),
        )
        .unwrap();

        match dispatcher::schema().dispatch(deps![self.bot_handler.clone(), mock_me(), update]).await
        {
            ControlFlow::Break(result) => result,
            ControlFlow::Continue(_) => panic!("update for {text:?} was not handled"),
        }
    }
}

fn message_json(chat_id: ChatId, from: Option<UserId>, content: Value) -> Value {
    let mut message = json!({
        "message_id": MESSAGE_ID.0,
        "date": 1_700_000_000,
        "chat": { "id": chat_id.0, "type": "private", "first_name": "Test" },
    });
    if let Some(user_id) = from {
        message["from"] = json!({ "id": user_id.0, "is_bot": false, "first_name": "Test" });
    }
    if let (Value::Object(message), Value::Object(content)) = (&mut message, content) {
        message.extend(content);
    }
    message
}

// Helper to create a mock teloxide message to reduce boilerplate in tests
pub fn mock_message(chat_id: ChatId, from: Option<UserId>, text: &str) -> Message {
    serde_json::from_value(message_json(chat_id, from, json!({ "text": text }))).unwrap()
}

// Helper to create a photo message whose caption carries the text
pub fn mock_caption_message(chat_id: ChatId, from: Option<UserId>, caption: &str) -> Message {
    serde_json::from_value(message_json(
        chat_id,
        from,
        json!({
            "photo": [{
                "file_id": "AgADBAADbqcxG",
                "file_unique_id": "AQADbqcxGw",
                "width": 90,
                "height": 90,
                "file_size": 1024,
            }],
            "caption": caption,
        }),
    ))
    .unwrap()
}

fn mock_me() -> Me {
    serde_json::from_value(json!({
        "id": 1,
        "is_bot": true,
        "first_name": "Reelsman",
        "username": BOT_USERNAME,
        "can_join_groups": true,
        "can_read_all_group_messages": false,
        "supports_inline_queries": false,
        "can_connect_to_business": false,
        "has_main_web_app": false,
    }))
    .unwrap()
}

// Expects the chat to be recorded exactly once.
pub fn expect_chat_saved(mock_user_store: &mut MockUserStore) {
    mock_user_store
        .expect_save()
        .with(mockall::predicate::eq(CHAT_ID))
        .times(1)
        .returning(|_| Ok(false));
}

pub fn media_link() -> MediaLink {
    MediaLink {
        direct_url: "https://scontent.cdninstagram.com/v/t50/video.mp4".to_string(),
        title: Some("Reel".to_string()),
    }
}
