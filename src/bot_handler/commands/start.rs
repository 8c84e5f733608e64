use teloxide::types::ChatAction;

use crate::bot_handler::{BotHandlerResult, commands::Context};

pub async fn handle(ctx: Context<'_>) -> BotHandlerResult<()> {
    ctx.handler.remember_chat(ctx.chat_id).await;

    ctx.handler.messaging_service.send_chat_action(ctx.chat_id, ChatAction::Typing).await?;
    ctx.handler.messaging_service.send_start_msg(ctx.chat_id).await?;
    Ok(())
}
