use teloxide::types::ChatAction;

use crate::{
    bot_handler::{BotHandlerResult, commands::Context},
    extractor::ExtractionResult,
    link::LinkRequest,
};

/// Answers a message that contains a supported link with the direct media
/// link. Messages without one are ignored without an answer.
pub async fn handle(ctx: Context<'_>, text: &str) -> BotHandlerResult<()> {
    ctx.handler.remember_chat(ctx.chat_id).await;

    let Some(request) = LinkRequest::parse(text, &ctx.handler.supported_domains) else {
        return Ok(());
    };

    tracing::info!("URL received in chat {}: {}", ctx.chat_id, request.url);
    ctx.handler.messaging_service.send_chat_action(ctx.chat_id, ChatAction::RecordVideo).await?;

    match ctx.handler.link_extractor.resolve(request.url.as_str()).await {
        ExtractionResult::Resolved(link) => {
            ctx.handler
                .messaging_service
                .send_direct_link_msg(ctx.chat_id, ctx.message_id, link)
                .await?;
            tracing::info!("Direct link delivered to chat {}", ctx.chat_id);
        }
        ExtractionResult::Failed => {
            ctx.handler
                .messaging_service
                .send_extraction_failed_msg(ctx.chat_id, ctx.message_id)
                .await?;
        }
    }

    Ok(())
}
