use futures::{StreamExt, stream};
use teloxide::types::ChatId;

use crate::bot_handler::{BotHandlerResult, commands::Context};

/// How a broadcast went.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastSummary {
    /// Chats the message was delivered to.
    pub delivered: usize,
    /// Chats that could not be reached, e.g. because they blocked the bot.
    pub failed: usize,
}

/// Sends `text` to every known chat. Only the owner may do this; anyone else
/// is ignored without an answer.
pub async fn handle(ctx: Context<'_>, text: &str) -> BotHandlerResult<()> {
    if ctx.sender_id != Some(ctx.handler.owner_id) {
        tracing::debug!(
            "Ignoring broadcast from {:?} in chat {}: not the owner",
            ctx.sender_id,
            ctx.chat_id
        );
        return Ok(());
    }

    let text = text.trim();
    if text.is_empty() {
        ctx.handler.messaging_service.send_broadcast_usage_msg(ctx.chat_id).await?;
        return Ok(());
    }

    let mut recipients: Vec<ChatId> = ctx.handler.user_store.load().await?.into_iter().collect();
    recipients.sort_unstable_by_key(|chat_id| chat_id.0);
    tracing::info!("Broadcasting to {} chats", recipients.len());

    // One at a time, Telegram throttles bursts to many chats.
    let summary = stream::iter(recipients)
        .fold(BroadcastSummary::default(), |mut summary, chat_id| async move {
            match ctx.handler.messaging_service.send_text_message(chat_id, text).await {
                Ok(()) => summary.delivered += 1,
                Err(e) => {
                    tracing::warn!("Failed to deliver broadcast to {chat_id}: {e}");
                    summary.failed += 1;
                }
            }
            summary
        })
        .await;

    tracing::info!("Broadcast done: {} delivered, {} failed", summary.delivered, summary.failed);

    ctx.handler.messaging_service.send_broadcast_summary_msg(ctx.chat_id, summary).await?;
    Ok(())
}
