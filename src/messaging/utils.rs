use teloxide::utils::html;

use crate::{bot_handler::BroadcastSummary, extractor::MediaLink};

pub const WELCOME_TEXT: &str = "<b>🎬 Video Link Downloader</b>\n\n\
Send a link from Instagram, YouTube, TikTok and other video sites, and I'll give you a direct download link.\n\n\
✅ No bandwidth use\n\
❌ Private videos not supported\n\n\
Enjoy fast downloads!";

pub const EXTRACTION_FAILED_TEXT: &str =
    "❌ Couldn't get this video. It may be private, removed, or not supported.";

/// Wraps the direct URL in an anchor around an invisible character, so the
/// chat shows only Telegram's media preview.
pub fn format_direct_link(link: &MediaLink) -> String {
    format!("<a href=\"{}\">ㅤ</a>", escape_attr(&link.direct_url))
}

pub fn format_broadcast_summary(summary: &BroadcastSummary) -> String {
    format!("✅ Sent: {}, ❌ Failed: {}", summary.delivered, summary.failed)
}

// `html::escape` leaves quotes alone, which is not enough inside an attribute.
fn escape_attr(value: &str) -> String {
    html::escape(value).replace('"', "&quot;")
}
