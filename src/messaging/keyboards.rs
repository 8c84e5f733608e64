use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use url::Url;

/// Builds the keyboard under the welcome message: two static links and, when
/// the bot has a username, a button that adds the bot to a group.
pub fn build_start_keyboard(
    updates_url: &Url,
    support_url: &Url,
    bot_username: Option<&str>,
) -> Result<InlineKeyboardMarkup, url::ParseError> {
    let mut buttons = vec![vec![
        InlineKeyboardButton::url("Updates", updates_url.clone()),
        InlineKeyboardButton::url("Support", support_url.clone()),
    ]];

    if let Some(username) = bot_username {
        buttons.push(vec![InlineKeyboardButton::url(
            "Add Me To Your Group",
            invite_url(username)?,
        )]);
    }

    Ok(InlineKeyboardMarkup::new(buttons))
}

/// Deep link that opens the "add to group" dialog for the bot.
pub fn invite_url(bot_username: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!("https://t.me/{bot_username}?startgroup=true"))
}
