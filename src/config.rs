use std::{
    env::{self, VarError},
    str::FromStr,
    time::Duration,
};

use thiserror::Error;

use crate::link::SupportedDomains;

const DEFAULT_OWNER_ID: u64 = 5290407067;
const DEFAULT_PORT: u16 = 10000;
const DEFAULT_USERS_FILE: &str = "users.txt";
const DEFAULT_YT_DLP_BIN: &str = "yt-dlp";
const DEFAULT_MAX_VIDEO_HEIGHT: u32 = 1080;
const DEFAULT_EXTRACT_MAX_ATTEMPTS: usize = 3;
const DEFAULT_EXTRACT_RETRY_DELAY_MS: u64 = 1000;
const DEFAULT_MAX_CONCURRENT_EXTRACTIONS: usize = 4;
const DEFAULT_UPDATES_URL: &str = "https://t.me/WorkGlows";
const DEFAULT_SUPPORT_URL: &str = "https://t.me/TheCryptoElders";

/// Errors raised while reading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `BOT_TOKEN` is required and has no default.
    #[error("BOT_TOKEN environment variable is not set")]
    MissingBotToken(#[source] VarError),
}

/// Represents the application configuration.
#[derive(Debug)]
pub struct Config {
    /// The Telegram bot token.
    pub bot_token: String,
    /// The Telegram user id allowed to broadcast.
    pub owner_id: u64,
    /// The port the health endpoint listens on.
    pub port: u16,
    /// Path of the newline-delimited file with known chat ids.
    pub users_file: String,
    /// The yt-dlp executable to run.
    pub yt_dlp_bin: String,
    /// The maximum video height requested from yt-dlp.
    pub max_video_height: u32,
    /// How many times a link is tried before giving up.
    pub extract_max_attempts: usize,
    /// The pause between two extraction attempts.
    pub extract_retry_delay: Duration,
    /// The maximum number of yt-dlp processes running at once.
    pub max_concurrent_extractions: usize,
    /// Hosts accepted for extraction.
    pub supported_domains: SupportedDomains,
    /// Target of the "Updates" button in the welcome message.
    pub updates_url: String,
    /// Target of the "Support" button in the welcome message.
    pub support_url: String,
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bot_token: env::var("BOT_TOKEN").map_err(ConfigError::MissingBotToken)?,
            owner_id: parse_var("OWNER_ID").unwrap_or(DEFAULT_OWNER_ID),
            port: parse_var("PORT").unwrap_or(DEFAULT_PORT),
            users_file: env::var("USERS_FILE").unwrap_or_else(|_| DEFAULT_USERS_FILE.to_string()),
            yt_dlp_bin: env::var("YT_DLP_BIN").unwrap_or_else(|_| DEFAULT_YT_DLP_BIN.to_string()),
            max_video_height: parse_var("MAX_VIDEO_HEIGHT").unwrap_or(DEFAULT_MAX_VIDEO_HEIGHT),
            extract_max_attempts: parse_var::<usize>("EXTRACT_MAX_ATTEMPTS")
                .filter(|attempts| *attempts > 0)
                .unwrap_or(DEFAULT_EXTRACT_MAX_ATTEMPTS),
            extract_retry_delay: Duration::from_millis(
                parse_var("EXTRACT_RETRY_DELAY_MS").unwrap_or(DEFAULT_EXTRACT_RETRY_DELAY_MS),
            ),
            max_concurrent_extractions: parse_var::<usize>("MAX_CONCURRENT_EXTRACTIONS")
                .filter(|max| *max > 0)
                .unwrap_or(DEFAULT_MAX_CONCURRENT_EXTRACTIONS),
            supported_domains: env::var("SUPPORTED_DOMAINS")
                .ok()
                .map(|v| SupportedDomains::from_list(&v))
                .filter(|domains| !domains.is_empty())
                .unwrap_or_default(),
            updates_url: env::var("UPDATES_URL").unwrap_or_else(|_| DEFAULT_UPDATES_URL.to_string()),
            support_url: env::var("SUPPORT_URL").unwrap_or_else(|_| DEFAULT_SUPPORT_URL.to_string()),
        })
    }
}

fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
