
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    static ref URL_PATTERN: Regex =
        Regex::new(r"https?://[^\s<>…。，、「」『』【】（）《》“”‘’]+")
            .expect("URL pattern must compile");
}

const TRAILING_PUNCTUATION: &[char] =
    &['.', ',', ';', ':', '!', '?', ')', ']', '}', '>', '\'', '"', '！', '？', '：', '；'];

const DEFAULT_DOMAINS: &[&str] = &[
    "instagram.com",
    "youtube.com",
    "youtu.be",
    "tiktok.com",
    "twitter.com",
    "x.com",
    "facebook.com",
    "fb.watch",
    "vimeo.com",
    "reddit.com",
    "dailymotion.com",
    "twitch.tv",
    "pinterest.com",
    "pin.it",
    "threads.net",
    "snapchat.com",
    "likee.video",
];

/// Hosts the bot is willing to resolve. A host matches when it is one of the
/// domains or a subdomain of one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedDomains(Vec<String>);

impl Default for SupportedDomains {
    fn default() -> Self {
        Self(DEFAULT_DOMAINS.iter().map(|d| d.to_string()).collect())
    }
}

impl SupportedDomains {
    /// Parses a comma-separated list such as `instagram.com, tiktok.com`.
    pub fn from_list(list: &str) -> Self {
        Self(
            list.split(',')
                .map(|d| d.trim().trim_start_matches("www.").to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        )
    }

    /// Returns `true` if no domain is allowed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if `host` is one of the domains or a subdomain of one.
    pub fn is_supported_host(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        self.0.iter().any(|domain| {
            host == *domain
                || host.strip_suffix(domain.as_str()).is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

/// A message that carries a link the bot should resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRequest {
    /// The full text of the incoming message.
    pub text: String,
    /// The first supported URL found in the text, normalized.
    pub url: Url,
}

impl LinkRequest {
    /// Finds the first `http(s)://` link in `text` and returns a request for
    /// it if its host is supported. Only the first link is considered.
    pub fn parse(text: &str, domains: &SupportedDomains) -> Option<Self> {
        let raw = URL_PATTERN.find(text)?.as_str().trim_end_matches(TRAILING_PUNCTUATION);
        let mut url = Url::parse(raw).ok()?;

        if !url.host_str().is_some_and(|host| domains.is_supported_host(host)) {
            return None;
        }

        if is_instagram(&url) {
            url.set_query(None);
            url.set_fragment(None);
        }

        Some(Self { text: text.to_string(), url })
    }
}

// Instagram appends tracking parameters (`igsh`, `utm_source`) that only get
// in the way of extraction.
fn is_instagram(url: &Url) -> bool {
    url.host_str().is_some_and(|host| host == "instagram.com" || host.ends_with(".instagram.com"))
}
