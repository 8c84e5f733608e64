use std::io::ErrorKind;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use super::{ExtractorError, MediaLink, MediaProbe};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// Asks `yt-dlp` for the metadata of a page without downloading the media.
pub struct YtDlpProbe {
    bin: String,
    max_height: u32,
}

#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    url: Option<String>,
    title: Option<String>,
    #[serde(default)]
    requested_downloads: Vec<RequestedDownload>,
}

#[derive(Debug, Deserialize)]
struct RequestedDownload {
    url: Option<String>,
}

impl YtDlpProbe {
    /// Creates a probe running `bin` and asking for at most `max_height` pixels.
    pub fn new(bin: impl Into<String>, max_height: u32) -> Self {
        Self { bin: bin.into(), max_height }
    }

    fn args(&self, url: &str) -> Vec<String> {
        vec![
            "--dump-single-json".to_string(),
            "--no-download".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--quiet".to_string(),
            "--format".to_string(),
            format!("best[height<={}]/best", self.max_height),
            "--user-agent".to_string(),
            USER_AGENT.to_string(),
            url.to_string(),
        ]
    }
}

#[async_trait]
impl MediaProbe for YtDlpProbe {
    async fn probe(&self, url: &str) -> Result<MediaLink, ExtractorError> {
        tracing::debug!("Running {} for {url}", self.bin);

        let output = Command::new(&self.bin)
            .args(self.args(url))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    ExtractorError::NotInstalled(self.bin.clone())
                } else {
                    ExtractorError::Spawn(e)
                }
            })?;

        if !output.status.success() {
            return Err(ExtractorError::Failed {
                status: output.status.to_string(),
                stderr: last_line(&output.stderr),
            });
        }

        parse_info(&output.stdout)
    }
}

fn parse_info(stdout: &[u8]) -> Result<MediaLink, ExtractorError> {
    let info: YtDlpInfo = serde_json::from_slice(stdout)?;

    // Formats that need merging have no top-level url, their parts are listed
    // under `requested_downloads` instead.
    let direct_url = info
        .url
        .into_iter()
        .chain(info.requested_downloads.into_iter().filter_map(|d| d.url))
        .find(|u| !u.trim().is_empty())
        .ok_or(ExtractorError::NoDirectUrl)?;

    Ok(MediaLink { direct_url, title: info.title })
}

// yt-dlp prints the actual reason on the last line of stderr.
fn last_line(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .next_back()
        .unwrap_or("no output")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args() {
        let probe = YtDlpProbe::new("yt-dlp", 720);
        let args = probe.args("https://instagram.com/reel/abc/");

        assert!(args.contains(&"--no-download".to_string()));
        assert!(args.contains(&"best[height<=720]/best".to_string()));
        assert_eq!(args.last().unwrap(), "https://instagram.com/reel/abc/");
    }

    #[test]
    fn test_parse_info() {
        let stdout = br#"{"title": "Funny cat", "url": "https://cdn.example.com/v.mp4", "ext": "mp4"}"#;

        let link = parse_info(stdout).unwrap();

        assert_eq!(link.direct_url, "https://cdn.example.com/v.mp4");
        assert_eq!(link.title.as_deref(), Some("Funny cat"));
    }

    #[test]
    fn test_parse_info_falls_back_to_requested_downloads() {
        let stdout = br#"{"title": null, "requested_downloads": [{"url": ""}, {"url": "https://cdn.example.com/a.mp4"}]}"#;

        let link = parse_info(stdout).unwrap();

        assert_eq!(link.direct_url, "https://cdn.example.com/a.mp4");
        assert_eq!(link.title, None);
    }

    #[test]
    fn test_parse_info_without_url() {
        let result = parse_info(br#"{"title": "private"}"#);
        assert!(matches!(result, Err(ExtractorError::NoDirectUrl)));
    }

    #[test]
    fn test_parse_info_invalid_json() {
        let result = parse_info(b"ERROR: Unsupported URL");
        assert!(matches!(result, Err(ExtractorError::InvalidOutput(_))));
    }

    #[test]
    fn test_last_line() {
        let stderr = b"WARNING: something\nERROR: [Instagram] abc: Requested content is not available\n\n";
        assert_eq!(
            last_line(stderr),
            "ERROR: [Instagram] abc: Requested content is not available"
        );
        assert_eq!(last_line(b""), "no output");
    }

    #[tokio::test]
    async fn test_probe_missing_binary() {
        let probe = YtDlpProbe::new("definitely-not-an-installed-yt-dlp", 1080);

        let result = probe.probe("https://instagram.com/reel/abc/").await;

        assert!(matches!(result, Err(ExtractorError::NotInstalled(_))));
        assert!(result.unwrap_err().is_permanent());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_failing_binary() {
        // `false` ignores its arguments and exits with status 1.
        let probe = YtDlpProbe::new("false", 1080);

        let result = probe.probe("https://instagram.com/reel/abc/").await;

        assert!(matches!(result, Err(ExtractorError::Failed { .. })));
    }
}
