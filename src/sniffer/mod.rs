//! Live browser credential capture using chromiumoxide.
//!
//! Launches a headful Chromium, opens the platform page, and watches CDP
//! `Network.requestWillBeSent` events for `authorization` headers while the
//! user logs in and clicks around. Each newly seen (header, value) pair is
//! delivered over an mpsc channel; the active channel id is read from the
//! page URL on demand.

pub mod binary;

use anyhow::{bail, Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{EventRequestWillBeSent, Request};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::collections::HashSet;
use tokio::sync::mpsc;

/// Header names that carry credentials worth capturing.
const AUTH_HEADER_NAMES: [&str; 2] = ["authorization", "proxy-authorization"];

/// One captured credential header.
#[derive(Debug, Clone)]
pub struct AuthCapture {
    /// URL of the request that carried the header.
    pub request_url: String,
    /// Header name as sent.
    pub header: String,
    /// Header value.
    pub value: String,
}

/// A live headful browser session being watched for credentials.
pub struct AuthSniffer {
    browser: Browser,
    page: Page,
}

impl AuthSniffer {
    /// Launch Chromium at `start_url` and start sniffing.
    ///
    /// Returns the sniffer plus the capture channel. The channel dedupes:
    /// each distinct (header, value) pair is delivered once, no matter how
    /// many requests repeat it.
    pub async fn launch(start_url: &str) -> Result<(Self, mpsc::Receiver<AuthCapture>)> {
        let start_url = if start_url.starts_with("http://") || start_url.starts_with("https://") {
            start_url.to_string()
        } else {
            format!("https://{start_url}")
        };

        let chrome_path = binary::find_chromium().context(
            "Chromium not found. Install Chrome or set CHATSWEEP_CHROMIUM_PATH.",
        )?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .with_head()
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Drain CDP messages for the lifetime of the browser
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = browser
            .new_page(start_url.as_str())
            .await
            .context("failed to open start page")?;

        let mut requests = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .context("failed to subscribe to network events")?;

        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            let mut seen: HashSet<(String, String)> = HashSet::new();
            while let Some(event) = requests.next().await {
                if let Some(capture) = extract_auth(&event.request) {
                    let key = (capture.header.to_ascii_lowercase(), capture.value.clone());
                    if !seen.insert(key) {
                        continue;
                    }
                    tracing::debug!(url = %capture.request_url, header = %capture.header, "captured credential header");
                    if tx.send(capture).await.is_err() {
                        break;
                    }
                }
            }
        });

        Ok((Self { browser, page }, rx))
    }

    /// URL of the page the user is currently viewing.
    pub async fn current_url(&self) -> Result<String> {
        let url = self
            .page
            .url()
            .await
            .context("failed to read page URL")?;
        match url {
            Some(u) => Ok(u.to_string()),
            None => bail!("page has no URL"),
        }
    }

    /// Channel id extracted from the current page URL, if the user is
    /// viewing a channel.
    pub async fn current_channel(&self) -> Result<Option<String>> {
        let url = self.current_url().await?;
        Ok(crate::platform::channel_id_from_url(&url))
    }

    /// Close the page and shut the browser down.
    pub async fn close(mut self) -> Result<()> {
        let _ = self.page.close().await;
        self.browser.close().await.context("failed to close browser")?;
        Ok(())
    }
}

/// Pull a credential header out of a CDP request, if present.
fn extract_auth(request: &Request) -> Option<AuthCapture> {
    let headers = serde_json::to_value(&request.headers).ok()?;
    let map = headers.as_object()?;
    for (name, value) in map {
        if !AUTH_HEADER_NAMES.contains(&name.to_ascii_lowercase().as_str()) {
            continue;
        }
        if let Some(v) = value.as_str() {
            if !v.trim().is_empty() {
                return Some(AuthCapture {
                    request_url: request.url.clone(),
                    header: name.clone(),
                    value: v.to_string(),
                });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_headers(headers: serde_json::Value) -> Request {
        serde_json::from_value(serde_json::json!({
            "url": "https://discord.com/api/v9/users/@me",
            "method": "GET",
            "headers": headers,
            "initialPriority": "High",
            "referrerPolicy": "strict-origin-when-cross-origin",
        }))
        .expect("valid CDP request")
    }

    #[test]
    fn test_extract_auth_finds_authorization() {
        let req = request_with_headers(serde_json::json!({
            "Accept": "*/*",
            "Authorization": "token-123",
        }));
        let cap = extract_auth(&req).expect("capture");
        assert_eq!(cap.header, "Authorization");
        assert_eq!(cap.value, "token-123");
        assert_eq!(cap.request_url, "https://discord.com/api/v9/users/@me");
    }

    #[test]
    fn test_extract_auth_ignores_blank_values() {
        let req = request_with_headers(serde_json::json!({
            "authorization": "   ",
        }));
        assert!(extract_auth(&req).is_none());
    }

    #[test]
    fn test_extract_auth_no_credential_headers() {
        let req = request_with_headers(serde_json::json!({
            "accept": "*/*",
            "x-custom": "value",
        }));
        assert!(extract_auth(&req).is_none());
    }

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_sniffer_launch_and_close() {
        let (sniffer, _rx) = AuthSniffer::launch("data:text/html,<h1>hi</h1>")
            .await
            .expect("failed to launch sniffer");
        let url = sniffer.current_url().await.expect("url");
        assert!(url.starts_with("data:") || url.starts_with("https://"));
        sniffer.close().await.expect("close failed");
    }
}
