//! Platform endpoints and URL synthesis.
//!
//! Defaults target the Discord v9 REST API, but the base URL is overridable
//! (`--base-url`) so the HTTP layer can be pointed at a mock server in tests
//! or at a compatible self-hosted instance.

use regex::Regex;
use std::sync::OnceLock;

/// Default REST API base (no trailing slash).
pub const DEFAULT_BASE_API: &str = "https://discord.com/api/v9";

/// Default page to open when sniffing a live browser session.
pub const DEFAULT_APP_URL: &str = "https://discord.com/channels/@me";

/// Messages fetched per page in sniff mode.
pub const PAGE_LIMIT: u32 = 100;

/// Resolved platform endpoints.
#[derive(Debug, Clone)]
pub struct Platform {
    base_api: String,
    app_url: String,
}

impl Default for Platform {
    fn default() -> Self {
        Self {
            base_api: DEFAULT_BASE_API.to_string(),
            app_url: DEFAULT_APP_URL.to_string(),
        }
    }
}

impl Platform {
    /// Platform rooted at a custom API base. Trailing slashes are stripped so
    /// synthesized URLs never contain `//`.
    pub fn with_base(base_api: &str) -> Self {
        Self {
            base_api: base_api.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// REST API base URL.
    pub fn base_api(&self) -> &str {
        &self.base_api
    }

    /// Page the sniffer opens on launch.
    pub fn app_url(&self) -> &str {
        &self.app_url
    }

    /// Identity endpoint. A captured `authorization` header is only trusted
    /// when it was sent to this URL.
    pub fn identity_url(&self) -> String {
        format!("{}/users/@me", self.base_api)
    }

    /// One page of messages for a channel.
    pub fn messages_url(&self, channel_id: &str, limit: u32) -> String {
        format!(
            "{}/channels/{}/messages?limit={}",
            self.base_api, channel_id, limit
        )
    }

    /// Deletion endpoint for a single message.
    pub fn delete_url(&self, channel_id: &str, message_id: &str) -> String {
        format!(
            "{}/channels/{}/messages/{}",
            self.base_api, channel_id, message_id
        )
    }
}

/// Extract a channel id from an app page URL.
///
/// Channel pages look like `/channels/<guild or @me>/<channel>` where the
/// channel id is a 17-20 digit snowflake.
pub fn channel_id_from_url(url: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"channels/(?:@me|\d+)/(\d{17,20})").expect("channel id pattern")
    });
    re.captures(url).map(|c| c[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_urls() {
        let p = Platform::default();
        assert_eq!(p.identity_url(), "https://discord.com/api/v9/users/@me");
        assert_eq!(
            p.messages_url("123", 100),
            "https://discord.com/api/v9/channels/123/messages?limit=100"
        );
        assert_eq!(
            p.delete_url("123", "456"),
            "https://discord.com/api/v9/channels/123/messages/456"
        );
    }

    #[test]
    fn test_with_base_strips_trailing_slash() {
        let p = Platform::with_base("http://127.0.0.1:9999/api/");
        assert_eq!(p.identity_url(), "http://127.0.0.1:9999/api/users/@me");
    }

    #[test]
    fn test_channel_id_from_dm_url() {
        let id = channel_id_from_url("https://discord.com/channels/@me/112233445566778899");
        assert_eq!(id.as_deref(), Some("112233445566778899"));
    }

    #[test]
    fn test_channel_id_from_guild_url() {
        let id = channel_id_from_url(
            "https://discord.com/channels/81384788765712384/81385020756865024",
        );
        assert_eq!(id.as_deref(), Some("81385020756865024"));
    }

    #[test]
    fn test_channel_id_rejects_short_ids() {
        assert!(channel_id_from_url("https://discord.com/channels/@me/12345").is_none());
        assert!(channel_id_from_url("https://example.com/").is_none());
    }
}
