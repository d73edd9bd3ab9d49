//! Parser for browser DevTools "copy as fetch" commands.
//!
//! Recovers a [`RequestConfig`] (method, URL, headers, body) from the
//! semi-structured JavaScript snippet the browser puts on the clipboard.
//! Chrome emits valid JSON inside the options object; Firefox emits bare
//! object-literal syntax (unquoted keys, single quotes, trailing commas),
//! so the options text is normalized to JSON before parsing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

/// A replayable HTTP request recovered from a fetch command or synthesized
/// from sniffed credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestConfig {
    /// HTTP method, uppercase.
    pub method: String,
    /// Absolute request URL.
    pub url: String,
    /// Header map as captured. Sorted so redacted display output is stable.
    pub headers: BTreeMap<String, String>,
    /// Raw request body, if any.
    pub body: Option<String>,
}

impl RequestConfig {
    /// A bare GET with an authorization header, for sniff mode.
    pub fn authorized_get(url: String, auth_value: String) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("authorization".to_string(), auth_value);
        Self {
            method: "GET".to_string(),
            url,
            headers,
            body: None,
        }
    }
}

/// Errors recovering a request from fetch-command text.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no URL found in fetch command (expected fetch(\"https://...\"))")]
    MissingUrl,
    #[error("URL in fetch command is not valid: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("options object is not valid after normalization: {0}")]
    BadOptions(#[from] serde_json::Error),
    #[error("fetch options must be an object")]
    NotAnObject,
}

/// Parse a fetch command into a [`RequestConfig`].
///
/// The URL is the first string literal passed to `fetch(...)`. The options
/// object is everything between the first `{` and the last `}`; a command
/// with no options object is a plain GET with no headers.
pub fn parse(text: &str) -> Result<RequestConfig, ParseError> {
    static URL_RE: OnceLock<regex::Regex> = OnceLock::new();
    let url_re = URL_RE
        .get_or_init(|| regex::Regex::new(r#"fetch\(\s*['"](.*?)['"]"#).expect("url pattern"));

    let url = url_re
        .captures(text)
        .map(|c| c[1].to_string())
        .ok_or(ParseError::MissingUrl)?;
    url::Url::parse(&url)?;

    let (start, end) = match (text.find('{'), text.rfind('}')) {
        (Some(s), Some(e)) if s < e => (s, e),
        // No options object: a simple GET.
        _ => {
            return Ok(RequestConfig {
                method: "GET".to_string(),
                url,
                headers: BTreeMap::new(),
                body: None,
            })
        }
    };

    let normalized = normalize_object(&text[start..=end]);
    let options: serde_json::Value = serde_json::from_str(&normalized)?;
    let options = options.as_object().ok_or(ParseError::NotAnObject)?;

    let method = options
        .get("method")
        .and_then(|v| v.as_str())
        .unwrap_or("GET")
        .to_ascii_uppercase();

    let mut headers = BTreeMap::new();
    if let Some(map) = options.get("headers").and_then(|v| v.as_object()) {
        for (name, value) in map {
            match value.as_str() {
                Some(s) => {
                    headers.insert(name.clone(), s.to_string());
                }
                None => {
                    tracing::warn!(header = %name, "skipping non-string header value");
                }
            }
        }
    }

    let body = match options.get("body") {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    };

    Ok(RequestConfig {
        method,
        url,
        headers,
        body,
    })
}

/// Normalize a JavaScript object literal into JSON.
///
/// Three rewrites, in order:
/// 1. quote bare keys at the start of a line (`referrer:` → `"referrer":`)
/// 2. convert single-quoted strings to double-quoted, escaping as needed
/// 3. drop trailing commas before `}` / `]`
///
/// Steps 2 and 3 run in one string-aware scan so commas and quote characters
/// inside string literals are left alone.
fn normalize_object(src: &str) -> String {
    static KEY_RE: OnceLock<regex::Regex> = OnceLock::new();
    let key_re = KEY_RE.get_or_init(|| {
        regex::Regex::new(r"(?m)^(\s*)([A-Za-z_]\w*)\s*:").expect("key pattern")
    });
    let keyed = key_re.replace_all(src, "$1\"$2\":");

    let mut out = String::with_capacity(keyed.len());
    let mut chars = keyed.chars().peekable();
    let mut in_double = false;
    let mut in_single = false;

    while let Some(c) = chars.next() {
        if in_double {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                }
                '"' => in_double = false,
                _ => {}
            }
            continue;
        }
        if in_single {
            match c {
                '\\' => match chars.next() {
                    // \' is a JS escape with no JSON equivalent
                    Some('\'') => out.push('\''),
                    Some(next) => {
                        out.push('\\');
                        out.push(next);
                    }
                    None => out.push('\\'),
                },
                '\'' => {
                    out.push('"');
                    in_single = false;
                }
                '"' => out.push_str("\\\""),
                _ => out.push(c),
            }
            continue;
        }
        match c {
            '"' => {
                in_double = true;
                out.push(c);
            }
            '\'' => {
                in_single = true;
                out.push('"');
            }
            ',' => {
                // Trailing comma: next non-whitespace char closes the scope.
                let mut lookahead = chars.clone();
                let trailing = loop {
                    match lookahead.next() {
                        Some(n) if n.is_whitespace() => continue,
                        Some('}') | Some(']') => break true,
                        _ => break false,
                    }
                };
                if !trailing {
                    out.push(',');
                }
            }
            _ => out.push(c),
        }
    }

    out
}
