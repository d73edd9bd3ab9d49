//! `chatsweep parse` — parse a fetch command and show the recovered request.

use super::output;
use crate::fetchcmd::{self, RequestConfig};
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

/// Parse and display a fetch command without running anything.
pub async fn run(file: Option<&Path>, show_secrets: bool) -> Result<()> {
    let text = super::read_fetch_text(file)?;
    let mut cfg = fetchcmd::parse(&text)?;

    if !show_secrets {
        redact(&mut cfg.headers);
    }

    if output::is_json() {
        output::print_json(&cfg);
        return Ok(());
    }

    print_config(&cfg);
    Ok(())
}

/// Blank out credential-bearing header values.
fn redact(headers: &mut BTreeMap<String, String>) {
    for (name, value) in headers.iter_mut() {
        let lower = name.to_ascii_lowercase();
        if lower.contains("authorization") || lower == "cookie" {
            *value = "<redacted>".to_string();
        }
    }
}

fn print_config(cfg: &RequestConfig) {
    println!("method:  {}", cfg.method);
    println!("url:     {}", cfg.url);
    println!("headers: {}", cfg.headers.len());
    for (name, value) in &cfg.headers {
        println!("  {name}: {value}");
    }
    match &cfg.body {
        Some(body) => println!("body:    {body}"),
        None => println!("body:    (none)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_credentials() {
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), "secret".to_string());
        headers.insert("cookie".to_string(), "session=abc".to_string());
        headers.insert("accept".to_string(), "*/*".to_string());

        redact(&mut headers);

        assert_eq!(headers["Authorization"], "<redacted>");
        assert_eq!(headers["cookie"], "<redacted>");
        assert_eq!(headers["accept"], "*/*");
    }
}
