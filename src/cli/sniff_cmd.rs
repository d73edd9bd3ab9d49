//! `chatsweep sniff` — capture credentials from a live browser, then sweep.

use super::output;
use crate::fetchcmd::RequestConfig;
use crate::platform::{Platform, PAGE_LIMIT};
use crate::sniffer::AuthSniffer;
use anyhow::{bail, Context, Result};
use tokio::io::AsyncBufReadExt;

/// Run the sniff-mode sweep.
pub async fn run(
    start_url: Option<&str>,
    base_url: &str,
    limit: Option<u32>,
    dry_run: bool,
) -> Result<()> {
    let platform = Platform::with_base(base_url);
    let start = start_url.unwrap_or_else(|| platform.app_url());

    output::note("Launching browser. Log in if needed; credentials are captured automatically.");
    let (sniffer, mut captures) = AuthSniffer::launch(start).await?;

    // Only trust an authorization header sent to the identity endpoint;
    // third-party requests can carry unrelated credentials.
    let identity_url = platform.identity_url();
    let auth = loop {
        match captures.recv().await {
            Some(cap)
                if cap.request_url == identity_url
                    && cap.header.eq_ignore_ascii_case("authorization") =>
            {
                break cap.value;
            }
            Some(cap) => {
                tracing::debug!(url = %cap.request_url, "ignoring credential from other endpoint");
            }
            None => {
                let _ = sniffer.close().await;
                bail!("browser closed before credentials were captured");
            }
        }
    };

    output::note("Credentials captured. Open the channel to sweep, then press Enter here.");
    wait_for_enter().await?;

    let channel = sniffer
        .current_channel()
        .await?
        .context("the page in the browser is not a channel (no channel id in its URL)")?;
    output::note(&format!("Sweeping channel {channel}."));

    let fetch = RequestConfig::authorized_get(platform.messages_url(&channel, PAGE_LIMIT), auth);
    let delete_headers = fetch.headers.clone();

    let result = super::run_sweep(
        &fetch,
        &delete_headers,
        &platform,
        super::sweep_config(limit, dry_run),
    )
    .await;

    let _ = sniffer.close().await;
    result
}

async fn wait_for_enter() -> Result<()> {
    let mut line = String::new();
    let mut reader = tokio::io::BufReader::new(tokio::io::stdin());
    reader
        .read_line(&mut line)
        .await
        .context("failed to read from stdin")?;
    Ok(())
}
