//! `chatsweep run` — sweep using a pasted browser fetch command.

use crate::fetchcmd;
use crate::platform::Platform;
use anyhow::{bail, Result};
use std::path::Path;

/// Run the manual-mode sweep.
pub async fn run(
    file: Option<&Path>,
    base_url: &str,
    limit: Option<u32>,
    dry_run: bool,
) -> Result<()> {
    let text = super::read_fetch_text(file)?;
    let fetch = fetchcmd::parse(&text)?;

    if fetch.headers.is_empty() {
        bail!(
            "no headers found in the fetch command; paste the full request \
             copied from the browser devtools (it must include authorization)"
        );
    }
    if !fetch
        .headers
        .keys()
        .any(|k| k.eq_ignore_ascii_case("authorization"))
    {
        tracing::warn!("fetch command has no authorization header, deletions will likely fail");
    }

    let platform = Platform::with_base(base_url);
    let delete_headers = fetch.headers.clone();

    super::output::note(&format!("replaying {} {}", fetch.method, fetch.url));
    super::run_sweep(
        &fetch,
        &delete_headers,
        &platform,
        super::sweep_config(limit, dry_run),
    )
    .await
}
