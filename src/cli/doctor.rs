//! `chatsweep doctor` — check the environment and diagnose issues.

use super::output;
use crate::fetchcmd::RequestConfig;
use crate::http::HttpClient;
use crate::platform::Platform;
use crate::sniffer::binary;
use anyhow::Result;
use std::collections::BTreeMap;

/// Run the environment checks.
pub async fn run(base_url: &str) -> Result<()> {
    let platform = Platform::with_base(base_url);

    let chromium = binary::find_chromium();
    let api_reachable = probe_api(&platform).await;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "chromium": chromium.as_ref().map(|p| p.display().to_string()),
            "api_reachable": api_reachable,
            "base_api": platform.base_api(),
        }));
        return Ok(());
    }

    match &chromium {
        Some(path) => println!("  chromium:  ok ({})", path.display()),
        None => println!(
            "  chromium:  missing — install Chrome or set CHATSWEEP_CHROMIUM_PATH \
             (only needed for sniff mode)"
        ),
    }
    match api_reachable {
        true => println!("  api:       reachable ({})", platform.base_api()),
        false => println!("  api:       unreachable ({})", platform.base_api()),
    }

    Ok(())
}

/// The identity endpoint answers 401 without credentials; any HTTP status at
/// all means the API is reachable.
async fn probe_api(platform: &Platform) -> bool {
    let probe = RequestConfig {
        method: "GET".to_string(),
        url: platform.identity_url(),
        headers: BTreeMap::new(),
        body: None,
    };
    HttpClient::new(10_000).execute(&probe).await.is_ok()
}
