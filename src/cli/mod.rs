//! CLI subcommand implementations for the chatsweep binary.

pub mod doctor;
pub mod output;
pub mod parse_cmd;
pub mod run_cmd;
pub mod sniff_cmd;

use crate::fetchcmd::RequestConfig;
use crate::http::HttpClient;
use crate::platform::Platform;
use crate::progress::{self, SweepEventKind, SweepReceiver};
use crate::sweep::{SweepConfig, SweepEngine};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// Request timeout for sweep traffic.
const HTTP_TIMEOUT_MS: u64 = 30_000;

/// Read fetch-command text from a file, or stdin when no file is given.
fn read_fetch_text(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read fetch command from stdin")?;
            Ok(text)
        }
    }
}

/// Sweep config with the CLI overrides applied.
fn sweep_config(limit: Option<u32>, dry_run: bool) -> SweepConfig {
    SweepConfig {
        max_batches: limit,
        dry_run,
        ..SweepConfig::default()
    }
}

/// Run a sweep with a live event renderer attached, then report the summary.
async fn run_sweep(
    fetch: &RequestConfig,
    delete_headers: &BTreeMap<String, String>,
    platform: &Platform,
    cfg: SweepConfig,
) -> Result<()> {
    let (tx, rx) = progress::channel();
    let renderer = tokio::spawn(render_events(rx));

    let engine = SweepEngine::new(HttpClient::new(HTTP_TIMEOUT_MS), cfg, Some(tx));
    let result = engine.run(fetch, delete_headers, platform).await;

    // Dropping the engine drops the sender, which ends the renderer.
    drop(engine);
    let _ = renderer.await;

    let summary = result?;
    if output::is_json() {
        output::print_json(&summary);
    }
    Ok(())
}

/// Render sweep events until the channel closes. JSON mode emits NDJSON;
/// human mode prints one line per interesting event.
async fn render_events(mut rx: SweepReceiver) {
    loop {
        let event = match rx.recv().await {
            Ok(e) => e,
            Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(dropped = n, "event renderer lagged");
                continue;
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        };

        if output::is_json() {
            output::print_json(&event);
            continue;
        }
        if output::is_quiet() {
            continue;
        }

        match event.event {
            SweepEventKind::BatchFetched { batch, count } => {
                if count == 0 {
                    println!("[batch {batch}] no more messages, channel is clean");
                } else {
                    println!("[batch {batch}] found {count} message(s)");
                }
            }
            SweepEventKind::BatchDeleting { count, .. } => {
                println!("deleting {count} message(s)...");
            }
            SweepEventKind::MessageDeleted {
                index,
                total,
                preview,
            } => {
                println!("  [{index}/{total}] deleted: {preview}");
            }
            SweepEventKind::WouldDelete {
                index,
                total,
                preview,
            } => {
                println!("  [{index}/{total}] would delete: {preview}");
            }
            SweepEventKind::DeleteFailed { index, status } => {
                println!("  [{index}] delete failed with status {status}");
            }
            SweepEventKind::RateLimited { pause_ms } => {
                println!("  rate limited, pausing {}s", pause_ms / 1000);
            }
            SweepEventKind::Pacing { sleep_ms } => {
                tracing::debug!(sleep_ms, "pacing");
            }
            SweepEventKind::SweepComplete {
                batches,
                deleted,
                failed,
                skipped,
            } => {
                println!(
                    "done: {deleted} deleted, {failed} failed, {skipped} skipped across {batches} batch(es)"
                );
            }
            SweepEventKind::Warning { message } => {
                println!("  warning: {message}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_fetch_text_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmd.txt");
        std::fs::write(&path, "fetch(\"https://example.com\")").unwrap();
        let text = read_fetch_text(Some(&path)).unwrap();
        assert_eq!(text, "fetch(\"https://example.com\")");
    }

    #[test]
    fn test_read_fetch_text_missing_file() {
        let err = read_fetch_text(Some(std::path::Path::new("/no/such/file.txt"))).unwrap_err();
        assert!(err.to_string().contains("/no/such/file.txt"));
    }

    #[test]
    fn test_sweep_config_overrides() {
        let cfg = sweep_config(Some(3), true);
        assert_eq!(cfg.max_batches, Some(3));
        assert!(cfg.dry_run);
        // Pacing stays at the defaults
        assert_eq!(cfg.page_cooldown, SweepConfig::default().page_cooldown);
    }
}
