//! The fetch/delete state machine.
//!
//! One sweep is: fetch a page of messages → cool down → delete each message
//! with jittered pacing → pause → fetch the next page, until the channel
//! reports no more messages. Deletion failures are recorded and skipped, not
//! fatal; a rate-limited message is left in place and picked up again by a
//! later page fetch.

use crate::fetchcmd::RequestConfig;
use crate::http::{DeleteOutcome, HttpClient, HttpError};
use crate::message;
use crate::platform::Platform;
use crate::progress::{emit, SweepEventKind, SweepSender};
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Pacing and safety knobs for a sweep.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Pause between fetching a page and starting deletions.
    pub page_cooldown: Duration,
    /// Pause between batches.
    pub batch_pause: Duration,
    /// Lower bound of the jittered per-delete sleep.
    pub delete_delay_min: Duration,
    /// Upper bound of the jittered per-delete sleep.
    pub delete_delay_max: Duration,
    /// Extra pause after the platform rate-limits a deletion.
    pub rate_limit_pause: Duration,
    /// Stop after this many batches; `None` runs until the channel is empty.
    pub max_batches: Option<u32>,
    /// Report what would be deleted without issuing DELETEs.
    pub dry_run: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            page_cooldown: Duration::from_secs(5),
            batch_pause: Duration::from_secs(2),
            delete_delay_min: Duration::from_secs(5),
            delete_delay_max: Duration::from_secs(8),
            rate_limit_pause: Duration::from_secs(5),
            max_batches: None,
            dry_run: false,
        }
    }
}

/// What a finished sweep did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepSummary {
    pub batches: u32,
    pub deleted: u64,
    pub failed: u64,
    /// Fetched items missing an id or channel id.
    pub skipped: u64,
}

/// Errors that abort a sweep. Per-message failures do not abort; only a
/// failed page fetch does, since without a page there is nothing to do.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("page fetch returned status {status}")]
    FetchFailed { status: u16 },
    #[error(transparent)]
    Http(#[from] HttpError),
}

/// Drives the fetch → delete loop.
pub struct SweepEngine {
    http: HttpClient,
    cfg: SweepConfig,
    events: Option<SweepSender>,
}

impl SweepEngine {
    pub fn new(http: HttpClient, cfg: SweepConfig, events: Option<SweepSender>) -> Self {
        Self { http, cfg, events }
    }

    /// Run the sweep to completion.
    ///
    /// `fetch` is re-executed for every page (the platform returns the
    /// newest page each time, so deleting shrinks it); `delete_headers`
    /// authenticate the per-message DELETE calls.
    pub async fn run(
        &self,
        fetch: &RequestConfig,
        delete_headers: &BTreeMap<String, String>,
        platform: &Platform,
    ) -> Result<SweepSummary, SweepError> {
        let mut summary = SweepSummary::default();
        let mut seq = 0u64;
        let mut batch = 1u32;

        loop {
            if let Some(cap) = self.cfg.max_batches {
                if batch > cap {
                    emit(
                        &self.events,
                        &mut seq,
                        SweepEventKind::Warning {
                            message: format!("batch cap of {cap} reached, stopping"),
                        },
                    );
                    break;
                }
            }

            tracing::debug!(batch, "fetching page");
            let resp = self.http.execute(fetch).await?;
            if !resp.is_success() {
                return Err(SweepError::FetchFailed {
                    status: resp.status,
                });
            }

            let flat = message::flatten(&resp.body);
            summary.skipped += flat.skipped as u64;
            if flat.skipped > 0 {
                emit(
                    &self.events,
                    &mut seq,
                    SweepEventKind::Warning {
                        message: format!("{} items missing ids, skipped", flat.skipped),
                    },
                );
            }

            let count = flat.messages.len();
            emit(
                &self.events,
                &mut seq,
                SweepEventKind::BatchFetched { batch, count },
            );

            if count == 0 {
                break;
            }

            tokio::time::sleep(self.cfg.page_cooldown).await;
            emit(
                &self.events,
                &mut seq,
                SweepEventKind::BatchDeleting { batch, count },
            );

            for (i, msg) in flat.messages.iter().enumerate() {
                let index = i + 1;
                let preview = msg.preview(50);

                if self.cfg.dry_run {
                    summary.deleted += 1;
                    emit(
                        &self.events,
                        &mut seq,
                        SweepEventKind::WouldDelete {
                            index,
                            total: count,
                            preview,
                        },
                    );
                    continue;
                }

                let url = platform.delete_url(&msg.channel_id, &msg.id);
                match self.http.delete(&url, delete_headers).await {
                    Ok(DeleteOutcome::Deleted) => {
                        summary.deleted += 1;
                        emit(
                            &self.events,
                            &mut seq,
                            SweepEventKind::MessageDeleted {
                                index,
                                total: count,
                                preview,
                            },
                        );
                    }
                    Ok(DeleteOutcome::RateLimited) => {
                        summary.failed += 1;
                        let pause = self.cfg.rate_limit_pause;
                        emit(
                            &self.events,
                            &mut seq,
                            SweepEventKind::RateLimited {
                                pause_ms: pause.as_millis() as u64,
                            },
                        );
                        tokio::time::sleep(pause).await;
                    }
                    Ok(DeleteOutcome::Failed { status }) => {
                        summary.failed += 1;
                        emit(
                            &self.events,
                            &mut seq,
                            SweepEventKind::DeleteFailed { index, status },
                        );
                    }
                    Err(e) => {
                        summary.failed += 1;
                        emit(
                            &self.events,
                            &mut seq,
                            SweepEventKind::Warning {
                                message: format!("delete request failed: {e}"),
                            },
                        );
                    }
                }

                let pause = self.jitter();
                emit(
                    &self.events,
                    &mut seq,
                    SweepEventKind::Pacing {
                        sleep_ms: pause.as_millis() as u64,
                    },
                );
                tokio::time::sleep(pause).await;
            }

            summary.batches = batch;

            // A dry run deletes nothing, so the next fetch would return the
            // same page forever. One page is enough of a preview.
            if self.cfg.dry_run {
                break;
            }

            batch += 1;
            tokio::time::sleep(self.cfg.batch_pause).await;
        }

        emit(
            &self.events,
            &mut seq,
            SweepEventKind::SweepComplete {
                batches: summary.batches,
                deleted: summary.deleted,
                failed: summary.failed,
                skipped: summary.skipped,
            },
        );
        Ok(summary)
    }

    /// Uniform sleep in `[delete_delay_min, delete_delay_max]`. Jitter keeps
    /// the request cadence from looking mechanical to the platform.
    fn jitter(&self) -> Duration {
        let min = self.cfg.delete_delay_min;
        let max = self.cfg.delete_delay_max;
        if max <= min {
            return min;
        }
        let ms = rand::thread_rng().gen_range(min.as_millis() as u64..=max.as_millis() as u64);
        Duration::from_millis(ms)
    }
}
