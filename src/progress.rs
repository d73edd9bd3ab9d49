// Copyright 2026 Chatsweep Contributors
// SPDX-License-Identifier: Apache-2.0

//! Sweep event types and broadcast channel.
//!
//! The sweep engine emits [`SweepEvent`]s which flow through a
//! `tokio::sync::broadcast` channel to any subscriber (CLI renderer, tests).
//! When no subscriber exists, events are silently dropped.

use serde::{Deserialize, Serialize};

/// An event emitted during a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepEvent {
    /// Monotonically increasing sequence number.
    pub seq: u64,
    /// What happened.
    pub event: SweepEventKind,
}

/// The specific kind of sweep event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SweepEventKind {
    /// A page of messages was fetched.
    BatchFetched { batch: u32, count: usize },
    /// Deletion of a fetched batch is starting after the cooldown.
    BatchDeleting { batch: u32, count: usize },
    /// One message was deleted.
    MessageDeleted {
        index: usize,
        total: usize,
        preview: String,
    },
    /// Dry run: this message would have been deleted.
    WouldDelete {
        index: usize,
        total: usize,
        preview: String,
    },
    /// A deletion came back with a non-success status.
    DeleteFailed { index: usize, status: u16 },
    /// The platform rate-limited a deletion; the engine pauses extra.
    RateLimited { pause_ms: u64 },
    /// Pacing sleep between deletions.
    Pacing { sleep_ms: u64 },
    /// The channel reported no more messages, or the batch cap was reached.
    SweepComplete {
        batches: u32,
        deleted: u64,
        failed: u64,
        skipped: u64,
    },
    /// A non-fatal warning.
    Warning { message: String },
}

/// Sender handle for emitting sweep events.
pub type SweepSender = tokio::sync::broadcast::Sender<SweepEvent>;

/// Receiver handle for consuming sweep events.
pub type SweepReceiver = tokio::sync::broadcast::Receiver<SweepEvent>;

/// Create a sweep event channel with a bounded buffer.
///
/// 256 events covers a full page of deletions plus pacing events; a slow
/// subscriber lags rather than blocking the engine.
pub fn channel() -> (SweepSender, SweepReceiver) {
    tokio::sync::broadcast::channel(256)
}

/// Emit an event, silently ignoring send errors (no receivers listening).
pub fn emit(tx: &Option<SweepSender>, seq: &mut u64, event: SweepEventKind) {
    if let Some(sender) = tx {
        *seq += 1;
        let _ = sender.send(SweepEvent { seq: *seq, event });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_roundtrip() {
        let event = SweepEvent {
            seq: 3,
            event: SweepEventKind::MessageDeleted {
                index: 1,
                total: 25,
                preview: "hello".to_string(),
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("MessageDeleted"));

        let parsed: SweepEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.seq, 3);
    }

    #[test]
    fn test_channel_no_receivers() {
        let (tx, rx) = channel();
        drop(rx);
        // Should not panic
        emit(
            &Some(tx),
            &mut 0,
            SweepEventKind::Warning {
                message: "test".to_string(),
            },
        );
    }

    #[test]
    fn test_events_reach_subscriber_in_order() {
        tokio_test::block_on(async {
            let (tx, mut rx) = channel();
            let mut seq = 0;
            emit(
                &Some(tx.clone()),
                &mut seq,
                SweepEventKind::BatchFetched { batch: 1, count: 5 },
            );
            emit(
                &Some(tx),
                &mut seq,
                SweepEventKind::BatchDeleting { batch: 1, count: 5 },
            );

            let first = rx.recv().await.unwrap();
            let second = rx.recv().await.unwrap();
            assert_eq!(first.seq, 1);
            assert_eq!(second.seq, 2);
        });
    }

    #[test]
    fn test_emit_none_sender_is_noop() {
        let mut seq = 0;
        emit(
            &None,
            &mut seq,
            SweepEventKind::Warning {
                message: "test".to_string(),
            },
        );
        assert_eq!(seq, 0);
    }
}
