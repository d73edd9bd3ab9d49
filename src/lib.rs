// Copyright 2026 Chatsweep Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chatsweep library — bulk-delete your own messages from a chat channel by
//! replaying an authenticated browser session.
//!
//! The binary wires these modules together; the library crate exposes them
//! for integration testing.

pub mod cli;
pub mod fetchcmd;
pub mod http;
pub mod message;
pub mod platform;
pub mod progress;
pub mod sniffer;
pub mod sweep;
