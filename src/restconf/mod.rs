//! RESTCONF client for the switch management API.
//!
//! Talks HTTPS to each switch's management endpoint and maps the vendor
//! payloads into the neutral types the rest of the crate consumes.

mod client;
mod dell;

pub use client::*;

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// One managed switch and its credentials, as loaded from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchTarget {
    pub address: String,
    pub username: String,
    pub password: String,
}

/// Client error types.
///
/// Transport failures and malformed payloads are deliberately one enum:
/// the aggregator records and retries both the same way.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status: {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// PTP servo synchronization state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    Locked,
    Acquiring,
    Holdover,
    #[default]
    Unknown,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncState::Locked => "locked",
            SyncState::Acquiring => "acquiring",
            SyncState::Holdover => "holdover",
            SyncState::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Point-in-time PTP observation from one switch.
#[derive(Debug, Clone, Default)]
pub struct PtpStatus {
    pub sync_state: SyncState,
    /// Offset from the grandmaster clock, nanoseconds.
    pub offset_ns: i64,
    /// steps-removed from the grandmaster.
    pub hops: u32,
    pub grandmaster_id: String,
    pub local_clock_id: String,
}

/// Switch identity, fetched once at startup.
#[derive(Debug, Clone, Default)]
pub struct SwitchInfo {
    pub address: String,
    pub hostname: String,
    pub vendor: String,
    pub model: String,
    pub sw_version: String,
}
