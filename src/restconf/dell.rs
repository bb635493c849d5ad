//! Dell OS10 RESTCONF payload mapping.

use super::{ClientError, PtpStatus, SwitchClient, SwitchInfo, SyncState};

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct DefaultDs {
    #[serde(rename = "clock-identity", default)]
    clock_id: String,
}

#[derive(Debug, Deserialize)]
struct CurrentDs {
    /// Offset arrives as a decimal string.
    #[serde(rename = "offset-from-master", default)]
    offset: String,
    #[serde(rename = "steps-removed", default)]
    steps: u32,
}

#[derive(Debug, Deserialize)]
struct ParentDs {
    #[serde(rename = "grandmaster-identity", default)]
    grandmaster_id: String,
}

#[derive(Debug, Deserialize)]
struct ServoStatus {
    #[serde(rename = "servo-state", default)]
    state: String,
}

#[derive(Debug, Deserialize)]
struct ClockDs {
    #[serde(rename = "default-ds")]
    local: DefaultDs,
    #[serde(rename = "current-ds")]
    current: CurrentDs,
}

#[derive(Debug, Deserialize)]
struct DellPtpState {
    #[serde(rename = "clock-ds")]
    clock_ds: ClockDs,
    #[serde(rename = "parent-ds")]
    parent: ParentDs,
    #[serde(rename = "servo-status")]
    servo: ServoStatus,
}

#[derive(Debug, Deserialize)]
struct DellSystem {
    #[serde(default)]
    hostname: String,
}

#[derive(Debug, Deserialize)]
struct DellSoftware {
    #[serde(rename = "sw-version", default)]
    version: String,
    #[serde(rename = "sw-platform", default)]
    platform: String,
}

fn sync_state_from_servo(state: &str) -> SyncState {
    match state {
        "locked" => SyncState::Locked,
        "acquiring" => SyncState::Acquiring,
        "holdover" => SyncState::Holdover,
        _ => SyncState::Unknown,
    }
}

fn status_from_payload(state: DellPtpState) -> Result<PtpStatus, ClientError> {
    let offset_ns = state
        .clock_ds
        .current
        .offset
        .parse::<i64>()
        .map_err(|e| {
            ClientError::Protocol(format!(
                "bad offset {:?}: {}",
                state.clock_ds.current.offset, e
            ))
        })?;
    Ok(PtpStatus {
        sync_state: sync_state_from_servo(&state.servo.state),
        offset_ns,
        hops: state.clock_ds.current.steps,
        grandmaster_id: state.parent.grandmaster_id,
        local_clock_id: state.clock_ds.local.clock_id,
    })
}

impl SwitchClient {
    /// Fetch the switch's identity. Called once at startup.
    pub async fn info(&self) -> Result<SwitchInfo, ClientError> {
        let sys: DellSystem = self
            .fetch_and_unwrap("dell-system:system", "dell-system:system")
            .await?;
        let sw: DellSoftware = self
            .fetch_and_unwrap("dell-system-software:software", "dell-system-software:software")
            .await?;
        Ok(SwitchInfo {
            address: self.address().to_string(),
            hostname: sys.hostname,
            vendor: "Dell EMC".to_string(),
            model: sw.platform,
            sw_version: sw.version,
        })
    }

    /// Fetch the current PTP servo status.
    pub async fn ptp_status(&self) -> Result<PtpStatus, ClientError> {
        let state: DellPtpState = self.fetch_and_unwrap("dell-ptp:ptp-ds", "dell-ptp:ptp-ds").await?;
        status_from_payload(state)
    }
}
