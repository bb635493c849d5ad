//! The gather loop: polls the fleet and owns the stats table.

mod poller;

pub use poller::*;

use crate::config::ServerConfig;
use crate::restconf::{build_http_client, ClientError, PtpStatus, SwitchClient, SwitchTarget};
use crate::stats::SwitchStats;

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{watch, RwLock};
use tokio::time::MissedTickBehavior;

/// Shared handle to the fleet's stats table.
///
/// The aggregator holds the only write path; every other reader takes a
/// read guard, so consumers never observe a half-merged round.
pub type StatsTable = Arc<RwLock<Vec<SwitchStats>>>;

/// Fatal gather-phase errors. Steady-state fetch failures are recorded per
/// switch instead and never surface here.
#[derive(Error, Debug)]
pub enum GatherError {
    #[error("transport setup failed: {0}")]
    Client(#[from] ClientError),
    #[error("bootstrap fetch from {address} failed: {source}")]
    Bootstrap {
        address: String,
        source: ClientError,
    },
}

/// Owns the stats table and drives the poll cadence.
pub struct Aggregator {
    clients: Vec<SwitchClient>,
    table: StatsTable,
    ready_tx: watch::Sender<bool>,
    poll_interval: Duration,
}

impl Aggregator {
    /// Fetch every switch's identity and build the aligned stats table.
    ///
    /// Any switch that cannot be introspected here is fatal: the loop has
    /// no identity to attribute statistics to, so configuration and
    /// connectivity problems surface immediately instead of limping along.
    pub async fn bootstrap(
        cfg: &ServerConfig,
        targets: Vec<SwitchTarget>,
    ) -> Result<Self, GatherError> {
        let http = build_http_client(cfg.request_timeout)?;
        let clients: Vec<SwitchClient> = targets
            .into_iter()
            .map(|t| SwitchClient::new(t, http.clone()))
            .collect();

        tracing::info!("Fetching identity from {} switches", clients.len());
        let mut slots: Vec<Option<SwitchStats>> = clients.iter().map(|_| None).collect();
        let outcomes = poll_round(&clients, |c| async move { c.info().await }).await;
        for outcome in outcomes {
            let info = outcome.result.map_err(|source| GatherError::Bootstrap {
                address: clients[outcome.idx].address().to_string(),
                source,
            })?;
            tracing::info!("Switch {} is {}", info.address, info.hostname);
            slots[outcome.idx] = Some(SwitchStats::new(info, &cfg.offset_buckets));
        }
        // Every index received exactly one outcome above.
        let table: Vec<SwitchStats> = slots.into_iter().flatten().collect();

        let (ready_tx, _) = watch::channel(false);
        Ok(Self {
            clients,
            table: Arc::new(RwLock::new(table)),
            ready_tx,
            poll_interval: cfg.poll_interval,
        })
    }

    pub fn table(&self) -> StatsTable {
        self.table.clone()
    }

    /// Readiness handle: flips to `true` once the first full round has
    /// merged, and never changes again.
    pub fn ready_rx(&self) -> watch::Receiver<bool> {
        self.ready_tx.subscribe()
    }

    /// Poll the fleet forever at the configured cadence.
    ///
    /// Ticks are scheduled from each round's start: a fast round still
    /// waits out the full interval, and an overrunning round delays the
    /// next tick instead of bursting to catch up.
    pub async fn run(self) {
        let mut signaled = false;
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let outcomes = poll_round(&self.clients, |c| async move { c.ptp_status().await }).await;
            {
                let mut table = self.table.write().await;
                merge_round(&mut table, outcomes);
            }
            if !signaled {
                let _ = self.ready_tx.send(true);
                signaled = true;
                tracing::info!("First poll round merged; fleet snapshot ready");
            }
        }
    }
}

/// Fold a round's outcomes into the table, slot by originating index.
pub fn merge_round(table: &mut [SwitchStats], outcomes: Vec<PollOutcome<PtpStatus>>) {
    for outcome in outcomes {
        table[outcome.idx].record(outcome.result, outcome.elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restconf::{SwitchInfo, SyncState};

    fn table_of(n: usize) -> Vec<SwitchStats> {
        (0..n)
            .map(|i| {
                SwitchStats::new(
                    SwitchInfo {
                        address: format!("10.0.0.{}", i + 1),
                        ..Default::default()
                    },
                    &[-50, 0, 50],
                )
            })
            .collect()
    }

    fn locked(offset_ns: i64) -> PtpStatus {
        PtpStatus {
            sync_state: SyncState::Locked,
            offset_ns,
            grandmaster_id: "GM1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn merge_writes_each_outcome_to_its_slot() {
        let mut table = table_of(3);
        // Outcomes arrive out of dispatch order; only idx correlates.
        let outcomes = vec![
            PollOutcome {
                idx: 2,
                result: Ok(locked(10)),
                elapsed: Duration::from_millis(2),
            },
            PollOutcome {
                idx: 0,
                result: Err(ClientError::Protocol("down".to_string())),
                elapsed: Duration::from_millis(5),
            },
            PollOutcome {
                idx: 1,
                result: Ok(locked(-10)),
                elapsed: Duration::from_millis(1),
            },
        ];
        merge_round(&mut table, outcomes);

        assert_eq!(table[0].error_count, 1);
        assert!(table[0].last_status.is_none());
        assert_eq!(table[1].last_status.as_ref().unwrap().offset_ns, -10);
        assert_eq!(table[2].last_status.as_ref().unwrap().offset_ns, 10);
        assert!(table.iter().all(|s| s.poll_count == 1));
    }

    #[tokio::test]
    async fn ready_latch_fires_exactly_once() {
        let (tx, mut rx) = watch::channel(false);
        let mut signaled = false;
        for _ in 0..5 {
            // The latch the run loop uses after each merged round.
            if !signaled {
                let _ = tx.send(true);
                signaled = true;
            }
        }
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());
        assert!(!rx.has_changed().unwrap());
    }
}
