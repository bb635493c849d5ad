//! Per-switch accumulated statistics.

mod histogram;

pub use histogram::Histogram;

use crate::restconf::{ClientError, PtpStatus, SwitchInfo, SyncState};

use std::collections::HashMap;
use std::time::Duration;

/// One switch's accumulated state across all poll rounds.
///
/// Lives in a table index-aligned with the target list for the whole run.
#[derive(Debug, Clone)]
pub struct SwitchStats {
    pub info: SwitchInfo,
    pub last_status: Option<PtpStatus>,
    pub last_error: Option<String>,
    pub last_fetch: Duration,
    pub offsets: Histogram,
    pub poll_count: u64,
    pub error_count: u64,
    pub lock_count: u64,
    pub lock_by_grandmaster: HashMap<String, u64>,
}

impl SwitchStats {
    pub fn new(info: SwitchInfo, offset_buckets: &[i64]) -> Self {
        Self {
            info,
            last_status: None,
            last_error: None,
            last_fetch: Duration::ZERO,
            offsets: Histogram::new(offset_buckets),
            poll_count: 0,
            error_count: 0,
            lock_count: 0,
            lock_by_grandmaster: HashMap::new(),
        }
    }

    /// Fold one poll outcome into the running totals.
    ///
    /// A failed fetch only records the error; the last status, the offset
    /// histogram and the lock counters keep their previous values so a bad
    /// round cannot dilute the statistics.
    pub fn record(&mut self, result: Result<PtpStatus, ClientError>, elapsed: Duration) {
        self.poll_count += 1;
        self.last_fetch = elapsed;
        match result {
            Err(err) => {
                self.last_error = Some(err.to_string());
                self.error_count += 1;
            }
            Ok(status) => {
                if status.sync_state == SyncState::Locked {
                    self.lock_count += 1;
                    *self
                        .lock_by_grandmaster
                        .entry(status.grandmaster_id.clone())
                        .or_insert(0) += 1;
                }
                self.offsets.add(status.offset_ns);
                self.last_status = Some(status);
            }
        }
    }

    /// Share of polls that found the servo locked, in percent.
    pub fn lock_reliability_pct(&self) -> f64 {
        pct(self.lock_count, self.poll_count)
    }
}

pub fn pct(a: u64, b: u64) -> f64 {
    if b == 0 {
        return 0.0;
    }
    (a as f64) * 100.0 / (b as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> SwitchInfo {
        SwitchInfo {
            address: "10.0.0.1".to_string(),
            hostname: "leaf01".to_string(),
            ..Default::default()
        }
    }

    fn locked(offset_ns: i64, gm: &str) -> PtpStatus {
        PtpStatus {
            sync_state: SyncState::Locked,
            offset_ns,
            grandmaster_id: gm.to_string(),
            ..Default::default()
        }
    }

    fn bucket_counts(stats: &SwitchStats) -> Vec<u64> {
        stats.offsets.buckets().map(|(_, c, _)| c).collect()
    }

    #[test]
    fn four_locked_rounds() {
        let mut stats = SwitchStats::new(info(), &[-50, 0, 50]);
        for offset in [-60, -10, 10, 60] {
            stats.record(Ok(locked(offset, "GM1")), Duration::from_millis(3));
        }
        assert_eq!(stats.poll_count, 4);
        assert_eq!(stats.error_count, 0);
        assert_eq!(stats.lock_count, 4);
        assert_eq!(stats.lock_by_grandmaster.get("GM1"), Some(&4));
        assert_eq!(bucket_counts(&stats), vec![1, 1, 1, 1]);
        let means: Vec<f64> = stats.offsets.buckets().map(|(_, _, m)| m).collect();
        assert_eq!(means, vec![-60.0, -10.0, 10.0, 60.0]);
        assert!((stats.lock_reliability_pct() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn failed_round_leaves_statistics_untouched() {
        let mut stats = SwitchStats::new(info(), &[-50, 0, 50]);
        stats.record(Ok(locked(-10, "GM1")), Duration::from_millis(3));

        let before_counts = bucket_counts(&stats);
        stats.record(
            Err(ClientError::Protocol("unreachable".to_string())),
            Duration::from_millis(7),
        );

        assert_eq!(stats.poll_count, 2);
        assert_eq!(stats.error_count, 1);
        assert_eq!(stats.lock_count, 1);
        assert_eq!(bucket_counts(&stats), before_counts);
        // Last status still reflects the successful round.
        assert_eq!(stats.last_status.as_ref().unwrap().offset_ns, -10);
        assert!(stats.last_error.as_ref().unwrap().contains("unreachable"));
        assert_eq!(stats.last_fetch, Duration::from_millis(7));
    }

    #[test]
    fn unlocked_status_updates_histogram_but_not_lock_counters() {
        let mut stats = SwitchStats::new(info(), &[-50, 0, 50]);
        let status = PtpStatus {
            sync_state: SyncState::Acquiring,
            offset_ns: 10,
            ..Default::default()
        };
        stats.record(Ok(status), Duration::from_millis(1));
        assert_eq!(stats.poll_count, 1);
        assert_eq!(stats.lock_count, 0);
        assert!(stats.lock_by_grandmaster.is_empty());
        assert_eq!(bucket_counts(&stats).iter().sum::<u64>(), 1);
    }

    #[test]
    fn pct_of_zero_polls_is_zero() {
        assert_eq!(pct(0, 0), 0.0);
        assert_eq!(pct(1, 4), 25.0);
    }
}
