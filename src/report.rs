//! Periodic console report over the fleet snapshot.

use crate::gather::StatsTable;
use crate::stats::{pct, SwitchStats};

use chrono::Utc;
use std::fmt::Write;
use std::time::Duration;
use tokio::sync::watch;

/// Render the human-readable fleet report.
pub fn render_report(stats: &[SwitchStats]) -> String {
    let mut out = format!("--- {} ---\n", Utc::now().to_rfc3339());
    for stat in stats {
        render_switch(&mut out, stat);
    }
    out
}

fn render_switch(out: &mut String, stat: &SwitchStats) {
    match &stat.last_status {
        Some(status) => {
            let _ = writeln!(
                out,
                "{} ({}) {} to {} offset {}",
                stat.info.address,
                stat.info.hostname,
                status.sync_state,
                status.grandmaster_id,
                status.offset_ns
            );
            let _ = writeln!(
                out,
                "  local clock {}, {} hops from grandmaster",
                status.local_clock_id, status.hops
            );
        }
        None => {
            let _ = writeln!(out, "{} ({}) no status yet", stat.info.address, stat.info.hostname);
        }
    }
    let _ = writeln!(
        out,
        "  {} {} running {}",
        stat.info.vendor, stat.info.model, stat.info.sw_version
    );
    let _ = writeln!(
        out,
        "  Lock reliability: {}/{} = {:.1}%",
        stat.lock_count,
        stat.poll_count,
        stat.lock_reliability_pct()
    );
    for (gm, count) in &stat.lock_by_grandmaster {
        let _ = writeln!(
            out,
            "    {} {}/{} = {:.1}%",
            gm,
            count,
            stat.lock_count,
            pct(*count, stat.lock_count)
        );
    }
    if let Some(err) = &stat.last_error {
        let _ = writeln!(out, "  Last error: {}", err);
    }
    let (header, counts, means) = stat.offsets.render();
    let _ = writeln!(out, "  {}\n  {}\n  {}", header, counts, means);
}

/// Start the background reporter: waits for the first snapshot, then prints
/// the fleet report at a fixed cadence.
pub fn spawn_reporter(table: StatsTable, mut ready: watch::Receiver<bool>, interval: Duration) {
    tokio::spawn(async move {
        if ready.wait_for(|ready| *ready).await.is_err() {
            return;
        }
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let table = table.read().await;
            print!("{}", render_report(&table));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restconf::{PtpStatus, SwitchInfo, SyncState};
    use std::time::Duration;

    fn sample_stats() -> SwitchStats {
        let mut stats = SwitchStats::new(
            SwitchInfo {
                address: "10.0.0.1".to_string(),
                hostname: "leaf01".to_string(),
                vendor: "Dell EMC".to_string(),
                model: "S5248F-ON".to_string(),
                sw_version: "10.5.4".to_string(),
            },
            &[-50, 0, 50],
        );
        for offset in [-10, 10, 20] {
            stats.record(
                Ok(PtpStatus {
                    sync_state: SyncState::Locked,
                    offset_ns: offset,
                    grandmaster_id: "GM1".to_string(),
                    ..Default::default()
                }),
                Duration::from_millis(2),
            );
        }
        stats.record(
            Err(crate::restconf::ClientError::Protocol("down".to_string())),
            Duration::from_millis(2),
        );
        stats
    }

    #[test]
    fn report_covers_identity_and_reliability() {
        let report = render_report(&[sample_stats()]);
        assert!(report.contains("10.0.0.1 (leaf01) locked to GM1 offset 20"));
        assert!(report.contains("Dell EMC S5248F-ON running 10.5.4"));
        assert!(report.contains("Lock reliability: 3/4 = 75.0%"));
        assert!(report.contains("GM1 3/3 = 100.0%"));
        assert!(report.contains("Last error: protocol error: down"));
        assert!(report.contains("[-50, 0)"));
    }

    #[test]
    fn report_handles_switch_with_no_status() {
        let stats = SwitchStats::new(
            SwitchInfo {
                address: "10.0.0.9".to_string(),
                hostname: "spine02".to_string(),
                ..Default::default()
            },
            &[-50, 0, 50],
        );
        let report = render_report(&[stats]);
        assert!(report.contains("10.0.0.9 (spine02) no status yet"));
        assert!(report.contains("Lock reliability: 0/0 = 0.0%"));
    }
}
