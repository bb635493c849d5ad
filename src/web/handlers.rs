//! HTTP request handlers.

use super::AppState;
use crate::report::render_report;
use crate::restconf::SyncState;
use crate::stats::SwitchStats;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use std::fmt::Write;

pub async fn handle_healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn handle_readyz(State(state): State<AppState>) -> impl IntoResponse {
    if *state.ready.borrow() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "waiting for first poll round")
    }
}

pub async fn handle_report(State(state): State<AppState>) -> impl IntoResponse {
    let table = state.table.read().await;
    render_report(&table)
}

pub async fn handle_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = {
        let table = state.table.read().await;
        render_metrics(&table)
    };
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

/// Render the fleet table in Prometheus text exposition format.
pub fn render_metrics(stats: &[SwitchStats]) -> String {
    let mut out = String::new();

    push_header(&mut out, "ptp_poll_total", "counter", "Poll rounds attempted against the switch.");
    for stat in stats {
        let _ = writeln!(out, "ptp_poll_total{{{}}} {}", switch_labels(stat), stat.poll_count);
    }

    push_header(&mut out, "ptp_poll_errors_total", "counter", "Poll rounds that failed to fetch a status.");
    for stat in stats {
        let _ = writeln!(
            out,
            "ptp_poll_errors_total{{{}}} {}",
            switch_labels(stat),
            stat.error_count
        );
    }

    push_header(&mut out, "ptp_lock_total", "counter", "Poll rounds that found the servo locked.");
    for stat in stats {
        let _ = writeln!(out, "ptp_lock_total{{{}}} {}", switch_labels(stat), stat.lock_count);
    }

    push_header(
        &mut out,
        "ptp_lock_by_grandmaster_total",
        "counter",
        "Locked rounds per grandmaster identity.",
    );
    for stat in stats {
        for (gm, count) in &stat.lock_by_grandmaster {
            let _ = writeln!(
                out,
                "ptp_lock_by_grandmaster_total{{{},grandmaster=\"{}\"}} {}",
                switch_labels(stat),
                escape_label(gm),
                count
            );
        }
    }

    push_header(&mut out, "ptp_locked", "gauge", "Whether the last observation found the servo locked.");
    for stat in stats {
        if let Some(status) = &stat.last_status {
            let locked = if status.sync_state == SyncState::Locked { 1 } else { 0 };
            let _ = writeln!(out, "ptp_locked{{{}}} {}", switch_labels(stat), locked);
        }
    }

    push_header(&mut out, "ptp_offset_ns", "gauge", "Last observed offset from the grandmaster, nanoseconds.");
    for stat in stats {
        if let Some(status) = &stat.last_status {
            let _ = writeln!(out, "ptp_offset_ns{{{}}} {}", switch_labels(stat), status.offset_ns);
        }
    }

    push_header(&mut out, "ptp_hops_from_grandmaster", "gauge", "steps-removed from the grandmaster clock.");
    for stat in stats {
        if let Some(status) = &stat.last_status {
            let _ = writeln!(
                out,
                "ptp_hops_from_grandmaster{{{}}} {}",
                switch_labels(stat),
                status.hops
            );
        }
    }

    push_header(&mut out, "ptp_last_fetch_seconds", "gauge", "Duration of the switch's last status fetch.");
    for stat in stats {
        let _ = writeln!(
            out,
            "ptp_last_fetch_seconds{{{}}} {}",
            switch_labels(stat),
            stat.last_fetch.as_secs_f64()
        );
    }

    push_header(&mut out, "ptp_offset_bucket_count", "gauge", "Offset histogram bucket counts.");
    for stat in stats {
        for (label, count, _) in stat.offsets.buckets() {
            let _ = writeln!(
                out,
                "ptp_offset_bucket_count{{{},bucket=\"{}\"}} {}",
                switch_labels(stat),
                escape_label(&label),
                count
            );
        }
    }

    push_header(
        &mut out,
        "ptp_offset_bucket_mean_ns",
        "gauge",
        "Running mean of the samples routed to each offset bucket.",
    );
    for stat in stats {
        for (label, _, mean) in stat.offsets.buckets() {
            let _ = writeln!(
                out,
                "ptp_offset_bucket_mean_ns{{{},bucket=\"{}\"}} {}",
                switch_labels(stat),
                escape_label(&label),
                mean
            );
        }
    }

    out
}

fn push_header(out: &mut String, name: &str, kind: &str, help: &str) {
    let _ = writeln!(out, "# HELP {} {}", name, help);
    let _ = writeln!(out, "# TYPE {} {}", name, kind);
}

fn switch_labels(stat: &SwitchStats) -> String {
    format!(
        "hostname=\"{}\",address=\"{}\",vendor=\"{}\",model=\"{}\",sw_version=\"{}\"",
        escape_label(&stat.info.hostname),
        escape_label(&stat.info.address),
        escape_label(&stat.info.vendor),
        escape_label(&stat.info.model),
        escape_label(&stat.info.sw_version)
    )
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
