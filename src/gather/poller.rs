//! Concurrent fan-out/fan-in poll rounds.

use crate::restconf::ClientError;

use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// The outcome of one operation against one target.
///
/// `idx` is the target's position in the input list and is the only
/// correlation key; completion order carries no meaning.
#[derive(Debug)]
pub struct PollOutcome<T> {
    pub idx: usize,
    pub result: Result<T, ClientError>,
    pub elapsed: Duration,
}

/// Run `op` against every item concurrently and wait for all of them.
///
/// Returns one outcome per item. A failing item never cancels the others;
/// the round only completes once every task has reported back. The channel
/// closes when the last task drops its sender, which is the join barrier.
pub async fn poll_round<C, T, F, Fut>(items: &[C], op: F) -> Vec<PollOutcome<T>>
where
    C: Clone,
    F: Fn(C) -> Fut,
    Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    T: Send + 'static,
{
    let (tx, mut rx) = mpsc::channel(items.len().max(1));
    for (idx, item) in items.iter().enumerate() {
        let tx = tx.clone();
        let fut = op(item.clone());
        tokio::spawn(async move {
            let start = Instant::now();
            let result = fut.await;
            let _ = tx
                .send(PollOutcome {
                    idx,
                    result,
                    elapsed: start.elapsed(),
                })
                .await;
        });
    }
    drop(tx);

    let mut outcomes = Vec::with_capacity(items.len());
    while let Some(outcome) = rx.recv().await {
        outcomes.push(outcome);
    }
    outcomes
}
