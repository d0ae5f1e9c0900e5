//! Periodic Runner
//!
//! Runs a closure once and then again every period until a
//! [`CancellationToken`] fires. Cancellation is checked between runs; a
//! running closure is never interrupted.

use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

/// Supplies the wait before the next run
pub trait Backoff: Send {
    fn next_backoff(&mut self) -> Duration;
}

/// Fixed-period backoff
#[derive(Debug, Clone, Copy)]
pub struct SimpleBackoff {
    period: Duration,
}

impl SimpleBackoff {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }
}

impl Backoff for SimpleBackoff {
    fn next_backoff(&mut self) -> Duration {
        self.period
    }
}

/// Run `f` every `period` measured from the end of the previous run.
pub async fn until<F>(token: CancellationToken, f: F, period: Duration)
where
    F: FnMut(),
{
    backoff_until(token, f, SimpleBackoff::new(period), true).await
}

/// Run `f` every `period` measured from the start of the previous run.
pub async fn non_sliding_until<F>(token: CancellationToken, f: F, period: Duration)
where
    F: FnMut(),
{
    backoff_until(token, f, SimpleBackoff::new(period), false).await
}

/// Run `f` every `period` for as long as the task is alive.
pub async fn forever<F>(f: F, period: Duration, sliding: bool)
where
    F: FnMut(),
{
    backoff_until(
        CancellationToken::new(),
        f,
        SimpleBackoff::new(period),
        sliding,
    )
    .await
}

/// Run `f` repeatedly, waiting as long as `backoff` says between runs.
///
/// With `sliding` the wait starts after `f` returns; otherwise it starts
/// when `f` is invoked, so the run time eats into the period.
pub async fn backoff_until<F, B>(token: CancellationToken, mut f: F, mut backoff: B, sliding: bool)
where
    F: FnMut(),
    B: Backoff,
{
    loop {
        if token.is_cancelled() {
            return;
        }

        let started = Instant::now();
        f();

        let deadline = if sliding {
            Instant::now() + backoff.next_backoff()
        } else {
            started + backoff.next_backoff()
        };

        tokio::select! {
            _ = token.cancelled() => return,
            _ = sleep_until(deadline) => {}
        }
    }
}
