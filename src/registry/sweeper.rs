//! Background Sweeper
//!
//! Background task that periodically sweeps every registered store.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{wait, Registry};

/// Handle to the running sweep task
pub struct Sweeper {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Spawn the sweep loop as a background task
    pub fn spawn(registry: Registry) -> Self {
        let token = CancellationToken::new();
        let interval = registry.interval();
        let stop = token.clone();

        let handle = tokio::spawn(async move {
            info!("Sweeper started, interval: {:?}", interval);
            wait::until(
                stop,
                move || {
                    registry.sweep_all();
                },
                interval,
            )
            .await;
            info!("Sweeper stopped");
        });

        Self { token, handle }
    }

    /// Ask the loop to exit after the current pass
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Stop the loop and wait for it to exit
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(err) = self.handle.await {
            warn!(error = %err, "Sweeper task did not exit cleanly");
        }
    }

    /// Check if the sweep task has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
