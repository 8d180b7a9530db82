//! One-second no-show countdown driven from the client.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::{ApiClient, ClientError};
use crate::store::{Action, ClientStore};

/// Ticks the server while some accepted bounty still has time left.
pub struct TickPoller {
    api: ApiClient,
    store: Arc<Mutex<ClientStore>>,
    period: Duration,
}

impl TickPoller {
    pub const fn new(api: ApiClient, store: Arc<Mutex<ClientStore>>) -> Self {
        Self {
            api,
            store,
            period: Duration::from_secs(1),
        }
    }

    #[must_use]
    pub const fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// One poll. Returns `true` when the server was ticked.
    ///
    /// Nothing is sent while the store is empty or no timer is running.
    pub async fn poll_once(&self) -> Result<bool, ClientError> {
        let running = self
            .store
            .lock()
            .await
            .snapshot()
            .is_some_and(bounty_core::model::Snapshot::has_running_timers);
        if !running {
            return Ok(false);
        }

        let bounties = self.api.tick(1).await?;
        debug!(count = bounties.len(), "Ticked accepted bounties");
        self.store.lock().await.dispatch(Action::SetBounties(bounties));
        Ok(true)
    }

    /// Poll every period until the handle is aborted.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.period);
            interval.tick().await; // Skip first immediate tick
            loop {
                interval.tick().await;
                if let Err(e) = self.poll_once().await {
                    warn!(error = %e, "Tick poll failed");
                }
            }
        })
    }
}
