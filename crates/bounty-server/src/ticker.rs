//! Optional server-side no-show countdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::service::MarketplaceService;

/// Count down accepted bounties every `interval` in the background.
///
/// Each tick subtracts the interval in whole seconds (at least one).
pub fn spawn_ticker(service: Arc<MarketplaceService>, interval: Duration) -> JoinHandle<()> {
    let seconds = u32::try_from(interval.as_secs()).unwrap_or(u32::MAX).max(1);
    info!(seconds, "Background ticker started");

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(interval);
        interval.tick().await; // Skip first immediate tick
        loop {
            interval.tick().await;
            match service.tick_accepted_bounties(seconds).await {
                Ok(bounties) => debug!(count = bounties.len(), "Background tick completed"),
                Err(e) => warn!(error = %e, "Background tick failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bounty_core::model::{CreateBountyInput, CreatePropertyInput, UiSettings, WorkerStatus};

    use crate::store::MemoryStore;

    #[tokio::test(start_paused = true)]
    async fn ticker_counts_down_accepted_bounty() {
        let service = Arc::new(MarketplaceService::new(
            Arc::new(MemoryStore::new()),
            UiSettings::default(),
        ));
        let property = service
            .add_property(CreatePropertyInput {
                address: "1 Elm".into(),
                city: "Austin, TX".into(),
                zip_code: "78702".into(),
                gate_code: String::new(),
                instructions: String::new(),
                location: None,
            })
            .await
            .unwrap();
        let bounty = service
            .create_bounty(CreateBountyInput {
                property_id: property.id,
                title: "Mow lawn".into(),
                description: String::new(),
                price: 40,
                kind: "Landscaping".into(),
                tenant_bridge_enabled: true,
                recursive_scheduling_enabled: false,
                recurrence_cadence: None,
                deadline_at: None,
                image_urls: vec![],
            })
            .await
            .unwrap();
        service.accept_bounty(&bounty.id, "w1").await.unwrap();

        let handle = spawn_ticker(Arc::clone(&service), Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(35)).await;
        handle.abort();

        let stored = service.get_bounty(&bounty.id).await.unwrap();
        assert_eq!(stored.worker_status, WorkerStatus::Accepted);
        assert_eq!(stored.timer_seconds_remaining, 1800 - 30);
    }
}
