use std::sync::Arc;

use futures::future::join_all;
use log::debug;

use crate::domain::payment_processor::ProcessorId;
use crate::domain::processor_client::ProcessorClient;
use crate::infrastructure::routing::processor_router::ProcessorRouter;

pub struct HealthCheckUseCase<C: ProcessorClient> {
	client: Arc<C>,
	router: Arc<ProcessorRouter>,
}

impl<C: ProcessorClient> Clone for HealthCheckUseCase<C> {
	fn clone(&self) -> Self {
		Self {
			client: self.client.clone(),
			router: self.router.clone(),
		}
	}
}

impl<C: ProcessorClient> HealthCheckUseCase<C> {
	pub fn new(client: Arc<C>, router: Arc<ProcessorRouter>) -> Self {
		Self { client, router }
	}

	/// Probes every open processor concurrently and closes the breaker of
	/// those that answer. Returns the processors that were restored.
	pub async fn execute(&self) -> Vec<ProcessorId> {
		let open = self.router.open_processors();
		if open.is_empty() {
			return Vec::new();
		}

		let probes = open.iter().map(|endpoint| async move {
			(endpoint.id, self.client.probe(endpoint).await)
		});

		let mut restored = Vec::new();
		for (id, healthy) in join_all(probes).await {
			if healthy {
				self.router.mark_healthy(id);
				restored.push(id);
			} else {
				debug!("{id} processor still unavailable");
			}
		}

		restored
	}
}
