use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};

use crate::domain::attempt::{AttemptOutcome, FailureKind};
use crate::domain::payment::PaymentRequest;
use crate::domain::payment_processor::ProcessorEndpoint;
use crate::domain::processor_client::ProcessorClient;

const MAX_IDLE_CONNECTIONS_PER_HOST: usize = 10;
const IDLE_CONNECTION_TIMEOUT: Duration = Duration::from_secs(90);

/// Shared pooled HTTP client used for both submissions and probes.
pub fn build_http_client() -> reqwest::Result<Client> {
	Client::builder()
		.pool_max_idle_per_host(MAX_IDLE_CONNECTIONS_PER_HOST)
		.pool_idle_timeout(IDLE_CONNECTION_TIMEOUT)
		.build()
}

#[derive(Clone)]
pub struct ReqwestProcessorClient {
	http_client:   Client,
	send_timeout:  Duration,
	probe_timeout: Duration,
}

impl ReqwestProcessorClient {
	pub fn new(
		http_client: Client,
		send_timeout: Duration,
		probe_timeout: Duration,
	) -> Self {
		Self {
			http_client,
			send_timeout,
			probe_timeout,
		}
	}
}

fn classify_error(e: &reqwest::Error) -> FailureKind {
	if e.is_timeout() {
		FailureKind::Timeout
	} else if e.is_connect() {
		FailureKind::Connection
	} else {
		FailureKind::Request
	}
}

fn elapsed_ms(started: Instant) -> u64 {
	u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[async_trait]
impl ProcessorClient for ReqwestProcessorClient {
	async fn send(
		&self,
		endpoint: &ProcessorEndpoint,
		payment: &PaymentRequest,
	) -> AttemptOutcome {
		let started = Instant::now();

		let result = self
			.http_client
			.post(&endpoint.url)
			.timeout(self.send_timeout)
			.json(payment)
			.send()
			.await;

		let latency_ms = elapsed_ms(started);

		match result {
			Ok(resp) => match FailureKind::from_status(resp.status().as_u16()) {
				None => AttemptOutcome::success(endpoint.id, latency_ms),
				Some(kind) => {
					debug!("{} processor returned {}", endpoint.id, resp.status());
					AttemptOutcome::failure(endpoint.id, latency_ms, kind)
				}
			},
			Err(e) => {
				debug!("Failed to reach {} processor: {e}", endpoint.id);
				AttemptOutcome::failure(endpoint.id, latency_ms, classify_error(&e))
			}
		}
	}

	async fn probe(&self, endpoint: &ProcessorEndpoint) -> bool {
		match self
			.http_client
			.get(endpoint.health_url())
			.timeout(self.probe_timeout)
			.send()
			.await
		{
			Ok(resp) => resp.status() == StatusCode::OK,
			Err(e) => {
				debug!("Health probe for {} processor failed: {e}", endpoint.id);
				false
			}
		}
	}
}
