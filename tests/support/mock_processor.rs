#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use payment_dispatcher::domain::payment::PaymentRequest;
use payment_dispatcher::engine::{EngineSettings, HttpPaymentEngine, PaymentEngine};
use payment_dispatcher::infrastructure::http::reqwest_processor_client::{
	ReqwestProcessorClient, build_http_client,
};
use payment_dispatcher::infrastructure::workers::dispatch_worker_pool::PoolSettings;
use payment_dispatcher::use_cases::dto::SummarySnapshot;
use tokio::net::TcpListener;
use tokio::time::{Instant, sleep};

pub fn processor_client(send_timeout: Duration) -> ReqwestProcessorClient {
	ReqwestProcessorClient::new(
		build_http_client().unwrap(),
		send_timeout,
		Duration::from_millis(200),
	)
}

pub struct EngineOptions {
	pub queue_capacity:       usize,
	pub worker_count:         usize,
	pub max_concurrent_sends: usize,
	pub probe_interval:       Duration,
}

impl Default for EngineOptions {
	fn default() -> Self {
		Self {
			queue_capacity:       1_000,
			worker_count:         1,
			max_concurrent_sends: 1,
			probe_interval:       Duration::from_secs(60),
		}
	}
}

pub fn engine(
	default_url: &str,
	fallback_url: &str,
	options: EngineOptions,
) -> HttpPaymentEngine {
	PaymentEngine::new(
		Arc::new(processor_client(Duration::from_millis(500))),
		EngineSettings {
			default_processor_url:  default_url.to_string(),
			fallback_processor_url: fallback_url.to_string(),
			queue_capacity:         options.queue_capacity,
			failure_threshold:      3,
			probe_interval:         options.probe_interval,
			pool:                   PoolSettings {
				worker_count:         options.worker_count,
				batch_size:           10,
				flush_interval:       Duration::from_millis(20),
				max_concurrent_sends: options.max_concurrent_sends,
			},
		},
	)
}

pub fn payment(amount: i64) -> PaymentRequest {
	PaymentRequest {
		amount,
		description: None,
		kind: "credit".to_string(),
	}
}

/// Polls the engine until `expected` payments reached a terminal outcome or
/// five seconds passed.
pub async fn wait_for_finished(
	engine: &HttpPaymentEngine,
	expected: u64,
) -> SummarySnapshot {
	let deadline = Instant::now() + Duration::from_secs(5);
	loop {
		let summary = engine.get_summary();
		let finished =
			summary.default_success + summary.fallback_success + summary.total_errors;
		if finished >= expected || Instant::now() >= deadline {
			return summary;
		}
		sleep(Duration::from_millis(10)).await;
	}
}

pub async fn wait_until(condition: impl Fn() -> bool) -> bool {
	let deadline = Instant::now() + Duration::from_secs(5);
	while Instant::now() < deadline {
		if condition() {
			return true;
		}
		sleep(Duration::from_millis(10)).await;
	}
	condition()
}

/// Accepts connections and never answers them.
pub async fn unresponsive_processor() -> String {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	tokio::spawn(async move {
		let mut connections = Vec::new();
		while let Ok((socket, _)) = listener.accept().await {
			connections.push(socket);
		}
	});
	format!("http://{addr}")
}

/// A local address nothing listens on.
pub fn unreachable_processor() -> String {
	let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
	let addr = listener.local_addr().unwrap();
	drop(listener);
	format!("http://{addr}")
}
