use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{error, info};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::domain::payment::PaymentRequest;
use crate::domain::processor_client::ProcessorClient;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::http::reqwest_processor_client::ReqwestProcessorClient;
use crate::infrastructure::queue::ingestion_queue::IngestionQueue;
use crate::infrastructure::routing::processor_router::ProcessorRouter;
use crate::infrastructure::stats::payment_stats::PaymentStats;
use crate::infrastructure::workers::dispatch_worker_pool::{
	DispatchWorkerPool, PoolSettings,
};
use crate::infrastructure::workers::processor_health_monitor_worker::processor_health_monitor_worker;
use crate::use_cases::create_payment::{CreatePaymentUseCase, SubmitError};
use crate::use_cases::dto::{ShutdownReport, SummarySnapshot};
use crate::use_cases::get_payment_summary::GetPaymentSummaryUseCase;
use crate::use_cases::health_check::HealthCheckUseCase;
use crate::use_cases::process_payment::ProcessPaymentUseCase;

pub type HttpPaymentEngine = PaymentEngine<ReqwestProcessorClient>;

#[derive(Debug, Clone)]
pub struct EngineSettings {
	pub default_processor_url:  String,
	pub fallback_processor_url: String,
	pub queue_capacity:         usize,
	pub failure_threshold:      u32,
	pub probe_interval:         Duration,
	pub pool:                   PoolSettings,
}

impl From<&Config> for EngineSettings {
	fn from(config: &Config) -> Self {
		Self {
			default_processor_url:  config.default_payment_processor_url.clone(),
			fallback_processor_url: config.fallback_payment_processor_url.clone(),
			queue_capacity:         config.queue_capacity,
			failure_threshold:      config.failure_threshold,
			probe_interval:         config.probe_interval(),
			pool:                   PoolSettings {
				worker_count:         config
					.worker_count
					.unwrap_or_else(PoolSettings::default_worker_count),
				batch_size:           config.batch_size,
				flush_interval:       config.flush_interval(),
				max_concurrent_sends: config.max_concurrent_sends,
			},
		}
	}
}

struct HealthMonitorHandle {
	shutdown_tx: broadcast::Sender<()>,
	task:        JoinHandle<()>,
}

/// The interface the HTTP layer and the process lifecycle call into.
pub struct PaymentEngine<C: ProcessorClient> {
	queue:               Arc<IngestionQueue<PaymentRequest>>,
	router:              Arc<ProcessorRouter>,
	probe_interval:      Duration,
	create_payment:      CreatePaymentUseCase,
	get_payment_summary: GetPaymentSummaryUseCase,
	health_check:        HealthCheckUseCase<C>,
	pool:                tokio::sync::Mutex<DispatchWorkerPool<C>>,
	health_monitor:      Mutex<Option<HealthMonitorHandle>>,
}

impl<C: ProcessorClient> PaymentEngine<C> {
	pub fn new(client: Arc<C>, settings: EngineSettings) -> Self {
		let queue = Arc::new(IngestionQueue::new(settings.queue_capacity));
		let stats = Arc::new(PaymentStats::new());
		let router = Arc::new(ProcessorRouter::new(
			settings.default_processor_url,
			settings.fallback_processor_url,
			settings.failure_threshold,
		));

		let process_payment =
			ProcessPaymentUseCase::new(client.clone(), router.clone(), stats.clone());
		let pool = DispatchWorkerPool::new(
			queue.clone(),
			process_payment,
			stats.clone(),
			settings.pool,
		);

		Self {
			create_payment: CreatePaymentUseCase::new(queue.clone()),
			get_payment_summary: GetPaymentSummaryUseCase::new(stats),
			health_check: HealthCheckUseCase::new(client, router.clone()),
			queue,
			router,
			probe_interval: settings.probe_interval,
			pool: tokio::sync::Mutex::new(pool),
			health_monitor: Mutex::new(None),
		}
	}

	/// Starts the dispatch workers.
	pub async fn start(&self) {
		self.pool.lock().await.start();
	}

	/// Non-blocking admission. Either the payment is queued or the caller
	/// gets an immediate rejection.
	pub fn submit(&self, payment: PaymentRequest) -> Result<(), SubmitError> {
		self.create_payment.execute(payment)
	}

	pub fn get_summary(&self) -> SummarySnapshot {
		self.get_payment_summary.execute()
	}

	pub fn queue_depth(&self) -> usize {
		self.queue.len()
	}

	pub fn router(&self) -> &ProcessorRouter {
		&self.router
	}

	/// Spawns the health probe loop. Calling it again while it runs does
	/// nothing.
	pub fn start_health_checker(&self) {
		let mut health_monitor = self
			.health_monitor
			.lock()
			.unwrap_or_else(PoisonError::into_inner);
		if health_monitor.is_some() {
			return;
		}

		let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
		let task = tokio::spawn(processor_health_monitor_worker(
			self.health_check.clone(),
			self.probe_interval,
			shutdown_rx,
		));
		info!(
			"Processor health monitor started (every {:?})",
			self.probe_interval
		);

		*health_monitor = Some(HealthMonitorHandle { shutdown_tx, task });
	}

	/// Stops the probe loop, then shuts the worker pool down within
	/// `deadline`.
	pub async fn stop(&self, deadline: Duration) -> ShutdownReport {
		let health_monitor = self
			.health_monitor
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.take();
		if let Some(HealthMonitorHandle { shutdown_tx, task }) = health_monitor {
			let _ = shutdown_tx.send(());
			if let Err(e) = task.await {
				error!("Processor health monitor terminated abnormally: {e}");
			}
		}

		self.pool.lock().await.stop(deadline).await
	}
}
