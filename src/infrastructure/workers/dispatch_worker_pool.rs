use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::StreamExt;
use futures::stream;
use log::{debug, error, info, warn};
use tokio::task::JoinSet;
use tokio::time::{Instant, sleep_until, timeout};

use crate::domain::payment::PaymentRequest;
use crate::domain::processor_client::ProcessorClient;
use crate::infrastructure::queue::ingestion_queue::IngestionQueue;
use crate::infrastructure::stats::payment_stats::PaymentStats;
use crate::use_cases::dto::ShutdownReport;
use crate::use_cases::process_payment::ProcessPaymentUseCase;

pub const MAX_WORKERS: usize = 100;
const WORKERS_PER_CPU: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
	pub worker_count:         usize,
	pub batch_size:           usize,
	pub flush_interval:       Duration,
	pub max_concurrent_sends: usize,
}

impl PoolSettings {
	/// Dispatch is I/O bound, so the pool runs several workers per CPU, capped
	/// at [`MAX_WORKERS`].
	pub fn default_worker_count() -> usize {
		std::thread::available_parallelism()
			.map_or(1, |n| n.get())
			.saturating_mul(WORKERS_PER_CPU)
			.min(MAX_WORKERS)
	}
}

struct DispatchWorker<C: ProcessorClient> {
	id:              usize,
	queue:           Arc<IngestionQueue<PaymentRequest>>,
	process_payment: ProcessPaymentUseCase<C>,
	stats:           Arc<PaymentStats>,
	in_flight:       Arc<AtomicU64>,
	settings:        PoolSettings,
}

impl<C: ProcessorClient> DispatchWorker<C> {
	async fn run(self) {
		debug!("Dispatch worker {} started", self.id);

		let mut batch = Vec::with_capacity(self.settings.batch_size);
		let mut next_flush = Instant::now() + self.settings.flush_interval;

		loop {
			tokio::select! {
				payment = self.queue.pop() => match payment {
					Some(payment) => {
						self.stats.record_started();
						self.in_flight.fetch_add(1, Ordering::AcqRel);
						batch.push(payment);

						if batch.len() >= self.settings.batch_size {
							self.flush(&mut batch).await;
							next_flush = Instant::now() + self.settings.flush_interval;
						}
					}
					None => {
						self.flush(&mut batch).await;
						break;
					}
				},
				_ = sleep_until(next_flush) => {
					self.flush(&mut batch).await;
					next_flush = Instant::now() + self.settings.flush_interval;
				}
			}
		}

		debug!("Dispatch worker {} stopped", self.id);
	}

	/// Dispatches the whole batch with bounded parallelism and returns once
	/// every payment reached a terminal outcome.
	async fn flush(&self, batch: &mut Vec<PaymentRequest>) {
		if batch.is_empty() {
			return;
		}

		let size = batch.len();
		stream::iter(batch.drain(..))
			.for_each_concurrent(self.settings.max_concurrent_sends, |payment| async move {
				self.process_payment.execute(payment).await;
				self.in_flight.fetch_sub(1, Ordering::AcqRel);
			})
			.await;

		debug!("Dispatch worker {} flushed {size} payments", self.id);
	}
}

/// Fixed set of batching workers draining the ingestion queue.
pub struct DispatchWorkerPool<C: ProcessorClient> {
	queue:           Arc<IngestionQueue<PaymentRequest>>,
	process_payment: ProcessPaymentUseCase<C>,
	stats:           Arc<PaymentStats>,
	settings:        PoolSettings,
	in_flight:       Arc<AtomicU64>,
	workers:         JoinSet<()>,
}

impl<C: ProcessorClient> DispatchWorkerPool<C> {
	pub fn new(
		queue: Arc<IngestionQueue<PaymentRequest>>,
		process_payment: ProcessPaymentUseCase<C>,
		stats: Arc<PaymentStats>,
		settings: PoolSettings,
	) -> Self {
		Self {
			queue,
			process_payment,
			stats,
			settings: PoolSettings {
				worker_count:         settings.worker_count.clamp(1, MAX_WORKERS),
				batch_size:           settings.batch_size.max(1),
				flush_interval:       settings.flush_interval,
				max_concurrent_sends: settings.max_concurrent_sends.max(1),
			},
			in_flight: Arc::new(AtomicU64::new(0)),
			workers: JoinSet::new(),
		}
	}

	pub fn is_running(&self) -> bool {
		!self.workers.is_empty()
	}

	/// Spawns the workers. Must be called within a tokio runtime; calling it
	/// on a running pool does nothing.
	pub fn start(&mut self) {
		if self.is_running() {
			return;
		}

		for id in 0..self.settings.worker_count {
			let worker = DispatchWorker {
				id,
				queue: self.queue.clone(),
				process_payment: self.process_payment.clone(),
				stats: self.stats.clone(),
				in_flight: self.in_flight.clone(),
				settings: self.settings,
			};
			self.workers.spawn(worker.run());
		}

		info!(
			"Started {} dispatch workers (batch size {}, flush every {:?}, {} \
			 concurrent sends per worker)",
			self.settings.worker_count,
			self.settings.batch_size,
			self.settings.flush_interval,
			self.settings.max_concurrent_sends
		);
	}

	/// Closes the queue, lets the workers drain it and flush their batches,
	/// and waits for them up to `deadline`. Workers still running at the
	/// deadline are aborted; their in-flight payments and anything left in the
	/// queue are counted as abandoned errors.
	pub async fn stop(&mut self, deadline: Duration) -> ShutdownReport {
		self.queue.close();
		info!(
			"Stopping dispatch workers, {} payments pending in queue",
			self.queue.len()
		);

		let workers = &mut self.workers;
		let joined = timeout(deadline, async {
			while let Some(result) = workers.join_next().await {
				if let Err(e) = result {
					error!("Dispatch worker terminated abnormally: {e}");
				}
			}
		})
		.await;

		let completed = joined.is_ok();
		let in_flight = if completed {
			0
		} else {
			self.workers.abort_all();
			while self.workers.join_next().await.is_some() {}
			self.in_flight.swap(0, Ordering::AcqRel)
		};

		let never_started = self.queue.drain().len() as u64;
		let abandoned = in_flight + never_started;
		if abandoned > 0 {
			self.stats.record_abandoned(in_flight, never_started);
			warn!(
				"Shutdown abandoned {abandoned} payments ({in_flight} in flight, \
				 {never_started} still queued)"
			);
		}

		if completed {
			info!("Dispatch workers stopped");
		} else {
			warn!("Dispatch workers did not finish within {deadline:?}");
		}

		ShutdownReport {
			completed,
			abandoned,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::domain::attempt::FailureKind;
	use crate::domain::payment_processor::ProcessorId;
	use crate::infrastructure::routing::processor_router::ProcessorRouter;
	use crate::test_support::{ScriptedProcessorClient, SendBehavior, payment};
	use crate::use_cases::dto::SummarySnapshot;

	struct Fixture {
		client: Arc<ScriptedProcessorClient>,
		queue:  Arc<IngestionQueue<PaymentRequest>>,
		stats:  Arc<PaymentStats>,
		pool:   DispatchWorkerPool<ScriptedProcessorClient>,
	}

	fn fixture(settings: PoolSettings) -> Fixture {
		let client = Arc::new(ScriptedProcessorClient::new());
		let router = Arc::new(ProcessorRouter::new(
			"http://default",
			"http://fallback",
			3,
		));
		let stats = Arc::new(PaymentStats::new());
		let queue = Arc::new(IngestionQueue::new(1_000));
		let process_payment =
			ProcessPaymentUseCase::new(client.clone(), router, stats.clone());
		let pool =
			DispatchWorkerPool::new(queue.clone(), process_payment, stats.clone(), settings);

		Fixture {
			client,
			queue,
			stats,
			pool,
		}
	}

	fn settings(worker_count: usize, batch_size: usize, flush_ms: u64) -> PoolSettings {
		PoolSettings {
			worker_count,
			batch_size,
			flush_interval: Duration::from_millis(flush_ms),
			max_concurrent_sends: 5,
		}
	}

	async fn wait_for_total(stats: &PaymentStats, expected: u64) -> SummarySnapshot {
		let deadline = Instant::now() + Duration::from_secs(5);
		loop {
			let snapshot = stats.snapshot();
			let finished = snapshot.default_success +
				snapshot.fallback_success +
				snapshot.total_errors;
			if finished >= expected || Instant::now() >= deadline {
				return snapshot;
			}
			tokio::time::sleep(Duration::from_millis(10)).await;
		}
	}

	#[test]
	fn test_default_worker_count_is_capped() {
		let count = PoolSettings::default_worker_count();
		assert!(count >= 1);
		assert!(count <= MAX_WORKERS);
	}

	#[test]
	fn test_settings_are_sanitized() {
		let f = fixture(PoolSettings {
			worker_count:         500,
			batch_size:           0,
			flush_interval:       Duration::from_millis(10),
			max_concurrent_sends: 0,
		});

		let settings = f.pool.settings;
		assert_eq!(settings.worker_count, MAX_WORKERS);
		assert_eq!(settings.batch_size, 1);
		assert_eq!(settings.max_concurrent_sends, 1);
	}

	#[tokio::test]
	async fn test_all_payments_go_to_default_when_healthy() {
		let mut f = fixture(settings(4, 10, 20));
		f.pool.start();

		for i in 1..=50 {
			f.queue.try_push(payment(i)).unwrap();
		}

		let snapshot = wait_for_total(&f.stats, 50).await;
		assert_eq!(snapshot, SummarySnapshot {
			total_payments:   50,
			default_success:  50,
			fallback_success: 0,
			total_errors:     0,
		});

		let report = f.pool.stop(Duration::from_secs(1)).await;
		assert!(report.completed);
		assert_eq!(report.abandoned, 0);
	}

	#[tokio::test]
	async fn test_partial_batch_flushes_within_interval() {
		let mut f = fixture(settings(1, 10, 50));
		f.pool.start();

		f.queue.try_push(payment(1)).unwrap();
		tokio::time::sleep(Duration::from_millis(200)).await;

		assert_eq!(f.stats.snapshot().default_success, 1);
		f.pool.stop(Duration::from_secs(1)).await;
	}

	#[tokio::test]
	async fn test_full_batch_flushes_before_interval() {
		let mut f = fixture(settings(1, 4, 30_000));
		f.pool.start();

		for i in 1..=4 {
			f.queue.try_push(payment(i)).unwrap();
		}
		let snapshot = timeout(Duration::from_millis(500), wait_for_total(&f.stats, 4))
			.await
			.expect("full batch was not flushed before the interval");
		assert_eq!(snapshot.default_success, 4);

		for i in 5..=7 {
			f.queue.try_push(payment(i)).unwrap();
		}
		tokio::time::sleep(Duration::from_millis(200)).await;
		assert_eq!(f.stats.snapshot().default_success, 4);
		assert_eq!(f.stats.snapshot().total_payments, 7);

		let report = f.pool.stop(Duration::from_secs(1)).await;
		assert!(report.completed);
		assert_eq!(f.stats.snapshot().default_success, 7);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn test_concurrent_sends_are_bounded_per_worker() {
		let mut f = fixture(PoolSettings {
			worker_count:         1,
			batch_size:           12,
			flush_interval:       Duration::from_millis(10),
			max_concurrent_sends: 3,
		});
		f.client.set_send_delay(Duration::from_millis(30));
		for i in 1..=12 {
			f.queue.try_push(payment(i)).unwrap();
		}
		f.pool.start();

		let snapshot = wait_for_total(&f.stats, 12).await;
		assert_eq!(snapshot.default_success, 12);
		assert_eq!(f.client.peak_in_flight(), 3);

		f.pool.stop(Duration::from_secs(1)).await;
	}

	#[tokio::test]
	async fn test_fallback_takes_over_when_default_keeps_failing() {
		let mut f = fixture(settings(1, 5, 10));
		f.client.set_send(
			ProcessorId::Default,
			SendBehavior::Fail(FailureKind::ServerError(500)),
		);
		f.pool.start();

		for i in 1..=30 {
			f.queue.try_push(payment(i)).unwrap();
		}

		let snapshot = wait_for_total(&f.stats, 30).await;
		assert_eq!(snapshot.default_success, 0);
		assert_eq!(snapshot.fallback_success, 30);
		// Sends racing inside the first batch may all see a closed breaker.
		assert!(f.client.sends_to(ProcessorId::Default) <= 5);

		f.pool.stop(Duration::from_secs(1)).await;
	}

	#[tokio::test]
	async fn test_stop_drains_payments_queued_before_the_signal() {
		let mut f = fixture(settings(2, 10, 1_000));
		for i in 1..=25 {
			f.queue.try_push(payment(i)).unwrap();
		}
		f.pool.start();

		let report = f.pool.stop(Duration::from_secs(2)).await;

		assert!(report.completed);
		assert_eq!(report.abandoned, 0);
		assert_eq!(f.stats.snapshot().default_success, 25);
		assert!(f.queue.try_push(payment(1)).is_err());
	}

	#[tokio::test]
	async fn test_stop_reports_abandoned_payments_at_deadline() {
		let mut f = fixture(settings(1, 2, 10));
		f.client.set_send(ProcessorId::Default, SendBehavior::Hang);
		for i in 1..=5 {
			f.queue.try_push(payment(i)).unwrap();
		}
		f.pool.start();
		tokio::time::sleep(Duration::from_millis(50)).await;

		let report = f.pool.stop(Duration::from_millis(100)).await;

		assert!(!report.completed);
		assert_eq!(report.abandoned, 5);
		assert_eq!(f.stats.snapshot(), SummarySnapshot {
			total_payments:   5,
			default_success:  0,
			fallback_success: 0,
			total_errors:     5,
		});
		assert!(!f.pool.is_running());
	}

	#[tokio::test]
	async fn test_stop_without_start_abandons_queued_payments() {
		let mut f = fixture(settings(1, 10, 10));
		f.queue.try_push(payment(1)).unwrap();
		f.queue.try_push(payment(2)).unwrap();

		let report = f.pool.stop(Duration::from_millis(50)).await;

		assert!(report.completed);
		assert_eq!(report.abandoned, 2);
		assert_eq!(f.stats.snapshot().total_errors, 2);
	}

	#[tokio::test]
	async fn test_start_is_idempotent() {
		let mut f = fixture(settings(3, 10, 10));
		f.pool.start();
		f.pool.start();

		assert_eq!(f.pool.workers.len(), 3);
		f.pool.stop(Duration::from_secs(1)).await;
	}
}
