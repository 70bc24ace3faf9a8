use log::info;
use tokio::sync::broadcast;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};

use crate::domain::processor_client::ProcessorClient;
use crate::use_cases::health_check::HealthCheckUseCase;

/// Re-checks open processors every `probe_interval` until `shutdown_rx`
/// fires or its sender is dropped. The first check happens one interval
/// after start.
pub async fn processor_health_monitor_worker<C: ProcessorClient>(
	health_check_use_case: HealthCheckUseCase<C>,
	probe_interval: Duration,
	mut shutdown_rx: broadcast::Receiver<()>,
) {
	let mut ticker = interval_at(Instant::now() + probe_interval, probe_interval);
	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

	loop {
		tokio::select! {
			_ = ticker.tick() => {
				let restored = health_check_use_case.execute().await;
				if !restored.is_empty() {
					info!("Health probe restored processors: {restored:?}");
				}
			}
			_ = shutdown_rx.recv() => {
				info!("Processor health monitor shutting down");
				break;
			}
		}
	}
}
