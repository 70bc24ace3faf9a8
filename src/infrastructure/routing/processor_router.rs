use log::{debug, info, warn};

use crate::domain::attempt::AttemptOutcome;
use crate::domain::payment_processor::{ProcessorEndpoint, ProcessorId};
use crate::infrastructure::routing::circuit_breaker::{
	ProcessorHealth, ProcessorHealthSnapshot,
};

struct RoutedProcessor {
	endpoint: ProcessorEndpoint,
	health:   ProcessorHealth,
}

/// Circuit breaker over the default and fallback processors.
///
/// Open processors are skipped by [`ProcessorRouter::candidates`]. Request
/// outcomes can only open a breaker or keep it closed; an open breaker is
/// closed again through [`ProcessorRouter::mark_healthy`], which the health
/// probe calls.
pub struct ProcessorRouter {
	default:           RoutedProcessor,
	fallback:          RoutedProcessor,
	failure_threshold: u32,
}

impl ProcessorRouter {
	pub fn new(
		default_url: impl Into<String>,
		fallback_url: impl Into<String>,
		failure_threshold: u32,
	) -> Self {
		Self {
			default: RoutedProcessor {
				endpoint: ProcessorEndpoint::new(ProcessorId::Default, default_url),
				health:   ProcessorHealth::new(),
			},
			fallback: RoutedProcessor {
				endpoint: ProcessorEndpoint::new(ProcessorId::Fallback, fallback_url),
				health:   ProcessorHealth::new(),
			},
			failure_threshold: failure_threshold.max(1),
		}
	}

	fn processor(&self, id: ProcessorId) -> &RoutedProcessor {
		match id {
			ProcessorId::Default => &self.default,
			ProcessorId::Fallback => &self.fallback,
		}
	}

	/// Closed processors in priority order. The iterator is lazy, so the
	/// fallback's state is read only after the default attempt resolved.
	pub fn candidates(&self) -> impl Iterator<Item = &ProcessorEndpoint> + Send {
		ProcessorId::PRIORITY
			.into_iter()
			.map(|id| self.processor(id))
			.filter(|processor| processor.health.state().is_closed())
			.map(|processor| &processor.endpoint)
	}

	pub fn record_outcome(&self, outcome: &AttemptOutcome) {
		let processor = self.processor(outcome.processor);

		match outcome.failure {
			None => {
				if processor.health.mark_healthy(Some(outcome.latency_ms)) {
					info!("{} processor circuit closed", outcome.processor);
				}
			}
			Some(kind) if kind.is_processor_level() => {
				if processor.health.record_failure(self.failure_threshold) {
					warn!(
						"{} processor circuit opened after {} consecutive failures \
						 (last: {kind})",
						outcome.processor, self.failure_threshold
					);
				}
			}
			Some(kind) => {
				debug!(
					"{} processor rejected a payment ({kind}), breaker unchanged",
					outcome.processor
				);
			}
		}
	}

	/// Probe path: closes the breaker of `id`.
	pub fn mark_healthy(&self, id: ProcessorId) {
		if self.processor(id).health.mark_healthy(None) {
			info!("{id} processor circuit closed by health probe");
		}
	}

	#[cfg(test)]
	pub fn force_open(&self, id: ProcessorId) {
		self.processor(id).health.force_open(self.failure_threshold);
	}

	pub fn open_processors(&self) -> Vec<ProcessorEndpoint> {
		ProcessorId::PRIORITY
			.into_iter()
			.map(|id| self.processor(id))
			.filter(|processor| !processor.health.state().is_closed())
			.map(|processor| processor.endpoint.clone())
			.collect()
	}

	pub fn health_of(&self, id: ProcessorId) -> ProcessorHealthSnapshot {
		self.processor(id).health.snapshot()
	}
}
