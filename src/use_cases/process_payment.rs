use std::sync::Arc;

use log::{debug, warn};

use crate::domain::attempt::FailureKind;
use crate::domain::payment::PaymentRequest;
use crate::domain::payment_processor::ProcessorId;
use crate::domain::processor_client::ProcessorClient;
use crate::infrastructure::routing::processor_router::ProcessorRouter;
use crate::infrastructure::stats::payment_stats::PaymentStats;

/// Terminal fate of one dequeued payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentResolution {
	Processed(ProcessorId),
	Rejected {
		processor: ProcessorId,
		reason:    FailureKind,
	},
	AllProcessorsUnavailable,
}

pub struct ProcessPaymentUseCase<C: ProcessorClient> {
	client: Arc<C>,
	router: Arc<ProcessorRouter>,
	stats:  Arc<PaymentStats>,
}

impl<C: ProcessorClient> Clone for ProcessPaymentUseCase<C> {
	fn clone(&self) -> Self {
		Self {
			client: self.client.clone(),
			router: self.router.clone(),
			stats:  self.stats.clone(),
		}
	}
}

impl<C: ProcessorClient> ProcessPaymentUseCase<C> {
	pub fn new(
		client: Arc<C>,
		router: Arc<ProcessorRouter>,
		stats: Arc<PaymentStats>,
	) -> Self {
		Self {
			client,
			router,
			stats,
		}
	}

	/// Runs the default→fallback chain once and records the result. The
	/// caller is responsible for counting the payment as started.
	pub async fn execute(&self, payment: PaymentRequest) -> PaymentResolution {
		for endpoint in self.router.candidates() {
			let outcome = self.client.send(endpoint, &payment).await;
			self.router.record_outcome(&outcome);

			match outcome.failure {
				None => {
					self.stats.record_success(endpoint.id);
					return PaymentResolution::Processed(endpoint.id);
				}
				Some(reason) if !reason.is_processor_level() => {
					self.stats.record_failure();
					warn!(
						"Payment of {} ({}) rejected by {} processor: {reason}",
						payment.amount, payment.kind, endpoint.id
					);
					return PaymentResolution::Rejected {
						processor: endpoint.id,
						reason,
					};
				}
				Some(reason) => {
					debug!("{} processor failed: {reason}", endpoint.id);
				}
			}
		}

		self.stats.record_failure();
		warn!(
			"Payment of {} ({}) could not be processed by any processor. Dropping \
			 it.",
			payment.amount, payment.kind
		);
		PaymentResolution::AllProcessorsUnavailable
	}
}
