use async_trait::async_trait;

use crate::domain::attempt::AttemptOutcome;
use crate::domain::payment::PaymentRequest;
use crate::domain::payment_processor::ProcessorEndpoint;

#[async_trait]
pub trait ProcessorClient: Send + Sync + 'static {
	/// Performs exactly one submission attempt and classifies it. Never
	/// retries.
	async fn send(
		&self,
		endpoint: &ProcessorEndpoint,
		payment: &PaymentRequest,
	) -> AttemptOutcome;

	/// Lightweight liveness check, `true` when the processor answered 200.
	async fn probe(&self, endpoint: &ProcessorEndpoint) -> bool;
}
