use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use derive_more::derive::{Display, Error};
use log::{info, warn};

use crate::domain::payment::{PaymentRequest, ValidationError};
use crate::infrastructure::queue::ingestion_queue::{IngestionQueue, TryPushError};

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
	#[display("{_0}")]
	Validation(ValidationError),
	#[display("payment queue is full")]
	QueueFull,
	#[display("payment queue is closed")]
	ShuttingDown,
}

impl From<ValidationError> for SubmitError {
	fn from(err: ValidationError) -> Self {
		SubmitError::Validation(err)
	}
}

impl From<TryPushError> for SubmitError {
	fn from(err: TryPushError) -> Self {
		match err {
			TryPushError::Full => SubmitError::QueueFull,
			TryPushError::Closed => SubmitError::ShuttingDown,
		}
	}
}

pub struct CreatePaymentUseCase {
	payment_queue: Arc<IngestionQueue<PaymentRequest>>,
	saturated:     AtomicBool,
}

impl CreatePaymentUseCase {
	pub fn new(payment_queue: Arc<IngestionQueue<PaymentRequest>>) -> Self {
		Self {
			payment_queue,
			saturated: AtomicBool::new(false),
		}
	}

	/// Validates and enqueues without waiting. Nothing is enqueued on error.
	///
	/// Backpressure is logged once when the queue fills up and once when it
	/// accepts payments again, not per rejection.
	pub fn execute(&self, payment: PaymentRequest) -> Result<(), SubmitError> {
		payment.validate()?;

		match self.payment_queue.try_push(payment) {
			Ok(()) => {
				if self.saturated.load(Ordering::Relaxed) &&
					self.saturated.swap(false, Ordering::AcqRel)
				{
					info!("Payment queue accepting payments again");
				}
				Ok(())
			}
			Err(TryPushError::Full) => {
				if !self.saturated.swap(true, Ordering::AcqRel) {
					warn!(
						"Payment queue full ({} pending), rejecting payments",
						self.payment_queue.len()
					);
				}
				Err(SubmitError::QueueFull)
			}
			Err(e) => Err(e.into()),
		}
	}
}
