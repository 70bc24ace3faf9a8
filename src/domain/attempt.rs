use derive_more::derive::Display;

use crate::domain::payment_processor::ProcessorId;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
	#[display("timeout")]
	Timeout,
	#[display("connection error")]
	Connection,
	#[display("request error")]
	Request,
	#[display("rate limited")]
	RateLimited,
	#[display("server error (HTTP {_0})")]
	ServerError(u16),
	#[display("rejected (HTTP {_0})")]
	Rejected(u16),
}

impl FailureKind {
	/// Classifies an HTTP status. `None` means the attempt succeeded.
	pub fn from_status(status: u16) -> Option<FailureKind> {
		match status {
			200..=299 => None,
			429 => Some(FailureKind::RateLimited),
			500..=599 => Some(FailureKind::ServerError(status)),
			_ => Some(FailureKind::Rejected(status)),
		}
	}

	/// Processor-level failures count against the breaker and allow the next
	/// processor to be tried. Anything else is a rejection of the payment
	/// itself.
	pub fn is_processor_level(&self) -> bool {
		!matches!(self, FailureKind::Rejected(_))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptOutcome {
	pub processor:  ProcessorId,
	pub latency_ms: u64,
	pub failure:    Option<FailureKind>,
}

impl AttemptOutcome {
	pub fn success(processor: ProcessorId, latency_ms: u64) -> Self {
		Self {
			processor,
			latency_ms,
			failure: None,
		}
	}

	pub fn failure(processor: ProcessorId, latency_ms: u64, kind: FailureKind) -> Self {
		Self {
			processor,
			latency_ms,
			failure: Some(kind),
		}
	}

	pub fn is_success(&self) -> bool {
		self.failure.is_none()
	}
}
