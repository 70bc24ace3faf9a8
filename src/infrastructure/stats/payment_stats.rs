use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::payment_processor::ProcessorId;
use crate::use_cases::dto::SummarySnapshot;

/// Lock-free payment counters. Each counter is read independently, so a
/// snapshot taken under load is approximate.
#[derive(Debug, Default)]
pub struct PaymentStats {
	total_payments:   AtomicU64,
	default_success:  AtomicU64,
	fallback_success: AtomicU64,
	total_errors:     AtomicU64,
}

impl PaymentStats {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn record_started(&self) {
		self.total_payments.fetch_add(1, Ordering::Relaxed);
	}

	pub fn record_success(&self, processor: ProcessorId) {
		match processor {
			ProcessorId::Default => self.default_success.fetch_add(1, Ordering::Relaxed),
			ProcessorId::Fallback => {
				self.fallback_success.fetch_add(1, Ordering::Relaxed)
			}
		};
	}

	pub fn record_failure(&self) {
		self.total_errors.fetch_add(1, Ordering::Relaxed);
	}

	/// Accounts for payments dropped at shutdown. `in_flight` were already
	/// counted as started, `never_started` were still sitting in the queue.
	pub fn record_abandoned(&self, in_flight: u64, never_started: u64) {
		self.total_payments
			.fetch_add(never_started, Ordering::Relaxed);
		self.total_errors
			.fetch_add(in_flight + never_started, Ordering::Relaxed);
	}

	pub fn snapshot(&self) -> SummarySnapshot {
		SummarySnapshot {
			total_payments:   self.total_payments.load(Ordering::Relaxed),
			default_success:  self.default_success.load(Ordering::Relaxed),
			fallback_success: self.fallback_success.load(Ordering::Relaxed),
			total_errors:     self.total_errors.load(Ordering::Relaxed),
		}
	}
}
