use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, AtomicU64, Ordering};

use time::OffsetDateTime;

use crate::domain::breaker_state::BreakerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorHealthSnapshot {
	pub state:                BreakerState,
	pub consecutive_failures: u32,
	/// Unix timestamp (seconds) of the last state evaluation, 0 if never.
	pub last_checked_at:      i64,
	pub last_latency_ms:      u64,
}

/// Breaker state of a single processor.
///
/// Every field is an independent atomic. Readers may observe a slightly stale
/// combination, which at worst costs one extra failed attempt.
#[derive(Debug)]
pub struct ProcessorHealth {
	healthy:              AtomicBool,
	consecutive_failures: AtomicU32,
	last_checked_at:      AtomicI64,
	last_latency_ms:      AtomicU64,
}

impl ProcessorHealth {
	pub fn new() -> Self {
		Self {
			healthy:              AtomicBool::new(true),
			consecutive_failures: AtomicU32::new(0),
			last_checked_at:      AtomicI64::new(0),
			last_latency_ms:      AtomicU64::new(0),
		}
	}

	pub fn state(&self) -> BreakerState {
		if self.healthy.load(Ordering::Acquire) {
			BreakerState::Closed
		} else {
			BreakerState::Open
		}
	}

	/// Closes the breaker and resets the failure count. Returns `true` when
	/// the breaker was open before.
	pub fn mark_healthy(&self, latency_ms: Option<u64>) -> bool {
		self.consecutive_failures.store(0, Ordering::Release);
		if let Some(latency_ms) = latency_ms {
			self.last_latency_ms.store(latency_ms, Ordering::Relaxed);
		}
		self.touch();
		!self.healthy.swap(true, Ordering::AcqRel)
	}

	/// Counts a processor-level failure. Returns `true` when this failure is
	/// the one that opened the breaker.
	pub fn record_failure(&self, failure_threshold: u32) -> bool {
		let failures = self
			.consecutive_failures
			.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
				Some(n.saturating_add(1))
			})
			.unwrap_or_else(|n| n)
			.saturating_add(1);
		self.touch();

		failures >= failure_threshold && self.healthy.swap(false, Ordering::AcqRel)
	}

	/// Opens the breaker as if `failure_threshold` consecutive failures had
	/// just been recorded.
	#[cfg(test)]
	pub fn force_open(&self, failure_threshold: u32) {
		self.consecutive_failures
			.store(failure_threshold, Ordering::Release);
		self.healthy.store(false, Ordering::Release);
		self.touch();
	}

	pub fn snapshot(&self) -> ProcessorHealthSnapshot {
		ProcessorHealthSnapshot {
			state:                self.state(),
			consecutive_failures: self.consecutive_failures.load(Ordering::Acquire),
			last_checked_at:      self.last_checked_at.load(Ordering::Relaxed),
			last_latency_ms:      self.last_latency_ms.load(Ordering::Relaxed),
		}
	}

	fn touch(&self) {
		self.last_checked_at.store(
			OffsetDateTime::now_utc().unix_timestamp(),
			Ordering::Relaxed,
		);
	}
}

impl Default for ProcessorHealth {
	fn default() -> Self {
		Self::new()
	}
}
