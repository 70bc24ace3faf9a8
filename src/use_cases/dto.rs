use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummarySnapshot {
	pub total_payments:   u64,
	pub default_success:  u64,
	pub fallback_success: u64,
	pub total_errors:     u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
	/// `false` when the deadline expired before every worker finished.
	pub completed: bool,
	/// Payments dropped during shutdown, already counted as errors.
	pub abandoned: u64,
}
