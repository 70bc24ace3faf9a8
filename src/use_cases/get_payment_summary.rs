use std::sync::Arc;

use crate::infrastructure::stats::payment_stats::PaymentStats;
use crate::use_cases::dto::SummarySnapshot;

#[derive(Clone)]
pub struct GetPaymentSummaryUseCase {
	stats: Arc<PaymentStats>,
}

impl GetPaymentSummaryUseCase {
	pub fn new(stats: Arc<PaymentStats>) -> Self {
		Self { stats }
	}

	pub fn execute(&self) -> SummarySnapshot {
		self.stats.snapshot()
	}
}
