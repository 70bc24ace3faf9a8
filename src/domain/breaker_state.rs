#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
	Closed,
	Open,
}

impl BreakerState {
	pub fn is_closed(&self) -> bool {
		matches!(self, BreakerState::Closed)
	}
}
