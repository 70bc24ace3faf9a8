use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::attempt::{AttemptOutcome, FailureKind};
use crate::domain::payment::PaymentRequest;
use crate::domain::payment_processor::{ProcessorEndpoint, ProcessorId};
use crate::domain::processor_client::ProcessorClient;

#[derive(Debug, Clone, Copy)]
pub enum SendBehavior {
	Succeed,
	Fail(FailureKind),
	Hang,
}

/// In-memory processor client with per-processor scripted answers. Every
/// processor succeeds and answers probes positively unless told otherwise.
/// Tracks how many sends are running at once.
pub struct ScriptedProcessorClient {
	send_behavior:  Mutex<HashMap<ProcessorId, SendBehavior>>,
	probe_behavior: Mutex<HashMap<ProcessorId, bool>>,
	send_delay:     Mutex<Duration>,
	sends:          Mutex<Vec<ProcessorId>>,
	probes:         Mutex<Vec<ProcessorId>>,
	in_flight:      AtomicUsize,
	peak_in_flight: AtomicUsize,
}

impl ScriptedProcessorClient {
	pub fn new() -> Self {
		Self {
			send_behavior:  Mutex::new(HashMap::new()),
			probe_behavior: Mutex::new(HashMap::new()),
			send_delay:     Mutex::new(Duration::ZERO),
			sends:          Mutex::new(Vec::new()),
			probes:         Mutex::new(Vec::new()),
			in_flight:      AtomicUsize::new(0),
			peak_in_flight: AtomicUsize::new(0),
		}
	}

	/// Every send takes at least `delay` before answering.
	pub fn set_send_delay(&self, delay: Duration) {
		*self.send_delay.lock().unwrap() = delay;
	}

	pub fn peak_in_flight(&self) -> usize {
		self.peak_in_flight.load(Ordering::SeqCst)
	}

	pub fn set_send(&self, id: ProcessorId, behavior: SendBehavior) {
		self.send_behavior.lock().unwrap().insert(id, behavior);
	}

	pub fn set_probe(&self, id: ProcessorId, healthy: bool) {
		self.probe_behavior.lock().unwrap().insert(id, healthy);
	}

	pub fn sends(&self) -> Vec<ProcessorId> {
		self.sends.lock().unwrap().clone()
	}

	pub fn sends_to(&self, id: ProcessorId) -> usize {
		self.sends.lock().unwrap().iter().filter(|s| **s == id).count()
	}

	pub fn clear_sends(&self) {
		self.sends.lock().unwrap().clear();
	}

	pub fn probes(&self) -> Vec<ProcessorId> {
		self.probes.lock().unwrap().clone()
	}
}

#[async_trait]
impl ProcessorClient for ScriptedProcessorClient {
	async fn send(
		&self,
		endpoint: &ProcessorEndpoint,
		_payment: &PaymentRequest,
	) -> AttemptOutcome {
		self.sends.lock().unwrap().push(endpoint.id);
		let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
		self.peak_in_flight.fetch_max(running, Ordering::SeqCst);

		let delay = *self.send_delay.lock().unwrap();
		if !delay.is_zero() {
			tokio::time::sleep(delay).await;
		}

		let behavior = self
			.send_behavior
			.lock()
			.unwrap()
			.get(&endpoint.id)
			.copied()
			.unwrap_or(SendBehavior::Succeed);

		let outcome = match behavior {
			SendBehavior::Succeed => AttemptOutcome::success(endpoint.id, 1),
			SendBehavior::Fail(kind) => AttemptOutcome::failure(endpoint.id, 1, kind),
			SendBehavior::Hang => std::future::pending().await,
		};
		self.in_flight.fetch_sub(1, Ordering::SeqCst);
		outcome
	}

	async fn probe(&self, endpoint: &ProcessorEndpoint) -> bool {
		self.probes.lock().unwrap().push(endpoint.id);
		self.probe_behavior
			.lock()
			.unwrap()
			.get(&endpoint.id)
			.copied()
			.unwrap_or(true)
	}
}

pub fn payment(amount: i64) -> PaymentRequest {
	PaymentRequest {
		amount,
		description: None,
		kind: "credit".to_string(),
	}
}
