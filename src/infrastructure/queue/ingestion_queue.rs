use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use derive_more::derive::{Display, Error};
use tokio::sync::Notify;

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum TryPushError {
	#[display("queue is full")]
	Full,
	#[display("queue is closed")]
	Closed,
}

struct QueueState<T> {
	items:  VecDeque<T>,
	closed: bool,
}

/// Bounded FIFO shared by the acceptance path and the dispatch workers.
///
/// Producers never wait: `try_push` fails with [`TryPushError::Full`] once
/// `capacity` items are pending. Consumers await `pop`, which keeps handing
/// out items after `close` until the queue is empty and then yields `None`.
pub struct IngestionQueue<T> {
	state:    Mutex<QueueState<T>>,
	capacity: usize,
	notify:   Notify,
}

impl<T> IngestionQueue<T> {
	pub fn new(capacity: usize) -> Self {
		Self {
			state: Mutex::new(QueueState {
				items:  VecDeque::with_capacity(capacity),
				closed: false,
			}),
			capacity,
			notify: Notify::new(),
		}
	}

	fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}

	pub fn try_push(&self, item: T) -> Result<(), TryPushError> {
		{
			let mut state = self.lock();
			if state.closed {
				return Err(TryPushError::Closed);
			}
			if state.items.len() >= self.capacity {
				return Err(TryPushError::Full);
			}
			state.items.push_back(item);
		}

		self.notify.notify_one();
		Ok(())
	}

	/// Waits for the next item. Returns `None` once the queue is closed and
	/// fully drained. Cancel safe: an item is only removed when it is
	/// returned.
	pub async fn pop(&self) -> Option<T> {
		loop {
			let notified = self.notify.notified();

			{
				let mut state = self.lock();
				if let Some(item) = state.items.pop_front() {
					return Some(item);
				}
				if state.closed {
					return None;
				}
			}

			notified.await;
		}
	}

	pub fn close(&self) {
		self.lock().closed = true;
		self.notify.notify_waiters();
	}

	/// Removes and returns everything still pending.
	pub fn drain(&self) -> Vec<T> {
		self.lock().items.drain(..).collect()
	}

	pub fn len(&self) -> usize {
		self.lock().items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
