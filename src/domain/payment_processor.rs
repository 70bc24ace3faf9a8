use derive_more::derive::Display;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessorId {
	#[display("default")]
	Default,
	#[display("fallback")]
	Fallback,
}

impl ProcessorId {
	/// Routing priority: default is always tried before fallback.
	pub const PRIORITY: [ProcessorId; 2] = [ProcessorId::Default, ProcessorId::Fallback];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorEndpoint {
	pub id:  ProcessorId,
	pub url: String,
}

impl ProcessorEndpoint {
	pub fn new(id: ProcessorId, url: impl Into<String>) -> Self {
		Self { id, url: url.into() }
	}

	pub fn health_url(&self) -> String {
		format!("{}/health", self.url.trim_end_matches('/'))
	}
}
