use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
	pub default_payment_processor_url:  String,
	pub fallback_payment_processor_url: String,
	pub server_port:                    u16,
	pub server_keepalive:               u64,
	pub runtime_worker_threads:         Option<usize>,
	pub queue_capacity:                 usize,
	pub worker_count:                   Option<usize>,
	pub batch_size:                     usize,
	pub flush_interval_ms:              u64,
	pub max_concurrent_sends:           usize,
	pub send_timeout_ms:                u64,
	pub probe_interval_ms:              u64,
	pub probe_timeout_ms:               u64,
	pub failure_threshold:              u32,
	pub shutdown_timeout_ms:            u64,
}

impl Config {
	pub fn load() -> Result<Self, config::ConfigError> {
		let config_builder = config::Config::builder()
			.set_default(
				"default_payment_processor_url",
				"http://payment-processor-default:8080/process",
			)?
			.set_default(
				"fallback_payment_processor_url",
				"http://payment-processor-fallback:8080/process",
			)?
			.set_default("server_port", 8080)?
			.set_default("server_keepalive", 10)?
			.set_default("queue_capacity", 20_000)?
			.set_default("batch_size", 10)?
			.set_default("flush_interval_ms", 50)?
			.set_default("max_concurrent_sends", 5)?
			.set_default("send_timeout_ms", 250)?
			.set_default("probe_interval_ms", 10_000)?
			.set_default("probe_timeout_ms", 200)?
			.set_default("failure_threshold", 3)?
			.set_default("shutdown_timeout_ms", 5_000)?
			.add_source(config::Environment::with_prefix("APP"))
			.build()?;

		config_builder.try_deserialize()
	}

	pub fn flush_interval(&self) -> Duration {
		Duration::from_millis(self.flush_interval_ms)
	}

	pub fn send_timeout(&self) -> Duration {
		Duration::from_millis(self.send_timeout_ms)
	}

	pub fn probe_interval(&self) -> Duration {
		Duration::from_millis(self.probe_interval_ms)
	}

	pub fn probe_timeout(&self) -> Duration {
		Duration::from_millis(self.probe_timeout_ms)
	}

	pub fn shutdown_timeout(&self) -> Duration {
		Duration::from_millis(self.shutdown_timeout_ms)
	}
}
