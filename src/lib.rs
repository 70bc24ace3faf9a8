use std::sync::Arc;
use std::time::Duration;

use actix_web::rt::{System, SystemRunner};
use actix_web::{App, HttpServer, web};
use log::{info, warn};

use crate::adapters::web::health_handler::health;
use crate::adapters::web::payments_handler::{json_config, payments};
use crate::adapters::web::payments_summary_handler::payments_summary;
use crate::engine::{EngineSettings, PaymentEngine};
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::http::reqwest_processor_client::{
	ReqwestProcessorClient, build_http_client,
};

pub mod engine;

pub mod domain {
	pub mod attempt;
	pub mod breaker_state;
	pub mod payment;
	pub mod payment_processor;
	pub mod processor_client;
}

pub mod infrastructure {
	pub mod config {
		pub mod settings;
	}
	pub mod http {
		pub mod reqwest_processor_client;
	}
	pub mod queue {
		pub mod ingestion_queue;
	}
	pub mod routing {
		pub mod circuit_breaker;
		pub mod processor_router;
	}
	pub mod stats {
		pub mod payment_stats;
	}
	pub mod workers {
		pub mod dispatch_worker_pool;
		pub mod processor_health_monitor_worker;
	}
}

pub mod use_cases {
	pub mod create_payment;
	pub mod dto;
	pub mod get_payment_summary;
	pub mod health_check;
	pub mod process_payment;
}

pub mod adapters {
	pub mod web {
		pub mod errors;
		pub mod health_handler;
		pub mod payments_handler;
		pub mod payments_summary_handler;
		pub mod schema;
	}
}

#[cfg(test)]
mod test_support;

/// Actix system on top of a multi-threaded tokio runtime. Dispatch workers and
/// the health monitor are spawned with `tokio::spawn` from `run`, so they are
/// spread across the runtime's worker threads. `None` keeps tokio's default of
/// one thread per CPU.
pub fn system_runner(worker_threads: Option<usize>) -> std::io::Result<SystemRunner> {
	let mut builder = tokio::runtime::Builder::new_multi_thread();
	if let Some(worker_threads) = worker_threads {
		builder.worker_threads(worker_threads.max(1));
	}
	let runtime = builder.enable_all().build()?;

	Ok(System::with_tokio_rt(move || runtime))
}

pub async fn run(config: Arc<Config>) -> std::io::Result<()> {
	let http_client = build_http_client().map_err(std::io::Error::other)?;
	let client = ReqwestProcessorClient::new(
		http_client,
		config.send_timeout(),
		config.probe_timeout(),
	);
	let engine = web::Data::new(PaymentEngine::new(
		Arc::new(client),
		EngineSettings::from(config.as_ref()),
	));

	info!("Default processor: {}", config.default_payment_processor_url);
	info!("Fallback processor: {}", config.fallback_payment_processor_url);

	info!("Starting Actix-Web server on 0.0.0.0:{}...", config.server_port);
	let server_engine = engine.clone();
	let server = HttpServer::new(move || {
		App::new()
			.app_data(server_engine.clone())
			.app_data(json_config())
			.service(payments)
			.service(payments_summary)
			.service(health)
	})
	.keep_alive(Duration::from_secs(config.server_keepalive))
	.bind(("0.0.0.0", config.server_port))?
	.run();

	info!("Starting payment dispatch workers...");
	engine.start().await;

	info!("Starting processor health monitor...");
	engine.start_health_checker();

	let result = server.await;

	info!("Server stopped, draining payment queue...");
	let report = engine.stop(config.shutdown_timeout()).await;
	if report.completed {
		info!("Shutdown complete: {:?}", engine.get_summary());
	} else {
		warn!(
			"Shutdown deadline exceeded, {} payments abandoned: {:?}",
			report.abandoned,
			engine.get_summary()
		);
	}

	result
}
