use std::sync::Arc;

use payment_dispatcher::infrastructure::config::settings::Config;
use payment_dispatcher::{run, system_runner};

fn main() -> std::io::Result<()> {
	env_logger::init();

	let config = Arc::new(Config::load().expect("Failed to load configuration"));

	system_runner(config.runtime_worker_threads)?.block_on(run(config))
}
