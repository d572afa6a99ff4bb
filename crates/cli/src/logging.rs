use std::fs::OpenOptions;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Directory that receives a per-process log file when set.
const LOG_DIR_ENV: &str = "DOCKHAND_LOG_DIR";

fn filter(verbose: bool) -> EnvFilter {
	EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("dockhand=debug,dockhand_engine=debug,info")
		} else {
			EnvFilter::new("dockhand=info,dockhand_engine=info,warn")
		}
	})
}

/// Installs stderr logging, plus a file layer under `DOCKHAND_LOG_DIR` if set.
pub fn setup_tracing(verbose: bool) {
	let stderr_layer = tracing_subscriber::fmt::layer()
		.with_writer(std::io::stderr)
		.with_target(false);

	if let Some(log_dir) = std::env::var_os(LOG_DIR_ENV).map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("dockhand.{}.log", std::process::id()));

		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_target(true);

			tracing_subscriber::registry()
				.with(filter(verbose))
				.with(stderr_layer)
				.with(file_layer)
				.init();

			tracing::debug!(path = %log_path.display(), "logging.file");
			return;
		}
	}

	tracing_subscriber::registry()
		.with(filter(verbose))
		.with(stderr_layer)
		.init();
}
