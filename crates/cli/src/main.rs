//! `dockhand`: rebuild a user's Dock from application bundle identifiers.
//!
//! Designed to run from device-management policies as root, targeting the
//! console user unless told otherwise.

mod cli;
mod logging;
mod run;

use std::process::ExitCode;

use clap::Parser;
use cli::Cli;
use dockhand_engine::FatalError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
	let cli = Cli::parse();

	logging::setup_tracing(cli.verbose);

	match run::run(cli).await {
		Ok(summary) => {
			println!("dockhand: added {} of {} applications to the Dock", summary.written, summary.requested);
			ExitCode::SUCCESS
		}
		Err(error) => {
			let message = format!("{error:#}");
			tracing::error!(error = %message, "dockhand.fatal");
			let code = error.downcast_ref::<FatalError>().map_or(1, FatalError::exit_code);
			ExitCode::from(code)
		}
	}
}
