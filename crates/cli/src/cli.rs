use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "dockhand")]
#[command(about = "Rebuild a user's Dock from application bundle identifiers")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Application identifiers, in Dock order (e.g. com.apple.Safari)
	#[arg(value_name = "APP")]
	pub apps: Vec<String>,

	/// Account whose Dock is rebuilt (defaults to the console user)
	#[arg(long, short = 'u', value_name = "NAME")]
	pub user: Option<String>,

	/// Treat the first three positionals as Jamf's mount point, computer name and username
	#[arg(long)]
	pub jamf: bool,

	/// Configuration file (TOML)
	#[arg(long, short = 'c', value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Seconds to wait for each external query or preference write
	#[arg(long, value_name = "SECS")]
	pub timeout: Option<u64>,

	/// Directory holding the per-user run lock
	#[arg(long, value_name = "DIR")]
	pub lock_dir: Option<PathBuf>,

	/// Log the Dock records instead of writing them
	#[arg(long)]
	pub dry_run: bool,

	/// Do not restart the Dock after writing
	#[arg(long)]
	pub no_reload: bool,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,
}

/// Target and identifiers after Jamf positional conventions are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
	pub user: Option<String>,
	pub apps: Vec<String>,
}

impl Cli {
	pub fn invocation(&self) -> Invocation {
		if !self.jamf {
			return Invocation {
				user: self.user.clone(),
				apps: self.apps.clone(),
			};
		}

		// Jamf passes: mount point, computer name, username, then script parameters.
		let mut positionals = self.apps.iter().skip(2);
		let jamf_user = positionals
			.next()
			.map(|name| name.trim())
			.filter(|name| !name.is_empty())
			.map(str::to_owned);

		Invocation {
			user: self.user.clone().or(jamf_user),
			apps: positionals.cloned().collect(),
		}
	}
}
