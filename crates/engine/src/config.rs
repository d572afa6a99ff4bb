//! Optional TOML configuration.
//!
//! Every key has a default, so a missing default config file is not an error.
//! A file named explicitly on the command line must exist.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::command::DEFAULT_COMMAND_TIMEOUT;
use crate::fallback::FallbackTable;
use crate::identifier::{AppId, IdentifierError};
use crate::lock::DEFAULT_STALE_AFTER;
use crate::target::TargetUser;

pub const DEFAULT_CONFIG_PATH: &str = "/Library/Application Support/dockhand/config.toml";
pub const DEFAULT_LOCK_DIR: &str = "/private/tmp";

/// System-wide roots searched when the index has no answer, in priority order.
pub const SYSTEM_SEARCH_ROOTS: &[&str] = &[
	"/Applications",
	"/System/Applications",
	"/Applications/Utilities",
	"/System/Applications/Utilities",
];

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("I/O error reading {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("invalid config {}: {source}", path.display())]
	Parse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},
	#[error("invalid fallback {from:?} -> {to:?}: {source}")]
	InvalidFallback {
		from: String,
		to: String,
		#[source]
		source: IdentifierError,
	},
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Roots walked when the index has no answer.
	pub search_roots: Vec<PathBuf>,
	/// Append the target's `~/Applications` to `search_roots`.
	pub include_user_applications: bool,
	pub command_timeout_secs: u64,
	pub lock_dir: PathBuf,
	pub stale_lock_secs: u64,
	pub reload_dock: bool,
	/// Extra identifier substitutions, layered over the built-in ones.
	pub fallbacks: BTreeMap<String, String>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			search_roots: SYSTEM_SEARCH_ROOTS.iter().map(PathBuf::from).collect(),
			include_user_applications: true,
			command_timeout_secs: DEFAULT_COMMAND_TIMEOUT.as_secs(),
			lock_dir: PathBuf::from(DEFAULT_LOCK_DIR),
			stale_lock_secs: DEFAULT_STALE_AFTER.as_secs(),
			reload_dock: true,
			fallbacks: BTreeMap::new(),
		}
	}
}

impl Config {
	/// Loads `explicit`, or the default path if it exists, or the defaults.
	pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
		match explicit {
			Some(path) => Self::from_file(path),
			None => {
				let path = Path::new(DEFAULT_CONFIG_PATH);
				if path.exists() {
					Self::from_file(path)
				} else {
					Ok(Self::default())
				}
			}
		}
	}

	pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
		let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
			path: path.to_path_buf(),
			source,
		})?;
		tracing::debug!(path = %path.display(), "config.loaded");
		Ok(config)
	}

	pub fn command_timeout(&self) -> Duration {
		Duration::from_secs(self.command_timeout_secs.max(1))
	}

	pub fn stale_lock_after(&self) -> Duration {
		Duration::from_secs(self.stale_lock_secs)
	}

	/// Built-in substitutions plus the configured ones.
	pub fn fallback_table(&self) -> Result<FallbackTable, ConfigError> {
		self.fallbacks.iter().try_fold(FallbackTable::builtin(), |table, (from, to)| {
			let invalid = |source| ConfigError::InvalidFallback {
				from: from.clone(),
				to: to.clone(),
				source,
			};
			let from_id = AppId::parse(from).map_err(invalid)?;
			let to_id = AppId::parse(to).map_err(invalid)?;
			Ok(table.with_entry(from_id, to_id))
		})
	}

	/// Search roots for `target`, in walk order.
	pub fn search_roots_for(&self, target: &TargetUser) -> Vec<PathBuf> {
		let mut roots = self.search_roots.clone();
		if self.include_user_applications {
			roots.push(target.applications_dir());
		}
		roots
	}
}
