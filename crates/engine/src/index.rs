//! Whole-system content index lookups.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::command::{CommandLine, CommandRunner};
use crate::identifier::AppId;

/// Finds paths whose bundle-identifier metadata equals an identifier.
///
/// Results come back in whatever order the index yields them. Failures,
/// including timeouts, are reported as an empty result.
#[async_trait]
pub trait ContentIndex: Send + Sync {
	async fn lookup_by_identifier(&self, id: &AppId) -> Vec<PathBuf>;
}

/// [`ContentIndex`] backed by Spotlight (`mdfind`).
#[derive(Debug, Clone)]
pub struct SpotlightIndex {
	runner: CommandRunner,
}

impl SpotlightIndex {
	pub fn new(runner: CommandRunner) -> Self {
		Self { runner }
	}

	pub fn query(id: &AppId) -> String {
		format!("kMDItemCFBundleIdentifier == '{id}'")
	}
}

#[async_trait]
impl ContentIndex for SpotlightIndex {
	async fn lookup_by_identifier(&self, id: &AppId) -> Vec<PathBuf> {
		let command = CommandLine::new("mdfind").arg(Self::query(id));
		match self.runner.run(&command).await {
			Ok(stdout) => parse_paths(&stdout),
			Err(error) => {
				tracing::debug!(identifier = %id, %error, "index.query_failed");
				Vec::new()
			}
		}
	}
}

fn parse_paths(stdout: &str) -> Vec<PathBuf> {
	stdout
		.lines()
		.map(str::trim_end)
		.filter(|line| !line.is_empty())
		.map(PathBuf::from)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn query_matches_bundle_identifier_attribute() {
		let id = AppId::parse("com.apple.Safari").expect("valid identifier");
		assert_eq!(SpotlightIndex::query(&id), "kMDItemCFBundleIdentifier == 'com.apple.Safari'");
	}

	#[test]
	fn parse_paths_keeps_order_and_skips_blank_lines() {
		let stdout = "/Applications/Safari.app\n\n/Volumes/Backup/Applications/Safari.app \n";
		assert_eq!(
			parse_paths(stdout),
			vec![
				PathBuf::from("/Applications/Safari.app"),
				PathBuf::from("/Volumes/Backup/Applications/Safari.app"),
			]
		);
	}

	#[test]
	fn parse_paths_keeps_interior_spaces() {
		assert_eq!(
			parse_paths("/Applications/Self Service.app\n"),
			vec![PathBuf::from("/Applications/Self Service.app")]
		);
	}
}
