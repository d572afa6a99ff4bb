//! Application bundles on disk: enumeration and manifest reads.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ignore::WalkBuilder;

use crate::command::{CommandLine, CommandRunner};

/// Extension carried by application bundle directories.
pub const APP_EXTENSION: &str = "app";

/// Depth of the fallback walk: direct children plus one nested level.
pub const WALK_DEPTH: usize = 2;

const PLIST_BUDDY: &str = "/usr/libexec/PlistBuddy";

/// Whether `path` names an application bundle.
pub fn is_app_bundle(path: &Path) -> bool {
	path.extension() == Some(OsStr::new(APP_EXTENSION))
}

/// Path of the manifest inside a bundle.
pub fn info_plist(bundle: &Path) -> PathBuf {
	bundle.join("Contents").join("Info.plist")
}

/// Reads the identifier embedded in a bundle's manifest.
#[async_trait]
pub trait BundleMetadata: Send + Sync {
	async fn read_bundle_identifier(&self, bundle: &Path) -> Option<String>;
}

/// Lists candidate bundles below a search root.
pub trait BundleWalker: Send + Sync {
	fn bundles(&self, root: &Path) -> Vec<PathBuf>;
}

/// [`BundleMetadata`] that asks `PlistBuddy` for `CFBundleIdentifier`.
///
/// `PlistBuddy` reads both XML and binary manifests.
#[derive(Debug, Clone)]
pub struct PlistBuddyReader {
	runner: CommandRunner,
}

impl PlistBuddyReader {
	pub fn new(runner: CommandRunner) -> Self {
		Self { runner }
	}
}

#[async_trait]
impl BundleMetadata for PlistBuddyReader {
	async fn read_bundle_identifier(&self, bundle: &Path) -> Option<String> {
		let command = CommandLine::new(PLIST_BUDDY)
			.arg("-c")
			.arg("Print :CFBundleIdentifier")
			.arg(info_plist(bundle));
		match self.runner.run(&command).await {
			Ok(stdout) => Some(stdout.trim().to_owned()).filter(|id| !id.is_empty()),
			Err(error) => {
				tracing::trace!(bundle = %bundle.display(), %error, "bundle.metadata_unreadable");
				None
			}
		}
	}
}

/// Shallow, name-ordered walk for `.app` directories.
///
/// Symlinked bundles are reported but never descended into.
#[derive(Debug, Clone)]
pub struct ShallowWalker {
	max_depth: usize,
}

impl Default for ShallowWalker {
	fn default() -> Self {
		Self { max_depth: WALK_DEPTH }
	}
}

impl ShallowWalker {
	pub fn with_max_depth(max_depth: usize) -> Self {
		Self { max_depth }
	}
}

impl BundleWalker for ShallowWalker {
	fn bundles(&self, root: &Path) -> Vec<PathBuf> {
		WalkBuilder::new(root)
			.standard_filters(false)
			.follow_links(false)
			.max_depth(Some(self.max_depth))
			.sort_by_file_name(|a, b| a.cmp(b))
			.build()
			.filter_map(Result::ok)
			.filter(|entry| entry.depth() > 0 && is_app_bundle(entry.path()) && entry.path().is_dir())
			.map(|entry| entry.into_path())
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use std::fs;

	use pretty_assertions::assert_eq;

	use super::*;

	fn mkdir(path: &Path) {
		fs::create_dir_all(path).expect("must create directory");
	}

	#[test]
	fn is_app_bundle_checks_extension() {
		assert!(is_app_bundle(Path::new("/Applications/Safari.app")));
		assert!(is_app_bundle(Path::new("/Applications/Self Service.app")));
		assert!(!is_app_bundle(Path::new("/Applications/Safari.app/Contents")));
		assert!(!is_app_bundle(Path::new("/Applications/app")));
		assert!(!is_app_bundle(Path::new("/Applications/Notes.apps")));
	}

	#[test]
	fn info_plist_lives_in_contents() {
		assert_eq!(
			info_plist(Path::new("/Applications/Safari.app")),
			PathBuf::from("/Applications/Safari.app/Contents/Info.plist")
		);
	}

	#[test]
	fn walker_finds_direct_and_nested_bundles_in_name_order() {
		let dir = tempfile::tempdir().expect("must create tempdir");
		let root = dir.path();
		mkdir(&root.join("Zed.app/Contents"));
		mkdir(&root.join("Calendar.app/Contents"));
		mkdir(&root.join("Utilities/Terminal.app/Contents"));
		mkdir(&root.join("Utilities/Deep/Hidden.app"));
		mkdir(&root.join("NotABundle"));
		fs::write(root.join("Fake.app"), "").expect("must write file");

		let found = ShallowWalker::default().bundles(root);
		assert_eq!(
			found,
			vec![
				root.join("Calendar.app"),
				root.join("Utilities/Terminal.app"),
				root.join("Zed.app"),
			]
		);
	}

	#[cfg(unix)]
	#[test]
	fn walker_reports_symlinked_bundles() {
		let dir = tempfile::tempdir().expect("must create tempdir");
		let real = dir.path().join("real");
		let root = dir.path().join("root");
		mkdir(&real.join("Tool.app/Contents"));
		mkdir(&root);
		std::os::unix::fs::symlink(real.join("Tool.app"), root.join("Tool.app")).expect("must create symlink");

		assert_eq!(ShallowWalker::default().bundles(&root), vec![root.join("Tool.app")]);
	}

	#[test]
	fn walker_on_missing_root_is_empty() {
		let dir = tempfile::tempdir().expect("must create tempdir");
		assert!(ShallowWalker::default().bundles(&dir.path().join("absent")).is_empty());
	}

	#[test]
	fn walker_depth_is_configurable() {
		let dir = tempfile::tempdir().expect("must create tempdir");
		mkdir(&dir.path().join("Top.app"));
		mkdir(&dir.path().join("Utilities/Nested.app"));

		assert_eq!(ShallowWalker::with_max_depth(1).bundles(dir.path()), vec![dir.path().join("Top.app")]);
	}
}
