//! Symlink resolution for discovered bundle paths.
//!
//! Only symlinked bundles are rewritten. A path that is not a link is returned
//! as-is, so canonicalizing twice gives the same answer as canonicalizing once.

use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of [`canonicalize`], tagged with the tier that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalPath {
	/// Symlink target resolved to an existing physical path.
	Normalized(PathBuf),
	/// Symlink target that could not be normalized, used verbatim.
	RawSymlinkTarget(PathBuf),
	/// Input path, unchanged: not a symlink, or its target was unreadable.
	Original(PathBuf),
}

impl CanonicalPath {
	pub fn path(&self) -> &Path {
		match self {
			Self::Normalized(path) | Self::RawSymlinkTarget(path) | Self::Original(path) => path,
		}
	}

	pub fn into_path_buf(self) -> PathBuf {
		match self {
			Self::Normalized(path) | Self::RawSymlinkTarget(path) | Self::Original(path) => path,
		}
	}

	pub fn tier(&self) -> &'static str {
		match self {
			Self::Normalized(_) => "normalized",
			Self::RawSymlinkTarget(_) => "raw_symlink_target",
			Self::Original(_) => "original",
		}
	}
}

/// Resolves a symlinked bundle path to its physical location.
pub fn canonicalize(path: &Path) -> CanonicalPath {
	let Some(target) = symlink_target(path) else {
		return CanonicalPath::Original(path.to_path_buf());
	};

	match physical(&target) {
		Some(resolved) if resolved.exists() => CanonicalPath::Normalized(resolved),
		_ => {
			tracing::debug!(link = %path.display(), target = %target.display(), "canonical.unnormalized");
			CanonicalPath::RawSymlinkTarget(target)
		}
	}
}

/// Immediate target of `path` if it is a symlink; relative targets are anchored at the link's directory.
fn symlink_target(path: &Path) -> Option<PathBuf> {
	let meta = fs::symlink_metadata(path).ok()?;
	if !meta.file_type().is_symlink() {
		return None;
	}

	let target = match fs::read_link(path) {
		Ok(target) => target,
		Err(error) => {
			tracing::debug!(link = %path.display(), %error, "canonical.read_link_failed");
			return None;
		}
	};

	if target.is_absolute() {
		Some(target)
	} else {
		Some(path.parent().unwrap_or_else(|| Path::new("")).join(target))
	}
}

/// Physical form of `target`: directories resolve whole, anything else through its parent.
fn physical(target: &Path) -> Option<PathBuf> {
	if target.is_dir() {
		return fs::canonicalize(target).ok();
	}

	let name = target.file_name()?;
	let parent = target.parent().filter(|parent| !parent.as_os_str().is_empty())?;
	fs::canonicalize(parent).ok().map(|parent| parent.join(name))
}
