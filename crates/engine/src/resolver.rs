//! Identifier → installed bundle path.
//!
//! The content index is asked first. Only when it has nothing usable does the
//! resolver walk the search roots and read each bundle's manifest, which is
//! slow but does not depend on the index being built or current.

use std::path::PathBuf;

use crate::bundle::{BundleMetadata, BundleWalker, is_app_bundle};
use crate::identifier::AppId;
use crate::index::ContentIndex;

/// Which lookup produced a [`Resolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
	Index,
	Walk,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
	pub path: PathBuf,
	pub strategy: Strategy,
}

pub struct Resolver<'a> {
	index: &'a dyn ContentIndex,
	metadata: &'a dyn BundleMetadata,
	walker: &'a dyn BundleWalker,
}

impl<'a> Resolver<'a> {
	pub fn new(index: &'a dyn ContentIndex, metadata: &'a dyn BundleMetadata, walker: &'a dyn BundleWalker) -> Self {
		Self { index, metadata, walker }
	}

	/// Finds the bundle for `id`, walking `roots` in order if the index fails.
	pub async fn resolve(&self, id: &AppId, roots: &[PathBuf]) -> Option<Resolution> {
		if let Some(path) = self.from_index(id).await {
			return Some(Resolution {
				path,
				strategy: Strategy::Index,
			});
		}

		let path = self.from_walk(id, roots).await?;
		Some(Resolution {
			path,
			strategy: Strategy::Walk,
		})
	}

	/// First indexed `.app` path that still exists; the index may lag behind deletions.
	async fn from_index(&self, id: &AppId) -> Option<PathBuf> {
		let mut stale = 0usize;
		for path in self.index.lookup_by_identifier(id).await {
			if !is_app_bundle(&path) {
				continue;
			}
			if path.exists() {
				tracing::debug!(identifier = %id, path = %path.display(), "resolve.index.hit");
				return Some(path);
			}
			stale += 1;
		}

		tracing::debug!(identifier = %id, stale, "resolve.index.miss");
		None
	}

	async fn from_walk(&self, id: &AppId, roots: &[PathBuf]) -> Option<PathBuf> {
		for root in roots {
			for bundle in self.walker.bundles(root) {
				if self.metadata.read_bundle_identifier(&bundle).await.as_deref() == Some(id.as_str()) {
					tracing::debug!(identifier = %id, path = %bundle.display(), "resolve.walk.hit");
					return Some(bundle);
				}
			}
		}

		tracing::debug!(identifier = %id, roots = roots.len(), "resolve.walk.miss");
		None
	}
}
