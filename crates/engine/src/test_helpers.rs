//! In-memory collaborators for exercising the pipeline without Spotlight or `PlistBuddy`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::bundle::BundleMetadata;
use crate::identifier::AppId;
use crate::index::ContentIndex;

/// [`ContentIndex`] answering from a fixed table.
#[derive(Debug, Default)]
pub struct StaticIndex {
	entries: HashMap<String, Vec<PathBuf>>,
	queries: AtomicUsize,
}

impl StaticIndex {
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with(mut self, id: &str, path: impl Into<PathBuf>) -> Self {
		self.entries.entry(id.to_owned()).or_default().push(path.into());
		self
	}

	pub fn queries(&self) -> usize {
		self.queries.load(Ordering::Relaxed)
	}
}

#[async_trait]
impl ContentIndex for StaticIndex {
	async fn lookup_by_identifier(&self, id: &AppId) -> Vec<PathBuf> {
		self.queries.fetch_add(1, Ordering::Relaxed);
		self.entries.get(id.as_str()).cloned().unwrap_or_default()
	}
}

/// [`BundleMetadata`] answering from a fixed bundle → identifier table.
#[derive(Debug, Default)]
pub struct StaticMetadata {
	entries: HashMap<PathBuf, String>,
	reads: AtomicUsize,
}

impl StaticMetadata {
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with(mut self, bundle: impl Into<PathBuf>, id: &str) -> Self {
		self.entries.insert(bundle.into(), id.to_owned());
		self
	}

	pub fn reads(&self) -> usize {
		self.reads.load(Ordering::Relaxed)
	}
}

#[async_trait]
impl BundleMetadata for StaticMetadata {
	async fn read_bundle_identifier(&self, bundle: &Path) -> Option<String> {
		self.reads.fetch_add(1, Ordering::Relaxed);
		self.entries.get(bundle).cloned()
	}
}
