//! One Dock rebuild: clear, resolve each requested identifier, append, reload.
//!
//! Identifier-level problems are logged and skipped; nothing here aborts the
//! remaining list.

use std::path::PathBuf;

use thiserror::Error;
use tracing::Instrument;

use crate::canonical::{CanonicalPath, canonicalize};
use crate::fallback::FallbackTable;
use crate::identifier::AppId;
use crate::locator::DockEntryLocator;
use crate::prefs::{DockRecord, PreferenceError, PreferenceStore};
use crate::resolver::Resolver;
use crate::target::TargetUser;

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
	/// Non-empty identifiers supplied.
	pub requested: usize,
	/// Records appended to the preference store.
	pub written: usize,
	/// Identifiers that produced no record.
	pub skipped: usize,
	/// Records that came from a substitute identifier.
	pub fallbacks_used: usize,
	pub reloaded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
	/// Restart the Dock once all identifiers are processed.
	pub reload: bool,
}

impl Default for RunOptions {
	fn default() -> Self {
		Self { reload: true }
	}
}

#[derive(Debug, Error)]
enum ItemError {
	#[error("no installed application has identifier {0}")]
	NotFound(AppId),
	#[error("{} disappeared before it could be written", .path.display())]
	Vanished { path: PathBuf },
	#[error("preference write failed: {0}")]
	Write(#[from] PreferenceError),
}

/// A located record and the identifier that actually matched.
struct Placement {
	record: DockRecord,
	via_fallback: bool,
}

pub struct Pipeline<'a> {
	resolver: Resolver<'a>,
	fallbacks: &'a FallbackTable,
	store: &'a dyn PreferenceStore,
	roots: Vec<PathBuf>,
}

impl<'a> Pipeline<'a> {
	/// `roots` are the fallback-walk roots for the target this pipeline serves.
	pub fn new(resolver: Resolver<'a>, fallbacks: &'a FallbackTable, store: &'a dyn PreferenceStore, roots: Vec<PathBuf>) -> Self {
		Self {
			resolver,
			fallbacks,
			store,
			roots,
		}
	}

	/// Rebuilds `target`'s Dock from `identifiers`, in order.
	pub async fn run<S: AsRef<str>>(&self, target: &TargetUser, identifiers: &[S], options: RunOptions) -> RunSummary {
		let span = tracing::info_span!("pipeline", user = %target.name);
		async move {
			let mut summary = RunSummary::default();

			if let Err(error) = self.store.clear_entries(target).await {
				tracing::warn!(%error, "pipeline.clear_failed");
			}

			for raw in identifiers {
				let raw = raw.as_ref().trim();
				if raw.is_empty() {
					continue;
				}
				summary.requested += 1;

				let id = match AppId::parse(raw) {
					Ok(id) => id,
					Err(error) => {
						tracing::warn!(identifier = raw, %error, "pipeline.item.malformed");
						summary.skipped += 1;
						continue;
					}
				};

				match self.place(target, &id).await {
					Ok(placement) => {
						summary.written += 1;
						if placement.via_fallback {
							summary.fallbacks_used += 1;
						}
						tracing::info!(identifier = %id, locator = %placement.record.locator(), "pipeline.item.written");
					}
					Err(error) => {
						summary.skipped += 1;
						tracing::warn!(identifier = %id, %error, "pipeline.item.skipped");
					}
				}
			}

			if options.reload {
				match self.store.reload(target).await {
					Ok(()) => summary.reloaded = true,
					Err(error) => tracing::warn!(%error, "pipeline.reload_failed"),
				}
			}

			tracing::info!(
				requested = summary.requested,
				written = summary.written,
				skipped = summary.skipped,
				fallbacks = summary.fallbacks_used,
				reloaded = summary.reloaded,
				"pipeline.done"
			);
			summary
		}
		.instrument(span)
		.await
	}

	/// Locates `id` (or its substitute) and appends it to the store.
	async fn place(&self, target: &TargetUser, id: &AppId) -> Result<Placement, ItemError> {
		let (record, via_fallback) = match self.locate(id).await {
			Ok(record) => (record, false),
			Err(error) => {
				let Some(alternate) = self.fallbacks.substitute(id) else {
					return Err(error);
				};
				tracing::info!(identifier = %id, fallback = %alternate, %error, "pipeline.fallback.attempt");
				match self.locate(alternate).await {
					Ok(record) => {
						tracing::info!(identifier = %id, fallback = %alternate, "pipeline.fallback.succeeded");
						(record, true)
					}
					Err(fallback_error) => {
						tracing::info!(identifier = %id, fallback = %alternate, error = %fallback_error, "pipeline.fallback.failed");
						return Err(error);
					}
				}
			}
		};

		self.store.append_entry(target, &record).await?;
		Ok(Placement { record, via_fallback })
	}

	/// Resolver → canonicalizer → locator for a single identifier.
	async fn locate(&self, id: &AppId) -> Result<DockRecord, ItemError> {
		let resolution = self
			.resolver
			.resolve(id, &self.roots)
			.await
			.ok_or_else(|| ItemError::NotFound(id.clone()))?;

		let canonical = canonicalize(&resolution.path);
		match &canonical {
			CanonicalPath::Normalized(path) => {
				tracing::debug!(identifier = %id, from = %resolution.path.display(), to = %path.display(), "pipeline.item.normalized");
			}
			CanonicalPath::RawSymlinkTarget(path) => {
				tracing::warn!(identifier = %id, from = %resolution.path.display(), to = %path.display(), "pipeline.item.unnormalized");
			}
			CanonicalPath::Original(_) => {}
		}

		let path = canonical.into_path_buf();
		if !path.exists() {
			return Err(ItemError::Vanished { path });
		}

		Ok(DockRecord::new(DockEntryLocator::from_path(&path)))
	}
}
