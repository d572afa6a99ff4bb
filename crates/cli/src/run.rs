//! Wires the real collaborators together for one run.

use dockhand_engine::bundle::{PlistBuddyReader, ShallowWalker};
use dockhand_engine::command::CommandRunner;
use dockhand_engine::index::SpotlightIndex;
use dockhand_engine::lock::RunLock;
use dockhand_engine::prefs::{DefaultsStore, MemoryStore, PreferenceStore};
use dockhand_engine::{Config, FatalError, Pipeline, Resolver, RunOptions, RunSummary, TargetUser};

use crate::cli::Cli;

pub async fn run(cli: Cli) -> anyhow::Result<RunSummary> {
	let invocation = cli.invocation();

	let mut config = Config::load(cli.config.as_deref()).map_err(FatalError::from)?;
	if let Some(secs) = cli.timeout {
		config.command_timeout_secs = secs;
	}
	if let Some(dir) = cli.lock_dir {
		config.lock_dir = dir;
	}
	if cli.no_reload {
		config.reload_dock = false;
	}
	let fallbacks = config.fallback_table().map_err(FatalError::from)?;

	let target = TargetUser::resolve(invocation.user.as_deref()).map_err(FatalError::from)?;
	tracing::info!(
		user = %target.name,
		uid = target.uid,
		apps = invocation.apps.len(),
		dry_run = cli.dry_run,
		"dockhand.start"
	);

	let runner = CommandRunner::new(config.command_timeout());
	let index = SpotlightIndex::new(runner.clone());
	let metadata = PlistBuddyReader::new(runner.clone());
	let walker = ShallowWalker::default();
	let resolver = Resolver::new(&index, &metadata, &walker);
	let roots = config.search_roots_for(&target);
	let options = RunOptions {
		reload: config.reload_dock,
	};

	// Dry runs touch nothing on disk, so they skip the lock.
	let (_lock, store): (Option<RunLock>, Box<dyn PreferenceStore>) = if cli.dry_run {
		(None, Box::new(MemoryStore::new()))
	} else {
		let lock = RunLock::acquire(&config.lock_dir, &target, config.stale_lock_after()).map_err(FatalError::from)?;
		(Some(lock), Box::new(DefaultsStore::new(runner)))
	};

	let pipeline = Pipeline::new(resolver, &fallbacks, store.as_ref(), roots);
	Ok(pipeline.run(&target, &invocation.apps, options).await)
}
