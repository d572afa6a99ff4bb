//! Dock preference writes.
//!
//! The pipeline only ever clears `persistent-apps`, appends to it, and asks the
//! Dock to reload. It never reads the list back.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

use crate::command::{CommandError, CommandLine, CommandRunner};
use crate::locator::DockEntryLocator;
use crate::target::TargetUser;

pub const DOCK_DOMAIN: &str = "com.apple.dock";
pub const PERSISTENT_APPS_KEY: &str = "persistent-apps";
/// `_CFURLStringType` value for absolute `file://` URL strings.
pub const URL_STRING_TYPE: u8 = 15;
pub const TILE_TYPE: &str = "file-tile";

#[derive(Debug, Error)]
pub enum PreferenceError {
	#[error(transparent)]
	Command(#[from] CommandError),
}

/// One `persistent-apps` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockRecord {
	locator: DockEntryLocator,
}

impl DockRecord {
	pub fn new(locator: DockEntryLocator) -> Self {
		Self { locator }
	}

	pub fn locator(&self) -> &DockEntryLocator {
		&self.locator
	}

	/// Plist XML fragment accepted by `defaults write ... -array-add`.
	pub fn to_plist_xml(&self) -> String {
		format!(
			"<dict><key>tile-data</key><dict><key>file-data</key><dict>\
			 <key>_CFURLString</key><string>{}</string>\
			 <key>_CFURLStringType</key><integer>{URL_STRING_TYPE}</integer>\
			 </dict></dict><key>tile-type</key><string>{TILE_TYPE}</string></dict>",
			xml_escape(self.locator.as_str())
		)
	}
}

fn xml_escape(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len());
	for ch in raw.chars() {
		match ch {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			_ => out.push(ch),
		}
	}
	out
}

/// The host preference store for one user's Dock.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
	/// Empties the application list.
	async fn clear_entries(&self, target: &TargetUser) -> Result<(), PreferenceError>;

	/// Appends one record to the end of the application list.
	async fn append_entry(&self, target: &TargetUser, record: &DockRecord) -> Result<(), PreferenceError>;

	/// Restarts the Dock so it picks up the new list.
	async fn reload(&self, target: &TargetUser) -> Result<(), PreferenceError>;
}

/// [`PreferenceStore`] driving `defaults` and `killall`.
#[derive(Debug, Clone)]
pub struct DefaultsStore {
	runner: CommandRunner,
}

impl DefaultsStore {
	pub fn new(runner: CommandRunner) -> Self {
		Self { runner }
	}

	pub fn clear_command(target: &TargetUser) -> CommandLine {
		CommandLine::new("defaults")
			.arg("write")
			.arg(DOCK_DOMAIN)
			.arg(PERSISTENT_APPS_KEY)
			.arg("-array")
			.as_user(target)
	}

	pub fn append_command(target: &TargetUser, record: &DockRecord) -> CommandLine {
		CommandLine::new("defaults")
			.arg("write")
			.arg(DOCK_DOMAIN)
			.arg(PERSISTENT_APPS_KEY)
			.arg("-array-add")
			.arg(record.to_plist_xml())
			.as_user(target)
	}

	pub fn reload_command(target: &TargetUser) -> CommandLine {
		CommandLine::new("killall").arg("Dock").as_user(target)
	}
}

#[async_trait]
impl PreferenceStore for DefaultsStore {
	async fn clear_entries(&self, target: &TargetUser) -> Result<(), PreferenceError> {
		self.runner.run(&Self::clear_command(target)).await?;
		Ok(())
	}

	async fn append_entry(&self, target: &TargetUser, record: &DockRecord) -> Result<(), PreferenceError> {
		self.runner.run(&Self::append_command(target, record)).await?;
		Ok(())
	}

	async fn reload(&self, target: &TargetUser) -> Result<(), PreferenceError> {
		self.runner.run(&Self::reload_command(target)).await?;
		Ok(())
	}
}

/// What a [`MemoryStore`] holds for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryDock {
	pub clears: usize,
	pub entries: Vec<String>,
	pub reloads: usize,
}

/// In-process [`PreferenceStore`] used for dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
	docks: Mutex<BTreeMap<String, MemoryDock>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Copy of the state recorded for `user`.
	pub fn dock(&self, user: &str) -> MemoryDock {
		self.docks.lock().get(user).cloned().unwrap_or_default()
	}
}

#[async_trait]
impl PreferenceStore for MemoryStore {
	async fn clear_entries(&self, target: &TargetUser) -> Result<(), PreferenceError> {
		tracing::info!(user = %target.name, "prefs.dry_run.clear");
		let mut docks = self.docks.lock();
		let dock = docks.entry(target.name.clone()).or_default();
		dock.clears += 1;
		dock.entries.clear();
		Ok(())
	}

	async fn append_entry(&self, target: &TargetUser, record: &DockRecord) -> Result<(), PreferenceError> {
		tracing::info!(user = %target.name, locator = %record.locator(), "prefs.dry_run.append");
		self.docks
			.lock()
			.entry(target.name.clone())
			.or_default()
			.entries
			.push(record.locator().as_str().to_owned());
		Ok(())
	}

	async fn reload(&self, target: &TargetUser) -> Result<(), PreferenceError> {
		tracing::info!(user = %target.name, "prefs.dry_run.reload");
		self.docks.lock().entry(target.name.clone()).or_default().reloads += 1;
		Ok(())
	}
}
