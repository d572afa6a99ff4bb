//! The account whose Dock is being configured.
//!
//! A run targets exactly one user. The identity is resolved once up front and
//! then passed explicitly to everything that needs it, so several targets can
//! coexist in one process (tests do this).

use std::fs;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use nix::unistd::{Uid, User};
use thiserror::Error;

/// Device whose owner is the user logged in at the console.
pub const CONSOLE_DEVICE: &str = "/dev/console";

/// Accounts that never own a Dock worth configuring.
const DISALLOWED_NAMES: &[&str] = &["root", "loginwindow", "_mbsetupuser"];

#[derive(Debug, Error)]
pub enum TargetError {
	#[error("cannot inspect console owner via {path}: {source}")]
	Console {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("no account exists for console owner uid {0}")]
	NoConsoleUser(u32),
	#[error("no account named {0:?}")]
	UnknownUser(String),
	#[error("account lookup failed: {0}")]
	Lookup(#[from] nix::errno::Errno),
	#[error("refusing to configure the Dock of {name:?} (uid {uid})")]
	Disallowed { name: String, uid: u32 },
}

/// Resolved identity of the target account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUser {
	pub name: String,
	pub uid: u32,
	pub home: PathBuf,
}

impl TargetUser {
	pub fn new(name: impl Into<String>, uid: u32, home: impl Into<PathBuf>) -> Self {
		Self {
			name: name.into(),
			uid,
			home: home.into(),
		}
	}

	/// Resolves the named account, or the console user when `explicit` is empty.
	pub fn resolve(explicit: Option<&str>) -> Result<Self, TargetError> {
		Self::resolve_with_console(explicit, Path::new(CONSOLE_DEVICE))
	}

	/// Like [`TargetUser::resolve`], reading the console owner from `console`.
	pub fn resolve_with_console(explicit: Option<&str>, console: &Path) -> Result<Self, TargetError> {
		let user = match explicit.map(str::trim).filter(|name| !name.is_empty()) {
			Some(name) => User::from_name(name)?.ok_or_else(|| TargetError::UnknownUser(name.to_owned()))?,
			None => {
				let uid = fs::metadata(console)
					.map_err(|source| TargetError::Console {
						path: console.to_path_buf(),
						source,
					})?
					.uid();
				User::from_uid(Uid::from_raw(uid))?.ok_or(TargetError::NoConsoleUser(uid))?
			}
		};

		let target = Self::new(user.name, user.uid.as_raw(), user.dir);
		target.ensure_allowed()?;
		tracing::debug!(user = %target.name, uid = target.uid, home = %target.home.display(), "target.resolved");
		Ok(target)
	}

	pub fn ensure_allowed(&self) -> Result<(), TargetError> {
		if is_disallowed(&self.name, self.uid) {
			return Err(TargetError::Disallowed {
				name: self.name.clone(),
				uid: self.uid,
			});
		}
		Ok(())
	}

	/// The per-user `~/Applications` folder.
	pub fn applications_dir(&self) -> PathBuf {
		self.home.join("Applications")
	}
}

/// Whether `name`/`uid` is a privileged or service account.
pub fn is_disallowed(name: &str, uid: u32) -> bool {
	uid == 0 || name.is_empty() || name.starts_with('_') || DISALLOWED_NAMES.contains(&name)
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("root", 0, true)]
	#[case("admin", 0, true)]
	#[case("loginwindow", 501, true)]
	#[case("_mbsetupuser", 248, true)]
	#[case("_spotlight", 89, true)]
	#[case("", 501, true)]
	#[case("alice", 501, false)]
	#[case("bob.smith", 1042, false)]
	fn disallowed_accounts(#[case] name: &str, #[case] uid: u32, #[case] expected: bool) {
		assert_eq!(is_disallowed(name, uid), expected);
	}

	#[test]
	fn explicit_root_is_refused() {
		let err = TargetUser::resolve(Some("root")).expect_err("root is disallowed");
		assert!(matches!(err, TargetError::Disallowed { uid: 0, .. }), "{err}");
	}

	#[test]
	fn unknown_account_is_reported() {
		let err = TargetUser::resolve(Some("dockhand-no-such-user")).expect_err("account is missing");
		assert!(matches!(err, TargetError::UnknownUser(ref name) if name == "dockhand-no-such-user"), "{err}");
	}

	#[test]
	fn console_owner_is_used_when_no_name_given() {
		let dir = tempfile::tempdir().expect("must create tempdir");
		let console = dir.path().join("console");
		fs::write(&console, "").expect("must create console stand-in");
		let euid = nix::unistd::geteuid().as_raw();

		match TargetUser::resolve_with_console(Some("  "), &console) {
			Ok(target) => assert_eq!(target.uid, euid),
			Err(TargetError::Disallowed { uid, .. }) => assert_eq!(uid, euid),
			Err(TargetError::NoConsoleUser(uid)) => assert_eq!(uid, euid),
			Err(other) => panic!("unexpected error: {other}"),
		}
	}

	#[test]
	fn missing_console_device_is_an_error() {
		let dir = tempfile::tempdir().expect("must create tempdir");
		let err = TargetUser::resolve_with_console(None, &dir.path().join("absent")).expect_err("console is missing");
		assert!(matches!(err, TargetError::Console { .. }), "{err}");
	}

	#[test]
	fn applications_dir_is_under_home() {
		let target = TargetUser::new("alice", 501, "/Users/alice");
		assert_eq!(target.applications_dir(), PathBuf::from("/Users/alice/Applications"));
	}
}
