//! Advisory per-user run lock.
//!
//! The lock is a directory, because `mkdir` is atomic on every filesystem the
//! tool runs on. The holder writes its pid inside so a later run can tell a
//! crashed holder from a live one.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use thiserror::Error;

use crate::target::TargetUser;

/// Age after which a lock is reclaimed even if its holder still appears alive.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(600);

const PID_FILE: &str = "pid";

#[derive(Debug, Error)]
pub enum LockError {
	#[error("another run holds {} (pid {})", path.display(), pid.map_or_else(|| "unknown".to_owned(), |pid| pid.to_string()))]
	Held { path: PathBuf, pid: Option<i32> },
	#[error("lock I/O on {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
}

/// Held lock; released when dropped.
#[derive(Debug)]
pub struct RunLock {
	path: PathBuf,
}

impl RunLock {
	/// Takes the lock for `user` under `lock_dir`, reclaiming it once if stale.
	pub fn acquire(lock_dir: &Path, user: &TargetUser, stale_after: Duration) -> Result<Self, LockError> {
		fs::create_dir_all(lock_dir).map_err(|source| LockError::Io {
			path: lock_dir.to_path_buf(),
			source,
		})?;

		let path = lock_dir.join(format!("dockhand.{}.lock", user.name));
		match create(&path) {
			Ok(()) => {}
			Err(err) if err.kind() == ErrorKind::AlreadyExists => {
				let pid = holder_pid(&path);
				if !is_stale(&path, pid, stale_after) {
					return Err(LockError::Held { path, pid });
				}

				tracing::warn!(path = %path.display(), pid, "lock.reclaim_stale");
				fs::remove_dir_all(&path).map_err(|source| LockError::Io {
					path: path.clone(),
					source,
				})?;
				create(&path).map_err(|source| match source.kind() {
					ErrorKind::AlreadyExists => LockError::Held {
						pid: holder_pid(&path),
						path: path.clone(),
					},
					_ => LockError::Io {
						path: path.clone(),
						source,
					},
				})?;
			}
			Err(source) => return Err(LockError::Io { path, source }),
		}

		tracing::debug!(path = %path.display(), "lock.acquired");
		Ok(Self { path })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl Drop for RunLock {
	fn drop(&mut self) {
		if let Err(error) = fs::remove_dir_all(&self.path) {
			tracing::warn!(path = %self.path.display(), %error, "lock.release_failed");
		} else {
			tracing::debug!(path = %self.path.display(), "lock.released");
		}
	}
}

fn create(path: &Path) -> io::Result<()> {
	fs::create_dir(path)?;
	if let Err(err) = fs::write(path.join(PID_FILE), format!("{}\n", std::process::id())) {
		let _ = fs::remove_dir_all(path);
		return Err(err);
	}
	Ok(())
}

fn holder_pid(path: &Path) -> Option<i32> {
	fs::read_to_string(path.join(PID_FILE)).ok()?.trim().parse().ok()
}

fn is_stale(path: &Path, pid: Option<i32>, stale_after: Duration) -> bool {
	let expired = fs::metadata(path)
		.and_then(|meta| meta.modified())
		.ok()
		.and_then(|modified| SystemTime::now().duration_since(modified).ok())
		.is_some_and(|age| age > stale_after);

	match pid {
		Some(pid) => expired || !process_alive(pid),
		None => expired,
	}
}

fn process_alive(pid: i32) -> bool {
	if pid <= 0 {
		return false;
	}
	// EPERM means the process exists under another uid.
	matches!(kill(Pid::from_raw(pid), None), Ok(()) | Err(Errno::EPERM))
}
