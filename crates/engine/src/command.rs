//! Subprocess invocation with a bounded wait.
//!
//! Every external query (index search, manifest read, preference write) goes
//! through [`CommandRunner`], which kills the child and reports
//! [`CommandError::TimedOut`] when it outlives the configured timeout.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use thiserror::Error;

use crate::target::TargetUser;

/// Wait applied to each subprocess unless configured otherwise.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure modes of a supervised subprocess.
#[derive(Debug, Error)]
pub enum CommandError {
	#[error("failed to spawn {program}: {source}")]
	Spawn {
		program: String,
		#[source]
		source: io::Error,
	},
	#[error("failed waiting on {program}: {source}")]
	Wait {
		program: String,
		#[source]
		source: io::Error,
	},
	#[error("{program} did not finish within {}ms", timeout.as_millis())]
	TimedOut { program: String, timeout: Duration },
	#[error("{program} exited with {status}: {stderr}")]
	Failed {
		program: String,
		status: ExitStatus,
		stderr: String,
	},
}

impl CommandError {
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::TimedOut { .. })
	}
}

/// A program and its arguments, built without a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
	program: String,
	args: Vec<OsString>,
}

impl CommandLine {
	pub fn new(program: impl Into<String>) -> Self {
		Self {
			program: program.into(),
			args: Vec::new(),
		}
	}

	#[must_use]
	pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
		self.args.push(arg.into());
		self
	}

	pub fn program(&self) -> &str {
		&self.program
	}

	pub fn args(&self) -> &[OsString] {
		&self.args
	}

	/// Runs the command in `user`'s login session when this process is privileged.
	///
	/// Unprivileged processes can only act as themselves, so the command is
	/// returned unchanged.
	#[must_use]
	pub fn as_user(self, user: &TargetUser) -> Self {
		if nix::unistd::geteuid().is_root() && user.uid != 0 {
			self.wrap_for_user(user)
		} else {
			self
		}
	}

	/// Prefixes the command with `launchctl asuser <uid> sudo -u <name>`.
	#[must_use]
	pub fn wrap_for_user(self, user: &TargetUser) -> Self {
		let mut args: Vec<OsString> = vec![
			"asuser".into(),
			user.uid.to_string().into(),
			"sudo".into(),
			"-u".into(),
			user.name.clone().into(),
			self.program.into(),
		];
		args.extend(self.args);
		Self {
			program: "launchctl".to_owned(),
			args,
		}
	}
}

impl fmt::Display for CommandLine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.program)?;
		for arg in &self.args {
			write!(f, " {}", arg.to_string_lossy())?;
		}
		Ok(())
	}
}

/// Spawns [`CommandLine`]s and collects their stdout under a timeout.
#[derive(Debug, Clone)]
pub struct CommandRunner {
	timeout: Duration,
}

impl Default for CommandRunner {
	fn default() -> Self {
		Self::new(DEFAULT_COMMAND_TIMEOUT)
	}
}

impl CommandRunner {
	pub fn new(timeout: Duration) -> Self {
		Self { timeout }
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Runs `command` to completion and returns its stdout.
	///
	/// The child is killed if the timeout elapses first.
	pub async fn run(&self, command: &CommandLine) -> Result<String, CommandError> {
		let program = command.program().to_owned();
		tracing::trace!(command = %command, "command.spawn");

		let child = tokio::process::Command::new(command.program())
			.args(command.args())
			.stdin(Stdio::null())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.kill_on_drop(true)
			.spawn()
			.map_err(|source| CommandError::Spawn {
				program: program.clone(),
				source,
			})?;

		let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
			Ok(Ok(output)) => output,
			Ok(Err(source)) => return Err(CommandError::Wait { program, source }),
			Err(_) => {
				tracing::warn!(command = %command, timeout_ms = self.timeout.as_millis() as u64, "command.timeout");
				return Err(CommandError::TimedOut {
					program,
					timeout: self.timeout,
				});
			}
		};

		if !output.status.success() {
			return Err(CommandError::Failed {
				program,
				status: output.status,
				stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
			});
		}

		Ok(String::from_utf8_lossy(&output.stdout).into_owned())
	}
}

#[cfg(test)]
mod tests;
