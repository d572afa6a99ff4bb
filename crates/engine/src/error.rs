//! Conditions that stop a run before any identifier is processed.

use thiserror::Error;

use crate::config::ConfigError;
use crate::lock::LockError;
use crate::target::TargetError;

/// A precondition failure. Identifier-level problems never end up here.
#[derive(Debug, Error)]
pub enum FatalError {
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error(transparent)]
	Target(#[from] TargetError),
	#[error(transparent)]
	Lock(#[from] LockError),
}

impl FatalError {
	/// Process exit status, following `sysexits.h`.
	pub fn exit_code(&self) -> u8 {
		match self {
			Self::Config(_) => 78,
			Self::Target(_) => 67,
			Self::Lock(LockError::Held { .. }) => 75,
			Self::Lock(LockError::Io { .. }) => 74,
		}
	}
}
