//! Dock rebuild engine.
//!
//! Resolves application identifiers to installed bundles ([`resolver`]),
//! turns symlinked bundle paths into physical ones ([`canonical`]), encodes
//! them as Dock locators ([`locator`]) and writes them through a
//! [`prefs::PreferenceStore`]. [`pipeline`] ties these together for one
//! target user.

pub mod bundle;
pub mod canonical;
pub mod command;
pub mod config;
pub mod error;
pub mod fallback;
pub mod identifier;
pub mod index;
pub mod locator;
pub mod lock;
pub mod pipeline;
pub mod prefs;
pub mod resolver;
pub mod target;
#[doc(hidden)]
pub mod test_helpers;

pub use canonical::{CanonicalPath, canonicalize};
pub use config::Config;
pub use error::FatalError;
pub use fallback::FallbackTable;
pub use identifier::{AppId, IdentifierError};
pub use locator::DockEntryLocator;
pub use pipeline::{Pipeline, RunOptions, RunSummary};
pub use resolver::{Resolution, Resolver, Strategy};
pub use target::TargetUser;
