//! `file://` locators as stored in the Dock preferences.
//!
//! Encoding escapes a fixed punctuation table and leaves every other byte
//! alone, which is what the Dock itself writes for bundle paths.

use std::fmt;
use std::path::{Path, PathBuf};

const SCHEME_PREFIX: &str = "file://";

/// Punctuation written as `%XX`. Everything else passes through.
const ESCAPED: &[u8] = b" !\"#$%&'()*+,:;=?@[]";

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Percent-encodes `path` for use inside a locator.
pub fn encode_path(path: &str) -> String {
	let mut out = String::with_capacity(path.len());
	for ch in path.chars() {
		match u8::try_from(ch) {
			Ok(byte) if ESCAPED.contains(&byte) => {
				out.push('%');
				out.push(char::from(HEX_UPPER[usize::from(byte >> 4)]));
				out.push(char::from(HEX_UPPER[usize::from(byte & 0x0f)]));
			}
			_ => out.push(ch),
		}
	}
	out
}

/// Directory locator for a bundle, e.g. `file:///Applications/Self%20Service.app/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DockEntryLocator(String);

impl DockEntryLocator {
	pub fn from_path(path: &Path) -> Self {
		let mut locator = format!("{SCHEME_PREFIX}{}", encode_path(&path.to_string_lossy()));
		if !locator.ends_with('/') {
			locator.push('/');
		}
		Self(locator)
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Decodes the locator back into the filesystem path it was built from.
	pub fn to_path(&self) -> Option<PathBuf> {
		url::Url::parse(&self.0).ok()?.to_file_path().ok()
	}
}

impl fmt::Display for DockEntryLocator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("/Applications/Safari.app", "file:///Applications/Safari.app/")]
	#[case("/Applications/Self Service.app", "file:///Applications/Self%20Service.app/")]
	#[case("/Applications/Tom's App (Beta).app", "file:///Applications/Tom%27s%20App%20%28Beta%29.app/")]
	#[case("/Applications/R&D #1.app", "file:///Applications/R%26D%20%231.app/")]
	#[case("/Applications/100%.app", "file:///Applications/100%25.app/")]
	#[case("/Applications/a+b=c?d@e.app", "file:///Applications/a%2Bb%3Dc%3Fd%40e.app/")]
	#[case("/Applications/[x],y;z:w.app", "file:///Applications/%5Bx%5D%2Cy%3Bz%3Aw.app/")]
	#[case("/Applications/\"q\"*$!.app", "file:///Applications/%22q%22%2A%24%21.app/")]
	#[case("/Applications/under_score~tilde-dash.app", "file:///Applications/under_score~tilde-dash.app/")]
	fn encodes_punctuation_table(#[case] path: &str, #[case] expected: &str) {
		assert_eq!(DockEntryLocator::from_path(Path::new(path)).as_str(), expected);
	}

	#[test]
	fn bytes_outside_table_pass_through() {
		assert_eq!(encode_path("/Applications/Café<1>^{}|.app"), "/Applications/Café<1>^{}|.app");
	}

	#[test]
	fn trailing_slash_is_not_doubled() {
		assert_eq!(DockEntryLocator::from_path(Path::new("/")).as_str(), "file:///");
	}

	#[rstest]
	#[case("/Applications/Safari.app")]
	#[case("/Applications/Self Service.app")]
	#[case("/Users/alice/Applications/Tom's App (Beta) #2.app")]
	#[case("/Applications/a+b=c?d@e&f$g!h,i;j:k[l]m'n\"o*p%q.app")]
	#[case("/opt/under_score~tilde-dash/X.app")]
	fn decoding_reproduces_path(#[case] path: &str) {
		let locator = DockEntryLocator::from_path(Path::new(path));
		assert_eq!(locator.to_path(), Some(PathBuf::from(path)));
	}

	#[test]
	fn distinct_paths_get_distinct_locators() {
		let plain = DockEntryLocator::from_path(Path::new("/Applications/a b.app"));
		let escaped = DockEntryLocator::from_path(Path::new("/Applications/a%20b.app"));
		assert_ne!(plain, escaped);
		assert_eq!(escaped.as_str(), "file:///Applications/a%2520b.app/");
	}
}
