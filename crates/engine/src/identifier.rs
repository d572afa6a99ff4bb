//! Application identifiers.
//!
//! Identifiers arrive as untrusted policy parameters and end up as arguments to
//! index and metadata queries, so they are held to a narrow grammar: ASCII
//! alphanumerics plus `.` and `-`, starting and ending with an alphanumeric.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Longest identifier accepted.
pub const MAX_IDENTIFIER_LEN: usize = 255;

/// Reasons an identifier string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
	#[error("identifier is empty")]
	Empty,
	#[error("identifier is longer than {MAX_IDENTIFIER_LEN} bytes")]
	TooLong,
	#[error("identifier contains {ch:?} at offset {offset}")]
	InvalidChar { ch: char, offset: usize },
	#[error("identifier must start and end with a letter or digit")]
	EdgeSeparator,
}

/// A validated reverse-DNS application identifier such as `com.apple.Safari`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AppId(String);

impl AppId {
	/// Validates `raw` against the identifier grammar.
	pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
		if raw.is_empty() {
			return Err(IdentifierError::Empty);
		}
		if raw.len() > MAX_IDENTIFIER_LEN {
			return Err(IdentifierError::TooLong);
		}
		if let Some((offset, ch)) = raw.char_indices().find(|(_, ch)| !is_identifier_char(*ch)) {
			return Err(IdentifierError::InvalidChar { ch, offset });
		}

		let bytes = raw.as_bytes();
		if !bytes[0].is_ascii_alphanumeric() || !bytes[bytes.len() - 1].is_ascii_alphanumeric() {
			return Err(IdentifierError::EdgeSeparator);
		}

		Ok(Self(raw.to_owned()))
	}

	/// Builds an identifier from a literal known to satisfy the grammar.
	pub(crate) fn from_static(raw: &'static str) -> Self {
		debug_assert!(Self::parse(raw).is_ok(), "invalid built-in identifier {raw:?}");
		Self(raw.to_owned())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

fn is_identifier_char(ch: char) -> bool {
	ch.is_ascii_alphanumeric() || ch == '.' || ch == '-'
}

impl FromStr for AppId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl fmt::Display for AppId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

impl AsRef<str> for AppId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("com.apple.Safari")]
	#[case("com.jamfsoftware.selfservice.mac")]
	#[case("org.mozilla.firefox")]
	#[case("com.microsoft.VSCode")]
	#[case("x")]
	#[case("com.example.app-beta2")]
	fn accepts_reverse_dns(#[case] raw: &str) {
		assert_eq!(AppId::parse(raw).map(|id| id.to_string()), Ok(raw.to_owned()));
	}

	#[rstest]
	#[case("", IdentifierError::Empty)]
	#[case(".com.apple", IdentifierError::EdgeSeparator)]
	#[case("com.apple.", IdentifierError::EdgeSeparator)]
	#[case("-rf", IdentifierError::EdgeSeparator)]
	#[case("com.apple;rm", IdentifierError::InvalidChar { ch: ';', offset: 9 })]
	#[case("com.apple.Safari$(id)", IdentifierError::InvalidChar { ch: '$', offset: 16 })]
	#[case("com apple", IdentifierError::InvalidChar { ch: ' ', offset: 3 })]
	#[case("com.app_le", IdentifierError::InvalidChar { ch: '_', offset: 7 })]
	#[case("com.äpple", IdentifierError::InvalidChar { ch: 'ä', offset: 4 })]
	fn rejects_outside_grammar(#[case] raw: &str, #[case] expected: IdentifierError) {
		assert_eq!(AppId::parse(raw), Err(expected));
	}

	#[test]
	fn rejects_overlong() {
		let raw = "a".repeat(MAX_IDENTIFIER_LEN + 1);
		assert_eq!(AppId::parse(&raw), Err(IdentifierError::TooLong));
		assert!(AppId::parse(&raw[..MAX_IDENTIFIER_LEN]).is_ok());
	}
}
