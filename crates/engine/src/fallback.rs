//! Identifier substitutions tried when a requested application is not installed.

use std::collections::BTreeMap;

use crate::identifier::AppId;

/// Built-in substitutions: the newer "plus" Self Service build falls back to the classic one.
const BUILTIN: &[(&str, &str)] = &[("com.jamf.selfserviceplus", "com.jamfsoftware.selfservice.mac")];

/// Read-only map from a requested identifier to the identifier tried in its place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackTable {
	entries: BTreeMap<AppId, AppId>,
}

impl FallbackTable {
	/// Table without any substitutions.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Table holding the built-in substitutions.
	pub fn builtin() -> Self {
		let entries = BUILTIN
			.iter()
			.map(|(from, to)| (AppId::from_static(from), AppId::from_static(to)))
			.collect();
		Self { entries }
	}

	/// Adds or replaces the substitution for `from`.
	#[must_use]
	pub fn with_entry(mut self, from: AppId, to: AppId) -> Self {
		self.entries.insert(from, to);
		self
	}

	pub fn substitute(&self, id: &AppId) -> Option<&AppId> {
		self.entries.get(id)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn id(raw: &str) -> AppId {
		AppId::parse(raw).expect("valid identifier")
	}

	#[test]
	fn builtin_maps_self_service_plus_to_classic() {
		let table = FallbackTable::builtin();
		assert_eq!(table.len(), 1);
		assert_eq!(table.substitute(&id("com.jamf.selfserviceplus")), Some(&id("com.jamfsoftware.selfservice.mac")));
		assert_eq!(table.substitute(&id("com.apple.Safari")), None);
	}

	#[test]
	fn with_entry_overrides_builtin() {
		let table = FallbackTable::builtin().with_entry(id("com.jamf.selfserviceplus"), id("com.example.portal"));
		assert_eq!(table.len(), 1);
		assert_eq!(table.substitute(&id("com.jamf.selfserviceplus")), Some(&id("com.example.portal")));
	}

	#[test]
	fn empty_table_substitutes_nothing() {
		let table = FallbackTable::empty();
		assert!(table.is_empty());
		assert_eq!(table.substitute(&id("com.jamf.selfserviceplus")), None);
	}
}
