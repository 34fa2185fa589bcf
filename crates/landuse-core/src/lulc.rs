//! Land-use/land-cover codes and tables.
//!
//! The [`LulcRegistry`] maps stable integer codes to category names. A
//! [`LulcTable`] maps category names to an area or weight and is only
//! considered valid when every key is a category known to the registry.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{LanduseError, Result};

/// One entry of the LULC code registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LulcCode {
    pub code: u16,
    pub name: String,
}

/// Static mapping from LULC code to category name.
///
/// Codes are stable identifiers; iteration order is by code, which is not
/// necessarily the order categories are displayed in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LulcRegistry {
    codes: BTreeMap<u16, String>,
}

impl LulcRegistry {
    /// Builds a registry from code entries.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty name, a repeated code or a name
    /// used by two codes.
    pub fn from_entries(entries: impl IntoIterator<Item = LulcCode>) -> Result<Self> {
        let mut codes = BTreeMap::new();
        let mut names = HashMap::new();
        for LulcCode { code, name } in entries {
            if name.trim().is_empty() {
                return Err(LanduseError::invalid_argument(format!(
                    "LULC code {code} has an empty name"
                )));
            }
            if let Some(existing) = names.insert(name.clone(), code) {
                return Err(LanduseError::invalid_argument(format!(
                    "LULC category '{name}' is used by codes {existing} and {code}"
                )));
            }
            if codes.insert(code, name).is_some() {
                return Err(LanduseError::invalid_argument(format!(
                    "LULC code {code} is defined twice"
                )));
            }
        }
        Ok(Self { codes })
    }

    /// The categories served by the reference backend.
    pub fn builtin() -> Self {
        let codes = [
            (22, "housing"),
            (24, "commercial"),
            (41, "forest"),
            (71, "grass"),
            (82, "orchard"),
        ]
        .into_iter()
        .map(|(code, name)| (code, name.to_string()))
        .collect();
        Self { codes }
    }

    /// Looks up the category name for a code.
    pub fn name(&self, code: u16) -> Option<&str> {
        self.codes.get(&code).map(String::as_str)
    }

    /// Looks up the code for a category name.
    pub fn code(&self, name: &str) -> Option<u16> {
        self.codes
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(code, _)| *code)
    }

    /// Whether `name` is a known category.
    pub fn contains_name(&self, name: &str) -> bool {
        self.codes.values().any(|n| n == name)
    }

    /// Category names in code order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.codes.values().map(String::as_str)
    }

    /// The registry as a code → name map.
    pub fn codes(&self) -> &BTreeMap<u16, String> {
        &self.codes
    }

    /// The registry as a list of entries, in code order.
    pub fn entries(&self) -> Vec<LulcCode> {
        self.codes
            .iter()
            .map(|(code, name)| LulcCode {
                code: *code,
                name: name.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Resolves a table key that may be either a category name or a numeric
    /// code (as reported by the stats worker) to a category name.
    pub fn resolve_key(&self, key: &str) -> Option<&str> {
        if let Some((_, name)) = self.codes.iter().find(|(_, n)| n.as_str() == key) {
            return Some(name.as_str());
        }
        key.trim()
            .parse::<u16>()
            .ok()
            .and_then(|code| self.name(code))
    }
}

/// Mapping from LULC category name to an area/weight value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LulcTable {
    values: BTreeMap<String, f64>,
}

impl LulcTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from raw `(key, value)` pairs, resolving keys against
    /// the registry.
    ///
    /// Keys may be category names or numeric codes. Values reported under
    /// two keys resolving to the same category are summed.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidResponse` transport error if any key is unknown or
    /// a value is not finite, so a partial table is never produced.
    pub fn from_raw<K: AsRef<str>>(
        raw: impl IntoIterator<Item = (K, f64)>,
        registry: &LulcRegistry,
    ) -> Result<Self> {
        let mut values = BTreeMap::new();
        for (key, value) in raw {
            let key = key.as_ref();
            let name = registry.resolve_key(key).ok_or_else(|| {
                LanduseError::invalid_response(format!("unknown LULC category '{key}'"))
            })?;
            if !value.is_finite() {
                return Err(LanduseError::invalid_response(format!(
                    "LULC value for '{name}' is not finite"
                )));
            }
            *values.entry(name.to_string()).or_insert(0.0) += value;
        }
        Ok(Self { values })
    }

    /// Sets the value for a category.
    pub fn insert(&mut self, category: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(category.into(), value)
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.values.get(category).copied()
    }

    /// Category names present in the table.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Sum of all values.
    pub fn total(&self) -> f64 {
        self.values.values().sum()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Checks that every key is a registry category.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidResponse` transport error naming the first unknown
    /// category.
    pub fn validate(&self, registry: &LulcRegistry) -> Result<()> {
        match self.categories().find(|name| !registry.contains_name(name)) {
            Some(unknown) => Err(LanduseError::invalid_response(format!(
                "unknown LULC category '{unknown}'"
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportErrorKind;

    #[test]
    fn test_builtin_registry() {
        let registry = LulcRegistry::builtin();
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.name(41), Some("forest"));
        assert_eq!(registry.code("orchard"), Some(82));
        let mut names: Vec<_> = registry.names().collect();
        names.sort();
        assert_eq!(names, ["commercial", "forest", "grass", "housing", "orchard"]);
    }

    #[test]
    fn test_from_entries_rejects_duplicates() {
        let dup_code = LulcRegistry::from_entries([
            LulcCode { code: 1, name: "a".into() },
            LulcCode { code: 1, name: "b".into() },
        ]);
        assert!(dup_code.unwrap_err().is_invalid_argument());

        let dup_name = LulcRegistry::from_entries([
            LulcCode { code: 1, name: "a".into() },
            LulcCode { code: 2, name: "a".into() },
        ]);
        assert!(dup_name.unwrap_err().is_invalid_argument());

        let empty = LulcRegistry::from_entries([LulcCode { code: 1, name: " ".into() }]);
        assert!(empty.unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_table_from_names_and_codes() {
        let registry = LulcRegistry::builtin();
        let table =
            LulcTable::from_raw([("forest", 2.0), ("71", 3.5), ("41", 1.0)], &registry).unwrap();
        assert_eq!(table.get("forest"), Some(3.0));
        assert_eq!(table.get("grass"), Some(3.5));
        assert_eq!(table.total(), 6.5);
        assert!(table.validate(&registry).is_ok());
    }

    #[test]
    fn test_table_unknown_key_is_invalid_response() {
        let registry = LulcRegistry::builtin();
        let err = LulcTable::from_raw([("forest", 1.0), ("lava", 2.0)], &registry).unwrap_err();
        assert_eq!(err.transport_kind(), Some(TransportErrorKind::InvalidResponse));

        let err = LulcTable::from_raw([("99", 2.0)], &registry).unwrap_err();
        assert_eq!(err.transport_kind(), Some(TransportErrorKind::InvalidResponse));
    }

    #[test]
    fn test_validate_detects_foreign_category() {
        let mut table = LulcTable::new();
        table.insert("forest", 1.0);
        table.insert("desert", 1.0);
        assert!(table.validate(&LulcRegistry::builtin()).is_err());
    }

    #[test]
    fn test_table_serializes_as_plain_map() {
        let mut table = LulcTable::new();
        table.insert("grass", 4.0);
        assert_eq!(serde_json::to_string(&table).unwrap(), r#"{"grass":4.0}"#);
    }
}
