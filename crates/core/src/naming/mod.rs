//! Name registry and collision resolution.
//!
//! Every emitted identifier is minted here. Minting is idempotent per owner
//! and first-come-first-served per name: a taken candidate is retried with
//! numeric suffixes `2, 3, ...` until a free one is found.

pub mod ident;

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::{GenError, Result};

/// Unique-name registry for one namespace.
#[derive(Debug, Clone)]
pub struct NameRegistry {
    /// name -> owner, in mint order
    names: IndexMap<String, String>,
    /// owner -> name
    owners: HashMap<String, String>,
    max_suffix: u32,
}

impl Default for NameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::with_max_suffix(u32::MAX)
    }

    /// Registry whose disambiguation stops at `candidate{max_suffix}`.
    pub fn with_max_suffix(max_suffix: u32) -> Self {
        Self {
            names: IndexMap::new(),
            owners: HashMap::new(),
            max_suffix,
        }
    }

    /// Return the unique name for `owner`, minting it from `candidate` on first use.
    pub fn mint(&mut self, candidate: &str, owner: &str) -> Result<String> {
        if let Some(existing) = self.owners.get(owner) {
            return Ok(existing.clone());
        }

        let name = if self.names.contains_key(candidate) {
            self.disambiguate(candidate, owner)?
        } else {
            candidate.to_string()
        };

        tracing::trace!(%name, %owner, "minted name");
        self.names.insert(name.clone(), owner.to_string());
        self.owners.insert(owner.to_string(), name.clone());
        Ok(name)
    }

    fn disambiguate(&self, candidate: &str, owner: &str) -> Result<String> {
        (2..=self.max_suffix)
            .map(|n| format!("{candidate}{n}"))
            .find(|name| !self.names.contains_key(name))
            .ok_or_else(|| GenError::NameCollisionExhausted {
                candidate: candidate.to_string(),
                owner: owner.to_string(),
            })
    }

    /// Owner of a minted name.
    pub fn owner_of(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `(name, owner)` pairs in mint order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(n, o)| (n.as_str(), o.as_str()))
    }
}

/// The separate namespaces of one run.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    /// Declarations inside the type namespace.
    pub types: NameRegistry,
    /// Exported request functions.
    pub functions: NameRegistry,
    /// Per-tag file stems.
    pub files: NameRegistry,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_first_come_keeps_candidate() {
        let mut reg = NameRegistry::new();
        assert_eq!(reg.mint("Status", "schema:Status").unwrap(), "Status");
        assert_eq!(reg.mint("Status", "inline:Order.status").unwrap(), "Status2");
        assert_eq!(reg.mint("Status", "inline:Pet.status").unwrap(), "Status3");
        assert_eq!(reg.owner_of("Status2"), Some("inline:Order.status"));
    }

    #[test]
    fn test_mint_is_idempotent_per_owner() {
        let mut reg = NameRegistry::new();
        let first = reg.mint("Pet", "schema:Pet").unwrap();
        let again = reg.mint("SomethingElse", "schema:Pet").unwrap();
        assert_eq!(first, again);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_suffix_skips_taken_names() {
        let mut reg = NameRegistry::new();
        reg.mint("Pet2", "schema:Pet2").unwrap();
        reg.mint("Pet", "schema:Pet").unwrap();
        assert_eq!(reg.mint("Pet", "inline:x").unwrap(), "Pet3");
    }

    #[test]
    fn test_exhaustion() {
        let mut reg = NameRegistry::with_max_suffix(3);
        reg.mint("A", "o1").unwrap();
        reg.mint("A", "o2").unwrap();
        reg.mint("A", "o3").unwrap();
        let err = reg.mint("A", "o4").unwrap_err();
        assert!(matches!(err, GenError::NameCollisionExhausted { ref owner, .. } if owner == "o4"));
    }

    #[test]
    fn test_namespaces_are_independent() {
        let mut table = NameTable::default();
        table.types.mint("pet", "t").unwrap();
        assert_eq!(table.functions.mint("pet", "f").unwrap(), "pet");
        assert_eq!(table.files.mint("pet", "s").unwrap(), "pet");
    }
}
