use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The 64-bit DIS Entity Type record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EntityTypeCode {
    pub kind: u8,
    pub domain: u8,
    pub country: u16,
    pub category: u8,
    pub subcategory: u8,
    pub specific: u8,
    pub extra: u8,
}

impl EntityTypeCode {
    pub const fn new(
        kind: u8,
        domain: u8,
        country: u16,
        category: u8,
        subcategory: u8,
        specific: u8,
        extra: u8,
    ) -> Self {
        Self {
            kind,
            domain,
            country,
            category,
            subcategory,
            specific,
            extra,
        }
    }
}

impl fmt::Display for EntityTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}.{}.{}.{}",
            self.kind,
            self.domain,
            self.country,
            self.category,
            self.subcategory,
            self.specific,
            self.extra
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a dotted entity type code: {0:?}")]
pub struct ParseEntityTypeError(String);

impl FromStr for EntityTypeCode {
    type Err = ParseEntityTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseEntityTypeError(s.to_string());
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 7 {
            return Err(err());
        }

        let byte = |i: usize| parts[i].parse::<u8>().map_err(|_| err());
        Ok(Self {
            kind: byte(0)?,
            domain: byte(1)?,
            country: parts[2].parse::<u16>().map_err(|_| err())?,
            category: byte(3)?,
            subcategory: byte(4)?,
            specific: byte(5)?,
            extra: byte(6)?,
        })
    }
}

pub const CONTAINER_SHIP_MEDIUM: &str = "generic_ship_container_class_medium";
pub const CONTAINER_SHIP_SMALL: &str = "generic_ship_container_class_small";

/// Named entity types a federate may report.
///
/// Starts with the EMSN custom entities (generic container ships). Names
/// that are not registered still resolve when written as a dotted code such
/// as `"1.3.0.61.1.3.0"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityCatalog {
    entries: BTreeMap<String, EntityTypeCode>,
}

impl EntityCatalog {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn emsn() -> Self {
        let mut catalog = Self::empty();
        catalog.insert(
            CONTAINER_SHIP_MEDIUM,
            EntityTypeCode::new(1, 3, 0, 61, 2, 1, 0),
        );
        catalog.insert(
            CONTAINER_SHIP_SMALL,
            EntityTypeCode::new(1, 3, 0, 61, 1, 3, 0),
        );
        catalog
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        code: EntityTypeCode,
    ) -> Option<EntityTypeCode> {
        self.entries.insert(name.into(), code)
    }

    pub fn resolve(&self, name: &str) -> Option<EntityTypeCode> {
        self.entries
            .get(name)
            .copied()
            .or_else(|| name.parse().ok())
    }

    pub fn name_of(&self, code: &EntityTypeCode) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(name, _)| name.as_str())
    }

    /// Registered name for `code`, or its dotted form.
    pub fn describe(&self, code: &EntityTypeCode) -> String {
        self.name_of(code)
            .map(str::to_string)
            .unwrap_or_else(|| code.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityTypeCode)> {
        self.entries.iter().map(|(name, code)| (name.as_str(), code))
    }
}

impl Default for EntityCatalog {
    fn default() -> Self {
        Self::emsn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emsn_entities() {
        let catalog = EntityCatalog::emsn();
        assert_eq!(
            catalog.resolve(CONTAINER_SHIP_SMALL),
            Some(EntityTypeCode::new(1, 3, 0, 61, 1, 3, 0))
        );
        assert_eq!(
            catalog.resolve(CONTAINER_SHIP_MEDIUM),
            Some(EntityTypeCode::new(1, 3, 0, 61, 2, 1, 0))
        );
        assert_eq!(catalog.resolve("generic_ship_tanker"), None);
    }

    #[test]
    fn dotted_codes() {
        let catalog = EntityCatalog::empty();
        let code = catalog.resolve("1.3.225.61.1.3.0").unwrap();
        assert_eq!(code.country, 225);
        assert_eq!(code.to_string(), "1.3.225.61.1.3.0");

        assert!("1.3.0.61.1.3".parse::<EntityTypeCode>().is_err());
        assert!("1.3.0.61.1.3.256".parse::<EntityTypeCode>().is_err());
    }

    #[test]
    fn describe_prefers_names() {
        let catalog = EntityCatalog::emsn();
        let small = EntityTypeCode::new(1, 3, 0, 61, 1, 3, 0);
        assert_eq!(catalog.describe(&small), CONTAINER_SHIP_SMALL);

        let unknown = EntityTypeCode::new(1, 3, 0, 61, 9, 9, 0);
        assert_eq!(catalog.describe(&unknown), "1.3.0.61.9.9.0");
        assert_eq!(catalog.resolve(&catalog.describe(&unknown)), Some(unknown));
    }
}
