//! Sector catalog: sector key → BLS series id.
//!
//! Stored as a TOML `[sectors]` table. Keys use underscores
//! (`Education_Health`); the parser turns them into display names.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::ConfigError;

/// CES supersectors, all employees, seasonally adjusted (thousands).
const CES_SUPERSECTORS: [(&str, &str); 11] = [
    ("Total_Nonfarm", "CES0000000001"),
    ("Mining_Logging", "CES1000000001"),
    ("Construction", "CES2000000001"),
    ("Manufacturing", "CES3000000001"),
    ("Trade_Transport_Utilities", "CES4000000001"),
    ("Information", "CES5000000001"),
    ("Financial", "CES5500000001"),
    ("Professional_Business", "CES6000000001"),
    ("Education_Health", "CES6500000001"),
    ("Leisure_Hospitality", "CES7000000001"),
    ("Government", "CES9000000001"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorCatalog {
    pub sectors: BTreeMap<String, String>,
}

impl SectorCatalog {
    pub fn new(sectors: BTreeMap<String, String>) -> Self {
        Self { sectors }
    }

    /// The eleven CES supersectors.
    pub fn default_ces() -> Self {
        Self {
            sectors: CES_SUPERSECTORS
                .iter()
                .map(|(name, id)| (name.to_string(), id.to_string()))
                .collect(),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn series_id(&self, sector: &str) -> Option<&str> {
        self.sectors.get(sector).map(|s| s.as_str())
    }

    pub fn sector_names(&self) -> Vec<&str> {
        self.sectors.keys().map(|s| s.as_str()).collect()
    }

    /// `(sector, series_id)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sectors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    /// Narrow the catalog to the named sectors.
    pub fn select(&self, names: &[String]) -> Result<Self, ConfigError> {
        let mut sectors = BTreeMap::new();
        for name in names {
            let id = self
                .series_id(name)
                .ok_or_else(|| ConfigError::UnknownSector(name.clone()))?;
            sectors.insert(name.clone(), id.to_string());
        }
        Ok(Self { sectors })
    }
}

impl Default for SectorCatalog {
    fn default() -> Self {
        Self::default_ces()
    }
}
