//! Upgrade catalog contract and the built-in catalog.
//!
//! The default catalog is the same JSON the game ships with
//! (`data/upgrades.json`), embedded at compile time.

use std::collections::BTreeMap;

use idlegame_logic::{Upgrade, UpgradeId};

use crate::error::{CatalogError, StoreError};

const DEFAULT_UPGRADES_JSON: &str = include_str!("../../../data/upgrades.json");

/// Read-only access to upgrade definitions.
pub trait UpgradeCatalog: Send + Sync {
    fn list_upgrades(&self) -> Vec<Upgrade>;

    fn get_upgrade(&self, id: UpgradeId) -> Result<Upgrade, StoreError>;
}

/// An immutable catalog held in memory, ordered by id.
#[derive(Debug, Clone, Default)]
pub struct StaticUpgradeCatalog {
    upgrades: BTreeMap<UpgradeId, Upgrade>,
}

impl StaticUpgradeCatalog {
    /// The eight upgrades the game ships with.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(DEFAULT_UPGRADES_JSON)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let list: Vec<Upgrade> = serde_json::from_str(json)?;
        Self::from_upgrades(list)
    }

    pub fn from_upgrades(list: Vec<Upgrade>) -> Result<Self, CatalogError> {
        let mut upgrades = BTreeMap::new();
        for upgrade in list {
            let positive = |m: f64| m.is_finite() && m > 0.0;
            if !positive(upgrade.damage_multiplier) || !positive(upgrade.click_rate_multiplier) {
                return Err(CatalogError::InvalidMultiplier { id: upgrade.id });
            }
            let id = upgrade.id;
            if upgrades.insert(id, upgrade).is_some() {
                return Err(CatalogError::DuplicateId(id));
            }
        }
        Ok(Self { upgrades })
    }

    pub fn len(&self) -> usize {
        self.upgrades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upgrades.is_empty()
    }
}

impl UpgradeCatalog for StaticUpgradeCatalog {
    fn list_upgrades(&self) -> Vec<Upgrade> {
        self.upgrades.values().cloned().collect()
    }

    fn get_upgrade(&self, id: UpgradeId) -> Result<Upgrade, StoreError> {
        self.upgrades
            .get(&id)
            .cloned()
            .ok_or(StoreError::UpgradeNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = StaticUpgradeCatalog::builtin().expect("builtin catalog parses");
        assert_eq!(catalog.len(), 8);

        let names: Vec<String> = catalog.list_upgrades().into_iter().map(|u| u.name).collect();
        assert_eq!(names[0], "Faster Clicks");
        assert_eq!(names[7], "Master Looter");

        let disabled: Vec<UpgradeId> = catalog
            .list_upgrades()
            .iter()
            .filter(|u| !u.enabled)
            .map(|u| u.id)
            .collect();
        assert_eq!(disabled, vec![7, 8]);
    }

    #[test]
    fn test_builtin_effects() {
        let catalog = StaticUpgradeCatalog::builtin().unwrap();
        assert_eq!(catalog.get_upgrade(2).unwrap().damage_multiplier, 2.0);
        assert!((catalog.get_upgrade(1).unwrap().click_rate_multiplier - 1.1).abs() < 1e-12);
        // fields missing from JSON fall back to neutral
        let gold_rush = catalog.get_upgrade(3).unwrap();
        assert_eq!(gold_rush.damage_multiplier, 1.0);
        assert_eq!(gold_rush.click_rate_multiplier, 1.0);
        assert_eq!(gold_rush.attack_value_addition, 0);
    }

    #[test]
    fn test_missing_upgrade() {
        let catalog = StaticUpgradeCatalog::builtin().unwrap();
        assert_eq!(catalog.get_upgrade(99), Err(StoreError::UpgradeNotFound(99)));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let json = r#"[
            {"id": 1, "name": "a", "cost": 1, "enabled": true},
            {"id": 1, "name": "b", "cost": 2, "enabled": true}
        ]"#;
        assert!(matches!(
            StaticUpgradeCatalog::from_json(json),
            Err(CatalogError::DuplicateId(1))
        ));
    }

    #[test]
    fn test_zero_multiplier_rejected() {
        let json = r#"[{"id": 4, "name": "broken", "cost": 1, "enabled": true, "damage_multiplier": 0.0}]"#;
        assert!(matches!(
            StaticUpgradeCatalog::from_json(json),
            Err(CatalogError::InvalidMultiplier { id: 4 })
        ));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            StaticUpgradeCatalog::from_json("{not json"),
            Err(CatalogError::Parse(_))
        ));
    }
}
