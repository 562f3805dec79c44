use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::ability::{Ability, AbilityId, AbilityRecord};
use crate::error::CatalogError;

const BUILTIN_ABILITIES: &str = include_str!("../data/abilities.json");

/// Result of a partial-name lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialMatch<'a> {
    None,
    One(&'a Ability),
    Ambiguous(usize),
}

/// Read-only ability table, built once at startup and shared behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct AbilityCatalog {
    by_id: BTreeMap<AbilityId, Ability>,
    by_name: HashMap<String, AbilityId>,
}

impl AbilityCatalog {
    pub fn from_abilities(abilities: Vec<Ability>) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for ability in abilities {
            if catalog.by_id.contains_key(&ability.id) {
                return Err(CatalogError::DuplicateId(ability.id));
            }
            let name = ability.name.to_lowercase();
            if catalog.by_name.contains_key(&name) {
                return Err(CatalogError::DuplicateName(ability.name));
            }
            catalog.by_name.insert(name, ability.id);
            catalog.by_id.insert(ability.id, ability);
        }
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<AbilityRecord> = serde_json::from_str(json)?;
        let abilities = records
            .into_iter()
            .map(Ability::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_abilities(abilities)
    }

    /// Load from a JSON array file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        tracing::info!(path = %path.display(), count = catalog.len(), "Abilities loaded");
        Ok(catalog)
    }

    /// The catalog shipped with the server.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_ABILITIES)
    }

    pub fn get(&self, id: AbilityId) -> Option<&Ability> {
        self.by_id.get(&id)
    }

    /// Exact name, case-insensitive.
    pub fn by_name(&self, name: &str) -> Option<&Ability> {
        let id = self.by_name.get(&name.trim().to_lowercase())?;
        self.by_id.get(id)
    }

    /// Case-insensitive substring match on the name; an exact name wins
    /// outright.
    pub fn find_partial(&self, query: &str) -> PartialMatch<'_> {
        if let Some(exact) = self.by_name(query) {
            return PartialMatch::One(exact);
        }
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return PartialMatch::None;
        }
        let matches: Vec<&Ability> = self
            .by_id
            .values()
            .filter(|a| a.name.to_lowercase().contains(&query))
            .collect();
        match matches.as_slice() {
            [] => PartialMatch::None,
            [one] => PartialMatch::One(*one),
            many => PartialMatch::Ambiguous(many.len()),
        }
    }

    /// All abilities in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Ability> {
        self.by_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{Effect, Targeting};
    use std::io::Write;

    #[test]
    fn builtin_catalog_parses() {
        let catalog = AbilityCatalog::builtin().unwrap();
        assert_eq!(catalog.get(1001).unwrap().name, "Arcane Bolt");
        assert_eq!(catalog.get(2001).unwrap().name, "Slash");
        for id in 2001..=2005 {
            assert!(catalog.get(id).unwrap().is_maneuver());
        }
        assert!(matches!(
            catalog.get(1003).unwrap().effect,
            Effect::Healing { .. }
        ));
        assert_eq!(catalog.get(1002).unwrap().targeting, Targeting::AreaHostile);
    }

    #[test]
    fn lookup_by_name_is_case_insensitive() {
        let catalog = AbilityCatalog::builtin().unwrap();
        assert_eq!(catalog.by_name("arcane BOLT").unwrap().id, 1001);
        assert!(catalog.by_name("arcane").is_none());
    }

    #[test]
    fn partial_lookup_reports_ambiguity() {
        let catalog = AbilityCatalog::builtin().unwrap();
        assert!(matches!(catalog.find_partial("bolt"), PartialMatch::One(a) if a.id == 1001));
        assert!(matches!(catalog.find_partial("a"), PartialMatch::Ambiguous(n) if n > 1));
        assert_eq!(catalog.find_partial("zzz"), PartialMatch::None);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let json = r#"[{"id": 1, "name": "A"}, {"id": 1, "name": "B"}]"#;
        assert!(matches!(
            AbilityCatalog::from_json(json),
            Err(CatalogError::DuplicateId(1))
        ));
    }

    #[test]
    fn duplicate_names_rejected_regardless_of_case() {
        let json = r#"[{"id": 1, "name": "Fire Bolt"}, {"id": 2, "name": "fire bolt"}]"#;
        match AbilityCatalog::from_json(json) {
            Err(CatalogError::DuplicateName(name)) => assert_eq!(name, "fire bolt"),
            other => panic!("expected duplicate name, got {:?}", other.map(|c| c.len())),
        }
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 7, "name": "Spark", "mana_cost": 2,
                 "targeting": {{"mode": "hostile_single"}},
                 "effects": {{"damage": "1d4"}}}}]"#
        )
        .unwrap();
        let catalog = AbilityCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(7).unwrap().mana_cost, 2);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = AbilityCatalog::load(Path::new("/nonexistent/abilities.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
