//! Persistence capability shared by stored records.
//!
//! Every record the store handles says what it is, how it is keyed and
//! which other records it points at. Records refer to each other by id
//! only; a [`Reference`] is never resolved eagerly.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::Contract;
use crate::indoor_clima::{IndoorClima, IndoorClimaRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    Contract,
    IndoorClima,
}

impl EntityKind {
    /// Directory name used by the file store.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Project => "projects",
            EntityKind::Contract => "contracts",
            EntityKind::IndoorClima => "indoor_climas",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pointer to another record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub kind: EntityKind,
    pub key: String,
}

impl Reference {
    pub fn project(id: Uuid) -> Self {
        Reference {
            kind: EntityKind::Project,
            key: id.to_string(),
        }
    }
}

pub trait Entity {
    fn kind(&self) -> EntityKind;

    /// Unique key within the kind.
    fn key(&self) -> String;

    fn dependencies(&self) -> Vec<Reference>;
}

impl Entity for Contract {
    fn kind(&self) -> EntityKind {
        EntityKind::Contract
    }

    /// One contract per project, so the project id is the key.
    fn key(&self) -> String {
        self.project.to_string()
    }

    fn dependencies(&self) -> Vec<Reference> {
        vec![Reference::project(self.project)]
    }
}

impl Entity for IndoorClima {
    fn kind(&self) -> EntityKind {
        EntityKind::IndoorClima
    }

    fn key(&self) -> String {
        self.project.to_string()
    }

    fn dependencies(&self) -> Vec<Reference> {
        vec![
            Reference::project(self.project),
            Reference {
                kind: EntityKind::Contract,
                key: self.project.to_string(),
            },
        ]
    }
}

/// A loaded record, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum Stored {
    Contract(Contract),
    IndoorClima(IndoorClimaRecord),
}

impl Stored {
    pub fn as_entity(&self) -> &dyn Entity {
        match self {
            Stored::Contract(contract) => contract,
            Stored::IndoorClima(record) => &record.clima,
        }
    }

    pub fn into_contract(self) -> Option<Contract> {
        match self {
            Stored::Contract(contract) => Some(contract),
            Stored::IndoorClima(_) => None,
        }
    }

    pub fn into_indoor_clima(self) -> Option<IndoorClima> {
        match self {
            Stored::IndoorClima(record) => Some(record.into()),
            Stored::Contract(_) => None,
        }
    }
}

impl From<Contract> for Stored {
    fn from(contract: Contract) -> Self {
        Stored::Contract(contract)
    }
}

impl From<&IndoorClima> for Stored {
    fn from(clima: &IndoorClima) -> Self {
        Stored::IndoorClima(clima.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_entity() {
        let project = Uuid::new_v4();
        let contract = Contract::new(project);
        assert_eq!(contract.kind(), EntityKind::Contract);
        assert_eq!(contract.key(), project.to_string());
        assert_eq!(contract.dependencies(), vec![Reference::project(project)]);
    }

    #[test]
    fn test_indoor_clima_depends_on_contract() {
        let clima = IndoorClima::new(Uuid::new_v4());
        let kinds: Vec<EntityKind> = clima.dependencies().iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![EntityKind::Project, EntityKind::Contract]);
    }

    #[test]
    fn test_stored_roundtrip() {
        let mut clima = IndoorClima::new(Uuid::new_v4());
        clima.heated_volume = 1500.0;
        let stored = Stored::from(&clima);
        assert_eq!(stored.as_entity().kind(), EntityKind::IndoorClima);

        let json = serde_json::to_string(&stored).unwrap();
        assert!(json.starts_with(r#"{"kind":"indoor_clima""#));
        let restored: Stored = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.into_indoor_clima(), Some(clima));
    }
}
