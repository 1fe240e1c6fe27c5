//! Sub-entity collections stored per floor plan.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The closed set of entity collections a floor plan owns.
///
/// Each variant resolves to a fixed table name. Only these identifiers
/// ever reach query text; request input never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityCollection {
    /// Seating tables.
    Tables,
    /// Guests.
    Guests,
    /// Free-text labels.
    Labels,
}

impl EntityCollection {
    /// Every collection, in save order.
    pub const ALL: [EntityCollection; 3] = [Self::Tables, Self::Guests, Self::Labels];

    /// Backing table name.
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Tables => "floor_plan_tables",
            Self::Guests => "floor_plan_guests",
            Self::Labels => "floor_plan_labels",
        }
    }

    /// Name used in request and response bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tables => "tables",
            Self::Guests => "guests",
            Self::Labels => "labels",
        }
    }
}

impl fmt::Display for EntityCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One stored sub-entity: an id and an opaque payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionItem {
    /// Row id, taken from the payload's `id` field or freshly generated.
    pub id: Uuid,
    /// Opaque payload.
    pub data: serde_json::Value,
}

/// The full desired contents of one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionBatch {
    /// Which collection.
    pub collection: EntityCollection,
    /// Items with unique ids.
    pub items: Vec<CollectionItem>,
}

impl CollectionBatch {
    /// Ids of every item in the batch.
    pub fn ids(&self) -> Vec<Uuid> {
        self.items.iter().map(|item| item.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names_are_fixed() {
        let names: Vec<_> = EntityCollection::ALL.iter().map(|c| c.table_name()).collect();
        assert_eq!(
            names,
            vec!["floor_plan_tables", "floor_plan_guests", "floor_plan_labels"]
        );
    }
}
