//! Diff-sync engine: snapshot replace of a plan's sub-entity collections.
//!
//! A bulk save submits every table, guest, and label of a plan. Stored rows
//! whose id is absent from the submission are deleted, the rest are
//! upserted, and the three collections are written in one atomic store
//! call. Item payloads are opaque apart from their `id` field.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use planner_core::error::AppError;
use planner_core::result::AppResult;
use planner_core::types::FloorPlanId;
use planner_database::store::CollectionStore;
use planner_entity::floor_plan::{CollectionBatch, CollectionItem, EntityCollection};

/// A full client snapshot of a plan's collections.
///
/// A missing array is an empty collection: everything stored for it is
/// deleted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Table payloads.
    #[serde(default)]
    pub tables: Vec<Value>,
    /// Guest payloads.
    #[serde(default)]
    pub guests: Vec<Value>,
    /// Label payloads.
    #[serde(default)]
    pub labels: Vec<Value>,
}

impl Snapshot {
    fn collection(&self, collection: EntityCollection) -> &[Value] {
        match collection {
            EntityCollection::Tables => &self.tables,
            EntityCollection::Guests => &self.guests,
            EntityCollection::Labels => &self.labels,
        }
    }
}

/// An id the server chose because the submitted one was missing, malformed,
/// or already used earlier in the same collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedId {
    /// Collection the item was submitted in.
    pub collection: EntityCollection,
    /// Position of the item in the submitted array.
    pub index: usize,
    /// The id now stored for it.
    pub id: Uuid,
}

/// Result of a successful bulk save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Stored table count.
    pub tables: usize,
    /// Stored guest count.
    pub guests: usize,
    /// Stored label count.
    pub labels: usize,
    /// Ids chosen by the server, for the client to adopt.
    pub assigned_ids: Vec<AssignedId>,
}

/// Reconciles submitted snapshots against stored collections.
#[derive(Debug, Clone)]
pub struct SyncEngine {
    collections: Arc<dyn CollectionStore>,
    max_items: usize,
}

impl SyncEngine {
    /// Create an engine with a per-collection item ceiling.
    pub fn new(collections: Arc<dyn CollectionStore>, max_items: usize) -> Self {
        Self {
            collections,
            max_items,
        }
    }

    /// Reject any collection above the ceiling. Touches no state.
    pub fn check_size(&self, snapshot: &Snapshot) -> AppResult<()> {
        for collection in EntityCollection::ALL {
            let count = snapshot.collection(collection).len();
            if count > self.max_items {
                return Err(AppError::validation(format!(
                    "Too many {collection}: {count} submitted, at most {} allowed",
                    self.max_items
                ))
                .with_details(serde_json::json!({
                    "collection": collection,
                    "count": count,
                    "max": self.max_items,
                })));
            }
        }
        Ok(())
    }

    /// Replace all three collections of `plan` with `snapshot`.
    pub async fn reconcile(
        &self,
        plan: FloorPlanId,
        snapshot: Snapshot,
        now: DateTime<Utc>,
    ) -> AppResult<SyncReport> {
        self.check_size(&snapshot)?;

        let mut report = SyncReport::default();
        let Snapshot {
            tables,
            guests,
            labels,
        } = snapshot;
        report.tables = tables.len();
        report.guests = guests.len();
        report.labels = labels.len();

        let batches = [
            prepare_batch(EntityCollection::Tables, tables, &mut report.assigned_ids),
            prepare_batch(EntityCollection::Guests, guests, &mut report.assigned_ids),
            prepare_batch(EntityCollection::Labels, labels, &mut report.assigned_ids),
        ];

        self.collections.replace_all(plan, &batches, now).await?;

        debug!(
            %plan,
            tables = report.tables,
            guests = report.guests,
            labels = report.labels,
            assigned = report.assigned_ids.len(),
            "Snapshot reconciled"
        );
        Ok(report)
    }
}

/// The usable id embedded in a payload, if any.
pub fn extract_id(payload: &Value) -> Option<Uuid> {
    payload
        .get("id")
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .filter(|id| !id.is_nil())
}

/// Resolve an id for every item, generating one where the submitted id
/// cannot be used. Generated ids are written into object payloads.
pub fn prepare_batch(
    collection: EntityCollection,
    payloads: Vec<Value>,
    assigned: &mut Vec<AssignedId>,
) -> CollectionBatch {
    let mut seen = HashSet::with_capacity(payloads.len());
    let items = payloads
        .into_iter()
        .enumerate()
        .map(|(index, mut data)| {
            let id = match extract_id(&data) {
                Some(id) if seen.insert(id) => id,
                _ => {
                    let id = Uuid::new_v4();
                    seen.insert(id);
                    if let Some(object) = data.as_object_mut() {
                        object.insert("id".to_string(), Value::String(id.to_string()));
                    }
                    assigned.push(AssignedId {
                        collection,
                        index,
                        id,
                    });
                    id
                }
            };
            CollectionItem { id, data }
        })
        .collect();

    CollectionBatch { collection, items }
}
