use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

/// Point-in-time view of a meeting's roll, keyed by business identifiers.
/// BTreeMaps keep serialization order stable so checksums are comparable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotData {
    pub shareholders: BTreeMap<String, ShareholderState>,
    pub properties: BTreeMap<String, PropertyState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShareholderState {
    pub name: String,
    pub is_new: bool,
    pub designee: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PropertyState {
    pub shareholder_id: String,
    pub owner_name: Option<String>,
    pub service_address: Option<String>,
    pub checked_in: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Modified,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub field: String,
    pub old: Option<Value>,
    pub new: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityChange {
    pub entity: &'static str,
    pub key: String,
    pub change: ChangeType,
    pub fields: Vec<FieldChange>,
}

impl SnapshotData {
    /// Hex SHA-256 over the canonical JSON form
    pub fn checksum(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        let digest = Sha256::digest(&bytes);
        format!("{:x}", digest)
    }

    /// Changes needed to get from `self` (previous) to `current`
    pub fn diff(&self, current: &SnapshotData) -> Vec<EntityChange> {
        let mut changes = diff_maps("shareholder", &self.shareholders, &current.shareholders);
        changes.extend(diff_maps("property", &self.properties, &current.properties));
        changes
    }
}

fn diff_maps<T: Serialize>(
    entity: &'static str,
    previous: &BTreeMap<String, T>,
    current: &BTreeMap<String, T>,
) -> Vec<EntityChange> {
    let keys: BTreeSet<&String> = previous.keys().chain(current.keys()).collect();
    let mut out = Vec::new();

    for key in keys {
        let before = previous.get(key).map(to_fields);
        let after = current.get(key).map(to_fields);

        let (change, fields) = match (before, after) {
            (None, Some(after)) => (ChangeType::Added, field_changes(&BTreeMap::new(), &after)),
            (Some(before), None) => (ChangeType::Removed, field_changes(&before, &BTreeMap::new())),
            (Some(before), Some(after)) => {
                let fields = field_changes(&before, &after);
                if fields.is_empty() {
                    continue;
                }
                (ChangeType::Modified, fields)
            }
            (None, None) => continue,
        };

        out.push(EntityChange { entity, key: key.clone(), change, fields });
    }

    out
}

fn to_fields<T: Serialize>(value: &T) -> BTreeMap<String, Value> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map.into_iter().collect(),
        _ => BTreeMap::new(),
    }
}

fn field_changes(before: &BTreeMap<String, Value>, after: &BTreeMap<String, Value>) -> Vec<FieldChange> {
    let fields: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    fields
        .into_iter()
        .filter_map(|field| {
            let old = before.get(field).filter(|v| !v.is_null()).cloned();
            let new = after.get(field).filter(|v| !v.is_null()).cloned();
            (old != new).then(|| FieldChange { field: field.clone(), old, new })
        })
        .collect()
}
