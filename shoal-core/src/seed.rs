//! Catalog data files.
//!
//! A catalog file is a JSON object keyed by resource type (singular or
//! plural), each holding an array of flat item objects:
//!
//! ```json
//! { "playlists": [ { "id": "65a1f0c2e4b0a1b2c3d4e5f6", "title": "Reef", "type": "movie" } ] }
//! ```
//!
//! Loaded items always receive a fresh shuffle key. Records without an `id`
//! get a generated one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::domain::{FieldValue, Item, ItemId, ResourceType};
use crate::store::MemoryStore;

/// Errors raised while reading a catalog file.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("cannot read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog root must be an object keyed by resource type")]
    NotAnObject,

    #[error("unknown resource type '{name}' in catalog")]
    UnknownResource { name: String },

    #[error("{resource} entry must be an array of objects")]
    NotAnArray { resource: ResourceType },

    #[error("{resource} record {index}: {reason}")]
    InvalidRecord {
        resource: ResourceType,
        index: usize,
        reason: String,
    },
}

/// Number of items loaded per resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub loaded: BTreeMap<ResourceType, usize>,
}

impl SeedSummary {
    pub fn total(&self) -> usize {
        self.loaded.values().sum()
    }

    pub fn count(&self, resource: ResourceType) -> usize {
        self.loaded.get(&resource).copied().unwrap_or(0)
    }
}

/// Reads a catalog file into the store.
///
/// # Errors
/// - `SeedError::Io` - File cannot be read
/// - Any error from [`load_catalog_str`]
pub async fn load_catalog_file(path: &Path, store: &MemoryStore) -> Result<SeedSummary, SeedError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let summary = load_catalog_str(&raw, store).await?;
    info!(
        path = %path.display(),
        items = summary.total(),
        "Loaded catalog file"
    );
    Ok(summary)
}

/// Parses a catalog document and inserts every record into the store.
///
/// The whole document is validated before anything is inserted.
///
/// # Errors
/// - `SeedError::Json` - Malformed JSON
/// - `SeedError::NotAnObject` / `SeedError::NotAnArray` - Wrong document shape
/// - `SeedError::UnknownResource` - Key is not a resource type
/// - `SeedError::InvalidRecord` - Record is not an object or has a bad id
pub async fn load_catalog_str(raw: &str, store: &MemoryStore) -> Result<SeedSummary, SeedError> {
    let document: Value = serde_json::from_str(raw)?;
    let Value::Object(sections) = document else {
        return Err(SeedError::NotAnObject);
    };

    let mut parsed = Vec::with_capacity(sections.len());
    for (name, records) in sections {
        let resource: ResourceType = name
            .parse()
            .map_err(|_| SeedError::UnknownResource { name: name.clone() })?;
        let Value::Array(records) = records else {
            return Err(SeedError::NotAnArray { resource });
        };
        let items = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| parse_record(resource, index, record))
            .collect::<Result<Vec<_>, _>>()?;
        parsed.push((resource, items));
    }

    let mut summary = SeedSummary::default();
    for (resource, items) in parsed {
        *summary.loaded.entry(resource).or_default() += items.len();
        store
            .insert_many(resource.descriptor().collection, items)
            .await;
    }
    Ok(summary)
}

fn parse_record(resource: ResourceType, index: usize, record: Value) -> Result<Item, SeedError> {
    let invalid = |reason: String| SeedError::InvalidRecord {
        resource,
        index,
        reason,
    };

    let Value::Object(mut fields) = record else {
        return Err(invalid("record must be an object".to_string()));
    };

    let id = match fields.remove(resource.descriptor().id_field) {
        Some(Value::String(raw)) => raw
            .parse::<ItemId>()
            .map_err(|e| invalid(e.to_string()))?,
        Some(Value::Null) | None => ItemId::generate(),
        Some(other) => return Err(invalid(format!("id must be a string, got {other}"))),
    };

    Ok(scalar_fields(resource, &id, fields)
        .fold(Item::new(id.clone()), |item, (name, value)| {
            item.with_field(name, value)
        }))
}

fn scalar_fields<'a>(
    resource: ResourceType,
    id: &'a ItemId,
    fields: Map<String, Value>,
) -> impl Iterator<Item = (String, FieldValue)> + 'a {
    fields.into_iter().filter_map(move |(name, value)| match value {
        Value::Null => None,
        Value::Array(_) | Value::Object(_) => {
            debug!(%resource, %id, field = %name, "Skipping non-scalar field");
            None
        }
        scalar => match serde_json::from_value::<FieldValue>(scalar) {
            Ok(value) => Some((name, value)),
            Err(e) => {
                warn!(%resource, %id, field = %name, error = %e, "Skipping unreadable field");
                None
            }
        },
    })
}
