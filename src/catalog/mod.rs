//! Stream registry and catalog handling
//!
//! The tap knows three streams with a fixed two-level dependency: one root
//! stream (`buildings`) whose rows carry nested location identifiers, and
//! dependent streams (`bookables`, `bookings`) that require a location
//! identifier and a weekly time window to query. The dependency is declared
//! here as data and resolved into a [`SyncPlan`] before the per-stream loop,
//! never patched into catalog ordering by name comparison.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

const BUILDINGS_SCHEMA: &str = include_str!("schemas/buildings.json");
const BOOKABLES_SCHEMA: &str = include_str!("schemas/bookables.json");
const BOOKINGS_SCHEMA: &str = include_str!("schemas/bookings.json");

/// Catalog errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Catalog file could not be read
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file is not valid JSON
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// A selected stream has no entry in the stream registry
    #[error("unknown stream in catalog: {0}")]
    UnknownStream(String),
}

/// How a stream is queried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// Queried once globally, without parameters; its rows yield the
    /// location identifiers that seed every dependent stream
    Root {
        /// Endpoint path relative to the API root
        endpoint: &'static str,
    },
    /// Queried once per (location, week) pair
    Dependent {
        /// Endpoint path with a `{location_id}` placeholder
        endpoint_template: &'static str,
        /// Whether emitted rows are enriched with the owning `location_id`
        location_scoped: bool,
    },
}

/// Static definition of a known stream
#[derive(Debug)]
pub struct StreamDef {
    /// Stream name, equal to its `tap_stream_id`
    pub name: &'static str,
    /// How the stream is queried
    pub kind: StreamKind,
}

/// Registry of the streams this tap can extract.
pub static STREAMS: Lazy<Vec<StreamDef>> = Lazy::new(|| {
    vec![
        StreamDef {
            name: "buildings",
            kind: StreamKind::Root {
                endpoint: "/buildings",
            },
        },
        StreamDef {
            name: "bookables",
            kind: StreamKind::Dependent {
                endpoint_template: "/locations/{location_id}/bookables",
                location_scoped: true,
            },
        },
        StreamDef {
            name: "bookings",
            kind: StreamKind::Dependent {
                endpoint_template: "/locations/{location_id}/bookings",
                location_scoped: true,
            },
        },
    ]
});

/// Look up a stream definition by name.
pub fn stream_def(name: &str) -> Option<&'static StreamDef> {
    STREAMS.iter().find(|def| def.name == name)
}

/// Substitute a location identifier into an endpoint template.
pub fn render_endpoint(template: &str, location_id: &str) -> String {
    template.replace("{location_id}", location_id)
}

fn default_true() -> bool {
    true
}

/// One stream in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Stream identity
    pub tap_stream_id: String,
    /// Display name (same as `tap_stream_id` for this tap)
    pub stream: String,
    /// Schema document emitted verbatim before any record
    pub schema: Value,
    /// Key properties for the SCHEMA message
    #[serde(default)]
    pub key_properties: Vec<String>,
    /// Field whose maximum-seen value is the stream's bookmark
    #[serde(default)]
    pub replication_key: Option<String>,
    /// Whether the API returns rows sorted ascending by the replication key
    #[serde(default = "default_true")]
    pub is_sorted: bool,
    /// Whether the stream is selected for syncing
    #[serde(default = "default_true")]
    pub selected: bool,
}

/// The catalog: every stream the tap knows about
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Catalog entries in declaration order
    pub streams: Vec<CatalogEntry>,
}

/// The resolved per-run iteration plan: root first, then dependents in
/// catalog order.
#[derive(Debug)]
pub struct SyncPlan<'a> {
    /// The root stream, if selected
    pub root: Option<(&'a CatalogEntry, &'static StreamDef)>,
    /// Dependent streams in catalog order
    pub dependents: Vec<(&'a CatalogEntry, &'static StreamDef)>,
}

impl Catalog {
    /// Build the default catalog from the embedded schema documents, all
    /// streams selected. This is what `discover` emits.
    pub fn discover() -> Result<Catalog, CatalogError> {
        let streams = vec![
            CatalogEntry {
                tap_stream_id: "buildings".to_string(),
                stream: "buildings".to_string(),
                schema: serde_json::from_str(BUILDINGS_SCHEMA)?,
                key_properties: vec!["id".to_string()],
                replication_key: None,
                is_sorted: true,
                selected: true,
            },
            CatalogEntry {
                tap_stream_id: "bookables".to_string(),
                stream: "bookables".to_string(),
                schema: serde_json::from_str(BOOKABLES_SCHEMA)?,
                key_properties: vec!["id".to_string()],
                replication_key: None,
                is_sorted: true,
                selected: true,
            },
            CatalogEntry {
                tap_stream_id: "bookings".to_string(),
                stream: "bookings".to_string(),
                schema: serde_json::from_str(BOOKINGS_SCHEMA)?,
                key_properties: vec!["id".to_string()],
                replication_key: Some("updated_at".to_string()),
                is_sorted: true,
                selected: true,
            },
        ];
        Ok(Catalog { streams })
    }

    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Catalog, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&raw)?;
        debug!(streams = catalog.streams.len(), "loaded catalog");
        Ok(catalog)
    }

    /// Resolve selected streams against the registry into a [`SyncPlan`].
    ///
    /// Location identifiers are a hard prerequisite for dependent streams,
    /// so the root stream always comes first regardless of how the catalog
    /// orders its entries.
    pub fn sync_plan(&self) -> Result<SyncPlan<'_>, CatalogError> {
        let mut root = None;
        let mut dependents = Vec::new();
        for entry in self.streams.iter().filter(|entry| entry.selected) {
            let def = stream_def(&entry.tap_stream_id)
                .ok_or_else(|| CatalogError::UnknownStream(entry.tap_stream_id.clone()))?;
            match def.kind {
                StreamKind::Root { .. } => root = Some((entry, def)),
                StreamKind::Dependent { .. } => dependents.push((entry, def)),
            }
        }
        Ok(SyncPlan { root, dependents })
    }
}
