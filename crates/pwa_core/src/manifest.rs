//! Web app manifest assembled from `PWA_*` settings.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};
use thiserror::Error;

/// Every field the manifest knows about, in output order.
pub const MANIFEST_FIELDS: [&str; 18] = [
    "icons",
    "name",
    "background_color",
    "categories",
    "description",
    "dir",
    "display",
    "iarc_rating_id",
    "lang",
    "orientation",
    "prefer_related_applications",
    "related_applications",
    "scope",
    "screenshots",
    "short_name",
    "shortcuts",
    "start_url",
    "theme_color",
];

pub const REQUIRED_FIELDS: [&str; 2] = ["icons", "name"];

pub const DEFAULT_SETTINGS_PREFIX: &str = "PWA_";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    #[error("must set {setting} setting")]
    MissingSetting { setting: String },
    #[error("manifest requires {field}, but no value was given")]
    MissingField { field: String },
    #[error("unknown manifest field {field}")]
    UnknownField { field: String },
}

/// Lookup of raw settings values by name, e.g. `PWA_NAME`.
pub trait SettingsSource {
    fn setting(&self, name: &str) -> Option<Value>;
}

impl SettingsSource for HashMap<String, Value> {
    fn setting(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl SettingsSource for BTreeMap<String, Value> {
    fn setting(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Manifest {
    data: BTreeMap<String, Value>,
}

impl Manifest {
    /// Builds a manifest from explicit field values. Required fields must be
    /// present and non-empty.
    pub fn new(data: BTreeMap<String, Value>) -> Result<Self, ManifestError> {
        if let Some(field) = data.keys().find(|key| !MANIFEST_FIELDS.contains(&key.as_str())) {
            return Err(ManifestError::UnknownField {
                field: field.clone(),
            });
        }
        for field in REQUIRED_FIELDS {
            if !data.get(field).is_some_and(is_truthy) {
                return Err(ManifestError::MissingField {
                    field: field.to_string(),
                });
            }
        }
        Ok(Self { data })
    }

    pub fn from_settings(source: &impl SettingsSource) -> Result<Self, ManifestError> {
        Self::from_settings_with_prefix(source, DEFAULT_SETTINGS_PREFIX)
    }

    /// Each field `foo` is read from the `<prefix>FOO` setting; unset and
    /// null settings are skipped.
    pub fn from_settings_with_prefix(
        source: &impl SettingsSource,
        prefix: &str,
    ) -> Result<Self, ManifestError> {
        let mut data = BTreeMap::new();
        for field in MANIFEST_FIELDS {
            let setting = setting_name(prefix, field);
            match source.setting(&setting) {
                Some(Value::Null) | None => {
                    if REQUIRED_FIELDS.contains(&field) {
                        return Err(ManifestError::MissingSetting { setting });
                    }
                }
                Some(value) => {
                    data.insert(field.to_string(), value);
                }
            }
        }
        Self::new(data)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    pub fn start_url(&self) -> Option<&str> {
        self.get("start_url").and_then(Value::as_str)
    }

    /// The manifest document with only the fields that were set, in the
    /// canonical field order.
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        for field in MANIFEST_FIELDS {
            if let Some(value) = self.data.get(field) {
                out.insert(field.to_string(), value.clone());
            }
        }
        Value::Object(out)
    }
}

fn setting_name(prefix: &str, field: &str) -> String {
    format!("{prefix}{}", field.trim_end_matches('_').to_ascii_uppercase())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Number(_) => true,
    }
}
