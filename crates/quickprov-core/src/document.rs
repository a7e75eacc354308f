//! Handset driver documents.
//!
//! One JSON document per handset model describes how that model's native
//! config file is produced:
//!
//! ```json
//! {
//!   "model": "yealink_t48g",
//!   "display_name": "Yealink T48G",
//!   "configurable_options": [ { "name": "timezone", "type": "text", "default": "+0" } ],
//!   "provisioning": {
//!     "content_type": "text/plain",
//!     "filename_pattern": "{mac}.cfg",
//!     "type_mapping": { "line": "15", "blf": "16" },
//!     "template": "account.1.user_name = {{extension}}\n...",
//!     "codec_data": [ "PCMU", "G722" ]
//!   }
//! }
//! ```
//!
//! `visual_editor`, `configurable_options` and `max_line_keys` are carried for
//! the admin UI; the render pipeline only reads `provisioning`. Drivers are
//! written by hand and by several UIs, so field types are read leniently: a
//! document is only rejected when it is not a JSON object.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::device::{lenient_text, value_text};

/// Content type served when a driver does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Filename pattern used when a driver does not declare one.
pub const DEFAULT_FILENAME_PATTERN: &str = "{mac}.cfg";

/// A complete handset driver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateDocument {
    #[serde(default, deserialize_with = "lenient_text")]
    pub model: String,
    #[serde(default, skip_serializing_if = "String::is_empty", deserialize_with = "lenient_text")]
    pub display_name: String,
    /// `None` when absent or not a non-negative integer.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_count")]
    pub max_line_keys: Option<u32>,
    /// Entries that are not JSON objects are dropped.
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_options")]
    pub configurable_options: Vec<ConfigurableOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_editor: Option<Value>,
    #[serde(default)]
    pub provisioning: Provisioning,
}

/// The part of a driver the render pipeline consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provisioning {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_text")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_text")]
    pub filename_pattern: Option<String>,
    /// Abstract key type (`line`, `blf`, ...) to vendor code. Codes may be
    /// JSON numbers or strings.
    #[serde(default, deserialize_with = "lenient_object")]
    pub type_mapping: Map<String, Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub template: String,
    /// Everything else, notably `<name>_data` arrays for generic loops.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An admin-exposed knob. Only the admin UI interprets these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigurableOption {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_text")]
    pub option_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "String::is_empty", deserialize_with = "lenient_text")]
    pub label: String,
}

fn lenient_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        other => Some(value_text(&other)),
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let text = value_text(&Value::deserialize(deserializer)?);
    Ok(!matches!(text.as_str(), "" | "0" | "false"))
}

fn lenient_object<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        _ => Map::new(),
    })
}

fn lenient_options<'de, D>(deserializer: D) -> Result<Vec<ConfigurableOption>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

impl TemplateDocument {
    /// Parse a driver from JSON text.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Name shown in listings: `display_name`, or the model id when unset.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.model
        } else {
            &self.display_name
        }
    }
}

impl Provisioning {
    /// Content type to serve, defaulting to `text/plain`.
    pub fn content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    /// Filename pattern, defaulting to `{mac}.cfg`.
    pub fn filename_pattern(&self) -> &str {
        self.filename_pattern
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_FILENAME_PATTERN)
    }

    /// Vendor code for an abstract key type, or the type itself when unmapped.
    pub fn map_key_type(&self, key_type: &str) -> String {
        self.type_mapping
            .get(key_type)
            .map(value_text)
            .unwrap_or_else(|| key_type.to_string())
    }

    /// The `<name>_data` entry declared by the driver, if any.
    pub fn loop_data(&self, name: &str) -> Option<&Value> {
        self.extra.get(&format!("{name}_data"))
    }
}
