//! Device records and the on-disk device directory.
//!
//! A device record is what an admin configures for one handset: which model
//! it is, which extension it registers, its programmable keys, its local
//! phonebook and any per-device overrides of driver defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{ProvisionError, Result};

/// Normalize a MAC: uppercase, then drop every character that is not a hex digit.
///
/// `"00:15:65:aa:bb:cc"` becomes `"001565AABBCC"`.
pub fn normalize_mac(raw: &str) -> String {
    raw.chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| c.is_ascii_hexdigit())
        .collect()
}

/// Normalize a MAC and reject it when fewer than 12 hex digits remain.
pub fn parse_mac(raw: &str) -> Result<String> {
    let mac = normalize_mac(raw);
    if mac.len() < 12 {
        return Err(ProvisionError::InvalidMac(raw.to_string()));
    }
    Ok(mac)
}

/// One programmable key on the handset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBinding {
    /// Position on the handset as the admin entered it. Not necessarily
    /// contiguous or unique.
    #[serde(default, deserialize_with = "lenient_index")]
    pub index: i64,
    #[serde(rename = "type", default = "default_key_type", deserialize_with = "lenient_text")]
    pub key_type: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub value: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub label: String,
    /// Vendor-specific extras (`line`, `pickup_value`, ...), substituted by name.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_key_type() -> String {
    "line".into()
}

impl Default for KeyBinding {
    fn default() -> Self {
        Self {
            index: 0,
            key_type: default_key_type(),
            value: String::new(),
            label: String::new(),
            extra: Map::new(),
        }
    }
}

impl KeyBinding {
    pub fn new(index: i64, key_type: &str, value: &str, label: &str) -> Self {
        Self {
            index,
            key_type: key_type.into(),
            value: value.into(),
            label: label.into(),
            extra: Map::new(),
        }
    }

    /// Raw (unescaped) text of a named field other than `index` and `type`.
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "value" => Some(self.value.clone()),
            "label" => Some(self.label.clone()),
            _ => self.extra.get(name).map(value_text),
        }
    }
}

/// One entry in the handset's local phonebook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub number: String,
    #[serde(deserialize_with = "lenient_text")]
    pub custom_label: String,
    /// Uploaded asset name, empty when the contact has no photo.
    #[serde(deserialize_with = "lenient_text")]
    pub photo: String,
}

/// Everything configured for one handset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceRecord {
    #[serde(deserialize_with = "lenient_text")]
    pub mac: String,
    #[serde(deserialize_with = "lenient_text")]
    pub model: String,
    #[serde(deserialize_with = "lenient_text")]
    pub extension: String,
    #[serde(deserialize_with = "lenient_text")]
    pub security_pin: String,
    #[serde(deserialize_with = "lenient_text")]
    pub wallpaper: String,
    #[serde(deserialize_with = "lenient_text")]
    pub wallpaper_mode: String,
    pub keys: Vec<KeyBinding>,
    pub contacts: Vec<Contact>,
    /// Admin overrides of driver defaults. Non-string JSON values are kept as
    /// their JSON text so `<name>_data` arrays survive.
    #[serde(deserialize_with = "option_values")]
    pub custom_options: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_template_override: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_sip_secret: Option<String>,
}

impl Default for DeviceRecord {
    fn default() -> Self {
        Self {
            mac: String::new(),
            model: String::new(),
            extension: String::new(),
            security_pin: String::new(),
            wallpaper: String::new(),
            wallpaper_mode: "crop".into(),
            keys: Vec::new(),
            contacts: Vec::new(),
            custom_options: BTreeMap::new(),
            custom_template_override: None,
            custom_sip_secret: None,
        }
    }
}

impl DeviceRecord {
    /// Parse a device record from JSON text.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// The MAC in canonical form (uppercase hex, no separators).
    pub fn normalized_mac(&self) -> String {
        normalize_mac(&self.mac)
    }

    /// Keys ordered by `index`. Ties keep their input order.
    pub fn sorted_keys(&self) -> Vec<&KeyBinding> {
        let mut keys: Vec<&KeyBinding> = self.keys.iter().collect();
        keys.sort_by_key(|k| k.index);
        keys
    }

    /// The per-device template override, when one is set and non-empty.
    pub fn template_override(&self) -> Option<&str> {
        self.custom_template_override
            .as_deref()
            .filter(|t| !t.is_empty())
    }

    /// Check the fields an admin can get wrong.
    pub fn validate(&self) -> Result<()> {
        parse_mac(&self.mac)?;

        if !self.security_pin.is_empty()
            && (self.security_pin.len() > 15
                || !self.security_pin.chars().all(|c| c.is_ascii_digit()))
        {
            return Err(ProvisionError::InvalidDevice(
                "security PIN must be 1-15 digits".into(),
            ));
        }

        if !matches!(self.wallpaper_mode.as_str(), "crop" | "fit") {
            return Err(ProvisionError::InvalidDevice(format!(
                "wallpaper mode must be 'crop' or 'fit', got {:?}",
                self.wallpaper_mode
            )));
        }

        if !self.wallpaper.is_empty() && !is_asset_name(&self.wallpaper) {
            return Err(ProvisionError::InvalidDevice(format!(
                "invalid wallpaper filename {:?}",
                self.wallpaper
            )));
        }

        Ok(())
    }
}

/// `asset_<alnum>.(jpg|jpeg|png|gif)`, extension case-insensitive.
fn is_asset_name(name: &str) -> bool {
    let Some(rest) = name.strip_prefix("asset_") else {
        return false;
    };
    let Some((stem, ext)) = rest.rsplit_once('.') else {
        return false;
    };
    !stem.is_empty()
        && stem.chars().all(|c| c.is_ascii_alphanumeric())
        && matches!(
            ext.to_ascii_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "gif"
        )
}

/// Render a JSON value the way it appears in a config file.
///
/// Strings are taken verbatim, `true` becomes `1`, `false` and `null` become
/// empty, and containers fall back to compact JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "1".into(),
        Value::Bool(false) | Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Accept any JSON scalar where text is expected, converted with [`value_text`].
/// Admin UIs store numbers (`"extension": 200`) as often as strings.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_text(&Value::deserialize(deserializer)?))
}

fn lenient_index<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| D::Error::custom(format!("key index out of range: {n}"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("key index is not a number: {s:?}"))),
        Value::Null => Ok(0),
        other => Err(D::Error::custom(format!("invalid key index: {other}"))),
    }
}

fn option_values<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(k, v)| {
            let text = match &v {
                Value::Array(_) | Value::Object(_) => v.to_string(),
                scalar => value_text(scalar),
            };
            (k, text)
        })
        .collect())
}

/// Summary row for device listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSummary {
    pub mac: String,
    pub model: String,
    pub extension: String,
}

/// Read-only view over `<dir>/<MAC>.json` device records.
#[derive(Debug, Clone)]
pub struct DeviceDirectory {
    dir: PathBuf,
}

impl DeviceDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load the record for a MAC given in any common notation.
    pub fn load(&self, mac: &str) -> Result<DeviceRecord> {
        let mac = parse_mac(mac)?;
        let path = self.dir.join(format!("{mac}.json"));
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProvisionError::DeviceNotFound(mac));
            }
            Err(e) => return Err(e.into()),
        };
        let mut device = DeviceRecord::from_json(&contents)
            .map_err(|e| ProvisionError::DeviceParse { path, source: e })?;
        if device.mac.is_empty() {
            device.mac = mac;
        }
        Ok(device)
    }

    /// Every readable record, sorted by MAC. Unreadable files are skipped.
    pub fn list(&self) -> Result<Vec<DeviceSummary>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut devices = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = std::fs::read_to_string(&path)
                .map_err(ProvisionError::from)
                .and_then(|c| {
                    DeviceRecord::from_json(&c).map_err(|e| ProvisionError::DeviceParse {
                        path: path.clone(),
                        source: e,
                    })
                });
            match parsed {
                Ok(device) => devices.push(DeviceSummary {
                    mac: device.normalized_mac(),
                    model: device.model,
                    extension: device.extension,
                }),
                Err(e) => tracing::warn!("skipping {}: {e}", path.display()),
            }
        }
        devices.sort_by(|a, b| a.mac.cmp(&b.mac));
        Ok(devices)
    }
}
