//! Lookups against the telephony platform.
//!
//! The render pipeline never talks to the PBX directly. SIP secrets, caller-id
//! names and the server address are obtained through [`PlatformLookup`], so a
//! render can run against a live platform, a JSON directory file
//! ([`StaticDirectory`]) or a test double.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ProvisionError, Result};

/// Default media endpoint used for wallpaper and contact photo URLs.
pub const DEFAULT_MEDIA_PATH: &str = "/admin/modules/quickprovisioner/media.php";

/// Where handsets reach the PBX.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerInfo {
    /// SIP registrar address, bound as `{{server_host}}`.
    pub host: String,
    /// SIP port, bound as `{{server_port}}`.
    pub port: String,
    /// Host handsets use for HTTP media fetches. Falls back to `host`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_host: Option<String>,
    /// Serve media URLs over https.
    pub https: bool,
    /// Path of the media endpoint on `http_host`.
    pub media_path: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: "5060".into(),
            http_host: None,
            https: false,
            media_path: DEFAULT_MEDIA_PATH.into(),
        }
    }
}

impl ServerInfo {
    /// `scheme://host/media_path`, without query string.
    ///
    /// Never carries a `user:pass@` part: handsets authenticate media fetches
    /// with HTTP Basic headers.
    pub fn media_base(&self) -> String {
        let scheme = if self.https { "https" } else { "http" };
        let host = self
            .http_host
            .as_deref()
            .filter(|h| !h.is_empty())
            .unwrap_or(&self.host);
        format!("{scheme}://{host}{}", self.media_path)
    }

    /// URL a handset fetches its wallpaper from.
    pub fn wallpaper_url(&self, mac: &str) -> String {
        format!("{}?mac={mac}", self.media_base())
    }

    /// URL a handset fetches a contact photo from (cropped to 100x100).
    pub fn photo_url(&self, mac: &str, photo: &str) -> String {
        format!(
            "{}?file={photo}&mac={mac}&w=100&h=100&mode=crop",
            self.media_base()
        )
    }
}

/// External collaborators consulted while binding render variables.
pub trait PlatformLookup: Send + Sync {
    /// SIP secret for an extension, if the platform knows one.
    fn sip_secret(&self, extension: &str) -> Option<String>;

    /// Caller-id display name for an extension.
    fn display_name(&self, extension: &str) -> Option<String>;

    /// Address and media settings handsets should use.
    fn server_info(&self) -> ServerInfo;
}

/// One extension entry in a directory file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionEntry {
    pub secret: String,
    pub name: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct DirectoryFile {
    extensions: BTreeMap<String, ExtensionEntry>,
}

/// A [`PlatformLookup`] backed by an in-memory extension map.
///
/// Directory files look like:
///
/// ```json
/// { "extensions": { "200": { "secret": "s3cr3t", "name": "Front Desk" } } }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    server: ServerInfo,
    extensions: BTreeMap<String, ExtensionEntry>,
}

impl StaticDirectory {
    pub fn new(server: ServerInfo) -> Self {
        Self {
            server,
            extensions: BTreeMap::new(),
        }
    }

    /// Load extensions from a directory file.
    pub fn load(path: &Path, server: ServerInfo) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ProvisionError::ConfigNotFound {
                path: path.to_path_buf(),
                source: e,
            })?;
        let file: DirectoryFile =
            serde_json::from_str(&contents).map_err(|e| ProvisionError::ConfigParse {
                path: path.to_path_buf(),
                source: e,
            })?;
        tracing::debug!(
            "loaded {} extensions from {}",
            file.extensions.len(),
            path.display()
        );
        Ok(Self {
            server,
            extensions: file.extensions,
        })
    }

    /// Add or replace an extension.
    pub fn with_extension(mut self, extension: &str, secret: &str, name: &str) -> Self {
        self.extensions.insert(
            extension.to_string(),
            ExtensionEntry {
                secret: secret.to_string(),
                name: name.to_string(),
            },
        );
        self
    }
}

impl PlatformLookup for StaticDirectory {
    fn sip_secret(&self, extension: &str) -> Option<String> {
        self.extensions
            .get(extension)
            .map(|e| e.secret.clone())
            .filter(|s| !s.is_empty())
    }

    fn display_name(&self, extension: &str) -> Option<String> {
        self.extensions
            .get(extension)
            .map(|e| e.name.clone())
            .filter(|s| !s.is_empty())
    }

    fn server_info(&self) -> ServerInfo {
        self.server.clone()
    }
}
