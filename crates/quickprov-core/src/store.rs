//! Directory-backed store of handset drivers.
//!
//! Each model lives in `<dir>/<model>.json`. Writes go to a temporary file in
//! the same directory and are renamed into place, so a concurrent reader sees
//! either the old document or the new one, never a partial write.
//!
//! Parsed documents can be cached in memory. The cache is filled and
//! invalidated under one lock, so a render never sees a document older than
//! the last completed `put` or `delete`.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tempfile::NamedTempFile;

use crate::document::TemplateDocument;
use crate::error::{ProvisionError, Result};

/// Listing entry for a stored driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSummary {
    pub model: String,
    pub display_name: String,
}

/// Handset drivers stored as JSON files in one directory.
#[derive(Debug)]
pub struct TemplateStore {
    dir: PathBuf,
    cache: Option<RwLock<HashMap<String, Arc<TemplateDocument>>>>,
}

/// Model ids are used as file names: letters, digits, `_` and `-` only.
pub fn validate_model(model: &str) -> Result<()> {
    let valid = !model.is_empty()
        && model
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ProvisionError::InvalidModel(model.to_string()))
    }
}

impl TemplateStore {
    /// A store that caches parsed documents.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: Some(RwLock::new(HashMap::new())),
        }
    }

    /// A store that reads from disk on every `get`.
    pub fn uncached(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: None,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, model: &str) -> PathBuf {
        self.dir.join(format!("{model}.json"))
    }

    /// Load and parse the driver for `model`.
    pub fn get(&self, model: &str) -> Result<Arc<TemplateDocument>> {
        validate_model(model)?;

        let Some(cache) = &self.cache else {
            return self.load(model).map(Arc::new);
        };

        if let Some(doc) = cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(model)
        {
            tracing::debug!("template cache hit: {model}");
            return Ok(Arc::clone(doc));
        }

        // Load under the write lock so a concurrent put cannot slip in between
        // reading the file and caching it.
        let mut entries = cache.write().unwrap_or_else(|e| e.into_inner());
        if let Some(doc) = entries.get(model) {
            return Ok(Arc::clone(doc));
        }
        let doc = Arc::new(self.load(model)?);
        entries.insert(model.to_string(), Arc::clone(&doc));
        Ok(doc)
    }

    /// The stored JSON text for `model`, exactly as imported.
    pub fn get_raw(&self, model: &str) -> Result<String> {
        validate_model(model)?;
        self.read_file(model)
    }

    fn read_file(&self, model: &str) -> Result<String> {
        match std::fs::read_to_string(self.path_for(model)) {
            Ok(json) => Ok(json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ProvisionError::TemplateNotFound(model.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn load(&self, model: &str) -> Result<TemplateDocument> {
        let json = self.read_file(model)?;
        tracing::debug!("loaded template {model} ({} bytes)", json.len());
        TemplateDocument::from_json(&json).map_err(|e| ProvisionError::TemplateInvalidJson {
            model: model.to_string(),
            source: e,
        })
    }

    /// Validate and store `json` as the driver for `model`, replacing any
    /// previous document. A document that declares a different `model` is
    /// rejected; one that declares none is accepted.
    pub fn put(&self, model: &str, json: &str) -> Result<()> {
        validate_model(model)?;
        let doc = TemplateDocument::from_json(json).map_err(|e| {
            ProvisionError::TemplateInvalidJson {
                model: model.to_string(),
                source: e,
            }
        })?;
        if !doc.model.is_empty() && doc.model != model {
            return Err(ProvisionError::ModelMismatch {
                model: model.to_string(),
                declared: doc.model,
            });
        }

        let path = self.path_for(model);
        let mut entries = self
            .cache
            .as_ref()
            .map(|c| c.write().unwrap_or_else(|e| e.into_inner()));
        self.write_atomic(&path, json)?;
        if let Some(entries) = entries.as_mut() {
            entries.remove(model);
        }

        tracing::info!("stored template {model} at {}", path.display());
        Ok(())
    }

    /// Store a driver under the `model` id it declares itself.
    pub fn import(&self, json: &str) -> Result<String> {
        let doc = TemplateDocument::from_json(json).map_err(|e| {
            ProvisionError::TemplateInvalidJson {
                model: "<import>".into(),
                source: e,
            }
        })?;
        self.put(&doc.model, json)?;
        Ok(doc.model)
    }

    fn write_atomic(&self, path: &Path, json: &str) -> Result<()> {
        let write_err = |source: std::io::Error| ProvisionError::StoreWrite {
            path: path.to_path_buf(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(write_err)?;
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(path).map_err(|e| write_err(e.error))?;
        Ok(())
    }

    /// Remove the driver for `model`.
    pub fn delete(&self, model: &str) -> Result<()> {
        validate_model(model)?;
        let path = self.path_for(model);

        let mut entries = self
            .cache
            .as_ref()
            .map(|c| c.write().unwrap_or_else(|e| e.into_inner()));
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProvisionError::TemplateNotFound(model.to_string()));
            }
            Err(e) => return Err(ProvisionError::StoreWrite { path, source: e }),
        }
        if let Some(entries) = entries.as_mut() {
            entries.remove(model);
        }

        tracing::info!("deleted template {model}");
        Ok(())
    }

    /// All stored drivers, sorted by model id.
    ///
    /// A driver that cannot be read or parsed is still listed, under its model id.
    pub fn list(&self) -> Result<Vec<TemplateSummary>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut list = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(model) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if validate_model(model).is_err() {
                continue;
            }

            let display_name = match self.load(model) {
                Ok(doc) if !doc.display_name.is_empty() => doc.display_name,
                Ok(_) => model.to_string(),
                Err(e) => {
                    tracing::warn!("listing {model} without metadata: {e}");
                    model.to_string()
                }
            };
            list.push(TemplateSummary {
                model: model.to_string(),
                display_name,
            });
        }

        list.sort_by(|a, b| a.model.cmp(&b.model));
        Ok(list)
    }
}
