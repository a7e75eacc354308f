//! Rendered config files, ready to hand to the HTTP layer.

use sha2::{Digest, Sha256};

use crate::document::TemplateDocument;

/// A rendered handset config plus the transport metadata that goes with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedConfig {
    pub body: String,
    /// Value for the `Content-Type` header.
    pub content_type: String,
    /// Suggested download name, e.g. `001565AABBCC.cfg`.
    pub filename: String,
}

impl RenderedConfig {
    /// Attach the driver's content type and filename to rendered text.
    pub fn assemble(document: &TemplateDocument, mac: &str, body: String) -> Self {
        let provisioning = &document.provisioning;
        Self {
            body,
            content_type: provisioning.content_type().to_string(),
            filename: provisioning.filename_pattern().replace("{mac}", mac),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.body.as_bytes()
    }

    /// Strong ETag over the body: a quoted lowercase SHA-256 hex digest.
    pub fn etag(&self) -> String {
        let digest = Sha256::digest(self.body.as_bytes());
        format!("\"{}\"", hex::encode(digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_with_driver_metadata() {
        let doc = TemplateDocument::from_json(
            r#"{"model": "cisco", "provisioning": {"content_type": "text/xml", "filename_pattern": "SEP{mac}.cnf.xml"}}"#,
        )
        .unwrap();
        let out = RenderedConfig::assemble(&doc, "001565AABBCC", "<device/>".into());
        assert_eq!(out.content_type, "text/xml");
        assert_eq!(out.filename, "SEP001565AABBCC.cnf.xml");
        assert_eq!(out.as_bytes(), b"<device/>");
    }

    #[test]
    fn test_assemble_defaults() {
        let out = RenderedConfig::assemble(&TemplateDocument::default(), "001565AABBCC", String::new());
        assert_eq!(out.content_type, "text/plain");
        assert_eq!(out.filename, "001565AABBCC.cfg");
    }

    #[test]
    fn test_etag_tracks_body() {
        let doc = TemplateDocument::default();
        let a = RenderedConfig::assemble(&doc, "001565AABBCC", "a".into());
        let a2 = RenderedConfig::assemble(&doc, "001565AABBCC", "a".into());
        let b = RenderedConfig::assemble(&doc, "001565AABBCC", "b".into());
        assert_eq!(a.etag(), a2.etag());
        assert_ne!(a.etag(), b.etag());
        assert_eq!(
            a.etag(),
            "\"ca978112ca1bbdcafac231b39a23dc4da786eff8147c4e72b9807785afee48bb\""
        );
    }
}
