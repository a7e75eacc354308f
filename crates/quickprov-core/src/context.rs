//! Per-render state.

use crate::binder::{self, VarMap};
use crate::device::DeviceRecord;
use crate::document::TemplateDocument;
use crate::lookup::{PlatformLookup, ServerInfo};

/// Everything one render reads. Built fresh for each call and dropped when it
/// returns; nothing here is shared between renders.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub document: &'a TemplateDocument,
    pub device: &'a DeviceRecord,
    /// The device's template override, or the driver's template.
    pub template: &'a str,
    /// Normalized MAC.
    pub mac: String,
    pub server: ServerInfo,
    pub vars: VarMap,
}

impl<'a> RenderContext<'a> {
    /// Resolve the template and bind variables for `device`.
    pub fn build(
        document: &'a TemplateDocument,
        device: &'a DeviceRecord,
        lookup: &dyn PlatformLookup,
    ) -> Self {
        let server = lookup.server_info();
        let vars = binder::bind(device, lookup, &server);
        let template = device
            .template_override()
            .unwrap_or(&document.provisioning.template);
        Self {
            document,
            device,
            template,
            mac: device.normalized_mac(),
            server,
            vars,
        }
    }
}
