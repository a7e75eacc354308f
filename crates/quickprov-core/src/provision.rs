//! End-to-end provisioning: MAC in, config file out.
//!
//! [`render`] is the pure core: driver + device + lookups -> [`RenderedConfig`].
//! [`Provisioner`] adds the lookups that can fail (device by MAC, driver by
//! model) and is what a transport layer calls when a handset asks for its
//! config.

use crate::context::RenderContext;
use crate::device::{parse_mac, DeviceDirectory, DeviceRecord};
use crate::document::TemplateDocument;
use crate::error::Result;
use crate::lookup::PlatformLookup;
use crate::output::RenderedConfig;
use crate::store::TemplateStore;
use crate::templates::renderer;

/// Render `device`'s config with `document`. Performs no I/O beyond the
/// calls into `lookup`.
pub fn render(
    document: &TemplateDocument,
    device: &DeviceRecord,
    lookup: &dyn PlatformLookup,
) -> RenderedConfig {
    let ctx = RenderContext::build(document, device, lookup);
    let body = renderer::render(&ctx);
    tracing::debug!(
        "rendered {} for {} ({} bytes)",
        document.model,
        ctx.mac,
        body.len()
    );
    RenderedConfig::assemble(document, &ctx.mac, body)
}

/// Drivers, devices and platform lookups wired together.
pub struct Provisioner {
    store: TemplateStore,
    devices: DeviceDirectory,
    lookup: Box<dyn PlatformLookup>,
}

impl Provisioner {
    pub fn new(store: TemplateStore, devices: DeviceDirectory, lookup: Box<dyn PlatformLookup>) -> Self {
        Self {
            store,
            devices,
            lookup,
        }
    }

    /// Produce the config file for the handset with this MAC.
    ///
    /// Fails with `InvalidMac`, `DeviceNotFound`, `TemplateNotFound` or
    /// `TemplateInvalidJson`; no partial output is produced in any of those cases.
    pub fn provision(&self, mac: &str) -> Result<RenderedConfig> {
        let mac = parse_mac(mac)?;
        let device = self.devices.load(&mac)?;
        let config = self.render_device(&device)?;
        tracing::info!("provisioned {mac} as {}", config.filename);
        Ok(config)
    }

    /// Render a device record that did not come from the device directory.
    pub fn render_device(&self, device: &DeviceRecord) -> Result<RenderedConfig> {
        let document = self.store.get(&device.model)?;
        Ok(render(&document, device, self.lookup.as_ref()))
    }
}
