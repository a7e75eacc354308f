//! Variable binding: device record + platform lookups -> flat variable map.
//!
//! | variable        | source                                                     |
//! |-----------------|------------------------------------------------------------|
//! | `mac`           | device MAC, uppercase hex                                  |
//! | `extension`     | device extension                                           |
//! | `password`      | `custom_sip_secret`, else platform secret, else empty      |
//! | `display_name`  | platform caller-id name, else the extension                |
//! | `server_host`   | [`ServerInfo::host`]                                       |
//! | `server_port`   | [`ServerInfo::port`]                                       |
//! | `wallpaper`     | media URL when a wallpaper is set, else empty              |
//! | `security_pin`  | device PIN or empty                                        |
//! | `lock_enable`   | `1` when a PIN is set, else `0`                            |
//! | *custom option* | every non-empty custom option, HTML-escaped                |
//!
//! Custom options are bound last and win over the built-ins on a name clash.
//!
//! Only names made of ASCII letters, digits, `_`, `.` and `-` can appear in a
//! `{{name}}` tag. A custom option whose name uses any other character (a
//! space, a colon) is still bound but no template can reference it; such a
//! tag stays in the output as written.

use std::collections::HashMap;

use crate::device::DeviceRecord;
use crate::lookup::{PlatformLookup, ServerInfo};
use crate::templates::escape::escape_text;

/// Bound template variables. Lookup only; iteration order is irrelevant.
pub type VarMap = HashMap<String, String>;

/// Build the variable map for one render.
pub fn bind(device: &DeviceRecord, lookup: &dyn PlatformLookup, server: &ServerInfo) -> VarMap {
    let mac = device.normalized_mac();
    let mut vars = VarMap::new();

    let password = device
        .custom_sip_secret
        .clone()
        .filter(|s| !s.is_empty())
        .or_else(|| lookup.sip_secret(&device.extension))
        .unwrap_or_default();

    let display_name = lookup
        .display_name(&device.extension)
        .unwrap_or_else(|| device.extension.clone());

    let wallpaper = if device.wallpaper.is_empty() {
        String::new()
    } else {
        server.wallpaper_url(&mac)
    };

    let lock_enable = if device.security_pin.is_empty() { "0" } else { "1" };

    vars.insert("extension".into(), device.extension.clone());
    vars.insert("password".into(), password);
    vars.insert("display_name".into(), display_name);
    vars.insert("server_host".into(), server.host.clone());
    vars.insert("server_port".into(), server.port.clone());
    vars.insert("wallpaper".into(), wallpaper);
    vars.insert("security_pin".into(), device.security_pin.clone());
    vars.insert("lock_enable".into(), lock_enable.into());
    vars.insert("mac".into(), mac);

    for (name, value) in &device.custom_options {
        if !value.is_empty() {
            vars.insert(name.clone(), escape_text(value).into_owned());
        }
    }

    vars
}
