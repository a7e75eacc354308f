//! Compile-time embedded sample files for `quickprov init`.
//!
//! Each constant loads a file from the workspace `templates/` directory via
//! [`include_str!`]. The paths are relative to this source file
//! (`crates/quickprov-core/src/templates/embedded.rs`).
//!
//! ## Warning
//!
//! Do NOT rename or move sample files without updating the `include_str!` path here.
//! The sample device references the sample driver's model id and the sample
//! directory's extension; keep the three in sync.

// -------------------------------------------------------
// Handset drivers
// -------------------------------------------------------

pub const SAMPLE_DRIVER_MODEL: &str = "yealink_t48g";
pub const SAMPLE_DRIVER: &str = include_str!("../../../../templates/drivers/yealink_t48g.json");

// -------------------------------------------------------
// Devices and extension directory
// -------------------------------------------------------

pub const SAMPLE_DEVICE_MAC: &str = "001565AABBCC";
pub const SAMPLE_DEVICE: &str = include_str!("../../../../templates/devices/001565AABBCC.json");
pub const SAMPLE_DIRECTORY: &str = include_str!("../../../../templates/config/directory.json");
