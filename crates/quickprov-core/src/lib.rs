//! Core library for the quickprov handset provisioner.
//!
//! Turns a stored handset driver ([`document::TemplateDocument`]) and a
//! per-handset [`device::DeviceRecord`] into the config file the phone
//! downloads at boot ([`output::RenderedConfig`]).
//!
//! The pieces, in the order a request flows through them:
//! - [`store`]: driver documents on disk, one per model, written atomically
//! - [`device`]: device records by MAC, plus MAC normalization and validation
//! - [`lookup`]: SIP secrets, caller-id names and server info from the PBX
//! - [`binder`]: the flat variable map for one render
//! - [`templates`]: the template language and its renderer
//! - [`provision`]: the end-to-end `provision(mac)` entry point
//!
//! Rendering itself never touches the filesystem and never fails; missing
//! data renders as empty text.

pub mod binder;
pub mod config;
pub mod context;
pub mod device;
pub mod document;
pub mod error;
pub mod lookup;
pub mod output;
pub mod project;
pub mod provision;
pub mod store;
pub mod templates;
