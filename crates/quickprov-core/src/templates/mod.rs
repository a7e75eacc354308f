//! The provisioning template language.
//!
//! Handset drivers carry a template in their `provisioning.template` field.
//! The language is deliberately small:
//!
//! - `{{name}}`: replaced by a bound variable (see [`crate::binder`]). Unknown
//!   names are left in the output untouched.
//! - `{{if name}}...{{/if}}`: kept when `name` is bound to something other
//!   than `""`, `"0"` or `"false"`, removed otherwise. No nesting.
//! - `{{line_keys_loop}}...{{/line_keys_loop}}`: once per programmable key,
//!   sorted by key index. Exposes `index`, `type` (through the driver's
//!   `type_mapping`) and every other key field.
//! - `{{contacts_loop}}...{{/contacts_loop}}`: once per phonebook entry.
//!   Exposes `index`, `name`, `number`, `custom_label` and `photo_url`.
//! - `{{<name>_loop}}...{{/<name>_loop}}`: once per element of the
//!   `<name>_data` array. Exposes `index`, plus `value` for scalar elements or
//!   each field for object elements.
//!
//! Inside loop items, tokens the item cannot resolve render as nothing.
//!
//! Sample files for new installations are compiled in via [`embedded`].

pub mod conditional;
pub mod embedded;
pub mod escape;
pub mod loops;
pub mod renderer;
pub mod substitute;
pub mod syntax;
