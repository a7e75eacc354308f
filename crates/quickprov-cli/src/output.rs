//! Status lines for `quickprov`.
//!
//! Everything here writes to stderr. Stdout is reserved for rendered configs
//! and listings so they can be piped into files or other tools.

use std::path::Path;

use console::style;

use quickprov_core::output::RenderedConfig;

/// Command banner, e.g. `quickprov init: ./prov`.
pub fn print_header(text: &str) {
    eprintln!("\n{}", style(text).bold().cyan());
    eprintln!("{}", style("-".repeat(text.len())).dim());
}

pub fn print_success(text: &str) {
    eprintln!("{} {}", style("ok").green().bold(), text);
}

pub fn print_warning(text: &str) {
    eprintln!("{} {}", style("warning:").yellow().bold(), text);
}

/// `(1/2) Writing config...`
pub fn print_step(step: u32, total: u32, text: &str) {
    eprintln!("{} {}", style(format!("({step}/{total})")).dim(), text);
}

pub fn print_key_value(key: &str, value: &str) {
    eprintln!("  {:<14} {}", style(format!("{key}:")).dim(), value);
}

/// Transport metadata of a config written to `path`.
pub fn print_rendered(config: &RenderedConfig, path: &Path) {
    print_key_value("File", &path.display().to_string());
    print_key_value("Content-Type", &config.content_type);
    print_key_value("Size", &format!("{} bytes", config.as_bytes().len()));
    print_key_value("ETag", &config.etag());
}
