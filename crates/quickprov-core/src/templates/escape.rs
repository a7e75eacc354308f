//! Output escaping for admin-entered text.
//!
//! Every driver gets the same policy: HTML special characters (`& < > " '`)
//! are replaced by entities. XML-based handset formats need it, and for
//! `key = value` formats it is harmless.

use std::borrow::Cow;

/// Escape `& < > " '` as `&amp; &lt; &gt; &quot; &#039;`.
pub fn escape_text(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
