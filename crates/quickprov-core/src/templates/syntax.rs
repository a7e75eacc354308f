//! Tokenizer for the provisioning template language.
//!
//! A template is plain text interleaved with `{{...}}` tags:
//!
//! - `{{name}}`: variable
//! - `{{if name}}` / `{{/if}}`: conditional block markers
//! - `{{name_loop}}` / `{{/name_loop}}`: loop block markers
//!
//! Variable and loop names are made of ASCII letters, digits, `_`, `.` and
//! `-`. Anything between braces that is not one of the tags above (for
//! example `{{ spaced }}`) is ordinary text.
//!
//! The tokenizer is a single forward scan; it never backtracks.

/// One lexical unit of a template. Every token borrows its exact source text
/// so unprocessed tags can be written back verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    Var { name: &'a str, raw: &'a str },
    IfOpen { name: &'a str, raw: &'a str },
    IfClose { raw: &'a str },
    LoopOpen { name: &'a str, raw: &'a str },
    LoopClose { name: &'a str, raw: &'a str },
}

impl<'a> Token<'a> {
    /// The source text this token was read from.
    pub fn raw(&self) -> &'a str {
        match *self {
            Token::Text(text) => text,
            Token::Var { raw, .. }
            | Token::IfOpen { raw, .. }
            | Token::IfClose { raw }
            | Token::LoopOpen { raw, .. }
            | Token::LoopClose { raw, .. } => raw,
        }
    }
}

/// Split a template into tokens.
///
/// Concatenating the `raw()` text of the result always reproduces `source`.
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while let Some(offset) = source[pos..].find("{{") {
        let mut open = pos + offset;
        // `{{{name}}` tags the innermost pair; the extra brace is text.
        while source[open + 2..].starts_with('{') {
            open += 1;
        }
        let inner_start = open + 2;
        let Some(close_offset) = source[inner_start..].find("}}") else {
            break;
        };
        let close = inner_start + close_offset;
        let inner = &source[inner_start..close];

        // `{{a {{b}}`: restart the scan at the innermost opener.
        if let Some(nested) = inner.rfind("{{") {
            pos = inner_start + nested;
            continue;
        }

        let raw = &source[open..close + 2];
        match classify(inner, raw) {
            Some(token) => {
                if text_start < open {
                    tokens.push(Token::Text(&source[text_start..open]));
                }
                tokens.push(token);
                pos = close + 2;
                text_start = pos;
            }
            None => pos = inner_start,
        }
    }

    if text_start < source.len() {
        tokens.push(Token::Text(&source[text_start..]));
    }
    tokens
}

fn classify<'a>(inner: &'a str, raw: &'a str) -> Option<Token<'a>> {
    if inner == "/if" {
        return Some(Token::IfClose { raw });
    }
    if let Some(name) = inner.strip_prefix("if ") {
        return Some(Token::IfOpen {
            name: name.trim(),
            raw,
        });
    }
    if let Some(name) = inner
        .strip_prefix('/')
        .and_then(|rest| rest.strip_suffix("_loop"))
    {
        return is_name(name).then_some(Token::LoopClose { name, raw });
    }
    if let Some(name) = inner.strip_suffix("_loop") {
        return is_name(name).then_some(Token::LoopOpen { name, raw });
    }
    is_name(inner).then_some(Token::Var { name: inner, raw })
}

fn is_name(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rebuild(tokens: &[Token<'_>]) -> String {
        tokens.iter().map(Token::raw).collect()
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(tokenize("no tags here"), vec![Token::Text("no tags here")]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_variable() {
        let tokens = tokenize("Hello {{name}}!");
        assert_eq!(
            tokens,
            vec![
                Token::Text("Hello "),
                Token::Var {
                    name: "name",
                    raw: "{{name}}"
                },
                Token::Text("!"),
            ]
        );
    }

    #[test]
    fn test_dotted_variable_name() {
        let tokens = tokenize("{{phone_setting.keyboard_lock}}");
        assert!(matches!(
            tokens[0],
            Token::Var { name: "phone_setting.keyboard_lock", .. }
        ));
    }

    #[test]
    fn test_conditional_markers() {
        let tokens = tokenize("{{if  pin }}X{{/if}}");
        assert!(matches!(tokens[0], Token::IfOpen { name: "pin", .. }));
        assert_eq!(tokens[1], Token::Text("X"));
        assert!(matches!(tokens[2], Token::IfClose { .. }));
    }

    #[test]
    fn test_loop_markers() {
        let tokens = tokenize("{{line_keys_loop}}k{{/line_keys_loop}}{{promo_loop}}");
        assert!(matches!(tokens[0], Token::LoopOpen { name: "line_keys", .. }));
        assert!(matches!(tokens[2], Token::LoopClose { name: "line_keys", .. }));
        assert!(matches!(tokens[3], Token::LoopOpen { name: "promo", .. }));
    }

    #[test]
    fn test_non_tags_stay_text() {
        for source in ["{{ spaced }}", "{{}}", "{{_loop}}", "{{/x y_loop}}", "{{unclosed", "a }} b"] {
            let tokens = tokenize(source);
            assert!(
                tokens.iter().all(|t| matches!(t, Token::Text(_))),
                "{source:?} produced a tag"
            );
            assert_eq!(rebuild(&tokens), source);
        }
    }

    #[test]
    fn test_extra_braces() {
        let tokens = tokenize("{{{name}}}");
        assert_eq!(tokens[0], Token::Text("{"));
        assert!(matches!(tokens[1], Token::Var { name: "name", .. }));
        assert_eq!(tokens[2], Token::Text("}"));
    }

    #[test]
    fn test_nested_opener_restarts_scan() {
        let tokens = tokenize("{{a {{b}}");
        assert_eq!(tokens[0], Token::Text("{{a "));
        assert!(matches!(tokens[1], Token::Var { name: "b", .. }));
    }

    #[test]
    fn test_roundtrip_preserves_source() {
        let source = "#!version:1.0.0.1\n{{if pin}}lock={{pin}}{{/if}}\n{{line_keys_loop}}linekey.{{index}}.type={{type}}\n{{/line_keys_loop}}{{ x }}";
        assert_eq!(rebuild(&tokenize(source)), source);
    }
}
