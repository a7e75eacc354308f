//! Repeating blocks: `{{<name>_loop}}...{{/<name>_loop}}`.
//!
//! Three kinds of loop are recognized by name:
//!
//! - `line_keys`: the device's programmable keys, sorted by `index`
//! - `contacts`: the device's phonebook, in insertion order
//! - anything else: a generic loop over `<name>_data`, taken from the driver's
//!   `provisioning` section or, failing that, from the device's custom options
//!
//! The body of a loop is rendered once per item. Inside an item, tokens the
//! item cannot resolve are dropped, global variables included. Outside loops
//! the substitution pass leaves unknown tokens alone.
//!
//! Only the first `line_keys` block and the first `contacts` block of a
//! template are expanded. Later blocks with the same reserved name are left
//! exactly as written. Every generic block is expanded.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use serde_json::Value;

use super::escape::escape_text;
use super::syntax::Token;
use crate::context::RenderContext;
use crate::device::value_text;
use crate::error::{ProvisionError, Result};

/// Output of the loop pass: untouched tokens and already-rendered loop text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece<'a> {
    Token(Token<'a>),
    Expanded(String),
}

/// Which data a loop block iterates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    LineKeys,
    Contacts,
    Named,
}

impl LoopKind {
    pub fn of(name: &str) -> Self {
        match name {
            "line_keys" => Self::LineKeys,
            "contacts" => Self::Contacts,
            _ => Self::Named,
        }
    }

    /// Reserved loops expand at most once per template.
    pub fn is_reserved(self) -> bool {
        !matches!(self, Self::Named)
    }
}

/// Expand every loop block in `tokens`.
pub fn apply<'a>(tokens: &[Token<'a>], ctx: &RenderContext<'_>) -> Vec<Piece<'a>> {
    let closers = matching_closers(tokens);
    let mut out = Vec::with_capacity(tokens.len());
    let mut expanded_reserved: HashSet<&str> = HashSet::new();
    let mut i = 0;

    while i < tokens.len() {
        if let Token::LoopOpen { name, .. } = tokens[i] {
            if let Some(close) = closers[i] {
                let kind = LoopKind::of(name);
                if !kind.is_reserved() || expanded_reserved.insert(name) {
                    let body = &tokens[i + 1..close];
                    out.push(Piece::Expanded(expand(kind, name, body, ctx)));
                    i = close + 1;
                    continue;
                }
                tracing::debug!("{name}_loop already expanded, leaving later block as written");
            }
        }
        out.push(Piece::Token(tokens[i]));
        i += 1;
    }

    out
}

/// For each loop opener, the index of the first closer with the same name
/// after it.
fn matching_closers<'a>(tokens: &[Token<'a>]) -> Vec<Option<usize>> {
    let mut closers = vec![None; tokens.len()];
    let mut next: HashMap<&'a str, usize> = HashMap::new();
    for (i, token) in tokens.iter().enumerate().rev() {
        match *token {
            Token::LoopOpen { name, .. } => closers[i] = next.get(name).copied(),
            Token::LoopClose { name, .. } => {
                next.insert(name, i);
            }
            _ => {}
        }
    }
    closers
}

fn expand(kind: LoopKind, name: &str, body: &[Token<'_>], ctx: &RenderContext<'_>) -> String {
    match kind {
        LoopKind::LineKeys => expand_line_keys(body, ctx),
        LoopKind::Contacts => expand_contacts(body, ctx),
        LoopKind::Named => expand_named(name, body, ctx),
    }
}

fn expand_line_keys(body: &[Token<'_>], ctx: &RenderContext<'_>) -> String {
    let provisioning = &ctx.document.provisioning;
    ctx.device
        .sorted_keys()
        .into_iter()
        .map(|key| {
            render_item(body, |field| match field {
                "index" => Some(key.index.to_string()),
                "type" => Some(provisioning.map_key_type(&key.key_type)),
                other => key.field(other).map(|v| escape_text(&v).into_owned()),
            })
        })
        .collect()
}

fn expand_contacts(body: &[Token<'_>], ctx: &RenderContext<'_>) -> String {
    ctx.device
        .contacts
        .iter()
        .enumerate()
        .map(|(position, contact)| {
            render_item(body, |field| match field {
                "index" => Some((position + 1).to_string()),
                "name" => Some(escape_text(&contact.name).into_owned()),
                "number" => Some(escape_text(&contact.number).into_owned()),
                "custom_label" => Some(escape_text(&contact.custom_label).into_owned()),
                "photo_url" => Some(if contact.photo.is_empty() {
                    String::new()
                } else {
                    ctx.server.photo_url(&ctx.mac, &contact.photo)
                }),
                _ => None,
            })
        })
        .collect()
}

fn expand_named(name: &str, body: &[Token<'_>], ctx: &RenderContext<'_>) -> String {
    let items = match loop_data(name, ctx) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!("{e}; expanding {name}_loop to nothing");
            return String::new();
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            render_item(body, |field| {
                if field == "index" {
                    return Some((position + 1).to_string());
                }
                let value = match item {
                    Value::Object(map) => map.get(field).map(value_text),
                    scalar if field == "value" => Some(value_text(scalar)),
                    _ => None,
                };
                value.map(|v| escape_text(&v).into_owned())
            })
        })
        .collect()
}

/// Resolve the items of a generic loop.
///
/// The driver's `provisioning.<name>_data` wins when declared; otherwise the
/// device custom option `<name>_data` is decoded as JSON. A missing or empty
/// source means no items. A source that is not an array is
/// [`ProvisionError::MalformedLoopData`].
pub fn loop_data<'c>(name: &str, ctx: &RenderContext<'c>) -> Result<Cow<'c, [Value]>> {
    let malformed = |reason: String| ProvisionError::MalformedLoopData {
        name: name.to_string(),
        reason,
    };

    if let Some(declared) = ctx.document.provisioning.loop_data(name) {
        return match declared {
            Value::Array(items) => Ok(Cow::Borrowed(items.as_slice())),
            other => Err(malformed(format!("driver declares {other} instead of an array"))),
        };
    }

    let key = format!("{name}_data");
    match ctx.device.custom_options.get(&key) {
        Some(raw) if !raw.trim().is_empty() => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => Ok(Cow::Owned(items)),
            Ok(other) => Err(malformed(format!(
                "custom option holds {other} instead of an array"
            ))),
            Err(e) => Err(malformed(format!("custom option is not JSON: {e}"))),
        },
        _ => Ok(Cow::Borrowed(&[])),
    }
}

/// Render one loop item. Variables `resolve` cannot answer, and nested loop
/// markers, are dropped.
fn render_item<F>(body: &[Token<'_>], resolve: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::new();
    for token in body {
        match *token {
            Token::Var { name, .. } => {
                if let Some(value) = resolve(name) {
                    out.push_str(&value);
                }
            }
            Token::LoopOpen { .. } | Token::LoopClose { .. } => {}
            other => out.push_str(other.raw()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Contact, DeviceRecord, KeyBinding};
    use crate::document::TemplateDocument;
    use crate::lookup::ServerInfo;
    use crate::templates::syntax::tokenize;

    fn ctx<'a>(document: &'a TemplateDocument, device: &'a DeviceRecord) -> RenderContext<'a> {
        RenderContext {
            document,
            device,
            template: "",
            mac: device.normalized_mac(),
            server: ServerInfo {
                host: "10.0.0.5".into(),
                ..Default::default()
            },
            vars: Default::default(),
        }
    }

    fn run(source: &str, ctx: &RenderContext<'_>) -> String {
        apply(&tokenize(source), ctx)
            .into_iter()
            .map(|p| match p {
                Piece::Token(t) => t.raw().to_string(),
                Piece::Expanded(s) => s,
            })
            .collect()
    }

    fn mapped_document() -> TemplateDocument {
        let mut doc = TemplateDocument::default();
        doc.provisioning
            .type_mapping
            .insert("line".into(), "15".into());
        doc
    }

    #[test]
    fn test_loop_kind() {
        assert_eq!(LoopKind::of("line_keys"), LoopKind::LineKeys);
        assert_eq!(LoopKind::of("contacts"), LoopKind::Contacts);
        assert_eq!(LoopKind::of("promo"), LoopKind::Named);
        assert!(!LoopKind::Named.is_reserved());
    }

    #[test]
    fn test_line_key_type_mapping() {
        let doc = mapped_document();
        let device = DeviceRecord {
            keys: vec![KeyBinding::new(1, "line", "200", "")],
            ..Default::default()
        };
        assert_eq!(
            run(
                "{{line_keys_loop}}linekey.{{index}}.type={{type}}\n{{/line_keys_loop}}",
                &ctx(&doc, &device)
            ),
            "linekey.1.type=15\n"
        );
    }

    #[test]
    fn test_line_key_numeric_type_codes() {
        let doc = TemplateDocument::from_json(
            r#"{"model": "vtx", "provisioning": {"type_mapping": {"line": 15, "blf": 16}}}"#,
        )
        .unwrap();
        let device = DeviceRecord::from_json(
            r#"{"keys": [{"index": 2, "type": "blf", "value": 201}, {"index": 1, "type": "line", "value": 200}]}"#,
        )
        .unwrap();
        assert_eq!(
            run(
                "{{line_keys_loop}}linekey.{{index}}.type={{type}}\n{{/line_keys_loop}}",
                &ctx(&doc, &device)
            ),
            "linekey.1.type=15\nlinekey.2.type=16\n"
        );
    }

    #[test]
    fn test_line_keys_sorted_and_unmapped_type_verbatim() {
        let doc = mapped_document();
        let device = DeviceRecord {
            keys: vec![
                KeyBinding::new(3, "blf", "203", "C"),
                KeyBinding::new(1, "line", "201", "A"),
                KeyBinding::new(2, "speed_dial", "202", "B"),
            ],
            ..Default::default()
        };
        assert_eq!(
            run(
                "{{line_keys_loop}}{{index}}:{{type}}:{{value}}:{{label}};{{/line_keys_loop}}",
                &ctx(&doc, &device)
            ),
            "1:15:201:A;2:speed_dial:202:B;3:blf:203:C;"
        );
    }

    #[test]
    fn test_line_key_extra_fields_escaped() {
        let doc = mapped_document();
        let mut key = KeyBinding::new(1, "line", "200", "R&D");
        key.extra.insert("line".into(), Value::from(2));
        let device = DeviceRecord {
            keys: vec![key],
            ..Default::default()
        };
        assert_eq!(
            run(
                "{{line_keys_loop}}{{label}}/{{line}}{{/line_keys_loop}}",
                &ctx(&doc, &device)
            ),
            "R&amp;D/2"
        );
    }

    #[test]
    fn test_unresolved_tokens_stripped_inside_items() {
        let doc = mapped_document();
        let device = DeviceRecord {
            mac: "001565AABBCC".into(),
            keys: vec![KeyBinding::new(1, "line", "200", "")],
            ..Default::default()
        };
        let mut context = ctx(&doc, &device);
        context.vars.insert("mac".into(), "001565AABBCC".into());
        assert_eq!(
            run(
                "{{line_keys_loop}}[{{unknown}}{{mac}}]{{/line_keys_loop}}",
                &context
            ),
            "[]"
        );
    }

    #[test]
    fn test_second_reserved_block_left_verbatim() {
        let doc = mapped_document();
        let device = DeviceRecord {
            keys: vec![KeyBinding::new(1, "line", "200", "")],
            ..Default::default()
        };
        let source = "{{line_keys_loop}}A{{index}}{{/line_keys_loop}}|{{line_keys_loop}}B{{index}}{{/line_keys_loop}}";
        assert_eq!(
            run(source, &ctx(&doc, &device)),
            "A1|{{line_keys_loop}}B{{index}}{{/line_keys_loop}}"
        );
    }

    #[test]
    fn test_contacts_in_insertion_order() {
        let doc = TemplateDocument::default();
        let device = DeviceRecord {
            mac: "001565AABBCC".into(),
            contacts: vec![
                Contact {
                    name: "Zed".into(),
                    number: "300".into(),
                    ..Default::default()
                },
                Contact {
                    name: "Amy & Bo".into(),
                    number: "301".into(),
                    custom_label: "Lab".into(),
                    photo: "asset_x1.png".into(),
                },
            ],
            ..Default::default()
        };
        let out = run(
            "{{contacts_loop}}{{index}}={{name}},{{number}},{{custom_label}},{{photo_url}}\n{{/contacts_loop}}",
            &ctx(&doc, &device),
        );
        assert_eq!(
            out,
            "1=Zed,300,,\n2=Amy &amp; Bo,301,Lab,http://10.0.0.5/admin/modules/quickprovisioner/media.php?file=asset_x1.png&mac=001565AABBCC&w=100&h=100&mode=crop\n"
        );
    }

    #[test]
    fn test_second_contacts_block_left_verbatim() {
        let doc = TemplateDocument::default();
        let device = DeviceRecord {
            contacts: vec![Contact {
                name: "Zed".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(
            run(
                "{{contacts_loop}}{{name}}{{/contacts_loop}}{{contacts_loop}}{{name}}{{/contacts_loop}}",
                &ctx(&doc, &device)
            ),
            "Zed{{contacts_loop}}{{name}}{{/contacts_loop}}"
        );
    }

    #[test]
    fn test_named_loop_from_driver_scalars() {
        let mut doc = TemplateDocument::default();
        doc.provisioning
            .extra
            .insert("promo_data".into(), serde_json::json!(["A", "B", "C"]));
        let device = DeviceRecord::default();
        assert_eq!(
            run("{{promo_loop}}{{index}}:{{value}};{{/promo_loop}}", &ctx(&doc, &device)),
            "1:A;2:B;3:C;"
        );
    }

    #[test]
    fn test_named_loop_every_occurrence_expanded() {
        let mut doc = TemplateDocument::default();
        doc.provisioning
            .extra
            .insert("promo_data".into(), serde_json::json!(["A"]));
        let device = DeviceRecord::default();
        assert_eq!(
            run(
                "{{promo_loop}}{{value}}{{/promo_loop}}-{{promo_loop}}{{value}}{{/promo_loop}}",
                &ctx(&doc, &device)
            ),
            "A-A"
        );
    }

    #[test]
    fn test_named_loop_maps_from_custom_option() {
        let doc = TemplateDocument::default();
        let mut device = DeviceRecord::default();
        device.custom_options.insert(
            "codec_data".into(),
            r#"[{"name": "PCMU", "priority": 1}, {"name": "G722", "priority": 2}]"#.into(),
        );
        assert_eq!(
            run(
                "{{codec_loop}}codec.{{index}}={{name}}@{{priority}}{{value}};{{/codec_loop}}",
                &ctx(&doc, &device)
            ),
            "codec.1=PCMU@1;codec.2=G722@2;"
        );
    }

    #[test]
    fn test_driver_data_wins_over_custom_option() {
        let mut doc = TemplateDocument::default();
        doc.provisioning
            .extra
            .insert("promo_data".into(), serde_json::json!(["driver"]));
        let mut device = DeviceRecord::default();
        device
            .custom_options
            .insert("promo_data".into(), r#"["device"]"#.into());
        assert_eq!(
            run("{{promo_loop}}{{value}}{{/promo_loop}}", &ctx(&doc, &device)),
            "driver"
        );
    }

    #[test]
    fn test_malformed_loop_data_expands_to_nothing() {
        let mut doc = TemplateDocument::default();
        doc.provisioning
            .extra
            .insert("promo_data".into(), serde_json::json!({"not": "an array"}));
        let mut device = DeviceRecord::default();
        device
            .custom_options
            .insert("codec_data".into(), "PCMU,G722".into());
        let context = ctx(&doc, &device);

        assert!(matches!(
            loop_data("promo", &context),
            Err(ProvisionError::MalformedLoopData { .. })
        ));
        assert!(matches!(
            loop_data("codec", &context),
            Err(ProvisionError::MalformedLoopData { .. })
        ));
        assert_eq!(
            run(
                "a{{promo_loop}}x{{/promo_loop}}b{{codec_loop}}y{{/codec_loop}}c",
                &context
            ),
            "abc"
        );
    }

    #[test]
    fn test_missing_loop_data_is_empty() {
        let doc = TemplateDocument::default();
        let device = DeviceRecord::default();
        let context = ctx(&doc, &device);
        assert!(loop_data("nothing", &context).unwrap().is_empty());
        assert_eq!(run("[{{nothing_loop}}x{{/nothing_loop}}]", &context), "[]");
    }

    #[test]
    fn test_unclosed_loop_left_as_text() {
        let doc = TemplateDocument::default();
        let device = DeviceRecord::default();
        assert_eq!(
            run("{{line_keys_loop}}{{index}}", &ctx(&doc, &device)),
            "{{line_keys_loop}}{{index}}"
        );
    }

    #[test]
    fn test_many_unclosed_openers_before_a_block() {
        let mut doc = TemplateDocument::default();
        doc.provisioning
            .extra
            .insert("codec_data".into(), serde_json::json!(["A", "B"]));
        let device = DeviceRecord::default();
        let unclosed = "{{promo_loop}}".repeat(5_000);
        let source = format!("{unclosed}{{{{codec_loop}}}}{{{{value}}}}{{{{/codec_loop}}}}");
        assert_eq!(run(&source, &ctx(&doc, &device)), format!("{unclosed}AB"));
    }
}
