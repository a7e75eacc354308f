//! `{{if name}}...{{/if}}` evaluation.
//!
//! Blocks do not nest. Each opener pairs with the first `{{/if}}` after it; a
//! second opener inside the block is ordinary text. Openers without a closer
//! and stray closers are ordinary text too.

use super::syntax::Token;
use crate::binder::VarMap;

/// Whether a variable enables a conditional block: it must be bound and not
/// `""`, `"0"` or `"false"`.
pub fn is_truthy(vars: &VarMap, name: &str) -> bool {
    vars.get(name)
        .is_some_and(|v| !matches!(v.as_str(), "" | "0" | "false"))
}

/// Keep the bodies of enabled blocks (markers stripped) and drop disabled
/// blocks entirely.
pub fn apply<'a>(tokens: &[Token<'a>], vars: &VarMap) -> Vec<Token<'a>> {
    let closers = first_close_after(tokens);
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        match tokens[i] {
            Token::IfOpen { name, raw } => {
                match closers[i] {
                    Some(close) => {
                        if is_truthy(vars, name) {
                            out.extend(tokens[i + 1..close].iter().map(|t| match *t {
                                Token::IfOpen { raw, .. } => Token::Text(raw),
                                other => other,
                            }));
                        }
                        i = close + 1;
                    }
                    None => {
                        out.push(Token::Text(raw));
                        i += 1;
                    }
                }
            }
            Token::IfClose { raw } => {
                out.push(Token::Text(raw));
                i += 1;
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }

    out
}

/// For each position, the index of the first `{{/if}}` strictly after it.
fn first_close_after(tokens: &[Token<'_>]) -> Vec<Option<usize>> {
    let mut closers = vec![None; tokens.len()];
    let mut next = None;
    for (i, token) in tokens.iter().enumerate().rev() {
        closers[i] = next;
        if matches!(token, Token::IfClose { .. }) {
            next = Some(i);
        }
    }
    closers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::syntax::tokenize;

    fn vars(pairs: &[(&str, &str)]) -> VarMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn run(source: &str, vars: &VarMap) -> String {
        apply(&tokenize(source), vars).iter().map(Token::raw).collect()
    }

    #[test]
    fn test_truthiness() {
        let v = vars(&[("a", "1"), ("b", ""), ("c", "0"), ("d", "false"), ("e", "no")]);
        assert!(is_truthy(&v, "a"));
        assert!(!is_truthy(&v, "b"));
        assert!(!is_truthy(&v, "c"));
        assert!(!is_truthy(&v, "d"));
        assert!(is_truthy(&v, "e"));
        assert!(!is_truthy(&v, "missing"));
    }

    #[test]
    fn test_block_kept_or_removed() {
        assert_eq!(run("{{if pin}}LOCKED{{/if}}", &vars(&[("pin", "")])), "");
        assert_eq!(run("{{if pin}}LOCKED{{/if}}", &vars(&[("pin", "1234")])), "LOCKED");
        assert_eq!(run("a{{if x}}b{{/if}}c", &vars(&[])), "ac");
    }

    #[test]
    fn test_independent_blocks() {
        let v = vars(&[("a", "1")]);
        assert_eq!(run("{{if a}}A{{/if}}-{{if b}}B{{/if}}-{{if a}}A2{{/if}}", &v), "A--A2");
    }

    #[test]
    fn test_body_tokens_survive_for_later_passes() {
        let v = vars(&[("pin", "1234")]);
        let tokens = apply(&tokenize("{{if pin}}pin={{pin}}{{/if}}"), &v);
        assert!(matches!(tokens[1], Token::Var { name: "pin", .. }));
    }

    #[test]
    fn test_no_nesting() {
        let v = vars(&[("a", "1"), ("b", "1")]);
        assert_eq!(run("{{if a}}x{{if b}}y{{/if}}z{{/if}}", &v), "x{{if b}}yz{{/if}}");
    }

    #[test]
    fn test_unbalanced_markers_are_text() {
        let v = vars(&[("a", "1")]);
        assert_eq!(run("{{if a}}open", &v), "{{if a}}open");
        assert_eq!(run("close{{/if}}", &v), "close{{/if}}");
    }

    #[test]
    fn test_many_unclosed_openers() {
        let v = vars(&[("a", "1")]);
        let unclosed = "{{if a}}x".repeat(5_000);
        assert_eq!(run(&unclosed, &v), unclosed);

        let source = format!("{{{{if a}}}}kept{{{{/if}}}}{unclosed}");
        assert_eq!(run(&source, &v), format!("kept{unclosed}"));
    }
}
