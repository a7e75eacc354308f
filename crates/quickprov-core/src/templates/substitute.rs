//! Final pass: replace top-level `{{name}}` tokens with bound values.
//!
//! Tokens with no bound variable stay in the output exactly as written, as do
//! loop and conditional markers that earlier passes left behind. Bound values
//! are inserted literally and never scanned for further tags.

use super::loops::Piece;
use super::syntax::Token;
use crate::binder::VarMap;

pub fn apply(pieces: &[Piece<'_>], vars: &VarMap) -> String {
    let mut out = String::new();
    for piece in pieces {
        match piece {
            Piece::Expanded(text) => out.push_str(text),
            Piece::Token(Token::Var { name, raw }) => match vars.get(*name) {
                Some(value) => out.push_str(value),
                None => out.push_str(raw),
            },
            Piece::Token(other) => out.push_str(other.raw()),
        }
    }
    out
}
