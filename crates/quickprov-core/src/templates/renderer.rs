//! The render pipeline: tokenize, conditionals, loops, substitution.
//!
//! Each pass consumes the output of the previous one:
//!
//! ```text
//! template text
//!   -> syntax::tokenize        Text / Var / IfOpen / IfClose / LoopOpen / LoopClose
//!   -> conditional::apply      enabled bodies kept, disabled blocks dropped
//!   -> loops::apply            loop blocks replaced by rendered items
//!   -> substitute::apply       top-level variables replaced, unknown kept
//! ```
//!
//! Handsets parse their config files without any error recovery, so the
//! output is a pure function of the [`RenderContext`]: the same context always
//! yields byte-identical text.
//!
//! ## Usage
//!
//! ```ignore
//! use quickprov_core::context::RenderContext;
//! use quickprov_core::templates::renderer;
//!
//! let ctx = RenderContext::build(&document, &device, &lookup);
//! let text = renderer::render(&ctx);
//! ```

use super::{conditional, loops, substitute, syntax};
use crate::context::RenderContext;

/// Render the context's template to config text.
pub fn render(ctx: &RenderContext<'_>) -> String {
    let tokens = syntax::tokenize(ctx.template);
    let tokens = conditional::apply(&tokens, &ctx.vars);
    let pieces = loops::apply(&tokens, ctx);
    substitute::apply(&pieces, &ctx.vars)
}
