//! Nullability annotation rewriter
//!
//! Walks a parsed file bottom-up and migrates `[CanBeNull]` / `[NotNull]`
//! markers to nullable reference types:
//!
//! - a parameter defaulting to `null`, or marked `[CanBeNull]`, gets `T?`
//! - a method marked `[CanBeNull]` gets a `T?` return type
//! - markers on declarations without `public` (and on their parameters) are
//!   removed, keeping the surrounding comments and layout intact
//!
//! The rewriter works purely on syntax. Untouched subtrees are shared with
//! the input tree, and a file where nothing fired comes back as the very
//! same green node.
//!
//! # Example
//!
//! ```rust,ignore
//! use nullinate_core::rewrite::rewrite_source;
//!
//! let result = rewrite_source("void Foo([CanBeNull] string s);")?;
//! assert_eq!(result.text, "void Foo(string? s);");
//! assert!(result.changed);
//! ```

mod error;
mod markers;
mod removal;
mod rules;
mod wrap;

use rowan::{GreenNode, NodeOrToken};
use tracing::debug;

use crate::cst::ast::{AstNode, MethodLike, Parameter};
use crate::cst::{CsSyntaxNode, line_column, parse_csharp};
use crate::error::NullinateError;

pub use error::RewriteError;
pub use markers::Marker;
pub use wrap::wrap_nullable;

/// Result of rewriting one tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub green: GreenNode,
    /// Whether any rule fired; when false `green` is the input root itself
    pub changed: bool,
}

impl RewriteOutcome {
    pub fn syntax(&self) -> CsSyntaxNode {
        CsSyntaxNode::new_root(self.green.clone())
    }
}

/// Stateless rewriter; one instance can be shared across files and threads
#[derive(Debug, Clone, Copy, Default)]
pub struct NullabilityRewriter;

impl NullabilityRewriter {
    pub fn new() -> Self {
        Self
    }

    /// Rewrite the tree rooted at `root`
    ///
    /// The first declaration that cannot be edited safely aborts the whole
    /// rewrite; no partially rewritten tree is returned.
    pub fn rewrite(&self, root: &CsSyntaxNode) -> Result<RewriteOutcome, RewriteError> {
        match self.visit(root)? {
            Some(green) => Ok(RewriteOutcome {
                green,
                changed: true,
            }),
            None => Ok(RewriteOutcome {
                green: root.green().into_owned(),
                changed: false,
            }),
        }
    }

    /// Post-order: children first, then the rules for this node
    fn visit(&self, node: &CsSyntaxNode) -> Result<Option<GreenNode>, RewriteError> {
        let mut rebuilt: Option<GreenNode> = None;
        for child in node.children() {
            if let Some(new_child) = self.visit(&child)? {
                let base = rebuilt.unwrap_or_else(|| node.green().into_owned());
                rebuilt = Some(base.replace_child(child.index(), NodeOrToken::Node(new_child)));
            }
        }

        let current = || rebuilt.clone().unwrap_or_else(|| node.green().into_owned());
        let edited = if let Some(parameter) = Parameter::cast(node.clone()) {
            rules::rewrite_parameter(&parameter, current())?
        } else if let Some(declaration) = MethodLike::cast(node.clone()) {
            rules::rewrite_declaration(&declaration, current())?
        } else {
            None
        };

        Ok(edited.or(rebuilt))
    }
}

/// Rewritten text of one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRewrite {
    pub text: String,
    pub changed: bool,
}

/// Parse, rewrite and print `source`
///
/// Input with syntax errors is refused rather than rewritten.
pub fn rewrite_source(source: &str) -> crate::Result<SourceRewrite> {
    let parse = parse_csharp(source);
    if let Some(error) = parse.errors().first() {
        let (line, column) = line_column(source, usize::from(error.range.start()));
        return Err(NullinateError::parse(
            error.message.clone(),
            line,
            column,
            parse.errors().len(),
        ));
    }

    let outcome = NullabilityRewriter::new().rewrite(&parse.syntax())?;
    if !outcome.changed {
        return Ok(SourceRewrite {
            text: source.to_string(),
            changed: false,
        });
    }

    let text = outcome.syntax().to_string();
    debug!(bytes = text.len(), "rewrote source");
    Ok(SourceRewrite {
        text,
        changed: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_source_reports_change() {
        let result = match rewrite_source("void Foo([CanBeNull] string s);") {
            Ok(result) => result,
            Err(error) => panic!("rewrite failed: {error}"),
        };
        assert_eq!(result.text, "void Foo(string? s);");
        assert!(result.changed);
    }

    #[test]
    fn test_rewrite_source_refuses_invalid_input() {
        let result = rewrite_source("class C {\n    void Foo( {\n");
        assert!(matches!(result, Err(NullinateError::Parse { .. })));
    }

    #[test]
    fn test_parameters_rewritten_before_declaration() {
        let source = "[NotNull] string Foo([CanBeNull] string s, [NotNull] int n = 0);";
        let parse = parse_csharp(source);
        let outcome = match NullabilityRewriter::new().rewrite(&parse.syntax()) {
            Ok(outcome) => outcome,
            Err(error) => panic!("rewrite failed: {error}"),
        };
        assert!(outcome.changed);
        assert_eq!(
            outcome.syntax().to_string(),
            "string Foo(string? s, int n = 0);"
        );
    }
}
