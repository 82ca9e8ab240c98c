//! Parameter and declaration rule tables
//!
//! Rules run against a detached view of the node as rebuilt so far, so each
//! rule sees the effect of the ones before it. Visibility, ownership and
//! error positions come from the node in the original tree.

use rowan::GreenNode;
use tracing::debug;

use super::error::RewriteError;
use super::markers::Marker;
use super::removal::{RemovalError, owner_starts_line, remove_marker};
use super::wrap::wrap_declared_type;
use crate::cst::ast::{AstNode, AttributeList, MethodLike, Parameter, first_significant_token};
use crate::cst::{CsSyntaxNode, token_line_column};

/// Accumulates edits to one node
struct NodeEdit<'a> {
    original: &'a CsSyntaxNode,
    current: GreenNode,
    changed: bool,
}

impl<'a> NodeEdit<'a> {
    fn new(original: &'a CsSyntaxNode, current: GreenNode) -> Self {
        Self {
            original,
            current,
            changed: false,
        }
    }

    fn view(&self) -> CsSyntaxNode {
        CsSyntaxNode::new_root(self.current.clone())
    }

    fn has_marker(&self, marker: Marker) -> bool {
        let view = self.view();
        marker
            .find_in(view.children().filter_map(AttributeList::cast))
            .is_some()
    }

    fn wrap(&mut self, description: &str) {
        if let Some(green) = wrap_declared_type(&self.view()) {
            debug!(declaration = %description, "wrapped type in nullable");
            self.current = green;
            self.changed = true;
        }
    }

    fn remove(&mut self, marker: Marker, description: &str) -> Result<(), RewriteError> {
        match remove_marker(&self.view(), marker, owner_starts_line(self.original)) {
            Ok(Some(green)) => {
                debug!(declaration = %description, %marker, "removed marker");
                self.current = green;
                self.changed = true;
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(error) => Err(self.locate(error, description)),
        }
    }

    fn locate(&self, error: RemovalError, description: &str) -> RewriteError {
        let (line, column) = first_significant_token(self.original)
            .or_else(|| self.original.first_token())
            .map_or((1, 1), |token| token_line_column(&token));
        let declaration = description.to_string();

        match error {
            RemovalError::UnsupportedTrivia(reason) => RewriteError::UnsupportedTrivia {
                declaration,
                line,
                column,
                reason,
            },
            RemovalError::MalformedAttribute(reason) => RewriteError::MalformedAttribute {
                declaration,
                line,
                column,
                reason,
            },
        }
    }

    fn finish(self) -> Option<GreenNode> {
        self.changed.then_some(self.current)
    }
}

/// Apply the parameter rules
///
/// 1. `= null` default: wrap the type.
/// 2. `[CanBeNull]`: wrap the type.
/// 3. Owner not public: strip `CanBeNull`, then `NotNull`.
///
/// Parameters outside a method, constructor or indexer are left alone.
pub(crate) fn rewrite_parameter(
    original: &Parameter,
    current: GreenNode,
) -> Result<Option<GreenNode>, RewriteError> {
    let Some(owner) = original.owner() else {
        return Ok(None);
    };
    let description = original.describe();
    let mut edit = NodeEdit::new(original.syntax(), current);

    let defaults_to_null = Parameter::cast(edit.view())
        .and_then(|p| p.default_value())
        .is_some_and(|d| d.is_null_literal());
    if defaults_to_null {
        edit.wrap(&description);
    }
    if edit.has_marker(Marker::CanBeNull) {
        edit.wrap(&description);
    }
    if !owner.is_public() {
        edit.remove(Marker::CanBeNull, &description)?;
        edit.remove(Marker::NotNull, &description)?;
    }

    Ok(edit.finish())
}

/// Apply the declaration rules
///
/// 1. `[CanBeNull]` on a method: wrap the return type.
/// 2. Not public: strip `NotNull`, then `CanBeNull`.
pub(crate) fn rewrite_declaration(
    original: &MethodLike,
    current: GreenNode,
) -> Result<Option<GreenNode>, RewriteError> {
    let description = original.describe();
    let mut edit = NodeEdit::new(original.syntax(), current);

    if matches!(original, MethodLike::Method(_)) && edit.has_marker(Marker::CanBeNull) {
        edit.wrap(&description);
    }
    if !original.is_public() {
        edit.remove(Marker::NotNull, &description)?;
        edit.remove(Marker::CanBeNull, &description)?;
    }

    Ok(edit.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_csharp;

    fn first<T: AstNode>(root: &CsSyntaxNode) -> T {
        let found = root.descendants().find_map(T::cast);
        let Some(found) = found else {
            panic!("node not found in {root}");
        };
        found
    }

    fn apply_parameter(source: &str) -> Option<String> {
        let parse = parse_csharp(source);
        let param: Parameter = first(&parse.syntax());
        let current = param.syntax().green().into_owned();
        match rewrite_parameter(&param, current) {
            Ok(green) => green.map(|g| CsSyntaxNode::new_root(g).to_string()),
            Err(error) => panic!("unexpected error: {error}"),
        }
    }

    #[test]
    fn test_null_default_wraps() {
        assert_eq!(
            apply_parameter("public void Foo(string s = null);").as_deref(),
            Some("string? s = null")
        );
    }

    #[test]
    fn test_null_default_and_marker_wrap_once() {
        assert_eq!(
            apply_parameter("public void Foo([CanBeNull] string s = null);").as_deref(),
            Some("[CanBeNull] string? s = null")
        );
    }

    #[test]
    fn test_non_public_owner_strips_both_markers() {
        assert_eq!(
            apply_parameter("void Foo([NotNull] [CanBeNull] string s);").as_deref(),
            Some("string? s")
        );
    }

    #[test]
    fn test_public_not_null_is_untouched() {
        assert_eq!(apply_parameter("public void Foo([NotNull] string s);"), None);
    }

    #[test]
    fn test_delegate_parameters_are_skipped() {
        let source = "delegate void D([CanBeNull] string s);";
        let parse = parse_csharp(source);
        assert!(parse.syntax().descendants().find_map(Parameter::cast).is_none());
    }

    #[test]
    fn test_constructor_return_type_is_never_wrapped() {
        let parse = parse_csharp("class C {\n    [CanBeNull] public C() {}\n}\n");
        let ctor: MethodLike = first(&parse.syntax());
        let current = ctor.syntax().green().into_owned();
        assert_eq!(rewrite_declaration(&ctor, current), Ok(None));
    }

    #[test]
    fn test_error_points_at_declaration() {
        let source = "class C {\n    [Pure NotNull] string Foo();\n}\n";
        let parse = parse_csharp(source);
        let method: MethodLike = first(&parse.syntax());
        let current = method.syntax().green().into_owned();
        let error = match rewrite_declaration(&method, current) {
            Err(error) => error,
            Ok(green) => panic!("expected an error, got {green:?}"),
        };
        assert_eq!(error.declaration(), "method `Foo`");
        assert_eq!(error.position(), (2, 5));
    }
}
