//! Wrapping declared types in the nullable type `T?`

use rowan::{GreenNode, GreenNodeData, GreenToken, NodeOrToken};

use crate::cst::ast::{AstNode, TypeRef};
use crate::cst::trivia::{GreenElement, split_leading_trivia, split_trailing_trivia};
use crate::cst::{CsSyntaxKind, CsSyntaxNode};

/// Wrap the type declared directly under `owner`
///
/// Returns the rebuilt owner, or `None` when the type is missing, already
/// nullable, or `void`. For `ref T` the referenced type is wrapped.
pub(crate) fn wrap_declared_type(owner: &CsSyntaxNode) -> Option<GreenNode> {
    let ty = owner.children().find_map(TypeRef::cast)?;
    let wrapped = wrap_type_ref(&ty)?;
    Some(
        owner
            .green()
            .replace_child(ty.syntax().index(), NodeOrToken::Node(wrapped)),
    )
}

fn wrap_type_ref(ty: &TypeRef) -> Option<GreenNode> {
    if ty.is_nullable() || ty.is_void() {
        return None;
    }
    if ty.syntax().kind() == CsSyntaxKind::RefType {
        let inner = ty.syntax().children().find_map(TypeRef::cast)?;
        let wrapped = wrap_type_ref(&inner)?;
        return Some(
            ty.syntax()
                .green()
                .replace_child(inner.syntax().index(), NodeOrToken::Node(wrapped)),
        );
    }
    Some(wrap_nullable(&ty.syntax().green()))
}

/// Build `T?` around a type, keeping its exterior trivia outside the `?`
///
/// `string /* c */ s` becomes `string? /* c */ s`, not `string /* c */? s`.
pub fn wrap_nullable(ty: &GreenNodeData) -> GreenNode {
    let (leading, rest) = split_leading_trivia(ty);
    let (trailing, core) = split_trailing_trivia(&rest);

    let question = GreenToken::new(CsSyntaxKind::Question.into(), "?");
    let children: Vec<GreenElement> = leading
        .into_iter()
        .map(NodeOrToken::Token)
        .chain([NodeOrToken::Node(core), NodeOrToken::Token(question)])
        .chain(trailing.into_iter().map(NodeOrToken::Token))
        .collect();

    GreenNode::new(CsSyntaxKind::NullableType.into(), children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_csharp;

    fn wrap(source: &str, kind: CsSyntaxKind) -> Option<String> {
        let parse = parse_csharp(source);
        let owner = parse.syntax().descendants().find(|n| n.kind() == kind);
        let Some(owner) = owner else {
            panic!("no {kind} in {source:?}");
        };
        let view = CsSyntaxNode::new_root(owner.green().into_owned());
        wrap_declared_type(&view).map(|g| CsSyntaxNode::new_root(g).to_string())
    }

    #[test]
    fn test_wraps_parameter_type() {
        let wrapped = wrap("void Foo(string s);", CsSyntaxKind::Parameter);
        assert_eq!(wrapped.as_deref(), Some("string? s"));
    }

    #[test]
    fn test_wraps_return_type_keeping_indentation() {
        let source = "class C {\n    /// Comment\n    string Foo() => \"hello\";\n}";
        let wrapped = wrap(source, CsSyntaxKind::MethodDecl);
        assert_eq!(
            wrapped.as_deref(),
            Some("    /// Comment\n    string? Foo() => \"hello\";\n")
        );
    }

    #[test]
    fn test_wraps_generic_and_array_types() {
        assert_eq!(
            wrap("void Foo(List<int> xs);", CsSyntaxKind::Parameter).as_deref(),
            Some("List<int>? xs")
        );
        assert_eq!(
            wrap("void Foo(int[] xs);", CsSyntaxKind::Parameter).as_deref(),
            Some("int[]? xs")
        );
    }

    #[test]
    fn test_comment_after_type_stays_outside() {
        let wrapped = wrap("void Foo(string /* c */ s);", CsSyntaxKind::Parameter);
        assert_eq!(wrapped.as_deref(), Some("string? /* c */ s"));
    }

    #[test]
    fn test_already_nullable_and_void_are_left_alone() {
        assert_eq!(wrap("void Foo(string? s);", CsSyntaxKind::Parameter), None);
        assert_eq!(wrap("void Foo();", CsSyntaxKind::MethodDecl), None);
    }

    #[test]
    fn test_ref_wraps_referenced_type() {
        let wrapped = wrap("ref string Foo();", CsSyntaxKind::MethodDecl);
        assert_eq!(wrapped.as_deref(), Some("ref string? Foo();"));
    }
}
