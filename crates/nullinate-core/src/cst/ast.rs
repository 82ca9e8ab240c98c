//! Typed AST layer over CST
//!
//! Thin, type-safe wrappers over the raw CST nodes the rewriter cares about.
//! Each wrapper implements `cast()` to safely convert from a CST node.
//!
//! # Example
//!
//! ```ignore
//! use nullinate_core::cst::{parse_csharp, ast::{AstNode, MethodDecl}};
//!
//! let parse = parse_csharp("[CanBeNull] public string Foo();");
//! let method = parse.syntax().children().find_map(MethodDecl::cast).unwrap();
//!
//! assert_eq!(method.name().unwrap(), "Foo");
//! assert!(method.is_public());
//! ```

use super::{CsSyntaxKind, CsSyntaxNode, CsSyntaxToken};

/// Helper trait for casting CST nodes to typed wrappers
pub trait AstNode: Sized {
    fn can_cast(kind: CsSyntaxKind) -> bool;
    fn cast(node: CsSyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &CsSyntaxNode;
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            syntax: CsSyntaxNode,
        }

        impl AstNode for $name {
            fn can_cast(kind: CsSyntaxKind) -> bool {
                kind == CsSyntaxKind::$kind
            }

            fn cast(node: CsSyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self { syntax: node })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &CsSyntaxNode {
                &self.syntax
            }
        }
    };
}

/// Direct child tokens of a node, trivia excluded
fn significant_tokens(node: &CsSyntaxNode) -> impl Iterator<Item = CsSyntaxToken> + use<> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| !t.kind().is_trivia())
}

/// First non-trivia token anywhere under `node`
pub fn first_significant_token(node: &CsSyntaxNode) -> Option<CsSyntaxToken> {
    node.descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| !t.kind().is_trivia())
}

/// Declared name: the last identifier among the node's own tokens
fn declared_name(node: &CsSyntaxNode) -> Option<String> {
    significant_tokens(node)
        .filter(|t| t.kind() == CsSyntaxKind::Ident)
        .last()
        .map(|t| t.text().to_string())
}

// ============================================================================
// Compilation unit
// ============================================================================

ast_node!(
    /// Root of a parsed file
    CompilationUnit,
    CompilationUnit
);

impl CompilationUnit {
    /// Every method, constructor and indexer in the file, in source order
    pub fn method_likes(&self) -> impl Iterator<Item = MethodLike> + use<> {
        self.syntax.descendants().filter_map(MethodLike::cast)
    }
}

// ============================================================================
// Method-like declarations
// ============================================================================

ast_node!(MethodDecl, MethodDecl);
ast_node!(ConstructorDecl, ConstructorDecl);
ast_node!(IndexerDecl, IndexerDecl);

impl MethodDecl {
    pub fn name(&self) -> Option<String> {
        declared_name(&self.syntax)
    }

    pub fn return_type(&self) -> Option<TypeRef> {
        self.syntax.children().find_map(TypeRef::cast)
    }
}

impl ConstructorDecl {
    pub fn name(&self) -> Option<String> {
        declared_name(&self.syntax)
    }
}

/// A declaration that owns a parameter list and can carry markers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodLike {
    Method(MethodDecl),
    Constructor(ConstructorDecl),
    Indexer(IndexerDecl),
}

impl AstNode for MethodLike {
    fn can_cast(kind: CsSyntaxKind) -> bool {
        kind.is_method_like()
    }

    fn cast(node: CsSyntaxNode) -> Option<Self> {
        match node.kind() {
            CsSyntaxKind::MethodDecl => Some(Self::Method(MethodDecl { syntax: node })),
            CsSyntaxKind::ConstructorDecl => {
                Some(Self::Constructor(ConstructorDecl { syntax: node }))
            }
            CsSyntaxKind::IndexerDecl => Some(Self::Indexer(IndexerDecl { syntax: node })),
            _ => None,
        }
    }

    fn syntax(&self) -> &CsSyntaxNode {
        match self {
            Self::Method(it) => it.syntax(),
            Self::Constructor(it) => it.syntax(),
            Self::Indexer(it) => it.syntax(),
        }
    }
}

impl MethodLike {
    pub fn attribute_lists(&self) -> impl Iterator<Item = AttributeList> + use<> {
        self.syntax().children().filter_map(AttributeList::cast)
    }

    /// Modifier keywords, including contextual ones such as `partial`
    pub fn modifiers(&self) -> Vec<CsSyntaxToken> {
        significant_tokens(self.syntax())
            .take_while(|t| {
                t.kind().is_modifier()
                    || matches!(t.text(), "partial" | "async" | "required" | "file")
            })
            .collect()
    }

    /// Whether the declaration carries the `public` modifier
    pub fn is_public(&self) -> bool {
        self.modifiers()
            .iter()
            .any(|t| t.kind() == CsSyntaxKind::PublicKw)
    }

    pub fn parameter_list(&self) -> Option<ParameterList> {
        self.syntax().children().find_map(ParameterList::cast)
    }

    /// Return type; only methods have one
    pub fn return_type(&self) -> Option<TypeRef> {
        match self {
            Self::Method(method) => method.return_type(),
            Self::Constructor(_) | Self::Indexer(_) => None,
        }
    }

    /// Short human description, e.g. ``method `Foo` ``
    pub fn describe(&self) -> String {
        match self {
            Self::Method(method) => match method.name() {
                Some(name) => format!("method `{name}`"),
                None => "method".to_string(),
            },
            Self::Constructor(ctor) => match ctor.name() {
                Some(name) => format!("constructor `{name}`"),
                None => "constructor".to_string(),
            },
            Self::Indexer(_) => "indexer `this[]`".to_string(),
        }
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// `( ... )` or `[ ... ]` parameter list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterList {
    syntax: CsSyntaxNode,
}

impl AstNode for ParameterList {
    fn can_cast(kind: CsSyntaxKind) -> bool {
        matches!(
            kind,
            CsSyntaxKind::ParameterList | CsSyntaxKind::BracketedParameterList
        )
    }

    fn cast(node: CsSyntaxNode) -> Option<Self> {
        if Self::can_cast(node.kind()) {
            Some(Self { syntax: node })
        } else {
            None
        }
    }

    fn syntax(&self) -> &CsSyntaxNode {
        &self.syntax
    }
}

impl ParameterList {
    pub fn parameters(&self) -> impl Iterator<Item = Parameter> + use<> {
        self.syntax.children().filter_map(Parameter::cast)
    }
}

ast_node!(Parameter, Parameter);

impl Parameter {
    pub fn attribute_lists(&self) -> impl Iterator<Item = AttributeList> + use<> {
        self.syntax.children().filter_map(AttributeList::cast)
    }

    pub fn ty(&self) -> Option<TypeRef> {
        self.syntax.children().find_map(TypeRef::cast)
    }

    pub fn name(&self) -> Option<String> {
        declared_name(&self.syntax)
    }

    pub fn default_value(&self) -> Option<DefaultValue> {
        self.syntax.children().find_map(DefaultValue::cast)
    }

    /// The method, constructor or indexer this parameter belongs to
    ///
    /// `None` for parameters of constructs we keep opaque (delegates,
    /// operators, lambdas).
    pub fn owner(&self) -> Option<MethodLike> {
        let list = self.syntax.parent().and_then(ParameterList::cast)?;
        list.syntax.parent().and_then(MethodLike::cast)
    }

    pub fn describe(&self) -> String {
        let name = match self.name() {
            Some(name) => format!("parameter `{name}`"),
            None => "parameter".to_string(),
        };
        match self.owner() {
            Some(owner) => format!("{name} of {}", owner.describe()),
            None => name,
        }
    }
}

ast_node!(DefaultValue, DefaultValue);

impl DefaultValue {
    /// `= null` exactly, not `= null!` or `= (null)`
    pub fn is_null_literal(&self) -> bool {
        self.syntax
            .children()
            .any(|n| n.kind() == CsSyntaxKind::LiteralExpr)
    }
}

// ============================================================================
// Attributes
// ============================================================================

ast_node!(
    /// A bracketed attribute group, `[A, B(1)]`
    AttributeList,
    AttributeList
);

impl AttributeList {
    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + use<> {
        self.syntax.children().filter_map(Attribute::cast)
    }
}

ast_node!(Attribute, Attribute);

impl Attribute {
    pub fn name(&self) -> Option<CsSyntaxNode> {
        self.syntax
            .children()
            .find(|n| n.kind() == CsSyntaxKind::AttributeName)
    }

    /// Identifier of a simple (unqualified) attribute name, without `@`
    ///
    /// `CanBeNull` and `CanBeNull<T>` have a simple name; `JetBrains.CanBeNull`
    /// and `global::CanBeNull` do not.
    pub fn simple_name(&self) -> Option<String> {
        let name = self.name()?;
        let mut tokens = significant_tokens(&name);
        let ident = tokens.next().filter(|t| t.kind() == CsSyntaxKind::Ident)?;
        if tokens.next().is_some() {
            return None;
        }
        Some(ident.text().trim_start_matches('@').to_string())
    }

    pub fn list(&self) -> Option<AttributeList> {
        self.syntax.parent().and_then(AttributeList::cast)
    }
}

// ============================================================================
// Types
// ============================================================================

/// Any type node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    syntax: CsSyntaxNode,
}

impl AstNode for TypeRef {
    fn can_cast(kind: CsSyntaxKind) -> bool {
        kind.is_type()
    }

    fn cast(node: CsSyntaxNode) -> Option<Self> {
        if Self::can_cast(node.kind()) {
            Some(Self { syntax: node })
        } else {
            None
        }
    }

    fn syntax(&self) -> &CsSyntaxNode {
        &self.syntax
    }
}

impl TypeRef {
    pub fn is_nullable(&self) -> bool {
        self.syntax.kind() == CsSyntaxKind::NullableType
    }

    pub fn is_void(&self) -> bool {
        self.syntax.kind() == CsSyntaxKind::PredefinedType
            && significant_tokens(&self.syntax).any(|t| t.kind() == CsSyntaxKind::VoidKw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_csharp;

    fn methods(source: &str) -> Vec<MethodLike> {
        let parse = parse_csharp(source);
        let unit = CompilationUnit::cast(parse.syntax());
        let Some(unit) = unit else {
            panic!("root is not a compilation unit");
        };
        unit.method_likes().collect()
    }

    #[test]
    fn test_method_accessors() {
        let found = methods("[CanBeNull] public static string? Foo(int x);");
        assert_eq!(found.len(), 1);
        let method = &found[0];

        assert!(method.is_public());
        assert_eq!(method.describe(), "method `Foo`");
        assert_eq!(method.modifiers().len(), 2);
        let ret = method.return_type();
        assert!(ret.as_ref().is_some_and(TypeRef::is_nullable));
        let text = ret.map(|t| t.syntax().text().to_string());
        assert_eq!(text.as_deref().map(str::trim), Some("string?"));
    }

    #[test]
    fn test_visibility() {
        let found = methods("class C {\n    internal void A() {}\n    protected C() {}\n    public int this[int i] => i;\n}\n");
        let public: Vec<bool> = found.iter().map(MethodLike::is_public).collect();
        assert_eq!(public, vec![false, false, true]);
        assert!(found[1].return_type().is_none());
    }

    #[test]
    fn test_parameter_accessors() {
        let found = methods("void Foo([CanBeNull] string s = null, int n = 5);");
        let params: Vec<Parameter> = found[0]
            .parameter_list()
            .map(|l| l.parameters().collect())
            .unwrap_or_default();
        assert_eq!(params.len(), 2);

        assert_eq!(params[0].name().as_deref(), Some("s"));
        assert_eq!(params[0].attribute_lists().count(), 1);
        assert!(params[0].default_value().is_some_and(|d| d.is_null_literal()));
        assert!(!params[1].default_value().is_some_and(|d| d.is_null_literal()));
        assert_eq!(params[0].describe(), "parameter `s` of method `Foo`");
        assert!(params[0].owner().is_some());
    }

    #[test]
    fn test_attribute_simple_names() {
        let found = methods("[CanBeNull, @NotNull, JetBrains.CanBeNull, global::NotNull, Foo<int>(1)] void M();");
        let names: Vec<Option<String>> = found[0]
            .attribute_lists()
            .flat_map(|l| l.attributes().collect::<Vec<_>>())
            .map(|a| a.simple_name())
            .collect();
        assert_eq!(
            names,
            vec![
                Some("CanBeNull".to_string()),
                Some("NotNull".to_string()),
                None,
                None,
                Some("Foo".to_string()),
            ]
        );
    }

    #[test]
    fn test_attribute_target_is_not_the_name() {
        let found = methods("[return: CanBeNull] string M();");
        let name = found[0]
            .attribute_lists()
            .flat_map(|l| l.attributes().collect::<Vec<_>>())
            .find_map(|a| a.simple_name());
        assert_eq!(name.as_deref(), Some("CanBeNull"));
    }

    #[test]
    fn test_contextual_modifiers_before_public() {
        let found = methods("class C {\n    partial public void A();\n    partial void B();\n}\n");
        let public: Vec<bool> = found.iter().map(MethodLike::is_public).collect();
        assert_eq!(public, vec![true, false]);
    }

    #[test]
    fn test_void_detection() {
        let found = methods("void A();\nstring B();");
        assert!(found[0].return_type().is_some_and(|t| t.is_void()));
        assert!(!found[1].return_type().is_some_and(|t| t.is_void()));
    }
}
