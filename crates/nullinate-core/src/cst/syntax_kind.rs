//! Syntax kind enumeration for the C# CST
//!
//! This module defines all node and token types that can appear in the
//! syntax tree. Only the part of C# the rewriter needs to understand is
//! modelled precisely; everything else is carried through as opaque,
//! balanced token runs, so the set of node kinds stays small.

use std::fmt;

/// Syntax kind for C# language elements
///
/// The discriminants are grouped in ranges:
/// - `0..10` trivia
/// - `10..100` keywords
/// - `100..150` punctuation
/// - `150..200` literals and identifiers
/// - `200..400` structural nodes
/// - `400..` special kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum CsSyntaxKind {
    // ==================
    // Trivia (0-9)
    // ==================
    /// Spaces, tabs and other horizontal whitespace
    Whitespace = 0,
    /// `\n`, `\r\n` or `\r`
    Newline = 1,
    /// `// ...` up to (not including) the line break
    LineComment = 2,
    /// `/// ...` documentation line
    DocComment = 3,
    /// `/* ... */`
    BlockComment = 4,
    /// `#if`, `#region`, `#nullable`, ... up to the line break
    Directive = 5,

    // ==================
    // Keywords (10-99)
    // ==================

    // Access modifiers
    PublicKw = 10,
    PrivateKw = 11,
    ProtectedKw = 12,
    InternalKw = 13,

    // Other declaration modifiers
    StaticKw = 14,
    AbstractKw = 15,
    SealedKw = 16,
    VirtualKw = 17,
    OverrideKw = 18,
    ReadonlyKw = 19,
    UnsafeKw = 20,
    ExternKw = 21,
    NewKw = 22,
    ConstKw = 23,
    VolatileKw = 24,
    FixedKw = 25,

    // Parameter modifiers
    RefKw = 30,
    OutKw = 31,
    InKw = 32,
    ParamsKw = 33,
    ThisKw = 34,

    // Declaration keywords
    NamespaceKw = 40,
    UsingKw = 41,
    ClassKw = 42,
    StructKw = 43,
    InterfaceKw = 44,
    EnumKw = 45,
    DelegateKw = 46,
    EventKw = 47,
    OperatorKw = 48,
    ImplicitKw = 49,
    ExplicitKw = 50,
    ReturnKw = 51,

    /// `null` literal keyword
    NullKw = 55,

    // Predefined types
    BoolKw = 60,
    ByteKw = 61,
    SbyteKw = 62,
    ShortKw = 63,
    UshortKw = 64,
    IntKw = 65,
    UintKw = 66,
    LongKw = 67,
    UlongKw = 68,
    CharKw = 69,
    FloatKw = 70,
    DoubleKw = 71,
    DecimalKw = 72,
    StringKw = 73,
    ObjectKw = 74,
    VoidKw = 75,

    /// Any reserved keyword the parser does not distinguish (`if`, `typeof`,
    /// `true`, ...)
    OtherKw = 99,

    // ==================
    // Punctuation (100-149)
    // ==================
    LBrace = 100,
    RBrace = 101,
    LParen = 102,
    RParen = 103,
    LBracket = 104,
    RBracket = 105,
    Semicolon = 106,
    Comma = 107,
    Dot = 108,
    Colon = 109,
    /// `::` alias qualifier
    ColonColon = 110,
    Question = 111,
    Eq = 112,
    /// `=>`
    FatArrow = 113,
    Lt = 114,
    Gt = 115,
    Star = 116,
    Tilde = 117,
    /// Any other operator character sequence (`+`, `==`, `&&`, `?.`, ...)
    Operator = 118,

    // ==================
    // Literals & Identifiers (150-199)
    // ==================
    Ident = 150,
    NumberLiteral = 151,
    /// Regular, verbatim, interpolated and raw string literals
    StringLiteral = 152,
    CharLiteral = 153,

    // ==================
    // Structure nodes (200-399)
    // ==================
    CompilationUnit = 200,
    UsingDirective = 201,
    ExternAlias = 202,
    NamespaceDecl = 203,
    FileScopedNamespaceDecl = 204,

    TypeDecl = 210,
    TypeHeader = 211,
    EnumDecl = 212,
    DelegateDecl = 213,

    MethodDecl = 220,
    ConstructorDecl = 221,
    IndexerDecl = 222,
    PropertyDecl = 223,
    FieldDecl = 224,
    /// Operators, conversions, events, destructors, statements and anything
    /// else kept verbatim
    OpaqueMember = 225,

    AttributeList = 240,
    AttributeTarget = 241,
    Attribute = 242,
    AttributeName = 243,
    AttributeArgs = 244,

    ParameterList = 250,
    BracketedParameterList = 251,
    Parameter = 252,
    DefaultValue = 253,

    TypeParameterList = 260,
    ConstraintClauses = 261,
    ConstructorInitializer = 262,

    Block = 270,
    ArrowBody = 271,

    PredefinedType = 280,
    NamedType = 281,
    TypeArgList = 282,
    TupleType = 283,
    TupleElement = 284,
    ArrayType = 285,
    RankSpecifier = 286,
    PointerType = 287,
    NullableType = 288,
    RefType = 289,

    LiteralExpr = 300,
    /// Opaque expression (default values other than `null`)
    Expr = 301,

    // ==================
    // Special (400+)
    // ==================
    Error = 400,
    Eof = 401,
}

impl CsSyntaxKind {
    /// Check if this kind is trivia (whitespace, newlines, comments, directives)
    pub const fn is_trivia(self) -> bool {
        (self as u16) < 10
    }

    /// Check if this is a keyword
    pub const fn is_keyword(self) -> bool {
        (self as u16) >= 10 && (self as u16) < 100
    }

    /// Check if this is punctuation
    pub const fn is_punct(self) -> bool {
        (self as u16) >= 100 && (self as u16) < 150
    }

    /// Check if this is a structural node
    pub const fn is_node(self) -> bool {
        (self as u16) >= 200 && (self as u16) < 400
    }

    /// Reserved modifier keywords that may precede a member declaration
    pub const fn is_modifier(self) -> bool {
        (self as u16) >= 10 && (self as u16) <= 25
    }

    /// Built-in type keywords (`int`, `string`, `void`, ...)
    pub const fn is_predefined_type(self) -> bool {
        (self as u16) >= 60 && (self as u16) <= 75
    }

    /// Nodes that represent a complete type
    pub const fn is_type(self) -> bool {
        matches!(
            self,
            Self::PredefinedType
                | Self::NamedType
                | Self::TupleType
                | Self::ArrayType
                | Self::PointerType
                | Self::NullableType
                | Self::RefType
        )
    }

    /// Declarations whose parameters and attributes the rewriter inspects
    pub const fn is_method_like(self) -> bool {
        matches!(
            self,
            Self::MethodDecl | Self::ConstructorDecl | Self::IndexerDecl
        )
    }

    /// Look up the reserved keyword spelled `text`
    ///
    /// Contextual keywords (`partial`, `async`, `record`, `var`, ...) are
    /// identifiers and return `None`.
    pub fn from_keyword(text: &str) -> Option<Self> {
        let kind = match text {
            "public" => Self::PublicKw,
            "private" => Self::PrivateKw,
            "protected" => Self::ProtectedKw,
            "internal" => Self::InternalKw,
            "static" => Self::StaticKw,
            "abstract" => Self::AbstractKw,
            "sealed" => Self::SealedKw,
            "virtual" => Self::VirtualKw,
            "override" => Self::OverrideKw,
            "readonly" => Self::ReadonlyKw,
            "unsafe" => Self::UnsafeKw,
            "extern" => Self::ExternKw,
            "new" => Self::NewKw,
            "const" => Self::ConstKw,
            "volatile" => Self::VolatileKw,
            "fixed" => Self::FixedKw,
            "ref" => Self::RefKw,
            "out" => Self::OutKw,
            "in" => Self::InKw,
            "params" => Self::ParamsKw,
            "this" => Self::ThisKw,
            "namespace" => Self::NamespaceKw,
            "using" => Self::UsingKw,
            "class" => Self::ClassKw,
            "struct" => Self::StructKw,
            "interface" => Self::InterfaceKw,
            "enum" => Self::EnumKw,
            "delegate" => Self::DelegateKw,
            "event" => Self::EventKw,
            "operator" => Self::OperatorKw,
            "implicit" => Self::ImplicitKw,
            "explicit" => Self::ExplicitKw,
            "return" => Self::ReturnKw,
            "null" => Self::NullKw,
            "bool" => Self::BoolKw,
            "byte" => Self::ByteKw,
            "sbyte" => Self::SbyteKw,
            "short" => Self::ShortKw,
            "ushort" => Self::UshortKw,
            "int" => Self::IntKw,
            "uint" => Self::UintKw,
            "long" => Self::LongKw,
            "ulong" => Self::UlongKw,
            "char" => Self::CharKw,
            "float" => Self::FloatKw,
            "double" => Self::DoubleKw,
            "decimal" => Self::DecimalKw,
            "string" => Self::StringKw,
            "object" => Self::ObjectKw,
            "void" => Self::VoidKw,
            "as" | "base" | "break" | "case" | "catch" | "checked" | "continue" | "default"
            | "do" | "else" | "false" | "finally" | "for" | "foreach" | "goto" | "if" | "is"
            | "lock" | "sizeof" | "stackalloc" | "switch" | "throw" | "true" | "try"
            | "typeof" | "unchecked" | "while" => Self::OtherKw,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for CsSyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<CsSyntaxKind> for rowan::SyntaxKind {
    fn from(kind: CsSyntaxKind) -> Self {
        Self(kind as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivia_classification() {
        assert!(CsSyntaxKind::Whitespace.is_trivia());
        assert!(CsSyntaxKind::DocComment.is_trivia());
        assert!(CsSyntaxKind::Directive.is_trivia());
        assert!(!CsSyntaxKind::PublicKw.is_trivia());
    }

    #[test]
    fn test_modifier_classification() {
        assert!(CsSyntaxKind::PublicKw.is_modifier());
        assert!(CsSyntaxKind::FixedKw.is_modifier());
        assert!(!CsSyntaxKind::RefKw.is_modifier());
        assert!(!CsSyntaxKind::Ident.is_modifier());
    }

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(CsSyntaxKind::from_keyword("public"), Some(CsSyntaxKind::PublicKw));
        assert_eq!(CsSyntaxKind::from_keyword("string"), Some(CsSyntaxKind::StringKw));
        assert_eq!(CsSyntaxKind::from_keyword("typeof"), Some(CsSyntaxKind::OtherKw));
        assert_eq!(CsSyntaxKind::from_keyword("partial"), None);
        assert_eq!(CsSyntaxKind::from_keyword("CanBeNull"), None);
    }

    #[test]
    fn test_type_classification() {
        assert!(CsSyntaxKind::NullableType.is_type());
        assert!(CsSyntaxKind::NamedType.is_type());
        assert!(!CsSyntaxKind::TypeArgList.is_type());
        assert!(CsSyntaxKind::StringKw.is_predefined_type());
        assert!(!CsSyntaxKind::NullKw.is_predefined_type());
    }
}
