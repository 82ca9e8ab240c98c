//! Rowan language implementation for C#
//!
//! This module implements the `rowan::Language` trait, which connects our
//! `CsSyntaxKind` enum to Rowan's generic CST infrastructure.

use rowan::Language;

use super::CsSyntaxKind;

/// Language implementation for C#
///
/// A zero-sized type that implements `rowan::Language` to provide the
/// connection between our syntax kinds and Rowan's generic tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CsLanguage;

impl Language for CsLanguage {
    type Kind = CsSyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        match raw.0 {
            // Trivia
            0 => CsSyntaxKind::Whitespace,
            1 => CsSyntaxKind::Newline,
            2 => CsSyntaxKind::LineComment,
            3 => CsSyntaxKind::DocComment,
            4 => CsSyntaxKind::BlockComment,
            5 => CsSyntaxKind::Directive,

            // Modifiers (10-25)
            10 => CsSyntaxKind::PublicKw,
            11 => CsSyntaxKind::PrivateKw,
            12 => CsSyntaxKind::ProtectedKw,
            13 => CsSyntaxKind::InternalKw,
            14 => CsSyntaxKind::StaticKw,
            15 => CsSyntaxKind::AbstractKw,
            16 => CsSyntaxKind::SealedKw,
            17 => CsSyntaxKind::VirtualKw,
            18 => CsSyntaxKind::OverrideKw,
            19 => CsSyntaxKind::ReadonlyKw,
            20 => CsSyntaxKind::UnsafeKw,
            21 => CsSyntaxKind::ExternKw,
            22 => CsSyntaxKind::NewKw,
            23 => CsSyntaxKind::ConstKw,
            24 => CsSyntaxKind::VolatileKw,
            25 => CsSyntaxKind::FixedKw,

            // Parameter modifiers (30-34)
            30 => CsSyntaxKind::RefKw,
            31 => CsSyntaxKind::OutKw,
            32 => CsSyntaxKind::InKw,
            33 => CsSyntaxKind::ParamsKw,
            34 => CsSyntaxKind::ThisKw,

            // Declaration keywords (40-55)
            40 => CsSyntaxKind::NamespaceKw,
            41 => CsSyntaxKind::UsingKw,
            42 => CsSyntaxKind::ClassKw,
            43 => CsSyntaxKind::StructKw,
            44 => CsSyntaxKind::InterfaceKw,
            45 => CsSyntaxKind::EnumKw,
            46 => CsSyntaxKind::DelegateKw,
            47 => CsSyntaxKind::EventKw,
            48 => CsSyntaxKind::OperatorKw,
            49 => CsSyntaxKind::ImplicitKw,
            50 => CsSyntaxKind::ExplicitKw,
            51 => CsSyntaxKind::ReturnKw,
            55 => CsSyntaxKind::NullKw,

            // Predefined types (60-75)
            60 => CsSyntaxKind::BoolKw,
            61 => CsSyntaxKind::ByteKw,
            62 => CsSyntaxKind::SbyteKw,
            63 => CsSyntaxKind::ShortKw,
            64 => CsSyntaxKind::UshortKw,
            65 => CsSyntaxKind::IntKw,
            66 => CsSyntaxKind::UintKw,
            67 => CsSyntaxKind::LongKw,
            68 => CsSyntaxKind::UlongKw,
            69 => CsSyntaxKind::CharKw,
            70 => CsSyntaxKind::FloatKw,
            71 => CsSyntaxKind::DoubleKw,
            72 => CsSyntaxKind::DecimalKw,
            73 => CsSyntaxKind::StringKw,
            74 => CsSyntaxKind::ObjectKw,
            75 => CsSyntaxKind::VoidKw,
            99 => CsSyntaxKind::OtherKw,

            // Punctuation (100-149)
            100 => CsSyntaxKind::LBrace,
            101 => CsSyntaxKind::RBrace,
            102 => CsSyntaxKind::LParen,
            103 => CsSyntaxKind::RParen,
            104 => CsSyntaxKind::LBracket,
            105 => CsSyntaxKind::RBracket,
            106 => CsSyntaxKind::Semicolon,
            107 => CsSyntaxKind::Comma,
            108 => CsSyntaxKind::Dot,
            109 => CsSyntaxKind::Colon,
            110 => CsSyntaxKind::ColonColon,
            111 => CsSyntaxKind::Question,
            112 => CsSyntaxKind::Eq,
            113 => CsSyntaxKind::FatArrow,
            114 => CsSyntaxKind::Lt,
            115 => CsSyntaxKind::Gt,
            116 => CsSyntaxKind::Star,
            117 => CsSyntaxKind::Tilde,
            118 => CsSyntaxKind::Operator,

            // Literals & Identifiers (150-199)
            150 => CsSyntaxKind::Ident,
            151 => CsSyntaxKind::NumberLiteral,
            152 => CsSyntaxKind::StringLiteral,
            153 => CsSyntaxKind::CharLiteral,

            // Structure nodes (200-399)
            200 => CsSyntaxKind::CompilationUnit,
            201 => CsSyntaxKind::UsingDirective,
            202 => CsSyntaxKind::ExternAlias,
            203 => CsSyntaxKind::NamespaceDecl,
            204 => CsSyntaxKind::FileScopedNamespaceDecl,
            210 => CsSyntaxKind::TypeDecl,
            211 => CsSyntaxKind::TypeHeader,
            212 => CsSyntaxKind::EnumDecl,
            213 => CsSyntaxKind::DelegateDecl,
            220 => CsSyntaxKind::MethodDecl,
            221 => CsSyntaxKind::ConstructorDecl,
            222 => CsSyntaxKind::IndexerDecl,
            223 => CsSyntaxKind::PropertyDecl,
            224 => CsSyntaxKind::FieldDecl,
            225 => CsSyntaxKind::OpaqueMember,
            240 => CsSyntaxKind::AttributeList,
            241 => CsSyntaxKind::AttributeTarget,
            242 => CsSyntaxKind::Attribute,
            243 => CsSyntaxKind::AttributeName,
            244 => CsSyntaxKind::AttributeArgs,
            250 => CsSyntaxKind::ParameterList,
            251 => CsSyntaxKind::BracketedParameterList,
            252 => CsSyntaxKind::Parameter,
            253 => CsSyntaxKind::DefaultValue,
            260 => CsSyntaxKind::TypeParameterList,
            261 => CsSyntaxKind::ConstraintClauses,
            262 => CsSyntaxKind::ConstructorInitializer,
            270 => CsSyntaxKind::Block,
            271 => CsSyntaxKind::ArrowBody,
            280 => CsSyntaxKind::PredefinedType,
            281 => CsSyntaxKind::NamedType,
            282 => CsSyntaxKind::TypeArgList,
            283 => CsSyntaxKind::TupleType,
            284 => CsSyntaxKind::TupleElement,
            285 => CsSyntaxKind::ArrayType,
            286 => CsSyntaxKind::RankSpecifier,
            287 => CsSyntaxKind::PointerType,
            288 => CsSyntaxKind::NullableType,
            289 => CsSyntaxKind::RefType,
            300 => CsSyntaxKind::LiteralExpr,
            301 => CsSyntaxKind::Expr,

            // Special tokens (400+)
            401 => CsSyntaxKind::Eof,

            // Every raw value we hand to rowan comes from `kind_to_raw`
            _ => CsSyntaxKind::Error,
        }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}
