//! Declaration-level parser for C#
//!
//! Builds a hierarchical, lossless CST from the token stream. Namespaces, type
//! declarations, method-like members, parameters, attributes and types get
//! real structure; everything else (bodies, initializers, enum members,
//! operators, statements) is kept as balanced, opaque token runs so the tree
//! always reproduces the input text exactly, even for invalid code.

use std::fmt;

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, TextRange, TextSize};

use super::lexer::{CstSpan, CstToken, LexerError, lex_with_trivia};
use super::trivia::{SignificantToken, attach_trivia};
use super::{CsSyntaxKind, CsSyntaxNode};

/// Category of a parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// Reported by the lexer (unterminated literal, unknown character)
    Lexical,
    /// A required token is missing
    Expected,
    /// A token that cannot appear here
    Unexpected,
    /// End of file inside a bracketed region
    UnexpectedEof,
}

/// A syntax error with the byte range it applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub range: TextRange,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, range: TextRange) -> Self {
        Self {
            kind,
            message: message.into(),
            range,
        }
    }

    fn from_lexer(error: &LexerError) -> Self {
        Self::new(
            ParseErrorKind::Lexical,
            error.message.clone(),
            text_range(&error.span),
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}..{}",
            self.message,
            u32::from(self.range.start()),
            u32::from(self.range.end())
        )
    }
}

/// Result of parsing one source file
#[derive(Debug, Clone)]
pub struct Parse {
    green: GreenNode,
    errors: Vec<ParseError>,
}

impl Parse {
    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    pub fn into_green(self) -> GreenNode {
        self.green
    }

    /// Red tree rooted at the compilation unit
    pub fn syntax(&self) -> CsSyntaxNode {
        CsSyntaxNode::new_root(self.green.clone())
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Whether the source parsed without any lexical or syntax error
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse C# source into a lossless CST
///
/// # Example
///
/// ```rust,ignore
/// use nullinate_core::cst::parse_csharp;
///
/// let source = "class C {\n    [NotNull] string Foo() => \"x\";\n}\n";
/// let parse = parse_csharp(source);
/// assert!(parse.ok());
/// assert_eq!(parse.syntax().text().to_string(), source);
/// ```
pub fn parse_csharp(source: &str) -> Parse {
    let (tokens, lexer_errors) = lex_with_trivia(source);
    let mut parser = Parser::new(&tokens, source.len());
    parser
        .errors
        .extend(lexer_errors.iter().map(ParseError::from_lexer));
    parser.parse_compilation_unit();
    parser.finish()
}

fn text_range(span: &CstSpan) -> TextRange {
    TextRange::new(
        TextSize::new(span.start as u32),
        TextSize::new(span.end as u32),
    )
}

/// Where a run of members lives; decides what may appear and what ends the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    CompilationUnit,
    Namespace,
    FileScopedNamespace,
    TypeBody,
}

impl Container {
    fn is_braced(self) -> bool {
        matches!(self, Self::Namespace | Self::TypeBody)
    }
}

/// Member classification decided by lookahead, before any token is emitted
///
/// `name_end` is the index of the first significant token after the member
/// name (for indexers: the index of `this`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberShape {
    Namespace,
    Type,
    Enum,
    Delegate,
    Constructor,
    Method { name_end: usize },
    Indexer { name_end: usize },
    Property { name_end: usize },
    Field,
    Opaque,
}

/// Contextual keywords accepted as declaration modifiers
const CONTEXTUAL_MODIFIERS: &[&str] = &["partial", "async", "required", "file"];

/// Token stream parser
struct Parser<'t> {
    tokens: &'t [CstToken],
    significant: Vec<SignificantToken>,
    pos: usize,
    source_len: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<ParseError>,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [CstToken], source_len: usize) -> Self {
        Self {
            tokens,
            significant: attach_trivia(tokens),
            pos: 0,
            source_len,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> Parse {
        let mut errors = self.errors;
        errors.sort_by_key(|e| e.range.start());
        Parse {
            green: self.builder.finish(),
            errors,
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn parse_compilation_unit(&mut self) {
        self.start_node(CsSyntaxKind::CompilationUnit);
        self.parse_members(Container::CompilationUnit);

        // End of file: remaining trivia, then an empty marker token
        let leading = self
            .significant
            .last()
            .map(|eof| eof.leading.clone())
            .unwrap_or_default();
        let tokens = self.tokens;
        for token in &tokens[leading] {
            self.push_token(token);
        }
        self.builder.token(CsSyntaxKind::Eof.into(), "");

        self.finish_node(); // COMPILATION_UNIT
    }

    fn parse_members(&mut self, container: Container) {
        loop {
            match self.current() {
                CsSyntaxKind::Eof => {
                    if container.is_braced() {
                        self.error_here(ParseErrorKind::UnexpectedEof, "expected `}`");
                    }
                    break;
                }
                CsSyntaxKind::RBrace if container.is_braced() => break,
                CsSyntaxKind::RBrace => self.bump_error("unexpected `}`"),
                _ => {
                    let before = self.pos;
                    self.parse_member(container);
                    if self.pos == before {
                        let message = format!("unexpected `{}`", self.current_text());
                        self.bump_error(&message);
                    }
                }
            }
        }
    }

    fn parse_member(&mut self, container: Container) {
        if container != Container::TypeBody {
            if (self.at(CsSyntaxKind::UsingKw) && self.nth(1) != CsSyntaxKind::LParen)
                || (self.at_contextual(0, "global") && self.nth(1) == CsSyntaxKind::UsingKw)
            {
                self.parse_terminated(CsSyntaxKind::UsingDirective);
                return;
            }
            if self.at(CsSyntaxKind::ExternKw) && self.at_contextual(1, "alias") {
                self.parse_terminated(CsSyntaxKind::ExternAlias);
                return;
            }
            if self.at_global_attribute_list() {
                self.parse_attribute_list();
                return;
            }
        }

        let checkpoint = self.builder.checkpoint();
        while self.at(CsSyntaxKind::LBracket) {
            self.parse_attribute_list();
        }
        while self.at_modifier() {
            self.bump();
        }

        match self.classify_member(container == Container::TypeBody) {
            MemberShape::Namespace => self.parse_namespace(checkpoint),
            MemberShape::Type => self.parse_type_decl(checkpoint),
            MemberShape::Enum => self.parse_opaque_member(checkpoint, CsSyntaxKind::EnumDecl),
            MemberShape::Delegate => {
                self.parse_opaque_member(checkpoint, CsSyntaxKind::DelegateDecl)
            }
            MemberShape::Constructor => self.parse_constructor(checkpoint),
            MemberShape::Method { name_end } => self.parse_method(checkpoint, name_end),
            MemberShape::Indexer { name_end } => self.parse_indexer(checkpoint, name_end),
            MemberShape::Property { name_end } => self.parse_property(checkpoint, name_end),
            MemberShape::Field => self.parse_field(checkpoint),
            MemberShape::Opaque => {
                self.parse_opaque_member(checkpoint, CsSyntaxKind::OpaqueMember)
            }
        }
    }

    /// Decide what the member at the current position is, without consuming
    fn classify_member(&self, in_type_body: bool) -> MemberShape {
        let start = self.pos;
        match self.kind_at(start) {
            CsSyntaxKind::NamespaceKw => return MemberShape::Namespace,
            CsSyntaxKind::ClassKw | CsSyntaxKind::StructKw | CsSyntaxKind::InterfaceKw => {
                return MemberShape::Type;
            }
            CsSyntaxKind::Ident
                if self.text_at(start) == "record"
                    && matches!(
                        self.kind_at(start + 1),
                        CsSyntaxKind::Ident | CsSyntaxKind::ClassKw | CsSyntaxKind::StructKw
                    ) =>
            {
                return MemberShape::Type;
            }
            CsSyntaxKind::EnumKw => return MemberShape::Enum,
            CsSyntaxKind::DelegateKw => return MemberShape::Delegate,
            CsSyntaxKind::Ident
                if in_type_body && self.kind_at(start + 1) == CsSyntaxKind::LParen =>
            {
                return MemberShape::Constructor;
            }
            _ => {}
        }

        let Some(after_type) = self.scan_type(start) else {
            return MemberShape::Opaque;
        };

        match self.kind_at(after_type) {
            CsSyntaxKind::ThisKw if self.kind_at(after_type + 1) == CsSyntaxKind::LBracket => {
                MemberShape::Indexer {
                    name_end: after_type,
                }
            }
            CsSyntaxKind::Ident => {
                let name_end = self.scan_member_name(after_type);
                match self.kind_at(name_end) {
                    CsSyntaxKind::LParen | CsSyntaxKind::Lt => MemberShape::Method { name_end },
                    CsSyntaxKind::LBrace | CsSyntaxKind::FatArrow => {
                        MemberShape::Property { name_end }
                    }
                    CsSyntaxKind::Eq
                    | CsSyntaxKind::Semicolon
                    | CsSyntaxKind::Comma
                    | CsSyntaxKind::LBracket => MemberShape::Field,
                    CsSyntaxKind::ThisKw
                        if self.kind_at(name_end + 1) == CsSyntaxKind::LBracket =>
                    {
                        MemberShape::Indexer { name_end }
                    }
                    _ => MemberShape::Opaque,
                }
            }
            _ => MemberShape::Opaque,
        }
    }

    /// `using ...;` and `extern alias ...;`
    fn parse_terminated(&mut self, kind: CsSyntaxKind) {
        self.start_node(kind);
        self.bump_balanced_until(|k| k == CsSyntaxKind::Semicolon);
        self.expect(CsSyntaxKind::Semicolon, "`;`");
        self.finish_node();
    }

    fn parse_namespace(&mut self, checkpoint: Checkpoint) {
        let mut name_end = self.pos + 1;
        while matches!(
            self.kind_at(name_end),
            CsSyntaxKind::Ident | CsSyntaxKind::Dot
        ) {
            name_end += 1;
        }

        if self.kind_at(name_end) == CsSyntaxKind::Semicolon {
            self.start_node_at(checkpoint, CsSyntaxKind::FileScopedNamespaceDecl);
            self.bump_to(name_end);
            self.bump(); // ;
            self.parse_members(Container::FileScopedNamespace);
            self.finish_node();
            return;
        }

        self.start_node_at(checkpoint, CsSyntaxKind::NamespaceDecl);
        self.bump_to(name_end);
        if self.expect(CsSyntaxKind::LBrace, "`{`") {
            self.parse_members(Container::Namespace);
            self.expect(CsSyntaxKind::RBrace, "`}`");
            if self.at(CsSyntaxKind::Semicolon) {
                self.bump();
            }
        }
        self.finish_node(); // NAMESPACE_DECL
    }

    /// `class`, `struct`, `interface` and `record` declarations
    ///
    /// Grammar: <attributes> <modifiers> <header> ( '{' <member>* '}' ';'? | ';' )
    fn parse_type_decl(&mut self, checkpoint: Checkpoint) {
        self.start_node_at(checkpoint, CsSyntaxKind::TypeDecl);

        self.start_node(CsSyntaxKind::TypeHeader);
        self.bump_balanced_until(|k| matches!(k, CsSyntaxKind::LBrace | CsSyntaxKind::Semicolon));
        self.finish_node();

        match self.current() {
            CsSyntaxKind::LBrace => {
                self.bump();
                self.parse_members(Container::TypeBody);
                self.expect(CsSyntaxKind::RBrace, "`}`");
                if self.at(CsSyntaxKind::Semicolon) {
                    self.bump();
                }
            }
            CsSyntaxKind::Semicolon => self.bump(),
            _ => self.error_here(ParseErrorKind::Expected, "expected `{` or `;`"),
        }

        self.finish_node(); // TYPE_DECL
    }

    /// Grammar: <attributes> <modifiers> <type> <name> <type-params>? '(' <params> ')'
    ///          <constraints>? ( <block> | '=>' <expr> ';' | ';' )
    fn parse_method(&mut self, checkpoint: Checkpoint, name_end: usize) {
        self.start_node_at(checkpoint, CsSyntaxKind::MethodDecl);

        self.parse_type();
        self.bump_to(name_end);
        if self.at(CsSyntaxKind::Lt) {
            self.parse_type_parameter_list();
        }
        if self.at(CsSyntaxKind::LParen) {
            self.parse_parameter_list(
                CsSyntaxKind::ParameterList,
                CsSyntaxKind::LParen,
                CsSyntaxKind::RParen,
            );
        } else {
            self.error_here(ParseErrorKind::Expected, "expected `(`");
        }
        self.parse_constraint_clauses();
        self.parse_body();

        self.finish_node(); // METHOD_DECL
    }

    /// Grammar: <attributes> <modifiers> <name> '(' <params> ')' (':' <initializer>)? <body>
    fn parse_constructor(&mut self, checkpoint: Checkpoint) {
        self.start_node_at(checkpoint, CsSyntaxKind::ConstructorDecl);

        self.bump(); // name
        self.parse_parameter_list(
            CsSyntaxKind::ParameterList,
            CsSyntaxKind::LParen,
            CsSyntaxKind::RParen,
        );
        if self.at(CsSyntaxKind::Colon) {
            self.start_node(CsSyntaxKind::ConstructorInitializer);
            self.bump_balanced_until(|k| {
                matches!(
                    k,
                    CsSyntaxKind::LBrace | CsSyntaxKind::FatArrow | CsSyntaxKind::Semicolon
                )
            });
            self.finish_node();
        }
        self.parse_body();

        self.finish_node(); // CONSTRUCTOR_DECL
    }

    /// Grammar: <attributes> <modifiers> <type> (<interface> '.')? 'this' '[' <params> ']'
    ///          ( <accessor-block> | '=>' <expr> ';' )
    fn parse_indexer(&mut self, checkpoint: Checkpoint, this_index: usize) {
        self.start_node_at(checkpoint, CsSyntaxKind::IndexerDecl);

        self.parse_type();
        self.bump_to(this_index);
        self.bump(); // this
        self.parse_parameter_list(
            CsSyntaxKind::BracketedParameterList,
            CsSyntaxKind::LBracket,
            CsSyntaxKind::RBracket,
        );
        match self.current() {
            CsSyntaxKind::LBrace => self.parse_block(),
            CsSyntaxKind::FatArrow => self.parse_arrow_body(),
            _ => self.error_here(ParseErrorKind::Expected, "expected `{` or `=>`"),
        }

        self.finish_node(); // INDEXER_DECL
    }

    fn parse_property(&mut self, checkpoint: Checkpoint, name_end: usize) {
        self.start_node_at(checkpoint, CsSyntaxKind::PropertyDecl);

        self.parse_type();
        self.bump_to(name_end);
        match self.current() {
            CsSyntaxKind::LBrace => {
                self.parse_block();
                // Initializer: `{ get; } = value;`
                if self.at(CsSyntaxKind::Eq) {
                    self.bump_balanced_until(|k| k == CsSyntaxKind::Semicolon);
                    self.expect(CsSyntaxKind::Semicolon, "`;`");
                }
            }
            _ => self.parse_arrow_body(),
        }

        self.finish_node(); // PROPERTY_DECL
    }

    fn parse_field(&mut self, checkpoint: Checkpoint) {
        self.start_node_at(checkpoint, CsSyntaxKind::FieldDecl);

        self.parse_type();
        self.bump_balanced_until(|k| k == CsSyntaxKind::Semicolon);
        self.expect(CsSyntaxKind::Semicolon, "`;`");

        self.finish_node(); // FIELD_DECL
    }

    /// Consume a member we do not model: up to a `;` or the end of a top-level block
    fn parse_opaque_member(&mut self, checkpoint: Checkpoint, kind: CsSyntaxKind) {
        self.start_node_at(checkpoint, kind);

        let mut open: Vec<CsSyntaxKind> = Vec::new();
        loop {
            let current = self.current();
            match current {
                CsSyntaxKind::Eof => {
                    if !open.is_empty() {
                        self.error_here(ParseErrorKind::UnexpectedEof, "unexpected end of file");
                    }
                    break;
                }
                CsSyntaxKind::Semicolon if open.is_empty() => {
                    self.bump();
                    break;
                }
                CsSyntaxKind::LParen | CsSyntaxKind::LBracket | CsSyntaxKind::LBrace => {
                    open.push(closer_of(current));
                    self.bump();
                }
                CsSyntaxKind::RParen | CsSyntaxKind::RBracket | CsSyntaxKind::RBrace => {
                    if open.last() == Some(&current) {
                        open.pop();
                        self.bump();
                        if open.is_empty() && current == CsSyntaxKind::RBrace {
                            if self.at(CsSyntaxKind::Semicolon) {
                                self.bump();
                            }
                            break;
                        }
                    } else if open.is_empty() {
                        // Closer of the enclosing construct
                        break;
                    } else {
                        let message = format!("unexpected `{}`", self.current_text());
                        self.error_here(ParseErrorKind::Unexpected, &message);
                        self.bump();
                    }
                }
                _ => self.bump(),
            }
        }

        self.finish_node();
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Grammar: '[' (<target> ':')? <attribute> (',' <attribute>)* ','? ']'
    fn parse_attribute_list(&mut self) {
        self.start_node(CsSyntaxKind::AttributeList);
        self.bump(); // [

        if self.nth(1) == CsSyntaxKind::Colon
            && (self.at(CsSyntaxKind::Ident) || self.current().is_keyword())
        {
            self.start_node(CsSyntaxKind::AttributeTarget);
            self.bump();
            self.bump();
            self.finish_node();
        }

        loop {
            match self.current() {
                CsSyntaxKind::RBracket
                | CsSyntaxKind::RBrace
                | CsSyntaxKind::Semicolon
                | CsSyntaxKind::Eof => break,
                CsSyntaxKind::Comma => self.bump(),
                CsSyntaxKind::Ident => {
                    self.parse_attribute();
                    if !matches!(self.current(), CsSyntaxKind::Comma | CsSyntaxKind::RBracket) {
                        self.error_here(ParseErrorKind::Expected, "expected `,` or `]`");
                    }
                }
                _ => {
                    self.error_here(ParseErrorKind::Expected, "expected attribute name");
                    let before = self.pos;
                    self.bump_balanced_until(|k| {
                        matches!(k, CsSyntaxKind::Comma | CsSyntaxKind::RBracket)
                    });
                    if self.pos == before {
                        break;
                    }
                }
            }
        }

        self.expect(CsSyntaxKind::RBracket, "`]`");
        self.finish_node(); // ATTRIBUTE_LIST
    }

    /// Grammar: <name> ('(' <args> ')')?
    fn parse_attribute(&mut self) {
        self.start_node(CsSyntaxKind::Attribute);

        self.start_node(CsSyntaxKind::AttributeName);
        self.bump();
        if self.at(CsSyntaxKind::ColonColon) && self.nth(1) == CsSyntaxKind::Ident {
            self.bump();
            self.bump();
        }
        loop {
            if self.at(CsSyntaxKind::Lt) {
                self.parse_type_arg_list();
            }
            if self.at(CsSyntaxKind::Dot) && self.nth(1) == CsSyntaxKind::Ident {
                self.bump();
                self.bump();
                continue;
            }
            break;
        }
        self.finish_node(); // ATTRIBUTE_NAME

        if self.at(CsSyntaxKind::LParen) {
            self.start_node(CsSyntaxKind::AttributeArgs);
            self.bump();
            self.bump_balanced_until(|k| k == CsSyntaxKind::RParen);
            self.expect(CsSyntaxKind::RParen, "`)`");
            self.finish_node();
        }

        self.finish_node(); // ATTRIBUTE
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    fn parse_parameter_list(
        &mut self,
        kind: CsSyntaxKind,
        open: CsSyntaxKind,
        close: CsSyntaxKind,
    ) {
        self.start_node(kind);
        self.expect(open, if open == CsSyntaxKind::LParen { "`(`" } else { "`[`" });

        if !self.at(close) {
            loop {
                let before = self.pos;
                self.parse_parameter(close);
                if self.at(CsSyntaxKind::Comma) {
                    self.bump();
                    continue;
                }
                if self.pos == before || self.at_end() {
                    break;
                }
                if !self.at(close) {
                    // Garbage between parameters: skip it inside the list
                    let message = format!("unexpected `{}`", self.current_text());
                    self.error_here(ParseErrorKind::Unexpected, &message);
                    self.bump_balanced_until(|k| k == close);
                }
                break;
            }
        }

        self.expect(close, if close == CsSyntaxKind::RParen { "`)`" } else { "`]`" });
        self.finish_node();
    }

    /// Grammar: <attributes> <modifiers> <type> <name> ('=' <default>)?
    fn parse_parameter(&mut self, close: CsSyntaxKind) {
        self.start_node(CsSyntaxKind::Parameter);

        while self.at(CsSyntaxKind::LBracket) {
            self.parse_attribute_list();
        }
        while self.at_parameter_modifier() {
            self.bump();
        }

        if self.scan_type(self.pos).is_some() {
            self.parse_type();
            if self.at(CsSyntaxKind::Ident) {
                self.bump();
            }
            if self.at(CsSyntaxKind::Eq) {
                self.parse_default_value(close);
            }
        } else {
            // `__arglist` and other shapes we do not model
            self.bump_balanced_until(|k| k == CsSyntaxKind::Comma || k == close);
        }

        self.finish_node(); // PARAMETER
    }

    fn parse_default_value(&mut self, close: CsSyntaxKind) {
        self.start_node(CsSyntaxKind::DefaultValue);
        self.bump(); // =

        let next = self.nth(1);
        if self.at(CsSyntaxKind::NullKw) && (next == CsSyntaxKind::Comma || next == close) {
            self.start_node(CsSyntaxKind::LiteralExpr);
            self.bump();
            self.finish_node();
        } else {
            self.start_node(CsSyntaxKind::Expr);
            self.bump_balanced_until(|k| k == CsSyntaxKind::Comma || k == close);
            self.finish_node();
        }

        self.finish_node(); // DEFAULT_VALUE
    }

    fn parse_type_parameter_list(&mut self) {
        self.start_node(CsSyntaxKind::TypeParameterList);
        self.bump(); // <

        let mut depth = 1usize;
        while depth > 0 {
            match self.current() {
                CsSyntaxKind::Lt => depth += 1,
                CsSyntaxKind::Gt => depth -= 1,
                CsSyntaxKind::Eof
                | CsSyntaxKind::LParen
                | CsSyntaxKind::LBrace
                | CsSyntaxKind::Semicolon => {
                    self.error_here(ParseErrorKind::Expected, "expected `>`");
                    break;
                }
                _ => {}
            }
            self.bump();
        }

        self.finish_node();
    }

    fn parse_constraint_clauses(&mut self) {
        if !self.at_contextual(0, "where") {
            return;
        }
        self.start_node(CsSyntaxKind::ConstraintClauses);
        self.bump_balanced_until(|k| {
            matches!(
                k,
                CsSyntaxKind::LBrace | CsSyntaxKind::FatArrow | CsSyntaxKind::Semicolon
            )
        });
        self.finish_node();
    }

    // ========================================================================
    // Bodies
    // ========================================================================

    /// Method or constructor body: block, expression body or `;`
    fn parse_body(&mut self) {
        match self.current() {
            CsSyntaxKind::LBrace => self.parse_block(),
            CsSyntaxKind::FatArrow => self.parse_arrow_body(),
            CsSyntaxKind::Semicolon => self.bump(),
            _ => self.error_here(ParseErrorKind::Expected, "expected `{`, `=>` or `;`"),
        }
    }

    fn parse_block(&mut self) {
        self.start_node(CsSyntaxKind::Block);
        self.bump(); // {
        self.bump_balanced_until(|k| k == CsSyntaxKind::RBrace);
        self.expect(CsSyntaxKind::RBrace, "`}`");
        self.finish_node();
    }

    /// Grammar: '=>' <expr> ';'
    fn parse_arrow_body(&mut self) {
        self.start_node(CsSyntaxKind::ArrowBody);
        self.expect(CsSyntaxKind::FatArrow, "`=>`");
        self.bump_balanced_until(|k| k == CsSyntaxKind::Semicolon);
        self.finish_node();
        self.expect(CsSyntaxKind::Semicolon, "`;`");
    }

    // ========================================================================
    // Types
    // ========================================================================

    /// Emit a type; the caller has checked [`Parser::scan_type`]
    fn parse_type(&mut self) {
        let checkpoint = self.builder.checkpoint();

        if self.at(CsSyntaxKind::RefKw) {
            self.start_node(CsSyntaxKind::RefType);
            self.bump();
            if self.at(CsSyntaxKind::ReadonlyKw) {
                self.bump();
            }
            self.parse_type();
            self.finish_node();
            return;
        }

        match self.current() {
            kind if kind.is_predefined_type() => {
                self.start_node(CsSyntaxKind::PredefinedType);
                self.bump();
                self.finish_node();
            }
            CsSyntaxKind::LParen => self.parse_tuple_type(),
            CsSyntaxKind::Ident => self.parse_named_type(),
            _ => {
                self.error_here(ParseErrorKind::Expected, "expected type");
                return;
            }
        }

        loop {
            match self.current() {
                CsSyntaxKind::Question => {
                    self.start_node_at(checkpoint, CsSyntaxKind::NullableType);
                    self.bump();
                    self.finish_node();
                }
                CsSyntaxKind::Star => {
                    self.start_node_at(checkpoint, CsSyntaxKind::PointerType);
                    self.bump();
                    self.finish_node();
                }
                CsSyntaxKind::LBracket => {
                    let Some(end) = self.scan_rank_specifier(self.pos) else {
                        break;
                    };
                    self.start_node_at(checkpoint, CsSyntaxKind::ArrayType);
                    self.start_node(CsSyntaxKind::RankSpecifier);
                    self.bump_to(end);
                    self.finish_node();
                    self.finish_node();
                }
                _ => break,
            }
        }
    }

    /// Grammar: (<ident> '::')? <ident> <type-args>? ('.' <ident> <type-args>?)*
    fn parse_named_type(&mut self) {
        self.start_node(CsSyntaxKind::NamedType);

        self.bump();
        if self.at(CsSyntaxKind::ColonColon) && self.nth(1) == CsSyntaxKind::Ident {
            self.bump();
            self.bump();
        }
        loop {
            if self.at(CsSyntaxKind::Lt) {
                self.parse_type_arg_list();
            }
            if self.at(CsSyntaxKind::Dot) && self.nth(1) == CsSyntaxKind::Ident {
                self.bump();
                self.bump();
                continue;
            }
            break;
        }

        self.finish_node(); // NAMED_TYPE
    }

    fn parse_type_arg_list(&mut self) {
        self.start_node(CsSyntaxKind::TypeArgList);
        self.bump(); // <

        loop {
            match self.current() {
                CsSyntaxKind::Gt => {
                    self.bump();
                    break;
                }
                CsSyntaxKind::Comma => self.bump(),
                _ if self.scan_type(self.pos).is_some() => self.parse_type(),
                _ => {
                    self.error_here(ParseErrorKind::Expected, "expected `>`");
                    break;
                }
            }
        }

        self.finish_node(); // TYPE_ARG_LIST
    }

    fn parse_tuple_type(&mut self) {
        self.start_node(CsSyntaxKind::TupleType);
        self.bump(); // (

        loop {
            self.start_node(CsSyntaxKind::TupleElement);
            self.parse_type();
            if self.at(CsSyntaxKind::Ident) {
                self.bump();
            }
            self.finish_node();

            if self.at(CsSyntaxKind::Comma) {
                self.bump();
                continue;
            }
            break;
        }

        self.expect(CsSyntaxKind::RParen, "`)`");
        self.finish_node(); // TUPLE_TYPE
    }

    // ========================================================================
    // Lookahead (never emits)
    // ========================================================================

    /// Index just past the type starting at `start`, if there is one
    fn scan_type(&self, start: usize) -> Option<usize> {
        let mut i = start;
        if self.kind_at(i) == CsSyntaxKind::RefKw {
            i += 1;
            if self.kind_at(i) == CsSyntaxKind::ReadonlyKw {
                i += 1;
            }
        }

        let mut i = match self.kind_at(i) {
            kind if kind.is_predefined_type() => i + 1,
            CsSyntaxKind::LParen => self.scan_tuple_type(i)?,
            CsSyntaxKind::Ident => self.scan_named_type(i)?,
            _ => return None,
        };

        loop {
            match self.kind_at(i) {
                CsSyntaxKind::Question | CsSyntaxKind::Star => i += 1,
                CsSyntaxKind::LBracket => match self.scan_rank_specifier(i) {
                    Some(end) => i = end,
                    None => return Some(i),
                },
                _ => return Some(i),
            }
        }
    }

    fn scan_named_type(&self, start: usize) -> Option<usize> {
        let mut i = start + 1;
        if self.kind_at(i) == CsSyntaxKind::ColonColon {
            if self.kind_at(i + 1) != CsSyntaxKind::Ident {
                return None;
            }
            i += 2;
        }
        loop {
            if self.kind_at(i) == CsSyntaxKind::Lt {
                i = self.scan_type_arg_list(i)?;
            }
            if self.kind_at(i) == CsSyntaxKind::Dot && self.kind_at(i + 1) == CsSyntaxKind::Ident
            {
                i += 2;
                continue;
            }
            return Some(i);
        }
    }

    fn scan_type_arg_list(&self, start: usize) -> Option<usize> {
        let mut i = self.scan_type(start + 1)?;
        while self.kind_at(i) == CsSyntaxKind::Comma {
            i = self.scan_type(i + 1)?;
        }
        (self.kind_at(i) == CsSyntaxKind::Gt).then_some(i + 1)
    }

    /// Grammar: '(' <type> <ident>? (',' <type> <ident>?)+ ')'
    fn scan_tuple_type(&self, start: usize) -> Option<usize> {
        let mut i = start + 1;
        let mut elements = 0;
        loop {
            i = self.scan_type(i)?;
            if self.kind_at(i) == CsSyntaxKind::Ident {
                i += 1;
            }
            elements += 1;
            match self.kind_at(i) {
                CsSyntaxKind::Comma => i += 1,
                CsSyntaxKind::RParen => return (elements >= 2).then_some(i + 1),
                _ => return None,
            }
        }
    }

    /// Grammar: '[' ','* ']'
    fn scan_rank_specifier(&self, start: usize) -> Option<usize> {
        let mut i = start + 1;
        while self.kind_at(i) == CsSyntaxKind::Comma {
            i += 1;
        }
        (self.kind_at(i) == CsSyntaxKind::RBracket).then_some(i + 1)
    }

    /// Skip a member name (`Name`, `IFoo.Name`, `IFoo<T>.Name`, `IFoo.this`)
    ///
    /// Returns the index of the first token after the name; for an explicit
    /// interface indexer that is the index of `this`.
    fn scan_member_name(&self, start: usize) -> usize {
        let mut i = start + 1;
        loop {
            if self.kind_at(i) == CsSyntaxKind::Lt {
                match self.scan_type_arg_list(i) {
                    Some(end) if self.kind_at(end) == CsSyntaxKind::Dot => i = end,
                    _ => return i,
                }
            }
            if self.kind_at(i) != CsSyntaxKind::Dot {
                return i;
            }
            match self.kind_at(i + 1) {
                CsSyntaxKind::Ident => i += 2,
                CsSyntaxKind::ThisKw => return i + 1,
                _ => return i,
            }
        }
    }

    fn at_modifier(&self) -> bool {
        let kind = self.current();
        if kind.is_modifier() {
            return true;
        }
        match kind {
            // `ref struct` and `ref partial struct`
            CsSyntaxKind::RefKw => {
                self.nth(1) == CsSyntaxKind::StructKw || self.at_contextual(1, "partial")
            }
            CsSyntaxKind::Ident => {
                CONTEXTUAL_MODIFIERS.contains(&self.current_text())
                    && (self.nth(1) == CsSyntaxKind::Ident || self.nth(1).is_keyword())
            }
            _ => false,
        }
    }

    fn at_parameter_modifier(&self) -> bool {
        match self.current() {
            CsSyntaxKind::RefKw
            | CsSyntaxKind::OutKw
            | CsSyntaxKind::InKw
            | CsSyntaxKind::ParamsKw
            | CsSyntaxKind::ThisKw
            | CsSyntaxKind::ReadonlyKw => true,
            CsSyntaxKind::Ident => {
                self.current_text() == "scoped"
                    && (self.nth(1) == CsSyntaxKind::Ident || self.nth(1).is_keyword())
            }
            _ => false,
        }
    }

    /// `[assembly: ...]` or `[module: ...]`
    fn at_global_attribute_list(&self) -> bool {
        self.at(CsSyntaxKind::LBracket)
            && (self.at_contextual(1, "assembly") || self.at_contextual(1, "module"))
            && self.nth(2) == CsSyntaxKind::Colon
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn kind_at(&self, index: usize) -> CsSyntaxKind {
        self.significant
            .get(index)
            .and_then(|s| s.token)
            .map_or(CsSyntaxKind::Eof, |t| self.tokens[t].kind)
    }

    fn text_at(&self, index: usize) -> &'t str {
        let tokens = self.tokens;
        self.significant
            .get(index)
            .and_then(|s| s.token)
            .map_or("", |t| tokens[t].text.as_str())
    }

    fn nth(&self, n: usize) -> CsSyntaxKind {
        self.kind_at(self.pos + n)
    }

    fn current(&self) -> CsSyntaxKind {
        self.nth(0)
    }

    fn current_text(&self) -> &'t str {
        self.text_at(self.pos)
    }

    fn at(&self, kind: CsSyntaxKind) -> bool {
        self.current() == kind
    }

    fn at_end(&self) -> bool {
        self.at(CsSyntaxKind::Eof)
    }

    /// Whether the token `n` ahead is the identifier `text`
    fn at_contextual(&self, n: usize, text: &str) -> bool {
        self.nth(n) == CsSyntaxKind::Ident && self.text_at(self.pos + n) == text
    }

    /// Emit the current token with its leading and trailing trivia
    fn bump(&mut self) {
        let Some(significant) = self.significant.get(self.pos) else {
            return;
        };
        let Some(token) = significant.token else {
            return;
        };
        let (leading, trailing) = (significant.leading.clone(), significant.trailing.clone());

        let tokens = self.tokens;
        for trivia in &tokens[leading] {
            self.push_token(trivia);
        }
        self.push_token(&tokens[token]);
        for trivia in &tokens[trailing] {
            self.push_token(trivia);
        }
        self.pos += 1;
    }

    fn bump_to(&mut self, end: usize) {
        while self.pos < end && !self.at_end() {
            self.bump();
        }
    }

    /// Bump tokens until `stop` matches at nesting depth zero
    ///
    /// An unmatched closing bracket at depth zero belongs to the enclosing
    /// construct and ends the run without being consumed.
    fn bump_balanced_until(&mut self, stop: impl Fn(CsSyntaxKind) -> bool) {
        let mut open: Vec<CsSyntaxKind> = Vec::new();
        loop {
            let current = self.current();
            if current == CsSyntaxKind::Eof {
                if !open.is_empty() {
                    self.error_here(ParseErrorKind::UnexpectedEof, "unexpected end of file");
                }
                return;
            }
            if open.is_empty() && stop(current) {
                return;
            }
            match current {
                CsSyntaxKind::LParen | CsSyntaxKind::LBracket | CsSyntaxKind::LBrace => {
                    open.push(closer_of(current));
                }
                CsSyntaxKind::RParen | CsSyntaxKind::RBracket | CsSyntaxKind::RBrace => {
                    if open.last() == Some(&current) {
                        open.pop();
                    } else if open.is_empty() {
                        return;
                    } else {
                        let message = format!("unexpected `{}`", self.current_text());
                        self.error_here(ParseErrorKind::Unexpected, &message);
                    }
                }
                _ => {}
            }
            self.bump();
        }
    }

    fn push_token(&mut self, token: &CstToken) {
        self.builder.token(token.kind.into(), &token.text);
    }

    fn expect(&mut self, kind: CsSyntaxKind, what: &str) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            self.error_here(ParseErrorKind::Expected, &format!("expected {what}"));
            false
        }
    }

    /// Wrap the offending token in an error node and report it
    fn bump_error(&mut self, message: &str) {
        self.error_here(ParseErrorKind::Unexpected, message);
        self.start_node(CsSyntaxKind::Error);
        self.bump();
        self.finish_node();
    }

    fn error_here(&mut self, kind: ParseErrorKind, message: &str) {
        let range = self
            .significant
            .get(self.pos)
            .and_then(|s| s.token)
            .map_or_else(
                || {
                    let end = TextSize::new(self.source_len as u32);
                    TextRange::empty(end)
                },
                |t| text_range(&self.tokens[t].span),
            );
        self.errors.push(ParseError::new(kind, message, range));
    }

    fn start_node(&mut self, kind: CsSyntaxKind) {
        self.builder.start_node(kind.into());
    }

    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: CsSyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }
}

fn closer_of(open: CsSyntaxKind) -> CsSyntaxKind {
    match open {
        CsSyntaxKind::LParen => CsSyntaxKind::RParen,
        CsSyntaxKind::LBracket => CsSyntaxKind::RBracket,
        _ => CsSyntaxKind::RBrace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> CsSyntaxNode {
        let parse = parse_csharp(source);
        assert!(parse.ok(), "unexpected errors: {:?}", parse.errors());
        let root = parse.syntax();
        assert_eq!(root.text().to_string(), source, "parse must be lossless");
        root
    }

    fn kinds_of(root: &CsSyntaxNode, kind: CsSyntaxKind) -> usize {
        root.descendants().filter(|n| n.kind() == kind).count()
    }

    #[test]
    fn test_top_level_method() {
        let root = parse_ok("[CanBeNull] public string Foo();");
        let method = root.children().next();
        assert_eq!(method.map(|m| m.kind()), Some(CsSyntaxKind::MethodDecl));
        assert_eq!(kinds_of(&root, CsSyntaxKind::AttributeList), 1);
        assert_eq!(kinds_of(&root, CsSyntaxKind::PredefinedType), 1);
    }

    #[test]
    fn test_attribute_list_owns_exterior_trivia() {
        let root = parse_ok("class C {\n    /// Comment\n    [CanBeNull]\n    string Foo() => \"hello\";\n}\n");
        let list = root
            .descendants()
            .find(|n| n.kind() == CsSyntaxKind::AttributeList);
        let Some(list) = list else {
            panic!("attribute list not found");
        };
        assert_eq!(list.text().to_string(), "    /// Comment\n    [CanBeNull]\n");
    }

    #[test]
    fn test_parameter_structure() {
        let root = parse_ok("void Foo([CanBeNull] string s, int x = 0, object o = null);");
        assert_eq!(kinds_of(&root, CsSyntaxKind::Parameter), 3);
        assert_eq!(kinds_of(&root, CsSyntaxKind::LiteralExpr), 1);
        assert_eq!(kinds_of(&root, CsSyntaxKind::Expr), 1);
    }

    #[test]
    fn test_null_forgiving_default_is_not_a_literal() {
        let root = parse_ok("void Foo(string s = null!);");
        assert_eq!(kinds_of(&root, CsSyntaxKind::LiteralExpr), 0);
        assert_eq!(kinds_of(&root, CsSyntaxKind::Expr), 1);
    }

    #[test]
    fn test_constructor_only_inside_type_body() {
        let root = parse_ok("class C {\n    public C([CanBeNull] string s) : base(s) {}\n}\n");
        assert_eq!(kinds_of(&root, CsSyntaxKind::ConstructorDecl), 1);
        assert_eq!(kinds_of(&root, CsSyntaxKind::ConstructorInitializer), 1);

        let root = parse_ok("Foo(x);");
        assert_eq!(kinds_of(&root, CsSyntaxKind::ConstructorDecl), 0);
        assert_eq!(kinds_of(&root, CsSyntaxKind::OpaqueMember), 1);
    }

    #[test]
    fn test_indexer() {
        let root = parse_ok("class C {\n    public int this[[CanBeNull] string s] => 3;\n}\n");
        assert_eq!(kinds_of(&root, CsSyntaxKind::IndexerDecl), 1);
        assert_eq!(kinds_of(&root, CsSyntaxKind::BracketedParameterList), 1);
    }

    #[test]
    fn test_indexer_arrow_body_requires_semicolon() {
        let source = "class C {\n    public int this[string s] => 3\n}";
        let parse = parse_csharp(source);
        assert!(!parse.ok());
        assert_eq!(parse.syntax().text().to_string(), source);
    }

    #[test]
    fn test_types() {
        let root = parse_ok(
            "class C {\n    Dictionary<string, List<int?>>[] A(ref int b, (int x, string y) t, int* p) { return null; }\n}\n",
        );
        assert_eq!(kinds_of(&root, CsSyntaxKind::ArrayType), 1);
        assert_eq!(kinds_of(&root, CsSyntaxKind::NullableType), 1);
        assert_eq!(kinds_of(&root, CsSyntaxKind::TupleType), 1);
        assert_eq!(kinds_of(&root, CsSyntaxKind::PointerType), 1);
        assert_eq!(kinds_of(&root, CsSyntaxKind::TypeArgList), 2);
    }

    #[test]
    fn test_namespaces_and_members() {
        let source = r#"using System;
[assembly: InternalsVisibleTo("Tests")]

namespace A.B
{
    public partial class C<T> : Base where T : class
    {
        private readonly string _name = "x";
        public string Name { get; set; } = null;
        public event EventHandler Changed;
        public static C<T> operator +(C<T> a, C<T> b) => a;
        ~C() { }
        public enum Kind { One, Two }
        internal T Get<U>(U value) where U : struct { return default; }
        string IFoo.Bar(int x) => "";
    }
}
"#;
        let root = parse_ok(source);
        assert_eq!(kinds_of(&root, CsSyntaxKind::UsingDirective), 1);
        assert_eq!(kinds_of(&root, CsSyntaxKind::NamespaceDecl), 1);
        assert_eq!(kinds_of(&root, CsSyntaxKind::TypeDecl), 1);
        assert_eq!(kinds_of(&root, CsSyntaxKind::FieldDecl), 1);
        assert_eq!(kinds_of(&root, CsSyntaxKind::PropertyDecl), 1);
        assert_eq!(kinds_of(&root, CsSyntaxKind::EnumDecl), 1);
        assert_eq!(kinds_of(&root, CsSyntaxKind::MethodDecl), 2);
        assert_eq!(kinds_of(&root, CsSyntaxKind::OpaqueMember), 3);
    }

    #[test]
    fn test_file_scoped_namespace() {
        let root = parse_ok("namespace N;\n\npublic class C { void M() { } }\n");
        assert_eq!(kinds_of(&root, CsSyntaxKind::FileScopedNamespaceDecl), 1);
        assert_eq!(kinds_of(&root, CsSyntaxKind::MethodDecl), 1);
    }

    #[test]
    fn test_invalid_input_stays_lossless() {
        let sources = [
            "class C {",
            "}}} void Foo(",
            "void Foo([CanBeNull string s);",
            "\"unterminated",
            "class C { void M() { ( ] } }",
        ];
        for source in sources {
            let parse = parse_csharp(source);
            assert!(!parse.ok(), "expected errors for {source:?}");
            assert_eq!(parse.syntax().text().to_string(), source);
        }
    }

    #[test]
    fn test_directives_and_comments_are_trivia() {
        let root = parse_ok("#nullable enable\n/* a */ void Foo(); // b\n#if DEBUG\nvoid Bar();\n#endif\n");
        assert_eq!(kinds_of(&root, CsSyntaxKind::MethodDecl), 2);
    }
}
