//! Concrete Syntax Tree (CST) for C#
//!
//! This module implements a lossless syntax tree using the Rowan library.
//! The CST preserves all source information including whitespace, comments,
//! and preprocessor lines, which is what lets the rewriter edit attributes
//! and types without disturbing anything else in the file.
//!
//! ## Architecture
//!
//! The CST uses Rowan's green/red tree pattern:
//!
//! - **Green Tree**: Immutable, position-independent storage
//!   - Stores actual source text with trivia
//!   - Cheap to clone (uses Arc internally)
//!   - Edits produce a new root that shares every untouched subtree
//!
//! - **Red Tree**: Dynamically constructed view with parent pointers
//!   - Created on-demand for traversal
//!   - Provides the typed API in [`ast`]
//!
//! Only the declaration-level part of C# is modelled (namespaces, types,
//! methods, constructors, indexers, parameters, attributes and types).
//! Method bodies, initializers and other members are kept as balanced,
//! opaque token runs.
//!
//! ## Example
//!
//! ```rust,ignore
//! use nullinate_core::cst::{parse_csharp, CsSyntaxKind};
//!
//! let parse = parse_csharp("[CanBeNull] string Foo(); // comment\n");
//! assert!(parse.ok());
//! assert_eq!(parse.syntax().text().to_string(), "[CanBeNull] string Foo(); // comment\n");
//! ```

mod language;
mod lexer;
mod parser;
mod syntax_kind;

pub mod ast;
pub mod trivia;

pub use language::CsLanguage;
pub use lexer::{CstLexResult, CstSpan, CstToken, LexerError, lex_with_trivia};
pub use parser::{Parse, ParseError, ParseErrorKind, parse_csharp};
pub use syntax_kind::CsSyntaxKind;

/// Red tree node over [`CsLanguage`]
pub type CsSyntaxNode = rowan::SyntaxNode<CsLanguage>;
/// Red tree token over [`CsLanguage`]
pub type CsSyntaxToken = rowan::SyntaxToken<CsLanguage>;
/// Either a node or a token
pub type CsSyntaxElement = rowan::SyntaxElement<CsLanguage>;

/// 1-based `(line, column)` of a byte offset; columns count characters
pub fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let mut end = offset.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let before = &text[..end];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    (line, before[line_start..].chars().count() + 1)
}

/// 1-based `(line, column)` of the start of `token` within its tree
///
/// Agrees with [`line_column`] on the tree's text, but walks the preceding
/// tokens instead of serializing the tree.
pub fn token_line_column(token: &CsSyntaxToken) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    let mut on_token_line = true;
    let mut current = token.prev_token();
    while let Some(prev) = current {
        let text = prev.text();
        if on_token_line {
            match text.rfind('\n') {
                Some(i) => {
                    column += text[i + 1..].chars().count();
                    on_token_line = false;
                }
                None => column += text.chars().count(),
            }
        }
        line += text.matches('\n').count();
        current = prev.prev_token();
    }
    (line, column)
}
