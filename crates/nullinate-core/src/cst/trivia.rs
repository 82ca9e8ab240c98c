//! Trivia handling for the C# CST
//!
//! Trivia ownership follows the usual convention for C# trees: a token owns
//! the trivia after it up to and including the first line break (its
//! trailing trivia), and everything else in front of the next token is that
//! token's leading trivia. Trivia at the end of the file belongs to the
//! end-of-file marker.
//!
//! The parser emits leading trivia, the token, then trailing trivia into the
//! same node, so the first and last children of any node are its exterior
//! trivia. The helpers at the bottom of this module detach that exterior
//! trivia from a green subtree, which is what type wrapping needs.

use std::ops::Range;

use rowan::{GreenNode, GreenNodeData, GreenToken, Language, NodeOrToken};

use super::{CsLanguage, CsSyntaxKind, CstToken};

/// An owned green element
pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;

/// The four-way trivia classification used by the rewriter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriviaKind {
    Whitespace,
    EndOfLine,
    Comment,
    /// Preprocessor directives
    Other,
}

impl TriviaKind {
    /// Classify a syntax kind, `None` for anything that is not trivia
    pub fn of(kind: CsSyntaxKind) -> Option<Self> {
        match kind {
            CsSyntaxKind::Whitespace => Some(Self::Whitespace),
            CsSyntaxKind::Newline => Some(Self::EndOfLine),
            CsSyntaxKind::LineComment | CsSyntaxKind::DocComment | CsSyntaxKind::BlockComment => {
                Some(Self::Comment)
            }
            CsSyntaxKind::Directive => Some(Self::Other),
            _ => None,
        }
    }

    /// Classify a green token
    pub fn of_green(token: &GreenToken) -> Option<Self> {
        Self::of(green_token_kind(token))
    }
}

/// A significant token together with the trivia it owns
///
/// All ranges index into the lexer's token vector. The final entry of
/// [`attach_trivia`] has `token: None` and represents end of file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignificantToken {
    pub leading: Range<usize>,
    pub token: Option<usize>,
    pub trailing: Range<usize>,
}

/// Group a lossless token stream into significant tokens with their trivia
pub fn attach_trivia(tokens: &[CstToken]) -> Vec<SignificantToken> {
    let mut result = Vec::new();
    let mut i = 0;

    loop {
        let leading_start = i;
        while i < tokens.len() && tokens[i].kind.is_trivia() {
            i += 1;
        }
        let leading = leading_start..i;

        if i == tokens.len() {
            result.push(SignificantToken {
                leading,
                token: None,
                trailing: i..i,
            });
            return result;
        }

        let token = i;
        i += 1;

        let trailing_start = i;
        while i < tokens.len() && tokens[i].kind.is_trivia() {
            let kind = tokens[i].kind;
            i += 1;
            if kind == CsSyntaxKind::Newline {
                break;
            }
        }

        result.push(SignificantToken {
            leading,
            token: Some(token),
            trailing: trailing_start..i,
        });
    }
}

pub fn green_token_kind(token: &GreenToken) -> CsSyntaxKind {
    CsLanguage::kind_from_raw(token.kind())
}

pub fn is_trivia_element(element: &GreenElement) -> bool {
    match element {
        NodeOrToken::Token(token) => green_token_kind(token).is_trivia(),
        NodeOrToken::Node(_) => false,
    }
}

/// Owned copies of the children of a green node
pub fn green_children(node: &GreenNodeData) -> Vec<GreenElement> {
    node.children()
        .map(|child| match child {
            NodeOrToken::Node(node) => NodeOrToken::Node(node.to_owned()),
            NodeOrToken::Token(token) => NodeOrToken::Token(token.to_owned()),
        })
        .collect()
}

/// Detach the leading trivia of a green subtree
///
/// The trivia may sit several levels down (a nullable type's first token lives
/// inside the wrapped type); it is removed where it is found and returned in
/// source order together with the stripped node.
pub fn split_leading_trivia(node: &GreenNodeData) -> (Vec<GreenToken>, GreenNode) {
    let mut children = green_children(node);
    let mut trivia = Vec::new();

    while let Some(first) = children.first() {
        match first {
            NodeOrToken::Token(token) if green_token_kind(token).is_trivia() => {
                trivia.push(token.clone());
                children.remove(0);
            }
            NodeOrToken::Node(child) => {
                let (inner, stripped) = split_leading_trivia(child);
                trivia.extend(inner);
                children[0] = NodeOrToken::Node(stripped);
                break;
            }
            NodeOrToken::Token(_) => break,
        }
    }

    (trivia, GreenNode::new(node.kind(), children))
}

/// Detach the trailing trivia of a green subtree, see [`split_leading_trivia`]
pub fn split_trailing_trivia(node: &GreenNodeData) -> (Vec<GreenToken>, GreenNode) {
    let mut children = green_children(node);
    let mut trivia = Vec::new();

    while let Some(last) = children.last() {
        match last {
            NodeOrToken::Token(token) if green_token_kind(token).is_trivia() => {
                trivia.push(token.clone());
                children.pop();
            }
            NodeOrToken::Node(child) => {
                let (inner, stripped) = split_trailing_trivia(child);
                trivia.extend(inner.into_iter().rev());
                if let Some(slot) = children.last_mut() {
                    *slot = NodeOrToken::Node(stripped);
                }
                break;
            }
            NodeOrToken::Token(_) => break,
        }
    }

    trivia.reverse();
    (trivia, GreenNode::new(node.kind(), children))
}
