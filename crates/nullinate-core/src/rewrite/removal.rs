//! Trivia-preserving removal of marker attributes
//!
//! A marker that shares its group with other attributes is cut out of the
//! group together with one separating comma. A marker alone in its group
//! takes the whole group with it, and the group's exterior trivia is
//! normalized so the deletion leaves neither a blank line nor a stray run of
//! spaces behind.

use rowan::{GreenNode, GreenToken, NodeOrToken};

use super::markers::Marker;
use crate::cst::ast::{AstNode, Attribute, AttributeList};
use crate::cst::trivia::{
    GreenElement, TriviaKind, green_children, green_token_kind, is_trivia_element,
};
use crate::cst::{CsSyntaxKind, CsSyntaxNode, CsSyntaxToken};

/// Why a removal was refused; turned into a located error by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RemovalError {
    UnsupportedTrivia(String),
    MalformedAttribute(String),
}

/// Remove the first `marker` attribute among the attribute lists of `owner`
///
/// `owner` is the declaration or parameter whose own attribute lists are
/// searched. `owner_starts_line` tells whether only whitespace stands between
/// the owner and the start of its line in the full file; see
/// [`owner_starts_line`]. Returns the rebuilt owner, or `None` when it has no
/// such marker.
pub(crate) fn remove_marker(
    owner: &CsSyntaxNode,
    marker: Marker,
    owner_starts_line: bool,
) -> Result<Option<GreenNode>, RemovalError> {
    let lists = owner.children().filter_map(AttributeList::cast);
    let Some(attribute) = marker.find_in(lists) else {
        return Ok(None);
    };
    let Some(list) = attribute.list() else {
        return Err(RemovalError::MalformedAttribute(format!(
            "`{marker}` is not inside an attribute list"
        )));
    };

    let green = if list.attributes().count() > 1 {
        let new_list = remove_from_group(&list, &attribute, marker)?;
        owner
            .green()
            .replace_child(list.syntax().index(), NodeOrToken::Node(new_list))
    } else {
        remove_group(owner, &list, owner_starts_line)?
    };
    Ok(Some(green))
}

/// Cut one attribute out of a multi-attribute group
fn remove_from_group(
    list: &AttributeList,
    attribute: &Attribute,
    marker: Marker,
) -> Result<GreenNode, RemovalError> {
    let children = green_children(&list.syntax().green());
    let at = attribute.syntax().index();

    let next = (at + 1..children.len()).find(|&i| !is_trivia_element(&children[i]));
    let range = match next {
        // `A, B` -> `B`: drop the comma and the trivia it owns
        Some(comma) if is_token(&children[comma], CsSyntaxKind::Comma) => {
            let mut end = comma + 1;
            while end < children.len() && is_trivia_element(&children[end]) {
                end += 1;
            }
            at..end
        }
        // Last attribute: `A, B` -> `A`
        _ => match (0..at).rev().find(|&i| !is_trivia_element(&children[i])) {
            Some(comma) if is_token(&children[comma], CsSyntaxKind::Comma) => comma..at + 1,
            _ => {
                return Err(RemovalError::MalformedAttribute(format!(
                    "`{marker}` is not separated from its neighbours by a comma"
                )));
            }
        },
    };

    Ok(list
        .syntax()
        .green()
        .splice_children(range, Vec::<GreenElement>::new()))
}

/// Remove a group holding only the marker, normalizing its exterior trivia
fn remove_group(
    owner: &CsSyntaxNode,
    list: &AttributeList,
    owner_starts_line: bool,
) -> Result<GreenNode, RemovalError> {
    let children = green_children(&list.syntax().green());

    let open = children.iter().position(|c| !is_trivia_element(c));
    let close = children.iter().rposition(|c| !is_trivia_element(c));
    let (Some(open), Some(close)) = (open, close) else {
        return Err(RemovalError::UnsupportedTrivia(
            "attribute list has no tokens".to_string(),
        ));
    };
    if !is_token(&children[open], CsSyntaxKind::LBracket)
        || !is_token(&children[close], CsSyntaxKind::RBracket)
    {
        return Err(RemovalError::UnsupportedTrivia(
            "attribute list is not delimited by `[` and `]`".to_string(),
        ));
    }
    let Some(open_token) = list
        .syntax()
        .children_with_tokens()
        .nth(open)
        .and_then(|e| e.into_token())
    else {
        return Err(RemovalError::UnsupportedTrivia(
            "cannot find the token before the attribute list".to_string(),
        ));
    };

    let mut leading = trivia_tokens(&children[..open]);
    let mut trailing = trivia_tokens(&children[close + 1..]);

    // Whitespace right after the group goes with it
    let spaces = trailing
        .iter()
        .take_while(|t| is_trivia_kind(t, TriviaKind::Whitespace))
        .count();
    trailing.drain(..spaces);

    // The previous token's trailing trivia holds the line break when the
    // group starts a line, so look past the group's own leading trivia
    let first_on_line = starts_line(open_token.prev_token()).unwrap_or(owner_starts_line);
    let last_on_line = trailing
        .first()
        .is_some_and(|t| is_trivia_kind(t, TriviaKind::EndOfLine));

    // The group had a line to itself: drop that line with its indentation
    if first_on_line && last_on_line {
        trailing.remove(0);
        while leading
            .last()
            .is_some_and(|t| is_trivia_kind(t, TriviaKind::Whitespace))
        {
            leading.pop();
        }
    }

    let retained: Vec<GreenElement> = leading
        .into_iter()
        .chain(trailing)
        .map(NodeOrToken::Token)
        .collect();

    let owner_green = owner.green();
    let mut elements = green_children(&owner_green);
    let index = list.syntax().index();

    // The group ended a line it shared with an earlier group: that group's
    // trailing spaces now end the line
    if last_on_line
        && !first_on_line
        && index > 0
        && let NodeOrToken::Node(prev) = &elements[index - 1]
    {
        let trimmed = trim_trailing_whitespace(prev);
        elements[index - 1] = NodeOrToken::Node(trimmed);
    }

    // Retained trivia moves to the front of the next node when there is one,
    // otherwise it stays where the group was
    let (end, replacement) = match elements.get(index + 1) {
        Some(NodeOrToken::Node(next)) => (
            index + 2,
            vec![NodeOrToken::Node(next.splice_children(0..0, retained))],
        ),
        _ => (index + 1, retained),
    };
    elements.splice(index..end, replacement);
    Ok(GreenNode::new(owner_green.kind(), elements))
}

/// Whether the node starts its line in the full file, or starts the file
///
/// Looks back from just before `original`, which must be the node's place in
/// the parsed tree rather than a detached copy.
pub(crate) fn owner_starts_line(original: &CsSyntaxNode) -> bool {
    starts_line(original.first_token().and_then(|t| t.prev_token())).unwrap_or(true)
}

/// Walk back from `token` over whitespace: `Some(true)` at a line break,
/// `Some(false)` at a comment or real token, `None` when the tree runs out
fn starts_line(token: Option<CsSyntaxToken>) -> Option<bool> {
    let mut current = token;
    while let Some(token) = current {
        match TriviaKind::of(token.kind()) {
            Some(TriviaKind::Whitespace) => current = token.prev_token(),
            Some(TriviaKind::EndOfLine) => return Some(true),
            _ => return Some(false),
        }
    }
    None
}

fn trim_trailing_whitespace(node: &GreenNode) -> GreenNode {
    let children = green_children(node);
    let spaces = children
        .iter()
        .rev()
        .take_while(|c| matches!(c, NodeOrToken::Token(t) if is_trivia_kind(t, TriviaKind::Whitespace)))
        .count();
    node.splice_children(children.len() - spaces..children.len(), Vec::<GreenElement>::new())
}

fn trivia_tokens(elements: &[GreenElement]) -> Vec<GreenToken> {
    elements
        .iter()
        .filter_map(|e| match e {
            NodeOrToken::Token(token) => Some(token.clone()),
            NodeOrToken::Node(_) => None,
        })
        .collect()
}

fn is_token(element: &GreenElement, kind: CsSyntaxKind) -> bool {
    matches!(element, NodeOrToken::Token(token) if green_token_kind(token) == kind)
}

fn is_trivia_kind(token: &GreenToken, kind: TriviaKind) -> bool {
    TriviaKind::of_green(token) == Some(kind)
}
