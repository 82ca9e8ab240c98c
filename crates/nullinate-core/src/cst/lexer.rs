//! CST-aware lexer that preserves all trivia (whitespace, comments, directives)
//!
//! Every byte of the input ends up in exactly one token, so concatenating the
//! token texts reproduces the source. Comments never include their line
//! break: newlines are always separate `Newline` tokens, which is what the
//! trivia rules of the parser and the rewriter rely on.

use crate::cst::CsSyntaxKind;
use std::ops::Range;

/// Simple span representing a byte range in the source
pub type CstSpan = Range<usize>;

/// A lexer error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub message: String,
    pub span: CstSpan,
}

impl LexerError {
    pub fn new(message: impl Into<String>, span: CstSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// A token with its syntax kind and span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstToken {
    pub kind: CsSyntaxKind,
    pub text: String,
    pub span: CstSpan,
}

impl CstToken {
    pub fn new(kind: CsSyntaxKind, text: impl Into<String>, span: CstSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

/// Result returned by the CST lexer
pub type CstLexResult = (Vec<CstToken>, Vec<LexerError>);

/// Lex C# source preserving ALL trivia for CST construction
pub fn lex_with_trivia(input: &str) -> CstLexResult {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut i = 0usize;
    // Directives are only recognised when `#` is the first non-blank character of a line
    let mut at_line_start = true;

    while i < len {
        let Some((current, size)) = next_char(input, i) else {
            break;
        };
        let start = i;

        let (kind, end) = match current {
            '\n' => (CsSyntaxKind::Newline, i + size),
            '\r' => {
                let mut end = i + size;
                if let Some(('\n', nl_size)) = next_char(input, end) {
                    end += nl_size;
                }
                (CsSyntaxKind::Newline, end)
            }
            c if is_horizontal_whitespace(c) => {
                let mut end = i + size;
                while let Some((next_ch, next_size)) = next_char(input, end) {
                    if !is_horizontal_whitespace(next_ch) {
                        break;
                    }
                    end += next_size;
                }
                (CsSyntaxKind::Whitespace, end)
            }
            '#' if at_line_start => (CsSyntaxKind::Directive, line_end(input, start)),
            '/' if bytes.get(i + 1) == Some(&b'/') => {
                let end = line_end(input, start);
                let text = &input[start..end];
                let kind = if text.starts_with("///") && !text.starts_with("////") {
                    CsSyntaxKind::DocComment
                } else {
                    CsSyntaxKind::LineComment
                };
                (kind, end)
            }
            '/' if bytes.get(i + 1) == Some(&b'*') => match input[i + 2..].find("*/") {
                Some(rel) => (CsSyntaxKind::BlockComment, i + 2 + rel + 2),
                None => {
                    errors.push(LexerError::new(
                        "Unterminated block comment",
                        span(start, len),
                    ));
                    (CsSyntaxKind::BlockComment, len)
                }
            },
            '"' => string_token(input, start, &mut errors),
            '$' | '@' if is_string_start(bytes, i) => string_token(input, start, &mut errors),
            '@' if next_char(input, i + size).is_some_and(|(c, _)| is_ident_start(c)) => {
                // Verbatim identifier (`@class`), never a keyword
                (CsSyntaxKind::Ident, ident_end(input, i + size))
            }
            '\'' => {
                let (end, error) = lex_char_literal(input, start);
                if let Some(err) = error {
                    errors.push(err);
                }
                (CsSyntaxKind::CharLiteral, end)
            }
            c if c.is_ascii_digit() => (CsSyntaxKind::NumberLiteral, number_end(input, start)),
            '.' if bytes.get(i + 1).is_some_and(u8::is_ascii_digit) => {
                (CsSyntaxKind::NumberLiteral, number_end(input, start))
            }
            c if is_ident_start(c) => {
                let end = ident_end(input, start);
                let kind = CsSyntaxKind::from_keyword(&input[start..end])
                    .unwrap_or(CsSyntaxKind::Ident);
                (kind, end)
            }
            '{' => (CsSyntaxKind::LBrace, i + size),
            '}' => (CsSyntaxKind::RBrace, i + size),
            '(' => (CsSyntaxKind::LParen, i + size),
            ')' => (CsSyntaxKind::RParen, i + size),
            '[' => (CsSyntaxKind::LBracket, i + size),
            ']' => (CsSyntaxKind::RBracket, i + size),
            ';' => (CsSyntaxKind::Semicolon, i + size),
            ',' => (CsSyntaxKind::Comma, i + size),
            '.' => (CsSyntaxKind::Dot, i + size),
            '~' => (CsSyntaxKind::Tilde, i + size),
            '?' => (CsSyntaxKind::Question, i + size),
            ':' => {
                if bytes.get(i + 1) == Some(&b':') {
                    (CsSyntaxKind::ColonColon, i + 2)
                } else {
                    (CsSyntaxKind::Colon, i + size)
                }
            }
            '=' => match bytes.get(i + 1) {
                Some(b'>') => (CsSyntaxKind::FatArrow, i + 2),
                Some(b'=') => (CsSyntaxKind::Operator, i + 2),
                _ => (CsSyntaxKind::Eq, i + size),
            },
            // `<` and `>` stay single characters so nested generics (`List<List<int>>`)
            // close one bracket at a time
            '<' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    (CsSyntaxKind::Operator, i + 2)
                } else {
                    (CsSyntaxKind::Lt, i + size)
                }
            }
            '>' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    (CsSyntaxKind::Operator, i + 2)
                } else {
                    (CsSyntaxKind::Gt, i + size)
                }
            }
            '*' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    (CsSyntaxKind::Operator, i + 2)
                } else {
                    (CsSyntaxKind::Star, i + size)
                }
            }
            '+' | '-' | '!' | '/' | '%' | '&' | '|' | '^' => {
                (CsSyntaxKind::Operator, operator_end(bytes, i))
            }
            _ => {
                errors.push(LexerError::new(
                    format!("Unexpected character '{current}'"),
                    span(start, i + size),
                ));
                (CsSyntaxKind::Error, i + size)
            }
        };

        match kind {
            CsSyntaxKind::Newline => at_line_start = true,
            CsSyntaxKind::Whitespace => {}
            _ => at_line_start = false,
        }

        tokens.push(CstToken::new(kind, &input[start..end], span(start, end)));
        i = end;
    }

    (tokens, errors)
}

fn span(start: usize, end: usize) -> CstSpan {
    start..end
}

fn next_char(input: &str, index: usize) -> Option<(char, usize)> {
    input[index..].chars().next().map(|c| (c, c.len_utf8()))
}

fn is_horizontal_whitespace(c: char) -> bool {
    (c.is_whitespace() && c != '\n' && c != '\r') || c == '\u{FEFF}'
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Byte offset of the next `\r` or `\n` at or after `start` (or end of input)
fn line_end(input: &str, start: usize) -> usize {
    input[start..]
        .find(['\n', '\r'])
        .map_or(input.len(), |rel| start + rel)
}

fn ident_end(input: &str, start: usize) -> usize {
    let mut end = start;
    while let Some((c, size)) = next_char(input, end) {
        if !is_ident_continue(c) {
            break;
        }
        end += size;
    }
    end
}

fn number_end(input: &str, start: usize) -> usize {
    let bytes = input.as_bytes();
    let is_hex = input[start..].starts_with("0x") || input[start..].starts_with("0X");
    let mut end = start;
    while let Some(&b) = bytes.get(end) {
        let accept = match b {
            b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'_' => true,
            b'.' => bytes.get(end + 1).is_some_and(u8::is_ascii_digit),
            b'+' | b'-' => !is_hex && end > start && matches!(bytes[end - 1], b'e' | b'E'),
            _ => false,
        };
        if !accept {
            break;
        }
        end += 1;
    }
    end
}

fn operator_end(bytes: &[u8], start: usize) -> usize {
    let first = bytes[start];
    match bytes.get(start + 1) {
        Some(b'=') => start + 2,
        Some(&next) if next == first && matches!(first, b'+' | b'-' | b'&' | b'|') => start + 2,
        Some(b'>') if first == b'-' => start + 2,
        _ => start + 1,
    }
}

/// Whether a `$`/`@` prefix run starting at `index` introduces a string literal
fn is_string_start(bytes: &[u8], index: usize) -> bool {
    let mut i = index;
    while matches!(bytes.get(i), Some(b'$') | Some(b'@')) {
        i += 1;
    }
    i > index && bytes.get(i) == Some(&b'"')
}

fn string_token(
    input: &str,
    start: usize,
    errors: &mut Vec<LexerError>,
) -> (CsSyntaxKind, usize) {
    let (end, error) = lex_string_literal(input, start);
    if let Some(err) = error {
        errors.push(err);
    }
    (CsSyntaxKind::StringLiteral, end)
}

/// Lex any string literal form starting at `start`
///
/// Handles regular (`"a\"b"`), verbatim (`@"a""b"`), interpolated
/// (`$"{x}"`, `$@"..."`, `@$"..."`) and raw (`"""..."""`) literals. Holes of
/// interpolated strings may contain nested string literals.
fn lex_string_literal(input: &str, start: usize) -> (usize, Option<LexerError>) {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut i = start;
    let mut interpolated = false;
    let mut verbatim = false;

    loop {
        match bytes.get(i) {
            Some(b'$') => interpolated = true,
            Some(b'@') => verbatim = true,
            _ => break,
        }
        i += 1;
    }

    let quote_start = i;
    while bytes.get(i) == Some(&b'"') {
        i += 1;
    }
    let quotes = i - quote_start;

    if !verbatim && quotes >= 3 {
        let closing = "\"".repeat(quotes);
        return match input[i..].find(&closing) {
            Some(rel) => (i + rel + quotes, None),
            None => (
                len,
                Some(LexerError::new(
                    "Unterminated raw string literal",
                    span(start, len),
                )),
            ),
        };
    }
    if !verbatim && quotes == 2 {
        return (quote_start + 2, None);
    }

    let unterminated = |end: usize| {
        Some(LexerError::new(
            "Unterminated string literal",
            span(start, end),
        ))
    };

    i = quote_start + 1;
    while i < len {
        match bytes[i] {
            b'"' => {
                if verbatim && bytes.get(i + 1) == Some(&b'"') {
                    i += 2;
                    continue;
                }
                return (i + 1, None);
            }
            b'\\' if !verbatim => i += 2,
            b'\n' | b'\r' if !verbatim => return (i, unterminated(i)),
            b'{' if interpolated => {
                if bytes.get(i + 1) == Some(&b'{') {
                    i += 2;
                } else {
                    i = skip_interpolation_hole(input, i + 1);
                }
            }
            _ => i += 1,
        }
    }

    (len, unterminated(len))
}

/// Skip an interpolation hole whose opening `{` precedes `start`
///
/// Returns the offset just past the matching `}`.
fn skip_interpolation_hole(input: &str, start: usize) -> usize {
    let bytes = input.as_bytes();
    let mut depth = 1usize;
    let mut i = start;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => i = lex_string_literal(input, i).0,
            b'$' | b'@' if is_string_start(bytes, i) => i = lex_string_literal(input, i).0,
            b'\'' => i = lex_char_literal(input, i).0,
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => i += 1,
        }
    }

    bytes.len()
}

fn lex_char_literal(input: &str, start: usize) -> (usize, Option<LexerError>) {
    let bytes = input.as_bytes();
    let mut i = start + 1;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\'' => return (i + 1, None),
            b'\n' | b'\r' => break,
            _ => i += 1,
        }
    }

    let end = i.min(bytes.len());
    (
        end,
        Some(LexerError::new(
            "Unterminated character literal",
            span(start, end),
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<CsSyntaxKind> {
        let (tokens, errors) = lex_with_trivia(source);
        assert!(errors.is_empty(), "unexpected lexer errors: {errors:?}");
        tokens.into_iter().map(|t| t.kind).collect()
    }

    fn texts(source: &str) -> Vec<String> {
        lex_with_trivia(source)
            .0
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_lossless_concatenation() {
        let source = "namespace N {\r\n    /// doc\n    [CanBeNull] public string? Foo(int x = 0x1F) => $\"{x}\"; /* tail */\n}\n";
        let (tokens, errors) = lex_with_trivia(source);
        assert!(errors.is_empty());
        let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn test_attribute_tokens() {
        assert_eq!(
            kinds("[CanBeNull]"),
            vec![
                CsSyntaxKind::LBracket,
                CsSyntaxKind::Ident,
                CsSyntaxKind::RBracket
            ]
        );
    }

    #[test]
    fn test_comments_exclude_newline() {
        assert_eq!(
            kinds("/// Comment\n// plain\n//// four\n"),
            vec![
                CsSyntaxKind::DocComment,
                CsSyntaxKind::Newline,
                CsSyntaxKind::LineComment,
                CsSyntaxKind::Newline,
                CsSyntaxKind::LineComment,
                CsSyntaxKind::Newline,
            ]
        );
    }

    #[test]
    fn test_crlf_is_single_newline() {
        assert_eq!(texts("a\r\nb"), vec!["a", "\r\n", "b"]);
    }

    #[test]
    fn test_directive_only_at_line_start() {
        assert_eq!(
            kinds("  #if DEBUG\nx"),
            vec![
                CsSyntaxKind::Whitespace,
                CsSyntaxKind::Directive,
                CsSyntaxKind::Newline,
                CsSyntaxKind::Ident,
            ]
        );
        let (_, errors) = lex_with_trivia("x #y");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_string_literal_forms() {
        assert_eq!(texts(r#""a\"b" x"#)[0], r#""a\"b""#);
        assert_eq!(texts(r#"@"a""b" x"#)[0], r#"@"a""b""#);
        assert_eq!(texts(r#"$"{a["k"]}" x"#)[0], r#"$"{a["k"]}""#);
        assert_eq!(texts(r#"$"{{literal}}" x"#)[0], r#"$"{{literal}}""#);
        assert_eq!(texts("\"\"\"raw \"quoted\" text\"\"\" x")[0], "\"\"\"raw \"quoted\" text\"\"\"");
        assert_eq!(texts(r#""" x"#)[0], r#""""#);
    }

    #[test]
    fn test_verbatim_identifier_is_not_keyword() {
        assert_eq!(kinds("@class"), vec![CsSyntaxKind::Ident]);
        assert_eq!(kinds("class"), vec![CsSyntaxKind::ClassKw]);
    }

    #[test]
    fn test_generic_closers_stay_split() {
        assert_eq!(
            kinds("List<List<int>>"),
            vec![
                CsSyntaxKind::Ident,
                CsSyntaxKind::Lt,
                CsSyntaxKind::Ident,
                CsSyntaxKind::Lt,
                CsSyntaxKind::IntKw,
                CsSyntaxKind::Gt,
                CsSyntaxKind::Gt,
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(texts("a => b == c && d"), vec!["a", " ", "=>", " ", "b", " ", "==", " ", "c", " ", "&&", " ", "d"]);
        assert_eq!(texts("x::y")[1], "::");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(texts("1.5e-3f;")[0], "1.5e-3f");
        assert_eq!(texts("0x1E+2")[0], "0x1E");
        assert_eq!(texts("1..2")[0], "1");
    }

    #[test]
    fn test_unterminated_literals_report_errors() {
        let (tokens, errors) = lex_with_trivia("\"abc\nx");
        assert_eq!(errors.len(), 1);
        assert_eq!(tokens[0].text, "\"abc");

        let (_, errors) = lex_with_trivia("/* never closed");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_char_literals() {
        assert_eq!(texts(r"'\'' x")[0], r"'\''");
        assert_eq!(texts("'a'")[0], "'a'");
    }
}
