//! Selector parser for path expressions
//!
//! The parser pulls tokens from the [`Scanner`] on demand and hands out one
//! [`Selector`] per call, so a resolver can stop at the first selector that
//! does not match without scanning the rest of the path.

use crate::ast::Selector;
use crate::error::{ErrorKind, PathError};
use crate::lexer::{Scanner, Token, TokenKind, TokenSet};

/// Tokens that may start a selector
pub const VALID_AT_START: TokenSet = TokenSet::of(&[
    TokenKind::End,
    TokenKind::OpenBracket,
    TokenKind::QuotedIdentifier,
    TokenKind::UnquotedIdentifier,
]);

/// Tokens that may follow a selector
pub const VALID_AT_BASE: TokenSet = VALID_AT_START.union(TokenSet::of(&[TokenKind::Period]));

const IDENTIFIERS: TokenSet =
    TokenSet::of(&[TokenKind::QuotedIdentifier, TokenKind::UnquotedIdentifier]);
const CLOSE_BRACKET: TokenSet = TokenSet::of(&[TokenKind::CloseBracket]);
const EQUAL: TokenSet = TokenSet::of(&[TokenKind::Equal]);
const FILTER_VALUE: TokenSet = IDENTIFIERS.union(CLOSE_BRACKET);

#[derive(Debug, Clone)]
enum State {
    Ready,
    Failed(PathError),
}

/// Stateful parser producing one selector per call
pub struct SelectorParser<'p> {
    scanner: Scanner<'p>,
    state: State,
    /// a `.` may follow, set once a selector has been produced
    period_allowed: bool,
    /// a `.` was consumed, the path must not end here
    selector_required: bool,
    pending: Option<Token<'p>>,
    /// end of the last successfully parsed selector
    left_offset: usize,
    /// start of the selector being parsed, after its separator
    selector_offset: usize,
}

impl<'p> SelectorParser<'p> {
    pub fn new(path: &'p str) -> Self {
        let scanner = Scanner::new(path);
        let start = scanner.scan_offset();
        Self {
            scanner,
            state: State::Ready,
            period_allowed: false,
            selector_required: false,
            pending: None,
            left_offset: start,
            selector_offset: start,
        }
    }

    /// Original path
    pub fn path(&self) -> &'p str {
        self.scanner.path()
    }

    /// Unscanned part of the path
    pub fn remaining(&self) -> &'p str {
        self.scanner.remaining()
    }

    pub fn scan_offset(&self) -> usize {
        self.scanner.scan_offset()
    }

    /// Part of the path covered by successfully parsed selectors
    pub fn valid(&self) -> &'p str {
        self.path().get(..self.left_offset).unwrap_or_default()
    }

    /// Byte offset at which the current (or last) selector starts
    pub fn selector_offset(&self) -> usize {
        self.selector_offset
    }

    /// Path from the start of the current selector onward
    pub fn selector_remaining(&self) -> &'p str {
        self.path().get(self.selector_offset..).unwrap_or_default()
    }

    /// Source text of the last selector
    pub fn selector_text(&self) -> &'p str {
        let end = self.left_offset.max(self.selector_offset);
        self.path()
            .get(self.selector_offset..end)
            .unwrap_or_default()
            .trim_end()
    }

    /// Recorded error, if parsing failed
    pub fn error(&self) -> Option<&PathError> {
        match &self.state {
            State::Ready => None,
            State::Failed(err) => Some(err),
        }
    }

    /// True while there is unscanned input and no error was recorded
    pub fn has_more(&self) -> bool {
        matches!(self.state, State::Ready) && (!self.scanner.is_exhausted() || self.pending.is_some())
    }

    /// Parses the next selector; after a failure every call returns `Selector::Invalid`
    pub fn next_selector(&mut self) -> Selector<'p> {
        if self.error().is_some() {
            return Selector::Invalid;
        }
        match self.parse_selector() {
            Ok(selector) => selector,
            Err(err) => {
                self.state = State::Failed(err);
                Selector::Invalid
            }
        }
    }

    fn parse_selector(&mut self) -> Result<Selector<'p>, PathError> {
        self.selector_offset = self.scan_offset();

        if self.period_allowed {
            let token = self.next_token(VALID_AT_BASE, ErrorKind::InvalidToken)?;
            self.period_allowed = false;
            if token.kind == TokenKind::Period {
                // path cannot end with a period after a selector
                self.selector_required = true;
                self.selector_offset = self.scan_offset();
            } else {
                self.pending = Some(token);
            }
        }

        let token = self.next_token(VALID_AT_START, ErrorKind::InvalidToken)?;
        match token.kind {
            TokenKind::End if self.selector_required => {
                Err(PathError::new(ErrorKind::UnexpectedEnd, token.offset, token.text))
            }
            TokenKind::End => Ok(Selector::End),
            TokenKind::QuotedIdentifier | TokenKind::UnquotedIdentifier => {
                Ok(self.accept(Selector::Key { name: token.text }))
            }
            TokenKind::OpenBracket => self.parse_bracket(),
            _ => Err(PathError::new(ErrorKind::Internal, token.offset, token.text)),
        }
    }

    /// `[index]`, `[key=]` or `[key=value]`, opening bracket already consumed
    fn parse_bracket(&mut self) -> Result<Selector<'p>, PathError> {
        let token = self.next_token(IDENTIFIERS, ErrorKind::InvalidIndex)?;

        if token.kind == TokenKind::UnquotedIdentifier && token.text.bytes().all(|b| b.is_ascii_digit())
        {
            let value = parse_index(token.text)
                .ok_or_else(|| PathError::new(ErrorKind::InvalidIndex, token.offset, token.text))?;
            self.next_token(CLOSE_BRACKET, ErrorKind::InvalidToken)?;
            return Ok(self.accept(Selector::Index { value }));
        }

        let key = token.text;
        self.next_token(EQUAL, ErrorKind::InvalidToken)?;

        let token = self.next_token(FILTER_VALUE, ErrorKind::InvalidToken)?;
        let value = if token.kind == TokenKind::CloseBracket {
            None
        } else {
            self.next_token(CLOSE_BRACKET, ErrorKind::InvalidToken)?;
            Some(token.text)
        };

        Ok(self.accept(Selector::SeqMapFilter { key, value }))
    }

    fn accept(&mut self, selector: Selector<'p>) -> Selector<'p> {
        self.period_allowed = true;
        self.selector_required = false;
        self.left_offset = self.scan_offset();
        selector
    }

    /// Takes the pending token or scans a new one, rejecting kinds outside `valid`
    fn next_token(&mut self, valid: TokenSet, error: ErrorKind) -> Result<Token<'p>, PathError> {
        let token = match self.pending.take() {
            Some(token) => token,
            None => self.scanner.next_token(),
        };

        if token.kind == TokenKind::Invalid {
            return Err(PathError::new(ErrorKind::InvalidToken, token.offset, token.text));
        }
        if valid.contains(token.kind) {
            return Ok(token);
        }

        tracing::trace!(
            found = %token.kind,
            expected = %valid,
            offset = token.offset,
            "rejected token"
        );
        Err(PathError::new(error, token.offset, token.text))
    }
}

/// Decimal digits to index; `None` when the value does not fit a `usize`
fn parse_index(digits: &str) -> Option<usize> {
    digits.bytes().try_fold(0usize, |acc, b| {
        acc.checked_mul(10)?.checked_add(usize::from(b - b'0'))
    })
}

/// Parses a whole path into its selectors
pub fn parse(path: &str) -> Result<Vec<Selector<'_>>, PathError> {
    let mut parser = SelectorParser::new(path);
    let mut selectors = Vec::new();
    while parser.has_more() {
        match parser.next_selector() {
            Selector::End | Selector::Invalid => break,
            selector => selectors.push(selector),
        }
    }
    match parser.error() {
        Some(err) => Err(err.clone()),
        None => Ok(selectors),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse_err(path: &str) -> PathError {
        parse(path).unwrap_err()
    }

    #[test]
    fn test_dotted_keys() {
        assert_eq!(
            parse("a.b.c").unwrap(),
            vec![
                Selector::Key { name: "a" },
                Selector::Key { name: "b" },
                Selector::Key { name: "c" }
            ]
        );
    }

    #[test]
    fn test_empty_path() {
        assert_eq!(parse("").unwrap(), vec![]);
        assert_eq!(parse("   ").unwrap(), vec![]);
    }

    #[test]
    fn test_index_after_key() {
        assert_eq!(
            parse("a.b[2]").unwrap(),
            vec![
                Selector::Key { name: "a" },
                Selector::Key { name: "b" },
                Selector::Index { value: 2 }
            ]
        );
    }

    #[test]
    fn test_period_before_bracket_is_optional() {
        assert_eq!(parse("a.[0]").unwrap(), parse("a[0]").unwrap());
    }

    #[test]
    fn test_leading_bracket() {
        assert_eq!(
            parse("[0][1]").unwrap(),
            vec![Selector::Index { value: 0 }, Selector::Index { value: 1 }]
        );
    }

    #[test]
    fn test_consecutive_keys_without_period() {
        // whitespace separates the tokens, each identifier is its own key
        assert_eq!(
            parse("a 'b'").unwrap(),
            vec![Selector::Key { name: "a" }, Selector::Key { name: "b" }]
        );
    }

    #[test]
    fn test_quoted_keys() {
        assert_eq!(
            parse(r#"'a.b'."c d""#).unwrap(),
            vec![Selector::Key { name: "a.b" }, Selector::Key { name: "c d" }]
        );
    }

    #[test]
    fn test_filter_with_value() {
        assert_eq!(
            parse("items[name=foo].value").unwrap(),
            vec![
                Selector::Key { name: "items" },
                Selector::SeqMapFilter {
                    key: "name",
                    value: Some("foo")
                },
                Selector::Key { name: "value" }
            ]
        );
    }

    #[test]
    fn test_filter_without_value() {
        assert_eq!(
            parse("items[name=]").unwrap(),
            vec![
                Selector::Key { name: "items" },
                Selector::SeqMapFilter {
                    key: "name",
                    value: None
                }
            ]
        );
    }

    #[test]
    fn test_filter_quoted_parts() {
        assert_eq!(
            parse("['0'='a b']").unwrap(),
            vec![Selector::SeqMapFilter {
                key: "0",
                value: Some("a b")
            }]
        );
    }

    #[test]
    fn test_filter_numeric_value() {
        assert_eq!(
            parse("[id=42]").unwrap(),
            vec![Selector::SeqMapFilter {
                key: "id",
                value: Some("42")
            }]
        );
    }

    #[test]
    fn test_whitespace_inside_brackets() {
        assert_eq!(
            parse(" a [ 1 ] . b [ k = v ] ").unwrap(),
            vec![
                Selector::Key { name: "a" },
                Selector::Index { value: 1 },
                Selector::Key { name: "b" },
                Selector::SeqMapFilter {
                    key: "k",
                    value: Some("v")
                }
            ]
        );
    }

    #[test]
    fn test_trailing_period() {
        let err = parse_err("a.");
        assert_eq!(err.kind, ErrorKind::UnexpectedEnd);
        assert_eq!(err.offset, 2);
        assert_eq!(err.snippet, "");
    }

    #[test]
    fn test_leading_period() {
        let err = parse_err(".a");
        assert_eq!(err.kind, ErrorKind::InvalidToken);
        assert_eq!(err.offset, 0);
    }

    #[test]
    fn test_double_period() {
        let err = parse_err("a..b");
        assert_eq!(err.kind, ErrorKind::InvalidToken);
        assert_eq!(err.offset, 2);
        assert_eq!(err.snippet, ".");
    }

    #[test]
    fn test_bare_bracket_key() {
        let err = parse_err("a[x]");
        assert_eq!(err.kind, ErrorKind::InvalidToken);
        assert_eq!(err.offset, 3);
        assert_eq!(err.snippet, "]");
    }

    #[test]
    fn test_index_overflow() {
        let err = parse_err("a[99999999999999999999]");
        assert_eq!(err.kind, ErrorKind::InvalidIndex);
        assert_eq!(err.offset, 2);
        assert_eq!(err.snippet, "99999999999999999999");
    }

    #[test]
    fn test_index_max() {
        let path = format!("[{}]", usize::MAX);
        assert_eq!(
            parse(&path).unwrap(),
            vec![Selector::Index { value: usize::MAX }]
        );
    }

    #[test]
    fn test_empty_brackets() {
        let err = parse_err("a[]");
        assert_eq!(err.kind, ErrorKind::InvalidIndex);
        assert_eq!(err.offset, 2);
        assert_eq!(err.snippet, "]");
    }

    #[test]
    fn test_negative_index() {
        let err = parse_err("a[-1]");
        assert_eq!(err.kind, ErrorKind::InvalidToken);
        assert_eq!(err.offset, 2);
        assert_eq!(err.snippet, "-");
    }

    #[test]
    fn test_unclosed_index() {
        let err = parse_err("a[1");
        assert_eq!(err.kind, ErrorKind::InvalidToken);
        assert_eq!(err.offset, 3);
    }

    #[test]
    fn test_unclosed_filter() {
        let err = parse_err("a[k=v");
        assert_eq!(err.kind, ErrorKind::InvalidToken);
        assert_eq!(err.offset, 5);
    }

    #[test]
    fn test_unterminated_quote() {
        let err = parse_err("a.'b");
        assert_eq!(err.kind, ErrorKind::InvalidToken);
        assert_eq!(err.offset, 2);
        assert_eq!(err.snippet, "");
    }

    #[test]
    fn test_unterminated_quote_in_brackets() {
        let err = parse_err("a['b");
        assert_eq!(err.kind, ErrorKind::InvalidToken);
        assert_eq!(err.offset, 2);
    }

    #[test]
    fn test_stray_close_bracket() {
        let err = parse_err("a]");
        assert_eq!(err.kind, ErrorKind::InvalidToken);
        assert_eq!(err.offset, 1);
    }

    #[test]
    fn test_error_is_sticky() {
        let mut parser = SelectorParser::new("a..b.c");
        assert_eq!(parser.next_selector(), Selector::Key { name: "a" });
        assert_eq!(parser.next_selector(), Selector::Invalid);
        let remaining = parser.remaining();
        assert_eq!(parser.next_selector(), Selector::Invalid);
        assert_eq!(parser.next_selector(), Selector::Invalid);
        assert_eq!(parser.remaining(), remaining);
        assert_eq!(parser.error().unwrap().kind, ErrorKind::InvalidToken);
        assert!(!parser.has_more());
    }

    #[test]
    fn test_end_repeats() {
        let mut parser = SelectorParser::new("a");
        assert_eq!(parser.next_selector(), Selector::Key { name: "a" });
        assert!(!parser.has_more());
        assert_eq!(parser.next_selector(), Selector::End);
        assert_eq!(parser.next_selector(), Selector::End);
    }

    #[test]
    fn test_offsets_track_selectors() {
        let mut parser = SelectorParser::new("ab.cd[3]");
        parser.next_selector();
        assert_eq!(parser.selector_offset(), 0);
        assert_eq!(parser.selector_text(), "ab");
        assert_eq!(parser.valid(), "ab");

        parser.next_selector();
        assert_eq!(parser.selector_offset(), 3);
        assert_eq!(parser.selector_text(), "cd");
        assert_eq!(parser.selector_remaining(), "cd[3]");

        parser.next_selector();
        assert_eq!(parser.selector_offset(), 5);
        assert_eq!(parser.selector_text(), "[3]");
        assert_eq!(parser.valid(), "ab.cd[3]");
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("0"), Some(0));
        assert_eq!(parse_index("007"), Some(7));
        assert_eq!(parse_index("18446744073709551616999"), None);
    }
}
