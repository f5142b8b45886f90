//! Scanner for path expressions
//!
//! The scanner works on a shrinking `&str` view of the path. Token text always
//! borrows from the path, nothing is copied while scanning.

use std::fmt;

/// Token types for path expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    /// End of input
    End = 0,
    /// Unterminated quote or a character that cannot start a token
    Invalid = 1,
    /// `'key'` or `"key"`, text excludes the quotes
    QuotedIdentifier = 2,
    /// Run of characters that are neither ASCII whitespace nor ASCII punctuation
    UnquotedIdentifier = 3,
    /// Opening bracket `[`
    OpenBracket = 4,
    /// Closing bracket `]`
    CloseBracket = 5,
    /// Selector separator `.`
    Period = 6,
    /// Filter assignment `=`
    Equal = 7,
}

impl TokenKind {
    const ALL: [TokenKind; 8] = [
        TokenKind::End,
        TokenKind::Invalid,
        TokenKind::QuotedIdentifier,
        TokenKind::UnquotedIdentifier,
        TokenKind::OpenBracket,
        TokenKind::CloseBracket,
        TokenKind::Period,
        TokenKind::Equal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TokenKind::End => "end of path",
            TokenKind::Invalid => "invalid token",
            TokenKind::QuotedIdentifier => "quoted identifier",
            TokenKind::UnquotedIdentifier => "unquoted identifier",
            TokenKind::OpenBracket => "open bracket",
            TokenKind::CloseBracket => "closing bracket",
            TokenKind::Period => "period",
            TokenKind::Equal => "equal",
        }
    }

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of token kinds accepted at a parse position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenSet(u16);

impl TokenSet {
    pub const fn of(kinds: &[TokenKind]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < kinds.len() {
            bits |= kinds[i].bit();
            i += 1;
        }
        Self(bits)
    }

    pub const fn union(self, other: TokenSet) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, kind: TokenKind) -> bool {
        self.0 & kind.bit() != 0
    }
}

impl fmt::Display for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for kind in TokenKind::ALL.into_iter().filter(|k| self.contains(*k)) {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            f.write_str(kind.name())?;
        }
        Ok(())
    }
}

/// Token with its text and byte offset in the original path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'p> {
    pub kind: TokenKind,
    pub text: &'p str,
    pub offset: usize,
}

impl<'p> Token<'p> {
    fn new(kind: TokenKind, text: &'p str, offset: usize) -> Self {
        Self { kind, text, offset }
    }
}

/// Scanner for tokenizing path expressions
pub struct Scanner<'p> {
    path: &'p str,
    rest: &'p str,
    token: Token<'p>,
}

impl<'p> Scanner<'p> {
    pub fn new(path: &'p str) -> Self {
        let mut scanner = Self {
            path,
            rest: path,
            token: Token::new(TokenKind::End, "", 0),
        };
        scanner.skip_whitespace();
        scanner
    }

    /// Original path
    pub fn path(&self) -> &'p str {
        self.path
    }

    /// Unscanned part of the path
    pub fn remaining(&self) -> &'p str {
        self.rest
    }

    /// Number of bytes consumed so far
    pub fn scan_offset(&self) -> usize {
        self.path.len() - self.rest.len()
    }

    /// True when nothing but the end token is left
    pub fn is_exhausted(&self) -> bool {
        self.rest.is_empty()
    }

    /// Tokenize the rest of the path, up to and including the `End` or `Invalid` token
    pub fn tokenize(mut self) -> Vec<Token<'p>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            tokens.push(token);
            if matches!(token.kind, TokenKind::End | TokenKind::Invalid) {
                return tokens;
            }
        }
    }

    pub fn next_token(&mut self) -> Token<'p> {
        // an invalid token stops the scanner for good
        if self.token.kind == TokenKind::Invalid {
            return self.token;
        }

        let offset = self.scan_offset();
        let Some(&head) = self.rest.as_bytes().first() else {
            return self.set_token(TokenKind::End, "", offset);
        };

        let single = match head {
            b'.' => Some(TokenKind::Period),
            b'[' => Some(TokenKind::OpenBracket),
            b']' => Some(TokenKind::CloseBracket),
            b'=' => Some(TokenKind::Equal),
            _ => None,
        };
        if let Some(kind) = single {
            let text = self.split_at(1);
            return self.set_token(kind, text, offset);
        }

        if head == b'\'' || head == b'"' {
            return self.read_quoted(head, offset);
        }

        // non-ASCII bytes are always part of an identifier
        let len = self
            .rest
            .bytes()
            .take_while(|&b| is_identifier_byte(b))
            .count();
        if len == 0 {
            // ASCII punctuation without a meaning in path syntax
            let text = self.rest.get(..1).unwrap_or_default();
            self.token = Token::new(TokenKind::Invalid, text, offset);
            return self.token;
        }

        let text = self.split_at(len);
        self.set_token(TokenKind::UnquotedIdentifier, text, offset)
    }

    fn read_quoted(&mut self, quote: u8, offset: usize) -> Token<'p> {
        let closing = self.rest.bytes().skip(1).position(|b| b == quote);
        match closing {
            Some(len) => {
                let quoted = self.split_at(len + 2);
                let text = quoted.get(1..=len).unwrap_or_default();
                self.set_token(TokenKind::QuotedIdentifier, text, offset)
            }
            None => {
                self.token = Token::new(TokenKind::Invalid, "", offset);
                self.token
            }
        }
    }

    fn set_token(&mut self, kind: TokenKind, text: &'p str, offset: usize) -> Token<'p> {
        self.token = Token::new(kind, text, offset);
        // skip trailing whitespace so that exhaustion shows right after the last token
        self.skip_whitespace();
        self.token
    }

    /// Splits off the first `len` bytes of the remaining path; `len` must be on a char boundary
    fn split_at(&mut self, len: usize) -> &'p str {
        let (head, tail) = self.rest.split_at(len.min(self.rest.len()));
        self.rest = tail;
        head
    }

    fn skip_whitespace(&mut self) {
        self.rest = self.rest.trim_start_matches(is_whitespace);
    }
}

/// ASCII whitespace, vertical tab included
fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

pub(crate) fn is_identifier_byte(b: u8) -> bool {
    !b.is_ascii() || !(is_whitespace(b as char) || b.is_ascii_punctuation())
}
