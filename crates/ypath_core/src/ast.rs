//! Selector definitions for path expressions

use crate::lexer::is_identifier_byte;
use std::fmt;

/// One step of a path expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector<'p> {
    /// Key selector: `name`, `.name` or `'quoted name'`
    Key { name: &'p str },
    /// Index selector: `[2]`
    Index { value: usize },
    /// Sequence / map filter: `[key=value]`, or `[key=]` for any scalar value
    SeqMapFilter { key: &'p str, value: Option<&'p str> },
    /// Path fully consumed
    End,
    /// Parsing failed, the parser holds the error
    Invalid,
}

impl Selector<'_> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Selector::Key { .. } => "key",
            Selector::Index { .. } => "index",
            Selector::SeqMapFilter { .. } => "seq-map filter",
            Selector::End => "(none)",
            Selector::Invalid => "(invalid)",
        }
    }
}

/// Renders the selector back into path syntax
///
/// Quotes have no escape syntax: a name holding both `'` and `"` is rendered
/// between double quotes and does not parse back to the same selector.
impl fmt::Display for Selector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Key { name } => write_identifier(f, name, false),
            Selector::Index { value } => write!(f, "[{value}]"),
            Selector::SeqMapFilter { key, value } => {
                f.write_str("[")?;
                write_identifier(f, key, true)?;
                f.write_str("=")?;
                if let Some(value) = value {
                    write_identifier(f, value, false)?;
                }
                f.write_str("]")
            }
            Selector::End => Ok(()),
            Selector::Invalid => f.write_str("(invalid)"),
        }
    }
}

fn write_identifier(f: &mut fmt::Formatter<'_>, text: &str, in_brackets: bool) -> fmt::Result {
    let plain = !text.is_empty()
        && text.bytes().all(is_identifier_byte)
        // a bare numeral in brackets would read as an index
        && !(in_brackets && text.bytes().all(|b| b.is_ascii_digit()));
    if plain {
        return f.write_str(text);
    }
    let quote = if text.contains('\'') { '"' } else { '\'' };
    write!(f, "{quote}{text}{quote}")
}
