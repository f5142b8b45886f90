//! ypath_core - path expressions for document trees
//!
//! A path such as `a.b[2]` or `items[name=foo].value` selects a node inside an
//! already parsed tree of maps, sequences and scalars.
//!
//! Grammar:
//!
//! ```text
//! path      := selector ('.'? selector)*
//! selector  := key | '[' index ']' | '[' key '=' value? ']'
//! key       := quoted | unquoted
//! index     := digit+
//! ```
//!
//! `.` separates selectors and may not end the path. A `[key=value]`
//! filter keeps the map elements whose `key` holds a scalar equal to `value`;
//! `[key=]` keeps those holding any scalar under `key`.
//!
//! Trees are read through the [`Node`] trait. It is implemented for
//! `serde_json::Value`; YAML or other document trees plug in by implementing it
//! for their node type.

pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod node;
pub mod parser;

pub use ast::Selector;
pub use error::{ErrorKind, PathError, ResolveError};
pub use eval::resolve;
pub use node::{Node, NodeKind, Selection};

use serde_json::Value;

/// Outcome of checking the syntax of a path without a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation<'p> {
    /// First syntax error, if any
    pub error: Option<PathError>,
    /// Part of the path made of complete, valid selectors
    pub valid: &'p str,
    /// Number of bytes scanned
    pub scan_offset: usize,
}

impl Validation<'_> {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<(), PathError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Checks the syntax of a path
///
/// # Example
/// ```
/// use ypath_core::{validate, ErrorKind};
///
/// assert!(validate("a.b[2]").is_valid());
///
/// let result = validate("a.b.");
/// assert_eq!(result.error.unwrap().kind, ErrorKind::UnexpectedEnd);
/// assert_eq!(result.valid, "a.b");
/// ```
pub fn validate(path: &str) -> Validation<'_> {
    let mut parser = parser::SelectorParser::new(path);
    while parser.has_more() {
        parser.next_selector();
    }

    let error = parser.error().cloned();
    if let Some(err) = &error {
        tracing::debug!(%err, path, "invalid path");
    }
    Validation {
        error,
        valid: parser.valid(),
        scan_offset: parser.scan_offset(),
    }
}

/// Selects the node at `path`, or `Selection::Undefined` if the path does not resolve completely
///
/// # Example
/// ```
/// use serde_json::json;
/// use ypath_core::{select, Selection};
///
/// let json = json!({"a": {"b": [10, 20, 30]}});
/// let thirty = json!(30);
/// assert_eq!(select(&json, "a.b[2]"), Selection::Node(&thirty));
/// assert_eq!(select(&json, "a.c"), Selection::Undefined);
/// ```
pub fn select<'a, N: Node + ?Sized>(node: &'a N, path: &str) -> Selection<'a, N> {
    let mut selection = Selection::Node(node);
    match resolve(&mut selection, path) {
        Ok(()) => selection,
        Err(_) => Selection::Undefined,
    }
}

/// Like [`select`], but reports why the path did not resolve
pub fn try_select<'a, N: Node + ?Sized>(
    node: &'a N,
    path: &str,
) -> Result<Selection<'a, N>, PathError> {
    let mut selection = Selection::Node(node);
    resolve(&mut selection, path).map_err(ResolveError::into_path_error)?;
    Ok(selection)
}

/// Resolves a path against a JSON value and copies the selected node
///
/// Filters and keys applied to sequences select several nodes; those are
/// returned as an array.
///
/// # Example
/// ```
/// use serde_json::json;
/// use ypath_core::query;
///
/// let json = json!({"items": [{"name": "foo", "value": 1}, {"name": "bar", "value": 2}]});
/// assert_eq!(query("items[1].name", &json).unwrap(), json!("bar"));
/// assert_eq!(query("items[name=foo].value", &json).unwrap(), json!([1]));
/// ```
pub fn query(path: &str, json: &Value) -> Result<Value, PathError> {
    let selection = try_select(json, path)?;
    Ok(selection.to_value().unwrap_or(Value::Null))
}
