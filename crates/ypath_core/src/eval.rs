//! Resolver applying path selectors to a document tree

use crate::ast::Selector;
use crate::error::{ErrorKind, PathError, ResolveError};
use crate::node::{Node, NodeKind, Selection};
use crate::parser::SelectorParser;
use tracing::{debug, trace};

/// Narrows `selection` along `path`
///
/// The selection is only replaced once a selector has been parsed and matched,
/// so on error it holds the node the failing selector was applied to, and the
/// error carries the path from that selector onward.
pub fn resolve<'a, 'p, N: Node + ?Sized>(
    selection: &mut Selection<'a, N>,
    path: &'p str,
) -> Result<(), ResolveError<'p>> {
    let mut parser = SelectorParser::new(path);

    while parser.has_more() {
        if selection.is_undefined() {
            let error = PathError::new(ErrorKind::NodeNotFound, parser.scan_offset(), "");
            return Err(stop(error, parser.remaining()));
        }

        let selector = parser.next_selector();
        let applied = match selector {
            Selector::End => break,
            Selector::Invalid => {
                let error = parser.error().cloned().unwrap_or_else(|| {
                    PathError::new(ErrorKind::Internal, parser.scan_offset(), "")
                });
                return Err(stop(error, parser.selector_remaining()));
            }
            Selector::Key { name } => select_key(selection, name),
            Selector::Index { value } => select_index(selection, value),
            Selector::SeqMapFilter { key, value } => filter_seq_map(selection, key, value),
        };

        if let Err(kind) = applied {
            let error = PathError::new(kind, parser.selector_offset(), parser.selector_text());
            return Err(stop(error, parser.selector_remaining()));
        }
        trace!(
            kind = selector.kind_name(),
            %selector,
            node = %selection.kind(),
            "applied selector"
        );
    }

    Ok(())
}

fn stop(error: PathError, remaining: &str) -> ResolveError<'_> {
    debug!(%error, remaining, "path resolution stopped");
    ResolveError { error, remaining }
}

/// Key lookup in a map, or in every map element of a sequence
fn select_key<'a, N: Node + ?Sized>(
    selection: &mut Selection<'a, N>,
    key: &str,
) -> Result<(), ErrorKind> {
    let next = match selection.kind() {
        NodeKind::Sequence => Selection::Sequence(
            selection
                .elements()
                .filter(|element| element.kind() == NodeKind::Map)
                .filter_map(|element| element.get_key(key))
                .collect(),
        ),
        NodeKind::Map => match selection.as_node().and_then(|node| node.get_key(key)) {
            Some(value) => Selection::Node(value),
            None => Selection::Undefined,
        },
        _ => return Err(ErrorKind::InvalidNodeType),
    };

    replace_if_match(selection, next)
}

fn select_index<N: Node + ?Sized>(
    selection: &mut Selection<'_, N>,
    index: usize,
) -> Result<(), ErrorKind> {
    match selection.kind() {
        // a scalar is its own only element
        NodeKind::Scalar if index == 0 => Ok(()),
        NodeKind::Scalar => Err(ErrorKind::NodeNotFound),
        NodeKind::Sequence => {
            let element = selection.get_index(index).ok_or(ErrorKind::NodeNotFound)?;
            *selection = Selection::Node(element);
            Ok(())
        }
        _ => Err(ErrorKind::InvalidNodeType),
    }
}

/// Keeps the map elements whose `key` holds a scalar equal to `value` (any scalar if `None`)
fn filter_seq_map<N: Node + ?Sized>(
    selection: &mut Selection<'_, N>,
    key: &str,
    value: Option<&str>,
) -> Result<(), ErrorKind> {
    let next = match selection.kind() {
        NodeKind::Sequence => Selection::Sequence(
            selection
                .elements()
                .filter(|element| matches_filter(*element, key, value))
                .collect(),
        ),
        NodeKind::Map => match selection.as_node() {
            Some(node) if matches_filter(node, key, value) => Selection::Node(node),
            Some(_) => Selection::Undefined,
            // a derived selection is never a map
            None => return Err(ErrorKind::InvalidNodeType),
        },
        _ => return Err(ErrorKind::InvalidNodeType),
    };

    replace_if_match(selection, next)
}

fn matches_filter<N: Node + ?Sized>(element: &N, key: &str, value: Option<&str>) -> bool {
    if element.kind() != NodeKind::Map {
        return false;
    }
    let Some(field) = element.get_key(key) else {
        return false;
    };
    let Some(scalar) = field.scalar_string() else {
        return false;
    };
    value.is_none_or(|expected| scalar == expected)
}

fn replace_if_match<'a, N: Node + ?Sized>(
    selection: &mut Selection<'a, N>,
    next: Selection<'a, N>,
) -> Result<(), ErrorKind> {
    if !next.is_match() {
        return Err(ErrorKind::NodeNotFound);
    }
    *selection = next;
    Ok(())
}
