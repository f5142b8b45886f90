//! Document tree capabilities and the node handle narrowed by the resolver

use serde_json::Value;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;

/// Shape of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Map,
    Sequence,
    Scalar,
    Null,
    /// No node at all, e.g. a missing key
    Undefined,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Map => "map",
            NodeKind::Sequence => "sequence",
            NodeKind::Scalar => "scalar",
            NodeKind::Null => "(null)",
            NodeKind::Undefined => "(undefined)",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read-only view of a document tree node
///
/// Paths only ever read the tree. Implement this for the node type of a document
/// parser to resolve paths against its trees.
pub trait Node {
    /// Shape of the node, never `NodeKind::Undefined`
    fn kind(&self) -> NodeKind;

    /// Number of entries of a map or sequence, 0 for other shapes
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value stored under `key`, if this is a map holding it
    fn get_key(&self, key: &str) -> Option<&Self>;

    /// Element at `index`, if this is a sequence long enough
    fn get_index(&self, index: usize) -> Option<&Self>;

    /// String form of a scalar, `None` for other shapes
    fn scalar_string(&self) -> Option<Cow<'_, str>>;
}

impl Node for Value {
    fn kind(&self) -> NodeKind {
        match self {
            Value::Null => NodeKind::Null,
            Value::Bool(_) | Value::Number(_) | Value::String(_) => NodeKind::Scalar,
            Value::Array(_) => NodeKind::Sequence,
            Value::Object(_) => NodeKind::Map,
        }
    }

    fn len(&self) -> usize {
        match self {
            Value::Array(arr) => arr.len(),
            Value::Object(map) => map.len(),
            _ => 0,
        }
    }

    fn get_key(&self, key: &str) -> Option<&Self> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    fn get_index(&self, index: usize) -> Option<&Self> {
        match self {
            Value::Array(arr) => arr.get(index),
            _ => None,
        }
    }

    fn scalar_string(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::String(s) => Some(Cow::Borrowed(s)),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Bool(true) => Some(Cow::Borrowed("true")),
            Value::Bool(false) => Some(Cow::Borrowed("false")),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

/// Derived sequences usually hold only a few matches
pub type Matches<'a, N> = SmallVec<[&'a N; 4]>;

/// Handle to the current position in a tree
///
/// The resolver replaces the handle with a narrower one after each selector.
/// A derived sequence holds references into the tree, elements are never copied.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<'a, N: ?Sized> {
    /// Nothing selected
    Undefined,
    /// A node of the tree
    Node(&'a N),
    /// Sequence built from matching nodes, e.g. by a filter
    Sequence(Matches<'a, N>),
}

impl<'a, N: Node + ?Sized> Selection<'a, N> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Selection::Undefined => NodeKind::Undefined,
            Selection::Node(node) => node.kind(),
            Selection::Sequence(_) => NodeKind::Sequence,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Selection::Undefined)
    }

    pub fn len(&self) -> usize {
        match self {
            Selection::Undefined => 0,
            Selection::Node(node) => node.len(),
            Selection::Sequence(nodes) => nodes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// False for undefined, null and empty maps or sequences
    pub fn is_match(&self) -> bool {
        match self.kind() {
            NodeKind::Undefined | NodeKind::Null => false,
            NodeKind::Map | NodeKind::Sequence => !self.is_empty(),
            NodeKind::Scalar => true,
        }
    }

    /// Tree node behind the handle, `None` for undefined and derived sequences
    pub fn as_node(&self) -> Option<&'a N> {
        match self {
            Selection::Node(node) => Some(*node),
            _ => None,
        }
    }

    /// Element at `index` of a sequence
    pub fn get_index(&self, index: usize) -> Option<&'a N> {
        match self {
            Selection::Node(node) => node.get_index(index),
            Selection::Sequence(nodes) => nodes.get(index).copied(),
            Selection::Undefined => None,
        }
    }

    /// Elements of a sequence, empty for any other shape
    pub fn elements(&self) -> Elements<'_, 'a, N> {
        match self {
            Selection::Node(node) if node.kind() == NodeKind::Sequence => Elements::Tree {
                node: *node,
                index: 0,
            },
            Selection::Sequence(nodes) => Elements::Derived(nodes.iter()),
            _ => Elements::Empty,
        }
    }
}

impl<'a, N: ?Sized> From<&'a N> for Selection<'a, N> {
    fn from(node: &'a N) -> Self {
        Selection::Node(node)
    }
}

impl Selection<'_, Value> {
    /// Copies the selected node out of the tree; `None` when undefined
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Selection::Undefined => None,
            Selection::Node(node) => Some((*node).clone()),
            Selection::Sequence(nodes) => Some(Value::Array(
                nodes.iter().map(|node| (*node).clone()).collect(),
            )),
        }
    }
}

/// Iterator over the elements of a selected sequence
pub enum Elements<'s, 'a, N: ?Sized> {
    Tree { node: &'a N, index: usize },
    Derived(std::slice::Iter<'s, &'a N>),
    Empty,
}

impl<'a, N: Node + ?Sized> Iterator for Elements<'_, 'a, N> {
    type Item = &'a N;

    fn next(&mut self) -> Option<&'a N> {
        match self {
            Elements::Tree { node, index } => {
                let element = node.get_index(*index)?;
                *index += 1;
                Some(element)
            }
            Elements::Derived(iter) => iter.next().copied(),
            Elements::Empty => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_kinds() {
        assert_eq!(json!(null).kind(), NodeKind::Null);
        assert_eq!(json!(true).kind(), NodeKind::Scalar);
        assert_eq!(json!(1.5).kind(), NodeKind::Scalar);
        assert_eq!(json!("x").kind(), NodeKind::Scalar);
        assert_eq!(json!([1]).kind(), NodeKind::Sequence);
        assert_eq!(json!({"a": 1}).kind(), NodeKind::Map);
    }

    #[test]
    fn test_scalar_string() {
        assert_eq!(json!("foo").scalar_string().unwrap(), "foo");
        assert_eq!(json!(42).scalar_string().unwrap(), "42");
        assert_eq!(json!(-1.5).scalar_string().unwrap(), "-1.5");
        assert_eq!(json!(false).scalar_string().unwrap(), "false");
        assert!(json!(null).scalar_string().is_none());
        assert!(json!([1]).scalar_string().is_none());
    }

    #[test]
    fn test_selection_is_match() {
        let values = [json!(null), json!([]), json!({}), json!(0), json!([0]), json!({"a": null})];
        let matches: Vec<bool> = values
            .iter()
            .map(|v| Selection::from(v).is_match())
            .collect();
        assert_eq!(matches, vec![false, false, false, true, true, true]);
        assert!(!Selection::<Value>::Undefined.is_match());
        assert!(!Selection::<Value>::Sequence(Matches::new()).is_match());
    }

    #[test]
    fn test_elements_of_tree_and_derived_sequences() {
        let json = json!([1, 2, 3]);
        let tree = Selection::from(&json);
        assert_eq!(tree.elements().collect::<Vec<_>>(), vec![&json!(1), &json!(2), &json!(3)]);

        let one = json!(1);
        let derived: Selection<Value> = Selection::Sequence(Matches::from_slice(&[&one, &one]));
        assert_eq!(derived.elements().count(), 2);
        assert_eq!(derived.get_index(1), Some(&one));

        let scalar = json!("x");
        assert_eq!(Selection::from(&scalar).elements().count(), 0);
    }

    #[test]
    fn test_to_value() {
        let a = json!({"k": 1});
        let b = json!("s");
        let derived: Selection<Value> = Selection::Sequence(Matches::from_slice(&[&a, &b]));
        assert_eq!(derived.to_value().unwrap(), json!([{"k": 1}, "s"]));
        assert_eq!(Selection::from(&b).to_value().unwrap(), json!("s"));
        assert!(Selection::<Value>::Undefined.to_value().is_none());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(NodeKind::Map.to_string(), "map");
        assert_eq!(NodeKind::Undefined.to_string(), "(undefined)");
    }
}
