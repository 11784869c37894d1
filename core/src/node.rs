//! Rule tree: the compiled shape of a permit rule
//!
//! A [`Node`] owns its children outright; the tree is built once by the
//! compiler and only read afterwards.

use crate::trace::NodeTrace;
use crate::{CompileError, Hop};
use std::collections::HashMap;
use std::fmt;

/// One node of a compiled rule tree.
///
/// | Variant | Rule text | Consumes |
/// |---------|-----------|----------|
/// | `Key` | `name` (under an object) | nothing; must be the end of the path |
/// | `Object` | `{a, b:{..}}` | one non-numeric key hop |
/// | `Array` | `[]`, `[a, {..}, [..]]` | one index hop or `[]` |
///
/// # INV: Array elements are a union
///
/// An `Array` with element shapes matches when *any* shape matches the rest
/// of the path. Element order never changes the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Terminal key: the path must end here.
    Key,
    /// Permitted object keys and the shape under each.
    Object(HashMap<String, Node>),
    /// Permitted element shapes. Empty means an array of plain values.
    Array(Vec<Node>),
}

impl Node {
    /// Match the remaining hops of a path against this node.
    ///
    /// `hops` starts with the hop this node is offered (for `Key`, the hops
    /// left after the key was consumed, which must be none).
    #[must_use]
    pub fn matches(&self, hops: &[Hop<'_>]) -> bool {
        match self {
            Self::Key => hops.is_empty(),
            Self::Object(entries) => {
                let Some((hop, rest)) = hops.split_first() else {
                    return false;
                };
                hop.object_key()
                    .and_then(|key| entries.get(key))
                    .is_some_and(|child| child.matches(rest))
            }
            Self::Array(elements) => {
                let Some((hop, rest)) = hops.split_first() else {
                    return false;
                };
                if !hop.is_array_element() {
                    return false;
                }
                if elements.is_empty() {
                    return rest.is_empty();
                }
                !rest.is_empty() && elements.iter().any(|element| element.matches(rest))
            }
        }
    }

    /// Same walk as [`matches`](Self::matches), recording every decision.
    ///
    /// Array elements are all evaluated (no short-circuit) so the trace shows
    /// every alternative.
    #[must_use]
    pub fn trace(&self, hops: &[Hop<'_>]) -> NodeTrace {
        match self {
            Self::Key => NodeTrace::Key {
                matched: hops.is_empty(),
                remaining: hops.len(),
            },
            Self::Object(entries) => {
                let Some((hop, rest)) = hops.split_first() else {
                    return NodeTrace::Object {
                        matched: false,
                        hop: None,
                        child: None,
                    };
                };
                let child = hop
                    .object_key()
                    .and_then(|key| entries.get(key))
                    .map(|child| Box::new(child.trace(rest)));
                NodeTrace::Object {
                    matched: child.as_ref().is_some_and(|c| c.matched()),
                    hop: Some(hop.to_string()),
                    child,
                }
            }
            Self::Array(elements) => {
                let Some((hop, rest)) = hops.split_first() else {
                    return NodeTrace::Array {
                        matched: false,
                        hop: None,
                        elements: Vec::new(),
                    };
                };
                if !hop.is_array_element() {
                    return NodeTrace::Array {
                        matched: false,
                        hop: Some(hop.to_string()),
                        elements: Vec::new(),
                    };
                }
                if elements.is_empty() {
                    return NodeTrace::Array {
                        matched: rest.is_empty(),
                        hop: Some(hop.to_string()),
                        elements: Vec::new(),
                    };
                }
                let traces: Vec<NodeTrace> = if rest.is_empty() {
                    Vec::new()
                } else {
                    elements.iter().map(|element| element.trace(rest)).collect()
                };
                NodeTrace::Array {
                    matched: traces.iter().any(NodeTrace::matched),
                    hop: Some(hop.to_string()),
                    elements: traces,
                }
            }
        }
    }

    /// Nesting depth: a `Key` or empty group is 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        let children = match self {
            Self::Key => 0,
            Self::Object(entries) => entries.values().map(Node::depth).max().unwrap_or(0),
            Self::Array(elements) => elements.iter().map(Node::depth).max().unwrap_or(0),
        };
        1 + children
    }

    /// `true` for an `Object` or `Array` with nothing in it.
    #[must_use]
    pub fn is_empty_group(&self) -> bool {
        match self {
            Self::Key => false,
            Self::Object(entries) => entries.is_empty(),
            Self::Array(elements) => elements.is_empty(),
        }
    }

    /// Merge two shapes declared for the same key.
    ///
    /// `Key`+`Key` stays a key, objects merge key-wise, arrays take the union
    /// of their element shapes. A plain array (`[]`) and a structured array
    /// cannot be combined, nor can different variants.
    ///
    /// `at` is the bracket path of the key being merged, for the error.
    pub(crate) fn merge(self, other: Node, at: &str) -> Result<Node, CompileError> {
        match (self, other) {
            (Self::Key, Self::Key) => Ok(Self::Key),
            (Self::Object(mut entries), Self::Object(others)) => {
                for (key, node) in others {
                    let merged = match entries.remove(&key) {
                        Some(existing) => existing.merge(node, &child_path(at, &key))?,
                        None => node,
                    };
                    entries.insert(key, merged);
                }
                Ok(Self::Object(entries))
            }
            (Self::Array(mut elements), Self::Array(others))
                if elements.is_empty() == others.is_empty() =>
            {
                for node in others {
                    if !elements.contains(&node) {
                        elements.push(node);
                    }
                }
                Ok(Self::Array(elements))
            }
            _ => Err(CompileError::ConflictingRule { key: at.to_owned() }),
        }
    }

    fn write_rule(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key => Ok(()),
            Self::Object(entries) => {
                let mut keys: Vec<&String> = entries.keys().collect();
                keys.sort();
                f.write_str("{")?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_key(f, key)?;
                    let child = &entries[key];
                    if !matches!(child, Self::Key) {
                        f.write_str(":")?;
                        child.write_rule(f)?;
                    }
                }
                f.write_str("}")
            }
            Self::Array(elements) => {
                f.write_str("[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    element.write_rule(f)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Renders the node back into rule syntax, object keys sorted.
///
/// The output compiles to an equal tree. A bare `Key` renders as nothing: it
/// only means something under an object key.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_rule(f)
    }
}

fn write_key(f: &mut fmt::Formatter<'_>, key: &str) -> fmt::Result {
    if key.contains(' ') {
        write!(f, "'{key}'")
    } else {
        f.write_str(key)
    }
}

pub(crate) fn child_path(at: &str, key: &str) -> String {
    if at.is_empty() {
        key.to_owned()
    } else {
        format!("{at}[{key}]")
    }
}
