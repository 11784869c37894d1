//! Match trace types for debugging permit decisions.
//!
//! Trace types mirror the rule tree ([`Node`](crate::Node)) but capture the
//! walk instead of the shape. Use
//! [`Permittable::match_with_trace()`](crate::Permittable::match_with_trace)
//! to see why a key was kept or dropped.
//!
//! # Example
//!
//! ```
//! use permit::Permittable;
//!
//! let rules = Permittable::compile(["items:[id, name]"]).unwrap();
//! let trace = rules.match_with_trace("items[0][price]");
//! assert!(!trace.permitted);
//! println!("{trace:#?}");
//! ```

use std::fmt;

/// Trace of one node visit.
///
/// In arrays ALL element shapes are evaluated (no short-circuit) for maximum
/// debugging value. The `matched` result is still correct.
pub enum NodeTrace {
    /// A terminal key was reached.
    Key {
        /// Whether the path ended here.
        matched: bool,
        /// Hops left over after the key (0 on success).
        remaining: usize,
    },
    /// An object was offered a hop.
    Object {
        /// Whether the hop named a permitted key and the rest matched.
        matched: bool,
        /// The hop offered (`None` when the path ended before this node).
        hop: Option<String>,
        /// Trace of the child under the named key, if the key was permitted.
        child: Option<Box<NodeTrace>>,
    },
    /// An array was offered a hop.
    Array {
        /// Whether the hop was an element hop and any element shape matched.
        matched: bool,
        /// The hop offered (`None` when the path ended before this node).
        hop: Option<String>,
        /// Trace of each element shape against the rest of the path.
        elements: Vec<NodeTrace>,
    },
}

impl NodeTrace {
    /// Get the overall match result of this visit.
    #[must_use]
    pub fn matched(&self) -> bool {
        match self {
            Self::Key { matched, .. }
            | Self::Object { matched, .. }
            | Self::Array { matched, .. } => *matched,
        }
    }
}

impl fmt::Debug for NodeTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key { matched, remaining } => f
                .debug_struct("Key")
                .field("matched", matched)
                .field("remaining", remaining)
                .finish(),
            Self::Object {
                matched,
                hop,
                child,
            } => f
                .debug_struct("Object")
                .field("matched", matched)
                .field("hop", hop)
                .field("child", child)
                .finish(),
            Self::Array {
                matched,
                hop,
                elements,
            } => f
                .debug_struct("Array")
                .field("matched", matched)
                .field("hop", hop)
                .field("elements", elements)
                .finish(),
        }
    }
}

/// Trace of a full [`Permittable`](crate::Permittable) match.
///
/// # INV: `permitted` == `is_permitted()` result
///
/// The `permitted` field always equals what
/// [`Permittable::is_permitted()`](crate::Permittable::is_permitted) returns
/// for the same path.
pub struct MatchTrace {
    /// The path that was matched.
    pub path: String,
    /// The final decision.
    pub permitted: bool,
    /// The tokenized hops, `None` when the path is malformed.
    pub hops: Option<Vec<String>>,
    /// The walk from the root, `None` when the path is malformed.
    pub root: Option<NodeTrace>,
}

impl fmt::Debug for MatchTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchTrace")
            .field("path", &self.path)
            .field("permitted", &self.permitted)
            .field("hops", &self.hops)
            .field("root", &self.root)
            .finish()
    }
}
