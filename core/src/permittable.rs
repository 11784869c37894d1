//! Permittable: a compiled rule set
//!
//! Compiled once per configuration, then matched against any number of
//! flattened keys, from any number of threads.

use crate::compile::{compile_rule, merge_roots};
use crate::trace::MatchTrace;
use crate::{tokenize, CompileError, Node};
use std::fmt;

/// A compiled, immutable set of permit rules.
///
/// Fragments are alternatives: a path is permitted when any fragment would
/// permit it. Identical fragments are compiled once.
///
/// # Example
///
/// ```
/// use permit::Permittable;
///
/// let rules = Permittable::compile(["name", "items:[id, qty]"]).unwrap();
///
/// assert!(rules.is_permitted("name"));
/// assert!(rules.is_permitted("items[0][qty]"));
/// assert!(!rules.is_permitted("items[0][price]"));
/// assert!(!rules.is_permitted("admin"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permittable {
    root: Node,
    rules: Vec<String>,
}

impl Permittable {
    /// Compile one or more rule fragments.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] for an empty fragment list or the first
    /// fragment that fails to compile, or when two fragments declare the
    /// same key with incompatible shapes.
    pub fn compile<I, S>(fragments: I) -> Result<Self, CompileError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules: Vec<String> = Vec::new();
        for fragment in fragments {
            let fragment = fragment.as_ref();
            if !rules.iter().any(|r| r == fragment) {
                rules.push(fragment.to_owned());
            }
        }

        let roots = rules
            .iter()
            .map(|rule| compile_rule(rule))
            .collect::<Result<Vec<_>, _>>()?;
        let root = merge_roots(roots)?;

        tracing::debug!(
            rules = rules.len(),
            depth = root.depth(),
            tree = %root,
            "compiled permit rules"
        );

        Ok(Self { root, rules })
    }

    /// Whether the flattened bracket-notation `path` is permitted.
    ///
    /// Malformed paths are never permitted.
    #[must_use]
    pub fn is_permitted(&self, path: &str) -> bool {
        tokenize(path).is_some_and(|hops| self.root.matches(&hops))
    }

    /// Match `path` and record every decision along the way.
    ///
    /// `trace.permitted` always equals [`is_permitted`](Self::is_permitted).
    #[must_use]
    pub fn match_with_trace(&self, path: &str) -> MatchTrace {
        let Some(hops) = tokenize(path) else {
            return MatchTrace {
                path: path.to_owned(),
                permitted: false,
                hops: None,
                root: None,
            };
        };

        let root = self.root.trace(&hops);
        MatchTrace {
            path: path.to_owned(),
            permitted: root.matched(),
            hops: Some(hops.iter().map(ToString::to_string).collect()),
            root: Some(root),
        }
    }

    /// The compiled rule tree.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The de-duplicated source fragments, in first-seen order.
    #[must_use]
    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    /// Nesting depth of the compiled tree.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

impl fmt::Display for Permittable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}

/// Compile rule fragments. Shorthand for [`Permittable::compile`].
///
/// # Errors
///
/// See [`Permittable::compile`].
pub fn compile<I, S>(fragments: I) -> Result<Permittable, CompileError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Permittable::compile(fragments)
}

/// Whether `path` is permitted by `permittable`.
#[must_use]
pub fn is_permitted(permittable: &Permittable, path: &str) -> bool {
    permittable.is_permitted(path)
}
