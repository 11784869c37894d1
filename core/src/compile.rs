//! Compiler: rule text -> [`Node`] tree
//!
//! Rules are reduced bottom-up. The innermost group `{..}` / `[..]` is built
//! into a node, parked in a working list, and its text replaced by a
//! reference token `@N@`. The enclosing group then sees the token as an
//! ordinary entry. Repeating until no group is left resolves any nesting
//! depth, innermost first:
//!
//! ```text
//! key:{x1:{x2:[y:{a,b}]}}
//! key:{x1:{x2:[y:@0@]}}      @0@ = {a, b}
//! key:{x1:{x2:@1@}}          @1@ = [{y:@0@}]
//! key:{x1:@2@}               @2@ = {x2:@1@}
//! key:@3@                    @3@ = {x1:@2@}
//! @4@                        @4@ = {key:@3@}   (top level is an implicit object)
//! ```
//!
//! The working list only exists while compiling; each token is taken exactly
//! once, so the result is a strict tree with no shared nodes.

use crate::node::child_path;
use crate::rule::{self, Entry, GroupKind, ScanError};
use crate::{CompileError, Node, MAX_DEPTH, MAX_RULE_LENGTH};
use std::collections::HashMap;

/// Compile one rule fragment into its root node.
pub(crate) fn compile_rule(rule: &str) -> Result<Node, CompileError> {
    if rule.len() > MAX_RULE_LENGTH {
        return Err(CompileError::RuleTooLong {
            len: rule.len(),
            max: MAX_RULE_LENGTH,
        });
    }

    let chars = rule::invalid_chars(rule);
    if !chars.is_empty() {
        return Err(CompileError::InvalidChars {
            rule: rule.to_owned(),
            chars,
        });
    }

    if rule.trim().is_empty() {
        return Err(CompileError::EmptyRule);
    }

    Reducer::new(rule).reduce()
}

/// Merge the roots of several fragments into one root.
///
/// Fragments are alternatives: `compile(["a", "b:{c}"])` permits what either
/// permits, the same as the single rule `a, b:{c}`.
pub(crate) fn merge_roots(roots: Vec<Node>) -> Result<Node, CompileError> {
    let mut roots = roots.into_iter();
    let Some(first) = roots.next() else {
        return Err(CompileError::EmptyRuleSet);
    };
    roots.try_fold(first, |merged, root| merged.merge(root, ""))
}

/// A node parked in the working list, with its nesting depth.
struct Built {
    node: Node,
    depth: usize,
}

struct Reducer<'r> {
    rule: &'r str,
    built: Vec<Option<Built>>,
}

impl<'r> Reducer<'r> {
    fn new(rule: &'r str) -> Self {
        Self {
            rule,
            built: Vec::new(),
        }
    }

    fn reduce(mut self) -> Result<Node, CompileError> {
        let mut text = self.rule.to_owned();

        while let Some(group) = rule::innermost_group(&text).map_err(|e| self.scan_error(e))? {
            let built = self.build(group.kind, &text[group.open + 1..group.close])?;
            let token = self.park(built);
            text.replace_range(group.open..=group.close, &token);
        }

        let rest = text.trim();
        let root = match rule::parse_token(rest) {
            Some(index) => self.take(index)?,
            None => self.build(GroupKind::Object, rest)?,
        };
        Ok(root.node)
    }

    /// Build a group node from its body (the text between the delimiters).
    fn build(&mut self, kind: GroupKind, body: &str) -> Result<Built, CompileError> {
        let entries = rule::parse_entries(body).map_err(|entry| CompileError::InvalidEntry {
            rule: self.rule.to_owned(),
            entry: rule::describe(entry),
        })?;

        let mut depth = 0;
        let node = match kind {
            GroupKind::Object => {
                let mut keys: HashMap<String, Node> = HashMap::with_capacity(entries.len());
                for entry in entries {
                    let (key, child) = match entry {
                        Entry::Key(key) => (key, Built::key()),
                        Entry::Keyed(key, index) => (key, self.take(index)?),
                        Entry::Group(_) => {
                            return Err(CompileError::UnnamedGroup {
                                rule: self.rule.to_owned(),
                            });
                        }
                    };
                    depth = depth.max(child.depth);
                    insert_key(&mut keys, key, child.node)?;
                }
                Node::Object(keys)
            }
            GroupKind::Array => {
                let mut elements: Vec<Node> = Vec::with_capacity(entries.len());
                for entry in entries {
                    let element = match entry {
                        Entry::Key(key) => Built::key().under(key),
                        Entry::Keyed(key, index) => self.take(index)?.under(key),
                        Entry::Group(index) => self.take(index)?,
                    };
                    depth = depth.max(element.depth);
                    if !elements.contains(&element.node) {
                        elements.push(element.node);
                    }
                }
                Node::Array(elements)
            }
        };

        let depth = depth + 1;
        if depth > MAX_DEPTH {
            return Err(CompileError::DepthExceeded {
                depth,
                max: MAX_DEPTH,
            });
        }
        Ok(Built { node, depth })
    }

    fn park(&mut self, built: Built) -> String {
        self.built.push(Some(built));
        rule::token(self.built.len() - 1)
    }

    /// Take a parked node out of the working list.
    ///
    /// A token pointing past the list, or at a slot already taken, means the
    /// reduction itself went wrong.
    fn take(&mut self, index: usize) -> Result<Built, CompileError> {
        self.built
            .get_mut(index)
            .and_then(Option::take)
            .ok_or_else(|| CompileError::DanglingReference {
                rule: self.rule.to_owned(),
                index,
            })
    }

    fn scan_error(&self, error: ScanError) -> CompileError {
        match error {
            ScanError::Unbalanced(bracket) => CompileError::Unbalanced {
                rule: self.rule.to_owned(),
                bracket,
            },
            ScanError::Mismatched { open, close } => CompileError::MismatchedGroup {
                rule: self.rule.to_owned(),
                open,
                close,
            },
        }
    }
}

impl Built {
    fn key() -> Self {
        Self {
            node: Node::Key,
            depth: 1,
        }
    }

    /// Wrap as the single-key object an array element `key` / `key:{..}` denotes.
    fn under(self, key: &str) -> Self {
        Self {
            node: Node::Object(HashMap::from([(key.to_owned(), self.node)])),
            depth: self.depth + 1,
        }
    }
}

fn insert_key(keys: &mut HashMap<String, Node>, key: &str, node: Node) -> Result<(), CompileError> {
    let merged = match keys.remove(key) {
        Some(existing) => existing.merge(node, &child_path("", key))?,
        None => node,
    };
    keys.insert(key.to_owned(), merged);
    Ok(())
}
