//! permit - strong parameters for flattened request data
//!
//! A tiny rule language describes which nested keys of a flattened
//! (bracket-notation) parameter map are allowed through. Rules compile once
//! into an immutable tree; each incoming key is tokenized and matched against
//! it. Anything the rules do not name is dropped before decoding, which
//! guards typed records against mass assignment.
//!
//! # Architecture
//!
//! - [`tokenize`]: bracket path (`root[a][0][]`) into [`Hop`]s
//! - [`Permittable`]: rule fragments compiled into a [`Node`] tree
//! - [`Node`]: `Key`, `Object` or `Array`; the matcher walks it hop by hop
//! - [`MatchTrace`]: the same walk, recorded for debugging
//! - [`Values`]: flat multi-valued key map
//! - [`Params`]: require a root, permit rules, filter and decode
//!   (feature = `"params"`)
//!
//! # Key Design Insights
//!
//! 1. **Fail closed**: a path that does not tokenize, runs out early or has
//!    hops left over is not permitted. Matching has no error channel.
//!
//! 2. **Arrays are unions**: the element shapes of an array are alternatives.
//!    Any shape matching the rest of the path permits it; order is irrelevant.
//!
//! 3. **Numeric hops are indexes**: `[0]` only ever addresses an array
//!    element, never an object key named `0`.
//!
//! # Rule language
//!
//! | Rule | Permits |
//! |------|---------|
//! | `key` | `key` |
//! | `'a key'` | `a key` |
//! | `key:{a,b}` | `key[a]`, `key[b]` |
//! | `key:[]` | `key[]`, `key[0]` |
//! | `key:[a,b]` | `key[0][a]`, `key[0][b]` |
//! | `key:[[]]` | `key[0][]` |
//! | `key:[obj:{x}]` | `key[0][obj][x]` |
//! | `a, b:{c}` | `a`, `b[c]` |
//!
//! # Example
//!
//! ```
//! use permit::prelude::*;
//!
//! let rules = Permittable::compile(["user:{name, emails:[]}"]).unwrap();
//!
//! assert!(rules.is_permitted("user[name]"));
//! assert!(rules.is_permitted("user[emails][]"));
//! assert!(!rules.is_permitted("user[admin]"));
//! assert!(!rules.is_permitted("user[name"));
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod compile;
mod hop;
mod node;
mod permittable;
mod rule;
mod trace;
mod values;

#[cfg(feature = "params")]
mod config;
#[cfg(feature = "params")]
mod decode;
#[cfg(feature = "params")]
mod params;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use hop::{tokenize, Hop};
pub use node::Node;
pub use permittable::{compile, is_permitted, Permittable};
pub use values::Values;

// Trace types
pub use trace::{MatchTrace, NodeTrace};

// Params (feature-gated)
#[cfg(feature = "params")]
pub use config::ParamsConfig;
#[cfg(feature = "params")]
pub use decode::decode;
#[cfg(feature = "params")]
pub use params::{Params, ParamsError};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use permit::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        CompileError,
        // Core types
        Hop,
        // Trace types
        MatchTrace,
        Node,
        NodeTrace,
        Permittable,
        Values,
    };

    #[cfg(feature = "params")]
    pub use crate::{Params, ParamsConfig, ParamsError};
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum length of one rule fragment, in bytes.
pub const MAX_RULE_LENGTH: usize = 8192;

/// Maximum nesting depth of a compiled rule tree.
///
/// A `Key` or empty group counts as one level; every enclosing group adds
/// one. See [`Node::depth`].
pub const MAX_DEPTH: usize = 32;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from rule compilation.
///
/// These errors surface when rules are configured, never while matching.
/// Fix the rule text and compile again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// No rule fragments were given.
    EmptyRuleSet,
    /// A fragment is empty or only whitespace.
    EmptyRule,
    /// A fragment exceeds [`MAX_RULE_LENGTH`].
    RuleTooLong {
        /// Actual length in bytes.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },
    /// A fragment contains characters outside the rule alphabet.
    InvalidChars {
        /// The offending fragment.
        rule: String,
        /// Each offending character once, in order of appearance.
        chars: Vec<char>,
    },
    /// A group delimiter has no partner.
    Unbalanced {
        /// The offending fragment.
        rule: String,
        /// The unpaired delimiter.
        bracket: char,
    },
    /// A group was opened with one delimiter kind and closed with the other.
    MismatchedGroup {
        /// The offending fragment.
        rule: String,
        /// Opening delimiter.
        open: char,
        /// Closing delimiter.
        close: char,
    },
    /// A comma-separated entry is not `key`, `key:{..}`, `key:[..]` or a group.
    InvalidEntry {
        /// The offending fragment.
        rule: String,
        /// The entry, with nested groups shown as `...`.
        entry: String,
    },
    /// A group appears in an object without a key.
    UnnamedGroup {
        /// The offending fragment.
        rule: String,
    },
    /// A group reference pointed outside the working list or was used twice.
    DanglingReference {
        /// The fragment being compiled.
        rule: String,
        /// The reference index.
        index: usize,
    },
    /// The same key was declared with incompatible shapes.
    ConflictingRule {
        /// Bracket path of the key (empty for the top level).
        key: String,
    },
    /// Rule nesting exceeds [`MAX_DEPTH`].
    DepthExceeded {
        /// Actual depth.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRuleSet => f.write_str("no permit rules given"),
            Self::EmptyRule => f.write_str("permit rule is empty"),
            Self::RuleTooLong { len, max } => {
                write!(f, "rule length is {len}, but maximum allowed is {max}")
            }
            Self::InvalidChars { rule, chars } => {
                let chars: String = chars.iter().collect();
                write!(f, "rule \"{rule}\" contains invalid characters: \"{chars}\"")
            }
            Self::Unbalanced { rule, bracket } => {
                write!(f, "rule \"{rule}\" has an unbalanced '{bracket}'")
            }
            Self::MismatchedGroup { rule, open, close } => {
                write!(f, "rule \"{rule}\" opens a group with '{open}' but closes it with '{close}'")
            }
            Self::InvalidEntry { rule, entry } => {
                if entry.is_empty() {
                    write!(f, "rule \"{rule}\" has an empty entry")
                } else {
                    write!(f, "rule \"{rule}\" has an invalid entry \"{entry}\"")
                }
            }
            Self::UnnamedGroup { rule } => {
                write!(f, "rule \"{rule}\" has a group without a key inside an object")
            }
            Self::DanglingReference { rule, index } => {
                write!(f, "rule \"{rule}\" refers to unknown group {index}")
            }
            Self::ConflictingRule { key } => {
                if key.is_empty() {
                    f.write_str("rules declare conflicting top-level shapes")
                } else {
                    write!(f, "rules declare conflicting shapes for key \"{key}\"")
                }
            }
            Self::DepthExceeded { depth, max } => {
                write!(
                    f,
                    "rule nesting depth is {depth}, but maximum allowed is {max}"
                )
            }
        }
    }
}

impl std::error::Error for CompileError {}
