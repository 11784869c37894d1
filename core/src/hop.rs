//! Path tokenizer: bracket-notation keys into typed hops
//!
//! A flattened parameter key such as `root[sub][0][key]` is split into the
//! hops a [`Node`](crate::Node) walk consumes:
//!
//! | Segment | Hop |
//! |---------|-----|
//! | `root` (leading, bare) | `Name("root")` |
//! | `[sub]` | `Index(Some("sub"))`, object key |
//! | `[0]` | `Index(Some("0"))`, array index |
//! | `[]` (trailing only) | `Index(None)`, anonymous array element |
//!
//! Tokenizing fails closed: anything outside the grammar yields `None`, which
//! the matcher reports as "not permitted".

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Optional bare token, then non-empty groups, then at most one trailing `[]`.
static PATH_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[^\[\]]+)?(?:\[[^\[\]]+\])*(?:\[\])?$").expect("path grammar literal")
});

static PATH_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]]*)\]").expect("path group literal"));

/// One decoded segment of a bracket-notation path.
///
/// Hops borrow from the path they were tokenized from; tokenizing never
/// copies key text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hop<'a> {
    /// Bare leading token before any bracket (`root` in `root[a]`).
    Name(&'a str),
    /// One bracket group. `None` is the anonymous element marker `[]`.
    Index(Option<&'a str>),
}

impl<'a> Hop<'a> {
    /// The segment text, if any (`None` only for `[]`).
    #[must_use]
    pub fn text(&self) -> Option<&'a str> {
        match self {
            Self::Name(s) => Some(*s),
            Self::Index(s) => *s,
        }
    }

    /// `true` when the segment is one or more ASCII digits.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.text().is_some_and(is_numeric)
    }

    /// `true` for the anonymous element marker `[]`.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Index(None))
    }

    /// The object key this hop names, if it can name one.
    ///
    /// Numeric hops and `[]` never address object keys.
    #[must_use]
    pub fn object_key(&self) -> Option<&'a str> {
        self.text().filter(|s| !is_numeric(s))
    }

    /// `true` when an array node may consume this hop (index or `[]`).
    #[must_use]
    pub fn is_array_element(&self) -> bool {
        self.is_anonymous() || self.is_numeric()
    }
}

impl fmt::Display for Hop<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(s) => f.write_str(s),
            Self::Index(Some(s)) => write!(f, "[{s}]"),
            Self::Index(None) => f.write_str("[]"),
        }
    }
}

/// Split a bracket-notation path into hops.
///
/// Returns `None` when the path is not tokenizable: empty input, unbalanced
/// or nested brackets, text between groups, or an empty group that is not the
/// last one.
///
/// # Example
///
/// ```
/// use permit::{tokenize, Hop};
///
/// let hops = tokenize("root[items][0][]").unwrap();
/// assert_eq!(
///     hops,
///     vec![
///         Hop::Name("root"),
///         Hop::Index(Some("items")),
///         Hop::Index(Some("0")),
///         Hop::Index(None),
///     ]
/// );
///
/// assert!(tokenize("root[items").is_none());
/// assert!(tokenize("root[][0]").is_none());
/// ```
#[must_use]
pub fn tokenize(path: &str) -> Option<Vec<Hop<'_>>> {
    if path.is_empty() || !PATH_GRAMMAR.is_match(path) {
        return None;
    }

    let (head, groups) = match path.find('[') {
        Some(pos) => path.split_at(pos),
        None => (path, ""),
    };

    let mut hops = Vec::with_capacity(1 + groups.matches('[').count());
    if !head.is_empty() {
        hops.push(Hop::Name(head));
    }

    for caps in PATH_GROUP.captures_iter(groups) {
        let inner = caps.get(1).map_or("", |m| m.as_str());
        hops.push(Hop::Index((!inner.is_empty()).then_some(inner)));
    }

    Some(hops)
}

#[inline]
pub(crate) fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
