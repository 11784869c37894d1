//! Rule grammar: character validation, keys, group scanning
//!
//! The lexical half of the rule language. The [compiler](crate::compile)
//! drives these pieces; nothing here builds nodes.
//!
//! ```text
//! rule    := group | entries
//! group   := '{' entries? '}' | '[' entries? ']'
//! entries := entry (',' entry)*
//! entry   := key | key ':' group | group        (bare group: arrays only)
//! key     := [%A-Za-z0-9_]+ | '\'' [%A-Za-z0-9_ ]+ '\''
//! ```
//!
//! During reduction an already-built group is written back into the rule
//! text as a reference token `@N@`; `@` is outside the user alphabet so a
//! token can never be forged by rule text.

use std::sync::LazyLock;

use regex::Regex;

static INVALID_RULE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_ %,:'{}\[\]]").expect("rule alphabet literal"));

static KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:'([%A-Za-z0-9_ ]+)'|([%A-Za-z0-9_]+))$").expect("rule key literal")
});

/// Characters in `rule` outside the rule alphabet, de-duplicated, first seen first.
pub(crate) fn invalid_chars(rule: &str) -> Vec<char> {
    let mut found: Vec<char> = Vec::new();
    for m in INVALID_RULE_CHARS.find_iter(rule) {
        for c in m.as_str().chars() {
            if !found.contains(&c) {
                found.push(c);
            }
        }
    }
    found
}

/// The literal key name of a plain or single-quoted key, quotes stripped.
pub(crate) fn parse_key(text: &str) -> Option<&str> {
    let caps = KEY.captures(text)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

/// Reference token for working-list slot `index`.
pub(crate) fn token(index: usize) -> String {
    format!("@{index}@")
}

/// Parse a whole `@N@` reference token.
pub(crate) fn parse_token(text: &str) -> Option<usize> {
    let digits = text.strip_prefix('@')?.strip_suffix('@')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Replace reference tokens with `...` so error messages only show user text.
pub(crate) fn describe(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('@') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('@') {
            Some(end) => {
                out.push_str("...");
                rest = &after[end + 1..];
            }
            None => {
                rest = &rest[start..];
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

/// The two group shapes of the rule language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GroupKind {
    /// `{ ... }`
    Object,
    /// `[ ... ]`
    Array,
}

impl GroupKind {
    fn from_open(c: char) -> Option<Self> {
        match c {
            '{' => Some(Self::Object),
            '[' => Some(Self::Array),
            _ => None,
        }
    }

    fn from_close(c: char) -> Option<Self> {
        match c {
            '}' => Some(Self::Object),
            ']' => Some(Self::Array),
            _ => None,
        }
    }

    pub(crate) fn open(self) -> char {
        match self {
            Self::Object => '{',
            Self::Array => '[',
        }
    }

    pub(crate) fn close(self) -> char {
        match self {
            Self::Object => '}',
            Self::Array => ']',
        }
    }
}

/// Location of an innermost group: byte offsets of its delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Group {
    pub kind: GroupKind,
    pub open: usize,
    pub close: usize,
}

/// Why the text could not be scanned for groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScanError {
    /// A delimiter without a partner.
    Unbalanced(char),
    /// `open` was closed by the other kind's delimiter.
    Mismatched { open: char, close: char },
}

/// Find the first group that contains no other group.
///
/// The first closing delimiter in the text and the nearest opening delimiter
/// before it bound such a group. `Ok(None)` means no delimiters remain.
pub(crate) fn innermost_group(text: &str) -> Result<Option<Group>, ScanError> {
    let Some((close, close_kind)) = text
        .char_indices()
        .find_map(|(i, c)| GroupKind::from_close(c).map(|k| (i, k)))
    else {
        return match text.chars().find(|c| GroupKind::from_open(*c).is_some()) {
            Some(c) => Err(ScanError::Unbalanced(c)),
            None => Ok(None),
        };
    };

    let Some((open, open_kind)) = text[..close]
        .char_indices()
        .rev()
        .find_map(|(i, c)| GroupKind::from_open(c).map(|k| (i, k)))
    else {
        return Err(ScanError::Unbalanced(close_kind.close()));
    };

    if open_kind != close_kind {
        return Err(ScanError::Mismatched {
            open: open_kind.open(),
            close: close_kind.close(),
        });
    }

    Ok(Some(Group {
        kind: open_kind,
        open,
        close,
    }))
}

/// One comma-separated entry of a group body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Entry<'a> {
    /// `key`
    Key(&'a str),
    /// `key:@N@`
    Keyed(&'a str, usize),
    /// `@N@`
    Group(usize),
}

/// Split a group body into entries.
///
/// A blank body is an empty group. `Err` carries the offending entry text.
pub(crate) fn parse_entries(body: &str) -> Result<Vec<Entry<'_>>, &str> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    body.split(',').map(parse_entry).collect()
}

fn parse_entry(raw: &str) -> Result<Entry<'_>, &str> {
    let entry = raw.trim();

    if let Some((key, target)) = entry.split_once(':') {
        let key = parse_key(key.trim()).ok_or(entry)?;
        let index = parse_token(target.trim()).ok_or(entry)?;
        return Ok(Entry::Keyed(key, index));
    }

    if let Some(index) = parse_token(entry) {
        return Ok(Entry::Group(index));
    }

    parse_key(entry).map(Entry::Key).ok_or(entry)
}
