//! Params: require a root, permit rules, filter and decode
//!
//! The configuration chain over a flat [`Values`] map:
//!
//! ```text
//! Values ──require──▶ re-rooted Values ──permit──▶ filtered Values ──decode──▶ T
//! ```
//!
//! Every step is optional. A `Params` is immutable once built and can be
//! shared across threads.

use crate::decode;
use crate::{CompileError, ParamsConfig, Permittable, Values};
use serde::de::DeserializeOwned;
use std::fmt;
use std::str::FromStr;

/// A strong-params configuration.
///
/// # Example
///
/// ```
/// use permit::{Params, Values};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct User { name: String, #[serde(default)] admin: Option<String> }
///
/// let params = Params::new().require("user")?.permit(["name"])?;
///
/// let values = Values::new()
///     .with("user[name]", "ada")
///     .with("user[admin]", "true");
///
/// let user: User = params.decode(&values)?;
/// assert_eq!(user.name, "ada");
/// assert_eq!(user.admin, None);
/// # Ok::<(), permit::ParamsError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Params {
    require: Option<String>,
    rules: Option<Permittable>,
}

impl Params {
    /// No required root and no rules: every key passes through.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require every key to live under `key` and strip that root before
    /// the rules see it (`key[a][b]` becomes `a[b]`).
    ///
    /// # Errors
    ///
    /// [`ParamsError::EmptyRequiredKey`] when `key` is empty.
    pub fn require(mut self, key: impl Into<String>) -> Result<Self, ParamsError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ParamsError::EmptyRequiredKey);
        }
        self.require = Some(key);
        Ok(self)
    }

    /// Compile permit rules; keys the rules do not permit are dropped.
    ///
    /// # Errors
    ///
    /// [`ParamsError::Compile`] when the rules do not compile.
    pub fn permit<I, S>(mut self, rules: I) -> Result<Self, ParamsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.rules = Some(Permittable::compile(rules)?);
        Ok(self)
    }

    /// Build params from a deserialized configuration.
    ///
    /// # Errors
    ///
    /// Same as [`require`](Self::require) and [`permit`](Self::permit).
    pub fn from_config(config: ParamsConfig) -> Result<Self, ParamsError> {
        let mut params = Self::new();
        if let Some(root) = config.require {
            params = params.require(root)?;
        }
        if !config.permit.is_empty() {
            params = params.permit(config.permit)?;
        }
        Ok(params)
    }

    /// The required root key, if any.
    #[must_use]
    pub fn required(&self) -> Option<&str> {
        self.require.as_deref()
    }

    /// The compiled rules, if any.
    #[must_use]
    pub fn rules(&self) -> Option<&Permittable> {
        self.rules.as_ref()
    }

    /// Re-root and prune `values`. The input is left untouched.
    ///
    /// # Errors
    ///
    /// [`ParamsError::MissingRequiredKey`] when a root is required and no key
    /// is the root itself or starts with `root[`.
    pub fn filter(&self, values: &Values) -> Result<Values, ParamsError> {
        let mut filtered = Values::new();
        match &self.require {
            Some(root) => {
                if !has_root(values, root) {
                    tracing::warn!(root = %root, "required root key is missing");
                    return Err(ParamsError::MissingRequiredKey { key: root.clone() });
                }
                for (key, items) in values {
                    if let Some(key) = reroot(key, root) {
                        self.keep(&mut filtered, key, items);
                    }
                }
            }
            None => {
                for (key, items) in values {
                    self.keep(&mut filtered, key.to_owned(), items);
                }
            }
        }
        Ok(filtered)
    }

    fn keep(&self, filtered: &mut Values, key: String, items: &[String]) {
        if let Some(rules) = &self.rules {
            if !rules.is_permitted(&key) {
                tracing::debug!(key = %key, "dropping unpermitted key");
                return;
            }
        }
        filtered.insert_all(key, items.to_vec());
    }

    /// Filter `values`, then decode the result into `T`.
    ///
    /// # Errors
    ///
    /// Any [`filter`](Self::filter) error, then any [`decode`](crate::decode()) error.
    pub fn decode<T: DeserializeOwned>(&self, values: &Values) -> Result<T, ParamsError> {
        let filtered = self.filter(values)?;
        decode::decode(&filtered)
    }

    /// Parse the first value of the exact key `key`.
    ///
    /// ```
    /// use permit::{Params, Values};
    ///
    /// let values = Values::new().with("page", "3");
    /// let page: u32 = Params::require_one(&values, "page").unwrap();
    /// assert_eq!(page, 3);
    /// ```
    ///
    /// # Errors
    ///
    /// - [`ParamsError::EmptyRequiredKey`] when `key` is empty
    /// - [`ParamsError::MissingRequiredKey`] when `key` is absent
    /// - [`ParamsError::ParseValue`] when the value does not parse
    pub fn require_one<T>(values: &Values, key: &str) -> Result<T, ParamsError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        if key.is_empty() {
            return Err(ParamsError::EmptyRequiredKey);
        }
        if !values.contains_key(key) {
            return Err(ParamsError::MissingRequiredKey {
                key: key.to_owned(),
            });
        }
        let value = values.get(key).unwrap_or_default();
        value.parse().map_err(|e: T::Err| ParamsError::ParseValue {
            key: key.to_owned(),
            value: value.to_owned(),
            source: e.to_string(),
        })
    }
}

fn has_root(values: &Values, root: &str) -> bool {
    values.keys().any(|key| {
        key == root
            || key
                .strip_prefix(root)
                .is_some_and(|rest| rest.starts_with('['))
    })
}

/// `root[a][b]` into `a[b]`: drop `root[` and the first `]` after it.
fn reroot(key: &str, root: &str) -> Option<String> {
    let rest = key.strip_prefix(root)?.strip_prefix('[')?;
    Some(rest.replacen(']', "", 1))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from params configuration, filtering and decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamsError {
    /// [`Params::require`] or [`Params::require_one`] was given an empty key.
    EmptyRequiredKey,
    /// The required key is absent from the values.
    MissingRequiredKey {
        /// The required key.
        key: String,
    },
    /// The permit rules did not compile.
    Compile(CompileError),
    /// A key could not be tokenized for decoding.
    InvalidPath {
        /// The offending key.
        path: String,
    },
    /// A key disagrees with another key about a node's shape (`a` and `a[b]`).
    ConflictingPath {
        /// The key that could not be placed.
        path: String,
    },
    /// The decoded document does not fit the target type.
    Decode {
        /// The underlying error message.
        source: String,
    },
    /// A required value did not parse.
    ParseValue {
        /// The key.
        key: String,
        /// The raw value.
        value: String,
        /// The underlying error message.
        source: String,
    },
    /// A params configuration could not be read.
    InvalidConfig {
        /// The underlying error message.
        source: String,
    },
}

impl fmt::Display for ParamsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRequiredKey => f.write_str("required key cannot be empty"),
            Self::MissingRequiredKey { key } => write!(f, "missing required key `{key}`"),
            Self::Compile(e) => write!(f, "invalid permit rules: {e}"),
            Self::InvalidPath { path } => write!(f, "key `{path}` is not a valid bracket path"),
            Self::ConflictingPath { path } => {
                write!(f, "key `{path}` conflicts with the shape of another key")
            }
            Self::Decode { source } => write!(f, "decode failed: {source}"),
            Self::ParseValue { key, value, source } => {
                write!(f, "failed to parse key `{key}`, value `{value}`: {source}")
            }
            Self::InvalidConfig { source } => write!(f, "invalid config: {source}"),
        }
    }
}

impl std::error::Error for ParamsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Compile(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CompileError> for ParamsError {
    fn from(e: CompileError) -> Self {
        Self::Compile(e)
    }
}
