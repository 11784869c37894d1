//! permit-test: helpers and fixtures for conformance testing
//!
//! Builds flat request data from `key=value` pairs and probes compiled rules
//! with a batch of paths at once.
//!
//! # Example
//!
//! ```
//! use permit_test::prelude::*;
//!
//! let values = form(["user[name]=ada", "user[admin]=true"]);
//! assert_eq!(values.get("user[admin]"), Some("true"));
//!
//! let rules = Permittable::compile(["user:{name}"]).unwrap();
//! assert_eq!(
//!     permitted(&rules, ["user[name]", "user[admin]"]),
//!     ["user[name]"]
//! );
//! ```

use permit::{Permittable, Values};

#[cfg(feature = "fixtures")]
pub mod filter_fixture;
#[cfg(feature = "fixtures")]
pub mod fixture;

/// Build [`Values`] from `key=value` pairs.
///
/// Splits on the first `=`; a pair without one is a key with an empty
/// value. No percent-decoding is done.
#[must_use]
pub fn form<'a>(pairs: impl IntoIterator<Item = &'a str>) -> Values {
    pairs
        .into_iter()
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .collect()
}

/// The paths `rules` permits, in input order.
#[must_use]
pub fn permitted<'a>(
    rules: &Permittable,
    paths: impl IntoIterator<Item = &'a str>,
) -> Vec<&'a str> {
    paths
        .into_iter()
        .filter(|path| rules.is_permitted(path))
        .collect()
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{form, permitted};
    pub use permit::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_builder() {
        let values = form(["a=1", "a=2", "b[c]=x=y", "flag"]);

        assert_eq!(values.get_all("a"), ["1", "2"]);
        assert_eq!(values.get("b[c]"), Some("x=y"));
        assert_eq!(values.get("flag"), Some(""));
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_permitted_keeps_order() {
        let rules = Permittable::compile(["b", "a"]).unwrap();
        assert_eq!(permitted(&rules, ["b", "c", "a"]), ["b", "a"]);
    }

    #[test]
    fn test_permitted_none() {
        let rules = Permittable::compile(["{}"]).unwrap();
        assert!(permitted(&rules, ["a", "[]", "[0]"]).is_empty());
    }
}
