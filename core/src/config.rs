//! Serde-deserializable params configuration
//!
//! These types mirror how a params configuration is written in a file and
//! load into a runtime [`Params`](crate::Params) via
//! [`Params::from_config`](crate::Params::from_config).
//!
//! ```
//! use permit::{Params, ParamsConfig};
//!
//! let config: ParamsConfig = serde_json::from_str(r#"{
//!     "require": "user",
//!     "permit": ["name", "emails:[]"]
//! }"#).unwrap();
//!
//! let params = Params::from_config(config).unwrap();
//! assert_eq!(params.required(), Some("user"));
//! ```

use serde::Deserialize;

/// A params configuration: an optional required root and the permit rules.
///
/// With no rules every key under the root reaches decode unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamsConfig {
    /// Root key every parameter must live under (`user` for `user[name]`).
    #[serde(default)]
    pub require: Option<String>,

    /// Rule fragments, combined as alternatives.
    #[serde(default)]
    pub permit: Vec<String>,
}
