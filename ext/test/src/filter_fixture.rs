//! Filter conformance fixture runner.
//!
//! Exercises the params pipeline end to end: a `require`/`permit`
//! configuration, flat input pairs, and the pairs expected to survive.
//!
//! ```yaml
//! name: require_and_permit
//! require: root
//! permit: ["sub:{key}"]
//! cases:
//!   - name: keeps permitted key
//!     input: ["root[sub][key]=v", "root[admin]=1"]
//!     expect: ["sub[key]=v"]
//!   - name: missing root
//!     input: ["other=1"]
//!     error: missing_required_key
//! ```

use crate::form;
use permit::{Params, ParamsConfig, ParamsError};
use serde::Deserialize;

/// A filter conformance test fixture.
#[derive(Debug, Deserialize)]
pub struct FilterFixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub require: Option<String>,
    #[serde(default)]
    pub permit: Vec<String>,
    pub cases: Vec<FilterCase>,
}

/// A test case within a filter fixture.
///
/// Exactly one of `expect` and `error` is meaningful: `error` names the
/// expected [`ParamsError`] kind in snake case.
#[derive(Debug, Deserialize)]
pub struct FilterCase {
    pub name: String,
    pub input: Vec<String>,
    #[serde(default)]
    pub expect: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl FilterFixture {
    /// Parse multiple filter fixtures from a YAML file with `---` separators.
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Build the params this fixture describes.
    ///
    /// # Errors
    ///
    /// Any configuration error from [`Params::from_config`].
    pub fn params(&self) -> Result<Params, ParamsError> {
        Params::from_config(ParamsConfig {
            require: self.require.clone(),
            permit: self.permit.clone(),
        })
    }

    /// Run all cases and panic on first failure.
    pub fn run_and_assert(&self) {
        let params = self
            .params()
            .unwrap_or_else(|e| panic!("Fixture '{}' config failed: {e}", self.name));

        for case in &self.cases {
            let input = form(case.input.iter().map(String::as_str));
            match (params.filter(&input), &case.error) {
                (Ok(filtered), None) => {
                    let mut actual: Vec<String> = filtered
                        .iter()
                        .flat_map(|(key, values)| values.iter().map(move |v| format!("{key}={v}")))
                        .collect();
                    actual.sort();
                    let mut expected = case.expect.clone();
                    expected.sort();
                    assert_eq!(
                        actual, expected,
                        "Fixture '{}' case '{}' filtered wrong",
                        self.name, case.name
                    );
                }
                (Err(e), Some(kind)) => {
                    assert_eq!(
                        error_kind(&e),
                        kind.as_str(),
                        "Fixture '{}' case '{}' failed with the wrong error: {e}",
                        self.name,
                        case.name
                    );
                }
                (Ok(filtered), Some(kind)) => panic!(
                    "Fixture '{}' case '{}': expected {kind}, got {filtered:?}",
                    self.name, case.name
                ),
                (Err(e), None) => panic!(
                    "Fixture '{}' case '{}' failed: {e}",
                    self.name, case.name
                ),
            }
        }
    }
}

/// Snake-case name of a [`ParamsError`] variant.
#[must_use]
pub fn error_kind(error: &ParamsError) -> &'static str {
    match error {
        ParamsError::EmptyRequiredKey => "empty_required_key",
        ParamsError::MissingRequiredKey { .. } => "missing_required_key",
        ParamsError::Compile(_) => "compile",
        ParamsError::InvalidPath { .. } => "invalid_path",
        ParamsError::ConflictingPath { .. } => "conflicting_path",
        ParamsError::Decode { .. } => "decode",
        ParamsError::ParseValue { .. } => "parse_value",
        ParamsError::InvalidConfig { .. } => "invalid_config",
    }
}
