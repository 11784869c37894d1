//! Rule conformance fixture runner
//!
//! Loads YAML fixtures of rules and paths and runs them against the compiler
//! and matcher.
//!
//! ```yaml
//! name: object_keys
//! description: an object permits only its listed keys
//! rules: ["key:{objKey}"]
//! cases:
//!   - path: "key[objKey]"
//!     expect: true
//!   - path: "key[notPresent]"
//!     expect: false
//! ```
//!
//! A fixture with `error: true` asserts that its rules fail to compile.

use permit::Permittable;
use serde::Deserialize;

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub rules: Vec<String>,
    #[serde(default)]
    pub cases: Vec<TestCase>,
    #[serde(default)]
    pub error: bool,
}

/// Test case: one path and whether it is permitted
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub path: String,
    pub expect: bool,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub path: String,
    pub passed: bool,
    pub expected: bool,
    pub actual: bool,
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Compile the rules and run all test cases.
    ///
    /// # Errors
    ///
    /// Returns the compile error message when the rules do not compile.
    pub fn run(&self) -> Result<Vec<CaseResult>, String> {
        let rules = Permittable::compile(&self.rules).map_err(|e| e.to_string())?;
        Ok(self
            .cases
            .iter()
            .map(|case| {
                let actual = rules.is_permitted(&case.path);
                let trace = rules.match_with_trace(&case.path);
                CaseResult {
                    path: case.path.clone(),
                    passed: actual == case.expect && trace.permitted == actual,
                    expected: case.expect,
                    actual,
                }
            })
            .collect())
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self) {
        match self.run() {
            Ok(_) if self.error => {
                panic!("Fixture '{}' compiled, expected a compile error", self.name);
            }
            Ok(results) => {
                for result in results {
                    assert!(
                        result.passed,
                        "Fixture '{}' path '{}' failed: expected {}, got {}",
                        self.name, result.path, result.expected, result.actual
                    );
                }
            }
            Err(_) if self.error => {}
            Err(e) => panic!("Fixture '{}' failed to compile: {e}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
name: first
rules: ["key"]
cases:
  - path: key
    expect: true
---
name: second
description: bad rule
rules: ["a.b"]
error: true
"#;

    #[test]
    fn test_parse_multi() {
        let fixtures = Fixture::from_yaml_multi(YAML).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].cases.len(), 1);
        assert!(fixtures[1].error);
        assert!(fixtures[1].cases.is_empty());
    }

    #[test]
    fn test_run_passing_fixtures() {
        for fixture in Fixture::from_yaml_multi(YAML).unwrap() {
            fixture.run_and_assert();
        }
    }

    #[test]
    fn test_failing_case_is_reported() {
        let fixture = Fixture::from_yaml(
            "name: wrong\nrules: [key]\ncases:\n  - path: other\n    expect: true\n",
        )
        .unwrap();
        let results = fixture.run().unwrap();
        assert!(!results[0].passed);
        assert!(!results[0].actual);
    }
}
