//! Structural decode: flat bracket keys into a nested document
//!
//! ```text
//! user[name]=ada                 {"user": {"name": "ada",
//! user[tags][]=a, user[tags][]=b            "tags": ["a", "b"],
//! user[pets][1][kind]=cat                   "pets": [{"kind": "dog"},
//! user[pets][0][kind]=dog                            {"kind": "cat"}]}}
//! ```
//!
//! Numeric indexes only order array slots; gaps are closed. The document is
//! then handed to serde, so any `Deserialize` type whose fields are strings,
//! sequences, options or nested structs of those can be decoded.

use crate::{tokenize, Hop, ParamsError, Values};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Decode flat values into `T` without filtering.
///
/// Use [`Params::decode`](crate::Params::decode) to filter first.
///
/// # Errors
///
/// - [`ParamsError::InvalidPath`] for a key that does not tokenize
/// - [`ParamsError::ConflictingPath`] when two keys disagree about a shape
/// - [`ParamsError::Decode`] when the document does not fit `T`
///
/// # Example
///
/// ```
/// use permit::{decode, Values};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Item { key: String }
///
/// #[derive(Deserialize)]
/// struct Form { arr: Vec<Item> }
///
/// let values = Values::new()
///     .with("arr[0][key]", "k1")
///     .with("arr[1][key]", "k2");
///
/// let form: Form = decode(&values).unwrap();
/// assert_eq!(form.arr[1].key, "k2");
/// ```
pub fn decode<T: DeserializeOwned>(values: &Values) -> Result<T, ParamsError> {
    let document = document(values)?;
    serde_json::from_value(document).map_err(|e| ParamsError::Decode {
        source: e.to_string(),
    })
}

/// Build the nested document for `values`.
pub(crate) fn document(values: &Values) -> Result<Value, ParamsError> {
    let mut root = Slot::Empty;
    for (key, items) in values {
        let hops = tokenize(key).ok_or_else(|| ParamsError::InvalidPath {
            path: key.to_owned(),
        })?;
        root.insert(&hops, items)
            .ok_or_else(|| ParamsError::ConflictingPath {
                path: key.to_owned(),
            })?;
    }
    Ok(match root {
        Slot::Empty => Value::Object(Map::new()),
        slot => slot.into_value(),
    })
}

/// A document node under construction.
enum Slot {
    Empty,
    Leaf(Vec<String>),
    Object(BTreeMap<String, Slot>),
    Array {
        slots: BTreeMap<usize, Slot>,
        appended: Vec<String>,
    },
}

impl Slot {
    /// Place `items` at `hops` below this node. `None` on a shape conflict.
    fn insert(&mut self, hops: &[Hop<'_>], items: &[String]) -> Option<()> {
        let Some((hop, rest)) = hops.split_first() else {
            return match self {
                Self::Empty => {
                    *self = Self::Leaf(items.to_vec());
                    Some(())
                }
                _ => None,
            };
        };

        if hop.is_anonymous() {
            let (_, appended) = self.as_array()?;
            appended.extend_from_slice(items);
            return Some(());
        }

        if hop.is_numeric() {
            let index: usize = hop.text()?.parse().ok()?;
            let (slots, _) = self.as_array()?;
            return slots.entry(index).or_insert(Self::Empty).insert(rest, items);
        }

        let key = hop.text()?;
        self.as_object()?
            .entry(key.to_owned())
            .or_insert(Self::Empty)
            .insert(rest, items)
    }

    fn as_object(&mut self) -> Option<&mut BTreeMap<String, Slot>> {
        if matches!(self, Self::Empty) {
            *self = Self::Object(BTreeMap::new());
        }
        match self {
            Self::Object(members) => Some(members),
            _ => None,
        }
    }

    fn as_array(&mut self) -> Option<(&mut BTreeMap<usize, Slot>, &mut Vec<String>)> {
        if matches!(self, Self::Empty) {
            *self = Self::Array {
                slots: BTreeMap::new(),
                appended: Vec::new(),
            };
        }
        match self {
            Self::Array { slots, appended } => Some((slots, appended)),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Leaf(mut items) => {
                if items.len() == 1 {
                    Value::String(items.remove(0))
                } else {
                    Value::Array(items.into_iter().map(Value::String).collect())
                }
            }
            Self::Object(members) => Value::Object(
                members
                    .into_iter()
                    .map(|(key, slot)| (key, slot.into_value()))
                    .collect(),
            ),
            Self::Array { slots, appended } => Value::Array(
                slots
                    .into_values()
                    .map(Slot::into_value)
                    .chain(appended.into_iter().map(Value::String))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn nested_document() {
        let values = Values::new()
            .with("user[name]", "ada")
            .with("user[tags][]", "a")
            .with("user[tags][]", "b")
            .with("user[pets][1][kind]", "cat")
            .with("user[pets][0][kind]", "dog");
        assert_eq!(
            document(&values).unwrap(),
            json!({
                "user": {
                    "name": "ada",
                    "tags": ["a", "b"],
                    "pets": [{"kind": "dog"}, {"kind": "cat"}],
                }
            })
        );
    }

    #[test]
    fn gaps_are_closed() {
        let values = Values::new().with("a[7]", "x").with("a[2]", "y");
        assert_eq!(document(&values).unwrap(), json!({"a": ["y", "x"]}));
    }

    #[test]
    fn indexes_sort_numerically() {
        let values = Values::new().with("a[10]", "ten").with("a[9]", "nine");
        assert_eq!(document(&values).unwrap(), json!({"a": ["nine", "ten"]}));
    }

    #[test]
    fn repeated_leaf_becomes_list() {
        let values = Values::new().with("a", "1").with("a", "2");
        assert_eq!(document(&values).unwrap(), json!({"a": ["1", "2"]}));
    }

    #[test]
    fn top_level_array() {
        let values = Values::new().with("0", "x").with("1", "y");
        assert_eq!(document(&values).unwrap(), json!(["x", "y"]));
    }

    #[test]
    fn empty_values_are_an_empty_object() {
        assert_eq!(document(&Values::new()).unwrap(), json!({}));
    }

    #[test]
    fn conflicting_shapes() {
        let values = Values::new().with("a", "1").with("a[b]", "2");
        assert_eq!(
            document(&values),
            Err(ParamsError::ConflictingPath {
                path: "a[b]".into()
            })
        );

        let values = Values::new().with("a[0]", "1").with("a[b]", "2");
        assert!(matches!(
            document(&values),
            Err(ParamsError::ConflictingPath { .. })
        ));
    }

    #[test]
    fn invalid_path() {
        let values = Values::new().with("a[b", "1");
        assert_eq!(
            document(&values),
            Err(ParamsError::InvalidPath { path: "a[b".into() })
        );
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        key: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Form {
        arr: Vec<Item>,
        #[serde(default)]
        note: Option<String>,
    }

    #[test]
    fn decode_array_of_records() {
        let values = Values::new()
            .with("arr[0][key]", "k1")
            .with("arr[1][key]", "k2");
        let form: Form = decode(&values).unwrap();
        assert_eq!(
            form,
            Form {
                arr: vec![Item { key: "k1".into() }, Item { key: "k2".into() }],
                note: None,
            }
        );
    }

    #[test]
    fn decode_failure_is_reported() {
        let values = Values::new().with("arr", "flat");
        let err = decode::<Form>(&values).unwrap_err();
        assert!(matches!(err, ParamsError::Decode { .. }));
    }
}
