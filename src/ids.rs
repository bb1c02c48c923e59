//! Wire identifiers
//!
//! Identifiers owned by the backend cross the wire as either JSON strings or JSON
//! numbers. They are all normalised to their string form so that `1`, `1.0` and
//! `"1"` compare equal.

use serde_json::{Number, Value};

/// Normalise a scalar JSON value into identifier text.
///
/// Numbers are rendered the way the storefront renders them (`1.0` becomes `"1"`);
/// anything that is not a string or a number has no identifier form.
pub fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number_text(number)),
        _ => None,
    }
}

fn number_text(number: &Number) -> String {
    if let Some(int) = number.as_i64() {
        int.to_string()
    } else if let Some(uint) = number.as_u64() {
        uint.to_string()
    } else {
        number
            .as_f64()
            .map_or_else(|| number.to_string(), |float| format!("{float}"))
    }
}

/// Declare a string-backed identifier newtype that deserialises from either a
/// JSON string or a JSON number.
macro_rules! wire_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from its string form.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Build an identifier from a scalar JSON value.
            pub fn from_value(value: &serde_json::Value) -> Option<Self> {
                $crate::ids::id_text(value).map(Self)
            }

            /// Returns the normalised string form.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;

                Self::from_value(&value).ok_or_else(|| {
                    <D::Error as serde::de::Error>::custom(concat!(
                        stringify!($name),
                        " must be a string or a number"
                    ))
                })
            }
        }
    };
}

pub(crate) use wire_id;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    wire_id! {
        /// Test identifier
        TestId
    }

    #[test]
    fn integers_and_strings_share_a_form() {
        assert_eq!(id_text(&json!(1)), Some("1".to_string()));
        assert_eq!(id_text(&json!("1")), Some("1".to_string()));
    }

    #[test]
    fn integral_floats_drop_the_fraction() {
        assert_eq!(id_text(&json!(2.0)), Some("2".to_string()));
        assert_eq!(id_text(&json!(2.5)), Some("2.5".to_string()));
    }

    #[test]
    fn non_scalars_have_no_id_form() {
        assert_eq!(id_text(&json!(null)), None);
        assert_eq!(id_text(&json!(true)), None);
        assert_eq!(id_text(&json!([1])), None);
        assert_eq!(id_text(&json!({ "id": 1 })), None);
    }

    #[test]
    fn wire_ids_deserialize_from_numbers_and_strings() -> Result<(), serde_json::Error> {
        let from_number: TestId = serde_json::from_value(json!(42))?;
        let from_string: TestId = serde_json::from_value(json!("42"))?;

        assert_eq!(from_number, from_string);
        assert_eq!(from_number.as_str(), "42");

        Ok(())
    }

    #[test]
    fn wire_ids_reject_objects() {
        let result = serde_json::from_value::<TestId>(json!({ "id": 1 }));

        assert!(result.is_err());
    }
}
