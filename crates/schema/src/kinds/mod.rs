//! Standard validator kinds.
//!
//! | Kind | Children | Options |
//! |------|----------|---------|
//! | `Any` | - | `opt` |
//! | `Boolean` | - | `opt` |
//! | `Number` | - | `opt`, `min`, `max`, `integer` |
//! | `String` | - | `opt`, `length`, `minLength`, `maxLength`, `pattern`, `enum`, `trim`, `lowercase`, `uppercase` |
//! | `Array` | list | `opt`, `length`, `minLength`, `maxLength` |
//! | `Object` | map | `opt`, `strict` |
//! | `Email` | - | `opt` |
//! | `FastEmail` | - | - |

mod any;
mod array;
mod boolean;
mod email;
mod number;
mod object;
mod string;

pub use any::Any;
pub use array::Array;
pub use boolean::Boolean;
pub use email::{Email, FastEmail};
pub use number::Number;
pub use object::Object;
pub use string::StringKind;

use serde_json::Value;

use crate::error::ValidationError;
use crate::kind::Outcome;
use crate::options::{OPT, Options, OptionsExt};
use crate::registry::RegistryBuilder;

/// Registers every standard kind on `builder`.
pub fn register_standard(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .register("Any", Any)
        .register("Boolean", Boolean)
        .register("Number", Number)
        .register("String", StringKind::new())
        .register("Array", Array)
        .register("Object", Object)
        .register("Email", Email)
        .register("FastEmail", FastEmail)
}

/// Short-circuits absent or null data on optional nodes.
///
/// Absent data becomes an omission, explicit `null` is accepted as is.
/// Returns `None` when the kind has to look at the data itself. A non-boolean
/// `opt` is an `invalid_option` error at `key`.
pub(crate) fn optional_outcome(
    options: &Options,
    data: Option<&Value>,
    key: &str,
) -> Result<Option<Outcome>, ValidationError> {
    if !options.flag(OPT, key)? {
        return Ok(None);
    }
    Ok(match data {
        None => Some(Outcome::Omitted),
        Some(Value::Null) => Some(Outcome::Accepted(Value::Null)),
        Some(_) => None,
    })
}

// ============================================================================
// LENGTH RULES
// ============================================================================

/// `length` / `minLength` / `maxLength`, shared by strings and arrays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LengthRules {
    exact: Option<usize>,
    min: Option<usize>,
    max: Option<usize>,
}

impl LengthRules {
    pub(crate) fn from_options(options: &Options, key: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            exact: options.usize_opt("length", key)?,
            min: options.usize_opt("minLength", key)?,
            max: options.usize_opt("maxLength", key)?,
        })
    }

    pub(crate) fn check(self, actual: usize, key: &str) -> Result<(), ValidationError> {
        if let Some(exact) = self.exact
            && actual != exact
        {
            return Err(length_error(key, "length", "exactly", exact, actual));
        }
        if let Some(min) = self.min
            && actual < min
        {
            return Err(length_error(key, "min_length", "at least", min, actual));
        }
        if let Some(max) = self.max
            && actual > max
        {
            return Err(length_error(key, "max_length", "at most", max, actual));
        }
        Ok(())
    }
}

fn length_error(
    key: &str,
    code: &'static str,
    bound: &str,
    expected: usize,
    actual: usize,
) -> ValidationError {
    ValidationError::constraint(
        key.to_owned(),
        code,
        format!("Length must be {bound} {expected}, got {actual}"),
    )
    .with_param("expected", expected.to_string())
    .with_param("actual", actual.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn options(value: Value) -> Options {
        serde_json::from_value(value).unwrap()
    }

    #[rstest]
    #[case(json!({"length": 3}), 3, None)]
    #[case(json!({"length": 3}), 2, Some("length"))]
    #[case(json!({"minLength": 2}), 1, Some("min_length"))]
    #[case(json!({"minLength": 2}), 9, None)]
    #[case(json!({"maxLength": 2}), 3, Some("max_length"))]
    #[case(json!({}), 100, None)]
    fn length_rules(#[case] opts: Value, #[case] actual: usize, #[case] code: Option<&str>) {
        let rules = LengthRules::from_options(&options(opts), "schema").unwrap();
        let result = rules.check(actual, "schema");
        assert_eq!(result.err().map(|e| e.code.into_owned()).as_deref(), code);
    }

    #[test]
    fn length_message() {
        let rules = LengthRules::from_options(&options(json!({"minLength": 3})), "k").unwrap();
        let err = rules.check(2, "k").unwrap_err();
        assert_eq!(err.to_string(), "Length must be at least 3, got 2");
        assert_eq!(err.param("expected"), Some("3"));
    }

    #[test]
    fn optional_outcomes() {
        let opt = options(json!({"opt": true}));
        assert_eq!(optional_outcome(&opt, None, "k").unwrap(), Some(Outcome::Omitted));
        assert_eq!(
            optional_outcome(&opt, Some(&Value::Null), "k").unwrap(),
            Some(Outcome::Accepted(Value::Null))
        );
        assert_eq!(optional_outcome(&opt, Some(&json!(1)), "k").unwrap(), None);
        assert_eq!(
            optional_outcome(&options(json!({"opt": false})), None, "k").unwrap(),
            None
        );
    }

    #[rstest]
    #[case(json!("yes"))]
    #[case(json!(1))]
    fn non_boolean_opt_is_rejected(#[case] opt: Value) {
        let err = optional_outcome(&options(json!({"opt": opt})), None, "schema.a").unwrap_err();
        assert_eq!(err.code, "invalid_option");
        assert_eq!(err.param("option"), Some("opt"));
        assert_eq!(err.path.as_deref(), Some("schema.a"));
    }
}
