//! `Boolean`: accepts `true` and `false`.

use serde_json::Value;

use super::optional_outcome;
use crate::error::ValidationError;
use crate::kind::{Kind, Outcome};
use crate::node::Children;
use crate::options::{Options, type_name};

/// Accepts JSON booleans.
#[derive(Debug, Clone, Copy, Default)]
pub struct Boolean;

impl Kind for Boolean {
    fn check(
        &self,
        options: &Options,
        _children: &Children,
        data: Option<&Value>,
        key: &str,
    ) -> Result<Outcome, ValidationError> {
        if let Some(outcome) = optional_outcome(options, data, key)? {
            return Ok(outcome);
        }
        match data {
            Some(Value::Bool(b)) => Ok(Outcome::Accepted(Value::Bool(*b))),
            other => Err(ValidationError::type_mismatch(
                key.to_owned(),
                "Boolean",
                type_name(other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::boolean;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(true))]
    #[case(json!(false))]
    fn accepts_booleans(#[case] value: Value) {
        assert_eq!(boolean().build().unwrap().validate(&value).unwrap(), value);
    }

    #[rstest]
    #[case(json!("true"), "Got string, required Boolean")]
    #[case(json!(0), "Got number, required Boolean")]
    #[case(json!(null), "Got null, required Boolean")]
    fn rejects_other_types(#[case] value: Value, #[case] message: &str) {
        let err = boolean().build().unwrap().validate(&value).unwrap_err();
        assert_eq!(err.to_string(), message);
    }

    #[test]
    fn optional_null_is_kept() {
        let schema = boolean().optional().build().unwrap();
        assert_eq!(schema.validate(&json!(null)).unwrap(), json!(null));
    }
}
