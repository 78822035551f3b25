//! `Array`: lists whose elements each match one of the child alternatives.

use serde_json::Value;

use super::{LengthRules, optional_outcome};
use crate::error::ValidationError;
use crate::kind::{ChildArity, Kind, Outcome};
use crate::node::{Children, Validator};
use crate::options::{Options, type_name};

/// Accepts JSON arrays.
///
/// Each element is tried against the children in order and takes the value
/// of the first one that accepts it. With no children every element is
/// accepted. When no alternative matches, the first alternative's error is
/// reported, wrapped as `Error validating element <key>[<i>]: ...`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Array;

impl Kind for Array {
    fn arity(&self) -> ChildArity {
        ChildArity::List
    }

    fn check_options(&self, options: &Options) -> Result<(), ValidationError> {
        LengthRules::from_options(options, "").map(drop)
    }

    fn check(
        &self,
        options: &Options,
        children: &Children,
        data: Option<&Value>,
        key: &str,
    ) -> Result<Outcome, ValidationError> {
        if let Some(outcome) = optional_outcome(options, data, key)? {
            return Ok(outcome);
        }
        let Some(Value::Array(items)) = data else {
            return Err(ValidationError::type_mismatch(
                key.to_owned(),
                "Array",
                type_name(data),
            ));
        };

        LengthRules::from_options(options, key)?.check(items.len(), key)?;

        let alternatives = match children {
            Children::List(list) if !list.is_empty() => list.as_slice(),
            _ => return Ok(Outcome::Accepted(Value::Array(items.clone()))),
        };

        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let path = format!("{key}[{index}]");
                match_alternative(alternatives, item, &path)
                    .map_err(|cause| ValidationError::element(path, cause))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|values| Outcome::Accepted(Value::Array(values)))
    }
}

fn match_alternative(
    alternatives: &[Validator],
    item: &Value,
    path: &str,
) -> Result<Value, ValidationError> {
    let mut first_error = None;
    for alternative in alternatives {
        match alternative.parse(Some(item), path, false) {
            Ok(outcome) => return Ok(outcome.into_value().unwrap_or(Value::Null)),
            Err(err) => {
                first_error.get_or_insert(err);
            }
        }
    }
    Err(first_error.unwrap_or_else(|| {
        ValidationError::type_mismatch(path.to_owned(), "Array element", type_name(Some(item)))
    }))
}
