//! `Object`: maps whose declared fields are validated by named children.

use serde_json::{Map, Value};

use super::optional_outcome;
use crate::error::ValidationError;
use crate::kind::{ChildArity, Kind, Outcome};
use crate::node::Children;
use crate::options::{Options, OptionsExt, type_name};

/// Accepts JSON objects.
///
/// Every declared field is evaluated at `<key>.<field>`; omitted fields are
/// left out of the result. Undeclared fields are dropped, or rejected when
/// `strict` is set. Without children the object passes through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Object;

impl Kind for Object {
    fn arity(&self) -> ChildArity {
        ChildArity::Map
    }

    fn check_options(&self, options: &Options) -> Result<(), ValidationError> {
        options.flag("strict", "").map(drop)
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
        let Some(Value::Object(fields)) = data else {
            return Err(ValidationError::type_mismatch(
                key.to_owned(),
                "Object",
                type_name(data),
            ));
        };

        let declared = match children {
            Children::Map(map) if !map.is_empty() => map,
            _ => return Ok(Outcome::Accepted(Value::Object(fields.clone()))),
        };

        if options.flag("strict", key)?
            && let Some(extra) = fields.keys().find(|name| !declared.contains_key(*name))
        {
            return Err(ValidationError::constraint(
                format!("{key}.{extra}"),
                "unknown_field",
                format!("Unexpected field {key}.{extra}"),
            )
            .with_param("field", extra.clone()));
        }

        let mut output = Map::new();
        for (name, child) in declared {
            let path = format!("{key}.{name}");
            match child.parse(fields.get(name), &path, false) {
                Ok(Outcome::Accepted(value)) => {
                    output.insert(name.clone(), value);
                }
                Ok(Outcome::Omitted) => {}
                Err(cause) => return Err(ValidationError::field(path, cause)),
            }
        }
        Ok(Outcome::Accepted(Value::Object(output)))
    }
}
