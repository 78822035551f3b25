//! `Number`: numeric values with optional bounds.

use serde_json::{Number as JsonNumber, Value};

use super::optional_outcome;
use crate::error::ValidationError;
use crate::kind::{Kind, Outcome};
use crate::node::Children;
use crate::options::{Options, OptionsExt, type_name};

/// Accepts JSON numbers.
///
/// Options: `min` and `max` (inclusive bounds), `integer` (reject fractions).
#[derive(Debug, Clone, Copy, Default)]
pub struct Number;

#[derive(Debug, Clone, Copy)]
struct Bounds {
    min: Option<f64>,
    max: Option<f64>,
    integer: bool,
}

impl Bounds {
    fn from_options(options: &Options, key: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            min: options.f64_opt("min", key)?,
            max: options.f64_opt("max", key)?,
            integer: options.flag("integer", key)?,
        })
    }

    fn check(self, number: &JsonNumber, key: &str) -> Result<(), ValidationError> {
        let is_integer = number.is_i64()
            || number.is_u64()
            || number.as_f64().is_some_and(|f| f.fract() == 0.0);
        if self.integer && !is_integer {
            return Err(ValidationError::constraint(
                key.to_owned(),
                "integer",
                format!("Expected an integer, got {number}"),
            ));
        }

        let Some(value) = number.as_f64() else {
            return Ok(());
        };
        if let Some(min) = self.min
            && value < min
        {
            return Err(ValidationError::constraint(
                key.to_owned(),
                "min",
                format!("Number must be at least {min}, got {number}"),
            )
            .with_param("min", min.to_string()));
        }
        if let Some(max) = self.max
            && value > max
        {
            return Err(ValidationError::constraint(
                key.to_owned(),
                "max",
                format!("Number must be at most {max}, got {number}"),
            )
            .with_param("max", max.to_string()));
        }
        Ok(())
    }
}

impl Kind for Number {
    fn check_options(&self, options: &Options) -> Result<(), ValidationError> {
        Bounds::from_options(options, "").map(drop)
    }

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
            Some(Value::Number(number)) => {
                Bounds::from_options(options, key)?.check(number, key)?;
                Ok(Outcome::Accepted(Value::Number(number.clone())))
            }
            other => Err(ValidationError::type_mismatch(
                key.to_owned(),
                "Number",
                type_name(other),
            )),
        }
    }
}
