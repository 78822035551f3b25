//! `Any`: accepts every present value unchanged.

use serde_json::Value;

use super::optional_outcome;
use crate::error::ValidationError;
use crate::kind::{Kind, Outcome};
use crate::node::Children;
use crate::options::Options;

/// Accepts any present value, `null` included.
#[derive(Debug, Clone, Copy, Default)]
pub struct Any;

impl Kind for Any {
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
        data.map(|value| Outcome::Accepted(value.clone()))
            .ok_or_else(|| ValidationError::type_mismatch(key.to_owned(), "Any", "undefined"))
    }
}
