//! Node options and the merge rule that layers them.
//!
//! Options are a plain JSON object. [`merge`] combines two of them without
//! touching either input: keys of the primary always win, the secondary only
//! fills gaps. Nodes use it to put `{"opt": false}` underneath their stored
//! options at evaluation time and to lay a caller's patch over an
//! inherited option set in [`Validator::clone_with`](crate::Validator::clone_with).

use std::borrow::Cow;
use std::sync::LazyLock;

use serde_json::{Map, Value};

use crate::error::ValidationError;

/// Option name → value mapping attached to every node.
pub type Options = Map<String, Value>;

/// Name of the option every kind honours: absent data is acceptable.
pub const OPT: &str = "opt";

/// Defaults placed beneath every node's options at evaluation time.
pub(crate) static DEFAULT_OPTIONS: LazyLock<Options> = LazyLock::new(|| {
    let mut defaults = Options::new();
    defaults.insert(OPT.to_owned(), Value::Bool(false));
    defaults
});

/// Merges `secondary` beneath `primary`.
///
/// Every key of `primary` is kept as is; keys present only in `secondary` are
/// copied in. Neither input is modified.
///
/// # Examples
///
/// ```rust
/// use nebula_schema::options::{merge, Options};
/// use serde_json::json;
///
/// let primary: Options = serde_json::from_value(json!({"opt": true})).unwrap();
/// let secondary: Options = serde_json::from_value(json!({"opt": false, "min": 1})).unwrap();
///
/// let merged = merge(&primary, &secondary);
/// assert_eq!(merged["opt"], json!(true));
/// assert_eq!(merged["min"], json!(1));
/// ```
#[must_use]
pub fn merge(primary: &Options, secondary: &Options) -> Options {
    let mut merged = primary.clone();
    for (key, value) in secondary {
        if !merged.contains_key(key) {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Returns `options` with the evaluation defaults underneath.
///
/// Borrows when nothing needs to be filled in.
pub(crate) fn with_defaults(options: &Options) -> Cow<'_, Options> {
    if DEFAULT_OPTIONS.keys().all(|key| options.contains_key(key)) {
        Cow::Borrowed(options)
    } else {
        Cow::Owned(merge(options, &DEFAULT_OPTIONS))
    }
}

/// JSON type name of a value, `undefined` when absent.
#[must_use]
pub fn type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

// ============================================================================
// TYPED ACCESSORS
// ============================================================================

/// Typed reads of option values.
///
/// A missing option reads as `None` (or `false` for flags); a present option
/// of the wrong type is reported as an `invalid_option` constraint error at
/// `path`, so a misconfigured schema fails loudly instead of silently
/// ignoring the rule.
pub trait OptionsExt {
    /// Boolean flag; missing means `false`.
    fn flag(&self, name: &str, path: &str) -> Result<bool, ValidationError>;

    /// Non-negative integer option.
    fn usize_opt(&self, name: &str, path: &str) -> Result<Option<usize>, ValidationError>;

    /// Numeric option.
    fn f64_opt(&self, name: &str, path: &str) -> Result<Option<f64>, ValidationError>;

    /// String option.
    fn str_opt(&self, name: &str, path: &str) -> Result<Option<&str>, ValidationError>;

    /// Array option.
    fn array_opt(&self, name: &str, path: &str) -> Result<Option<&[Value]>, ValidationError>;
}

impl OptionsExt for Options {
    fn flag(&self, name: &str, path: &str) -> Result<bool, ValidationError> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(ValidationError::invalid_option(path.to_owned(), name, "a boolean")),
        }
    }

    fn usize_opt(&self, name: &str, path: &str) -> Result<Option<usize>, ValidationError> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n.as_u64().map(|n| Some(n as usize)).ok_or_else(|| {
                ValidationError::invalid_option(path.to_owned(), name, "a non-negative integer")
            }),
            Some(_) => Err(ValidationError::invalid_option(
                path.to_owned(),
                name,
                "a non-negative integer",
            )),
        }
    }

    fn f64_opt(&self, name: &str, path: &str) -> Result<Option<f64>, ValidationError> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(_) => Err(ValidationError::invalid_option(path.to_owned(), name, "a number")),
        }
    }

    fn str_opt(&self, name: &str, path: &str) -> Result<Option<&str>, ValidationError> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(ValidationError::invalid_option(path.to_owned(), name, "a string")),
        }
    }

    fn array_opt(&self, name: &str, path: &str) -> Result<Option<&[Value]>, ValidationError> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(_) => Err(ValidationError::invalid_option(path.to_owned(), name, "an array")),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
