//! Error types for schema construction and validation failures
//!
//! Two families live here:
//!
//! - [`ValidationError`]: produced while a schema tree evaluates data. It
//!   carries a machine-readable code, the human-readable message, the path
//!   segment it occurred at and, for failures inside nested elements or
//!   fields, the child error it wraps.
//! - [`SchemaError`]: produced while a schema tree is *built* (unknown kind,
//!   child collection of the wrong shape, malformed option).
//! - [`DeliveryError`]: a deferred result could not be scheduled.
//!
//! All static strings use `Cow<'static, str>` so the common case of a fixed
//! code allocates nothing.

use std::borrow::Cow;
use std::fmt;

use smallvec::SmallVec;

// ============================================================================
// ERROR KIND
// ============================================================================

/// Classification of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The data's runtime type does not match the kind's expectation.
    TypeMismatch,
    /// The data has the right shape but breaks a kind-specific rule.
    ConstraintViolation,
    /// A nested element or field failed.
    ChildValidationFailure,
}

impl ErrorKind {
    /// Stable lowercase name, used in logs and serialized errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TypeMismatch => "type_mismatch",
            Self::ConstraintViolation => "constraint_violation",
            Self::ChildValidationFailure => "child_validation_failure",
        }
    }
}

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// Parameter list attached to an error; almost always 0-3 entries.
pub type ErrorParams = SmallVec<[(Cow<'static, str>, Cow<'static, str>); 3]>;

/// A structured validation failure.
///
/// `Display` prints only [`message`](Self::message), so a parent container can
/// prefix it with its own path segment and the messages compose into
/// `Error validating element schema[1]: Got string, required Number`.
///
/// # Examples
///
/// ```rust
/// use nebula_schema::error::{ErrorKind, ValidationError};
///
/// let err = ValidationError::type_mismatch("schema", "Number", "string");
/// assert_eq!(err.kind, ErrorKind::TypeMismatch);
/// assert_eq!(err.to_string(), "Got string, required Number");
/// ```
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Failure classification.
    pub kind: ErrorKind,

    /// Error code for programmatic handling, e.g. `"min_length"`.
    pub code: Cow<'static, str>,

    /// Human-readable message.
    pub message: Cow<'static, str>,

    /// Path segment the failure occurred at, e.g. `schema[2].name`.
    pub path: Option<Cow<'static, str>>,

    /// Parameters describing the violated rule.
    pub params: ErrorParams,

    /// The child failure this error wraps.
    pub cause: Option<Box<ValidationError>>,
}

impl ValidationError {
    /// Creates a new error with a kind, code and message.
    pub fn new(
        kind: ErrorKind,
        code: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            path: None,
            params: SmallVec::new(),
            cause: None,
        }
    }

    /// Sets the path this error occurred at.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_path(mut self, path: impl Into<Cow<'static, str>>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Adds a parameter to the error.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_param(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Looks up a parameter value by key.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_ref())
    }

    /// Returns the innermost error of the cause chain.
    #[must_use]
    pub fn root_cause(&self) -> &ValidationError {
        let mut current = self;
        while let Some(next) = current.cause.as_deref() {
            current = next;
        }
        current
    }

    /// Number of errors in the chain, this one included.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.cause.as_deref().map_or(0, ValidationError::depth)
    }

    /// Converts the error to a JSON structure (for API responses and logs).
    pub fn to_json_value(&self) -> serde_json::Value {
        use serde_json::json;

        let params: serde_json::Map<String, serde_json::Value> = self
            .params
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();

        json!({
            "kind": self.kind.as_str(),
            "code": self.code,
            "message": self.message,
            "path": self.path,
            "params": params,
            "cause": self.cause.as_deref().map(ValidationError::to_json_value),
        })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ============================================================================
// CONVENIENCE CONSTRUCTORS
// ============================================================================

impl ValidationError {
    /// `Got <actual>, required <expected>`.
    pub fn type_mismatch(
        path: impl Into<Cow<'static, str>>,
        expected: impl Into<Cow<'static, str>>,
        actual: impl Into<Cow<'static, str>>,
    ) -> Self {
        let expected = expected.into();
        let actual = actual.into();
        Self::new(
            ErrorKind::TypeMismatch,
            "type_mismatch",
            format!("Got {actual}, required {expected}"),
        )
        .with_path(path)
        .with_param("expected", expected)
        .with_param("actual", actual)
    }

    /// A kind-specific rule was broken.
    pub fn constraint(
        path: impl Into<Cow<'static, str>>,
        code: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(ErrorKind::ConstraintViolation, code, message).with_path(path)
    }

    /// An option carried a value of the wrong type.
    pub fn invalid_option(path: impl Into<Cow<'static, str>>, option: &str, expected: &str) -> Self {
        Self::constraint(
            path,
            "invalid_option",
            format!("Option `{option}` must be {expected}"),
        )
        .with_param("option", option.to_owned())
        .with_param("expected", expected.to_owned())
    }

    /// `Error validating element <path>: <cause>`.
    pub fn element(path: impl Into<Cow<'static, str>>, cause: ValidationError) -> Self {
        Self::wrap("element", path.into(), cause)
    }

    /// `Error validating field <path>: <cause>`.
    pub fn field(path: impl Into<Cow<'static, str>>, cause: ValidationError) -> Self {
        Self::wrap("field", path.into(), cause)
    }

    fn wrap(segment: &'static str, path: Cow<'static, str>, cause: ValidationError) -> Self {
        Self {
            kind: ErrorKind::ChildValidationFailure,
            code: Cow::Borrowed("child_failed"),
            message: Cow::Owned(format!("Error validating {segment} {path}: {cause}")),
            path: Some(path),
            params: SmallVec::new(),
            cause: Some(Box::new(cause)),
        }
    }
}

// ============================================================================
// SCHEMA ERROR
// ============================================================================

/// Failure to build a schema tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SchemaError {
    /// No kind is registered under this name.
    #[error("unknown validator kind `{0}`")]
    UnknownKind(String),

    /// A child collection was supplied whose shape the kind does not accept.
    #[error("validator kind `{kind}` takes {expected} children, got {got}")]
    ChildArity {
        kind: String,
        expected: &'static str,
        got: &'static str,
    },

    /// An options argument was not a JSON object.
    #[error("options must be a JSON object, got {0}")]
    OptionsNotObject(&'static str),

    /// An option value is malformed (e.g. an invalid regex pattern).
    #[error("invalid option `{option}` for `{kind}`: {reason}")]
    InvalidOption {
        kind: String,
        option: String,
        reason: String,
    },
}

// ============================================================================
// DELIVERY ERROR
// ============================================================================

/// Failure to schedule a deferred validation callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DeliveryError {
    /// The caller is not inside a tokio runtime.
    #[error("deferred validation requires a tokio runtime")]
    NoRuntime,
}

// ============================================================================
// TESTS
// ============================================================================
