//! The contract every validator kind implements.
//!
//! A kind is the named category of validation logic (`String`, `Array`,
//! `Email`, ...). It is a pure value: given a node's merged options, its
//! children, the data slice and the path key, it either accepts the data
//! (possibly returning a normalized value), asks its parent to omit it, or
//! rejects it with a [`ValidationError`].
//!
//! Kinds are shared by `Arc` between every node of the same kind and across
//! threads. Any state a kind keeps must not change its results; memo caches
//! such as the compiled `pattern` cache of [`StringKind`] are fine.
//!
//! [`StringKind`]: crate::kinds::StringKind

use std::fmt;

use serde_json::Value;

use crate::error::ValidationError;
use crate::node::Children;
use crate::options::Options;

// ============================================================================
// CHILD ARITY
// ============================================================================

/// How a kind accepts child validators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChildArity {
    /// Leaf kind, no children.
    #[default]
    None,
    /// Children are named (object-shaped schemas).
    Map,
    /// Children are an ordered list of alternatives (array-shaped schemas).
    List,
}

impl ChildArity {
    /// Short name used in errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "no",
            Self::Map => "map",
            Self::List => "list",
        }
    }
}

// ============================================================================
// OUTCOME
// ============================================================================

/// Successful result of evaluating a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The data conforms; this value replaces it in the output.
    Accepted(Value),
    /// The data was absent and optional; the parent should drop the slot.
    Omitted,
}

impl Outcome {
    /// Returns the accepted value, or `None` for an omission.
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Accepted(value) => Some(value),
            Self::Omitted => None,
        }
    }

    /// Returns true if the slot should be dropped.
    #[must_use]
    pub fn is_omitted(&self) -> bool {
        matches!(self, Self::Omitted)
    }
}

// ============================================================================
// KIND TRAIT
// ============================================================================

/// Validation logic for one kind.
///
/// # Examples
///
/// ```rust
/// use nebula_schema::prelude::*;
/// use serde_json::{json, Value};
///
/// #[derive(Debug)]
/// struct Even;
///
/// impl Kind for Even {
///     fn check(
///         &self,
///         _options: &Options,
///         _children: &Children,
///         data: Option<&Value>,
///         key: &str,
///     ) -> Result<Outcome, ValidationError> {
///         match data.and_then(Value::as_i64) {
///             Some(n) if n % 2 == 0 => Ok(Outcome::Accepted(json!(n))),
///             _ => Err(ValidationError::type_mismatch(key.to_owned(), "Even", type_name(data))),
///         }
///     }
/// }
///
/// let registry = Registry::standard().with_kind("Even", Even);
/// let schema = registry.construct("Even", []).unwrap();
/// assert!(schema.validate(&json!(4)).is_ok());
/// assert!(schema.validate(&json!(3)).is_err());
/// ```
pub trait Kind: Send + Sync + fmt::Debug {
    /// Declares how this kind takes children.
    fn arity(&self) -> ChildArity {
        ChildArity::None
    }

    /// Rejects option sets this kind can never evaluate.
    ///
    /// Called once when a node is constructed. The returned error should be
    /// an `invalid_option` error carrying the offending option name.
    fn check_options(&self, _options: &Options) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Evaluates `data` at `key`.
    ///
    /// `data` is `None` when the value is absent (a missing object field or
    /// no input at all). `options` already has the evaluation defaults merged
    /// in, so `opt` is always present.
    fn check(
        &self,
        options: &Options,
        children: &Children,
        data: Option<&Value>,
        key: &str,
    ) -> Result<Outcome, ValidationError>;
}

// ============================================================================
// FUNCTION ADAPTER
// ============================================================================

/// Adapts a plain function or closure into a [`Kind`].
///
/// The closure must not capture writable state: the same kind serves every
/// node and every thread.
pub struct FnKind<F> {
    arity: ChildArity,
    check: F,
}

impl<F> FnKind<F>
where
    F: Fn(&Options, &Children, Option<&Value>, &str) -> Result<Outcome, ValidationError>
        + Send
        + Sync,
{
    /// Wraps `check` with the given arity.
    pub fn new(arity: ChildArity, check: F) -> Self {
        Self { arity, check }
    }

    /// Wraps a leaf check.
    pub fn leaf(check: F) -> Self {
        Self::new(ChildArity::None, check)
    }
}

impl<F> fmt::Debug for FnKind<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnKind")
            .field("arity", &self.arity)
            .field("check", &"<function>")
            .finish()
    }
}

impl<F> Kind for FnKind<F>
where
    F: Fn(&Options, &Children, Option<&Value>, &str) -> Result<Outcome, ValidationError>
        + Send
        + Sync,
{
    fn arity(&self) -> ChildArity {
        self.arity
    }

    fn check(
        &self,
        options: &Options,
        children: &Children,
        data: Option<&Value>,
        key: &str,
    ) -> Result<Outcome, ValidationError> {
        (self.check)(options, children, data, key)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fn_kind_delegates() {
        let kind = FnKind::leaf(|_: &Options, _: &Children, data: Option<&Value>, _: &str| {
            Ok(Outcome::Accepted(data.cloned().unwrap_or(Value::Null)))
        });
        assert_eq!(kind.arity(), ChildArity::None);

        let outcome = kind
            .check(&Options::new(), &Children::None, Some(&json!(7)), "schema")
            .unwrap();
        assert_eq!(outcome, Outcome::Accepted(json!(7)));
    }

    #[test]
    fn fn_kind_keeps_arity() {
        let kind = FnKind::new(
            ChildArity::List,
            |_: &Options, _: &Children, _: Option<&Value>, _: &str| Ok(Outcome::Omitted),
        );
        assert_eq!(kind.arity(), ChildArity::List);
        assert!(format!("{kind:?}").contains("<function>"));
    }

    #[test]
    fn outcome_helpers() {
        assert!(Outcome::Omitted.is_omitted());
        assert_eq!(Outcome::Accepted(json!(1)).into_value(), Some(json!(1)));
        assert_eq!(Outcome::Omitted.into_value(), None);
    }
}
