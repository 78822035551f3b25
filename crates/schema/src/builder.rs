//! Fluent construction of schema trees.
//!
//! [`SchemaBuilder`] collects options and children for one node and hands
//! them to [`Registry::construct`] on [`build`](SchemaBuilder::build). The
//! free functions ([`array`], [`object`], [`string`], ...) start builders on
//! the standard registry.
//!
//! ```rust
//! use nebula_schema::prelude::*;
//! use serde_json::json;
//!
//! let schema = object()
//!     .fields([
//!         ("name", string().option("minLength", 1)),
//!         ("email", email()),
//!         ("nickname", string().optional()),
//!     ])
//!     .build()
//!     .unwrap();
//!
//! let user = schema
//!     .validate(&json!({"name": "ada", "email": " Ada@Example.COM "}))
//!     .unwrap();
//! assert_eq!(user, json!({"name": "ada", "email": "ada@example.com"}));
//! ```

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::SchemaError;
use crate::node::{Comment, Validator};
use crate::options::{OPT, Options, type_name};
use crate::registry::{Arg, Registry};

/// Anything that can become a validator node.
pub trait IntoSchema {
    /// Builds the node.
    fn into_schema(self) -> Result<Validator, SchemaError>;
}

impl IntoSchema for Validator {
    fn into_schema(self) -> Result<Validator, SchemaError> {
        Ok(self)
    }
}

impl IntoSchema for &Validator {
    fn into_schema(self) -> Result<Validator, SchemaError> {
        Ok(self.clone())
    }
}

impl IntoSchema for Result<Validator, SchemaError> {
    fn into_schema(self) -> Result<Validator, SchemaError> {
        self
    }
}

impl IntoSchema for SchemaBuilder<'_> {
    fn into_schema(self) -> Result<Validator, SchemaError> {
        self.build()
    }
}

/// Builder for a single node.
///
/// Errors are deferred: the first failure (a non-object options value, a
/// child that fails to build) is kept and returned by
/// [`build`](Self::build).
#[derive(Debug)]
#[must_use = "builder does nothing until `build` is called"]
pub struct SchemaBuilder<'r> {
    registry: &'r Registry,
    name: String,
    options: Options,
    children: Option<Arg>,
    comment: Option<Comment>,
    error: Option<SchemaError>,
}

impl<'r> SchemaBuilder<'r> {
    pub(crate) fn new(registry: &'r Registry, name: &str) -> Self {
        Self {
            registry,
            name: name.to_owned(),
            options: Options::new(),
            children: None,
            comment: None,
            error: None,
        }
    }

    /// Kind name this builder constructs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds every key of a JSON object to the options.
    pub fn options(mut self, options: impl Into<Value>) -> Self {
        match options.into() {
            Value::Object(map) => self.options.extend(map),
            other => {
                self.fail(SchemaError::OptionsNotObject(type_name(Some(&other))));
            }
        }
        self
    }

    /// Sets one option.
    pub fn option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    /// Marks the node optional (`opt: true`).
    pub fn optional(self) -> Self {
        self.option(OPT, true)
    }

    /// Sets list children, tried in order against each element.
    pub fn items<I>(mut self, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoSchema,
    {
        let built: Result<Vec<Validator>, SchemaError> =
            items.into_iter().map(IntoSchema::into_schema).collect();
        match built {
            Ok(list) => self.children = Some(Arg::List(list)),
            Err(err) => self.fail(err),
        }
        self
    }

    /// Sets named children.
    pub fn fields<I, K, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: IntoSchema,
    {
        let built: Result<IndexMap<String, Validator>, SchemaError> = fields
            .into_iter()
            .map(|(name, child)| Ok((name.into(), child.into_schema()?)))
            .collect();
        match built {
            Ok(map) => self.children = Some(Arg::Map(map)),
            Err(err) => self.fail(err),
        }
        self
    }

    /// Attaches an annotation to the built node.
    pub fn comment(mut self, comment: impl Into<Comment>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Constructs the node through the registry.
    pub fn build(self) -> Result<Validator, SchemaError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let args = std::iter::once(Arg::Options(self.options)).chain(self.children);
        let node = self.registry.construct(&self.name, args)?;

        Ok(match self.comment {
            Some(comment) => node.comment(comment),
            None => node,
        })
    }

    fn fail(&mut self, err: SchemaError) {
        self.error.get_or_insert(err);
    }
}

/// `Any` on the standard registry.
pub fn any() -> SchemaBuilder<'static> {
    Registry::standard().schema("Any")
}

/// `Boolean` on the standard registry.
pub fn boolean() -> SchemaBuilder<'static> {
    Registry::standard().schema("Boolean")
}

/// `Number` on the standard registry.
pub fn number() -> SchemaBuilder<'static> {
    Registry::standard().schema("Number")
}

/// `String` on the standard registry.
pub fn string() -> SchemaBuilder<'static> {
    Registry::standard().schema("String")
}

/// `Array` on the standard registry.
pub fn array() -> SchemaBuilder<'static> {
    Registry::standard().schema("Array")
}

/// `Object` on the standard registry.
pub fn object() -> SchemaBuilder<'static> {
    Registry::standard().schema("Object")
}

/// `Email` on the standard registry; builds `FastEmail` when no options are set.
pub fn email() -> SchemaBuilder<'static> {
    Registry::standard().schema("Email")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn options_merge_into_builder() {
        let schema = number()
            .options(json!({"min": 1, "max": 3}))
            .option("max", 9)
            .build()
            .unwrap();
        assert_eq!(
            Value::Object(schema.options().clone()),
            json!({"min": 1, "max": 9})
        );
    }

    #[test]
    fn non_object_options_fail_on_build() {
        let err = number().options(json!([1])).build().unwrap_err();
        assert_eq!(err, SchemaError::OptionsNotObject("array"));
    }

    #[test]
    fn child_errors_surface() {
        let err = array()
            .items([Registry::standard().schema("Missing")])
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::UnknownKind("Missing".into()));
    }

    #[test]
    fn first_error_wins() {
        let err = object()
            .options(json!("x"))
            .fields([("a", Registry::standard().schema("Missing"))])
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::OptionsNotObject("string"));
    }

    #[test]
    fn comment_is_attached() {
        let schema = string().comment("display name").build().unwrap();
        assert_eq!(schema.document().comment.as_deref(), Some("display name"));
    }

    #[test]
    fn mixing_built_and_unbuilt_children() {
        let shared = number().build().unwrap();
        let schema = object()
            .fields([("a", Ok(shared.clone())), ("b", string().build())])
            .build()
            .unwrap();
        assert_eq!(schema.children().len(), 2);

        let list = array().items([&shared, &shared]).build().unwrap();
        assert_eq!(list.children().len(), 2);
    }

    #[test]
    fn items_on_object_is_rejected() {
        let err = object().items([number()]).build().unwrap_err();
        assert!(matches!(err, SchemaError::ChildArity { .. }));
    }
}
