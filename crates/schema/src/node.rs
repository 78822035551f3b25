//! Validator nodes, the building blocks of a schema tree.
//!
//! A [`Validator`] holds its kind name, a shared reference to the kind's
//! logic, its options and its children. It never changes after construction;
//! "modifying" a node ([`clone_with`](Validator::clone_with),
//! [`comment`](Validator::comment)) always yields a new value.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::{DeliveryError, SchemaError, ValidationError};
use crate::kind::{ChildArity, Kind, Outcome};
use crate::options::{self, Options};

// ============================================================================
// CHILDREN
// ============================================================================

/// Child validators of a node.
#[derive(Debug, Clone, Default)]
pub enum Children {
    /// Leaf node.
    #[default]
    None,
    /// Named children; the parent validates the field of the same name.
    Map(IndexMap<String, Validator>),
    /// Ordered alternatives; tried in order against each element.
    List(Vec<Validator>),
}

impl Children {
    /// Number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Map(map) => map.len(),
            Self::List(list) => list.len(),
        }
    }

    /// Returns true if there are no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Named child lookup; list children are unnamed.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Validator> {
        match self {
            Self::Map(map) => map.get(name),
            Self::None | Self::List(_) => None,
        }
    }

    pub(crate) const fn shape(&self) -> ChildArity {
        match self {
            Self::None => ChildArity::None,
            Self::Map(_) => ChildArity::Map,
            Self::List(_) => ChildArity::List,
        }
    }
}

// ============================================================================
// COMMENT
// ============================================================================

/// Annotation attached to a node for [`document`](Validator::document) output.
#[derive(Clone)]
pub enum Comment {
    /// Literal text.
    Text(Cow<'static, str>),
    /// Computed from the node's in-progress descriptor.
    Derived(Arc<dyn Fn(&Descriptor) -> String + Send + Sync>),
}

impl Comment {
    /// Builds a comment computed from the node's descriptor.
    pub fn derived<F>(f: F) -> Self
    where
        F: Fn(&Descriptor) -> String + Send + Sync + 'static,
    {
        Self::Derived(Arc::new(f))
    }

    fn resolve(&self, descriptor: &Descriptor) -> String {
        match self {
            Self::Text(text) => text.to_string(),
            Self::Derived(f) => f(descriptor),
        }
    }
}

impl fmt::Debug for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Derived(_) => f.write_str("Derived(<function>)"),
        }
    }
}

impl From<&'static str> for Comment {
    fn from(text: &'static str) -> Self {
        Self::Text(Cow::Borrowed(text))
    }
}

impl From<String> for Comment {
    fn from(text: String) -> Self {
        Self::Text(Cow::Owned(text))
    }
}

// ============================================================================
// DESCRIPTOR
// ============================================================================

/// Introspectable description of a schema tree, as returned by
/// [`Validator::document`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Descriptor {
    /// Kind name.
    pub name: String,
    /// Options the node was built with (without evaluation defaults).
    pub args: Options,
    /// Child descriptors; list-shaped for list kinds, omitted for childless
    /// map and leaf kinds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<DescriptorChildren>,
    /// Resolved comment, if one was attached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Children section of a [`Descriptor`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DescriptorChildren {
    /// Descriptors of list children, in order.
    List(Vec<Descriptor>),
    /// Descriptors of named children.
    Map(IndexMap<String, Descriptor>),
}

// ============================================================================
// PATCH
// ============================================================================

/// Modification applied by [`Validator::clone_with`].
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    /// Keep only the named children (map children only).
    Whitelist(Vec<String>),
    /// Options laid over the inherited ones; patch keys win.
    Options(Options),
}

impl Patch {
    /// Whitelist patch from any list of names.
    pub fn keep<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Whitelist(names.into_iter().map(Into::into).collect())
    }
}

impl From<Options> for Patch {
    fn from(options: Options) -> Self {
        Self::Options(options)
    }
}

impl TryFrom<Value> for Patch {
    type Error = SchemaError;

    /// Objects become option patches, arrays of strings become whitelists.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(options) => Ok(Self::Options(options)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(name) => Ok(name),
                    other => Err(SchemaError::OptionsNotObject(options::type_name(Some(&other)))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Whitelist),
            other => Err(SchemaError::OptionsNotObject(options::type_name(Some(&other)))),
        }
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

/// One node of a schema tree.
///
/// Cloning is cheap: the kind logic and the options are shared by `Arc`,
/// only the child containers are copied.
///
/// # Examples
///
/// ```rust
/// use nebula_schema::prelude::*;
/// use serde_json::json;
///
/// let schema = array().items([number()]).build().unwrap();
/// assert_eq!(schema.validate(&json!([1, 2, 3])).unwrap(), json!([1, 2, 3]));
///
/// let err = schema.validate(&json!([1, "x"])).unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "Error validating element schema[1]: Got string, required Number"
/// );
/// ```
#[derive(Clone)]
pub struct Validator {
    name: Arc<str>,
    kind: Arc<dyn Kind>,
    options: Arc<Options>,
    children: Children,
    comment: Option<Comment>,
    root_key: Arc<str>,
}

impl Validator {
    pub(crate) fn new(
        name: Arc<str>,
        kind: Arc<dyn Kind>,
        options: Options,
        children: Children,
        root_key: Arc<str>,
    ) -> Self {
        Self {
            name,
            kind,
            options: Arc::new(options),
            children,
            comment: None,
            root_key,
        }
    }

    /// Kind name, e.g. `"Array"` or `"FastEmail"`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Options as supplied at construction.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Child validators.
    #[must_use]
    pub fn children(&self) -> &Children {
        &self.children
    }

    /// Read-only access to a named child.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Validator> {
        self.children.get(name)
    }

    /// The kind's declared child arity.
    #[must_use]
    pub fn arity(&self) -> ChildArity {
        self.kind.arity()
    }

    /// Root path segment used when [`validate`](Self::validate) gets no key.
    #[must_use]
    pub fn root_key(&self) -> &str {
        &self.root_key
    }

    // ------------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------------

    /// Evaluates `data` at `key`.
    ///
    /// The node's options are merged over `{"opt": false}` and handed to the
    /// kind together with the children. Errors propagate unchanged. At the
    /// root an omission becomes `null`, so the signal never leaks out of the
    /// tree; below the root it is kept for the parent container to act on.
    pub fn parse(
        &self,
        data: Option<&Value>,
        key: &str,
        root: bool,
    ) -> Result<Outcome, ValidationError> {
        let options = options::with_defaults(&self.options);
        tracing::trace!(kind = %self.name, key, "evaluating node");

        let outcome = self.kind.check(&options, &self.children, data, key)?;
        if root && outcome.is_omitted() {
            return Ok(Outcome::Accepted(Value::Null));
        }
        Ok(outcome)
    }

    /// Validates `data` under the root key and returns the normalized value.
    ///
    /// Pass `None` to validate an absent value.
    pub fn validate<'a>(
        &self,
        data: impl Into<Option<&'a Value>>,
    ) -> Result<Value, ValidationError> {
        self.validate_at(data, self.root_key())
    }

    /// Validates `data` using `key` as the root path segment.
    ///
    /// An empty key falls back to the root key.
    pub fn validate_at<'a>(
        &self,
        data: impl Into<Option<&'a Value>>,
        key: &str,
    ) -> Result<Value, ValidationError> {
        let key = if key.is_empty() { self.root_key() } else { key };
        match self.parse(data.into(), key, true)? {
            Outcome::Accepted(value) => Ok(value),
            Outcome::Omitted => Ok(Value::Null),
        }
    }

    /// Validates `data` now and hands the result to `callback` on a task
    /// spawned on the current tokio runtime, after yielding once to the
    /// scheduler.
    ///
    /// The callback never runs inside this call. On a current-thread runtime
    /// it runs only once the caller has yielded back to the runtime. On a
    /// multi-thread runtime another worker may pick the task up and run the
    /// callback before this call has returned, so state the callback touches
    /// must be ready before calling.
    ///
    /// Outside a runtime nothing is validated, the callback is dropped
    /// uncalled and [`DeliveryError::NoRuntime`] is returned.
    pub fn validate_then<'a, F>(
        &self,
        data: impl Into<Option<&'a Value>>,
        callback: F,
    ) -> Result<JoinHandle<()>, DeliveryError>
    where
        F: FnOnce(Result<Value, ValidationError>) + Send + 'static,
    {
        let runtime = Self::runtime()?;
        let result = self.validate(data);
        Ok(Self::deliver(&runtime, result, callback))
    }

    /// [`validate_then`](Self::validate_then) with an explicit root key.
    pub fn validate_at_then<'a, F>(
        &self,
        data: impl Into<Option<&'a Value>>,
        key: &str,
        callback: F,
    ) -> Result<JoinHandle<()>, DeliveryError>
    where
        F: FnOnce(Result<Value, ValidationError>) + Send + 'static,
    {
        let runtime = Self::runtime()?;
        let result = self.validate_at(data, key);
        Ok(Self::deliver(&runtime, result, callback))
    }

    fn runtime() -> Result<Handle, DeliveryError> {
        Handle::try_current().map_err(|_| {
            tracing::debug!("deferred validation requested outside a tokio runtime");
            DeliveryError::NoRuntime
        })
    }

    fn deliver<F>(
        runtime: &Handle,
        result: Result<Value, ValidationError>,
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<Value, ValidationError>) + Send + 'static,
    {
        runtime.spawn(async move {
            tokio::task::yield_now().await;
            callback(result);
        })
    }

    // ------------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------------

    /// Describes the tree rooted at this node.
    #[must_use]
    pub fn document(&self) -> Descriptor {
        let children = match (&self.children, self.arity()) {
            (Children::List(list), _) => Some(DescriptorChildren::List(
                list.iter().map(Self::document).collect(),
            )),
            (_, ChildArity::List) => Some(DescriptorChildren::List(Vec::new())),
            (Children::Map(map), _) if !map.is_empty() => Some(DescriptorChildren::Map(
                map.iter().map(|(k, v)| (k.clone(), v.document())).collect(),
            )),
            _ => None,
        };

        let mut descriptor = Descriptor {
            name: self.name.to_string(),
            args: (*self.options).clone(),
            children,
            comment: None,
        };
        if let Some(comment) = &self.comment {
            descriptor.comment = Some(comment.resolve(&descriptor));
        }
        descriptor
    }

    // ------------------------------------------------------------------------
    // Derivation
    // ------------------------------------------------------------------------

    /// Returns a copy of this node with `patches` applied in order.
    ///
    /// Whitelists drop every named child not listed (list children are
    /// untouched); option patches are laid over the inherited options. The
    /// kind logic is shared, never copied; `self` is left as is.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nebula_schema::prelude::*;
    /// use serde_json::json;
    ///
    /// let user = object()
    ///     .fields([("name", string()), ("email", email()), ("age", number())])
    ///     .build()
    ///     .unwrap();
    ///
    /// let public = user.clone_with([Patch::keep(["name", "email"])]);
    /// assert!(public.child("age").is_none());
    /// assert!(user.child("age").is_some());
    /// ```
    #[must_use]
    pub fn clone_with<I>(&self, patches: I) -> Self
    where
        I: IntoIterator<Item = Patch>,
    {
        let mut options = (*self.options).clone();
        let mut children = self.children.clone();

        for patch in patches {
            match patch {
                Patch::Whitelist(names) => {
                    if let Children::Map(map) = &mut children {
                        map.retain(|name, _| names.iter().any(|kept| kept == name));
                    }
                }
                Patch::Options(patch) => options = options::merge(&patch, &options),
            }
        }

        Self {
            name: Arc::clone(&self.name),
            kind: Arc::clone(&self.kind),
            options: Arc::new(options),
            children,
            comment: self.comment.clone(),
            root_key: Arc::clone(&self.root_key),
        }
    }

    /// Attaches an annotation reported by [`document`](Self::document).
    #[must_use]
    pub fn comment(mut self, comment: impl Into<Comment>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("children", &self.children)
            .field("comment", &self.comment)
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{array, boolean, number, object, string};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn person() -> Validator {
        object()
            .fields([("a", string()), ("b", number()), ("c", boolean())])
            .build()
            .unwrap()
    }

    #[test]
    fn parse_root_turns_omission_into_null() {
        let schema = string().optional().build().unwrap();
        assert_eq!(
            schema.parse(None, "schema", true).unwrap(),
            Outcome::Accepted(Value::Null)
        );
        assert_eq!(schema.parse(None, "schema", false).unwrap(), Outcome::Omitted);
    }

    #[test]
    fn parse_defaults_to_required() {
        let schema = string().build().unwrap();
        let err = schema.parse(None, "schema", true).unwrap_err();
        assert_eq!(err.to_string(), "Got undefined, required String");
    }

    #[test]
    fn validate_uses_root_key() {
        let schema = array().items([number()]).build().unwrap();
        let err = schema.validate(&json!(["x"])).unwrap_err();
        assert_eq!(err.path.as_deref(), Some("schema[0]"));

        let err = schema.validate_at(&json!(["x"]), "payload").unwrap_err();
        assert_eq!(err.path.as_deref(), Some("payload[0]"));

        let err = schema.validate_at(&json!(["x"]), "").unwrap_err();
        assert_eq!(err.path.as_deref(), Some("schema[0]"));
    }

    #[test]
    fn child_view() {
        let schema = person();
        assert_eq!(schema.child("a").map(Validator::name), Some("String"));
        assert!(schema.child("z").is_none());
        assert_eq!(schema.children().len(), 3);
    }

    #[test]
    fn arity_follows_the_kind() {
        assert_eq!(person().arity(), ChildArity::Map);
        assert_eq!(array().build().unwrap().arity(), ChildArity::List);
        assert_eq!(string().build().unwrap().arity(), ChildArity::None);
        assert!(array().build().unwrap().children().is_empty());
    }

    #[test]
    fn document_shapes() {
        let leaf = number().option("min", 1).build().unwrap();
        assert_eq!(
            serde_json::to_value(leaf.document()).unwrap(),
            json!({"name": "Number", "args": {"min": 1}})
        );

        let empty_list = array().build().unwrap();
        assert_eq!(
            serde_json::to_value(empty_list.document()).unwrap(),
            json!({"name": "Array", "args": {}, "children": []})
        );

        let empty_map = object().build().unwrap();
        assert_eq!(empty_map.document().children, None);
    }

    #[test]
    fn document_resolves_comments() {
        let schema = number()
            .build()
            .unwrap()
            .comment(Comment::derived(|d: &Descriptor| format!("a {}", d.name)));
        assert_eq!(schema.document().comment.as_deref(), Some("a Number"));

        let literal = string().build().unwrap().comment("user name");
        assert_eq!(literal.document().comment.as_deref(), Some("user name"));
    }

    #[test]
    fn clone_without_patches_documents_the_same() {
        let schema = person().comment("person");
        assert_eq!(schema.clone_with([]).document(), schema.document());
    }

    #[test]
    fn clone_whitelist() {
        let schema = person();
        let narrowed = schema.clone_with([Patch::keep(["a", "b"])]);

        assert!(narrowed.child("c").is_none());
        assert_eq!(
            narrowed.child("a").map(Validator::document),
            schema.child("a").map(Validator::document)
        );
        assert!(schema.child("c").is_some());
    }

    #[test]
    fn whitelist_ignores_list_children() {
        let schema = array().items([number(), string()]).build().unwrap();
        let cloned = schema.clone_with([Patch::keep(["nothing"])]);
        assert_eq!(cloned.children().len(), 2);
    }

    #[test]
    fn clone_options_patch_wins() {
        let schema = string().option("opt", false).option("minLength", 2).build().unwrap();
        let patched = schema.clone_with([Patch::try_from(json!({"opt": true})).unwrap()]);

        assert_eq!(patched.document().args["opt"], json!(true));
        assert_eq!(patched.document().args["minLength"], json!(2));
        assert_eq!(schema.document().args["opt"], json!(false));
    }

    #[test]
    fn patch_from_value() {
        assert_eq!(
            Patch::try_from(json!(["a", "b"])).unwrap(),
            Patch::keep(["a", "b"])
        );
        assert!(Patch::try_from(json!(3)).is_err());
        assert!(Patch::try_from(json!(["a", 1])).is_err());
    }
}
