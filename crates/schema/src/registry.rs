//! Kind registry and validator construction.
//!
//! A [`Registry`] maps kind names to their logic. It is built once from an
//! ordered list of `(name, kind)` pairs and is immutable afterwards;
//! [`with_kind`](Registry::with_kind) returns a *new* registry with an extra
//! kind instead of mutating a shared one.
//!
//! Constructing a validator classifies the call arguments into one options
//! object and one child collection, then either takes the fast path (a
//! pre-specialized `Fast<Name>` kind, when no options were given) or builds
//! a full node.

use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::builder::SchemaBuilder;
use crate::error::{SchemaError, ValidationError};
use crate::kind::{ChildArity, Kind};
use crate::node::{Children, Validator};
use crate::options::{self, OPT, Options, OptionsExt};

// ============================================================================
// CONFIG
// ============================================================================

/// Registry-wide settings.
///
/// Deserializes with defaults for every missing field, so an empty JSON
/// object yields [`RegistryConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Delegate option-less constructions to a registered fast kind.
    pub fast_path: bool,
    /// Prefix naming the fast counterpart of a kind.
    pub fast_prefix: String,
    /// Root path segment for validations started without a key.
    pub root_key: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            fast_path: true,
            fast_prefix: "Fast".to_owned(),
            root_key: "schema".to_owned(),
        }
    }
}

// ============================================================================
// ARGUMENTS
// ============================================================================

/// One constructor argument.
///
/// Options and children are told apart by variant, never by inspecting the
/// value's shape.
#[derive(Debug, Clone)]
pub enum Arg {
    /// Options for the node.
    Options(Options),
    /// Ordered children, for list kinds.
    List(Vec<Validator>),
    /// Named children, for map kinds.
    Map(IndexMap<String, Validator>),
}

impl From<Options> for Arg {
    fn from(options: Options) -> Self {
        Self::Options(options)
    }
}

impl From<Vec<Validator>> for Arg {
    fn from(children: Vec<Validator>) -> Self {
        Self::List(children)
    }
}

impl From<IndexMap<String, Validator>> for Arg {
    fn from(children: IndexMap<String, Validator>) -> Self {
        Self::Map(children)
    }
}

impl TryFrom<Value> for Arg {
    type Error = SchemaError;

    /// Only JSON objects convert; they become options.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(options) => Ok(Self::Options(options)),
            other => Err(SchemaError::OptionsNotObject(options::type_name(Some(&other)))),
        }
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

static STANDARD: LazyLock<Registry> =
    LazyLock::new(|| crate::kinds::register_standard(Registry::builder()).build());

#[derive(Debug)]
struct Entry {
    name: Arc<str>,
    kind: Arc<dyn Kind>,
}

#[derive(Debug)]
struct Inner {
    kinds: IndexMap<String, Entry>,
    config: RegistryConfig,
    root_key: Arc<str>,
}

/// Immutable mapping from kind name to kind logic.
///
/// Cloning shares the underlying table.
///
/// # Examples
///
/// ```rust
/// use nebula_schema::prelude::*;
/// use serde_json::json;
///
/// let registry = Registry::standard();
/// let schema = registry
///     .construct("Array", [Arg::try_from(json!({"minLength": 2})).unwrap()])
///     .unwrap();
///
/// assert!(schema.validate(&json!([1])).is_err());
/// assert!(schema.validate(&json!([1, 2])).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Registry {
    inner: Arc<Inner>,
}

impl Registry {
    /// Starts an empty registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Builds a registry from an ordered list of `(name, kind)` pairs.
    ///
    /// A later pair replaces an earlier one with the same name.
    pub fn from_kinds<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = (S, Arc<dyn Kind>)>,
        S: Into<String>,
    {
        kinds
            .into_iter()
            .fold(Self::builder(), |builder, (name, kind)| {
                builder.register_shared(name, kind)
            })
            .build()
    }

    /// The process-wide registry holding the standard kinds.
    pub fn standard() -> &'static Registry {
        &STANDARD
    }

    /// Registry settings.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    /// Returns true if a kind is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.kinds.contains_key(name)
    }

    /// Registered kind names in registration order.
    pub fn kind_names(&self) -> impl Iterator<Item = &str> {
        self.inner.kinds.keys().map(String::as_str)
    }

    /// Number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.kinds.len()
    }

    /// Returns true if no kinds are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.kinds.is_empty()
    }

    /// The logic registered under `name`.
    #[must_use]
    pub fn kind(&self, name: &str) -> Option<&Arc<dyn Kind>> {
        self.inner.kinds.get(name).map(|entry| &entry.kind)
    }

    /// Returns a constructor handle for `name`.
    pub fn constructor(&self, name: &str) -> Result<Constructor<'_>, SchemaError> {
        let entry = self.entry(name)?;
        Ok(Constructor {
            registry: self,
            name: Arc::clone(&entry.name),
        })
    }

    /// Starts a builder-style declaration of a `name` node.
    #[must_use]
    pub fn schema(&self, name: &str) -> SchemaBuilder<'_> {
        SchemaBuilder::new(self, name)
    }

    /// Returns a new registry that additionally holds `kind` under `name`.
    ///
    /// `self` is left untouched.
    #[must_use]
    pub fn with_kind(&self, name: impl Into<String>, kind: impl Kind + 'static) -> Registry {
        self.to_builder().register(name, kind).build()
    }

    /// A builder seeded with this registry's kinds and config.
    #[must_use]
    pub fn to_builder(&self) -> RegistryBuilder {
        RegistryBuilder {
            kinds: self
                .inner
                .kinds
                .iter()
                .map(|(name, entry)| (name.clone(), Arc::clone(&entry.kind)))
                .collect(),
            config: self.inner.config.clone(),
        }
    }

    /// Constructs a `name` node from `args`.
    ///
    /// Each argument fills its slot, later arguments overwrite earlier ones
    /// of the same variant. A child collection must match the kind's arity.
    /// With no options and a registered `<fast_prefix><name>` kind the fast
    /// kind is constructed instead.
    pub fn construct<I>(&self, name: &str, args: I) -> Result<Validator, SchemaError>
    where
        I: IntoIterator<Item = Arg>,
    {
        let entry = self.entry(name)?;
        let (options, children) = classify(entry, args)?;

        check_common_options(&options)
            .and_then(|()| entry.kind.check_options(&options))
            .map_err(|err| SchemaError::InvalidOption {
                kind: name.to_owned(),
                option: err.param("option").unwrap_or_default().to_owned(),
                reason: err.message.into_owned(),
            })?;

        if options.is_empty() && self.inner.config.fast_path {
            let fast_name = format!("{}{}", self.inner.config.fast_prefix, name);
            if let Some(fast) = self.inner.kinds.get(&fast_name) {
                tracing::debug!(kind = name, fast = %fast_name, "taking fast path");
                check_shape(fast, &children)?;
                return Ok(self.node(fast, options, children));
            }
        }

        Ok(self.node(entry, options, children))
    }

    fn entry(&self, name: &str) -> Result<&Entry, SchemaError> {
        self.inner
            .kinds
            .get(name)
            .ok_or_else(|| SchemaError::UnknownKind(name.to_owned()))
    }

    fn node(&self, entry: &Entry, options: Options, children: Children) -> Validator {
        Validator::new(
            Arc::clone(&entry.name),
            Arc::clone(&entry.kind),
            options,
            children,
            Arc::clone(&self.inner.root_key),
        )
    }
}

fn classify<I>(entry: &Entry, args: I) -> Result<(Options, Children), SchemaError>
where
    I: IntoIterator<Item = Arg>,
{
    let mut options = Options::new();
    let mut children = Children::None;

    for arg in args {
        match arg {
            Arg::Options(opts) => options = opts,
            Arg::List(list) => {
                children = Children::List(list);
                check_shape(entry, &children)?;
            }
            Arg::Map(map) => {
                children = Children::Map(map);
                check_shape(entry, &children)?;
            }
        }
    }

    Ok((options, children))
}

/// Options every kind honours, checked before the kind's own.
fn check_common_options(options: &Options) -> Result<(), ValidationError> {
    options.flag(OPT, "").map(drop)
}

fn check_shape(entry: &Entry, children: &Children) -> Result<(), SchemaError> {
    let expected = entry.kind.arity();
    let got = children.shape();
    if got == ChildArity::None || got == expected {
        Ok(())
    } else {
        Err(SchemaError::ChildArity {
            kind: entry.name.to_string(),
            expected: expected.as_str(),
            got: got.as_str(),
        })
    }
}

// ============================================================================
// CONSTRUCTOR
// ============================================================================

/// Callable handle for one registered kind.
#[derive(Debug, Clone)]
pub struct Constructor<'r> {
    registry: &'r Registry,
    name: Arc<str>,
}

impl Constructor<'_> {
    /// Kind name this handle constructs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Constructs a node; see [`Registry::construct`].
    pub fn call<I>(&self, args: I) -> Result<Validator, SchemaError>
    where
        I: IntoIterator<Item = Arg>,
    {
        self.registry.construct(&self.name, args)
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Collects kinds before freezing them into a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    kinds: IndexMap<String, Arc<dyn Kind>>,
    config: RegistryConfig,
}

impl RegistryBuilder {
    /// Registers `kind` under `name`, replacing any previous holder.
    #[must_use = "builder methods must be chained or built"]
    pub fn register(self, name: impl Into<String>, kind: impl Kind + 'static) -> Self {
        self.register_shared(name, Arc::new(kind))
    }

    /// Registers an already shared kind.
    #[must_use = "builder methods must be chained or built"]
    pub fn register_shared(mut self, name: impl Into<String>, kind: Arc<dyn Kind>) -> Self {
        let name = name.into();
        if self.kinds.insert(name.clone(), kind).is_some() {
            tracing::debug!(kind = %name, "replacing registered kind");
        }
        self
    }

    /// Sets the registry config.
    #[must_use = "builder methods must be chained or built"]
    pub fn config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> Registry {
        tracing::debug!(
            kinds = self.kinds.len(),
            fast_path = self.config.fast_path,
            "building validator registry"
        );

        let kinds = self
            .kinds
            .into_iter()
            .map(|(name, kind)| {
                let entry = Entry {
                    name: Arc::from(name.as_str()),
                    kind,
                };
                (name, entry)
            })
            .collect();

        Registry {
            inner: Arc::new(Inner {
                kinds,
                root_key: Arc::from(self.config.root_key.as_str()),
                config: self.config,
            }),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
