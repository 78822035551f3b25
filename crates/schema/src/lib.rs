//! # nebula-schema
//!
//! Composable, declarative data validation for JSON-shaped values.
//!
//! A schema is a tree of [`Validator`] nodes. Each node names a kind
//! registered in a [`Registry`], carries an options object and, for container
//! kinds, child validators. Validation walks the tree, normalizes the data
//! (trimming, lower-casing, dropping omitted fields) and reports the first
//! failure with a path such as `schema.tags[1]`.
//!
//! ## Quick Start
//!
//! ```rust
//! use nebula_schema::prelude::*;
//! use serde_json::json;
//!
//! let schema = array()
//!     .option("minLength", 1)
//!     .items([boolean()])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.validate(&json!([true, false])).unwrap(), json!([true, false]));
//!
//! let err = schema.validate(&json!(["hello"])).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "Error validating element schema[0]: Got string, required Boolean"
//! );
//! ```
//!
//! ## Custom kinds
//!
//! Implement [`Kind`] (or wrap a closure in [`FnKind`]) and add it with
//! [`Registry::with_kind`]. Registries are immutable values, so extending one
//! never affects schemas built from another.
//!
//! ## Introspection and derivation
//!
//! [`Validator::document`] returns a serializable [`Descriptor`] of the tree;
//! [`Validator::clone_with`] derives a narrowed or re-optioned copy.

// ValidationError is returned by every node on every path; boxing it would
// add an allocation to each failing evaluation.
#![allow(clippy::result_large_err)]

pub mod builder;
pub mod error;
pub mod kind;
pub mod kinds;
pub mod node;
pub mod options;
pub mod prelude;
pub mod registry;

pub use builder::{IntoSchema, SchemaBuilder};
pub use error::{DeliveryError, ErrorKind, SchemaError, ValidationError};
pub use kind::{ChildArity, FnKind, Kind, Outcome};
pub use node::{Children, Comment, Descriptor, DescriptorChildren, Patch, Validator};
pub use options::{Options, merge};
pub use registry::{Arg, Constructor, Registry, RegistryBuilder, RegistryConfig};
