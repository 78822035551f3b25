//! Prelude module for convenient imports.
//!
//! ```rust
//! use nebula_schema::prelude::*;
//! ```

pub use crate::builder::{
    IntoSchema, SchemaBuilder, any, array, boolean, email, number, object, string,
};
pub use crate::error::{DeliveryError, ErrorKind, SchemaError, ValidationError};
pub use crate::kind::{ChildArity, FnKind, Kind, Outcome};
pub use crate::node::{Children, Comment, Descriptor, DescriptorChildren, Patch, Validator};
pub use crate::options::{Options, OptionsExt, merge, type_name};
pub use crate::registry::{Arg, Constructor, Registry, RegistryBuilder, RegistryConfig};
