pub mod annotation;
pub mod builtins;
pub mod class_generator;
pub mod constants;
pub mod construct;
pub mod context;
pub mod error;
pub mod naming;
pub mod property;
pub mod registry;
pub mod schema;
pub mod template;
pub mod xstypes;

mod values;

pub use builtins::{PrimitiveCatalogue, XsPrimitives};
pub use class_generator::{build_class_template, BaseReference, TypeDefinitionSource};
pub use construct::ConstructKind;
pub use context::BuildContext;
pub use error::XsdError;
pub use property::{PropertyGenerator, PropertyParser};
pub use registry::{DuplicateTypeAction, TypeRegistry, XsdMap, XsdMapEntry, XsdMapOptions};
pub use schema::{SchemaDocument, SchemaSource};
pub use template::{
    MaxOccurs, Occurrence, ParentClass, PropertyDescriptor, PropertyKind, TypeRef, TypeTemplate,
    UseStatement,
};
pub use xstypes::{NameOrigin, QName};
