use std::path::PathBuf;

use thiserror::Error;

use crate::xstypes::QName;

#[derive(Debug, Error)]
pub enum XsdError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}", path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },
    #[error("{} does not have an xs:schema root element", path.display())]
    NotASchema { path: PathBuf },
    #[error("<{element}> is missing the {attribute:?} attribute")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },
    #[error("invalid value {value:?} for attribute {attribute:?}")]
    InvalidAttribute {
        attribute: &'static str,
        value: String,
    },
    #[error("type {name} is defined in both {} and {}", first.display(), second.display())]
    DuplicateType {
        name: QName,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("{0:?} is not a valid class name")]
    InvalidClassName(String),
    #[error("{0:?} is not a valid namespace")]
    InvalidNamespace(String),
    #[error("type {0} is not registered")]
    ReferenceNotFound(QName),
    #[error("{0:?} is not a known XSD primitive")]
    UnknownPrimitive(String),
    #[error("cannot resolve parent {reference} of {owner}")]
    UnresolvedParent {
        owner: String,
        reference: QName,
        #[source]
        source: Box<XsdError>,
    },
    #[error("cannot resolve type {reference} of property {property:?} in {owner}")]
    UnresolvedProperty {
        owner: String,
        property: String,
        reference: QName,
        #[source]
        source: Box<XsdError>,
    },
}

impl XsdError {
    /// Whether this error is a dangling type reference, as opposed to a broken input or
    /// configuration.
    pub fn is_unresolved_reference(&self) -> bool {
        matches!(
            self,
            Self::UnresolvedParent { .. }
                | Self::UnresolvedProperty { .. }
                | Self::ReferenceNotFound(_)
                | Self::UnknownPrimitive(_)
        )
    }
}
