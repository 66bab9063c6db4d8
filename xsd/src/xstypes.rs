use std::{
    fmt,
    hash::{Hash, Hasher},
};

use crate::constants::{XHTML_DIV, XHTML_NAMESPACE, XML_NAMESPACE, XS_NAMESPACE};

pub type NCName = String;
pub type AnyURI = String;

/// Where a qualified name points: into the XSD namespace itself, or at a type some schema
/// document defines.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NameOrigin {
    Builtin,
    Schema,
}

/// A qualified name as written in a reference attribute (`base`, `type`, `ref`, ...).
///
/// The prefix is kept for display only; two names are equal when their namespace names and
/// local names are.
#[derive(Clone, Debug)]
pub struct QName {
    pub prefix: Option<String>,
    pub namespace_name: Option<AnyURI>,
    pub local_name: NCName,
    pub origin: NameOrigin,
}

impl PartialEq for QName {
    fn eq(&self, other: &Self) -> bool {
        self.namespace_name == other.namespace_name && self.local_name == other.local_name
    }
}

impl Eq for QName {}

impl Hash for QName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace_name.hash(state);
        self.local_name.hash(state);
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = self.prefix.as_ref() {
            write!(f, "{}:{}", prefix, self.local_name)
        } else {
            write!(f, "{}", self.local_name)
        }
    }
}

impl QName {
    pub fn with_namespace(
        namespace_name: impl Into<String>,
        local_name: impl Into<String>,
    ) -> Self {
        Self::with_optional_namespace(Some(namespace_name), local_name)
    }

    pub fn with_optional_namespace(
        namespace_name: Option<impl Into<String>>,
        local_name: impl Into<String>,
    ) -> Self {
        let namespace_name = namespace_name.map(Into::into);
        Self {
            prefix: None,
            origin: Self::origin_of(namespace_name.as_deref()),
            namespace_name,
            local_name: local_name.into(),
        }
    }

    /// A name in the XSD namespace, displayed with the conventional `xs` prefix.
    pub fn builtin(local_name: impl Into<String>) -> Self {
        Self {
            prefix: Some("xs".into()),
            ..Self::with_namespace(XS_NAMESPACE, local_name)
        }
    }

    fn origin_of(namespace_name: Option<&str>) -> NameOrigin {
        if namespace_name == Some(XS_NAMESPACE) {
            NameOrigin::Builtin
        } else {
            NameOrigin::Schema
        }
    }

    pub fn qualified(
        prefix: impl AsRef<str>,
        local_name: impl Into<String>,
        context: roxmltree::Node,
    ) -> Self {
        let prefix = prefix.as_ref();
        let namespace_name = if prefix == "xml" {
            // The prefix xml is by definition bound to the namespace name
            // http://www.w3.org/XML/1998/namespace.
            // (Namespaces in XML 1.0, §3, Reserved Prefixes and Namespace Names)
            Some(XML_NAMESPACE)
        } else {
            context.lookup_namespace_uri(Some(prefix))
        };
        if namespace_name.is_none() {
            // Kept as written; a lookup with it fails and reports the lexical name.
            tracing::debug!(prefix, "namespace prefix is not bound");
        }
        Self {
            prefix: Some(prefix.to_string()),
            ..Self::with_optional_namespace(namespace_name, local_name)
        }
    }

    pub fn unqualified(local_name: impl Into<String>, context: roxmltree::Node) -> Self {
        // If there is a default namespace declaration in scope, the expanded name corresponding to
        // an unprefixed element name has the URI of the default namespace as its namespace name.
        // If there is no default namespace declaration in scope, the namespace name has no value.
        // (Namespaces in XML 1.0, §6.2)
        let namespace_name = context.lookup_namespace_uri(None);
        QName::with_optional_namespace(namespace_name, local_name)
    }

    pub fn parse(source: &str, context: roxmltree::Node) -> Self {
        if let Some((prefix, local)) = source.rsplit_once(':') {
            Self::qualified(prefix, local, context)
        } else {
            Self::unqualified(source, context)
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.origin == NameOrigin::Builtin
    }

    /// The XHTML `div` FHIR narratives embed, matched by namespace or, when the prefix is
    /// unbound, by its lexical form.
    pub fn is_xhtml_div(&self) -> bool {
        match self.namespace_name.as_deref() {
            Some(namespace) => namespace == XHTML_NAMESPACE && self.local_name == "div",
            None => self.to_string() == XHTML_DIV,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    const DOC: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
        xmlns="http://hl7.org/fhir" xmlns:xhtml="http://www.w3.org/1999/xhtml"/>"#;

    #[test]
    fn prefixed_builtin_name() {
        let doc = Document::parse(DOC).unwrap();
        let name = QName::parse("xs:decimal", doc.root_element());
        assert_eq!(name.origin, NameOrigin::Builtin);
        assert_eq!(name.local_name, "decimal");
        assert_eq!(name.to_string(), "xs:decimal");
        assert_eq!(name, QName::builtin("decimal"));
    }

    #[test]
    fn unprefixed_name_uses_default_namespace() {
        let doc = Document::parse(DOC).unwrap();
        let name = QName::parse("DomainResource", doc.root_element());
        assert_eq!(name.origin, NameOrigin::Schema);
        assert_eq!(name.namespace_name.as_deref(), Some("http://hl7.org/fhir"));
        assert_eq!(
            name,
            QName::with_namespace("http://hl7.org/fhir", "DomainResource")
        );
        assert_eq!(name.to_string(), "DomainResource");
    }

    #[test]
    fn unbound_prefix_keeps_lexical_form() {
        let doc = Document::parse(DOC).unwrap();
        let name = QName::parse("Foo:Bar", doc.root_element());
        assert_eq!(name.origin, NameOrigin::Schema);
        assert_eq!(name.namespace_name, None);
        assert_eq!(name.to_string(), "Foo:Bar");
    }

    #[test]
    fn xhtml_div() {
        let doc = Document::parse(DOC).unwrap();
        assert!(QName::parse("xhtml:div", doc.root_element()).is_xhtml_div());
        assert!(!QName::parse("div", doc.root_element()).is_xhtml_div());
    }
}
