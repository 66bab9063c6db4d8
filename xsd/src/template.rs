use std::{collections::BTreeSet, fmt};

use crate::{error::XsdError, naming, xstypes::QName};

/// Path by which generated code imports a class, e.g. `crate::fhir::element::FHIRExtension`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UseStatement(String);

impl UseStatement {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &str {
        &self.0
    }

    /// The last path segment. Both `::` and `\` count as separators.
    pub fn short_name(&self) -> &str {
        self.split().1
    }

    /// Everything before the last path segment, empty for a bare name.
    pub fn module_path(&self) -> &str {
        self.split().0
    }

    fn split(&self) -> (&str, &str) {
        match (self.0.rfind("::"), self.0.rfind('\\')) {
            (Some(colons), Some(backslash)) if backslash > colons => {
                (&self.0[..backslash], &self.0[backslash + 1..])
            }
            (Some(colons), _) => (&self.0[..colons], &self.0[colons + 2..]),
            (None, Some(backslash)) => (&self.0[..backslash], &self.0[backslash + 1..]),
            (None, None) => ("", &self.0),
        }
    }
}

impl fmt::Display for UseStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParentClass {
    pub class_name: String,
    pub use_statement: UseStatement,
}

/// A resolved reference to the type of a property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRef {
    pub class_name: String,
    pub use_statement: UseStatement,
    /// Whether the class is a primitive wrapper rather than a generated class
    pub primitive: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MaxOccurs {
    Unbounded,
    Count(u64),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Occurrence {
    pub min_occurs: u64,
    pub max_occurs: MaxOccurs,
}

impl Occurrence {
    pub const REQUIRED: Self = Self {
        min_occurs: 1,
        max_occurs: MaxOccurs::Count(1),
    };
    pub const OPTIONAL: Self = Self {
        min_occurs: 0,
        max_occurs: MaxOccurs::Count(1),
    };

    pub fn is_optional(&self) -> bool {
        self.min_occurs == 0
    }

    pub fn is_repeated(&self) -> bool {
        match self.max_occurs {
            MaxOccurs::Unbounded => true,
            MaxOccurs::Count(max) => max > 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    Attribute,
    Element,
    Enumeration { value: String },
    Union { members: Vec<TypeRef> },
}

/// One generated field (or, for enumerations, one allowed value).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyDescriptor {
    /// Name of the generated field or constant
    pub name: String,
    /// Name as written in the schema (the literal value for enumerations)
    pub xml_name: String,
    pub kind: PropertyKind,
    /// Absent for enumeration values and unions, whose types live in `kind`
    pub value_type: Option<TypeRef>,
    pub occurrence: Occurrence,
    pub documentation: Option<String>,
}

/// The pre-emission representation of one generated class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeTemplate {
    object_name: QName,
    class_name: String,
    namespace: String,
    parent: Option<ParentClass>,
    documentation: Option<String>,
    properties: Vec<PropertyDescriptor>,
    uses: BTreeSet<UseStatement>,
}

impl TypeTemplate {
    pub fn new(
        object_name: QName,
        class_name: impl Into<String>,
        namespace: impl AsRef<str>,
    ) -> Result<Self, XsdError> {
        let class_name = class_name.into();
        if !naming::is_identifier(&class_name) {
            return Err(XsdError::InvalidClassName(class_name));
        }
        let namespace = naming::normalize_namespace(namespace.as_ref())?;
        Ok(Self {
            object_name,
            class_name,
            namespace,
            parent: None,
            documentation: None,
            properties: Vec::new(),
            uses: BTreeSet::new(),
        })
    }

    pub fn object_name(&self) -> &QName {
        &self.object_name
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn parent(&self) -> Option<&ParentClass> {
        self.parent.as_ref()
    }

    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn uses(&self) -> impl Iterator<Item = &UseStatement> {
        self.uses.iter()
    }

    pub fn set_documentation(&mut self, documentation: Option<String>) {
        self.documentation = documentation;
    }

    /// Sets the parent class and imports it. Returns `false`, leaving the template unchanged,
    /// when a parent is already set.
    pub fn set_parent(&mut self, parent: ParentClass) -> bool {
        if self.parent.is_some() {
            return false;
        }
        self.uses.insert(parent.use_statement.clone());
        self.parent = Some(parent);
        true
    }

    /// Returns `false` if the statement was already present.
    pub fn add_use(&mut self, use_statement: UseStatement) -> bool {
        self.uses.insert(use_statement)
    }

    pub fn add_property(&mut self, property: PropertyDescriptor) {
        self.properties.push(property);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> TypeTemplate {
        TypeTemplate::new(QName::builtin("x"), "FHIRPatient", "fhir::domain_resource").unwrap()
    }

    #[test]
    fn use_statement_segments() {
        let rust = UseStatement::new("crate::fhir::FHIRElement");
        assert_eq!(rust.short_name(), "FHIRElement");
        assert_eq!(rust.module_path(), "crate::fhir");

        let backslashed = UseStatement::new("FHIR\\DomainResource");
        assert_eq!(backslashed.short_name(), "DomainResource");
        assert_eq!(backslashed.module_path(), "FHIR");

        assert_eq!(UseStatement::new("Bare").short_name(), "Bare");
    }

    #[test]
    fn rejects_invalid_class_name() {
        let err = TypeTemplate::new(QName::builtin("x"), "1Patient", "fhir").unwrap_err();
        assert!(matches!(err, XsdError::InvalidClassName(name) if name == "1Patient"));
    }

    #[test]
    fn parent_is_set_once() {
        let mut template = template();
        let first = ParentClass {
            class_name: "FHIRDomainResource".into(),
            use_statement: UseStatement::new("crate::fhir::FHIRDomainResource"),
        };
        let second = ParentClass {
            class_name: "FHIRElement".into(),
            use_statement: UseStatement::new("crate::fhir::FHIRElement"),
        };
        assert!(template.set_parent(first.clone()));
        assert!(!template.set_parent(second));
        assert_eq!(template.parent(), Some(&first));
        assert_eq!(template.uses().count(), 1);
    }

    #[test]
    fn uses_are_deduplicated() {
        let mut template = template();
        assert!(template.add_use(UseStatement::new("crate::fhir::FHIRString")));
        assert!(!template.add_use(UseStatement::new("crate::fhir::FHIRString")));
        assert!(template.add_use(UseStatement::new("crate::fhir::FHIRBoolean")));
        let uses: Vec<_> = template.uses().map(UseStatement::path).collect();
        assert_eq!(uses, ["crate::fhir::FHIRBoolean", "crate::fhir::FHIRString"]);
    }

    #[test]
    fn occurrence_shapes() {
        assert!(Occurrence::OPTIONAL.is_optional());
        assert!(!Occurrence::REQUIRED.is_repeated());
        let many = Occurrence {
            min_occurs: 1,
            max_occurs: MaxOccurs::Count(3),
        };
        assert!(many.is_repeated());
    }
}
