use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use roxmltree::Node;

use crate::{
    class_generator::TypeDefinitionSource,
    constants::{DEFAULT_CLASS_PREFIX, DEFAULT_ROOT_NAMESPACE},
    construct::{xs_children, ConstructKind},
    error::XsdError,
    naming,
    schema::SchemaDocument,
    template::UseStatement,
    values::attribute,
    xstypes::QName,
};

/// Maps schema type names to the classes generated for them.
pub trait TypeRegistry: Sync {
    fn class_name(&self, name: &QName) -> Result<&str, XsdError>;
    fn use_statement(&self, name: &QName) -> Result<&UseStatement, XsdError>;
}

/// What to do when two schema files define the same type.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DuplicateTypeAction {
    Deny,
    #[default]
    Warn,
    Allow,
}

#[derive(Clone, Debug)]
pub struct XsdMapOptions {
    pub root_namespace: String,
    pub class_prefix: String,
    pub duplicate_types: DuplicateTypeAction,
}

impl Default for XsdMapOptions {
    fn default() -> Self {
        Self {
            root_namespace: DEFAULT_ROOT_NAMESPACE.to_string(),
            class_prefix: DEFAULT_CLASS_PREFIX.to_string(),
            duplicate_types: DuplicateTypeAction::default(),
        }
    }
}

pub struct XsdMapEntry<'a, 'input> {
    pub definition: TypeDefinitionSource<'a, 'input>,
    pub use_statement: UseStatement,
    /// File the type is defined in
    pub source: &'a Path,
    /// First extension or restriction base
    pub base: Option<QName>,
}

/// Registry of every named type of a schema set, in registration order.
pub struct XsdMap<'a, 'input> {
    entries: Vec<XsdMapEntry<'a, 'input>>,
    index: HashMap<QName, usize>,
}

/// The base of the first derivation block of a type definition, looking through
/// `complexContent`/`simpleContent`.
fn derivation_base(node: Node) -> Result<Option<QName>, XsdError> {
    for child in xs_children(node) {
        match ConstructKind::of(child) {
            Some(ConstructKind::Restriction | ConstructKind::Extension) => {
                return attribute(child, "base")
            }
            Some(ConstructKind::ComplexContent | ConstructKind::SimpleContent) => {
                if let Some(block) = xs_children(child).find(|c| {
                    matches!(
                        ConstructKind::of(*c),
                        Some(ConstructKind::Restriction | ConstructKind::Extension)
                    )
                }) {
                    return attribute(block, "base");
                }
            }
            _ => {}
        }
    }
    Ok(None)
}

struct Registration<'a, 'input> {
    object_name: QName,
    class_name: String,
    node: Node<'a, 'input>,
    source: &'a Path,
    base: Option<QName>,
}

impl<'a, 'input> XsdMap<'a, 'input> {
    pub fn build(
        documents: &'a [SchemaDocument<'input>],
        options: &XsdMapOptions,
    ) -> Result<Self, XsdError> {
        let root_namespace = naming::normalize_namespace(&options.root_namespace)?;

        let mut registered: Vec<Registration<'a, 'input>> = Vec::new();
        let mut index: HashMap<QName, usize> = HashMap::new();
        for document in documents {
            for (object_name, node) in document.type_definitions() {
                if let Some(&first) = index.get(&object_name) {
                    let first_path = registered[first].source;
                    match options.duplicate_types {
                        DuplicateTypeAction::Deny => {
                            return Err(XsdError::DuplicateType {
                                name: object_name,
                                first: first_path.to_path_buf(),
                                second: document.path.to_path_buf(),
                            })
                        }
                        DuplicateTypeAction::Warn => tracing::warn!(
                            name = %object_name,
                            first = %first_path.display(),
                            second = %document.path.display(),
                            "type defined twice, keeping the first definition"
                        ),
                        DuplicateTypeAction::Allow => {}
                    }
                    continue;
                }
                let class_name = naming::class_name(&options.class_prefix, &object_name.local_name)?;
                let base = derivation_base(node)?;
                index.insert(object_name.clone(), registered.len());
                registered.push(Registration {
                    object_name,
                    class_name,
                    node,
                    source: document.path,
                    base,
                });
            }
        }

        let mut entries = Vec::with_capacity(registered.len());
        for (position, registration) in registered.iter().enumerate() {
            let mut modules = Vec::new();
            let mut visited = HashSet::from([position]);
            let mut current = registration.base.as_ref();
            while let Some(&ancestor) = current.and_then(|b| index.get(b)) {
                if !visited.insert(ancestor) {
                    tracing::warn!(name = %registration.object_name, "cyclic type derivation");
                    break;
                }
                let ancestor = &registered[ancestor];
                modules.push(naming::module_name(&ancestor.object_name.local_name));
                current = ancestor.base.as_ref();
            }
            modules.reverse();

            let namespace = modules
                .iter()
                .fold(root_namespace.clone(), |ns, module| {
                    naming::join_namespace(&ns, module)
                });
            let use_statement = UseStatement::new(format!(
                "crate::{}",
                naming::join_namespace(&namespace, &registration.class_name)
            ));
            entries.push(XsdMapEntry {
                definition: TypeDefinitionSource {
                    object_name: registration.object_name.clone(),
                    class_name: registration.class_name.clone(),
                    namespace,
                    node: registration.node,
                },
                use_statement,
                source: registration.source,
                base: registration.base.clone(),
            });
        }

        tracing::info!(types = entries.len(), "registered schema types");
        Ok(Self { entries, index })
    }

    pub fn entries(&self) -> &[XsdMapEntry<'a, 'input>] {
        &self.entries
    }

    pub fn get(&self, name: &QName) -> Option<&XsdMapEntry<'a, 'input>> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TypeRegistry for XsdMap<'_, '_> {
    fn class_name(&self, name: &QName) -> Result<&str, XsdError> {
        self.get(name)
            .map(|entry| entry.definition.class_name.as_str())
            .ok_or_else(|| XsdError::ReferenceNotFound(name.clone()))
    }

    fn use_statement(&self, name: &QName) -> Result<&UseStatement, XsdError> {
        self.get(name)
            .map(|entry| &entry.use_statement)
            .ok_or_else(|| XsdError::ReferenceNotFound(name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{constants::FHIR_NAMESPACE, schema::SchemaSource};
    use pretty_assertions::assert_eq;

    const RESOURCES_XSD: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
        xmlns="http://hl7.org/fhir" targetNamespace="http://hl7.org/fhir">
  <xs:complexType name="Resource"/>
  <xs:complexType name="DomainResource">
    <xs:complexContent><xs:extension base="Resource"/></xs:complexContent>
  </xs:complexType>
  <xs:complexType name="Patient">
    <xs:complexContent><xs:extension base="DomainResource"/></xs:complexContent>
  </xs:complexType>
  <xs:simpleType name="decimal-primitive">
    <xs:restriction base="xs:decimal"/>
  </xs:simpleType>
</xs:schema>"#;

    fn fhir(local: &str) -> QName {
        QName::with_namespace(FHIR_NAMESPACE, local)
    }

    fn source(name: &str, text: &str) -> SchemaSource {
        SchemaSource::from_bytes(name, text.as_bytes())
    }

    #[test]
    fn namespaces_follow_ancestors() {
        let sources = [source("resources.xsd", RESOURCES_XSD)];
        let documents = crate::schema::parse_all(&sources, false).unwrap();
        let map = XsdMap::build(&documents, &XsdMapOptions::default()).unwrap();

        let namespaces: Vec<_> = map
            .entries()
            .iter()
            .map(|e| (e.definition.class_name.as_str(), e.definition.namespace.as_str()))
            .collect();
        assert_eq!(
            namespaces,
            [
                ("FHIRResource", "fhir"),
                ("FHIRDomainResource", "fhir::resource"),
                ("FHIRPatient", "fhir::resource::domain_resource"),
                ("FHIRDecimalPrimitive", "fhir"),
            ]
        );
        assert_eq!(
            map.use_statement(&fhir("Patient")).unwrap().path(),
            "crate::fhir::resource::domain_resource::FHIRPatient"
        );
        assert_eq!(map.get(&fhir("Patient")).unwrap().base, Some(fhir("DomainResource")));
        assert_eq!(
            map.get(&fhir("decimal-primitive")).unwrap().base,
            Some(QName::builtin("decimal"))
        );
    }

    #[test]
    fn unknown_reference() {
        let sources = [source("resources.xsd", RESOURCES_XSD)];
        let documents = crate::schema::parse_all(&sources, false).unwrap();
        let map = XsdMap::build(&documents, &XsdMapOptions::default()).unwrap();
        let err = map.class_name(&fhir("Observation")).unwrap_err();
        assert_eq!(err.to_string(), "type Observation is not registered");
    }

    #[test]
    fn custom_root_namespace_and_prefix() {
        let sources = [source("resources.xsd", RESOURCES_XSD)];
        let documents = crate::schema::parse_all(&sources, false).unwrap();
        let options = XsdMapOptions {
            root_namespace: "\\Model\\R4\\".into(),
            class_prefix: "R4".into(),
            ..Default::default()
        };
        let map = XsdMap::build(&documents, &options).unwrap();
        assert_eq!(
            map.use_statement(&fhir("DomainResource")).unwrap().path(),
            "crate::Model::R4::resource::R4DomainResource"
        );
    }

    #[test]
    fn empty_root_namespace() {
        let sources = [source("resources.xsd", RESOURCES_XSD)];
        let documents = crate::schema::parse_all(&sources, false).unwrap();
        let options = XsdMapOptions {
            root_namespace: String::new(),
            ..Default::default()
        };
        let map = XsdMap::build(&documents, &options).unwrap();
        assert_eq!(
            map.use_statement(&fhir("Resource")).unwrap().path(),
            "crate::FHIRResource"
        );
    }

    #[test]
    fn duplicate_types() {
        let sources = [
            source("a.xsd", RESOURCES_XSD),
            source("b.xsd", RESOURCES_XSD),
        ];
        let documents = crate::schema::parse_all(&sources, false).unwrap();

        let options = XsdMapOptions {
            duplicate_types: DuplicateTypeAction::Deny,
            ..Default::default()
        };
        let err = XsdMap::build(&documents, &options).err().unwrap();
        assert!(matches!(err, XsdError::DuplicateType { ref name, .. } if *name == fhir("Resource")));

        for action in [DuplicateTypeAction::Warn, DuplicateTypeAction::Allow] {
            let options = XsdMapOptions {
                duplicate_types: action,
                ..Default::default()
            };
            let map = XsdMap::build(&documents, &options).unwrap();
            assert_eq!(map.len(), 4);
            assert_eq!(
                map.get(&fhir("Patient")).unwrap().source,
                Path::new("a.xsd")
            );
        }
    }

    #[test]
    fn derivation_cycles_terminate() {
        let text = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="A"><xs:complexContent><xs:extension base="B"/></xs:complexContent></xs:complexType>
  <xs:complexType name="B"><xs:complexContent><xs:extension base="A"/></xs:complexContent></xs:complexType>
</xs:schema>"#;
        let sources = [source("cycle.xsd", text)];
        let documents = crate::schema::parse_all(&sources, false).unwrap();
        let map = XsdMap::build(&documents, &XsdMapOptions::default()).unwrap();
        let a = QName::with_optional_namespace(None::<String>, "A");
        assert_eq!(map.get(&a).unwrap().definition.namespace, "fhir::b");
    }

    #[test]
    fn derivation_tags_ignore_case() {
        let text = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="Base"/>
  <xs:complexType name="Shouty"><xs:ComplexContent><xs:EXTENSION base="Base"/></xs:ComplexContent></xs:complexType>
  <xs:complexType name="Quantity"><xs:simpleContent><xs:extension base="Base"/></xs:simpleContent></xs:complexType>
</xs:schema>"#;
        let sources = [source("case.xsd", text)];
        let documents = crate::schema::parse_all(&sources, false).unwrap();
        let map = XsdMap::build(&documents, &XsdMapOptions::default()).unwrap();
        let base = QName::with_optional_namespace(None::<String>, "Base");
        for name in ["Shouty", "Quantity"] {
            let entry = map
                .get(&QName::with_optional_namespace(None::<String>, name))
                .unwrap();
            assert_eq!(entry.base.as_ref(), Some(&base));
            assert_eq!(entry.definition.namespace, "fhir::base");
        }
    }
}
