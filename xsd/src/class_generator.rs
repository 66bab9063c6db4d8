use roxmltree::Node;

use crate::{
    annotation::documentation,
    construct::{xs_children, ConstructKind},
    context::BuildContext,
    error::XsdError,
    template::{ParentClass, TypeTemplate},
    values::attribute,
    xstypes::QName,
};

/// A registered type definition the class builder works from.
#[derive(Clone, Debug)]
pub struct TypeDefinitionSource<'a, 'input> {
    pub object_name: QName,
    pub class_name: String,
    pub namespace: String,
    pub node: Node<'a, 'input>,
}

/// How a derivation block names its base type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BaseReference {
    Extension(QName),
    Restriction(QName),
}

impl BaseReference {
    /// Reads the `base` attribute of an `extension` or `restriction` block. `None` for a block
    /// without a base, or for any other node.
    pub fn from_block(block: Node) -> Result<Option<Self>, XsdError> {
        let constructor = match ConstructKind::of(block) {
            Some(ConstructKind::Extension) => BaseReference::Extension,
            Some(ConstructKind::Restriction) => BaseReference::Restriction,
            _ => return Ok(None),
        };
        Ok(attribute::<QName>(block, "base")?.map(constructor))
    }

    pub fn name(&self) -> &QName {
        match self {
            BaseReference::Extension(name) | BaseReference::Restriction(name) => name,
        }
    }
}

/// Builds the class template of one type definition.
pub fn build_class_template(
    ctx: &BuildContext,
    definition: &TypeDefinitionSource,
) -> Result<TypeTemplate, XsdError> {
    let mut template = TypeTemplate::new(
        definition.object_name.clone(),
        definition.class_name.as_str(),
        &definition.namespace,
    )?;

    for child in xs_children(definition.node) {
        match ConstructKind::of(child) {
            Some(
                ConstructKind::Attribute
                | ConstructKind::Choice
                | ConstructKind::Sequence
                | ConstructKind::Union,
            ) => ctx.properties.implement_property(ctx, child, &mut template)?,
            Some(ConstructKind::Annotation) => template.set_documentation(documentation(child)),
            Some(ConstructKind::ComplexContent) => {
                parse_complex_content(ctx, child, &mut template)?
            }
            Some(ConstructKind::Restriction) => parse_derivation(ctx, child, &mut template)?,
            Some(
                kind @ (ConstructKind::SimpleContent
                | ConstructKind::Extension
                | ConstructKind::Enumeration),
            ) => {
                tracing::trace!(
                    class = template.class_name(),
                    ?kind,
                    "ignoring construct at type level"
                )
            }
            None => tracing::trace!(
                class = template.class_name(),
                tag = child.tag_name().name(),
                "ignoring unrecognized construct"
            ),
        }
    }

    Ok(template)
}

fn parse_complex_content(
    ctx: &BuildContext,
    complex_content: Node,
    template: &mut TypeTemplate,
) -> Result<(), XsdError> {
    for child in xs_children(complex_content) {
        if ConstructKind::of(child) == Some(ConstructKind::Extension) {
            parse_derivation(ctx, child, template)?;
        } else {
            tracing::trace!(
                class = template.class_name(),
                tag = child.tag_name().name(),
                "ignoring complex content child"
            );
        }
    }
    Ok(())
}

/// Handles an `extension` or `restriction` block: the parent class first, then the block's
/// property constructs in document order.
fn parse_derivation(
    ctx: &BuildContext,
    block: Node,
    template: &mut TypeTemplate,
) -> Result<(), XsdError> {
    determine_parent_class(ctx, block, template)?;

    for child in xs_children(block) {
        match ConstructKind::of(child) {
            Some(
                ConstructKind::Attribute
                | ConstructKind::Choice
                | ConstructKind::Sequence
                | ConstructKind::Union
                | ConstructKind::Enumeration,
            ) => ctx.properties.implement_property(ctx, child, template)?,
            _ => tracing::trace!(
                class = template.class_name(),
                tag = child.tag_name().name(),
                "ignoring derivation child"
            ),
        }
    }
    Ok(())
}

fn determine_parent_class(
    ctx: &BuildContext,
    block: Node,
    template: &mut TypeTemplate,
) -> Result<(), XsdError> {
    let Some(base) = BaseReference::from_block(block)? else {
        return Ok(());
    };
    if let Some(parent) = template.parent() {
        tracing::warn!(
            class = template.class_name(),
            parent = parent.class_name.as_str(),
            ignored = %base.name(),
            "type has more than one derivation block, keeping the first parent"
        );
        return Ok(());
    }

    let resolved = match &base {
        BaseReference::Restriction(name) if name.is_builtin() => ctx
            .primitives
            .lookup(&name.local_name)
            .map(|use_statement| ParentClass {
                class_name: use_statement.short_name().to_string(),
                use_statement,
            }),
        BaseReference::Extension(name) | BaseReference::Restriction(name) => {
            ctx.registry.class_name(name).and_then(|class_name| {
                Ok(ParentClass {
                    class_name: class_name.to_string(),
                    use_statement: ctx.registry.use_statement(name)?.clone(),
                })
            })
        }
    };
    let parent = resolved.map_err(|source| XsdError::UnresolvedParent {
        owner: template.class_name().to_string(),
        reference: base.name().clone(),
        source: Box::new(source),
    })?;

    tracing::trace!(
        class = template.class_name(),
        parent = parent.class_name.as_str(),
        "resolved parent class"
    );
    template.set_parent(parent);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        builtins::{PrimitiveCatalogue, XsPrimitives},
        constants::FHIR_NAMESPACE,
        naming,
        property::{PropertyGenerator, PropertyParser},
        registry::{TypeRegistry, XsdMap, XsdMapOptions},
        schema::{parse_all, SchemaSource},
        template::{PropertyKind, UseStatement},
    };
    use pretty_assertions::assert_eq;
    use roxmltree::Document;
    use std::{collections::HashMap, sync::Mutex};

    const XS: &str = r#"xmlns:xs="http://www.w3.org/2001/XMLSchema""#;

    /// Registry keyed by the lexical form of a name, recording every lookup.
    #[derive(Default)]
    struct FakeRegistry {
        classes: HashMap<String, (String, UseStatement)>,
        lookups: Mutex<Vec<String>>,
    }

    impl FakeRegistry {
        fn with(mut self, name: &str, class: &str, use_statement: &str) -> Self {
            self.classes.insert(
                name.to_string(),
                (class.to_string(), UseStatement::new(use_statement)),
            );
            self
        }

        fn lookups(&self) -> Vec<String> {
            self.lookups.lock().unwrap().clone()
        }

        fn find(&self, name: &QName) -> Result<&(String, UseStatement), XsdError> {
            self.lookups.lock().unwrap().push(name.to_string());
            self.classes
                .get(&name.to_string())
                .ok_or_else(|| XsdError::ReferenceNotFound(name.clone()))
        }
    }

    impl TypeRegistry for FakeRegistry {
        fn class_name(&self, name: &QName) -> Result<&str, XsdError> {
            self.find(name).map(|(class, _)| class.as_str())
        }

        fn use_statement(&self, name: &QName) -> Result<&UseStatement, XsdError> {
            self.find(name).map(|(_, use_statement)| use_statement)
        }
    }

    struct FakePrimitives;

    impl PrimitiveCatalogue for FakePrimitives {
        fn lookup(&self, name: &str) -> Result<UseStatement, XsdError> {
            match name {
                "decimal" => Ok(UseStatement::new("FHIR\\Primitive\\FHIRDecimalPrimitive")),
                "string" => Ok(UseStatement::new("FHIR\\Primitive\\FHIRStringPrimitive")),
                _ => Err(XsdError::UnknownPrimitive(name.to_string())),
            }
        }
    }

    /// Records the tag and first attribute of every construct it is handed.
    #[derive(Default)]
    struct RecordingParser {
        seen: Mutex<Vec<String>>,
    }

    impl PropertyParser for RecordingParser {
        fn implement_property(
            &self,
            _ctx: &BuildContext,
            node: Node,
            _template: &mut TypeTemplate,
        ) -> Result<(), XsdError> {
            let label = match node.attributes().next() {
                Some(attr) => format!("{}:{}", node.tag_name().name(), attr.value()),
                None => node.tag_name().name().to_string(),
            };
            self.seen.lock().unwrap().push(label);
            Ok(())
        }
    }

    fn build(
        xml: &str,
        registry: &FakeRegistry,
        properties: &dyn PropertyParser,
    ) -> Result<TypeTemplate, XsdError> {
        let doc = Document::parse(xml).unwrap();
        let node = doc.root_element();
        let name = node.attribute("name").unwrap();
        let definition = TypeDefinitionSource {
            object_name: QName::with_optional_namespace(None::<String>, name),
            class_name: naming::class_name("FHIR", name).unwrap(),
            namespace: "fhir".to_string(),
            node,
        };
        let ctx = BuildContext::new(registry, &FakePrimitives, properties);
        build_class_template(&ctx, &definition)
    }

    #[test]
    fn root_type_has_no_parent() {
        let registry = FakeRegistry::default();
        let template = build(
            &format!(
                r#"<xs:complexType {XS} name="Element">
                    <xs:annotation><xs:documentation>Base for all elements</xs:documentation></xs:annotation>
                    <xs:attribute name="id" type="xs:string"/>
                </xs:complexType>"#
            ),
            &registry,
            &PropertyGenerator,
        )
        .unwrap();
        assert_eq!(template.parent(), None);
        assert_eq!(template.documentation(), Some("Base for all elements"));
        assert_eq!(template.properties().len(), 1);
        assert!(registry.lookups().is_empty());
    }

    #[test]
    fn extension_parent_from_registry() {
        let registry =
            FakeRegistry::default().with("DomainResource", "FHIRDomainResource", "FHIR\\DomainResource");
        let template = build(
            &format!(
                r#"<xs:complexType {XS} name="Patient">
                    <xs:complexContent>
                        <xs:extension base="DomainResource"/>
                    </xs:complexContent>
                </xs:complexType>"#
            ),
            &registry,
            &PropertyGenerator,
        )
        .unwrap();
        let parent = template.parent().unwrap();
        assert_eq!(parent.class_name, "FHIRDomainResource");
        let uses: Vec<_> = template.uses().map(UseStatement::path).collect();
        assert_eq!(uses, ["FHIR\\DomainResource"]);
    }

    #[test]
    fn restriction_parent_from_registry_is_used_once() {
        let registry = FakeRegistry::default()
            .with("code", "FHIRCode", "FHIR\\FHIRCode")
            .with("Quantity", "FHIRQuantity", "FHIR\\FHIRQuantity");
        let template = build(
            &format!(
                r#"<xs:complexType {XS} name="Distance">
                    <xs:restriction base="Quantity">
                        <xs:sequence>
                            <xs:element name="comparator" type="code"/>
                            <xs:element name="code" type="code"/>
                        </xs:sequence>
                        <xs:attribute name="unit" type="Quantity"/>
                    </xs:restriction>
                </xs:complexType>"#
            ),
            &registry,
            &PropertyGenerator,
        )
        .unwrap();
        assert_eq!(template.parent().unwrap().class_name, "FHIRQuantity");
        let uses: Vec<_> = template.uses().map(UseStatement::path).collect();
        assert_eq!(uses, ["FHIR\\FHIRCode", "FHIR\\FHIRQuantity"]);
    }

    #[test]
    fn builtin_restriction_uses_primitive_catalogue() {
        let registry = FakeRegistry::default();
        let template = build(
            &format!(
                r#"<xs:simpleType {XS} name="SimpleQuantity">
                    <xs:restriction base="xs:decimal"/>
                </xs:simpleType>"#
            ),
            &registry,
            &PropertyGenerator,
        )
        .unwrap();
        let parent = template.parent().unwrap();
        assert_eq!(parent.class_name, "FHIRDecimalPrimitive");
        assert_eq!(
            parent.use_statement.path(),
            "FHIR\\Primitive\\FHIRDecimalPrimitive"
        );
        assert!(registry.lookups().is_empty());
    }

    #[test]
    fn unresolvable_restriction_base() {
        let registry = FakeRegistry::default();
        let err = build(
            &format!(
                r#"<xs:simpleType {XS} xmlns:Foo="urn:foo" name="Broken">
                    <xs:restriction base="Foo:Bar"/>
                </xs:simpleType>"#
            ),
            &registry,
            &PropertyGenerator,
        )
        .unwrap_err();
        assert!(err.is_unresolved_reference());
        assert_eq!(err.to_string(), "cannot resolve parent Foo:Bar of FHIRBroken");
        assert!(matches!(
            err,
            XsdError::UnresolvedParent { ref reference, .. } if reference.to_string() == "Foo:Bar"
        ));
    }

    #[test]
    fn unknown_builtin_base_is_not_downgraded() {
        let registry = FakeRegistry::default();
        let err = build(
            &format!(
                r#"<xs:simpleType {XS} name="Stamp">
                    <xs:restriction base="xs:dateTimeStamp"/>
                </xs:simpleType>"#
            ),
            &registry,
            &PropertyGenerator,
        )
        .unwrap_err();
        match err {
            XsdError::UnresolvedParent { source, .. } => assert!(matches!(
                *source,
                XsdError::UnknownPrimitive(ref name) if name == "dateTimeStamp"
            )),
            other => panic!("expected an unresolved parent, got {other:?}"),
        }
        assert!(registry.lookups().is_empty());
    }

    #[test]
    fn sibling_sequences_keep_source_order() {
        let registry = FakeRegistry::default();
        let template = build(
            &format!(
                r#"<xs:complexType {XS} name="Pair">
                    <xs:sequence><xs:attribute name="first" type="xs:string"/></xs:sequence>
                    <xs:sequence><xs:attribute name="second" type="xs:string"/></xs:sequence>
                </xs:complexType>"#
            ),
            &registry,
            &PropertyGenerator,
        )
        .unwrap();
        let names: Vec<_> = template.properties().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn constructs_dispatched_in_document_order() {
        let registry = FakeRegistry::default().with("Element", "FHIRElement", "FHIR\\FHIRElement");
        let parser = RecordingParser::default();
        build(
            &format!(
                r#"<xs:complexType {XS} name="Coding">
                    <xs:attribute name="a"/>
                    <xs:simpleContent><xs:extension base="Element"/></xs:simpleContent>
                    <xs:complexContent>
                        <xs:restriction base="Element"><xs:sequence id="ignored"/></xs:restriction>
                        <xs:extension base="Element">
                            <xs:annotation/>
                            <xs:sequence id="b"/>
                            <xs:enumeration value="c"/>
                            <xs:choice id="d"/>
                        </xs:extension>
                    </xs:complexContent>
                    <xs:enumeration value="ignored"/>
                    <xs:union memberTypes="e"/>
                    <xs:choice id="f"/>
                </xs:complexType>"#
            ),
            &registry,
            &parser,
        )
        .unwrap();
        let seen = parser.seen.into_inner().unwrap();
        assert_eq!(
            seen,
            [
                "attribute:a",
                "sequence:b",
                "enumeration:c",
                "choice:d",
                "union:e",
                "choice:f"
            ]
        );
    }

    #[test]
    fn second_derivation_keeps_first_parent() {
        let registry = FakeRegistry::default()
            .with("Element", "FHIRElement", "FHIR\\FHIRElement")
            .with("BackboneElement", "FHIRBackboneElement", "FHIR\\FHIRBackboneElement");
        let template = build(
            &format!(
                r#"<xs:complexType {XS} name="Odd">
                    <xs:complexContent>
                        <xs:extension base="Element"/>
                        <xs:extension base="BackboneElement">
                            <xs:attribute name="kept" type="xs:string"/>
                        </xs:extension>
                    </xs:complexContent>
                </xs:complexType>"#
            ),
            &registry,
            &PropertyGenerator,
        )
        .unwrap();
        assert_eq!(template.parent().unwrap().class_name, "FHIRElement");
        assert_eq!(template.properties()[0].name, "kept");
        assert!(!registry.lookups().contains(&"BackboneElement".to_string()));
    }

    #[test]
    fn enumerations_inside_restrictions() {
        let registry = FakeRegistry::default();
        let template = build(
            &format!(
                r#"<xs:simpleType {XS} name="AdministrativeGender-list">
                    <xs:restriction base="xs:string">
                        <xs:enumeration value="male"/>
                        <xs:enumeration value="female"/>
                    </xs:restriction>
                </xs:simpleType>"#
            ),
            &registry,
            &PropertyGenerator,
        )
        .unwrap();
        assert_eq!(template.class_name(), "FHIRAdministrativeGenderList");
        assert_eq!(template.parent().unwrap().class_name, "FHIRStringPrimitive");
        let values: Vec<_> = template
            .properties()
            .iter()
            .map(|p| match &p.kind {
                PropertyKind::Enumeration { value } => value.as_str(),
                other => panic!("unexpected property kind {other:?}"),
            })
            .collect();
        assert_eq!(values, ["male", "female"]);
    }

    #[test]
    fn schema_set_end_to_end() {
        let text = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns="http://hl7.org/fhir"
            targetNamespace="http://hl7.org/fhir">
  <xs:complexType name="Element">
    <xs:attribute name="id" type="xs:string"/>
  </xs:complexType>
  <xs:complexType name="Resource"/>
  <xs:complexType name="DomainResource">
    <xs:complexContent><xs:extension base="Resource"/></xs:complexContent>
  </xs:complexType>
  <xs:complexType name="boolean">
    <xs:complexContent>
      <xs:extension base="Element"><xs:attribute name="value" type="xs:boolean"/></xs:extension>
    </xs:complexContent>
  </xs:complexType>
  <xs:complexType name="Patient">
    <xs:complexContent>
      <xs:extension base="DomainResource">
        <xs:sequence>
          <xs:element name="active" type="boolean" minOccurs="0"/>
        </xs:sequence>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>
</xs:schema>"#;
        let sources = [SchemaSource::from_bytes("patient.xsd", text.as_bytes())];
        let documents = parse_all(&sources, false).unwrap();
        let map = XsdMap::build(&documents, &XsdMapOptions::default()).unwrap();
        let ctx = BuildContext::new(&map, &XsPrimitives, &PropertyGenerator);

        let patient = map
            .get(&QName::with_namespace(FHIR_NAMESPACE, "Patient"))
            .unwrap();
        let template = build_class_template(&ctx, &patient.definition).unwrap();
        assert_eq!(template.class_name(), "FHIRPatient");
        assert_eq!(template.namespace(), "fhir::resource::domain_resource");
        assert_eq!(
            template.parent().unwrap().use_statement.path(),
            "crate::fhir::resource::FHIRDomainResource"
        );
        let uses: Vec<_> = template.uses().map(UseStatement::path).collect();
        assert_eq!(
            uses,
            [
                "crate::fhir::element::FHIRBoolean",
                "crate::fhir::resource::FHIRDomainResource"
            ]
        );

        let templates: Result<Vec<_>, _> = map
            .entries()
            .iter()
            .map(|entry| build_class_template(&ctx, &entry.definition))
            .collect();
        assert_eq!(templates.unwrap().len(), 5);
    }
}
