use heck::ToShoutySnakeCase;
use roxmltree::Node;

use crate::{
    annotation::documentation_of,
    construct::{xs_children, ConstructKind},
    context::BuildContext,
    error::XsdError,
    template::{MaxOccurs, Occurrence, PropertyDescriptor, PropertyKind, TypeRef, TypeTemplate},
    values::{attribute, required_attribute},
    xstypes::QName,
};

/// Turns one attribute, sequence, choice, union or enumeration node into property descriptors.
pub trait PropertyParser: Sync {
    fn implement_property(
        &self,
        ctx: &BuildContext,
        node: Node,
        template: &mut TypeTemplate,
    ) -> Result<(), XsdError>;
}

#[derive(Copy, Clone, Debug, Default)]
pub struct PropertyGenerator;

impl PropertyParser for PropertyGenerator {
    fn implement_property(
        &self,
        ctx: &BuildContext,
        node: Node,
        template: &mut TypeTemplate,
    ) -> Result<(), XsdError> {
        match ConstructKind::of(node) {
            Some(ConstructKind::Attribute) => implement_attribute(ctx, node, template),
            Some(ConstructKind::Sequence) => {
                implement_group(ctx, node, Occurrence::REQUIRED, false, template)
            }
            Some(ConstructKind::Choice) => {
                implement_group(ctx, node, Occurrence::REQUIRED, true, template)
            }
            Some(ConstructKind::Union) => implement_union(ctx, node, template),
            Some(ConstructKind::Enumeration) => implement_enumeration(node, template),
            _ => {
                tracing::debug!(
                    class = template.class_name(),
                    tag = node.tag_name().name(),
                    "not a property construct"
                );
                Ok(())
            }
        }
    }
}

fn resolve(
    ctx: &BuildContext,
    template: &TypeTemplate,
    property: &str,
    reference: &QName,
) -> Result<TypeRef, XsdError> {
    ctx.resolve_type(reference)
        .map_err(|source| XsdError::UnresolvedProperty {
            owner: template.class_name().to_string(),
            property: property.to_string(),
            reference: reference.clone(),
            source: Box::new(source),
        })
}

fn push_typed(
    template: &mut TypeTemplate,
    name: String,
    kind: PropertyKind,
    value_type: TypeRef,
    occurrence: Occurrence,
    documentation: Option<String>,
) {
    template.add_use(value_type.use_statement.clone());
    template.add_property(PropertyDescriptor {
        xml_name: name.clone(),
        name,
        kind,
        value_type: Some(value_type),
        occurrence,
        documentation,
    });
}

/// Name of an attribute or element declaration: its `name`, else the local part of its `ref`.
fn declared_name(node: Node) -> Result<Option<(String, Option<QName>)>, XsdError> {
    let reference: Option<QName> = attribute(node, "ref")?;
    let name = match attribute::<String>(node, "name")? {
        Some(name) => name,
        None => match reference.as_ref() {
            Some(reference) => reference.local_name.clone(),
            None => return Ok(None),
        },
    };
    Ok(Some((name, reference)))
}

fn implement_attribute(
    ctx: &BuildContext,
    node: Node,
    template: &mut TypeTemplate,
) -> Result<(), XsdError> {
    let Some((name, _)) = declared_name(node)? else {
        tracing::debug!(class = template.class_name(), "skipping anonymous attribute");
        return Ok(());
    };
    let occurrence = match attribute::<&str>(node, "use")? {
        Some("prohibited") => return Ok(()),
        Some("required") => Occurrence::REQUIRED,
        _ => Occurrence::OPTIONAL,
    };
    let type_name = attribute::<QName>(node, "type")?.unwrap_or_else(|| QName::builtin("string"));
    let value_type = resolve(ctx, template, &name, &type_name)?;
    push_typed(
        template,
        name,
        PropertyKind::Attribute,
        value_type,
        occurrence,
        documentation_of(node),
    );
    Ok(())
}

fn combine(outer: Occurrence, inner: Occurrence) -> Occurrence {
    let max_occurs = match (outer.max_occurs, inner.max_occurs) {
        (MaxOccurs::Count(0), _) | (_, MaxOccurs::Count(0)) => MaxOccurs::Count(0),
        (MaxOccurs::Unbounded, _) | (_, MaxOccurs::Unbounded) => MaxOccurs::Unbounded,
        (MaxOccurs::Count(a), MaxOccurs::Count(b)) => MaxOccurs::Count(a.saturating_mul(b)),
    };
    Occurrence {
        min_occurs: outer.min_occurs.saturating_mul(inner.min_occurs),
        max_occurs,
    }
}

fn occurrence_of(node: Node) -> Result<Occurrence, XsdError> {
    Ok(Occurrence {
        min_occurs: attribute::<u64>(node, "minOccurs")?.unwrap_or(1),
        max_occurs: attribute::<MaxOccurs>(node, "maxOccurs")?.unwrap_or(MaxOccurs::Count(1)),
    })
}

/// Walks a `sequence` or `choice`. Elements inside a choice are never required; the group's own
/// occurrence applies to everything it contains.
fn implement_group(
    ctx: &BuildContext,
    node: Node,
    outer: Occurrence,
    in_choice: bool,
    template: &mut TypeTemplate,
) -> Result<(), XsdError> {
    let mut occurrence = combine(outer, occurrence_of(node)?);
    if in_choice {
        occurrence.min_occurs = 0;
    }

    for child in xs_children(node) {
        match child.tag_name().name() {
            "element" => implement_element(ctx, child, occurrence, template)?,
            "sequence" => implement_group(ctx, child, occurrence, in_choice, template)?,
            "choice" => implement_group(ctx, child, occurrence, true, template)?,
            "attribute" => implement_attribute(ctx, child, template)?,
            "annotation" => {}
            tag => tracing::debug!(
                class = template.class_name(),
                tag,
                "skipping unsupported group member"
            ),
        }
    }
    Ok(())
}

fn implement_element(
    ctx: &BuildContext,
    node: Node,
    group: Occurrence,
    template: &mut TypeTemplate,
) -> Result<(), XsdError> {
    let occurrence = combine(group, occurrence_of(node)?);
    if occurrence.max_occurs == MaxOccurs::Count(0) {
        return Ok(());
    }
    let Some((name, reference)) = declared_name(node)? else {
        tracing::debug!(class = template.class_name(), "skipping anonymous element");
        return Ok(());
    };

    let (name, type_name) = match reference {
        Some(reference) if reference.is_xhtml_div() => ("div".to_string(), QName::builtin("string")),
        reference => {
            let type_name = match attribute::<QName>(node, "type")?.or(reference) {
                Some(type_name) => type_name,
                None => QName::builtin("anyType"),
            };
            (name, type_name)
        }
    };
    let value_type = resolve(ctx, template, &name, &type_name)?;
    push_typed(
        template,
        name,
        PropertyKind::Element,
        value_type,
        occurrence,
        documentation_of(node),
    );
    Ok(())
}

fn implement_union(
    ctx: &BuildContext,
    node: Node,
    template: &mut TypeTemplate,
) -> Result<(), XsdError> {
    let member_types = attribute::<Vec<QName>>(node, "memberTypes")?.unwrap_or_default();
    if member_types.is_empty() {
        tracing::debug!(class = template.class_name(), "union without member types");
        return Ok(());
    }

    let mut members = Vec::with_capacity(member_types.len());
    for member in &member_types {
        let member = resolve(ctx, template, "value", member)?;
        template.add_use(member.use_statement.clone());
        members.push(member);
    }
    template.add_property(PropertyDescriptor {
        name: "value".to_string(),
        xml_name: "value".to_string(),
        kind: PropertyKind::Union { members },
        value_type: None,
        occurrence: Occurrence::OPTIONAL,
        documentation: documentation_of(node),
    });
    Ok(())
}

fn implement_enumeration(node: Node, template: &mut TypeTemplate) -> Result<(), XsdError> {
    let value: String = required_attribute(node, "value")?;
    template.add_property(PropertyDescriptor {
        name: value.to_shouty_snake_case(),
        xml_name: value.clone(),
        kind: PropertyKind::Enumeration { value },
        value_type: None,
        occurrence: Occurrence::REQUIRED,
        documentation: documentation_of(node),
    });
    Ok(())
}
