use roxmltree::Node;

use crate::constants::XS_NAMESPACE;

/// Schema constructs relevant to class generation. Everything else in a type definition is
/// skipped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstructKind {
    Attribute,
    Choice,
    Sequence,
    Union,
    Annotation,
    ComplexContent,
    SimpleContent,
    Restriction,
    Extension,
    Enumeration,
}

impl ConstructKind {
    /// Classifies a tag name, ignoring case.
    pub fn from_tag_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "attribute" => Some(Self::Attribute),
            "choice" => Some(Self::Choice),
            "sequence" => Some(Self::Sequence),
            "union" => Some(Self::Union),
            "annotation" => Some(Self::Annotation),
            "complexcontent" => Some(Self::ComplexContent),
            "simplecontent" => Some(Self::SimpleContent),
            "restriction" => Some(Self::Restriction),
            "extension" => Some(Self::Extension),
            "enumeration" => Some(Self::Enumeration),
            _ => None,
        }
    }

    pub fn of(node: Node) -> Option<Self> {
        if node.is_element() {
            Self::from_tag_name(node.tag_name().name())
        } else {
            None
        }
    }
}

/// Element children of `node` in the XSD namespace, in document order.
pub fn xs_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(|child| child.is_element() && child.tag_name().namespace() == Some(XS_NAMESPACE))
}
