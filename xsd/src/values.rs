use roxmltree::Node;

use crate::{error::XsdError, template::MaxOccurs, xstypes::QName};

/// Conversion of an attribute's normalized value into its actual value. `None` signals a literal
/// outside the lexical space.
pub trait ActualValue<'a>: Sized {
    fn convert(src: &'a str, parent: Node) -> Option<Self>;
}

impl<'a> ActualValue<'a> for &'a str {
    fn convert(src: &'a str, _parent: Node) -> Option<Self> {
        Some(src)
    }
}

impl ActualValue<'_> for String {
    fn convert(src: &'_ str, _parent: Node) -> Option<Self> {
        Some(src.to_string())
    }
}

impl ActualValue<'_> for QName {
    fn convert(src: &'_ str, parent: Node) -> Option<Self> {
        let src = src.trim();
        if src.is_empty() {
            None
        } else {
            Some(QName::parse(src, parent))
        }
    }
}

impl<'a, T: ActualValue<'a>> ActualValue<'a> for Vec<T> {
    fn convert(src: &'a str, parent: Node) -> Option<Self> {
        // NOTE: This assumes a list with whiteSpace="collapse"
        src.split_ascii_whitespace()
            .map(|a| ActualValue::convert(a, parent))
            .collect()
    }
}

impl ActualValue<'_> for u64 {
    fn convert(src: &str, _parent: Node) -> Option<Self> {
        src.trim().parse().ok()
    }
}

impl ActualValue<'_> for MaxOccurs {
    fn convert(src: &str, parent: Node) -> Option<Self> {
        if src.trim() == "unbounded" {
            Some(MaxOccurs::Unbounded)
        } else {
            u64::convert(src, parent).map(MaxOccurs::Count)
        }
    }
}

pub fn actual_value<'a, T: ActualValue<'a>>(x: &'a str, parent: Node) -> Option<T> {
    T::convert(x, parent)
}

/// Reads and converts an optional attribute of `node`.
pub fn attribute<'a, T: ActualValue<'a>>(
    node: Node<'a, '_>,
    name: &'static str,
) -> Result<Option<T>, XsdError> {
    match node.attribute(name) {
        None => Ok(None),
        Some(value) => actual_value(value, node)
            .map(Some)
            .ok_or_else(|| XsdError::InvalidAttribute {
                attribute: name,
                value: value.to_string(),
            }),
    }
}

/// Reads and converts an attribute `node` must carry.
pub fn required_attribute<'a, T: ActualValue<'a>>(
    node: Node<'a, '_>,
    name: &'static str,
) -> Result<T, XsdError> {
    attribute(node, name)?.ok_or_else(|| XsdError::MissingAttribute {
        element: node.tag_name().name().to_string(),
        attribute: name,
    })
}
