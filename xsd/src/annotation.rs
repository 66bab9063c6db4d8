use roxmltree::{Node, NodeType};

use crate::construct::{xs_children, ConstructKind};

/// Plain text of an element's content, descending into nested markup.
fn content_to_text(node: Node, text: &mut String) {
    for child in node.children() {
        match child.node_type() {
            NodeType::Text => text.push_str(child.text().unwrap_or_default()),
            NodeType::Element => content_to_text(child, text),
            _ => {}
        }
    }
}

/// Extracts the user information of an `annotation`: the text of each `documentation` child,
/// with every line trimmed and blank lines dropped. Returns `None` if nothing remains.
pub fn documentation(annotation: Node) -> Option<String> {
    let mut lines = Vec::new();
    for documentation in
        xs_children(annotation).filter(|c| c.tag_name().name() == "documentation")
    {
        let mut text = String::new();
        content_to_text(documentation, &mut text);
        lines.extend(
            text.lines()
                .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
                .filter(|line| !line.is_empty()),
        );
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Documentation of the first `annotation` child of `node`, if any.
pub fn documentation_of(node: Node) -> Option<String> {
    xs_children(node)
        .find(|c| ConstructKind::of(*c) == Some(ConstructKind::Annotation))
        .and_then(documentation)
}
