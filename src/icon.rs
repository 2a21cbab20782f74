//! Heuristic classification of icon-like subtrees.

use crate::figma::RawNode;
use crate::types::NodeType;

/// Icons are at most this many pixels on either side.
pub const MAX_ICON_SIZE: f64 = 64.0;

fn is_disallowed(node_type: &NodeType) -> bool {
    matches!(
        node_type,
        NodeType::Text
            | NodeType::Frame
            | NodeType::Component
            | NodeType::Instance
            | NodeType::ComponentSet
    )
}

fn is_primitive(node_type: &NodeType) -> bool {
    matches!(
        node_type,
        NodeType::Rectangle
            | NodeType::Ellipse
            | NodeType::RegularPolygon
            | NodeType::Star
            | NodeType::Line
    )
}

fn is_vector_like(node_type: &NodeType) -> bool {
    matches!(node_type, NodeType::Vector | NodeType::BooleanOperation)
}

fn has_svg_export(node: &RawNode) -> bool {
    node.export_settings
        .iter()
        .any(|setting| setting.format.eq_ignore_ascii_case("svg"))
}

/// Whether `node` looks like an icon that should be exported as one SVG.
pub fn is_likely_icon(node: &RawNode) -> bool {
    let Some(node_type) = node.node_type.as_ref() else {
        return false;
    };
    if is_disallowed(node_type) {
        return false;
    }
    if has_svg_export(node) {
        return true;
    }

    let (width, height) = node.size();
    if !(width > 0.0 && height > 0.0) {
        return false;
    }
    if is_vector_like(node_type) {
        return true;
    }
    if width > MAX_ICON_SIZE || height > MAX_ICON_SIZE {
        return false;
    }

    match node_type {
        NodeType::Group => group_has_icon_content(node),
        other => is_primitive(other),
    }
}

/// Every visible child must be icon-compatible and at least one must be a shape.
fn group_has_icon_content(group: &RawNode) -> bool {
    let mut has_content = false;
    for child in group.children.iter().filter(|child| child.visible) {
        let Some(child_type) = child.node_type.as_ref() else {
            continue;
        };
        if is_disallowed(child_type) {
            return false;
        }
        match child_type {
            NodeType::Group => {
                if !group_has_icon_content(child) {
                    return false;
                }
                has_content = true;
            }
            t if is_vector_like(t) || is_primitive(t) => has_content = true,
            _ => return false,
        }
    }
    has_content
}

/// Types rendered natively by the HTML generator rather than flattened.
fn renders_natively(node_type: &NodeType) -> bool {
    matches!(
        node_type,
        NodeType::Rectangle | NodeType::Ellipse | NodeType::Line | NodeType::Text
    )
}

/// Flattening eligibility assigned during normalization.
pub fn can_be_flattened(node: &RawNode) -> bool {
    match node.node_type.as_ref() {
        Some(
            NodeType::Vector | NodeType::Star | NodeType::RegularPolygon | NodeType::BooleanOperation,
        ) => true,
        Some(t) if renders_natively(t) => false,
        Some(_) => is_likely_icon(node),
        None => false,
    }
}
