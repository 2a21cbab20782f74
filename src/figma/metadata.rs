//! Metadata stamping and document-level helpers applied before normalization.

use super::api_types::RawNode;
use crate::types::NodeType;

/// Stamp `file_key`, `node_id` and sibling indices on `node` and its whole subtree.
///
/// `node_id` is the node's own id; `fallback_id` is used for a root that has none.
pub fn inject_metadata(node: &mut RawNode, file_key: &str, fallback_id: Option<&str>) {
    let mut stack: Vec<&mut RawNode> = vec![node];
    let mut first = true;
    while let Some(current) = stack.pop() {
        current.file_key = Some(file_key.to_string());
        let own_id = if current.id.is_empty() {
            if first {
                fallback_id.map(str::to_string)
            } else {
                None
            }
        } else {
            Some(current.id.clone())
        };
        if own_id.is_some() {
            current.node_id = own_id;
        }
        first = false;

        for (index, child) in current.children.iter_mut().enumerate() {
            child.original_order = Some(index);
        }
        stack.extend(current.children.iter_mut());
    }
}

/// Inject metadata into a forest, recording each root's position among the roots.
pub fn inject_forest_metadata(roots: &mut [RawNode], file_key: &str) {
    for (index, root) in roots.iter_mut().enumerate() {
        inject_metadata(root, file_key, None);
        root.original_order = Some(index);
    }
}

/// The first CANVAS of a DOCUMENT, or the node itself when it is already a page.
pub fn first_page(document: &RawNode) -> Option<&RawNode> {
    match document.node_type {
        Some(NodeType::Document) => document
            .children
            .iter()
            .find(|child| child.node_type == Some(NodeType::Canvas))
            .or_else(|| document.children.first()),
        _ => Some(document),
    }
}

/// The page child with the most children; the first child on ties.
pub fn best_frame(page: &RawNode) -> Option<&RawNode> {
    let mut best: Option<&RawNode> = None;
    for child in &page.children {
        match best {
            Some(current) if current.children.len() >= child.children.len() => {}
            _ => best = Some(child),
        }
    }
    best
}

/// Map a node name to a filesystem-safe stem.
pub fn sanitize_filename(name: &str) -> String {
    let mapped: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = mapped.trim_matches(|c| c == '_' || c == '.');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> RawNode {
        RawNode::new("1:1", "Page", NodeType::Frame).with_children(vec![
            RawNode::new("1:2", "A", NodeType::Rectangle),
            RawNode::new("1:3", "B", NodeType::Group)
                .with_children(vec![RawNode::new("1:4", "C", NodeType::Text)]),
        ])
    }

    #[test]
    fn stamps_every_node_with_ids_and_sibling_order() {
        let mut root = tree();
        inject_metadata(&mut root, "FILE", None);

        assert_eq!(root.file_key.as_deref(), Some("FILE"));
        assert_eq!(root.node_id.as_deref(), Some("1:1"));
        assert_eq!(root.children[0].original_order, Some(0));
        assert_eq!(root.children[1].original_order, Some(1));
        let nested = &root.children[1].children[0];
        assert_eq!(nested.node_id.as_deref(), Some("1:4"));
        assert_eq!(nested.file_key.as_deref(), Some("FILE"));
        assert_eq!(nested.original_order, Some(0));
    }

    #[test]
    fn root_without_id_takes_the_requested_id() {
        let mut root = RawNode {
            node_type: Some(NodeType::Frame),
            ..RawNode::default()
        };
        inject_metadata(&mut root, "FILE", Some("5:6"));
        assert_eq!(root.node_id.as_deref(), Some("5:6"));
    }

    #[test]
    fn forest_roots_get_their_position() {
        let mut roots = vec![tree(), tree()];
        inject_forest_metadata(&mut roots, "FILE");
        assert_eq!(roots[0].original_order, Some(0));
        assert_eq!(roots[1].original_order, Some(1));
    }

    #[test]
    fn best_frame_prefers_most_children() {
        let page = RawNode::new("0:1", "Page", NodeType::Canvas).with_children(vec![
            RawNode::new("2:1", "Small", NodeType::Frame),
            tree(),
            RawNode::new("1:9", "Also small", NodeType::Frame),
        ]);
        assert_eq!(best_frame(&page).map(|n| n.id.as_str()), Some("1:1"));

        let document = RawNode::new("0:0", "Doc", NodeType::Document).with_children(vec![page]);
        assert_eq!(first_page(&document).map(|n| n.id.as_str()), Some("0:1"));
    }

    #[test]
    fn best_frame_falls_back_to_first_child() {
        let page = RawNode::new("0:1", "Page", NodeType::Canvas).with_children(vec![
            RawNode::new("1:1", "One", NodeType::Frame),
            RawNode::new("1:2", "Two", NodeType::Frame),
        ]);
        assert_eq!(best_frame(&page).map(|n| n.id.as_str()), Some("1:1"));
        assert!(best_frame(&RawNode::new("0:2", "Empty", NodeType::Canvas)).is_none());
    }

    #[test]
    fn sanitize_filename_replaces_unsafe_characters() {
        assert_eq!(sanitize_filename("Landing Page / v2"), "Landing_Page___v2");
        assert_eq!(sanitize_filename("  "), "untitled");
        assert_eq!(sanitize_filename("hero.section"), "hero.section");
    }
}
