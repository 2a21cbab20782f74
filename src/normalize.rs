//! JSON node converter.
//!
//! Turns a metadata-injected forest of [`RawNode`]s into a [`NodeArena`]:
//! parent-relative geometry, defaulted layout fields, disambiguated names,
//! GROUP retyping with rotation folding, and inlining of unnamed frames.

use log::{debug, warn};
use serde::Serialize;
use std::collections::HashMap;

use crate::config::ConversionSettings;
use crate::figma::RawNode;
use crate::icon;
use crate::types::{
    sort_siblings, AutoLayout, ChildLayout, GridLayout, Node, NodeArena, NodeBase, NodeId,
    NodeKind, NodeType, Padding, PaintKind, Rect, SiblingKey, TextContent, TextRun, TextStyle,
    Transform, TypeStyle,
};

/// Substituted for TEXT nodes without characters.
pub const TEXT_FALLBACK: &str = "Text";
pub const DEFAULT_FONT_FAMILY: &str = "Inter";
pub const DEFAULT_FONT_SIZE: f64 = 14.0;
pub const DEFAULT_FONT_WEIGHT: f64 = 400.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeStats {
    pub nodes_processed: usize,
    pub nodes_skipped: usize,
    pub groups_inlined: usize,
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub arena: NodeArena,
    pub stats: NormalizeStats,
}

/// Normalize a raw forest with a fresh converter.
pub fn normalize(roots: &[RawNode], settings: &ConversionSettings) -> Normalized {
    JsonNodeConverter::new(settings).convert(roots)
}

enum Outcome {
    Skipped,
    Node(NodeId),
    Inlined(Vec<NodeId>),
}

struct Entry {
    key: SiblingKey,
    ids: Vec<NodeId>,
}

/// Single-use converter holding the per-run name counters and stats.
pub struct JsonNodeConverter<'a> {
    settings: &'a ConversionSettings,
    name_counters: HashMap<String, usize>,
    stats: NormalizeStats,
    arena: NodeArena,
}

impl<'a> JsonNodeConverter<'a> {
    pub fn new(settings: &'a ConversionSettings) -> Self {
        Self {
            settings,
            name_counters: HashMap::new(),
            stats: NormalizeStats::default(),
            arena: NodeArena::new(),
        }
    }

    pub fn convert(mut self, roots: &[RawNode]) -> Normalized {
        let mut entries = Vec::with_capacity(roots.len());
        for raw in roots {
            let outcome = self.process(raw, None, 0.0, 0);
            if let Some(entry) = entry_for(raw, outcome) {
                entries.push(entry);
            }
        }
        let ids = self.order_entries(entries, "<roots>");
        self.arena.set_roots(ids);

        debug!(
            "normalized {} nodes ({} skipped, {} frames inlined)",
            self.stats.nodes_processed, self.stats.nodes_skipped, self.stats.groups_inlined
        );
        Normalized {
            arena: self.arena,
            stats: self.stats,
        }
    }

    fn process(
        &mut self,
        raw: &RawNode,
        parent: Option<&RawNode>,
        inherited_rotation: f64,
        depth: usize,
    ) -> Outcome {
        if !raw.visible {
            self.stats.nodes_skipped += 1;
            return Outcome::Skipped;
        }
        let Some(source_type) = raw.node_type.clone() else {
            self.stats.nodes_skipped += 1;
            return Outcome::Skipped;
        };
        if depth >= self.settings.max_depth {
            warn!(
                "node '{}' ({}) is nested deeper than {} levels; skipping its subtree",
                raw.name, raw.id, self.settings.max_depth
            );
            self.stats.nodes_skipped += 1;
            return Outcome::Skipped;
        }

        let own_rotation = raw.rotation.unwrap_or(0.0);
        let (node_type, node_rotation, child_rotation) = if source_type == NodeType::Group {
            // Folded into the descendants' transforms.
            (
                NodeType::Frame,
                0.0,
                inherited_rotation + own_rotation.to_degrees(),
            )
        } else {
            (source_type, own_rotation, inherited_rotation)
        };

        if node_type == NodeType::Frame && raw.name.trim().is_empty() && !raw.children.is_empty()
        {
            return self.inline_frame(raw, parent, child_rotation, depth);
        }

        let base = self.build_base(raw, parent, &node_type, node_rotation, inherited_rotation);
        let kind = build_kind(&node_type, raw);
        let id = self.arena.alloc(Node::new(base, kind));
        let children = self.process_children(raw, child_rotation, depth);
        self.arena.set_children(id, children);
        self.stats.nodes_processed += 1;
        Outcome::Node(id)
    }

    /// Replace an unnamed frame by its processed children.
    fn inline_frame(
        &mut self,
        frame: &RawNode,
        parent: Option<&RawNode>,
        rotation: f64,
        depth: usize,
    ) -> Outcome {
        let children = self.process_children(frame, rotation, depth);
        let origin = parent.map(|p| p.absolute_bounding_box.unwrap_or_default());
        for &child in &children {
            self.arena.mark_inlined(child, frame.id.clone());
            let base = &mut self.arena[child].base;
            if let Some(bbox) = base.absolute_bounding_box {
                let origin = origin.unwrap_or_default();
                base.x = bbox.x - origin.x;
                base.y = bbox.y - origin.y;
            }
        }
        debug!(
            "inlined unnamed frame {} ({} children)",
            frame.id,
            children.len()
        );
        self.stats.groups_inlined += 1;
        Outcome::Inlined(children)
    }

    fn process_children(&mut self, raw: &RawNode, rotation: f64, depth: usize) -> Vec<NodeId> {
        let mut entries = Vec::with_capacity(raw.children.len());
        for child in &raw.children {
            let outcome = self.process(child, Some(raw), rotation, depth + 1);
            if let Some(entry) = entry_for(child, outcome) {
                entries.push(entry);
            }
        }
        self.order_entries(entries, &raw.name)
    }

    /// Sort sibling entries, splice inlined groups, and renumber the final order.
    fn order_entries(&mut self, mut entries: Vec<Entry>, owner: &str) -> Vec<NodeId> {
        if !sort_siblings(&mut entries, |entry| entry.key) {
            debug!("children of '{owner}' have incomparable sort keys; keeping document order");
        }
        let ids: Vec<NodeId> = entries.into_iter().flat_map(|entry| entry.ids).collect();
        for (index, id) in ids.iter().enumerate() {
            self.arena[*id].base.original_order = Some(index);
        }
        ids
    }

    fn unique_name(&mut self, raw: &RawNode, node_type: &NodeType) -> String {
        let base = if raw.name.is_empty() {
            node_type.as_str().to_lowercase()
        } else {
            raw.name.clone()
        };
        let count = self.name_counters.entry(base.clone()).or_insert(0);
        let unique = if *count == 0 {
            base
        } else {
            format!("{base}_{count}")
        };
        *count += 1;
        unique
    }

    fn build_base(
        &mut self,
        raw: &RawNode,
        parent: Option<&RawNode>,
        node_type: &NodeType,
        rotation: f64,
        inherited_rotation: f64,
    ) -> NodeBase {
        let mut base = NodeBase::new(raw.id.clone(), raw.name.clone());
        base.unique_name = self.unique_name(raw, node_type);
        base.visible = raw.visible;
        base.opacity = raw.opacity;

        let bbox = raw.absolute_bounding_box.unwrap_or_else(|| {
            warn!(
                "node '{}' ({}) has no absoluteBoundingBox; using an empty box",
                raw.name, raw.id
            );
            Rect::default()
        });
        let origin = parent
            .and_then(|p| p.absolute_bounding_box)
            .unwrap_or_default();
        base.width = bbox.width.max(0.0);
        base.height = bbox.height.max(0.0);
        base.x = bbox.x - origin.x;
        base.y = bbox.y - origin.y;
        base.absolute_bounding_box = raw.absolute_bounding_box;

        // The unrotated box is kept; rotation only becomes a CSS transform.
        base.rotation = rotation;
        let degrees = rotation.to_degrees() + inherited_rotation;
        if degrees != 0.0 {
            base.transform = Some(Transform { rotate: degrees });
        }

        base.fills = raw.fills.clone();
        base.strokes = raw.strokes.clone();
        base.stroke_weight = raw.stroke_weight.unwrap_or(0.0);
        base.effects = raw.effects.clone();
        base.corner_radius = raw.corner_radius.unwrap_or(0.0);
        base.corner_radii = raw.rectangle_corner_radii.unwrap_or([
            raw.top_left_radius.unwrap_or(0.0),
            raw.top_right_radius.unwrap_or(0.0),
            raw.bottom_right_radius.unwrap_or(0.0),
            raw.bottom_left_radius.unwrap_or(0.0),
        ]);
        base.z_index = raw.z_index.unwrap_or(0.0);
        base.layout_positioning = raw.layout_positioning.unwrap_or_default();
        base.child_layout = child_layout(raw);

        base.original_order = raw.original_order;
        base.file_key = raw.file_key.clone();
        base.node_id = raw.node_id.clone();
        base.can_be_flattened = raw.can_be_flattened.unwrap_or(false) || icon::can_be_flattened(raw);
        base.svg = raw.svg.clone();
        base.export_settings = raw.export_settings.clone();
        base.color_variable_mappings = raw.color_variable_mappings.clone();
        base
    }
}

fn entry_for(raw: &RawNode, outcome: Outcome) -> Option<Entry> {
    let ids = match outcome {
        Outcome::Skipped => return None,
        Outcome::Node(id) => vec![id],
        Outcome::Inlined(ids) if ids.is_empty() => return None,
        Outcome::Inlined(ids) => ids,
    };
    Some(Entry {
        key: SiblingKey {
            original_order: raw.original_order,
            z_index: raw.z_index.unwrap_or(0.0),
            y: raw.absolute_bounding_box.map(|bbox| bbox.y).unwrap_or(0.0),
        },
        ids,
    })
}

fn child_layout(raw: &RawNode) -> ChildLayout {
    let defaults = ChildLayout::default();
    ChildLayout {
        align: raw.layout_align.unwrap_or(defaults.align),
        grow: raw.layout_grow.unwrap_or(defaults.grow),
        sizing_horizontal: raw.layout_sizing_horizontal.unwrap_or(defaults.sizing_horizontal),
        sizing_vertical: raw.layout_sizing_vertical.unwrap_or(defaults.sizing_vertical),
        grid_horizontal_align: raw
            .grid_child_horizontal_align
            .unwrap_or(defaults.grid_horizontal_align),
        grid_vertical_align: raw
            .grid_child_vertical_align
            .unwrap_or(defaults.grid_vertical_align),
        grid_row_span: raw.grid_row_span.unwrap_or(defaults.grid_row_span),
        grid_column_span: raw.grid_column_span.unwrap_or(defaults.grid_column_span),
        grid_row_anchor: raw.grid_row_anchor_index.unwrap_or(defaults.grid_row_anchor),
        grid_column_anchor: raw
            .grid_column_anchor_index
            .unwrap_or(defaults.grid_column_anchor),
    }
}

fn auto_layout(raw: &RawNode) -> AutoLayout {
    let grid_defaults = GridLayout::default();
    AutoLayout {
        mode: raw.layout_mode.unwrap_or_default(),
        item_spacing: raw.item_spacing.unwrap_or(0.0),
        counter_axis_spacing: raw.counter_axis_spacing.unwrap_or(0.0),
        padding: Padding {
            top: raw.padding_top.unwrap_or(0.0),
            right: raw.padding_right.unwrap_or(0.0),
            bottom: raw.padding_bottom.unwrap_or(0.0),
            left: raw.padding_left.unwrap_or(0.0),
        },
        primary_axis_align: raw.primary_axis_align_items.unwrap_or_default(),
        counter_axis_align: raw.counter_axis_align_items.unwrap_or_default(),
        primary_axis_sizing: raw.primary_axis_sizing_mode.unwrap_or_default(),
        counter_axis_sizing: raw.counter_axis_sizing_mode.unwrap_or_default(),
        wrap: raw.layout_wrap.unwrap_or_default(),
        counter_axis_align_content: raw.counter_axis_align_content.unwrap_or_default(),
        grid: GridLayout {
            row_count: raw.grid_row_count.unwrap_or(grid_defaults.row_count),
            column_count: raw.grid_column_count.unwrap_or(grid_defaults.column_count),
            row_gap: raw.grid_row_gap.unwrap_or(grid_defaults.row_gap),
            column_gap: raw.grid_column_gap.unwrap_or(grid_defaults.column_gap),
            columns_sizing: raw.grid_columns_sizing.clone().filter(|s| !s.is_empty()),
            rows_sizing: raw.grid_rows_sizing.clone().filter(|s| !s.is_empty()),
        },
    }
}

fn build_kind(node_type: &NodeType, raw: &RawNode) -> NodeKind {
    match node_type {
        NodeType::Frame => NodeKind::Frame(auto_layout(raw)),
        NodeType::Group => NodeKind::Group(auto_layout(raw)),
        NodeType::Component => NodeKind::Component(auto_layout(raw)),
        NodeType::Instance => NodeKind::Instance(auto_layout(raw)),
        NodeType::ComponentSet => NodeKind::ComponentSet(auto_layout(raw)),
        NodeType::Section => NodeKind::Section(auto_layout(raw)),
        NodeType::Text => NodeKind::Text(text_content(raw)),
        NodeType::Rectangle => NodeKind::Rectangle,
        NodeType::Ellipse => NodeKind::Ellipse,
        NodeType::RegularPolygon => NodeKind::RegularPolygon,
        NodeType::Vector => NodeKind::Vector,
        NodeType::Line => NodeKind::Line,
        NodeType::BooleanOperation => NodeKind::BooleanOperation,
        NodeType::Star => NodeKind::Star,
        other @ (NodeType::Document | NodeType::Canvas | NodeType::Other(_)) => {
            NodeKind::Other(other.as_str().to_string())
        }
    }
}

fn text_content(raw: &RawNode) -> TextContent {
    let characters = raw
        .characters
        .clone()
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| TEXT_FALLBACK.to_string());

    let source = raw.style.clone().unwrap_or_default();
    let style = TextStyle {
        font_family: source
            .font_family
            .clone()
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string()),
        font_size: source.font_size.unwrap_or(DEFAULT_FONT_SIZE),
        font_weight: source.font_weight.unwrap_or(DEFAULT_FONT_WEIGHT),
        source,
    };

    let color = raw
        .fills
        .first()
        .filter(|fill| fill.kind == PaintKind::Solid)
        .and_then(|fill| fill.color)
        .map(|color| color.css_rgb());

    let runs = text_runs(
        &characters,
        &raw.character_style_overrides,
        &raw.style_override_table,
    );

    TextContent {
        characters,
        style,
        color,
        runs,
    }
}

/// Split `characters` into runs of equal style override.
///
/// Override indices count UTF-16 code units.
fn text_runs(
    characters: &str,
    overrides: &[u32],
    table: &HashMap<String, TypeStyle>,
) -> Vec<TextRun> {
    let mut runs: Vec<(Option<u32>, String)> = Vec::new();
    let mut unit = 0usize;
    for ch in characters.chars() {
        let override_id = overrides
            .get(unit)
            .copied()
            .filter(|id| *id != 0 && table.contains_key(&id.to_string()));
        unit += ch.len_utf16();
        match runs.last_mut() {
            Some((id, text)) if *id == override_id => text.push(ch),
            _ => runs.push((override_id, ch.to_string())),
        }
    }

    runs.into_iter()
        .map(|(id, text)| TextRun {
            text,
            style: id.and_then(|id| table.get(&id.to_string()).cloned()),
        })
        .collect()
}
