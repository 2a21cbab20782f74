//! Normalized node model: a shared base record plus one variant per node type.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::layout::{AutoLayout, ChildLayout, LayoutMode, LayoutPositioning};
use super::paint::{
    Color, ColorVariableMapping, Effect, ExportSetting, Paint, PaintKind, Rect, TypeStyle,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    Document,
    Canvas,
    Frame,
    Group,
    Component,
    Instance,
    ComponentSet,
    Section,
    Text,
    Rectangle,
    Ellipse,
    RegularPolygon,
    Vector,
    Line,
    BooleanOperation,
    Star,
    Other(String),
}

impl NodeType {
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Document => "DOCUMENT",
            NodeType::Canvas => "CANVAS",
            NodeType::Frame => "FRAME",
            NodeType::Group => "GROUP",
            NodeType::Component => "COMPONENT",
            NodeType::Instance => "INSTANCE",
            NodeType::ComponentSet => "COMPONENT_SET",
            NodeType::Section => "SECTION",
            NodeType::Text => "TEXT",
            NodeType::Rectangle => "RECTANGLE",
            NodeType::Ellipse => "ELLIPSE",
            NodeType::RegularPolygon => "REGULAR_POLYGON",
            NodeType::Vector => "VECTOR",
            NodeType::Line => "LINE",
            NodeType::BooleanOperation => "BOOLEAN_OPERATION",
            NodeType::Star => "STAR",
            NodeType::Other(other) => other,
        }
    }

    /// Node types that carry auto-layout container fields.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeType::Frame
                | NodeType::Group
                | NodeType::Component
                | NodeType::Instance
                | NodeType::ComponentSet
                | NodeType::Section
        )
    }
}

impl From<String> for NodeType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "DOCUMENT" => NodeType::Document,
            "CANVAS" => NodeType::Canvas,
            "FRAME" => NodeType::Frame,
            "GROUP" => NodeType::Group,
            "COMPONENT" => NodeType::Component,
            "INSTANCE" => NodeType::Instance,
            "COMPONENT_SET" => NodeType::ComponentSet,
            "SECTION" => NodeType::Section,
            "TEXT" => NodeType::Text,
            "RECTANGLE" => NodeType::Rectangle,
            "ELLIPSE" => NodeType::Ellipse,
            "REGULAR_POLYGON" => NodeType::RegularPolygon,
            "VECTOR" => NodeType::Vector,
            "LINE" => NodeType::Line,
            "BOOLEAN_OPERATION" => NodeType::BooleanOperation,
            "STAR" => NodeType::Star,
            _ => NodeType::Other(value),
        }
    }
}

impl From<NodeType> for String {
    fn from(node_type: NodeType) -> Self {
        node_type.as_str().to_string()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CSS rotation attached during normalization, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub rotate: f64,
}

/// Resolved typography for a TEXT node.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: f64,
    pub source: TypeStyle,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Inter".to_string(),
            font_size: 14.0,
            font_weight: 400.0,
            source: TypeStyle::default(),
        }
    }
}

/// A maximal run of characters sharing one style override.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub style: Option<TypeStyle>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextContent {
    pub characters: String,
    pub style: TextStyle,
    /// Inline color taken from the first SOLID fill, as `rgb(r, g, b)`.
    pub color: Option<String>,
    pub runs: Vec<TextRun>,
}

impl TextContent {
    pub fn new(characters: impl Into<String>) -> Self {
        let characters = characters.into();
        Self {
            runs: vec![TextRun {
                text: characters.clone(),
                style: None,
            }],
            characters,
            style: TextStyle::default(),
            color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Frame(AutoLayout),
    Group(AutoLayout),
    Component(AutoLayout),
    Instance(AutoLayout),
    ComponentSet(AutoLayout),
    Section(AutoLayout),
    Text(TextContent),
    Rectangle,
    Ellipse,
    RegularPolygon,
    Vector,
    Line,
    BooleanOperation,
    Star,
    Other(String),
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Frame(_) => NodeType::Frame,
            NodeKind::Group(_) => NodeType::Group,
            NodeKind::Component(_) => NodeType::Component,
            NodeKind::Instance(_) => NodeType::Instance,
            NodeKind::ComponentSet(_) => NodeType::ComponentSet,
            NodeKind::Section(_) => NodeType::Section,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Rectangle => NodeType::Rectangle,
            NodeKind::Ellipse => NodeType::Ellipse,
            NodeKind::RegularPolygon => NodeType::RegularPolygon,
            NodeKind::Vector => NodeType::Vector,
            NodeKind::Line => NodeType::Line,
            NodeKind::BooleanOperation => NodeType::BooleanOperation,
            NodeKind::Star => NodeType::Star,
            NodeKind::Other(name) => NodeType::Other(name.clone()),
        }
    }

    pub fn layout(&self) -> Option<&AutoLayout> {
        match self {
            NodeKind::Frame(layout)
            | NodeKind::Group(layout)
            | NodeKind::Component(layout)
            | NodeKind::Instance(layout)
            | NodeKind::ComponentSet(layout)
            | NodeKind::Section(layout) => Some(layout),
            _ => None,
        }
    }

    pub fn layout_mut(&mut self) -> Option<&mut AutoLayout> {
        match self {
            NodeKind::Frame(layout)
            | NodeKind::Group(layout)
            | NodeKind::Component(layout)
            | NodeKind::Instance(layout)
            | NodeKind::ComponentSet(layout)
            | NodeKind::Section(layout) => Some(layout),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&TextContent> {
        match self {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Fields every node carries regardless of its type.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeBase {
    pub id: String,
    pub name: String,
    pub unique_name: String,
    pub visible: bool,
    pub opacity: f64,
    /// Parent-relative position.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub absolute_bounding_box: Option<Rect>,
    pub fills: Vec<Paint>,
    pub strokes: Vec<Paint>,
    pub stroke_weight: f64,
    pub effects: Vec<Effect>,
    pub corner_radius: f64,
    /// Top-left, top-right, bottom-right, bottom-left.
    pub corner_radii: [f64; 4],
    /// Rotation in radians as read from the document (zeroed on folded groups).
    pub rotation: f64,
    pub transform: Option<Transform>,
    pub z_index: f64,
    pub layout_positioning: LayoutPositioning,
    pub child_layout: ChildLayout,
    pub original_order: Option<usize>,
    pub file_key: Option<String>,
    pub node_id: Option<String>,
    pub can_be_flattened: bool,
    pub svg: Option<String>,
    pub export_settings: Vec<ExportSetting>,
    pub color_variable_mappings: HashMap<String, ColorVariableMapping>,
}

impl NodeBase {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            unique_name: name.clone(),
            name,
            visible: true,
            opacity: 1.0,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            absolute_bounding_box: None,
            fills: Vec::new(),
            strokes: Vec::new(),
            stroke_weight: 0.0,
            effects: Vec::new(),
            corner_radius: 0.0,
            corner_radii: [0.0; 4],
            rotation: 0.0,
            transform: None,
            z_index: 0.0,
            layout_positioning: LayoutPositioning::Auto,
            child_layout: ChildLayout::default(),
            original_order: None,
            file_key: None,
            node_id: None,
            can_be_flattened: false,
            svg: None,
            export_settings: Vec::new(),
            color_variable_mappings: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub base: NodeBase,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(base: NodeBase, kind: NodeKind) -> Self {
        Self { base, kind }
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.kind
            .layout()
            .map(|layout| layout.mode)
            .unwrap_or(LayoutMode::None)
    }

    pub fn is_auto_layout(&self) -> bool {
        self.layout_mode() != LayoutMode::None
    }

    pub fn is_relative(&self) -> bool {
        self.layout_mode() == LayoutMode::None
    }

    /// Identifier used for export requests and result lookups.
    pub fn export_id(&self) -> &str {
        self.base.node_id.as_deref().unwrap_or(&self.base.id)
    }

    pub fn has_image_fill(&self) -> bool {
        self.base.fills.iter().any(|fill| fill.kind == PaintKind::Image)
    }

    /// Color of the first fill when that fill is SOLID.
    pub fn first_solid_fill(&self) -> Option<Color> {
        self.base
            .fills
            .first()
            .filter(|fill| fill.kind == PaintKind::Solid)
            .map(|fill| fill.color.unwrap_or_default())
    }

    pub fn has_original_order(&self) -> bool {
        self.base.original_order.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_type_round_trips_unknown_names() {
        let parsed: NodeType = serde_json::from_str("\"WIDGET\"").unwrap();
        assert_eq!(parsed, NodeType::Other("WIDGET".into()));
        assert_eq!(parsed.to_string(), "WIDGET");
        assert_eq!(NodeType::from("REGULAR_POLYGON".to_string()), NodeType::RegularPolygon);
    }

    #[test]
    fn leaf_nodes_are_relative_and_not_auto_layout() {
        let node = Node::new(NodeBase::new("1:1", "Box"), NodeKind::Rectangle);
        assert!(!node.is_auto_layout());
        assert!(node.is_relative());
        assert_eq!(node.layout_mode(), LayoutMode::None);
    }

    #[test]
    fn export_id_prefers_injected_node_id() {
        let mut base = NodeBase::new("1:1", "Icon");
        assert_eq!(Node::new(base.clone(), NodeKind::Vector).export_id(), "1:1");
        base.node_id = Some("9:9".into());
        assert_eq!(Node::new(base, NodeKind::Vector).export_id(), "9:9");
    }
}
