//! Raw Figma node records as they arrive from the REST API.
//!
//! Every field is defaulted so partial documents deserialize; the converter in
//! [`crate::normalize`] turns these into the typed [`crate::types::Node`] model.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{
    AlignContent, AxisAlign, AxisSizingMode, ColorVariableMapping, Effect, ExportSetting,
    GridChildAlign, LayoutAlign, LayoutMode, LayoutPositioning, LayoutSizing, LayoutWrap,
    NodeType, Paint, Rect, TypeStyle,
};

fn default_true() -> bool {
    true
}

fn default_opacity() -> f64 {
    1.0
}

/// One node of a Figma document tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub node_type: Option<NodeType>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub absolute_bounding_box: Option<Rect>,
    #[serde(default)]
    pub children: Vec<RawNode>,

    #[serde(default)]
    pub fills: Vec<Paint>,
    #[serde(default)]
    pub strokes: Vec<Paint>,
    #[serde(default)]
    pub stroke_weight: Option<f64>,
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub corner_radius: Option<f64>,
    #[serde(default)]
    pub rectangle_corner_radii: Option<[f64; 4]>,
    #[serde(default)]
    pub top_left_radius: Option<f64>,
    #[serde(default)]
    pub top_right_radius: Option<f64>,
    #[serde(default)]
    pub bottom_right_radius: Option<f64>,
    #[serde(default)]
    pub bottom_left_radius: Option<f64>,
    /// Radians.
    #[serde(default)]
    pub rotation: Option<f64>,
    #[serde(default)]
    pub z_index: Option<f64>,
    #[serde(default)]
    pub layout_positioning: Option<LayoutPositioning>,

    // Container auto-layout.
    #[serde(default)]
    pub layout_mode: Option<LayoutMode>,
    #[serde(default)]
    pub item_spacing: Option<f64>,
    #[serde(default)]
    pub counter_axis_spacing: Option<f64>,
    #[serde(default)]
    pub padding_left: Option<f64>,
    #[serde(default)]
    pub padding_right: Option<f64>,
    #[serde(default)]
    pub padding_top: Option<f64>,
    #[serde(default)]
    pub padding_bottom: Option<f64>,
    #[serde(default)]
    pub primary_axis_align_items: Option<AxisAlign>,
    #[serde(default)]
    pub counter_axis_align_items: Option<AxisAlign>,
    #[serde(default)]
    pub primary_axis_sizing_mode: Option<AxisSizingMode>,
    #[serde(default)]
    pub counter_axis_sizing_mode: Option<AxisSizingMode>,
    #[serde(default)]
    pub layout_wrap: Option<LayoutWrap>,
    #[serde(default)]
    pub counter_axis_align_content: Option<AlignContent>,
    #[serde(default)]
    pub grid_row_count: Option<u32>,
    #[serde(default)]
    pub grid_column_count: Option<u32>,
    #[serde(default)]
    pub grid_row_gap: Option<f64>,
    #[serde(default)]
    pub grid_column_gap: Option<f64>,
    #[serde(default)]
    pub grid_columns_sizing: Option<String>,
    #[serde(default)]
    pub grid_rows_sizing: Option<String>,

    // Child auto-layout.
    #[serde(default)]
    pub layout_align: Option<LayoutAlign>,
    #[serde(default)]
    pub layout_grow: Option<f64>,
    #[serde(default)]
    pub layout_sizing_horizontal: Option<LayoutSizing>,
    #[serde(default)]
    pub layout_sizing_vertical: Option<LayoutSizing>,
    #[serde(default)]
    pub grid_child_horizontal_align: Option<GridChildAlign>,
    #[serde(default)]
    pub grid_child_vertical_align: Option<GridChildAlign>,
    #[serde(default)]
    pub grid_row_span: Option<u32>,
    #[serde(default)]
    pub grid_column_span: Option<u32>,
    #[serde(default)]
    pub grid_row_anchor_index: Option<u32>,
    #[serde(default)]
    pub grid_column_anchor_index: Option<u32>,

    // Text.
    #[serde(default)]
    pub characters: Option<String>,
    #[serde(default)]
    pub style: Option<TypeStyle>,
    #[serde(default)]
    pub character_style_overrides: Vec<u32>,
    #[serde(default)]
    pub style_override_table: HashMap<String, TypeStyle>,

    #[serde(default)]
    pub export_settings: Vec<ExportSetting>,
    #[serde(default)]
    pub color_variable_mappings: HashMap<String, ColorVariableMapping>,

    // Stamped by metadata injection.
    #[serde(rename = "file_key", default, skip_serializing_if = "Option::is_none")]
    pub file_key: Option<String>,
    #[serde(rename = "node_id", default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(
        rename = "_original_order",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub original_order: Option<usize>,
    #[serde(default)]
    pub can_be_flattened: Option<bool>,
    #[serde(default)]
    pub svg: Option<String>,
}

impl RawNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type: Some(node_type),
            visible: true,
            opacity: 1.0,
            ..Self::default()
        }
    }

    pub fn with_bbox(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.absolute_bounding_box = Some(Rect::new(x, y, width, height));
        self
    }

    pub fn with_children(mut self, children: Vec<RawNode>) -> Self {
        self.children = children;
        self
    }

    /// Width/height of the absolute bounding box, zero when absent.
    pub fn size(&self) -> (f64, f64) {
        self.absolute_bounding_box
            .map(|bbox| (bbox.width, bbox.height))
            .unwrap_or((0.0, 0.0))
    }
}

/// Response of `GET /v1/files/:key`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FigmaFileResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_modified: Option<String>,
    pub document: RawNode,
}

/// Response of `GET /v1/files/:key/nodes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FigmaNodesResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nodes: HashMap<String, Option<FigmaNodeContainer>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FigmaNodeContainer {
    pub document: RawNode,
}

/// Response of `GET /v1/images/:key`. Figma answers `null` for nodes it could not render.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FigmaImageResponse {
    #[serde(default)]
    pub images: HashMap<String, Option<String>>,
    #[serde(default)]
    pub err: Option<String>,
}
