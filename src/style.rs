//! CSS Style Builder.
//!
//! Declarations are kept in insertion order so generated CSS is byte-stable.

use indexmap::IndexMap;

use crate::types::{
    AlignContent, AxisAlign, Color, Dimension, DimensionUnit, EffectKind, GridChildAlign,
    LayoutAlign, LayoutMode, LayoutPositioning, LayoutSizing, LayoutWrap, Node, NodeKind, Paint,
    PaintKind, TextAlign, TextDecoration, TypeStyle,
};

/// Format a number the way it appears in CSS values (`8`, `0.5`, never `-0`).
pub fn fmt_num(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

pub fn px(value: f64) -> String {
    format!("{}px", fmt_num(value))
}

fn paint_color(paint: &Paint) -> String {
    paint
        .color
        .unwrap_or_default()
        .css_with_alpha(paint.opacity)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssStyleBuilder {
    styles: IndexMap<String, String>,
}

impl CssStyleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `property`, ignoring empty, `"0"` and `"none"` values.
    ///
    /// Re-adding a property keeps its first position and replaces the value.
    pub fn add_style(&mut self, property: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        if value.is_empty() || value == "0" || value == "none" {
            return self;
        }
        self.styles.insert(property.to_string(), value);
        self
    }

    /// Set a declaration whose value is a meaningful zero, such as `flex-shrink: 0`.
    fn set_style(&mut self, property: &str, value: &str) -> &mut Self {
        self.styles.insert(property.to_string(), value.to_string());
        self
    }

    pub fn extend_from(&mut self, other: &CssStyleBuilder) -> &mut Self {
        for (property, value) in &other.styles {
            self.add_style(property, value.clone());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.styles.get(property).map(String::as_str)
    }

    pub fn declarations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.styles.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }

    /// `prop: value; prop: value` on one line.
    pub fn build(&self) -> String {
        self.declarations()
            .map(|(property, value)| format!("{property}: {value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Size, placement, child auto-layout rules and rotation.
    pub fn add_position_styles(&mut self, node: &Node, parent: Option<&Node>) -> &mut Self {
        self.add_size_styles(node);
        self.add_positioning(node, parent);

        if parent.is_some_and(|p| p.layout_mode() != LayoutMode::None) {
            self.add_child_auto_layout_styles(node, parent);
        }

        if let Some(transform) = node.base.transform {
            self.add_style("transform", format!("rotate({}deg)", fmt_num(transform.rotate)));
        } else if node.base.rotation.abs() > 0.01 {
            self.add_style(
                "transform",
                format!("rotate({}deg)", fmt_num(node.base.rotation.to_degrees())),
            );
        }
        self
    }

    fn add_positioning(&mut self, node: &Node, parent: Option<&Node>) {
        let parent_mode = parent.map(Node::layout_mode).unwrap_or(LayoutMode::None);
        let absolute = parent.is_none()
            || node.base.layout_positioning == LayoutPositioning::Absolute
            || parent_mode == LayoutMode::None;

        if absolute {
            self.add_style("position", "absolute");
            if node.base.x != 0.0 {
                self.add_style("left", px(node.base.x));
            }
            if node.base.y != 0.0 {
                self.add_style("top", px(node.base.y));
            }
        } else {
            // Flow placement; relative anchors absolutely positioned descendants.
            self.add_style("position", "relative");
        }
    }

    pub fn add_size_styles(&mut self, node: &Node) -> &mut Self {
        if node.base.width > 0.0 {
            self.add_style("width", px(node.base.width));
        }
        if node.base.height > 0.0 {
            self.add_style("height", px(node.base.height));
        }
        self
    }

    /// First visible SOLID, GRADIENT_LINEAR or IMAGE fill decides the background.
    /// IMAGE fills are rendered by the HTML layer.
    pub fn add_background_styles(&mut self, node: &Node) -> &mut Self {
        for fill in node.base.fills.iter().filter(|fill| fill.visible) {
            match fill.kind {
                PaintKind::Solid => {
                    self.add_style("background-color", paint_color(fill));
                    break;
                }
                PaintKind::GradientLinear => {
                    if let Some(gradient) = linear_gradient(fill) {
                        self.add_style("background", gradient);
                    }
                    break;
                }
                PaintKind::Image => break,
                _ => continue,
            }
        }
        self
    }

    pub fn add_border_styles(&mut self, node: &Node) -> &mut Self {
        let weight = node.base.stroke_weight;
        if let Some(stroke) = node.base.strokes.first() {
            if weight > 0.0 && stroke.visible {
                self.add_style(
                    "border",
                    format!("{} solid {}", px(weight), paint_color(stroke)),
                );
            }
        }
        self.add_border_radius(node)
    }

    pub fn add_border_radius(&mut self, node: &Node) -> &mut Self {
        if node.base.corner_radius > 0.0 {
            self.add_style("border-radius", px(node.base.corner_radius));
            return self;
        }
        let radii = node.base.corner_radii;
        if radii.iter().any(|r| *r != 0.0) {
            let value = radii.iter().map(|r| px(*r)).collect::<Vec<_>>().join(" ");
            self.add_style("border-radius", value);
        }
        self
    }

    pub fn add_text_styles(&mut self, node: &Node) -> &mut Self {
        let NodeKind::Text(text) = &node.kind else {
            return self;
        };
        let style = &text.style;
        self.add_style("font-family", format!("\"{}\", sans-serif", style.font_family));
        self.add_style("font-size", px(style.font_size));
        self.add_style("font-weight", fmt_num(style.font_weight));

        let source = &style.source;
        if let Some(line_height) = line_height(source) {
            self.add_style("line-height", line_height);
        }
        match source.letter_spacing {
            Some(Dimension::Unit {
                unit: DimensionUnit::Pixels,
                value,
            })
            | Some(Dimension::Value(value)) => {
                self.add_style("letter-spacing", px(value));
            }
            Some(Dimension::Unit {
                unit: DimensionUnit::Percent,
                value,
            }) => {
                self.add_style("letter-spacing", format!("{}em", fmt_num(value / 100.0)));
            }
            _ => {}
        }
        if let Some(align) = source.text_align_horizontal.and_then(text_align) {
            self.add_style("text-align", align);
        }

        if let Some(fill) = node.base.fills.first() {
            if fill.kind == PaintKind::Solid {
                self.add_style("color", paint_color(fill));
            }
        }
        self
    }

    /// Declarations for one styled text run.
    pub fn add_run_styles(&mut self, style: &TypeStyle) -> &mut Self {
        if let Some(family) = style.font_family.as_deref().filter(|f| !f.is_empty()) {
            self.add_style("font-family", format!("\"{family}\", sans-serif"));
        }
        if let Some(size) = style.font_size {
            self.add_style("font-size", px(size));
        }
        if let Some(weight) = style.font_weight {
            self.add_style("font-weight", fmt_num(weight));
        }
        if style.italic == Some(true) {
            self.add_style("font-style", "italic");
        }
        match style.text_decoration {
            Some(TextDecoration::Underline) => {
                self.add_style("text-decoration", "underline");
            }
            Some(TextDecoration::Strikethrough) => {
                self.add_style("text-decoration", "line-through");
            }
            _ => {}
        }
        if let Some(fill) = style
            .fills
            .iter()
            .find(|fill| fill.visible && fill.kind == PaintKind::Solid)
        {
            self.add_style("color", paint_color(fill));
        }
        self
    }

    pub fn add_shadow_styles(&mut self, node: &Node) -> &mut Self {
        let shadows: Vec<String> = node
            .base
            .effects
            .iter()
            .filter(|effect| effect.kind == EffectKind::DropShadow && effect.visible)
            .map(|effect| {
                let color = effect.color.unwrap_or_default();
                format!(
                    "{} {} {} {}",
                    px(effect.offset.x),
                    px(effect.offset.y),
                    px(effect.radius),
                    color.css_with_alpha(color.a)
                )
            })
            .collect();
        if !shadows.is_empty() {
            self.add_style("box-shadow", shadows.join(", "));
        }
        self
    }

    pub fn add_opacity(&mut self, node: &Node) -> &mut Self {
        if node.base.opacity < 1.0 {
            self.add_style("opacity", fmt_num(node.base.opacity));
        }
        self
    }

    pub fn add_auto_layout_styles(&mut self, node: &Node) -> &mut Self {
        let Some(layout) = node.kind.layout() else {
            return self;
        };
        match layout.mode {
            LayoutMode::Horizontal | LayoutMode::Vertical => {
                self.add_style("display", "flex");
                let horizontal = layout.mode == LayoutMode::Horizontal;
                self.add_style("flex-direction", if horizontal { "row" } else { "column" });
                if layout.item_spacing > 0.0 {
                    self.add_style("gap", px(layout.item_spacing));
                }

                let wraps = layout.wrap == LayoutWrap::Wrap;
                if wraps {
                    self.add_style("flex-wrap", "wrap");
                    if layout.counter_axis_spacing > 0.0 {
                        let property = if horizontal { "row-gap" } else { "column-gap" };
                        self.add_style(property, px(layout.counter_axis_spacing));
                    }
                }

                self.add_style("justify-content", primary_align(layout.primary_axis_align));
                self.add_style("align-items", counter_align(layout.counter_axis_align));

                if wraps && layout.counter_axis_align_content == AlignContent::SpaceBetween {
                    self.add_style("align-content", "space-between");
                }
            }
            LayoutMode::Grid => {
                let grid = &layout.grid;
                self.add_style("display", "grid");
                match grid.columns_sizing.as_deref() {
                    Some(columns) => self.add_style("grid-template-columns", columns),
                    None => self.add_style(
                        "grid-template-columns",
                        format!("repeat({}, 1fr)", grid.column_count),
                    ),
                };
                match grid.rows_sizing.as_deref() {
                    Some(rows) => self.add_style("grid-template-rows", rows),
                    None => self.add_style(
                        "grid-template-rows",
                        format!("repeat({}, auto)", grid.row_count),
                    ),
                };

                if grid.row_gap > 0.0 || grid.column_gap > 0.0 {
                    if grid.row_gap == grid.column_gap {
                        self.add_style("gap", px(grid.row_gap));
                    } else {
                        self.add_style("row-gap", px(grid.row_gap));
                        self.add_style("column-gap", px(grid.column_gap));
                    }
                }
            }
            LayoutMode::None => {}
        }
        self
    }

    /// Rules a child receives from its flex or grid parent.
    pub fn add_child_auto_layout_styles(&mut self, node: &Node, parent: Option<&Node>) -> &mut Self {
        let Some(parent) = parent else {
            return self;
        };
        let child = &node.base.child_layout;
        match parent.layout_mode() {
            mode @ (LayoutMode::Horizontal | LayoutMode::Vertical) => {
                if child.align == LayoutAlign::Stretch {
                    self.add_style("align-self", "stretch");
                }
                if child.grow > 0.0 {
                    self.add_style("flex-grow", fmt_num(child.grow));
                    self.set_style("flex-shrink", "0");
                }

                let (sizing, axis) = if mode == LayoutMode::Horizontal {
                    (child.sizing_horizontal, "width")
                } else {
                    (child.sizing_vertical, "height")
                };
                match sizing {
                    LayoutSizing::Fill => {
                        self.add_style("flex-grow", "1");
                        self.set_style("flex-shrink", "0");
                    }
                    LayoutSizing::Hug => {
                        self.add_style(axis, "auto");
                        self.set_style("flex-shrink", "0");
                    }
                    LayoutSizing::Fixed => {}
                }
            }
            LayoutMode::Grid => {
                if child.grid_column_span > 1 {
                    self.add_style(
                        "grid-column",
                        format!("{} / span {}", child.grid_column_anchor + 1, child.grid_column_span),
                    );
                } else {
                    self.add_style(
                        "grid-column-start",
                        (child.grid_column_anchor + 1).to_string(),
                    );
                }
                if child.grid_row_span > 1 {
                    self.add_style(
                        "grid-row",
                        format!("{} / span {}", child.grid_row_anchor + 1, child.grid_row_span),
                    );
                } else {
                    self.add_style("grid-row-start", (child.grid_row_anchor + 1).to_string());
                }

                if let Some(value) = grid_self_align(child.grid_horizontal_align) {
                    self.add_style("justify-self", value);
                }
                if let Some(value) = grid_self_align(child.grid_vertical_align) {
                    self.add_style("align-self", value);
                }
            }
            LayoutMode::None => {}
        }
        self
    }

    /// `top right bottom left` shorthand for auto-layout containers.
    pub fn add_padding(&mut self, node: &Node) -> &mut Self {
        let Some(layout) = node.kind.layout() else {
            return self;
        };
        if layout.mode == LayoutMode::None || layout.padding.is_zero() {
            return self;
        }
        let p = layout.padding;
        self.add_style(
            "padding",
            format!("{} {} {} {}", px(p.top), px(p.right), px(p.bottom), px(p.left)),
        );
        self
    }
}

/// Every style rule applicable to `node` under `parent`.
pub fn build_styles(node: &Node, parent: Option<&Node>) -> CssStyleBuilder {
    let mut builder = CssStyleBuilder::new();
    builder
        .add_position_styles(node, parent)
        .add_background_styles(node)
        .add_border_styles(node)
        .add_text_styles(node)
        .add_shadow_styles(node)
        .add_opacity(node)
        .add_auto_layout_styles(node)
        .add_padding(node);
    builder
}

/// Built from the stops alone; the angle is always `0deg`.
fn linear_gradient(fill: &Paint) -> Option<String> {
    if fill.gradient_stops.is_empty() {
        return None;
    }
    let stops: Vec<String> = fill
        .gradient_stops
        .iter()
        .map(|stop| {
            let color: Color = stop.color;
            format!(
                "{} {}%",
                color.css_with_alpha(color.a),
                fmt_num(stop.position * 100.0)
            )
        })
        .collect();
    Some(format!("linear-gradient(0deg, {})", stops.join(", ")))
}

fn line_height(style: &TypeStyle) -> Option<String> {
    match style.line_height {
        Some(Dimension::Unit {
            unit: DimensionUnit::Pixels,
            value,
        }) => Some(px(value)),
        Some(Dimension::Unit {
            unit: DimensionUnit::Percent,
            value,
        }) => Some(fmt_num(value / 100.0)),
        Some(Dimension::Value(value)) => Some(fmt_num(value)),
        Some(Dimension::Unit {
            unit: DimensionUnit::Auto,
            ..
        }) => None,
        None => match (style.line_height_unit.as_deref(), style.line_height_px) {
            (Some("PIXELS"), Some(value)) => Some(px(value)),
            _ => None,
        },
    }
}

fn text_align(align: TextAlign) -> Option<&'static str> {
    match align {
        TextAlign::Left => Some("left"),
        TextAlign::Center => Some("center"),
        TextAlign::Right => Some("right"),
        TextAlign::Justified => Some("justify"),
        TextAlign::Other => None,
    }
}

fn primary_align(align: AxisAlign) -> &'static str {
    match align {
        AxisAlign::Center => "center",
        AxisAlign::Max => "flex-end",
        AxisAlign::SpaceBetween => "space-between",
        _ => "flex-start",
    }
}

fn counter_align(align: AxisAlign) -> &'static str {
    match align {
        AxisAlign::Center => "center",
        AxisAlign::Max => "flex-end",
        AxisAlign::Baseline => "baseline",
        _ => "flex-start",
    }
}

fn grid_self_align(align: GridChildAlign) -> Option<&'static str> {
    match align {
        GridChildAlign::Min => Some("start"),
        GridChildAlign::Center => Some("center"),
        GridChildAlign::Max => Some("end"),
        GridChildAlign::Auto => None,
    }
}
