//! Auto-layout enums and the per-node layout records derived from them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutMode {
    Horizontal,
    Vertical,
    Grid,
    #[default]
    #[serde(other)]
    None,
}

impl LayoutMode {
    pub fn is_flex(self) -> bool {
        matches!(self, LayoutMode::Horizontal | LayoutMode::Vertical)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutPositioning {
    Absolute,
    #[default]
    #[serde(other)]
    Auto,
}

/// Primary/counter axis alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AxisAlign {
    #[default]
    Min,
    Center,
    Max,
    SpaceBetween,
    Baseline,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AxisSizingMode {
    Fixed,
    #[default]
    #[serde(other)]
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutWrap {
    Wrap,
    #[default]
    #[serde(other)]
    NoWrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlignContent {
    SpaceBetween,
    #[default]
    #[serde(other)]
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutAlign {
    Stretch,
    Min,
    Center,
    Max,
    #[default]
    #[serde(other)]
    Inherit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutSizing {
    Hug,
    Fill,
    #[default]
    #[serde(other)]
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GridChildAlign {
    Min,
    Center,
    Max,
    #[default]
    #[serde(other)]
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub fn is_zero(&self) -> bool {
        self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0 && self.left == 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub row_count: u32,
    pub column_count: u32,
    pub row_gap: f64,
    pub column_gap: f64,
    pub columns_sizing: Option<String>,
    pub rows_sizing: Option<String>,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            row_count: 1,
            column_count: 1,
            row_gap: 0.0,
            column_gap: 0.0,
            columns_sizing: None,
            rows_sizing: None,
        }
    }
}

/// Container-side auto-layout configuration. Every field has its Figma default,
/// so style code reads it without null checks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AutoLayout {
    pub mode: LayoutMode,
    pub item_spacing: f64,
    pub counter_axis_spacing: f64,
    pub padding: Padding,
    pub primary_axis_align: AxisAlign,
    pub counter_axis_align: AxisAlign,
    pub primary_axis_sizing: AxisSizingMode,
    pub counter_axis_sizing: AxisSizingMode,
    pub wrap: LayoutWrap,
    pub counter_axis_align_content: AlignContent,
    pub grid: GridLayout,
}

impl AutoLayout {
    pub fn with_mode(mode: LayoutMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

/// Child-side auto-layout properties, meaningful when the parent's mode is not NONE.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildLayout {
    pub align: LayoutAlign,
    pub grow: f64,
    pub sizing_horizontal: LayoutSizing,
    pub sizing_vertical: LayoutSizing,
    pub grid_horizontal_align: GridChildAlign,
    pub grid_vertical_align: GridChildAlign,
    pub grid_row_span: u32,
    pub grid_column_span: u32,
    pub grid_row_anchor: u32,
    pub grid_column_anchor: u32,
}

impl Default for ChildLayout {
    fn default() -> Self {
        Self {
            align: LayoutAlign::Inherit,
            grow: 0.0,
            sizing_horizontal: LayoutSizing::Fixed,
            sizing_vertical: LayoutSizing::Fixed,
            grid_horizontal_align: GridChildAlign::Auto,
            grid_vertical_align: GridChildAlign::Auto,
            grid_row_span: 1,
            grid_column_span: 1,
            grid_row_anchor: 0,
            grid_column_anchor: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values_parse_and_unknown_values_fall_back_to_default() {
        let mode: LayoutMode = serde_json::from_str(r#""VERTICAL""#).unwrap();
        assert_eq!(mode, LayoutMode::Vertical);
        let mode: LayoutMode = serde_json::from_str(r#""NONE""#).unwrap();
        assert_eq!(mode, LayoutMode::None);

        let wrap: LayoutWrap = serde_json::from_str(r#""NO_WRAP""#).unwrap();
        assert_eq!(wrap, LayoutWrap::NoWrap);
        let wrap: LayoutWrap = serde_json::from_str(r#""WRAP""#).unwrap();
        assert_eq!(wrap, LayoutWrap::Wrap);

        let unknown = r#""SOMETHING_NEW""#;
        assert_eq!(serde_json::from_str::<LayoutMode>(unknown).unwrap(), LayoutMode::default());
        assert_eq!(
            serde_json::from_str::<LayoutPositioning>(unknown).unwrap(),
            LayoutPositioning::Auto
        );
        assert_eq!(
            serde_json::from_str::<AxisSizingMode>(unknown).unwrap(),
            AxisSizingMode::Auto
        );
        assert_eq!(serde_json::from_str::<LayoutWrap>(unknown).unwrap(), LayoutWrap::NoWrap);
        assert_eq!(serde_json::from_str::<AlignContent>(unknown).unwrap(), AlignContent::Auto);
        assert_eq!(serde_json::from_str::<LayoutAlign>(unknown).unwrap(), LayoutAlign::Inherit);
        assert_eq!(serde_json::from_str::<LayoutSizing>(unknown).unwrap(), LayoutSizing::Fixed);
        assert_eq!(
            serde_json::from_str::<GridChildAlign>(unknown).unwrap(),
            GridChildAlign::Auto
        );
        assert_eq!(serde_json::from_str::<AxisAlign>(unknown).unwrap(), AxisAlign::Other);
    }
}
