//! Paint, effect, geometry and typography records shared by the raw Figma
//! wire format and the normalized node model.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_true() -> bool {
    true
}

fn default_one() -> f64 {
    1.0
}

/// Axis-aligned box in absolute canvas coordinates. Missing fields read as zero,
/// so an empty object deserializes to the zero box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// RGBA color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    #[serde(default)]
    pub r: f64,
    #[serde(default)]
    pub g: f64,
    #[serde(default)]
    pub b: f64,
    #[serde(default = "default_one")]
    pub a: f64,
}

impl Default for Color {
    fn default() -> Self {
        Self::rgba(0.0, 0.0, 0.0, 1.0)
    }
}

impl Color {
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Truncating conversion to a 0-255 channel.
    pub fn channel(value: f64) -> u8 {
        (value * 255.0) as u8
    }

    /// `"r, g, b"` with 0-255 channels.
    pub fn rgb_triplet(&self) -> String {
        format!(
            "{}, {}, {}",
            Self::channel(self.r),
            Self::channel(self.g),
            Self::channel(self.b)
        )
    }

    pub fn css_rgb(&self) -> String {
        format!("rgb({})", self.rgb_triplet())
    }

    /// `rgba(...)` when `alpha < 1`, `rgb(...)` otherwise.
    pub fn css_with_alpha(&self, alpha: f64) -> String {
        if alpha < 1.0 {
            format!("rgba({}, {})", self.rgb_triplet(), alpha)
        } else {
            self.css_rgb()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaintKind {
    Solid,
    GradientLinear,
    GradientRadial,
    GradientAngular,
    GradientDiamond,
    Image,
    Other(String),
}

impl From<String> for PaintKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "SOLID" => PaintKind::Solid,
            "GRADIENT_LINEAR" => PaintKind::GradientLinear,
            "GRADIENT_RADIAL" => PaintKind::GradientRadial,
            "GRADIENT_ANGULAR" => PaintKind::GradientAngular,
            "GRADIENT_DIAMOND" => PaintKind::GradientDiamond,
            "IMAGE" => PaintKind::Image,
            _ => PaintKind::Other(value),
        }
    }
}

impl From<PaintKind> for String {
    fn from(kind: PaintKind) -> Self {
        match kind {
            PaintKind::Solid => "SOLID".into(),
            PaintKind::GradientLinear => "GRADIENT_LINEAR".into(),
            PaintKind::GradientRadial => "GRADIENT_RADIAL".into(),
            PaintKind::GradientAngular => "GRADIENT_ANGULAR".into(),
            PaintKind::GradientDiamond => "GRADIENT_DIAMOND".into(),
            PaintKind::Image => "IMAGE".into(),
            PaintKind::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    #[serde(default)]
    pub position: f64,
    #[serde(default)]
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paint {
    #[serde(rename = "type")]
    pub kind: PaintKind,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_one")]
    pub opacity: f64,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub gradient_handle_positions: Vec<Vector2>,
    #[serde(default)]
    pub gradient_stops: Vec<ColorStop>,
    #[serde(default)]
    pub image_ref: Option<String>,
}

impl Paint {
    pub fn solid(color: Color) -> Self {
        Self {
            kind: PaintKind::Solid,
            visible: true,
            opacity: 1.0,
            color: Some(color),
            gradient_handle_positions: Vec::new(),
            gradient_stops: Vec::new(),
            image_ref: None,
        }
    }

    pub fn image(image_ref: impl Into<String>) -> Self {
        Self {
            kind: PaintKind::Image,
            visible: true,
            opacity: 1.0,
            color: None,
            gradient_handle_positions: Vec::new(),
            gradient_stops: Vec::new(),
            image_ref: Some(image_ref.into()),
        }
    }

    pub fn is_image(&self) -> bool {
        self.kind == PaintKind::Image
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectKind {
    DropShadow,
    InnerShadow,
    LayerBlur,
    BackgroundBlur,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    #[serde(rename = "type")]
    pub kind: EffectKind,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub offset: Vector2,
    #[serde(default)]
    pub radius: f64,
    #[serde(default)]
    pub spread: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DimensionUnit {
    Pixels,
    Percent,
    #[serde(other)]
    Auto,
}

/// Line-height / letter-spacing value: either a bare number or a `{unit, value}` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Value(f64),
    Unit {
        unit: DimensionUnit,
        #[serde(default)]
        value: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justified,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextDecoration {
    None,
    Underline,
    Strikethrough,
    #[serde(other)]
    Other,
}

/// Figma `TypeStyle`. Every field is optional so the same record serves as the
/// node style and as a sparse entry of `styleOverrideTable`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStyle {
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub font_weight: Option<f64>,
    #[serde(default)]
    pub italic: Option<bool>,
    #[serde(default)]
    pub line_height: Option<Dimension>,
    #[serde(default)]
    pub line_height_px: Option<f64>,
    #[serde(default)]
    pub line_height_unit: Option<String>,
    #[serde(default)]
    pub letter_spacing: Option<Dimension>,
    #[serde(default)]
    pub text_align_horizontal: Option<TextAlign>,
    #[serde(default)]
    pub text_decoration: Option<TextDecoration>,
    #[serde(default)]
    pub opentype_flags: HashMap<String, u32>,
    #[serde(default)]
    pub fills: Vec<Paint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSetting {
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub suffix: Option<String>,
}

/// Entry of a node's `colorVariableMappings`, keyed by lowercase color string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorVariableMapping {
    pub variable_name: String,
}
