pub mod arena;
pub mod layout;
pub mod node;
pub mod order;
pub mod paint;

pub use arena::{NodeArena, NodeId};
pub use layout::{
    AlignContent, AutoLayout, AxisAlign, AxisSizingMode, ChildLayout, GridChildAlign, GridLayout,
    LayoutAlign, LayoutMode, LayoutPositioning, LayoutSizing, LayoutWrap, Padding,
};
pub use order::{sort_siblings, SiblingKey};
pub use node::{Node, NodeBase, NodeKind, NodeType, TextContent, TextRun, TextStyle, Transform};
pub use paint::{
    Color, ColorStop, ColorVariableMapping, Dimension, DimensionUnit, Effect, EffectKind,
    ExportSetting, Paint, PaintKind, Rect, TextAlign, TextDecoration, TypeStyle, Vector2,
};
