//! HTML Generator.
//!
//! Walks a normalized [`NodeArena`] and emits element markup plus one CSS rule
//! per element. Nothing here touches the network: shapes already carry their
//! SVG and vector/image content comes from the batch results.

mod css;
mod naming;
mod text;

pub use css::{CssCollection, CSS_PREAMBLE};
pub use naming::{sanitize_class_name, ClassNamer};
pub use text::{escape_html, escape_text, indent_string};

use log::debug;
use serde::Serialize;

use crate::batch::{ProcessedResults, ResultKind};
use crate::config::ConversionSettings;
use crate::error::Warnings;
use crate::image_processor::{process_image_node, ImagePlacement};
use crate::style::{px, CssStyleBuilder};
use crate::svg::{fit_svg_to_box, is_shape};
use crate::types::{sort_siblings, Node, NodeArena, NodeId, NodeKind, SiblingKey, TextContent};

use text::{has_line_break, run_tag};

const INDENT: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HtmlOutput {
    pub html: String,
    pub css: String,
    pub warnings: Vec<String>,
}

#[derive(Clone, Copy)]
struct Scope<'a> {
    arena: &'a NodeArena,
    processed: &'a ProcessedResults,
}

impl<'a> Scope<'a> {
    fn node(&self, id: NodeId) -> &'a Node {
        &self.arena[id]
    }

    fn parent(&self, parent: Option<NodeId>) -> Option<&'a Node> {
        parent.map(|id| &self.arena[id])
    }
}

fn is_empty_box(node: &Node) -> bool {
    node.base.width <= 0.0 || node.base.height <= 0.0
}

fn wrap(tag: &str, class_attr: &str, extra_attrs: &str, children: &str) -> String {
    if children.is_empty() {
        format!("\n<{tag} class=\"{class_attr}\"{extra_attrs}></{tag}>")
    } else {
        format!(
            "\n<{tag} class=\"{class_attr}\"{extra_attrs}>{}\n</{tag}>",
            indent_string(children, INDENT)
        )
    }
}

/// Full-viewport placement for top-level containers. The zero offsets and
/// resets come from the `.root-container` preamble rule.
fn add_root_styles(builder: &mut CssStyleBuilder) {
    builder
        .add_style("position", "fixed")
        .add_style("width", "100vw")
        .add_style("height", "100vh")
        .add_style("overflow-y", "auto")
        .add_style("overflow-x", "hidden")
        .add_style("box-sizing", "border-box");
}

pub struct HtmlGenerator {
    configured: ConversionSettings,
    settings: ConversionSettings,
    css: CssCollection,
    namer: ClassNamer,
    warnings: Warnings,
}

impl HtmlGenerator {
    pub fn new(settings: &ConversionSettings) -> Self {
        Self {
            configured: settings.clone(),
            settings: settings.clone(),
            css: CssCollection::new(),
            namer: ClassNamer::new(),
            warnings: Warnings::new(),
        }
    }

    fn reset_state(&mut self, is_preview: bool) {
        self.css.clear();
        self.namer.reset();
        self.warnings.clear();
        self.settings = ConversionSettings {
            preview: self.configured.preview || is_preview,
            ..self.configured.clone()
        };
    }

    /// Render the arena's roots. Batch warnings are carried into the output.
    pub fn render(
        &mut self,
        arena: &NodeArena,
        processed: &ProcessedResults,
        is_preview: bool,
    ) -> HtmlOutput {
        self.reset_state(is_preview);
        self.warnings.extend(processed.warnings.as_slice());

        let scope = Scope { arena, processed };
        let html = self.render_siblings(scope, arena.roots(), None, 0);
        let html = html.strip_prefix('\n').unwrap_or(&html).to_string();

        debug!(
            "generated {} bytes of HTML with {} CSS rules, {} warning(s)",
            html.len(),
            self.css.len(),
            self.warnings.len()
        );
        HtmlOutput {
            html,
            css: self.css.to_css(),
            warnings: self.warnings.as_slice().to_vec(),
        }
    }

    pub fn warnings(&self) -> &Warnings {
        &self.warnings
    }

    /// Visible siblings, re-sorted with the converter's ordering rule.
    fn render_siblings(
        &mut self,
        scope: Scope<'_>,
        ids: &[NodeId],
        parent: Option<NodeId>,
        depth: usize,
    ) -> String {
        let mut ordered: Vec<NodeId> = ids
            .iter()
            .copied()
            .filter(|id| scope.node(*id).base.visible)
            .collect();
        sort_siblings(&mut ordered, |id| {
            let base = &scope.node(*id).base;
            SiblingKey {
                original_order: base.original_order,
                z_index: base.z_index,
                y: base.y,
            }
        });

        ordered
            .into_iter()
            .map(|id| self.convert_node(scope, id, parent, depth))
            .collect()
    }

    fn render_children(&mut self, scope: Scope<'_>, id: NodeId, depth: usize) -> String {
        self.render_siblings(scope, scope.arena.children_of(id), Some(id), depth + 1)
    }

    fn convert_node(
        &mut self,
        scope: Scope<'_>,
        id: NodeId,
        parent: Option<NodeId>,
        depth: usize,
    ) -> String {
        let node = scope.node(id);
        if depth > self.settings.max_depth {
            self.warnings.push(format!(
                "Maximum depth {} exceeded at {}",
                self.settings.max_depth,
                node.export_id()
            ));
            return String::new();
        }
        let parent_node = scope.parent(parent);

        if is_shape(node) {
            if let Some(svg) = node.base.svg.as_deref() {
                return self.wrap_svg(node, parent_node, svg);
            }
            return self.container(scope, id, parent, String::new());
        }

        if self.settings.embed_vectors && node.base.can_be_flattened {
            let content = node.base.svg.as_deref().or_else(|| {
                scope
                    .processed
                    .get(node.export_id())
                    .filter(|result| result.kind == ResultKind::Svg && !result.content.is_empty())
                    .map(|result| result.content.as_str())
            });
            if let Some(svg) = content {
                return self.wrap_svg(node, parent_node, svg);
            }
        }

        match &node.kind {
            NodeKind::Rectangle => self.container(scope, id, parent, String::new()),
            NodeKind::Group(_) => self.group(scope, id, parent, depth),
            NodeKind::Frame(_)
            | NodeKind::Component(_)
            | NodeKind::Instance(_)
            | NodeKind::ComponentSet(_) => {
                let children = self.render_children(scope, id, depth);
                self.container(scope, id, parent, children)
            }
            NodeKind::Section(_) => self.section(scope, id, parent, depth),
            NodeKind::Text(text) => self.text(node, parent_node, text),
            NodeKind::Line => self.line(node, parent_node),
            NodeKind::Vector => {
                if !self.settings.embed_vectors && !self.settings.preview {
                    self.warnings
                        .push("VECTOR not supported without vector embedding");
                }
                self.container(scope, id, parent, String::new())
            }
            NodeKind::Ellipse
            | NodeKind::RegularPolygon
            | NodeKind::BooleanOperation
            | NodeKind::Star
            | NodeKind::Other(_) => {
                self.warnings
                    .push(format!("{} not supported", node.node_type()));
                String::new()
            }
        }
    }

    /// Styled box for rectangles, frames and fallbacks. A zero-size box emits
    /// only `children`.
    fn container(
        &mut self,
        scope: Scope<'_>,
        id: NodeId,
        parent: Option<NodeId>,
        children: String,
    ) -> String {
        let node = scope.node(id);
        if is_empty_box(node) {
            return children;
        }
        let parent_node = scope.parent(parent);
        let is_root = parent_node.is_none();

        let mut builder = CssStyleBuilder::new();
        if is_root {
            add_root_styles(&mut builder);
        } else {
            builder.add_position_styles(node, parent_node);
        }
        builder
            .add_background_styles(node)
            .add_border_styles(node)
            .add_shadow_styles(node)
            .add_opacity(node)
            .add_auto_layout_styles(node)
            .add_padding(node);

        let mut tag = "div";
        let mut extra_attrs = String::new();
        if node.has_image_fill() {
            let image = process_image_node(
                node,
                scope.arena.has_children(id),
                scope.processed.get(node.export_id()),
                &self.settings,
            );
            match image.placement {
                ImagePlacement::Tag => {
                    tag = image.tag;
                    if let Some(src) = image.src_attr {
                        extra_attrs = format!(" {src}");
                    }
                }
                ImagePlacement::Background => {
                    if let Some(background) = image.background_image {
                        builder
                            .add_style("background-image", background)
                            .add_style("background-size", "cover")
                            .add_style("background-position", "center");
                    }
                }
            }
        }

        let class_name = self.namer.next(&node.base.unique_name);
        self.css.insert(class_name.clone(), builder);
        let class_attr = if is_root {
            format!("root-container {class_name}")
        } else {
            class_name
        };

        if tag == "img" {
            return format!("\n<img class=\"{class_attr}\"{extra_attrs}/>");
        }
        wrap(tag, &class_attr, &extra_attrs, &children)
    }

    /// A group with no styles of its own collapses into its children.
    fn group(
        &mut self,
        scope: Scope<'_>,
        id: NodeId,
        parent: Option<NodeId>,
        depth: usize,
    ) -> String {
        let node = scope.node(id);
        if !scope.arena.has_children(id) {
            return String::new();
        }
        let children = self.render_children(scope, id, depth);
        if is_empty_box(node) {
            return children;
        }

        let mut builder = CssStyleBuilder::new();
        if let Some(parent_node) = scope.parent(parent) {
            builder.add_position_styles(node, Some(parent_node));
        }
        if builder.is_empty() {
            return children;
        }

        let class_name = self.namer.next(&node.base.unique_name);
        self.css.insert(class_name.clone(), builder);
        wrap("div", &class_name, "", &children)
    }

    fn section(
        &mut self,
        scope: Scope<'_>,
        id: NodeId,
        parent: Option<NodeId>,
        depth: usize,
    ) -> String {
        let node = scope.node(id);
        let children = self.render_children(scope, id, depth);
        if is_empty_box(node) {
            return children;
        }

        let mut builder = CssStyleBuilder::new();
        builder.add_size_styles(node);
        if let Some(parent_node) = scope.parent(parent) {
            builder.add_position_styles(node, Some(parent_node));
        }
        builder.add_background_styles(node);

        let class_name = self.namer.next(&node.base.unique_name);
        self.css.insert(class_name.clone(), builder);
        wrap("div", &class_name, "", &children)
    }

    /// One `<div>`; multiple runs become classed `span`/`sub`/`sup` children.
    fn text(&mut self, node: &Node, parent: Option<&Node>, text: &TextContent) -> String {
        let mut builder = CssStyleBuilder::new();
        if parent.is_some() {
            builder.add_position_styles(node, parent);
        }
        builder.add_text_styles(node).add_opacity(node);
        if builder.get("color").is_none() {
            if let Some(color) = text.color.as_deref() {
                builder.add_style("color", color);
            }
        }
        if has_line_break(&text.characters) {
            builder.add_style("white-space", "pre-wrap");
        }

        let class_name = self.namer.next(&node.base.unique_name);
        let content = match text.runs.as_slice() {
            [] => escape_text(&text.characters),
            [run] if run_tag(run) == "span" => {
                if let Some(style) = &run.style {
                    builder.add_run_styles(style);
                }
                escape_text(&run.text)
            }
            runs => {
                let mut content = String::new();
                for run in runs {
                    let mut run_builder = CssStyleBuilder::new();
                    if let Some(style) = &run.style {
                        run_builder.add_run_styles(style);
                    }
                    let run_class = self.namer.next(&format!("{class_name}_run"));
                    self.css.insert(run_class.clone(), run_builder);
                    let tag = run_tag(run);
                    content.push_str(&format!(
                        "<{tag} class=\"{run_class}\">{}</{tag}>",
                        escape_text(&run.text)
                    ));
                }
                content
            }
        };

        self.css.insert(class_name.clone(), builder);
        format!("\n<div class=\"{class_name}\">{content}</div>")
    }

    fn line(&mut self, node: &Node, parent: Option<&Node>) -> String {
        let mut builder = CssStyleBuilder::new();
        if parent.is_some() {
            builder.add_position_styles(node, parent);
        }
        builder.add_border_styles(node);

        let class_name = self.namer.next(&node.base.unique_name);
        self.css.insert(class_name.clone(), builder);
        format!("\n<div class=\"{class_name}\"></div>")
    }

    /// Centered flex box holding the SVG refit to the node's size.
    fn wrap_svg(&mut self, node: &Node, parent: Option<&Node>, svg: &str) -> String {
        let (width, height) = (node.base.width, node.base.height);
        let mut builder = CssStyleBuilder::new();
        if parent.is_some() {
            builder.add_position_styles(node, parent);
        }
        builder
            .add_style("width", px(width))
            .add_style("height", px(height))
            .add_style("display", "flex")
            .add_style("align-items", "center")
            .add_style("justify-content", "center");

        let class_name = self.namer.next(&node.base.unique_name);
        self.css.insert(class_name.clone(), builder);
        format!(
            "\n<div class=\"{class_name}\">{}</div>",
            fit_svg_to_box(svg, width, height)
        )
    }
}
