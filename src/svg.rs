//! Shape rendering through the Figma SVG export, plus the SVG text
//! transforms shared with the batch processor and the HTML generator.

use log::{debug, warn};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

use crate::config::BatchSettings;
use crate::error::{F2cError, RenderWarning, Result, Warnings};
use crate::figma_client::{with_timeout, FigmaSource, ImageExportOptions};
use crate::style::fmt_num;
use crate::types::{ColorVariableMapping, Node, NodeArena, NodeType};

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Neutral "broken" glyph used when an SVG could not be fetched.
pub fn svg_placeholder(width: f64, height: f64) -> String {
    let (w, h) = (fmt_num(width), fmt_num(height));
    format!(
        "<svg width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" fill=\"none\" \
         xmlns=\"{SVG_NAMESPACE}\"><rect width=\"{w}\" height=\"{h}\" fill=\"#F3F4F6\"/>\
         <path d=\"M8 8L16 16M16 8L8 16\" stroke=\"#9CA3AF\" stroke-width=\"2\" \
         stroke-linecap=\"round\"/></svg>"
    )
}

/// Drop inter-tag whitespace and surrounding blank lines.
pub fn collapse_whitespace(svg: &str) -> String {
    static BETWEEN_TAGS_RE: OnceLock<Regex> = OnceLock::new();
    let re = BETWEEN_TAGS_RE
        .get_or_init(|| Regex::new(r">\s+<").expect("inter-tag whitespace regex should compile"));
    re.replace_all(svg.trim(), "><").into_owned()
}

fn lookup_variable<'m>(
    mappings: &'m HashMap<String, ColorVariableMapping>,
    color: &str,
) -> Option<&'m str> {
    mappings
        .get(&color.trim().to_lowercase())
        .map(|mapping| mapping.variable_name.as_str())
        .filter(|name| !name.is_empty())
}

/// Rewrite mapped `fill`/`stroke` colors to `var(--name, original)`.
///
/// Both attributes and inline `style` declarations are rewritten; lookups are
/// case-insensitive and whitespace-trimmed, unmapped colors are left alone.
pub fn apply_color_variables(
    svg: &str,
    mappings: &HashMap<String, ColorVariableMapping>,
) -> String {
    if mappings.is_empty() {
        return svg.to_string();
    }

    static ATTRIBUTE_RE: OnceLock<Regex> = OnceLock::new();
    static STYLE_RE: OnceLock<Regex> = OnceLock::new();
    static DECLARATION_RE: OnceLock<Regex> = OnceLock::new();
    let attribute_re = ATTRIBUTE_RE.get_or_init(|| {
        Regex::new(r#"(fill|stroke)="([^"]*)""#).expect("color attribute regex should compile")
    });
    let style_re = STYLE_RE.get_or_init(|| {
        Regex::new(r#"style="([^"]*)""#).expect("style attribute regex should compile")
    });
    let declaration_re = DECLARATION_RE.get_or_init(|| {
        Regex::new(r"(^|;)(\s*)(fill|stroke)\s*:\s*([^;]*)")
            .expect("style color regex should compile")
    });

    let with_attributes = attribute_re.replace_all(svg, |caps: &Captures| {
        let color = &caps[2];
        match lookup_variable(mappings, color) {
            Some(name) => format!("{}=\"var(--{name}, {color})\"", &caps[1]),
            None => caps[0].to_string(),
        }
    });

    style_re
        .replace_all(&with_attributes, |caps: &Captures| {
            let declarations = declaration_re.replace_all(&caps[1], |decl: &Captures| {
                let color = &decl[4];
                match lookup_variable(mappings, color) {
                    Some(name) => format!(
                        "{}{}{}: var(--{name}, {color})",
                        &decl[1], &decl[2], &decl[3]
                    ),
                    None => decl[0].to_string(),
                }
            });
            format!("style=\"{declarations}\"")
        })
        .into_owned()
}

fn svg_attribute_re(name: &'static str) -> &'static Regex {
    static WIDTH_RE: OnceLock<Regex> = OnceLock::new();
    static HEIGHT_RE: OnceLock<Regex> = OnceLock::new();
    static VIEWBOX_RE: OnceLock<Regex> = OnceLock::new();
    let cell = match name {
        "width" => &WIDTH_RE,
        "height" => &HEIGHT_RE,
        _ => &VIEWBOX_RE,
    };
    cell.get_or_init(|| {
        Regex::new(&format!(r#"(^|\s){name}=["']([^"']*)["']"#))
            .expect("svg attribute regex should compile")
    })
}

/// Numeric part of a length such as `24px`.
fn parse_length(raw: &str) -> Option<f64> {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().ok()
}

fn set_attribute(attrs: String, name: &'static str, value: &str) -> String {
    let re = svg_attribute_re(name);
    if re.is_match(&attrs) {
        re.replace(&attrs, |caps: &Captures| format!("{}{name}=\"{value}\"", &caps[1]))
            .into_owned()
    } else {
        format!("{attrs} {name}=\"{value}\"")
    }
}

/// Fit the root `<svg>` into a `width`×`height` box.
///
/// The viewBox is scaled uniformly by the smaller of the two axis ratios and
/// centered, so the aspect ratio is preserved.
pub fn fit_svg_to_box(svg: &str, width: f64, height: f64) -> String {
    static SVG_TAG_RE: OnceLock<Regex> = OnceLock::new();
    let tag_re = SVG_TAG_RE
        .get_or_init(|| Regex::new(r"<svg([^>]*)>").expect("svg tag regex should compile"));

    let Some(caps) = tag_re.captures(svg) else {
        return svg.to_string();
    };
    let Some(whole) = caps.get(0) else {
        return svg.to_string();
    };
    let raw_attrs = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let (attrs, self_closing) = match raw_attrs.trim_end().strip_suffix('/') {
        Some(open) => (open.trim_end(), true),
        None => (raw_attrs, false),
    };

    let attribute = |name: &'static str| {
        svg_attribute_re(name)
            .captures(attrs)
            .and_then(|c| c.get(2))
            .map(|m| m.as_str().to_string())
    };
    let original_width = attribute("width")
        .and_then(|v| parse_length(&v))
        .unwrap_or(width);
    let original_height = attribute("height")
        .and_then(|v| parse_length(&v))
        .unwrap_or(height);

    let view_box: Vec<f64> = attribute("viewBox")
        .map(|v| {
            v.split(|c: char| c.is_whitespace() || c == ',')
                .filter(|part| !part.is_empty())
                .filter_map(|part| part.parse().ok())
                .collect()
        })
        .unwrap_or_default();
    let (vb_x, vb_y, vb_w, vb_h) = match view_box.as_slice() {
        [x, y, w, h, ..] => (*x, *y, *w, *h),
        _ => (0.0, 0.0, original_width, original_height),
    };

    let scale_x = if vb_w > 0.0 { width / vb_w } else { 1.0 };
    let scale_y = if vb_h > 0.0 { height / vb_h } else { 1.0 };
    let scale = scale_x.min(scale_y);
    let new_w = vb_w * scale;
    let new_h = vb_h * scale;
    let new_x = vb_x + (vb_w - new_w) / 2.0;
    let new_y = vb_y + (vb_h - new_h) / 2.0;

    let mut new_attrs = attrs.to_string();
    new_attrs = set_attribute(new_attrs, "width", &fmt_num(width));
    new_attrs = set_attribute(new_attrs, "height", &fmt_num(height));
    new_attrs = set_attribute(
        new_attrs,
        "viewBox",
        &format!(
            "{} {} {} {}",
            fmt_num(new_x),
            fmt_num(new_y),
            fmt_num(new_w),
            fmt_num(new_h)
        ),
    );
    if !new_attrs.contains("xmlns=") {
        new_attrs.push_str(&format!(" xmlns=\"{SVG_NAMESPACE}\""));
    }

    let mut out = String::with_capacity(svg.len() + 64);
    out.push_str(&svg[..whole.start()]);
    out.push_str("<svg");
    out.push_str(&new_attrs);
    out.push_str(if self_closing { "/>" } else { ">" });
    out.push_str(&svg[whole.end()..]);
    out
}

/// Shapes that are exported as SVG instead of rendered as boxes.
pub fn is_shape(node: &Node) -> bool {
    matches!(node.node_type(), NodeType::Ellipse | NodeType::RegularPolygon)
}

fn is_renderable(node: &Node) -> bool {
    node.base.visible && node.base.opacity != 0.0 && node.base.width > 0.0 && node.base.height > 0.0
}

pub fn render_failure(node: &Node) -> RenderWarning {
    RenderWarning::new(format!(
        "SVG rendering failed: {} ({})",
        node.base.name,
        node.node_type()
    ))
}

/// Renders ELLIPSE and REGULAR_POLYGON nodes through a [`FigmaSource`].
pub struct SvgRenderer<'a, S> {
    source: &'a S,
    request_timeout: Duration,
    use_color_variables: bool,
}

impl<'a, S: FigmaSource> SvgRenderer<'a, S> {
    pub fn new(source: &'a S, settings: &BatchSettings) -> Self {
        Self {
            source,
            request_timeout: settings.request_timeout,
            use_color_variables: true,
        }
    }

    pub fn with_color_variables(mut self, enabled: bool) -> Self {
        self.use_color_variables = enabled;
        self
    }

    /// Attach the exported SVG to `node`.
    ///
    /// A node that already carries SVG is left untouched. On failure the node
    /// is unchanged and the returned warning names it.
    pub async fn render_shape_as_svg(
        &self,
        node: &mut Node,
        file_key: &str,
    ) -> std::result::Result<(), RenderWarning> {
        if node.base.svg.is_some() {
            return Ok(());
        }
        if !is_renderable(node) {
            debug!(
                "shape {} is not renderable (hidden, transparent or empty)",
                node.export_id()
            );
            return Err(render_failure(node));
        }

        let node_id = node.export_id().to_string();
        let svg = match self.export_svg(file_key, &node_id).await {
            Ok(svg) => svg,
            Err(err) => {
                warn!("SVG export for {node_id} failed: {err}");
                return Err(render_failure(node));
            }
        };

        let svg = if self.use_color_variables {
            apply_color_variables(&svg, &node.base.color_variable_mappings)
        } else {
            svg
        };
        node.base.svg = Some(collapse_whitespace(&svg));
        node.base.can_be_flattened = true;
        debug!("rendered shape {} ({}) as SVG", node.base.name, node_id);
        Ok(())
    }

    async fn export_svg(&self, file_key: &str, node_id: &str) -> Result<String> {
        let ids = [node_id.to_string()];
        let images = with_timeout(
            self.request_timeout,
            self.source
                .get_rendered_images(file_key, &ids, ImageExportOptions::svg()),
        )
        .await?;
        let url = images
            .get(node_id)
            .cloned()
            .flatten()
            .ok_or_else(|| F2cError::figma_api(None, format!("no SVG render for {node_id}")))?;
        let bytes = with_timeout(self.request_timeout, self.source.download(&url)).await?;
        String::from_utf8(bytes)
            .map_err(|_| F2cError::conversion(format!("SVG for {node_id} is not UTF-8")))
    }

    /// Render every shape in the arena, in document order.
    pub async fn render_shapes(&self, arena: &mut NodeArena, file_key: &str) -> Warnings {
        let mut warnings = Warnings::new();
        let shapes: Vec<_> = arena
            .depth_first()
            .into_iter()
            .filter(|id| is_shape(&arena[*id]))
            .collect();

        for id in shapes {
            let node = &mut arena[id];
            let key = node.base.file_key.clone().unwrap_or_else(|| file_key.to_string());
            if let Err(warning) = self.render_shape_as_svg(node, &key).await {
                warnings.push(warning);
            }
        }
        warnings
    }
}
