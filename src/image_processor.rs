//! Image fill handling: where an image goes and which URL it uses.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use serde::Serialize;

use crate::batch::ProcessedResult;
use crate::config::ConversionSettings;
use crate::types::Node;

/// 1×1 transparent PNG substituted for images that could not be fetched.
pub const PNG_PLACEHOLDER: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

const PLACEHOLDER_SERVICE: &str = "https://placehold.co";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImagePlacement {
    /// `<img src>` replacing the element.
    Tag,
    /// `background-image` behind the element's children.
    Background,
}

/// An image fill never replaces child content.
pub fn image_placement(has_children: bool) -> ImagePlacement {
    if has_children {
        ImagePlacement::Background
    } else {
        ImagePlacement::Tag
    }
}

/// Sized placeholder for images that were never requested.
pub fn placeholder_url(width: f64, height: f64) -> String {
    let side = |value: f64| value.round().max(1.0) as u64;
    format!("{PLACEHOLDER_SERVICE}/{}x{}", side(width), side(height))
}

fn mime_type(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Ico => "image/x-icon",
        _ => "application/octet-stream",
    }
}

/// Base64 data URI for downloaded image bytes, typed by their magic number.
pub fn data_uri(bytes: &[u8]) -> String {
    let mime = image::guess_format(bytes)
        .map(mime_type)
        .unwrap_or("image/png");
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageNodeOutput {
    pub url: String,
    pub placement: ImagePlacement,
    pub tag: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_attr: Option<String>,
}

/// Decide tag and URL for a node with an image fill.
///
/// A batch result wins (its content is already the placeholder when the
/// fetch failed); without one the node gets a sized placeholder URL.
pub fn process_image_node(
    node: &Node,
    has_children: bool,
    result: Option<&ProcessedResult>,
    settings: &ConversionSettings,
) -> ImageNodeOutput {
    let url = match result {
        Some(result) if settings.embed_images && !settings.preview => result.content.clone(),
        _ => placeholder_url(node.base.width, node.base.height),
    };

    match image_placement(has_children) {
        ImagePlacement::Tag => ImageNodeOutput {
            src_attr: Some(format!("src=\"{url}\"")),
            background_image: None,
            tag: "img",
            placement: ImagePlacement::Tag,
            url,
        },
        ImagePlacement::Background => ImageNodeOutput {
            background_image: Some(format!("url('{url}')")),
            src_attr: None,
            tag: "div",
            placement: ImagePlacement::Background,
            url,
        },
    }
}
