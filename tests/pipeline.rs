use std::collections::HashMap;
use std::sync::Mutex;

use f2c_lib::{
    load_document_json, BatchSettings, Config, ConversionSettings, Converter, F2cError,
    FigmaFileResponse, FigmaImageFormat, FigmaNodesResponse, FigmaSource, ImageExportOptions,
    Result,
};
use tempfile::TempDir;

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
const ICON_SVG: &str = "<svg width=\"24\" height=\"24\" viewBox=\"0 0 24 24\" fill=\"none\">\n  <path d=\"M0 0h24v24H0z\" fill=\"#FF0000\"/>\n</svg>";

const HERO_NODES: &str = r##"{
  "name": "Marketing Site",
  "nodes": {
    "1:1": {
      "document": {
        "id": "1:1",
        "name": "Hero",
        "type": "FRAME",
        "absoluteBoundingBox": {"x": 100, "y": 200, "width": 400, "height": 300},
        "layoutMode": "VERTICAL",
        "itemSpacing": 12,
        "paddingLeft": 16,
        "paddingRight": 16,
        "paddingTop": 16,
        "paddingBottom": 16,
        "fills": [{"type": "SOLID", "color": {"r": 1, "g": 1, "b": 1, "a": 1}}],
        "children": [
          {
            "id": "1:2",
            "name": "Title",
            "type": "TEXT",
            "characters": "Hello <World>",
            "absoluteBoundingBox": {"x": 116, "y": 216, "width": 200, "height": 32},
            "style": {"fontFamily": "Inter", "fontSize": 24, "fontWeight": 700}
          },
          {
            "id": "1:3",
            "name": "Icon",
            "type": "VECTOR",
            "absoluteBoundingBox": {"x": 116, "y": 260, "width": 24, "height": 24}
          },
          {
            "id": "1:4",
            "name": "Photo",
            "type": "RECTANGLE",
            "absoluteBoundingBox": {"x": 116, "y": 296, "width": 368, "height": 188},
            "fills": [{"type": "IMAGE", "imageRef": "abc", "scaleMode": "FILL"}]
          },
          {
            "id": "1:5",
            "name": "Hidden",
            "type": "RECTANGLE",
            "visible": false,
            "absoluteBoundingBox": {"x": 0, "y": 0, "width": 10, "height": 10}
          }
        ]
      }
    }
  }
}"##;

#[derive(Debug, Clone, PartialEq)]
struct Request {
    format: FigmaImageFormat,
    ids: Vec<String>,
}

/// Serves one canned `/nodes` answer plus render URLs and downloads.
#[derive(Default)]
struct CannedFigma {
    nodes: Option<FigmaNodesResponse>,
    renders: HashMap<String, String>,
    downloads: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<Request>>,
}

impl CannedFigma {
    fn hero() -> Self {
        let mut source = Self {
            nodes: Some(serde_json::from_str(HERO_NODES).unwrap()),
            ..Self::default()
        };
        source.renders.insert("1:3".into(), "https://cdn.test/icon.svg".into());
        source.renders.insert("1:4".into(), "https://cdn.test/photo.png".into());
        source
            .downloads
            .insert("https://cdn.test/icon.svg".into(), ICON_SVG.as_bytes().to_vec());
        source
            .downloads
            .insert("https://cdn.test/photo.png".into(), PNG_BYTES.to_vec());
        source
    }
}

impl FigmaSource for CannedFigma {
    async fn get_file(&self, _file_key: &str) -> Result<FigmaFileResponse> {
        Err(F2cError::figma_api(None, "files endpoint not canned"))
    }

    async fn get_file_nodes(&self, _file_key: &str, _ids: &[String]) -> Result<FigmaNodesResponse> {
        self.nodes
            .clone()
            .ok_or_else(|| F2cError::figma_api(None, "nodes endpoint not canned"))
    }

    async fn get_rendered_images(
        &self,
        _file_key: &str,
        node_ids: &[String],
        options: ImageExportOptions,
    ) -> Result<HashMap<String, Option<String>>> {
        self.requests.lock().unwrap().push(Request {
            format: options.format,
            ids: node_ids.to_vec(),
        });
        Ok(node_ids
            .iter()
            .map(|id| (id.clone(), self.renders.get(id).cloned()))
            .collect())
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        self.downloads
            .get(url)
            .cloned()
            .ok_or_else(|| F2cError::figma_api(None, format!("no body for {url}")))
    }
}

#[tokio::test]
async fn node_url_converts_to_linked_html_and_css() {
    let dir = TempDir::new().expect("tempdir");
    let converter = Converter::new(CannedFigma::hero(), &Config::default());

    let report = converter
        .convert_url(
            "https://www.figma.com/design/FILEKEY/Marketing-Site?node-id=1-1",
            dir.path(),
        )
        .await
        .expect("conversion succeeds");

    assert_eq!(report.name, "Hero");
    assert!(report.warnings.is_empty(), "unexpected warnings: {:?}", report.warnings);
    assert_eq!(report.html_path, dir.path().join("Hero").join("Hero.html"));
    assert_eq!(report.css_path, dir.path().join("Hero").join("Hero.css"));

    let html = std::fs::read_to_string(&report.html_path).expect("html written");
    assert!(html.starts_with("<!DOCTYPE html>\n<html lang=\"en\">"));
    assert!(html.contains("<title>Hero</title>"));
    assert!(html.contains("<link rel=\"stylesheet\" href=\"Hero.css\">"));
    assert!(html.contains("<div class=\"root-container hero\">"));
    assert!(html.contains("Hello &lt;World&gt;"));
    assert!(html.contains("M0 0h24v24H0z"));
    assert!(html.contains("data:image/png;base64,"));
    assert!(!html.contains("hidden"));

    let css = std::fs::read_to_string(&report.css_path).expect("css written");
    assert!(css.starts_with("/* Generated from Figma */"));
    assert!(css.contains(".hero {"));
    assert!(css.contains("flex-direction: column;"));
    assert!(css.contains("gap: 12px;"));
    assert!(css.contains(".title {"));

    let mut requests = converter.source().requests.lock().unwrap().clone();
    requests.sort_by(|a, b| a.ids.cmp(&b.ids));
    assert_eq!(
        requests,
        vec![
            Request {
                format: FigmaImageFormat::Svg,
                ids: vec!["1:3".into()],
            },
            Request {
                format: FigmaImageFormat::Png,
                ids: vec!["1:4".into()],
            },
        ]
    );
}

#[tokio::test]
async fn failed_downloads_degrade_to_placeholders() {
    let mut source = CannedFigma::hero();
    source.downloads.clear();
    let converter = Converter::new(source, &Config::default());

    let conversion = converter
        .convert("https://www.figma.com/file/FILEKEY/x?node-id=1%3A1")
        .await
        .expect("degraded output is still a success");

    assert!(conversion.warnings.contains(&"Download failed: 1:3".to_string()));
    assert!(conversion.warnings.contains(&"Download failed: 1:4".to_string()));
    assert!(conversion.html.contains("#F3F4F6"));
    assert!(conversion.html.contains("data:image/png;base64,iVBOR"));
}

#[tokio::test]
async fn preview_mode_makes_no_asset_requests() {
    let source = CannedFigma::hero();
    let settings = ConversionSettings {
        preview: true,
        ..ConversionSettings::default()
    };
    let converter = Converter::with_settings(source, settings, BatchSettings::default());

    let conversion = converter
        .convert("https://www.figma.com/design/FILEKEY/x?node-id=1-1")
        .await
        .expect("preview conversion");

    assert!(converter.source().requests.lock().unwrap().is_empty());
    assert!(conversion.html.contains("https://placehold.co/368x188"));
}

#[tokio::test]
async fn saved_json_renders_offline() {
    let document = load_document_json(HERO_NODES).expect("nodes response parses");
    assert_eq!(document.name, "Hero");

    let converter = Converter::with_settings(
        CannedFigma::default(),
        ConversionSettings::offline(),
        BatchSettings::default(),
    );
    let conversion = converter
        .render_document(document.roots, "local")
        .await
        .expect("offline conversion");

    assert!(converter.source().requests.lock().unwrap().is_empty());
    assert!(conversion.html.contains("placehold.co"));
    assert_eq!(conversion.stats.nodes_skipped, 1);
    assert!(conversion
        .warnings
        .contains(&"VECTOR not supported without vector embedding".to_string()));
}

#[tokio::test]
async fn unparsable_urls_are_config_errors() {
    let converter = Converter::new(CannedFigma::default(), &Config::default());
    let err = converter
        .convert("https://example.com/design/KEY")
        .await
        .expect_err("non-figma host");
    assert!(matches!(err, F2cError::Config(_)));
}
