//! End-to-end conversion: fetch, normalize, resolve assets, render, write.

use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::batch::BatchProcessor;
use crate::config::{BatchSettings, Config, ConversionSettings};
use crate::error::{F2cError, Result, Warnings};
use crate::figma::{
    best_frame, first_page, inject_forest_metadata, inject_metadata, sanitize_filename,
    FigmaFileResponse, FigmaNodesResponse, RawNode,
};
use crate::figma_client::{with_timeout, FigmaSource};
use crate::html::{escape_html, HtmlGenerator};
use crate::normalize::{normalize, NormalizeStats};
use crate::resource::{parse_figma_url, FigmaTarget};
use crate::svg::SvgRenderer;

const DEFAULT_NAME: &str = "figma_node";

/// Raw nodes selected for conversion plus the name used for output files.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub name: String,
    pub roots: Vec<RawNode>,
}

/// In-memory result of one conversion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    pub name: String,
    pub html: String,
    pub css: String,
    pub stats: NormalizeStats,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionReport {
    pub name: String,
    pub html_path: PathBuf,
    pub css_path: PathBuf,
    pub stats: NormalizeStats,
    pub warnings: Vec<String>,
}

pub struct Converter<S> {
    source: S,
    conversion: ConversionSettings,
    batch: BatchSettings,
}

impl<S: FigmaSource> Converter<S> {
    pub fn new(source: S, config: &Config) -> Self {
        Self::with_settings(source, config.conversion.clone(), config.batch.clone())
    }

    pub fn with_settings(source: S, conversion: ConversionSettings, batch: BatchSettings) -> Self {
        Self {
            source,
            conversion,
            batch,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn settings(&self) -> &ConversionSettings {
        &self.conversion
    }

    /// The requested node, or the best frame of the file's first page.
    pub async fn fetch(&self, target: &FigmaTarget) -> Result<FetchedDocument> {
        let timeout = self.batch.request_timeout;
        match &target.node_id {
            Some(node_id) => {
                let ids = [node_id.clone()];
                let response = with_timeout(
                    timeout,
                    self.source.get_file_nodes(&target.file_key, &ids),
                )
                .await?;
                let mut document = requested_node(response, node_id)?;
                inject_metadata(&mut document, &target.file_key, Some(node_id));
                Ok(FetchedDocument {
                    name: display_name(&document.name),
                    roots: vec![document],
                })
            }
            None => {
                let file = with_timeout(timeout, self.source.get_file(&target.file_key)).await?;
                let mut frame = select_frame(file)?;
                inject_metadata(&mut frame, &target.file_key, None);
                Ok(FetchedDocument {
                    name: display_name(&frame.name),
                    roots: vec![frame],
                })
            }
        }
    }

    pub async fn convert_url(&self, url: &str, output_dir: &Path) -> Result<ConversionReport> {
        let conversion = self.convert(url).await?;
        write_outputs(&conversion, output_dir)
    }

    /// Fetch and render `url` without writing anything.
    pub async fn convert(&self, url: &str) -> Result<Conversion> {
        let target = parse_figma_url(url).map_err(|e| F2cError::Config(e.to_string()))?;
        debug!(
            "converting file {} (node {})",
            target.file_key,
            target.node_id.as_deref().unwrap_or("<best frame>")
        );
        let document = self.fetch(&target).await?;
        self.render_injected(document.roots, &target.file_key, document.name)
            .await
    }

    /// Convert nodes that were fetched elsewhere and write the output files.
    pub async fn convert_document(
        &self,
        roots: Vec<RawNode>,
        file_key: &str,
        output_dir: &Path,
    ) -> Result<ConversionReport> {
        let conversion = self.render_document(roots, file_key).await?;
        write_outputs(&conversion, output_dir)
    }

    /// Convert nodes that were fetched elsewhere, in memory.
    pub async fn render_document(&self, mut roots: Vec<RawNode>, file_key: &str) -> Result<Conversion> {
        let name = roots
            .first()
            .map(|root| display_name(&root.name))
            .unwrap_or_else(|| DEFAULT_NAME.to_string());
        inject_forest_metadata(&mut roots, file_key);
        self.render_injected(roots, file_key, name).await
    }

    async fn render_injected(
        &self,
        roots: Vec<RawNode>,
        file_key: &str,
        name: String,
    ) -> Result<Conversion> {
        let normalized = normalize(&roots, &self.conversion);
        let stats = normalized.stats;
        let mut arena = normalized.arena;
        debug!(
            "normalized {} node(s), skipped {}, inlined {} frame(s)",
            stats.nodes_processed, stats.nodes_skipped, stats.groups_inlined
        );
        if arena.is_empty() {
            return Err(F2cError::conversion(format!(
                "'{name}' has no visible nodes to convert"
            )));
        }

        let mut warnings = Warnings::new();
        if self.conversion.embed_shapes && !self.conversion.preview {
            let renderer = SvgRenderer::new(&self.source, &self.batch)
                .with_color_variables(self.conversion.use_color_variables);
            warnings.extend(renderer.render_shapes(&mut arena, file_key).await.into_vec());
        }

        let processed = BatchProcessor::new(&self.source, &self.batch, &self.conversion)
            .process_batch(&arena, file_key)
            .await;

        let output = HtmlGenerator::new(&self.conversion).render(
            &arena,
            &processed,
            self.conversion.preview,
        );
        warnings.extend(output.warnings);

        if !warnings.is_empty() {
            warn!("{} conversion warning(s) for '{name}'", warnings.len());
            for warning in warnings.as_slice() {
                debug!("  {warning}");
            }
        }

        Ok(Conversion {
            name,
            html: output.html,
            css: output.css,
            stats,
            warnings: warnings.into_vec(),
        })
    }
}

fn display_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

fn requested_node(response: FigmaNodesResponse, node_id: &str) -> Result<RawNode> {
    let mut nodes = response.nodes;
    nodes
        .remove(node_id)
        .or_else(|| nodes.remove(&node_id.replace(':', "-")))
        .flatten()
        .map(|container| container.document)
        .ok_or_else(|| {
            F2cError::figma_api(None, format!("node {node_id} was not found in the file"))
        })
}

fn select_frame(file: FigmaFileResponse) -> Result<RawNode> {
    let page = first_page(&file.document)
        .ok_or_else(|| F2cError::conversion("the file has no pages"))?;
    best_frame(page)
        .cloned()
        .ok_or_else(|| F2cError::conversion(format!("page '{}' has no frames", page.name)))
}

/// Roots and name from saved JSON: a `/nodes` response, a `/files` response, a
/// node array, or a single node.
pub fn load_document_json(raw: &str) -> Result<FetchedDocument> {
    let value: Value = serde_json::from_str(raw)?;

    if value.get("nodes").is_some_and(Value::is_object) {
        let response: FigmaNodesResponse = serde_json::from_value(value)?;
        let mut entries: Vec<(String, RawNode)> = response
            .nodes
            .into_iter()
            .filter_map(|(id, container)| container.map(|c| (id, c.document)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let roots: Vec<RawNode> = entries.into_iter().map(|(_, node)| node).collect();
        let name = roots
            .first()
            .map(|root| display_name(&root.name))
            .or(response.name)
            .unwrap_or_else(|| DEFAULT_NAME.to_string());
        return Ok(FetchedDocument { name, roots });
    }

    if value.get("document").is_some() {
        let file: FigmaFileResponse = serde_json::from_value(value)?;
        let frame = select_frame(file)?;
        return Ok(FetchedDocument {
            name: display_name(&frame.name),
            roots: vec![frame],
        });
    }

    let roots: Vec<RawNode> = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };
    let name = roots
        .first()
        .map(|root| display_name(&root.name))
        .unwrap_or_else(|| DEFAULT_NAME.to_string());
    Ok(FetchedDocument { name, roots })
}

/// Standalone HTML5 page linking `css_file`.
pub fn complete_html(body: &str, css_file: &str, title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"UTF-8\">\n    \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    \
         <title>{}</title>\n    <link rel=\"stylesheet\" href=\"{css_file}\">\n</head>\n\
         <body>\n{body}\n</body>\n</html>\n",
        escape_html(title)
    )
}

/// Write `<stem>.html` and `<stem>.css` into `<output_dir>/<stem>/`.
pub fn write_outputs(conversion: &Conversion, output_dir: &Path) -> Result<ConversionReport> {
    let stem = sanitize_filename(&conversion.name);
    let dir = output_dir.join(&stem);
    std::fs::create_dir_all(&dir)?;

    let css_file = format!("{stem}.css");
    let html_path = dir.join(format!("{stem}.html"));
    let css_path = dir.join(&css_file);
    std::fs::write(
        &html_path,
        complete_html(&conversion.html, &css_file, &conversion.name),
    )?;
    std::fs::write(&css_path, &conversion.css)?;
    info!("wrote {} and {}", html_path.display(), css_path.display());

    Ok(ConversionReport {
        name: conversion.name.clone(),
        html_path,
        css_path,
        stats: conversion.stats,
        warnings: conversion.warnings.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figma::FigmaNodeContainer;
    use crate::figma_client::fake::FakeSource;
    use crate::types::{NodeType, Paint};
    use std::collections::HashMap;

    fn scene() -> RawNode {
        let mut photo = RawNode::new("1:3", "Photo", NodeType::Rectangle).with_bbox(10.0, 10.0, 40.0, 30.0);
        photo.fills = vec![Paint::image("ref")];
        RawNode::new("1:1", "Landing Page", NodeType::Frame)
            .with_bbox(0.0, 0.0, 200.0, 100.0)
            .with_children(vec![
                RawNode::new("1:2", "Title", NodeType::Text).with_bbox(10.0, 50.0, 80.0, 20.0),
                photo,
            ])
    }

    fn offline() -> Converter<FakeSource> {
        Converter::with_settings(
            FakeSource::default(),
            ConversionSettings::offline(),
            BatchSettings::default(),
        )
    }

    #[tokio::test]
    async fn convert_document_writes_linked_files() {
        let dir = tempfile::tempdir().unwrap();
        let report = offline()
            .convert_document(vec![scene()], "KEY", dir.path())
            .await
            .unwrap();

        assert_eq!(report.name, "Landing Page");
        assert_eq!(report.html_path, dir.path().join("Landing_Page/Landing_Page.html"));
        let html = std::fs::read_to_string(&report.html_path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<link rel=\"stylesheet\" href=\"Landing_Page.css\">"));
        assert!(html.contains("<title>Landing Page</title>"));
        assert!(html.contains("class=\"root-container landing_page\""));
        let css = std::fs::read_to_string(&report.css_path).unwrap();
        assert!(css.contains(".title {"));
        assert_eq!(report.stats.nodes_processed, 3);
    }

    #[tokio::test]
    async fn node_urls_fetch_only_that_node() {
        let nodes = FigmaNodesResponse {
            name: Some("File".into()),
            nodes: HashMap::from([(
                "1:1".to_string(),
                Some(FigmaNodeContainer { document: scene() }),
            )]),
        };
        let source = FakeSource::default()
            .with_nodes(nodes)
            .with_render("1:3", "https://cdn/photo.png");
        let converter = Converter::with_settings(
            source,
            ConversionSettings::default(),
            BatchSettings::default(),
        );

        let dir = tempfile::tempdir().unwrap();
        let report = converter
            .convert_url("https://www.figma.com/design/KEY/Site?node-id=1-1", dir.path())
            .await
            .unwrap();

        let html = std::fs::read_to_string(&report.html_path).unwrap();
        assert!(html.contains("data:image/png;base64,iVBOR"));
        assert!(report.warnings.iter().any(|w| w == "Download failed: 1:3"));
        assert_eq!(converter.source().image_requests()[0].file_key, "KEY");
    }

    #[tokio::test]
    async fn missing_node_is_an_error() {
        let source = FakeSource::default().with_nodes(FigmaNodesResponse::default());
        let converter = Converter::with_settings(
            source,
            ConversionSettings::offline(),
            BatchSettings::default(),
        );
        let err = converter
            .fetch(&FigmaTarget {
                file_key: "KEY".into(),
                node_id: Some("9:9".into()),
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("9:9"));
    }

    #[tokio::test]
    async fn file_urls_pick_the_best_frame() {
        let small = RawNode::new("2:1", "Small", NodeType::Frame)
            .with_bbox(0.0, 0.0, 10.0, 10.0)
            .with_children(vec![
                RawNode::new("2:2", "Dot", NodeType::Rectangle).with_bbox(0.0, 0.0, 2.0, 2.0)
            ]);
        let page = RawNode::new("0:1", "Page 1", NodeType::Canvas)
            .with_children(vec![small, scene()]);
        let document = RawNode::new("0:0", "Document", NodeType::Document).with_children(vec![page]);
        let source = FakeSource::default().with_file(FigmaFileResponse {
            name: Some("File".into()),
            last_modified: None,
            document,
        });
        let converter = Converter::with_settings(
            source,
            ConversionSettings::offline(),
            BatchSettings::default(),
        );

        let fetched = converter
            .fetch(&FigmaTarget {
                file_key: "KEY".into(),
                node_id: None,
            })
            .await
            .unwrap();
        assert_eq!(fetched.name, "Landing Page");
        assert_eq!(fetched.roots[0].file_key.as_deref(), Some("KEY"));
    }

    #[tokio::test]
    async fn invisible_forest_produces_nothing_usable() {
        let mut hidden = scene();
        hidden.visible = false;
        let err = offline()
            .render_document(vec![hidden], "KEY")
            .await
            .unwrap_err();
        assert!(matches!(err, F2cError::Conversion(_)));
    }

    #[test]
    fn loads_every_saved_json_shape() {
        let nodes = r#"{"name":"F","nodes":{"1:1":{"document":{"id":"1:1","name":"Card","type":"FRAME"}}}}"#;
        let doc = load_document_json(nodes).unwrap();
        assert_eq!(doc.name, "Card");
        assert_eq!(doc.roots.len(), 1);

        let array = r#"[{"id":"1:1","name":"A","type":"RECTANGLE"},{"id":"1:2","name":"B","type":"TEXT"}]"#;
        assert_eq!(load_document_json(array).unwrap().roots.len(), 2);

        let single = r#"{"id":"1:1","name":"  ","type":"RECTANGLE"}"#;
        assert_eq!(load_document_json(single).unwrap().name, DEFAULT_NAME);

        assert!(load_document_json("not json").is_err());
    }
}
