//! Batch Processor.
//!
//! Resolves every SVG and image a conversion needs before HTML generation:
//! one render request per `(file_key, format)` group, then one download per
//! returned URL, both fanned out with at most `worker_count` calls in flight.
//! Failures degrade to placeholders.

use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::config::{BatchSettings, ConversionSettings};
use crate::error::Warnings;
use crate::figma_client::{with_timeout, FigmaImageFormat, FigmaSource, ImageExportOptions};
use crate::image_processor::{data_uri, PNG_PLACEHOLDER};
use crate::svg::{apply_color_variables, collapse_whitespace, is_shape, svg_placeholder};
use crate::types::{ColorVariableMapping, NodeArena};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    Svg,
    Image,
}

impl ResultKind {
    fn export_options(self, scale: f32) -> ImageExportOptions {
        match self {
            ResultKind::Svg => ImageExportOptions::svg(),
            ResultKind::Image => ImageExportOptions::png(scale),
        }
    }

    fn format(self) -> FigmaImageFormat {
        match self {
            ResultKind::Svg => FigmaImageFormat::Svg,
            ResultKind::Image => FigmaImageFormat::Png,
        }
    }
}

/// Rendered content for one node: inline SVG markup or an image URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedResult {
    pub success: bool,
    pub content: String,
    pub kind: ResultKind,
}

impl ProcessedResult {
    pub fn success(kind: ResultKind, content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: content.into(),
            kind,
        }
    }

    pub fn failure(kind: ResultKind, placeholder: impl Into<String>) -> Self {
        Self {
            success: false,
            content: placeholder.into(),
            kind,
        }
    }
}

/// Results of one batch run keyed by export node id.
#[derive(Debug, Clone, Default)]
pub struct ProcessedResults {
    results: HashMap<String, ProcessedResult>,
    pub warnings: Warnings,
}

impl ProcessedResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node_id: &str) -> Option<&ProcessedResult> {
        self.results.get(node_id)
    }

    pub fn insert(&mut self, node_id: impl Into<String>, result: ProcessedResult) {
        self.results.insert(node_id.into(), result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn failures(&self) -> usize {
        self.results.values().filter(|r| !r.success).count()
    }
}

#[derive(Debug, Clone)]
struct ExportRequest {
    node_id: String,
    file_key: String,
    kind: ResultKind,
    width: f64,
    height: f64,
    color_variables: HashMap<String, ColorVariableMapping>,
}

impl ExportRequest {
    fn placeholder(&self) -> ProcessedResult {
        match self.kind {
            ResultKind::Svg => {
                ProcessedResult::failure(self.kind, svg_placeholder(self.width, self.height))
            }
            ResultKind::Image => ProcessedResult::failure(self.kind, PNG_PLACEHOLDER),
        }
    }
}

pub struct BatchProcessor<'a, S> {
    source: &'a S,
    worker_count: usize,
    request_timeout: Duration,
    export_scale: f32,
    conversion: ConversionSettings,
}

impl<'a, S: FigmaSource> BatchProcessor<'a, S> {
    pub fn new(source: &'a S, batch: &BatchSettings, conversion: &ConversionSettings) -> Self {
        Self {
            source,
            worker_count: batch.worker_count.max(1),
            request_timeout: batch.request_timeout,
            export_scale: batch.export_scale,
            conversion: conversion.clone(),
        }
    }

    /// Fetch every pending SVG and image in `arena`.
    ///
    /// `file_key` is used for nodes that carry no key of their own.
    pub async fn process_batch(&self, arena: &NodeArena, file_key: &str) -> ProcessedResults {
        let mut results = ProcessedResults::new();
        if !self.conversion.needs_batch() {
            return results;
        }

        let requests = self.collect_requests(arena, file_key);
        if requests.is_empty() {
            return results;
        }

        let mut groups: IndexMap<(String, ResultKind), Vec<ExportRequest>> = IndexMap::new();
        for request in requests {
            groups
                .entry((request.file_key.clone(), request.kind))
                .or_default()
                .push(request);
        }
        debug!(
            "batch: {} render groups across {} worker(s)",
            groups.len(),
            self.worker_count
        );

        let rendered: Vec<_> = stream::iter(groups.into_iter())
            .map(|((key, kind), group)| async move {
                let ids: Vec<String> = group.iter().map(|r| r.node_id.clone()).collect();
                let urls = with_timeout(
                    self.request_timeout,
                    self.source
                        .get_rendered_images(&key, &ids, kind.export_options(self.export_scale)),
                )
                .await;
                (key, kind, group, urls)
            })
            .buffer_unordered(self.worker_count)
            .collect()
            .await;

        let mut downloads = Vec::new();
        for (key, kind, group, urls) in rendered {
            match urls {
                Ok(urls) => {
                    for request in group {
                        match urls.get(&request.node_id).cloned().flatten() {
                            Some(url) => downloads.push((request, url)),
                            None => {
                                results
                                    .warnings
                                    .push(format!("No render URL: {}", request.node_id));
                                results.insert(request.node_id.clone(), request.placeholder());
                            }
                        }
                    }
                }
                Err(err) => {
                    warn!(
                        "{} render request for {key} failed: {err}",
                        kind.format().as_str()
                    );
                    for request in group {
                        results
                            .warnings
                            .push(format!("API call failed: {} ({key})", request.node_id));
                        results.insert(request.node_id.clone(), request.placeholder());
                    }
                }
            }
        }

        let fetched: Vec<_> = stream::iter(downloads.into_iter())
            .map(|(request, url)| async move {
                let body = with_timeout(self.request_timeout, self.source.download(&url)).await;
                (request, body)
            })
            .buffer_unordered(self.worker_count)
            .collect()
            .await;

        for (request, body) in fetched {
            let result = match body {
                Ok(bytes) => self.finish(&request, bytes),
                Err(err) => {
                    warn!("download for {} failed: {err}", request.node_id);
                    Err(format!("Download failed: {}", request.node_id))
                }
            };
            match result {
                Ok(result) => results.insert(request.node_id, result),
                Err(warning) => {
                    results.warnings.push(warning);
                    results.insert(request.node_id.clone(), request.placeholder());
                }
            }
        }

        debug!(
            "batch: {} results, {} placeholders",
            results.len(),
            results.failures()
        );
        results
    }

    fn finish(
        &self,
        request: &ExportRequest,
        bytes: Vec<u8>,
    ) -> std::result::Result<ProcessedResult, String> {
        match request.kind {
            ResultKind::Svg => {
                let svg = String::from_utf8(bytes)
                    .map_err(|_| format!("SVG is not valid UTF-8: {}", request.node_id))?;
                let svg = if self.conversion.use_color_variables {
                    apply_color_variables(&svg, &request.color_variables)
                } else {
                    svg
                };
                Ok(ProcessedResult::success(
                    ResultKind::Svg,
                    collapse_whitespace(&svg),
                ))
            }
            ResultKind::Image => Ok(ProcessedResult::success(ResultKind::Image, data_uri(&bytes))),
        }
    }

    /// Depth-first in emission order, one request per node id. Subtrees of
    /// nodes exported as a single SVG are not visited.
    fn collect_requests(&self, arena: &NodeArena, file_key: &str) -> Vec<ExportRequest> {
        let mut requests = Vec::new();
        let mut seen = HashSet::new();
        let mut stack: Vec<_> = arena.roots().iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            let node = &arena[id];
            let sized = node.base.width > 0.0 && node.base.height > 0.0;
            let kind = if self.conversion.embed_vectors
                && node.base.can_be_flattened
                && node.base.svg.is_none()
                && !is_shape(node)
            {
                Some(ResultKind::Svg)
            } else if self.conversion.embed_images && node.has_image_fill() {
                Some(ResultKind::Image)
            } else {
                None
            };

            if let Some(kind) = kind.filter(|_| sized) {
                let node_id = node.export_id().to_string();
                if seen.insert(node_id.clone()) {
                    requests.push(ExportRequest {
                        file_key: node
                            .base
                            .file_key
                            .clone()
                            .unwrap_or_else(|| file_key.to_string()),
                        node_id,
                        kind,
                        width: node.base.width,
                        height: node.base.height,
                        color_variables: node.base.color_variable_mappings.clone(),
                    });
                }
            }

            if kind == Some(ResultKind::Svg) {
                continue;
            }
            stack.extend(arena.children_of(id).iter().rev().copied());
        }
        requests
    }
}
