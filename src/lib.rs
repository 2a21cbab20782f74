//! Figma to Code (f2c) Library
//!
//! Converts Figma design trees into standalone HTML and CSS, and optionally
//! into React/TSX components through a text-completion backend.
//!
//! # Module Overview
//!
//! - [`figma_client`] - Figma REST API access behind the [`FigmaSource`] trait
//! - [`figma`] - Raw API node types, metadata injection and frame selection
//! - [`normalize`] - Raw nodes to the normalized [`NodeArena`]
//! - [`style`] - Per-node CSS declarations
//! - [`svg`] / [`image_processor`] / [`batch`] - SVG and image asset resolution
//! - [`html`] - HTML and CSS emission
//! - [`pipeline`] - End-to-end conversion and output files
//! - [`codegen`] - React generation
//! - [`config`] - Configuration file support
//! - [`output`] - JSON output schemas
//!
//! # Example
//!
//! ```no_run
//! use f2c_lib::{Config, Converter, FigmaAuth, FigmaClient};
//!
//! # async fn example() -> f2c_lib::Result<()> {
//! let config = Config::default();
//! let auth = FigmaAuth::resolve(None).expect("FIGMA_TOKEN is set");
//! let converter = Converter::new(FigmaClient::new(auth)?, &config);
//! let report = converter
//!     .convert_url("https://www.figma.com/design/KEY/Site?node-id=1-2", "out".as_ref())
//!     .await?;
//! println!("{}", report.html_path.display());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod codegen;
pub mod config;
pub mod error;
pub mod figma;
pub mod figma_client;
pub mod html;
pub mod icon;
pub mod image_processor;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod resource;
pub mod style;
pub mod svg;
pub mod types;

pub use batch::{BatchProcessor, ProcessedResult, ProcessedResults, ResultKind};
pub use codegen::{
    ChatMessage, MockCompletion, OpenAiCompletion, OpenAiConfig, ReactComponent, ReactGenerator,
    Role, TextCompletion,
};
pub use config::{BatchSettings, CompletionSettings, Config, ConversionSettings, FigmaSettings};
pub use error::{ErrorCategory, ErrorPayload, F2cError, RenderWarning, Result, Warnings};
pub use figma::{FigmaFileResponse, FigmaImageResponse, FigmaNodesResponse, RawNode};
pub use figma_client::{
    FigmaAuth, FigmaClient, FigmaImageFormat, FigmaSource, ImageExportOptions, OfflineSource,
};
pub use html::{HtmlGenerator, HtmlOutput};
pub use normalize::{normalize, NormalizeStats, Normalized};
pub use output::{ConvertOutput, ErrorOutput, F2cOutput, InfoOutput, F2C_OUTPUT_VERSION};
pub use pipeline::{load_document_json, Conversion, ConversionReport, Converter, FetchedDocument};
pub use resource::{parse_figma_url, FigmaTarget, ResourceParseError};
pub use style::CssStyleBuilder;
pub use types::{Node, NodeArena, NodeId, NodeKind, NodeType};
