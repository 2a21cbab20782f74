//! Figma document model as received from the REST API.
//!
//! - [`api_types`] - raw node records and endpoint responses
//! - [`metadata`] - identifier/order stamping and page/frame selection

pub mod api_types;
pub mod metadata;

pub use api_types::{
    FigmaFileResponse, FigmaImageResponse, FigmaNodeContainer, FigmaNodesResponse, RawNode,
};
pub use metadata::{best_frame, first_page, inject_forest_metadata, inject_metadata, sanitize_filename};
