use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::ParseError;

#[derive(Debug, Error)]
pub enum F2cError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),

    #[error("Figma API error (status: {status:?}): {message}")]
    FigmaApi {
        status: Option<StatusCode>,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl F2cError {
    pub fn figma_api(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        F2cError::FigmaApi {
            status,
            message: message.into(),
        }
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        F2cError::Conversion(message.into())
    }

    pub fn completion(message: impl Into<String>) -> Self {
        F2cError::Completion(message.into())
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            F2cError::Io(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check file paths/permissions and that the output directory is writable.",
            ),
            F2cError::Network(e) => ErrorPayload::new(
                ErrorCategory::Network,
                e.to_string(),
                "Check connectivity/proxy/VPN and retry.",
            ),
            F2cError::InvalidUrl(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Verify the URL format (e.g., https://www.figma.com/design/<FILE_KEY>/...).",
            ),
            F2cError::FigmaApi { status, message } => ErrorPayload::new(
                ErrorCategory::Figma,
                format!("Figma API error (status {:?}): {}", status, message),
                "Check FIGMA_TOKEN/URL and rate limits; retry after waiting.",
            ),
            F2cError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check the JSON input; run with --verbose for details.",
            ),
            F2cError::Config(msg) => config_payload(msg),
            F2cError::Conversion(msg) => ErrorPayload::new(
                ErrorCategory::Conversion,
                msg.to_string(),
                "Make sure the selected node is visible and has a non-empty bounding box.",
            ),
            F2cError::Completion(msg) => ErrorPayload::new(
                ErrorCategory::Completion,
                msg.to_string(),
                "Set F2C_COMPLETION_API_KEY (or OPENAI_API_KEY) and check the completion endpoint.",
            ),
            F2cError::Unknown(msg) => ErrorPayload::new(
                ErrorCategory::Unknown,
                msg.to_string(),
                "Re-run with --verbose; file an issue if persistent.",
            ),
        }
    }
}

fn config_payload(msg: &str) -> ErrorPayload {
    let lower = msg.to_ascii_lowercase();
    let remediation = if lower.contains("figma_token") || lower.contains("figma token") {
        "Set FIGMA_TOKEN (or FIGMA_OAUTH_TOKEN), pass --token, or add [figma] token to the config file."
    } else if lower.contains("node-id") {
        "Include a Figma node-id in the URL (e.g., ?node-id=1-2) to convert a single frame."
    } else if lower.contains("file key") && lower.contains("figma") {
        "Use a Figma URL with a file key: https://www.figma.com/design/<FILE_KEY>/... with node-id if needed."
    } else if lower.contains("worker_count") || lower.contains("timeout") {
        "Use a positive [batch] worker_count and a non-zero request_timeout (e.g. \"30s\")."
    } else {
        "Check flags/paths and the config file (see --config)."
    };
    ErrorPayload::new(ErrorCategory::Config, msg.to_string(), remediation)
}

pub type Result<T> = std::result::Result<T, F2cError>;

/// A recoverable, per-node problem. Collected into the warnings list instead of
/// aborting the conversion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderWarning(pub String);

impl RenderWarning {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RenderWarning> for String {
    fn from(warning: RenderWarning) -> Self {
        warning.0
    }
}

/// Insertion-ordered warning list, de-duplicated by exact message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Warnings {
    items: Vec<String>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !self.items.iter().any(|existing| existing == &message) {
            self.items.push(message);
        }
    }

    pub fn extend<I, S>(&mut self, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for message in messages {
            self.push(message);
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Network,
    Figma,
    Conversion,
    Completion,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_payload_includes_figma_token_remediation() {
        let err = F2cError::Config("FIGMA_TOKEN environment variable is required".to_string());
        let payload = err.to_payload();
        assert_eq!(payload.category, ErrorCategory::Config);
        let remediation = payload.remediation.unwrap_or_default();
        assert!(
            remediation.contains("FIGMA_TOKEN"),
            "expected FIGMA token remediation, got: {remediation}"
        );
    }

    #[test]
    fn config_payload_uses_default_remediation_for_other_messages() {
        let err = F2cError::Config("Some other config issue".to_string());
        let remediation = err.to_payload().remediation.unwrap_or_default();
        assert!(
            remediation.contains("Check flags/paths"),
            "expected default remediation for generic config errors"
        );
    }

    #[test]
    fn config_payload_includes_node_id_hint() {
        let err = F2cError::Config("Figma URL missing node-id in query".to_string());
        let remediation = err.to_payload().remediation.unwrap_or_default();
        assert!(remediation.to_ascii_lowercase().contains("node-id"));
    }

    #[test]
    fn config_payload_includes_file_key_hint() {
        let err = F2cError::Config("Figma URL missing file key".to_string());
        let remediation = err.to_payload().remediation.unwrap_or_default();
        assert!(remediation.to_ascii_lowercase().contains("file key"));
    }

    #[test]
    fn conversion_errors_have_their_own_category() {
        let payload = F2cError::conversion("no renderable nodes").to_payload();
        assert_eq!(payload.category, ErrorCategory::Conversion);
    }

    #[test]
    fn warnings_are_deduplicated_in_insertion_order() {
        let mut warnings = Warnings::new();
        warnings.push("VECTOR nodes are not embedded");
        warnings.push("SVG rendering failed: Dot (ELLIPSE)");
        warnings.push("VECTOR nodes are not embedded");

        assert_eq!(
            warnings.as_slice(),
            &[
                "VECTOR nodes are not embedded".to_string(),
                "SVG rendering failed: Dot (ELLIPSE)".to_string()
            ]
        );
    }

    #[test]
    fn render_warning_displays_its_message() {
        let warning = RenderWarning::new("Download failed: 1:2");
        assert_eq!(warning.to_string(), "Download failed: 1:2");
        assert_eq!(String::from(warning), "Download failed: 1:2");
    }
}
