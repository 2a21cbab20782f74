use crate::error::ErrorPayload;
use crate::normalize::NormalizeStats;
use crate::pipeline::ConversionReport;
use serde::Serialize;
use std::path::PathBuf;

/// Schema version for output payloads.
pub const F2C_OUTPUT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum F2cOutput {
    Convert(ConvertOutput),
    Render(ConvertOutput),
    Info(InfoOutput),
    Error(ErrorOutput),
}

/// Written files of one conversion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOutput {
    pub version: String,
    pub input: String,
    pub name: String,
    pub html_path: PathBuf,
    pub css_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub react_path: Option<PathBuf>,
    pub stats: NormalizeStats,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ConvertOutput {
    pub fn from_report(input: impl Into<String>, report: ConversionReport) -> Self {
        Self {
            version: F2C_OUTPUT_VERSION.to_string(),
            input: input.into(),
            name: report.name,
            html_path: report.html_path,
            css_path: report.css_path,
            react_path: None,
            stats: report.stats,
            warnings: report.warnings,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoOutput {
    pub version: String,
    pub file_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_count: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub error: ErrorPayload,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::F2cError;

    fn report() -> ConversionReport {
        ConversionReport {
            name: "Card".into(),
            html_path: PathBuf::from("out/Card/Card.html"),
            css_path: PathBuf::from("out/Card/Card.css"),
            stats: NormalizeStats::default(),
            warnings: vec!["IMAGE fill failed: 1:2".into()],
        }
    }

    #[test]
    fn convert_output_serializes() {
        let output = F2cOutput::Convert(ConvertOutput::from_report(
            "https://www.figma.com/design/KEY/x",
            report(),
        ));
        let json = serde_json::to_string(&output).expect("serialize convert output");
        assert!(json.contains("\"mode\":\"convert\""));
        assert!(json.contains("\"htmlPath\":\"out/Card/Card.html\""));
        assert!(json.contains("\"warnings\":[\"IMAGE fill failed: 1:2\"]"));
        assert!(!json.contains("reactPath"));
    }

    #[test]
    fn info_output_skips_unknown_fields() {
        let output = F2cOutput::Info(InfoOutput {
            version: F2C_OUTPUT_VERSION.to_string(),
            file_key: "KEY".into(),
            node_id: Some("1:2".into()),
            document_name: None,
            node_count: None,
        });
        let json = serde_json::to_string(&output).expect("serialize info output");
        assert_eq!(
            json,
            format!(
                "{{\"mode\":\"info\",\"version\":\"{F2C_OUTPUT_VERSION}\",\"fileKey\":\"KEY\",\"nodeId\":\"1:2\"}}"
            )
        );
    }

    #[test]
    fn error_output_carries_category() {
        let payload = F2cError::conversion("nothing to render").to_payload();
        let output = F2cOutput::Error(ErrorOutput {
            version: F2C_OUTPUT_VERSION.to_string(),
            message: Some(payload.message.clone()),
            error: payload,
        });
        let json = serde_json::to_string(&output).expect("serialize error output");
        assert!(json.contains("\"mode\":\"error\""));
        assert!(json.contains("\"category\":\"conversion\""));
    }
}
