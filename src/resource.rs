use thiserror::Error;
use url::Url;

/// File key and optional node id addressed by a Figma URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigmaTarget {
    pub file_key: String,
    pub node_id: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceParseError {
    #[error("Invalid URL '{value}': {message}. Hint: include https:// and ensure the URL is well-formed.")]
    InvalidUrl { value: String, message: String },
    #[error("Not a Figma URL: '{url}'. Hint: use https://www.figma.com/design/<FILE_KEY>/...")]
    NotFigma { url: String },
    #[error("Figma URL missing file key in '{url}'. Hint: use https://www.figma.com/design/<FILE_KEY>/... and node-id if needed.")]
    FigmaMissingFileKey { url: String },
}

const KEY_SEGMENTS: &[&str] = &["file", "design", "proto"];

pub fn parse_figma_url(value: &str) -> Result<FigmaTarget, ResourceParseError> {
    let url = Url::parse(value.trim()).map_err(|e| ResourceParseError::InvalidUrl {
        value: value.to_string(),
        message: e.to_string(),
    })?;

    let host = url.host_str().unwrap_or("");
    if !host.ends_with("figma.com") {
        return Err(ResourceParseError::NotFigma {
            url: value.to_string(),
        });
    }

    let path_segments: Vec<&str> = url.path_segments().map(|c| c.collect()).unwrap_or_default();

    let file_key = path_segments
        .iter()
        .position(|s| KEY_SEGMENTS.contains(s))
        .and_then(|i| path_segments.get(i + 1))
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .ok_or_else(|| ResourceParseError::FigmaMissingFileKey {
            url: value.to_string(),
        })?;

    let from_query = url
        .query_pairs()
        .find(|(k, _)| k == "node-id")
        .or_else(|| url.query_pairs().find(|(k, _)| k == "id"))
        .map(|(_, v)| v.into_owned());

    let from_fragment = || {
        url.fragment().and_then(|fragment| {
            url::form_urlencoded::parse(fragment.as_bytes())
                .find(|(k, _)| k == "node-id")
                .map(|(_, v)| v.into_owned())
        })
    };

    let node_id = from_query
        .or_else(from_fragment)
        .filter(|id| !id.is_empty())
        .map(|id| id.replace('-', ":"));

    Ok(FigmaTarget { file_key, node_id })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_figma_file_url() {
        let info = parse_figma_url("https://www.figma.com/file/ABC123/My-Design?node-id=12-34")
            .unwrap();
        assert_eq!(info.file_key, "ABC123");
        assert_eq!(info.node_id.as_deref(), Some("12:34"));
    }

    #[test]
    fn test_parse_figma_design_url() {
        let info =
            parse_figma_url("https://www.figma.com/design/XYZ789/Another-Design?node-id=5-10&t=abc")
                .unwrap();
        assert_eq!(info.file_key, "XYZ789");
        assert_eq!(info.node_id.as_deref(), Some("5:10"));
    }

    #[test]
    fn test_parse_encoded_colon_and_id_param() {
        let info = parse_figma_url("https://www.figma.com/file/KEY/Name?id=1%3A2").unwrap();
        assert_eq!(info.node_id.as_deref(), Some("1:2"));
    }

    #[test]
    fn test_parse_node_id_from_fragment() {
        let info = parse_figma_url("https://www.figma.com/proto/KEY/Name#node-id=7-8").unwrap();
        assert_eq!(info.file_key, "KEY");
        assert_eq!(info.node_id.as_deref(), Some("7:8"));
    }

    #[test]
    fn test_parse_figma_url_no_node_id() {
        let info = parse_figma_url("https://www.figma.com/file/ABC123/My-Design").unwrap();
        assert_eq!(info.file_key, "ABC123");
        assert!(info.node_id.is_none());
    }

    #[test]
    fn test_missing_file_key_errors() {
        let err = parse_figma_url("https://www.figma.com/files/recent").unwrap_err();
        assert!(matches!(err, ResourceParseError::FigmaMissingFileKey { .. }));
        assert!(err.to_string().contains("file key"));
    }

    #[test]
    fn test_non_figma_host_errors() {
        let err = parse_figma_url("https://example.com/file/ABC").unwrap_err();
        assert!(matches!(err, ResourceParseError::NotFigma { .. }));
    }

    #[test]
    fn test_garbage_is_invalid_url() {
        let err = parse_figma_url("not a url").unwrap_err();
        assert!(matches!(err, ResourceParseError::InvalidUrl { .. }));
    }
}
