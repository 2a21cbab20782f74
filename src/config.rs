use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const WORKER_COUNT_ENV: &str = "FIGMA_WORKER_COUNT";
pub const DEFAULT_WORKER_COUNT: usize = 4;
/// Deepest node nesting the converter and generator descend into.
pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub conversion: ConversionSettings,
    pub batch: BatchSettings,
    pub figma: FigmaSettings,
    pub completion: CompletionSettings,
}

/// Switches that shape one conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionSettings {
    pub embed_vectors: bool,
    pub embed_images: bool,
    pub embed_shapes: bool,
    pub preview: bool,
    pub use_color_variables: bool,
    pub max_depth: usize,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            embed_vectors: true,
            embed_images: true,
            embed_shapes: true,
            preview: false,
            use_color_variables: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ConversionSettings {
    /// Settings for conversions that must not touch the network.
    pub fn offline() -> Self {
        Self {
            embed_vectors: false,
            embed_images: false,
            embed_shapes: false,
            ..Self::default()
        }
    }

    pub fn needs_batch(&self) -> bool {
        !self.preview && (self.embed_vectors || self.embed_images)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    pub worker_count: usize,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    pub export_scale: f32,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            request_timeout: Duration::from_secs(30),
            export_scale: 1.0,
        }
    }
}

impl BatchSettings {
    /// Apply `FIGMA_WORKER_COUNT` when it holds a positive integer.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(count) = std::env::var(WORKER_COUNT_ENV)
            .ok()
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|count| *count > 0)
        {
            self.worker_count = count;
        }
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FigmaSettings {
    pub token: Option<String>,
    pub api_base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    pub api_endpoint: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Config {
    /// `$HOME/.config/f2c/config.toml`.
    pub fn central_config_path() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .filter(|home| !home.is_empty())
            .map(|home| PathBuf::from(home).join(".config").join("f2c").join("config.toml"))
    }

    /// Load from `path`, else the central config when it exists, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let candidate = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::central_config_path().filter(|p| p.exists()),
        };
        let Some(candidate) = candidate else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(&candidate).map_err(|e| e.to_string())?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, String> {
        toml::from_str(raw).map_err(|e| e.to_string())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.batch.worker_count == 0 {
            return Err("batch.worker_count must be at least 1".to_string());
        }
        if self.batch.export_scale <= 0.0 {
            return Err("batch.export_scale must be greater than zero".to_string());
        }
        if self.batch.request_timeout.is_zero() {
            return Err("batch.request_timeout must be greater than zero".to_string());
        }
        if self.conversion.max_depth == 0 {
            return Err("conversion.max_depth must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_match_expected() {
        let cfg = Config::default();

        assert!(cfg.conversion.embed_vectors);
        assert!(cfg.conversion.embed_images);
        assert!(cfg.conversion.embed_shapes);
        assert!(!cfg.conversion.preview);
        assert_eq!(cfg.batch.worker_count, 4);
        assert_eq!(cfg.batch.request_timeout, Duration::from_secs(30));
        assert!((cfg.batch.export_scale - 1.0).abs() < f32::EPSILON);
        assert!(cfg.figma.token.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parses_partial_toml_with_humantime() {
        let cfg = Config::from_toml_str(
            r#"
            [conversion]
            embed_images = false

            [batch]
            worker_count = 8
            request_timeout = "1m 30s"
            "#,
        )
        .unwrap();

        assert!(!cfg.conversion.embed_images);
        assert!(cfg.conversion.embed_vectors);
        assert_eq!(cfg.batch.worker_count, 8);
        assert_eq!(cfg.batch.request_timeout, Duration::from_secs(90));
    }

    #[test]
    fn rejects_zero_workers() {
        let cfg = Config::from_toml_str("[batch]\nworker_count = 0\n").unwrap();
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("worker_count"));
    }

    #[test]
    fn offline_settings_disable_network_features() {
        let settings = ConversionSettings::offline();
        assert!(!settings.needs_batch());
        assert!(!settings.embed_shapes);
        assert!(ConversionSettings::default().needs_batch());
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f2c.toml");
        std::fs::write(&path, "[conversion]\npreview = true\n").unwrap();

        let cfg = Config::load(Some(&path)).unwrap();
        assert!(cfg.conversion.preview);
        assert!(!cfg.conversion.needs_batch());
    }
}
