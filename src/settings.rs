use std::path::Path;

use f2c_lib::figma_client::DEFAULT_BASE_URL;
use f2c_lib::{Config, ConversionSettings, F2cError, FigmaAuth, FigmaClient};
use log::debug;

/// Conversion switches given on the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConversionFlags {
    pub no_embed_shapes: bool,
    pub no_embed_vectors: bool,
    pub no_embed_images: bool,
    pub preview: bool,
}

impl ConversionFlags {
    /// Flags can only switch features off (or preview on); config values stay otherwise.
    pub fn apply(&self, settings: &mut ConversionSettings) {
        if self.no_embed_shapes {
            settings.embed_shapes = false;
        }
        if self.no_embed_vectors {
            settings.embed_vectors = false;
        }
        if self.no_embed_images {
            settings.embed_images = false;
        }
        if self.preview {
            settings.preview = true;
        }
    }
}

/// Load config from a TOML file, central config, or return defaults, then
/// apply environment overrides.
/// Priority: explicit path > ~/.config/f2c/config.toml > defaults
pub fn load_config(path: Option<&Path>) -> Result<Config, F2cError> {
    let mut cfg = Config::load(path).map_err(|e| {
        let loc = path
            .map(|p| p.display().to_string())
            .or_else(|| Config::central_config_path().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "defaults".to_string());
        F2cError::Config(format!("Failed to read config {}: {}", loc, e))
    })?;
    cfg.batch = cfg.batch.with_env_overrides();

    cfg.validate().map_err(|e| {
        let prefix = path
            .map(|p| format!("Invalid config ({}): {}", p.display(), e))
            .unwrap_or_else(|| format!("Invalid config: {}", e));
        F2cError::Config(prefix)
    })?;
    Ok(cfg)
}

/// `--token`, then FIGMA_TOKEN / FIGMA_OAUTH_TOKEN, then `[figma] token`.
pub fn resolve_auth(cli_token: Option<&str>, config: &Config) -> Option<FigmaAuth> {
    FigmaAuth::resolve(cli_token).or_else(|| {
        config
            .figma
            .token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| FigmaAuth::PersonalAccessToken(token.to_string()))
    })
}

pub fn figma_client(cli_token: Option<&str>, config: &Config) -> Result<FigmaClient, F2cError> {
    let auth = resolve_auth(cli_token, config).ok_or_else(|| {
        F2cError::Config(
            "FIGMA_TOKEN is not set; pass --token or add a [figma] token to the config".to_string(),
        )
    })?;
    let base_url = config.figma.api_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
    FigmaClient::with_base_url_and_timeout(auth, base_url, config.batch.request_timeout)
}

/// Log effective config (verbose mode).
pub fn log_effective_config(config_path: Option<&Path>, config: &Config) {
    debug!("{}", format_effective_config(config, config_path));
}

/// Format effective config as a single-line string.
pub fn format_effective_config(config: &Config, config_source: Option<&Path>) -> String {
    let source = config_source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    let conversion = &config.conversion;
    format!(
        "Effective config [{source}]: embed_vectors={}, embed_images={}, embed_shapes={}, preview={}, color_variables={}, workers={}, timeout={}s, scale={}",
        conversion.embed_vectors,
        conversion.embed_images,
        conversion.embed_shapes,
        conversion.preview,
        conversion.use_color_variables,
        config.batch.worker_count,
        config.batch.request_timeout.as_secs(),
        config.batch.export_scale,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn flags_only_disable_features() {
        let mut settings = ConversionSettings::default();
        ConversionFlags {
            no_embed_vectors: true,
            preview: true,
            ..ConversionFlags::default()
        }
        .apply(&mut settings);
        assert!(!settings.embed_vectors);
        assert!(settings.embed_images);
        assert!(settings.embed_shapes);
        assert!(settings.preview);

        let mut settings = ConversionSettings {
            embed_images: false,
            ..ConversionSettings::default()
        };
        ConversionFlags::default().apply(&mut settings);
        assert!(!settings.embed_images);
    }

    #[test]
    fn config_token_is_the_last_resort() {
        let mut config = Config::default();
        config.figma.token = Some("from-config".into());
        match resolve_auth(Some("from-cli"), &config) {
            Some(FigmaAuth::PersonalAccessToken(token)) => assert_eq!(token, "from-cli"),
            other => panic!("unexpected auth: {other:?}"),
        }
    }

    #[test]
    fn invalid_config_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[batch]\nworker_count = 0").unwrap();
        let err = load_config(Some(file.path())).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Invalid config"));
        assert!(message.contains("worker_count"));
    }

    #[test]
    fn format_effective_config_includes_switches() {
        let summary = format_effective_config(&Config::default(), Some(Path::new("f2c.toml")));
        assert!(summary.contains("[f2c.toml]"));
        assert!(summary.contains("embed_vectors=true"));
        assert!(summary.contains("preview=false"));
        assert!(summary.contains("workers=4"));
        assert!(summary.contains("timeout=30s"));
    }
}
