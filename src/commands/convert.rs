use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use f2c_lib::pipeline::{write_outputs, Conversion};
use f2c_lib::{
    Config, ConvertOutput, Converter, F2cError, F2cOutput, MockCompletion, OpenAiCompletion,
    OpenAiConfig, ReactComponent, ReactGenerator,
};
use log::{info, warn};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::settings::{figma_client, load_config, log_effective_config, ConversionFlags};

const COMPLETION_TIMEOUT: Duration = Duration::from_secs(180);

/// Run the convert command.
#[allow(clippy::too_many_arguments)]
pub async fn run_convert(
    config_path: Option<PathBuf>,
    verbose: bool,
    url: String,
    output_dir: PathBuf,
    token: Option<String>,
    flags: ConversionFlags,
    react: bool,
    format: OutputFormat,
) -> ExitCode {
    let mut config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format),
    };
    flags.apply(&mut config.conversion);
    if verbose {
        log_effective_config(config_path.as_deref(), &config);
    }

    let client = match figma_client(token.as_deref(), &config) {
        Ok(client) => client,
        Err(err) => return render_error(err, format),
    };
    let converter = Converter::new(client, &config);

    let mut conversion = match converter.convert(&url).await {
        Ok(conversion) => conversion,
        Err(err) => return render_error(err, format),
    };

    let react_component = if react {
        match generate_react(&conversion, &config).await {
            Ok(component) => Some(component),
            Err(err) => {
                warn!("React generation failed: {err}");
                conversion
                    .warnings
                    .push(format!("React generation failed: {err}"));
                None
            }
        }
    } else {
        None
    };

    let report = match write_outputs(&conversion, &output_dir) {
        Ok(report) => report,
        Err(err) => return render_error(err, format),
    };

    let mut output = ConvertOutput::from_report(url, report);
    if let Some(component) = react_component {
        let dir = output
            .html_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| output_dir.clone());
        match component.write_to(&dir) {
            Ok(path) => {
                info!("wrote {}", path.display());
                output.react_path = Some(path);
            }
            Err(err) => return render_error(err, format),
        }
    }

    if let Err(err) = write_output(&F2cOutput::Convert(output), format) {
        return render_error(F2cError::Unknown(err.to_string()), format);
    }
    ExitCode::SUCCESS
}

/// Uses `F2C_MOCK_COMPLETION` when set, the configured chat-completions endpoint otherwise.
async fn generate_react(conversion: &Conversion, config: &Config) -> Result<ReactComponent, F2cError> {
    if let Some(mock) = MockCompletion::from_env() {
        return ReactGenerator::new(mock)
            .generate(&conversion.name, &conversion.html, &conversion.css)
            .await;
    }

    let completion_config = OpenAiConfig::from_settings(&config.completion).ok_or_else(|| {
        F2cError::completion(
            "no completion backend configured; set F2C_COMPLETION_API_KEY or OPENAI_API_KEY",
        )
    })?;
    let completion = OpenAiCompletion::new(completion_config, COMPLETION_TIMEOUT)?;
    ReactGenerator::new(completion)
        .generate(&conversion.name, &conversion.html, &conversion.css)
        .await
}
