use std::path::PathBuf;
use std::process::ExitCode;

use f2c_lib::{
    load_document_json, ConvertOutput, Converter, F2cError, F2cOutput, OfflineSource,
};
use log::debug;

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::settings::{load_config, log_effective_config};

/// Run the render command: offline conversion of a saved Figma response.
pub async fn run_render(
    config_path: Option<PathBuf>,
    verbose: bool,
    json_file: PathBuf,
    output_dir: PathBuf,
    file_key: String,
    format: OutputFormat,
) -> ExitCode {
    let mut config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format),
    };
    config.conversion.embed_vectors = false;
    config.conversion.embed_images = false;
    config.conversion.embed_shapes = false;
    if verbose {
        log_effective_config(config_path.as_deref(), &config);
    }

    let raw = match std::fs::read_to_string(&json_file) {
        Ok(raw) => raw,
        Err(err) => {
            return render_error(
                F2cError::Config(format!("Failed to read {}: {err}", json_file.display())),
                format,
            )
        }
    };
    let document = match load_document_json(&raw) {
        Ok(document) => document,
        Err(err) => return render_error(err, format),
    };
    debug!(
        "loaded {} root node(s) from {}",
        document.roots.len(),
        json_file.display()
    );

    let converter = Converter::new(OfflineSource, &config);
    let report = match converter
        .convert_document(document.roots, &file_key, &output_dir)
        .await
    {
        Ok(report) => report,
        Err(err) => return render_error(err, format),
    };

    let output = ConvertOutput::from_report(json_file.display().to_string(), report);
    if let Err(err) = write_output(&F2cOutput::Render(output), format) {
        return render_error(F2cError::Unknown(err.to_string()), format);
    }
    ExitCode::SUCCESS
}
