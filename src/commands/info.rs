use std::path::PathBuf;
use std::process::ExitCode;

use f2c_lib::figma::first_page;
use f2c_lib::figma_client::with_timeout;
use f2c_lib::{
    parse_figma_url, F2cError, F2cOutput, FigmaSource, FigmaTarget, InfoOutput, F2C_OUTPUT_VERSION,
};
use log::debug;

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::settings::{figma_client, load_config, resolve_auth};

/// Run the info command.
pub async fn run_info(
    config_path: Option<PathBuf>,
    url: String,
    token: Option<String>,
    format: OutputFormat,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format),
    };
    let target = match parse_figma_url(&url) {
        Ok(target) => target,
        Err(err) => return render_error(F2cError::Config(err.to_string()), format),
    };

    let mut output = InfoOutput {
        version: F2C_OUTPUT_VERSION.to_string(),
        file_key: target.file_key.clone(),
        node_id: target.node_id.clone(),
        document_name: None,
        node_count: None,
    };

    if resolve_auth(token.as_deref(), &config).is_some() {
        let client = match figma_client(token.as_deref(), &config) {
            Ok(client) => client,
            Err(err) => return render_error(err, format),
        };
        match describe(&client, &target, config.batch.request_timeout).await {
            Ok((name, count)) => {
                output.document_name = Some(name);
                output.node_count = Some(count);
            }
            Err(err) => return render_error(err, format),
        }
    } else {
        debug!("no Figma token; reporting the parsed URL only");
    }

    if let Err(err) = write_output(&F2cOutput::Info(output), format) {
        return render_error(F2cError::Unknown(err.to_string()), format);
    }
    ExitCode::SUCCESS
}

/// Name and direct child count of the addressed node, or of the file and its first page.
async fn describe<S: FigmaSource>(
    source: &S,
    target: &FigmaTarget,
    timeout: std::time::Duration,
) -> Result<(String, usize), F2cError> {
    match &target.node_id {
        Some(node_id) => {
            let ids = [node_id.clone()];
            let response =
                with_timeout(timeout, source.get_file_nodes(&target.file_key, &ids)).await?;
            let node = response
                .nodes
                .get(node_id)
                .and_then(Option::as_ref)
                .ok_or_else(|| {
                    F2cError::figma_api(None, format!("node {node_id} was not found in the file"))
                })?;
            Ok((node.document.name.clone(), node.document.children.len()))
        }
        None => {
            let file = with_timeout(timeout, source.get_file(&target.file_key)).await?;
            let count = first_page(&file.document)
                .map(|page| page.children.len())
                .unwrap_or(0);
            let name = file.name.unwrap_or_else(|| file.document.name.clone());
            Ok((name, count))
        }
    }
}
