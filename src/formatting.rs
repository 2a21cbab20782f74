use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

use f2c_lib::output::{ConvertOutput, F2C_OUTPUT_VERSION};
use f2c_lib::{ErrorOutput, F2cError, F2cOutput};

use crate::cli::OutputFormat;

/// Warnings listed in the human-readable summary before collapsing the rest.
const SHOWN_WARNINGS: usize = 3;

/// Write output in the requested format to stdout.
pub fn write_output(body: &F2cOutput, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(body)?),
        OutputFormat::Pretty => write_pretty_output(body)?,
    };
    Ok(())
}

/// Render an error and return the fatal exit code.
pub fn render_error(err: F2cError, format: OutputFormat) -> ExitCode {
    let error_payload = err.to_payload();
    let payload = F2cOutput::Error(ErrorOutput {
        version: F2C_OUTPUT_VERSION.to_string(),
        message: Some(error_payload.message.clone()),
        error: error_payload,
    });

    match format {
        OutputFormat::Json => {
            let content =
                serde_json::to_string(&payload).unwrap_or_else(|_| "{\"mode\":\"error\"}".into());
            println!("{content}");
        }
        OutputFormat::Pretty => {
            if let Err(write_err) = write_pretty_output(&payload) {
                eprintln!("Failed to write error output: {}", write_err);
            }
        }
    };

    ExitCode::from(2)
}

/// Human summary on a terminal, indented JSON otherwise.
fn write_pretty_output(body: &F2cOutput) -> io::Result<()> {
    if std::io::stdout().is_terminal() {
        println!("{}", format_pretty(body, true));
        return Ok(());
    }

    let content =
        serde_json::to_string_pretty(body).unwrap_or_else(|_| "{\"mode\":\"error\"}".to_string());
    println!("{content}");
    Ok(())
}

fn format_conversion(buf: &mut String, label: &str, out: &ConvertOutput, colorize: bool) {
    let header = color(label, "32", colorize);
    writeln!(buf, "{} {}", header, out.name).ok();
    writeln!(buf, "Input: {}", out.input).ok();
    writeln!(buf, "HTML:  {}", out.html_path.display()).ok();
    writeln!(buf, "CSS:   {}", out.css_path.display()).ok();
    if let Some(path) = &out.react_path {
        writeln!(buf, "React: {}", path.display()).ok();
    }
    writeln!(
        buf,
        "Nodes: {} processed, {} skipped, {} inlined",
        out.stats.nodes_processed, out.stats.nodes_skipped, out.stats.groups_inlined
    )
    .ok();

    if !out.warnings.is_empty() {
        let title = color(&format!("Warnings ({}):", out.warnings.len()), "33", colorize);
        writeln!(buf, "{title}").ok();
        for warning in out.warnings.iter().take(SHOWN_WARNINGS) {
            writeln!(buf, "- {warning}").ok();
        }
        if out.warnings.len() > SHOWN_WARNINGS {
            writeln!(buf, "... and {} more", out.warnings.len() - SHOWN_WARNINGS).ok();
        }
    }
}

/// Format output for human consumption in a terminal.
pub fn format_pretty(body: &F2cOutput, colorize: bool) -> String {
    let mut buf = String::new();
    match body {
        F2cOutput::Convert(out) => format_conversion(&mut buf, "[CONVERT]", out, colorize),
        F2cOutput::Render(out) => format_conversion(&mut buf, "[RENDER]", out, colorize),
        F2cOutput::Info(out) => {
            let header = color("[INFO]", "36", colorize);
            writeln!(buf, "{} File key: {}", header, out.file_key).ok();
            writeln!(
                buf,
                "Node: {}",
                out.node_id.as_deref().unwrap_or("(best frame of first page)")
            )
            .ok();
            if let Some(name) = &out.document_name {
                writeln!(buf, "Document: {}", name).ok();
            }
            if let Some(count) = out.node_count {
                writeln!(buf, "Top-level nodes: {}", count).ok();
            }
        }
        F2cOutput::Error(out) => {
            let header = color("[ERROR]", "31", colorize);
            let message = out
                .message
                .as_deref()
                .unwrap_or_else(|| out.error.message.as_str());
            writeln!(buf, "{} {}", header, message).ok();
            if let Some(remediation) = &out.error.remediation {
                writeln!(buf, "Hint: {}", remediation).ok();
            }
        }
    }
    buf
}

/// Apply ANSI color codes when enabled.
fn color(text: &str, code: &str, colorize: bool) -> String {
    if colorize {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}
