mod cli;
mod commands;
mod formatting;
mod settings;

use std::process::ExitCode;

use cli::Commands;
use commands::{run_convert, run_info, run_render};
use settings::ConversionFlags;

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

/// `--verbose` forces debug; otherwise RUST_LOG applies, defaulting to warn.
fn init_logging(verbose: bool) {
    let mut builder = if verbose {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(log::LevelFilter::Debug);
        builder
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
    };
    builder.target(env_logger::Target::Stderr).init();
}

async fn run() -> ExitCode {
    let args = cli::parse();
    init_logging(args.verbose);

    match args.command {
        Commands::Convert {
            url,
            output_dir,
            token,
            no_embed_shapes,
            no_embed_vectors,
            no_embed_images,
            preview,
            react,
            format,
        } => {
            let flags = ConversionFlags {
                no_embed_shapes,
                no_embed_vectors,
                no_embed_images,
                preview,
            };
            run_convert(
                args.config,
                args.verbose,
                url,
                output_dir,
                token,
                flags,
                react,
                format,
            )
            .await
        }
        Commands::Render {
            json_file,
            output_dir,
            file_key,
            format,
        } => {
            run_render(
                args.config,
                args.verbose,
                json_file,
                output_dir,
                file_key,
                format,
            )
            .await
        }
        Commands::Info { url, token, format } => {
            run_info(args.config, url, token, format).await
        }
    }
}
