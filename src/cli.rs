use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "f2c")]
#[command(
    version,
    about = "Figma to Code - Convert Figma designs into HTML/CSS and React components",
    long_about = "Figma to Code (f2c)\n\nModes:\n- convert: fetch a Figma frame or node by URL and write <name>.html + <name>.css (optionally <Name>.tsx).\n- render: convert a saved Figma JSON response offline.\n- info: show what a Figma URL points at.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose (debug) logging on stderr")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) with [conversion], [batch], [figma] and [completion] defaults; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a Figma URL into HTML and CSS
    Convert {
        #[arg(help = "Figma file or node URL (https://www.figma.com/design/<KEY>/...?node-id=1-2)")]
        url: String,

        #[arg(long, default_value = "output", value_name = "DIR", help = "Directory for generated files")]
        output_dir: PathBuf,

        #[arg(long, help = "Figma personal access token (defaults to FIGMA_TOKEN / config)")]
        token: Option<String>,

        #[arg(long, help = "Do not render ellipses and polygons as SVG")]
        no_embed_shapes: bool,

        #[arg(long, help = "Do not export icon-like nodes as inline SVG")]
        no_embed_vectors: bool,

        #[arg(long, help = "Use placeholder URLs instead of downloading image fills")]
        no_embed_images: bool,

        #[arg(long, help = "Preview mode: skip all asset requests and use placeholders")]
        preview: bool,

        #[arg(long, help = "Also generate a React/TSX component (requires a completion backend)")]
        react: bool,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,
    },

    /// Convert a saved Figma JSON response without network access
    Render {
        #[arg(help = "Figma /nodes or /files response, a node array, or a single node")]
        json_file: PathBuf,

        #[arg(long, default_value = "output", value_name = "DIR", help = "Directory for generated files")]
        output_dir: PathBuf,

        #[arg(long, default_value = "local", help = "File key stamped on the nodes")]
        file_key: String,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,
    },

    /// Show the file key and node id addressed by a Figma URL
    Info {
        #[arg(help = "Figma file or node URL")]
        url: String,

        #[arg(long, help = "Figma personal access token; when available the document is fetched")]
        token: Option<String>,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, OutputFormat};
    use clap::Parser;
    use std::path::Path;

    #[test]
    fn convert_command_uses_defaults() {
        let cli = Cli::parse_from([
            "f2c",
            "convert",
            "https://www.figma.com/design/KEY/Site?node-id=1-2",
        ]);

        assert!(!cli.verbose);
        assert!(cli.config.is_none());

        match cli.command {
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
                assert_eq!(url, "https://www.figma.com/design/KEY/Site?node-id=1-2");
                assert_eq!(output_dir, Path::new("output"));
                assert!(token.is_none());
                assert!(!no_embed_shapes);
                assert!(!no_embed_vectors);
                assert!(!no_embed_images);
                assert!(!preview);
                assert!(!react);
                assert!(matches!(format, OutputFormat::Json));
            }
            _ => panic!("expected convert command"),
        }
    }

    #[test]
    fn convert_command_respects_overrides() {
        let cli = Cli::parse_from([
            "f2c",
            "convert",
            "https://www.figma.com/file/KEY/x",
            "--output-dir",
            "build",
            "--token",
            "secret",
            "--no-embed-shapes",
            "--no-embed-vectors",
            "--no-embed-images",
            "--preview",
            "--react",
            "--format",
            "pretty",
            "--config",
            "f2c.toml",
        ]);

        assert_eq!(cli.config.as_deref(), Some(Path::new("f2c.toml")));
        match cli.command {
            Commands::Convert {
                output_dir,
                token,
                no_embed_shapes,
                no_embed_vectors,
                no_embed_images,
                preview,
                react,
                format,
                ..
            } => {
                assert_eq!(output_dir, Path::new("build"));
                assert_eq!(token.as_deref(), Some("secret"));
                assert!(no_embed_shapes && no_embed_vectors && no_embed_images);
                assert!(preview);
                assert!(react);
                assert!(matches!(format, OutputFormat::Pretty));
            }
            _ => panic!("expected convert command with overrides"),
        }
    }

    #[test]
    fn render_command_sets_verbose() {
        let cli = Cli::parse_from(["f2c", "--verbose", "render", "nodes.json", "--file-key", "ABC"]);

        assert!(cli.verbose);
        match cli.command {
            Commands::Render {
                json_file,
                output_dir,
                file_key,
                format,
            } => {
                assert_eq!(json_file, Path::new("nodes.json"));
                assert_eq!(output_dir, Path::new("output"));
                assert_eq!(file_key, "ABC");
                assert!(matches!(format, OutputFormat::Json));
            }
            _ => panic!("expected render command"),
        }
    }

    #[test]
    fn info_requires_a_url() {
        assert!(Cli::try_parse_from(["f2c", "info"]).is_err());
    }
}
