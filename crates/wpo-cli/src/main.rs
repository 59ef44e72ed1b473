//! wpo - merge, minify and compress the scripts and style sheets of a page.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wpo_types::ResourceKind;
use wpo_web::OptimizerConfig;

mod commands;
mod logging;

use logging::{init_logging, level_for, LogFormat};

/// wpo - web page resource optimizer
#[derive(Parser, Debug)]
#[command(name = "wpo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    /// Configuration file (TOML, YAML or JSON); WPO_* variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rewrite a page fragment to load merged artifacts
    Optimize {
        /// Deployment root holding the referenced resources
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
        /// Kind to optimize (script, style); both when omitted
        #[arg(short, long, value_parser = parse_kind)]
        kind: Option<ResourceKind>,
        /// Route used as the page's cache identity
        #[arg(long, default_value = "/")]
        route: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Page fragment to read ("-" or omitted for stdin)
        input: Option<PathBuf>,
    },

    /// Merge resources into one post-processed artifact
    Merge {
        /// Deployment root holding the referenced resources
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
        /// Kind of the resources (script, style)
        #[arg(short, long, value_parser = parse_kind)]
        kind: ResourceKind,
        /// Print a JSON build report instead of the artifact path
        #[arg(long)]
        json: bool,
        /// Web-root-relative resource paths, in discovery order
        #[arg(required = true)]
        members: Vec<String>,
    },

    /// Minify a single script or style sheet
    Minify {
        /// Kind of the input (script, style)
        #[arg(short, long, value_parser = parse_kind)]
        kind: ResourceKind,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// File to read ("-" or omitted for stdin)
        input: Option<PathBuf>,
    },
}

fn parse_kind(s: &str) -> Result<ResourceKind, String> {
    ResourceKind::parse(s).ok_or_else(|| format!("unknown resource kind '{s}' (expected script or style)"))
}

fn main() {
    let cli = Cli::parse();

    init_logging(level_for(cli.verbose), cli.log_format);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Minify {
            kind,
            output,
            input,
        } => commands::minify(kind, input.as_deref(), output.as_deref()),
        Commands::Optimize {
            root,
            kind,
            route,
            output,
            input,
        } => {
            let config = OptimizerConfig::load(cli.config.as_deref())?;
            let kinds = kind.map_or_else(|| ResourceKind::ALL.to_vec(), |k| vec![k]);
            commands::optimize(
                config,
                &root,
                &kinds,
                &route,
                input.as_deref(),
                output.as_deref(),
            )
        }
        Commands::Merge {
            root,
            kind,
            json,
            members,
        } => {
            let config = OptimizerConfig::load(cli.config.as_deref())?;
            commands::merge(config, &root, kind, members, json)
        }
    }
}
