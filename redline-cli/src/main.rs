//! Redline CLI - deterministic document comparison from the terminal
//!
//! Extracts, normalizes and diffs two versions of a document, groups the
//! changes under their section headers and labels how much each one matters.

use clap::{CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod output;

use commands::*;
use output::{OutputConfig, OutputFormat};
use redline_daemon::config::RedlineConfig;

/// Deterministic redlines for contracts and other documents.
#[derive(Parser)]
#[command(name = "redline")]
#[command(author, version)]
#[command(about = "Deterministic redlines for contracts and other documents")]
#[command(propagate_version = true)]
#[command(after_help = "Examples:
  redline compare v1.docx v2.docx            Sectioned redline
  redline compare v1.txt v2.txt --classify   With materiality labels
  redline extract contract.docx              Text with list numbers
  redline serve --port 9130                  Run the HTTP API")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Minified JSON and borderless tables
    #[arg(long, global = true)]
    compact: bool,

    /// Configuration file (defaults to ./redline.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two versions of a document
    #[command(visible_alias = "diff")]
    Compare {
        /// Original version (.docx or text)
        original: PathBuf,

        /// Revised version (.docx or text)
        revised: PathBuf,

        /// Label each change as substantive, minor or formatting
        #[arg(short, long)]
        classify: bool,

        /// Classify through the configured external service (implies --classify)
        #[arg(long)]
        remote: bool,
    },

    /// Label the ops in a JSON file by materiality
    Categorize {
        /// JSON array of ops, or an object with a "changes" array
        file: PathBuf,

        /// Classify through the configured external service
        #[arg(long)]
        remote: bool,
    },

    /// Print the comparable text of a document
    Extract {
        /// Document to read
        file: PathBuf,

        /// Document type (docx, txt or a MIME type); guessed from the extension otherwise
        #[arg(short = 't', long = "type")]
        doc_type: Option<String>,
    },

    /// Print a document's text after canonical normalization
    Normalize {
        /// Document to read
        file: PathBuf,
    },

    /// Run the HTTP API in the foreground
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug,hyper=info,reqwest=info"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => RedlineConfig::from_file(path)?,
        None => RedlineConfig::load(Path::new(".")),
    };

    let mut output = OutputConfig::auto_detect(cli.format.unwrap_or_default());
    if cli.compact {
        output = output.compact();
    }

    // Handle case where no command is provided
    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            let _ = Cli::command().print_help();
            println!();
            return Ok(());
        }
    };

    match command {
        Commands::Compare {
            original,
            revised,
            classify,
            remote,
        } => {
            let options = compare::CompareOptions { classify, remote };
            compare::run(&original, &revised, options, &config, output).await
        }
        Commands::Categorize { file, remote } => {
            categorize::run(&file, remote, &config, output).await
        }
        Commands::Extract { file, doc_type } => {
            extract::run(&file, doc_type.as_deref(), output).await
        }
        Commands::Normalize { file } => normalize::run(&file, output).await,
        Commands::Serve { host, port } => serve::run(config, host, port).await,
    }
}
