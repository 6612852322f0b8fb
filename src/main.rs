//! ld-inject CLI
//!
//! Renders JSON records as structured-data blocks, injects them into static
//! HTML pages, and checks the blocks already present in a page.

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use jsonld_inject::document::{self, Placement};
use jsonld_inject::{EscapeMode, JsonLdExtractor, MetadataValue, StructuredData};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Render and inject JSON-LD structured data
#[derive(Parser, Debug)]
#[command(name = "ld-inject")]
#[command(version)]
#[command(about = "Render and inject JSON-LD structured data blocks")]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Maximum record nesting depth
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a JSON record as a script block
    Render {
        /// JSON record file (stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[command(flatten)]
        encoding: EncodingArgs,
    },

    /// Insert one block per record into an HTML document
    Inject {
        /// HTML document to modify
        #[arg(long)]
        html: PathBuf,

        /// JSON record files (stdin when none given)
        #[arg(short, long = "input")]
        inputs: Vec<PathBuf>,

        /// Replace this marker instead of inserting before </head>
        #[arg(long)]
        marker: Option<String>,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        encoding: EncodingArgs,
    },

    /// Print the structured data found in a document as JSON
    Extract {
        /// HTML document (`-` for stdin)
        #[arg(long)]
        html: PathBuf,

        /// Include every JSON script block, not just parsed JSON-LD values
        #[arg(long)]
        all: bool,
    },

    /// Fail if any JSON-LD block in a document is not valid JSON
    Check {
        /// HTML document (`-` for stdin)
        #[arg(long)]
        html: PathBuf,
    },
}

#[derive(ClapArgs, Debug)]
struct EncodingArgs {
    /// Content type of the block
    #[arg(short = 't', long)]
    content_type: Option<String>,

    /// Emit plain JSON without script-safe escaping
    #[arg(long)]
    raw: bool,

    /// Indent the JSON body
    #[arg(long)]
    pretty: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    match args.command {
        Command::Render { input, encoding } => {
            let injector = injector(args.max_depth, &encoding)?;
            let record = read_record(input.as_deref())?;
            let block = injector
                .block(&record, encoding.content_type.as_deref())
                .context("failed to render structured data")?;
            println!("{}", block);
        }
        Command::Inject {
            html,
            inputs,
            marker,
            output,
            encoding,
        } => {
            let injector = injector(args.max_depth, &encoding)?;
            let page = read_text(&html)?;

            let records = if inputs.is_empty() {
                vec![read_record(None)?]
            } else {
                inputs
                    .iter()
                    .map(|path| read_record(Some(path.as_path())))
                    .collect::<Result<Vec<_>>>()?
            };

            let blocks = records
                .iter()
                .map(|record| injector.block(record, encoding.content_type.as_deref()))
                .collect::<jsonld_inject::Result<Vec<_>>>()
                .context("failed to render structured data")?;

            let placement = marker.map_or(Placement::Head, Placement::Marker);
            let result = document::inject(&page, &blocks, &placement)
                .with_context(|| format!("failed to inject into {}", html.display()))?;

            tracing::info!("Injected {} block(s) into {}", blocks.len(), html.display());
            match output {
                Some(path) => fs::write(&path, result)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => io::stdout().write_all(result.as_bytes())?,
            }
        }
        Command::Extract { html, all } => {
            let page = read_text(&html)?;
            let json = if all {
                serde_json::to_string_pretty(&JsonLdExtractor::extract_blocks(&page))?
            } else {
                serde_json::to_string_pretty(&JsonLdExtractor::extract_json_ld(&page))?
            };
            println!("{}", json);
        }
        Command::Check { html } => {
            let page = read_text(&html)?;
            let blocks = JsonLdExtractor::extract_blocks(&page);
            let broken: Vec<_> = blocks
                .iter()
                .filter(|b| b.is_json_ld() && b.value.is_none())
                .collect();

            if !broken.is_empty() {
                for block in &broken {
                    tracing::error!(
                        "JSON-LD block {} is invalid: {}",
                        block.index,
                        block.error.as_deref().unwrap_or("unknown error")
                    );
                }
                return Ok(ExitCode::FAILURE);
            }

            let values = JsonLdExtractor::extract_json_ld(&page);
            for schema_type in JsonLdExtractor::schema_types(&values) {
                println!("{}", schema_type);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn injector(max_depth: Option<usize>, encoding: &EncodingArgs) -> Result<StructuredData> {
    let mut config = StructuredData::from_env()
        .context("invalid environment configuration")?
        .config()
        .clone();
    if let Some(depth) = max_depth {
        config = config.with_max_depth(depth)?;
    }
    if encoding.raw {
        config = config.with_escape(EscapeMode::Raw);
    }
    if encoding.pretty {
        config = config.with_pretty(true);
    }
    tracing::debug!(?config, "Injector configured");
    Ok(StructuredData::new(config))
}

fn read_record(path: Option<&Path>) -> Result<MetadataValue> {
    let text = match path {
        Some(path) => read_text(path)?,
        None => read_text(Path::new("-"))?,
    };
    serde_json::from_str(&text).context("input is not valid JSON")
}

fn read_text(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        Ok(text)
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
}
