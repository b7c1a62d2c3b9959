use anyhow::Result;
use clap::Parser as ClapParser;
use env_logger::Env;
use log::debug;
use std::path::PathBuf;

mod generator;
mod gosrc;
mod index;
mod models;
mod parser;
mod schema;

use generator::OutputFormat;

/// Generates an OpenAPI 3.0 document from annotation comments in Go source code
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path of the Go module to scan
    #[arg(short, long, default_value = "./")]
    module_path: PathBuf,

    /// Go file holding the general API information (discovered when omitted)
    #[arg(short = 'g', long)]
    main_file: Option<PathBuf>,

    /// Restrict operation parsing to handlers under this path
    #[arg(long)]
    handler_path: Option<PathBuf>,

    /// Output file; writes to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output encoding
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env = Env::default().filter_or("RUST_LOG", if cli.debug { "debug" } else { "info" });
    env_logger::init_from_env(env);

    debug!("module path: {}", cli.module_path.display());

    let mut parser = parser::Parser::new(
        &cli.module_path,
        cli.main_file.as_deref(),
        cli.handler_path.as_deref(),
    )?;
    parser.create_document()?;

    generator::write_document(&parser.openapi, cli.output.as_deref(), cli.format)?;

    Ok(())
}
