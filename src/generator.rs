use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::Path;

use crate::models::OpenApiObject;

/// Output encodings for the finished document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Encodes a document in the requested format.
pub fn encode_document(openapi: &OpenApiObject, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(openapi).context("failed to encode document as JSON")
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(openapi).context("failed to encode document as YAML")
        }
    }
}

/// Writes the encoded document to `output`, or to stdout when no path is
/// given.
pub fn write_document(
    openapi: &OpenApiObject,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let encoded = encode_document(openapi, format)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)
                        .context(format!("failed to create output directory {:?}", parent))?;
                }
            }
            fs::write(path, encoded).context(format!("failed to write {:?}", path))?;
            info!("wrote OpenAPI document to {}", path.display());
        }
        None => println!("{}", encoded),
    }
    Ok(())
}
