//! Text annotation command.

use std::path::PathBuf;

use crate::cli::helpers::read_text_input;
use archivum::config::Config;
use archivum::pipeline::DocumentPipeline;

use super::OutputFormat;

/// Annotate text from an argument, a file or stdin.
pub async fn cmd_annotate(
    config: &Config,
    text: Option<String>,
    file: Option<PathBuf>,
    translate: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let text = read_text_input(text, file).await?;
    let pipeline = DocumentPipeline::from_config(config)?;

    let annotated = pipeline.annotate_text(&text, translate).await?;
    match format {
        OutputFormat::Html => println!("{}", annotated.annotated_html),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&annotated)?),
    }
    Ok(())
}
