//! Full recognition and annotation command.

use std::path::Path;

use crate::cli::helpers::load_image;
use archivum::config::Config;
use archivum::ocr::RecognitionMode;
use archivum::pipeline::DocumentPipeline;

use super::OutputFormat;

/// Recognize an image and print the annotated text.
pub async fn cmd_process(
    config: &Config,
    image_path: &Path,
    mode: RecognitionMode,
    translate: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let image = load_image(image_path).await?;
    let pipeline = DocumentPipeline::from_config(config)?;

    let doc = pipeline.process(&image, mode, translate).await?;
    match format {
        OutputFormat::Html => println!("{}", doc.annotated_html),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&doc)?),
    }
    Ok(())
}
