//! Line structuring command.

use std::path::Path;

use console::style;

use crate::cli::helpers::{load_image, truncate};
use archivum::config::Config;
use archivum::pipeline::DocumentPipeline;

/// Segment an image into lines and print the recognized text.
pub async fn cmd_structure(
    config: &Config,
    image_path: &Path,
    tolerance: Option<f32>,
    json: bool,
) -> anyhow::Result<()> {
    let image = load_image(image_path).await?;

    let mut pipeline = DocumentPipeline::from_config(config)?;
    if let Some(tolerance) = tolerance {
        pipeline = pipeline.with_tolerance(tolerance);
    }

    let doc = pipeline.structure_document(&image).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    if doc.is_empty() {
        println!("{} No text detected", style("!").yellow());
        return Ok(());
    }

    println!(
        "{} {} line(s) in {}",
        style("✓").green(),
        doc.lines.len(),
        image_path.display()
    );
    for line in &doc.lines {
        if line.text.is_empty() {
            println!("  {:>3}  {}", line.index, style("(empty)").dim());
        } else {
            println!("  {:>3}  {}", line.index, truncate(&line.text, 120));
        }
    }
    Ok(())
}
