//! Backend availability check.

use console::style;

use archivum::config::Config;
use archivum::ocr::{TesseractBackend, TextDetector};

/// Report whether the configured OCR and entity backends can be used.
pub async fn cmd_check(config: &Config) -> anyhow::Result<()> {
    let mut ok = true;

    let tesseract = TesseractBackend::with_config(config.ocr.clone());
    if tesseract.is_available() {
        println!(
            "{} OCR: {} ({})",
            style("✓").green(),
            tesseract.backend_id(),
            config.ocr.language
        );
    } else {
        ok = false;
        println!("{} OCR: {}", style("✗").red(), tesseract.availability_hint());
    }

    match config.ner.build_recognizer() {
        Ok(recognizer) if recognizer.is_available().await => {
            println!(
                "{} Entities: {} backend",
                style("✓").green(),
                recognizer.backend_id()
            );
        }
        Ok(recognizer) => {
            ok = false;
            println!(
                "{} Entities: {} backend is not configured (set ner.endpoint)",
                style("✗").red(),
                recognizer.backend_id()
            );
        }
        Err(e) => {
            ok = false;
            println!("{} Entities: {}", style("✗").red(), e);
        }
    }

    println!("{} Dates: built-in patterns", style("✓").green());

    if ok {
        Ok(())
    } else {
        Err(anyhow::anyhow!("Some backends are unavailable"))
    }
}
