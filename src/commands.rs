use anyhow::{Context, Result};
use console::style;
use std::time::Duration;
use tracing::info;

use crate::config::{EmbeddingConfig, PipelineConfig, VisionConfig};
use crate::embeddings::EmbeddingClient;
use crate::pipeline::{Pipeline, RunSummary};
use crate::vision::{ImageAnalysis, ObjectDetection, OcrResult, VisionClient};

/// Run the embedding enrichment pipeline over an NDJSON dataset
#[inline]
pub fn run_embed(config: &PipelineConfig, timeout_secs: u64) -> Result<()> {
    let embedding_config =
        EmbeddingConfig::from_env().context("Failed to resolve embedding service settings")?;

    info!(
        "Using deployment {} at {}",
        embedding_config.deployment, embedding_config.endpoint
    );

    let client = EmbeddingClient::new(&embedding_config)?
        .with_timeout(Duration::from_secs(timeout_secs));

    let summary = Pipeline::new(&client, config).run()?;

    report_summary(&summary, config)
}

/// An empty dataset is fatal for the command: there was nothing to do, and a
/// zero exit would make that easy to miss in scripts.
fn report_summary(summary: &RunSummary, config: &PipelineConfig) -> Result<()> {
    if summary.total == 0 {
        anyhow::bail!(
            "No records found in {}, nothing written",
            config.input_path.display()
        );
    }

    println!("{}", style("Embedding run complete").bold().green());
    println!("  Input records:  {}", summary.total);
    println!("  Embedded:       {}", summary.embedded);
    println!("  Skipped (empty): {}", summary.skipped);
    println!("  Failed:         {}", summary.failed);
    println!("  Checkpoints:    {}", summary.checkpoints);
    if summary.embedded > 0 {
        println!("  Output:         {}", config.output_path.display());
        let rate = summary.embedded as f64 / summary.total as f64 * 100.0;
        println!("  Success rate:   {rate:.1}%");
    } else {
        println!(
            "{}",
            style("No records were successfully embedded.").yellow()
        );
    }

    Ok(())
}

/// Analyze an image and print its description, categories, and colors
#[inline]
pub fn run_analyze(image_url: &str, timeout_secs: u64) -> Result<()> {
    let client = vision_client(timeout_secs)?;
    let analysis = client.analyze(image_url)?;
    print_analysis(&analysis);
    Ok(())
}

/// Detect objects in an image and print their labels and rectangles
#[inline]
pub fn run_detect(image_url: &str, timeout_secs: u64) -> Result<()> {
    let client = vision_client(timeout_secs)?;
    let detection = client.detect(image_url)?;
    print_detection(&detection);
    Ok(())
}

/// Run OCR over an image and print the recognized text
#[inline]
pub fn run_ocr(image_url: &str, timeout_secs: u64) -> Result<()> {
    let client = vision_client(timeout_secs)?;
    let ocr = client.ocr(image_url)?;
    print_ocr(&ocr);
    Ok(())
}

fn vision_client(timeout_secs: u64) -> Result<VisionClient> {
    let config = VisionConfig::from_env().context("Failed to resolve vision service settings")?;
    Ok(VisionClient::new(&config).with_timeout(Duration::from_secs(timeout_secs)))
}

fn print_analysis(analysis: &ImageAnalysis) {
    println!("{}", style("Analysis Result").bold().cyan());

    let caption = analysis
        .description
        .as_ref()
        .and_then(|d| d.captions.first());
    match caption {
        Some(caption) => {
            println!("  Description: {}", caption.text);
            println!("  Confidence:  {:.2}", caption.confidence);
        }
        None => println!("  Description: (none available)"),
    }

    if analysis.categories.is_empty() {
        println!("  Categories:  (none)");
    } else {
        let names: Vec<&str> = analysis
            .categories
            .iter()
            .map(|category| category.name.as_str())
            .collect();
        println!("  Categories:  {}", names.join(", "));
    }

    if let Some(color) = &analysis.color {
        println!("  Dominant colors: {}", color.dominant_colors.join(", "));
        println!("  Accent color:    #{}", color.accent_color);
    }
}

fn print_detection(detection: &ObjectDetection) {
    println!("{}", style("Object Detection Result").bold().cyan());

    if detection.objects.is_empty() {
        println!("  No objects detected");
        return;
    }

    println!("  Found {} objects:", detection.objects.len());
    for (i, object) in detection.objects.iter().enumerate() {
        println!("  {}. {}", i + 1, object.label);
        println!("     Confidence: {:.2}", object.confidence);
        println!(
            "     Rectangle:  x={} y={} w={} h={}",
            object.rectangle.x, object.rectangle.y, object.rectangle.w, object.rectangle.h
        );
    }
}

fn print_ocr(ocr: &OcrResult) {
    println!("{}", style("OCR Result").bold().cyan());

    if let Some(language) = &ocr.language {
        println!("  Language: {language}");
    }

    let lines = ocr.lines();
    if lines.is_empty() {
        println!("  No text recognized");
        return;
    }

    for line in lines {
        println!("  {line}");
    }
}
