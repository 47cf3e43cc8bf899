// Pipeline module
// Sequential enrichment loop: load, extract, embed, checkpoint, save.


use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::dataset::{Record, checkpoint_path, load_json_lines, save_json_lines};
use crate::embeddings::Embedder;

pub const ID_FIELD: &str = "id";
pub const EMBEDDING_FIELD: &str = "embedding";

/// Counts reported at the end of a run. Every input record lands in exactly
/// one of the embedded / skipped / failed buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub embedded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub checkpoints: usize,
}

/// Drives the four stages over one dataset. The embedder is a trait so runs
/// can be exercised without a live service.
pub struct Pipeline<'a, E: Embedder> {
    embedder: &'a E,
    config: &'a PipelineConfig,
}

impl<'a, E: Embedder> Pipeline<'a, E> {
    #[inline]
    pub fn new(embedder: &'a E, config: &'a PipelineConfig) -> Self {
        Self { embedder, config }
    }

    /// Run the full pipeline: load the dataset, embed each record's text
    /// field, checkpoint every N successes, and write the final output.
    ///
    /// Only the initial load can abort the run. Per-record failures are
    /// logged, counted, and skipped so a long batch never loses prior work.
    #[inline]
    pub fn run(&self) -> crate::Result<RunSummary> {
        self.config.validate()?;

        let records = load_json_lines(&self.config.input_path)?;

        let mut summary = RunSummary {
            total: records.len(),
            ..RunSummary::default()
        };

        if records.is_empty() {
            warn!(
                "No records loaded from {}, nothing to embed",
                self.config.input_path.display()
            );
            return Ok(summary);
        }

        info!(
            "Embedding field {:?} for {} records",
            self.config.text_field, summary.total
        );

        let bar = if console::user_attended_stderr() {
            ProgressBar::new(summary.total as u64).with_style(
                ProgressStyle::with_template("{bar:40} [{pos}/{len}] Embedding {msg}")
                    .expect("style template is valid"),
            )
        } else {
            ProgressBar::hidden()
        };

        let mut enriched: Vec<Record> = Vec::new();

        for (index, mut record) in records.into_iter().enumerate() {
            bar.set_message(format!("record {index}"));

            let Some(text) = bounded_text(&record, &self.config.text_field, self.config.max_text_chars)
            else {
                debug!("Record {} has no usable text field, skipping", index);
                summary.skipped += 1;
                bar.inc(1);
                continue;
            };

            match self.embedder.embed(&text) {
                Ok(vector) => {
                    // The id reflects the raw input index, so skipped and
                    // failed records leave gaps in the sequence.
                    record.insert(ID_FIELD.to_string(), Value::String(index.to_string()));
                    record.insert(EMBEDDING_FIELD.to_string(), vector_to_value(vector));
                    enriched.push(record);
                    summary.embedded += 1;

                    if summary.embedded % self.config.checkpoint_interval == 0 {
                        self.write_checkpoint(&enriched, &mut summary);
                    }
                }
                Err(e) => {
                    warn!("Embedding failed for record {}: {}", index, e);
                    summary.failed += 1;
                }
            }
            bar.inc(1);
        }
        bar.finish_and_clear();

        if enriched.is_empty() {
            warn!("No records were successfully embedded, skipping final write");
        } else {
            save_json_lines(&self.config.output_path, &enriched)?;
            info!(
                "Wrote {} enriched records to {}",
                enriched.len(),
                self.config.output_path.display()
            );
        }

        info!(
            "Run complete: {} total, {} embedded, {} skipped, {} failed",
            summary.total, summary.embedded, summary.skipped, summary.failed
        );
        Ok(summary)
    }

    /// A checkpoint failure is logged but never aborts the run; the final
    /// write still gets its chance.
    fn write_checkpoint(&self, enriched: &[Record], summary: &mut RunSummary) {
        let path = checkpoint_path(&self.config.output_path, summary.embedded);
        match save_json_lines(&path, enriched) {
            Ok(()) => {
                summary.checkpoints += 1;
                info!(
                    "Checkpoint saved: {} ({} records)",
                    path.display(),
                    enriched.len()
                );
            }
            Err(e) => warn!("Failed to write checkpoint {}: {}", path.display(), e),
        }
    }
}

/// Extract the designated text field, bounded to `max_chars` characters.
///
/// Returns `None` when the field is absent, not a string, or empty; such
/// records are skipped without spending a service call. Over-long text is cut
/// to a character prefix, which keeps the boundary valid for multibyte input.
#[inline]
pub fn bounded_text(record: &Record, field: &str, max_chars: usize) -> Option<String> {
    let text = record.get(field)?.as_str()?;
    if text.is_empty() {
        return None;
    }

    let char_count = text.chars().count();
    if char_count > max_chars {
        debug!(
            "Truncating text from {} to {} chars before embedding",
            char_count, max_chars
        );
        Some(text.chars().take(max_chars).collect())
    } else {
        Some(text.to_string())
    }
}

fn vector_to_value(vector: Vec<f32>) -> Value {
    Value::Array(
        vector
            .into_iter()
            .map(|dim| Value::from(f64::from(dim)))
            .collect(),
    )
}
