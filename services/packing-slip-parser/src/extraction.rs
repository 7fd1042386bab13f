//! Packing Slip Extraction
//!
//! Single-page and batched extraction through the AI API. Model output is
//! untrusted text: it is unwrapped from Markdown fences, parsed as JSON and
//! normalized. Failures degrade to sentinel records or to per-page fallback,
//! never to errors.

use anyhow::{Context, Result};
use packslip_models::{ExtractionRecord, PageText};
use packslip_utils::AppConfig;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::gemini_client::{CompletionClient, GenerationSettings};
use crate::prompts;
use crate::rate_limiter::RateLimiter;

/// Generation parameters and batch limits for extraction calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionSettings {
    pub temperature: f32,
    pub single_page_max_tokens: u32,
    pub batch_max_tokens: u32,
    /// Most pages sent in one AI call; larger batches are split.
    pub batch_ceiling: usize,
}

impl ExtractionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            temperature: config.gemini.temperature,
            single_page_max_tokens: config.gemini.single_page_max_tokens,
            batch_max_tokens: config.gemini.batch_max_tokens,
            batch_ceiling: config.extraction.batch_ceiling,
        }
    }

    fn single_page(&self) -> GenerationSettings {
        GenerationSettings {
            temperature: self.temperature,
            max_output_tokens: self.single_page_max_tokens,
        }
    }

    fn batch(&self) -> GenerationSettings {
        GenerationSettings {
            temperature: self.temperature,
            max_output_tokens: self.batch_max_tokens,
        }
    }
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            single_page_max_tokens: 1000,
            batch_max_tokens: 4000,
            batch_ceiling: 20,
        }
    }
}

/// Result of one batched AI call.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// The response parsed; records are in response order.
    Extracted(Vec<ExtractionRecord>),
    /// The call failed or the response was not JSON; the pages should be retried one by one.
    Retryable { reason: String },
}

/// Extracts packing slip records from page text.
pub struct SlipExtractor {
    client: Arc<dyn CompletionClient>,
    limiter: Arc<RateLimiter>,
    settings: ExtractionSettings,
}

impl SlipExtractor {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        limiter: Arc<RateLimiter>,
        settings: ExtractionSettings,
    ) -> Self {
        Self {
            client,
            limiter,
            settings,
        }
    }

    /// Extract one packing slip. Any API or parse failure yields [`ExtractionRecord::empty`].
    pub async fn extract_page(&self, text: &str) -> ExtractionRecord {
        match self.try_extract_page(text).await {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Single-page extraction failed");
                ExtractionRecord::empty()
            }
        }
    }

    async fn try_extract_page(&self, text: &str) -> Result<ExtractionRecord> {
        let prompt = prompts::single_page_prompt(text);

        self.limiter.wait_if_needed().await;
        let response = self
            .client
            .generate(&prompt, self.settings.single_page())
            .await?;

        let value: Value = serde_json::from_str(strip_code_fence(&response))
            .context("Response was not valid JSON")?;

        ExtractionRecord::normalize(&value).context("Response was not a JSON object")
    }

    /// Extract every page, in input order.
    ///
    /// Inputs above the batch ceiling are split into ceiling-sized chunks. A chunk
    /// whose AI call fails is retried page by page, keeping only identified records.
    pub async fn extract_batch(&self, pages: &[PageText]) -> Vec<ExtractionRecord> {
        let ceiling = self.settings.batch_ceiling.max(1);

        if pages.len() > ceiling {
            debug!(
                pages = pages.len(),
                ceiling, "Splitting batch to stay under the page ceiling"
            );
        }

        let mut records = Vec::with_capacity(pages.len());
        for chunk in pages.chunks(ceiling) {
            let chunk_records = match self.request_batch(chunk).await {
                BatchOutcome::Extracted(extracted) => extracted,
                BatchOutcome::Retryable { reason } => {
                    warn!(
                        pages = chunk.len(),
                        reason = %reason,
                        "Batch extraction failed, falling back to per-page extraction"
                    );
                    self.extract_individually(chunk).await
                }
            };
            records.extend(chunk_records);
        }
        records
    }

    /// One AI call covering all of `pages`.
    pub async fn request_batch(&self, pages: &[PageText]) -> BatchOutcome {
        if pages.is_empty() {
            return BatchOutcome::Extracted(Vec::new());
        }

        let prompt = prompts::batch_prompt(pages);

        self.limiter.wait_if_needed().await;
        let response = match self.client.generate(&prompt, self.settings.batch()).await {
            Ok(response) => response,
            Err(e) => {
                return BatchOutcome::Retryable {
                    reason: format!("{:#}", e),
                }
            }
        };

        match serde_json::from_str::<Value>(strip_code_fence(&response)) {
            Ok(value) => BatchOutcome::Extracted(records_from_batch(value, pages)),
            Err(e) => BatchOutcome::Retryable {
                reason: format!("JSON decode error: {}", e),
            },
        }
    }

    /// Per-page fallback. Records with neither a customer ID nor an attention line are dropped.
    pub async fn extract_individually(&self, pages: &[PageText]) -> Vec<ExtractionRecord> {
        let mut records = Vec::new();

        for page in pages {
            let record = self.extract_page(&page.text).await;
            if record.is_identified() {
                records.push(record.with_page_number(page.page_number()));
            } else {
                info!(page = page.page_number(), "No packing slip data found on page");
            }
        }
        records
    }
}

/// Records from a parsed batch response.
///
/// A lone object counts as a one-element array and any other scalar as empty.
/// Page numbers are attached by position, which trusts the model to keep the
/// input order; a length mismatch is logged because that trust is then doubtful.
fn records_from_batch(value: Value, pages: &[PageText]) -> Vec<ExtractionRecord> {
    let items = match value {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        _ => Vec::new(),
    };

    if items.len() != pages.len() {
        warn!(
            returned = items.len(),
            expected = pages.len(),
            "Batch response length differs from page count; page numbers may be misaligned"
        );
    }

    items
        .iter()
        .enumerate()
        .filter_map(|(position, item)| {
            let record = ExtractionRecord::normalize(item)?;
            Some(match pages.get(position) {
                Some(page) => record.with_page_number(page.page_number()),
                None => record,
            })
        })
        .collect()
}

/// Remove a surrounding Markdown code fence (```` ``` ```` or ```` ```json ````) if present.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"));

    match body {
        Some(inner) => {
            let inner = inner.trim_end();
            inner.strip_suffix("```").unwrap_or(inner).trim()
        }
        None => trimmed,
    }
}
