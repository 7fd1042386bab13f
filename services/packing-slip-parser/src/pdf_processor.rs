//! PDF Processor
//!
//! Per-page text extraction from PDF documents. Each page is extracted on its
//! own so that a page the text extractor cannot handle (it may panic on
//! malformed fonts) only loses that page.

use lopdf::Document;
use packslip_utils::{PackslipError, PackslipResult};
use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

/// Source of plain page text for an uploaded document.
pub trait PageTextExtractor: Send + Sync {
    /// Text of every page, in document order. Pages without a text layer, or
    /// whose text cannot be extracted, come back empty.
    fn extract_pages(&self, data: &[u8]) -> PackslipResult<Vec<String>>;
}

/// Text-layer extraction backed by the pdf-extract crate.
pub struct PdfProcessor;

impl PdfProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl PageTextExtractor for PdfProcessor {
    fn extract_pages(&self, data: &[u8]) -> PackslipResult<Vec<String>> {
        let document = Document::load_mem(data)
            .map_err(|e| PackslipError::pdf_processing(e.to_string()))?;
        let page_numbers: Vec<u32> = document.get_pages().into_keys().collect();

        Ok(page_numbers
            .iter()
            .map(|&page| match page_text(&document, &page_numbers, page) {
                Ok(text) => text,
                Err(reason) => {
                    warn!(page, %reason, "Skipping page with unextractable text");
                    String::new()
                }
            })
            .collect())
    }
}

impl Default for PdfProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract one page by isolating it in a single-page copy of the document.
fn page_text(document: &Document, page_numbers: &[u32], page: u32) -> Result<String, String> {
    let mut single = document.clone();
    let others: Vec<u32> = page_numbers.iter().copied().filter(|&n| n != page).collect();
    single.delete_pages(&others);

    let mut bytes = Vec::new();
    single
        .save_to(&mut bytes)
        .map_err(|e| format!("page copy failed: {}", e))?;

    match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(&bytes))) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<String>() {
        format!("text extractor panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        format!("text extractor panicked: {}", message)
    } else {
        "text extractor panicked".to_string()
    }
}
