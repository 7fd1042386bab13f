//! Upload Orchestrator
//!
//! Turns an uploaded PDF into the shipment CSV: page text extraction, batched
//! AI extraction, shipment derivation and export.

use packslip_models::{ExtractionRecord, PageText, ShipmentRecord};
use packslip_utils::{shipments_to_csv, PackslipError, PackslipResult};
use std::sync::Arc;
use tracing::info;

use crate::extraction::SlipExtractor;
use crate::pdf_processor::PageTextExtractor;

pub struct UploadOrchestrator {
    extractor: Arc<SlipExtractor>,
    pdf: Arc<dyn PageTextExtractor>,
    batch_size: usize,
}

impl UploadOrchestrator {
    pub fn new(
        extractor: Arc<SlipExtractor>,
        pdf: Arc<dyn PageTextExtractor>,
        batch_size: usize,
    ) -> Self {
        Self {
            extractor,
            pdf,
            batch_size: batch_size.max(1),
        }
    }

    /// Full upload pipeline: PDF bytes in, CSV bytes out.
    pub async fn process_pdf(&self, data: Vec<u8>) -> PackslipResult<Vec<u8>> {
        let pages = self.readable_pages(data).await?;
        let records = self.extract_records(&pages).await?;

        info!(
            records = records.len(),
            pages = pages.len(),
            "Extraction complete"
        );

        let shipments: Vec<ShipmentRecord> =
            records.into_iter().map(ShipmentRecord::from).collect();
        shipments_to_csv(&shipments)
    }

    /// Pages that carry text, in document order.
    pub async fn readable_pages(&self, data: Vec<u8>) -> PackslipResult<Vec<PageText>> {
        let pdf = Arc::clone(&self.pdf);
        let texts = tokio::task::spawn_blocking(move || pdf.extract_pages(&data))
            .await
            .map_err(|e| PackslipError::pdf_processing(format!("text extraction aborted: {}", e)))??;

        let total_pages = texts.len();
        let pages: Vec<PageText> = texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| PageText::new(index, text))
            .filter(|page| !page.is_blank())
            .collect();

        info!(total_pages, readable_pages = pages.len(), "PDF text extracted");

        if pages.is_empty() {
            return Err(PackslipError::NoReadableText);
        }
        Ok(pages)
    }

    /// Run the pages through the extractor in fixed-size batches, one batch at a time.
    pub async fn extract_records(&self, pages: &[PageText]) -> PackslipResult<Vec<ExtractionRecord>> {
        let total_batches = pages.len().div_ceil(self.batch_size);
        info!(
            pages = pages.len(),
            total_batches,
            batch_size = self.batch_size,
            "Processing pages in batches"
        );

        let mut records = Vec::new();
        for (number, batch) in pages.chunks(self.batch_size).enumerate() {
            let batch_records = self.extractor.extract_batch(batch).await;
            let found = batch_records.len();
            records.extend(batch_records);

            let processed = (pages.len()).min((number + 1) * self.batch_size);
            info!(
                "Completed batch {}/{}: {} records found, {}/{} pages processed, {} total records",
                number + 1,
                total_batches,
                found,
                processed,
                pages.len(),
                records.len()
            );
        }

        if records.is_empty() {
            return Err(PackslipError::NoValidRecords);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ExtractionSettings;
    use crate::pdf_processor::tests::{make_pdf_with_broken_pages, make_test_pdf};
    use crate::pdf_processor::PdfProcessor;
    use crate::rate_limiter::RateLimiter;
    use crate::testing::{prompt_page_numbers, MockCompletionClient};
    use packslip_models::CSV_COLUMNS;

    struct StaticPages(Vec<&'static str>);

    impl PageTextExtractor for StaticPages {
        fn extract_pages(&self, _data: &[u8]) -> PackslipResult<Vec<String>> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    fn orchestrator(
        client: Arc<MockCompletionClient>,
        pdf: Arc<dyn PageTextExtractor>,
        batch_size: usize,
    ) -> UploadOrchestrator {
        let extractor = SlipExtractor::new(
            client,
            Arc::new(RateLimiter::new(1000)),
            ExtractionSettings::default(),
        );
        UploadOrchestrator::new(Arc::new(extractor), pdf, batch_size)
    }

    #[tokio::test]
    async fn test_blank_pages_are_discarded() {
        let client = Arc::new(MockCompletionClient::echo());
        let orchestrator = orchestrator(
            client.clone(),
            Arc::new(StaticPages(vec!["SLIP A", "  \n ", "SLIP C"])),
            10,
        );

        let csv = orchestrator.process_pdf(Vec::new()).await.unwrap();

        assert_eq!(client.call_count(), 1);
        assert_eq!(prompt_page_numbers(&client.prompts()[0]), vec![1, 3]);
        let text = String::from_utf8(csv).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_no_readable_text() {
        let client = Arc::new(MockCompletionClient::echo());
        let orchestrator = orchestrator(client.clone(), Arc::new(StaticPages(vec!["", "   "])), 10);

        let error = orchestrator.process_pdf(Vec::new()).await.unwrap_err();

        assert!(matches!(error, PackslipError::NoReadableText));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_valid_records() {
        let client = Arc::new(MockCompletionClient::scripted(vec![Ok("[]")]));
        let orchestrator = orchestrator(client, Arc::new(StaticPages(vec!["SLIP A"])), 10);

        let error = orchestrator.process_pdf(Vec::new()).await.unwrap_err();

        assert!(matches!(error, PackslipError::NoValidRecords));
        assert_eq!(error.to_string(), "No valid packing slip data found in PDF");
    }

    #[tokio::test]
    async fn test_pages_are_batched_sequentially() {
        let client = Arc::new(MockCompletionClient::echo());
        let texts: Vec<&'static str> = vec!["SLIP"; 25];
        let orchestrator = orchestrator(client.clone(), Arc::new(StaticPages(texts)), 10);

        let pages = orchestrator.readable_pages(Vec::new()).await.unwrap();
        let records = orchestrator.extract_records(&pages).await.unwrap();

        let batches: Vec<Vec<u32>> = client
            .prompts()
            .iter()
            .map(|p| prompt_page_numbers(p))
            .collect();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0], (1..=10).collect::<Vec<u32>>());
        assert_eq!(batches[2], (21..=25).collect::<Vec<u32>>());
        assert_eq!(records.len(), 25);
    }

    #[tokio::test]
    async fn test_pdf_to_csv_end_to_end() {
        let client = Arc::new(MockCompletionClient::echo());
        let orchestrator = orchestrator(client, Arc::new(PdfProcessor::new()), 10);
        let pdf = make_test_pdf(&["SHIP TO JANE DOE 1 GINGER DEFENCE", "SHIP TO JOHN ROE 1 GINGER DEFENCE"]);

        let csv = orchestrator.process_pdf(pdf).await.unwrap();

        let mut reader = csv::Reader::from_reader(csv.as_slice());
        let header: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(header, CSV_COLUMNS.to_vec());
        assert!(!header.iter().any(|h| h == "page_number"));

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "0000000001");
        assert_eq!(&rows[1][0], "0000000002");
        assert_eq!(&rows[1][10], "2");
        assert_eq!(&rows[1][13], "9kg");
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_processing_error() {
        let client = Arc::new(MockCompletionClient::echo());
        let orchestrator = orchestrator(client, Arc::new(PdfProcessor::new()), 10);

        let error = orchestrator.process_pdf(b"%PDF-garbage".to_vec()).await.unwrap_err();

        assert_eq!(error.http_status_code(), 500);
        assert!(error.to_string().starts_with("Error processing PDF"));
    }

    #[tokio::test]
    async fn test_unreadable_page_is_skipped() {
        let client = Arc::new(MockCompletionClient::echo());
        let orchestrator = orchestrator(client.clone(), Arc::new(PdfProcessor::new()), 10);
        let pdf = make_pdf_with_broken_pages(&["SHIP TO JANE DOE", "SHIP TO JOHN ROE"], &[1]);

        let csv = orchestrator.process_pdf(pdf).await.unwrap();

        assert_eq!(prompt_page_numbers(&client.prompts()[0]), vec![1]);
        let rows: Vec<csv::StringRecord> = csv::Reader::from_reader(csv.as_slice())
            .records()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "0000000001");
    }
}
