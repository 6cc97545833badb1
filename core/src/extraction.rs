//! Text extraction from uploaded policy documents.
//!
//! PDF payloads are read page by page with `lopdf`. If any page fails, the
//! whole payload is handed to `pdf-extract` instead. Pages are joined with a
//! blank line.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::error::{CoreError, Result};

/// Separator placed between extracted pages.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// A document as supplied by the caller.
#[derive(Debug, Clone)]
pub enum DocumentInput {
    /// Binary, page-structured payload (PDF).
    Pdf(Vec<u8>),

    /// Text the caller already has.
    Text(String),
}

/// A strategy that turns a binary payload into per-page text.
pub trait PageExtractor: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Extract the text of every page, failing if any page fails.
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>>;
}

/// Page-by-page extraction with `lopdf`.
#[derive(Debug, Default)]
pub struct LopdfExtractor;

impl PageExtractor for LopdfExtractor {
    fn name(&self) -> &str {
        "lopdf"
    }

    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>> {
        let document = lopdf::Document::load_mem(bytes)
            .map_err(|e| CoreError::Extraction(format!("could not parse PDF: {e}")))?;

        let pages = document.get_pages();
        let mut texts = Vec::with_capacity(pages.len());
        for page_number in pages.keys() {
            let text = document.extract_text(&[*page_number]).map_err(|e| {
                CoreError::Extraction(format!("page {page_number} could not be read: {e}"))
            })?;
            texts.push(text);
        }

        debug!("lopdf extracted {} pages", texts.len());
        Ok(texts)
    }
}

/// Whole-document extraction with `pdf-extract`.
#[derive(Debug, Default)]
pub struct PdfExtractExtractor;

impl PageExtractor for PdfExtractExtractor {
    fn name(&self) -> &str {
        "pdf-extract"
    }

    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>> {
        // pdf-extract panics on some malformed inputs.
        let text = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(bytes)
        }))
        .map_err(|_| CoreError::Extraction("pdf-extract panicked".to_string()))?
        .map_err(|e| CoreError::Extraction(format!("pdf-extract failed: {e}")))?;

        Ok(text.split('\u{c}').map(str::to_string).collect())
    }
}

/// Converts a [`DocumentInput`] into a single text blob.
pub struct TextExtractor {
    primary: Box<dyn PageExtractor>,
    secondary: Box<dyn PageExtractor>,
}

impl TextExtractor {
    /// Create an extractor with `lopdf` as primary and `pdf-extract` as secondary.
    pub fn new() -> Self {
        Self::with_strategies(Box::new(LopdfExtractor), Box::new(PdfExtractExtractor))
    }

    /// Create an extractor with custom strategies.
    pub fn with_strategies(
        primary: Box<dyn PageExtractor>,
        secondary: Box<dyn PageExtractor>,
    ) -> Self {
        Self { primary, secondary }
    }

    /// Extract the text of a document.
    pub fn extract(&self, input: DocumentInput) -> Result<String> {
        let bytes = match input {
            DocumentInput::Text(text) => return Ok(text),
            DocumentInput::Pdf(bytes) => bytes,
        };

        if bytes.is_empty() {
            return Err(CoreError::Extraction("document is empty".to_string()));
        }

        let primary_error = match Self::run(self.primary.as_ref(), &bytes) {
            Ok(text) => return Ok(text),
            Err(e) => e,
        };
        warn!(
            "{} extraction failed, retrying with {}: {primary_error}",
            self.primary.name(),
            self.secondary.name()
        );

        Self::run(self.secondary.as_ref(), &bytes).map_err(|secondary_error| {
            CoreError::Extraction(format!(
                "{}: {primary_error}; {}: {secondary_error}",
                self.primary.name(),
                self.secondary.name()
            ))
        })
    }

    fn run(strategy: &dyn PageExtractor, bytes: &[u8]) -> Result<String> {
        let pages = strategy.extract_pages(bytes)?;
        let text = pages.join(PAGE_SEPARATOR);
        if text.trim().is_empty() {
            return Err(CoreError::Extraction("no text found".to_string()));
        }
        Ok(text)
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Object, Stream, dictionary};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedPages {
        pages: Option<Vec<&'static str>>,
        calls: Arc<AtomicUsize>,
    }

    impl FixedPages {
        fn ok(pages: Vec<&'static str>) -> (Box<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let strategy = Self {
                pages: Some(pages),
                calls: Arc::clone(&calls),
            };
            (Box::new(strategy), calls)
        }

        fn failing() -> (Box<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let strategy = Self {
                pages: None,
                calls: Arc::clone(&calls),
            };
            (Box::new(strategy), calls)
        }
    }

    impl PageExtractor for FixedPages {
        fn name(&self) -> &str {
            "fixed"
        }

        fn extract_pages(&self, _bytes: &[u8]) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages
                .as_ref()
                .map(|pages| pages.iter().map(|p| (*p).to_string()).collect())
                .ok_or_else(|| CoreError::Extraction("page 2 unreadable".to_string()))
        }
    }

    /// Build a PDF with one line of Courier text per page.
    fn pdf_with_pages(lines: &[&str]) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for line in lines {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*line)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = i64::try_from(kids.len()).unwrap();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_lopdf_reads_pages_in_order() {
        let bytes = pdf_with_pages(&["Your deductible is $500.", "Copay 20% applies."]);

        let pages = LopdfExtractor.extract_pages(&bytes).unwrap();
        let trimmed: Vec<&str> = pages.iter().map(|p| p.trim()).collect();
        assert_eq!(trimmed, vec!["Your deductible is $500.", "Copay 20% applies."]);

        let text = TextExtractor::new()
            .extract(DocumentInput::Pdf(bytes))
            .unwrap();
        let first = text.find("Your deductible is $500.").unwrap();
        let second = text.find("Copay 20% applies.").unwrap();
        assert!(first < second);
        assert!(text[first..second].contains(PAGE_SEPARATOR));
    }

    #[test]
    fn test_text_input_passes_through() {
        let extractor = TextExtractor::new();
        let text = extractor
            .extract(DocumentInput::Text("Your deductible is $500.".to_string()))
            .unwrap();
        assert_eq!(text, "Your deductible is $500.");
    }

    #[test]
    fn test_pages_joined_with_blank_line() {
        let (primary, _) = FixedPages::ok(vec!["Page one", "Page two"]);
        let (secondary, secondary_calls) = FixedPages::ok(vec!["unused"]);
        let extractor = TextExtractor::with_strategies(primary, secondary);

        let text = extractor.extract(DocumentInput::Pdf(vec![1, 2, 3])).unwrap();

        assert_eq!(text, "Page one\n\nPage two");
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_secondary_used_when_primary_fails() {
        let (primary, primary_calls) = FixedPages::failing();
        let (secondary, secondary_calls) = FixedPages::ok(vec!["Recovered text"]);
        let extractor = TextExtractor::with_strategies(primary, secondary);

        let text = extractor.extract(DocumentInput::Pdf(vec![1])).unwrap();

        assert_eq!(text, "Recovered text");
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_blank_primary_output_falls_back() {
        let (primary, _) = FixedPages::ok(vec!["  ", "\n"]);
        let (secondary, _) = FixedPages::ok(vec!["Scanned text"]);
        let extractor = TextExtractor::with_strategies(primary, secondary);

        let text = extractor.extract(DocumentInput::Pdf(vec![1])).unwrap();
        assert_eq!(text, "Scanned text");
    }

    #[test]
    fn test_both_strategies_failing_is_extraction_error() {
        let (primary, _) = FixedPages::failing();
        let (secondary, _) = FixedPages::failing();
        let extractor = TextExtractor::with_strategies(primary, secondary);

        let err = extractor.extract(DocumentInput::Pdf(vec![1])).unwrap_err();
        assert!(matches!(err, CoreError::Extraction(_)));
    }

    #[test]
    fn test_garbage_bytes_fail_with_real_backends() {
        let extractor = TextExtractor::new();
        let err = extractor
            .extract(DocumentInput::Pdf(b"definitely not a pdf".to_vec()))
            .unwrap_err();
        assert!(matches!(err, CoreError::Extraction(_)));
    }

    #[test]
    fn test_empty_payload_is_extraction_error() {
        let extractor = TextExtractor::new();
        let err = extractor.extract(DocumentInput::Pdf(Vec::new())).unwrap_err();
        assert!(matches!(err, CoreError::Extraction(_)));
    }
}
