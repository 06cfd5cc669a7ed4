//! Detection of pages whose text layer is missing or unusable.

use std::collections::BTreeSet;

use crate::model::{PageInfo, SourceDocument, TextBlock};
use crate::text;

/// Flags pages that need OCR.
#[derive(Debug, Clone)]
pub struct OcrDetector {
    /// Minimum characters of extracted text per page
    pub min_text_length: usize,
    /// Minimum share of readable characters
    pub readable_ratio_threshold: f64,
    /// Minimum share of characters carrying font metadata
    pub font_info_threshold: f64,
    /// Image coverage above which a page counts as image-dominated
    pub image_coverage_threshold: f32,
    /// Text below this length on a page with images counts as image-only
    pub image_text_length: usize,
}

impl Default for OcrDetector {
    fn default() -> Self {
        Self {
            min_text_length: 50,
            readable_ratio_threshold: 0.7,
            font_info_threshold: 0.5,
            image_coverage_threshold: 0.8,
            image_text_length: 10,
        }
    }
}

impl OcrDetector {
    /// Create a detector with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pages (1-indexed) that need OCR, among the pages the document has.
    pub fn detect(&self, doc: &SourceDocument) -> BTreeSet<u32> {
        let pages: BTreeSet<u32> = doc
            .page_numbers()
            .into_iter()
            .filter(|&n| {
                let blocks: Vec<&TextBlock> = doc.blocks_on_page(n).collect();
                self.needs_ocr(&doc.page(n), &blocks)
            })
            .collect();
        log::info!("Detected {} pages needing OCR", pages.len());
        pages
    }

    /// Whether a single page needs OCR.
    pub fn needs_ocr(&self, page: &PageInfo, blocks: &[&TextBlock]) -> bool {
        let page_text = blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let page_text = page_text.trim();
        let length = text::char_len(page_text);

        length < self.min_text_length
            || text::readable_ratio(page_text) < self.readable_ratio_threshold
            || font_info_ratio(blocks) < self.font_info_threshold
            || self.is_image_dominated(page, length)
    }

    fn is_image_dominated(&self, page: &PageInfo, text_length: usize) -> bool {
        if page.images.is_empty() {
            return false;
        }
        if text_length < self.image_text_length {
            return true;
        }
        let page_area = page.area();
        if page_area <= 0.0 {
            return false;
        }
        let covered: f32 = page.images.iter().map(|img| img.area().max(0.0)).sum();
        covered / page_area > self.image_coverage_threshold
    }
}

/// Share of characters in blocks that carry a font name and positive size.
fn font_info_ratio(blocks: &[&TextBlock]) -> f64 {
    let mut total = 0usize;
    let mut with_font = 0usize;
    for block in blocks {
        let chars = block.char_count();
        total += chars;
        if block.has_font_info() {
            with_font += chars;
        }
    }
    if total == 0 {
        return 0.0;
    }
    with_font as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;

    const BODY: &str = "This page carries a perfectly ordinary paragraph of extracted body text.";

    fn block(text: &str, page: u32) -> TextBlock {
        TextBlock::new(0, text, page, BoundingBox::new(72.0, 100.0, 400.0, 40.0), 11.0)
            .with_font("Times-Roman")
    }

    #[test]
    fn test_text_page_does_not_need_ocr() {
        let detector = OcrDetector::new();
        let b = block(BODY, 1);
        assert!(!detector.needs_ocr(&PageInfo::letter(1), &[&b]));
    }

    #[test]
    fn test_short_page_needs_ocr() {
        let detector = OcrDetector::new();
        let b = block("Scanned", 1);
        assert!(detector.needs_ocr(&PageInfo::letter(1), &[&b]));
        assert!(detector.needs_ocr(&PageInfo::letter(1), &[]));
    }

    #[test]
    fn test_garbled_text_needs_ocr() {
        let detector = OcrDetector::new();
        let garbled: String = std::iter::repeat('\u{E001}').take(60).collect();
        let b = block(&garbled, 1);
        assert!(detector.needs_ocr(&PageInfo::letter(1), &[&b]));
    }

    #[test]
    fn test_missing_font_info_needs_ocr() {
        let detector = OcrDetector::new();
        let b = TextBlock::new(0, BODY, 1, BoundingBox::new(72.0, 100.0, 400.0, 40.0), 0.0);
        assert!(detector.needs_ocr(&PageInfo::letter(1), &[&b]));
    }

    #[test]
    fn test_image_dominated_page() {
        let detector = OcrDetector::new();
        let page = PageInfo::letter(1).with_image(BoundingBox::new(0.0, 0.0, 612.0, 700.0));
        let b = block(BODY, 1);
        assert!(detector.needs_ocr(&page, &[&b]));
    }

    #[test]
    fn test_detect_over_document() {
        let doc = SourceDocument::from_blocks(vec![block(BODY, 1), block("p2", 2)]);
        let pages = OcrDetector::new().detect(&doc);
        assert_eq!(pages.into_iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_detect_skips_missing_pages() {
        let doc = SourceDocument::from_blocks(vec![block(BODY, 1), block(BODY, 10)]);
        assert!(OcrDetector::new().detect(&doc).is_empty());

        let doc = SourceDocument::from_blocks(vec![block(BODY, 1), block("p9", 9), block(BODY, 50_000_000)]);
        let pages = OcrDetector::new().detect(&doc);
        assert_eq!(pages.into_iter().collect::<Vec<_>>(), vec![9]);
    }
}
