//! Document profiling.
//!
//! A [`DocumentProfiler`] characterizes a document once, before detection:
//! its type, layout, OCR needs, formatting statistics and body font size.
//! Profiling never fails outright; errors produce a degraded profile with
//! default values so the strategies can still run.

mod layout;
mod ocr;
mod stats;

pub use layout::LayoutAnalyzer;
pub use ocr::OcrDetector;
pub use stats::{most_common, FontStatistics};

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use crate::error::Result;
use crate::model::{DocumentProfile, DocumentType, FormattingStats, Language, SourceDocument};
use crate::rules::{matches_any, Rules};
use crate::source::validate_block;

/// Pages sampled for type, formatting and TOC detection.
const SAMPLE_PAGES: usize = 5;

/// Pages sampled for language detection.
const LANGUAGE_PAGES: usize = 3;

/// Weight of one keyword hit in document type scoring.
const KEYWORD_WEIGHT: f64 = 1.0;

/// Weight of one pattern hit in document type scoring.
const PATTERN_WEIGHT: f64 = 0.5;

/// Computes a [`DocumentProfile`] for a document.
#[derive(Debug, Clone)]
pub struct DocumentProfiler {
    rules: Arc<Rules>,
    layout: LayoutAnalyzer,
    ocr: OcrDetector,
}

impl DocumentProfiler {
    /// Create a profiler sharing the given rule tables.
    pub fn new(rules: Arc<Rules>) -> Self {
        Self {
            rules,
            layout: LayoutAnalyzer::new(),
            ocr: OcrDetector::new(),
        }
    }

    /// Profile a document, returning a degraded profile on failure.
    pub fn profile(&self, doc: &SourceDocument) -> DocumentProfile {
        match self.try_profile(doc) {
            Ok(profile) => profile,
            Err(e) => {
                log::error!("Failed to profile document: {}", e);
                DocumentProfile::degraded(e.to_string())
            }
        }
    }

    /// Profile a document, failing on unusable block data.
    pub fn try_profile(&self, doc: &SourceDocument) -> Result<DocumentProfile> {
        for block in &doc.blocks {
            validate_block(block)?;
        }

        let page_count = doc.page_count();
        Ok(DocumentProfile {
            page_count,
            doc_type: self.detect_document_type(doc),
            layout: self.layout.analyze(doc),
            ocr_pages: self.ocr.detect(doc),
            metadata: doc.metadata.clone(),
            language: detect_language(doc),
            formatting: analyze_formatting(doc),
            has_toc: self.detect_toc(doc),
            has_images: doc.pages.iter().any(|p| !p.images.is_empty()),
            text_density: text_density(doc),
            body_font_size: FontStatistics::from_blocks(&doc.blocks).body_size,
            error: None,
        })
    }

    /// Score each document type against the first pages' text.
    pub fn detect_document_type(&self, doc: &SourceDocument) -> DocumentType {
        let sample = sample_text(doc, SAMPLE_PAGES).to_lowercase();
        if sample.trim().is_empty() {
            return DocumentType::General;
        }

        let scores: Vec<(DocumentType, f64)> = self
            .rules
            .doc_types
            .iter()
            .map(|rule| {
                let keywords = rule.keywords.iter().filter(|k| sample.contains(*k)).count();
                let patterns = rule.patterns.iter().filter(|p| p.is_match(&sample)).count();
                let score = keywords as f64 * KEYWORD_WEIGHT + patterns as f64 * PATTERN_WEIGHT;
                (rule.doc_type, score)
            })
            .collect();

        let best = scores.iter().map(|(_, s)| *s).fold(0.0_f64, f64::max);
        if best <= 0.0 {
            return DocumentType::General;
        }
        let mut leaders = scores.iter().filter(|(_, s)| *s == best);
        match (leaders.next(), leaders.next()) {
            (Some((doc_type, _)), None) => *doc_type,
            _ => DocumentType::General,
        }
    }

    fn detect_toc(&self, doc: &SourceDocument) -> bool {
        doc.page_numbers().into_iter().take(SAMPLE_PAGES).any(|n| {
            let text = page_text(doc, n).to_lowercase();
            matches_any(&self.rules.toc_indicators, &text)
        })
    }
}

fn page_text(doc: &SourceDocument, page: u32) -> String {
    doc.blocks_on_page(page)
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn sample_text(doc: &SourceDocument, pages: usize) -> String {
    doc.page_numbers()
        .into_iter()
        .take(pages)
        .map(|n| page_text(doc, n))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Guess the dominant script of the first pages.
pub fn detect_language(doc: &SourceDocument) -> Language {
    let sample = sample_text(doc, LANGUAGE_PAGES);
    if sample.trim().is_empty() {
        return Language::Unknown;
    }

    let has = |range: std::ops::RangeInclusive<u32>| sample.chars().any(|c| range.contains(&(c as u32)));
    if has(0x4E00..=0x9FFF) {
        Language::Chinese
    } else if has(0x3040..=0x30FF) {
        Language::Japanese
    } else if has(0x0600..=0x06FF) {
        Language::Arabic
    } else if has(0x0400..=0x04FF) {
        Language::Cyrillic
    } else {
        Language::English
    }
}

/// Font usage over the first pages.
pub fn analyze_formatting(doc: &SourceDocument) -> FormattingStats {
    let pages: BTreeSet<u32> = doc.page_numbers().into_iter().take(SAMPLE_PAGES).collect();
    let sampled: Vec<_> = doc
        .blocks
        .iter()
        .filter(|b| pages.contains(&b.page) && !b.trimmed().is_empty())
        .collect();
    if sampled.is_empty() {
        return FormattingStats::default();
    }

    let fonts: Vec<&str> = sampled.iter().map(|b| b.font.as_str()).collect();
    let size_keys: Vec<i32> = sampled.iter().map(|b| (b.font_size * 10.0).round() as i32).collect();
    let total = sampled.len() as f64;

    let unique_fonts = fonts.iter().collect::<HashSet<_>>().len();
    let unique_font_sizes = size_keys.iter().collect::<HashSet<_>>().len();
    let top_font = most_common(fonts.iter().copied());
    let top_size = most_common(size_keys.iter().copied());

    let min_size = sampled.iter().map(|b| b.font_size).fold(f32::INFINITY, f32::min);
    let max_size = sampled.iter().map(|b| b.font_size).fold(f32::NEG_INFINITY, f32::max);

    let font_ratio = top_font.map_or(0.0, |(_, n)| n as f64 / total);
    let size_ratio = top_size.map_or(0.0, |(_, n)| n as f64 / total);

    FormattingStats {
        unique_fonts,
        unique_font_sizes,
        most_common_font: top_font.map(|(f, _)| f.to_string()),
        most_common_size: top_size.map(|(k, _)| k as f32 / 10.0),
        font_size_range: (min_size, max_size),
        consistency: (font_ratio + size_ratio) / 2.0,
    }
}

/// Average share of each page covered by text, capped at 1 per page.
pub fn text_density(doc: &SourceDocument) -> f64 {
    let densities: Vec<f64> = doc
        .page_numbers()
        .into_iter()
        .filter_map(|n| {
            let page = doc.page(n);
            let area = page.area();
            if area <= 0.0 {
                return None;
            }
            let covered: f32 = doc.blocks_on_page(n).map(|b| b.bbox.area().max(0.0)).sum();
            Some(f64::from(covered / area).min(1.0))
        })
        .collect();
    if densities.is_empty() {
        return 0.0;
    }
    densities.iter().sum::<f64>() / densities.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, PageInfo, TextBlock};

    fn profiler() -> DocumentProfiler {
        DocumentProfiler::new(Arc::new(Rules::new().unwrap()))
    }

    fn block(text: &str, page: u32, size: f32) -> TextBlock {
        TextBlock::new(0, text, page, BoundingBox::new(72.0, 100.0, 306.0, 396.0), size)
            .with_font("Helvetica")
    }

    #[test]
    fn test_detect_academic() {
        let doc = SourceDocument::from_blocks(vec![
            block("Abstract", 1, 14.0),
            block("1 Introduction", 1, 14.0),
            block("We report results and a discussion. doi: 10.1000/xyz", 1, 11.0),
        ]);
        assert_eq!(profiler().detect_document_type(&doc), DocumentType::Academic);
    }

    #[test]
    fn test_detect_general_when_nothing_matches() {
        let doc = SourceDocument::from_blocks(vec![block("Hello there", 1, 11.0)]);
        assert_eq!(profiler().detect_document_type(&doc), DocumentType::General);
        let empty = SourceDocument::default();
        assert_eq!(profiler().detect_document_type(&empty), DocumentType::General);
    }

    #[test]
    fn test_tied_types_fall_back_to_general() {
        // "design" scores technical, "preface" scores book
        let doc = SourceDocument::from_blocks(vec![block("preface on design", 1, 11.0)]);
        assert_eq!(profiler().detect_document_type(&doc), DocumentType::General);
    }

    #[test]
    fn test_profile_fields() {
        let doc = SourceDocument::from_blocks(vec![
            block("Contents", 1, 16.0),
            block("1. Introduction 3", 1, 11.0),
            block("Body text on the second page.", 2, 11.0),
        ])
        .with_title("Guide")
        .with_page(PageInfo::letter(1).with_image(BoundingBox::new(0.0, 0.0, 10.0, 10.0)));

        let profile = profiler().profile(&doc);
        assert!(!profile.is_degraded());
        assert_eq!(profile.page_count, 2);
        assert_eq!(profile.body_font_size, 11.0);
        assert!(profile.has_toc);
        assert!(profile.has_images);
        assert_eq!(profile.language, Language::English);
        assert_eq!(profile.metadata.title(), Some("Guide"));
        assert_eq!(profile.formatting.unique_fonts, 1);
        assert_eq!(profile.formatting.unique_font_sizes, 2);
        assert_eq!(profile.formatting.most_common_size, Some(11.0));
        assert!((profile.text_density - 0.375).abs() < 1e-6);
    }

    #[test]
    fn test_non_contiguous_pages() {
        let body = "Body text that runs long enough to count as a real text layer on the page.";
        let doc = SourceDocument::from_blocks(vec![block(body, 1, 11.0), block(body, 10, 11.0)]);

        let profile = profiler().profile(&doc);
        assert_eq!(profile.page_count, 10);
        assert!(profile.ocr_pages.is_empty());
        assert!((profile.text_density - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_blocks_degrade_profile() {
        let mut bad = block("Broken", 1, 11.0);
        bad.font_size = f32::NAN;
        let profile = profiler().profile(&SourceDocument::from_blocks(vec![bad]));
        assert!(profile.is_degraded());
        assert_eq!(profile.doc_type, DocumentType::General);
        assert_eq!(profile.body_font_size, 12.0);
    }

    #[test]
    fn test_detect_language() {
        let doc = SourceDocument::from_blocks(vec![block("Введение", 1, 12.0)]);
        assert_eq!(detect_language(&doc), Language::Cyrillic);
        let doc = SourceDocument::from_blocks(vec![block("概要", 1, 12.0)]);
        assert_eq!(detect_language(&doc), Language::Chinese);
        assert_eq!(detect_language(&SourceDocument::default()), Language::Unknown);
    }
}
