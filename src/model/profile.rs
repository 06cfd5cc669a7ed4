//! Per-document profile computed once before detection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::SourceMetadata;

/// Body font size assumed when a document provides no usable sizes.
pub const DEFAULT_BODY_FONT_SIZE: f32 = 12.0;

/// Broad document genre used to adapt strategy thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Papers and reports with abstract/methodology sections
    Academic,
    /// Corporate and financial documents
    Business,
    /// Specifications and manuals
    Technical,
    /// Long-form books with chapters
    Book,
    /// Fill-in forms
    Form,
    /// Anything else
    #[default]
    General,
}

impl DocumentType {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Academic => "academic",
            DocumentType::Business => "business",
            DocumentType::Technical => "technical",
            DocumentType::Book => "book",
            DocumentType::Form => "form",
            DocumentType::General => "general",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dominant script of the document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Chinese,
    Japanese,
    Arabic,
    Cyrillic,
    Unknown,
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Coarse layout classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutType {
    #[default]
    SingleColumn,
    MultiColumn,
    Sidebar,
}

/// Average page margins in points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

/// Layout characteristics of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutInfo {
    /// Most common column count over sampled pages
    pub columns: usize,
    /// Average margins over sampled pages
    pub margins: Margins,
    /// Majority page orientation
    pub orientation: Orientation,
    /// Repeated text near the top of pages
    pub has_headers: bool,
    /// Repeated text or page numbers near the bottom of pages
    pub has_footers: bool,
    /// Clusters of narrow blocks in the outer page margins
    pub has_sidebars: bool,
    /// Derived classification
    pub layout_type: LayoutType,
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self {
            columns: 1,
            margins: Margins::default(),
            orientation: Orientation::Portrait,
            has_headers: false,
            has_footers: false,
            has_sidebars: false,
            layout_type: LayoutType::SingleColumn,
        }
    }
}

/// Font usage statistics over the sampled pages.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FormattingStats {
    pub unique_fonts: usize,
    pub unique_font_sizes: usize,
    pub most_common_font: Option<String>,
    pub most_common_size: Option<f32>,
    /// (min, max) font size
    pub font_size_range: (f32, f32),
    /// Mean of the most-common-font and most-common-size frequency ratios
    pub consistency: f64,
}

/// Read-only characterization of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentProfile {
    pub page_count: u32,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub layout: LayoutInfo,
    /// 1-indexed pages that look scanned or unreadable
    pub ocr_pages: BTreeSet<u32>,
    pub metadata: SourceMetadata,
    pub language: Language,
    pub formatting: FormattingStats,
    pub has_toc: bool,
    pub has_images: bool,
    /// Average block area over page area, in [0, 1]
    pub text_density: f64,
    /// Statistical mode of block font sizes
    pub body_font_size: f32,
    /// Set when profiling failed and defaults were substituted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Default for DocumentProfile {
    fn default() -> Self {
        Self {
            page_count: 0,
            doc_type: DocumentType::General,
            layout: LayoutInfo::default(),
            ocr_pages: BTreeSet::new(),
            metadata: SourceMetadata::default(),
            language: Language::English,
            formatting: FormattingStats::default(),
            has_toc: false,
            has_images: false,
            text_density: 0.0,
            body_font_size: DEFAULT_BODY_FONT_SIZE,
            error: None,
        }
    }
}

impl DocumentProfile {
    /// Profile substituted when profiling fails.
    pub fn degraded(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Whether this profile carries real measurements.
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}
