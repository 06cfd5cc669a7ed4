//! Positioned text blocks and the documents that carry them.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text;

/// US Letter page width in points.
pub const LETTER_WIDTH: f32 = 612.0;
/// US Letter page height in points.
pub const LETTER_HEIGHT: f32 = 792.0;

/// Axis-aligned layout box in page coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Box width
    pub width: f32,
    /// Box height
    pub height: f32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Box area, never negative.
    pub fn area(&self) -> f32 {
        (self.width * self.height).max(0.0)
    }

    /// Check that every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// One unit of extracted text with layout and font metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Stable index within the document (reassigned after merge and sort)
    #[serde(default)]
    pub id: usize,
    /// The text content
    pub text: String,
    /// 1-indexed page number
    pub page: u32,
    /// Layout box
    pub bbox: BoundingBox,
    /// Font size in points
    #[serde(default)]
    pub font_size: f32,
    /// Font family name
    #[serde(default)]
    pub font: String,
    /// Whether the font appears to be bold
    #[serde(default)]
    pub is_bold: bool,
    /// Whether the font appears to be italic
    #[serde(default)]
    pub is_italic: bool,
    /// Number of text lines folded into this block
    #[serde(default = "default_line_count")]
    pub line_count: usize,
}

fn default_line_count() -> usize {
    1
}

impl TextBlock {
    /// Create a new regular-weight block.
    pub fn new(id: usize, text: impl Into<String>, page: u32, bbox: BoundingBox, font_size: f32) -> Self {
        Self {
            id,
            text: text.into(),
            page,
            bbox,
            font_size,
            font: String::new(),
            is_bold: false,
            is_italic: false,
            line_count: 1,
        }
    }

    /// Set the font family, deriving bold/italic flags from its name.
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        let lower = self.font.to_lowercase();
        self.is_bold |= lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        self.is_italic |= lower.contains("italic") || lower.contains("oblique");
        self
    }

    /// Mark the block as bold.
    pub fn bold(mut self) -> Self {
        self.is_bold = true;
        self
    }

    /// Mark the block as italic.
    pub fn italic(mut self) -> Self {
        self.is_italic = true;
        self
    }

    /// Trimmed text content.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    /// Number of characters in the trimmed text.
    pub fn char_count(&self) -> usize {
        self.trimmed().chars().count()
    }

    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        text::word_count(&self.text)
    }

    /// Left edge.
    pub fn x(&self) -> f32 {
        self.bbox.x
    }

    /// Top edge.
    pub fn y(&self) -> f32 {
        self.bbox.y
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.bbox.bottom()
    }

    /// Vertical whitespace between the bottom of `self` and the top of `next`.
    ///
    /// Returns `None` when the blocks sit on different pages.
    pub fn gap_to(&self, next: &TextBlock) -> Option<f32> {
        (self.page == next.page).then(|| next.bbox.y - self.bottom())
    }

    /// Check whether the block carries usable font information.
    pub fn has_font_info(&self) -> bool {
        !self.font.is_empty() && self.font_size > 0.0
    }
}

/// Page geometry reported by the block source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    /// 1-indexed page number
    pub number: u32,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Placement boxes of images drawn on the page
    #[serde(default)]
    pub images: Vec<BoundingBox>,
}

impl PageInfo {
    /// Create a page with the given size.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            images: Vec::new(),
        }
    }

    /// Create a US Letter page.
    pub fn letter(number: u32) -> Self {
        Self::new(number, LETTER_WIDTH, LETTER_HEIGHT)
    }

    /// Add an image placement.
    pub fn with_image(mut self, bbox: BoundingBox) -> Self {
        self.images.push(bbox);
        self
    }

    /// Page area.
    pub fn area(&self) -> f32 {
        (self.width * self.height).max(0.0)
    }

    /// Whether the page is wider than tall.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

/// Document information dictionary values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Document title
    pub title: Option<String>,
    /// Document author
    pub author: Option<String>,
    /// Document subject
    pub subject: Option<String>,
    /// Creation date
    pub created: Option<DateTime<Utc>>,
    /// Last modification date
    pub modified: Option<DateTime<Utc>>,
}

impl SourceMetadata {
    /// The title, if present and not blank.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Everything the block source yields for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Document metadata
    #[serde(default)]
    pub metadata: SourceMetadata,
    /// Page geometry, possibly empty when the source does not report it
    #[serde(default)]
    pub pages: Vec<PageInfo>,
    /// Text blocks in reading order
    #[serde(default)]
    pub blocks: Vec<TextBlock>,
}

impl SourceDocument {
    /// Create a document from blocks alone.
    pub fn from_blocks(blocks: Vec<TextBlock>) -> Self {
        Self {
            blocks,
            ..Default::default()
        }
    }

    /// Set the metadata title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }

    /// Add page geometry.
    pub fn with_page(mut self, page: PageInfo) -> Self {
        self.pages.push(page);
        self
    }

    /// Number of pages, taken from page geometry or the highest block page.
    pub fn page_count(&self) -> u32 {
        let from_blocks = self.blocks.iter().map(|b| b.page).max().unwrap_or(0);
        let from_pages = self.pages.iter().map(|p| p.number).max().unwrap_or(0);
        from_blocks.max(from_pages)
    }

    /// Numbers of the pages that appear in page geometry or carry blocks.
    ///
    /// Gaps in the numbering are not filled in.
    pub fn page_numbers(&self) -> BTreeSet<u32> {
        self.pages
            .iter()
            .map(|p| p.number)
            .chain(self.blocks.iter().map(|b| b.page))
            .filter(|&n| n > 0)
            .collect()
    }

    /// Geometry for a page, defaulting to US Letter when unknown.
    pub fn page(&self, number: u32) -> PageInfo {
        self.pages
            .iter()
            .find(|p| p.number == number)
            .cloned()
            .unwrap_or_else(|| PageInfo::letter(number))
    }

    /// Blocks on one page.
    pub fn blocks_on_page(&self, number: u32) -> impl Iterator<Item = &TextBlock> {
        self.blocks.iter().filter(move |b| b.page == number)
    }

    /// Check if the document has no text.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_name_flags() {
        let block = TextBlock::new(0, "Title", 1, BoundingBox::default(), 12.0)
            .with_font("Helvetica-BoldOblique");
        assert!(block.is_bold);
        assert!(block.is_italic);

        let block = TextBlock::new(0, "Body", 1, BoundingBox::default(), 12.0).with_font("Times-Roman");
        assert!(!block.is_bold);
        assert!(!block.is_italic);
    }

    #[test]
    fn test_gap_to() {
        let a = TextBlock::new(0, "a", 1, BoundingBox::new(72.0, 100.0, 200.0, 14.0), 12.0);
        let b = TextBlock::new(1, "b", 1, BoundingBox::new(72.0, 130.0, 200.0, 14.0), 12.0);
        let c = TextBlock::new(2, "c", 2, BoundingBox::new(72.0, 72.0, 200.0, 14.0), 12.0);
        assert_eq!(a.gap_to(&b), Some(16.0));
        assert_eq!(b.gap_to(&c), None);
    }

    #[test]
    fn test_page_numbers_skip_gaps() {
        let doc = SourceDocument::from_blocks(vec![
            TextBlock::new(0, "a", 10, BoundingBox::default(), 12.0),
            TextBlock::new(1, "b", 1, BoundingBox::default(), 12.0),
            TextBlock::new(2, "c", 10, BoundingBox::default(), 12.0),
        ])
        .with_page(PageInfo::letter(4));
        assert_eq!(doc.page_numbers().into_iter().collect::<Vec<_>>(), vec![1, 4, 10]);
        assert_eq!(doc.page_count(), 10);
        assert!(SourceDocument::default().page_numbers().is_empty());
    }

    #[test]
    fn test_page_defaults_to_letter() {
        let doc = SourceDocument::from_blocks(vec![TextBlock::new(
            0,
            "x",
            3,
            BoundingBox::default(),
            12.0,
        )]);
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.page_numbers().into_iter().collect::<Vec<_>>(), vec![3]);
        let page = doc.page(2);
        assert_eq!(page.width, LETTER_WIDTH);
        assert_eq!(page.height, LETTER_HEIGHT);
    }

    #[test]
    fn test_blank_metadata_title() {
        let meta = SourceMetadata {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(meta.title(), None);
    }

    #[test]
    fn test_block_deserialize_defaults() {
        let json = r#"{"text":"Intro","page":1,"bbox":{"x":1.0,"y":2.0,"width":3.0,"height":4.0}}"#;
        let block: TextBlock = serde_json::from_str(json).unwrap();
        assert_eq!(block.line_count, 1);
        assert_eq!(block.font_size, 0.0);
        assert!(!block.has_font_info());
    }
}
