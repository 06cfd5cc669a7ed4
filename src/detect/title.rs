//! Document title detection.

use crate::model::{SourceMetadata, TextBlock, TitleInfo, TitleSource, DEFAULT_BODY_FONT_SIZE};
use crate::text;

use super::font::TITLE_SIZE_RATIO;

/// Confidence of a title taken from document metadata.
const METADATA_CONFIDENCE: f64 = 0.9;

/// Confidence of the largest-text fallback.
const FALLBACK_CONFIDENCE: f64 = 0.3;

/// Minimum score for a detected title.
const THRESHOLD: f64 = 0.5;

/// Only this many first-page blocks are considered.
const MAX_CANDIDATES: usize = 10;

/// Horizontal center assumed for pages of unknown width.
const ESTIMATED_CENTER: f32 = 400.0;

/// Finds the document title in metadata or on the first page.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleDetector;

impl TitleDetector {
    /// Create a title detector.
    pub fn new() -> Self {
        Self
    }

    /// Resolve a title. Returns `None` only when there is no metadata title
    /// and no text on page 1.
    pub fn detect(&self, blocks: &[TextBlock], metadata: &SourceMetadata) -> Option<TitleInfo> {
        if let Some(title) = metadata.title() {
            return Some(TitleInfo {
                text: title.to_string(),
                confidence: METADATA_CONFIDENCE,
                source: TitleSource::Metadata,
                block_id: None,
            });
        }

        let first_page: Vec<&TextBlock> = blocks.iter().filter(|b| b.page == 1).collect();
        if first_page.is_empty() {
            return None;
        }

        let avg_size = average_size(blocks);
        let mut best: Option<(&TextBlock, f64)> = None;
        for block in first_page.iter().take(MAX_CANDIDATES) {
            let score = Self::score(block, avg_size);
            if score > THRESHOLD && best.map_or(true, |(_, s)| score > s) {
                best = Some((block, score));
            }
        }
        if let Some((block, score)) = best {
            return Some(TitleInfo {
                text: block.trimmed().to_string(),
                confidence: score,
                source: TitleSource::Detection,
                block_id: Some(block.id),
            });
        }

        let mut largest = first_page[0];
        for block in &first_page[1..] {
            if block.font_size > largest.font_size {
                largest = block;
            }
        }
        Some(TitleInfo {
            text: largest.trimmed().to_string(),
            confidence: FALLBACK_CONFIDENCE,
            source: TitleSource::Fallback,
            block_id: None,
        })
    }

    fn score(block: &TextBlock, avg_size: f32) -> f64 {
        let text = block.trimmed();
        if text.is_empty() {
            return 0.0;
        }

        let mut score: f64 = 0.0;
        if block.font_size > avg_size * TITLE_SIZE_RATIO {
            score += 0.3;
        }
        if block.y() < 200.0 {
            score += 0.2;
        }
        if text::capitalized_word_ratio(text) > 0.7 || text::is_upper(text) {
            score += 0.2;
        }
        if (2..=15).contains(&text::word_count(text)) {
            score += 0.2;
        }
        if !text.ends_with(['.', '!', '?', ',', ';', ':']) {
            score += 0.1;
        }
        let center = block.x() + block.bbox.width / 2.0;
        if (center - ESTIMATED_CENTER).abs() < 100.0 {
            score += 0.1;
        }
        if block.is_bold {
            score += 0.1;
        }
        score.min(1.0)
    }
}

fn average_size(blocks: &[TextBlock]) -> f32 {
    let sizes: Vec<f32> = blocks.iter().map(|b| b.font_size).filter(|s| *s > 0.0).collect();
    if sizes.is_empty() {
        DEFAULT_BODY_FONT_SIZE
    } else {
        sizes.iter().sum::<f32>() / sizes.len() as f32
    }
}
