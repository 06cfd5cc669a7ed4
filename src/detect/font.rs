//! Font-based heading detection.

use super::strategy::{body_size, HeadingStrategy, StrategyKind};
use crate::error::Result;
use crate::model::{DocumentProfile, HeadingLevel, HeadingPrediction, TextBlock};
use crate::profile::FontStatistics;
use crate::text;

/// Size ratio of a document title.
pub const TITLE_SIZE_RATIO: f32 = 1.3;
/// Size ratio of a first-level heading.
pub const H1_SIZE_RATIO: f32 = 1.2;
/// Size ratio of a second-level heading.
pub const H2_SIZE_RATIO: f32 = 1.1;
/// Size ratio at which body-sized text may still be a heading.
pub const H3_SIZE_RATIO: f32 = 1.0;

/// Bold text down to this ratio still counts as heading-sized.
const BOLD_MIN_RATIO: f32 = 0.9;

/// Scores blocks by font size relative to body text, boldness and case.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontStrategy;

impl FontStrategy {
    /// Create a new font strategy.
    pub fn new() -> Self {
        Self
    }

    fn is_heading_by_font(block: &TextBlock, ratio: f32) -> bool {
        if ratio >= H3_SIZE_RATIO {
            return true;
        }
        let words = block.word_count();
        if block.is_bold && text::char_len(&block.text) < 200 && words <= 15 && ratio >= BOLD_MIN_RATIO {
            return true;
        }
        text::is_upper(&block.text) && words < 10
    }

    fn level(block: &TextBlock, stats: &FontStatistics) -> HeadingLevel {
        if stats.is_empty() {
            return HeadingLevel::H1;
        }
        match stats.rank_of(block.font_size) {
            0 => HeadingLevel::H1,
            1 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }

    fn confidence(block: &TextBlock, ratio: f32) -> f64 {
        let mut confidence: f64 = if ratio >= TITLE_SIZE_RATIO {
            0.4
        } else if ratio >= H1_SIZE_RATIO {
            0.3
        } else if ratio >= H2_SIZE_RATIO {
            0.2
        } else if ratio >= H3_SIZE_RATIO {
            0.15
        } else {
            0.1
        };

        if block.is_bold {
            confidence += if ratio >= BOLD_MIN_RATIO { 0.3 } else { 0.2 };
        }

        let length = text::char_len(&block.text);
        if block.word_count() <= 15 && length < 150 {
            confidence += 0.25;
        } else if length < 50 {
            confidence += 0.2;
        } else if length < 100 {
            confidence += 0.1;
        }

        if block.page == 1 && block.y() < 200.0 {
            confidence += 0.1;
        }

        confidence.min(1.0)
    }
}

impl HeadingStrategy for FontStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Font
    }

    fn detect(&self, blocks: &[TextBlock], profile: &DocumentProfile) -> Result<Vec<HeadingPrediction>> {
        let body = body_size(profile);
        let stats = FontStatistics::from_blocks(blocks);

        Ok(blocks
            .iter()
            .map(|block| {
                let ratio = block.font_size / body;
                if Self::is_heading_by_font(block, ratio) {
                    HeadingPrediction::heading(
                        block.id,
                        Self::level(block, &stats),
                        Self::confidence(block, ratio),
                    )
                } else {
                    HeadingPrediction::not_heading(block.id)
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;

    fn block(id: usize, text: &str, size: f32, y: f32) -> TextBlock {
        TextBlock::new(id, text, 1, BoundingBox::new(72.0, y, 200.0, size), size)
    }

    fn profile(body: f32) -> DocumentProfile {
        DocumentProfile {
            body_font_size: body,
            ..Default::default()
        }
    }

    #[test]
    fn test_large_bold_block_is_h1() {
        let blocks = vec![
            block(0, "Introduction", 20.0, 300.0).bold(),
            block(1, "plain body text goes here and continues", 11.0, 330.0),
        ];
        let predictions = FontStrategy::new().detect(&blocks, &profile(12.0)).unwrap();
        assert!(predictions[0].is_heading);
        assert_eq!(predictions[0].level, Some(HeadingLevel::H1));
        assert!(predictions[0].confidence > 0.7);
        assert!(!predictions[1].is_heading);
        assert_eq!(predictions[1].level, None);
    }

    #[test]
    fn test_levels_by_size_rank() {
        let blocks = vec![
            block(0, "Title", 24.0, 100.0),
            block(1, "Section", 18.0, 200.0),
            block(2, "Subsection", 14.0, 300.0),
        ];
        let predictions = FontStrategy::new().detect(&blocks, &profile(12.0)).unwrap();
        let levels: Vec<_> = predictions.iter().map(|p| p.level).collect();
        assert_eq!(
            levels,
            vec![Some(HeadingLevel::H1), Some(HeadingLevel::H2), Some(HeadingLevel::H3)]
        );
    }

    #[test]
    fn test_all_caps_small_text() {
        let blocks = vec![block(0, "KEY FINDINGS", 10.0, 400.0)];
        let predictions = FontStrategy::new().detect(&blocks, &profile(12.0)).unwrap();
        assert!(predictions[0].is_heading);
    }

    #[test]
    fn test_confidence_first_page_bonus() {
        let top = FontStrategy::confidence(&block(0, "Overview", 12.0, 50.0), 1.0);
        let lower = FontStrategy::confidence(&block(0, "Overview", 12.0, 500.0), 1.0);
        assert!((top - lower - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input() {
        let predictions = FontStrategy::new().detect(&[], &profile(12.0)).unwrap();
        assert!(predictions.is_empty());
    }
}
