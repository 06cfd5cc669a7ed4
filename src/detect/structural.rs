//! Heading detection from whitespace, indentation and placement.

use std::collections::HashMap;

use super::strategy::{neighbor_gaps, HeadingStrategy, StrategyKind};
use crate::error::Result;
use crate::model::{DocumentProfile, HeadingLevel, HeadingPrediction, TextBlock, DEFAULT_BODY_FONT_SIZE};

/// Average spacing assumed when no positive gaps exist.
const DEFAULT_SPACING: f32 = 10.0;

/// Blocks with more words than this count as paragraphs.
const PARAGRAPH_WORDS: usize = 20;

/// Document-wide spacing and size averages.
#[derive(Debug, Clone, PartialEq)]
struct DocumentMetrics {
    avg_spacing: f32,
    avg_font_size: f32,
    page_min_x: HashMap<u32, f32>,
}

impl DocumentMetrics {
    fn from_blocks(blocks: &[TextBlock]) -> Self {
        let spacings: Vec<f32> = blocks
            .windows(2)
            .filter_map(|pair| pair[0].gap_to(&pair[1]))
            .filter(|gap| *gap > 0.0)
            .collect();
        let sizes: Vec<f32> = blocks.iter().map(|b| b.font_size).filter(|s| *s > 0.0).collect();

        let mut page_min_x: HashMap<u32, f32> = HashMap::new();
        for block in blocks {
            page_min_x
                .entry(block.page)
                .and_modify(|x| *x = x.min(block.x()))
                .or_insert(block.x());
        }

        Self {
            avg_spacing: mean(&spacings).unwrap_or(DEFAULT_SPACING),
            avg_font_size: mean(&sizes).unwrap_or(DEFAULT_BODY_FONT_SIZE),
            page_min_x,
        }
    }
}

fn mean(values: &[f32]) -> Option<f32> {
    (!values.is_empty()).then(|| values.iter().sum::<f32>() / values.len() as f32)
}

/// Structural observations about one block.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BlockMetrics {
    words: usize,
    spacing_before: f32,
    spacing_after: f32,
    is_isolated: bool,
    is_indented: bool,
    is_centered: bool,
    relative_font_size: f32,
    line_count: usize,
    follows_paragraph: bool,
    precedes_paragraph: bool,
}

/// Scores blocks by the whitespace and placement around them.
#[derive(Debug, Clone)]
pub struct StructuralStrategy {
    /// Spacing multiple that marks a block as set apart
    pub spacing_threshold: f32,
    /// Spacing multiple that marks a block as isolated
    pub isolation_threshold: f32,
}

impl Default for StructuralStrategy {
    fn default() -> Self {
        Self {
            spacing_threshold: 1.5,
            isolation_threshold: 2.0,
        }
    }
}

impl StructuralStrategy {
    /// Create a structural strategy with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    fn block_metrics(&self, blocks: &[TextBlock], index: usize, doc: &DocumentMetrics) -> BlockMetrics {
        let block = &blocks[index];
        let (before, after) = neighbor_gaps(blocks, index);
        let is_paragraph = |b: Option<&TextBlock>| b.is_some_and(|b| b.word_count() > PARAGRAPH_WORDS);
        let prev = index.checked_sub(1).and_then(|i| blocks.get(i)).filter(|p| p.page == block.page);
        let next = blocks.get(index + 1).filter(|n| n.page == block.page);

        let spacing_before = before.unwrap_or(0.0);
        let spacing_after = after.unwrap_or(0.0);
        let isolation = doc.avg_spacing * self.isolation_threshold;
        let min_x = doc.page_min_x.get(&block.page).copied().unwrap_or(block.x());

        BlockMetrics {
            words: block.word_count(),
            spacing_before,
            spacing_after,
            is_isolated: spacing_before > isolation && spacing_after > isolation,
            is_indented: block.x() > min_x + 20.0,
            is_centered: block.x() > 100.0 && block.bbox.width < 400.0,
            relative_font_size: if doc.avg_font_size > 0.0 {
                block.font_size / doc.avg_font_size
            } else {
                1.0
            },
            line_count: block.line_count.max(block.text.matches('\n').count() + 1),
            follows_paragraph: is_paragraph(prev),
            precedes_paragraph: is_paragraph(next),
        }
    }

    fn is_heading(&self, m: &BlockMetrics, avg_spacing: f32) -> bool {
        let set_apart = avg_spacing * self.spacing_threshold;
        (m.is_isolated && m.words < 15)
            || (m.spacing_before > set_apart && m.spacing_after > set_apart)
            || (m.is_centered && m.words < 10)
            || (m.follows_paragraph && m.precedes_paragraph && m.spacing_before > avg_spacing)
    }

    fn level(m: &BlockMetrics) -> HeadingLevel {
        if m.is_isolated || m.is_centered {
            HeadingLevel::H1
        } else if m.is_indented {
            HeadingLevel::H3
        } else if m.relative_font_size > 1.3 {
            HeadingLevel::H1
        } else {
            HeadingLevel::H2
        }
    }

    fn confidence(m: &BlockMetrics) -> f64 {
        let mut confidence = 0.0;
        if m.is_isolated {
            confidence += 0.4;
        }
        if m.spacing_before > 20.0 || m.spacing_after > 20.0 {
            confidence += 0.2;
        }
        if m.is_centered {
            confidence += 0.2;
        }
        if m.relative_font_size > 1.2 {
            confidence += 0.2;
        }
        if m.follows_paragraph && m.precedes_paragraph {
            confidence += 0.1;
        }
        if m.line_count == 1 {
            confidence += 0.1;
        }
        f64::min(confidence, 1.0)
    }
}

impl HeadingStrategy for StructuralStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Structural
    }

    fn detect(&self, blocks: &[TextBlock], _profile: &DocumentProfile) -> Result<Vec<HeadingPrediction>> {
        let doc = DocumentMetrics::from_blocks(blocks);
        Ok((0..blocks.len())
            .map(|i| {
                let metrics = self.block_metrics(blocks, i, &doc);
                if self.is_heading(&metrics, doc.avg_spacing) {
                    HeadingPrediction::heading(blocks[i].id, Self::level(&metrics), Self::confidence(&metrics))
                } else {
                    HeadingPrediction::not_heading(blocks[i].id)
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;

    const PARAGRAPH: &str = "This paragraph holds well over twenty words of body text so that the structural \
                             strategy treats it as running prose rather than a short label line.";

    fn block(id: usize, text: &str, x: f32, y: f32, width: f32, height: f32) -> TextBlock {
        TextBlock::new(id, text, 1, BoundingBox::new(x, y, width, height), 11.0)
    }

    fn detect(blocks: &[TextBlock]) -> Vec<HeadingPrediction> {
        StructuralStrategy::new()
            .detect(blocks, &DocumentProfile::default())
            .unwrap()
    }

    #[test]
    fn test_isolated_block_is_h1() {
        let blocks = vec![
            block(0, PARAGRAPH, 72.0, 100.0, 450.0, 40.0),
            block(1, PARAGRAPH, 72.0, 145.0, 450.0, 40.0),
            block(2, PARAGRAPH, 72.0, 190.0, 450.0, 40.0),
            block(3, "Where to Stay", 72.0, 290.0, 450.0, 14.0),
            block(4, PARAGRAPH, 72.0, 364.0, 450.0, 40.0),
            block(5, PARAGRAPH, 72.0, 409.0, 450.0, 40.0),
            block(6, PARAGRAPH, 72.0, 454.0, 450.0, 40.0),
        ];
        let predictions = detect(&blocks);
        assert!(predictions[3].is_heading);
        assert_eq!(predictions[3].level, Some(HeadingLevel::H1));
        assert!(!predictions[0].is_heading);
        assert!(!predictions[1].is_heading);
        assert!(!predictions[4].is_heading);
        // isolated, wide gaps, between paragraphs, single line
        assert!((predictions[3].confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_centered_short_block() {
        let blocks = vec![
            block(0, "Annual Review", 220.0, 100.0, 170.0, 20.0),
            block(1, PARAGRAPH, 72.0, 124.0, 450.0, 40.0),
        ];
        let predictions = detect(&blocks);
        assert!(predictions[0].is_heading);
        assert_eq!(predictions[0].level, Some(HeadingLevel::H1));
        assert!(!predictions[1].is_heading);
    }

    #[test]
    fn test_sandwiched_between_paragraphs() {
        let blocks = vec![
            block(0, PARAGRAPH, 72.0, 100.0, 450.0, 40.0),
            block(1, PARAGRAPH, 72.0, 144.0, 450.0, 40.0),
            block(2, "Local dining options", 72.0, 194.0, 450.0, 14.0),
            block(3, PARAGRAPH, 72.0, 210.0, 450.0, 40.0),
        ];
        let predictions = detect(&blocks);
        assert!(predictions[2].is_heading);
        assert_eq!(predictions[2].level, Some(HeadingLevel::H2));
    }

    #[test]
    fn test_empty_input() {
        assert!(detect(&[]).is_empty());
    }
}
