//! Assembles the final outline.

use std::collections::HashMap;

use super::validator::HierarchyValidator;
use crate::classify::Verdict;
use crate::model::{
    round3, ConfidenceStats, HeadingLevel, Outline, OutlineEntry, OutlineMetadata, TextBlock, TitleInfo, TitleSource,
    TocInfo,
};

/// Level of a heading whose verdict carries none.
const DEFAULT_LEVEL: HeadingLevel = HeadingLevel::H2;

#[derive(Debug, Clone)]
struct Heading<'a> {
    block: &'a TextBlock,
    text: String,
    level: HeadingLevel,
    confidence: f64,
}

/// Turns ensemble verdicts into an [`Outline`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineBuilder {
    validator: HierarchyValidator,
}

impl OutlineBuilder {
    /// Create a builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the outline for a document.
    ///
    /// Headings are resolved to their blocks, ordered by page and vertical
    /// position and validated. A detected title's own block is not repeated
    /// as a heading.
    pub fn build(
        &self,
        blocks: &[TextBlock],
        verdicts: &[Verdict],
        title: Option<&TitleInfo>,
        toc: Option<TocInfo>,
    ) -> Outline {
        let by_id: HashMap<usize, &TextBlock> = blocks.iter().map(|b| (b.id, b)).collect();
        let title_block = title
            .filter(|t| t.source == TitleSource::Detection)
            .and_then(|t| t.block_id);

        let mut headings: Vec<Heading<'_>> = verdicts
            .iter()
            .filter(|v| v.is_heading && Some(v.block_id) != title_block)
            .filter_map(|v| {
                let block = *by_id.get(&v.block_id)?;
                Some(Heading {
                    block,
                    text: v.text.clone().unwrap_or_else(|| block.trimmed().to_string()),
                    level: v.level.unwrap_or(DEFAULT_LEVEL),
                    confidence: v.confidence,
                })
            })
            .collect();

        headings.sort_by(|a, b| {
            a.block
                .page
                .cmp(&b.block.page)
                .then_with(|| a.block.y().total_cmp(&b.block.y()))
        });

        let mut levels: Vec<HeadingLevel> = headings.iter().map(|h| h.level).collect();
        self.validator.validate(&mut levels);

        let confidences: Vec<f64> = headings.iter().map(|h| h.confidence).collect();
        let outline = headings
            .into_iter()
            .zip(levels)
            .map(|(h, level)| OutlineEntry {
                level,
                text: h.text,
                page: h.block.page,
            })
            .collect::<Vec<_>>();

        Outline {
            title: title.map_or_else(|| Outline::FALLBACK_TITLE.to_string(), |t| t.text.clone()),
            metadata: OutlineMetadata {
                total_headings: outline.len(),
                has_toc: toc.is_some(),
                confidence_stats: confidence_stats(&confidences),
            },
            outline,
            toc,
        }
    }
}

/// Mean, minimum and maximum, rounded to 3 decimals. All zero when empty.
pub fn confidence_stats(confidences: &[f64]) -> ConfidenceStats {
    if confidences.is_empty() {
        return ConfidenceStats::default();
    }
    let sum: f64 = confidences.iter().sum();
    let min = confidences.iter().copied().fold(f64::INFINITY, f64::min);
    let max = confidences.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    ConfidenceStats {
        mean: round3(sum / confidences.len() as f64),
        min: round3(min),
        max: round3(max),
    }
}
