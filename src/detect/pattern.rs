//! Pattern-based heading detection.

use std::sync::Arc;

use super::strategy::{HeadingStrategy, StrategyKind};
use crate::error::Result;
use crate::model::{DocumentProfile, HeadingLevel, HeadingPrediction, TextBlock};
use crate::rules::{PatternFamily, Rules, MAJOR_SECTIONS};
use crate::text;

/// Upper bound on the score contributed by pattern matches alone.
const PATTERN_SCORE_CAP: f64 = 0.6;

/// Matches block text against curated heading pattern families.
#[derive(Debug, Clone)]
pub struct PatternStrategy {
    rules: Arc<Rules>,
}

impl PatternStrategy {
    /// Create a pattern strategy.
    pub fn new(rules: Arc<Rules>) -> Self {
        Self { rules }
    }

    fn level(&self, text: &str, families: &[PatternFamily]) -> HeadingLevel {
        if families.contains(&PatternFamily::Numbered) {
            if let Some(depth) = text::numbering_depth(text) {
                return match depth {
                    1 => HeadingLevel::H1,
                    2 => HeadingLevel::H2,
                    _ => HeadingLevel::H3,
                };
            }
        }

        if families.contains(&PatternFamily::Named) {
            let lower = text.to_lowercase();
            if lower.starts_with("chapter") || lower.starts_with("part") {
                return HeadingLevel::H1;
            }
            if lower.starts_with("section") {
                return HeadingLevel::H2;
            }
        }

        if families.contains(&PatternFamily::Academic) {
            let lower = text.to_lowercase();
            if MAJOR_SECTIONS.iter().any(|s| lower.contains(s)) {
                return HeadingLevel::H1;
            }
        }

        level_from_word_count(text)
    }

    fn confidence(block: &TextBlock, families: &[PatternFamily], profile: &DocumentProfile) -> f64 {
        let mut confidence = families
            .iter()
            .map(|f| f.weight())
            .sum::<f64>()
            .min(PATTERN_SCORE_CAP);

        if families.iter().any(|f| f.doc_type() == Some(profile.doc_type)) {
            confidence += 0.2;
        }
        if block.is_bold {
            confidence += 0.1;
        }
        let length = text::char_len(&block.text);
        if (5..=100).contains(&length) {
            confidence += 0.1;
        }
        confidence.min(1.0)
    }
}

/// Short texts are major headings, longer ones nest deeper.
pub(crate) fn level_from_word_count(text: &str) -> HeadingLevel {
    match text::word_count(text) {
        0..=3 => HeadingLevel::H1,
        4..=7 => HeadingLevel::H2,
        _ => HeadingLevel::H3,
    }
}

impl HeadingStrategy for PatternStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Pattern
    }

    fn detect(&self, blocks: &[TextBlock], profile: &DocumentProfile) -> Result<Vec<HeadingPrediction>> {
        Ok(blocks
            .iter()
            .map(|block| {
                let text = block.trimmed();
                if text.is_empty() {
                    return HeadingPrediction::not_heading(block.id);
                }
                let families = self.rules.matching_families(text, profile.doc_type);
                if families.is_empty() {
                    return HeadingPrediction::not_heading(block.id);
                }
                HeadingPrediction::heading(
                    block.id,
                    self.level(text, &families),
                    Self::confidence(block, &families, profile),
                )
            })
            .collect())
    }
}
