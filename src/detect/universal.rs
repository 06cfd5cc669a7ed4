//! Document-agnostic heading detection.
//!
//! Combines typography, heading-shaped patterns, text shape and the blocks
//! around each candidate into one score. Blocks that look like list items
//! are penalized rather than merely left unrewarded. Long blocks that open
//! with a section label yield that label as a text override.

use std::cmp::Ordering;
use std::sync::Arc;

use super::strategy::{HeadingStrategy, StrategyKind};
use crate::error::Result;
use crate::model::{DocumentProfile, HeadingLevel, HeadingPrediction, TextBlock, DEFAULT_BODY_FONT_SIZE};
use crate::rules::{matches_any, Rules};
use crate::text;

/// Longer texts are only searched for an embedded section label.
const MAX_SCORED_LENGTH: usize = 100;

/// Minimum score to enter the candidate pool.
const CANDIDATE_SCORE: f64 = 0.3;

/// Minimum score to be reported as a heading.
const HEADING_SCORE: f64 = 0.5;

/// Word-set similarity above which a lower-scored candidate is a duplicate.
const DUPLICATE_SIMILARITY: f64 = 0.7;

/// Confidence of a section label extracted from a long block.
const CONTENT_HEADER_CONFIDENCE: f64 = 0.9;

/// Markers that, standing alone on the previous line, introduce a list item.
const BULLET_MARKERS: &[&str] = &["•", "-", "*"];

const STOP_WORDS: &[&str] = &["the", "and", "or", "but", "with", "from", "this", "that"];

#[derive(Debug, Clone, Copy)]
struct Scored {
    index: usize,
    score: f64,
}

/// The primary strategy of the ensemble.
#[derive(Debug, Clone)]
pub struct UniversalStrategy {
    rules: Arc<Rules>,
}

impl UniversalStrategy {
    /// Create a universal strategy.
    pub fn new(rules: Arc<Rules>) -> Self {
        Self { rules }
    }

    fn score(&self, blocks: &[TextBlock], index: usize, avg_size: f32) -> f64 {
        let block = &blocks[index];
        let text = block.trimmed();
        let mut score: f64 = 0.0;

        if block.font_size > avg_size * 1.1 {
            score += 0.3;
        } else if block.font_size >= avg_size {
            score += 0.1;
        }
        if block.is_bold {
            score += 0.4;
        }
        if matches_any(&self.rules.universal.heading, text) {
            score += 0.5;
        }
        if text::is_title(text) || (text::starts_upper(text) && !text::is_upper(text)) {
            score += 0.2;
        }

        match text::word_count(text) {
            3..=8 => score += 0.2,
            0..=2 => score += 0.1,
            _ => {}
        }
        if !text::ends_with_sentence_punct(text) {
            score += 0.1;
        }

        let prev = index.checked_sub(1).and_then(|i| blocks.get(i));
        let next = blocks.get(index + 1);
        if next.is_some_and(|n| text::char_len(n.trimmed()) > 20 && !n.is_bold) {
            score += 0.2;
        }
        if prev.is_some_and(|p| text::char_len(p.trimmed()) < 10) {
            score += 0.1;
        }
        if index == 0 || (index < 3 && block.page == 1) {
            score += 0.1;
        }

        if self.has_content_words(text) {
            score -= 0.2;
        }
        if self.is_list_item(text, prev, next) {
            score -= 0.5;
        }
        score.clamp(0.0, 1.0)
    }

    fn has_content_words(&self, text: &str) -> bool {
        text.split_whitespace()
            .map(str::to_lowercase)
            .any(|w| self.rules.universal.content_words.contains(&w.as_str()))
    }

    /// A list entry, a `Name: description` pair or a name whose
    /// description follows on the next line.
    fn is_list_item(&self, text: &str, prev: Option<&TextBlock>, next: Option<&TextBlock>) -> bool {
        if let Some(prev) = prev {
            let prev_text = prev.trimmed();
            if BULLET_MARKERS.contains(&prev_text) || self.rules.universal.bare_number_marker.is_match(prev_text) {
                return true;
            }
        }
        if let Some((name, _)) = text.split_once(':') {
            if text::char_len(name.trim()) < 20 {
                return true;
            }
        }
        next.is_some_and(|n| n.trimmed().starts_with(':'))
    }

    fn level(block: &TextBlock, score: f64) -> HeadingLevel {
        if block.font_size > 14.0 || score > 0.8 {
            HeadingLevel::H1
        } else if block.font_size > 12.0 || (block.is_bold && score > 0.7) {
            HeadingLevel::H2
        } else {
            HeadingLevel::H3
        }
    }

    /// Section label opening a long block, if any.
    pub fn content_header(&self, text: &str) -> Option<String> {
        let rules = &self.rules.universal;
        let lines: Vec<&str> = text.lines().map(str::trim).collect();

        let standalone = lines.iter().take(3).find(|line| {
            (2..=40).contains(&text::char_len(line))
                && text::starts_upper(line)
                && !rules.list_line.is_match(line)
                && !text::ends_with_sentence_punct(line)
                && text::word_count(line) <= 6
                && !rules.measurement.is_match(&line.to_lowercase())
        });
        if let Some(line) = standalone {
            return Some((*line).to_string());
        }

        let colon = lines
            .iter()
            .take(5)
            .find_map(|line| rules.colon_header.captures(line))
            .map(|caps| caps[1].trim().to_string());
        if colon.is_some() {
            return colon;
        }

        rules
            .marker_header
            .captures_iter(text)
            .map(|caps| caps[1].trim().to_string())
            .find(|title| {
                let lower = title.to_lowercase();
                (3..=50).contains(&text::char_len(title))
                    && text::word_count(title) <= 6
                    && !STOP_WORDS.contains(&lower.as_str())
                    && !rules.measurement.is_match(&lower)
            })
    }
}

fn average_size(blocks: &[TextBlock]) -> f32 {
    if blocks.is_empty() {
        return DEFAULT_BODY_FONT_SIZE;
    }
    blocks.iter().map(|b| b.font_size).sum::<f32>() / blocks.len() as f32
}

impl HeadingStrategy for UniversalStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Universal
    }

    fn detect(&self, blocks: &[TextBlock], _profile: &DocumentProfile) -> Result<Vec<HeadingPrediction>> {
        let avg_size = average_size(blocks);
        let mut predictions: Vec<HeadingPrediction> = blocks.iter().map(|b| HeadingPrediction::not_heading(b.id)).collect();
        let mut candidates = Vec::new();

        for (index, block) in blocks.iter().enumerate() {
            let text = block.trimmed();
            if text.is_empty() {
                continue;
            }
            if text::char_len(text) > MAX_SCORED_LENGTH {
                if let Some(header) = self.content_header(text) {
                    predictions[index] =
                        HeadingPrediction::heading(block.id, HeadingLevel::H2, CONTENT_HEADER_CONFIDENCE).with_text(header);
                }
                continue;
            }
            if matches_any(&self.rules.universal.exclusion, text) {
                continue;
            }
            let score = self.score(blocks, index, avg_size);
            if score > CANDIDATE_SCORE {
                candidates.push(Scored { index, score });
            }
        }

        // Stable sort keeps document order among equal scores.
        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        let mut accepted: Vec<usize> = Vec::new();
        for Scored { index, score } in candidates {
            let block = &blocks[index];
            let duplicate = accepted
                .iter()
                .any(|&i| text::jaccard(block.trimmed(), blocks[i].trimmed()) > DUPLICATE_SIMILARITY);
            predictions[index] = if !duplicate && score > HEADING_SCORE {
                accepted.push(index);
                HeadingPrediction::heading(block.id, Self::level(block, score), score)
            } else {
                HeadingPrediction::rejected(block.id, score)
            };
        }

        log::debug!("Universal strategy found {} headings", accepted.len());
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;

    const BODY: &str = "The old town is compact and best explored on foot over a long afternoon.";

    fn strategy() -> UniversalStrategy {
        UniversalStrategy::new(Arc::new(Rules::new().unwrap()))
    }

    fn block(id: usize, text: &str, size: f32, y: f32) -> TextBlock {
        TextBlock::new(id, text, 1, BoundingBox::new(72.0, y, 300.0, size), size)
    }

    fn detect(blocks: &[TextBlock]) -> Vec<HeadingPrediction> {
        strategy().detect(blocks, &DocumentProfile::default()).unwrap()
    }

    #[test]
    fn test_bold_section_before_body() {
        let blocks = vec![
            block(0, "Getting Around Lisbon", 16.0, 100.0).bold(),
            block(1, BODY, 11.0, 130.0),
        ];
        let predictions = detect(&blocks);
        assert_eq!(predictions.len(), 2);
        assert!(predictions[0].is_heading);
        assert_eq!(predictions[0].level, Some(HeadingLevel::H1));
        assert!(predictions[0].confidence > 0.8);
        assert!(!predictions[1].is_heading);
    }

    #[test]
    fn test_list_item_is_penalized() {
        let blocks = vec![
            block(0, "Where to Stay", 14.0, 100.0).bold(),
            block(1, "Alfama: narrow lanes and fado bars", 11.0, 130.0),
            block(2, BODY, 11.0, 160.0),
        ];
        let predictions = detect(&blocks);
        assert!(predictions[0].is_heading);
        assert!(!predictions[1].is_heading);
        assert_eq!(predictions[1].level, None);
    }

    #[test]
    fn test_duplicate_text_is_rejected() {
        let blocks = vec![
            block(0, "Things to See", 16.0, 100.0).bold(),
            block(1, BODY, 11.0, 130.0),
            block(2, "Things to See", 12.0, 400.0).bold(),
            block(3, BODY, 11.0, 430.0),
        ];
        let predictions = detect(&blocks);
        assert!(predictions[0].is_heading);
        assert!(!predictions[2].is_heading);
        assert!(predictions[2].confidence > 0.0);
    }

    #[test]
    fn test_sentence_is_excluded() {
        let predictions = detect(&[block(0, "It rains often in spring.", 12.0, 100.0)]);
        assert!(!predictions[0].is_heading);
        assert_eq!(predictions[0].confidence, 0.0);
    }

    #[test]
    fn test_content_header_override() {
        let text = "Seasonal Produce\nMarkets open early on weekends and the stalls sell fruit, \
                    vegetables and cheese from the surrounding farms";
        let predictions = detect(&[block(0, text, 11.0, 100.0)]);
        assert!(predictions[0].is_heading);
        assert_eq!(predictions[0].level, Some(HeadingLevel::H2));
        assert_eq!(predictions[0].text.as_deref(), Some("Seasonal Produce"));
        assert!((predictions[0].confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_content_header_marker() {
        let header = strategy().content_header(
            "Grilled Sardines • Ingredients: six fresh sardines, coarse salt, olive oil and lemon wedges to serve",
        );
        assert_eq!(header.as_deref(), Some("Grilled Sardines"));
        assert_eq!(strategy().content_header("a long lowercase line with nothing that looks like a label"), None);
    }
}
