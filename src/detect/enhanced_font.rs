//! Font-based heading detection with content quality filtering.
//!
//! Fills the font slot of the ensemble when [`FontVariant::Enhanced`] is
//! selected. Besides size and weight it rejects interface fragments and OCR
//! debris outright and penalizes text that reads like instructions or body
//! copy.
//!
//! [`FontVariant::Enhanced`]: crate::options::FontVariant::Enhanced

use std::sync::Arc;

use super::strategy::{neighbor_gaps, HeadingStrategy, StrategyKind};
use crate::error::Result;
use crate::model::{DocumentProfile, HeadingLevel, HeadingPrediction, TextBlock};
use crate::profile::FontStatistics;
use crate::rules::{matches_any, Rules};
use crate::text;

/// Minimum score for a heading verdict.
const THRESHOLD: f64 = 0.5;

/// Upper bound on reported confidence.
const MAX_CONFIDENCE: f64 = 0.95;

const SECTION_INDICATORS: &[&str] = &[
    "overview",
    "introduction",
    "conclusion",
    "summary",
    "chapter",
    "section",
    "part",
    "step",
    "method",
    "process",
];
const SECTION_KEYWORDS: &[&str] = &["chapter", "section", "part", "unit", "step", "phase"];
const ACTION_VERBS: &[&str] = &["select", "click", "choose", "type", "enter", "press", "drag", "drop"];
const UI_SYMBOLS: &[char] = &['©', '®', '™', '×', '÷'];
const OCR_FRAGMENTS: &[&str] = &["cg connected", "all tools x"];

/// Size keys at 0.1pt precision mapped to levels.
#[derive(Debug, Clone, Default)]
struct SizeHierarchy {
    body_size: f32,
    levels: Vec<(i32, HeadingLevel)>,
}

impl SizeHierarchy {
    fn build(stats: &FontStatistics) -> Self {
        let body = stats.body_size;
        let levels = stats
            .sizes
            .iter()
            .enumerate()
            .filter_map(|(rank, &size)| {
                let level = if size > body * 1.5 {
                    match rank {
                        0 => HeadingLevel::H1,
                        1 => HeadingLevel::H2,
                        _ => HeadingLevel::H3,
                    }
                } else if size > body * 1.2 {
                    HeadingLevel::H3
                } else if size >= body {
                    HeadingLevel::H4
                } else {
                    return None;
                };
                Some((size_key(size), level))
            })
            .collect();
        Self { body_size: body, levels }
    }

    fn level_of(&self, size: f32) -> Option<HeadingLevel> {
        let key = size_key(size);
        self.levels.iter().find(|(k, _)| *k == key).map(|(_, level)| *level)
    }

    fn ratio(&self, size: f32) -> f32 {
        if self.body_size > 0.0 {
            size / self.body_size
        } else {
            1.0
        }
    }
}

fn size_key(size: f32) -> i32 {
    (size * 10.0).round() as i32
}

/// Scores blocks by typography and content quality.
#[derive(Debug, Clone)]
pub struct EnhancedFontStrategy {
    rules: Arc<Rules>,
}

impl EnhancedFontStrategy {
    /// Create an enhanced font strategy.
    pub fn new(rules: Arc<Rules>) -> Self {
        Self { rules }
    }

    /// Interface fragments, OCR debris, captions and note markers.
    pub fn is_noise(&self, text: &str) -> bool {
        if matches_any(&self.rules.enhanced.noise, text) {
            return true;
        }
        let lower = text.to_lowercase();
        lower.split_whitespace().any(|w| w == "pof") || OCR_FRAGMENTS.iter().any(|f| lower.contains(f))
    }

    /// How much the text itself reads like a heading, in `[0, 1]`.
    fn content_quality(&self, text: &str) -> f64 {
        let rules = &self.rules.enhanced;
        let words = text::word_count(text);
        if text::char_len(text) < 2 || words == 0 {
            return 0.0;
        }

        let mut score: f64 = 0.0;
        if matches_any(&rules.quality_heading, text) {
            score += 0.8;
        }
        score += match words {
            1..=8 => 0.6,
            9..=15 => 0.3,
            _ => -0.2,
        };
        if text::is_title(text) {
            score += 0.4;
        } else if text::is_upper(text) && words <= 6 {
            score += 0.3;
        }

        let lower = text.to_lowercase();
        if SECTION_INDICATORS.iter().any(|s| lower.contains(s)) {
            score += 0.3;
        }
        if text.contains(UI_SYMBOLS) {
            score -= 0.5;
        }
        if matches_any(&rules.ocr_errors, text) {
            score -= 0.4;
        }
        if text::char_len(text) <= 3 && !text::is_upper(text) {
            score -= 0.6;
        }
        if rules.long_number.is_match(text) {
            score -= 0.3;
        }
        if ACTION_VERBS[..6].iter().any(|v| lower.starts_with(v)) {
            score -= 0.4;
        }
        if rules.menu_label.is_match(text) {
            score -= 0.3;
        }
        score.clamp(0.0, 1.0)
    }

    /// Numbering and section keywords.
    fn structure(&self, text: &str) -> f64 {
        let rules = &self.rules.enhanced;
        let mut score = 0.0;
        if rules.numbered_section.is_match(text) {
            score += 0.8;
        }
        if rules.lettered_section.is_match(text) {
            score += 0.6;
        }
        if rules.roman_section.is_match(text) {
            score += 0.7;
        }
        let lower = text.to_lowercase();
        if SECTION_KEYWORDS.iter().any(|k| lower.contains(k)) {
            score += 0.5;
        }
        score
    }

    fn score(&self, blocks: &[TextBlock], index: usize, hierarchy: &SizeHierarchy) -> f64 {
        let block = &blocks[index];
        let text = block.trimmed();
        if self.is_noise(text) {
            return 0.0;
        }

        let ratio = hierarchy.ratio(block.font_size);
        let mut score: f64 = if ratio >= 1.5 {
            0.4
        } else if ratio >= 1.2 {
            0.3
        } else if ratio >= 1.0 {
            0.1
        } else {
            0.0
        };

        if block.is_bold {
            score += 0.2;
            if (0.95..=1.05).contains(&ratio) {
                score += 0.1;
            }
        }
        if block.is_italic {
            score += 0.05;
        }

        score += self.content_quality(text) * 0.2;

        let (before, after) = neighbor_gaps(blocks, index);
        let before = before.unwrap_or(0.0).max(0.0);
        let after = after.unwrap_or(0.0).max(0.0);
        if before > 5.0 {
            score += 0.05;
        }
        if after > 3.0 {
            score += 0.03;
        }
        if before > 10.0 && after > 10.0 {
            score += 0.02;
        }

        score += self.structure(text) * 0.05;

        let length = text::char_len(text);
        if length > 200 {
            score -= 0.5;
        } else if length > 100 {
            score -= 0.3;
        } else if length > 80 {
            score -= 0.1;
        }

        let words: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
        if !words.is_empty() {
            let body_words = words
                .iter()
                .filter(|w| self.rules.enhanced.body_words.contains(&w.as_str()))
                .count();
            if body_words as f64 / words.len() as f64 > 0.3 {
                score -= 0.3;
            }
        }
        if text::ends_with_sentence_punct(text) && words.len() > 5 {
            score -= 0.25;
        }
        if self.rules.enhanced.long_numbered_step.is_match(text) {
            score -= 0.4;
        }
        if words.first().is_some_and(|w| ACTION_VERBS.contains(&w.as_str())) {
            score -= 0.4;
        }
        score.clamp(0.0, 1.0)
    }

    fn level(block: &TextBlock, hierarchy: &SizeHierarchy) -> HeadingLevel {
        if let Some(level) = hierarchy.level_of(block.font_size) {
            return level;
        }
        let ratio = hierarchy.ratio(block.font_size);
        if ratio >= 1.5 {
            HeadingLevel::H1
        } else if ratio >= 1.3 {
            HeadingLevel::H2
        } else if ratio >= 1.1 || block.is_bold {
            HeadingLevel::H3
        } else {
            HeadingLevel::H4
        }
    }
}

/// Limit each heading to at most one level below the previous heading.
fn smooth_levels(predictions: &mut [HeadingPrediction]) {
    let mut last: Option<HeadingLevel> = None;
    for prediction in predictions.iter_mut().filter(|p| p.is_heading) {
        if let (Some(prev), Some(level)) = (last, prediction.level) {
            if level.number() > prev.number() + 1 {
                prediction.level = Some(prev.deeper());
            }
        }
        last = prediction.level;
    }
}

impl HeadingStrategy for EnhancedFontStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Font
    }

    fn detect(&self, blocks: &[TextBlock], _profile: &DocumentProfile) -> Result<Vec<HeadingPrediction>> {
        let stats = FontStatistics::from_blocks(blocks);
        let hierarchy = SizeHierarchy::build(&stats);

        let mut predictions: Vec<HeadingPrediction> = blocks
            .iter()
            .enumerate()
            .map(|(index, block)| {
                if text::char_len(block.trimmed()) < 2 {
                    return HeadingPrediction::not_heading(block.id);
                }
                let score = self.score(blocks, index, &hierarchy);
                if score > THRESHOLD {
                    HeadingPrediction::heading(block.id, Self::level(block, &hierarchy), score.min(MAX_CONFIDENCE))
                } else {
                    HeadingPrediction::not_heading(block.id)
                }
            })
            .collect();
        smooth_levels(&mut predictions);

        log::debug!(
            "Enhanced font strategy found {} headings",
            predictions.iter().filter(|p| p.is_heading).count()
        );
        Ok(predictions)
    }
}
