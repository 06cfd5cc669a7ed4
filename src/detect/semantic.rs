//! Heading detection from part-of-speech shape and vocabulary.
//!
//! Tagging uses a lexicon from the model directory. Words the lexicon does
//! not know are tagged from their form: numbers, punctuation, common
//! suffixes and capitalization. Without a lexicon the strategy reports no
//! headings.

use std::path::PathBuf;

use super::model::{Lexicon, ModelSlot, PosTag};
use super::pattern::level_from_word_count;
use super::strategy::{HeadingStrategy, StrategyKind};
use crate::error::Result;
use crate::model::{DocumentProfile, HeadingLevel, HeadingPrediction, TextBlock};
use crate::text;

/// Minimum score for a heading verdict.
const THRESHOLD: f64 = 0.4;

/// Texts longer than this are never scored.
const MAX_LENGTH: usize = 200;

const INDICATOR_VERBS: &[&str] = &["introduce", "present", "describe", "analyze", "discuss"];
const INDICATOR_NOUNS: &[&str] = &["introduction", "overview", "summary", "analysis", "conclusion"];
const SEMANTIC_MAJOR_SECTIONS: &[&str] = &[
    "introduction",
    "conclusion",
    "abstract",
    "summary",
    "overview",
    "background",
    "methodology",
    "results",
];
const SALIENT_ENTITIES: &[&str] = &["ORG", "PRODUCT", "WORK_OF_ART"];

/// Leading tag sequences typical of headings.
const POS_PATTERNS: &[&[PosTag]] = &[
    &[PosTag::Noun],
    &[PosTag::Adjective, PosTag::Noun],
    &[PosTag::Noun, PosTag::Noun],
    &[PosTag::Verb, PosTag::Noun],
];

/// A tagged token.
#[derive(Debug, Clone, PartialEq)]
struct Token {
    text: String,
    tag: PosTag,
}

/// Tagged text with recognized entities.
#[derive(Debug, Clone, PartialEq)]
struct Analysis {
    tokens: Vec<Token>,
    entities: Vec<String>,
    sentences: usize,
}

/// Scores blocks by linguistic shape using a word lexicon.
#[derive(Debug)]
pub struct SemanticStrategy {
    model_dir: PathBuf,
    lexicon: ModelSlot<Lexicon>,
}

impl SemanticStrategy {
    /// Create a strategy that loads its lexicon from `model_dir` on first use.
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            lexicon: ModelSlot::new(),
        }
    }

    /// Create a strategy with an already loaded lexicon.
    pub fn with_lexicon(lexicon: Lexicon) -> Self {
        Self {
            model_dir: PathBuf::new(),
            lexicon: ModelSlot::loaded(lexicon),
        }
    }

    fn analyze(lexicon: &Lexicon, text: &str) -> Analysis {
        let mut tokens = Vec::new();
        for (i, raw) in text.split_whitespace().enumerate() {
            let word = raw.trim_matches(|c: char| !c.is_alphanumeric());
            if word.is_empty() {
                tokens.push(Token {
                    text: raw.to_string(),
                    tag: PosTag::Punctuation,
                });
                continue;
            }
            let tag = lexicon.tag(word).unwrap_or_else(|| guess_tag(word, i == 0));
            tokens.push(Token {
                text: word.to_string(),
                tag,
            });
        }

        let lower = text.to_lowercase();
        let entities = lexicon
            .entities
            .iter()
            .filter(|(phrase, _)| contains_phrase(&lower, phrase))
            .map(|(_, label)| label.clone())
            .collect();

        Analysis {
            tokens,
            entities,
            sentences: count_sentences(text),
        }
    }

    fn score(analysis: &Analysis, text: &str) -> f64 {
        let mut score: f64 = 0.0;
        let tags: Vec<PosTag> = analysis.tokens.iter().map(|t| t.tag).collect();
        if POS_PATTERNS.iter().any(|p| tags.starts_with(p)) {
            score += 0.3;
        }

        let lower = text.to_lowercase();
        if INDICATOR_VERBS.iter().any(|v| lower.contains(v)) {
            score += 0.2;
        }
        if INDICATOR_NOUNS.iter().any(|n| lower.contains(n)) {
            score += 0.2;
        }
        if analysis.sentences == 1 {
            score += 0.1;
        }
        if !text.ends_with(['.', '!', '?', ',', ';']) {
            score += 0.1;
        }
        if text::has_significant_title_case(text) {
            score += 0.1;
        }
        if analysis
            .entities
            .iter()
            .any(|label| SALIENT_ENTITIES.contains(&label.as_str()))
        {
            score += 0.1;
        }

        if !tags.is_empty() {
            let function_words = tags.iter().filter(|t| t.is_function_word()).count();
            if function_words as f64 / tags.len() as f64 > 0.5 {
                score -= 0.2;
            }
        }
        score.clamp(0.0, 1.0)
    }

    fn level(analysis: &Analysis, text: &str) -> HeadingLevel {
        let lower = text.to_lowercase();
        if SEMANTIC_MAJOR_SECTIONS.iter().any(|s| lower.contains(s)) {
            return HeadingLevel::H1;
        }
        if analysis.tokens.iter().any(|t| t.tag == PosTag::Number) || !analysis.entities.is_empty() {
            return HeadingLevel::H2;
        }
        level_from_word_count(text)
    }
}

/// Tag a word the lexicon does not know.
fn guess_tag(word: &str, first: bool) -> PosTag {
    if word.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return PosTag::Number;
    }
    let lower = word.to_lowercase();
    let long = lower.chars().count() > 4;
    if long && lower.ends_with("ly") {
        PosTag::Adverb
    } else if long && (lower.ends_with("ing") || lower.ends_with("ed")) {
        PosTag::Verb
    } else if long
        && ["ous", "ful", "ive", "able", "ible", "al", "ic", "less"]
            .iter()
            .any(|s| lower.ends_with(s))
    {
        PosTag::Adjective
    } else if !first && text::starts_upper(word) {
        PosTag::ProperNoun
    } else {
        PosTag::Noun
    }
}

/// Whole-word phrase containment on lowercased text.
fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    haystack.match_indices(phrase).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + phrase.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Sentences delimited by terminal punctuation followed by whitespace.
fn count_sentences(text: &str) -> usize {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0;
    }
    let chars: Vec<char> = trimmed.chars().collect();
    let breaks = chars
        .windows(2)
        .filter(|w| matches!(w[0], '.' | '!' | '?') && w[1].is_whitespace())
        .count();
    breaks + 1
}

impl HeadingStrategy for SemanticStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Semantic
    }

    fn detect(&self, blocks: &[TextBlock], _profile: &DocumentProfile) -> Result<Vec<HeadingPrediction>> {
        let lexicon = self.lexicon.get_or_load(|| Lexicon::load(&self.model_dir));
        let Some(lexicon) = lexicon else {
            return Ok(blocks.iter().map(|b| HeadingPrediction::not_heading(b.id)).collect());
        };

        Ok(blocks
            .iter()
            .map(|block| {
                let text = block.trimmed();
                if text.is_empty() || text::char_len(text) > MAX_LENGTH {
                    return HeadingPrediction::not_heading(block.id);
                }
                let analysis = Self::analyze(&lexicon, text);
                let score = Self::score(&analysis, text);
                if score > THRESHOLD {
                    HeadingPrediction::heading(block.id, Self::level(&analysis, text), score)
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

    fn lexicon() -> Lexicon {
        Lexicon::default()
            .with_word("the", PosTag::Determiner)
            .with_word("of", PosTag::Adposition)
            .with_word("in", PosTag::Adposition)
            .with_word("and", PosTag::Conjunction)
            .with_word("we", PosTag::Pronoun)
            .with_word("went", PosTag::Verb)
            .with_word("market", PosTag::Noun)
            .with_word("overview", PosTag::Noun)
            .with_entity("acme corp", "ORG")
    }

    fn block(id: usize, text: &str) -> TextBlock {
        TextBlock::new(id, text, 1, BoundingBox::new(72.0, 100.0, 200.0, 14.0), 12.0)
    }

    fn detect(strategy: &SemanticStrategy, texts: &[&str]) -> Vec<HeadingPrediction> {
        let blocks: Vec<TextBlock> = texts.iter().enumerate().map(|(i, t)| block(i, t)).collect();
        strategy.detect(&blocks, &DocumentProfile::default()).unwrap()
    }

    #[test]
    fn test_heading_shaped_text() {
        let strategy = SemanticStrategy::with_lexicon(lexicon());
        let predictions = detect(&strategy, &["Market Overview"]);
        assert!(predictions[0].is_heading);
        assert_eq!(predictions[0].level, Some(HeadingLevel::H1));
        // noun pattern, indicator noun, one sentence, no punctuation, title case
        assert!((predictions[0].confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_sentence_is_rejected() {
        let strategy = SemanticStrategy::with_lexicon(lexicon());
        let predictions = detect(&strategy, &["we went to the market and the shops."]);
        assert!(!predictions[0].is_heading);
    }

    #[test]
    fn test_entity_sets_level() {
        let strategy = SemanticStrategy::with_lexicon(lexicon());
        let predictions = detect(&strategy, &["Acme Corp Partnerships"]);
        assert!(predictions[0].is_heading);
        assert_eq!(predictions[0].level, Some(HeadingLevel::H2));
    }

    #[test]
    fn test_without_lexicon_all_false() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = SemanticStrategy::new(dir.path());
        let predictions = detect(&strategy, &["Overview", "Summary of Findings"]);
        assert_eq!(predictions.len(), 2);
        assert!(predictions.iter().all(|p| !p.is_heading && p.confidence == 0.0));
    }

    #[test]
    fn test_guess_tag() {
        assert_eq!(guess_tag("2024", false), PosTag::Number);
        assert_eq!(guess_tag("Quickly", true), PosTag::Adverb);
        assert_eq!(guess_tag("Getting", true), PosTag::Verb);
        assert_eq!(guess_tag("Regional", true), PosTag::Adjective);
        assert_eq!(guess_tag("Lisbon", false), PosTag::ProperNoun);
        assert_eq!(guess_tag("Lisbon", true), PosTag::Noun);
    }

    #[test]
    fn test_helpers() {
        assert!(contains_phrase("about acme corp today", "acme corp"));
        assert!(!contains_phrase("acme corporation", "acme corp"));
        assert_eq!(count_sentences("One. Two! Three"), 3);
        assert_eq!(count_sentences("Version 1.2 notes"), 1);
    }
}
