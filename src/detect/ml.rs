//! Classifier-based heading detection with a rule-based fallback.

use std::path::PathBuf;
use std::sync::Arc;

use super::model::{HeadingClassifier, ModelSlot};
use super::strategy::{neighbor_gaps, HeadingStrategy, StrategyKind};
use crate::error::Result;
use crate::model::{DocumentProfile, DocumentType, HeadingLevel, HeadingPrediction, TextBlock};
use crate::profile::FontStatistics;
use crate::rules::Rules;
use crate::text;

/// Length of the feature vector fed to the classifier.
pub const FEATURE_COUNT: usize = 18;

/// Index of the size ratio feature.
const SIZE_RATIO_FEATURE: usize = 8;

/// Spacing is normalized by this many points.
const SPACING_SCALE: f32 = 100.0;

/// Domain keywords per document type.
fn type_keywords(doc_type: DocumentType) -> &'static [&'static str] {
    match doc_type {
        DocumentType::Academic => &["introduction", "methodology", "results", "conclusion"],
        DocumentType::Business => &["summary", "overview", "financial", "strategy"],
        DocumentType::Technical => &["specification", "implementation", "architecture", "design"],
        DocumentType::Book => &["chapter", "section", "part", "appendix"],
        DocumentType::Form | DocumentType::General => &[],
    }
}

/// Scores blocks with a logistic-regression classifier when one is
/// available in the model directory.
#[derive(Debug)]
pub struct MlStrategy {
    rules: Arc<Rules>,
    model_dir: PathBuf,
    classifier: ModelSlot<HeadingClassifier>,
}

impl MlStrategy {
    /// Create a strategy that loads its classifier from `model_dir` on first use.
    pub fn new(rules: Arc<Rules>, model_dir: impl Into<PathBuf>) -> Self {
        Self {
            rules,
            model_dir: model_dir.into(),
            classifier: ModelSlot::new(),
        }
    }

    /// Create a strategy with an already loaded classifier.
    pub fn with_classifier(rules: Arc<Rules>, classifier: HeadingClassifier) -> Self {
        Self {
            rules,
            model_dir: PathBuf::new(),
            classifier: ModelSlot::loaded(classifier),
        }
    }

    /// Whether the classifier is loaded.
    pub fn has_model(&self) -> bool {
        self.classifier.is_loaded()
    }

    /// Feature vectors for all blocks.
    pub fn extract_features(&self, blocks: &[TextBlock], profile: &DocumentProfile) -> Vec<[f64; FEATURE_COUNT]> {
        let stats = FontStatistics::from_blocks(blocks);
        let avg = stats.mean_size;
        let keywords = type_keywords(profile.doc_type);

        (0..blocks.len())
            .map(|i| {
                let block = &blocks[i];
                let text = block.trimmed();
                let (before, after) = neighbor_gaps(blocks, i);
                let spacing = |gap: Option<f32>| gap.map_or(1.0, |g| f64::from((g / SPACING_SCALE).min(1.0)));
                let lower = text.to_lowercase();
                let flag = |b: bool| if b { 1.0 } else { 0.0 };

                [
                    text::char_len(text) as f64,
                    text::word_count(text) as f64,
                    text.matches('\n').count() as f64,
                    flag(text::starts_upper(text)),
                    flag(text::is_upper(text)),
                    flag(text.ends_with(':')),
                    flag(!text.ends_with('.')),
                    f64::from(block.font_size),
                    if avg > 0.0 { f64::from(block.font_size / avg) } else { 1.0 },
                    flag(block.is_bold),
                    flag(block.is_italic),
                    f64::from(block.page),
                    f64::from(block.y()) / 1000.0,
                    f64::from(block.x()) / 1000.0,
                    spacing(before),
                    spacing(after),
                    flag(self.rules.numbered.is_match(text)),
                    flag(keywords.iter().any(|k| lower.contains(k))),
                ]
            })
            .collect()
    }

    fn model_level(text: &str, features: &[f64; FEATURE_COUNT]) -> HeadingLevel {
        if let Some(depth) = text::numbering_depth(text) {
            return HeadingLevel::from_depth(depth);
        }
        let ratio = features[SIZE_RATIO_FEATURE];
        if ratio > 1.3 {
            HeadingLevel::H1
        } else if ratio > 1.15 {
            HeadingLevel::H2
        } else {
            HeadingLevel::H3
        }
    }

    fn predict_with_model(
        &self,
        classifier: &HeadingClassifier,
        blocks: &[TextBlock],
        profile: &DocumentProfile,
    ) -> Result<Vec<HeadingPrediction>> {
        let features = self.extract_features(blocks, profile);
        blocks
            .iter()
            .zip(&features)
            .map(|(block, row)| {
                let probability = classifier.probability(row)?;
                Ok(if probability > 0.5 {
                    HeadingPrediction::heading(block.id, Self::model_level(block.trimmed(), row), probability)
                } else {
                    HeadingPrediction::rejected(block.id, probability)
                })
            })
            .collect()
    }

    /// Rule-based scoring used when no classifier is available.
    pub fn rule_based(&self, blocks: &[TextBlock]) -> Vec<HeadingPrediction> {
        blocks
            .iter()
            .map(|block| {
                let text = block.trimmed();
                let mut is_heading = false;
                let mut confidence: f64 = 0.0;

                if block.font_size > 14.0 {
                    is_heading = true;
                    confidence = 0.6;
                }
                if block.is_bold {
                    is_heading = true;
                    confidence = confidence.max(0.5);
                }
                if self.rules.is_numbered_or_chapter(text) {
                    is_heading = true;
                    confidence = confidence.max(0.7);
                }
                if is_heading && text::word_count(text) <= 10 {
                    confidence += 0.1;
                }

                if is_heading {
                    HeadingPrediction::heading(block.id, HeadingLevel::H2, confidence)
                } else {
                    HeadingPrediction::not_heading(block.id)
                }
            })
            .collect()
    }
}

impl HeadingStrategy for MlStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Ml
    }

    fn detect(&self, blocks: &[TextBlock], profile: &DocumentProfile) -> Result<Vec<HeadingPrediction>> {
        let classifier = self
            .classifier
            .get_or_load(|| HeadingClassifier::load(&self.model_dir));

        let Some(classifier) = classifier else {
            return Ok(self.rule_based(blocks));
        };

        match self.predict_with_model(&classifier, blocks, profile) {
            Ok(predictions) => Ok(predictions),
            Err(e) => {
                log::error!("ML prediction failed: {}", e);
                Ok(self.rule_based(blocks))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::model::{FeatureScaler, LogisticModel};
    use crate::model::BoundingBox;

    fn rules() -> Arc<Rules> {
        Arc::new(Rules::new().unwrap())
    }

    fn block(id: usize, text: &str, size: f32, y: f32) -> TextBlock {
        TextBlock::new(id, text, 1, BoundingBox::new(72.0, y, 200.0, size), size)
    }

    fn classifier(weights: Vec<f64>, bias: f64) -> HeadingClassifier {
        let n = weights.len();
        HeadingClassifier {
            model: LogisticModel { weights, bias },
            scaler: FeatureScaler {
                mean: vec![0.0; n],
                scale: vec![1.0; n],
            },
        }
    }

    #[test]
    fn test_fallback_without_model() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = MlStrategy::new(rules(), dir.path());
        let blocks = vec![
            block(0, "Getting around the old town", 16.0, 100.0).bold(),
            block(1, "a sentence of ordinary body text.", 11.0, 130.0),
        ];
        let predictions = strategy.detect(&blocks, &DocumentProfile::default()).unwrap();
        assert!(!strategy.has_model());
        assert!(predictions[0].is_heading);
        assert!(predictions[0].confidence >= 0.5);
        assert_eq!(predictions[0].level, Some(HeadingLevel::H2));
        assert!(!predictions[1].is_heading);
    }

    #[test]
    fn test_fallback_numbered() {
        let strategy = MlStrategy::new(rules(), "/nonexistent/models");
        let predictions = strategy.rule_based(&[block(0, "2. Scope", 11.0, 100.0)]);
        assert!((predictions[0].confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_feature_vector() {
        let strategy = MlStrategy::new(rules(), "/nonexistent/models");
        let blocks = vec![block(0, "1 Overview:", 18.0, 100.0), block(1, "Body text.", 12.0, 150.0)];
        let profile = DocumentProfile {
            doc_type: DocumentType::Business,
            ..Default::default()
        };
        let features = strategy.extract_features(&blocks, &profile);
        assert_eq!(features.len(), 2);
        let first = &features[0];
        assert_eq!(first[0], 11.0);
        assert_eq!(first[1], 2.0);
        assert_eq!(first[5], 1.0);
        assert_eq!(first[7], 18.0);
        assert!((first[SIZE_RATIO_FEATURE] - 1.2).abs() < 1e-6);
        assert_eq!(first[14], 1.0);
        assert!((first[15] - 0.32).abs() < 1e-6);
        assert_eq!(first[16], 1.0);
        assert_eq!(first[17], 1.0);
        assert_eq!(features[1][6], 0.0);
    }

    #[test]
    fn test_model_predictions() {
        // Weight only the bold feature
        let mut weights = vec![0.0; FEATURE_COUNT];
        weights[9] = 10.0;
        let strategy = MlStrategy::with_classifier(rules(), classifier(weights, -5.0));
        let blocks = vec![
            block(0, "3.1 Budget", 12.0, 100.0).bold(),
            block(1, "plain words", 12.0, 150.0),
        ];
        let predictions = strategy.detect(&blocks, &DocumentProfile::default()).unwrap();
        assert!(predictions[0].is_heading);
        assert_eq!(predictions[0].level, Some(HeadingLevel::H2));
        assert!(!predictions[1].is_heading);
        assert!(predictions[1].confidence > 0.0);
        assert_eq!(predictions[1].level, None);
    }

    #[test]
    fn test_dimension_mismatch_falls_back() {
        let strategy = MlStrategy::with_classifier(rules(), classifier(vec![1.0; 5], 0.0));
        let blocks = vec![block(0, "Chapter 1", 11.0, 100.0)];
        let predictions = strategy.detect(&blocks, &DocumentProfile::default()).unwrap();
        assert!(predictions[0].is_heading);
        assert!((predictions[0].confidence - 0.8).abs() < 1e-9);
    }
}
