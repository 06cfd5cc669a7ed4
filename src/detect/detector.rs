//! Runs the registered strategies over candidate blocks.

use std::sync::Arc;

use super::candidates::CandidateFilter;
use super::enhanced_font::EnhancedFontStrategy;
use super::font::FontStrategy;
use super::ml::MlStrategy;
use super::pattern::PatternStrategy;
use super::semantic::SemanticStrategy;
use super::strategy::{HeadingStrategy, StrategyKind};
use super::structural::StructuralStrategy;
use super::universal::UniversalStrategy;
use crate::model::{DocumentProfile, HeadingPrediction, TextBlock};
use crate::options::{FontVariant, OutlineOptions};
use crate::rules::Rules;

/// Predictions of one strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyPredictions {
    pub kind: StrategyKind,
    pub predictions: Vec<HeadingPrediction>,
}

/// Candidates and every strategy's verdicts on them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    /// Candidate blocks, carrying their original ids
    pub candidates: Vec<TextBlock>,
    /// One entry per strategy, in registration order
    pub results: Vec<StrategyPredictions>,
}

impl Detection {
    /// Predictions of one strategy, if it ran.
    pub fn predictions(&self, kind: StrategyKind) -> Option<&[HeadingPrediction]> {
        self.results
            .iter()
            .find(|r| r.kind == kind)
            .map(|r| r.predictions.as_slice())
    }
}

/// Filters candidates and runs each strategy on them.
pub struct HeadingDetector {
    filter: CandidateFilter,
    strategies: Vec<Box<dyn HeadingStrategy>>,
}

impl std::fmt::Debug for HeadingDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<StrategyKind> = self.strategies.iter().map(|s| s.kind()).collect();
        f.debug_struct("HeadingDetector")
            .field("filter", &self.filter)
            .field("strategies", &kinds)
            .finish()
    }
}

impl HeadingDetector {
    /// Create a detector with the standard strategy set.
    pub fn new(options: &OutlineOptions, rules: Arc<Rules>) -> Self {
        let font: Box<dyn HeadingStrategy> = match options.font_variant {
            FontVariant::Standard => Box::new(FontStrategy::new()),
            FontVariant::Enhanced => Box::new(EnhancedFontStrategy::new(Arc::clone(&rules))),
        };
        let strategies: Vec<Box<dyn HeadingStrategy>> = vec![
            Box::new(UniversalStrategy::new(Arc::clone(&rules))),
            font,
            Box::new(PatternStrategy::new(Arc::clone(&rules))),
            Box::new(MlStrategy::new(Arc::clone(&rules), options.model_dir.clone())),
            Box::new(StructuralStrategy::new()),
            Box::new(SemanticStrategy::new(options.model_dir.clone())),
        ];
        Self {
            filter: CandidateFilter::new(options.candidates, rules),
            strategies,
        }
    }

    /// Create a detector with an explicit strategy list.
    pub fn with_strategies(filter: CandidateFilter, strategies: Vec<Box<dyn HeadingStrategy>>) -> Self {
        Self { filter, strategies }
    }

    /// Strategy slots in registration order.
    pub fn kinds(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// Run every strategy. A failing strategy contributes no predictions.
    pub fn detect(&self, blocks: &[TextBlock], profile: &DocumentProfile) -> Detection {
        let candidates = self.filter.filter(blocks);
        log::debug!("{} of {} blocks are heading candidates", candidates.len(), blocks.len());

        let results = self
            .strategies
            .iter()
            .map(|strategy| {
                let kind = strategy.kind();
                let predictions = match strategy.detect(&candidates, profile) {
                    Ok(predictions) => {
                        log::debug!(
                            "{} strategy detected {} headings",
                            kind,
                            predictions.iter().filter(|p| p.is_heading).count()
                        );
                        predictions
                    }
                    Err(e) => {
                        log::error!("Strategy {} failed: {}", kind, e);
                        Vec::new()
                    }
                };
                StrategyPredictions { kind, predictions }
            })
            .collect();

        Detection { candidates, results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::model::{BoundingBox, HeadingLevel};
    use crate::options::CandidateFilterConfig;

    struct Failing;

    impl HeadingStrategy for Failing {
        fn kind(&self) -> StrategyKind {
            StrategyKind::Ml
        }

        fn detect(&self, _blocks: &[TextBlock], _profile: &DocumentProfile) -> Result<Vec<HeadingPrediction>> {
            Err(Error::Strategy {
                strategy: "ml",
                message: "broken".to_string(),
            })
        }
    }

    fn rules() -> Arc<Rules> {
        Arc::new(Rules::new().unwrap())
    }

    fn block(id: usize, text: &str, size: f32, y: f32) -> TextBlock {
        TextBlock::new(id, text, 1, BoundingBox::new(72.0, y, 300.0, size), size)
    }

    #[test]
    fn test_standard_registration_order() {
        let detector = HeadingDetector::new(&OutlineOptions::default(), rules());
        assert_eq!(detector.kinds(), StrategyKind::ALL.to_vec());

        let enhanced = HeadingDetector::new(&OutlineOptions::new().enhanced_font(), rules());
        assert_eq!(enhanced.kinds(), StrategyKind::ALL.to_vec());
    }

    #[test]
    fn test_candidates_keep_ids() {
        let detector = HeadingDetector::new(&OutlineOptions::new().with_model_dir("/nonexistent/models"), rules());
        let blocks = vec![
            block(0, "7", 12.0, 50.0),
            block(1, "Old Town Walks", 18.0, 100.0).bold(),
            block(2, "A long stretch of cobbled lanes winds down to the river.", 12.0, 130.0),
        ];
        let detection = detector.detect(&blocks, &DocumentProfile::default());
        let ids: Vec<usize> = detection.candidates.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2]);
        for result in &detection.results {
            assert_eq!(result.predictions.len(), 2, "{}", result.kind);
            assert_eq!(result.predictions[0].block_id, 1);
        }
        let font = detection.predictions(StrategyKind::Font).unwrap();
        assert_eq!(font[0].level, Some(HeadingLevel::H1));
    }

    #[test]
    fn test_empty_input() {
        for options in [OutlineOptions::default(), OutlineOptions::new().enhanced_font()] {
            let detector = HeadingDetector::new(&options.with_model_dir("/nonexistent/models"), rules());
            let detection = detector.detect(&[], &DocumentProfile::default());
            assert!(detection.candidates.is_empty());
            assert_eq!(detection.results.len(), 6);
            assert!(detection.results.iter().all(|r| r.predictions.is_empty()));
        }
    }

    #[test]
    fn test_failing_strategy_abstains() {
        let filter = CandidateFilter::new(CandidateFilterConfig::default(), rules());
        let detector = HeadingDetector::with_strategies(filter, vec![Box::new(Failing), Box::new(StructuralStrategy::new())]);
        let blocks = vec![block(0, "Harbour", 14.0, 100.0)];
        let detection = detector.detect(&blocks, &DocumentProfile::default());
        assert_eq!(detection.results.len(), 2);
        assert!(detection.predictions(StrategyKind::Ml).unwrap().is_empty());
        assert_eq!(detection.predictions(StrategyKind::Structural).unwrap().len(), 1);
    }
}
