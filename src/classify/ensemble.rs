//! Weighted voting across strategies.

use std::collections::HashMap;

use super::confidence::{ConfidenceScorer, VoteTally};
use super::hierarchy::HierarchyClassifier;
use crate::detect::Detection;
use crate::model::{HeadingLevel, HeadingPrediction, TextBlock};
use crate::options::StrategyWeights;

/// The ensemble's verdict on one candidate block.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub block_id: usize,
    pub is_heading: bool,
    /// Set only for headings
    pub level: Option<HeadingLevel>,
    pub confidence: f64,
    /// Cleaned heading text supplied by a strategy
    pub text: Option<String>,
    pub tally: VoteTally,
}

/// Combines strategy predictions into one verdict per candidate.
#[derive(Debug, Clone)]
pub struct EnsembleVoter {
    weights: StrategyWeights,
    scorer: ConfidenceScorer,
    hierarchy: Option<HierarchyClassifier>,
}

impl EnsembleVoter {
    /// Create a voter. With a hierarchy classifier, heading levels are
    /// re-derived after voting.
    pub fn new(weights: StrategyWeights, hierarchy: Option<HierarchyClassifier>) -> Self {
        Self {
            weights,
            scorer: ConfidenceScorer::new(),
            hierarchy,
        }
    }

    /// One verdict per candidate, in candidate order.
    ///
    /// Strategies with zero weight do not vote. A strategy that produced no
    /// prediction for a block is skipped for that block.
    pub fn vote(&self, detection: &Detection) -> Vec<Verdict> {
        let lookups: Vec<(f64, HashMap<usize, &HeadingPrediction>)> = detection
            .results
            .iter()
            .filter(|r| self.weights.get(r.kind) > 0.0)
            .map(|r| {
                let by_block = r.predictions.iter().map(|p| (p.block_id, p)).collect::<HashMap<_, _>>();
                (self.weights.get(r.kind), by_block)
            })
            .collect();

        let mut verdicts: Vec<Verdict> = detection
            .candidates
            .iter()
            .map(|block| {
                let mut tally = VoteTally::default();
                let mut text = None;
                for (weight, predictions) in &lookups {
                    let Some(prediction) = predictions.get(&block.id) else {
                        continue;
                    };
                    if prediction.is_heading {
                        let vote = weight * prediction.confidence;
                        tally.heading_score += vote;
                        if let Some(level) = prediction.level {
                            tally.add_level(level, vote);
                        }
                        if text.is_none() {
                            text = prediction.text.clone();
                        }
                    } else {
                        tally.not_heading_score += weight * (1.0 - prediction.confidence);
                    }
                    tally.confidences.push(prediction.confidence);
                }

                let is_heading = tally.is_heading();
                Verdict {
                    block_id: block.id,
                    is_heading,
                    level: if is_heading { tally.winning_level() } else { None },
                    confidence: self.scorer.ensemble_confidence(&tally),
                    text: if is_heading { text } else { None },
                    tally,
                }
            })
            .collect();

        if let Some(hierarchy) = &self.hierarchy {
            reclassify(hierarchy, &mut verdicts, &detection.candidates);
        }
        verdicts
    }
}

/// Overwrite heading levels with the hierarchy classifier's opinion.
fn reclassify(hierarchy: &HierarchyClassifier, verdicts: &mut [Verdict], candidates: &[TextBlock]) {
    let blocks: HashMap<usize, &TextBlock> = candidates.iter().map(|b| (b.id, b)).collect();
    let headings: Vec<(usize, &TextBlock)> = verdicts
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_heading)
        .filter_map(|(i, v)| blocks.get(&v.block_id).map(|b| (i, *b)))
        .collect();
    if headings.is_empty() {
        return;
    }

    let refs: Vec<&TextBlock> = headings.iter().map(|(_, b)| *b).collect();
    let levels = hierarchy.classify(&refs);
    for ((index, _), level) in headings.iter().zip(levels) {
        verdicts[*index].level = Some(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{StrategyKind, StrategyPredictions};
    use crate::model::BoundingBox;
    use crate::rules::Rules;
    use std::sync::Arc;

    fn block(id: usize, text: &str) -> TextBlock {
        TextBlock::new(id, text, 1, BoundingBox::new(72.0, 100.0 + id as f32 * 20.0, 200.0, 12.0), 12.0)
    }

    fn results(kind: StrategyKind, predictions: Vec<HeadingPrediction>) -> StrategyPredictions {
        StrategyPredictions { kind, predictions }
    }

    fn worked_example() -> Detection {
        Detection {
            candidates: vec![block(4, "Where to Stay")],
            results: vec![
                results(StrategyKind::Universal, vec![HeadingPrediction::heading(4, HeadingLevel::H1, 0.9)]),
                results(StrategyKind::Font, vec![HeadingPrediction::heading(4, HeadingLevel::H1, 0.8)]),
                results(StrategyKind::Pattern, vec![HeadingPrediction::rejected(4, 0.5)]),
            ],
        }
    }

    #[test]
    fn test_worked_example() {
        let voter = EnsembleVoter::new(StrategyWeights::default(), None);
        let verdicts = voter.vote(&worked_example());
        assert_eq!(verdicts.len(), 1);
        let verdict = &verdicts[0];
        assert_eq!(verdict.block_id, 4);
        assert!(verdict.is_heading);
        assert_eq!(verdict.level, Some(HeadingLevel::H1));
        assert!((verdict.tally.heading_score - 0.61).abs() < 1e-9);
        assert!((verdict.tally.not_heading_score - 0.075).abs() < 1e-9);
        assert!(verdict.confidence > 0.8 && verdict.confidence < 0.9);
    }

    #[test]
    fn test_zero_weight_does_not_vote() {
        let mut detection = worked_example();
        detection.results.push(results(
            StrategyKind::Semantic,
            vec![HeadingPrediction::heading(4, HeadingLevel::H3, 1.0)],
        ));
        let voter = EnsembleVoter::new(StrategyWeights::default(), None);
        let verdict = &voter.vote(&detection)[0];
        assert_eq!(verdict.tally.confidences.len(), 3);
        assert_eq!(verdict.tally.level_votes.len(), 1);
    }

    #[test]
    fn test_missing_predictions_are_skipped() {
        let detection = Detection {
            candidates: vec![block(0, "Markets"), block(1, "plain")],
            results: vec![results(
                StrategyKind::Font,
                vec![HeadingPrediction::heading(0, HeadingLevel::H2, 0.7)],
            )],
        };
        let verdicts = EnsembleVoter::new(StrategyWeights::default(), None).vote(&detection);
        assert!(verdicts[0].is_heading);
        assert!(!verdicts[1].is_heading);
        assert_eq!(verdicts[1].level, None);
        assert!(verdicts[1].tally.confidences.is_empty());
    }

    #[test]
    fn test_text_override_and_reclassification() {
        let detection = Detection {
            candidates: vec![block(0, "2.1 Ferries\nBoats leave hourly from the harbour")],
            results: vec![results(
                StrategyKind::Universal,
                vec![HeadingPrediction::heading(0, HeadingLevel::H1, 0.9).with_text("2.1 Ferries")],
            )],
        };
        let hierarchy = HierarchyClassifier::new(Arc::new(Rules::new().unwrap()));
        let verdict = &EnsembleVoter::new(StrategyWeights::default(), Some(hierarchy)).vote(&detection)[0];
        assert_eq!(verdict.text.as_deref(), Some("2.1 Ferries"));
        // numbering and the single font size both say H2
        assert_eq!(verdict.level, Some(HeadingLevel::H2));
    }
}
