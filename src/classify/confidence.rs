//! Ensemble confidence.

use crate::model::{round3, HeadingLevel};

/// Weighted votes collected for one block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoteTally {
    /// Sum of weight × confidence over strategies voting heading
    pub heading_score: f64,
    /// Sum of weight × (1 − confidence) over strategies voting not heading
    pub not_heading_score: f64,
    /// Weighted level votes, in the order levels were first proposed
    pub level_votes: Vec<(HeadingLevel, f64)>,
    /// Raw confidence of every voting strategy
    pub confidences: Vec<f64>,
}

impl VoteTally {
    /// Add a weighted level vote.
    pub fn add_level(&mut self, level: HeadingLevel, vote: f64) {
        match self.level_votes.iter_mut().find(|(l, _)| *l == level) {
            Some((_, total)) => *total += vote,
            None => self.level_votes.push((level, vote)),
        }
    }

    /// Heading wins only with a strictly larger score.
    pub fn is_heading(&self) -> bool {
        self.heading_score > self.not_heading_score
    }

    /// Level with the most weight. The first proposed level wins ties.
    pub fn winning_level(&self) -> Option<HeadingLevel> {
        let mut best: Option<(HeadingLevel, f64)> = None;
        for &(level, vote) in &self.level_votes {
            if best.map_or(true, |(_, b)| vote > b) {
                best = Some((level, vote));
            }
        }
        best.map(|(level, _)| level)
    }
}

/// Blends vote share, mean strategy confidence, agreement and level
/// agreement into one score.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceScorer;

impl ConfidenceScorer {
    /// Create a scorer.
    pub fn new() -> Self {
        Self
    }

    /// Final confidence of one block, rounded to 3 decimals.
    ///
    /// A block with no weighted evidence either way scores 0.
    pub fn ensemble_confidence(&self, tally: &VoteTally) -> f64 {
        let total = tally.heading_score + tally.not_heading_score;
        if total <= 0.0 {
            return 0.0;
        }
        let vote_ratio = tally.heading_score / total;

        let (mean, agreement) = if tally.confidences.is_empty() {
            (0.0, 0.0)
        } else {
            let n = tally.confidences.len() as f64;
            let mean = tally.confidences.iter().sum::<f64>() / n;
            let variance = tally.confidences.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n;
            (mean, 1.0 - variance.sqrt().min(1.0))
        };

        let level_total: f64 = tally.level_votes.iter().map(|(_, v)| v).sum();
        let level_agreement = if level_total > 0.0 {
            let max = tally.level_votes.iter().map(|(_, v)| *v).fold(0.0, f64::max);
            max / level_total
        } else {
            1.0
        };

        round3(0.4 * vote_ratio + 0.3 * mean + 0.2 * agreement + 0.1 * level_agreement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worked_example() {
        // universal (H1, 0.9) and font (H1, 0.8) vote heading, pattern votes
        // not heading at 0.5; weights 0.5, 0.2, 0.15
        let mut tally = VoteTally::default();
        tally.heading_score = 0.5 * 0.9 + 0.2 * 0.8;
        tally.add_level(HeadingLevel::H1, 0.5 * 0.9);
        tally.add_level(HeadingLevel::H1, 0.2 * 0.8);
        tally.not_heading_score = 0.15 * 0.5;
        tally.confidences = vec![0.9, 0.8, 0.5];

        assert!((tally.heading_score - 0.61).abs() < 1e-9);
        assert!(tally.is_heading());
        assert_eq!(tally.winning_level(), Some(HeadingLevel::H1));

        let vote_ratio = 0.61 / 0.685;
        let mean = 2.2 / 3.0;
        let std = ((0.9f64 - mean).powi(2) + (0.8 - mean).powi(2) + (0.5 - mean).powi(2)) / 3.0;
        let expected = 0.4 * vote_ratio + 0.3 * mean + 0.2 * (1.0 - std.sqrt()) + 0.1;
        assert_eq!(ConfidenceScorer::new().ensemble_confidence(&tally), round3(expected));
    }

    #[test]
    fn test_tie_is_not_heading() {
        let tally = VoteTally {
            heading_score: 0.3,
            not_heading_score: 0.3,
            ..Default::default()
        };
        assert!(!tally.is_heading());
    }

    #[test]
    fn test_first_level_wins_ties() {
        let mut tally = VoteTally::default();
        tally.add_level(HeadingLevel::H2, 0.2);
        tally.add_level(HeadingLevel::H1, 0.2);
        assert_eq!(tally.winning_level(), Some(HeadingLevel::H2));
    }

    #[test]
    fn test_no_votes() {
        let tally = VoteTally::default();
        assert_eq!(tally.winning_level(), None);
        assert_eq!(ConfidenceScorer::new().ensemble_confidence(&tally), 0.0);

        // certain "not heading" votes carry no weight either
        let tally = VoteTally {
            confidences: vec![1.0, 1.0],
            ..Default::default()
        };
        assert_eq!(ConfidenceScorer::new().ensemble_confidence(&tally), 0.0);
    }
}
