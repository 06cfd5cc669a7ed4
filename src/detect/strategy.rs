//! The heading strategy contract.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{DocumentProfile, HeadingPrediction, TextBlock};

/// Identifies a strategy slot in the ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Universal,
    Font,
    Pattern,
    Ml,
    Structural,
    Semantic,
}

impl StrategyKind {
    /// All strategies in registration order. Level ties in the ensemble go
    /// to the strategy listed first.
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::Universal,
        StrategyKind::Font,
        StrategyKind::Pattern,
        StrategyKind::Ml,
        StrategyKind::Structural,
        StrategyKind::Semantic,
    ];

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Universal => "universal",
            StrategyKind::Font => "font",
            StrategyKind::Pattern => "pattern",
            StrategyKind::Ml => "ml",
            StrategyKind::Structural => "structural",
            StrategyKind::Semantic => "semantic",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A heading detection heuristic.
///
/// Implementations return one prediction per input block, carrying the
/// block's id, and never mutate their input. An `Err` means the strategy
/// abstains for this document.
pub trait HeadingStrategy: Send + Sync {
    /// The ensemble slot this strategy fills.
    fn kind(&self) -> StrategyKind;

    /// Score every block.
    fn detect(&self, blocks: &[TextBlock], profile: &DocumentProfile) -> Result<Vec<HeadingPrediction>>;
}

/// Spacing to the previous and next block on the same page.
///
/// `None` at a page boundary or the ends of the list.
pub(crate) fn neighbor_gaps(blocks: &[TextBlock], index: usize) -> (Option<f32>, Option<f32>) {
    let block = &blocks[index];
    let before = index
        .checked_sub(1)
        .and_then(|i| blocks.get(i))
        .and_then(|prev| prev.gap_to(block));
    let after = blocks.get(index + 1).and_then(|next| block.gap_to(next));
    (before, after)
}

/// Body font size from the profile, falling back to the default.
pub(crate) fn body_size(profile: &DocumentProfile) -> f32 {
    if profile.body_font_size > 0.0 {
        profile.body_font_size
    } else {
        crate::model::DEFAULT_BODY_FONT_SIZE
    }
}
