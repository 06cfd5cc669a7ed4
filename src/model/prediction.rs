//! Heading levels and per-block predictions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hierarchical heading rank, H1 being the coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
}

impl HeadingLevel {
    /// Numeric depth, 1 for H1.
    pub fn number(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
            HeadingLevel::H4 => 4,
        }
    }

    /// Level for a numeric depth, clamped into H1..=H4.
    pub fn from_number(n: usize) -> Self {
        match n {
            0 | 1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            3 => HeadingLevel::H3,
            _ => HeadingLevel::H4,
        }
    }

    /// Level for a numbering depth, clamped into H1..=H3.
    pub fn from_depth(depth: usize) -> Self {
        Self::from_number(depth.min(3))
    }

    /// The next finer level, saturating at H4.
    pub fn deeper(self) -> Self {
        Self::from_number(self.number() as usize + 1)
    }

    /// Label such as `"H2"`.
    pub fn as_str(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
            HeadingLevel::H4 => "H4",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One strategy's verdict on one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingPrediction {
    /// Id of the judged block
    pub block_id: usize,
    pub is_heading: bool,
    /// Present only when `is_heading` is true
    pub level: Option<HeadingLevel>,
    /// Certainty in [0, 1]
    pub confidence: f64,
    /// Cleaned heading text when the block carries trailing body content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl HeadingPrediction {
    /// A positive prediction. Confidence is clamped into [0, 1].
    pub fn heading(block_id: usize, level: HeadingLevel, confidence: f64) -> Self {
        Self {
            block_id,
            is_heading: true,
            level: Some(level),
            confidence: clamp_confidence(confidence),
            text: None,
        }
    }

    /// A negative prediction with zero confidence.
    pub fn not_heading(block_id: usize) -> Self {
        Self::rejected(block_id, 0.0)
    }

    /// A negative prediction carrying the strategy's own confidence.
    pub fn rejected(block_id: usize, confidence: f64) -> Self {
        Self {
            block_id,
            is_heading: false,
            level: None,
            confidence: clamp_confidence(confidence),
            text: None,
        }
    }

    /// Attach a cleaned heading text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Clamp a score into [0, 1], mapping NaN to 0.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Round to three decimal places.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
