//! Extraction options and configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::detect::StrategyKind;
use crate::error::{Error, Result};

/// Options for outline extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineOptions {
    /// Ensemble weight of each strategy
    pub weights: StrategyWeights,

    /// Which font strategy implementation fills the font slot
    pub font_variant: FontVariant,

    /// Directory holding model artifacts
    pub model_dir: PathBuf,

    /// Candidate filter limits
    pub candidates: CandidateFilterConfig,

    /// Block merge settings
    pub merge: MergeConfig,

    /// Re-derive levels with the hierarchy classifier after voting
    pub reclassify_levels: bool,

    /// Run the title detector
    pub detect_title: bool,

    /// Run the table of contents detector
    pub detect_toc: bool,

    /// Process batches across documents in parallel
    pub parallel: bool,
}

impl OutlineOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let options: Self = serde_json::from_str(&data)?;
        options.validate()?;
        Ok(options)
    }

    /// Set strategy weights.
    pub fn with_weights(mut self, weights: StrategyWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Set one strategy's weight.
    pub fn with_weight(mut self, kind: StrategyKind, weight: f64) -> Self {
        self.weights.set(kind, weight);
        self
    }

    /// Select the font strategy variant.
    pub fn with_font_variant(mut self, variant: FontVariant) -> Self {
        self.font_variant = variant;
        self
    }

    /// Use the enhanced font strategy.
    pub fn enhanced_font(mut self) -> Self {
        self.font_variant = FontVariant::Enhanced;
        self
    }

    /// Set the model artifact directory.
    pub fn with_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = dir.into();
        self
    }

    /// Set candidate filter limits.
    pub fn with_candidates(mut self, config: CandidateFilterConfig) -> Self {
        self.candidates = config;
        self
    }

    /// Set block merge settings.
    pub fn with_merge(mut self, config: MergeConfig) -> Self {
        self.merge = config;
        self
    }

    /// Disable block merging.
    pub fn without_merge(mut self) -> Self {
        self.merge.enabled = false;
        self
    }

    /// Enable or disable level reclassification.
    pub fn with_reclassify_levels(mut self, enabled: bool) -> Self {
        self.reclassify_levels = enabled;
        self
    }

    /// Enable or disable title detection.
    pub fn with_title_detection(mut self, enabled: bool) -> Self {
        self.detect_title = enabled;
        self
    }

    /// Enable or disable table of contents detection.
    pub fn with_toc_detection(mut self, enabled: bool) -> Self {
        self.detect_toc = enabled;
        self
    }

    /// Enable or disable parallel batch processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel batch processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        for kind in StrategyKind::ALL {
            let weight = self.weights.get(kind);
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::Config(format!(
                    "weight for {} must be a non-negative number, got {}",
                    kind, weight
                )));
            }
        }
        if self.candidates.min_length > self.candidates.max_length {
            return Err(Error::Config(format!(
                "candidate min_length {} exceeds max_length {}",
                self.candidates.min_length, self.candidates.max_length
            )));
        }
        if !(self.merge.max_vertical_gap.is_finite() && self.merge.max_horizontal_offset.is_finite()) {
            return Err(Error::Config("merge thresholds must be finite".to_string()));
        }
        Ok(())
    }
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            weights: StrategyWeights::default(),
            font_variant: FontVariant::Standard,
            model_dir: PathBuf::from("models"),
            candidates: CandidateFilterConfig::default(),
            merge: MergeConfig::default(),
            reclassify_levels: true,
            detect_title: true,
            detect_toc: true,
            parallel: true,
        }
    }
}

/// Ensemble weight per strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyWeights {
    pub universal: f64,
    pub font: f64,
    pub pattern: f64,
    pub ml: f64,
    pub structural: f64,
    /// Zero by default: the semantic strategy runs but does not vote
    pub semantic: f64,
}

impl StrategyWeights {
    /// Weight for one strategy.
    pub fn get(&self, kind: StrategyKind) -> f64 {
        match kind {
            StrategyKind::Universal => self.universal,
            StrategyKind::Font => self.font,
            StrategyKind::Pattern => self.pattern,
            StrategyKind::Ml => self.ml,
            StrategyKind::Structural => self.structural,
            StrategyKind::Semantic => self.semantic,
        }
    }

    /// Replace one strategy's weight.
    pub fn set(&mut self, kind: StrategyKind, weight: f64) {
        let slot = match kind {
            StrategyKind::Universal => &mut self.universal,
            StrategyKind::Font => &mut self.font,
            StrategyKind::Pattern => &mut self.pattern,
            StrategyKind::Ml => &mut self.ml,
            StrategyKind::Structural => &mut self.structural,
            StrategyKind::Semantic => &mut self.semantic,
        };
        *slot = weight;
    }
}

impl Default for StrategyWeights {
    fn default() -> Self {
        Self {
            universal: 0.5,
            font: 0.2,
            pattern: 0.15,
            ml: 0.1,
            structural: 0.05,
            semantic: 0.0,
        }
    }
}

/// Font strategy implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontVariant {
    /// Size ratio, bold and caps rules with rank-based levels
    #[default]
    Standard,
    /// Content-quality scoring with noise rejection and H4 support
    Enhanced,
}

/// Limits applied by the candidate filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateFilterConfig {
    /// Minimum trimmed text length in characters
    pub min_length: usize,
    /// Maximum trimmed text length in characters
    pub max_length: usize,
    /// Maximum embedded newlines
    pub max_newlines: usize,
}

impl Default for CandidateFilterConfig {
    fn default() -> Self {
        Self {
            min_length: 2,
            max_length: 200,
            max_newlines: 2,
        }
    }
}

/// Block merge settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub enabled: bool,
    /// Blocks merge when the vertical gap is below this
    pub max_vertical_gap: f32,
    /// Blocks merge when left edges differ by less than this
    pub max_horizontal_offset: f32,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_vertical_gap: 5.0,
            max_horizontal_offset: 50.0,
        }
    }
}
