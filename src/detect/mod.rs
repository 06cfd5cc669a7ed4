//! Heading detection.
//!
//! Every strategy implements [`HeadingStrategy`] and scores the candidate
//! blocks chosen by [`CandidateFilter`]. [`HeadingDetector`] runs them in
//! registration order and collects their verdicts for the ensemble.
//! [`TitleDetector`] and [`TocDetector`] supply the outline's title and
//! table of contents.

mod candidates;
mod detector;
mod enhanced_font;
mod font;
mod ml;
mod model;
mod pattern;
mod semantic;
mod strategy;
mod structural;
mod title;
mod toc;
mod universal;

pub use candidates::CandidateFilter;
pub use detector::{Detection, HeadingDetector, StrategyPredictions};
pub use enhanced_font::EnhancedFontStrategy;
pub use font::{FontStrategy, H1_SIZE_RATIO, H2_SIZE_RATIO, H3_SIZE_RATIO, TITLE_SIZE_RATIO};
pub use ml::{MlStrategy, FEATURE_COUNT};
pub use model::{
    FeatureScaler, HeadingClassifier, Lexicon, LogisticModel, ModelSlot, ModelState, PosTag, CLASSIFIER_FILE,
    LEXICON_FILE, SCALER_FILE,
};
pub use pattern::PatternStrategy;
pub use semantic::SemanticStrategy;
pub use strategy::{HeadingStrategy, StrategyKind};
pub use structural::StructuralStrategy;
pub use title::TitleDetector;
pub use toc::TocDetector;
pub use universal::UniversalStrategy;
