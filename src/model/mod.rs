//! Data model for outline extraction.
//!
//! These types carry a document through the pipeline: positioned
//! [`TextBlock`]s from the block source, a read-only [`DocumentProfile`],
//! per-strategy [`HeadingPrediction`]s, and finally the [`Outline`]
//! artifact handed to downstream consumers.

mod block;
mod outline;
mod prediction;
mod profile;

pub use block::{
    BoundingBox, PageInfo, SourceDocument, SourceMetadata, TextBlock, LETTER_HEIGHT, LETTER_WIDTH,
};
pub use outline::{
    ConfidenceStats, JsonFormat, Outline, OutlineEntry, OutlineMetadata, TitleInfo, TitleSource, TocEntry,
    TocInfo, TocSource,
};
pub use prediction::{clamp_confidence, round3, HeadingLevel, HeadingPrediction};
pub use profile::{
    DocumentProfile, DocumentType, FormattingStats, Language, LayoutInfo, LayoutType, Margins,
    Orientation, DEFAULT_BODY_FONT_SIZE,
};
