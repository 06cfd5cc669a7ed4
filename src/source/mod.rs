//! Block source seam.
//!
//! Outline extraction never reads PDF bytes itself. A [`BlockSource`]
//! supplies positioned text blocks, page geometry and metadata for a file,
//! and [`normalize_document`] cleans that output before profiling.

mod json;
mod normalize;

pub use json::JsonBlockSource;
pub use normalize::{merge_blocks, normalize_blocks, normalize_document, validate_block, validate_page};

use std::path::Path;

use crate::error::Result;
use crate::model::SourceDocument;

/// Produces text blocks for a document on disk.
///
/// Implementations should return an error for unreadable, encrypted or
/// corrupt input; the extractor turns errors into an empty document.
pub trait BlockSource: Send + Sync {
    /// Extract blocks, page geometry and metadata.
    fn extract(&self, path: &Path) -> Result<SourceDocument>;

    /// Short name used in log messages.
    fn name(&self) -> &'static str {
        "custom"
    }
}
