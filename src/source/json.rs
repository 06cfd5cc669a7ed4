//! Block dumps stored as JSON.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::BlockSource;
use crate::error::Result;
use crate::model::SourceDocument;

/// Reads a serialized [`SourceDocument`] written by an external extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBlockSource;

impl JsonBlockSource {
    /// Create a new JSON block source.
    pub fn new() -> Self {
        Self
    }

    /// Parse a document from a JSON string.
    pub fn parse_str(json: &str) -> Result<SourceDocument> {
        Ok(serde_json::from_str(json)?)
    }
}

impl BlockSource for JsonBlockSource {
    fn extract(&self, path: &Path) -> Result<SourceDocument> {
        let reader = BufReader::new(File::open(path)?);
        let doc: SourceDocument = serde_json::from_reader(reader)?;
        log::debug!(
            "Read {} blocks over {} pages from {}",
            doc.blocks.len(),
            doc.page_count(),
            path.display()
        );
        Ok(doc)
    }

    fn name(&self) -> &'static str {
        "json"
    }
}
