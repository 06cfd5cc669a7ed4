//! The outline artifact and its title/TOC inputs.

use serde::{Deserialize, Serialize};

use super::HeadingLevel;
use crate::error::{Error, Result};

/// Layout of serialized outline JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Indented, one field per line
    #[default]
    Pretty,
    /// Single line
    Compact,
}

/// Where a document title came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleSource {
    Metadata,
    Detection,
    Fallback,
}

/// A resolved document title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleInfo {
    pub text: String,
    pub confidence: f64,
    pub source: TitleSource,
    /// Block the title was read from, for detected titles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<usize>,
}

/// How a table of contents was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TocSource {
    /// Parsed after a "Contents" style header
    Header,
    /// Inferred from consecutive entry-shaped lines
    Pattern,
}

/// One parsed table of contents line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocEntry {
    pub title: String,
    /// Page number printed in the entry
    pub page: u32,
    pub level: HeadingLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<usize>,
}

/// A detected table of contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocInfo {
    pub found: bool,
    pub entries: Vec<TocEntry>,
    pub source: TocSource,
}

/// One heading in the outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: HeadingLevel,
    pub text: String,
    pub page: u32,
}

/// Summary of final heading confidences.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfidenceStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Outline-level metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutlineMetadata {
    pub total_headings: usize,
    pub has_toc: bool,
    pub confidence_stats: ConfidenceStats,
}

/// Title and heading hierarchy of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub title: String,
    pub outline: Vec<OutlineEntry>,
    pub metadata: OutlineMetadata,
    /// Parsed table of contents, when one was found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toc: Option<TocInfo>,
}

impl Outline {
    /// Title used when nothing better is known.
    pub const FALLBACK_TITLE: &'static str = "Document Outline";

    /// A well-formed outline with no headings.
    pub fn empty() -> Self {
        Self {
            title: Self::FALLBACK_TITLE.to_string(),
            outline: Vec::new(),
            metadata: OutlineMetadata::default(),
            toc: None,
        }
    }

    /// Number of headings.
    pub fn len(&self) -> usize {
        self.outline.len()
    }

    /// Check if no headings were found.
    pub fn is_empty(&self) -> bool {
        self.outline.is_empty()
    }

    /// Headings at one level.
    pub fn entries_at(&self, level: HeadingLevel) -> impl Iterator<Item = &OutlineEntry> {
        self.outline.iter().filter(move |e| e.level == level)
    }

    /// Serialize the outline as JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        let json = match format {
            JsonFormat::Pretty => serde_json::to_string_pretty(self),
            JsonFormat::Compact => serde_json::to_string(self),
        };
        json.map_err(|e| Error::Render(e.to_string()))
    }

    /// Read back an outline written by [`Outline::to_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for Outline {
    fn default() -> Self {
        Self::empty()
    }
}
