//! Table of contents detection.

use std::sync::Arc;

use crate::model::{HeadingLevel, TextBlock, TocEntry, TocInfo, TocSource};
use crate::rules::Rules;
use crate::text;

/// Blocks searched for a contents header.
const HEADER_WINDOW: usize = 50;

/// Blocks parsed after a header, or scanned without one.
const ENTRY_WINDOW: usize = 100;

/// Entries needed before a run of entries counts as a contents list.
const MIN_ENTRIES: usize = 3;

/// Locates and parses a table of contents.
#[derive(Debug, Clone)]
pub struct TocDetector {
    rules: Arc<Rules>,
}

impl TocDetector {
    /// Create a TOC detector.
    pub fn new(rules: Arc<Rules>) -> Self {
        Self { rules }
    }

    /// Find a table of contents, either after a header block or from a run
    /// of entry-shaped blocks.
    pub fn detect(&self, blocks: &[TextBlock]) -> Option<TocInfo> {
        match self.find_header(blocks) {
            Some(start) => Some(TocInfo {
                found: true,
                entries: self.parse_after(blocks, start),
                source: TocSource::Header,
            }),
            None => {
                let entries = self.scan(blocks);
                (!entries.is_empty()).then_some(TocInfo {
                    found: true,
                    entries,
                    source: TocSource::Pattern,
                })
            }
        }
    }

    fn find_header(&self, blocks: &[TextBlock]) -> Option<usize> {
        blocks
            .iter()
            .take(HEADER_WINDOW)
            .position(|b| self.rules.toc.header.is_match(b.trimmed()))
    }

    fn parse_after(&self, blocks: &[TextBlock], start: usize) -> Vec<TocEntry> {
        let end = (start + ENTRY_WINDOW).min(blocks.len());
        let mut entries = Vec::new();
        for block in blocks.get(start + 1..end).unwrap_or_default() {
            match self.parse_entry(block) {
                Some(entry) => entries.push(entry),
                None if entries.len() > MIN_ENTRIES => break,
                None => {}
            }
        }
        entries
    }

    fn scan(&self, blocks: &[TextBlock]) -> Vec<TocEntry> {
        let mut entries = Vec::new();
        let mut consecutive = 0;
        for block in blocks.iter().take(ENTRY_WINDOW) {
            match self.parse_entry(block) {
                Some(entry) => {
                    entries.push(entry);
                    consecutive += 1;
                }
                None if consecutive > MIN_ENTRIES => break,
                None => consecutive = 0,
            }
        }
        if entries.len() > MIN_ENTRIES {
            entries
        } else {
            Vec::new()
        }
    }

    /// Parse one block as a contents line.
    pub fn parse_entry(&self, block: &TextBlock) -> Option<TocEntry> {
        let line = block.trimmed();
        self.rules.toc.entries.iter().find_map(|pattern| {
            let caps = pattern.captures(line)?;
            let (title, page) = match (caps.get(1), caps.get(2), caps.get(3)) {
                (Some(number), Some(title), Some(page)) => {
                    (format!("{} {}", number.as_str(), title.as_str()), page.as_str())
                }
                (Some(title), Some(page), None) => (title.as_str().to_string(), page.as_str()),
                _ => return None,
            };
            let page: u32 = page.parse().ok()?;
            let title = title.trim().to_string();
            Some(TocEntry {
                level: entry_level(&title),
                title,
                page,
                block_id: Some(block.id),
            })
        })
    }
}

fn entry_level(title: &str) -> HeadingLevel {
    match text::numbering_depth(title) {
        Some(depth) => HeadingLevel::from_depth(depth),
        None => HeadingLevel::H1,
    }
}
