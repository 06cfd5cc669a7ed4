//! Block cleanup: text normalization, validation, ordering and merging.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::model::{BoundingBox, PageInfo, SourceDocument, TextBlock};
use crate::options::MergeConfig;
use crate::text;

/// Font size difference beyond which adjacent blocks are never merged.
const MERGE_FONT_TOLERANCE: f32 = 1.0;

/// Check that a block has usable geometry and font data.
pub fn validate_block(block: &TextBlock) -> Result<()> {
    if block.page == 0 {
        return Err(Error::InvalidBlock(format!(
            "block {} has page 0 (pages are 1-indexed)",
            block.id
        )));
    }
    if !block.bbox.is_finite() {
        return Err(Error::InvalidBlock(format!(
            "block {} has a non-finite bounding box",
            block.id
        )));
    }
    if !block.font_size.is_finite() || block.font_size < 0.0 {
        return Err(Error::InvalidBlock(format!(
            "block {} has font size {}",
            block.id, block.font_size
        )));
    }
    Ok(())
}

/// Check that a page has a usable size.
pub fn validate_page(page: &PageInfo) -> Result<()> {
    if page.number == 0 {
        return Err(Error::InvalidPage("page number 0".to_string()));
    }
    if !(page.width.is_finite() && page.height.is_finite()) || page.width <= 0.0 || page.height <= 0.0 {
        return Err(Error::InvalidPage(format!(
            "page {} has size {}x{}",
            page.number, page.width, page.height
        )));
    }
    Ok(())
}

fn reading_order(a: &TextBlock, b: &TextBlock) -> Ordering {
    a.page
        .cmp(&b.page)
        .then_with(|| a.bbox.y.total_cmp(&b.bbox.y))
        .then_with(|| a.bbox.x.total_cmp(&b.bbox.x))
}

/// Normalize text, drop empty or invalid blocks, sort by (page, y, x),
/// merge adjacent fragments and re-assign ids.
pub fn normalize_blocks(blocks: Vec<TextBlock>, merge: &MergeConfig) -> Vec<TextBlock> {
    let mut cleaned: Vec<TextBlock> = blocks
        .into_iter()
        .filter_map(|mut block| {
            block.text = text::normalize(&block.text);
            if block.text.is_empty() {
                return None;
            }
            match validate_block(&block) {
                Ok(()) => Some(block),
                Err(e) => {
                    log::warn!("Dropping block: {}", e);
                    None
                }
            }
        })
        .collect();

    cleaned.sort_by(reading_order);

    let mut blocks = if merge.enabled {
        merge_blocks(cleaned, merge)
    } else {
        cleaned
    };

    for (i, block) in blocks.iter_mut().enumerate() {
        block.id = i;
    }
    blocks
}

/// Merge vertically adjacent blocks that share a left edge and font.
///
/// Expects blocks in reading order.
pub fn merge_blocks(blocks: Vec<TextBlock>, config: &MergeConfig) -> Vec<TextBlock> {
    let mut merged: Vec<TextBlock> = Vec::with_capacity(blocks.len());

    for block in blocks {
        if let Some(current) = merged.last_mut() {
            if should_merge(current, &block, config) {
                absorb(current, block);
                continue;
            }
        }
        merged.push(block);
    }

    merged
}

fn should_merge(current: &TextBlock, next: &TextBlock, config: &MergeConfig) -> bool {
    current.page == next.page
        && (next.bbox.y - current.bottom()).abs() < config.max_vertical_gap
        && (next.bbox.x - current.bbox.x).abs() < config.max_horizontal_offset
        && (next.font_size - current.font_size).abs() <= MERGE_FONT_TOLERANCE
        && next.is_bold == current.is_bold
}

fn absorb(current: &mut TextBlock, next: TextBlock) {
    let left = current.bbox.x.min(next.bbox.x);
    let right = current.bbox.right().max(next.bbox.right());
    let bottom = current.bottom().max(next.bottom());

    current.text.push(' ');
    current.text.push_str(&next.text);
    current.bbox = BoundingBox::new(left, current.bbox.y, right - left, bottom - current.bbox.y);
    current.line_count += next.line_count;
}

/// Normalize a whole document: drop unusable pages and clean the blocks.
pub fn normalize_document(mut doc: SourceDocument, merge: &MergeConfig) -> SourceDocument {
    doc.pages.retain(|page| match validate_page(page) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Ignoring page geometry: {}", e);
            false
        }
    });
    doc.pages.sort_by_key(|p| p.number);
    doc.blocks = normalize_blocks(std::mem::take(&mut doc.blocks), merge);
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(text: &str, page: u32, x: f32, y: f32, height: f32, size: f32) -> TextBlock {
        TextBlock::new(0, text, page, BoundingBox::new(x, y, 300.0, height), size)
    }

    #[test]
    fn test_sort_and_reindex() {
        let blocks = vec![
            block("second", 1, 72.0, 300.0, 12.0, 11.0),
            block("third", 2, 72.0, 80.0, 12.0, 11.0),
            block("first", 1, 72.0, 100.0, 12.0, 11.0),
        ];
        let result = normalize_blocks(blocks, &MergeConfig::default());
        let texts: Vec<&str> = result.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert_eq!(result.iter().map(|b| b.id).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_merge_adjacent_lines() {
        let blocks = vec![
            block("The quick brown fox", 1, 72.0, 100.0, 12.0, 11.0),
            block("jumps over the dog", 1, 74.0, 114.0, 12.0, 11.0),
        ];
        let result = normalize_blocks(blocks, &MergeConfig::default());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].text, "The quick brown fox jumps over the dog");
        assert_eq!(result[0].line_count, 2);
        assert_eq!(result[0].bbox.height, 26.0);
        assert_eq!(result[0].bbox.width, 302.0);
    }

    #[test]
    fn test_no_merge_across_font_change() {
        let blocks = vec![
            block("Results", 1, 72.0, 100.0, 18.0, 18.0),
            block("We measured the output.", 1, 72.0, 120.0, 12.0, 11.0),
        ];
        let result = normalize_blocks(blocks, &MergeConfig::default());
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_merge_disabled() {
        let blocks = vec![
            block("a line", 1, 72.0, 100.0, 12.0, 11.0),
            block("another", 1, 72.0, 113.0, 12.0, 11.0),
        ];
        let config = MergeConfig {
            enabled: false,
            ..Default::default()
        };
        assert_eq!(normalize_blocks(blocks, &config).len(), 2);
    }

    #[test]
    fn test_drops_empty_and_invalid_blocks() {
        let mut nan = block("bad", 1, 72.0, 100.0, 12.0, 11.0);
        nan.bbox.y = f32::NAN;
        let blocks = vec![
            block("   \n ", 1, 72.0, 50.0, 12.0, 11.0),
            nan,
            block("kept", 1, 72.0, 200.0, 12.0, 11.0),
        ];
        let result = normalize_blocks(blocks, &MergeConfig::default());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].text, "kept");
    }

    #[test]
    fn test_validate_page() {
        assert!(validate_page(&PageInfo::letter(1)).is_ok());
        assert!(matches!(
            validate_page(&PageInfo::new(2, 0.0, 792.0)),
            Err(Error::InvalidPage(_))
        ));
    }

    #[test]
    fn test_normalize_document_drops_bad_pages() {
        let doc = SourceDocument::from_blocks(vec![block("Text", 1, 72.0, 90.0, 12.0, 11.0)])
            .with_page(PageInfo::new(1, f32::INFINITY, 792.0));
        let doc = normalize_document(doc, &MergeConfig::default());
        assert!(doc.pages.is_empty());
        assert_eq!(doc.page(1).width, 612.0);
    }
}
