//! Cheap pre-pass that drops blocks which cannot be headings.

use std::sync::Arc;

use crate::model::TextBlock;
use crate::options::CandidateFilterConfig;
use crate::rules::{Rules, CAPTION_PREFIXES};
use crate::text;

/// Selects plausible heading candidates from a block list.
///
/// Candidates keep their original `id`, which is how strategy output is
/// mapped back onto the full block list.
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    config: CandidateFilterConfig,
    rules: Arc<Rules>,
}

impl CandidateFilter {
    /// Create a filter.
    pub fn new(config: CandidateFilterConfig, rules: Arc<Rules>) -> Self {
        Self { config, rules }
    }

    /// Candidate blocks in input order.
    pub fn filter(&self, blocks: &[TextBlock]) -> Vec<TextBlock> {
        blocks
            .iter()
            .filter(|b| self.is_candidate(b))
            .cloned()
            .collect()
    }

    /// Whether a block passes the filter.
    pub fn is_candidate(&self, block: &TextBlock) -> bool {
        let text = block.trimmed();
        let length = text::char_len(text);
        if length < self.config.min_length || length > self.config.max_length {
            return false;
        }
        if text.matches('\n').count() > self.config.max_newlines {
            return false;
        }
        let lower = text.to_lowercase();
        if CAPTION_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            return false;
        }
        !(text::is_digits(text) || self.rules.page_label.is_match(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;

    fn filter() -> CandidateFilter {
        CandidateFilter::new(CandidateFilterConfig::default(), Arc::new(Rules::new().unwrap()))
    }

    fn block(id: usize, text: &str) -> TextBlock {
        TextBlock::new(id, text, 1, BoundingBox::new(72.0, 100.0, 200.0, 14.0), 12.0)
    }

    #[test]
    fn test_filter_keeps_ids() {
        let blocks = vec![
            block(0, "Introduction"),
            block(1, "12"),
            block(2, "Figure 3: Throughput"),
            block(3, "Page 4"),
            block(4, "x"),
            block(5, "1.2 Methods"),
            block(6, "one\ntwo\nthree\nfour"),
            block(7, &"long ".repeat(60)),
        ];
        let ids: Vec<usize> = filter().filter(&blocks).iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![0, 5]);
    }

    #[test]
    fn test_caption_prefix_is_case_insensitive() {
        assert!(!filter().is_candidate(&block(0, "TABLE 2 Results")));
        assert!(filter().is_candidate(&block(0, "Tables and Charts")));
    }
}
