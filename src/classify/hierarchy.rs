//! Second-opinion heading levels from numbering, size and position.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{HeadingLevel, TextBlock};
use crate::profile::most_common;
use crate::rules::Rules;

/// Level used when no method has an opinion.
const DEFAULT_LEVEL: HeadingLevel = HeadingLevel::H2;

/// Assigns heading levels by majority over three independent methods.
#[derive(Debug, Clone)]
pub struct HierarchyClassifier {
    rules: Arc<Rules>,
}

impl HierarchyClassifier {
    /// Create a hierarchy classifier.
    pub fn new(rules: Arc<Rules>) -> Self {
        Self { rules }
    }

    /// One level per heading block, in input order.
    ///
    /// Ties between methods go to pattern, then font, then position.
    pub fn classify(&self, headings: &[&TextBlock]) -> Vec<HeadingLevel> {
        let by_pattern = self.by_pattern(headings);
        let by_font = by_font(headings);
        let by_position = by_position(headings);

        (0..headings.len())
            .map(|i| {
                let votes = [by_pattern[i], by_font[i], by_position[i]];
                most_common(votes.into_iter().flatten())
                    .map(|(level, _)| level)
                    .unwrap_or(DEFAULT_LEVEL)
            })
            .collect()
    }

    fn by_pattern(&self, headings: &[&TextBlock]) -> Vec<Option<HeadingLevel>> {
        headings
            .iter()
            .map(|b| self.rules.pattern_level(b.trimmed()))
            .collect()
    }
}

/// Largest size is H1, the next H2, anything smaller H3, with one point of
/// tolerance. A single size makes everything H2.
fn by_font(headings: &[&TextBlock]) -> Vec<Option<HeadingLevel>> {
    let mut sizes: Vec<f32> = Vec::new();
    for block in headings.iter().filter(|b| b.font_size > 0.0) {
        let key = (block.font_size * 10.0).round();
        if !sizes.iter().any(|s| (s * 10.0).round() == key) {
            sizes.push(block.font_size);
        }
    }
    if sizes.is_empty() {
        return vec![None; headings.len()];
    }
    if sizes.len() == 1 {
        return vec![Some(HeadingLevel::H2); headings.len()];
    }

    sizes.sort_by(|a, b| b.total_cmp(a));
    let h1 = sizes[0] - 1.0;
    let h2 = sizes[1] - 1.0;
    headings
        .iter()
        .map(|b| {
            Some(if b.font_size > h1 {
                HeadingLevel::H1
            } else if b.font_size > h2 {
                HeadingLevel::H2
            } else {
                HeadingLevel::H3
            })
        })
        .collect()
}

/// The first heading on a page after the first opens a major section.
/// Otherwise the left edge decides.
fn by_position(headings: &[&TextBlock]) -> Vec<Option<HeadingLevel>> {
    let mut first_on_page: HashMap<u32, usize> = HashMap::new();
    for (i, block) in headings.iter().enumerate() {
        first_on_page.entry(block.page).or_insert(i);
    }

    headings
        .iter()
        .enumerate()
        .map(|(i, block)| {
            let level = if block.page > 1 && first_on_page.get(&block.page) == Some(&i) {
                HeadingLevel::H1
            } else if block.x() < 100.0 {
                HeadingLevel::H1
            } else if block.x() < 150.0 {
                HeadingLevel::H2
            } else {
                HeadingLevel::H3
            };
            Some(level)
        })
        .collect()
}
