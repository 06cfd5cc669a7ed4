//! Frequency helpers shared by the profiler and strategies.

use std::collections::HashMap;

use crate::model::{TextBlock, DEFAULT_BODY_FONT_SIZE};

/// Most frequent item; ties go to the item seen first.
pub fn most_common<T, I>(items: I) -> Option<(T, usize)>
where
    T: Eq + std::hash::Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut counts: HashMap<T, (usize, usize)> = HashMap::new();
    for (order, item) in items.into_iter().enumerate() {
        counts.entry(item).or_insert((0, order)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (ca, oa)), (_, (cb, ob))| ca.cmp(cb).then_with(|| ob.cmp(oa)))
        .map(|(item, (count, _))| (item, count))
}

/// Font size statistics for a set of blocks.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    /// Body text font size (most common)
    pub body_size: f32,
    /// Distinct sizes, largest first
    pub sizes: Vec<f32>,
    /// Mean of all observed sizes
    pub mean_size: f32,
    /// Observed sizes keyed at 0.1pt precision, in first-seen order
    histogram: Vec<(i32, usize)>,
    total: usize,
    sum: f64,
}

impl FontStatistics {
    /// Collect statistics from blocks with a positive font size.
    pub fn from_blocks<'a, I>(blocks: I) -> Self
    where
        I: IntoIterator<Item = &'a TextBlock>,
    {
        let mut stats = Self::default();
        for block in blocks {
            if block.font_size > 0.0 {
                stats.add_size(block.font_size);
            }
        }
        stats.analyze();
        stats
    }

    /// Add a font size observation.
    pub fn add_size(&mut self, size: f32) {
        let key = (size * 10.0).round() as i32;
        match self.histogram.iter_mut().find(|(k, _)| *k == key) {
            Some((_, count)) => *count += 1,
            None => self.histogram.push((key, 1)),
        }
        self.total += 1;
        self.sum += size as f64;
    }

    /// Calculate body size, distinct sizes and mean.
    pub fn analyze(&mut self) {
        if self.histogram.is_empty() {
            self.body_size = DEFAULT_BODY_FONT_SIZE;
            self.mean_size = DEFAULT_BODY_FONT_SIZE;
            self.sizes.clear();
            return;
        }

        let mut best = self.histogram[0];
        for entry in &self.histogram[1..] {
            if entry.1 > best.1 {
                best = *entry;
            }
        }
        self.body_size = best.0 as f32 / 10.0;

        let mut sizes: Vec<f32> = self.histogram.iter().map(|(k, _)| *k as f32 / 10.0).collect();
        sizes.sort_by(|a, b| b.total_cmp(a));
        self.sizes = sizes;
        self.mean_size = (self.sum / self.total as f64) as f32;
    }

    /// Number of observations.
    pub fn count(&self) -> usize {
        self.total
    }

    /// Whether no sizes were observed.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of distinct sizes strictly larger than `size`.
    pub fn rank_of(&self, size: f32) -> usize {
        let key = (size * 10.0).round() as i32;
        self.sizes
            .iter()
            .filter(|s| (**s * 10.0).round() as i32 > key)
            .count()
    }
}
