//! Page layout analysis: columns, margins, running headers and sidebars.

use super::stats::most_common;
use crate::model::{
    LayoutInfo, LayoutType, Margins, Orientation, PageInfo, SourceDocument, TextBlock,
};

/// Number of leading pages sampled for layout statistics.
const SAMPLE_PAGES: usize = 5;

/// Analyzes document layout from block positions.
#[derive(Debug, Clone)]
pub struct LayoutAnalyzer {
    /// Left edges closer than this belong to the same column
    column_threshold: f32,
    /// Share of page height treated as header/footer band
    band_ratio: f32,
    /// Share of page width treated as sidebar area
    sidebar_ratio: f32,
    /// Narrow blocks needed on one side to report a sidebar
    sidebar_min_blocks: usize,
}

impl Default for LayoutAnalyzer {
    fn default() -> Self {
        Self {
            column_threshold: 50.0,
            band_ratio: 0.1,
            sidebar_ratio: 0.25,
            sidebar_min_blocks: 3,
        }
    }
}

impl LayoutAnalyzer {
    /// Create a new layout analyzer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze a document.
    pub fn analyze(&self, doc: &SourceDocument) -> LayoutInfo {
        let sampled: Vec<(PageInfo, Vec<&TextBlock>)> = doc
            .page_numbers()
            .into_iter()
            .take(SAMPLE_PAGES)
            .map(|n| (doc.page(n), doc.blocks_on_page(n).collect()))
            .collect();

        let columns = self.detect_columns(&sampled);
        let has_sidebars = self.detect_sidebars(&sampled);
        let layout_type = if columns > 1 {
            LayoutType::MultiColumn
        } else if has_sidebars {
            LayoutType::Sidebar
        } else {
            LayoutType::SingleColumn
        };

        LayoutInfo {
            columns,
            margins: self.analyze_margins(&sampled),
            orientation: self.detect_orientation(doc),
            has_headers: self.detect_headers(&sampled),
            has_footers: self.detect_footers(&sampled),
            has_sidebars,
            layout_type,
        }
    }

    fn detect_columns(&self, sampled: &[(PageInfo, Vec<&TextBlock>)]) -> usize {
        let counts = sampled
            .iter()
            .filter(|(_, blocks)| blocks.len() >= 3)
            .map(|(_, blocks)| {
                let xs: Vec<f32> = blocks.iter().map(|b| b.bbox.x).collect();
                self.cluster_coordinates(xs).len()
            });
        most_common(counts).map_or(1, |(count, _)| count.max(1))
    }

    /// Group sorted coordinates into clusters, keeping clusters with more
    /// than two members.
    fn cluster_coordinates(&self, mut coords: Vec<f32>) -> Vec<Vec<f32>> {
        coords.sort_by(f32::total_cmp);
        let mut clusters: Vec<Vec<f32>> = Vec::new();
        for coord in coords {
            let home = clusters.iter_mut().find(|cluster| {
                cluster
                    .last()
                    .is_some_and(|last| (coord - last).abs() < self.column_threshold)
            });
            match home {
                Some(cluster) => cluster.push(coord),
                None => clusters.push(vec![coord]),
            }
        }
        clusters.retain(|c| c.len() > 2);
        clusters
    }

    fn analyze_margins(&self, sampled: &[(PageInfo, Vec<&TextBlock>)]) -> Margins {
        let mut sums = Margins::default();
        let mut pages = 0usize;

        for (page, blocks) in sampled {
            if blocks.is_empty() {
                continue;
            }
            let min_x = blocks.iter().map(|b| b.bbox.x).fold(f32::INFINITY, f32::min);
            let min_y = blocks.iter().map(|b| b.bbox.y).fold(f32::INFINITY, f32::min);
            let max_x = blocks.iter().map(|b| b.bbox.right()).fold(f32::NEG_INFINITY, f32::max);
            let max_y = blocks.iter().map(|b| b.bbox.bottom()).fold(f32::NEG_INFINITY, f32::max);

            sums.left += min_x;
            sums.top += min_y;
            sums.right += page.width - max_x;
            sums.bottom += page.height - max_y;
            pages += 1;
        }

        if pages == 0 {
            return Margins::default();
        }
        let n = pages as f32;
        Margins {
            top: sums.top / n,
            bottom: sums.bottom / n,
            left: sums.left / n,
            right: sums.right / n,
        }
    }

    fn detect_orientation(&self, doc: &SourceDocument) -> Orientation {
        let orientations = doc.page_numbers().into_iter().map(|n| {
            if doc.page(n).is_landscape() {
                Orientation::Landscape
            } else {
                Orientation::Portrait
            }
        });
        most_common(orientations).map_or(Orientation::Portrait, |(o, _)| o)
    }

    fn detect_headers(&self, sampled: &[(PageInfo, Vec<&TextBlock>)]) -> bool {
        let texts: Vec<&str> = sampled
            .iter()
            .flat_map(|(page, blocks)| {
                let limit = page.height * self.band_ratio;
                blocks.iter().filter(move |b| b.bbox.y < limit).map(|b| b.trimmed())
            })
            .collect();
        texts.len() > 2 && most_common(texts).is_some_and(|(_, count)| count > 1)
    }

    fn detect_footers(&self, sampled: &[(PageInfo, Vec<&TextBlock>)]) -> bool {
        let footers: Vec<&TextBlock> = sampled
            .iter()
            .flat_map(|(page, blocks)| {
                let limit = page.height * (1.0 - self.band_ratio);
                blocks.iter().filter(move |b| b.bbox.y > limit).copied()
            })
            .collect();

        if footers
            .iter()
            .any(|b| b.text.contains(&b.page.to_string()))
        {
            return true;
        }

        footers.len() > 2
            && most_common(footers.iter().map(|b| b.trimmed())).is_some_and(|(_, count)| count > 1)
    }

    fn detect_sidebars(&self, sampled: &[(PageInfo, Vec<&TextBlock>)]) -> bool {
        sampled.iter().any(|(page, blocks)| {
            let margin = page.width * self.sidebar_ratio;
            let mut left = 0;
            let mut right = 0;
            for block in blocks.iter().filter(|b| b.bbox.width < margin) {
                if block.bbox.x < margin {
                    left += 1;
                } else if block.bbox.right() > page.width - margin {
                    right += 1;
                }
            }
            left > self.sidebar_min_blocks || right > self.sidebar_min_blocks
        })
    }
}
