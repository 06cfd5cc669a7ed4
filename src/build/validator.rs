//! Repairs for invalid heading level sequences.

use crate::model::HeadingLevel;

/// Problems found in a sequence of heading levels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyIssues {
    /// The first heading is not H1
    pub missing_h1: bool,
    /// Indices whose level is more than one below their predecessor
    pub level_jumps: Vec<usize>,
    /// Indices of H3 headings with no H2 since the last H1
    pub orphaned: Vec<usize>,
}

impl HierarchyIssues {
    /// Whether anything needs repair.
    pub fn has_issues(&self) -> bool {
        self.missing_h1 || !self.level_jumps.is_empty() || !self.orphaned.is_empty()
    }
}

/// Best-effort repair of heading levels in document order.
#[derive(Debug, Clone, Copy, Default)]
pub struct HierarchyValidator;

impl HierarchyValidator {
    /// Create a validator.
    pub fn new() -> Self {
        Self
    }

    /// Find hierarchy problems.
    pub fn detect_issues(&self, levels: &[HeadingLevel]) -> HierarchyIssues {
        let mut issues = HierarchyIssues {
            missing_h1: levels.first().is_some_and(|l| *l != HeadingLevel::H1),
            ..Default::default()
        };

        for (i, pair) in levels.windows(2).enumerate() {
            if pair[1].number() > pair[0].number() + 1 {
                issues.level_jumps.push(i + 1);
            }
        }

        let mut has_h2 = false;
        for (i, level) in levels.iter().enumerate() {
            match level {
                HeadingLevel::H1 => has_h2 = false,
                HeadingLevel::H2 => has_h2 = true,
                HeadingLevel::H3 if !has_h2 => issues.orphaned.push(i),
                _ => {}
            }
        }
        issues
    }

    /// Repair `levels` in place and return the issues found before repair.
    ///
    /// The first heading becomes H1, each heading is clamped to one level
    /// below its predecessor, and remaining orphaned H3s become H2.
    pub fn validate(&self, levels: &mut [HeadingLevel]) -> HierarchyIssues {
        let issues = self.detect_issues(levels);
        if !issues.has_issues() {
            return issues;
        }

        if issues.missing_h1 {
            levels[0] = HeadingLevel::H1;
            log::info!("Promoted first heading to H1");
        }
        for i in 1..levels.len() {
            let limit = levels[i - 1].deeper();
            if levels[i] > limit {
                log::info!("Fixed level jump at index {}: {} -> {}", i, levels[i], limit);
                levels[i] = limit;
            }
        }
        for i in self.detect_issues(levels).orphaned {
            levels[i] = HeadingLevel::H2;
            log::info!("Fixed orphaned H3 at index {}", i);
        }

        let remaining = self.detect_issues(levels);
        if remaining.has_issues() {
            log::warn!("Some hierarchy issues remain after fixing: {:?}", remaining);
        }
        issues
    }
}
