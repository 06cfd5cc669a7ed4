//! Compiled pattern and keyword tables.
//!
//! Every regular expression used by the profiler, the strategies and the
//! classifiers is compiled once into a [`Rules`] value, which is then shared
//! read-only (usually behind an `Arc`).

use regex::Regex;

use crate::error::Result;
use crate::model::{DocumentType, HeadingLevel};

fn compile(patterns: &[&str]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).map_err(Into::into))
        .collect()
}

fn any_match(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|p| p.is_match(text))
}

/// Keyword and pattern evidence for one document type.
#[derive(Debug)]
pub struct DocTypeRule {
    pub doc_type: DocumentType,
    /// Lowercase substrings, each counted once
    pub keywords: &'static [&'static str],
    pub patterns: Vec<Regex>,
}

/// Families of heading-shaped text patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternFamily {
    Numbered,
    Lettered,
    Named,
    Academic,
    Business,
}

impl PatternFamily {
    /// Confidence contributed by a match.
    pub fn weight(self) -> f64 {
        match self {
            PatternFamily::Numbered => 0.8,
            PatternFamily::Lettered => 0.7,
            PatternFamily::Named => 0.9,
            PatternFamily::Academic => 0.85,
            PatternFamily::Business => 0.8,
        }
    }

    /// Document type a domain family is tied to; `None` for families that
    /// apply to every document.
    pub fn doc_type(self) -> Option<DocumentType> {
        match self {
            PatternFamily::Academic => Some(DocumentType::Academic),
            PatternFamily::Business => Some(DocumentType::Business),
            _ => None,
        }
    }
}

/// Patterns for one heading family.
#[derive(Debug)]
pub struct FamilyRule {
    pub family: PatternFamily,
    pub patterns: Vec<Regex>,
}

/// Tables used by the universal strategy.
#[derive(Debug)]
pub struct UniversalRules {
    pub heading: Vec<Regex>,
    pub exclusion: Vec<Regex>,
    /// Articles, auxiliary verbs and connectors typical of body text
    pub content_words: &'static [&'static str],
    pub bare_number_marker: Regex,
    pub marker_header: Regex,
    pub colon_header: Regex,
    pub list_line: Regex,
    pub measurement: Regex,
}

/// Tables used by the enhanced font strategy.
#[derive(Debug)]
pub struct EnhancedFontRules {
    pub noise: Vec<Regex>,
    pub quality_heading: Vec<Regex>,
    pub ocr_errors: Vec<Regex>,
    pub long_number: Regex,
    pub menu_label: Regex,
    pub long_numbered_step: Regex,
    pub numbered_section: Regex,
    pub lettered_section: Regex,
    pub roman_section: Regex,
    pub body_words: &'static [&'static str],
}

/// Tables used by the table of contents detector.
#[derive(Debug)]
pub struct TocRules {
    /// Entry shapes tried in order: dotted leader, trailing page, numbered
    pub entries: Vec<Regex>,
    pub header: Regex,
}

/// All compiled tables.
#[derive(Debug)]
pub struct Rules {
    pub doc_types: Vec<DocTypeRule>,
    pub toc_indicators: Vec<Regex>,
    pub families: Vec<FamilyRule>,
    /// Level patterns for the hierarchy classifier, coarsest first
    pub hierarchy: Vec<(HeadingLevel, Vec<Regex>)>,
    pub universal: UniversalRules,
    pub enhanced: EnhancedFontRules,
    pub toc: TocRules,
    /// `1 `, `1. ` prefixes
    pub numbered: Regex,
    /// `Chapter 3` prefixes
    pub chapter: Regex,
    /// `Page 4` page labels
    pub page_label: Regex,
}

/// Major section names used for level inference.
pub const MAJOR_SECTIONS: &[&str] = &[
    "abstract",
    "introduction",
    "methodology",
    "results",
    "discussion",
    "conclusion",
    "references",
];

/// Caption prefixes dropped by the candidate filter.
pub const CAPTION_PREFIXES: &[&str] = &["figure ", "table ", "fig.", "tab."];

impl Rules {
    /// Compile every table.
    pub fn new() -> Result<Self> {
        Ok(Self {
            doc_types: vec![
                DocTypeRule {
                    doc_type: DocumentType::Academic,
                    keywords: &[
                        "abstract",
                        "introduction",
                        "methodology",
                        "results",
                        "discussion",
                        "conclusion",
                        "references",
                        "bibliography",
                    ],
                    patterns: compile(&[r"(?i)doi:\s*\S+", r"(?i)ISSN\s*\d{4}-\d{4}", r"(?i)Vol\.\s*\d+"])?,
                },
                DocTypeRule {
                    doc_type: DocumentType::Business,
                    keywords: &[
                        "executive summary",
                        "financial",
                        "revenue",
                        "profit",
                        "growth",
                        "strategy",
                        "market",
                        "quarterly",
                        "annual report",
                    ],
                    patterns: compile(&[r"(?i)Q[1-4]\s+20\d{2}", r"\$[\d,]+(?:\.\d{2})?[MBKmbk]?"])?,
                },
                DocTypeRule {
                    doc_type: DocumentType::Technical,
                    keywords: &[
                        "specification",
                        "requirements",
                        "implementation",
                        "architecture",
                        "design",
                        "api",
                        "documentation",
                    ],
                    patterns: compile(&[r"(?i)v\d+\.\d+", r"(?i)RFC\s*\d+"])?,
                },
                DocTypeRule {
                    doc_type: DocumentType::Book,
                    keywords: &[
                        "chapter", "contents", "preface", "epilogue", "appendix", "glossary",
                        "index",
                    ],
                    patterns: compile(&[r"(?i)Chapter\s+\d+", r"(?i)ISBN[-\s]*[\d-]+"])?,
                },
                DocTypeRule {
                    doc_type: DocumentType::Form,
                    keywords: &[
                        "name:",
                        "date:",
                        "signature:",
                        "address:",
                        "phone:",
                        "email:",
                        "field",
                    ],
                    patterns: compile(&[r"_{3,}", r"\[\s*\]", r"\(\s*\)"])?,
                },
            ],
            toc_indicators: compile(&[
                r"(?im)table\s+of\s+contents",
                r"(?im)^\s*contents\s*$",
                r"(?im)^\s*\d+\.\s+.+\s+\d+\s*$",
                r"(?im)chapter\s+\d+.*page\s+\d+",
                r"(?im)\.{3,}\s*\d+\s*$",
            ])?,
            families: vec![
                FamilyRule {
                    family: PatternFamily::Numbered,
                    patterns: compile(&[r"^\d+\.?\s+", r"^\d+\.\d+\.?\s+", r"^\d+\.\d+\.\d+\.?\s+"])?,
                },
                FamilyRule {
                    family: PatternFamily::Lettered,
                    patterns: compile(&[r"^[A-Z]\.?\s+", r"^\([a-z]\)", r"^[IVX]+\.?\s+"])?,
                },
                FamilyRule {
                    family: PatternFamily::Named,
                    patterns: compile(&[r"(?i)^(Chapter|Section)\s+\d+", r"(?i)^(Part|Unit)\s+[IVX]+"])?,
                },
                FamilyRule {
                    family: PatternFamily::Academic,
                    patterns: compile(&[
                        r"(?i)^(Abstract|Introduction|Methodology|Methods|Results|Discussion|Conclusion|References)$",
                        r"(?i)^\d+\s+(Introduction|Background|Related Work)",
                    ])?,
                },
                FamilyRule {
                    family: PatternFamily::Business,
                    patterns: compile(&[
                        r"(?i)^(Executive Summary|Overview|Financial Results)",
                        r"(?i)^Q\d\s+\d{4}",
                    ])?,
                },
            ],
            hierarchy: vec![
                (
                    HeadingLevel::H1,
                    compile(&[r"^\d+\.?\s+", r"(?i)^Chapter\s+\d+", r"(?i)^Part\s+[IVX]+"])?,
                ),
                (
                    HeadingLevel::H2,
                    compile(&[r"^\d+\.\d+\.?\s+", r"(?i)^Section\s+\d+"])?,
                ),
                (
                    HeadingLevel::H3,
                    compile(&[r"^\d+\.\d+\.\d+\.?\s+", r"^\([a-z]\)"])?,
                ),
            ],
            universal: UniversalRules {
                heading: compile(&[
                    r"(?i)^\d+\.?\s+[A-Z][a-zA-Z\s]+$",
                    r"(?i)^Chapter\s+\d+",
                    r"(?i)^Section\s+\d+",
                    r"(?i)^Part\s+\d+",
                    r"(?i)^[IVX]+\.?\s+[A-Z][a-zA-Z\s]+$",
                    r"(?i)^[A-Z]\.?\s+[A-Z][a-zA-Z\s]+$",
                    r"(?i)^[A-Z][a-zA-Z\s]{2,30}$",
                    r"(?i)^(Introduction|Overview|Background|Methodology|Results|Discussion|Conclusion|Summary|References|Appendix)$",
                    r"(?i)^(Getting\s+There|Where\s+to\s+Stay|What\s+to\s+Do|Things\s+to\s+See|Activities|Attractions|Dining|Transportation|Tips|History|Culture)",
                ])?,
                exclusion: compile(&[r"^[•\u{f0b7}]", r"^-\s", r"^\d+\)\s", r"[.!?]\s*$"])?,
                content_words: &[
                    "the", "a", "an", "this", "that", "these", "those", "is", "are", "was", "were",
                    "has", "have", "will", "can", "should", "and", "or", "but", "however",
                    "therefore", "because",
                ],
                bare_number_marker: Regex::new(r"^\d+\.\s*$")?,
                marker_header: Regex::new(
                    r"([A-Z][a-zA-Z\s&'-]+?)\s*[\u{f0b7}•*\-]?\s*(Ingredients|Instructions|Overview|Summary|Description|Details|Steps|Process|Method|Procedure):",
                )?,
                colon_header: Regex::new(r"^([A-Z][a-zA-Z\s&'-]{2,30}):\s*$")?,
                list_line: Regex::new(r"^(o\s|•\s|\d+\.\s|\d+\)\s|[a-z]\.\s)")?,
                measurement: Regex::new(r"^\d+\s+(cups?|tbsp|tsp|lbs?|oz|grams?|ml|liters?)")?,
            },
            enhanced: EnhancedFontRules {
                noise: compile(&[
                    r"^[©®™]\s*\w*$",
                    r"^\s*[x×]\s*$",
                    r"^[<>]\s*\w*$",
                    r"^\s*\d{1,2}\s*$",
                    r"^[^\w\s]*$",
                    r"^\s*[A-Z]{1,2}\d+\s*$",
                    r"^[A-Z]{1,2}\s+[A-Z]{1,2}[^a-z]*$",
                    r",{2,}",
                    r"\.{3,}",
                    r"^[^\w\s]*[A-Z]{1,3}[^\w\s]*$",
                    r"^.{1,3}$",
                    r"^[A-Z]\s[a-z]\s*$",
                    r"\bPOF\b",
                    r"\bOﬃce\b",
                    r"^[A-Z]{1,2}[^a-zA-Z\s]+",
                    r"^CG\s+\w+",
                    r"^[A-Z]{2}\s+[A-Z]",
                    r"(?i)^(Help|Cancel|Close|OK|Next|Back|Continue|Submit)$",
                    r"(?i)^(All\s+tools?|Tools?|Menu|Settings?)\b",
                    r"^(Export|Import|Create|Delete|Edit)\s+[a-z]",
                    r"(?i)^(Share|Send|Upload|Download)\s*$",
                    r"(?i)^(Home|Search|Profile|Account)\s*$",
                    r"\s[+=×÷]\s",
                    r"(?i)^(Good\s+morning|Hello|Welcome)",
                    r"^\([^)]*\)\s*$",
                    r"^[\d\s\-|]+$",
                    r"(?i)^(Note|Tip|Warning)\b",
                    r"(?i)^notes?(\s+\w+)*$",
                    r"(?i)^Step\s+\d+:?$",
                    r"(?i)^(Figure\s+\d+|Table\s+\d+)",
                ])?,
                quality_heading: compile(&[
                    r"^[A-Z][a-z]+(\s+[A-Z][a-z]*)*\s*$",
                    r"^[A-Z][A-Z\s]+[A-Z]$",
                    r"^\d+\.?\s+[A-Z][a-z]",
                    r"^[A-Z][a-z]+.*:$",
                    r"^(Chapter|Section|Part|Unit)\s+\d+",
                    r"^(Overview|Introduction|Conclusion|Summary)$",
                ])?,
                ocr_errors: compile(&[
                    r"\bPOF\b",
                    r"\bOﬃce\b",
                    r"\b[A-Z]\s[a-z]\b",
                    r"[A-Z]{3,}[a-z]{1,2}[A-Z]",
                ])?,
                long_number: Regex::new(r"\d{3,}")?,
                menu_label: Regex::new(r"^[A-Z][a-z]*\s+(a|an|the)\s+[A-Z]")?,
                long_numbered_step: Regex::new(r"^\d+\.\s+.{30,}")?,
                numbered_section: Regex::new(r"^\d+\.?\s+[A-Z]")?,
                lettered_section: Regex::new(r"^[A-Z]\.?\s+[A-Z]")?,
                roman_section: Regex::new(r"^[IVX]+\.?\s+[A-Z]")?,
                body_words: &[
                    "the", "and", "or", "but", "with", "from", "into", "onto", "until", "when",
                    "where", "while", "during", "before", "after", "through", "is", "are", "was",
                    "were", "will", "would", "could", "should", "this", "that", "these", "those",
                    "you", "your", "they", "their",
                ],
            },
            toc: TocRules {
                entries: compile(&[
                    r"^(.+?)\s*\.{3,}\s*(\d+)\s*$",
                    r"^(.+?)\s+(\d+)\s*$",
                    r"^(\d+\.?\d*)\s+(.+?)\s+(\d+)$",
                ])?,
                header: Regex::new(r"(?i)^(table\s+of\s+contents|contents|index)$")?,
            },
            numbered: Regex::new(r"^\d+\.?\s+")?,
            chapter: Regex::new(r"(?i)^Chapter\s+\d+")?,
            page_label: Regex::new(r"(?i)^page\s+\d+")?,
        })
    }

    /// Families whose patterns match `text`, restricted to the general
    /// families plus the family tied to `doc_type`.
    pub fn matching_families(&self, text: &str, doc_type: DocumentType) -> Vec<PatternFamily> {
        self.families
            .iter()
            .filter(|rule| rule.family.doc_type().map_or(true, |t| t == doc_type))
            .filter(|rule| any_match(&rule.patterns, text))
            .map(|rule| rule.family)
            .collect()
    }

    /// First hierarchy level whose patterns match `text`.
    pub fn pattern_level(&self, text: &str) -> Option<HeadingLevel> {
        self.hierarchy
            .iter()
            .find(|(_, patterns)| any_match(patterns, text))
            .map(|(level, _)| *level)
    }

    /// Whether text opens with a heading-style number or chapter label.
    pub fn is_numbered_or_chapter(&self, text: &str) -> bool {
        self.numbered.is_match(text) || self.chapter.is_match(text)
    }
}

/// Any pattern in the list matches.
pub fn matches_any(patterns: &[Regex], text: &str) -> bool {
    any_match(patterns, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Rules {
        Rules::new().unwrap()
    }

    #[test]
    fn test_rules_compile() {
        let rules = rules();
        assert_eq!(rules.doc_types.len(), 5);
        assert_eq!(rules.families.len(), 5);
        assert_eq!(rules.toc.entries.len(), 3);
    }

    #[test]
    fn test_matching_families() {
        let rules = rules();
        let matched = rules.matching_families("1.2 Methodology", DocumentType::General);
        assert_eq!(matched, vec![PatternFamily::Numbered]);

        let matched = rules.matching_families("Introduction", DocumentType::Academic);
        assert_eq!(matched, vec![PatternFamily::Academic]);

        let matched = rules.matching_families("Introduction", DocumentType::Business);
        assert!(matched.is_empty());

        let matched = rules.matching_families("Chapter 4 Results", DocumentType::General);
        assert!(matched.contains(&PatternFamily::Named));
    }

    #[test]
    fn test_pattern_level() {
        let rules = rules();
        assert_eq!(rules.pattern_level("1. Overview"), Some(HeadingLevel::H1));
        assert_eq!(rules.pattern_level("2.3 Data"), Some(HeadingLevel::H2));
        assert_eq!(rules.pattern_level("2.3.1 Sampling"), Some(HeadingLevel::H3));
        assert_eq!(rules.pattern_level("(b) Limits"), Some(HeadingLevel::H3));
        assert_eq!(rules.pattern_level("Overview"), None);
    }

    #[test]
    fn test_toc_header_is_whole_text() {
        let rules = rules();
        assert!(rules.toc.header.is_match("Table of Contents"));
        assert!(rules.toc.header.is_match("CONTENTS"));
        assert!(!rules.toc.header.is_match("The contents of this report"));
    }

    #[test]
    fn test_numbered_or_chapter() {
        let rules = rules();
        assert!(rules.is_numbered_or_chapter("3 Results"));
        assert!(rules.is_numbered_or_chapter("chapter 7"));
        assert!(!rules.is_numbered_or_chapter("Results for 2024"));
    }
}
