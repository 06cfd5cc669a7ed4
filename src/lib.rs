//! # pdf_outline
//!
//! Heading and outline detection for PDF documents.
//!
//! This library takes positioned text blocks extracted from a PDF and
//! produces a hierarchical outline: a title plus H1–H4 headings with page
//! numbers. Several independent heading strategies vote on every candidate
//! block and an ensemble combines their verdicts.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf_outline::{extract_outline_from_file, JsonFormat};
//!
//! fn main() -> pdf_outline::Result<()> {
//!     // Read a block dump written by an external PDF extractor
//!     let outline = extract_outline_from_file("report.blocks.json")?;
//!
//!     println!("{}", outline.to_json(JsonFormat::Pretty)?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Normalization**: blocks are cleaned, ordered and merged ([`source`])
//! - **Profiling**: document type, layout, OCR and font statistics ([`profile`])
//! - **Detection**: six strategies score candidate blocks ([`detect`])
//! - **Voting**: weighted ensemble and level reclassification ([`classify`])
//! - **Building**: ordering, hierarchy repair and summary ([`build`])
//! - **Parallel processing**: uses Rayon across documents in a batch

pub mod build;
pub mod classify;
pub mod detect;
pub mod error;
pub mod model;
pub mod options;
pub mod profile;
pub mod rules;
pub mod source;
pub mod text;

// Re-export commonly used types
pub use build::{HierarchyValidator, OutlineBuilder};
pub use classify::{EnsembleVoter, HierarchyClassifier};
pub use detect::{HeadingDetector, HeadingStrategy, StrategyKind, TitleDetector, TocDetector};
pub use error::{Error, Result};
pub use model::{
    BoundingBox, DocumentProfile, HeadingLevel, HeadingPrediction, JsonFormat, Outline, OutlineEntry, PageInfo,
    SourceDocument, SourceMetadata, TextBlock, TitleInfo, TocInfo,
};
pub use options::{FontVariant, OutlineOptions, StrategyWeights};
pub use profile::DocumentProfiler;
pub use rules::Rules;
pub use source::{BlockSource, JsonBlockSource};

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;

/// Extract the outline of a document with default options.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::{extract_outline, JsonBlockSource};
///
/// let json = std::fs::read_to_string("report.blocks.json").unwrap();
/// let doc = JsonBlockSource::parse_str(&json).unwrap();
/// let outline = extract_outline(&doc).unwrap();
/// println!("{} headings", outline.len());
/// ```
pub fn extract_outline(doc: &SourceDocument) -> Result<Outline> {
    Ok(OutlineExtractor::new()?.extract(doc))
}

/// Extract the outline of a document with custom options.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::{extract_outline_with_options, OutlineOptions, SourceDocument};
///
/// let options = OutlineOptions::new()
///     .enhanced_font()
///     .with_model_dir("/opt/models");
/// let outline = extract_outline_with_options(&SourceDocument::default(), options).unwrap();
/// ```
pub fn extract_outline_with_options(doc: &SourceDocument, options: OutlineOptions) -> Result<Outline> {
    Ok(OutlineExtractor::with_options(options)?.extract(doc))
}

/// Extract the outline of a JSON block dump on disk.
///
/// Unreadable files produce an empty outline rather than an error.
pub fn extract_outline_from_file<P: AsRef<Path>>(path: P) -> Result<Outline> {
    Ok(OutlineExtractor::new()?.extract_path(path))
}

/// Runs the whole pipeline for one or many documents.
///
/// The extractor is built once and reused; models load lazily on the first
/// document that needs them.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::{OutlineExtractor, OutlineOptions};
///
/// let extractor = OutlineExtractor::with_options(OutlineOptions::new().sequential())?;
/// let outline = extractor.extract_path("report.blocks.json");
/// for entry in &outline.outline {
///     println!("{} {} (p. {})", entry.level, entry.text, entry.page);
/// }
/// # Ok::<(), pdf_outline::Error>(())
/// ```
pub struct OutlineExtractor {
    options: OutlineOptions,
    source: Box<dyn BlockSource>,
    profiler: DocumentProfiler,
    detector: HeadingDetector,
    voter: EnsembleVoter,
    title: Option<TitleDetector>,
    toc: Option<TocDetector>,
    builder: OutlineBuilder,
}

impl std::fmt::Debug for OutlineExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutlineExtractor")
            .field("options", &self.options)
            .field("source", &self.source.name())
            .field("detector", &self.detector)
            .finish()
    }
}

impl OutlineExtractor {
    /// Create an extractor with default options.
    pub fn new() -> Result<Self> {
        Self::with_options(OutlineOptions::default())
    }

    /// Create an extractor with custom options.
    pub fn with_options(options: OutlineOptions) -> Result<Self> {
        options.validate()?;
        let rules = Arc::new(Rules::new()?);

        let hierarchy = options
            .reclassify_levels
            .then(|| HierarchyClassifier::new(Arc::clone(&rules)));

        Ok(Self {
            source: Box::new(JsonBlockSource::new()),
            profiler: DocumentProfiler::new(Arc::clone(&rules)),
            detector: HeadingDetector::new(&options, Arc::clone(&rules)),
            voter: EnsembleVoter::new(options.weights, hierarchy),
            title: options.detect_title.then(TitleDetector::new),
            toc: options.detect_toc.then(|| TocDetector::new(Arc::clone(&rules))),
            builder: OutlineBuilder::new(),
            options,
        })
    }

    /// Read documents through a different block source.
    pub fn with_source(mut self, source: impl BlockSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    /// Options in effect.
    pub fn options(&self) -> &OutlineOptions {
        &self.options
    }

    /// Extract the outline of one document.
    pub fn extract(&self, doc: &SourceDocument) -> Outline {
        let doc = source::normalize_document(doc.clone(), &self.options.merge);
        if doc.blocks.is_empty() {
            log::debug!("Document has no text blocks");
        }

        let profile = self.profiler.profile(&doc);
        let detection = self.detector.detect(&doc.blocks, &profile);
        let verdicts = self.voter.vote(&detection);

        let title = self
            .title
            .as_ref()
            .and_then(|t| t.detect(&doc.blocks, &doc.metadata));
        let toc = self.toc.as_ref().and_then(|t| t.detect(&doc.blocks));

        let outline = self.builder.build(&doc.blocks, &verdicts, title.as_ref(), toc);
        log::debug!(
            "Built outline with {} headings from {} blocks",
            outline.len(),
            doc.blocks.len()
        );
        outline
    }

    /// Read a document through the block source and extract its outline.
    ///
    /// Source errors are logged and yield an empty outline.
    pub fn extract_path<P: AsRef<Path>>(&self, path: P) -> Outline {
        let path = path.as_ref();
        let doc = match self.source.extract(path) {
            Ok(doc) => doc,
            Err(e) => {
                log::error!("Failed to read {} with {} source: {}", path.display(), self.source.name(), e);
                SourceDocument::default()
            }
        };
        self.extract(&doc)
    }

    /// Extract outlines of many documents, in input order.
    pub fn extract_batch(&self, docs: &[SourceDocument]) -> Vec<Outline> {
        if self.options.parallel && docs.len() > 1 {
            docs.par_iter().map(|doc| self.extract(doc)).collect()
        } else {
            docs.iter().map(|doc| self.extract(doc)).collect()
        }
    }
}
