//! # trialscope
//!
//! Entity aggregation and span resolution for clinical-trial text.
//!
//! Taggers (external NER models, or the built-in [`PatternTagger`]) produce
//! raw, possibly overlapping mention spans per document. This crate turns
//! those into:
//!
//! - a deduplicated, normalized **mention table** ([`Aggregator`]),
//! - a conflict-free, renderable **segment sequence** per document
//!   ([`resolve_spans`]), whose concatenation reconstructs the text exactly,
//! - bipartite **co-occurrence counts** between two entity groups restricted
//!   to their most trial-frequent members ([`build_cooccurrence`]),
//! - a per-trial **entity summary table** ([`per_trial_table`]).
//!
//! ## Quick Start
//!
//! ```rust
//! use trialscope::{Aggregator, Document, PatternTaggerProvider, TaggerProvider};
//!
//! let docs = vec![Document::new(
//!     "NCT00000001",
//!     "Patients with breast cancer received trastuzumab.",
//! )];
//! let providers: Vec<Box<dyn TaggerProvider>> = vec![Box::new(PatternTaggerProvider)];
//!
//! let table = Aggregator::new().run(&docs, &providers).unwrap();
//! assert!(table.iter().any(|m| m.normalized == "breast cancer"));
//! ```
//!
//! ## Design
//!
//! - **No hidden state**: every component is a pure function over explicit
//!   record types; the mention table is produced wholesale per run and only
//!   ever replaced, never merged.
//! - **Trait-based tagger seam**: real models plug in behind [`Tagger`] /
//!   [`TaggerProvider`]; the aggregator holds one tagger's resources at a
//!   time and drops them before loading the next.
//! - **Deterministic policies**: overlap resolution, top-K ranking, and all
//!   table orderings use documented tie-breaks so the same input always
//!   renders the same way.

#![warn(missing_docs)]

pub mod aggregate;
pub mod annotate;
mod error;
pub mod explore;
mod label;
mod mention;
mod normalize;
pub mod offset;
pub mod taggers;

pub use aggregate::{Aggregator, CancelToken};
pub use annotate::{
    annotate_html, colors_for_group, resolve_spans, GroupColors, Segment, MAX_ANNOTATED_SPANS,
};
pub use error::{Error, Result};
pub use explore::{build_cooccurrence, per_trial_table, CooccurrenceCell, TrialTableRow};
pub use label::EntityGroup;
pub use mention::{content_fingerprint, Document, Mention, MentionTable};
pub use normalize::normalize;
pub use taggers::pattern::{PatternTagger, PatternTaggerProvider};

/// A raw mention span as produced by a tagger, before normalization.
///
/// Offsets are half-open character offsets into the tagged text:
/// `0 <= start < end <= text.chars().count()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSpan {
    /// Exact substring the tagger matched.
    pub text: String,
    /// The tagger's own label vocabulary, unmapped (e.g. `CHEMICAL`).
    pub label: String,
    /// Start character offset (inclusive).
    pub start: usize,
    /// End character offset (exclusive).
    pub end: usize,
}

/// Trait for entity taggers.
///
/// A tagger is treated as a black box that yields raw labeled spans for a
/// document text. Implementations must be cheap to drop: the aggregator
/// releases one tagger before loading the next to bound peak memory.
pub trait Tagger: Send + Sync {
    /// Produce raw mention spans for the given text.
    fn tag(&self, text: &str) -> Result<Vec<RawSpan>>;

    /// Short identifier used for provenance (`"<name>:<raw label>"`).
    fn name(&self) -> &str;

    /// Whether this tagger actually performs entity recognition.
    ///
    /// A tagger that loads but reports `false` here fails the whole
    /// aggregation run, mirroring a model pipeline missing its NER component.
    fn supports_ner(&self) -> bool {
        true
    }
}

/// Scoped acquisition of a tagger's runtime resources.
///
/// The aggregator calls [`TaggerProvider::load`] for one provider at a time
/// and drops the returned tagger before loading the next, so at most one
/// tagger's resources are alive at once. Release happens on all exit paths,
/// including failure, via `Drop`.
pub trait TaggerProvider: Send + Sync {
    /// Provider name, used in error messages before a tagger exists.
    fn name(&self) -> &str;

    /// Load the tagger. Initialization failure is fatal for the run.
    fn load(&self) -> Result<Box<dyn Tagger>>;
}

/// A mock tagger for tests: returns a fixed span list for any text.
#[derive(Debug, Clone, Default)]
pub struct MockTagger {
    name: String,
    spans: Vec<RawSpan>,
    supports_ner: bool,
}

impl MockTagger {
    /// Create a mock tagger with the given provenance name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spans: Vec::new(),
            supports_ner: true,
        }
    }

    /// Set the spans to return on every `tag` call.
    #[must_use]
    pub fn with_spans(mut self, spans: Vec<RawSpan>) -> Self {
        self.spans = spans;
        self
    }

    /// Mark this mock as lacking entity-recognition capability.
    #[must_use]
    pub fn without_ner(mut self) -> Self {
        self.supports_ner = false;
        self
    }
}

impl Tagger for MockTagger {
    fn tag(&self, _text: &str) -> Result<Vec<RawSpan>> {
        Ok(self.spans.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn supports_ner(&self) -> bool {
        self.supports_ner
    }
}

impl TaggerProvider for MockTagger {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<Box<dyn Tagger>> {
        Ok(Box::new(self.clone()))
    }
}
