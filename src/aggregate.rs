//! Mention aggregation: taggers × documents → deduplicated mention table.
//!
//! Taggers are heavy; the aggregator therefore runs one tagger over the whole
//! batch, drops it, then loads the next. Peak memory is bounded by the largest
//! single tagger rather than the sum.

use crate::{Document, EntityGroup, Error, Mention, MentionTable, RawSpan, Result, TaggerProvider};
use crate::normalize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Minimum normalized-text length for a mention to be kept.
pub const MIN_NORMALIZED_CHARS: usize = 2;

/// Cooperative cancellation token for an aggregation run.
///
/// Checked between documents. A cancelled run returns [`Error::Cancelled`];
/// partial results are never surfaced.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs taggers over a document batch and builds the mention table.
///
/// Each run produces a fresh table; callers replace their previous table
/// wholesale. On any error the previous table must be reset to empty rather
/// than shown alongside partial results.
#[derive(Debug, Default)]
pub struct Aggregator {
    cancel: Option<CancelToken>,
}

impl Aggregator {
    /// Create an aggregator without cancellation support.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a cancellation token, checked between documents.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Run every provider's tagger over every document.
    ///
    /// Documents with an empty id or blank text are skipped. Mentions whose
    /// normalized text is shorter than [`MIN_NORMALIZED_CHARS`] are dropped.
    /// Duplicate detections (same document, offsets, group, and normalized
    /// text) collapse to one row; the first occurrence keeps its provenance.
    ///
    /// # Errors
    ///
    /// Fails the whole batch if a provider cannot load its tagger, if a
    /// loaded tagger reports no entity-recognition capability, if tagging a
    /// document fails, or if the run is cancelled. No partial table is
    /// returned in any of these cases.
    pub fn run(
        &self,
        documents: &[Document],
        providers: &[Box<dyn TaggerProvider>],
    ) -> Result<MentionTable> {
        let mut mentions: Vec<Mention> = Vec::new();

        for provider in providers {
            // Scoped lifetime: `tagger` is dropped at the end of this
            // iteration, before the next provider loads.
            let tagger = provider.load()?;
            if !tagger.supports_ner() {
                return Err(Error::missing_ner(provider.name()));
            }
            log::debug!("running tagger '{}' over {} documents", tagger.name(), documents.len());

            for doc in documents {
                self.check_cancelled()?;
                if doc.id.is_empty() || doc.text.trim().is_empty() {
                    log::warn!("skipping document with empty id or blank text");
                    continue;
                }
                let spans = tagger.tag(&doc.text)?;
                for span in spans {
                    if let Some(mention) = to_mention(doc, tagger.name(), span) {
                        mentions.push(mention);
                    }
                }
            }
        }

        Ok(dedupe(mentions))
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(Error::Cancelled),
            _ => Ok(()),
        }
    }
}

/// Convert one raw tagger span into a mention record, or drop it.
///
/// Drops spans whose surface is empty after trimming or whose normalized
/// form is too short to act as an identity key.
fn to_mention(doc: &Document, tagger_name: &str, span: RawSpan) -> Option<Mention> {
    let surface = span.text.trim();
    if surface.is_empty() {
        return None;
    }
    let normalized = normalize(surface);
    if normalized.chars().count() < MIN_NORMALIZED_CHARS {
        return None;
    }
    Some(Mention {
        doc_id: doc.id.clone(),
        surface: surface.to_string(),
        normalized,
        group: EntityGroup::from_raw(&span.label),
        label_raw: format!("{}:{}", tagger_name, span.label),
        start: span.start,
        end: span.end,
        fingerprint: doc.fingerprint.clone(),
    })
}

/// Collapse duplicate identity tuples, keeping the first occurrence.
///
/// Preserves input order, so rows stay grouped with their document and
/// earlier taggers win provenance.
fn dedupe(mentions: Vec<Mention>) -> MentionTable {
    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(mentions.len());
    for m in mentions {
        if seen.insert(m.identity_key()) {
            rows.push(m);
        }
    }
    MentionTable::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MockTagger, Tagger};

    fn span(text: &str, label: &str, start: usize, end: usize) -> RawSpan {
        RawSpan {
            text: text.to_string(),
            label: label.to_string(),
            start,
            end,
        }
    }

    fn providers(taggers: Vec<MockTagger>) -> Vec<Box<dyn TaggerProvider>> {
        taggers
            .into_iter()
            .map(|t| Box::new(t) as Box<dyn TaggerProvider>)
            .collect()
    }

    #[test]
    fn test_basic_aggregation() {
        let docs = vec![Document::new("NCT001", "aspirin treats headache")];
        let tagger = MockTagger::new("mock").with_spans(vec![
            span("aspirin", "CHEMICAL", 0, 7),
            span("headache", "DISEASE", 15, 23),
        ]);

        let table = Aggregator::new().run(&docs, &providers(vec![tagger])).unwrap();
        assert_eq!(table.len(), 2);
        let m = table.iter().next().unwrap();
        assert_eq!(m.group, EntityGroup::Drug);
        assert_eq!(m.label_raw, "mock:CHEMICAL");
        assert_eq!(m.fingerprint, docs[0].fingerprint);
    }

    #[test]
    fn test_duplicates_across_taggers_collapse() {
        let docs = vec![Document::new("NCT001", "aspirin")];
        let a = MockTagger::new("first").with_spans(vec![span("aspirin", "CHEMICAL", 0, 7)]);
        let b = MockTagger::new("second").with_spans(vec![span("Aspirin", "CHEMICAL", 0, 7)]);

        let table = Aggregator::new().run(&docs, &providers(vec![a, b])).unwrap();
        assert_eq!(table.len(), 1);
        // First occurrence wins provenance.
        assert_eq!(table.iter().next().unwrap().label_raw, "first:CHEMICAL");
        assert_eq!(table.iter().next().unwrap().surface, "aspirin");
    }

    #[test]
    fn test_same_span_different_group_kept() {
        let docs = vec![Document::new("NCT001", "TP53")];
        let a = MockTagger::new("a").with_spans(vec![span("TP53", "GENE", 0, 4)]);
        let b = MockTagger::new("b").with_spans(vec![span("TP53", "CHEMICAL", 0, 4)]);

        let table = Aggregator::new().run(&docs, &providers(vec![a, b])).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_short_normalized_mentions_dropped() {
        let docs = vec![Document::new("NCT001", "a B! xy")];
        let tagger = MockTagger::new("mock").with_spans(vec![
            span("a", "DISEASE", 0, 1),
            span("B!", "DISEASE", 2, 4),
            span("xy", "DISEASE", 5, 7),
        ]);

        let table = Aggregator::new().run(&docs, &providers(vec![tagger])).unwrap();
        // "a" and "B!" normalize to single chars; only "xy" survives.
        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().next().unwrap().normalized, "xy");
    }

    #[test]
    fn test_blank_documents_skipped() {
        let docs = vec![
            Document::new("", "aspirin"),
            Document::new("NCT001", "   "),
            Document::new("NCT002", "aspirin"),
        ];
        let tagger = MockTagger::new("mock").with_spans(vec![span("aspirin", "CHEMICAL", 0, 7)]);

        let table = Aggregator::new().run(&docs, &providers(vec![tagger])).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().next().unwrap().doc_id, "NCT002");
    }

    #[test]
    fn test_missing_ner_is_fatal() {
        let docs = vec![Document::new("NCT001", "aspirin")];
        let good = MockTagger::new("good").with_spans(vec![span("aspirin", "CHEMICAL", 0, 7)]);
        let bad = MockTagger::new("bad").without_ner();

        let err = Aggregator::new()
            .run(&docs, &providers(vec![good, bad]))
            .unwrap_err();
        assert!(matches!(err, Error::MissingNer(name) if name == "bad"));
    }

    #[test]
    fn test_load_failure_is_fatal() {
        struct FailingProvider;
        impl TaggerProvider for FailingProvider {
            fn name(&self) -> &str {
                "failing"
            }
            fn load(&self) -> Result<Box<dyn Tagger>> {
                Err(Error::tagger_init("model file missing"))
            }
        }

        let docs = vec![Document::new("NCT001", "aspirin")];
        let provs: Vec<Box<dyn TaggerProvider>> = vec![Box::new(FailingProvider)];
        let err = Aggregator::new().run(&docs, &provs).unwrap_err();
        assert!(matches!(err, Error::TaggerInit(_)));
    }

    #[test]
    fn test_cancellation_returns_no_partial_table() {
        let docs = vec![
            Document::new("NCT001", "aspirin"),
            Document::new("NCT002", "aspirin"),
        ];
        let tagger = MockTagger::new("mock").with_spans(vec![span("aspirin", "CHEMICAL", 0, 7)]);

        let token = CancelToken::new();
        token.cancel();
        let err = Aggregator::new()
            .with_cancel_token(token)
            .run(&docs, &providers(vec![tagger]))
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn test_rows_stay_grouped_by_document() {
        let docs = vec![
            Document::new("NCT001", "aspirin x"),
            Document::new("NCT002", "aspirin x"),
        ];
        let tagger = MockTagger::new("mock").with_spans(vec![
            span("aspirin", "CHEMICAL", 0, 7),
        ]);

        let table = Aggregator::new().run(&docs, &providers(vec![tagger])).unwrap();
        let ids: Vec<&str> = table.iter().map(|m| m.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["NCT001", "NCT002"]);
    }
}
