//! End-to-end pipeline tests: documents → aggregation → span resolution,
//! co-occurrence, and per-trial summaries, through the public API only.

use trialscope::{
    annotate_html, build_cooccurrence, per_trial_table, resolve_spans, Aggregator, CancelToken,
    Document, EntityGroup, Error, MockTagger, PatternTaggerProvider, RawSpan, Segment,
    TaggerProvider, MAX_ANNOTATED_SPANS,
};

fn span(text: &str, label: &str, start: usize, end: usize) -> RawSpan {
    RawSpan {
        text: text.to_string(),
        label: label.to_string(),
        start,
        end,
    }
}

fn boxed(taggers: Vec<MockTagger>) -> Vec<Box<dyn TaggerProvider>> {
    taggers
        .into_iter()
        .map(|t| Box::new(t) as Box<dyn TaggerProvider>)
        .collect()
}

#[test]
fn pattern_tagger_end_to_end() {
    let docs = vec![
        Document::new(
            "NCT001",
            "Patients with breast cancer received trastuzumab and aspirin.",
        ),
        Document::new("NCT002", "Trastuzumab outcomes in breast cancer."),
        Document::new("NCT003", "Aspirin in cardiovascular disease."),
    ];
    let providers: Vec<Box<dyn TaggerProvider>> = vec![Box::new(PatternTaggerProvider)];
    let table = Aggregator::new().run(&docs, &providers).unwrap();

    assert!(table.iter().any(|m| m.normalized == "breast cancer"));
    assert!(table.iter().any(|m| m.normalized == "trastuzumab"));
    assert!(table
        .iter()
        .all(|m| m.label_raw.starts_with("pattern:")));

    // Span resolution reconstructs each document exactly.
    for doc in &docs {
        let segments = resolve_spans(&doc.text, table.for_document(&doc.id), MAX_ANNOTATED_SPANS);
        let rebuilt: String = segments.iter().map(Segment::text).collect();
        assert_eq!(rebuilt, doc.text);
    }

    // "breast cancer" and "trastuzumab" co-occur in two trials.
    let cells = build_cooccurrence(&table, &EntityGroup::Disease, &EntityGroup::Drug, 10, 10);
    let cell = cells
        .iter()
        .find(|c| c.left == "breast cancer" && c.right == "trastuzumab")
        .unwrap();
    assert_eq!(cell.trial_count, 2);

    let html = annotate_html(
        &docs[0].text,
        table.for_document("NCT001"),
        true,
        MAX_ANNOTATED_SPANS,
    );
    assert!(html.contains("breast cancer"));
    assert!(html.contains("#ffe3e3"));
}

#[test]
fn two_taggers_deduplicate_into_one_table() {
    let text = "aspirin treats headache";
    let docs = vec![Document::new("NCT001", text)];
    let bc5cdr = MockTagger::new("bc5cdr").with_spans(vec![
        span("aspirin", "CHEMICAL", 0, 7),
        span("headache", "DISEASE", 15, 23),
    ]);
    // Second tagger repeats one span and contributes a new one.
    let jnlpba = MockTagger::new("jnlpba").with_spans(vec![
        span("aspirin", "CHEMICAL", 0, 7),
        span("treats", "GENE", 8, 14),
    ]);

    let table = Aggregator::new()
        .run(&docs, &boxed(vec![bc5cdr, jnlpba]))
        .unwrap();
    assert_eq!(table.len(), 3);
    let aspirin = table.iter().find(|m| m.normalized == "aspirin").unwrap();
    assert_eq!(aspirin.label_raw, "bc5cdr:CHEMICAL");
}

#[test]
fn failed_tagger_discards_earlier_results() {
    let docs = vec![Document::new("NCT001", "aspirin")];
    let good = MockTagger::new("good").with_spans(vec![span("aspirin", "CHEMICAL", 0, 7)]);
    let broken = MockTagger::new("broken").without_ner();

    let err = Aggregator::new()
        .run(&docs, &boxed(vec![good, broken]))
        .unwrap_err();
    assert!(matches!(err, Error::MissingNer(_)));
}

#[test]
fn cancellation_mid_batch() {
    let docs: Vec<Document> = (0..50)
        .map(|i| Document::new(format!("NCT{i:03}"), "aspirin"))
        .collect();
    let tagger = MockTagger::new("mock").with_spans(vec![span("aspirin", "CHEMICAL", 0, 7)]);

    let token = CancelToken::new();
    token.cancel();
    let err = Aggregator::new()
        .with_cancel_token(token)
        .run(&docs, &boxed(vec![tagger]))
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[test]
fn per_trial_summary_over_aggregated_table() {
    let text = "Tumor growth; the tumor responded. TUMOR markers fell. Aspirin given.";
    let docs = vec![Document::new("NCT001", text)];
    let tagger = MockTagger::new("mock").with_spans(vec![
        span("Tumor", "DISEASE", 0, 5),
        span("tumor", "DISEASE", 18, 23),
        span("TUMOR", "DISEASE", 35, 40),
        span("Aspirin", "CHEMICAL", 55, 62),
    ]);

    let table = Aggregator::new().run(&docs, &boxed(vec![tagger])).unwrap();
    let rows = per_trial_table(&table, "NCT001");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].group, EntityGroup::Disease);
    assert_eq!(rows[0].normalized, "tumor");
    assert_eq!(rows[0].mentions, 3);
    assert_eq!(rows[0].surface, "Tumor");
    assert_eq!(rows[1].group, EntityGroup::Drug);
    assert_eq!(rows[1].mentions, 1);
}

#[test]
fn fresh_run_replaces_table_wholesale() {
    let docs_a = vec![Document::new("NCT001", "aspirin")];
    let docs_b = vec![Document::new("NCT002", "warfarin")];
    let tagger_a = MockTagger::new("mock").with_spans(vec![span("aspirin", "CHEMICAL", 0, 7)]);
    let tagger_b = MockTagger::new("mock").with_spans(vec![span("warfarin", "CHEMICAL", 0, 8)]);

    let aggregator = Aggregator::new();
    let first = aggregator.run(&docs_a, &boxed(vec![tagger_a])).unwrap();
    let second = aggregator.run(&docs_b, &boxed(vec![tagger_b])).unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert!(second.iter().all(|m| m.doc_id == "NCT002"));
}

#[test]
fn fingerprints_tie_mentions_to_document_text() {
    let docs = vec![
        Document::new("NCT001", "aspirin"),
        Document::new("NCT002", "aspirin daily"),
    ];
    let tagger = MockTagger::new("mock").with_spans(vec![span("aspirin", "CHEMICAL", 0, 7)]);

    let table = Aggregator::new().run(&docs, &boxed(vec![tagger])).unwrap();
    let prints: Vec<&str> = table.iter().map(|m| m.fingerprint.as_str()).collect();
    assert_eq!(prints.len(), 2);
    assert_ne!(prints[0], prints[1]);
    assert_eq!(prints[0], docs[0].fingerprint);
}
