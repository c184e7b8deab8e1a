//! Mention and document record types.
//!
//! These are the flat rows the rest of the crate aggregates over: explicit
//! fields, serde-serializable, no hidden tabular machinery.

use crate::EntityGroup;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A document to run taggers over.
///
/// Supplied by an external document source; the core never mutates or
/// re-fetches these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Opaque document identifier (e.g. an NCT id), non-empty.
    pub id: String,
    /// The exact text that taggers will see; offsets index into this.
    pub text: String,
    /// Fingerprint of `text`, for cache/consistency checks.
    #[serde(default)]
    pub fingerprint: String,
}

impl Document {
    /// Create a document, computing the content fingerprint from the text.
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let fingerprint = content_fingerprint(&text);
        Self {
            id: id.into(),
            text,
            fingerprint,
        }
    }
}

/// SHA-256 fingerprint of document text, hex-encoded.
#[must_use]
pub fn content_fingerprint(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// One tagged occurrence of an entity in one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mention {
    /// Document this mention was found in.
    pub doc_id: String,
    /// Exact surface form as produced by the tagger (trimmed).
    pub surface: String,
    /// Normalized identity key derived from `surface`.
    pub normalized: String,
    /// Semantic group after label mapping.
    pub group: EntityGroup,
    /// Provenance: `"<tagger>:<raw label>"`. Not part of mention identity.
    pub label_raw: String,
    /// Start character offset (inclusive) into the document text.
    pub start: usize,
    /// End character offset (exclusive) into the document text.
    pub end: usize,
    /// Fingerprint of the document text the offsets index into.
    pub fingerprint: String,
}

impl Mention {
    /// The identity tuple under which duplicate detections collapse.
    ///
    /// Two mentions with the same key are the same detection regardless of
    /// which tagger produced them; provenance fields keep the first
    /// occurrence.
    #[must_use]
    pub fn identity_key(&self) -> (String, usize, usize, EntityGroup, String) {
        (
            self.doc_id.clone(),
            self.start,
            self.end,
            self.group.clone(),
            self.normalized.clone(),
        )
    }
}

/// The deduplicated mention table produced by one aggregation run.
///
/// Immutable for its lifetime: a subsequent run replaces the whole table,
/// it is never merged incrementally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MentionTable {
    mentions: Vec<Mention>,
}

impl MentionTable {
    /// Wrap an already-deduplicated mention list.
    #[must_use]
    pub fn new(mentions: Vec<Mention>) -> Self {
        Self { mentions }
    }

    /// An empty table.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of mention rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    /// Iterate over all mention rows.
    pub fn iter(&self) -> impl Iterator<Item = &Mention> {
        self.mentions.iter()
    }

    /// Iterate over mentions belonging to one document.
    pub fn for_document<'a>(&'a self, doc_id: &'a str) -> impl Iterator<Item = &'a Mention> {
        self.mentions.iter().filter(move |m| m.doc_id == doc_id)
    }

    /// Consume the table, yielding its rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Mention> {
        self.mentions
    }
}

impl<'a> IntoIterator for &'a MentionTable {
    type Item = &'a Mention;
    type IntoIter = std::slice::Iter<'a, Mention>;

    fn into_iter(self) -> Self::IntoIter {
        self.mentions.iter()
    }
}
