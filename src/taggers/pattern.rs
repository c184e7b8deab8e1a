//! Pattern-based tagger - extracts biomedical entities via regex only.
//!
//! No model files, no gazetteers beyond a handful of common drug names. Only
//! tags entities that are recognizable by their form:
//! - Diseases: `<modifier> (cancer|carcinoma|syndrome|...)` phrases and
//!   `-itis` terms
//! - Drugs: INN suffixes (`-mab`, `-nib`, `-statin`, ...) plus a few
//!   ubiquitous names
//! - Genes/proteins: short all-caps symbols (`TP53`, `EGFR`, `HER2`)
//!
//! This is a minimal fallback for environments without pretrained biomedical
//! models; precision is deliberately favored over recall.

use crate::offset::byte_to_char;
use crate::{RawSpan, Result, Tagger, TaggerProvider};
use once_cell::sync::Lazy;
use regex::Regex;

static DISEASE_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:[a-z][a-z-]*\s+){0,2}(?:cancers?|carcinomas?|tumou?rs?|leukemias?|lymphomas?|melanomas?|sarcomas?|diseases?|syndromes?|disorders?|failure|infections?)\b",
    )
    .unwrap()
});

static DISEASE_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:diabetes|asthma|hypertension|obesity|stroke|sepsis|anemia|epilepsy|migraine|depression|schizophrenia|[a-z]+itis)\b",
    )
    .unwrap()
});

static DRUG_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b[a-z]{2,}(?:mab|nib|ciclib|parib|statin|prazole|cillin|mycin|azole|pril|sartan|gliflozin|gliptin|tide|vir)\b",
    )
    .unwrap()
});

static DRUG_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:aspirin|ibuprofen|acetaminophen|paracetamol|metformin|warfarin|heparin|insulin|cisplatin|paclitaxel|docetaxel|doxorubicin|tamoxifen|dexamethasone|prednisone)\b",
    )
    .unwrap()
});

static GENE_SYMBOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z][A-Z0-9]{2,7}\b").unwrap());

// All-caps tokens that are not gene symbols.
const GENE_EXCLUDE: &[&str] = &[
    "DNA", "RNA", "PCR", "FDA", "WHO", "USA", "III", "VII", "VIII",
];

// Leading tokens a disease-phrase match may pick up that are not part of the
// entity ("with breast cancer" → "breast cancer").
const PHRASE_STOPWORDS: &[&str] = &[
    "with", "and", "or", "the", "a", "an", "of", "in", "for", "to", "on",
    "from", "had", "has", "have", "received",
];

/// Regex fallback tagger using character-offset raw spans.
///
/// Labels use the same raw vocabulary as the biomedical models it stands in
/// for (`DISEASE`, `CHEMICAL`, `GENE`), so the label mapper treats both the
/// same way.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternTagger;

impl PatternTagger {
    /// Create the pattern tagger. Stateless and cheap.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Tagger for PatternTagger {
    fn tag(&self, text: &str) -> Result<Vec<RawSpan>> {
        // Byte ranges claimed so far; first pattern family wins overlaps.
        let mut claimed: Vec<(usize, usize)> = Vec::new();
        let mut spans = Vec::new();

        for pattern in [&*DISEASE_PHRASE, &*DISEASE_WORD] {
            for m in pattern.find_iter(text) {
                let (start, matched) = strip_leading_stopwords(m.start(), m.as_str());
                push_span(text, &mut claimed, &mut spans, start, matched, "DISEASE");
            }
        }
        for pattern in [&*DRUG_SUFFIX, &*DRUG_WORD] {
            for m in pattern.find_iter(text) {
                push_span(text, &mut claimed, &mut spans, m.start(), m.as_str(), "CHEMICAL");
            }
        }
        for m in GENE_SYMBOL.find_iter(text) {
            if GENE_EXCLUDE.contains(&m.as_str()) {
                continue;
            }
            push_span(text, &mut claimed, &mut spans, m.start(), m.as_str(), "GENE");
        }

        Ok(spans)
    }

    fn name(&self) -> &str {
        "pattern"
    }
}

/// Drop stopword tokens a phrase match swallowed at its left edge.
///
/// Returns the adjusted byte start and the remaining slice.
fn strip_leading_stopwords(mut start: usize, mut matched: &str) -> (usize, &str) {
    loop {
        let Some(space) = matched.find(char::is_whitespace) else {
            return (start, matched);
        };
        let word = matched[..space].to_lowercase();
        if !PHRASE_STOPWORDS.contains(&word.as_str()) {
            return (start, matched);
        }
        let rest = matched[space..].trim_start();
        start += matched.len() - rest.len();
        matched = rest;
    }
}

/// Record a span unless it overlaps one already claimed.
fn push_span(
    text: &str,
    claimed: &mut Vec<(usize, usize)>,
    spans: &mut Vec<RawSpan>,
    byte_start: usize,
    matched: &str,
    label: &str,
) {
    let byte_end = byte_start + matched.len();
    if claimed.iter().any(|&(s, e)| byte_start < e && byte_end > s) {
        return;
    }
    // Regex matches land on character boundaries, so conversion cannot fail;
    // skip the span rather than panic if it ever does.
    let (Some(start), Some(end)) = (byte_to_char(text, byte_start), byte_to_char(text, byte_end))
    else {
        return;
    };
    claimed.push((byte_start, byte_end));
    spans.push(RawSpan {
        text: matched.to_string(),
        label: label.to_string(),
        start,
        end,
    });
}

/// Provider for [`PatternTagger`]; loading cannot fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternTaggerProvider;

impl TaggerProvider for PatternTaggerProvider {
    fn name(&self) -> &str {
        "pattern"
    }

    fn load(&self) -> Result<Box<dyn Tagger>> {
        Ok(Box::new(PatternTagger::new()))
    }
}
