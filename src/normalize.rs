//! Canonicalization of entity surface text.
//!
//! Taggers emit surface forms with arbitrary casing, spacing, and typographic
//! dashes ("Non–Small Cell", "non  small cell"). [`normalize`] folds these into
//! a single comparison key so that the same entity counts as the same entity
//! across documents and taggers.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static NON_WORD_EDGES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\W+|\W+$").unwrap());

/// Normalize a raw entity surface form into its identity key.
///
/// Steps, in order: trim surrounding whitespace, lowercase, collapse internal
/// whitespace runs to a single space, replace en/em dashes with an ASCII
/// hyphen, strip any leading/trailing run of non-word characters.
///
/// Total and idempotent: every input maps to some output (possibly empty), and
/// `normalize(normalize(x)) == normalize(x)`.
///
/// # Example
///
/// ```
/// use trialscope::normalize;
///
/// assert_eq!(normalize("  Non–Small Cell  "), "non-small cell");
/// assert_eq!(normalize("Drug!!"), "drug");
/// assert_eq!(normalize("!!!"), "");
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let collapsed = WHITESPACE_RUN.replace_all(&lowered, " ");
    let dashed = collapsed.replace('\u{2013}', "-").replace('\u{2014}', "-");
    NON_WORD_EDGES.replace_all(&dashed, "").into_owned()
}
