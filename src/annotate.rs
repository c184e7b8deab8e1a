//! Span resolution and annotated rendering.
//!
//! Taggers overlap: two models may claim intersecting spans of the same
//! sentence. Rendering needs a flat, ordered partition of the document into
//! plain and entity runs. [`resolve_spans`] applies a deterministic overlap
//! policy (earliest start wins; at equal starts the longer span wins; losers
//! are dropped whole, never split or merged) and guarantees that the
//! concatenation of all output segments reconstructs the input text exactly.

use crate::{EntityGroup, Mention};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hard cap on accepted entity spans per document.
///
/// Applied to the sorted candidate list before the greedy scan, so the
/// earliest spans by start order are the ones kept.
pub const MAX_ANNOTATED_SPANS: usize = 200;

/// One run of resolved document text: either plain text or an entity span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    /// Verbatim text between or around entity spans.
    Plain {
        /// The text run.
        text: String,
    },
    /// An accepted entity span.
    Entity {
        /// The span's substring of the document text.
        text: String,
        /// Semantic group the span was tagged with.
        group: EntityGroup,
    },
}

impl Segment {
    /// The text content of this segment.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Segment::Plain { text } | Segment::Entity { text, .. } => text,
        }
    }

    /// Whether this is an entity segment.
    #[must_use]
    pub fn is_entity(&self) -> bool {
        matches!(self, Segment::Entity { .. })
    }
}

/// Resolve a document's mentions into a non-overlapping ordered partition.
///
/// Mentions with invalid offsets (inverted, or past the end of the text) are
/// discarded; they are expected noise from external taggers, not errors.
/// Remaining candidates are ordered by start ascending with ties broken by
/// end descending, truncated to `max_spans`, then accepted greedily left to
/// right: a candidate is kept only if it starts at or after the end of the
/// last accepted span.
///
/// Pure and deterministic. Concatenating the returned segments' text in
/// order reproduces `text` exactly.
///
/// # Example
///
/// ```
/// use trialscope::{resolve_spans, Segment, MAX_ANNOTATED_SPANS};
///
/// let segments = resolve_spans("no entities here", [], MAX_ANNOTATED_SPANS);
/// assert_eq!(segments.len(), 1);
/// assert_eq!(segments[0].text(), "no entities here");
/// ```
pub fn resolve_spans<'a, I>(text: &str, mentions: I, max_spans: usize) -> Vec<Segment>
where
    I: IntoIterator<Item = &'a Mention>,
{
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();
    if n == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<(usize, usize, &EntityGroup)> = mentions
        .into_iter()
        .filter(|m| m.start < m.end && m.end <= n)
        .map(|m| (m.start, m.end, &m.group))
        .collect();
    candidates.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
    candidates.truncate(max_spans);

    let mut accepted: Vec<(usize, usize, &EntityGroup)> = Vec::new();
    let mut last_end = 0usize;
    for (start, end, group) in candidates {
        if !accepted.is_empty() && start < last_end {
            // Overlaps an already-accepted span; drop it whole.
            continue;
        }
        accepted.push((start, end, group));
        last_end = end;
    }

    let slice = |a: usize, b: usize| chars[a..b].iter().collect::<String>();

    let mut segments = Vec::with_capacity(accepted.len() * 2 + 1);
    let mut cursor = 0usize;
    for (start, end, group) in accepted {
        if cursor < start {
            segments.push(Segment::Plain {
                text: slice(cursor, start),
            });
        }
        segments.push(Segment::Entity {
            text: slice(start, end),
            group: group.clone(),
        });
        cursor = end;
    }
    if cursor < n {
        segments.push(Segment::Plain {
            text: slice(cursor, n),
        });
    }
    segments
}

// =============================================================================
// Palette
// =============================================================================

/// Background and border colors for rendering one entity group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupColors {
    /// Highlight background.
    pub background: &'static str,
    /// Underline/tag border.
    pub border: &'static str,
}

const DISEASE_COLORS: GroupColors = GroupColors {
    background: "#ffe3e3",
    border: "#d62728",
};
const DRUG_COLORS: GroupColors = GroupColors {
    background: "#e3efff",
    border: "#1f77b4",
};
const GENE_PROTEIN_COLORS: GroupColors = GroupColors {
    background: "#e6ffe6",
    border: "#2ca02c",
};

const OTHER_PALETTE: [GroupColors; 8] = [
    GroupColors { background: "#fff3cd", border: "#b8860b" },
    GroupColors { background: "#f3e5ff", border: "#6f42c1" },
    GroupColors { background: "#e7f7ff", border: "#0aa2c0" },
    GroupColors { background: "#ffe6f2", border: "#c2185b" },
    GroupColors { background: "#e9ecef", border: "#495057" },
    GroupColors { background: "#e8f5e9", border: "#1b5e20" },
    GroupColors { background: "#fce4ec", border: "#ad1457" },
    GroupColors { background: "#e3f2fd", border: "#1565c0" },
];

/// Deterministic category → color mapping for rendering consumers.
///
/// The three primary groups get fixed colors; fallback groups hash into a
/// stable palette so the same label always renders the same way.
#[must_use]
pub fn colors_for_group(group: &EntityGroup) -> GroupColors {
    match group {
        EntityGroup::Disease => DISEASE_COLORS,
        EntityGroup::Drug => DRUG_COLORS,
        EntityGroup::GeneProtein => GENE_PROTEIN_COLORS,
        EntityGroup::Other(label) => OTHER_PALETTE[stable_bucket(label, OTHER_PALETTE.len())],
    }
}

/// Hash a label into one of `n` buckets, stably across runs.
fn stable_bucket(label: &str, n: usize) -> usize {
    let digest = Sha256::digest(label.as_bytes());
    let word = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    (word as usize) % n
}

// =============================================================================
// HTML rendering
// =============================================================================

const TEXT_COLOR: &str = "#111111";

/// Render a document's mentions as highlighted HTML.
///
/// Produces a single `<div>` with plain runs escaped verbatim and entity
/// runs wrapped in colored spans, with an optional small group-label pill
/// after each entity. Span resolution follows [`resolve_spans`] with the
/// given cap.
pub fn annotate_html<'a, I>(text: &str, mentions: I, show_tag: bool, max_spans: usize) -> String
where
    I: IntoIterator<Item = &'a Mention>,
{
    if text.is_empty() {
        return "<div></div>".to_string();
    }

    let mut out = String::from("<div style='white-space: pre-wrap; line-height: 1.55;'>");
    for segment in resolve_spans(text, mentions, max_spans) {
        match segment {
            Segment::Plain { text } => out.push_str(&escape_html(&text)),
            Segment::Entity { text, group } => {
                let colors = colors_for_group(&group);
                let label = group.as_label();

                out.push_str(&format!(
                    "<span style='background:{}; border-bottom:2px solid {}; \
                     color:{}; padding: 0px 2px; border-radius: 4px;'>{}",
                    colors.background,
                    colors.border,
                    TEXT_COLOR,
                    escape_html(&text)
                ));
                if show_tag {
                    out.push_str(&format!(
                        "<span style='font-size: 0.72em; font-weight: 750; \
                         border: 1px solid {border}; padding: 1px 6px; border-radius: 999px; \
                         margin-left: 6px; color: {border}; background: white;'>{}</span>",
                        escape_html(&label),
                        border = colors.border,
                    ));
                }
                out.push_str("</span>");
            }
        }
    }
    out.push_str("</div>");
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
