//! Cross-entity exploration over the mention table.
//!
//! Two read-only queries: bipartite co-occurrence counts between the most
//! trial-frequent entities of two groups, and a per-trial summary table.
//! Both are pure functions over a [`MentionTable`]; empty or unknown inputs
//! yield empty results, never errors.

use crate::{EntityGroup, MentionTable};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// One co-occurrence count: how many distinct trials mention both entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooccurrenceCell {
    /// Normalized entity from the left group.
    pub left: String,
    /// Normalized entity from the right group.
    pub right: String,
    /// Number of distinct documents mentioning both.
    pub trial_count: usize,
}

/// One row of a per-trial entity summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialTableRow {
    /// Semantic group of the entity.
    pub group: EntityGroup,
    /// Most frequent surface form within the group (first seen wins ties).
    pub surface: String,
    /// Normalized identity key.
    pub normalized: String,
    /// Number of mentions of this entity in the trial.
    pub mentions: usize,
}

/// Rank a group's distinct normalized entities by trial frequency.
///
/// Frequency is the number of distinct document ids an entity occurs in.
/// Ties break by normalized text ascending so the ranking is deterministic.
fn top_entities(table: &MentionTable, group: &EntityGroup, k: usize) -> Vec<String> {
    let mut docs_per_entity: HashMap<&str, HashSet<&str>> = HashMap::new();
    for m in table {
        if &m.group == group {
            docs_per_entity
                .entry(&m.normalized)
                .or_default()
                .insert(&m.doc_id);
        }
    }
    let mut ranked: Vec<(&str, usize)> = docs_per_entity
        .into_iter()
        .map(|(norm, docs)| (norm, docs.len()))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    ranked.truncate(k);
    ranked.into_iter().map(|(norm, _)| norm.to_string()).collect()
}

/// Count, per pair of top entities, the trials mentioning both.
///
/// The top `top_left` / `top_right` entities of each group are ranked by
/// distinct-trial frequency; mentions of entities on either top list are then
/// grouped per document, and every (left, right) pair present together in a
/// document counts that document once. Output is sorted by count descending,
/// then by left and right entity ascending.
///
/// Returns an empty vec when either group has no members or no document
/// contains both groups.
#[must_use]
pub fn build_cooccurrence(
    table: &MentionTable,
    left_group: &EntityGroup,
    right_group: &EntityGroup,
    top_left: usize,
    top_right: usize,
) -> Vec<CooccurrenceCell> {
    let left_top = top_entities(table, left_group, top_left);
    let right_top = top_entities(table, right_group, top_right);
    if left_top.is_empty() || right_top.is_empty() {
        return Vec::new();
    }

    let shortlist: HashSet<&str> = left_top
        .iter()
        .chain(right_top.iter())
        .map(String::as_str)
        .collect();

    // Per document: the distinct shortlisted entities of each group.
    let mut per_doc: HashMap<&str, (BTreeSet<&str>, BTreeSet<&str>)> = HashMap::new();
    for m in table {
        if !shortlist.contains(m.normalized.as_str()) {
            continue;
        }
        let (lefts, rights) = per_doc.entry(&m.doc_id).or_default();
        if &m.group == left_group {
            lefts.insert(&m.normalized);
        }
        if &m.group == right_group {
            rights.insert(&m.normalized);
        }
    }

    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for (lefts, rights) in per_doc.values() {
        if lefts.is_empty() || rights.is_empty() {
            continue;
        }
        for &left in lefts {
            for &right in rights {
                *counts.entry((left, right)).or_default() += 1;
            }
        }
    }

    let mut cells: Vec<CooccurrenceCell> = counts
        .into_iter()
        .map(|((left, right), trial_count)| CooccurrenceCell {
            left: left.to_string(),
            right: right.to_string(),
            trial_count,
        })
        .collect();
    cells.sort_by(|a, b| {
        b.trial_count
            .cmp(&a.trial_count)
            .then_with(|| a.left.cmp(&b.left))
            .then_with(|| a.right.cmp(&b.right))
    });
    cells
}

/// Summarize one trial's mentions, grouped by entity.
///
/// Mentions collapse by (group, normalized text); each row reports the
/// mention count and the most frequent surface form (first seen wins ties).
/// Rows sort by group ascending, then mention count descending, then
/// normalized text ascending. Unknown document ids yield an empty table.
#[must_use]
pub fn per_trial_table(table: &MentionTable, doc_id: &str) -> Vec<TrialTableRow> {
    // Surfaces per (group, normalized), in first-seen order.
    let mut order: Vec<(EntityGroup, String)> = Vec::new();
    let mut surfaces: HashMap<(EntityGroup, String), Vec<&str>> = HashMap::new();
    for m in table.for_document(doc_id) {
        let key = (m.group.clone(), m.normalized.clone());
        surfaces
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(&m.surface);
    }

    let mut rows: Vec<TrialTableRow> = order
        .into_iter()
        .map(|key| {
            let forms = &surfaces[&key];
            TrialTableRow {
                surface: representative_surface(forms).to_string(),
                mentions: forms.len(),
                group: key.0,
                normalized: key.1,
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        a.group
            .cmp(&b.group)
            .then_with(|| b.mentions.cmp(&a.mentions))
            .then_with(|| a.normalized.cmp(&b.normalized))
    });
    rows
}

/// Most frequent surface form; on equal counts the first seen wins.
fn representative_surface<'a>(forms: &[&'a str]) -> &'a str {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for form in forms {
        *counts.entry(form).or_default() += 1;
    }
    let mut best: &str = forms[0];
    let mut best_count = 0usize;
    for form in forms {
        let count = counts[form];
        if count > best_count {
            best = form;
            best_count = count;
        }
    }
    best
}
