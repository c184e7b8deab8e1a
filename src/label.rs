//! Semantic entity groups and tagger label mapping.
//!
//! Biomedical taggers ship incompatible label vocabularies: BC5CDR emits
//! `DISEASE`/`CHEMICAL`, JNLPBA emits `GENE_OR_GENE_PRODUCT` and friends.
//! [`EntityGroup`] is the small canonical set everything maps onto, with an
//! uppercased pass-through for vocabularies we have never seen so novel
//! taggers degrade gracefully instead of silently losing mentions.

use serde::{Deserialize, Serialize};

/// Semantic group of an entity mention.
///
/// The derived ordering (Disease < Drug < GeneProtein < Other) is used for
/// deterministic table sorting; the three fixed groups happen to sort
/// alphabetically by label, fallback groups sort last.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityGroup {
    /// Disease or medical condition (BC5CDR `DISEASE`)
    Disease,
    /// Drug or chemical compound (BC5CDR `CHEMICAL`)
    Drug,
    /// Gene or gene product (JNLPBA `GENE_OR_GENE_PRODUCT`, `GENE`, `PROTEIN`)
    GeneProtein,
    /// Unmapped label, passed through uppercased
    Other(String),
}

impl EntityGroup {
    /// Canonical label string for this group.
    #[must_use]
    pub fn as_label(&self) -> &str {
        match self {
            EntityGroup::Disease => "DISEASE",
            EntityGroup::Drug => "DRUG",
            EntityGroup::GeneProtein => "GENE_PROTEIN",
            EntityGroup::Other(s) => s.as_str(),
        }
    }

    /// Map a tagger's raw label onto its semantic group.
    ///
    /// The lookup is static: onboarding a new tagger vocabulary means adding
    /// match arms here, not branching elsewhere. Unrecognized labels pass
    /// through uppercased as their own group; an empty label becomes the
    /// generic `ENTITY` group. Never fails.
    #[must_use]
    pub fn from_raw(raw_label: &str) -> Self {
        match raw_label.to_uppercase().as_str() {
            // BC5CDR
            "DISEASE" => EntityGroup::Disease,
            "CHEMICAL" => EntityGroup::Drug,
            // JNLPBA
            "GENE_OR_GENE_PRODUCT" | "GENE" | "PROTEIN" => EntityGroup::GeneProtein,
            "" => EntityGroup::Other("ENTITY".to_string()),
            other => EntityGroup::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for EntityGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bc5cdr_labels() {
        assert_eq!(EntityGroup::from_raw("DISEASE"), EntityGroup::Disease);
        assert_eq!(EntityGroup::from_raw("CHEMICAL"), EntityGroup::Drug);
    }

    #[test]
    fn test_jnlpba_labels() {
        for raw in ["GENE_OR_GENE_PRODUCT", "GENE", "PROTEIN", "protein"] {
            assert_eq!(EntityGroup::from_raw(raw), EntityGroup::GeneProtein);
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(EntityGroup::from_raw("disease"), EntityGroup::Disease);
        assert_eq!(EntityGroup::from_raw("Chemical"), EntityGroup::Drug);
    }

    #[test]
    fn test_unknown_passes_through_uppercased() {
        assert_eq!(
            EntityGroup::from_raw("cell_line"),
            EntityGroup::Other("CELL_LINE".to_string())
        );
        assert_eq!(EntityGroup::from_raw("cell_line").as_label(), "CELL_LINE");
    }

    #[test]
    fn test_empty_label_falls_back_to_entity() {
        assert_eq!(
            EntityGroup::from_raw(""),
            EntityGroup::Other("ENTITY".to_string())
        );
    }

    #[test]
    fn test_label_roundtrip() {
        for g in [
            EntityGroup::Disease,
            EntityGroup::Drug,
            EntityGroup::GeneProtein,
        ] {
            assert_eq!(EntityGroup::from_raw(g.as_label()), g);
        }
    }

    #[test]
    fn test_ordering_is_stable() {
        let mut groups = vec![
            EntityGroup::Other("ENTITY".to_string()),
            EntityGroup::GeneProtein,
            EntityGroup::Disease,
            EntityGroup::Drug,
        ];
        groups.sort();
        assert_eq!(
            groups,
            vec![
                EntityGroup::Disease,
                EntityGroup::Drug,
                EntityGroup::GeneProtein,
                EntityGroup::Other("ENTITY".to_string()),
            ]
        );
    }
}
