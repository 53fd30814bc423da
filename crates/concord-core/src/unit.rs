//! Coding units: the position-addressed items raters are compared over.
//!
//! A unit is `(document_id, start, end)`. Two annotations from different
//! raters are about the same unit only when all three match exactly; overlap
//! based reconciliation uses [`spans_overlap`] instead.
//!
//! # Unit keys
//!
//! [`unit_key`] renders a unit as a string whose lexicographic order equals
//! document order, so exported keys sort the same way the units do:
//!
//! - `interview-1@0000000000-0000000042`
//! - `interview-1@0000000042-0000000107`

use serde::{Deserialize, Serialize};

/// Digits each offset is zero-padded to inside a unit key.
pub const OFFSET_WIDTH: usize = 10;

/// A rateable item: an exact span in one document.
///
/// The derived ordering is document id, then start, then end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CodingUnit {
    pub document_id: String,
    pub start: usize,
    pub end: usize,
}

impl CodingUnit {
    pub fn new(document_id: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            document_id: document_id.into(),
            start,
            end,
        }
    }

    pub fn key(&self) -> String {
        unit_key(&self.document_id, self.start, self.end)
    }

    /// Recover a unit from a key produced by [`unit_key`].
    pub fn from_key(key: &str) -> Option<Self> {
        let (doc, span) = key.rsplit_once('@')?;
        let (start, end) = span.split_once('-')?;
        Some(Self::new(doc, start.parse().ok()?, end.parse().ok()?))
    }

    /// Spans intersect and both units belong to the same document.
    pub fn overlaps(&self, other: &CodingUnit) -> bool {
        self.document_id == other.document_id
            && spans_overlap(self.start, self.end, other.start, other.end)
    }
}

/// Half-open interval intersection: `start1 < end2 && end1 > start2`.
pub fn spans_overlap(start1: usize, end1: usize, start2: usize, end2: usize) -> bool {
    start1 < end2 && end1 > start2
}

/// Render a unit as a lexicographically sortable key.
///
/// Input: `("doc", 3, 41)`
/// Output: `"doc@0000000003-0000000041"`
pub fn unit_key(document_id: &str, start: usize, end: usize) -> String {
    format!(
        "{}@{:0width$}-{:0width$}",
        document_id.trim(),
        start,
        end,
        width = OFFSET_WIDTH
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: assert a list of spans produces keys in strictly ascending order.
    fn assert_sorted_order(spans: &[(usize, usize)]) {
        let keys: Vec<String> = spans.iter().map(|&(s, e)| unit_key("doc", s, e)).collect();
        for i in 1..keys.len() {
            assert!(
                keys[i - 1] < keys[i],
                "Expected {:?} ({}) < {:?} ({})",
                spans[i - 1],
                keys[i - 1],
                spans[i],
                keys[i],
            );
        }
    }

    #[test]
    fn keys_follow_document_order() {
        assert_sorted_order(&[(0, 5), (0, 12), (3, 4), (9, 100), (10, 11), (1000, 1001)]);
    }

    #[test]
    fn key_order_matches_unit_order() {
        let mut units = vec![
            CodingUnit::new("doc", 100, 120),
            CodingUnit::new("doc", 9, 30),
            CodingUnit::new("doc", 9, 12),
        ];
        let mut keys: Vec<String> = units.iter().map(CodingUnit::key).collect();
        units.sort();
        keys.sort();
        let from_units: Vec<String> = units.iter().map(CodingUnit::key).collect();
        assert_eq!(keys, from_units);
    }

    #[test]
    fn exact_values() {
        assert_eq!(unit_key("doc", 3, 41), "doc@0000000003-0000000041");
        assert_eq!(unit_key("  doc ", 0, 1), "doc@0000000000-0000000001");
    }

    #[test]
    fn from_key_inverts_unit_key() {
        let unit = CodingUnit::new("notes@2024", 17, 230);
        assert_eq!(CodingUnit::from_key(&unit.key()), Some(unit));
    }

    #[test]
    fn from_key_rejects_garbage() {
        assert!(CodingUnit::from_key("no-separator").is_none());
        assert!(CodingUnit::from_key("doc@abc-12").is_none());
    }

    #[test]
    fn overlap_requires_same_document() {
        let a = CodingUnit::new("a", 0, 10);
        let b = CodingUnit::new("b", 0, 10);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&CodingUnit::new("a", 5, 6)));
    }

    #[test]
    fn touching_spans_do_not_overlap() {
        assert!(!spans_overlap(0, 5, 5, 9));
        assert!(spans_overlap(0, 6, 5, 9));
        assert!(spans_overlap(5, 9, 0, 6));
    }
}
