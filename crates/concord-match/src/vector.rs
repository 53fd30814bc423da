//! TF-IDF term vectors scoped to the segments of one document.
//!
//! Document frequency is counted over the segment population of the document
//! being matched, not over a corpus. All values are immutable once built.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Sparse weighted-term vector, sorted by term.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermVector(BTreeMap<String, f64>);

impl TermVector {
    pub fn weight(&self, term: &str) -> f64 {
        self.0.get(term).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(t, w)| (t.as_str(), *w))
    }

    pub fn norm(&self) -> f64 {
        self.0.values().map(|w| w * w).sum::<f64>().sqrt()
    }

    /// Cosine similarity; 0 when either vector has no weight.
    pub fn cosine(&self, other: &TermVector) -> f64 {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        let dot: f64 = small.iter().map(|(t, w)| w * large.weight(t)).sum();
        let denom = self.norm() * other.norm();
        if denom > 0.0 { dot / denom } else { 0.0 }
    }
}

impl FromIterator<(String, f64)> for TermVector {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Document frequencies over one document's segments.
#[derive(Debug, Clone, Default)]
pub struct SegmentFrequencies {
    segments: usize,
    df: HashMap<String, usize>,
}

impl SegmentFrequencies {
    /// Count, for every term, how many segments contain it.
    pub fn from_segments(segment_keywords: &[Vec<String>]) -> Self {
        let mut df: HashMap<String, usize> = HashMap::new();
        for keywords in segment_keywords {
            let unique: HashSet<&String> = keywords.iter().collect();
            for term in unique {
                *df.entry(term.clone()).or_insert(0) += 1;
            }
        }
        Self {
            segments: segment_keywords.len(),
            df,
        }
    }

    pub fn segment_count(&self) -> usize {
        self.segments
    }

    pub fn document_frequency(&self, term: &str) -> usize {
        self.df.get(term).copied().unwrap_or(0)
    }

    /// `ln(segments / df)`. A term no segment contains is treated as if one did.
    pub fn idf(&self, term: &str) -> f64 {
        if self.segments == 0 {
            return 0.0;
        }
        let df = self.document_frequency(term).max(1);
        (self.segments as f64 / df as f64).ln()
    }

    /// Weight a keyword list: `tf = count / len`, `tf * idf` per term.
    /// Zero-weight terms are dropped.
    pub fn weigh(&self, keywords: &[String]) -> TermVector {
        if keywords.is_empty() {
            return TermVector::default();
        }
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for k in keywords {
            *counts.entry(k.as_str()).or_insert(0) += 1;
        }
        let total = keywords.len() as f64;
        counts
            .into_iter()
            .filter_map(|(term, count)| {
                let weight = (count as f64 / total) * self.idf(term);
                (weight > 0.0).then(|| (term.to_string(), weight))
            })
            .collect()
    }
}
