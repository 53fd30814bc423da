//! Category-name normalisation and similarity.

use std::collections::HashSet;

/// Minimum word-set Jaccard overlap for two names to count as the same category.
pub const NAME_OVERLAP_THRESHOLD: f64 = 0.5;

/// Lowercase, drop punctuation, collapse whitespace, trim.
pub fn normalize_name(name: &str) -> String {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn word_set(normalized: &str) -> HashSet<&str> {
    normalized.split_whitespace().collect()
}

/// Jaccard overlap of the two names' word sets.
pub fn word_overlap(a: &str, b: &str) -> f64 {
    let (na, nb) = (normalize_name(a), normalize_name(b));
    let (wa, wb) = (word_set(&na), word_set(&nb));
    let union = wa.union(&wb).count();
    if union == 0 {
        return 0.0;
    }
    wa.intersection(&wb).count() as f64 / union as f64
}

/// Exact match after normalisation, substring containment, or at least
/// [`NAME_OVERLAP_THRESHOLD`] word overlap.
pub fn names_similar(a: &str, b: &str) -> bool {
    let (na, nb) = (normalize_name(a), normalize_name(b));
    if na.is_empty() || nb.is_empty() {
        return false;
    }
    if na == nb || na.contains(&nb) || nb.contains(&na) {
        return true;
    }
    word_overlap(&na, &nb) >= NAME_OVERLAP_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalisation() {
        assert_eq!(normalize_name("  Work-Life   Balance! "), "work life balance");
        assert_eq!(normalize_name("Motivation"), "motivation");
        assert_eq!(normalize_name("Équipe."), "équipe");
    }

    #[test]
    fn exact_after_normalisation() {
        assert!(names_similar("Motivation", "  motivation."));
    }

    #[test]
    fn substring_containment() {
        assert!(names_similar("Stress", "Work stress"));
        assert!(names_similar("Financial motivation", "motivation"));
    }

    #[test]
    fn word_overlap_threshold() {
        // {job, security, concerns} vs {job, security, fears}: 2/4.
        assert!(names_similar("Job security concerns", "Job security fears"));
        // {career, growth} vs {career, change, plans}: 1/4.
        assert!(!names_similar("Career growth", "Career change plans"));
    }

    #[test]
    fn different_names() {
        assert!(!names_similar("Motivation", "Frustration"));
        assert!(!names_similar("", "Frustration"));
    }

    #[test]
    fn overlap_values() {
        assert_eq!(word_overlap("a b", "a b"), 1.0);
        assert_eq!(word_overlap("", ""), 0.0);
        assert!((word_overlap("a b c", "a d") - 0.25).abs() < 1e-12);
    }
}
