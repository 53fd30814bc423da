//! Fixture builders shared by the metric tests.

use concord_core::{Annotation, Attribution, RaterRecord};

/// Span of the `index`-th test unit: `[index * 10, index * 10 + 5)`.
pub fn span(index: usize) -> (usize, usize) {
    (index * 10, index * 10 + 5)
}

/// Build rater records from `(rater, [(unit_index, category)])` rows.
pub fn records(rows: &[(&str, &[(usize, &str)])]) -> Vec<RaterRecord> {
    rows.iter()
        .map(|(rater, ratings)| {
            let annotations = ratings
                .iter()
                .map(|&(unit, cat)| {
                    let (start, end) = span(unit);
                    Annotation::new("doc", cat, start, end, "", Attribution::human(*rater))
                })
                .collect();
            RaterRecord::new(*rater, annotations)
        })
        .collect()
}

/// Every rater rates every unit; `pick(rater, unit)` chooses the category.
pub fn uniform(
    raters: usize,
    units: usize,
    pick: impl Fn(usize, usize) -> &'static str,
) -> Vec<RaterRecord> {
    (0..raters)
        .map(|r| {
            let annotations = (0..units)
                .map(|u| {
                    let (start, end) = span(u);
                    Annotation::new("doc", pick(r, u), start, end, "", Attribution::human(format!("r{r}")))
                })
                .collect();
            RaterRecord::new(format!("r{r}"), annotations)
        })
        .collect()
}
