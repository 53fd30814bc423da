//! Percent agreement: the naive, uncorrected baseline.

use crate::metric::MetricId;
use crate::result::{AgreementDetail, AgreementResult};
use crate::table::RatingTable;

/// Share of multiply-rated units on which every rater chose the same category.
///
/// Units rated by a single rater are left out of the denominator. With no
/// multiply-rated unit at all the value is 1.
pub(crate) fn percent_agreement(table: &RatingTable) -> AgreementResult {
    let mut eligible = 0usize;
    let mut agreed = 0usize;

    for row in &table.ratings {
        let mut rated = row.iter().flatten();
        let Some(first) = rated.next() else {
            continue;
        };
        let rest: Vec<&String> = rated.collect();
        if rest.is_empty() {
            continue;
        }
        eligible += 1;
        if rest.iter().all(|c| *c == first) {
            agreed += 1;
        }
    }

    let value = if eligible == 0 {
        1.0
    } else {
        agreed as f64 / eligible as f64
    };

    let mut detail = AgreementDetail::new(table.rater_count(), table.categories().len(), eligible);
    detail.observed_agreement = value;
    AgreementResult::new(MetricId::PercentAgreement, value, detail)
}
