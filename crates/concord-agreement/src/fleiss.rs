//! Fleiss' kappa for any number of raters.
//!
//! Every rater is counted on every unit: a rater who left a unit uncoded
//! contributes a [`NO_CODE`](crate::table::NO_CODE) rating, so each row of
//! the count matrix sums to the rater count.

use std::collections::BTreeMap;

use crate::cohen::chance_corrected;
use crate::metric::MetricId;
use crate::result::{AgreementDetail, AgreementResult};
use crate::table::{RatingTable, index_of, order_categories};

const EPSILON: f64 = 1e-12;

pub(crate) fn fleiss_kappa(table: &RatingTable) -> AgreementResult {
    let n = table.rater_count();
    let columns: Vec<Vec<&str>> = (0..n).map(|r| table.column_or_no_code(r)).collect();
    let units = table.unit_count();

    let ordered = order_categories(columns.iter().flatten().copied(), None);
    let index = index_of(&ordered);
    let k = ordered.len();

    let mut detail = AgreementDetail::new(n, k, units);
    if units == 0 || n < 2 {
        detail.expected_agreement = Some(1.0);
        return AgreementResult::new(MetricId::FleissKappa, 1.0, detail);
    }

    // counts[i][j]: raters who put unit i in category j.
    let mut counts = vec![vec![0.0f64; k]; units];
    for column in &columns {
        for (i, cat) in column.iter().enumerate() {
            counts[i][index[cat]] += 1.0;
        }
    }

    let raters = n as f64;
    let total_units = units as f64;

    let p_bar = counts
        .iter()
        .map(|row| row.iter().map(|c| c * (c - 1.0)).sum::<f64>() / (raters * (raters - 1.0)))
        .sum::<f64>()
        / total_units;

    let proportions: Vec<f64> = (0..k)
        .map(|j| counts.iter().map(|row| row[j]).sum::<f64>() / (total_units * raters))
        .collect();
    let p_e: f64 = proportions.iter().map(|p| p * p).sum();

    let category_kappas: BTreeMap<String, f64> = ordered
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let p = proportions[j];
            let kappa = if p <= EPSILON || p >= 1.0 - EPSILON {
                1.0
            } else {
                let disagreement: f64 = counts.iter().map(|row| row[j] * (raters - row[j])).sum();
                1.0 - disagreement / (total_units * raters * (raters - 1.0) * p * (1.0 - p))
            };
            (name.clone(), kappa)
        })
        .collect();

    detail.observed_agreement = p_bar;
    detail.expected_agreement = Some(p_e);
    detail.category_kappas = category_kappas;
    AgreementResult::new(MetricId::FleissKappa, chance_corrected(p_bar, p_e), detail)
}
