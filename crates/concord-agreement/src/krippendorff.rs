//! Krippendorff's alpha over a units × raters matrix with missing values.
//!
//! Pairable values are accumulated into a coincidence matrix: every ordered
//! pair of values from different raters on the same unit contributes
//! `1 / (m_u - 1)`, where `m_u` is the number of values on that unit. Units
//! with a single value carry no pairing information and are skipped.

use crate::metric::{AgreementOptions, MeasurementLevel, MetricId};
use crate::result::{AgreementDetail, AgreementResult, Disagreement};
use crate::table::{RatingTable, index_of, order_categories};

const EPSILON: f64 = 1e-12;

/// Numeric value of a category for interval/ratio distances: the parsed
/// number when the category name is a finite number, otherwise its ordinal
/// index. Values are rescaled into `[-1, 1]`; alpha is scale-invariant and
/// squared differences of large values would overflow.
fn numeric_values(ordered: &[String]) -> Vec<f64> {
    let raw: Vec<f64> = ordered
        .iter()
        .enumerate()
        .map(|(i, c)| {
            c.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .unwrap_or(i as f64)
        })
        .collect();
    let scale = raw.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    if scale > 0.0 {
        raw.iter().map(|v| v / scale).collect()
    } else {
        raw
    }
}

/// Squared distance between categories `c` and `k`.
fn distance(level: MeasurementLevel, c: usize, k: usize, marginals: &[f64], values: &[f64]) -> f64 {
    if c == k {
        return 0.0;
    }
    match level {
        MeasurementLevel::Nominal => 1.0,
        MeasurementLevel::Ordinal => {
            let (lo, hi) = (c.min(k), c.max(k));
            let span: f64 = marginals[lo..=hi].iter().sum();
            let d = span - (marginals[c] + marginals[k]) / 2.0;
            d * d
        }
        MeasurementLevel::Interval | MeasurementLevel::Ratio => {
            let d = values[c] - values[k];
            d * d
        }
    }
}

pub(crate) fn krippendorff_alpha(table: &RatingTable, options: &AgreementOptions) -> AgreementResult {
    let used = table.categories();
    let ordered = order_categories(used.iter().copied(), options.category_order.as_deref());
    let index = index_of(&ordered);
    let k = ordered.len();

    let mut coincidence = vec![vec![0.0f64; k]; k];
    let mut pairable_units = 0usize;
    for row in &table.ratings {
        let values: Vec<usize> = row.iter().flatten().map(|c| index[c.as_str()]).collect();
        let m = values.len();
        if m < 2 {
            continue;
        }
        pairable_units += 1;
        let w = 1.0 / (m - 1) as f64;
        for (i, &a) in values.iter().enumerate() {
            for (j, &b) in values.iter().enumerate() {
                if i != j {
                    coincidence[a][b] += w;
                }
            }
        }
    }

    let marginals: Vec<f64> = coincidence.iter().map(|r| r.iter().sum()).collect();
    let n: f64 = marginals.iter().sum();
    let values = numeric_values(&ordered);

    let mut detail = AgreementDetail::new(table.rater_count(), k, pairable_units);
    if n <= 1.0 {
        detail.disagreement = Some(Disagreement {
            observed: 0.0,
            expected: 0.0,
        });
        return AgreementResult::new(MetricId::KrippendorffAlpha, 1.0, detail);
    }

    let mut d_o = 0.0;
    let mut d_e = 0.0;
    for c in 0..k {
        for kk in 0..k {
            let delta = distance(options.level, c, kk, &marginals, &values);
            if delta == 0.0 {
                continue;
            }
            d_o += coincidence[c][kk] * delta;
            d_e += marginals[c] * marginals[kk] * delta;
        }
    }
    d_o /= n;
    d_e /= n * (n - 1.0);

    let alpha = if d_e.abs() < EPSILON { 1.0 } else { 1.0 - d_o / d_e };
    debug_assert!(alpha.is_finite(), "alpha must be finite: D_o={d_o}, D_e={d_e}");

    detail.disagreement = Some(Disagreement {
        observed: d_o,
        expected: d_e,
    });
    if options.level == MeasurementLevel::Nominal {
        detail.observed_agreement = 1.0 - d_o;
        detail.expected_agreement = Some(1.0 - d_e);
    } else {
        detail.observed_agreement = (0..k).map(|c| coincidence[c][c]).sum::<f64>() / n;
    }
    AgreementResult::new(MetricId::KrippendorffAlpha, alpha, detail)
}
