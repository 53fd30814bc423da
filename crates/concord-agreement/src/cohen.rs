//! Cohen's kappa for two raters.
//!
//! Builds a confusion matrix over the union of units × the union of
//! categories. A unit one rater annotated and the other did not is scored as
//! [`NO_CODE`](crate::table::NO_CODE) for the silent rater, so disjoint
//! annotation sets still give a finite value.

use serde::{Deserialize, Serialize};

use concord_core::RaterRecord;

use crate::error::AgreementError;
use crate::metric::{AgreementOptions, MetricId};
use crate::result::{AgreementDetail, AgreementResult};
use crate::table::{NO_CODE, RatingTable, index_of, order_categories};

const EPSILON: f64 = 1e-12;

/// Observed and chance agreement for one rater pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct KappaParts {
    pub observed: f64,
    pub expected: f64,
    pub kappa: f64,
    pub categories: usize,
    pub units: usize,
}

/// `(observed - expected) / (1 - expected)`, defined as 1 when `expected` is 1.
pub(crate) fn chance_corrected(observed: f64, expected: f64) -> f64 {
    if (1.0 - expected).abs() < EPSILON {
        1.0
    } else {
        (observed - expected) / (1.0 - expected)
    }
}

/// Linear agreement weight `1 - |i - j| / (k - 1)`.
fn linear_weight(i: usize, j: usize, k: usize) -> f64 {
    if k <= 1 {
        return 1.0;
    }
    1.0 - i.abs_diff(j) as f64 / (k - 1) as f64
}

/// Kappa over two aligned columns of categories.
pub(crate) fn kappa_for_pair(
    a: &[&str],
    b: &[&str],
    weighted: bool,
    order: Option<&[String]>,
) -> KappaParts {
    let n = a.len().min(b.len());
    if n == 0 {
        return KappaParts {
            observed: 1.0,
            expected: 1.0,
            kappa: 1.0,
            categories: 0,
            units: 0,
        };
    }

    let ordered = order_categories(a.iter().chain(b).copied(), order);
    let index = index_of(&ordered);
    let k = ordered.len();

    let mut matrix = vec![vec![0.0f64; k]; k];
    for (x, y) in a.iter().zip(b) {
        matrix[index[x]][index[y]] += 1.0;
    }

    let rows: Vec<f64> = matrix.iter().map(|r| r.iter().sum()).collect();
    let cols: Vec<f64> = (0..k).map(|j| matrix.iter().map(|r| r[j]).sum()).collect();

    let weight = |i: usize, j: usize| -> f64 {
        if weighted {
            linear_weight(i, j, k)
        } else if i == j {
            1.0
        } else {
            0.0
        }
    };

    let total = n as f64;
    let mut observed = 0.0;
    let mut expected = 0.0;
    for i in 0..k {
        for j in 0..k {
            let w = weight(i, j);
            if w == 0.0 {
                continue;
            }
            observed += w * matrix[i][j];
            expected += w * rows[i] * cols[j];
        }
    }
    observed /= total;
    expected /= total * total;

    KappaParts {
        observed,
        expected,
        kappa: chance_corrected(observed, expected),
        categories: k,
        units: n,
    }
}

/// Columns for raters `r1` and `r2`, skipping units neither of them rated.
fn pair_columns(table: &RatingTable, r1: usize, r2: usize) -> (Vec<&str>, Vec<&str>) {
    table
        .ratings
        .iter()
        .filter(|row| row[r1].is_some() || row[r2].is_some())
        .map(|row| {
            (
                row[r1].as_deref().unwrap_or(NO_CODE),
                row[r2].as_deref().unwrap_or(NO_CODE),
            )
        })
        .unzip()
}

/// Cohen's kappa for a two-rater table.
pub(crate) fn cohens_kappa(table: &RatingTable, options: &AgreementOptions) -> AgreementResult {
    let (a, b) = pair_columns(table, 0, 1);
    let parts = kappa_for_pair(&a, &b, options.weighted, options.category_order.as_deref());

    let mut detail = AgreementDetail::new(table.rater_count(), parts.categories, parts.units);
    detail.observed_agreement = parts.observed;
    detail.expected_agreement = Some(parts.expected);
    detail.weighted = options.weighted;
    AgreementResult::new(MetricId::CohensKappa, parts.kappa, detail)
}

/// Kappa for one pair of raters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairKappa {
    pub rater_a: String,
    pub rater_b: String,
    pub kappa: f64,
    pub units: usize,
}

/// Cohen's kappa for every rater pair, with their mean (Light's kappa).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseKappa {
    pub pairs: Vec<PairKappa>,
    pub mean: f64,
}

/// Cohen's kappa between every pair of raters.
///
/// Each pair is scored over the units at least one of the two annotated.
pub fn pairwise_cohen(
    records: &[RaterRecord],
    options: &AgreementOptions,
) -> Result<PairwiseKappa, AgreementError> {
    if records.len() < 2 {
        return Err(AgreementError::InsufficientRaters {
            found: records.len(),
        });
    }

    let table = RatingTable::from_records(records);
    let mut pairs = Vec::new();
    for r1 in 0..table.rater_count() {
        for r2 in (r1 + 1)..table.rater_count() {
            let (a, b) = pair_columns(&table, r1, r2);
            let parts =
                kappa_for_pair(&a, &b, options.weighted, options.category_order.as_deref());
            pairs.push(PairKappa {
                rater_a: table.raters[r1].clone(),
                rater_b: table.raters[r2].clone(),
                kappa: parts.kappa,
                units: parts.units,
            });
        }
    }

    let mean = pairs.iter().map(|p| p.kappa).sum::<f64>() / pairs.len() as f64;
    Ok(PairwiseKappa { pairs, mean })
}
