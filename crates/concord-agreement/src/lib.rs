//! Inter-rater reliability over coded text spans.
//!
//! All four metrics reduce a set of [`RaterRecord`]s to one reliability value
//! with a Landis–Koch [`Interpretation`]. Raters are aligned on exact coding
//! units (see [`RatingTable`]); the union of every annotated span is the item
//! set.

mod cohen;
mod error;
mod fleiss;
mod krippendorff;
mod metric;
mod percent;
mod result;
mod table;

#[cfg(test)]
mod test_support;

pub use cohen::{PairKappa, PairwiseKappa, pairwise_cohen};
pub use error::AgreementError;
pub use metric::{AgreementOptions, MeasurementLevel, MetricId};
pub use result::{AgreementDetail, AgreementResult, Disagreement, Interpretation};
pub use table::{NO_CODE, RatingTable};

use concord_core::RaterRecord;
use tracing::{info, instrument};

/// Compute inter-rater agreement.
///
/// Fails with [`AgreementError::InsufficientRaters`] for fewer than two
/// records and [`AgreementError::IncompatibleRaterCount`] when Cohen's kappa
/// is asked for anything but two. Degenerate data (no units, a single
/// category) is not an error; it yields the value documented per metric.
#[instrument(skip(records, options), fields(raters = records.len()))]
pub fn compute_agreement(
    records: &[RaterRecord],
    options: &AgreementOptions,
) -> Result<AgreementResult, AgreementError> {
    if records.len() < 2 {
        return Err(AgreementError::InsufficientRaters {
            found: records.len(),
        });
    }

    let metric = options
        .metric
        .unwrap_or_else(|| MetricId::default_for(records.len()));

    if metric == MetricId::CohensKappa && records.len() != 2 {
        return Err(AgreementError::IncompatibleRaterCount {
            metric,
            expected: 2,
            found: records.len(),
        });
    }

    let table = RatingTable::from_records(records);

    let result = match metric {
        MetricId::PercentAgreement => percent::percent_agreement(&table),
        MetricId::CohensKappa => cohen::cohens_kappa(&table, options),
        MetricId::FleissKappa => fleiss::fleiss_kappa(&table),
        MetricId::KrippendorffAlpha => krippendorff::krippendorff_alpha(&table, options),
    };

    info!(
        metric = %result.metric,
        value = result.value,
        interpretation = %result.interpretation,
        units = result.detail.units,
        "agreement computed"
    );
    Ok(result)
}
