use thiserror::Error;

use crate::metric::MetricId;

#[derive(Debug, Error, PartialEq)]
pub enum AgreementError {
    #[error("agreement needs at least 2 raters, got {found}")]
    InsufficientRaters { found: usize },

    #[error("unsupported agreement metric: {0}")]
    UnsupportedMetric(String),

    #[error("{metric} requires exactly {expected} raters, got {found}")]
    IncompatibleRaterCount {
        metric: MetricId,
        expected: usize,
        found: usize,
    },
}
