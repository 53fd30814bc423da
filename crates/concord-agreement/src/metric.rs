use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AgreementError;

/// The four interchangeable reliability statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricId {
    PercentAgreement,
    CohensKappa,
    FleissKappa,
    KrippendorffAlpha,
}

impl MetricId {
    pub const ALL: [MetricId; 4] = [
        Self::PercentAgreement,
        Self::CohensKappa,
        Self::FleissKappa,
        Self::KrippendorffAlpha,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PercentAgreement => "percent-agreement",
            Self::CohensKappa => "cohens-kappa",
            Self::FleissKappa => "fleiss-kappa",
            Self::KrippendorffAlpha => "krippendorff-alpha",
        }
    }

    /// Cohen's kappa for exactly two raters, Fleiss' kappa otherwise.
    pub fn default_for(rater_count: usize) -> Self {
        if rater_count == 2 {
            Self::CohensKappa
        } else {
            Self::FleissKappa
        }
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricId {
    type Err = AgreementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| AgreementError::UnsupportedMetric(s.to_string()))
    }
}

/// Scale the category values are measured on. Only Krippendorff's alpha
/// distinguishes between them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementLevel {
    #[default]
    Nominal,
    Ordinal,
    Interval,
    Ratio,
}

/// Caller choices for [`compute_agreement`](crate::compute_agreement).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgreementOptions {
    /// `None` picks [`MetricId::default_for`] the rater count.
    pub metric: Option<MetricId>,
    /// Linear distance weights for Cohen's kappa over ordered categories.
    pub weighted: bool,
    pub level: MeasurementLevel,
    /// Ordinal category order. Unlisted categories sort lexicographically after it.
    pub category_order: Option<Vec<String>>,
}

impl AgreementOptions {
    pub fn metric(metric: MetricId) -> Self {
        Self {
            metric: Some(metric),
            ..Self::default()
        }
    }

    /// Select the metric by identifier, failing with
    /// [`AgreementError::UnsupportedMetric`] for unknown names.
    pub fn with_metric_name(mut self, name: &str) -> Result<Self, AgreementError> {
        self.metric = Some(name.parse()?);
        Ok(self)
    }

    pub fn weighted(mut self, weighted: bool) -> Self {
        self.weighted = weighted;
        self
    }

    pub fn level(mut self, level: MeasurementLevel) -> Self {
        self.level = level;
        self
    }

    pub fn category_order(mut self, order: Vec<String>) -> Self {
        self.category_order = Some(order);
        self
    }
}
