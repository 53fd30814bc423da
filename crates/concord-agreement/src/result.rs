use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metric::MetricId;

/// Landis–Koch reading of a reliability value, shared by all four metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Interpretation {
    Poor,
    Slight,
    Fair,
    Moderate,
    Substantial,
    AlmostPerfect,
}

impl Interpretation {
    /// `<0` poor, `[0,0.21)` slight, `[0.21,0.41)` fair, `[0.41,0.61)` moderate,
    /// `[0.61,0.81)` substantial, `[0.81,1]` almost perfect.
    pub fn from_value(value: f64) -> Self {
        match value {
            v if v < 0.0 => Self::Poor,
            v if v < 0.21 => Self::Slight,
            v if v < 0.41 => Self::Fair,
            v if v < 0.61 => Self::Moderate,
            v if v < 0.81 => Self::Substantial,
            _ => Self::AlmostPerfect,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Poor => "poor",
            Self::Slight => "slight",
            Self::Fair => "fair",
            Self::Moderate => "moderate",
            Self::Substantial => "substantial",
            Self::AlmostPerfect => "almost-perfect",
        }
    }
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Krippendorff's observed and expected disagreement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Disagreement {
    pub observed: f64,
    pub expected: f64,
}

/// Diagnostics behind a reliability value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgreementDetail {
    pub observed_agreement: f64,
    /// Chance agreement; `None` for percent agreement, which does not correct for chance.
    pub expected_agreement: Option<f64>,
    pub raters: usize,
    pub categories: usize,
    pub units: usize,
    #[serde(default)]
    pub weighted: bool,
    /// Fleiss' per-category kappas.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub category_kappas: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disagreement: Option<Disagreement>,
}

impl AgreementDetail {
    pub(crate) fn new(raters: usize, categories: usize, units: usize) -> Self {
        Self {
            observed_agreement: 1.0,
            expected_agreement: None,
            raters,
            categories,
            units,
            weighted: false,
            category_kappas: BTreeMap::new(),
            disagreement: None,
        }
    }
}

/// A reliability score with its interpretation and diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgreementResult {
    pub metric: MetricId,
    pub value: f64,
    pub interpretation: Interpretation,
    pub detail: AgreementDetail,
}

impl AgreementResult {
    pub(crate) fn new(metric: MetricId, value: f64, detail: AgreementDetail) -> Self {
        Self {
            metric,
            value,
            interpretation: Interpretation::from_value(value),
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landis_koch_boundaries() {
        assert_eq!(Interpretation::from_value(-0.01), Interpretation::Poor);
        assert_eq!(Interpretation::from_value(0.0), Interpretation::Slight);
        assert_eq!(Interpretation::from_value(0.2099), Interpretation::Slight);
        assert_eq!(Interpretation::from_value(0.21), Interpretation::Fair);
        assert_eq!(Interpretation::from_value(0.41), Interpretation::Moderate);
        assert_eq!(Interpretation::from_value(0.61), Interpretation::Substantial);
        assert_eq!(Interpretation::from_value(0.8), Interpretation::Substantial);
        assert_eq!(Interpretation::from_value(0.81), Interpretation::AlmostPerfect);
        assert_eq!(Interpretation::from_value(1.0), Interpretation::AlmostPerfect);
    }

    #[test]
    fn interpretation_serialises_kebab_case() {
        let json = serde_json::to_string(&Interpretation::AlmostPerfect).unwrap();
        assert_eq!(json, r#""almost-perfect""#);
    }

    #[test]
    fn result_json_omits_empty_diagnostics() {
        let result = AgreementResult::new(
            MetricId::PercentAgreement,
            0.9,
            AgreementDetail::new(2, 2, 10),
        );
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains(r#""metric":"percent-agreement""#));
        assert!(!json.contains("category_kappas"));
        assert!(!json.contains("disagreement"));
    }
}
