//! Multi-pass consensus resolution.
//!
//! Each pass is an independent coding of the same material, produced by one
//! persona. A claim (span plus category label) survives only if enough passes
//! reproduce it: an overlapping span with a similar category name.
//!
//! Grouping is greedy and deterministic. Claims are visited pass by pass, in
//! `(document, start, end, label)` order within a pass. Every claim not yet
//! absorbed seeds a group and pulls in, from each other pass, the unabsorbed
//! claim with the largest overlap that carries a similar label. A group is one
//! distinct claim; it is promoted when it spans at least the required number
//! of passes.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use concord_core::{Annotation, Attribution, Category};

use crate::error::ConsensusError;
use crate::normalize::names_similar;
use crate::taxonomy::{find_by_name, merge_taxonomy};

/// Fraction of passes that must agree when the caller gives none.
pub const DEFAULT_AGREEMENT_FRACTION: f64 = 2.0 / 3.0;

/// Attribution method name for promoted annotations.
pub const CONSENSUS_METHOD: &str = "consensus";

/// The output of one coding pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassResult {
    /// Persona or run identifier.
    pub pass_id: String,
    pub annotations: Vec<Annotation>,
    /// Categories this pass used or proposed. Annotation labels are resolved
    /// against these by id; when absent the category id is the label.
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl PassResult {
    pub fn new(pass_id: impl Into<String>, annotations: Vec<Annotation>) -> Self {
        Self {
            pass_id: pass_id.into(),
            annotations,
            categories: Vec::new(),
        }
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    /// Category name for an annotation, falling back to its category id.
    pub fn label_for<'a>(&'a self, annotation: &'a Annotation) -> &'a str {
        self.categories
            .iter()
            .find(|c| c.id == annotation.category_id)
            .map(|c| c.name.as_str())
            .unwrap_or(annotation.category_id.as_str())
    }
}

impl From<Vec<Annotation>> for PassResult {
    fn from(annotations: Vec<Annotation>) -> Self {
        Self::new("", annotations)
    }
}

/// Output of [`resolve_consensus`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// Promoted annotations, attributed to [`CONSENSUS_METHOD`].
    pub annotations: Vec<Annotation>,
    /// Merged taxonomy across all passes.
    pub categories: Vec<Category>,
    /// Promoted claims over distinct claims; 0 when there were no claims.
    pub consensus_rate: f64,
    pub total_claims: usize,
    pub passes: usize,
    pub required_passes: usize,
}

struct Claim<'a> {
    pass: usize,
    annotation: &'a Annotation,
    label: &'a str,
}

/// Smallest pass count reaching `fraction` of `passes`, never below one.
pub fn required_passes(fraction: f64, passes: usize) -> usize {
    ((fraction * passes as f64 - 1e-9).ceil() as usize).max(1)
}

fn overlap_len(a: &Annotation, b: &Annotation) -> usize {
    a.end.min(b.end).saturating_sub(a.start.max(b.start))
}

fn collect_claims(passes: &[PassResult]) -> Vec<Claim<'_>> {
    let mut claims = Vec::new();
    for (index, pass) in passes.iter().enumerate() {
        let mut own: Vec<Claim<'_>> = pass
            .annotations
            .iter()
            .filter(|a| match a.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!(pass = %pass.pass_id, error = %e, "skipping invalid annotation");
                    false
                }
            })
            .map(|a| Claim {
                pass: index,
                annotation: a,
                label: pass.label_for(a),
            })
            .collect();
        own.sort_by(|x, y| {
            (&x.annotation.document_id, x.annotation.start, x.annotation.end, x.label).cmp(&(
                &y.annotation.document_id,
                y.annotation.start,
                y.annotation.end,
                y.label,
            ))
        });
        claims.extend(own);
    }
    claims
}

/// Keep only claims reproduced by at least `min_agreement_fraction` of the
/// passes (default two thirds) and merge the passes' taxonomies.
///
/// Each promoted annotation keeps the seed claim's span and text, maps its
/// label onto the merged taxonomy, and carries `agreeing / passes` as its
/// confidence. Identical input yields identical output.
#[instrument(skip(passes), fields(passes = passes.len()))]
pub fn resolve_consensus(
    passes: &[PassResult],
    min_agreement_fraction: Option<f64>,
) -> Result<ConsensusResult, ConsensusError> {
    if passes.is_empty() {
        return Err(ConsensusError::NoPassesProvided);
    }
    let fraction = min_agreement_fraction.unwrap_or(DEFAULT_AGREEMENT_FRACTION);
    if !(fraction > 0.0 && fraction <= 1.0) {
        return Err(ConsensusError::InvalidAgreementFraction(fraction));
    }

    let required = required_passes(fraction, passes.len());
    let categories = merge_taxonomy(passes.iter().map(|p| p.categories.as_slice()));
    let claims = collect_claims(passes);
    let mut absorbed = vec![false; claims.len()];
    let mut annotations = Vec::new();
    let mut total_claims = 0usize;

    for seed_idx in 0..claims.len() {
        if absorbed[seed_idx] {
            continue;
        }
        absorbed[seed_idx] = true;
        total_claims += 1;
        let seed = &claims[seed_idx];
        let mut group = vec![seed_idx];

        for pass in (0..passes.len()).filter(|&p| p != seed.pass) {
            let best = claims
                .iter()
                .enumerate()
                .filter(|(j, c)| {
                    c.pass == pass
                        && !absorbed[*j]
                        && c.annotation.overlaps(seed.annotation)
                        && names_similar(c.label, seed.label)
                })
                .max_by(|(ja, a), (jb, b)| {
                    overlap_len(a.annotation, seed.annotation)
                        .cmp(&overlap_len(b.annotation, seed.annotation))
                        .then(jb.cmp(ja))
                });
            if let Some((j, _)) = best {
                absorbed[j] = true;
                group.push(j);
            }
        }

        let agreeing = group.len();
        if agreeing < required {
            debug!(label = seed.label, start = seed.annotation.start, agreeing, required, "claim below consensus");
            continue;
        }

        let category_id = find_by_name(&categories, seed.label)
            .map(|c| c.id.clone())
            .unwrap_or_else(|| seed.annotation.category_id.clone());
        let created_at = group
            .iter()
            .map(|&j| claims[j].annotation.created_at)
            .max()
            .unwrap_or(seed.annotation.created_at);

        let mut promoted = Annotation::new(
            &seed.annotation.document_id,
            category_id,
            seed.annotation.start,
            seed.annotation.end,
            &seed.annotation.text,
            Attribution::method(CONSENSUS_METHOD),
        )
        .with_confidence(agreeing as f64 / passes.len() as f64);
        promoted.created_at = created_at;
        annotations.push(promoted);
    }

    let consensus_rate = if total_claims == 0 {
        0.0
    } else {
        annotations.len() as f64 / total_claims as f64
    };

    info!(
        passes = passes.len(),
        required,
        total_claims,
        promoted = annotations.len(),
        categories = categories.len(),
        consensus_rate,
        "consensus resolved"
    );

    Ok(ConsensusResult {
        annotations,
        categories,
        consensus_rate,
        total_claims,
        passes: passes.len(),
        required_passes: required,
    })
}

/// [`resolve_consensus`] over bare annotation lists, labelled by category id.
pub fn resolve_annotation_sets(
    sets: &[Vec<Annotation>],
    min_agreement_fraction: Option<f64>,
) -> Result<ConsensusResult, ConsensusError> {
    let passes: Vec<PassResult> = sets
        .iter()
        .enumerate()
        .map(|(i, anns)| PassResult::new(format!("pass-{}", i + 1), anns.clone()))
        .collect();
    resolve_consensus(&passes, min_agreement_fraction)
}
