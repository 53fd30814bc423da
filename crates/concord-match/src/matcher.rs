//! Similarity-based category proposals for uncoded text.
//!
//! Segments a document, weights each segment and each category pattern by
//! TF-IDF over the document's own segments, and ranks categories per segment
//! by cosine similarity. The best candidate becomes a proposed annotation
//! when it clears the confidence threshold.

use concord_core::{Annotation, Attribution, Category, Document, EngineConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::keywords::extract_keywords;
use crate::pattern::{CategoryPattern, build_patterns, summarize};
use crate::segment::{Segment, segment_with_min};
use crate::vector::{SegmentFrequencies, TermVector};

/// Attribution method name for matcher-produced annotations.
pub const PATTERN_METHOD: &str = "pattern-matcher";

/// Attribution method name for annotations that use a proposed category.
pub const PROPOSER_METHOD: &str = "category-proposer";

/// Thresholds for matching. Defaults mirror [`EngineConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherOptions {
    pub min_confidence: f64,
    pub similarity_floor: f64,
    pub max_candidates: usize,
    pub min_segment_chars: usize,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for MatcherOptions {
    fn from(config: &EngineConfig) -> Self {
        Self {
            min_confidence: config.min_confidence,
            similarity_floor: config.similarity_floor,
            max_candidates: config.max_candidates,
            min_segment_chars: config.min_segment_chars,
        }
    }
}

/// A ranked category for one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCandidate {
    pub category_id: String,
    pub category_name: String,
    pub similarity: f64,
}

/// How a segment fared against the confidence threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStatus {
    /// Best candidate clears the threshold.
    Matched,
    /// Candidates exist but none clears the threshold.
    BelowThreshold,
    /// No category reached the similarity floor.
    NoCandidates,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::BelowThreshold => "below-threshold",
            Self::NoCandidates => "no-candidates",
        }
    }
}

/// A segment with its ranked candidates, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentMatch {
    pub segment: Segment,
    pub candidates: Vec<CategoryCandidate>,
}

impl SegmentMatch {
    pub fn best(&self) -> Option<&CategoryCandidate> {
        self.candidates.first()
    }

    pub fn status(&self, min_confidence: f64) -> MatchStatus {
        match self.best() {
            None => MatchStatus::NoCandidates,
            Some(c) if c.similarity >= min_confidence => MatchStatus::Matched,
            Some(_) => MatchStatus::BelowThreshold,
        }
    }
}

/// External capability that may invent a category for an unmatched segment.
pub trait CategoryProposer {
    fn propose_category(&self, segment: &Segment) -> Option<Category>;
}

/// Proposes nothing; every unmatched segment stays unmatched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProposer;

impl CategoryProposer for NoProposer {
    fn propose_category(&self, _segment: &Segment) -> Option<Category> {
        None
    }
}

/// Output of [`auto_code`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodingResult {
    pub annotations: Vec<Annotation>,
    /// Categories created by the proposer for unmatched segments.
    pub new_categories: Vec<Category>,
    /// Segments whose best candidate fell below the threshold.
    pub unmatched: Vec<Segment>,
    pub matches: Vec<SegmentMatch>,
}

/// Rank categories for every segment of `document`.
///
/// Returns an empty list for an empty document or an empty category list.
/// `categories` is not modified.
#[instrument(skip(document, categories, options), fields(document = %document.id))]
pub fn match_patterns(
    document: &Document,
    categories: &[Category],
    options: &MatcherOptions,
) -> Vec<SegmentMatch> {
    let segments = segment_with_min(&document.content, options.min_segment_chars);
    if segments.is_empty() || categories.is_empty() {
        debug!(
            segments = segments.len(),
            categories = categories.len(),
            "nothing to match"
        );
        return Vec::new();
    }

    let segment_keywords: Vec<Vec<String>> =
        segments.iter().map(|s| extract_keywords(&s.text)).collect();
    let freqs = SegmentFrequencies::from_segments(&segment_keywords);

    let patterns = build_patterns(categories);
    let summary = summarize(&patterns);
    debug!(
        patterns = summary.total,
        with_keywords = summary.with_keywords,
        distinct_keywords = summary.distinct_keywords,
        "built category patterns"
    );
    let pattern_vectors: Vec<(&CategoryPattern, TermVector)> = patterns
        .iter()
        .map(|p| (p, freqs.weigh(&p.keywords)))
        .collect();

    let matches: Vec<SegmentMatch> = segments
        .into_iter()
        .zip(&segment_keywords)
        .map(|(segment, keywords)| {
            let vector = freqs.weigh(keywords);
            let candidates = rank(&vector, &pattern_vectors, options);
            SegmentMatch {
                segment,
                candidates,
            }
        })
        .collect();

    debug!(
        segments = matches.len(),
        patterns = pattern_vectors.len(),
        with_candidates = matches.iter().filter(|m| !m.candidates.is_empty()).count(),
        "segments ranked"
    );
    matches
}

/// Candidates at or above the floor, sorted by descending similarity and truncated.
fn rank(
    vector: &TermVector,
    patterns: &[(&CategoryPattern, TermVector)],
    options: &MatcherOptions,
) -> Vec<CategoryCandidate> {
    let mut candidates: Vec<CategoryCandidate> = patterns
        .iter()
        .filter_map(|(pattern, pv)| {
            let sim = vector.cosine(pv);
            if sim > 0.0 && sim >= options.similarity_floor {
                Some(CategoryCandidate {
                    category_id: pattern.category_id.clone(),
                    category_name: pattern.name.clone(),
                    similarity: sim,
                })
            } else {
                None
            }
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category_name.cmp(&b.category_name))
    });
    candidates.truncate(options.max_candidates);
    candidates
}

/// Match a document and turn confident matches into annotations.
///
/// Segments below `min_confidence` are reported as unmatched and offered to
/// `proposer`; any category it returns is added to `new_categories` and used
/// to annotate that segment.
#[instrument(skip_all, fields(document = %document.id))]
pub fn auto_code(
    document: &Document,
    categories: &[Category],
    options: &MatcherOptions,
    proposer: &dyn CategoryProposer,
) -> CodingResult {
    let matches: Vec<SegmentMatch> = if categories.is_empty() {
        segment_with_min(&document.content, options.min_segment_chars)
            .into_iter()
            .map(|segment| SegmentMatch {
                segment,
                candidates: Vec::new(),
            })
            .collect()
    } else {
        match_patterns(document, categories, options)
    };

    let mut result = CodingResult::default();
    for m in &matches {
        if m.status(options.min_confidence) == MatchStatus::Matched
            && let Some(best) = m.best()
        {
            result.annotations.push(
                Annotation::new(
                    &document.id,
                    &best.category_id,
                    m.segment.start,
                    m.segment.end,
                    &m.segment.text,
                    Attribution::method(PATTERN_METHOD),
                )
                .with_confidence(best.similarity.clamp(0.0, 1.0)),
            );
            continue;
        }

        result.unmatched.push(m.segment.clone());
        if let Some(category) = proposer.propose_category(&m.segment) {
            result.annotations.push(Annotation::new(
                &document.id,
                &category.id,
                m.segment.start,
                m.segment.end,
                &m.segment.text,
                Attribution::method(PROPOSER_METHOD),
            ));
            if !result.new_categories.iter().any(|c| c.id == category.id) {
                result.new_categories.push(category);
            }
        }
    }

    info!(
        segments = matches.len(),
        annotations = result.annotations.len(),
        unmatched = result.unmatched.len(),
        new_categories = result.new_categories.len(),
        "document auto-coded"
    );
    result.matches = matches;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<Category> {
        vec![
            Category::new("money", "Financial motivation")
                .with_description("salary, pay and money as a reason to work"),
            Category::new("team", "Team belonging")
                .with_description("colleagues, close friends and friendship"),
            Category::new("fatigue", "Burnout").with_description("exhaustion and stress"),
        ]
    }

    fn interview() -> Document {
        Document::new(
            "interview-1",
            "Honestly the salary was the main reason I applied.\n\n\
             My colleagues became close friends over the years. \
             The exhaustion and stress of night shifts wore me down. \
             We moved offices twice last spring.",
        )
    }

    #[test]
    fn ranks_expected_category_first() {
        let matches = match_patterns(&interview(), &categories(), &MatcherOptions::default());
        assert_eq!(matches.len(), 4);
        assert_eq!(matches[0].best().unwrap().category_id, "money");
        assert_eq!(matches[1].best().unwrap().category_id, "team");
        assert_eq!(matches[2].best().unwrap().category_id, "fatigue");
    }

    #[test]
    fn non_matching_category_is_absent_not_last() {
        let matches = match_patterns(&interview(), &categories(), &MatcherOptions::default());
        // "We moved offices twice last spring." shares no keyword with any category.
        let offices = &matches[3];
        assert!(offices.candidates.is_empty());
        assert_eq!(offices.status(0.3), MatchStatus::NoCandidates);
        // The salary sentence has no burnout keyword.
        assert!(matches[0].candidates.iter().all(|c| c.category_id != "fatigue"));
    }

    #[test]
    fn candidates_sorted_and_truncated() {
        let options = MatcherOptions {
            max_candidates: 1,
            ..MatcherOptions::default()
        };
        let matches = match_patterns(&interview(), &categories(), &options);
        assert!(matches.iter().all(|m| m.candidates.len() <= 1));

        let all = match_patterns(&interview(), &categories(), &MatcherOptions::default());
        for m in &all {
            assert!(m.candidates.len() <= 3);
            for pair in m.candidates.windows(2) {
                assert!(pair[0].similarity >= pair[1].similarity);
            }
            assert!(m.candidates.iter().all(|c| c.similarity >= 0.1));
        }
    }

    #[test]
    fn empty_inputs_return_empty() {
        let empty_doc = Document::new("d", "");
        assert!(match_patterns(&empty_doc, &categories(), &MatcherOptions::default()).is_empty());
        assert!(match_patterns(&interview(), &[], &MatcherOptions::default()).is_empty());
    }

    #[test]
    fn categories_are_not_modified() {
        let cats = categories();
        let before = cats.clone();
        let _ = match_patterns(&interview(), &cats, &MatcherOptions::default());
        assert_eq!(cats, before);
    }

    #[test]
    fn auto_code_applies_threshold() {
        let result = auto_code(&interview(), &categories(), &MatcherOptions::default(), &NoProposer);
        assert_eq!(result.annotations.len(), 3);
        assert_eq!(result.unmatched.len(), 1);
        let first = &result.annotations[0];
        assert_eq!(first.category_id, "money");
        assert_eq!(first.attribution, Attribution::method(PATTERN_METHOD));
        assert!(first.confidence.unwrap() >= 0.3);
        assert!(first.validate().is_ok());
    }

    #[test]
    fn high_threshold_leaves_everything_unmatched() {
        let options = MatcherOptions {
            min_confidence: 1.01,
            ..MatcherOptions::default()
        };
        let result = auto_code(&interview(), &categories(), &options, &NoProposer);
        assert!(result.annotations.is_empty());
        assert_eq!(result.unmatched.len(), 4);
    }

    struct FixedProposer;

    impl CategoryProposer for FixedProposer {
        fn propose_category(&self, segment: &Segment) -> Option<Category> {
            segment
                .text
                .contains("offices")
                .then(|| Category::new("workplace", "Workplace change"))
        }
    }

    #[test]
    fn proposer_fills_unmatched_segments() {
        let result = auto_code(&interview(), &categories(), &MatcherOptions::default(), &FixedProposer);
        assert_eq!(result.new_categories.len(), 1);
        assert_eq!(result.new_categories[0].id, "workplace");
        let proposed = result
            .annotations
            .iter()
            .find(|a| a.category_id == "workplace")
            .unwrap();
        assert_eq!(proposed.attribution, Attribution::method(PROPOSER_METHOD));
        assert!(proposed.confidence.is_none());
    }

    #[test]
    fn no_categories_sends_every_segment_to_proposer() {
        let result = auto_code(&interview(), &[], &MatcherOptions::default(), &FixedProposer);
        assert_eq!(result.unmatched.len(), 4);
        assert_eq!(result.annotations.len(), 1);
    }

    #[test]
    fn options_follow_engine_config() {
        let config = EngineConfig {
            min_confidence: 0.45,
            ..EngineConfig::default()
        };
        let options = MatcherOptions::from(&config);
        assert!((options.min_confidence - 0.45).abs() < f64::EPSILON);
        assert_eq!(options.max_candidates, 3);
    }

    #[test]
    fn default_options_match_default_config() {
        let options = MatcherOptions::default();
        assert_eq!(options, MatcherOptions::from(&EngineConfig::default()));
        assert_eq!(options.min_segment_chars, EngineConfig::default().min_segment_chars);
    }

    #[test]
    fn segment_match_json_round_trip() {
        let matches = match_patterns(&interview(), &categories(), &MatcherOptions::default());
        let json = serde_json::to_string(&matches[0]).unwrap();
        let back: SegmentMatch = serde_json::from_str(&json).unwrap();
        assert_eq!(back.segment, matches[0].segment);
        assert_eq!(back.best().unwrap().category_id, "money");
        assert!((back.best().unwrap().similarity - matches[0].best().unwrap().similarity).abs() < 1e-12);
        assert_eq!(serde_json::to_string(&MatchStatus::BelowThreshold).unwrap(), "\"below-threshold\"");
    }
}
