//! Pattern similarity matching: proposes categories for text segments by
//! comparing TF-IDF keyword profiles, without a second human pass.

pub mod keywords;
pub mod matcher;
pub mod pattern;
pub mod segment;
pub mod vector;

pub use keywords::extract_keywords;
pub use matcher::{
    CategoryCandidate, CategoryProposer, CodingResult, MatchStatus, MatcherOptions, NoProposer,
    PATTERN_METHOD, PROPOSER_METHOD, SegmentMatch, auto_code, match_patterns,
};
pub use pattern::{CategoryPattern, PatternSummary, build_patterns};
pub use segment::{Segment, segment_document};
pub use vector::{SegmentFrequencies, TermVector};
