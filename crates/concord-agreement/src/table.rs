//! Alignment of rater records onto a shared set of coding units.
//!
//! The item set is the union of every span any rater annotated. Each cell
//! holds the category one rater gave one unit, or `None` when that rater left
//! the unit uncoded.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use concord_core::{CodingUnit, RaterRecord};
use tracing::debug;

/// Category synthesised for a unit a rater did not annotate.
pub const NO_CODE: &str = "__NO_CODE__";

/// Units × raters rating matrix.
#[derive(Debug, Clone)]
pub struct RatingTable {
    pub raters: Vec<String>,
    /// Sorted union of every annotated unit.
    pub units: Vec<CodingUnit>,
    /// `ratings[unit][rater]`.
    pub ratings: Vec<Vec<Option<String>>>,
}

impl RatingTable {
    /// Build the table from rater records.
    ///
    /// When a rater annotated the same unit more than once, the first
    /// annotation in their record is kept.
    pub fn from_records(records: &[RaterRecord]) -> Self {
        let mut per_unit: BTreeMap<CodingUnit, Vec<Option<String>>> = BTreeMap::new();

        for (r, record) in records.iter().enumerate() {
            for ann in &record.annotations {
                let row = per_unit
                    .entry(ann.unit())
                    .or_insert_with(|| vec![None; records.len()]);
                match &row[r] {
                    None => row[r] = Some(ann.category_id.clone()),
                    Some(existing) if existing != &ann.category_id => {
                        debug!(
                            rater = %record.rater_id,
                            unit = %ann.unit().key(),
                            kept = %existing,
                            dropped = %ann.category_id,
                            "duplicate rating for unit, keeping first"
                        );
                    }
                    Some(_) => {}
                }
            }
        }

        let (units, ratings) = per_unit.into_iter().unzip();
        Self {
            raters: records.iter().map(|r| r.rater_id.clone()).collect(),
            units,
            ratings,
        }
    }

    pub fn rater_count(&self) -> usize {
        self.raters.len()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Every category actually used, sorted.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.ratings
            .iter()
            .flatten()
            .filter_map(|c| c.as_deref())
            .collect()
    }

    /// One rater's column with missing ratings replaced by [`NO_CODE`].
    pub fn column_or_no_code(&self, rater: usize) -> Vec<&str> {
        self.ratings
            .iter()
            .map(|row| row[rater].as_deref().unwrap_or(NO_CODE))
            .collect()
    }
}

/// Order categories for index-based distances.
///
/// Categories named in `preferred` come first in that order, the rest follow
/// lexicographically, and [`NO_CODE`] is always last.
pub fn order_categories<'a>(
    used: impl IntoIterator<Item = &'a str>,
    preferred: Option<&[String]>,
) -> Vec<String> {
    let used: BTreeSet<&str> = used.into_iter().collect();
    let mut ordered: Vec<String> = Vec::with_capacity(used.len());

    if let Some(preferred) = preferred {
        for name in preferred {
            if name != NO_CODE && used.contains(name.as_str()) && !ordered.contains(name) {
                ordered.push(name.clone());
            }
        }
    }
    for name in &used {
        if *name != NO_CODE && !ordered.iter().any(|o| o == name) {
            ordered.push(name.to_string());
        }
    }
    if used.contains(NO_CODE) && !ordered.iter().any(|o| o == NO_CODE) {
        ordered.push(NO_CODE.to_string());
    }
    ordered
}

/// Position of each category in `ordered`.
pub fn index_of(ordered: &[String]) -> HashMap<&str, usize> {
    ordered
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect()
}
