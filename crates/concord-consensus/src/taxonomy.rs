//! Merge the category sets proposed by independent passes.

use std::collections::HashSet;

use concord_core::Category;

use crate::normalize::normalize_name;

/// Union of all categories, deduplicated by normalised name.
///
/// The first definition seen wins: passes are walked in order and categories
/// within a pass in order. Categories whose name normalises to nothing are
/// dropped.
pub fn merge_taxonomy<'a, I>(sets: I) -> Vec<Category>
where
    I: IntoIterator<Item = &'a [Category]>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();
    for set in sets {
        for category in set {
            let key = normalize_name(&category.name);
            if key.is_empty() || !seen.insert(key) {
                continue;
            }
            merged.push(category.clone());
        }
    }
    merged
}

/// Look up a category by normalised name.
pub fn find_by_name<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
    let key = normalize_name(name);
    categories.iter().find(|c| normalize_name(&c.name) == key)
}
