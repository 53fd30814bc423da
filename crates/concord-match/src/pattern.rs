//! Keyword patterns derived from category definitions.
//!
//! A pattern is a category's name and description reduced to keywords. It is
//! never persisted; it is rebuilt for every document being matched and
//! weighted against that document's segments.

use std::collections::HashSet;

use concord_core::Category;

use crate::keywords::extract_keywords;

/// Keyword profile for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPattern {
    pub category_id: String,
    pub name: String,
    pub keywords: Vec<String>,
}

impl CategoryPattern {
    pub fn from_category(category: &Category) -> Self {
        Self {
            category_id: category.id.clone(),
            name: category.name.clone(),
            keywords: extract_keywords(&category.pattern_text()),
        }
    }
}

/// Summary statistics for a pattern set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSummary {
    pub total: usize,
    pub with_keywords: usize,
    pub distinct_keywords: usize,
}

/// One pattern per category, in input order.
pub fn build_patterns(categories: &[Category]) -> Vec<CategoryPattern> {
    categories.iter().map(CategoryPattern::from_category).collect()
}

pub fn summarize(patterns: &[CategoryPattern]) -> PatternSummary {
    let distinct: HashSet<&str> = patterns
        .iter()
        .flat_map(|p| p.keywords.iter().map(String::as_str))
        .collect();
    PatternSummary {
        total: patterns.len(),
        with_keywords: patterns.iter().filter(|p| !p.keywords.is_empty()).count(),
        distinct_keywords: distinct.len(),
    }
}
