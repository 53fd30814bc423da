//! Shared coding types: categories, annotations, documents, and rater records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::unit::CodingUnit;

const DEFAULT_COLOR: &str = "#9e9e9e";

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// A coding category (a "code").
///
/// Categories form a forest through `parent_id`. Acyclicity is enforced by
/// the persistence layer when a category is written, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Display colour, `#rrggbb`.
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            color: default_color(),
            parent_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Name and description joined, the text a category's pattern is built from.
    pub fn pattern_text(&self) -> String {
        match &self.description {
            Some(d) if !d.trim().is_empty() => format!("{} {}", self.name, d),
            _ => self.name.clone(),
        }
    }
}

/// Who (or what) produced an annotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Attribution {
    /// A human coder, by user identifier.
    Human(String),
    /// A named automated method, e.g. `pattern-matcher` or `consensus`.
    Method(String),
}

impl Attribution {
    pub fn human(id: impl Into<String>) -> Self {
        Self::Human(id.into())
    }

    pub fn method(name: impl Into<String>) -> Self {
        Self::Method(name.into())
    }
}

impl fmt::Display for Attribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Human(id) => write!(f, "human:{id}"),
            Self::Method(name) => write!(f, "method:{name}"),
        }
    }
}

/// A category applied to a half-open character span `[start, end)` of a document.
///
/// Offsets count Unicode scalar values, not bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub document_id: String,
    pub category_id: String,
    pub start: usize,
    pub end: usize,
    /// Literal text of the span, denormalised for display and similarity.
    pub text: String,
    pub attribution: Attribution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Annotation {
    pub fn new(
        document_id: impl Into<String>,
        category_id: impl Into<String>,
        start: usize,
        end: usize,
        text: impl Into<String>,
        attribution: Attribution,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            category_id: category_id.into(),
            start,
            end,
            text: text.into(),
            attribution,
            confidence: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Check `start < end` and that any confidence lies in `[0, 1]`.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.start >= self.end {
            return Err(CoreError::InvalidSpan {
                start: self.start,
                end: self.end,
            });
        }
        if let Some(c) = self.confidence
            && !(0.0..=1.0).contains(&c)
        {
            return Err(CoreError::InvalidConfidence(c));
        }
        Ok(())
    }

    pub fn unit(&self) -> CodingUnit {
        CodingUnit::new(&self.document_id, self.start, self.end)
    }

    /// Half-open interval intersection within the same document.
    pub fn overlaps(&self, other: &Annotation) -> bool {
        self.unit().overlaps(&other.unit())
    }
}

/// Source material being coded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// Every annotation one rater produced for the material under comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaterRecord {
    pub rater_id: String,
    pub annotations: Vec<Annotation>,
}

impl RaterRecord {
    pub fn new(rater_id: impl Into<String>, annotations: Vec<Annotation>) -> Self {
        Self {
            rater_id: rater_id.into(),
            annotations,
        }
    }
}
