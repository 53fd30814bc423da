//! Personas and the producers that turn them into coding passes.
//!
//! Producing passes is the caller's business: a producer may run the local
//! pattern matcher, call a remote service, or replay stored results. The
//! resolver only ever sees the finished [`PassResult`]s.

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use concord_core::{Attribution, Category, Document};
use concord_match::{MatcherOptions, NoProposer, PATTERN_METHOD, auto_code};

use crate::error::ConsensusError;
use crate::normalize::normalize_name;
use crate::resolver::PassResult;

/// A coding stance: how strict a pass is and which categories it considers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Overrides the matcher's confidence threshold when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_confidence: Option<f64>,
    /// Category ids or names this persona codes with. Empty means all.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

impl Persona {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            min_confidence: None,
            categories: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = Some(min_confidence);
        self
    }

    pub fn restricted_to(mut self, categories: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `category` is within this persona's scope.
    pub fn covers(&self, category: &Category) -> bool {
        self.categories.is_empty()
            || self.categories.iter().any(|c| {
                *c == category.id || normalize_name(c) == normalize_name(&category.name)
            })
    }
}

/// Three stances at increasing permissiveness.
pub fn default_personas() -> Vec<Persona> {
    vec![
        Persona::new("conservative")
            .with_description("codes only clear, explicit statements")
            .with_min_confidence(0.45),
        Persona::new("balanced").with_description("default matcher thresholds"),
        Persona::new("exploratory")
            .with_description("accepts weaker thematic evidence")
            .with_min_confidence(0.2),
    ]
}

/// Produces one coding pass of a document for a persona.
#[async_trait]
pub trait PassProducer: Send + Sync {
    async fn produce(
        &self,
        document: &Document,
        categories: &[Category],
        persona: &Persona,
    ) -> Result<PassResult, ConsensusError>;
}

/// Runs the local pattern matcher with persona-specific thresholds.
#[derive(Debug, Clone, Default)]
pub struct PatternPass {
    options: MatcherOptions,
}

impl PatternPass {
    pub fn new(options: MatcherOptions) -> Self {
        Self { options }
    }

    pub fn options_for(&self, persona: &Persona) -> MatcherOptions {
        let mut options = self.options.clone();
        if let Some(min) = persona.min_confidence {
            options.min_confidence = min;
        }
        options
    }
}

#[async_trait]
impl PassProducer for PatternPass {
    #[instrument(skip_all, fields(persona = %persona.name, document = %document.id))]
    async fn produce(
        &self,
        document: &Document,
        categories: &[Category],
        persona: &Persona,
    ) -> Result<PassResult, ConsensusError> {
        let scoped: Vec<Category> = categories.iter().filter(|c| persona.covers(c)).cloned().collect();
        let coded = auto_code(document, &scoped, &self.options_for(persona), &NoProposer);
        let method = format!("{PATTERN_METHOD}/{}", persona.name);
        let annotations = coded
            .annotations
            .into_iter()
            .map(|mut a| {
                a.attribution = Attribution::method(method.clone());
                a
            })
            .collect::<Vec<_>>();
        debug!(annotations = annotations.len(), categories = scoped.len(), "pattern pass done");
        Ok(PassResult::new(&persona.name, annotations).with_categories(scoped))
    }
}

/// Run one pass per persona concurrently; fails on the first producer error.
///
/// Results come back in persona order.
pub async fn run_passes(
    producer: &dyn PassProducer,
    document: &Document,
    categories: &[Category],
    personas: &[Persona],
) -> Result<Vec<PassResult>, ConsensusError> {
    let runs = personas
        .iter()
        .map(|persona| producer.produce(document, categories, persona));
    let passes = join_all(runs).await.into_iter().collect::<Result<Vec<_>, _>>()?;
    info!(document = %document.id, passes = passes.len(), "coding passes complete");
    Ok(passes)
}
