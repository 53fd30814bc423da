//! Consensus across independent coding passes: align overlapping claims,
//! keep those enough passes reproduce, and merge the passes' taxonomies.

mod error;
pub mod normalize;
pub mod pass;
pub mod resolver;
pub mod taxonomy;

#[cfg(feature = "http")]
pub mod http;

pub use error::ConsensusError;
pub use normalize::{names_similar, normalize_name};
pub use pass::{PassProducer, PatternPass, Persona, default_personas, run_passes};
pub use resolver::{
    CONSENSUS_METHOD, ConsensusResult, DEFAULT_AGREEMENT_FRACTION, PassResult, required_passes,
    resolve_annotation_sets, resolve_consensus,
};
pub use taxonomy::merge_taxonomy;

#[cfg(feature = "http")]
pub use http::RemotePassSource;
