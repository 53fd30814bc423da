pub mod config;
pub mod error;
pub mod model;
pub mod schema;
pub mod unit;

pub use config::EngineConfig;
pub use error::CoreError;
pub use model::{Annotation, Attribution, Category, Document, RaterRecord};
pub use schema::{annotations_to_batch, export};
pub use unit::{CodingUnit, spans_overlap, unit_key};
