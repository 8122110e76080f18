//! Retrieval-augmented generation pipeline
//!
//! Ties together city/intent detection, live-data retrieval, context
//! assembly, and bounded autoregressive sampling.

pub mod context;
pub mod engine;
pub mod intent;
pub mod pipeline;
pub mod report;

pub use context::{BuiltContext, ContextBuilder, LiveSnapshot};
pub use engine::{EngineConfig, GenerationEngine, Generator};
pub use intent::QueryIntent;
pub use pipeline::{Answer, LiveData, PredictResponse, RagPipeline};
