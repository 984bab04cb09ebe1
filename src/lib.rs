pub mod core;
pub mod engine;
pub mod extraction;
pub mod maths;
pub mod observability;
pub mod resilience;

pub use crate::core::{AnalysisConfig, Recording};
pub use engine::{BatchAnalyzer, RecordingSource};
pub use extraction::{analyze, AnalysisReport};
