pub mod batch;
pub mod source;
pub mod synthetic;

pub use batch::{BatchAnalyzer, RecordingOutcome, ANALYZE_STAGE, LOAD_STAGE};
pub use source::{ColumnFile, InMemorySource, RecordingSource};
pub use synthetic::SyntheticJump;
