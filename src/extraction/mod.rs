pub mod metrics;
pub mod phases;

pub use metrics::{analyze, AnalysisReport, Metric, MetricMap};
pub use phases::{
    detect_jump, detect_squat, extract_phases, JumpPhases, PhaseEvent, PhaseIndices, SquatPhases,
};
