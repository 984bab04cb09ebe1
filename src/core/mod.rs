pub mod channel;
pub mod config;
pub mod recording;
pub mod series;

pub use channel::{Axis, ChannelTag, DerivedKind, Measurement, Segment, FRAME_COLUMN};
pub use config::{AnalysisConfig, PhaseThresholds};
pub use recording::Recording;
pub use series::Series;
