use serde::{Deserialize, Serialize};

/// What a batch does with a recording that failed to load or analyze
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorPolicy {
    /// Abort the batch with the recording's error
    Propagate,

    /// Leave the recording out of the results
    Skip,

    /// Keep an entry whose metrics and events are all not computable
    #[default]
    ReportNotComputable,
}
