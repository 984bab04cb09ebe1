use std::collections::BTreeMap;
use std::sync::Arc;
use super::StageMetrics;

#[derive(Debug, Clone)]
pub struct StageSnapshot {
    pub stage: String,
    pub recordings_processed: u64,
    pub errors_count: u64,
    pub incomplete_count: u64,
    pub avg_latency_us: u64,
}

#[derive(Clone, Default)]
pub struct MetricsCollector {
    metrics: BTreeMap<String, Arc<StageMetrics>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, metrics: Arc<StageMetrics>) {
        self.metrics.insert(metrics.stage().to_string(), metrics);
    }

    pub fn snapshot(&self) -> BTreeMap<String, StageSnapshot> {
        self.metrics
            .iter()
            .map(|(stage, metrics)| {
                (
                    stage.clone(),
                    StageSnapshot {
                        stage: metrics.stage().to_string(),
                        recordings_processed: metrics.recordings_processed(),
                        errors_count: metrics.errors_count(),
                        incomplete_count: metrics.incomplete_count(),
                        avg_latency_us: metrics.avg_latency_us(),
                    },
                )
            })
            .collect()
    }

    pub fn get_stage_metrics(&self, stage: &str) -> Option<Arc<StageMetrics>> {
        self.metrics.get(stage).cloned()
    }
}
