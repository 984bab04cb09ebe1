use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use super::RecordingSource;
use crate::core::AnalysisConfig;
use crate::extraction::{analyze, AnalysisReport};
use crate::observability::{BatchMonitor, MetricsCollector, StageMetrics};
use crate::resilience::ErrorPolicy;

pub const LOAD_STAGE: &str = "load";
pub const ANALYZE_STAGE: &str = "analyze";

/// Result for one recording of a batch
#[derive(Debug, Clone, Serialize)]
pub struct RecordingOutcome {
    pub id: String,
    pub report: AnalysisReport,
    /// Set when the recording failed and the policy kept a placeholder report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecordingOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Wait for an analysis task and count its outcome, panics included
async fn settle_analysis(
    metrics: &StageMetrics,
    start: Instant,
    task: JoinHandle<Result<AnalysisReport>>,
) -> Result<AnalysisReport> {
    let analyzed = match task.await {
        Ok(result) => result,
        Err(e) => Err(anyhow::Error::new(e).context("Analysis task panicked")),
    };
    metrics.finish_processing(start);

    match analyzed {
        Ok(report) => {
            metrics.record_processed();
            if !report.phases.is_squat_valid() || !report.phases.is_jump_valid() {
                metrics.record_incomplete();
            }
            Ok(report)
        }
        Err(e) => {
            metrics.record_error();
            Err(e)
        }
    }
}

/// Analyzes many recordings concurrently, at most `max_concurrent` at a time
pub struct BatchAnalyzer {
    config: Arc<AnalysisConfig>,
    policy: ErrorPolicy,
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
    load_metrics: Arc<StageMetrics>,
    analyze_metrics: Arc<StageMetrics>,
    collector: MetricsCollector,
}

impl BatchAnalyzer {
    pub fn new(config: AnalysisConfig, max_concurrent: usize) -> Result<Self> {
        config.validate()?;
        if max_concurrent == 0 {
            anyhow::bail!("Batch concurrency must be at least 1");
        }

        let load_metrics = Arc::new(StageMetrics::new(LOAD_STAGE));
        let analyze_metrics = Arc::new(StageMetrics::new(ANALYZE_STAGE));

        let mut collector = MetricsCollector::new();
        collector.register(load_metrics.clone());
        collector.register(analyze_metrics.clone());

        Ok(Self {
            config: Arc::new(config),
            policy: ErrorPolicy::default(),
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            load_metrics,
            analyze_metrics,
            collector,
        })
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Load and analyze one recording on its own task
    pub fn execute(&self, source: Arc<dyn RecordingSource>) -> JoinHandle<Result<AnalysisReport>> {
        let config = self.config.clone();
        let semaphore = self.semaphore.clone();
        let load_metrics = self.load_metrics.clone();
        let analyze_metrics = self.analyze_metrics.clone();

        tokio::spawn(async move {
            // Held until the analysis finishes
            let _permit = semaphore
                .acquire()
                .await
                .context("Batch semaphore closed")?;

            let start = load_metrics.start_processing();
            let loaded = source.load().await;
            load_metrics.finish_processing(start);

            let recording = match loaded {
                Ok(recording) => {
                    load_metrics.record_processed();
                    recording.with_derivative_window(config.derivative_window)
                }
                Err(e) => {
                    load_metrics.record_error();
                    return Err(e.context(format!("Failed to load recording '{}'", source.id())));
                }
            };

            let start = analyze_metrics.start_processing();
            let task_config = config.clone();
            let task = tokio::task::spawn_blocking(move || analyze(&recording, &task_config));

            settle_analysis(&analyze_metrics, start, task)
                .await
                .with_context(|| format!("Failed to analyze recording '{}'", source.id()))
        })
    }

    /// Analyze every source, returning outcomes in input order.
    ///
    /// A failed recording is handled by the batch's `ErrorPolicy`.
    pub async fn run_all(
        &self,
        sources: Vec<Arc<dyn RecordingSource>>,
    ) -> Result<Vec<RecordingOutcome>> {
        let total = sources.len();
        let mut pending = sources
            .into_iter()
            .map(|source| (source.id().to_string(), self.execute(source)))
            .collect::<Vec<_>>()
            .into_iter();

        let mut outcomes = Vec::with_capacity(total);
        let mut failed = 0usize;

        while let Some((id, handle)) = pending.next() {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(anyhow::Error::new(e).context(format!("Task for '{}' failed", id))),
            };

            match result {
                Ok(report) => outcomes.push(RecordingOutcome {
                    id,
                    report,
                    error: None,
                }),
                Err(err) => {
                    failed += 1;
                    warn!("Recording '{}' failed: {:#}", id, err);

                    match self.policy {
                        ErrorPolicy::Propagate => {
                            for (_, handle) in pending.by_ref() {
                                handle.abort();
                            }
                            return Err(err);
                        }
                        ErrorPolicy::Skip => {}
                        ErrorPolicy::ReportNotComputable => outcomes.push(RecordingOutcome {
                            id,
                            report: AnalysisReport::not_computable(),
                            error: Some(format!("{:#}", err)),
                        }),
                    }
                }
            }
        }

        info!(
            "Batch finished: {} recordings, {} failed, {} reported",
            total,
            failed,
            outcomes.len()
        );

        Ok(outcomes)
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn metrics_collector(&self) -> &MetricsCollector {
        &self.collector
    }

    pub fn monitor(&self) -> BatchMonitor {
        BatchMonitor::new(self.collector.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_panicked_analysis_counts_as_error() {
        let metrics = StageMetrics::new(ANALYZE_STAGE);
        let task = tokio::task::spawn_blocking(|| -> Result<AnalysisReport> {
            panic!("analysis blew up")
        });

        let err = settle_analysis(&metrics, metrics.start_processing(), task)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("panicked"));
        assert_eq!(metrics.errors_count(), 1);
        assert_eq!(metrics.recordings_processed(), 0);
    }

    #[tokio::test]
    async fn test_incomplete_phases_counted() {
        let metrics = StageMetrics::new(ANALYZE_STAGE);
        let task = tokio::task::spawn_blocking(|| -> Result<AnalysisReport> {
            Ok(AnalysisReport::not_computable())
        });

        settle_analysis(&metrics, metrics.start_processing(), task)
            .await
            .unwrap();

        assert_eq!(metrics.recordings_processed(), 1);
        assert_eq!(metrics.incomplete_count(), 1);
        assert_eq!(metrics.errors_count(), 0);
    }
}
