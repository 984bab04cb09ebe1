use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use jumpkit::core::{AnalysisConfig, Recording};
use jumpkit::engine::{BatchAnalyzer, RecordingSource, SyntheticJump, ANALYZE_STAGE, LOAD_STAGE};
use jumpkit::observability::{BatchMonitor, MetricsCollector, StageMetrics};

struct MissingFile;

#[async_trait]
impl RecordingSource for MissingFile {
    fn id(&self) -> &str {
        "missing"
    }

    async fn load(&self) -> Result<Recording> {
        anyhow::bail!("no such file")
    }
}

#[test]
fn test_stage_metrics_counters() {
    let metrics = StageMetrics::new("load");

    metrics.record_processed();
    metrics.record_processed();
    metrics.record_error();
    metrics.record_incomplete();

    assert_eq!(metrics.stage(), "load");
    assert_eq!(metrics.recordings_processed(), 2);
    assert_eq!(metrics.errors_count(), 1);
    assert_eq!(metrics.incomplete_count(), 1);
}

#[test]
fn test_latency_average() {
    let metrics = StageMetrics::new("analyze");
    assert_eq!(metrics.avg_latency_us(), 0);

    let start = metrics.start_processing();
    std::thread::sleep(std::time::Duration::from_millis(2));
    metrics.finish_processing(start);

    assert!(metrics.avg_latency_us() >= 2000);
}

#[test]
fn test_monitor_report() {
    let mut collector = MetricsCollector::new();

    let load = Arc::new(StageMetrics::new("load"));
    let analyze = Arc::new(StageMetrics::new("analyze"));

    load.record_processed();
    load.record_processed();
    load.record_error();
    analyze.record_processed();
    analyze.record_incomplete();

    collector.register(load);
    collector.register(analyze);

    let report = BatchMonitor::new(collector).generate_report();

    assert!(report.contains("[load]"));
    assert!(report.contains("[analyze]"));
    assert!(report.contains("2 processed"));
    assert!(report.contains("1 error"));
    assert!(report.contains("Incomplete phases: 1 recording"));
}

#[test]
fn test_empty_monitor() {
    let report = BatchMonitor::new(MetricsCollector::new()).generate_report();
    assert_eq!(report, "No stages registered");
}

#[tokio::test]
async fn test_batch_records_stage_metrics() {
    let analyzer = BatchAnalyzer::new(AnalysisConfig::default(), 2).unwrap();
    let sources: Vec<Arc<dyn RecordingSource>> = vec![
        Arc::new(SyntheticJump::new("jump")),
        Arc::new(SyntheticJump::standing("still")),
        Arc::new(MissingFile),
    ];
    analyzer.run_all(sources).await.unwrap();

    let snapshot = analyzer.metrics_collector().snapshot();

    let load = &snapshot[LOAD_STAGE];
    assert_eq!(load.recordings_processed, 2);
    assert_eq!(load.errors_count, 1);

    let analyze = &snapshot[ANALYZE_STAGE];
    assert_eq!(analyze.recordings_processed, 2);
    assert_eq!(analyze.errors_count, 0);
    // The standing subject never squats
    assert_eq!(analyze.incomplete_count, 1);

    assert!(analyzer.monitor().generate_report().contains("=== Batch Metrics ==="));
}
