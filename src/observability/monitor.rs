use super::MetricsCollector;

/// Human-readable summary of a batch run
pub struct BatchMonitor {
    collector: MetricsCollector,
}

fn count(n: u64, noun: &str) -> String {
    format!("{} {}{}", n, noun, if n == 1 { "" } else { "s" })
}

impl BatchMonitor {
    pub fn new(collector: MetricsCollector) -> Self {
        Self { collector }
    }

    pub fn generate_report(&self) -> String {
        let snapshot = self.collector.snapshot();

        if snapshot.is_empty() {
            return "No stages registered".to_string();
        }

        let mut report = String::from("=== Batch Metrics ===\n");

        for (stage, metrics) in snapshot.iter() {
            report.push_str(&format!(
                "\n[{}]\n  Recordings: {} processed\n  Errors: {}\n",
                stage,
                metrics.recordings_processed,
                count(metrics.errors_count, "error"),
            ));
            if metrics.incomplete_count > 0 {
                report.push_str(&format!(
                    "  Incomplete phases: {}\n",
                    count(metrics.incomplete_count, "recording")
                ));
            }
            report.push_str(&format!("  Avg Latency: {}μs\n", metrics.avg_latency_us));
        }

        report
    }

    pub fn collector(&self) -> &MetricsCollector {
        &self.collector
    }
}
