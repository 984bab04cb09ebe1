use std::sync::Arc;

use jumpkit::core::AnalysisConfig;
use jumpkit::engine::{BatchAnalyzer, RecordingSource, SyntheticJump};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("jumpkit - Batch Analysis Demo");
    println!("=============================\n");

    let config = AnalysisConfig::from_json(serde_json::json!({
        "derivative_window": 10,
        "dispersion_confidence": 0.95
    }))?;

    let sources: Vec<Arc<dyn RecordingSource>> = vec![
        Arc::new(SyntheticJump::new("subject01_jump")),
        Arc::new(SyntheticJump::new("subject02_long_jump").with_config(&serde_json::json!({"drift": 2.5}))),
        Arc::new(SyntheticJump::standing("subject03_standing")),
    ];

    println!("Analyzing {} recordings...\n", sources.len());
    let analyzer = BatchAnalyzer::new(config, 2)?;
    let outcomes = analyzer.run_all(sources).await?;

    for outcome in &outcomes {
        println!("--- {} ---", outcome.id);
        println!("{}\n", serde_json::to_string_pretty(&outcome.report)?);
    }

    println!("{}", analyzer.monitor().generate_report());

    Ok(())
}
