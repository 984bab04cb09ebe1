use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Half-width, in frames, of the central difference window
pub const DERIVATIVE_WINDOW: usize = 10;

/// Vertical head velocity (m/s) below which a squat is considered under way
pub const SQUAT_TRIGGER_VELOCITY: f64 = -5.0;

/// Vertical head velocity (m/s) marking the true onset of the squat
pub const SQUAT_ONSET_VELOCITY: f64 = -2.0;

/// Free-fall vertical acceleration (m/s/s)
pub const GRAVITY: f64 = -9.81;

/// Squats starting before this row lack the pre-roll the derivative needs
pub const MIN_SQUAT_START_ROW: usize = 10;

/// Confidence level of the dispersion ellipse
pub const DISPERSION_CONFIDENCE: f64 = 0.95;

/// Threshold crossings used by the phase extractor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseThresholds {
    pub squat_trigger_velocity: f64,
    pub squat_onset_velocity: f64,
    pub gravity: f64,
    pub min_squat_start_row: usize,
}

impl Default for PhaseThresholds {
    fn default() -> Self {
        Self {
            squat_trigger_velocity: SQUAT_TRIGGER_VELOCITY,
            squat_onset_velocity: SQUAT_ONSET_VELOCITY,
            gravity: GRAVITY,
            min_squat_start_row: MIN_SQUAT_START_ROW,
        }
    }
}

/// Parameters of one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub derivative_window: usize,
    pub dispersion_confidence: f64,
    pub thresholds: PhaseThresholds,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            derivative_window: DERIVATIVE_WINDOW,
            dispersion_confidence: DISPERSION_CONFIDENCE,
            thresholds: PhaseThresholds::default(),
        }
    }
}

/// Unsigned integer at `key`, or None when the key is absent
fn read_usize(config: &Value, key: &str) -> Result<Option<usize>> {
    match config.get(key) {
        None => Ok(None),
        Some(v) => match v.as_u64() {
            Some(n) => Ok(Some(n as usize)),
            None => anyhow::bail!("'{}' must be a non-negative integer, got {}", key, v),
        },
    }
}

/// Number at `key`, or None when the key is absent
fn read_f64(config: &Value, key: &str) -> Result<Option<f64>> {
    match config.get(key) {
        None => Ok(None),
        Some(v) => match v.as_f64() {
            Some(x) => Ok(Some(x)),
            None => anyhow::bail!("'{}' must be a number, got {}", key, v),
        },
    }
}

impl AnalysisConfig {
    /// Build a config from JSON, keeping defaults for absent keys.
    ///
    /// A key that is present with the wrong type is an error.
    pub fn from_json(config: Value) -> Result<Self> {
        if !config.is_object() {
            anyhow::bail!("Analysis config must be a JSON object, got {}", config);
        }
        let mut cfg = Self::default();

        if let Some(w) = read_usize(&config, "derivative_window")? {
            cfg.derivative_window = w;
        }
        if let Some(c) = read_f64(&config, "dispersion_confidence")? {
            cfg.dispersion_confidence = c;
        }

        if let Some(thresholds) = config.get("thresholds") {
            if !thresholds.is_object() {
                anyhow::bail!("'thresholds' must be a JSON object, got {}", thresholds);
            }
            if let Some(v) = read_f64(thresholds, "squat_trigger_velocity")? {
                cfg.thresholds.squat_trigger_velocity = v;
            }
            if let Some(v) = read_f64(thresholds, "squat_onset_velocity")? {
                cfg.thresholds.squat_onset_velocity = v;
            }
            if let Some(v) = read_f64(thresholds, "gravity")? {
                cfg.thresholds.gravity = v;
            }
            if let Some(v) = read_usize(thresholds, "min_squat_start_row")? {
                cfg.thresholds.min_squat_start_row = v;
            }
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.derivative_window == 0 {
            anyhow::bail!("Derivative window must be at least 1 frame");
        }
        if !(self.dispersion_confidence > 0.0 && self.dispersion_confidence < 1.0) {
            anyhow::bail!(
                "Dispersion confidence must be in (0, 1), got {}",
                self.dispersion_confidence
            );
        }
        Ok(())
    }
}
