use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::f64::consts::PI;

use super::RecordingSource;
use crate::core::{ChannelTag, Recording, FRAME_COLUMN};

/// Piecewise-constant vertical head acceleration, as (first row, end row, m/s/s)
/// at 100 Hz: a deep squat, recovery, then a push-off, flight and landing.
const JUMP_PROFILE: [(usize, usize, f64); 9] = [
    (100, 130, -30.0),
    (130, 160, 30.0),
    (160, 200, 8.0),
    (200, 240, -8.0),
    (240, 250, -4.0),
    (250, 260, 4.0),
    (300, 320, 40.0),
    (320, 400, -20.0),
    (400, 440, 20.0),
];

/// Flight rows during which the head drifts horizontally
const FLIGHT_ROWS: (usize, usize) = (320, 400);

/// Generated squat-and-jump recording, for demos and tests.
///
/// Head vertical motion integrates `JUMP_PROFILE` (or stays still when
/// `jump` is off); a small sway keeps the horizontal dispersion non-zero,
/// and the hands swing sinusoidally.
pub struct SyntheticJump {
    id: String,
    sample_rate: f64,
    rows: usize,
    jump: bool,
    drift: f64,
    sway: f64,
    hand_frequency: f64,
}

impl SyntheticJump {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sample_rate: 100.0,
            rows: 500,
            jump: true,
            drift: 1.0,
            sway: 0.01,
            hand_frequency: 0.8,
        }
    }

    /// A subject standing still for the whole session
    pub fn standing(id: impl Into<String>) -> Self {
        Self {
            jump: false,
            drift: 0.0,
            ..Self::new(id)
        }
    }

    /// Overlay generator settings from JSON, keeping the current ones for absent keys
    pub fn with_config(mut self, config: &Value) -> Self {
        if let Some(rows) = config["rows"].as_u64() {
            self.rows = rows as usize;
        }
        if let Some(jump) = config["jump"].as_bool() {
            self.jump = jump;
        }
        if let Some(drift) = config["drift"].as_f64() {
            self.drift = drift;
        }
        if let Some(sway) = config["sway"].as_f64() {
            self.sway = sway;
        }
        if let Some(freq) = config["hand_frequency"].as_f64() {
            self.hand_frequency = freq;
        }
        self
    }

    fn vertical_acceleration(&self, row: usize) -> f64 {
        if !self.jump {
            return 0.0;
        }
        JUMP_PROFILE
            .iter()
            .find(|(first, end, _)| (*first..*end).contains(&row))
            .map_or(0.0, |(_, _, a)| *a)
    }

    pub fn generate(&self) -> Result<Recording> {
        Recording::from_columns(self.columns())
    }

    /// Named columns of the generated session, as a loader would hand them over
    pub fn columns(&self) -> HashMap<String, Vec<f64>> {
        let dt = 1.0 / self.sample_rate;
        let n = self.rows;

        let mut frames = Vec::with_capacity(n);
        let mut head = [Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n)];
        let mut left = [Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n)];
        let mut right = [Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n)];

        let (mut y, mut vy) = (1.7, 0.0);
        let mut x_drift = 0.0;

        for i in 0..n {
            let t = i as f64 * dt;
            frames.push(10.0 + t);

            let phase = 2.0 * PI * 0.5 * t;
            head[0].push(x_drift + self.sway * phase.sin());
            head[1].push(y);
            head[2].push(0.5 * self.sway * phase.cos());

            let swing = (2.0 * PI * self.hand_frequency * t).sin();
            left[0].push(x_drift - 0.3 + 0.05 * swing);
            left[1].push(y - 0.6 + 0.1 * swing);
            left[2].push(0.1 * swing);
            right[0].push(x_drift + 0.3 - 0.05 * swing);
            right[1].push(y - 0.6 - 0.1 * swing);
            right[2].push(-0.1 * swing);

            let a = self.vertical_acceleration(i);
            y += vy * dt + 0.5 * a * dt * dt;
            vy += a * dt;
            if (FLIGHT_ROWS.0..FLIGHT_ROWS.1).contains(&i) {
                x_drift += self.drift * dt;
            }
        }

        let mut columns = HashMap::new();
        columns.insert(FRAME_COLUMN.to_string(), frames);
        for (tag, axes) in [
            (ChannelTag::HEAD_POSITION, head),
            (ChannelTag::LEFT_HAND_POSITION, left),
            (ChannelTag::RIGHT_HAND_POSITION, right),
        ] {
            for (name, values) in tag.column_names().into_iter().zip(axes) {
                columns.insert(name, values);
            }
        }

        columns
    }
}

#[async_trait]
impl RecordingSource for SyntheticJump {
    fn id(&self) -> &str {
        &self.id
    }

    async fn load(&self) -> Result<Recording> {
        self.generate()
    }
}
