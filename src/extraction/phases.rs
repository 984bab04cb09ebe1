//! Squat and jump event segmentation.
//!
//! Both stages walk the head's vertical kinematics looking for threshold
//! crossings:
//!
//! 1. **Squat**: a steep descent (velocity below the trigger) proves a squat
//!    happens; walking back to the onset threshold finds where it began, then
//!    forward to the velocity sign changes at the bottom and at the end.
//! 2. **Jump**: from the bottom of the squat, free-fall acceleration marks
//!    toe-off, the velocity sign change marks the apex, and the return of
//!    acceleration above free fall marks reception.
//!
//! Each scan reports `Option<usize>`. A stage is valid only if all of its
//! scans found a row; otherwise every event of that stage is not found.

use anyhow::Result;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::{AnalysisConfig, Axis, ChannelTag, DerivedKind, PhaseThresholds, Recording};

/// Biomechanical events located by the extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseEvent {
    SquatStart,
    SquatDeepest,
    SquatEnd,
    ToeOff,
    HighestPoint,
    Reception,
}

impl PhaseEvent {
    pub const ALL: [PhaseEvent; 6] = [
        PhaseEvent::SquatStart,
        PhaseEvent::SquatDeepest,
        PhaseEvent::SquatEnd,
        PhaseEvent::ToeOff,
        PhaseEvent::HighestPoint,
        PhaseEvent::Reception,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PhaseEvent::SquatStart => "squat_start",
            PhaseEvent::SquatDeepest => "squat_deepest",
            PhaseEvent::SquatEnd => "squat_end",
            PhaseEvent::ToeOff => "toe_off",
            PhaseEvent::HighestPoint => "highest_point",
            PhaseEvent::Reception => "reception",
        }
    }
}

impl fmt::Display for PhaseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SquatPhases {
    pub start: Option<usize>,
    pub deepest: Option<usize>,
    pub end: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JumpPhases {
    pub toe_off: Option<usize>,
    pub highest_point: Option<usize>,
    pub reception: Option<usize>,
}

/// Row index of every event, or `None` when it was not found
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseIndices {
    pub squat_start: Option<usize>,
    pub squat_deepest: Option<usize>,
    pub squat_end: Option<usize>,
    pub toe_off: Option<usize>,
    pub highest_point: Option<usize>,
    pub reception: Option<usize>,
}

impl PhaseIndices {
    pub fn from_stages(squat: SquatPhases, jump: JumpPhases) -> Self {
        Self {
            squat_start: squat.start,
            squat_deepest: squat.deepest,
            squat_end: squat.end,
            toe_off: jump.toe_off,
            highest_point: jump.highest_point,
            reception: jump.reception,
        }
    }

    /// Every event not found
    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn get(&self, event: PhaseEvent) -> Option<usize> {
        match event {
            PhaseEvent::SquatStart => self.squat_start,
            PhaseEvent::SquatDeepest => self.squat_deepest,
            PhaseEvent::SquatEnd => self.squat_end,
            PhaseEvent::ToeOff => self.toe_off,
            PhaseEvent::HighestPoint => self.highest_point,
            PhaseEvent::Reception => self.reception,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PhaseEvent, Option<usize>)> + '_ {
        PhaseEvent::ALL.into_iter().map(move |e| (e, self.get(e)))
    }

    pub fn is_squat_valid(&self) -> bool {
        self.squat_start.is_some() && self.squat_deepest.is_some() && self.squat_end.is_some()
    }

    pub fn is_jump_valid(&self) -> bool {
        self.toe_off.is_some() && self.highest_point.is_some() && self.reception.is_some()
    }
}

/// First row, in the order `rows` yields them, whose value satisfies `pred`.
/// NaN rows never match.
fn first_where(
    values: &[f64],
    rows: impl IntoIterator<Item = usize>,
    pred: impl Fn(f64) -> bool,
) -> Option<usize> {
    rows.into_iter().find(|&i| pred(values[i]))
}

/// Locate the squat onset, bottom and end on the vertical head velocity
pub fn detect_squat(velocity: &[f64], thresholds: &PhaseThresholds) -> SquatPhases {
    let n = velocity.len();

    let trigger = first_where(velocity, 0..n, |v| v < thresholds.squat_trigger_velocity);
    let start = trigger.and_then(|t| {
        first_where(velocity, (0..=t).rev(), |v| v >= thresholds.squat_onset_velocity)
    });
    let deepest = start.and_then(|s| first_where(velocity, s..n, |v| v >= 0.0));
    let end = deepest.and_then(|d| first_where(velocity, d..n, |v| v < 0.0));

    match (start, deepest, end) {
        (Some(start), Some(deepest), Some(end)) if start >= thresholds.min_squat_start_row => {
            SquatPhases {
                start: Some(start),
                deepest: Some(deepest),
                end: Some(end),
            }
        }
        _ => {
            debug!(
                "Squat stage invalid (trigger={:?}, start={:?}, deepest={:?}, end={:?})",
                trigger, start, deepest, end
            );
            SquatPhases::default()
        }
    }
}

/// Locate toe-off, apex and reception, starting from the squat's bottom
pub fn detect_jump(
    velocity: &[f64],
    acceleration: &[f64],
    squat_deepest: Option<usize>,
    thresholds: &PhaseThresholds,
) -> JumpPhases {
    let n = velocity.len().min(acceleration.len());
    let gravity = thresholds.gravity;

    let toe_off = squat_deepest.and_then(|d| first_where(acceleration, d..n, |a| a <= gravity));
    let highest_point = toe_off.and_then(|t| first_where(velocity, t..n, |v| v <= 0.0));
    let reception =
        highest_point.and_then(|h| first_where(acceleration, h..n, |a| a >= gravity));

    match (toe_off, highest_point, reception) {
        (Some(_), Some(_), Some(_)) => JumpPhases {
            toe_off,
            highest_point,
            reception,
        },
        _ => {
            debug!(
                "Jump stage invalid (squat_deepest={:?}, toe_off={:?}, highest_point={:?}, reception={:?})",
                squat_deepest, toe_off, highest_point, reception
            );
            JumpPhases::default()
        }
    }
}

/// Run both stages on the recording's vertical head kinematics
pub fn extract_phases(recording: &Recording, config: &AnalysisConfig) -> Result<PhaseIndices> {
    let recording = recording.windowed(config.derivative_window);
    let velocity = recording.get(
        ChannelTag::HEAD_POSITION,
        ..,
        DerivedKind::Velocity,
        Axis::Vertical,
    )?;
    let acceleration = recording.get(
        ChannelTag::HEAD_POSITION,
        ..,
        DerivedKind::Acceleration,
        Axis::Vertical,
    )?;

    let squat = detect_squat(velocity.single()?, &config.thresholds);
    let jump = detect_jump(
        velocity.single()?,
        acceleration.single()?,
        squat.deepest,
        &config.thresholds,
    );

    Ok(PhaseIndices::from_stages(squat, jump))
}
