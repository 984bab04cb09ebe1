use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeBounds;

use super::phases::{extract_phases, PhaseIndices};
use crate::core::{AnalysisConfig, Axis, ChannelTag, DerivedKind, Recording};
use crate::maths::{displacement, fit_confidence_ellipse, peak_norm, traveled_distance};

/// Scalar outputs of one recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "Head dispersion")]
    OverallHeadHorizontalDispersion,
    #[serde(rename = "Left hand acceleration peak")]
    OverallLeftHandAccelerationPeak,
    #[serde(rename = "Right hand acceleration peak")]
    OverallRightHandAccelerationPeak,
    #[serde(rename = "Left hand traveled distance")]
    OverallLeftHandTraveledDistance,
    #[serde(rename = "Right hand traveled distance")]
    OverallRightHandTraveledDistance,
    #[serde(rename = "Squat height")]
    SquatHeight,
    #[serde(rename = "Jump height")]
    JumpHeight,
    #[serde(rename = "Jump distance")]
    JumpDistance,
    #[serde(rename = "Jump flight time")]
    JumpFlightTime,
    #[serde(rename = "Pre-jump head horizontal dispersion")]
    PreJumpHeadHorizontalDispersion,
    #[serde(rename = "Pre-jump left hand acceleration peak")]
    PreJumpLeftHandAccelerationPeak,
    #[serde(rename = "Pre-jump right hand acceleration peak")]
    PreJumpRightHandAccelerationPeak,
    #[serde(rename = "Pre-jump left hand traveled distance")]
    PreJumpLeftHandTraveledDistance,
    #[serde(rename = "Pre-jump right hand traveled distance")]
    PreJumpRightHandTraveledDistance,
    #[serde(rename = "Post-jump head horizontal dispersion")]
    PostJumpHeadHorizontalDispersion,
    #[serde(rename = "Post-jump left hand acceleration peak")]
    PostJumpLeftHandAccelerationPeak,
    #[serde(rename = "Post-jump right hand acceleration peak")]
    PostJumpRightHandAccelerationPeak,
    #[serde(rename = "Post-jump left hand traveled distance")]
    PostJumpLeftHandTraveledDistance,
    #[serde(rename = "Post-jump right hand traveled distance")]
    PostJumpRightHandTraveledDistance,
}

impl Metric {
    pub const ALL: [Metric; 19] = [
        Metric::OverallHeadHorizontalDispersion,
        Metric::OverallLeftHandAccelerationPeak,
        Metric::OverallRightHandAccelerationPeak,
        Metric::OverallLeftHandTraveledDistance,
        Metric::OverallRightHandTraveledDistance,
        Metric::SquatHeight,
        Metric::JumpHeight,
        Metric::JumpDistance,
        Metric::JumpFlightTime,
        Metric::PreJumpHeadHorizontalDispersion,
        Metric::PreJumpLeftHandAccelerationPeak,
        Metric::PreJumpRightHandAccelerationPeak,
        Metric::PreJumpLeftHandTraveledDistance,
        Metric::PreJumpRightHandTraveledDistance,
        Metric::PostJumpHeadHorizontalDispersion,
        Metric::PostJumpLeftHandAccelerationPeak,
        Metric::PostJumpRightHandAccelerationPeak,
        Metric::PostJumpLeftHandTraveledDistance,
        Metric::PostJumpRightHandTraveledDistance,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::OverallHeadHorizontalDispersion => "Head dispersion",
            Metric::OverallLeftHandAccelerationPeak => "Left hand acceleration peak",
            Metric::OverallRightHandAccelerationPeak => "Right hand acceleration peak",
            Metric::OverallLeftHandTraveledDistance => "Left hand traveled distance",
            Metric::OverallRightHandTraveledDistance => "Right hand traveled distance",
            Metric::SquatHeight => "Squat height",
            Metric::JumpHeight => "Jump height",
            Metric::JumpDistance => "Jump distance",
            Metric::JumpFlightTime => "Jump flight time",
            Metric::PreJumpHeadHorizontalDispersion => "Pre-jump head horizontal dispersion",
            Metric::PreJumpLeftHandAccelerationPeak => "Pre-jump left hand acceleration peak",
            Metric::PreJumpRightHandAccelerationPeak => "Pre-jump right hand acceleration peak",
            Metric::PreJumpLeftHandTraveledDistance => "Pre-jump left hand traveled distance",
            Metric::PreJumpRightHandTraveledDistance => "Pre-jump right hand traveled distance",
            Metric::PostJumpHeadHorizontalDispersion => "Post-jump head horizontal dispersion",
            Metric::PostJumpLeftHandAccelerationPeak => "Post-jump left hand acceleration peak",
            Metric::PostJumpRightHandAccelerationPeak => "Post-jump right hand acceleration peak",
            Metric::PostJumpLeftHandTraveledDistance => "Post-jump left hand traveled distance",
            Metric::PostJumpRightHandTraveledDistance => "Post-jump right hand traveled distance",
        }
    }

    /// Whether the value depends on a located phase event
    pub fn is_phase_dependent(&self) -> bool {
        !matches!(
            self,
            Metric::OverallHeadHorizontalDispersion
                | Metric::OverallLeftHandAccelerationPeak
                | Metric::OverallRightHandAccelerationPeak
                | Metric::OverallLeftHandTraveledDistance
                | Metric::OverallRightHandTraveledDistance
        )
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Every metric with its value, `None` when not computable.
///
/// All keys are present from construction on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricMap(BTreeMap<Metric, Option<f64>>);

impl MetricMap {
    /// Every metric not computable
    pub fn not_computable() -> Self {
        Self(Metric::ALL.into_iter().map(|m| (m, None)).collect())
    }

    /// Store a value; NaN and infinities are recorded as not computable
    pub fn set(&mut self, metric: Metric, value: Option<f64>) {
        self.0.insert(metric, value.filter(|v| v.is_finite()));
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.0.get(&metric).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, Option<f64>)> + '_ {
        self.0.iter().map(|(m, v)| (*m, *v))
    }
}

impl Default for MetricMap {
    fn default() -> Self {
        Self::not_computable()
    }
}

/// Final output for one recording
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub metrics: MetricMap,
    pub phases: PhaseIndices,
}

impl AnalysisReport {
    /// Report with every metric and event absent
    pub fn not_computable() -> Self {
        Self {
            metrics: MetricMap::not_computable(),
            phases: PhaseIndices::not_found(),
        }
    }
}

/// Dispersion, acceleration peaks and traveled distances of one window
struct WindowMetrics {
    head_dispersion: Metric,
    left_peak: Metric,
    right_peak: Metric,
    left_distance: Metric,
    right_distance: Metric,
}

const OVERALL: WindowMetrics = WindowMetrics {
    head_dispersion: Metric::OverallHeadHorizontalDispersion,
    left_peak: Metric::OverallLeftHandAccelerationPeak,
    right_peak: Metric::OverallRightHandAccelerationPeak,
    left_distance: Metric::OverallLeftHandTraveledDistance,
    right_distance: Metric::OverallRightHandTraveledDistance,
};

const PRE_JUMP: WindowMetrics = WindowMetrics {
    head_dispersion: Metric::PreJumpHeadHorizontalDispersion,
    left_peak: Metric::PreJumpLeftHandAccelerationPeak,
    right_peak: Metric::PreJumpRightHandAccelerationPeak,
    left_distance: Metric::PreJumpLeftHandTraveledDistance,
    right_distance: Metric::PreJumpRightHandTraveledDistance,
};

const POST_JUMP: WindowMetrics = WindowMetrics {
    head_dispersion: Metric::PostJumpHeadHorizontalDispersion,
    left_peak: Metric::PostJumpLeftHandAccelerationPeak,
    right_peak: Metric::PostJumpRightHandAccelerationPeak,
    left_distance: Metric::PostJumpLeftHandTraveledDistance,
    right_distance: Metric::PostJumpRightHandTraveledDistance,
};

/// Area of the confidence ellipse of a segment's horizontal position
pub fn horizontal_dispersion(
    recording: &Recording,
    tag: ChannelTag,
    rows: impl RangeBounds<usize>,
    confidence: f64,
) -> Result<Option<f64>> {
    let position = recording.get(tag, rows, DerivedKind::Value, Axis::Horizontal)?;
    if position.is_empty() {
        return Ok(None);
    }
    let ellipse = fit_confidence_ellipse(&position, confidence)?;
    Ok(Some(ellipse.area()))
}

/// Largest acceleration magnitude of a segment
pub fn acceleration_peak(
    recording: &Recording,
    tag: ChannelTag,
    rows: impl RangeBounds<usize>,
) -> Result<Option<f64>> {
    let acceleration = recording.get(tag, rows, DerivedKind::Acceleration, Axis::All)?;
    Ok(peak_norm(&acceleration))
}

/// Path length of a segment's position
pub fn segment_traveled_distance(
    recording: &Recording,
    tag: ChannelTag,
    rows: impl RangeBounds<usize>,
) -> Result<Option<f64>> {
    let position = recording.get(tag, rows, DerivedKind::Value, Axis::All)?;
    Ok(traveled_distance(&position))
}

/// Head displacement between two events along the given axes
fn head_displacement(
    recording: &Recording,
    axis: Axis,
    from: Option<usize>,
    to: Option<usize>,
) -> Result<Option<f64>> {
    let (Some(from), Some(to)) = (from, to) else {
        return Ok(None);
    };
    let position = recording.get(ChannelTag::HEAD_POSITION, .., DerivedKind::Value, axis)?;
    if from >= position.len() || to >= position.len() {
        return Ok(None);
    }
    Ok(Some(displacement(&position, from, to)))
}

/// Vertical head travel from squat start to its deepest point
pub fn squat_height(recording: &Recording, phases: &PhaseIndices) -> Result<Option<f64>> {
    head_displacement(recording, Axis::Vertical, phases.squat_start, phases.squat_deepest)
}

/// Vertical head travel from toe-off to the apex
pub fn jump_height(recording: &Recording, phases: &PhaseIndices) -> Result<Option<f64>> {
    head_displacement(recording, Axis::Vertical, phases.toe_off, phases.highest_point)
}

/// Horizontal head travel from toe-off to reception
pub fn jump_distance(recording: &Recording, phases: &PhaseIndices) -> Result<Option<f64>> {
    head_displacement(recording, Axis::Horizontal, phases.toe_off, phases.reception)
}

/// Elapsed time between two rows of a time axis
pub fn flight_time(time: &[f64], toe_off: Option<usize>, reception: Option<usize>) -> Option<f64> {
    let (toe_off, reception) = (toe_off?, reception?);
    Some(time.get(reception)? - time.get(toe_off)?)
}

fn window_metrics(
    recording: &Recording,
    rows: impl RangeBounds<usize> + Clone,
    names: &WindowMetrics,
    confidence: f64,
    out: &mut MetricMap,
) -> Result<()> {
    out.set(
        names.head_dispersion,
        horizontal_dispersion(recording, ChannelTag::HEAD_POSITION, rows.clone(), confidence)?,
    );
    out.set(
        names.left_peak,
        acceleration_peak(recording, ChannelTag::LEFT_HAND_POSITION, rows.clone())?,
    );
    out.set(
        names.right_peak,
        acceleration_peak(recording, ChannelTag::RIGHT_HAND_POSITION, rows.clone())?,
    );
    out.set(
        names.left_distance,
        segment_traveled_distance(recording, ChannelTag::LEFT_HAND_POSITION, rows.clone())?,
    );
    out.set(
        names.right_distance,
        segment_traveled_distance(recording, ChannelTag::RIGHT_HAND_POSITION, rows)?,
    );
    Ok(())
}

/// Compute every metric of a recording together with its phase indices.
///
/// Derivatives use `config.derivative_window`, whatever window the
/// recording was built with.
///
/// Errors only on malformed input; missing phase events leave the metrics
/// that depend on them not computable.
pub fn analyze(recording: &Recording, config: &AnalysisConfig) -> Result<AnalysisReport> {
    let windowed = recording.windowed(config.derivative_window);
    let recording: &Recording = &windowed;
    let confidence = config.dispersion_confidence;
    let mut metrics = MetricMap::not_computable();

    window_metrics(recording, .., &OVERALL, confidence, &mut metrics)?;

    let phases = extract_phases(recording, config)?;

    metrics.set(Metric::SquatHeight, squat_height(recording, &phases)?);
    metrics.set(Metric::JumpHeight, jump_height(recording, &phases)?);
    metrics.set(Metric::JumpDistance, jump_distance(recording, &phases)?);
    metrics.set(
        Metric::JumpFlightTime,
        flight_time(&recording.time(), phases.toe_off, phases.reception),
    );

    if let Some(toe_off) = phases.toe_off {
        window_metrics(recording, ..toe_off, &PRE_JUMP, confidence, &mut metrics)?;
    }
    if let Some(reception) = phases.reception {
        window_metrics(recording, reception.., &POST_JUMP, confidence, &mut metrics)?;
    }

    Ok(AnalysisReport { metrics, phases })
}
