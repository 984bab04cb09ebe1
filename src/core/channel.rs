use serde::{Deserialize, Serialize};
use std::fmt;

/// Column holding the recorder's frame counter
pub const FRAME_COLUMN: &str = "Frame";

/// Tracked body segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Segment {
    Head,
    LeftHand,
    RightHand,
}

impl Segment {
    fn prefix(&self) -> &'static str {
        match self {
            Segment::Head => "Head",
            Segment::LeftHand => "LeftHand",
            Segment::RightHand => "RightHand",
        }
    }
}

/// What the columns of a segment measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Measurement {
    Position,
    Rotation,
}

impl Measurement {
    fn suffix(&self) -> &'static str {
        match self {
            Measurement::Position => "Pos",
            Measurement::Rotation => "Rot",
        }
    }
}

/// Group of three coordinate columns for one segment and one measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelTag {
    pub segment: Segment,
    pub measurement: Measurement,
}

impl ChannelTag {
    pub const HEAD_POSITION: ChannelTag = ChannelTag::new(Segment::Head, Measurement::Position);
    pub const HEAD_ROTATION: ChannelTag = ChannelTag::new(Segment::Head, Measurement::Rotation);
    pub const LEFT_HAND_POSITION: ChannelTag =
        ChannelTag::new(Segment::LeftHand, Measurement::Position);
    pub const LEFT_HAND_ROTATION: ChannelTag =
        ChannelTag::new(Segment::LeftHand, Measurement::Rotation);
    pub const RIGHT_HAND_POSITION: ChannelTag =
        ChannelTag::new(Segment::RightHand, Measurement::Position);
    pub const RIGHT_HAND_ROTATION: ChannelTag =
        ChannelTag::new(Segment::RightHand, Measurement::Rotation);

    pub const ALL: [ChannelTag; 6] = [
        Self::HEAD_POSITION,
        Self::HEAD_ROTATION,
        Self::LEFT_HAND_POSITION,
        Self::LEFT_HAND_ROTATION,
        Self::RIGHT_HAND_POSITION,
        Self::RIGHT_HAND_ROTATION,
    ];

    /// Tags every recording must carry for the metrics to be computed
    pub const REQUIRED: [ChannelTag; 3] = [
        Self::HEAD_POSITION,
        Self::LEFT_HAND_POSITION,
        Self::RIGHT_HAND_POSITION,
    ];

    pub const fn new(segment: Segment, measurement: Measurement) -> Self {
        Self { segment, measurement }
    }

    /// Column names in X, Y, Z order, e.g. `Head_Pos.X`
    pub fn column_names(&self) -> [String; 3] {
        let base = format!("{}_{}", self.segment.prefix(), self.measurement.suffix());
        ["X", "Y", "Z"].map(|axis| format!("{}.{}", base, axis))
    }
}

impl fmt::Display for ChannelTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.segment.prefix(), self.measurement.suffix())
    }
}

/// Spatial component selector.
///
/// The semantic aliases follow the recorder's frame: X is lateral, Y is
/// vertical and Z is frontal, so the horizontal plane is (X, Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
    Lateral,
    Vertical,
    Frontal,
    Horizontal,
    All,
}

impl Axis {
    /// Column indices selected, in output order
    pub fn indices(&self) -> &'static [usize] {
        match self {
            Axis::X | Axis::Lateral => &[0],
            Axis::Y | Axis::Vertical => &[1],
            Axis::Z | Axis::Frontal => &[2],
            Axis::Horizontal => &[0, 2],
            Axis::All => &[0, 1, 2],
        }
    }

    pub fn width(&self) -> usize {
        self.indices().len()
    }
}

/// Quantity requested from a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DerivedKind {
    Value,
    Velocity,
    Acceleration,
}

impl DerivedKind {
    /// Number of time derivatives applied to the stored values
    pub fn order(&self) -> usize {
        match self {
            DerivedKind::Value => 0,
            DerivedKind::Velocity => 1,
            DerivedKind::Acceleration => 2,
        }
    }
}
