use std::borrow::Cow;
use std::collections::HashMap;
use std::ops::{Bound, Range, RangeBounds};

use anyhow::{Context, Result};

use super::channel::{Axis, ChannelTag, DerivedKind, FRAME_COLUMN};
use super::config::DERIVATIVE_WINDOW;
use super::series::Series;
use crate::maths::derive;

/// One motion-capture session: a frame counter plus row-aligned channels.
///
/// Immutable once built. Velocity and acceleration are never stored; every
/// request differentiates the stored values again.
#[derive(Debug, Clone)]
pub struct Recording {
    frames: Vec<f64>,
    channels: HashMap<ChannelTag, [Vec<f64>; 3]>,
    window: usize,
}

impl Recording {
    /// Build a recording from named columns (`Frame`, `Head_Pos.X`, ...)
    /// using the protocol's derivative window.
    pub fn from_columns(mut columns: HashMap<String, Vec<f64>>) -> Result<Self> {
        let frames = columns
            .remove(FRAME_COLUMN)
            .with_context(|| format!("Recording missing '{}' column", FRAME_COLUMN))?;

        if frames.iter().any(|f| !f.is_finite()) {
            anyhow::bail!("Frame counter contains non-finite values");
        }
        if let Some(i) = frames.windows(2).position(|w| w[1] < w[0]) {
            anyhow::bail!("Frame counter decreases at row {}", i + 1);
        }

        let rows = frames.len();
        let mut channels = HashMap::new();

        for tag in ChannelTag::ALL {
            let names = tag.column_names();
            let present = names.iter().filter(|n| columns.contains_key(*n)).count();

            if present == 0 {
                if ChannelTag::REQUIRED.contains(&tag) {
                    anyhow::bail!("Recording missing required channel {}", tag);
                }
                continue;
            }
            if present != 3 {
                anyhow::bail!("Channel {} has {} of 3 columns", tag, present);
            }

            let [x, y, z] = names.map(|n| columns.remove(&n).unwrap_or_default());
            for (name, col) in tag.column_names().iter().zip([&x, &y, &z]) {
                if col.len() != rows {
                    anyhow::bail!(
                        "Column '{}' has {} rows, expected {}",
                        name,
                        col.len(),
                        rows
                    );
                }
            }
            channels.insert(tag, [x, y, z]);
        }

        Ok(Self {
            frames,
            channels,
            window: DERIVATIVE_WINDOW,
        })
    }

    /// Differentiate with a different central difference half-width
    pub fn with_derivative_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// This recording differentiated with `window`, cloned only when the
    /// window differs from its own
    pub fn windowed(&self, window: usize) -> Cow<'_, Recording> {
        if window == self.window {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(self.clone().with_derivative_window(window))
        }
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// (rows, numeric columns including the frame counter)
    pub fn shape(&self) -> (usize, usize) {
        (self.len(), 1 + 3 * self.channels.len())
    }

    pub fn has(&self, tag: ChannelTag) -> bool {
        self.channels.contains_key(&tag)
    }

    pub fn derivative_window(&self) -> usize {
        self.window
    }

    /// Elapsed time since the first frame, in seconds
    pub fn time(&self) -> Vec<f64> {
        let start = self.frames.iter().copied().fold(f64::INFINITY, f64::min);
        self.frames.iter().map(|f| f - start).collect()
    }

    /// Request a view of one channel.
    ///
    /// Derivatives are taken over the whole recording before rows are
    /// sliced, so window edges borrow context from outside the window.
    /// Out-of-range row bounds are clamped to the recording.
    pub fn get(
        &self,
        tag: ChannelTag,
        rows: impl RangeBounds<usize>,
        kind: DerivedKind,
        axis: Axis,
    ) -> Result<Series> {
        let channel = self
            .channels
            .get(&tag)
            .with_context(|| format!("Recording has no {} channel", tag))?;

        let rows = self.clamp(rows);
        let time = self.time();

        let columns = axis
            .indices()
            .iter()
            .map(|&i| {
                let derived = derive(&channel[i], &time, kind, self.window);
                derived[rows.clone()].to_vec()
            })
            .collect();

        Series::from_columns(columns)
    }

    fn clamp(&self, rows: impl RangeBounds<usize>) -> Range<usize> {
        let n = self.len();
        let start = match rows.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match rows.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => n,
        };
        let end = end.min(n);
        start.min(end)..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(rows: usize) -> HashMap<String, Vec<f64>> {
        let mut cols = HashMap::new();
        cols.insert(
            FRAME_COLUMN.to_string(),
            (0..rows).map(|i| 100.0 + i as f64 * 0.1).collect(),
        );
        for tag in ChannelTag::REQUIRED {
            for (axis, name) in tag.column_names().into_iter().enumerate() {
                cols.insert(name, (0..rows).map(|i| (axis + 1) as f64 * i as f64).collect());
            }
        }
        cols
    }

    #[test]
    fn test_time_starts_at_zero() {
        let rec = Recording::from_columns(columns(30)).unwrap();
        let time = rec.time();
        assert_eq!(time[0], 0.0);
        assert!(time.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_shape() {
        let rec = Recording::from_columns(columns(30)).unwrap();
        assert_eq!(rec.shape(), (30, 10));
        assert!(rec.has(ChannelTag::HEAD_POSITION));
        assert!(!rec.has(ChannelTag::HEAD_ROTATION));
    }

    #[test]
    fn test_missing_frame_column() {
        let mut cols = columns(30);
        cols.remove(FRAME_COLUMN);
        assert!(Recording::from_columns(cols).is_err());
    }

    #[test]
    fn test_missing_required_channel() {
        let mut cols = columns(30);
        for name in ChannelTag::LEFT_HAND_POSITION.column_names() {
            cols.remove(&name);
        }
        let err = Recording::from_columns(cols).unwrap_err();
        assert!(err.to_string().contains("LeftHand_Pos"));
    }

    #[test]
    fn test_partial_channel_rejected() {
        let mut cols = columns(30);
        cols.insert("Head_Rot.X".to_string(), vec![0.0; 30]);
        assert!(Recording::from_columns(cols).is_err());
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let mut cols = columns(30);
        cols.insert("Head_Pos.Y".to_string(), vec![0.0; 29]);
        assert!(Recording::from_columns(cols).is_err());
    }

    #[test]
    fn test_decreasing_frames_rejected() {
        let mut cols = columns(30);
        cols.get_mut(FRAME_COLUMN).unwrap()[5] = 0.0;
        assert!(Recording::from_columns(cols).is_err());
    }

    #[test]
    fn test_get_value_slices_rows_then_axes() {
        let rec = Recording::from_columns(columns(30)).unwrap();
        let view = rec
            .get(ChannelTag::HEAD_POSITION, 2..5, DerivedKind::Value, Axis::Horizontal)
            .unwrap();

        assert_eq!(view.width(), 2);
        assert_eq!(view.column(0), &[2.0, 3.0, 4.0]);
        assert_eq!(view.column(1), &[6.0, 9.0, 12.0]);
    }

    #[test]
    fn test_velocity_window_uses_outside_context() {
        let rec = Recording::from_columns(columns(30)).unwrap();
        let view = rec
            .get(ChannelTag::HEAD_POSITION, 10..12, DerivedKind::Velocity, Axis::X)
            .unwrap();

        // Position grows 1 per row, time 0.1 per row
        for v in view.single().unwrap() {
            assert!((v - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_range_is_clamped() {
        let rec = Recording::from_columns(columns(30)).unwrap();
        let tail = rec
            .get(ChannelTag::HEAD_POSITION, 25..100, DerivedKind::Value, Axis::All)
            .unwrap();
        assert_eq!(tail.len(), 5);

        let empty = rec
            .get(ChannelTag::HEAD_POSITION, 40.., DerivedKind::Value, Axis::All)
            .unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.width(), 3);
    }

    #[test]
    fn test_windowed_borrows_when_unchanged() {
        let rec = Recording::from_columns(columns(30)).unwrap();
        assert!(matches!(rec.windowed(DERIVATIVE_WINDOW), Cow::Borrowed(_)));

        let narrow = rec.windowed(2);
        assert_eq!(narrow.derivative_window(), 2);
        let vel = narrow
            .get(ChannelTag::HEAD_POSITION, .., DerivedKind::Velocity, Axis::X)
            .unwrap();
        assert!(vel.single().unwrap()[2].is_finite());
    }

    #[test]
    fn test_missing_optional_channel_request_fails() {
        let rec = Recording::from_columns(columns(30)).unwrap();
        assert!(rec
            .get(ChannelTag::HEAD_ROTATION, .., DerivedKind::Value, Axis::All)
            .is_err());
    }
}
