//! Hour-of-day windows for the Resonance strategy.
//!
//! A caller supplies an hour in local civil time (fixed UTC offset, UTC+8 by
//! default). Records store UTC timestamps, so the hour is converted to UTC
//! first and the window is built around the UTC hour:
//!
//! ```
//! use echomap_core::temporal::HourWindow;
//!
//! // 09:00 local (UTC+8) is 01:00 UTC; ±2 hours wraps past midnight.
//! let window = HourWindow::from_local_hour(9, 8, 2).unwrap();
//! assert_eq!(window.center(), 1);
//! assert_eq!(window.hours(), vec![23, 0, 1, 2, 3]);
//! assert!(window.contains(23));
//! assert!(!window.contains(10));
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const HOURS_PER_DAY: i32 = 24;

/// A half-width of this many hours already covers the whole day.
pub const FULL_DAY_HALF_WIDTH: u32 = 12;

/// Convert a local hour to a UTC hour for a fixed offset: `(local − offset) mod 24`.
pub fn local_hour_to_utc(local_hour: u32, utc_offset_hours: i32) -> Result<u32> {
    if local_hour >= HOURS_PER_DAY as u32 {
        return Err(Error::InvalidInput(format!(
            "reference hour {} outside 0..=23",
            local_hour
        )));
    }
    let offset = utc_offset_hours.rem_euclid(HOURS_PER_DAY);
    Ok((local_hour as i32 - offset).rem_euclid(HOURS_PER_DAY) as u32)
}

/// Inclusive window of UTC hours `[center − half_width, center + half_width]`,
/// wrapped modulo 24.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourWindow {
    center: u32,
    half_width: u32,
}

impl HourWindow {
    /// Window centered on a UTC hour.
    ///
    /// A half-width above 12 is clamped to 12, which covers the whole day.
    pub fn new(center_utc: u32, half_width: u32) -> Result<Self> {
        if center_utc >= HOURS_PER_DAY as u32 {
            return Err(Error::InvalidInput(format!(
                "window center {} outside 0..=23",
                center_utc
            )));
        }
        Ok(Self {
            center: center_utc,
            half_width: half_width.min(FULL_DAY_HALF_WIDTH),
        })
    }

    /// Window around a local hour, converted to UTC with a fixed offset.
    pub fn from_local_hour(local_hour: u32, utc_offset_hours: i32, half_width: u32) -> Result<Self> {
        Self::new(local_hour_to_utc(local_hour, utc_offset_hours)?, half_width)
    }

    pub fn center(&self) -> u32 {
        self.center
    }

    pub fn half_width(&self) -> u32 {
        self.half_width
    }

    /// Whether a UTC hour falls in the window.
    pub fn contains(&self, hour_utc: u32) -> bool {
        let diff = (hour_utc as i32 - self.center as i32).rem_euclid(HOURS_PER_DAY);
        let dist = diff.min(HOURS_PER_DAY - diff) as u32;
        dist <= self.half_width
    }

    /// The covered UTC hours in window order, starting at `center − half_width`.
    pub fn hours(&self) -> Vec<u32> {
        let half_width = self.half_width.min(FULL_DAY_HALF_WIDTH) as i32;
        let span = (half_width * 2 + 1).min(HOURS_PER_DAY);
        let start = if span == HOURS_PER_DAY {
            0
        } else {
            self.center as i32 - half_width
        };
        (0..span)
            .map(|i| (start + i).rem_euclid(HOURS_PER_DAY) as u32)
            .collect()
    }
}
