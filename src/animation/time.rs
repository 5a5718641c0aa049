//! Integer time ticks and frame-rate modes.
//!
//! Time is an `i64` tick count; one second is [`TICKS_PER_SECOND`] ticks.
//! The core samples at any tick. [`TimeMode`] only matters to callers that
//! build a uniform sampling grid over an animation's time span.

use serde::{Deserialize, Serialize};

use crate::errors::{PoseError, Result};

/// Integer time unit.
pub type Ticks = i64;

pub const TICKS_PER_MILLISECOND: Ticks = 141_120;
pub const TICKS_PER_SECOND: Ticks = TICKS_PER_MILLISECOND * 1000;
pub const TICKS_PER_MINUTE: Ticks = TICKS_PER_SECOND * 60;
pub const TICKS_PER_HOUR: Ticks = TICKS_PER_MINUTE * 60;

/// Rounds `seconds` to the nearest tick.
#[inline]
#[must_use]
pub fn seconds_to_ticks(seconds: f64) -> Ticks {
    (seconds * TICKS_PER_SECOND as f64).round() as Ticks
}

#[inline]
#[must_use]
pub fn ticks_to_seconds(ticks: Ticks) -> f64 {
    ticks as f64 / TICKS_PER_SECOND as f64
}

/// Frame-rate modes of the source container, in its numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeMode {
    /// 30 frames/s.
    #[default]
    DefaultMode,
    Frames120,
    Frames100,
    Frames60,
    Frames50,
    Frames48,
    Frames30,
    /// Legacy alias of NTSC drop frame with no frame length of its own.
    Frames30Drop,
    /// ~29.97 frames/s, drop-frame time code.
    NtscDropFrame,
    /// ~29.97 frames/s.
    NtscFullFrame,
    /// 25 frames/s.
    Pal,
    Frames24,
    Frames1000,
    /// ~23.976 frames/s.
    FilmFullFrame,
    Custom,
    Frames96,
    Frames72,
    Frames59Dot94,
    Frames119Dot88,
}

impl TimeMode {
    /// Length of one frame in ticks, `None` when the mode has none.
    #[must_use]
    pub fn ticks_per_frame(self) -> Option<Ticks> {
        let ticks = match self {
            TimeMode::DefaultMode | TimeMode::Frames30 => 4_704_000,
            TimeMode::Frames120 => 1_176_000,
            TimeMode::Frames100 => 1_411_200,
            TimeMode::Frames60 => 2_352_000,
            TimeMode::Frames50 => 2_822_400,
            TimeMode::Frames48 => 2_940_000,
            TimeMode::Frames30Drop => return None,
            TimeMode::NtscDropFrame | TimeMode::NtscFullFrame => 4_708_704,
            TimeMode::Pal => 5_644_800,
            TimeMode::Frames24 => 5_880_000,
            TimeMode::Frames1000 => 141_120,
            TimeMode::FilmFullFrame => 5_885_880,
            TimeMode::Custom => 11_289_600,
            TimeMode::Frames96 => 1_470_000,
            TimeMode::Frames72 => 1_960_000,
            TimeMode::Frames59Dot94 => 2_354_352,
            TimeMode::Frames119Dot88 => 1_177_176,
        };
        Some(ticks)
    }

    /// Nominal frames per second.
    #[must_use]
    pub fn frames_per_second(self) -> Option<f64> {
        self.ticks_per_frame()
            .map(|step| TICKS_PER_SECOND as f64 / step as f64)
    }
}

/// Closed tick interval `[start, stop]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeSpan {
    pub start: Ticks,
    pub stop: Ticks,
}

impl TimeSpan {
    #[must_use]
    pub fn new(start: Ticks, stop: Ticks) -> Self {
        Self { start, stop }
    }

    #[must_use]
    pub fn duration(&self) -> Ticks {
        self.stop - self.start
    }

    /// `start, start + step, …` up to and including `stop`.
    /// Empty when `stop < start`.
    pub fn steps(&self, step: Ticks) -> impl Iterator<Item = Ticks> + '_ {
        debug_assert!(step > 0);
        let step = step.max(1);
        std::iter::successors(Some(self.start), move |&t| t.checked_add(step))
            .take_while(move |&t| t <= self.stop)
    }

    /// Uniform frame grid for `mode`.
    pub fn sample_times(&self, mode: TimeMode) -> Result<Vec<Ticks>> {
        let step = mode
            .ticks_per_frame()
            .ok_or(PoseError::NoFixedFrameRate(mode))?;
        Ok(self.steps(step).collect())
    }
}
