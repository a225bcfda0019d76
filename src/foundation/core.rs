use std::fmt;

use crate::foundation::error::{ReelError, ReelResult};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> ReelResult<Self> {
        if den == 0 {
            return Err(ReelError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ReelError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Number of whole frames covering `secs`, rounded to nearest.
    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn dims(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Width-to-height ratio kept as a rational so crop arithmetic stays exact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AspectRatio {
    pub num: u32,
    pub den: u32,
}

impl AspectRatio {
    /// 9:16 portrait.
    pub const PORTRAIT_9_16: Self = Self { num: 9, den: 16 };

    pub fn new(num: u32, den: u32) -> ReelResult<Self> {
        if num == 0 || den == 0 {
            return Err(ReelError::validation("aspect ratio terms must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// `round(height * num / den)`, half rounding up.
    pub fn width_for_height(self, height: u32) -> u32 {
        div_round(u64::from(height) * u64::from(self.num), u64::from(self.den))
    }

    /// `round(width * den / num)`, half rounding up.
    pub fn height_for_width(self, width: u32) -> u32 {
        div_round(u64::from(width) * u64::from(self.den), u64::from(self.num))
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::PORTRAIT_9_16
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.num, self.den)
    }
}

pub(crate) fn div_round(n: u64, d: u64) -> u32 {
    ((n + d / 2) / d).min(u64::from(u32::MAX)) as u32
}

/// Coarse pipeline stage, used for progress and error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Decode, crop and resize source images.
    Process,
    /// Assign transitions and plan clips.
    Compose,
    /// Render clip frames and stream them into the encoder.
    Encode,
}

impl Stage {
    /// Span of the overall progress bar covered by this stage.
    pub fn progress_span(self) -> (f64, f64) {
        match self {
            Self::Process => (0.0, 0.4),
            Self::Compose => (0.4, 0.5),
            Self::Encode => (0.5, 1.0),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Process => "process",
            Self::Compose => "compose",
            Self::Encode => "encode",
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
