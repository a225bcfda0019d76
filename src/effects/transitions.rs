use std::{fmt, str::FromStr};

use crate::foundation::{
    core::{FrameIndex, Fps},
    error::{ReelError, ReelResult},
    math::unit_to_u8,
};

/// Scale reached by the zoom transitions.
pub const ZOOM_PEAK: f64 = 1.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    ZoomIn,
    ZoomOut,
    FadeIn,
    FadeOut,
}

impl TransitionKind {
    /// Canonical cycling order.
    pub const ALL: [Self; 4] = [Self::ZoomIn, Self::ZoomOut, Self::FadeIn, Self::FadeOut];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ZoomIn => "zoom_in",
            Self::ZoomOut => "zoom_out",
            Self::FadeIn => "fade_in",
            Self::FadeOut => "fade_out",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransitionKind {
    type Err = ReelError;

    fn from_str(s: &str) -> ReelResult<Self> {
        parse_transition_kind(s)
    }
}

pub fn parse_transition_kind(kind: &str) -> ReelResult<TransitionKind> {
    let kind = kind.trim().to_ascii_lowercase();
    if kind.is_empty() {
        return Err(ReelError::validation("transition kind must be non-empty"));
    }
    match kind.as_str() {
        "zoom_in" | "zoom-in" | "zoomin" => Ok(TransitionKind::ZoomIn),
        "zoom_out" | "zoom-out" | "zoomout" => Ok(TransitionKind::ZoomOut),
        "fade_in" | "fade-in" | "fadein" => Ok(TransitionKind::FadeIn),
        "fade_out" | "fade-out" | "fadeout" => Ok(TransitionKind::FadeOut),
        _ => Err(ReelError::validation(format!(
            "unknown transition kind '{kind}'"
        ))),
    }
}

/// Enabled subset of transition kinds. Iteration always follows [`TransitionKind::ALL`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionSet(u8);

impl TransitionSet {
    pub fn all() -> Self {
        Self::from_kinds(TransitionKind::ALL)
    }

    pub fn empty() -> Self {
        Self(0)
    }

    pub fn from_kinds(kinds: impl IntoIterator<Item = TransitionKind>) -> Self {
        Self(kinds.into_iter().fold(0, |acc, k| acc | k.bit()))
    }

    /// Parse a list of kind names; unknown names are an error.
    pub fn parse<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> ReelResult<Self> {
        let mut set = Self::empty();
        for name in names {
            set.insert(parse_transition_kind(name.as_ref())?);
        }
        Ok(set)
    }

    pub fn insert(&mut self, kind: TransitionKind) {
        self.0 |= kind.bit();
    }

    pub fn contains(self, kind: TransitionKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = TransitionKind> {
        TransitionKind::ALL
            .into_iter()
            .filter(move |k| self.contains(*k))
    }

    /// Round-robin pick for the image at `index`.
    pub fn select(self, index: usize) -> ReelResult<TransitionKind> {
        let n = self.len();
        if n == 0 {
            return Err(ReelError::validation(
                "at least one transition must be enabled",
            ));
        }
        self.iter()
            .nth(index % n)
            .ok_or_else(|| ReelError::validation("transition selection out of range"))
    }

    /// Kinds assigned to `count` images in order.
    pub fn assign(self, count: usize) -> ReelResult<Vec<TransitionKind>> {
        (0..count).map(|i| self.select(i)).collect()
    }
}

impl Default for TransitionSet {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Debug for TransitionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<TransitionKind> for TransitionSet {
    fn from_iter<I: IntoIterator<Item = TransitionKind>>(iter: I) -> Self {
        Self::from_kinds(iter)
    }
}

/// Per-frame effect parameters. Frames with equal params are identical.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameOp {
    /// Unmodified still.
    Identity,
    /// Centered magnification by the given factor (> 1.0).
    Scale(f64),
    /// Per-channel multiply by `gain / 255`.
    Gain(u8),
}

/// Timing of one clip: what effect, how long it animates, how long the image is on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionSpec {
    pub kind: TransitionKind,
    pub duration_secs: f64,
    pub still_duration_secs: f64,
    pub frame_rate: Fps,
}

impl TransitionSpec {
    pub fn new(
        kind: TransitionKind,
        duration_secs: f64,
        still_duration_secs: f64,
        frame_rate: Fps,
    ) -> ReelResult<Self> {
        let spec = Self {
            kind,
            duration_secs,
            still_duration_secs,
            frame_rate,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> ReelResult<()> {
        let (td, sd) = (self.duration_secs, self.still_duration_secs);
        if !td.is_finite() || td <= 0.0 {
            return Err(ReelError::invalid_duration(format!(
                "transition duration must be positive, got {td}"
            )));
        }
        if !sd.is_finite() || sd <= 0.0 {
            return Err(ReelError::invalid_duration(format!(
                "still duration must be positive, got {sd}"
            )));
        }
        if td > sd {
            return Err(ReelError::invalid_duration(format!(
                "transition duration {td}s exceeds still duration {sd}s"
            )));
        }
        if self.frame_rate.num == 0 || self.frame_rate.den == 0 {
            return Err(ReelError::validation("frame rate must be non-zero"));
        }
        if self.frame_count() == 0 {
            return Err(ReelError::invalid_duration(format!(
                "still duration {sd}s is shorter than one frame"
            )));
        }
        Ok(())
    }

    /// `round(still_duration * frame_rate)`.
    pub fn frame_count(&self) -> u64 {
        self.frame_rate
            .secs_to_frames_round(self.still_duration_secs)
    }

    /// Presentation time of frame `i`.
    pub fn time_at(&self, i: FrameIndex) -> f64 {
        (i.0 as f64) * f64::from(self.frame_rate.den) / f64::from(self.frame_rate.num)
    }

    /// Fraction of the transition window elapsed at `t`, held at 1.0 afterwards.
    pub fn progress_at(&self, t: f64) -> f64 {
        t.clamp(0.0, self.duration_secs) / self.duration_secs
    }

    /// Fraction of the tail window elapsed at `t`; 0.0 before the tail starts.
    pub fn tail_progress_at(&self, t: f64) -> f64 {
        let start = self.still_duration_secs - self.duration_secs;
        self.progress_at(t - start)
    }

    /// Zoom factor at transition progress `tau`. `None` for fades.
    pub fn scale_at(&self, tau: f64) -> Option<f64> {
        let tau = tau.clamp(0.0, 1.0);
        let span = ZOOM_PEAK - 1.0;
        match self.kind {
            TransitionKind::ZoomIn => Some(1.0 + span * tau),
            TransitionKind::ZoomOut => Some(ZOOM_PEAK - span * tau),
            TransitionKind::FadeIn | TransitionKind::FadeOut => None,
        }
    }

    /// Effect parameters for frame `i`.
    pub fn frame_op(&self, i: FrameIndex) -> FrameOp {
        let t = self.time_at(i);
        match self.kind {
            TransitionKind::ZoomIn | TransitionKind::ZoomOut => {
                let s = self.scale_at(self.progress_at(t)).unwrap_or(1.0);
                if s <= 1.0 {
                    FrameOp::Identity
                } else {
                    FrameOp::Scale(s)
                }
            }
            TransitionKind::FadeIn => gain_op(self.progress_at(t)),
            TransitionKind::FadeOut => gain_op(1.0 - self.tail_progress_at(t)),
        }
    }
}

fn gain_op(level: f64) -> FrameOp {
    match unit_to_u8(level) {
        255 => FrameOp::Identity,
        g => FrameOp::Gain(g),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/transitions.rs"]
mod tests;
