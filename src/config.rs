use std::{fs::File, io::BufReader, path::Path};

use image::imageops::FilterType;

use crate::foundation::{
    core::{AspectRatio, Canvas, Fps},
    error::{ReelError, ReelResult},
};

/// Resampling filter used when scaling stills.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl ResampleFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Fixed encoder profile. One codec, one preset, one pixel format per run.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncoderProfile {
    /// ffmpeg video codec name.
    pub codec: String,
    /// Speed/quality preset passed as `-preset`.
    pub preset: String,
    /// Output pixel format.
    pub pix_fmt: String,
    /// Optional constant rate factor; encoder default when `None`.
    pub crf: Option<u8>,
}

impl Default for EncoderProfile {
    fn default() -> Self {
        Self {
            codec: "libx264".to_string(),
            preset: "medium".to_string(),
            pix_fmt: "yuv420p".to_string(),
            crf: None,
        }
    }
}

/// Immutable render settings shared by every stage of a job.
///
/// Pass one of these into [`Pipeline::new`](crate::Pipeline::new). Nothing in the crate reads
/// ambient globals, so jobs with different settings can run side by side.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ReelConfig {
    /// Canonical output resolution for stills and frames.
    pub canvas: Canvas,
    /// Portrait crop ratio. Must agree with `canvas`.
    pub aspect: AspectRatio,
    pub fps: Fps,
    pub encoder: EncoderProfile,
    /// Length of the zoom/fade window inside each clip.
    pub transition_secs: f64,
    pub min_still_secs: f64,
    pub max_still_secs: f64,
    /// Upper bound on images per job.
    pub max_images: usize,
    pub resample: ResampleFilter,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self::portrait_hd()
    }
}

impl ReelConfig {
    /// 1080x1920 at 30 fps.
    pub fn portrait_hd() -> Self {
        Self {
            canvas: Canvas {
                width: 1080,
                height: 1920,
            },
            aspect: AspectRatio::PORTRAIT_9_16,
            fps: Fps::default(),
            encoder: EncoderProfile::default(),
            transition_secs: 0.5,
            min_still_secs: 1.0,
            max_still_secs: 10.0,
            max_images: 30,
            resample: ResampleFilter::default(),
        }
    }

    /// 608x1080 at 30 fps.
    pub fn portrait_sd() -> Self {
        Self {
            canvas: Canvas {
                width: 608,
                height: 1080,
            },
            ..Self::portrait_hd()
        }
    }

    /// Same settings with a different canvas height; width follows the aspect ratio.
    pub fn with_height(mut self, height: u32) -> Self {
        self.canvas = Canvas {
            width: self.aspect.width_for_height(height),
            height,
        };
        self
    }

    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn from_reader(r: impl std::io::Read) -> ReelResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| ReelError::validation(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> ReelResult<()> {
        let Canvas { width, height } = self.canvas;
        if width == 0 || height == 0 {
            return Err(ReelError::validation("canvas width/height must be non-zero"));
        }
        if !width.is_multiple_of(2) || !height.is_multiple_of(2) {
            // yuv420p needs even dimensions.
            return Err(ReelError::validation(format!(
                "canvas {} must have even width/height",
                self.canvas
            )));
        }
        if self.aspect.num == 0 || self.aspect.den == 0 {
            return Err(ReelError::validation("aspect ratio terms must be > 0"));
        }
        if self.aspect.width_for_height(height) != width {
            return Err(ReelError::validation(format!(
                "canvas {} does not match aspect ratio {}",
                self.canvas, self.aspect
            )));
        }
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(ReelError::validation("fps must be non-zero"));
        }
        if !self.transition_secs.is_finite() || self.transition_secs <= 0.0 {
            return Err(ReelError::invalid_duration(format!(
                "transition_secs must be positive, got {}",
                self.transition_secs
            )));
        }
        if !self.min_still_secs.is_finite()
            || !self.max_still_secs.is_finite()
            || self.min_still_secs <= 0.0
            || self.min_still_secs > self.max_still_secs
        {
            return Err(ReelError::invalid_duration(format!(
                "still duration bounds [{}, {}] are invalid",
                self.min_still_secs, self.max_still_secs
            )));
        }
        if self.transition_secs > self.min_still_secs {
            return Err(ReelError::invalid_duration(format!(
                "transition_secs {} exceeds min_still_secs {}",
                self.transition_secs, self.min_still_secs
            )));
        }
        if self.max_images == 0 {
            return Err(ReelError::validation("max_images must be > 0"));
        }
        if self.encoder.codec.trim().is_empty() || self.encoder.pix_fmt.trim().is_empty() {
            return Err(ReelError::validation("encoder codec/pix_fmt must be non-empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
