use std::path::{Path, PathBuf};

use crate::{
    config::ReelConfig,
    effects::{
        clip::Clip,
        transitions::{TransitionKind, TransitionSpec},
    },
    encode::{
        ffmpeg::{FfmpegSink, FfmpegSinkOpts, ensure_parent_dir},
        sink::FrameSink,
    },
    foundation::{
        core::{Canvas, Fps, Stage},
        error::{ReelError, ReelResult},
    },
    pipeline::{
        job::RenderJob,
        progress::{ProgressReporter, ProgressTracker},
    },
    process::processor::{CanonicalStill, ImageProcessor},
    timeline::concat::{Timeline, TimelineStats},
};

/// What a finished job produced.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSummary {
    pub images: usize,
    pub still_duration_secs: f64,
    pub total_duration_secs: f64,
    pub total_frames: u64,
    pub canvas: Canvas,
    pub fps: Fps,
    /// Transition assigned to each image, in order.
    pub transitions: Vec<TransitionKind>,
    pub stats: TimelineStats,
    /// Final file, when the job wrote one.
    pub output: Option<PathBuf>,
}

/// Runs render jobs against one immutable configuration.
#[derive(Clone, Debug)]
pub struct Pipeline {
    cfg: ReelConfig,
    temp_root: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(cfg: ReelConfig) -> ReelResult<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            temp_root: None,
        })
    }

    /// Create per-job scratch directories under `root` instead of the system temp dir.
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    pub fn config(&self) -> &ReelConfig {
        &self.cfg
    }

    /// Render `job` to its output path and return that path.
    pub fn run<R: ProgressReporter + ?Sized>(
        &self,
        job: &RenderJob,
        reporter: &mut R,
    ) -> ReelResult<PathBuf> {
        let summary = self.run_with_summary(job, reporter)?;
        Ok(summary.output.unwrap_or_else(|| job.output.clone()))
    }

    /// Like [`Pipeline::run`], returning the full summary.
    ///
    /// The MP4 is encoded inside a per-job temporary directory and only moved to
    /// `job.output` once ffmpeg has finished successfully.
    #[tracing::instrument(skip_all, fields(images = job.sources.len(), output = %job.output.display()))]
    pub fn run_with_summary<R: ProgressReporter + ?Sized>(
        &self,
        job: &RenderJob,
        reporter: &mut R,
    ) -> ReelResult<RenderSummary> {
        job.validate(&self.cfg)?;

        let mut builder = tempfile::Builder::new();
        builder.prefix("reelkit-");
        let scratch = match &self.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| ReelError::encoding(format!("failed to create scratch directory: {e}")))?;
        let staged = scratch.path().join("reel.mp4");

        let mut sink = FfmpegSink::new(FfmpegSinkOpts {
            out_path: staged.clone(),
            overwrite: true,
            profile: self.cfg.encoder.clone(),
        });
        let mut summary = self.run_with_sink(job, &mut sink, reporter)?;
        drop(sink);

        persist(&staged, &job.output).map_err(|e| e.in_stage(Stage::Encode))?;
        if let Err(e) = scratch.close() {
            tracing::warn!(error = %e, "failed to remove scratch directory");
        }

        tracing::info!(
            output = %job.output.display(),
            secs = summary.total_duration_secs,
            "reel written"
        );
        summary.output = Some(job.output.clone());
        Ok(summary)
    }

    /// Run every stage against `sink`. Nothing is written to `job.output`.
    #[tracing::instrument(skip_all, fields(images = job.sources.len()))]
    pub fn run_with_sink<S, R>(
        &self,
        job: &RenderJob,
        sink: &mut S,
        reporter: &mut R,
    ) -> ReelResult<RenderSummary>
    where
        S: FrameSink + ?Sized,
        R: ProgressReporter + ?Sized,
    {
        job.validate(&self.cfg)?;
        let total = job.sources.len();
        let mut progress = ProgressTracker::new(reporter);
        progress.emit(Stage::Process, 0.0, format!("processing {total} image(s)"));

        tracing::info!(stage = %Stage::Process, images = total, "stage started");
        let stills = ImageProcessor::new(&self.cfg)
            .process_images(&job.sources, &job.cancel, |p| {
                progress.emit(
                    Stage::Process,
                    p.fraction(),
                    format!("processed image {}/{}", p.completed, p.total),
                );
            })
            .map_err(|e| e.in_stage(Stage::Process))?;

        tracing::info!(stage = %Stage::Compose, "stage started");
        let kinds = job
            .transitions
            .assign(total)
            .map_err(|e| e.in_stage(Stage::Compose))?;
        let timeline = self
            .compose(stills, &kinds, job.still_duration_secs)
            .map_err(|e| e.in_stage(Stage::Compose))?;
        let total_frames = timeline.total_frames();
        let total_duration_secs = timeline.duration_secs();
        progress.emit(
            Stage::Compose,
            1.0,
            format!("planned {total} clip(s), {total_frames} frames, {total_duration_secs:.2}s"),
        );

        tracing::info!(stage = %Stage::Encode, frames = total_frames, "stage started");
        let stats = timeline
            .concatenate(sink, &job.cancel, |p| {
                progress.emit(
                    Stage::Encode,
                    p.fraction(),
                    format!("encoded clip {}/{}", p.completed, p.total),
                );
            })
            .map_err(|e| e.in_stage(Stage::Encode))?;
        progress.emit(Stage::Encode, 1.0, "done");

        Ok(RenderSummary {
            images: total,
            still_duration_secs: job.still_duration_secs,
            total_duration_secs,
            total_frames,
            canvas: self.cfg.canvas,
            fps: self.cfg.fps,
            transitions: kinds,
            stats,
            output: None,
        })
    }

    fn compose(
        &self,
        stills: Vec<CanonicalStill>,
        kinds: &[TransitionKind],
        still_duration_secs: f64,
    ) -> ReelResult<Timeline> {
        let mut timeline = Timeline::new(self.cfg.canvas, self.cfg.fps);
        for (i, (still, &kind)) in stills.into_iter().zip(kinds).enumerate() {
            let spec = TransitionSpec::new(
                kind,
                self.cfg.transition_secs,
                still_duration_secs,
                self.cfg.fps,
            )?;
            let clip = Clip::new(still, spec).map_err(|e| e.at_index(i))?;
            tracing::debug!(clip = i, %kind, frames = clip.frame_count(), "clip planned");
            timeline.push(clip);
        }
        Ok(timeline)
    }
}

/// Move the finished file into place, copying through a `.partial` sibling when a rename is
/// not possible (e.g. across filesystems).
fn persist(staged: &Path, dest: &Path) -> ReelResult<()> {
    ensure_parent_dir(dest)?;
    if std::fs::rename(staged, dest).is_ok() {
        return Ok(());
    }

    let mut partial = dest.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);

    let copied = std::fs::copy(staged, &partial).and_then(|_| std::fs::rename(&partial, dest));
    if let Err(e) = copied {
        let _ = std::fs::remove_file(&partial);
        return Err(ReelError::encoding(format!(
            "failed to move output to '{}': {e}",
            dest.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/orchestrator.rs"]
mod tests;
