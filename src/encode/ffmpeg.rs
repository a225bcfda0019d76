use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use image::RgbImage;

use crate::config::EncoderProfile;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Codec settings passed to ffmpeg.
    pub profile: EncoderProfile,
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path` with the default profile.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            profile: EncoderProfile::default(),
        }
    }

    pub fn with_profile(mut self, profile: EncoderProfile) -> Self {
        self.profile = profile;
        self
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw RGB24 frames to stdin.
///
/// A sink that is aborted, fails, or is dropped before `end` removes the file it was writing.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    frames_written: u64,
    created_output: bool,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            last_idx: None,
            frames_written: 0,
            created_output: false,
        }
    }

    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn command(&self, cfg: SinkConfig) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.args(ffmpeg_args(&self.opts, cfg));
        cmd.arg(&self.opts.out_path);
        cmd
    }

    fn join_stderr(&mut self) -> String {
        let bytes = match self.stderr_drain.take() {
            Some(handle) => match handle.join() {
                Ok(Ok(bytes)) => bytes,
                Ok(Err(e)) => format!("ffmpeg stderr read failed: {e}").into_bytes(),
                Err(_) => b"ffmpeg stderr drain thread panicked".to_vec(),
            },
            None => Vec::new(),
        };
        String::from_utf8_lossy(&bytes).trim().to_owned()
    }

    fn discard_output(&mut self) {
        if !self.created_output {
            return;
        }
        self.created_output = false;
        match std::fs::remove_file(&self.opts.out_path) {
            Ok(()) => tracing::debug!(path = %self.opts.out_path.display(), "removed partial output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.opts.out_path.display(),
                error = %e,
                "failed to remove partial output"
            ),
        }
    }
}

/// Arguments placed between `ffmpeg` and the output path.
pub(crate) fn ffmpeg_args(opts: &FfmpegSinkOpts, cfg: SinkConfig) -> Vec<String> {
    let profile = &opts.profile;
    let mut args: Vec<String> = Vec::with_capacity(32);
    args.push(if opts.overwrite { "-y" } else { "-n" }.to_owned());
    args.extend(
        [
            "-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgb24", "-s",
        ]
        .map(String::from),
    );
    args.push(format!("{}x{}", cfg.width, cfg.height));
    args.extend(input_fps_args(cfg.fps));
    args.extend(["-i", "pipe:0", "-an", "-c:v"].map(String::from));
    args.push(profile.codec.clone());
    if !profile.preset.is_empty() {
        args.push("-preset".to_owned());
        args.push(profile.preset.clone());
    }
    if let Some(crf) = profile.crf {
        args.push("-crf".to_owned());
        args.push(crf.to_string());
    }
    args.push("-pix_fmt".to_owned());
    args.push(profile.pix_fmt.clone());
    args.extend(["-movflags", "+faststart", "-f", "mp4"].map(String::from));
    args
}

fn input_fps_args(fps: Fps) -> [String; 2] {
    // Rawvideo input rate goes before `-i`, as a rational.
    ["-r".to_owned(), format!("{}/{}", fps.num, fps.den)]
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(ReelError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ReelError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        if self.child.is_some() {
            return Err(ReelError::encoding("ffmpeg sink already started"));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(ReelError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(ReelError::encoding(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut child = self.command(cfg).spawn().map_err(|e| {
            ReelError::encoding(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        self.created_output = true;

        let (Some(stdin), Some(mut stderr)) = (child.stdin.take(), child.stderr.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            self.discard_output();
            return Err(ReelError::encoding("failed to open ffmpeg pipes (unexpected)"));
        };
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            codec = %self.opts.profile.codec,
            "ffmpeg started"
        );

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.frames_written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &RgbImage) -> ReelResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| ReelError::encoding("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ReelError::encoding(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.dimensions() != (cfg.width, cfg.height) {
            return Err(ReelError::encoding(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::encoding("ffmpeg sink is already finalized"));
        };
        if let Err(e) = stdin.write_all(frame.as_raw()) {
            // A closed pipe usually means ffmpeg exited; its stderr says why.
            drop(self.stdin.take());
            if let Some(mut child) = self.child.take() {
                let _ = child.wait();
            }
            let stderr = self.join_stderr();
            return Err(ReelError::encoding(format!(
                "failed to write frame {} to ffmpeg stdin: {e}{}",
                idx.0,
                if stderr.is_empty() {
                    String::new()
                } else {
                    format!(" ({stderr})")
                }
            )));
        }
        self.frames_written += 1;
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReelError::encoding("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| ReelError::encoding(format!("failed to wait for ffmpeg to finish: {e}")));
        let stderr = self.join_stderr();
        self.cfg = None;

        let status = match status {
            Ok(s) => s,
            Err(e) => {
                self.discard_output();
                return Err(e);
            }
        };
        if !status.success() {
            self.discard_output();
            return Err(ReelError::encoding(format!(
                "ffmpeg exited with status {status}: {stderr}"
            )));
        }

        self.created_output = false;
        tracing::debug!(frames = self.frames_written, "ffmpeg finished");
        Ok(())
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        let _ = self.join_stderr();
        self.cfg = None;
        self.discard_output();
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() || self.created_output {
            self.abort();
        }
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
