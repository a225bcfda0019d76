use super::*;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::new(30, 1).unwrap(),
    }
}

#[test]
fn args_stream_rgb24_into_h264_mp4() {
    let opts = FfmpegSinkOpts::new("out.mp4");
    let args = ffmpeg_args(&opts, cfg(1080, 1920));
    let joined = args.join(" ");
    assert!(args[0] == "-y");
    assert!(joined.contains("-f rawvideo -pix_fmt rgb24 -s 1080x1920 -r 30/1 -i pipe:0"));
    assert!(joined.contains("-c:v libx264 -preset medium -pix_fmt yuv420p"));
    assert!(joined.ends_with("-movflags +faststart -f mp4"));
    assert!(!joined.contains("-crf"));
}

#[test]
fn args_follow_profile_and_overwrite() {
    let mut opts = FfmpegSinkOpts::new("out.mp4").with_profile(EncoderProfile {
        codec: "libx265".to_owned(),
        preset: "fast".to_owned(),
        pix_fmt: "yuv420p".to_owned(),
        crf: Some(23),
    });
    opts.overwrite = false;
    let args = ffmpeg_args(&opts, SinkConfig {
        fps: Fps::new(30_000, 1001).unwrap(),
        ..cfg(608, 1080)
    });
    let joined = args.join(" ");
    assert_eq!(args[0], "-n");
    assert!(joined.contains("-r 30000/1001"));
    assert!(joined.contains("-c:v libx265 -preset fast -crf 23"));
}

#[test]
fn begin_rejects_odd_or_empty_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(dir.path().join("a.mp4")));
    assert!(matches!(sink.begin(cfg(107, 192)), Err(ReelError::Validation(_))));
    assert!(matches!(sink.begin(cfg(0, 192)), Err(ReelError::Validation(_))));
    assert!(!dir.path().join("a.mp4").exists());
}

#[test]
fn begin_refuses_existing_file_without_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("keep.mp4");
    std::fs::write(&out, b"existing").unwrap();

    let mut opts = FfmpegSinkOpts::new(&out);
    opts.overwrite = false;
    let mut sink = FfmpegSink::new(opts);
    assert!(sink.begin(cfg(108, 192)).is_err());
    sink.abort();
    drop(sink);
    assert_eq!(std::fs::read(&out).unwrap(), b"existing");
}

#[test]
fn push_before_begin_fails() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("never.mp4"));
    let err = sink
        .push_frame(FrameIndex(0), &RgbImage::new(2, 2))
        .unwrap_err();
    assert!(matches!(err, ReelError::EncodingFailure { .. }));
    assert!(sink.end().is_err());
}

#[test]
fn ensure_parent_dir_creates_nested_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("a/b/out.mp4");
    ensure_parent_dir(&out).unwrap();
    assert!(dir.path().join("a/b").is_dir());
    ensure_parent_dir(Path::new("bare.mp4")).unwrap();
}

#[test]
fn aborted_encode_leaves_no_file() {
    if !is_ffmpeg_on_path() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("partial.mp4");
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out));
    sink.begin(cfg(16, 16)).unwrap();
    for i in 0..3 {
        sink.push_frame(FrameIndex(i), &RgbImage::new(16, 16)).unwrap();
    }
    sink.abort();
    assert!(!out.exists());
}

#[test]
fn encodes_a_short_clip() {
    if !is_ffmpeg_on_path() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("ok.mp4");
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out));
    sink.begin(cfg(16, 16)).unwrap();
    for i in 0..10 {
        let frame = RgbImage::from_pixel(16, 16, image::Rgb([(i * 20) as u8, 40, 90]));
        sink.push_frame(FrameIndex(i), &frame).unwrap();
    }
    assert!(
        sink.push_frame(FrameIndex(9), &RgbImage::new(16, 16))
            .is_err()
    );
    sink.end().unwrap();
    assert_eq!(sink.frames_written(), 10);
    drop(sink);
    assert!(std::fs::metadata(&out).unwrap().len() > 0);
}
