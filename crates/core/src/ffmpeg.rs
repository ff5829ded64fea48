//! FFmpeg/FFprobe command utilities.
//!
//! Argument construction is kept in pure functions (`*_args`, filter
//! builders) so the exact command lines can be unit tested without the
//! binaries installed. The `async` entry points run the commands through
//! `tokio::process` and map failures into [`FfmpegError`].

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Error type for FFmpeg/FFprobe operations.
#[derive(Debug, thiserror::Error)]
pub enum FfmpegError {
    #[error("ffprobe/ffmpeg binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("ffprobe/ffmpeg execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to parse ffprobe output: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("media file not found: {0}")]
    MediaNotFound(String),
}

// ---------------------------------------------------------------------------
// ffprobe JSON output structures
// ---------------------------------------------------------------------------

/// Top-level ffprobe JSON output (`-print_format json -show_format -show_streams`).
#[derive(Debug, Deserialize)]
pub struct FfprobeOutput {
    #[serde(default)]
    pub streams: Vec<FfprobeStream>,
    pub format: FfprobeFormat,
}

/// A single stream from ffprobe output.
#[derive(Debug, Deserialize)]
pub struct FfprobeStream {
    pub index: i32,
    pub codec_type: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub duration: Option<String>,
}

/// Format-level metadata from ffprobe.
#[derive(Debug, Deserialize)]
pub struct FfprobeFormat {
    pub duration: Option<String>,
}

// ---------------------------------------------------------------------------
// Probing
// ---------------------------------------------------------------------------

/// Run `ffprobe` on a media file and return the parsed JSON output.
pub async fn inspect_media(path: &Path) -> Result<FfprobeOutput, FfmpegError> {
    ensure_exists(path)?;

    let output = tokio::process::Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .await
        .map_err(FfmpegError::NotFound)?;

    if !output.status.success() {
        return Err(FfmpegError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str::<FfprobeOutput>(&stdout)
        .map_err(|e| FfmpegError::ParseError(format!("{e}: {stdout}")))
}

/// Find the first stream of the given kind (`"video"`, `"audio"`).
fn first_stream<'a>(info: &'a FfprobeOutput, kind: &str) -> Option<&'a FfprobeStream> {
    info.streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some(kind))
}

/// Parse the media duration in seconds from ffprobe output.
pub fn parse_duration(info: &FfprobeOutput) -> f64 {
    // Try format-level duration first.
    if let Some(secs) = info
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
    {
        return secs;
    }
    // Fall back to the first video stream's duration.
    first_stream(info, "video")
        .and_then(|s| s.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Find the first video stream's resolution. Still images show up as a
/// single-frame video stream.
pub fn parse_resolution(info: &FfprobeOutput) -> (i32, i32) {
    first_stream(info, "video")
        .map(|s| (s.width.unwrap_or(0), s.height.unwrap_or(0)))
        .unwrap_or((0, 0))
}

/// Whether the inspected file carries at least one audio stream.
pub fn has_audio(info: &FfprobeOutput) -> bool {
    first_stream(info, "audio").is_some()
}

// ---------------------------------------------------------------------------
// Argument builders
// ---------------------------------------------------------------------------

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// `ffmpeg` arguments to transcode any media file into an MP3.
pub fn mp3_args(input: &Path, output: &Path, bitrate: &str) -> Vec<String> {
    vec![
        "-y".into(),
        "-i".into(),
        path_arg(input),
        "-vn".into(),
        "-acodec".into(),
        "libmp3lame".into(),
        "-b:a".into(),
        bitrate.into(),
        path_arg(output),
    ]
}

/// `ffmpeg` arguments to dump every I-frame as a JPEG.
///
/// `pattern` is an image2 output pattern such as `/tmp/<job>_%03d.jpg`.
pub fn keyframe_args(input: &Path, pattern: &Path) -> Vec<String> {
    vec![
        "-y".into(),
        "-i".into(),
        path_arg(input),
        "-vf".into(),
        "select='eq(pict_type,I)',scale=iw*sar:ih,setsar=1".into(),
        "-vsync".into(),
        "vfr".into(),
        path_arg(pattern),
    ]
}

/// Contents of a concat-demuxer list file.
pub fn concat_list(inputs: &[PathBuf]) -> String {
    inputs
        .iter()
        .map(|p| format!("file '{}'\n", path_arg(p).replace('\'', r"'\''")))
        .collect()
}

/// `ffmpeg` arguments to losslessly concatenate the files of a list.
pub fn concat_args(list: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".into(),
        "-f".into(),
        "concat".into(),
        "-safe".into(),
        "0".into(),
        "-i".into(),
        path_arg(list),
        "-c".into(),
        "copy".into(),
        path_arg(output),
    ]
}

/// Parameters of a still-image zoom video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomParams {
    /// Output length in seconds.
    pub length: f64,
    pub frame_rate: u32,
    /// Zoom gained per second, as a fraction (`0.03` = 3 %).
    pub zoom_speed: f64,
}

/// Scale and output size for a zoom video: landscape sources render
/// 1920x1080, everything else 1080x1920. The source is upscaled first so
/// the zoom stays sharp.
pub fn zoom_dimensions(width: i32, height: i32) -> (&'static str, &'static str) {
    if width > height {
        ("7680:4320", "1920x1080")
    } else {
        ("4320:7680", "1080x1920")
    }
}

/// The `scale,zoompan` filter chain for a zoom video.
pub fn zoompan_filter(params: ZoomParams, width: i32, height: i32) -> String {
    let (scale, size) = zoom_dimensions(width, height);
    let total_frames = (params.length * f64::from(params.frame_rate)) as u64;
    let zoom_factor = 1.0 + params.zoom_speed * params.length;
    format!(
        "scale={scale},zoompan=z='min(1+({speed}*{length})*on/{total_frames}, {zoom_factor})':\
         d={total_frames}:x='iw/2-(iw/zoom/2)':y='ih/2-(ih/zoom/2)':s={size}",
        speed = params.zoom_speed,
        length = params.length,
    )
}

/// `ffmpeg` arguments to render a still image into a zooming H.264 video.
pub fn zoom_args(image: &Path, output: &Path, params: ZoomParams, width: i32, height: i32) -> Vec<String> {
    vec![
        "-y".into(),
        "-framerate".into(),
        params.frame_rate.to_string(),
        "-loop".into(),
        "1".into(),
        "-i".into(),
        path_arg(image),
        "-vf".into(),
        zoompan_filter(params, width, height),
        "-c:v".into(),
        "libx264".into(),
        "-t".into(),
        params.length.to_string(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        path_arg(output),
    ]
}

/// Which input decides the length of a mixed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputLength {
    Video,
    Audio,
}

/// Everything needed to build an audio-mixing command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixPlan {
    pub video_duration: f64,
    pub audio_duration: f64,
    /// Whether the video brings its own soundtrack to blend in.
    pub video_has_audio: bool,
    /// Volumes in percent (`0..=100`).
    pub video_vol: f64,
    pub audio_vol: f64,
    pub output_length: OutputLength,
}

impl MixPlan {
    /// The video has to loop when the output follows a longer audio track.
    pub fn loops_video(&self) -> bool {
        self.output_length == OutputLength::Audio && self.audio_duration > self.video_duration
    }

    pub fn output_duration(&self) -> f64 {
        match self.output_length {
            OutputLength::Video => self.video_duration,
            OutputLength::Audio => self.audio_duration,
        }
    }

    /// The `-filter_complex` graph producing the `[a]` output pad.
    pub fn filter(&self) -> String {
        let mut filter = format!("[1:a]volume={}", self.audio_vol / 100.0);
        if self.output_length == OutputLength::Video {
            filter.push_str(&format!(",atrim=duration={}", self.video_duration));
        }
        if self.video_has_audio {
            filter.push_str(&format!(
                "[music];[0:a]volume={}[orig];[orig][music]amix=inputs=2:duration=longest[a]",
                self.video_vol / 100.0
            ));
        } else {
            filter.push_str("[a]");
        }
        filter
    }

    /// `ffmpeg` arguments mixing `audio` into `video`.
    pub fn args(&self, video: &Path, audio: &Path, output: &Path) -> Vec<String> {
        let mut args: Vec<String> = vec!["-y".into()];
        if self.loops_video() {
            args.extend(["-stream_loop".into(), "-1".into()]);
        }
        args.extend(["-i".into(), path_arg(video), "-i".into(), path_arg(audio)]);
        args.extend([
            "-filter_complex".into(),
            self.filter(),
            "-map".into(),
            "0:v".into(),
            "-map".into(),
            "[a]".into(),
            "-c:v".into(),
            if self.loops_video() { "libx264" } else { "copy" }.into(),
            "-c:a".into(),
            "aac".into(),
            "-t".into(),
            self.output_duration().to_string(),
            path_arg(output),
        ]);
        args
    }
}

/// The `subtitles` video filter, optionally forcing an ASS style.
pub fn subtitle_filter(subtitles: &Path, force_style: Option<&str>) -> String {
    let mut filter = format!("subtitles='{}'", path_arg(subtitles));
    if let Some(style) = force_style.filter(|s| !s.is_empty()) {
        filter.push_str(&format!(":force_style='{style}'"));
    }
    filter
}

/// `ffmpeg` arguments to burn subtitles into a video.
pub fn subtitle_args(video: &Path, subtitles: &Path, output: &Path, force_style: Option<&str>) -> Vec<String> {
    vec![
        "-y".into(),
        "-i".into(),
        path_arg(video),
        "-vf".into(),
        subtitle_filter(subtitles, force_style),
        "-c:a".into(),
        "copy".into(),
        path_arg(output),
    ]
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

fn ensure_exists(path: &Path) -> Result<(), FfmpegError> {
    if path.exists() {
        Ok(())
    } else {
        Err(FfmpegError::MediaNotFound(path_arg(path)))
    }
}

/// Run `ffmpeg` with the given arguments, failing on a non-zero exit.
pub async fn run_ffmpeg(args: &[String]) -> Result<(), FfmpegError> {
    tracing::debug!(args = %args.join(" "), "Running ffmpeg");

    let output = tokio::process::Command::new("ffmpeg")
        .args(args)
        .output()
        .await
        .map_err(FfmpegError::NotFound)?;

    if !output.status.success() {
        return Err(FfmpegError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(())
}

/// Transcode `input` into an MP3 at `output`.
pub async fn convert_to_mp3(input: &Path, output: &Path, bitrate: &str) -> Result<(), FfmpegError> {
    ensure_exists(input)?;
    run_ffmpeg(&mp3_args(input, output, bitrate)).await
}

/// Extract the I-frames of `input` into `output_dir` as
/// `<prefix>_NNN.jpg` and return their paths in frame order.
pub async fn extract_keyframes(
    input: &Path,
    output_dir: &Path,
    prefix: &str,
) -> Result<Vec<PathBuf>, FfmpegError> {
    ensure_exists(input)?;
    tokio::fs::create_dir_all(output_dir).await?;

    let pattern = output_dir.join(format!("{prefix}_%03d.jpg"));
    run_ffmpeg(&keyframe_args(input, &pattern)).await?;

    let mut frames = Vec::new();
    let mut entries = tokio::fs::read_dir(output_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with(&format!("{prefix}_")) && name.ends_with(".jpg") {
            frames.push(entry.path());
        }
    }
    frames.sort();
    Ok(frames)
}

/// Concatenate `inputs` (same codecs) into `output`.
///
/// The concat list is written next to the output and removed afterwards.
pub async fn concat_videos(inputs: &[PathBuf], output: &Path) -> Result<(), FfmpegError> {
    for input in inputs {
        ensure_exists(input)?;
    }

    let list = output.with_extension("txt");
    tokio::fs::write(&list, concat_list(inputs)).await?;
    let result = run_ffmpeg(&concat_args(&list, output)).await;
    let _ = tokio::fs::remove_file(&list).await;
    result
}

/// Render a still image into a zooming video.
pub async fn image_to_video(image: &Path, output: &Path, params: ZoomParams) -> Result<(), FfmpegError> {
    let info = inspect_media(image).await?;
    let (width, height) = parse_resolution(&info);
    tracing::debug!(width, height, "Inspected source image");
    run_ffmpeg(&zoom_args(image, output, params, width, height)).await
}

/// Mix the `audio` file into `video`.
pub async fn mix_audio(
    video: &Path,
    audio: &Path,
    output: &Path,
    video_vol: f64,
    audio_vol: f64,
    output_length: OutputLength,
) -> Result<(), FfmpegError> {
    let video_info = inspect_media(video).await?;
    let audio_info = inspect_media(audio).await?;

    let plan = MixPlan {
        video_duration: parse_duration(&video_info),
        audio_duration: parse_duration(&audio_info),
        video_has_audio: has_audio(&video_info),
        video_vol,
        audio_vol,
        output_length,
    };
    run_ffmpeg(&plan.args(video, audio, output)).await
}

/// Burn a subtitle file (SRT or ASS) into `video`.
pub async fn burn_subtitles(
    video: &Path,
    subtitles: &Path,
    output: &Path,
    force_style: Option<&str>,
) -> Result<(), FfmpegError> {
    ensure_exists(video)?;
    ensure_exists(subtitles)?;
    run_ffmpeg(&subtitle_args(video, subtitles, output, force_style)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_stream(width: i32, height: i32, duration: Option<&str>) -> FfprobeStream {
        FfprobeStream {
            index: 0,
            codec_type: Some("video".into()),
            width: Some(width),
            height: Some(height),
            duration: duration.map(Into::into),
        }
    }

    fn audio_stream() -> FfprobeStream {
        FfprobeStream {
            index: 1,
            codec_type: Some("audio".into()),
            width: None,
            height: None,
            duration: None,
        }
    }

    #[test]
    fn test_parse_duration_from_format() {
        let info = FfprobeOutput {
            streams: vec![],
            format: FfprobeFormat {
                duration: Some("120.5".to_string()),
            },
        };
        assert!((parse_duration(&info) - 120.5).abs() < 0.001);
    }

    #[test]
    fn test_parse_duration_from_stream() {
        let info = FfprobeOutput {
            streams: vec![video_stream(1920, 1080, Some("60.0"))],
            format: FfprobeFormat { duration: None },
        };
        assert!((parse_duration(&info) - 60.0).abs() < 0.001);
    }

    #[test]
    fn test_parse_resolution_and_audio() {
        let info = FfprobeOutput {
            streams: vec![video_stream(3840, 2160, None), audio_stream()],
            format: FfprobeFormat { duration: None },
        };
        assert_eq!(parse_resolution(&info), (3840, 2160));
        assert!(has_audio(&info));
    }

    #[test]
    fn test_parse_ffprobe_json() {
        let raw = r#"{"streams":[{"index":0,"codec_type":"video","width":640,"height":480}],
                      "format":{"duration":"3.5"}}"#;
        let info: FfprobeOutput = serde_json::from_str(raw).unwrap();
        assert_eq!(parse_resolution(&info), (640, 480));
        assert!(!has_audio(&info));
        assert!((parse_duration(&info) - 3.5).abs() < 0.001);
    }

    #[test]
    fn test_mp3_args() {
        let args = mp3_args(Path::new("/in/a.mp4"), Path::new("/out/a.mp3"), "192k");
        assert_eq!(
            args,
            ["-y", "-i", "/in/a.mp4", "-vn", "-acodec", "libmp3lame", "-b:a", "192k", "/out/a.mp3"]
        );
    }

    #[test]
    fn test_concat_list_escapes_quotes() {
        let list = concat_list(&[PathBuf::from("/tmp/a.mp4"), PathBuf::from("/tmp/it's.mp4")]);
        assert_eq!(list, "file '/tmp/a.mp4'\nfile '/tmp/it'\\''s.mp4'\n");
    }

    #[test]
    fn test_zoom_dimensions_follow_orientation() {
        assert_eq!(zoom_dimensions(1920, 1080), ("7680:4320", "1920x1080"));
        assert_eq!(zoom_dimensions(1080, 1920), ("4320:7680", "1080x1920"));
        assert_eq!(zoom_dimensions(500, 500), ("4320:7680", "1080x1920"));
    }

    #[test]
    fn test_zoompan_filter() {
        let params = ZoomParams {
            length: 5.0,
            frame_rate: 30,
            zoom_speed: 0.03,
        };
        let filter = zoompan_filter(params, 1600, 900);
        assert!(filter.starts_with("scale=7680:4320,zoompan="));
        assert!(filter.contains("d=150:"));
        assert!(filter.contains("*on/150, 1.1"));
        assert!(filter.ends_with(":s=1920x1080"));
    }

    #[test]
    fn test_mix_plan_without_video_audio() {
        let plan = MixPlan {
            video_duration: 10.0,
            audio_duration: 30.0,
            video_has_audio: false,
            video_vol: 100.0,
            audio_vol: 50.0,
            output_length: OutputLength::Video,
        };
        assert!(!plan.loops_video());
        assert_eq!(plan.filter(), "[1:a]volume=0.5,atrim=duration=10[a]");
        let args = plan.args(Path::new("v.mp4"), Path::new("a.mp3"), Path::new("o.mp4"));
        assert_eq!(args[1], "-i");
        assert!(args.windows(2).any(|w| w[0] == "-c:v" && w[1] == "copy"));
        assert!(args.windows(2).any(|w| w[0] == "-t" && w[1] == "10"));
    }

    #[test]
    fn test_mix_plan_loops_video_for_longer_audio() {
        let plan = MixPlan {
            video_duration: 10.0,
            audio_duration: 30.0,
            video_has_audio: true,
            video_vol: 20.0,
            audio_vol: 100.0,
            output_length: OutputLength::Audio,
        };
        assert!(plan.loops_video());
        assert_eq!(
            plan.filter(),
            "[1:a]volume=1[music];[0:a]volume=0.2[orig];[orig][music]amix=inputs=2:duration=longest[a]"
        );
        let args = plan.args(Path::new("v.mp4"), Path::new("a.mp3"), Path::new("o.mp4"));
        assert_eq!(&args[1..4], ["-stream_loop", "-1", "-i"]);
        assert!(args.windows(2).any(|w| w[0] == "-c:v" && w[1] == "libx264"));
        assert!(args.windows(2).any(|w| w[0] == "-t" && w[1] == "30"));
    }

    #[test]
    fn test_subtitle_filter() {
        assert_eq!(
            subtitle_filter(Path::new("/tmp/j.srt"), None),
            "subtitles='/tmp/j.srt'"
        );
        assert_eq!(
            subtitle_filter(Path::new("/tmp/j.srt"), Some("FontSize=24")),
            "subtitles='/tmp/j.srt':force_style='FontSize=24'"
        );
    }

    #[tokio::test]
    async fn test_convert_missing_input() {
        let err = convert_to_mp3(Path::new("/definitely/missing.mp4"), Path::new("/tmp/x.mp3"), "128k")
            .await
            .unwrap_err();
        assert!(matches!(err, FfmpegError::MediaNotFound(_)));
    }
}
