//! Speech-to-text through the `whisper` CLI.
//!
//! `whisper` writes its result as JSON next to the input; everything after
//! that (plain transcript, SRT, WebVTT, word-highlight ASS) is rendered
//! here by pure functions so the output formats can be unit tested without
//! the binary or a model installed.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Whisper model used for every job.
pub const WHISPER_MODEL: &str = "base";

/// Default character budget of one ASS caption line.
pub const DEFAULT_MAX_CHARS: usize = 56;

/// Error type for transcription runs.
#[derive(Debug, thiserror::Error)]
pub enum WhisperError {
    #[error("whisper binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("whisper execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to parse whisper output: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("media file not found: {0}")]
    MediaNotFound(String),
}

/// Requested shape of a transcription result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptFormat {
    /// The plain text, returned inline.
    #[default]
    Transcript,
    Srt,
    Vtt,
    /// Karaoke-style captions highlighting the current word.
    Ass,
}

impl TranscriptFormat {
    /// File extension of a subtitle format; `None` for the plain transcript.
    pub fn extension(self) -> Option<&'static str> {
        match self {
            Self::Transcript => None,
            Self::Srt => Some("srt"),
            Self::Vtt => Some("vtt"),
            Self::Ass => Some("ass"),
        }
    }
}

// ---------------------------------------------------------------------------
// whisper JSON output structures
// ---------------------------------------------------------------------------

/// Top-level JSON written by `whisper --output_format json`.
#[derive(Debug, Clone, Deserialize)]
pub struct Transcript {
    pub text: String,
    #[serde(default)]
    pub segments: Vec<Segment>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    /// Present when whisper ran with `--word_timestamps True`.
    #[serde(default)]
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Word {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Split a time in seconds into `(hours, minutes, seconds, millis)`.
fn clock(secs: f64) -> (u64, u64, u64, u64) {
    let total_ms = (secs.max(0.0) * 1000.0).round() as u64;
    (
        total_ms / 3_600_000,
        total_ms / 60_000 % 60,
        total_ms / 1000 % 60,
        total_ms % 1000,
    )
}

/// `HH:MM:SS,mmm`
pub fn srt_timestamp(secs: f64) -> String {
    let (h, m, s, ms) = clock(secs);
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

/// `HH:MM:SS.mmm`
pub fn vtt_timestamp(secs: f64) -> String {
    let (h, m, s, ms) = clock(secs);
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

/// `H:MM:SS.cc`
pub fn ass_timestamp(secs: f64) -> String {
    let total_cs = (secs.max(0.0) * 100.0).round() as u64;
    format!(
        "{}:{:02}:{:02}.{:02}",
        total_cs / 360_000,
        total_cs / 6000 % 60,
        total_cs / 100 % 60,
        total_cs % 100
    )
}

/// One numbered SRT cue per segment.
pub fn render_srt(transcript: &Transcript) -> String {
    let mut out = String::new();
    for (i, segment) in transcript.segments.iter().enumerate() {
        let _ = write!(
            out,
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            srt_timestamp(segment.start),
            srt_timestamp(segment.end),
            segment.text.trim()
        );
    }
    out
}

/// A WebVTT document with one cue per segment.
pub fn render_vtt(transcript: &Transcript) -> String {
    let mut out = String::from("WEBVTT\n\n");
    for segment in &transcript.segments {
        let _ = write!(
            out,
            "{} --> {}\n{}\n\n",
            vtt_timestamp(segment.start),
            vtt_timestamp(segment.end),
            segment.text.trim()
        );
    }
    out
}

const ASS_HEADER: &str = "[Script Info]
Title: Highlight Current Word
ScriptType: v4.00+

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: Default,Arial,12,&H00FFFFFF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,1,0,2,10,10,10,1

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
";

const ASS_HIGHLIGHT: &str = r"{\c&H00FFFF&}";
const ASS_PLAIN: &str = r"{\c&HFFFFFF&}";

/// Greedily pack words into lines of at most `max_chars` characters,
/// counting one separator per word. A single over-long word gets a line
/// of its own.
pub fn group_words(words: &[Word], max_chars: usize) -> Vec<&[Word]> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut length = 0;

    for (i, word) in words.iter().enumerate() {
        let width = word.word.trim().chars().count() + 1;
        if length + width > max_chars && i > start {
            lines.push(&words[start..i]);
            start = i;
            length = 0;
        }
        length += width;
    }
    if start < words.len() {
        lines.push(&words[start..]);
    }
    lines
}

/// ASS captions: each line is shown once per word, with that word
/// highlighted, from the word's start until the next word starts.
///
/// Segments without word timings are skipped.
pub fn render_ass(transcript: &Transcript, max_chars: usize) -> String {
    let mut out = String::from(ASS_HEADER);

    for segment in &transcript.segments {
        for line in group_words(&segment.words, max_chars) {
            let line_end = line.last().map_or(segment.end, |w| w.end);

            for (i, current) in line.iter().enumerate() {
                let end = line.get(i + 1).map_or(line_end, |next| next.start);
                let text = line
                    .iter()
                    .enumerate()
                    .map(|(j, w)| {
                        let colour = if j == i { ASS_HIGHLIGHT } else { ASS_PLAIN };
                        format!("{colour}{}", w.word.trim())
                    })
                    .collect::<Vec<_>>()
                    .join(" ");

                let _ = writeln!(
                    out,
                    "Dialogue: 0,{},{},Default,,0,0,0,,{text}",
                    ass_timestamp(current.start),
                    ass_timestamp(end)
                );
            }
        }
    }
    out
}

/// Render a subtitle format. The plain transcript is just the text.
pub fn render(transcript: &Transcript, format: TranscriptFormat, max_chars: usize) -> String {
    match format {
        TranscriptFormat::Transcript => transcript.text.trim().to_string(),
        TranscriptFormat::Srt => render_srt(transcript),
        TranscriptFormat::Vtt => render_vtt(transcript),
        TranscriptFormat::Ass => render_ass(transcript, max_chars),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// `whisper` arguments writing `<stem>.json` with word timings into `output_dir`.
pub fn whisper_args(input: &Path, output_dir: &Path) -> Vec<String> {
    vec![
        input.to_string_lossy().to_string(),
        "--model".into(),
        WHISPER_MODEL.into(),
        "--output_format".into(),
        "json".into(),
        "--output_dir".into(),
        output_dir.to_string_lossy().to_string(),
        "--word_timestamps".into(),
        "True".into(),
        "--verbose".into(),
        "False".into(),
    ]
}

/// Where `whisper` puts the JSON result for `input`.
pub fn whisper_output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    output_dir.join(format!("{}.json", stem.to_string_lossy()))
}

/// Transcribe `input` and return the parsed result. The intermediate JSON
/// file is removed.
pub async fn transcribe(input: &Path, output_dir: &Path) -> Result<Transcript, WhisperError> {
    if !input.exists() {
        return Err(WhisperError::MediaNotFound(input.to_string_lossy().to_string()));
    }
    tokio::fs::create_dir_all(output_dir).await?;

    let args = whisper_args(input, output_dir);
    tracing::debug!(args = %args.join(" "), "Running whisper");

    let output = tokio::process::Command::new("whisper")
        .args(&args)
        .output()
        .await
        .map_err(WhisperError::NotFound)?;

    if !output.status.success() {
        return Err(WhisperError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let json_path = whisper_output_path(input, output_dir);
    let raw = tokio::fs::read_to_string(&json_path).await?;
    let _ = tokio::fs::remove_file(&json_path).await;

    serde_json::from_str::<Transcript>(&raw).map_err(|e| WhisperError::ParseError(e.to_string()))
}
