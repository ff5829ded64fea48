//! Caption styling for burned-in subtitles.
//!
//! Callers pass styling as a list of `{option, value}` pairs. For SRT input
//! the pairs become an ASS `force_style` override; for ASS input they
//! become the `Default` style of a generated script header.

use serde::Deserialize;
use serde_json::Value;

/// Subtitle format of the caption source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionFormat {
    Srt,
    Ass,
}

impl CaptionFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Ass => "ass",
        }
    }
}

/// A single styling option as sent by the caller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CaptionOption {
    pub option: String,
    pub value: Value,
}

/// Caller option name → ASS style field, with the default used when the
/// option is absent. The order is the ASS `Format:` order.
const STYLE_FIELDS: &[(&str, &str, &str)] = &[
    ("", "Name", "Default"),
    ("font_name", "Fontname", "Arial"),
    ("font_size", "Fontsize", "12"),
    ("primary_color", "PrimaryColour", "&H00FFFFFF"),
    ("outline_color", "OutlineColour", "&H00000000"),
    ("back_color", "BackColour", "&H00000000"),
    ("bold", "Bold", "0"),
    ("italic", "Italic", "0"),
    ("underline", "Underline", "0"),
    ("strikeout", "StrikeOut", "0"),
    ("", "ScaleX", "100"),
    ("", "ScaleY", "100"),
    ("", "Spacing", "0"),
    ("", "Angle", "0"),
    ("", "BorderStyle", "1"),
    ("outline", "Outline", "1"),
    ("shadow", "Shadow", "0"),
    ("alignment", "Alignment", "2"),
    ("margin_l", "MarginL", "10"),
    ("margin_r", "MarginR", "10"),
    ("margin_v", "MarginV", "10"),
    ("encoding", "Encoding", "1"),
];

fn option_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        other => other.to_string(),
    }
}

fn lookup<'a>(options: &'a [CaptionOption], name: &str) -> Option<&'a Value> {
    options.iter().find(|o| o.option == name).map(|o| &o.value)
}

/// The `force_style` override for SRT captions. Only options the caller
/// actually set are emitted; unknown options are ignored.
pub fn force_style(options: &[CaptionOption]) -> String {
    STYLE_FIELDS
        .iter()
        .filter(|(option, _, _)| !option.is_empty())
        .filter_map(|(option, field, _)| {
            lookup(options, option).map(|v| format!("{field}={}", option_text(v)))
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// The `Style:` line of the generated ASS header.
pub fn style_line(options: &[CaptionOption]) -> String {
    let values: Vec<String> = STYLE_FIELDS
        .iter()
        .map(|(option, _, default)| match lookup(options, option) {
            Some(v) if !option.is_empty() => option_text(v),
            _ => (*default).to_string(),
        })
        .collect();
    format!("Style: {}", values.join(","))
}

/// Script header prepended to ASS captions so the `Default` style reflects
/// the caller's options.
pub fn ass_header(options: &[CaptionOption]) -> String {
    let format: Vec<&str> = STYLE_FIELDS.iter().map(|(_, field, _)| *field).collect();
    format!(
        "[Script Info]\nScriptType: v4.00+\n\n[V4+ Styles]\nFormat: {}\n{}\n\n[Events]\n\
         Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
        format.join(", "),
        style_line(options),
    )
}
