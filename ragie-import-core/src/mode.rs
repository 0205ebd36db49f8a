//! Processing-mode resolution for binary uploads.
//!
//! Four independent knobs (`mode`, `static_mode`, `audio`, `video`) collapse into the
//! single `mode` field of a multipart upload. Text uploads never carry a mode.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse processing-quality hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    Fast,
    HiRes,
    /// Highest quality; also implies audio and audio+video processing.
    All,
}

impl ProcessingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingMode::Fast => "fast",
            ProcessingMode::HiRes => "hi_res",
            ProcessingMode::All => "all",
        }
    }
}

impl FromStr for ProcessingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast" => Ok(ProcessingMode::Fast),
            "hi_res" => Ok(ProcessingMode::HiRes),
            "all" => Ok(ProcessingMode::All),
            other => Err(format!(
                "invalid mode '{other}': expected one of fast, hi_res, all"
            )),
        }
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit video-processing override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoMode {
    AudioOnly,
    VideoOnly,
    AudioVideo,
}

impl VideoMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoMode::AudioOnly => "audio_only",
            VideoMode::VideoOnly => "video_only",
            VideoMode::AudioVideo => "audio_video",
        }
    }
}

impl FromStr for VideoMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "audio_only" => Ok(VideoMode::AudioOnly),
            "video_only" => Ok(VideoMode::VideoOnly),
            "audio_video" => Ok(VideoMode::AudioVideo),
            other => Err(format!(
                "invalid video mode '{other}': expected one of audio_only, video_only, audio_video"
            )),
        }
    }
}

impl fmt::Display for VideoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user-facing knobs, exactly as configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeOptions {
    pub mode: Option<ProcessingMode>,
    /// Explicit static-content processing override, passed through verbatim.
    pub static_mode: Option<String>,
    pub audio: bool,
    pub video: Option<VideoMode>,
}

/// Structured processing hint. Empty fields are omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredMode {
    #[serde(rename = "static", default, skip_serializing_if = "Option::is_none")]
    pub static_mode: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub audio: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoMode>,
}

impl StructuredMode {
    pub fn is_empty(&self) -> bool {
        self.static_mode.is_none() && !self.audio && self.video.is_none()
    }
}

/// Resolved `mode` payload for a binary upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Sent as a bare string.
    Raw(String),
    /// Sent as a JSON object.
    Structured(StructuredMode),
}

impl Mode {
    /// Value of the multipart `mode` field.
    pub fn to_form_value(&self) -> Result<String, serde_json::Error> {
        match self {
            Mode::Raw(s) => Ok(s.clone()),
            Mode::Structured(m) => serde_json::to_string(m),
        }
    }
}

/// Collapse the configured knobs into the upload's `mode` field.
///
/// `mode = all` always produces a structured result with audio enabled and
/// `audio_video` video processing unless `video` overrides it. Any other plain mode
/// with no structured knob set is sent as a bare string.
pub fn construct_mode(opts: &ModeOptions) -> Option<Mode> {
    let static_mode = opts.static_mode.as_deref().filter(|s| !s.is_empty());
    let structured_requested = static_mode.is_some() || opts.audio || opts.video.is_some();
    let is_all = opts.mode == Some(ProcessingMode::All);

    if let Some(mode) = opts.mode {
        if !structured_requested && !is_all {
            return Some(Mode::Raw(mode.as_str().to_string()));
        }
    }

    let structured = StructuredMode {
        static_mode: static_mode.map(str::to_owned).or_else(|| {
            opts.mode
                .filter(|m| *m != ProcessingMode::All)
                .map(|m| m.as_str().to_string())
        }),
        audio: opts.audio || is_all,
        video: opts
            .video
            .or(if is_all { Some(VideoMode::AudioVideo) } else { None }),
    };

    if structured.is_empty() {
        None
    } else {
        Some(Mode::Structured(structured))
    }
}
