use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Coarse classification of an artifact, derived from its file
/// extension or URL prefix at staging time and never recomputed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "binary/audio")]
    BinaryAudio,
    #[serde(rename = "binary/executable")]
    BinaryExecutable,
    #[serde(rename = "binary/image")]
    BinaryImage,
    #[serde(rename = "binary/video")]
    BinaryVideo,
    #[serde(rename = "document")]
    Document,
    #[serde(rename = "data")]
    Data,
    #[serde(rename = "source")]
    Source,
    #[serde(rename = "spdx")]
    Spdx,
    #[serde(rename = "url")]
    Url,
    #[serde(rename = "envelope")]
    Envelope,
    #[serde(rename = "other")]
    Other,
}

impl ContentType {
    /// Classify a file path or URL string.
    ///
    /// URLs (http/https prefix) classify as [`ContentType::Url`];
    /// everything else goes by extension. [`ContentType::Envelope`] is
    /// never produced here — envelopes are built, not classified.
    pub fn classify(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Self::Url;
        }
        let ext = match lower.rsplit_once('.') {
            Some((_, ext)) if !ext.contains('/') => ext,
            _ => return Self::Other,
        };
        match ext {
            "aac" | "aiff" | "alac" | "flac" | "mp3" | "pcm" | "wav" | "wma" => Self::BinaryAudio,
            "exe" | "jar" | "lib" | "scr" | "so" => Self::BinaryExecutable,
            "gif" | "ico" | "jpg" | "jpeg" | "png" | "ttf" => Self::BinaryImage,
            "acc" | "avi" | "flv" | "mov" | "mpg" | "mp2" | "mpeg" | "mpe" | "mpv" | "mp4"
            | "m4p" | "oca" | "ogg" | "wmv" => Self::BinaryVideo,
            "doc" | "html" | "jnl" | "md" | "pdf" | "ps" | "rst" | "txt" | "text" => Self::Document,
            "db" | "conf" | "config" | "log" => Self::Data,
            "asm" | "asp" | "awk" | "bat" | "c" | "class" | "cmd" | "cpp" | "cxx" | "def"
            | "dll" | "dpc" | "dpj" | "dtd" | "dump" | "font" | "go" | "h" | "hdl" | "hpp"
            | "hrc" | "hxx" | "idl" | "inc" | "ini" | "java" | "js" | "jsp" | "l" | "pl"
            | "perl" | "pm" | "pmk" | "r" | "rc" | "res" | "rpm" | "rs" | "s" | "sbl" | "sh"
            | "src" | "y" | "yxx" => Self::Source,
            "bz2" | "gz" | "tar" | "tgz" | "xz" | "zip" => Self::Source,
            "spdx" => Self::Spdx,
            _ => Self::Other,
        }
    }

    /// The wire/database string for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BinaryAudio => "binary/audio",
            Self::BinaryExecutable => "binary/executable",
            Self::BinaryImage => "binary/image",
            Self::BinaryVideo => "binary/video",
            Self::Document => "document",
            Self::Data => "data",
            Self::Source => "source",
            Self::Spdx => "spdx",
            Self::Url => "url",
            Self::Envelope => "envelope",
            Self::Other => "other",
        }
    }

    /// True for envelope (container) records.
    pub fn is_envelope(&self) -> bool {
        matches!(self, Self::Envelope)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "binary/audio" => Ok(Self::BinaryAudio),
            "binary/executable" => Ok(Self::BinaryExecutable),
            "binary/image" => Ok(Self::BinaryImage),
            "binary/video" => Ok(Self::BinaryVideo),
            "document" => Ok(Self::Document),
            "data" => Ok(Self::Data),
            "source" => Ok(Self::Source),
            "spdx" => Ok(Self::Spdx),
            "url" => Ok(Self::Url),
            "envelope" => Ok(Self::Envelope),
            "other" => Ok(Self::Other),
            _ => Err(TypeError::UnknownContentType(s.to_string())),
        }
    }
}
