use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Fixed capture quality presets.
///
/// Each preset binds a sample rate, channel count and bit rate. The preset is
/// copied into every session at creation, so historical sessions keep the
/// quality they were recorded at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordingQuality {
    /// 8 kHz mono, 16 kbps.
    Low,
    /// 16 kHz mono, 32 kbps.
    #[default]
    Medium,
    /// 44.1 kHz stereo, 128 kbps.
    High,
}

impl RecordingQuality {
    /// All presets, lowest first.
    pub const ALL: [RecordingQuality; 3] = [
        RecordingQuality::Low,
        RecordingQuality::Medium,
        RecordingQuality::High,
    ];

    /// Sample rate in Hz.
    pub fn sample_rate(self) -> u32 {
        match self {
            RecordingQuality::Low => 8_000,
            RecordingQuality::Medium => 16_000,
            RecordingQuality::High => 44_100,
        }
    }

    /// Number of interleaved channels.
    pub fn channels(self) -> u16 {
        match self {
            RecordingQuality::Low | RecordingQuality::Medium => 1,
            RecordingQuality::High => 2,
        }
    }

    /// Nominal bit rate in bits per second, as shown to the user.
    ///
    /// WAV files are uncompressed 16-bit PCM, so their actual rate is
    /// `sample_rate * channels * 16`; this value does not affect them.
    pub fn bit_rate(self) -> u32 {
        match self {
            RecordingQuality::Low => 16_000,
            RecordingQuality::Medium => 32_000,
            RecordingQuality::High => 128_000,
        }
    }

    /// Human-readable label for settings screens.
    pub fn display_name(self) -> &'static str {
        match self {
            RecordingQuality::Low => "Low (8 kHz)",
            RecordingQuality::Medium => "Medium (16 kHz)",
            RecordingQuality::High => "High (44.1 kHz)",
        }
    }

    /// Parse a stored preset name, falling back to [`RecordingQuality::Medium`].
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| {
            warn!(raw_quality = raw, "Unknown recording quality, using MEDIUM");
            RecordingQuality::Medium
        })
    }

    /// Serde adapter for [`RecordingQuality::parse_lenient`].
    pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&raw))
    }
}

impl FromStr for RecordingQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(RecordingQuality::Low),
            "MEDIUM" => Ok(RecordingQuality::Medium),
            "HIGH" => Ok(RecordingQuality::High),
            other => Err(format!("unknown recording quality: {other}")),
        }
    }
}

impl fmt::Display for RecordingQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordingQuality::Low => "LOW",
            RecordingQuality::Medium => "MEDIUM",
            RecordingQuality::High => "HIGH",
        };
        f.write_str(s)
    }
}
