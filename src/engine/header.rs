//! Comment header metadata
//!
//! Recorders write a few `Key: value` lines into the WAV comment field:
//!
//! ```text
//! Time: 2020-01-01 00:00:00.000
//! Scale-1: 8
//! Scale-2: 8
//! Scale-3: 8
//! ```
//!
//! `Time` is the wall-clock time of the first sample. `Scale-N` gives the
//! physical value of int16 full scale on channel N (1-based), so the stored
//! multiplier is `value / 32768`. Absent or unusable lines fall back to a
//! start time of 0 and a scale of 1.0; they only produce warnings.

use std::fmt;

use log::info;

use crate::engine::timestamp::{format_timestamp, parse_timestamp};

/// Maximum number of channels a sample source can carry.
pub const CHANNELS_MAX: usize = 16;

/// Only this many non-empty comment lines are examined; the rest are ignored.
pub const MAX_COMMENT_LINES: usize = 32;

/// Magnitude of int16 full scale.
pub const FULL_SCALE: f64 = 32768.0;

/// Channels expected to carry a `Scale-N` header.
const EXPECTED_SCALE_CHANNELS: usize = 3;

const TIME_PREFIX: &str = "Time:";
const SCALE_PREFIX: &str = "Scale-";

/// A header that was expected but not usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderWarning {
    MissingTime,
    /// Zero-based channel index.
    MissingScale { channel: usize },
}

impl fmt::Display for HeaderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderWarning::MissingTime => {
                write!(f, "Didn't successfully parse a 'Time' header (using zero).")
            }
            HeaderWarning::MissingScale { channel } => write!(
                f,
                "Didn't successfully parse a 'Scale-{}' header (using defaults).",
                channel + 1
            ),
        }
    }
}

/// Start time and per-channel scales extracted from a comment block.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderMetadata {
    /// Seconds since the Unix epoch, or 0 if no usable `Time` line.
    pub start_time: f64,
    pub scale: [f32; CHANNELS_MAX],
    pub warnings: Vec<HeaderWarning>,
}

impl HeaderMetadata {
    /// Parse a comment block, starting from a scale of 1.0 on every channel.
    pub fn parse(comment: &str) -> Self {
        Self::parse_with_defaults(comment, [1.0; CHANNELS_MAX])
    }

    /// Parse a comment block over existing scale defaults.
    ///
    /// A channel keeps its default unless a `Scale-N` line yields a
    /// strictly positive scale. The last usable line for a field wins.
    pub fn parse_with_defaults(comment: &str, defaults: [f32; CHANNELS_MAX]) -> Self {
        let mut start_time = 0.0;
        let mut scale = defaults;
        let mut parsed_time = false;
        let mut parsed_scale = [false; CHANNELS_MAX];

        for line in comment_lines(comment) {
            if let Some(rest) = line.strip_prefix(TIME_PREFIX) {
                let time = parse_timestamp(rest).unwrap_or(0.0);
                info!("Time: {}", format_timestamp(time));
                if time > 0.0 {
                    start_time = time;
                    parsed_time = true;
                }
            } else if let Some((channel, rest)) = split_scale_line(line) {
                let value = parse_leading_f64(rest);
                let channel_scale = (value / FULL_SCALE) as f32;
                info!(
                    "Scale-{}: {} (scale[{}] = {})",
                    channel + 1,
                    value,
                    channel,
                    channel_scale
                );
                if channel_scale > 0.0 && channel < CHANNELS_MAX {
                    scale[channel] = channel_scale;
                    parsed_scale[channel] = true;
                }
            }
        }

        let mut warnings = Vec::new();
        if !parsed_time {
            warnings.push(HeaderWarning::MissingTime);
        }
        for (channel, parsed) in parsed_scale
            .iter()
            .enumerate()
            .take(EXPECTED_SCALE_CHANNELS)
        {
            if !parsed {
                warnings.push(HeaderWarning::MissingScale { channel });
            }
        }

        HeaderMetadata {
            start_time,
            scale,
            warnings,
        }
    }
}

/// Non-empty lines of a comment block, capped at [`MAX_COMMENT_LINES`].
pub fn comment_lines(comment: &str) -> impl Iterator<Item = &str> {
    comment
        .split('\n')
        .filter(|line| !line.is_empty())
        .take(MAX_COMMENT_LINES)
}

/// Split `Scale-N:rest` into the zero-based channel and `rest`.
///
/// `N` is a single digit 1-9.
fn split_scale_line(line: &str) -> Option<(usize, &str)> {
    let rest = line.strip_prefix(SCALE_PREFIX)?;
    match rest.as_bytes() {
        [digit @ b'1'..=b'9', b':', ..] => Some(((digit - b'1') as usize, &rest[2..])),
        _ => None,
    }
}

/// Parse the longest numeric prefix of `text`, ignoring leading whitespace.
///
/// Anything unparseable yields 0.0, like C's `atof`.
pub fn parse_leading_f64(text: &str) -> f64 {
    let text = text.trim_start();
    let end = text
        .bytes()
        .take_while(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
        .count();

    (1..=end)
        .rev()
        .find_map(|len| text[..len].parse::<f64>().ok())
        .unwrap_or(0.0)
}
