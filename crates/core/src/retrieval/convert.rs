//! Legacy frame-indexed caption conversion.
//!
//! The legacy format times captions in integer frame counts,
//! `{startFrame}{endFrame}text`, with `|` as an in-caption line break. A
//! degenerate first-class entry whose start and end frames are equal and
//! whose payload is a bare number declares the file's frame rate; without
//! one, 25 fps is assumed. Output is standard SubRip.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use tracing::debug;

use crate::metrics::CONVERSIONS_TOTAL;

const DEFAULT_FPS: f64 = 25.0;

static FRAME_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\{(\d+)\}\{(\d+)\}(.*)$").expect("static regex"));
static STYLE_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[^{}]*\}").expect("static regex"));

struct FrameEntry {
    start: u64,
    end: u64,
    text: String,
}

/// Convert frame-indexed caption text to SubRip.
///
/// Only lines matching the legacy pattern are recognized; text that is
/// already SubRip (or anything else) passes through unchanged, which makes
/// the conversion idempotent. Conversions that end with zero usable entries
/// also pass the input through rather than emitting an empty file.
pub fn convert_legacy_format(text: &str) -> String {
    let mut entries: Vec<FrameEntry> = Vec::new();
    let mut declared_fps: Option<f64> = None;

    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        let Some(captures) = FRAME_LINE.captures(line) else {
            continue;
        };

        // Oversized frame numbers only appear in garbage lines; skip them.
        let (Ok(start), Ok(end)) = (captures[1].parse::<u64>(), captures[2].parse::<u64>()) else {
            continue;
        };
        let payload = captures[3].to_string();

        // A degenerate numeric entry declares the frame rate for the whole
        // file. Only the first one counts.
        if declared_fps.is_none() && start == end {
            if let Ok(fps) = payload.trim().parse::<f64>() {
                if fps > 0.0 {
                    declared_fps = Some(fps);
                    continue;
                }
            }
        }

        entries.push(FrameEntry {
            start,
            end,
            text: payload,
        });
    }

    let fps = declared_fps.unwrap_or(DEFAULT_FPS);

    let mut blocks: Vec<String> = Vec::new();
    for entry in entries {
        let cleaned = clean_caption(&entry.text);
        if cleaned.is_empty() {
            continue;
        }
        blocks.push(format!(
            "{}\n{} --> {}\n{}\n",
            blocks.len() + 1,
            format_timestamp(entry.start, fps),
            format_timestamp(entry.end, fps),
            cleaned
        ));
    }

    if blocks.is_empty() {
        CONVERSIONS_TOTAL.with_label_values(&["passthrough"]).inc();
        return text.to_string();
    }

    debug!(entries = blocks.len(), fps, "Converted legacy captions");
    CONVERSIONS_TOTAL.with_label_values(&["converted"]).inc();
    blocks.join("\n")
}

/// Turn a caption payload into SubRip text: real line breaks for `|`,
/// style directives stripped, blank lines dropped.
fn clean_caption(payload: &str) -> String {
    let stripped = STYLE_DIRECTIVE.replace_all(payload, "");
    stripped
        .split('|')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a frame index as `HH:MM:SS,mmm` at the given rate, rounded to the
/// nearest millisecond.
fn format_timestamp(frame: u64, fps: f64) -> String {
    let total_ms = (frame as f64 / fps * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_at_default_rate() {
        let converted = convert_legacy_format("{100}{200}Hello");
        assert_eq!(converted, "1\n00:00:04,000 --> 00:00:08,000\nHello\n");
    }

    #[test]
    fn test_declared_frame_rate_governs_whole_file() {
        let input = "{1}{1}50\n{100}{200}Hello\n{300}{400}World";
        let converted = convert_legacy_format(input);
        // 100 frames at 50 fps = 2 seconds.
        assert!(converted.contains("00:00:02,000 --> 00:00:04,000"));
        assert!(converted.contains("00:00:06,000 --> 00:00:08,000"));
        // The declaration entry itself is not emitted.
        assert!(!converted.contains("50\n00:"));
    }

    #[test]
    fn test_fractional_frame_rate_rounds_to_nearest_millisecond() {
        let input = "{1}{1}23.976\n{1}{25}Hello";
        let converted = convert_legacy_format(input);
        // 1 / 23.976 = 41.708ms -> 042.
        assert!(converted.contains("00:00:00,042"));
    }

    #[test]
    fn test_pipe_becomes_line_break() {
        let converted = convert_legacy_format("{10}{20}first line|second line");
        assert!(converted.contains("first line\nsecond line"));
    }

    #[test]
    fn test_style_directives_are_stripped() {
        let converted = convert_legacy_format("{10}{20}{Y:i}whisper|{C:$0000FF}shout");
        assert!(converted.contains("whisper\nshout"));
        assert!(!converted.contains("Y:i"));
        assert!(!converted.contains('$'));
    }

    #[test]
    fn test_entries_empty_after_cleaning_are_dropped_and_renumbered() {
        let input = "{10}{20}{Y:i}\n{30}{40}kept";
        let converted = convert_legacy_format(input);
        assert!(converted.starts_with("1\n"));
        assert!(converted.contains("kept"));
        assert!(!converted.contains("2\n"));
    }

    #[test]
    fn test_idempotent_on_subrip_input() {
        let srt = "1\n00:00:04,000 --> 00:00:08,000\nHello\n";
        assert_eq!(convert_legacy_format(srt), srt);
    }

    #[test]
    fn test_zero_entries_passes_input_through() {
        // Legacy-looking lines that all clean to nothing.
        let input = "{10}{20}{Y:i}\n{30}{40}|||";
        assert_eq!(convert_legacy_format(input), input);
    }

    #[test]
    fn test_plain_prose_passes_through() {
        let prose = "This is just text, not captions.";
        assert_eq!(convert_legacy_format(prose), prose);
    }

    #[test]
    fn test_windows_line_endings() {
        let converted = convert_legacy_format("{100}{200}Hello\r\n{300}{400}World\r\n");
        assert!(converted.contains("Hello"));
        assert!(converted.contains("World"));
        assert!(converted.contains("00:00:04,000 --> 00:00:08,000"));
    }

    #[test]
    fn test_blocks_are_blank_line_separated() {
        let converted = convert_legacy_format("{100}{200}one\n{300}{400}two");
        assert_eq!(
            converted,
            "1\n00:00:04,000 --> 00:00:08,000\none\n\n2\n00:00:12,000 --> 00:00:16,000\ntwo\n"
        );
    }

    #[test]
    fn test_format_timestamp_hours() {
        // 90000 frames at 25 fps = 3600s.
        assert_eq!(format_timestamp(90_000, 25.0), "01:00:00,000");
    }

    #[test]
    fn test_later_degenerate_numeric_entries_are_ordinary_captions() {
        let input = "{1}{1}25\n{50}{50}42\n{100}{200}real";
        let converted = convert_legacy_format(input);
        // The second degenerate entry is kept as caption text.
        assert!(converted.contains("42"));
        assert!(converted.contains("real"));
    }
}
