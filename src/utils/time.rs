//! Time parsing and formatting utilities

use crate::domain::errors::DomainError;

/// Time parser for the clock formats used on the command line and by ffmpeg
pub struct TimeParser;

impl TimeParser {
    /// Parse operator input: plain seconds, `MM:SS[.ms]` or `HH:MM:SS[.ms]`
    pub fn parse_time(time_str: &str) -> Result<f64, DomainError> {
        let time_str = time_str.trim();

        if let Ok(seconds) = time_str.parse::<f64>() {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(Self::invalid(time_str));
            }
            return Ok(seconds);
        }

        Self::parse_clock(time_str).ok_or_else(|| Self::invalid(time_str))
    }

    /// Parse `HH:MM:SS[.frac]` or `MM:SS[.frac]` as printed by ffmpeg.
    ///
    /// A leading `-` (ffmpeg reports small negative times at stream start) is
    /// accepted and yields a negative value; callers clamp.
    pub fn parse_clock(clock: &str) -> Option<f64> {
        let (negative, body) = match clock.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, clock),
        };

        let parts: Vec<&str> = body.split(':').collect();
        let (hours, minutes, seconds) = match parts.as_slice() {
            [h, m, s] => (Self::parse_whole(h)?, Self::parse_whole(m)?, *s),
            [m, s] => (0.0, Self::parse_whole(m)?, *s),
            _ => return None,
        };

        if minutes >= 60.0 || seconds.is_empty() || !seconds.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        let seconds: f64 = seconds.parse().ok()?;
        if !seconds.is_finite() || seconds >= 60.0 {
            return None;
        }

        let total = hours * 3600.0 + minutes * 60.0 + seconds;
        Some(if negative { -total } else { total })
    }

    fn parse_whole(field: &str) -> Option<f64> {
        if field.is_empty() || !field.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        field.parse::<u64>().ok().map(|v| v as f64)
    }

    fn invalid(time_str: &str) -> DomainError {
        DomainError::BadArgs(format!(
            "Invalid time format: {}. Expected seconds, MM:SS.ms or HH:MM:SS.ms",
            time_str
        ))
    }

    /// Format seconds to HH:MM:SS.ms string
    pub fn format_time(seconds: f64) -> String {
        let seconds = seconds.max(0.0);
        let hours = (seconds / 3600.0) as u32;
        let minutes = ((seconds % 3600.0) / 60.0) as u32;
        let secs = (seconds % 60.0) as u32;
        let milliseconds = ((seconds % 1.0) * 1000.0) as u32;

        if hours > 0 {
            format!(
                "{:02}:{:02}:{:02}.{:03}",
                hours, minutes, secs, milliseconds
            )
        } else {
            format!("{:02}:{:02}.{:03}", minutes, secs, milliseconds)
        }
    }
}
