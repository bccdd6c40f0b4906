//! Common utilities and helpers

pub mod path;
pub mod time;

/// Utility functions for Clipr
pub struct Utils;

impl Utils {
    /// Format file size for display
    pub fn format_file_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Format seconds as fractional minutes, e.g. `2.08 minutes`
    pub fn format_minutes(seconds: f64) -> String {
        format!("{:.2} minutes", seconds / 60.0)
    }

    /// Render a fixed-width text progress bar for a fraction in `[0, 1]`
    pub fn progress_bar(fraction: f64, width: usize) -> String {
        let fraction = fraction.clamp(0.0, 1.0);
        let filled = (fraction * width as f64).round() as usize;
        format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
    }
}
