//! Path helpers for derived media files

use std::path::{Path, PathBuf};

/// Path helpers for files written next to, or derived from, the source
pub struct PathUtils;

impl PathUtils {
    /// Suffix appended to the stem of a remuxed, seek-safe copy
    pub const SEEKABLE_SUFFIX: &'static str = "_seekable";

    /// Sibling path for the seek-safe copy of `source`, e.g.
    /// `rec.mp4` -> `rec_seekable.mp4`. Sources without an extension get `.mp4`.
    pub fn seekable_copy_path(source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "source".to_string());
        let extension = source
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_else(|| "mp4".to_string());

        source.with_file_name(format!("{}{}.{}", stem, Self::SEEKABLE_SUFFIX, extension))
    }

    /// Lossy display form of a path, for log lines and invocation arguments
    pub fn display(path: &Path) -> String {
        path.to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seekable_copy_path() {
        assert_eq!(
            PathUtils::seekable_copy_path(Path::new("/rec/stream.mp4")),
            PathBuf::from("/rec/stream_seekable.mp4")
        );
        assert_eq!(
            PathUtils::seekable_copy_path(Path::new("capture")),
            PathBuf::from("capture_seekable.mp4")
        );
    }
}
