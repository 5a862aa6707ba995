//! Report artifact paths
//!
//! Markup lives at `<output>/md/report_<date>.md`; rendered documents at
//! `<output>/docs/report_<date>.<ext>`.

use crate::error::Result;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const FILE_STEM_PREFIX: &str = "report_";
pub const MARKUP_EXTENSION: &str = "md";

/// `report_<date>.<extension>`
pub fn report_file_name(report_date: NaiveDate, extension: &str) -> String {
    format!("{FILE_STEM_PREFIX}{report_date}.{extension}")
}

pub fn markup_path(markup_dir: &Path, report_date: NaiveDate) -> PathBuf {
    markup_dir.join(report_file_name(report_date, MARKUP_EXTENSION))
}

pub fn document_path(document_dir: &Path, report_date: NaiveDate, extension: &str) -> PathBuf {
    document_dir.join(report_file_name(report_date, extension))
}

/// Report date encoded in a `report_<date>.*` file name
pub fn report_date_from_path(path: &Path) -> Option<NaiveDate> {
    let stem = path.file_stem()?.to_str()?;
    let date = stem.strip_prefix(FILE_STEM_PREFIX)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Write `contents` to `path`, creating parent directories
pub fn write_artifact(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    let contents = contents.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Write markup for a report date and return its path
pub fn write_markup(markup_dir: &Path, report_date: NaiveDate, markup: &str) -> Result<PathBuf> {
    let path = markup_path(markup_dir, report_date);
    write_artifact(&path, markup)?;
    Ok(path)
}

pub fn read_markup(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BriefError;
    use tempfile::TempDir;

    fn jan(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    #[test]
    fn test_paths() {
        let dir = Path::new("/tmp/out");
        assert_eq!(
            markup_path(&dir.join("md"), jan(11)),
            PathBuf::from("/tmp/out/md/report_2026-01-11.md")
        );
        assert_eq!(
            document_path(&dir.join("docs"), jan(11), "html"),
            PathBuf::from("/tmp/out/docs/report_2026-01-11.html")
        );
    }

    #[test]
    fn test_report_date_from_path() {
        assert_eq!(
            report_date_from_path(Path::new("md/report_2026-01-11.md")),
            Some(jan(11))
        );
        assert_eq!(report_date_from_path(Path::new("notes.md")), None);
        assert_eq!(report_date_from_path(Path::new("report_latest.md")), None);
    }

    #[test]
    fn test_write_and_read_markup() {
        let tmp = TempDir::new().unwrap();
        let md_dir = tmp.path().join("md");

        let path = write_markup(&md_dir, jan(11), "# Title\n").unwrap();
        assert!(path.ends_with("report_2026-01-11.md"));
        assert_eq!(read_markup(&path).unwrap(), "# Title\n");

        // Overwrites in place
        write_markup(&md_dir, jan(11), "# Other\n").unwrap();
        assert_eq!(read_markup(&path).unwrap(), "# Other\n");
    }

    #[test]
    fn test_read_missing_markup() {
        let tmp = TempDir::new().unwrap();
        let err = read_markup(&tmp.path().join("missing.md")).unwrap_err();
        assert!(matches!(err, BriefError::Io(_)));
    }
}
