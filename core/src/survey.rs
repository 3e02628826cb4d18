//! Keyword listings over a directory of exposures.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::source::{CubeSource, FitsSource, HeaderValue, SourceError};

/// Requested primary header keywords of one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderRecord {
    pub file_name: String,
    pub path: PathBuf,
    /// In the order the keywords were requested; `None` if the header lacks one.
    pub values: Vec<(String, Option<HeaderValue>)>,
}

impl HeaderRecord {
    pub fn get(&self, keyword: &str) -> Option<&HeaderValue> {
        self.values
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(keyword))
            .and_then(|(_, v)| v.as_ref())
    }
}

fn is_fits(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("fits") || ext.eq_ignore_ascii_case("fit"))
}

/// Reads `keywords` from the primary header of every FITS file in `folder`
/// whose name contains `name_contains`. Sorted by file name.
pub fn survey(
    folder: &Path,
    keywords: &[String],
    name_contains: Option<&str>,
) -> Result<Vec<HeaderRecord>, SourceError> {
    survey_with(folder, keywords, name_contains, FitsSource::open)
}

/// [`survey`] with a custom way of opening files.
///
/// Files that fail to open or read are skipped with a warning.
#[instrument(skip(open))]
pub fn survey_with<S: CubeSource>(
    folder: &Path,
    keywords: &[String],
    name_contains: Option<&str>,
    open: impl Fn(&Path) -> Result<S, SourceError>,
) -> Result<Vec<HeaderRecord>, SourceError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        if !path.is_file() || !is_fits(&path) {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name_contains.is_some_and(|filter| !file_name.contains(filter)) {
            continue;
        }
        paths.push((file_name.to_string(), path));
    }
    paths.sort();

    let mut records = Vec::with_capacity(paths.len());
    for (file_name, path) in paths {
        let source = match open(&path) {
            Ok(source) => source,
            Err(err) => {
                warn!(?path, %err, "Skipping unreadable file");
                continue;
            }
        };

        let values: Result<Vec<_>, _> = keywords
            .iter()
            .map(|key| Ok((key.clone(), source.header_value(0, key)?)))
            .collect();
        match values {
            Ok(values) => records.push(HeaderRecord {
                file_name,
                path,
                values,
            }),
            Err(err @ SourceError::Io(_)) | Err(err @ SourceError::ExtensionOutOfRange { .. }) => {
                warn!(?path, %err, "Skipping file without readable primary header");
            }
            Err(err) => return Err(err),
        }
    }

    debug!(matched = records.len(), "Surveyed headers");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, fs, path::Path};

    use super::survey_with;
    use crate::source::{Header, HeaderValue, MemorySource, SourceError};

    fn temp_folder(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "miri-cube-survey-{}-{name}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn filters_by_name_and_reads_keywords() {
        let dir = temp_folder("filter");
        for name in [
            "jw03722003001_04101_00001_mirifulong_uncal.fits",
            "jw03722003001_02101_00001_mirifulong_uncal.fits",
            "jw03722003001_04101_00002_mirifushort_uncal.fits",
            "notes.txt",
        ] {
            fs::write(dir.join(name), b"").unwrap();
        }

        let headers: HashMap<&str, Header> = HashMap::from([
            ("00001_mirifulong", Header::new().with("CHANNEL", "34").with("BAND", "LONG")),
            ("00002_mirifushort", Header::new().with("CHANNEL", "12")),
        ]);
        let open = |path: &Path| -> Result<MemorySource, SourceError> {
            let name = path.file_name().unwrap().to_str().unwrap();
            let header = headers
                .iter()
                .find(|(key, _)| name.contains(*key))
                .map(|(_, h)| h.clone())
                .unwrap_or_default();
            Ok(MemorySource::new().push(header, None))
        };

        let keywords = vec!["CHANNEL".to_string(), "BAND".to_string()];
        let records = survey_with(&dir, &keywords, Some("041"), open).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].file_name,
            "jw03722003001_04101_00001_mirifulong_uncal.fits"
        );
        assert_eq!(records[0].get("channel"), Some(&HeaderValue::from("34")));
        assert_eq!(records[0].get("BAND"), Some(&HeaderValue::from("LONG")));
        assert_eq!(records[1].get("BAND"), None);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn unreadable_files_are_skipped() {
        let dir = temp_folder("unreadable");
        fs::write(dir.join("a.fits"), b"").unwrap();
        fs::write(dir.join("b.fits"), b"").unwrap();

        let open = |path: &Path| -> Result<MemorySource, SourceError> {
            if path.ends_with("a.fits") {
                Err(SourceError::Io(std::io::Error::other("truncated")))
            } else {
                Ok(MemorySource::new().push(Header::new(), None))
            }
        };
        let records = survey_with(&dir, &["CHANNEL".to_string()], None, open).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_name, "b.fits");

        fs::remove_dir_all(dir).ok();
    }
}
