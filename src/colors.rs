use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

const DEFAULT_CANDIDATES: [&str; 3] = [
    "emotion-colors.json",
    "config/emotion-colors.json",
    "public/emotion-colors.json",
];

#[derive(Debug, Error)]
pub enum ColorTableError {
    #[error("failed to read color table {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse color table {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("color table {0} is not a JSON object")]
    NotAnObject(PathBuf),
}

pub type ColorTable = HashMap<String, String>;

/// Result of probing the candidate locations. `source` is `None` when nothing
/// existed and the table fell back to empty.
#[derive(Debug, Default)]
pub struct ColorLoad {
    pub table: ColorTable,
    pub source: Option<PathBuf>,
    pub tried: Vec<PathBuf>,
}

/// Explicit locations first, then the built-in relative paths under `root`.
pub fn candidates(explicit: &[Option<PathBuf>], root: &Path) -> Vec<PathBuf> {
    explicit
        .iter()
        .flatten()
        .cloned()
        .chain(DEFAULT_CANDIDATES.iter().map(|p| root.join(p)))
        .collect()
}

pub fn load(candidates: &[PathBuf]) -> Result<ColorLoad, ColorTableError> {
    let mut tried = Vec::with_capacity(candidates.len());

    for path in candidates {
        tried.push(path.clone());
        if !path.is_file() {
            continue;
        }
        let table = read_table(path)?;
        info!(path = %path.display(), entries = table.len(), "loaded color table");
        return Ok(ColorLoad {
            table,
            source: Some(path.clone()),
            tried,
        });
    }

    warn!(
        tried = tried.len(),
        "no color table found, existing colors will be preserved"
    );
    Ok(ColorLoad {
        table: ColorTable::new(),
        source: None,
        tried,
    })
}

fn read_table(path: &Path) -> Result<ColorTable, ColorTableError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ColorTableError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&raw).map_err(|source| ColorTableError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let Value::Object(entries) = value else {
        return Err(ColorTableError::NotAnObject(path.to_path_buf()));
    };

    let mut table = ColorTable::with_capacity(entries.len());
    for (label, color) in entries {
        match color {
            Value::String(color) => {
                table.insert(label, color);
            }
            other => warn!(%label, value = %other, "ignoring non-string color entry"),
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn falls_back_to_empty_and_lists_tried_paths() {
        let dir = tempfile::tempdir().unwrap();
        let paths = candidates(&[None], dir.path());
        let load = load(&paths).unwrap();
        assert!(load.table.is_empty());
        assert!(load.source.is_none());
        assert_eq!(load.tried, paths);
        assert_eq!(load.tried.len(), 3);
    }

    #[test]
    fn first_existing_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::create_dir_all(dir.path().join("public")).unwrap();
        fs::write(
            dir.path().join("config/emotion-colors.json"),
            r##"{"행복": "#FFD700"}"##,
        )
        .unwrap();
        fs::write(
            dir.path().join("public/emotion-colors.json"),
            r##"{"행복": "#000000"}"##,
        )
        .unwrap();

        let load = load(&candidates(&[], dir.path())).unwrap();
        assert_eq!(load.table.get("행복").map(String::as_str), Some("#FFD700"));
        assert_eq!(
            load.source,
            Some(dir.path().join("config/emotion-colors.json"))
        );
        assert_eq!(load.tried.len(), 2);
    }

    #[test]
    fn explicit_path_is_tried_first() {
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("custom.json");
        fs::write(&custom, r##"{"기쁨": "#FFA500", "슬픔": 3}"##).unwrap();
        fs::write(
            dir.path().join("emotion-colors.json"),
            r##"{"기쁨": "#111111"}"##,
        )
        .unwrap();

        let load = load(&candidates(&[Some(custom.clone())], dir.path())).unwrap();
        assert_eq!(load.source, Some(custom));
        assert_eq!(load.table.len(), 1);
        assert_eq!(load.table.get("기쁨").map(String::as_str), Some("#FFA500"));
    }

    #[test]
    fn broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("emotion-colors.json"), "{not json").unwrap();
        let err = load(&candidates(&[], dir.path())).unwrap_err();
        assert!(matches!(err, ColorTableError::Parse { .. }));

        fs::write(dir.path().join("emotion-colors.json"), "[1, 2]").unwrap();
        let err = load(&candidates(&[], dir.path())).unwrap_err();
        assert!(matches!(err, ColorTableError::NotAnObject(_)));
    }
}
