use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::warn;

use crate::error::{DocumentError, PipelineError};
use crate::parser::identity::SpreadsheetRow;

/// Text-extracted narrative document, one per student.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    pub filename: String,
    pub text: String,
}

/// Documents that loaded, plus the ones skipped and why.
#[derive(Debug, Default)]
pub struct DocumentBatch {
    pub documents: Vec<RawDocument>,
    pub skipped: Vec<(String, DocumentError)>,
}

impl DocumentBatch {
    fn skip(&mut self, source: String, err: DocumentError) {
        warn!("Skipping document {}: {}", source, err);
        self.skipped.push((source, err));
    }
}

fn read_artifact(kind: &'static str, path: &Path) -> Result<String, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::MissingInput {
            kind,
            path: path.to_path_buf(),
        });
    }
    fs::read_to_string(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_artifact<T: serde::de::DeserializeOwned>(
    kind: &'static str,
    path: &Path,
) -> Result<T, PipelineError> {
    let raw = read_artifact(kind, path)?;
    serde_json::from_str(&raw).map_err(|source| PipelineError::MalformedInput {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

/// Spreadsheet extract: a JSON array of row objects keyed by column header.
pub fn load_spreadsheet(path: &Path) -> Result<Vec<SpreadsheetRow>, PipelineError> {
    parse_artifact("spreadsheet extract", path)
}

/// Narrative extract: a JSON array of `{filename, text}` objects. Entries
/// without a string `filename` and `text` are skipped, not fatal.
pub fn load_documents(path: &Path) -> Result<DocumentBatch, PipelineError> {
    let entries: Vec<Value> = parse_artifact("narrative extract", path)?;
    let mut batch = DocumentBatch::default();

    for (idx, entry) in entries.into_iter().enumerate() {
        let filename = entry.get("filename").and_then(Value::as_str);
        let text = entry.get("text").and_then(Value::as_str);
        match (filename, text) {
            (Some(filename), Some(text)) => batch.documents.push(RawDocument {
                filename: filename.to_string(),
                text: text.to_string(),
            }),
            (None, _) => {
                batch.skip(format!("entry #{}", idx), DocumentError::MissingField("filename"))
            }
            (Some(filename), None) => {
                batch.skip(filename.to_string(), DocumentError::MissingField("text"))
            }
        }
    }

    Ok(batch)
}

/// A directory of `.txt` extracts, one per document, read in file name order.
pub fn read_documents_dir(dir: &Path) -> Result<DocumentBatch, PipelineError> {
    if !dir.is_dir() {
        return Err(PipelineError::MissingInput {
            kind: "narrative directory",
            path: dir.to_path_buf(),
        });
    }
    let io_err = |source| PipelineError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut batch = DocumentBatch::default();
    let entries = fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()));
    let paths = text_paths(dir, entries, &mut batch);

    for path in paths {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match read_document(&path) {
            Ok(text) => batch.documents.push(RawDocument { filename, text }),
            Err(e) => batch.skip(filename, e),
        }
    }

    Ok(batch)
}

/// Sorted `.txt` paths among `entries`. Entries the OS could not read are
/// recorded as skipped.
fn text_paths<I>(dir: &Path, entries: I, batch: &mut DocumentBatch) -> Vec<PathBuf>
where
    I: IntoIterator<Item = io::Result<PathBuf>>,
{
    let mut paths = Vec::new();
    for (idx, entry) in entries.into_iter().enumerate() {
        match entry {
            Ok(path) if path.extension().is_some_and(|ext| ext == "txt") => paths.push(path),
            Ok(_) => {}
            Err(e) => batch.skip(format!("{} entry #{}", dir.display(), idx), e.into()),
        }
    }
    paths.sort();
    paths
}

fn read_document(path: &Path) -> Result<String, DocumentError> {
    let bytes = fs::read(path)?;
    String::from_utf8(bytes).map_err(|_| DocumentError::NotText)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_spreadsheet_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_spreadsheet(&dir.path().join("excel_data.json")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput { kind: "spreadsheet extract", .. }));
    }

    #[test]
    fn missing_documents_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_documents(&dir.path().join("raw.json")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput { .. }));
        let err = read_documents_dir(&dir.path().join("texts")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput { .. }));
    }

    #[test]
    fn malformed_artifact_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("excel_data.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_spreadsheet(&path).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedInput { .. }));
        assert!(err.to_string().contains("excel_data.json"));
    }

    #[test]
    fn spreadsheet_rows_load() {
        let rows = load_spreadsheet(Path::new("tests/fixtures/excel_data.json")).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[2]["学年名称"], json!("李雷"));
    }

    #[test]
    fn bad_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.json");
        let raw = json!([
            { "filename": "a——甲 A.pdf", "text": "班级：1" },
            { "filename": "b——乙 B.pdf", "text": null },
            { "text": "orphan" },
            { "filename": "c——丙 C.pdf", "text": "" }
        ]);
        fs::write(&path, raw.to_string()).unwrap();

        let batch = load_documents(&path).unwrap();
        let names: Vec<&str> = batch.documents.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["a——甲 A.pdf", "c——丙 C.pdf"]);
        assert_eq!(batch.skipped.len(), 2);
        assert_eq!(batch.skipped[0].0, "b——乙 B.pdf");
        assert!(matches!(batch.skipped[0].1, DocumentError::MissingField("text")));
        assert_eq!(batch.skipped[1].0, "entry #2");
    }

    #[test]
    fn unreadable_directory_entries_are_skipped() {
        let mut batch = DocumentBatch::default();
        let entries = vec![
            Ok(PathBuf::from("texts/b——乙 B.pdf.txt")),
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
            Ok(PathBuf::from("texts/notes.md")),
            Ok(PathBuf::from("texts/a——甲 A.pdf.txt")),
        ];

        let paths = text_paths(Path::new("texts"), entries, &mut batch);
        assert_eq!(
            paths,
            vec![PathBuf::from("texts/a——甲 A.pdf.txt"), PathBuf::from("texts/b——乙 B.pdf.txt")]
        );
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].0, "texts entry #1");
        assert!(matches!(batch.skipped[0].1, DocumentError::Unreadable(_)));
    }

    #[test]
    fn directory_skips_non_utf8_documents() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b——乙 B.pdf.txt"), "导师：张老师").unwrap();
        fs::write(dir.path().join("a——甲 A.pdf.txt"), [0xff, 0xfe, 0x00]).unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let batch = read_documents_dir(dir.path()).unwrap();
        assert_eq!(batch.documents.len(), 1);
        assert_eq!(batch.documents[0].filename, "b——乙 B.pdf.txt");
        assert_eq!(batch.documents[0].text, "导师：张老师");
        assert_eq!(batch.skipped.len(), 1);
        assert!(matches!(batch.skipped[0].1, DocumentError::NotText));
    }
}
