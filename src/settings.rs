use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::parser::identity::GpaColumns;

const ENV_PREFIX: &str = "PORTRAIT";
const DEFAULT_CONFIG_NAME: &str = "portrait";

/// Run settings. Layered as defaults < `portrait.toml` (or `--config`) <
/// `PORTRAIT_*` environment < CLI flags.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub spreadsheet: PathBuf,
    pub documents: Option<PathBuf>,
    pub documents_dir: Option<PathBuf>,
    pub photos_dir: PathBuf,
    pub photo_url_prefix: String,
    pub output: PathBuf,
    pub courses: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub chunk_size: usize,
    pub gpa_name_column: String,
    pub gpa_value_column: String,
    pub gpa_header_sentinels: Vec<String>,
}

impl Settings {
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let columns = GpaColumns::default();
        let file = match config_file {
            Some(path) => File::from(path.to_path_buf()).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        Config::builder()
            .set_default("spreadsheet", "data/excel_data.json")?
            .set_default("documents", "data/raw_documents.json")?
            .set_default("photos_dir", "public/photos")?
            .set_default("photo_url_prefix", "/photos/")?
            .set_default("output", "data/students.json")?
            .set_default("chunk_size", 500)?
            .set_default("gpa_name_column", columns.name)?
            .set_default("gpa_value_column", columns.value)?
            .set_default("gpa_header_sentinels", columns.header_sentinels)?
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("gpa_header_sentinels"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn gpa_columns(&self) -> GpaColumns {
        GpaColumns {
            name: self.gpa_name_column.clone(),
            value: self.gpa_value_column.clone(),
            header_sentinels: self.gpa_header_sentinels.clone(),
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portrait.toml");
        std::fs::write(
            &path,
            r#"
spreadsheet = "in/grades.json"
documents_dir = "in/texts"
chunk_size = 16
gpa_value_column = "2026学年"
gpa_header_sentinels = ["姓名"]
"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.spreadsheet, PathBuf::from("in/grades.json"));
        assert_eq!(settings.documents_dir, Some(PathBuf::from("in/texts")));
        assert_eq!(settings.chunk_size, 16);
        assert_eq!(settings.photo_url_prefix, "/photos/");
        assert_eq!(settings.database, None);

        let columns = settings.gpa_columns();
        assert_eq!(columns.name, "学年名称");
        assert_eq!(columns.value, "2026学年");
        assert_eq!(columns.header_sentinels, vec!["姓名"]);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
