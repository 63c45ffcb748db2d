use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Full name sits between the `——` delimiter and the extension.
static FILENAME_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"——(.*?)\.(?:pdf|txt)").unwrap());

pub const UNKNOWN_NAME: &str = "Unknown";
pub const GPA_NOT_FOUND: &str = "N/A";

/// One spreadsheet row, keyed by column header.
pub type SpreadsheetRow = Map<String, Value>;

/// GPA cell value, passed through without parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GpaValue {
    Number(serde_json::Number),
    Text(String),
}

impl GpaValue {
    pub fn not_found() -> Self {
        GpaValue::Text(GPA_NOT_FOUND.to_string())
    }

    fn from_cell(cell: &Value) -> Option<Self> {
        match cell {
            Value::Number(n) => Some(GpaValue::Number(n.clone())),
            Value::String(s) if !s.trim().is_empty() => Some(GpaValue::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for GpaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpaValue::Number(n) => write!(f, "{}", n),
            GpaValue::Text(s) => f.write_str(s),
        }
    }
}

/// Which spreadsheet columns hold the join name and the GPA, and which name
/// cells are header rows rather than students.
#[derive(Debug, Clone)]
pub struct GpaColumns {
    pub name: String,
    pub value: String,
    pub header_sentinels: Vec<String>,
}

impl Default for GpaColumns {
    fn default() -> Self {
        GpaColumns {
            name: "学年名称".to_string(),
            value: "2025学年".to_string(),
            header_sentinels: vec!["年级名称".to_string(), "姓名".to_string()],
        }
    }
}

/// Local-script name -> GPA. Built once per run, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct GpaTable {
    entries: HashMap<String, GpaValue>,
}

impl GpaTable {
    /// Later rows overwrite earlier ones with the same name. A later row with
    /// an empty GPA cell clears the earlier value.
    pub fn build(rows: &[SpreadsheetRow], columns: &GpaColumns) -> Self {
        let mut entries = HashMap::new();
        for row in rows {
            let Some(name) = row.get(&columns.name).and_then(name_cell) else {
                continue;
            };
            if columns.header_sentinels.iter().any(|s| *s == name) {
                continue;
            }
            match row.get(&columns.value).and_then(GpaValue::from_cell) {
                Some(gpa) => {
                    entries.insert(name, gpa);
                }
                None => {
                    entries.remove(&name);
                }
            }
        }
        GpaTable { entries }
    }

    pub fn get(&self, local_name: &str) -> Option<&GpaValue> {
        self.entries.get(local_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn name_cell(cell: &Value) -> Option<String> {
    match cell {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// GPA for `local_name`, or the `"N/A"` sentinel.
pub fn lookup_gpa(table: &GpaTable, local_name: &str) -> GpaValue {
    table
        .get(local_name)
        .cloned()
        .unwrap_or_else(GpaValue::not_found)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub full_name: String,
    pub local_name: String,
}

/// Derive the student's names from a `...——<FullName>.pdf` filename.
pub fn resolve_identity(filename: &str) -> Identity {
    let full_name = FILENAME_NAME_RE
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_NAME.to_string());
    let local_name = full_name
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string();
    Identity {
        full_name,
        local_name,
    }
}

// ── Tests ──
