use std::sync::LazyLock;

use regex::Regex;

static PAGE_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-- [0-9]+ of [0-9]+ --").unwrap());
static NEWLINE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").unwrap());

/// Strip `-- N of M --` page markers, collapse newline runs, trim the ends.
pub fn normalize(text: &str) -> String {
    let without_markers = PAGE_MARKER_RE.replace_all(text, "");
    NEWLINE_RUN_RE
        .replace_all(&without_markers, "\n")
        .trim()
        .to_string()
}

// ── Tests ──
