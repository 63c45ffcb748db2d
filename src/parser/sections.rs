use std::sync::LazyLock;

use regex::Regex;

use super::text::normalize;

// Labels come in either script, with a full-width or ASCII colon.
static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:班级|Class)[：:]\s*(.*)").unwrap());
static TUTOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:导师|Tutor)[：:]\s*(.*)").unwrap());

/// A narrative section bounded by a start heading and candidate closing headings.
#[derive(Debug, Clone, Copy)]
pub struct SectionSpec {
    pub start: &'static str,
    pub ends: &'static [&'static str],
}

// Headings come straight out of the PDF text layer, which renders several
// characters as Kangxi radicals (⽬ ⽣ ⾃ ⼰ ⾼ ⼈ ⻓). Keep them byte-exact.

pub const GOALS: SectionSpec = SectionSpec {
    start: "我的⽬标",
    ends: &["学⽣⾃我管理状况", "成长总结"],
};

pub const SELF_REFLECTION: SectionSpec = SectionSpec {
    start: "我眼中的⾃⼰",
    ends: &["我成长中的⾼光", "个⼈成⻓"],
};

pub const TUTOR_COMMENT: SectionSpec = SectionSpec {
    start: "导师眼中的我",
    ends: &["同伴眼中的我", "⽣活导师有话说"],
};

impl SectionSpec {
    pub fn extract(&self, text: &str) -> Option<String> {
        extract(text, self.start, self.ends)
    }
}

/// Raw slice between `start` and the earliest of `ends`.
///
/// Returns `None` when `start` does not occur. Runs to end-of-text when no
/// candidate end marker occurs after the start.
pub fn locate<'a>(text: &'a str, start: &str, ends: &[&str]) -> Option<&'a str> {
    let begin = text.find(start)? + start.len();
    let rest = &text[begin..];
    let cut = ends
        .iter()
        .filter_map(|marker| rest.find(marker))
        .min()
        .unwrap_or(rest.len());
    Some(&rest[..cut])
}

/// Normalized section text, or `None` when the section is missing.
pub fn extract(text: &str, start: &str, ends: &[&str]) -> Option<String> {
    locate(text, start, ends).map(normalize)
}

pub fn class_name(raw: &str) -> Option<String> {
    labeled_line(&CLASS_RE, raw)
}

pub fn tutor_name(raw: &str) -> Option<String> {
    labeled_line(&TUTOR_RE, raw)
}

/// Value following a `label：` heading. The label may sit on its own line with
/// the value on the next one.
fn labeled_line(re: &Regex, raw: &str) -> Option<String> {
    re.captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

// ── Tests ──
