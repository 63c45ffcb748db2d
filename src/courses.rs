use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::PipelineError;
use crate::input::parse_artifact;
use crate::record::{Course, StudentRecord};

/// Scale words that show up where a course title should be when the page
/// layout confused the extractor.
const INVALID_NAME_FRAGMENTS: &[&str] = &["超越", "精熟", "掌握", "萌芽", "生长", "None", "高光"];
const DEFAULT_GRADE: u8 = 3;
const FEEDBACK_MAX_CHARS: usize = 300;
const SUMMARY_TAKE: usize = 3;

/// Per-student course extract, keyed by local-script name in [`CourseBook`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentCourses {
    #[serde(default)]
    pub courses: Vec<RawCourse>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCourse {
    pub name: Option<String>,
    #[serde(default)]
    pub grade_num: Option<i64>,
    #[serde(default)]
    pub feedback: Option<String>,
}

pub type CourseBook = BTreeMap<String, StudentCourses>;

pub fn load_course_book(path: &Path) -> Result<CourseBook, PipelineError> {
    parse_artifact("course extract", path)
}

pub fn clean_course_name(name: &str) -> Option<String> {
    if INVALID_NAME_FRAGMENTS.iter().any(|frag| name.contains(frag)) {
        return None;
    }
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Grade numbers outside 0..=5 fall back to the default grade.
fn grade_num(raw: Option<i64>) -> u8 {
    match raw {
        Some(n @ 0..=5) => n as u8,
        _ => DEFAULT_GRADE,
    }
}

pub fn grade_label(grade: u8) -> &'static str {
    match grade {
        5 => "超越[5]",
        4 => "精熟[4]",
        2 => "生长[2]",
        1 => "萌芽[1]",
        0 => "F",
        _ => "掌握[3]",
    }
}

pub fn clean_courses(raw: &[RawCourse]) -> Vec<Course> {
    raw.iter()
        .filter_map(|course| {
            let name = clean_course_name(course.name.as_deref()?)?;
            let grade = grade_num(course.grade_num);
            Some(Course {
                name,
                grade: grade_label(grade).to_string(),
                grade_num: grade,
                feedback: course
                    .feedback
                    .as_deref()
                    .unwrap_or_default()
                    .chars()
                    .take(FEEDBACK_MAX_CHARS)
                    .collect(),
            })
        })
        .collect()
}

fn is_high(course: &Course) -> bool {
    course.grade_num >= 4
}

fn is_low(course: &Course) -> bool {
    course.grade_num <= 2
}

fn summary_line(lead: &str, matches: &[&Course]) -> Option<String> {
    let first = matches.first()?;
    let mut line = format!("{} {}", lead, first.name);
    if matches.len() > 1 {
        line.push_str(&format!(" and {} other course(s)", matches.len() - 1));
    }
    Some(line)
}

/// `(academicStrength, academicWeakness)` for a cleaned course list.
pub fn academic_summary(courses: &[Course]) -> (Option<String>, Option<String>) {
    let high: Vec<&Course> = courses.iter().filter(|c| is_high(c)).collect();
    let low: Vec<&Course> = courses.iter().filter(|c| is_low(c)).collect();
    (
        summary_line("Excels in", &high),
        summary_line("Needs improvement in", &low),
    )
}

/// Attach course results to a record. High and low course names replace the
/// keyword-derived strengths and weaknesses when there are any.
pub fn with_courses(mut record: StudentRecord, entry: &StudentCourses) -> StudentRecord {
    let courses = clean_courses(&entry.courses);
    let (strength, weakness) = academic_summary(&courses);

    let high: Vec<String> = courses
        .iter()
        .filter(|c| is_high(c))
        .take(SUMMARY_TAKE)
        .map(|c| c.name.clone())
        .collect();
    let low: Vec<String> = courses
        .iter()
        .filter(|c| is_low(c))
        .take(SUMMARY_TAKE)
        .map(|c| c.name.clone())
        .collect();
    if !high.is_empty() {
        record.strengths = high;
    }
    if !low.is_empty() {
        record.weaknesses = low;
    }

    record.courses = courses;
    record.academic_strength = strength;
    record.academic_weakness = weakness;
    record
}

/// Merge every record that has an entry in `book`. Returns the merged count.
pub fn merge_all(records: Vec<StudentRecord>, book: &CourseBook) -> (Vec<StudentRecord>, usize) {
    let mut merged = 0;
    let records = records
        .into_iter()
        .map(|record| match book.get(&record.chinese_name) {
            Some(entry) => {
                merged += 1;
                with_courses(record, entry)
            }
            None => record,
        })
        .collect();
    (records, merged)
}

// ── Tests ──
