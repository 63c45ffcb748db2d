use serde::{Deserialize, Serialize};

use crate::parser::identity::GpaValue;

pub const NOT_AVAILABLE: &str = "Not available";

/// One output row. Field names are bound by the dashboard, keep them stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: String,
    pub name: String,
    pub chinese_name: String,
    pub class_name: String,
    pub tutor_name: String,
    pub gpa: GpaValue,
    pub photo: Option<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub activities: Vec<String>,
    pub growth_portrait: GrowthPortrait,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub academic_strength: Option<String>,
    #[serde(default)]
    pub academic_weakness: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPortrait {
    pub goals: String,
    pub self_reflection: String,
    pub tutor_comment: String,
}

impl GrowthPortrait {
    /// Missing and empty sections both become the "Not available" sentinel.
    pub fn from_sections(
        goals: Option<String>,
        self_reflection: Option<String>,
        tutor_comment: Option<String>,
    ) -> Self {
        GrowthPortrait {
            goals: or_not_available(goals),
            self_reflection: or_not_available(self_reflection),
            tutor_comment: or_not_available(tutor_comment),
        }
    }
}

fn or_not_available(section: Option<String>) -> String {
    section
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub name: String,
    pub grade: String,
    pub grade_num: u8,
    pub feedback: String,
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> StudentRecord {
        StudentRecord {
            id: "李雷".into(),
            name: "李雷 Leo Li".into(),
            chinese_name: "李雷".into(),
            class_name: "高一(3)班".into(),
            tutor_name: "王老师".into(),
            gpa: GpaValue::Text("3.8".into()),
            photo: None,
            strengths: vec!["Leadership".into()],
            weaknesses: vec![],
            activities: vec![],
            growth_portrait: GrowthPortrait::from_sections(
                Some("goal text".into()),
                None,
                Some(String::new()),
            ),
            courses: vec![],
            academic_strength: None,
            academic_weakness: None,
        }
    }

    #[test]
    fn serializes_every_field() {
        let value = serde_json::to_value(sample()).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "id", "name", "chineseName", "className", "tutorName", "gpa", "photo", "strengths",
            "weaknesses", "activities", "growthPortrait", "courses", "academicStrength",
            "academicWeakness",
        ] {
            assert!(obj.contains_key(key), "missing {}", key);
        }
        assert_eq!(value["photo"], json!(null));
        assert_eq!(value["weaknesses"], json!([]));
        assert_eq!(
            value["growthPortrait"],
            json!({
                "goals": "goal text",
                "selfReflection": "Not available",
                "tutorComment": "Not available"
            })
        );
    }

    #[test]
    fn reads_records_without_course_fields() {
        let mut value = serde_json::to_value(sample()).unwrap();
        let obj = value.as_object_mut().unwrap();
        obj.remove("courses");
        obj.remove("academicStrength");
        obj.remove("academicWeakness");
        let back: StudentRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, sample());
    }
}
