use itertools::Itertools;

use crate::record::StudentRecord;

#[derive(Debug, Default, Clone)]
pub struct OverviewFilter {
    pub class_name: Option<String>,
    pub tutor_name: Option<String>,
    pub limit: usize,
}

impl OverviewFilter {
    fn accepts(&self, record: &StudentRecord) -> bool {
        self.class_name.as_deref().map_or(true, |c| record.class_name == c)
            && self.tutor_name.as_deref().map_or(true, |t| record.tutor_name == t)
    }
}

/// Records matching the filter, ordered by class then id.
pub fn select<'a>(records: &'a [StudentRecord], filter: &OverviewFilter) -> Vec<&'a StudentRecord> {
    records
        .iter()
        .filter(|r| filter.accepts(r))
        .sorted_by(|a, b| (&a.class_name, &a.id).cmp(&(&b.class_name, &b.id)))
        .take(filter.limit)
        .collect()
}

/// Label frequencies across `labels`, most common first.
pub fn label_counts<'a, I>(labels: I) -> Vec<(&'a str, usize)>
where
    I: IntoIterator<Item = &'a String>,
{
    labels
        .into_iter()
        .map(String::as_str)
        .counts()
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)))
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::identity::GpaValue;
    use crate::record::GrowthPortrait;

    fn record(id: &str, class: &str, tutor: &str, strengths: &[&str]) -> StudentRecord {
        StudentRecord {
            id: id.into(),
            name: id.into(),
            chinese_name: id.into(),
            class_name: class.into(),
            tutor_name: tutor.into(),
            gpa: GpaValue::not_found(),
            photo: None,
            strengths: strengths.iter().map(|s| s.to_string()).collect(),
            weaknesses: vec![],
            activities: vec![],
            growth_portrait: GrowthPortrait::from_sections(None, None, None),
            courses: vec![],
            academic_strength: None,
            academic_weakness: None,
        }
    }

    fn roster() -> Vec<StudentRecord> {
        vec![
            record("韩梅梅", "高一(5)班", "李老师", &["Creativity", "Teamwork"]),
            record("李雷", "高一(3)班", "王老师", &["Leadership", "Teamwork"]),
            record("林涛", "高一(3)班", "李老师", &["Teamwork"]),
        ]
    }

    #[test]
    fn filters_by_class_and_tutor() {
        let records = roster();
        let filter = OverviewFilter {
            class_name: Some("高一(3)班".into()),
            tutor_name: None,
            limit: 10,
        };
        let ids: Vec<&str> = select(&records, &filter).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["李雷", "林涛"]);

        let filter = OverviewFilter {
            class_name: Some("高一(3)班".into()),
            tutor_name: Some("李老师".into()),
            limit: 10,
        };
        assert_eq!(select(&records, &filter).len(), 1);
    }

    #[test]
    fn limit_applies_after_sorting() {
        let records = roster();
        let filter = OverviewFilter {
            limit: 1,
            ..Default::default()
        };
        let picked = select(&records, &filter);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].class_name, "高一(3)班");
    }

    #[test]
    fn counts_labels_most_common_first() {
        let records = roster();
        let counts = label_counts(records.iter().flat_map(|r| &r.strengths));
        assert_eq!(counts[0], ("Teamwork", 3));
        assert_eq!(counts.len(), 3);
    }
}
