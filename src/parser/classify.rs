use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;

/// A case-insensitive matcher and the label it contributes.
#[derive(Debug, Clone)]
pub struct PatternRule {
    matcher: Regex,
    label: &'static str,
}

impl PatternRule {
    pub fn new(pattern: &str, label: &'static str) -> Self {
        PatternRule {
            matcher: Regex::new(&format!("(?i){}", pattern)).unwrap(),
            label,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn matches(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }
}

/// Ordered rules plus the maximum number of labels they may emit.
#[derive(Debug)]
pub struct RuleSet {
    pub cap: usize,
    pub rules: Vec<PatternRule>,
}

impl RuleSet {
    pub fn classify(&self, text: &str) -> Vec<String> {
        classify(text, &self.rules, self.cap)
    }
}

pub static STRENGTHS: LazyLock<RuleSet> = LazyLock::new(|| RuleSet {
    cap: 4,
    rules: vec![
        PatternRule::new(
            "出⾊|excellent|outstanding|优秀|strong|impressive|remarkable",
            "Academic Excellence",
        ),
        PatternRule::new("leadership|领导⼒|responsible|责任感", "Leadership"),
        PatternRule::new("creative|创造⼒|innovative|创新", "Creativity"),
        PatternRule::new("analytical|分析|critical thinking|思辨", "Analytical Thinking"),
        PatternRule::new("teamwork|团队|collaborative|协作", "Teamwork"),
        PatternRule::new("communication|沟通|articulate|表达", "Communication"),
        PatternRule::new("persistent|坚持|resilient|韧性", "Persistence"),
    ],
});

pub static WEAKNESSES: LazyLock<RuleSet> = LazyLock::new(|| RuleSet {
    cap: 3,
    rules: vec![
        PatternRule::new(
            "time management|时间管理|按时|deadline|late|迟交",
            "Time Management",
        ),
        PatternRule::new(
            "participation|参与|engage|课堂|passive",
            "Class Participation",
        ),
        PatternRule::new("attention|专注|focus|distract|分⼼", "Focus & Attention"),
        PatternRule::new("confidence|⾃信|shy|hesitant", "Confidence"),
        PatternRule::new("foundation|基础|fundamental|basic", "Foundational Skills"),
        PatternRule::new("consistency|稳定|consistent|fluctuat", "Consistency"),
    ],
});

pub static ACTIVITIES: LazyLock<RuleSet> = LazyLock::new(|| RuleSet {
    cap: 4,
    rules: vec![
        PatternRule::new("篮球|basketball", "🏀 Basketball"),
        PatternRule::new("⾜球|football|soccer", "⚽ Football"),
        PatternRule::new("飞盘|frisbee", "🥏 Frisbee"),
        PatternRule::new("音乐剧|musical|drama|戏剧", "🎭 Musical/Drama"),
        PatternRule::new("商社|business club|商赛", "💼 Business Club"),
        PatternRule::new("⼿⼯|craft|handmade", "🎨 Crafts"),
        PatternRule::new("debate|辩论", "🎤 Debate"),
        // Plain substring match: "art" also fires inside "start" or "part".
        PatternRule::new("art|艺术|painting|绘画", "🖼️ Art"),
    ],
});

/// Labels of every rule that matches `text`, in rule order, deduplicated and
/// capped at `cap`. One hit counts the same as many.
pub fn classify(text: &str, rules: &[PatternRule], cap: usize) -> Vec<String> {
    rules
        .iter()
        .filter(|rule| rule.matches(text))
        .map(PatternRule::label)
        .unique()
        .take(cap)
        .map(str::to_string)
        .collect()
}

// ── Tests ──
