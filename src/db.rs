use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::warn;

use crate::pipeline::RunSummary;
use crate::record::StudentRecord;

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }
    let conn = Connection::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS students (
            id               TEXT PRIMARY KEY,
            name             TEXT NOT NULL,
            chinese_name     TEXT NOT NULL,
            class_name       TEXT NOT NULL,
            tutor_name       TEXT NOT NULL,
            gpa              TEXT NOT NULL,
            photo            TEXT,
            goals            TEXT NOT NULL,
            self_reflection  TEXT NOT NULL,
            tutor_comment    TEXT NOT NULL,
            academic_strength TEXT,
            academic_weakness TEXT,
            updated_at       TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_students_class ON students(class_name);
        CREATE INDEX IF NOT EXISTS idx_students_tutor ON students(tutor_name);

        CREATE TABLE IF NOT EXISTS student_tags (
            student_id  TEXT NOT NULL REFERENCES students(id) ON DELETE CASCADE,
            kind        TEXT NOT NULL CHECK(kind IN ('strength','weakness','activity')),
            position    INTEGER NOT NULL,
            label       TEXT NOT NULL,
            UNIQUE(student_id, kind, label)
        );
        CREATE INDEX IF NOT EXISTS idx_tags_label ON student_tags(kind, label);

        CREATE TABLE IF NOT EXISTS student_courses (
            student_id  TEXT NOT NULL REFERENCES students(id) ON DELETE CASCADE,
            position    INTEGER NOT NULL,
            name        TEXT NOT NULL,
            grade       TEXT NOT NULL,
            grade_num   INTEGER NOT NULL,
            feedback    TEXT NOT NULL,
            UNIQUE(student_id, position)
        );

        CREATE TABLE IF NOT EXISTS pipeline_runs (
            run_id      TEXT PRIMARY KEY,
            documents   INTEGER NOT NULL,
            records     INTEGER NOT NULL,
            skipped     INTEGER NOT NULL,
            courses_merged INTEGER NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;
    Ok(())
}

/// Replace each student's rows. Rows are keyed by record id, so a later record
/// with the same id (e.g. several unresolved "Unknown" documents) replaces the
/// earlier one. Returns the number of distinct ids written.
pub fn save_records(conn: &Connection, records: &[StudentRecord]) -> Result<usize> {
    let mut seen: HashSet<&str> = HashSet::new();
    let tx = conn.unchecked_transaction()?;
    {
        let mut del_tags = tx.prepare("DELETE FROM student_tags WHERE student_id = ?1")?;
        let mut del_courses = tx.prepare("DELETE FROM student_courses WHERE student_id = ?1")?;
        let mut s_stmt = tx.prepare(
            "INSERT OR REPLACE INTO students
             (id, name, chinese_name, class_name, tutor_name, gpa, photo,
              goals, self_reflection, tutor_comment, academic_strength, academic_weakness)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)",
        )?;
        let mut t_stmt = tx.prepare(
            "INSERT OR IGNORE INTO student_tags (student_id, kind, position, label)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        let mut c_stmt = tx.prepare(
            "INSERT OR REPLACE INTO student_courses
             (student_id, position, name, grade, grade_num, feedback)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;

        for r in records {
            if !seen.insert(r.id.as_str()) {
                warn!("Duplicate student id {:?} ({}); keeping the later record", r.id, r.name);
            }
            del_tags.execute([&r.id])?;
            del_courses.execute([&r.id])?;
            let p = &r.growth_portrait;
            s_stmt.execute(rusqlite::params![
                r.id, r.name, r.chinese_name, r.class_name, r.tutor_name, r.gpa.to_string(),
                r.photo, p.goals, p.self_reflection, p.tutor_comment, r.academic_strength,
                r.academic_weakness,
            ])?;

            let tags = [
                ("strength", &r.strengths),
                ("weakness", &r.weaknesses),
                ("activity", &r.activities),
            ];
            for (kind, labels) in tags {
                for (i, label) in labels.iter().enumerate() {
                    t_stmt.execute(rusqlite::params![r.id, kind, i as i64, label])?;
                }
            }

            for (i, c) in r.courses.iter().enumerate() {
                c_stmt.execute(rusqlite::params![
                    r.id, i as i64, c.name, c.grade, c.grade_num, c.feedback,
                ])?;
            }
        }
    }
    tx.commit()?;
    Ok(seen.len())
}

// ── Runs ──

/// A recorded run as read back from `pipeline_runs`.
pub struct RunRow {
    pub run_id: String,
    pub summary: RunSummary,
    pub created_at: String,
}

pub fn new_run_id() -> String {
    chrono::Utc::now().format("run-%Y%m%dT%H%M%S%.3f").to_string()
}

pub fn insert_run(conn: &Connection, run_id: &str, summary: &RunSummary) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO pipeline_runs (run_id, documents, records, skipped, courses_merged)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            run_id,
            summary.documents as i64,
            summary.records as i64,
            summary.skipped as i64,
            summary.courses_merged as i64,
        ],
    )?;
    Ok(())
}

pub fn fetch_runs(conn: &Connection, limit: usize) -> Result<Vec<RunRow>> {
    let sql = format!(
        "SELECT run_id, documents, records, skipped, courses_merged, created_at
         FROM pipeline_runs
         ORDER BY created_at DESC, run_id DESC
         LIMIT {}",
        limit
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(RunRow {
                run_id: row.get(0)?,
                summary: RunSummary {
                    documents: row.get(1)?,
                    records: row.get(2)?,
                    skipped: row.get(3)?,
                    courses_merged: row.get(4)?,
                },
                created_at: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Tests ──
