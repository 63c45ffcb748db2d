mod courses;
mod db;
mod error;
mod input;
mod parser;
mod pipeline;
mod record;
mod report;
mod settings;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};

use crate::record::StudentRecord;
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "portrait_builder", about = "Student growth-portrait builder")]
struct Cli {
    /// Config file (default: ./portrait.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build student records from the spreadsheet, narratives and photos
    Process {
        #[arg(long)]
        spreadsheet: Option<PathBuf>,
        /// JSON array of {filename, text}
        #[arg(long)]
        documents: Option<PathBuf>,
        /// Directory of .txt extracts (takes precedence over --documents)
        #[arg(long)]
        documents_dir: Option<PathBuf>,
        #[arg(long)]
        photos: Option<PathBuf>,
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Per-student course extract to merge in
        #[arg(long)]
        courses: Option<PathBuf>,
        /// Mirror records into this SQLite database
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Merge a course extract into an existing records file
    MergeCourses {
        #[arg(long)]
        records: Option<PathBuf>,
        #[arg(long)]
        courses: PathBuf,
        /// Output path (default: overwrite --records)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Students overview table
    Overview {
        #[arg(long)]
        records: Option<PathBuf>,
        /// Filter by class (exact match)
        #[arg(long)]
        class: Option<String>,
        /// Filter by tutor (exact match)
        #[arg(long)]
        tutor: Option<String>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Show recent runs recorded in the database
    Stats {
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Process {
            spreadsheet,
            documents,
            documents_dir,
            photos,
            out,
            courses,
            db,
        } => {
            if let Some(p) = spreadsheet {
                settings.spreadsheet = p;
            }
            if documents.is_some() {
                settings.documents = documents;
            }
            if documents_dir.is_some() {
                settings.documents_dir = documents_dir;
            }
            if let Some(p) = photos {
                settings.photos_dir = p;
            }
            if let Some(p) = out {
                settings.output = p;
            }
            if courses.is_some() {
                settings.courses = courses;
            }
            if db.is_some() {
                settings.database = db;
            }

            let summary = pipeline::run(&settings)?;
            summary.print();
            println!("Output: {}", settings.output.display());
            Ok(())
        }
        Commands::MergeCourses { records, courses, out } => {
            let records = records.unwrap_or_else(|| settings.output.clone());
            let out = out.unwrap_or_else(|| records.clone());
            let merged = pipeline::merge_courses_file(&records, &courses, &out)?;
            println!("Merged courses for {} students into {}", merged, out.display());
            Ok(())
        }
        Commands::Overview {
            records,
            class,
            tutor,
            limit,
        } => {
            let path = records.unwrap_or_else(|| settings.output.clone());
            print_overview(
                &path,
                &report::OverviewFilter {
                    class_name: class,
                    tutor_name: tutor,
                    limit,
                },
            )
        }
        Commands::Stats { db, limit } => {
            let Some(path) = db.or(settings.database.clone()) else {
                println!("No database configured. Pass --db or set `database`.");
                return Ok(());
            };
            let conn = db::connect(&path)?;
            db::init_schema(&conn)?;
            let runs = db::fetch_runs(&conn, limit)?;
            if runs.is_empty() {
                println!("No runs recorded. Run 'process --db {}' first.", path.display());
                return Ok(());
            }
            println!(
                "{:<24} | {:<19} | {:>5} | {:>7} | {:>7} | {:>7}",
                "Run", "At", "Docs", "Records", "Skipped", "Courses"
            );
            println!("{}", "-".repeat(86));
            for r in &runs {
                println!(
                    "{:<24} | {:<19} | {:>5} | {:>7} | {:>7} | {:>7}",
                    r.run_id,
                    r.created_at,
                    r.summary.documents,
                    r.summary.records,
                    r.summary.skipped,
                    r.summary.courses_merged
                );
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn print_overview(path: &Path, filter: &report::OverviewFilter) -> anyhow::Result<()> {
    let records: Vec<StudentRecord> = input::parse_artifact("records file", path)?;
    let rows = report::select(&records, filter);
    if rows.is_empty() {
        println!("No students found.");
        return Ok(());
    }

    println!(
        "{:>3} | {:<16} | {:<24} | {:<12} | {:<10} | {:>5} | {:<5} | {:<30}",
        "#", "ID", "Name", "Class", "Tutor", "GPA", "Photo", "Strengths"
    );
    println!("{}", "-".repeat(124));

    for (i, r) in rows.iter().enumerate() {
        let photo = if r.photo.is_some() { "yes" } else { "-" };
        println!(
            "{:>3} | {:<16} | {:<24} | {:<12} | {:<10} | {:>5} | {:<5} | {:<30}",
            i + 1,
            truncate(&r.id, 16),
            truncate(&r.name, 24),
            truncate(&r.class_name, 12),
            truncate(&r.tutor_name, 10),
            r.gpa.to_string(),
            photo,
            truncate(&r.strengths.join(", "), 30),
        );
    }

    let activities = report::label_counts(rows.iter().flat_map(|r| &r.activities));
    if !activities.is_empty() {
        println!("\n--- Activities ---");
        for (label, n) in activities {
            println!("  {:<20} {}", label, n);
        }
    }

    println!("\n{} of {} students | {}", rows.len(), records.len(), path.display());
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

// ── Tests ──
