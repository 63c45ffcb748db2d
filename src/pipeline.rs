use std::fs;
use std::path::Path;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::courses;
use crate::db;
use crate::error::PipelineError;
use crate::input::{self, DocumentBatch, RawDocument};
use crate::parser::{self, assets::PhotoListing, identity::GpaTable, Context};
use crate::record::StudentRecord;
use crate::settings::Settings;

/// What a `process` run did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub documents: usize,
    pub records: usize,
    pub skipped: usize,
    pub courses_merged: usize,
}

impl RunSummary {
    pub fn print(&self) {
        println!(
            "Built {} records from {} documents ({} skipped, {} with courses).",
            self.records, self.documents, self.skipped, self.courses_merged,
        );
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let template = concat!(
        "{spinner:.green} [{elapsed_precise}] ",
        "[{bar:40.cyan/blue}] {pos}/{len} ({per_sec})"
    );
    if let Ok(style) = ProgressStyle::default_bar().template(template) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Assemble one record per document, in input order. Documents are
/// independent, so each chunk is fanned out across the rayon pool.
pub fn build_records(
    docs: &[RawDocument],
    ctx: &Context<'_>,
    chunk_size: usize,
) -> Vec<StudentRecord> {
    let pb = progress_bar(docs.len());
    let mut records = Vec::with_capacity(docs.len());

    for chunk in docs.chunks(chunk_size.max(1)) {
        let built: Vec<StudentRecord> = chunk
            .par_iter()
            .map(|doc| parser::assemble(doc, ctx))
            .collect();
        records.extend(built);
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    records
}

pub fn write_records(path: &Path, records: &[StudentRecord]) -> Result<(), PipelineError> {
    let io_err = |source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).map_err(io_err)
}

fn load_batch(settings: &Settings) -> Result<DocumentBatch, PipelineError> {
    match (&settings.documents_dir, &settings.documents) {
        (Some(dir), _) => input::read_documents_dir(dir),
        (None, Some(path)) => input::load_documents(path),
        (None, None) => Err(PipelineError::NoDocumentSource),
    }
}

/// Full run: inputs → records → JSON (and the SQLite mirror when configured).
/// Every input is loaded before anything is written.
pub fn run(settings: &Settings) -> Result<RunSummary> {
    let rows = input::load_spreadsheet(&settings.spreadsheet)?;
    let batch = load_batch(settings)?;
    let course_book = settings
        .courses
        .as_deref()
        .map(courses::load_course_book)
        .transpose()?;

    let gpa = GpaTable::build(&rows, &settings.gpa_columns());
    if gpa.is_empty() {
        warn!(
            "No GPA entries found in {:?} (column {:?}); every record gets N/A",
            settings.spreadsheet, settings.gpa_name_column
        );
    }
    let photos = PhotoListing::scan(&settings.photos_dir);
    if photos.is_empty() {
        warn!("No photos in {:?}; every record gets a null photo", settings.photos_dir);
    }
    info!(
        "Loaded {} documents, {} GPA entries, {} photos",
        batch.documents.len(),
        gpa.len(),
        photos.len()
    );

    let ctx = Context {
        gpa: &gpa,
        photos: &photos,
        photo_url_prefix: &settings.photo_url_prefix,
    };
    let mut records = build_records(&batch.documents, &ctx, settings.chunk_size);

    let mut courses_merged = 0;
    if let Some(book) = &course_book {
        let (merged, count) = courses::merge_all(records, book);
        records = merged;
        courses_merged = count;
    }

    write_records(&settings.output, &records)?;
    info!("Wrote {} records to {:?}", records.len(), settings.output);

    let summary = RunSummary {
        documents: batch.documents.len() + batch.skipped.len(),
        records: records.len(),
        skipped: batch.skipped.len(),
        courses_merged,
    };

    if let Some(path) = &settings.database {
        let conn = db::connect(path)?;
        db::init_schema(&conn)?;
        let saved = db::save_records(&conn, &records)?;
        db::insert_run(&conn, &db::new_run_id(), &summary)?;
        info!(
            "Mirrored {} distinct students ({} records) to {:?}",
            saved,
            records.len(),
            path
        );
    }

    Ok(summary)
}

/// Merge a course extract into an existing records file.
pub fn merge_courses_file(records_path: &Path, courses_path: &Path, out: &Path) -> Result<usize> {
    let records: Vec<StudentRecord> = input::parse_artifact("records file", records_path)?;
    let book = courses::load_course_book(courses_path)?;
    let (records, merged) = courses::merge_all(records, &book);
    write_records(out, &records)?;
    info!("Merged courses into {}/{} records", merged, records.len());
    Ok(merged)
}

// ── Tests ──
