pub mod assets;
pub mod classify;
pub mod identity;
pub mod sections;
pub mod text;

use crate::input::RawDocument;
use crate::record::{GrowthPortrait, StudentRecord};
use assets::PhotoListing;
use identity::GpaTable;

/// Read-only state shared by every document in a run.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub gpa: &'a GpaTable,
    pub photos: &'a PhotoListing,
    pub photo_url_prefix: &'a str,
}

/// Document → normalized text → sections + tags + identity + photo → record.
///
/// Never fails: every gap is filled with its sentinel.
pub fn assemble(doc: &RawDocument, ctx: &Context<'_>) -> StudentRecord {
    let text = text::normalize(&doc.text);
    let who = identity::resolve_identity(&doc.filename);
    let gpa = identity::lookup_gpa(ctx.gpa, &who.local_name);

    let growth_portrait = GrowthPortrait::from_sections(
        sections::GOALS.extract(&text),
        sections::SELF_REFLECTION.extract(&text),
        sections::TUTOR_COMMENT.extract(&text),
    );

    let photo = ctx
        .photos
        .resolve(&who.local_name)
        .map(|file| format!("{}{}", ctx.photo_url_prefix, file));

    StudentRecord {
        id: who.local_name.clone(),
        name: who.full_name,
        chinese_name: who.local_name,
        class_name: sections::class_name(&doc.text).unwrap_or_default(),
        tutor_name: sections::tutor_name(&doc.text).unwrap_or_default(),
        gpa,
        photo,
        strengths: classify::STRENGTHS.classify(&text),
        weaknesses: classify::WEAKNESSES.classify(&text),
        activities: classify::ACTIVITIES.classify(&text),
        growth_portrait,
        courses: Vec::new(),
        academic_strength: None,
        academic_weakness: None,
    }
}

// ── Tests ──
