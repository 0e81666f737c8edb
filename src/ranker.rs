//! Candidate ranking
//!
//! The images endpoint returns candidates in provider order, mixed across
//! languages and formats. Ranking applies a strict tie-break order so the
//! same input always yields the same choice:
//!
//! 1. raster format over vector (vector assets get rasterized downstream,
//!    but a native raster of equal rank is preferred),
//! 2. exact match on the preferred language,
//! 3. the fallback language `en`,
//! 4. higher vote average,
//! 5. provider order.

use std::cmp::Ordering;

use crate::models::{LogoCandidate, LogoFormat};

/// Language used when no candidate matches the preferred one
pub const FALLBACK_LANGUAGE: &str = "en";

/// Choose the best candidate for the preferred language.
///
/// Total and deterministic: a non-empty input always yields a candidate.
pub fn pick<'a>(
    candidates: &'a [LogoCandidate],
    preferred_language: &str,
) -> Option<&'a LogoCandidate> {
    // min_by keeps the first of equally-ranked candidates, preserving
    // provider order as the final tie-break
    candidates
        .iter()
        .min_by(|a, b| compare(a, b, preferred_language))
}

/// `Less` means `a` ranks better than `b`
fn compare(a: &LogoCandidate, b: &LogoCandidate, preferred_language: &str) -> Ordering {
    format_rank(a)
        .cmp(&format_rank(b))
        .then_with(|| language_rank(a, preferred_language).cmp(&language_rank(b, preferred_language)))
        .then_with(|| {
            b.vote_average
                .unwrap_or(0.0)
                .total_cmp(&a.vote_average.unwrap_or(0.0))
        })
}

fn format_rank(candidate: &LogoCandidate) -> u8 {
    match candidate.format() {
        LogoFormat::Raster => 0,
        LogoFormat::Vector => 1,
    }
}

fn language_rank(candidate: &LogoCandidate, preferred_language: &str) -> u8 {
    match candidate.iso_639_1.as_deref() {
        Some(lang) if lang == preferred_language => 0,
        Some(FALLBACK_LANGUAGE) => 1,
        _ => 2,
    }
}
