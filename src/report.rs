//! Plain-text rendering for the CLI.
//!
//! Every function returns a `String` so the output can be tested without
//! capturing stdout.

use crate::algorithm::Recommendation;
use crate::error::RecommendError;
use crate::history::{HistoryStats, RatingHistoryEntry, Trends};
use crate::recommend::RecommendationRequest;
use std::fmt::Write as _;

const RULE_WIDTH: usize = 40;

/// `count` stars for the integer part of `score` (at least zero).
#[must_use]
pub fn stars(score: f64, glyph: char) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = if score.is_finite() && score > 0.0 { score.trunc() as usize } else { 0 };
    std::iter::repeat(glyph).take(n).collect()
}

/// Ranked recommendation list with header.
#[must_use]
pub fn recommendations(request: &RecommendationRequest, results: &[Recommendation]) -> String {
    let mut out = header(request);
    for (i, rec) in results.iter().enumerate() {
        let _ = writeln!(out, "{}. 🎵 {}", i + 1, rec.label);
        let _ = writeln!(out, "   Predicted rating: {:.2}", rec.score);
        let _ = writeln!(out, "   Confidence: {}\n", stars(rec.score, '★'));
    }
    out
}

fn header(request: &RecommendationRequest) -> String {
    format!(
        "=== {} recommendations ===\nMinimum score: {} and up\n\n",
        request.method, request.min_score
    )
}

/// User-facing text for the two soft recommendation failures; other errors
/// render their `Display`.
#[must_use]
pub fn recommendation_failure(request: &RecommendationRequest, err: &RecommendError) -> String {
    match err {
        RecommendError::InsufficientData { have, need } => format!(
            "Rate at least {need} songs to get recommendations.\nSongs rated so far: {have}\n"
        ),
        RecommendError::NoQualifyingResults => format!(
            "{}No songs matched these settings.\nTry again with a different method or a lower minimum score.\n",
            header(request)
        ),
        other => format!("Recommendation failed: {other}\n"),
    }
}

/// History, newest first.
#[must_use]
pub fn history(entries: &[RatingHistoryEntry]) -> String {
    if entries.is_empty() {
        return "No ratings yet.\n".to_string();
    }

    let mut out = String::new();
    for entry in entries.iter().rev() {
        let timestamp = or_placeholder(&entry.timestamp, "unknown time");
        let song = or_placeholder(&entry.song_info, "unknown song");
        let genre = or_placeholder(&entry.genre, "unknown genre");
        #[allow(clippy::cast_possible_truncation)]
        let whole = entry.rating.trunc() as i64;

        let _ = writeln!(out, "🕒 {timestamp}");
        let _ = writeln!(out, "🎵 {song}");
        let _ = writeln!(out, "🎸 {genre}");
        let _ = writeln!(out, "Rating: {} ({whole})", stars(entry.rating, '⭐'));
        let _ = writeln!(out, "{}\n", "─".repeat(RULE_WIDTH));
    }
    out
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

#[must_use]
pub fn stats(stats: Option<&HistoryStats>) -> String {
    let Some(stats) = stats else {
        return "Not enough data to compute statistics.\n".to_string();
    };

    let mut out = String::from("=== Overall ===\n");
    let _ = writeln!(out, "Total ratings: {}", stats.total);
    let _ = writeln!(out, "Average rating: {:.2}\n", stats.mean);
    out.push_str("=== By genre ===\n");
    for genre in &stats.genres {
        let _ = writeln!(out, "{}:", genre.genre);
        let _ = writeln!(out, "  Ratings: {}", genre.count);
        let _ = writeln!(out, "  Average: {:.2}", genre.mean);
        let _ = writeln!(out, "  Preference: {}\n", stars(genre.mean, '★'));
    }
    out
}

/// Text stand-in for the two trend charts: a bar per genre average and the
/// rating timeline.
#[must_use]
pub fn trends(trends: Option<&Trends>) -> String {
    let Some(trends) = trends else {
        return "Not enough data to analyse trends.\n".to_string();
    };

    let mut out = String::from("=== Average rating by genre ===\n");
    let width = trends.genre_averages.iter().map(|(g, _)| g.chars().count()).max().unwrap_or(0);
    for (genre, avg) in &trends.genre_averages {
        let _ = writeln!(out, "{genre:<width$} {:<5} {avg:.2}", stars(*avg, '█'));
    }

    out.push_str("\n=== Rating timeline ===\n");
    for (at, rating) in &trends.timeline {
        let _ = writeln!(out, "{} {rating:.1} {}", at.format("%Y-%m-%d %H:%M"), stars(*rating, '●'));
    }
    out
}
