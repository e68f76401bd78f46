use std::collections::BTreeMap;

use crate::models::{Feedback, FeedbackStats, GenreCount};

/// Summarizes a snapshot of feedback rows
///
/// Percentages are `100 * subset / total`. Percentages and the average are
/// rounded to one decimal, half away from zero. An empty snapshot yields zeros.
pub fn compute(rows: &[Feedback]) -> FeedbackStats {
    let total = rows.len();
    if total == 0 {
        return FeedbackStats::default();
    }

    let satisfied_count = rows.iter().filter(|f| f.user_satisfied == Some(true)).count();
    let dissatisfied_count = rows.iter().filter(|f| f.user_satisfied == Some(false)).count();
    let recommend_count = rows.iter().filter(|f| f.user_recommend == Some(true)).count();
    let confidence_sum: i64 = rows.iter().map(|f| i64::from(f.confidence)).sum();

    let mut genres: BTreeMap<&str, usize> = BTreeMap::new();
    for row in rows {
        *genres.entry(row.predicted_genre.as_str()).or_default() += 1;
    }

    FeedbackStats {
        total,
        satisfied_count,
        satisfied_percentage: percentage(satisfied_count, total),
        dissatisfied_count,
        dissatisfied_percentage: percentage(dissatisfied_count, total),
        recommend_count,
        recommend_percentage: percentage(recommend_count, total),
        average_confidence: round_one_decimal(confidence_sum as f64 / total as f64),
        genre_breakdown: genres
            .into_iter()
            .map(|(genre, count)| GenreCount {
                genre: genre.to_string(),
                count,
            })
            .collect(),
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_one_decimal(100.0 * part as f64 / total as f64)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
