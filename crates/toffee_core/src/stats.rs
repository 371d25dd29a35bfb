//! crates/toffee_core/src/stats.rs
//!
//! Lifetime and rolling seven-day progress summaries, computed client-side
//! over the user's full document set. The store offers no server-side
//! aggregation, so both passes are plain folds over in-memory records.

use chrono::{Datelike, Days, Local, NaiveDate};
use serde::Serialize;

use crate::domain::{Document, QuizKind, ReviewLog};

/// Accuracy as a rounded whole percentage; `0` when nothing was answered.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        (100.0 * correct as f64 / total as f64).round() as u32
    }
}

/// Per-kind lifetime totals.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct QuizTotals {
    pub total: usize,
    pub correct: usize,
    pub percentage: u32,
}

/// Lifetime accuracy per quiz kind plus the all-time flashcards-studied
/// counter.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LifetimeStats {
    pub mcq: QuizTotals,
    pub tf: QuizTotals,
    pub fitb: QuizTotals,
    pub flashcards_studied: u32,
}

impl LifetimeStats {
    pub fn of(&self, kind: QuizKind) -> QuizTotals {
        match kind {
            QuizKind::Mcq => self.mcq,
            QuizKind::Tf => self.tf,
            QuizKind::Fitb => self.fitb,
        }
    }
}

/// Sums quiz results across every document and flashcards studied across
/// every review log. Missing or malformed result fields were already
/// normalized to empty at read time, so this never fails.
pub fn lifetime_stats(docs: &[Document], reviews: &[ReviewLog]) -> LifetimeStats {
    let mut stats = LifetimeStats::default();
    for kind in QuizKind::ALL {
        let mut total = 0;
        let mut correct = 0;
        for doc in docs {
            let results = doc.results.of(kind);
            total += results.len();
            correct += results.iter().filter(|r| r.correct).count();
        }
        let totals = QuizTotals {
            total,
            correct,
            percentage: percentage(correct, total),
        };
        match kind {
            QuizKind::Mcq => stats.mcq = totals,
            QuizKind::Tf => stats.tf = totals,
            QuizKind::Fitb => stats.fitb = totals,
        }
    }
    stats.flashcards_studied = reviews.iter().map(ReviewLog::cards_studied).sum();
    stats
}

/// Activity over the trailing seven days, `[today-6, today]` at local
/// midnight.
///
/// The streak is indexed chronologically from `today-6`, not from a fixed
/// weekday: the window rolls with the current day. Callers wanting weekday
/// labels use [`day_labels`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct WeeklyStats {
    pub docs: u32,
    pub quizzes: u32,
    pub accuracy: u32,
    pub streak: [bool; 7],
}

/// Computes the weekly summary for the window ending at `today`.
///
/// Quiz results carry no timestamp of their own, only their containing
/// document does, so results are attributed to the document's creation
/// day. This is a deliberate coarse approximation carried over from the
/// shipped behavior: quizzes taken this week on an older document are
/// invisible here.
pub fn weekly_stats(docs: &[Document], today: NaiveDate) -> WeeklyStats {
    let week_ago = today - Days::new(6);
    let mut stats = WeeklyStats::default();
    let mut total = 0;
    let mut correct = 0;

    for doc in docs {
        let created = doc.created_at.with_timezone(&Local).date_naive();
        let day_diff = (created - week_ago).num_days();
        let in_window = (0..7).contains(&day_diff);
        if in_window {
            stats.streak[day_diff as usize] = true;
            stats.docs += 1;
        }
        for kind in QuizKind::ALL {
            let results = doc.results.of(kind);
            if results.is_empty() || !in_window {
                continue;
            }
            stats.streak[day_diff as usize] = true;
            stats.quizzes += 1;
            total += results.len();
            correct += results.iter().filter(|r| r.correct).count();
        }
    }

    stats.accuracy = percentage(correct, total);
    stats
}

const DAY_NAMES: [&str; 7] = ["S", "M", "T", "W", "T", "F", "S"];

/// Weekday initials for the streak slots, oldest day first. Slot `i`
/// labels `today - 6 + i`, i.e. `labels[(today_weekday - 6 + i + 7) % 7]`.
pub fn day_labels(today: NaiveDate) -> [&'static str; 7] {
    let weekday = today.weekday().num_days_from_sunday() as i64;
    let mut labels = [""; 7];
    for (i, label) in labels.iter_mut().enumerate() {
        *label = DAY_NAMES[((weekday - 6 + i as i64 + 7) % 7) as usize];
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewDocument, QuizResult, ResultLog};
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    fn doc_created_at(created_at: DateTime<Utc>, results: ResultLog) -> Document {
        let new = NewDocument::new("the text", "the summary");
        Document {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            summary: new.summary,
            text: new.text,
            text_hash: new.text_hash,
            created_at,
            questions: Default::default(),
            results,
            flashcards: Vec::new(),
            tags: Vec::new(),
            imported_from: None,
        }
    }

    fn local_utc(date: NaiveDate, h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(date.year(), date.month(), date.day(), h, m, s)
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn results(kind: QuizKind, outcomes: &[bool]) -> ResultLog {
        let mut log = ResultLog::default();
        *log.of_mut(kind) = outcomes
            .iter()
            .enumerate()
            .map(|(i, &correct)| QuizResult {
                question_index: i,
                correct,
            })
            .collect();
        log
    }

    #[test]
    fn percentage_of_nothing_is_zero() {
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn percentage_rounds() {
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 3), 33);
    }

    #[test]
    fn lifetime_stats_sum_across_documents() {
        let now = Utc::now();
        let docs = vec![
            doc_created_at(now, results(QuizKind::Mcq, &[true, false, true])),
            doc_created_at(now, results(QuizKind::Mcq, &[false])),
            doc_created_at(now, results(QuizKind::Tf, &[true])),
        ];
        let stats = lifetime_stats(&docs, &[]);
        assert_eq!(stats.mcq.total, 4);
        assert_eq!(stats.mcq.correct, 2);
        assert_eq!(stats.mcq.percentage, 50);
        assert_eq!(stats.tf.percentage, 100);
        assert_eq!(stats.fitb.total, 0);
        assert_eq!(stats.fitb.percentage, 0);
    }

    #[test]
    fn lifetime_stats_count_flashcards_with_fallback() {
        let reviews = vec![
            ReviewLog {
                id: Uuid::new_v4(),
                completed_at: Utc::now(),
                total_cards: Some(5),
                easy_count: 3,
                hard_count: 2,
                card_ids: vec!["0".into()],
            },
            // An older record without total_cards falls back to card_ids.
            ReviewLog {
                id: Uuid::new_v4(),
                completed_at: Utc::now(),
                total_cards: None,
                easy_count: 1,
                hard_count: 1,
                card_ids: vec!["0".into(), "1".into(), "2".into()],
            },
        ];
        let stats = lifetime_stats(&[], &reviews);
        assert_eq!(stats.flashcards_studied, 8);
    }

    #[test]
    fn weekly_window_includes_sixth_day_midnight() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let oldest = today - Days::new(6);
        let docs = vec![doc_created_at(local_utc(oldest, 0, 0, 0), ResultLog::default())];
        let stats = weekly_stats(&docs, today);
        assert_eq!(stats.docs, 1);
        assert!(stats.streak[0]);
    }

    #[test]
    fn weekly_window_excludes_seventh_day_even_at_its_last_second() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let too_old = today - Days::new(7);
        let docs = vec![doc_created_at(
            local_utc(too_old, 23, 59, 59),
            results(QuizKind::Mcq, &[true]),
        )];
        let stats = weekly_stats(&docs, today);
        assert_eq!(stats.docs, 0);
        assert_eq!(stats.quizzes, 0);
        assert_eq!(stats.accuracy, 0);
        assert_eq!(stats.streak, [false; 7]);
    }

    #[test]
    fn weekly_quizzes_count_document_kind_pairs_not_results() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let mut log = results(QuizKind::Mcq, &[true, false, true]);
        log.tf = results(QuizKind::Tf, &[true]).tf;
        let docs = vec![doc_created_at(local_utc(today, 12, 0, 0), log)];
        let stats = weekly_stats(&docs, today);
        // One document with mcq and tf results → two (document, kind) pairs.
        assert_eq!(stats.quizzes, 2);
        assert_eq!(stats.accuracy, percentage(3, 4));
    }

    #[test]
    fn weekly_streak_marks_creation_days() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let docs = vec![
            doc_created_at(local_utc(today, 9, 0, 0), ResultLog::default()),
            doc_created_at(
                local_utc(today - Days::new(3), 21, 30, 0),
                ResultLog::default(),
            ),
        ];
        let stats = weekly_stats(&docs, today);
        assert!(stats.streak[6]);
        assert!(stats.streak[3]);
        assert_eq!(stats.streak.iter().filter(|d| **d).count(), 2);
    }

    #[test]
    fn weekly_results_on_old_documents_are_invisible() {
        // The known coarse attribution: results live on a document created
        // before the window, so they contribute nothing this week.
        let today = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let docs = vec![doc_created_at(
            local_utc(today - Days::new(30), 10, 0, 0),
            results(QuizKind::Fitb, &[true, true]),
        )];
        let stats = weekly_stats(&docs, today);
        assert_eq!(stats.quizzes, 0);
        assert_eq!(stats.accuracy, 0);
    }

    #[test]
    fn day_labels_follow_the_rolling_window() {
        // 2026-08-07 is a Friday: the last slot is today, the first slot
        // is the preceding Saturday.
        let today = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let labels = day_labels(today);
        assert_eq!(labels[6], "F");
        assert_eq!(labels[0], "S");
        assert_eq!(labels[1], "S");
        assert_eq!(labels[2], "M");
    }
}
