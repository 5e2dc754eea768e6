//! Attendance normalization.
//!
//! Converts raw check-in/check-out intervals into per-day
//! [`DaySegment`]s. Intervals are split at local midnight and at Sabbath
//! window boundaries, so every resulting segment is wholly inside one
//! calendar day and wholly on one side of the Sabbath boundary. Multiple
//! intervals on the same side of the same day merge into one segment, so
//! daily tier thresholds apply cumulatively across all worked hours.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::calendar::MonthContext;
use crate::config::{NightWindow, PayRules};
use crate::error::EngineResult;
use crate::models::{DaySegment, WorkInterval, check_non_overlapping};

/// An interval fragment lying within one day and one Sabbath side.
#[derive(Debug, Clone, Copy)]
struct Piece {
    start: NaiveDateTime,
    end: NaiveDateTime,
    in_sabbath: bool,
}

/// Normalizes raw work intervals into chronologically ordered day segments.
///
/// # Errors
///
/// - [`crate::error::EngineError::InvalidInterval`] for zero/negative
///   durations; intervals are never silently dropped.
/// - [`crate::error::EngineError::OverlappingIntervals`] when two intervals
///   overlap.
///
/// # Behavior
///
/// - An interval crossing midnight yields fragments on both days, hours
///   apportioned exactly by wall clock.
/// - An interval crossing a Sabbath boundary yields a pre-boundary and a
///   post-boundary fragment; fragments inside a window are tagged Sabbath.
/// - Fragments group per (date, Sabbath side); groups become segments.
/// - A segment is `is_night` when a strict majority of its hours fall
///   inside the configured night window.
pub fn normalize(
    intervals: &[WorkInterval],
    context: &MonthContext,
    rules: &PayRules,
) -> EngineResult<Vec<DaySegment>> {
    for interval in intervals {
        interval.validate()?;
    }
    check_non_overlapping(intervals)?;

    let mut pieces = Vec::new();
    for interval in intervals {
        for (start, end) in split_at_midnights(interval.start, interval.end) {
            for piece in split_at_sabbath_boundaries(start, end, context) {
                pieces.push(piece);
            }
        }
    }

    Ok(group_pieces(pieces, context, rules))
}

/// Splits `[start, end)` at every local midnight it crosses.
fn split_at_midnights(
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    let mut spans = Vec::new();
    let mut current = start;

    while current < end {
        let next_midnight = (current.date() + Days::new(1))
            .and_hms_opt(0, 0, 0)
            .expect("valid midnight");
        let span_end = next_midnight.min(end);
        spans.push((current, span_end));
        current = span_end;
    }
    spans
}

/// Splits a single-day span at any Sabbath window boundary inside it.
fn split_at_sabbath_boundaries(
    start: NaiveDateTime,
    end: NaiveDateTime,
    context: &MonthContext,
) -> Vec<Piece> {
    let mut cuts = vec![start];
    for window in &context.sabbath_windows {
        for boundary in [window.start, window.end] {
            if boundary > start && boundary < end {
                cuts.push(boundary);
            }
        }
    }
    cuts.push(end);
    cuts.sort();
    cuts.dedup();

    cuts.windows(2)
        .map(|pair| Piece {
            start: pair[0],
            end: pair[1],
            // Pieces are split at boundaries, so membership of the start
            // instant decides the whole piece.
            in_sabbath: context
                .sabbath_windows
                .iter()
                .any(|w| w.contains(pair[0])),
        })
        .collect()
}

/// Groups pieces per (date, Sabbath side) into tagged day segments.
fn group_pieces(pieces: Vec<Piece>, context: &MonthContext, rules: &PayRules) -> Vec<DaySegment> {
    struct Group {
        first_start: NaiveDateTime,
        total_seconds: i64,
        night_seconds: i64,
    }

    let mut groups: BTreeMap<(NaiveDate, bool), Group> = BTreeMap::new();
    for piece in pieces {
        let key = (piece.start.date(), piece.in_sabbath);
        let night = night_overlap_seconds(piece.start, piece.end, &rules.calendar.night_window);
        let seconds = (piece.end - piece.start).num_seconds();
        groups
            .entry(key)
            .and_modify(|g| {
                g.first_start = g.first_start.min(piece.start);
                g.total_seconds += seconds;
                g.night_seconds += night;
            })
            .or_insert(Group {
                first_start: piece.start,
                total_seconds: seconds,
                night_seconds: night,
            });
    }

    let mut segments: Vec<(NaiveDateTime, DaySegment)> = groups
        .into_iter()
        .map(|((date, in_sabbath), group)| {
            (
                group.first_start,
                DaySegment {
                    date,
                    total_hours: seconds_to_hours(group.total_seconds),
                    is_sabbath: in_sabbath,
                    is_holiday: context.is_holiday(date),
                    is_night: group.night_seconds * 2 > group.total_seconds,
                },
            )
        })
        .collect();

    segments.sort_by_key(|(first_start, _)| *first_start);
    segments.into_iter().map(|(_, segment)| segment).collect()
}

/// Seconds of `[start, end)` falling inside the night window.
///
/// The window may wrap midnight (22:00-06:00); both the window anchored on
/// the previous evening and the one starting the same evening can overlap a
/// single-day span.
fn night_overlap_seconds(start: NaiveDateTime, end: NaiveDateTime, window: &NightWindow) -> i64 {
    let mut seconds = 0;
    for anchor in [start.date() - Days::new(1), start.date()] {
        let (w_start, w_end) = if window.start > window.end {
            (
                anchor.and_time(window.start),
                (anchor + Days::new(1)).and_time(window.end),
            )
        } else {
            (anchor.and_time(window.start), anchor.and_time(window.end))
        };
        let overlap_start = start.max(w_start);
        let overlap_end = end.min(w_end);
        if overlap_start < overlap_end {
            seconds += (overlap_end - overlap_start).num_seconds();
        }
    }
    seconds
}

fn seconds_to_hours(seconds: i64) -> Decimal {
    Decimal::new(seconds, 0) / Decimal::new(3600, 0)
}
