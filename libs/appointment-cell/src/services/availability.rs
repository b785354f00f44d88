//! Appointment slot availability.
//!
//! Candidate start times are fixed and do not depend on the day. A
//! candidate is free when no booked interval of the same day covers it.
//! Sundays and fixed-date holidays have no free slots at all.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};

use crate::models::ClosureReason;

/// First and last candidate start hours; one candidate per hour.
pub const FIRST_SLOT_HOUR: u32 = 8;
pub const LAST_SLOT_HOUR: u32 = 18;

/// Holidays that fall on the same calendar date every year, as (month, day).
pub const FIXED_HOLIDAYS: &[(u32, u32)] = &[
    (1, 1),   // Confraternização Universal
    (4, 21),  // Tiradentes
    (5, 1),   // Dia do Trabalho
    (9, 7),   // Independência
    (10, 12), // Nossa Senhora Aparecida
    (11, 2),  // Finados
    (11, 15), // Proclamação da República
    (11, 20), // Consciência Negra
    (12, 25), // Natal
];

/// A booked appointment's half-open occupied interval `[start, start + duration)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookedInterval {
    pub start: NaiveTime,
    pub duration_minutes: u32,
}

impl BookedInterval {
    pub fn new(start: NaiveTime, duration_minutes: u32) -> Self {
        Self {
            start,
            duration_minutes,
        }
    }

    fn start_minute(&self) -> u32 {
        minute_of_day(self.start)
    }

    // May run past midnight; minutes are not wrapped.
    fn end_minute(&self) -> u32 {
        self.start_minute().saturating_add(self.duration_minutes)
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        let minute = minute_of_day(time);
        self.start_minute() <= minute && minute < self.end_minute()
    }

    /// True when `[start, start + duration_minutes)` shares any minute with
    /// this interval.
    pub fn overlaps(&self, start: NaiveTime, duration_minutes: u32) -> bool {
        let other_start = minute_of_day(start);
        let other_end = other_start.saturating_add(duration_minutes);
        other_start < self.end_minute() && self.start_minute() < other_end
    }
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight() / 60
}

/// The clinic's fixed candidate start times, ascending.
pub fn candidate_slots() -> Vec<NaiveTime> {
    (FIRST_SLOT_HOUR..=LAST_SLOT_HOUR)
        .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
        .collect()
}

pub fn closure_reason(date: NaiveDate) -> Option<ClosureReason> {
    if date.weekday() == Weekday::Sun {
        Some(ClosureReason::Sunday)
    } else if FIXED_HOLIDAYS.contains(&(date.month(), date.day())) {
        Some(ClosureReason::Holiday)
    } else {
        None
    }
}

pub fn is_closed_day(date: NaiveDate) -> bool {
    closure_reason(date).is_some()
}

/// Candidates whose start does not fall inside any booked interval, in
/// the candidates' own order.
///
/// Only the candidate's start instant is checked; a long appointment that
/// starts in a free slot may still run into the next booking. Use
/// [`available_slots_for_duration`] when the new appointment's length is
/// known.
pub fn available_slots(candidates: &[NaiveTime], booked: &[BookedInterval]) -> Vec<NaiveTime> {
    candidates
        .iter()
        .copied()
        .filter(|slot| !booked.iter().any(|interval| interval.contains(*slot)))
        .collect()
}

/// Candidates where an appointment of `duration_minutes` fits without
/// overlapping any booked interval.
pub fn available_slots_for_duration(
    candidates: &[NaiveTime],
    booked: &[BookedInterval],
    duration_minutes: u32,
) -> Vec<NaiveTime> {
    if duration_minutes == 0 {
        return available_slots(candidates, booked);
    }

    candidates
        .iter()
        .copied()
        .filter(|slot| {
            !booked
                .iter()
                .any(|interval| interval.overlaps(*slot, duration_minutes))
        })
        .collect()
}

/// Day-aware entry point: closed days yield nothing, otherwise the
/// start-containment (or, with `duration_minutes`, full overlap) filter.
pub fn slots_for_day(
    date: NaiveDate,
    candidates: &[NaiveTime],
    booked: &[BookedInterval],
    duration_minutes: Option<u32>,
) -> Vec<NaiveTime> {
    if is_closed_day(date) {
        return Vec::new();
    }

    match duration_minutes {
        Some(duration) => available_slots_for_duration(candidates, booked, duration),
        None => available_slots(candidates, booked),
    }
}
