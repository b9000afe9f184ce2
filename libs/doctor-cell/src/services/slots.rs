use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{SlotTime, SlotsBooked};

/// Booking window: today plus the next six calendar days.
pub const WINDOW_DAYS: i64 = 7;

/// Working day boundaries; candidates step every 30 minutes and stop
/// strictly before the end boundary (last candidate 8:30 PM).
pub const SLOT_INTERVAL_MINUTES: i64 = 30;

fn first_slot() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).expect("valid opening time")
}

fn last_slot_exclusive() -> NaiveTime {
    NaiveTime::from_hms_opt(21, 0, 0).expect("valid closing time")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySlots {
    pub date: NaiveDate,
    pub times: Vec<SlotTime>,
}

/// Compute the offerable slots for a doctor over the booking window.
///
/// Pure and deterministic for a fixed `now`: the output is exactly the
/// candidate grid minus whatever the availability record already holds.
/// Day 0 starts at the fixed opening time even when `now` is later in the
/// day; past-due same-day slots are intentionally not trimmed (legacy
/// behavior, kept so server and client agree on the grid).
pub fn generate_slots(now: DateTime<Utc>, booked: &SlotsBooked) -> Vec<DaySlots> {
    let today = now.date_naive();

    (0..WINDOW_DAYS)
        .map(|offset| {
            let date = today + Duration::days(offset);
            DaySlots {
                date,
                times: day_candidates()
                    .filter(|time| booked.is_free(date, *time))
                    .collect(),
            }
        })
        .collect()
}

/// The fixed candidate grid for a single working day.
fn day_candidates() -> impl Iterator<Item = SlotTime> {
    let start = first_slot();
    let end = last_slot_exclusive();

    std::iter::successors(Some(start), move |current| {
        let next = *current + Duration::minutes(SLOT_INTERVAL_MINUTES);
        (next > *current && next < end).then_some(next)
    })
    .map(SlotTime::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 14, 30, 0).unwrap()
    }

    #[test]
    fn empty_record_yields_full_grid() {
        let days = generate_slots(fixed_now(), &SlotsBooked::new());

        assert_eq!(days.len(), 7);
        for day in &days {
            // (21:00 - 10:00) / 0:30 = 22 candidates per day
            assert_eq!(day.times.len(), 22);
        }
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        assert_eq!(days[6].date, NaiveDate::from_ymd_opt(2024, 6, 16).unwrap());
    }

    #[test]
    fn grid_boundaries() {
        let days = generate_slots(fixed_now(), &SlotsBooked::new());
        let first = days[0].times.first().unwrap();
        let last = days[0].times.last().unwrap();
        assert_eq!(first.to_string(), "10:00 AM");
        assert_eq!(last.to_string(), "8:30 PM");
    }

    #[test]
    fn booked_times_never_offered() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 11).unwrap();
        let mut booked = SlotsBooked::new();
        booked.reserve(date, "10:00 AM".parse().unwrap());
        booked.reserve(date, "4:30 PM".parse().unwrap());

        let days = generate_slots(fixed_now(), &booked);
        let day = days.iter().find(|d| d.date == date).unwrap();

        assert_eq!(day.times.len(), 20);
        for time in &day.times {
            assert!(booked.is_free(date, *time));
        }
    }

    #[test]
    fn fully_booked_day_yields_empty_bucket() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        let mut booked = SlotsBooked::new();
        for time in generate_slots(fixed_now(), &SlotsBooked::new())[0].times.clone() {
            booked.reserve(date, time);
        }

        let days = generate_slots(fixed_now(), &booked);
        let day = days.iter().find(|d| d.date == date).unwrap();
        assert!(day.times.is_empty());
        // Other days are untouched.
        assert_eq!(days[0].times.len(), 22);
    }

    #[test]
    fn day_zero_is_not_trimmed_to_current_time() {
        // 14:30 "now": the morning candidates are still offered.
        let days = generate_slots(fixed_now(), &SlotsBooked::new());
        assert!(days[0]
            .times
            .iter()
            .any(|t| t.to_string() == "10:00 AM"));
    }

    #[test]
    fn times_are_chronologically_ordered() {
        let days = generate_slots(fixed_now(), &SlotsBooked::new());
        for day in days {
            let mut sorted = day.times.clone();
            sorted.sort();
            assert_eq!(day.times, sorted);
        }
    }
}
