use chrono::NaiveDate;

use doctor_cell::models::{SlotTime, SlotsBooked};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(s: &str) -> SlotTime {
    s.parse().unwrap()
}

#[test]
fn slot_time_round_trips_display_format() {
    let t = time("10:00 AM");
    assert_eq!(t.to_string(), "10:00 AM");

    let evening = time("8:30 PM");
    assert_eq!(evening.to_string(), "8:30 PM");

    assert!("25:00".parse::<SlotTime>().is_err());
    assert!("not a time".parse::<SlotTime>().is_err());
}

#[test]
fn slot_time_orders_chronologically() {
    // Lexical order would put "1:00 PM" before "9:00 AM".
    assert!(time("9:00 AM") < time("1:00 PM"));
    assert!(time("11:30 AM") < time("12:00 PM"));
    assert!(time("12:00 PM") < time("12:30 PM"));
}

#[test]
fn fresh_record_has_every_slot_free() {
    let record = SlotsBooked::new();
    assert!(record.is_free(date(2024, 6, 10), time("10:00 AM")));
    assert!(record.is_empty());
}

#[test]
fn reserved_slot_is_no_longer_free() {
    let mut record = SlotsBooked::new();
    let d = date(2024, 6, 10);

    assert!(record.reserve(d, time("10:00 AM")));
    assert!(!record.is_free(d, time("10:00 AM")));

    // Same time on another date stays free.
    assert!(record.is_free(date(2024, 6, 11), time("10:00 AM")));
    // Other times on the same date stay free.
    assert!(record.is_free(d, time("10:30 AM")));
}

#[test]
fn duplicate_reserve_reports_taken_and_keeps_one_entry() {
    let mut record = SlotsBooked::new();
    let d = date(2024, 6, 10);

    assert!(record.reserve(d, time("10:00 AM")));
    assert!(!record.reserve(d, time("10:00 AM")));

    assert_eq!(record.booked_on(d).unwrap().len(), 1);
}

#[test]
fn release_drops_empty_date_keys() {
    let mut record = SlotsBooked::new();
    let d = date(2024, 6, 10);

    record.reserve(d, time("10:00 AM"));
    record.reserve(d, time("11:00 AM"));
    assert_eq!(record.len(), 1);

    record.release(d, time("10:00 AM"));
    assert!(record.booked_on(d).is_some());

    record.release(d, time("11:00 AM"));
    assert!(record.booked_on(d).is_none());
    assert!(record.is_empty());
}

#[test]
fn releasing_an_absent_slot_is_a_no_op() {
    let mut record = SlotsBooked::new();
    record.release(date(2024, 6, 10), time("10:00 AM"));
    assert!(record.is_empty());

    record.reserve(date(2024, 6, 10), time("10:00 AM"));
    record.release(date(2024, 6, 10), time("4:00 PM"));
    assert!(!record.is_free(date(2024, 6, 10), time("10:00 AM")));
}

#[test]
fn record_serializes_as_date_keyed_time_lists() {
    let mut record = SlotsBooked::new();
    record.reserve(date(2024, 6, 10), time("10:30 AM"));
    record.reserve(date(2024, 6, 10), time("10:00 AM"));
    record.reserve(date(2024, 6, 12), time("8:30 PM"));

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "2024-06-10": ["10:00 AM", "10:30 AM"],
            "2024-06-12": ["8:30 PM"],
        })
    );

    let back: SlotsBooked = serde_json::from_value(value).unwrap();
    assert_eq!(back, record);
}
