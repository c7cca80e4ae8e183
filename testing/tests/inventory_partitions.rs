//! Suites for the seat inventory: partition exclusivity, sentinel routing,
//! exhaustion fallback into new-event creation, re-partitioning.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::thread;
use ticketbench_core::{BenchDataSet, EventId, SeatNum, State};
use ticketbench_testing::{fixtures, init_test_logging};

#[test]
fn public_event_seats_are_generated_unassigned() {
    init_test_logging();
    let state = State::new(BenchDataSet {
        events: vec![fixtures::event(1, true, false)],
        sheet_kinds: vec![fixtures::sheet_kind("S", 2, 5000)],
        ..BenchDataSet::default()
    })
    .unwrap();

    let first = state.pop_event_sheet().unwrap();
    let second = state.pop_event_sheet().unwrap();
    for sheet in [&first, &second] {
        assert_eq!(sheet.event_id, EventId::new(1));
        assert_eq!(sheet.rank, "S");
        assert!(sheet.num.is_unassigned());
    }
    // Capacity 2 means the third checkout finds nothing.
    assert!(state.pop_event_sheet().is_none());
}

#[test]
fn private_and_closed_events_are_never_offered() {
    init_test_logging();
    let state = State::new(BenchDataSet {
        events: vec![
            fixtures::event(1, true, false),
            fixtures::event(2, false, false),
            fixtures::event(3, false, true),
        ],
        sheet_kinds: fixtures::sheet_kinds(),
        ..BenchDataSet::default()
    })
    .unwrap();

    let counts = state.sheet_counts();
    assert_eq!(counts.public, 7);
    assert_eq!(counts.private, 7);
    assert_eq!(counts.closed, 7);

    while let Some(sheet) = state.pop_event_sheet() {
        assert_eq!(sheet.event_id, EventId::new(1));
    }
    // The private and closed partitions are untouched by checkout traffic.
    let counts = state.sheet_counts();
    assert_eq!(counts.private, 7);
    assert_eq!(counts.closed, 7);
}

#[test]
fn concurrent_seat_checkout_drains_exactly_the_capacity() {
    init_test_logging();
    let state = Arc::new(
        State::new(BenchDataSet {
            events: vec![fixtures::event(1, true, false)],
            sheet_kinds: vec![fixtures::sheet_kind("A", 50, 3000)],
            ..BenchDataSet::default()
        })
        .unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let state = Arc::clone(&state);
            thread::spawn(move || {
                let mut taken = 0u32;
                while state.pop_event_sheet().is_some() {
                    taken += 1;
                }
                taken
            })
        })
        .collect();

    let total: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, 50);
    assert!(state.pop_event_sheet().is_none());
}

#[test]
fn released_bound_seats_never_reenter_public_circulation() {
    init_test_logging();
    let state = Arc::new(
        State::new(BenchDataSet {
            events: vec![fixtures::event(1, true, false)],
            sheet_kinds: vec![fixtures::sheet_kind("B", 40, 1000)],
            ..BenchDataSet::default()
        })
        .unwrap(),
    );

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let state = Arc::clone(&state);
            thread::spawn(move || {
                while let Some(mut sheet) = state.pop_event_sheet() {
                    // The service assigned a concrete seat.
                    sheet.num = SeatNum::new(worker + 1);
                    state.push_event_sheet(sheet);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let counts = state.sheet_counts();
    assert_eq!(counts.public, 0);
    assert_eq!(counts.reserved, 40);
}

#[test]
fn exhausted_inventory_falls_back_to_new_event_creation() {
    init_test_logging();
    let state = State::new(BenchDataSet {
        sheet_kinds: vec![fixtures::sheet_kind("S", 3, 5000)],
        ..BenchDataSet::default()
    })
    .unwrap();

    // No events at all: the public inventory is empty.
    assert!(state.pop_event_sheet().is_none());

    // The worker that wins admission creates the event; the service assigns
    // the real id before the draft is published.
    let guard = state.new_event_admission().unwrap();
    assert!(state.new_event_admission().is_none());

    let mut draft = state.draft_event();
    assert!(draft.id.is_unassigned());
    draft.id = EventId::new(42);
    state.publish_event(draft).unwrap();
    drop(guard);

    let sheet = state.pop_event_sheet().unwrap();
    assert_eq!(sheet.event_id, EventId::new(42));
    assert_eq!(state.sheet_counts().public, 2);
    assert!(state.find_event(EventId::new(42)).is_some());
}

#[test]
fn closing_an_event_pulls_its_seats_from_public() {
    init_test_logging();
    let state = State::new(BenchDataSet {
        events: vec![fixtures::event(1, true, false), fixtures::event(2, true, false)],
        sheet_kinds: vec![fixtures::sheet_kind("A", 5, 3000)],
        ..BenchDataSet::default()
    })
    .unwrap();
    assert_eq!(state.sheet_counts().public, 10);

    state.update_event(fixtures::event(1, false, true)).unwrap();

    let counts = state.sheet_counts();
    assert_eq!(counts.public, 5);
    assert_eq!(counts.closed, 5);
    while let Some(sheet) = state.pop_event_sheet() {
        assert_eq!(sheet.event_id, EventId::new(2));
    }

    let updated = state.find_event(EventId::new(1)).unwrap();
    assert!(updated.closed);
    assert!(!updated.public);
}
