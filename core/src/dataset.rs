//! Initial dataset supplied by the harness bootstrap, plus the uniform
//! selection helpers the scenario workers use.
//!
//! The dataset is passed into [`crate::State`] explicitly — there is no
//! ambient global — so tests can build a fresh state per case.

use crate::types::{Account, Administrator, Event, SeatNum, SheetKind};
use rand::Rng;
use std::sync::Arc;

/// Everything the state core is seeded with at initialization.
#[derive(Debug, Default)]
pub struct BenchDataSet {
    /// Accounts already registered on the target service.
    pub users: Vec<Account>,
    /// Supplementary accounts not yet registered; consumed newest-first by
    /// the sign-up scenario and promoted to the general pool on confirmed
    /// registration.
    pub new_users: Vec<Account>,
    /// Administrators already registered on the target service.
    pub administrators: Vec<Administrator>,
    /// Events already present on the target service.
    pub events: Vec<Event>,
    /// Seat-rank templates; every event has one seat instance per unit of
    /// capacity of every kind.
    pub sheet_kinds: Vec<SheetKind>,
}

/// Picks one sheet kind uniformly at random.
///
/// Returns `None` only when no kinds are loaded.
#[must_use]
pub fn random_sheet_kind<'a, R: Rng + ?Sized>(
    kinds: &'a [SheetKind],
    rng: &mut R,
) -> Option<&'a SheetKind> {
    if kinds.is_empty() {
        return None;
    }
    kinds.get(rng.gen_range(0..kinds.len()))
}

/// Looks up a sheet kind by its rank label.
#[must_use]
pub fn sheet_kind_by_rank<'a>(kinds: &'a [SheetKind], rank: &str) -> Option<&'a SheetKind> {
    kinds.iter().find(|kind| kind.rank == rank)
}

/// Picks a uniform random seat number within a rank's capacity.
///
/// Seat numbers are 1-based; the result never collides with the unassigned
/// sentinel. Returns `None` for an unknown rank or zero capacity.
#[must_use]
pub fn random_sheet_num<R: Rng + ?Sized>(
    kinds: &[SheetKind],
    rank: &str,
    rng: &mut R,
) -> Option<SeatNum> {
    let kind = sheet_kind_by_rank(kinds, rank)?;
    if kind.total == 0 {
        return None;
    }
    Some(SeatNum::new(rng.gen_range(1..=kind.total)))
}

/// Filters a catalog snapshot down to publicly visible events.
#[must_use]
pub fn filter_public_events(events: &[Arc<Event>]) -> Vec<Arc<Event>> {
    events
        .iter()
        .filter(|event| event.public)
        .cloned()
        .collect()
}

/// Generates a random lowercase alphabetic string (synthesized event titles).
#[must_use]
pub fn random_alphabet_string<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
    (0..len)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::EventId;
    use chrono::Utc;

    fn kinds() -> Vec<SheetKind> {
        vec![
            SheetKind {
                rank: "S".to_string(),
                total: 10,
                price: 5000,
            },
            SheetKind {
                rank: "A".to_string(),
                total: 20,
                price: 3000,
            },
        ]
    }

    #[test]
    fn random_sheet_kind_stays_in_set() {
        let kinds = kinds();
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let kind = random_sheet_kind(&kinds, &mut rng).unwrap();
            assert!(kinds.contains(kind));
        }
        assert!(random_sheet_kind(&[], &mut rng).is_none());
    }

    #[test]
    fn sheet_kind_lookup() {
        let kinds = kinds();
        assert_eq!(sheet_kind_by_rank(&kinds, "A").unwrap().total, 20);
        assert!(sheet_kind_by_rank(&kinds, "Z").is_none());
    }

    #[test]
    fn random_sheet_num_never_hits_sentinel() {
        let kinds = kinds();
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let num = random_sheet_num(&kinds, "S", &mut rng).unwrap();
            assert!(!num.is_unassigned());
            assert!(num.value() <= 10);
        }
        assert!(random_sheet_num(&kinds, "Z", &mut rng).is_none());
    }

    #[test]
    fn public_event_filter() {
        let make = |id: u64, public: bool| {
            Arc::new(Event {
                id: EventId::new(id),
                title: format!("event{id}"),
                public,
                closed: false,
                price: 1000,
                created_at: Utc::now(),
            })
        };
        let events = vec![make(1, true), make(2, false), make(3, true)];
        let public = filter_public_events(&events);
        assert_eq!(public.len(), 2);
        assert!(public.iter().all(|event| event.public));
    }

    #[test]
    fn alphabet_string_shape() {
        let mut rng = rand::thread_rng();
        let title = random_alphabet_string(&mut rng, 32);
        assert_eq!(title.len(), 32);
        assert!(title.chars().all(|c| c.is_ascii_lowercase()));
    }
}
