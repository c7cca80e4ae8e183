//! # Ticketbench Testing
//!
//! Testing utilities for the ticketbench state core:
//!
//! - Mock implementations of the environment traits
//! - Dataset fixtures for building a fresh [`State`](ticketbench_core::State)
//!   per test case
//! - A tracing initializer for test binaries
//!
//! The concurrency and integration suites for the state core live in this
//! crate's `tests/` directory.
//!
//! ## Example
//!
//! ```
//! use ticketbench_core::State;
//! use ticketbench_testing::fixtures;
//!
//! let state = State::new(fixtures::dataset()).unwrap();
//! let (user, checker) = state.pop_random_user().unwrap();
//! state.push_user(user);
//! # drop(checker);
//! ```

use chrono::{DateTime, Utc};
use ticketbench_core::environment::Clock;

/// Mock implementations of the environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making `created_at` stamps reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use ticketbench_testing::mocks::FixedClock;
    /// use ticketbench_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Dataset fixtures for building a fresh state per test case.
pub mod fixtures {
    use chrono::Utc;
    use ticketbench_core::types::{
        Account, AccountId, Administrator, Event, EventId, Reservation, ReservationId, SeatNum,
        SheetKind,
    };
    use ticketbench_core::BenchDataSet;

    /// A pre-registered account with predictable credentials.
    #[must_use]
    pub fn account(id: u64) -> Account {
        Account::new(
            AccountId::new(id),
            format!("nick{id}"),
            format!("user{id}"),
            format!("pass{id}"),
        )
    }

    /// A pre-registered administrator with predictable credentials.
    #[must_use]
    pub fn administrator(id: u64) -> Administrator {
        Administrator::new(
            AccountId::new(id),
            format!("adminnick{id}"),
            format!("admin{id}"),
            format!("adminpass{id}"),
        )
    }

    /// A catalog event with the given visibility flags.
    #[must_use]
    pub fn event(id: u64, public: bool, closed: bool) -> Event {
        Event {
            id: EventId::new(id),
            title: format!("event{id}"),
            public,
            closed,
            price: 3000,
            created_at: Utc::now(),
        }
    }

    /// A single seat-rank template.
    #[must_use]
    pub fn sheet_kind(rank: &str, total: u32, price: u64) -> SheetKind {
        SheetKind {
            rank: rank.to_string(),
            total,
            price,
        }
    }

    /// The default rank templates: S:1, A:2, B:4 (7 seats per event).
    #[must_use]
    pub fn sheet_kinds() -> Vec<SheetKind> {
        vec![
            sheet_kind("S", 1, 5000),
            sheet_kind("A", 2, 3000),
            sheet_kind("B", 4, 1000),
        ]
    }

    /// A live reservation for rank "A", seat 1.
    #[must_use]
    pub fn reservation(id: u64, event_id: u64, user_id: u64) -> Reservation {
        Reservation::new(
            ReservationId::new(id),
            EventId::new(event_id),
            AccountId::new(user_id),
            "A".to_string(),
            SeatNum::new(1),
        )
    }

    /// A vector of sequentially numbered accounts.
    #[must_use]
    pub fn accounts(range: std::ops::Range<u64>) -> Vec<Account> {
        range.map(account).collect()
    }

    /// A small complete dataset: 5 registered users, 3 unregistered users,
    /// 2 administrators, 1 public event, the default rank templates.
    #[must_use]
    pub fn dataset() -> BenchDataSet {
        BenchDataSet {
            users: accounts(0..5),
            new_users: accounts(100..103),
            administrators: vec![administrator(1), administrator(2)],
            events: vec![event(1, true, false)],
            sheet_kinds: sheet_kinds(),
        }
    }
}

/// Initializes a tracing subscriber for test binaries.
///
/// Respects `RUST_LOG`; safe to call from every test, repeated calls are
/// ignored.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock};
