//! # Ticketbench Core
//!
//! Shared in-memory state for a load-testing harness that drives many
//! concurrent virtual users against a ticket-reservation service.
//!
//! The harness spawns an unbounded number of worker threads. Every worker
//! needs to know which simulated accounts, events and seats are currently
//! checked out by an in-flight request versus available for the next worker,
//! and every mutating call against the target service must leave enough
//! evidence behind that an ambiguous outcome (timeout, partial failure) can
//! later be reconciled against the service's authoritative state.
//!
//! ## Core Components
//!
//! - [`State`](state::State): exclusive checkout/release pools for accounts,
//!   administrators and seat instances, the per-account [`Checker`](checker::Checker)
//!   cache, and the partitioned seat inventory
//! - [`ReservationLedger`](ledger::ReservationLedger): the reservation catalog
//!   plus the reserve/cancel write-ahead logs that record in-flight mutations
//! - [`AdmissionToken`](admission::AdmissionToken): a non-blocking single-holder
//!   gate that keeps new-event creation down to one worker at a time
//!
//! ## Locking Discipline
//!
//! Four independent mutexes, each scoped to a narrow responsibility: one over
//! pools, catalogs and seat partitions (their mutations are logically one
//! transaction), one over the reservation catalog, and one per in-flight log.
//! No operation holds more than one of them at a time, and none is ever held
//! across a network call — the core returns immediately with the checked-out
//! resource and the caller performs all I/O.
//!
//! Absence of a resource is a normal outcome, returned as `None`, never as an
//! error. Retry and backoff policy belongs entirely to the caller.
//!
//! ## Example
//!
//! ```ignore
//! use ticketbench_core::{BenchDataSet, State};
//!
//! let state = State::new(dataset)?;
//!
//! // Worker cycle: check out, do I/O, release.
//! if let Some((user, checker)) = state.pop_random_user() {
//!     if let Some(sheet) = state.pop_event_sheet() {
//!         let reservation = reserve_via_api(&checker, &user, &sheet)?;
//!         state.ledger().record(reservation);
//!         state.push_event_sheet(sheet);
//!     }
//!     state.push_user(user);
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};

pub mod admission;
pub mod checker;
pub mod config;
pub mod dataset;
pub mod ledger;
pub mod state;
pub mod types;

pub use admission::{AdmissionGuard, AdmissionToken};
pub use checker::Checker;
pub use config::StateConfig;
pub use dataset::BenchDataSet;
pub use error::StateError;
pub use ledger::ReservationLedger;
pub use state::{SheetCounts, State};
pub use types::{
    Account, AccountId, Administrator, Event, EventId, EventSheet, LogId, Reservation,
    ReservationId, SeatNum, SheetKind,
};

/// Error types for the state core.
pub mod error {
    use crate::types::{EventId, ReservationId};
    use thiserror::Error;

    /// Errors that can occur during state operations.
    ///
    /// Empty pools and contended admission are *not* errors — they are normal
    /// outcomes returned as `None`. Everything here is a logic-precondition
    /// violation: the caller operated on an entity the core never handed out.
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StateError {
        /// A cancel was marked against a reservation id that was never recorded.
        ///
        /// Attempting to cancel something never recorded as reserved is a bug
        /// in the calling scenario, not a recoverable condition.
        #[error("unknown reservation: {0}")]
        UnknownReservation(ReservationId),

        /// An update referenced an event id that is not in the catalog.
        #[error("unknown event: {0}")]
        UnknownEvent(EventId),

        /// An event was submitted with both the public and the closed flag set.
        ///
        /// The inventory partitions rely on public and closed being mutually
        /// exclusive; such an event cannot be placed anywhere.
        #[error("event {id} cannot be both public and closed")]
        PublicAndClosed {
            /// The offending event id.
            id: EventId,
        },
    }
}

/// Environment traits injected into the state core.
///
/// External dependencies are abstracted behind traits so tests can substitute
/// deterministic implementations (see `ticketbench-testing`).
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// The state core stamps `created_at` on events as they are confirmed;
    /// injecting the clock keeps that stamp deterministic in tests.
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
