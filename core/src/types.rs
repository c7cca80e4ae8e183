//! Domain records for the load-bench state: accounts, events, seat instances
//! and reservations.
//!
//! These are plain data carriers consumed by the pool manager and the ledger.
//! Identifiers are stable value types (the target service assigns them), so
//! they can key caches without relying on reference identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of a simulated account (user or administrator).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(u64);

impl AccountId {
    /// Creates an `AccountId` from its raw value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an event on the target service.
///
/// Zero means "locally created, not yet confirmed by the service" — the
/// service assigns the real id on confirmed creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(u64);

impl EventId {
    /// Sentinel for an event the service has not assigned an id to yet.
    pub const UNASSIGNED: Self = Self(0);

    /// Creates an `EventId` from its raw value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// True if the service has not assigned this id yet.
    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a confirmed reservation on the target service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReservationId(u64);

impl ReservationId {
    /// Creates a `ReservationId` from its raw value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Seat number within a rank.
///
/// Seat numbers are 1-based on the target service; zero is the unassigned
/// sentinel, meaning "this seat instance is not yet bound to a physical
/// seat". The inventory release path routes on this distinction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeatNum(u32);

impl SeatNum {
    /// Sentinel for a seat instance that has never been bound to a seat.
    pub const UNASSIGNED: Self = Self(0);

    /// Creates a `SeatNum` from its raw value
    #[must_use]
    pub const fn new(num: u32) -> Self {
        Self(num)
    }

    /// Returns the raw value
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// True if this is the unassigned sentinel.
    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for SeatNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequence id issued by one of the in-flight operation logs.
///
/// Ids are strictly increasing per log and never reused, even after the
/// entry they key has been deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LogId(u64);

impl LogId {
    /// Creates a `LogId` from its raw value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Accounts
// ============================================================================

/// A simulated end user of the target service.
///
/// Between checkout and release the record is owned exclusively by one
/// worker; the online flag is atomic only because the catalog index and the
/// checker cache keep a shared reference alive alongside the pools.
#[derive(Debug)]
pub struct Account {
    /// Service-assigned account id.
    pub id: AccountId,
    /// Display name.
    pub nickname: String,
    /// Login credential; also the stable cache key for this account.
    pub login_name: String,
    /// Login password.
    pub password: String,
    online: AtomicBool,
}

impl Account {
    /// Creates a new offline `Account`
    #[must_use]
    pub const fn new(id: AccountId, nickname: String, login_name: String, password: String) -> Self {
        Self {
            id,
            nickname,
            login_name,
            password,
            online: AtomicBool::new(false),
        }
    }

    /// Whether the harness currently considers this account logged in.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    /// Record a login/logout observed by the owning worker.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }
}

/// A simulated administrator of the target service.
#[derive(Debug)]
pub struct Administrator {
    /// Service-assigned account id.
    pub id: AccountId,
    /// Display name.
    pub nickname: String,
    /// Login credential; also the stable cache key for this administrator.
    pub login_name: String,
    /// Login password.
    pub password: String,
    online: AtomicBool,
}

impl Administrator {
    /// Creates a new offline `Administrator`
    #[must_use]
    pub const fn new(id: AccountId, nickname: String, login_name: String, password: String) -> Self {
        Self {
            id,
            nickname,
            login_name,
            password,
            online: AtomicBool::new(false),
        }
    }

    /// Whether the harness currently considers this administrator logged in.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    /// Record a login/logout observed by the owning worker.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }
}

// ============================================================================
// Events and seats
// ============================================================================

/// An event on the target service.
///
/// `public` and `closed` are never simultaneously true; the inventory
/// partitions depend on that exclusivity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Service-assigned id, or [`EventId::UNASSIGNED`] for a local draft.
    pub id: EventId,
    /// Event title.
    pub title: String,
    /// Whether the event is visible to ordinary users.
    pub public: bool,
    /// Whether sales are closed.
    pub closed: bool,
    /// Ticket base price.
    pub price: u64,
    /// When the event entered the catalog.
    pub created_at: DateTime<Utc>,
}

/// Static template describing one seat rank: its label, capacity and price.
///
/// Immutable once loaded from the dataset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetKind {
    /// Rank label (e.g. "S", "A").
    pub rank: String,
    /// Number of seats of this rank per event.
    pub total: u32,
    /// Price of this rank.
    pub price: u64,
}

/// One concrete seat instance of one event.
///
/// A seat instance with `num == SeatNum::UNASSIGNED` has never been bound to
/// a physical seat; any other value marks it as reserved to a specific seat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSheet {
    /// The owning event.
    pub event_id: EventId,
    /// Rank label of this seat.
    pub rank: String,
    /// Bound seat number, or the unassigned sentinel.
    pub num: SeatNum,
}

impl EventSheet {
    /// Creates an unbound seat instance for an event.
    #[must_use]
    pub const fn new(event_id: EventId, rank: String) -> Self {
        Self {
            event_id,
            rank,
            num: SeatNum::UNASSIGNED,
        }
    }
}

// ============================================================================
// Reservations
// ============================================================================

/// A reservation confirmed by the target service.
///
/// Canceled reservations are soft-deleted (marked, never removed): the
/// catalog doubles as an append-only audit trail for the consistency checker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Service-assigned reservation id.
    pub id: ReservationId,
    /// Event the seat belongs to.
    pub event_id: EventId,
    /// Account that holds the reservation.
    pub user_id: AccountId,
    /// Rank of the reserved seat.
    pub sheet_rank: String,
    /// Seat number assigned by the service.
    pub sheet_num: SeatNum,
    /// Soft-delete flag; once set it is never cleared.
    pub canceled: bool,
}

impl Reservation {
    /// Creates a live (not canceled) reservation record.
    #[must_use]
    pub const fn new(
        id: ReservationId,
        event_id: EventId,
        user_id: AccountId,
        sheet_rank: String,
        sheet_num: SeatNum,
    ) -> Self {
        Self {
            id,
            event_id,
            user_id,
            sheet_rank,
            sheet_num,
            canceled: false,
        }
    }
}
