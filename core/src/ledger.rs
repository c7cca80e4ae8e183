//! Reservation catalog and the reserve/cancel in-flight logs.
//!
//! The two logs work like a transactional journal for the reserve and cancel
//! API calls: a worker appends a snapshot immediately before issuing the
//! mutating request and deletes it only after the response has been received
//! and positively verified. If the request times out, errors, or fails
//! verification, the worker must *not* delete the entry — its continued
//! presence is, by construction, the evidence that an operation of unknown
//! outcome was attempted. The consistency checker reads the surviving
//! entries after the run and reconciles them against the service's
//! authoritative state.
//!
//! The catalog and each log sit behind their own mutex, independent of the
//! pool lock: reserve/cancel traffic is the hot path and must not contend
//! with pool churn. No operation here touches more than one lock, and no
//! lock is held across any I/O.

use crate::error::StateError;
use crate::types::{LogId, Reservation, ReservationId};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One in-flight operation log: a strictly increasing sequence plus the
/// snapshots still awaiting confirmation.
#[derive(Debug, Default)]
struct OpLog {
    last_id: u64,
    entries: HashMap<LogId, Reservation>,
}

impl OpLog {
    /// Sequence ids are never reused, even after their entry is deleted.
    fn append(&mut self, reservation: &Reservation) -> LogId {
        self.last_id += 1;
        let id = LogId::new(self.last_id);
        self.entries.insert(id, reservation.clone());
        id
    }

    fn remove(&mut self, id: LogId) {
        self.entries.remove(&id);
    }

    fn snapshot(&self) -> Vec<(LogId, Reservation)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(id, reservation)| (*id, reservation.clone()))
            .collect();
        entries.sort_by_key(|(id, _)| *id);
        entries
    }
}

/// Reservation catalog plus the reserve/cancel idempotency logs.
///
/// # Usage Discipline
///
/// - [`begin_reserve`](Self::begin_reserve) immediately before the reserve
///   API call; [`end_reserve`](Self::end_reserve) only after the success
///   response has been verified. Symmetric for cancel.
/// - [`record`](Self::record) after a verified reserve;
///   [`mark_canceled`](Self::mark_canceled) after a verified cancel.
/// - Never call `end_*` for a request whose outcome is unknown.
#[derive(Debug, Default)]
pub struct ReservationLedger {
    reservations: Mutex<HashMap<ReservationId, Reservation>>,
    reserve_log: Mutex<OpLog>,
    cancel_log: Mutex<OpLog>,
}

impl ReservationLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Every critical section below is a single map operation, so a guard
    // recovered from a poisoned mutex still holds consistent data.
    fn lock_reservations(&self) -> MutexGuard<'_, HashMap<ReservationId, Reservation>> {
        self.reservations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_reserve_log(&self) -> MutexGuard<'_, OpLog> {
        self.reserve_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_cancel_log(&self) -> MutexGuard<'_, OpLog> {
        self.cancel_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a reservation confirmed by the service.
    ///
    /// Re-recording an id that was already soft-deleted keeps the canceled
    /// flag set; the flag is monotonic.
    pub fn record(&self, mut reservation: Reservation) {
        let mut reservations = self.lock_reservations();
        if reservations
            .get(&reservation.id)
            .is_some_and(|existing| existing.canceled)
        {
            reservation.canceled = true;
        }
        reservations.insert(reservation.id, reservation);
    }

    /// Soft-deletes a reservation after a verified cancel.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::UnknownReservation`] when the id was never
    /// recorded — cancelling something never reserved is a logic bug in the
    /// calling scenario and must abort that worker's current action.
    pub fn mark_canceled(&self, id: ReservationId) -> Result<(), StateError> {
        let mut reservations = self.lock_reservations();
        let reservation = reservations
            .get_mut(&id)
            .ok_or(StateError::UnknownReservation(id))?;
        reservation.canceled = true;
        Ok(())
    }

    /// Looks up a reservation snapshot by id.
    #[must_use]
    pub fn reservation(&self, id: ReservationId) -> Option<Reservation> {
        self.lock_reservations().get(&id).cloned()
    }

    /// Snapshot of the whole reservation catalog, canceled entries included.
    #[must_use]
    pub fn reservations(&self) -> Vec<Reservation> {
        self.lock_reservations().values().cloned().collect()
    }

    /// Logs a reserve attempt; call immediately before the reserve API call.
    pub fn begin_reserve(&self, reservation: &Reservation) -> LogId {
        let id = self.lock_reserve_log().append(reservation);
        tracing::debug!(
            log_id = id.value(),
            event_id = reservation.event_id.value(),
            user_id = reservation.user_id.value(),
            sheet_rank = %reservation.sheet_rank,
            "appended reserve log"
        );
        id
    }

    /// Confirms a reserve attempt; call only after the success response has
    /// been verified. The entry is deleted and the attempt leaves no trace
    /// for reconciliation.
    pub fn end_reserve(&self, id: LogId, reservation: &Reservation) {
        self.lock_reserve_log().remove(id);
        tracing::debug!(
            log_id = id.value(),
            event_id = reservation.event_id.value(),
            user_id = reservation.user_id.value(),
            sheet_rank = %reservation.sheet_rank,
            sheet_num = reservation.sheet_num.value(),
            reservation_id = reservation.id.value(),
            "deleted reserve log (reserved)"
        );
    }

    /// Logs a cancel attempt; call immediately before the cancel API call.
    pub fn begin_cancel(&self, reservation: &Reservation) -> LogId {
        let id = self.lock_cancel_log().append(reservation);
        tracing::debug!(
            log_id = id.value(),
            event_id = reservation.event_id.value(),
            user_id = reservation.user_id.value(),
            sheet_rank = %reservation.sheet_rank,
            sheet_num = reservation.sheet_num.value(),
            reservation_id = reservation.id.value(),
            "appended cancel log"
        );
        id
    }

    /// Confirms a cancel attempt; call only after the success response has
    /// been verified.
    pub fn end_cancel(&self, id: LogId, reservation: &Reservation) {
        self.lock_cancel_log().remove(id);
        tracing::debug!(
            log_id = id.value(),
            event_id = reservation.event_id.value(),
            user_id = reservation.user_id.value(),
            sheet_rank = %reservation.sheet_rank,
            sheet_num = reservation.sheet_num.value(),
            reservation_id = reservation.id.value(),
            "deleted cancel log (canceled)"
        );
    }

    /// Reserve attempts still awaiting confirmation, oldest first.
    ///
    /// A non-empty result after a worker observed a failure is the signal
    /// that reconciliation is needed.
    #[must_use]
    pub fn pending_reserves(&self) -> Vec<(LogId, Reservation)> {
        self.lock_reserve_log().snapshot()
    }

    /// Cancel attempts still awaiting confirmation, oldest first.
    #[must_use]
    pub fn pending_cancels(&self) -> Vec<(LogId, Reservation)> {
        self.lock_cancel_log().snapshot()
    }
}
