//! The shared state handle workers check resources out of.
//!
//! [`State`] owns four checkout pools (general accounts, not-yet-registered
//! accounts, administrators, and the per-visibility seat partitions), the
//! per-account checker cache, the event catalog, the reservation ledger and
//! the new-event admission token.
//!
//! Pool, cache, catalog and partition mutations share a single mutex because
//! they are logically one transaction (publishing an event inserts into the
//! catalog and the seat partitions atomically). Every critical section is a
//! handful of O(1) vector and map operations — or one bounded batch insert on
//! event publication — so contention stays bounded regardless of pool size.
//! The ledger and its logs have their own locks; see [`crate::ledger`].
//!
//! # Checkout Contract
//!
//! `pop_*` transfers exclusive ownership of the entity to the caller; the
//! matching `push_*` is the only way it returns to circulation, and the
//! caller is contractually obligated to call it exactly once per successful
//! checkout (after its I/O completes and is verified). A forgotten release
//! permanently shrinks the pool — that is deliberate back-pressure, not a
//! leak the core tries to repair. Callers must not retain the entity after
//! releasing it.

use crate::admission::{AdmissionGuard, AdmissionToken};
use crate::checker::Checker;
use crate::config::StateConfig;
use crate::dataset::{BenchDataSet, random_alphabet_string};
use crate::environment::{Clock, SystemClock};
use crate::error::StateError;
use crate::ledger::ReservationLedger;
use crate::types::{Account, Administrator, Event, EventId, EventSheet, SheetKind};
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Removes one element chosen uniformly at random, swapping the last element
/// into its slot. O(1); pool order is not preserved.
fn pop_random<T, R: Rng + ?Sized>(pool: &mut Vec<T>, rng: &mut R) -> Option<T> {
    if pool.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..pool.len());
    Some(pool.swap_remove(index))
}

/// Everything guarded by the pool mutex.
#[derive(Debug, Default)]
struct Pools {
    users: Vec<Arc<Account>>,
    new_users: Vec<Arc<Account>>,
    user_index: HashMap<String, Arc<Account>>,
    user_checkers: HashMap<String, Arc<Checker>>,

    administrators: Vec<Arc<Administrator>>,
    admin_index: HashMap<String, Arc<Administrator>>,
    admin_checkers: HashMap<String, Arc<Checker>>,

    events: Vec<Arc<Event>>,

    // public && closed does not happen; every sheet lives in exactly one of
    // these four partitions at any instant.
    public_sheets: Vec<EventSheet>,
    private_sheets: Vec<EventSheet>,
    closed_sheets: Vec<EventSheet>,
    reserved_sheets: Vec<EventSheet>,
}

impl Pools {
    fn register_user(&mut self, user: Arc<Account>) {
        tracing::debug!(
            user_id = user.id.value(),
            login_name = %user.login_name,
            nickname = %user.nickname,
            "user registered"
        );
        self.user_index
            .insert(user.login_name.clone(), Arc::clone(&user));
        self.users.push(user);
    }

    fn register_administrator(&mut self, admin: Arc<Administrator>) {
        self.admin_index
            .insert(admin.login_name.clone(), Arc::clone(&admin));
        self.administrators.push(admin);
    }

    fn user_checker(&mut self, user: &Account) -> Arc<Checker> {
        Arc::clone(
            self.user_checkers
                .entry(user.login_name.clone())
                .or_insert_with(|| Arc::new(Checker::for_user(&user.login_name))),
        )
    }

    fn admin_checker(&mut self, admin: &Administrator) -> Arc<Checker> {
        Arc::clone(
            self.admin_checkers
                .entry(admin.login_name.clone())
                .or_insert_with(|| Arc::new(Checker::for_administrator(&admin.login_name))),
        )
    }

    fn partition_mut(&mut self, public: bool, closed: bool) -> &mut Vec<EventSheet> {
        if closed {
            &mut self.closed_sheets
        } else if public {
            &mut self.public_sheets
        } else {
            &mut self.private_sheets
        }
    }

    /// Pulls every sheet of one event out of the three non-reserved
    /// partitions, preserving order. Reserved sheets stay where they are.
    fn extract_unreserved_sheets(&mut self, event_id: EventId) -> Vec<EventSheet> {
        let mut extracted = Vec::new();
        for pool in [
            &mut self.public_sheets,
            &mut self.private_sheets,
            &mut self.closed_sheets,
        ] {
            let (matching, rest): (Vec<_>, Vec<_>) = std::mem::take(pool)
                .into_iter()
                .partition(|sheet| sheet.event_id == event_id);
            *pool = rest;
            extracted.extend(matching);
        }
        extracted
    }
}

/// Per-partition seat instance counts, for progress reporting and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SheetCounts {
    /// Seats available to ordinary reservation traffic.
    pub public: usize,
    /// Seats of private (not yet public) events.
    pub private: usize,
    /// Seats of closed events.
    pub closed: usize,
    /// Seats released with a bound seat number.
    pub reserved: usize,
}

/// Shared state of the load harness.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct State {
    pools: Mutex<Pools>,
    ledger: ReservationLedger,
    new_event_token: AdmissionToken,
    sheet_kinds: Vec<SheetKind>,
    config: StateConfig,
    clock: Arc<dyn Clock>,
}

impl State {
    /// Builds the state from the initial dataset with the system clock and
    /// default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::PublicAndClosed`] when a dataset event carries
    /// both flags.
    pub fn new(dataset: BenchDataSet) -> Result<Self, StateError> {
        Self::with_environment(dataset, StateConfig::default(), Arc::new(SystemClock))
    }

    /// Builds the state with an explicit configuration and clock.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::PublicAndClosed`] when a dataset event carries
    /// both flags.
    pub fn with_environment(
        dataset: BenchDataSet,
        config: StateConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StateError> {
        let BenchDataSet {
            users,
            new_users,
            administrators,
            events,
            sheet_kinds,
        } = dataset;

        let state = Self {
            pools: Mutex::new(Pools::default()),
            ledger: ReservationLedger::new(),
            new_event_token: AdmissionToken::new(),
            sheet_kinds,
            config,
            clock,
        };

        {
            let mut pools = state.lock_pools();
            for user in users {
                pools.register_user(Arc::new(user));
            }
            pools.new_users = new_users.into_iter().map(Arc::new).collect();
            for admin in administrators {
                pools.register_administrator(Arc::new(admin));
            }
            for event in events {
                if event.public && event.closed {
                    return Err(StateError::PublicAndClosed { id: event.id });
                }
                state.publish_event_locked(&mut pools, event);
            }
        }

        Ok(state)
    }

    // Critical sections never leave partial updates, so a guard recovered
    // from a poisoned mutex still holds consistent data.
    fn lock_pools(&self) -> MutexGuard<'_, Pools> {
        self.pools.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The reservation catalog and in-flight logs.
    #[must_use]
    pub const fn ledger(&self) -> &ReservationLedger {
        &self.ledger
    }

    /// The seat-rank templates the state was seeded with.
    #[must_use]
    pub fn sheet_kinds(&self) -> &[SheetKind] {
        &self.sheet_kinds
    }

    /// The synthesized-event configuration.
    #[must_use]
    pub const fn config(&self) -> &StateConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Account pools
    // ------------------------------------------------------------------

    /// Checks out one registered user chosen uniformly at random, together
    /// with its cached checker.
    ///
    /// Returns `None` when every user is currently checked out — a normal
    /// outcome, not an error. Release with [`push_user`](Self::push_user)
    /// exactly once.
    #[must_use]
    pub fn pop_random_user(&self) -> Option<(Arc<Account>, Arc<Checker>)> {
        let mut pools = self.lock_pools();
        let mut rng = rand::thread_rng();
        let Some(user) = pop_random(&mut pools.users, &mut rng) else {
            tracing::debug!("user pool empty");
            return None;
        };
        let checker = pools.user_checker(&user);
        Some((user, checker))
    }

    /// Returns a previously checked-out user to the general pool.
    pub fn push_user(&self, user: Arc<Account>) {
        self.lock_pools().users.push(user);
    }

    /// Checks out the newest not-yet-registered account, with its checker.
    ///
    /// The release path is one-way: after the sign-up call is verified, call
    /// [`push_registered_user`](Self::push_registered_user), which promotes
    /// the account into the general pool. Nothing ever returns to the
    /// new-user pool; if registration fails the account simply drops out of
    /// circulation.
    #[must_use]
    pub fn pop_new_user(&self) -> Option<(Arc<Account>, Arc<Checker>)> {
        let mut pools = self.lock_pools();
        let user = pools.new_users.pop()?;
        let checker = pools.user_checker(&user);
        Some((user, checker))
    }

    /// Promotes a user whose registration the service confirmed into the
    /// general pool and the login index.
    pub fn push_registered_user(&self, user: Arc<Account>) {
        self.lock_pools().register_user(user);
    }

    /// The cached checker for a user, created on first request.
    #[must_use]
    pub fn checker_for_user(&self, user: &Account) -> Arc<Checker> {
        self.lock_pools().user_checker(user)
    }

    /// Checks out one administrator chosen uniformly at random, with its
    /// cached checker. Release with
    /// [`push_administrator`](Self::push_administrator) exactly once.
    #[must_use]
    pub fn pop_random_administrator(&self) -> Option<(Arc<Administrator>, Arc<Checker>)> {
        let mut pools = self.lock_pools();
        let mut rng = rand::thread_rng();
        let Some(admin) = pop_random(&mut pools.administrators, &mut rng) else {
            tracing::debug!("administrator pool empty");
            return None;
        };
        let checker = pools.admin_checker(&admin);
        Some((admin, checker))
    }

    /// Returns a previously checked-out administrator to the pool.
    pub fn push_administrator(&self, admin: Arc<Administrator>) {
        self.lock_pools().administrators.push(admin);
    }

    /// Adds an administrator whose registration the service confirmed to the
    /// pool and the login index.
    pub fn push_registered_administrator(&self, admin: Arc<Administrator>) {
        self.lock_pools().register_administrator(admin);
    }

    /// The cached checker for an administrator, created on first request.
    #[must_use]
    pub fn checker_for_administrator(&self, admin: &Administrator) -> Arc<Checker> {
        self.lock_pools().admin_checker(admin)
    }

    // ------------------------------------------------------------------
    // Event catalog
    // ------------------------------------------------------------------

    /// Snapshot of the event catalog.
    #[must_use]
    pub fn events(&self) -> Vec<Arc<Event>> {
        self.lock_pools().events.clone()
    }

    /// Looks up a catalog event by id.
    #[must_use]
    pub fn find_event(&self, id: EventId) -> Option<Arc<Event>> {
        self.lock_pools()
            .events
            .iter()
            .find(|event| event.id == id)
            .cloned()
    }

    /// Synthesizes a draft for a new public event.
    ///
    /// The draft has [`EventId::UNASSIGNED`]; the caller owns it until the
    /// service confirms creation and assigns the real id, then hands it to
    /// [`publish_event`](Self::publish_event). Event creation should be
    /// gated by [`new_event_admission`](Self::new_event_admission).
    #[must_use]
    pub fn draft_event(&self) -> Event {
        let mut rng = rand::thread_rng();
        let steps = self.config.event_price_steps.max(1);
        Event {
            id: EventId::UNASSIGNED,
            title: random_alphabet_string(&mut rng, self.config.event_title_len),
            public: true,
            closed: false,
            price: self.config.event_base_price + rng.gen_range(0..steps) * self.config.event_price_step,
            created_at: self.clock.now(),
        }
    }

    /// Attempts to become the single worker allowed to create a new event.
    ///
    /// `None` means another worker is already creating one; treat it exactly
    /// like an empty pool and move on. The admission is released when the
    /// guard drops, whether creation succeeded or not.
    #[must_use]
    pub fn new_event_admission(&self) -> Option<AdmissionGuard<'_>> {
        self.new_event_token.try_acquire()
    }

    /// Adds a confirmed event to the catalog and generates its seat
    /// inventory into the partition matching its flags.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::PublicAndClosed`] when both flags are set; such
    /// an event cannot be placed in any partition.
    pub fn publish_event(&self, event: Event) -> Result<(), StateError> {
        if event.public && event.closed {
            return Err(StateError::PublicAndClosed { id: event.id });
        }
        let mut pools = self.lock_pools();
        self.publish_event_locked(&mut pools, event);
        Ok(())
    }

    fn publish_event_locked(&self, pools: &mut Pools, mut event: Event) {
        event.created_at = self.clock.now();
        tracing::debug!(
            event_id = event.id.value(),
            title = %event.title,
            price = event.price,
            public = event.public,
            closed = event.closed,
            "event published"
        );

        let sheets: Vec<EventSheet> = self
            .sheet_kinds
            .iter()
            .flat_map(|kind| {
                (0..kind.total).map(|_| EventSheet::new(event.id, kind.rank.clone()))
            })
            .collect();

        let (public, closed) = (event.public, event.closed);
        pools.events.push(Arc::new(event));
        // New sheets go to the front; checkout pops from the back, so seats
        // of older events drain first.
        let partition = pools.partition_mut(public, closed);
        let mut batch = sheets;
        batch.append(partition);
        *partition = batch;
    }

    /// Applies changed visibility flags to a catalog event and moves its
    /// remaining seat inventory to the matching partition.
    ///
    /// Seats already in the reserved partition stay there; `created_at` is
    /// preserved from the catalog entry.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::PublicAndClosed`] when both flags are set, or
    /// [`StateError::UnknownEvent`] when the id is not in the catalog —
    /// updating an event the core never saw is a logic bug upstream.
    pub fn update_event(&self, event: Event) -> Result<(), StateError> {
        if event.public && event.closed {
            return Err(StateError::PublicAndClosed { id: event.id });
        }
        let mut pools = self.lock_pools();

        let mut updated = event;
        {
            let slot = pools
                .events
                .iter_mut()
                .find(|existing| existing.id == updated.id)
                .ok_or(StateError::UnknownEvent(updated.id))?;
            updated.created_at = slot.created_at;
            *slot = Arc::new(updated.clone());
        }

        tracing::debug!(
            event_id = updated.id.value(),
            public = updated.public,
            closed = updated.closed,
            "event re-partitioned"
        );
        let mut batch = pools.extract_unreserved_sheets(updated.id);
        let partition = pools.partition_mut(updated.public, updated.closed);
        batch.append(partition);
        *partition = batch;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Seat inventory
    // ------------------------------------------------------------------

    /// Checks out one publicly reservable seat instance.
    ///
    /// Private and closed seats are never offered here. `None` means the
    /// public inventory is exhausted and the caller should create a new
    /// public event. Release with
    /// [`push_event_sheet`](Self::push_event_sheet) exactly once.
    #[must_use]
    pub fn pop_event_sheet(&self) -> Option<EventSheet> {
        let mut pools = self.lock_pools();
        let sheet = pools.public_sheets.pop();
        if sheet.is_none() {
            tracing::debug!("public seat inventory empty, a new event is needed");
        }
        sheet
    }

    /// Returns a seat instance, routing on its seat number: still unassigned
    /// goes back to the public pool, anything else goes to the reserved
    /// partition and is never offered to reservation traffic again.
    pub fn push_event_sheet(&self, sheet: EventSheet) {
        let mut pools = self.lock_pools();
        if sheet.num.is_unassigned() {
            pools.public_sheets.push(sheet);
        } else {
            pools.reserved_sheets.push(sheet);
        }
    }

    /// Current seat instance counts per partition.
    #[must_use]
    pub fn sheet_counts(&self) -> SheetCounts {
        let pools = self.lock_pools();
        SheetCounts {
            public: pools.public_sheets.len(),
            private: pools.private_sheets.len(),
            closed: pools.closed_sheets.len(),
            reserved: pools.reserved_sheets.len(),
        }
    }
}
