//! Concurrency suites for the account pools: exclusive checkout, pool
//! conservation, one-way registration, checker cache stability.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread;
use ticketbench_core::{AccountId, BenchDataSet, State};
use ticketbench_testing::{fixtures, init_test_logging};

fn state_with_users(count: u64) -> Arc<State> {
    let dataset = BenchDataSet {
        users: fixtures::accounts(0..count),
        ..BenchDataSet::default()
    };
    Arc::new(State::new(dataset).unwrap())
}

#[test]
fn concurrent_checkout_never_issues_the_same_account_twice() {
    init_test_logging();
    let state = state_with_users(8);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let state = Arc::clone(&state);
            thread::spawn(move || state.pop_random_user().map(|(user, _)| user.id))
        })
        .collect();

    let mut issued = HashSet::new();
    for handle in handles {
        let id = handle.join().unwrap().unwrap();
        assert!(issued.insert(id), "account {id} issued twice");
    }
    assert_eq!(issued.len(), 8);
    assert!(state.pop_random_user().is_none());
}

#[test]
fn contended_checkout_release_cycles_keep_exclusivity() {
    init_test_logging();
    let state = state_with_users(4);
    let outstanding: Arc<Mutex<HashSet<AccountId>>> = Arc::new(Mutex::new(HashSet::new()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let state = Arc::clone(&state);
            let outstanding = Arc::clone(&outstanding);
            thread::spawn(move || {
                for _ in 0..500 {
                    let Some((user, _checker)) = state.pop_random_user() else {
                        continue;
                    };
                    {
                        let mut held = outstanding.lock().unwrap();
                        assert!(
                            held.insert(user.id),
                            "account {} held by two workers at once",
                            user.id
                        );
                    }
                    // The worker would perform its HTTP calls here, with no
                    // core lock held.
                    {
                        let mut held = outstanding.lock().unwrap();
                        held.remove(&user.id);
                    }
                    state.push_user(user);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Every checkout was matched by a release, so the pool is whole again.
    let mut remaining = Vec::new();
    while let Some((user, _)) = state.pop_random_user() {
        remaining.push(user.id.value());
    }
    remaining.sort_unstable();
    assert_eq!(remaining, vec![0, 1, 2, 3]);
}

#[test]
fn two_workers_on_a_three_account_pool_conserve_membership() {
    init_test_logging();
    let state = state_with_users(3);

    let first = {
        let state = Arc::clone(&state);
        thread::spawn(move || {
            let (user, _) = state.pop_random_user().unwrap();
            let id = user.id;
            state.push_user(user);
            id
        })
    };
    let second = {
        let state = Arc::clone(&state);
        thread::spawn(move || {
            let (user, _) = state.pop_random_user().unwrap();
            let id = user.id;
            state.push_user(user);
            id
        })
    };
    first.join().unwrap();
    second.join().unwrap();

    let mut members = Vec::new();
    while let Some((user, _)) = state.pop_random_user() {
        members.push(user.id.value());
    }
    members.sort_unstable();
    assert_eq!(members, vec![0, 1, 2]);
}

#[test]
fn concurrent_new_user_checkout_is_exclusive_and_one_way() {
    init_test_logging();
    let dataset = BenchDataSet {
        new_users: fixtures::accounts(0..6),
        ..BenchDataSet::default()
    };
    let state = Arc::new(State::new(dataset).unwrap());

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let state = Arc::clone(&state);
            thread::spawn(move || {
                let (user, _checker) = state.pop_new_user().unwrap();
                let id = user.id;
                // Registration confirmed: promote to the general pool.
                state.push_registered_user(user);
                id
            })
        })
        .collect();

    let mut registered = HashSet::new();
    for handle in handles {
        assert!(registered.insert(handle.join().unwrap()));
    }
    assert_eq!(registered.len(), 6);

    // The new-user pool never refills; all six now circulate as regulars.
    assert!(state.pop_new_user().is_none());
    let mut general = 0;
    while state.pop_random_user().is_some() {
        general += 1;
    }
    assert_eq!(general, 6);
}

#[test]
fn checker_handle_is_stable_across_checkout_cycles_and_threads() {
    init_test_logging();
    let state = state_with_users(1);
    let observed: Arc<Mutex<HashSet<usize>>> = Arc::new(Mutex::new(HashSet::new()));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let state = Arc::clone(&state);
            let observed = Arc::clone(&observed);
            thread::spawn(move || {
                for _ in 0..200 {
                    if let Some((user, checker)) = state.pop_random_user() {
                        observed
                            .lock()
                            .unwrap()
                            .insert(Arc::as_ptr(&checker) as usize);
                        state.push_user(user);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // One account, one cached handle, no matter who checked it out.
    assert_eq!(observed.lock().unwrap().len(), 1);
}

#[test]
fn administrators_pool_is_independent_of_users() {
    init_test_logging();
    let state = Arc::new(State::new(fixtures::dataset()).unwrap());

    let (admin, admin_checker) = state.pop_random_administrator().unwrap();
    let (user, user_checker) = state.pop_random_user().unwrap();

    assert!(
        admin_checker
            .debug_headers()
            .contains_key(ticketbench_core::checker::ADMIN_LOGIN_HEADER)
    );
    assert!(
        user_checker
            .debug_headers()
            .contains_key(ticketbench_core::checker::USER_LOGIN_HEADER)
    );

    state.push_administrator(admin);
    state.push_user(user);
}

#[test]
fn empty_pools_return_none_rather_than_erroring() {
    init_test_logging();
    let state = State::new(BenchDataSet::default()).unwrap();
    assert!(state.pop_random_user().is_none());
    assert!(state.pop_new_user().is_none());
    assert!(state.pop_random_administrator().is_none());
    assert!(state.pop_event_sheet().is_none());
}
