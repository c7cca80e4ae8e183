//! Configuration for synthesized load data.
//!
//! Loaded from environment variables with defaults matching the original
//! benchmark parameters; every field falls back individually so a partial
//! environment is fine.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Tunables for events synthesized when the public seat inventory empties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateConfig {
    /// Length of randomly generated event titles.
    pub event_title_len: usize,
    /// Minimum price of a synthesized event.
    pub event_base_price: u64,
    /// Number of price steps above the base price.
    pub event_price_steps: u64,
    /// Size of one price step.
    pub event_price_step: u64,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            event_title_len: 32,
            event_base_price: 1000,
            event_price_steps: 10,
            event_price_step: 1000,
        }
    }
}

impl StateConfig {
    /// Loads the configuration from `TICKETBENCH_*` environment variables,
    /// falling back to defaults for unset or unparseable values.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            event_title_len: env_or("TICKETBENCH_EVENT_TITLE_LEN", defaults.event_title_len),
            event_base_price: env_or("TICKETBENCH_EVENT_BASE_PRICE", defaults.event_base_price),
            event_price_steps: env_or("TICKETBENCH_EVENT_PRICE_STEPS", defaults.event_price_steps),
            event_price_step: env_or("TICKETBENCH_EVENT_PRICE_STEP", defaults.event_price_step),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
