//! Ledger configuration loaded from the environment.

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::warn;

use pricetide_core::Money;
use pricetide_pricing::PricingPolicy;

pub const ACTIVITY_WINDOW_SECS: &str = "PRICETIDE_ACTIVITY_WINDOW_SECS";
pub const CORRECTION_INTERVAL_SECS: &str = "PRICETIDE_CORRECTION_INTERVAL_SECS";
pub const MAX_COMMIT_ATTEMPTS: &str = "PRICETIDE_MAX_COMMIT_ATTEMPTS";
pub const DEFAULT_INCREASE_STEP: &str = "PRICETIDE_DEFAULT_INCREASE_STEP";
pub const DEFAULT_DECREASE_STEP: &str = "PRICETIDE_DEFAULT_DECREASE_STEP";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// How far back a sale counts as "recent" for the price correction pass.
    pub activity_window: Duration,
    /// Cadence of the background correction runner.
    pub correction_interval: Duration,
    /// Optimistic commit attempts before giving up with a contention error.
    pub max_commit_attempts: u32,
    /// Steps used for organizations that do not override them.
    pub default_policy: PricingPolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            activity_window: Duration::from_secs(60),
            correction_interval: Duration::from_secs(60),
            max_commit_attempts: 5,
            default_policy: PricingPolicy::new(half(), half()),
        }
    }
}

fn half() -> Money {
    Money::new(Decimal::new(5, 1))
}

impl LedgerConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys keep their default;
    /// malformed values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let activity_window = parse_or(
            &lookup,
            ACTIVITY_WINDOW_SECS,
            defaults.activity_window.as_secs(),
            |v| *v > 0,
        );
        let correction_interval = parse_or(
            &lookup,
            CORRECTION_INTERVAL_SECS,
            defaults.correction_interval.as_secs(),
            |v| *v > 0,
        );
        let max_commit_attempts = parse_or(
            &lookup,
            MAX_COMMIT_ATTEMPTS,
            defaults.max_commit_attempts,
            |v| *v > 0,
        );
        let increase_step = parse_or(
            &lookup,
            DEFAULT_INCREASE_STEP,
            defaults.default_policy.increase_step,
            Money::is_positive,
        );
        let decrease_step = parse_or(
            &lookup,
            DEFAULT_DECREASE_STEP,
            defaults.default_policy.decrease_step,
            Money::is_positive,
        );

        Self {
            activity_window: Duration::from_secs(activity_window),
            correction_interval: Duration::from_secs(correction_interval),
            max_commit_attempts,
            default_policy: PricingPolicy::new(increase_step, decrease_step),
        }
    }

    pub fn activity_window_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.activity_window).unwrap_or(chrono::Duration::seconds(60))
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    valid: impl Fn(&T) -> bool,
) -> T
where
    T: FromStr + core::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(v) if valid(&v) => v,
        _ => {
            warn!(key, value = %raw, default = %default, "ignoring malformed configuration value");
            default
        }
    }
}
