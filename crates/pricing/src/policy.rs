use serde::{Deserialize, Serialize};

use pricetide_catalog::{Organization, Product};
use pricetide_core::Money;

/// Raise `current` by `step`, capped at `max_bound` when one is set.
///
/// Returns `current` unchanged if it is already at or above the bound.
pub fn increase(current: Money, step: Money, max_bound: Option<Money>) -> Money {
    match max_bound {
        Some(max) if current >= max => current,
        Some(max) => (current + step).min(max),
        None => current + step,
    }
}

/// Lower `current` by `step`, floored at `min_bound`.
///
/// Without a configured minimum the floor is `step` itself, so a price can
/// never decay to zero. The result is always at least the floor: a price that
/// starts below it is lifted onto the floor.
pub fn decay(current: Money, step: Money, min_bound: Option<Money>) -> Money {
    let floor = min_bound.unwrap_or(step);
    (current - step).max(floor)
}

/// A price transition computed by the policy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceChange {
    pub before: Money,
    pub after: Money,
}

impl PriceChange {
    pub fn unchanged(price: Money) -> Self {
        Self {
            before: price,
            after: price,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.before == self.after
    }
}

/// Per-organization step sizes for the two pricing directions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub increase_step: Money,
    pub decrease_step: Money,
}

impl PricingPolicy {
    pub fn new(increase_step: Money, decrease_step: Money) -> Self {
        Self {
            increase_step,
            decrease_step,
        }
    }

    /// Resolve an organization's steps, falling back to the given defaults.
    pub fn for_organization(org: &Organization, defaults: PricingPolicy) -> Self {
        Self {
            increase_step: org.price_increase_step().unwrap_or(defaults.increase_step),
            decrease_step: org.price_decrease_step().unwrap_or(defaults.decrease_step),
        }
    }

    /// Price after a sale of `product` at `current`.
    pub fn on_sale(&self, product: &Product, current: Money) -> PriceChange {
        PriceChange {
            before: current,
            after: increase(current, self.increase_step, product.max_price()),
        }
    }

    /// Price after a product sat idle while its organization kept selling.
    pub fn on_idle(&self, product: &Product, current: Money) -> PriceChange {
        PriceChange {
            before: current,
            after: decay(current, self.decrease_step, product.min_price()),
        }
    }
}
