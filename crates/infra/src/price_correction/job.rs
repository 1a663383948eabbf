use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use pricetide_catalog::{Organization, Product};
use pricetide_core::{CategoryId, Entity, ProductId, TenantId};
use pricetide_inventory::{Inventory, MovementContext};
use pricetide_pricing::PricingPolicy;

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::store::{CatalogStore, CommitBatch, LedgerStore};

pub const CORRECTION_NOTES: &str = "price correction";

/// Counters for one correction pass.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionSummary {
    /// Organizations with at least one sale in the window.
    pub active_tenants: usize,
    /// Idle products considered for decay.
    pub candidates: usize,
    pub updated: usize,
    /// Candidates already at their floor (nothing recorded).
    pub at_floor: usize,
    pub failed: usize,
}

enum Outcome {
    Updated,
    AtFloor,
}

pub struct PriceCorrectionJob<C, L> {
    catalog: C,
    ledger: L,
    defaults: PricingPolicy,
    activity_window: chrono::Duration,
}

impl<C, L> PriceCorrectionJob<C, L>
where
    C: CatalogStore,
    L: LedgerStore,
{
    pub fn new(catalog: C, ledger: L, config: &LedgerConfig) -> Self {
        Self {
            catalog,
            ledger,
            defaults: config.default_policy,
            activity_window: config.activity_window_chrono(),
        }
    }

    /// One pass as of `now`. Best effort: failures are logged and counted,
    /// never propagated.
    pub fn run_at(&self, now: DateTime<Utc>) -> CorrectionSummary {
        let mut summary = CorrectionSummary::default();
        let activity = match self.ledger.sale_activity(now - self.activity_window, now) {
            Ok(a) => a,
            Err(e) => {
                warn!(error = %e, "failed to read sale activity");
                summary.failed += 1;
                return summary;
            }
        };

        let mut tenants: Vec<(TenantId, HashSet<ProductId>)> = activity.into_iter().collect();
        tenants.sort_by_key(|(tenant_id, _)| *tenant_id);
        summary.active_tenants = tenants.len();

        let reference_id = format!("REDUCE-{}", now.timestamp_millis());
        for (tenant_id, sold) in tenants {
            let candidates = match self.candidates(tenant_id, &sold) {
                Ok(c) => c,
                Err(e) => {
                    warn!(tenant = %tenant_id, error = %e, "failed to load correction candidates");
                    summary.failed += 1;
                    continue;
                }
            };

            for (organization, product) in candidates {
                summary.candidates += 1;
                let policy = PricingPolicy::for_organization(&organization, self.defaults);
                match self.correct(&product, policy, &reference_id, now) {
                    Ok(Outcome::Updated) => summary.updated += 1,
                    Ok(Outcome::AtFloor) => summary.at_floor += 1,
                    Err(e) => {
                        warn!(
                            tenant = %tenant_id,
                            product = %product.id(),
                            error = %e,
                            "price correction failed"
                        );
                        summary.failed += 1;
                    }
                }
            }
        }

        info!(
            active_tenants = summary.active_tenants,
            candidates = summary.candidates,
            updated = summary.updated,
            at_floor = summary.at_floor,
            failed = summary.failed,
            "price correction pass finished"
        );
        summary
    }

    /// Active products in dynamic categories with no sale in the window.
    fn candidates(
        &self,
        tenant_id: TenantId,
        sold: &HashSet<ProductId>,
    ) -> Result<Vec<(Organization, Product)>, LedgerError> {
        let Some(organization) = self.catalog.organization(tenant_id)? else {
            return Ok(vec![]);
        };
        let dynamic: HashSet<CategoryId> = self
            .catalog
            .categories_for_tenant(tenant_id)?
            .into_iter()
            .filter(|c| c.dynamic_pricing())
            .map(|c| c.id())
            .collect();

        let mut products: Vec<Product> = self
            .catalog
            .products_for_tenant(tenant_id)?
            .into_iter()
            .filter(|p| {
                p.is_active() && dynamic.contains(&p.category_id()) && !sold.contains(&p.id())
            })
            .collect();
        products.sort_by_key(|p| p.id());
        Ok(products
            .into_iter()
            .map(|p| (organization.clone(), p))
            .collect())
    }

    fn correct(
        &self,
        product: &Product,
        policy: PricingPolicy,
        reference_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Outcome, LedgerError> {
        let row = self
            .ledger
            .inventory_for_product(product.tenant_id(), product.id())?
            .unwrap_or_else(|| Inventory::open(product, now));
        let change = policy.on_idle(product, row.unit_price(product));
        let ctx = MovementContext::by(None, now)
            .with_reference(Some(reference_id.to_string()))
            .with_notes(Some(CORRECTION_NOTES.to_string()));

        let Some(movement) = row.reprice(product, change, ctx)? else {
            debug!(product = %product.id(), price = %change.before, "price already at floor");
            return Ok(Outcome::AtFloor);
        };
        self.ledger.commit(CommitBatch::from(movement))?;
        debug!(
            product = %product.id(),
            before = %change.before,
            after = %change.after,
            "price decayed"
        );
        Ok(Outcome::Updated)
    }
}
