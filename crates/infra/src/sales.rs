//! Sales processor: validates a whole multi-line sale, then commits every
//! touched row and all `SALE` transactions in one atomic batch.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use pricetide_core::{ProductId, TenantId, UserId};
use pricetide_pricing::PricingPolicy;
use pricetide_sales::{SaleReceipt, SaleSubject, Sell, plan_sale};

use crate::catalog::load_organization;
use crate::clock::Clock;
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::retry::retry_on_conflict;
use crate::store::{CatalogStore, CommitBatch, LedgerStore};

pub struct SalesProcessor<C, L> {
    catalog: C,
    ledger: L,
    clock: Arc<dyn Clock>,
    defaults: PricingPolicy,
    max_commit_attempts: u32,
}

impl<C, L> SalesProcessor<C, L>
where
    C: CatalogStore,
    L: LedgerStore,
{
    pub fn new(catalog: C, ledger: L, clock: Arc<dyn Clock>, config: &LedgerConfig) -> Self {
        Self {
            catalog,
            ledger,
            clock,
            defaults: config.default_policy,
            max_commit_attempts: config.max_commit_attempts,
        }
    }

    /// Process a sale for `tenant_id` on behalf of `actor`.
    ///
    /// On any error nothing has been written. A version conflict re-validates
    /// every line against freshly read rows.
    pub fn sell(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        cmd: Sell,
    ) -> Result<SaleReceipt, LedgerError> {
        let organization = load_organization(&self.catalog, tenant_id)?;
        let policy = PricingPolicy::for_organization(&organization, self.defaults);
        let batch_id = format!("SALE-{}", Uuid::now_v7());

        let result = retry_on_conflict("sell", self.max_commit_attempts, || {
            let subjects = self.load_subjects(tenant_id, &cmd)?;
            let plan = plan_sale(
                tenant_id,
                Some(actor),
                &cmd,
                &subjects,
                policy,
                &batch_id,
                self.clock.now(),
            )?;
            self.ledger.commit(CommitBatch {
                rows: plan.rows,
                transactions: plan.transactions,
            })?;
            Ok(plan.receipt)
        });

        match result {
            Ok(receipt) => {
                info!(
                    tenant = %tenant_id,
                    batch = %receipt.sale_id,
                    lines = receipt.lines.len(),
                    total = %receipt.total_amount,
                    "sale committed"
                );
                Ok(receipt)
            }
            Err(e) => {
                warn!(tenant = %tenant_id, batch = %batch_id, error = %e, "sale rejected");
                Err(e)
            }
        }
    }

    /// Snapshot of every product the sale names. Unknown products are left
    /// out so planning can report them against their line.
    fn load_subjects(
        &self,
        tenant_id: TenantId,
        cmd: &Sell,
    ) -> Result<HashMap<ProductId, SaleSubject>, LedgerError> {
        let mut subjects = HashMap::new();
        for line in &cmd.lines {
            if subjects.contains_key(&line.product_id) {
                continue;
            }
            let Some(product) = self.catalog.product(line.product_id)? else {
                continue;
            };
            let (dynamic_pricing, inventory) = if product.tenant_id() == tenant_id {
                let dynamic = self
                    .catalog
                    .category(tenant_id, product.category_id())?
                    .is_some_and(|c| c.dynamic_pricing());
                let row = self.ledger.inventory_for_product(tenant_id, line.product_id)?;
                (dynamic, row)
            } else {
                (false, None)
            };
            subjects.insert(
                line.product_id,
                SaleSubject {
                    product,
                    dynamic_pricing,
                    inventory,
                },
            );
        }
        Ok(subjects)
    }
}
