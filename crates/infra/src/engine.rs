//! Inventory ledger engine: stock commands against a single inventory row.
//!
//! Every command follows the same pipeline:
//!
//! ```text
//! load product (tenant check) -> load row -> decide movement (pure)
//!   -> commit row + transaction with ExpectedVersion::Exact -> retry on conflict
//! ```
//!
//! A conflict means another writer committed the row in between; the whole
//! pipeline is re-run from a fresh read, up to `max_commit_attempts` times.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use pricetide_core::{DomainError, Money, ProductId, Quantity, TenantId, UserId};
use pricetide_inventory::{Inventory, MovementContext, StockMovement};

use crate::catalog::load_product;
use crate::clock::Clock;
use crate::config::LedgerConfig;
use crate::error::{LedgerError, StoreError};
use crate::retry::retry_on_conflict;
use crate::store::{CatalogStore, CommitBatch, LedgerStore};

/// Command: AddStock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddStock {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub notes: Option<String>,
}

/// Command: RemoveStock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveStock {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub reference_id: Option<String>,
    pub notes: Option<String>,
}

/// Command: AdjustStock (absolute quantity, optional price override).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustStock {
    pub product_id: ProductId,
    pub new_quantity: Quantity,
    pub price: Option<Money>,
    pub notes: Option<String>,
}

pub struct InventoryLedgerEngine<C, L> {
    catalog: C,
    ledger: L,
    clock: Arc<dyn Clock>,
    max_commit_attempts: u32,
}

impl<C, L> InventoryLedgerEngine<C, L>
where
    C: CatalogStore,
    L: LedgerStore,
{
    pub fn new(catalog: C, ledger: L, clock: Arc<dyn Clock>, config: &LedgerConfig) -> Self {
        Self {
            catalog,
            ledger,
            clock,
            max_commit_attempts: config.max_commit_attempts,
        }
    }

    /// Receive stock, creating the inventory row on first use.
    pub fn add_stock(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        cmd: AddStock,
    ) -> Result<StockMovement, LedgerError> {
        ensure_positive(cmd.quantity)?;
        let movement = retry_on_conflict("add_stock", self.max_commit_attempts, || {
            let product = load_product(&self.catalog, tenant_id, cmd.product_id)?;
            let at = self.clock.now();
            let row = self
                .ledger
                .inventory_for_product(tenant_id, cmd.product_id)?
                .unwrap_or_else(|| Inventory::open(&product, at));
            let ctx = MovementContext::by(Some(actor), at).with_notes(cmd.notes.clone());
            self.commit(row.add(&product, cmd.quantity, ctx)?)
        })?;

        info!(
            tenant = %tenant_id,
            product = %cmd.product_id,
            quantity = %cmd.quantity,
            on_hand = %movement.inventory.quantity(),
            "stock added"
        );
        Ok(movement)
    }

    pub fn remove_stock(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        cmd: RemoveStock,
    ) -> Result<StockMovement, LedgerError> {
        ensure_positive(cmd.quantity)?;
        let movement = retry_on_conflict("remove_stock", self.max_commit_attempts, || {
            let product = load_product(&self.catalog, tenant_id, cmd.product_id)?;
            let row = self.existing_row(tenant_id, cmd.product_id)?;
            let ctx = MovementContext::by(Some(actor), self.clock.now())
                .with_reference(cmd.reference_id.clone())
                .with_notes(cmd.notes.clone());
            self.commit(row.remove(&product, cmd.quantity, ctx)?)
        })?;

        info!(
            tenant = %tenant_id,
            product = %cmd.product_id,
            quantity = %cmd.quantity,
            on_hand = %movement.inventory.quantity(),
            "stock removed"
        );
        Ok(movement)
    }

    pub fn adjust_stock(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        cmd: AdjustStock,
    ) -> Result<StockMovement, LedgerError> {
        let movement = retry_on_conflict("adjust_stock", self.max_commit_attempts, || {
            let product = load_product(&self.catalog, tenant_id, cmd.product_id)?;
            let row = self.existing_row(tenant_id, cmd.product_id)?;
            let ctx = MovementContext::by(Some(actor), self.clock.now()).with_notes(cmd.notes.clone());
            self.commit(row.adjust(&product, cmd.new_quantity, cmd.price, ctx)?)
        })?;

        info!(
            tenant = %tenant_id,
            product = %cmd.product_id,
            quantity = %movement.transaction.quantity_after,
            price = %movement.transaction.price_after,
            "stock adjusted"
        );
        Ok(movement)
    }

    fn existing_row(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
    ) -> Result<Inventory, LedgerError> {
        Ok(self
            .ledger
            .inventory_for_product(tenant_id, product_id)?
            .ok_or_else(|| DomainError::not_found(format!("no inventory for product {product_id}")))?)
    }

    fn commit(&self, movement: StockMovement) -> Result<StockMovement, LedgerError> {
        let transaction = movement.transaction.clone();
        let inventory = self
            .ledger
            .commit(CommitBatch::from(movement))?
            .pop()
            .ok_or_else(|| StoreError::Storage("commit returned no rows".to_string()))?;
        Ok(StockMovement {
            inventory,
            transaction,
        })
    }
}

fn ensure_positive(quantity: Quantity) -> Result<(), LedgerError> {
    if !quantity.is_positive() {
        return Err(DomainError::invalid("quantity must be greater than 0").into());
    }
    Ok(())
}
