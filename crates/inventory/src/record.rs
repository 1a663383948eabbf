use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pricetide_catalog::Product;
use pricetide_core::{
    DomainError, DomainResult, Entity, InventoryId, Money, ProductId, Quantity, TenantId,
    TransactionId, Versioned,
};
use pricetide_pricing::PriceChange;

use crate::movement::{MovementContext, StockMovement};
use crate::transaction::{InventoryTransaction, TransactionKind};

/// Current stock level and effective unit price of one product.
///
/// Mutations are decided purely: every operation takes `&self` and returns a
/// [`StockMovement`] holding the next state and its transaction, leaving the
/// receiver untouched. The next state keeps the version it was read at so the
/// store can reject it if someone else wrote in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    id: InventoryId,
    tenant_id: TenantId,
    product_id: ProductId,
    quantity: Quantity,
    adjusted_price: Option<Money>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

impl Inventory {
    /// A fresh, not-yet-persisted row: zero stock at the product's base price.
    pub fn open(product: &Product, at: DateTime<Utc>) -> Self {
        Self {
            id: InventoryId::new(),
            tenant_id: product.tenant_id(),
            product_id: product.id(),
            quantity: Quantity::ZERO,
            adjusted_price: Some(product.base_price()),
            created_at: at,
            updated_at: at,
            version: 0,
        }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn adjusted_price(&self) -> Option<Money> {
        self.adjusted_price
    }

    /// Effective unit price: the adjusted price, or the base price when unset.
    pub fn unit_price(&self, product: &Product) -> Money {
        self.adjusted_price.unwrap_or(product.base_price())
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_persisted(&self) -> bool {
        self.version > 0
    }

    /// Advance the version after a successful write. Only stores call this.
    pub fn mark_committed(&mut self) {
        self.version += 1;
    }

    /// Receive `quantity` units (must be positive).
    pub fn add(
        &self,
        product: &Product,
        quantity: Quantity,
        ctx: MovementContext,
    ) -> DomainResult<StockMovement> {
        self.ensure_product(product)?;
        ensure_positive(quantity)?;
        let price = self.unit_price(product);
        Ok(self.movement(
            TransactionKind::Add,
            self.quantity + quantity,
            PriceChange::unchanged(price),
            ctx,
        ))
    }

    /// Take `quantity` units out of stock (must be positive and on hand).
    pub fn remove(
        &self,
        product: &Product,
        quantity: Quantity,
        ctx: MovementContext,
    ) -> DomainResult<StockMovement> {
        self.ensure_product(product)?;
        ensure_positive(quantity)?;
        self.ensure_on_hand(quantity)?;
        let price = self.unit_price(product);
        Ok(self.movement(
            TransactionKind::Remove,
            self.quantity - quantity,
            PriceChange::unchanged(price),
            ctx,
        ))
    }

    /// Set the absolute stock level, optionally overriding the unit price.
    ///
    /// A price override must respect the product's bounds.
    pub fn adjust(
        &self,
        product: &Product,
        new_quantity: Quantity,
        new_price: Option<Money>,
        ctx: MovementContext,
    ) -> DomainResult<StockMovement> {
        self.ensure_product(product)?;
        if new_quantity.is_negative() {
            return Err(DomainError::invalid("quantity cannot be negative"));
        }
        let current = self.unit_price(product);
        let after = match new_price {
            Some(p) if !product.accepts_price(p) => {
                return Err(DomainError::invalid(format!(
                    "price {p} is outside the bounds of product {}",
                    product.id()
                )));
            }
            Some(p) => p,
            None => current,
        };
        Ok(self.movement(
            TransactionKind::Adjustment,
            new_quantity,
            PriceChange {
                before: current,
                after,
            },
            ctx,
        ))
    }

    /// Sell `quantity` units; `price` carries the pre-sale and post-sale unit price.
    pub fn sell(
        &self,
        product: &Product,
        quantity: Quantity,
        price: PriceChange,
        ctx: MovementContext,
    ) -> DomainResult<StockMovement> {
        self.ensure_product(product)?;
        ensure_positive(quantity)?;
        if !product.can_be_sold() {
            return Err(DomainError::invalid(format!(
                "product {} is not active",
                product.id()
            )));
        }
        self.ensure_on_hand(quantity)?;
        Ok(self.movement(TransactionKind::Sale, self.quantity - quantity, price, ctx))
    }

    /// Zero-quantity price change. `None` when the price would not move, in
    /// which case nothing must be recorded.
    pub fn reprice(
        &self,
        product: &Product,
        price: PriceChange,
        ctx: MovementContext,
    ) -> DomainResult<Option<StockMovement>> {
        self.ensure_product(product)?;
        if price.is_unchanged() {
            return Ok(None);
        }
        Ok(Some(self.movement(
            TransactionKind::Adjustment,
            self.quantity,
            price,
            ctx,
        )))
    }

    fn ensure_product(&self, product: &Product) -> DomainResult<()> {
        if self.product_id != product.id() {
            return Err(DomainError::invalid(format!(
                "inventory {} does not track product {}",
                self.id,
                product.id()
            )));
        }
        Ok(())
    }

    fn ensure_on_hand(&self, requested: Quantity) -> DomainResult<()> {
        if requested > self.quantity {
            return Err(DomainError::insufficient_stock(requested, self.quantity));
        }
        Ok(())
    }

    fn movement(
        &self,
        kind: TransactionKind,
        quantity_after: Quantity,
        price: PriceChange,
        ctx: MovementContext,
    ) -> StockMovement {
        let mut next = self.clone();
        next.quantity = quantity_after;
        next.adjusted_price = Some(price.after);
        next.updated_at = ctx.at;

        let transaction = InventoryTransaction {
            id: TransactionId::new(),
            inventory_id: self.id,
            kind,
            quantity_change: quantity_after - self.quantity,
            quantity_before: self.quantity,
            quantity_after,
            price_before: price.before,
            price_after: price.after,
            reference_id: ctx.reference_id,
            notes: ctx.notes,
            actor: ctx.actor,
            station_id: ctx.station_id,
            created_at: ctx.at,
        };

        StockMovement {
            inventory: next,
            transaction,
        }
    }
}

fn ensure_positive(quantity: Quantity) -> DomainResult<()> {
    if !quantity.is_positive() {
        return Err(DomainError::invalid("quantity must be greater than 0"));
    }
    Ok(())
}

impl Entity for Inventory {
    type Id = InventoryId;

    fn id(&self) -> InventoryId {
        self.id
    }
}

impl Versioned for Inventory {
    fn version(&self) -> u64 {
        self.version
    }
}
