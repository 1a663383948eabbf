use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use pricetide_catalog::{Category, Organization, Product};
use pricetide_core::{CategoryId, InventoryId, ProductId, TenantId};
use pricetide_inventory::{Inventory, InventoryTransaction, StockMovement};

use crate::error::StoreError;

/// Products with at least one `SALE`, grouped by organization.
pub type SaleActivity = HashMap<TenantId, HashSet<ProductId>>;

/// Organizations, categories and products.
///
/// Uniqueness of category and product names within a tenant is enforced by
/// the store ([`StoreError::Duplicate`]) so concurrent registrations cannot
/// both succeed.
pub trait CatalogStore: Send + Sync {
    fn organization(&self, tenant_id: TenantId) -> Result<Option<Organization>, StoreError>;

    fn insert_organization(&self, organization: Organization) -> Result<(), StoreError>;

    fn category(
        &self,
        tenant_id: TenantId,
        category_id: CategoryId,
    ) -> Result<Option<Category>, StoreError>;

    fn categories_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<Category>, StoreError>;

    fn insert_category(&self, category: Category) -> Result<(), StoreError>;

    /// Look a product up by id alone, so callers can tell "missing" from
    /// "owned by someone else".
    fn product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError>;

    fn products_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<Product>, StoreError>;

    fn insert_product(&self, product: Product) -> Result<(), StoreError>;

    /// Replace an existing product record.
    fn update_product(&self, product: Product) -> Result<(), StoreError>;
}

/// Rows and transactions committed together.
///
/// Every row is written with `ExpectedVersion::Exact(row.version())`; a row at
/// version 0 must not exist yet. Either every row and transaction is written,
/// or nothing is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitBatch {
    pub rows: Vec<Inventory>,
    pub transactions: Vec<InventoryTransaction>,
}

impl From<StockMovement> for CommitBatch {
    fn from(movement: StockMovement) -> Self {
        Self {
            rows: vec![movement.inventory],
            transactions: vec![movement.transaction],
        }
    }
}

/// Inventory rows and their append-only transaction log.
pub trait LedgerStore: Send + Sync {
    fn inventory_for_product(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
    ) -> Result<Option<Inventory>, StoreError>;

    fn inventories_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<Inventory>, StoreError>;

    /// Atomically check versions and write the batch.
    ///
    /// Returns the rows as stored (versions advanced), in batch order.
    fn commit(&self, batch: CommitBatch) -> Result<Vec<Inventory>, StoreError>;

    /// Transactions of one inventory row, oldest first.
    fn transactions_for_inventory(
        &self,
        tenant_id: TenantId,
        inventory_id: InventoryId,
    ) -> Result<Vec<InventoryTransaction>, StoreError>;

    /// Every `SALE` transaction of a tenant, oldest first.
    fn sale_transactions(&self, tenant_id: TenantId)
    -> Result<Vec<InventoryTransaction>, StoreError>;

    /// Products sold in `[since, until]`, across all tenants.
    fn sale_activity(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<SaleActivity, StoreError>;
}

impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    fn organization(&self, tenant_id: TenantId) -> Result<Option<Organization>, StoreError> {
        (**self).organization(tenant_id)
    }

    fn insert_organization(&self, organization: Organization) -> Result<(), StoreError> {
        (**self).insert_organization(organization)
    }

    fn category(
        &self,
        tenant_id: TenantId,
        category_id: CategoryId,
    ) -> Result<Option<Category>, StoreError> {
        (**self).category(tenant_id, category_id)
    }

    fn categories_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<Category>, StoreError> {
        (**self).categories_for_tenant(tenant_id)
    }

    fn insert_category(&self, category: Category) -> Result<(), StoreError> {
        (**self).insert_category(category)
    }

    fn product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).product(product_id)
    }

    fn products_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<Product>, StoreError> {
        (**self).products_for_tenant(tenant_id)
    }

    fn insert_product(&self, product: Product) -> Result<(), StoreError> {
        (**self).insert_product(product)
    }

    fn update_product(&self, product: Product) -> Result<(), StoreError> {
        (**self).update_product(product)
    }
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn inventory_for_product(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
    ) -> Result<Option<Inventory>, StoreError> {
        (**self).inventory_for_product(tenant_id, product_id)
    }

    fn inventories_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<Inventory>, StoreError> {
        (**self).inventories_for_tenant(tenant_id)
    }

    fn commit(&self, batch: CommitBatch) -> Result<Vec<Inventory>, StoreError> {
        (**self).commit(batch)
    }

    fn transactions_for_inventory(
        &self,
        tenant_id: TenantId,
        inventory_id: InventoryId,
    ) -> Result<Vec<InventoryTransaction>, StoreError> {
        (**self).transactions_for_inventory(tenant_id, inventory_id)
    }

    fn sale_transactions(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<InventoryTransaction>, StoreError> {
        (**self).sale_transactions(tenant_id)
    }

    fn sale_activity(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<SaleActivity, StoreError> {
        (**self).sale_activity(since, until)
    }
}
