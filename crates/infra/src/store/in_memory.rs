use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use pricetide_catalog::{Category, Organization, Product, same_name};
use pricetide_core::{
    CategoryId, Entity, ExpectedVersion, InventoryId, ProductId, TenantId, Versioned,
};
use pricetide_inventory::{Inventory, InventoryTransaction, TransactionKind};

use super::r#trait::{CatalogStore, CommitBatch, LedgerStore, SaleActivity};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct CatalogState {
    organizations: HashMap<TenantId, Organization>,
    categories: HashMap<CategoryId, Category>,
    products: HashMap<ProductId, Product>,
}

#[derive(Debug, Clone)]
struct LogEntry {
    tenant_id: TenantId,
    product_id: ProductId,
    transaction: InventoryTransaction,
}

#[derive(Debug, Default)]
struct LedgerState {
    rows: HashMap<(TenantId, ProductId), Inventory>,
    log: Vec<LogEntry>,
}

/// In-memory catalog and ledger.
///
/// Intended for tests/dev and the simulation binary. A batch commit checks
/// and writes every row under a single write lock.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    catalog: RwLock<CatalogState>,
    ledger: RwLock<LedgerState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn catalog(&self) -> Result<RwLockReadGuard<'_, CatalogState>, StoreError> {
        self.catalog.read().map_err(|_| poisoned())
    }

    fn catalog_mut(&self) -> Result<RwLockWriteGuard<'_, CatalogState>, StoreError> {
        self.catalog.write().map_err(|_| poisoned())
    }

    fn ledger(&self) -> Result<RwLockReadGuard<'_, LedgerState>, StoreError> {
        self.ledger.read().map_err(|_| poisoned())
    }

    fn ledger_mut(&self) -> Result<RwLockWriteGuard<'_, LedgerState>, StoreError> {
        self.ledger.write().map_err(|_| poisoned())
    }
}

fn poisoned() -> StoreError {
    StoreError::Storage("lock poisoned".to_string())
}

impl CatalogStore for InMemoryStore {
    fn organization(&self, tenant_id: TenantId) -> Result<Option<Organization>, StoreError> {
        Ok(self.catalog()?.organizations.get(&tenant_id).cloned())
    }

    fn insert_organization(&self, organization: Organization) -> Result<(), StoreError> {
        let mut state = self.catalog_mut()?;
        if state.organizations.contains_key(&organization.id()) {
            return Err(StoreError::Duplicate(format!(
                "organization {} already exists",
                organization.id()
            )));
        }
        state.organizations.insert(organization.id(), organization);
        Ok(())
    }

    fn category(
        &self,
        tenant_id: TenantId,
        category_id: CategoryId,
    ) -> Result<Option<Category>, StoreError> {
        Ok(self
            .catalog()?
            .categories
            .get(&category_id)
            .filter(|c| c.tenant_id() == tenant_id)
            .cloned())
    }

    fn categories_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<Category>, StoreError> {
        Ok(self
            .catalog()?
            .categories
            .values()
            .filter(|c| c.tenant_id() == tenant_id)
            .cloned()
            .collect())
    }

    fn insert_category(&self, category: Category) -> Result<(), StoreError> {
        let mut state = self.catalog_mut()?;
        if state.categories.contains_key(&category.id()) {
            return Err(StoreError::Duplicate(format!(
                "category {} already exists",
                category.id()
            )));
        }
        let taken = state
            .categories
            .values()
            .any(|c| c.tenant_id() == category.tenant_id() && same_name(c.name(), category.name()));
        if taken {
            return Err(StoreError::Duplicate(format!(
                "category name '{}' is already in use",
                category.name()
            )));
        }
        state.categories.insert(category.id(), category);
        Ok(())
    }

    fn product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.catalog()?.products.get(&product_id).cloned())
    }

    fn products_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<Product>, StoreError> {
        Ok(self
            .catalog()?
            .products
            .values()
            .filter(|p| p.tenant_id() == tenant_id)
            .cloned()
            .collect())
    }

    fn insert_product(&self, product: Product) -> Result<(), StoreError> {
        let mut state = self.catalog_mut()?;
        if state.products.contains_key(&product.id()) {
            return Err(StoreError::Duplicate(format!(
                "product {} already exists",
                product.id()
            )));
        }
        let taken = state
            .products
            .values()
            .any(|p| p.tenant_id() == product.tenant_id() && same_name(p.name(), product.name()));
        if taken {
            return Err(StoreError::Duplicate(format!(
                "product name '{}' is already in use",
                product.name()
            )));
        }
        state.products.insert(product.id(), product);
        Ok(())
    }

    fn update_product(&self, product: Product) -> Result<(), StoreError> {
        let mut state = self.catalog_mut()?;
        match state.products.get(&product.id()) {
            None => Err(StoreError::Storage(format!(
                "product {} does not exist",
                product.id()
            ))),
            Some(existing) if existing.tenant_id() != product.tenant_id() => {
                Err(StoreError::TenantIsolation(format!(
                    "product {} belongs to another tenant",
                    product.id()
                )))
            }
            Some(_) => {
                state.products.insert(product.id(), product);
                Ok(())
            }
        }
    }
}

impl LedgerStore for InMemoryStore {
    fn inventory_for_product(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
    ) -> Result<Option<Inventory>, StoreError> {
        Ok(self.ledger()?.rows.get(&(tenant_id, product_id)).cloned())
    }

    fn inventories_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<Inventory>, StoreError> {
        Ok(self
            .ledger()?
            .rows
            .values()
            .filter(|r| r.tenant_id() == tenant_id)
            .cloned()
            .collect())
    }

    fn commit(&self, batch: CommitBatch) -> Result<Vec<Inventory>, StoreError> {
        let Some(first) = batch.rows.first() else {
            if batch.transactions.is_empty() {
                return Ok(vec![]);
            }
            return Err(StoreError::Storage(
                "transactions without inventory rows".to_string(),
            ));
        };
        let tenant_id = first.tenant_id();

        // Validate the batch shape before taking the lock.
        let mut products: HashMap<InventoryId, ProductId> = HashMap::new();
        for (idx, row) in batch.rows.iter().enumerate() {
            if row.tenant_id() != tenant_id {
                return Err(StoreError::TenantIsolation(format!(
                    "batch contains multiple tenant_ids (index {idx})"
                )));
            }
            if products.values().any(|p| *p == row.product_id()) {
                return Err(StoreError::Storage(format!(
                    "batch writes product {} twice",
                    row.product_id()
                )));
            }
            products.insert(row.id(), row.product_id());
        }
        for tx in &batch.transactions {
            if !products.contains_key(&tx.inventory_id) {
                return Err(StoreError::Storage(format!(
                    "transaction {} targets inventory {} outside the batch",
                    tx.id, tx.inventory_id
                )));
            }
        }

        let mut state = self.ledger_mut()?;

        for row in &batch.rows {
            let key = (tenant_id, row.product_id());
            match state.rows.get(&key) {
                None if row.version() == 0 => {}
                None => {
                    return Err(StoreError::Concurrency(format!(
                        "inventory for product {} no longer exists",
                        row.product_id()
                    )));
                }
                Some(_) if row.version() == 0 => {
                    return Err(StoreError::Concurrency(format!(
                        "inventory for product {} already exists",
                        row.product_id()
                    )));
                }
                Some(current) => {
                    let expected = ExpectedVersion::of(row);
                    if !expected.matches(current.version()) {
                        return Err(StoreError::Concurrency(format!(
                            "inventory for product {}: expected {expected:?}, found {}",
                            row.product_id(),
                            current.version()
                        )));
                    }
                }
            }
        }

        let mut committed = Vec::with_capacity(batch.rows.len());
        for mut row in batch.rows {
            row.mark_committed();
            state.rows.insert((tenant_id, row.product_id()), row.clone());
            committed.push(row);
        }
        for transaction in batch.transactions {
            if let Some(&product_id) = products.get(&transaction.inventory_id) {
                state.log.push(LogEntry {
                    tenant_id,
                    product_id,
                    transaction,
                });
            }
        }

        Ok(committed)
    }

    fn transactions_for_inventory(
        &self,
        tenant_id: TenantId,
        inventory_id: InventoryId,
    ) -> Result<Vec<InventoryTransaction>, StoreError> {
        Ok(self
            .ledger()?
            .log
            .iter()
            .filter(|e| e.tenant_id == tenant_id && e.transaction.inventory_id == inventory_id)
            .map(|e| e.transaction.clone())
            .collect())
    }

    fn sale_transactions(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<InventoryTransaction>, StoreError> {
        Ok(self
            .ledger()?
            .log
            .iter()
            .filter(|e| e.tenant_id == tenant_id && e.transaction.kind == TransactionKind::Sale)
            .map(|e| e.transaction.clone())
            .collect())
    }

    fn sale_activity(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<SaleActivity, StoreError> {
        let state = self.ledger()?;
        let mut activity: SaleActivity = HashMap::new();
        for e in state.log.iter().filter(|e| {
            e.transaction.kind == TransactionKind::Sale
                && e.transaction.created_at >= since
                && e.transaction.created_at <= until
        }) {
            activity
                .entry(e.tenant_id)
                .or_insert_with(HashSet::new)
                .insert(e.product_id);
        }
        Ok(activity)
    }
}
