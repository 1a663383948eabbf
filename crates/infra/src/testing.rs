//! Shared fixtures for the service tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use pricetide_catalog::{
    Category, Organization, Product, RegisterCategory, RegisterOrganization, RegisterProduct,
};
use pricetide_core::{CategoryId, Entity, Money, ProductId, TenantId, UserId};

use crate::clock::ManualClock;
use crate::config::LedgerConfig;
use crate::store::{CatalogStore, InMemoryStore};

pub(crate) fn test_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 20, 0, 0).unwrap()
}

/// One organization with an in-memory store and a manual clock.
pub(crate) struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<ManualClock>,
    pub config: LedgerConfig,
    pub tenant: TenantId,
    pub actor: UserId,
}

impl Fixture {
    /// Organization with increase and decrease steps of 1.
    pub fn new() -> Self {
        Self::with_steps(Some(Money::from(1)), Some(Money::from(1)))
    }

    pub fn with_steps(increase: Option<Money>, decrease: Option<Money>) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let tenant = TenantId::new();
        register_org(&store, tenant, increase, decrease);
        Self {
            store,
            clock: Arc::new(ManualClock::new(test_time())),
            config: LedgerConfig::default(),
            tenant,
            actor: UserId::new(),
        }
    }

    /// Another organization sharing the same store.
    pub fn neighbour(&self) -> TenantId {
        let tenant_id = TenantId::new();
        register_org(&self.store, tenant_id, None, None);
        tenant_id
    }

    /// A stocked-or-not product owned by `tenant_id` in a fresh category.
    pub fn product_of(&self, tenant_id: TenantId, name: &str, base: i64) -> ProductId {
        let category_id = category_in(&self.store, tenant_id, &format!("{name} category"), true);
        product_in(&self.store, tenant_id, category_id, name, base, None, None)
    }

    pub fn category(&self, name: &str, dynamic_pricing: bool) -> CategoryId {
        category_in(&self.store, self.tenant, name, dynamic_pricing)
    }

    pub fn product(
        &self,
        category_id: CategoryId,
        name: &str,
        base: i64,
        min: Option<i64>,
        max: Option<i64>,
    ) -> ProductId {
        product_in(&self.store, self.tenant, category_id, name, base, min, max)
    }

    /// Unbounded product with a fractional base price.
    pub fn product_at(&self, category_id: CategoryId, name: &str, base: Money) -> ProductId {
        let product = Product::register(RegisterProduct {
            tenant_id: self.tenant,
            product_id: ProductId::new(),
            category_id,
            name: name.to_string(),
            description: None,
            base_price: base,
            min_price: None,
            max_price: None,
            occurred_at: test_time(),
        })
        .unwrap();
        let id = product.id();
        self.store.insert_product(product).unwrap();
        id
    }
}

pub(crate) fn register_org(
    store: &InMemoryStore,
    tenant_id: TenantId,
    increase: Option<Money>,
    decrease: Option<Money>,
) {
    let org = Organization::register(RegisterOrganization {
        tenant_id,
        name: format!("Org {tenant_id}"),
        price_increase_step: increase,
        price_decrease_step: decrease,
    })
    .unwrap();
    store.insert_organization(org).unwrap();
}

pub(crate) fn category_in(
    store: &InMemoryStore,
    tenant_id: TenantId,
    name: &str,
    dynamic_pricing: bool,
) -> CategoryId {
    let category = Category::register(RegisterCategory {
        tenant_id,
        category_id: CategoryId::new(),
        name: name.to_string(),
        dynamic_pricing: Some(dynamic_pricing),
    })
    .unwrap();
    let id = category.id();
    store.insert_category(category).unwrap();
    id
}

pub(crate) fn product_in(
    store: &InMemoryStore,
    tenant_id: TenantId,
    category_id: CategoryId,
    name: &str,
    base: i64,
    min: Option<i64>,
    max: Option<i64>,
) -> ProductId {
    let product = Product::register(RegisterProduct {
        tenant_id,
        product_id: ProductId::new(),
        category_id,
        name: name.to_string(),
        description: None,
        base_price: Money::from(base),
        min_price: min.map(Money::from),
        max_price: max.map(Money::from),
        occurred_at: test_time(),
    })
    .unwrap();
    let id = product.id();
    store.insert_product(product).unwrap();
    id
}
