//! Catalog maintenance: organizations, categories and products.

use std::sync::Arc;

use tracing::info;

use pricetide_catalog::{
    Category, Organization, Product, RegisterCategory, RegisterOrganization, RegisterProduct,
};
use pricetide_core::{DomainError, Entity, ProductId, TenantId};

use crate::clock::Clock;
use crate::error::LedgerError;
use crate::store::CatalogStore;

/// Load a product on behalf of `tenant_id`.
///
/// Unknown ids are `NotFound`; products of another tenant are `Forbidden`.
pub(crate) fn load_product<C: CatalogStore + ?Sized>(
    catalog: &C,
    tenant_id: TenantId,
    product_id: ProductId,
) -> Result<Product, LedgerError> {
    let product = catalog
        .product(product_id)?
        .ok_or_else(|| DomainError::not_found(format!("product {product_id}")))?;
    product.ensure_tenant(tenant_id)?;
    Ok(product)
}

pub(crate) fn load_organization<C: CatalogStore + ?Sized>(
    catalog: &C,
    tenant_id: TenantId,
) -> Result<Organization, LedgerError> {
    Ok(catalog
        .organization(tenant_id)?
        .ok_or_else(|| DomainError::not_found(format!("organization {tenant_id}")))?)
}

pub struct CatalogService<C> {
    catalog: C,
    clock: Arc<dyn Clock>,
}

impl<C: CatalogStore> CatalogService<C> {
    pub fn new(catalog: C, clock: Arc<dyn Clock>) -> Self {
        Self { catalog, clock }
    }

    pub fn register_organization(
        &self,
        cmd: RegisterOrganization,
    ) -> Result<Organization, LedgerError> {
        let organization = Organization::register(cmd)?;
        self.catalog.insert_organization(organization.clone())?;
        info!(tenant = %organization.id(), name = organization.name(), "organization registered");
        Ok(organization)
    }

    /// Names are unique per organization, compared case-insensitively.
    pub fn register_category(&self, cmd: RegisterCategory) -> Result<Category, LedgerError> {
        load_organization(&self.catalog, cmd.tenant_id)?;
        let category = Category::register(cmd)?;
        self.catalog.insert_category(category.clone())?;
        info!(
            tenant = %category.tenant_id(),
            category = %category.id(),
            dynamic_pricing = category.dynamic_pricing(),
            "category registered"
        );
        Ok(category)
    }

    /// The category must exist in the same organization.
    pub fn register_product(&self, cmd: RegisterProduct) -> Result<Product, LedgerError> {
        if self.catalog.category(cmd.tenant_id, cmd.category_id)?.is_none() {
            return Err(DomainError::not_found(format!("category {}", cmd.category_id)).into());
        }
        let product = Product::register(cmd)?;
        self.catalog.insert_product(product.clone())?;
        info!(
            tenant = %product.tenant_id(),
            product = %product.id(),
            base_price = %product.base_price(),
            "product registered"
        );
        Ok(product)
    }

    /// Soft delete. Deactivating an inactive product is a no-op.
    pub fn deactivate_product(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
    ) -> Result<Product, LedgerError> {
        let mut product = load_product(&self.catalog, tenant_id, product_id)?;
        if product.deactivate(self.clock.now()) {
            self.catalog.update_product(product.clone())?;
            info!(tenant = %tenant_id, product = %product_id, "product deactivated");
        }
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricetide_core::{CategoryId, ErrorKind, Money};

    use crate::testing::{Fixture, test_time};

    fn service(fx: &Fixture) -> CatalogService<Arc<crate::store::InMemoryStore>> {
        CatalogService::new(fx.store.clone(), fx.clock.clone())
    }

    fn register(
        tenant_id: TenantId,
        category_id: CategoryId,
        name: &str,
    ) -> RegisterProduct {
        RegisterProduct {
            tenant_id,
            product_id: ProductId::new(),
            category_id,
            name: name.to_string(),
            description: Some("Draught".to_string()),
            base_price: Money::from(4),
            min_price: Some(Money::from(2)),
            max_price: Some(Money::from(6)),
            occurred_at: test_time(),
        }
    }

    #[test]
    fn registers_catalog_in_order() {
        let fx = Fixture::new();
        let svc = service(&fx);
        let category = svc
            .register_category(RegisterCategory {
                tenant_id: fx.tenant,
                category_id: CategoryId::new(),
                name: "Beer".to_string(),
                dynamic_pricing: None,
            })
            .unwrap();
        assert!(category.dynamic_pricing());

        let product = svc
            .register_product(register(fx.tenant, category.id(), "Pils"))
            .unwrap();
        assert_eq!(product.category_id(), category.id());

        let err = svc
            .register_product(register(fx.tenant, category.id(), "pils "))
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Conflict));
    }

    #[test]
    fn product_requires_category_of_same_tenant() {
        let fx = Fixture::new();
        let neighbour = fx.neighbour();
        let foreign_category = crate::testing::category_in(&fx.store, neighbour, "Beer", true);

        let err = service(&fx)
            .register_product(register(fx.tenant, foreign_category, "Pils"))
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    }

    #[test]
    fn category_requires_organization() {
        let fx = Fixture::new();
        let err = service(&fx)
            .register_category(RegisterCategory {
                tenant_id: TenantId::new(),
                category_id: CategoryId::new(),
                name: "Beer".to_string(),
                dynamic_pricing: Some(false),
            })
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    }

    #[test]
    fn duplicate_organization_conflicts() {
        let fx = Fixture::new();
        let err = service(&fx)
            .register_organization(RegisterOrganization {
                tenant_id: fx.tenant,
                name: "Again".to_string(),
                price_increase_step: None,
                price_decrease_step: None,
            })
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Conflict));
    }

    #[test]
    fn deactivation_is_idempotent_and_tenant_scoped() {
        let fx = Fixture::new();
        let cat = fx.category("Beer", true);
        let pid = fx.product(cat, "Pils", 4, None, None);
        let svc = service(&fx);

        let first = svc.deactivate_product(fx.tenant, pid).unwrap();
        assert!(!first.is_active());
        let second = svc.deactivate_product(fx.tenant, pid).unwrap();
        assert_eq!(first, second);

        let err = svc.deactivate_product(TenantId::new(), pid).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Forbidden));
        let err = svc.deactivate_product(fx.tenant, ProductId::new()).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    }
}
