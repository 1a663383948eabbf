use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pricetide_core::{
    CategoryId, DomainError, DomainResult, Entity, Money, ProductId, TenantId,
};

use crate::name::normalize_name;

const MAX_NAME_CHARS: usize = 120;
const MAX_DESCRIPTION_CHARS: usize = 1000;

/// A sellable catalog product.
///
/// Deactivation is a soft delete: the record stays for history and queries,
/// but an inactive product can no longer be sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    tenant_id: TenantId,
    category_id: CategoryId,
    name: String,
    description: Option<String>,
    base_price: Money,
    min_price: Option<Money>,
    max_price: Option<Money>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Command: RegisterProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterProduct {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub base_price: Money,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub occurred_at: DateTime<Utc>,
}

impl Product {
    /// Validate a registration and build an active product.
    ///
    /// Name uniqueness is checked by the caller, which can see sibling rows.
    pub fn register(cmd: RegisterProduct) -> DomainResult<Self> {
        let name = normalize_name(&cmd.name, MAX_NAME_CHARS, "product")?;

        let description = match cmd.description {
            Some(d) if d.chars().count() > MAX_DESCRIPTION_CHARS => {
                return Err(DomainError::invalid(format!(
                    "description must not exceed {MAX_DESCRIPTION_CHARS} characters"
                )));
            }
            Some(d) if d.trim().is_empty() => None,
            other => other,
        };

        if !cmd.base_price.is_positive() {
            return Err(DomainError::invalid("base price must be greater than 0"));
        }
        if let Some(min) = cmd.min_price {
            if !min.is_positive() {
                return Err(DomainError::invalid("min price must be greater than 0"));
            }
            if min > cmd.base_price {
                return Err(DomainError::invalid("min price must not exceed base price"));
            }
        }
        if let Some(max) = cmd.max_price {
            if !max.is_positive() {
                return Err(DomainError::invalid("max price must be greater than 0"));
            }
            if max < cmd.base_price {
                return Err(DomainError::invalid("max price must not be below base price"));
            }
        }

        Ok(Self {
            id: cmd.product_id,
            tenant_id: cmd.tenant_id,
            category_id: cmd.category_id,
            name,
            description,
            base_price: cmd.base_price,
            min_price: cmd.min_price,
            max_price: cmd.max_price,
            active: true,
            created_at: cmd.occurred_at,
            updated_at: cmd.occurred_at,
        })
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn base_price(&self) -> Money {
        self.base_price
    }

    pub fn min_price(&self) -> Option<Money> {
        self.min_price
    }

    pub fn max_price(&self) -> Option<Money> {
        self.max_price
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Only active products can be sold.
    pub fn can_be_sold(&self) -> bool {
        self.active
    }

    /// Tenant isolation: reject access from any other organization.
    pub fn ensure_tenant(&self, tenant_id: TenantId) -> DomainResult<()> {
        if self.tenant_id != tenant_id {
            return Err(DomainError::forbidden(format!(
                "product {} belongs to another organization",
                self.id
            )));
        }
        Ok(())
    }

    /// `price` respects the configured bounds and is not negative.
    pub fn accepts_price(&self, price: Money) -> bool {
        !price.is_negative()
            && self.min_price.is_none_or(|min| price >= min)
            && self.max_price.is_none_or(|max| price <= max)
    }

    /// Soft delete. Returns `false` if the product was already inactive.
    pub fn deactivate(&mut self, at: DateTime<Utc>) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.updated_at = at;
        true
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}
