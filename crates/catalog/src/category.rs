use serde::{Deserialize, Serialize};

use pricetide_core::{CategoryId, DomainResult, Entity, TenantId};

use crate::name::normalize_name;

/// Product grouping; `dynamic_pricing` gates whether member prices react to
/// sales and inactivity at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    tenant_id: TenantId,
    name: String,
    dynamic_pricing: bool,
}

/// Command: RegisterCategory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterCategory {
    pub tenant_id: TenantId,
    pub category_id: CategoryId,
    pub name: String,
    /// Defaults to `true` when unspecified.
    pub dynamic_pricing: Option<bool>,
}

impl Category {
    pub fn register(cmd: RegisterCategory) -> DomainResult<Self> {
        let name = normalize_name(&cmd.name, 120, "category")?;
        Ok(Self {
            id: cmd.category_id,
            tenant_id: cmd.tenant_id,
            name,
            dynamic_pricing: cmd.dynamic_pricing.unwrap_or(true),
        })
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dynamic_pricing(&self) -> bool {
        self.dynamic_pricing
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_pricing_defaults_to_enabled() {
        let category = Category::register(RegisterCategory {
            tenant_id: TenantId::new(),
            category_id: CategoryId::new(),
            name: " Beers ".to_string(),
            dynamic_pricing: None,
        })
        .unwrap();

        assert!(category.dynamic_pricing());
        assert_eq!(category.name(), "Beers");
    }

    #[test]
    fn explicit_flag_is_kept() {
        let category = Category::register(RegisterCategory {
            tenant_id: TenantId::new(),
            category_id: CategoryId::new(),
            name: "Snacks".to_string(),
            dynamic_pricing: Some(false),
        })
        .unwrap();

        assert!(!category.dynamic_pricing());
    }
}
