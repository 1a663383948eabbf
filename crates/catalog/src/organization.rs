use serde::{Deserialize, Serialize};

use pricetide_core::{DomainError, DomainResult, Money, TenantId};

use crate::name::normalize_name;

/// An organization (tenant) and its dynamic-pricing steps.
///
/// Unset steps fall back to the deployment-wide defaults supplied by
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    id: TenantId,
    name: String,
    price_increase_step: Option<Money>,
    price_decrease_step: Option<Money>,
}

/// Command: RegisterOrganization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterOrganization {
    pub tenant_id: TenantId,
    pub name: String,
    pub price_increase_step: Option<Money>,
    pub price_decrease_step: Option<Money>,
}

impl Organization {
    pub fn register(cmd: RegisterOrganization) -> DomainResult<Self> {
        let name = normalize_name(&cmd.name, 120, "organization")?;
        for (label, step) in [
            ("price increase step", cmd.price_increase_step),
            ("price decrease step", cmd.price_decrease_step),
        ] {
            if let Some(step) = step {
                if !step.is_positive() {
                    return Err(DomainError::invalid(format!("{label} must be greater than 0")));
                }
            }
        }

        Ok(Self {
            id: cmd.tenant_id,
            name,
            price_increase_step: cmd.price_increase_step,
            price_decrease_step: cmd.price_decrease_step,
        })
    }

    pub fn id(&self) -> TenantId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price_increase_step(&self) -> Option<Money> {
        self.price_increase_step
    }

    pub fn price_decrease_step(&self) -> Option<Money> {
        self.price_decrease_step
    }
}
