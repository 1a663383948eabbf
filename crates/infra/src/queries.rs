//! Read-side queries over the catalog and ledger.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pricetide_catalog::Product;
use pricetide_core::{
    CategoryId, DomainError, Entity, Money, ProductId, Quantity, StationId, TenantId, UserId,
};
use pricetide_inventory::{Inventory, InventoryTransaction};

use crate::catalog::load_product;
use crate::error::LedgerError;
use crate::store::{CatalogStore, LedgerStore};

/// Current stock and price of one product, joined with its catalog data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub product_id: ProductId,
    pub product_name: String,
    pub category_id: CategoryId,
    pub active: bool,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub base_price: Money,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub updated_at: DateTime<Utc>,
}

impl InventorySnapshot {
    fn of(product: &Product, row: &Inventory) -> Self {
        Self {
            product_id: product.id(),
            product_name: product.name().to_string(),
            category_id: product.category_id(),
            active: product.is_active(),
            quantity: row.quantity(),
            unit_price: row.unit_price(product),
            base_price: product.base_price(),
            min_price: product.min_price(),
            max_price: product.max_price(),
            updated_at: row.updated_at(),
        }
    }
}

/// Aggregated `SALE` activity for one actor or station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesStats<K> {
    pub key: K,
    /// Distinct sale batches.
    pub sales_count: u64,
    pub units_sold: Quantity,
    /// Units times the price charged (the pre-sale price).
    pub revenue: Money,
}

pub struct LedgerQueries<C, L> {
    catalog: C,
    ledger: L,
}

impl<C, L> LedgerQueries<C, L>
where
    C: CatalogStore,
    L: LedgerStore,
{
    pub fn new(catalog: C, ledger: L) -> Self {
        Self { catalog, ledger }
    }

    pub fn inventory_snapshot(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
    ) -> Result<InventorySnapshot, LedgerError> {
        let product = load_product(&self.catalog, tenant_id, product_id)?;
        let row = self.row(tenant_id, product_id)?;
        Ok(InventorySnapshot::of(&product, &row))
    }

    /// Every stocked product of the tenant, optionally limited to one
    /// category, ordered by product name.
    pub fn inventory_for_tenant(
        &self,
        tenant_id: TenantId,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<InventorySnapshot>, LedgerError> {
        let products: HashMap<ProductId, Product> = self
            .catalog
            .products_for_tenant(tenant_id)?
            .into_iter()
            .filter(|p| category_id.is_none_or(|c| p.category_id() == c))
            .map(|p| (p.id(), p))
            .collect();

        let mut out: Vec<InventorySnapshot> = self
            .ledger
            .inventories_for_tenant(tenant_id)?
            .iter()
            .filter_map(|row| {
                products
                    .get(&row.product_id())
                    .map(|p| InventorySnapshot::of(p, row))
            })
            .collect();
        out.sort_by(|a, b| {
            a.product_name
                .to_lowercase()
                .cmp(&b.product_name.to_lowercase())
        });
        Ok(out)
    }

    /// Transactions of one product, newest first.
    pub fn transaction_history(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
    ) -> Result<Vec<InventoryTransaction>, LedgerError> {
        load_product(&self.catalog, tenant_id, product_id)?;
        let row = self.row(tenant_id, product_id)?;
        let mut log = self.ledger.transactions_for_inventory(tenant_id, row.id())?;
        // Stable sort keeps commit order for entries sharing a timestamp.
        log.reverse();
        log.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(log)
    }

    /// Sales per actor, highest revenue first.
    pub fn sales_by_actor(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<SalesStats<UserId>>, LedgerError> {
        let sales = self.ledger.sale_transactions(tenant_id)?;
        Ok(aggregate(&sales, |t| t.actor))
    }

    /// Sales per station, highest revenue first. Sales without a station are
    /// not attributed.
    pub fn sales_by_station(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<SalesStats<StationId>>, LedgerError> {
        let sales = self.ledger.sale_transactions(tenant_id)?;
        Ok(aggregate(&sales, |t| t.station_id))
    }

    fn row(&self, tenant_id: TenantId, product_id: ProductId) -> Result<Inventory, LedgerError> {
        Ok(self
            .ledger
            .inventory_for_product(tenant_id, product_id)?
            .ok_or_else(|| DomainError::not_found(format!("no inventory for product {product_id}")))?)
    }
}

fn aggregate<K>(
    sales: &[InventoryTransaction],
    key: impl Fn(&InventoryTransaction) -> Option<K>,
) -> Vec<SalesStats<K>>
where
    K: Copy + Eq + Hash + Ord,
{
    let mut by_key: HashMap<K, (Vec<&str>, Quantity, Money)> = HashMap::new();
    for tx in sales {
        let Some(k) = key(tx) else { continue };
        let entry = by_key
            .entry(k)
            .or_insert_with(|| (Vec::new(), Quantity::ZERO, Money::ZERO));
        if let Some(batch) = tx.reference_id.as_deref() {
            if !entry.0.contains(&batch) {
                entry.0.push(batch);
            }
        }
        entry.1 = entry.1 + tx.units_sold();
        entry.2 = entry.2 + tx.revenue();
    }

    let mut stats: Vec<SalesStats<K>> = by_key
        .into_iter()
        .map(|(key, (batches, units_sold, revenue))| SalesStats {
            key,
            sales_count: batches.len() as u64,
            units_sold,
            revenue,
        })
        .collect();
    stats.sort_by(|a, b| b.revenue.cmp(&a.revenue).then(a.key.cmp(&b.key)));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Duration;
    use pricetide_core::ErrorKind;
    use pricetide_inventory::TransactionKind;
    use pricetide_sales::{SaleLine, Sell};

    use crate::engine::{AddStock, InventoryLedgerEngine, RemoveStock};
    use crate::sales::SalesProcessor;
    use crate::store::InMemoryStore;
    use crate::testing::Fixture;

    fn queries(fx: &Fixture) -> LedgerQueries<Arc<InMemoryStore>, Arc<InMemoryStore>> {
        LedgerQueries::new(fx.store.clone(), fx.store.clone())
    }

    fn engine(fx: &Fixture) -> InventoryLedgerEngine<Arc<InMemoryStore>, Arc<InMemoryStore>> {
        InventoryLedgerEngine::new(fx.store.clone(), fx.store.clone(), fx.clock.clone(), &fx.config)
    }

    fn stock(fx: &Fixture, product_id: ProductId, qty: i64) {
        engine(fx)
            .add_stock(
                fx.tenant,
                fx.actor,
                AddStock {
                    product_id,
                    quantity: Quantity::from(qty),
                    notes: None,
                },
            )
            .unwrap();
    }

    fn sell(fx: &Fixture, actor: UserId, station: Option<StationId>, lines: &[(ProductId, i64)]) {
        SalesProcessor::new(fx.store.clone(), fx.store.clone(), fx.clock.clone(), &fx.config)
            .sell(
                fx.tenant,
                actor,
                Sell {
                    lines: lines
                        .iter()
                        .map(|&(product_id, q)| SaleLine {
                            product_id,
                            quantity: Quantity::from(q),
                        })
                        .collect(),
                    notes: None,
                    station_id: station,
                },
            )
            .unwrap();
    }

    #[test]
    fn snapshots_join_catalog_and_ledger() {
        let fx = Fixture::new();
        let beer = fx.category("Beer", true);
        let snacks = fx.category("Snacks", false);
        let pils = fx.product(beer, "pils", 4, Some(2), Some(6));
        let ale = fx.product(beer, "Ale", 5, None, None);
        let nuts = fx.product(snacks, "Nuts", 3, None, None);
        let _unstocked = fx.product(beer, "Stout", 6, None, None);
        stock(&fx, pils, 10);
        stock(&fx, ale, 4);
        stock(&fx, nuts, 2);

        let q = queries(&fx);
        let snap = q.inventory_snapshot(fx.tenant, pils).unwrap();
        assert_eq!(snap.quantity, Quantity::from(10));
        assert_eq!(snap.unit_price, Money::from(4));
        assert_eq!(snap.min_price, Some(Money::from(2)));
        assert_eq!(snap.max_price, Some(Money::from(6)));
        assert!(snap.active);

        let all = q.inventory_for_tenant(fx.tenant, None).unwrap();
        let names: Vec<&str> = all.iter().map(|s| s.product_name.as_str()).collect();
        assert_eq!(names, vec!["Ale", "Nuts", "pils"]);

        let beers = q.inventory_for_tenant(fx.tenant, Some(beer)).unwrap();
        assert_eq!(beers.len(), 2);

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["unit_price"], serde_json::to_value(Money::from(4)).unwrap());
        assert!(json["unit_price"].is_string());
        assert_eq!(json["max_price"], serde_json::to_value(Money::from(6)).unwrap());

        let neighbour = fx.neighbour();
        assert!(q.inventory_for_tenant(neighbour, None).unwrap().is_empty());
        let err = q.inventory_snapshot(neighbour, pils).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Forbidden));
    }

    #[test]
    fn history_is_newest_first() {
        let fx = Fixture::new();
        let pid = fx.product(fx.category("Beer", true), "Pils", 4, None, None);
        stock(&fx, pid, 10);
        fx.clock.advance(Duration::minutes(1));
        engine(&fx)
            .remove_stock(
                fx.tenant,
                fx.actor,
                RemoveStock {
                    product_id: pid,
                    quantity: Quantity::from(1),
                    reference_id: None,
                    notes: None,
                },
            )
            .unwrap();
        fx.clock.advance(Duration::minutes(1));
        sell(&fx, fx.actor, None, &[(pid, 2)]);

        let kinds: Vec<TransactionKind> = queries(&fx)
            .transaction_history(fx.tenant, pid)
            .unwrap()
            .iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![TransactionKind::Sale, TransactionKind::Remove, TransactionKind::Add]
        );
    }

    #[test]
    fn sales_statistics_group_by_actor_and_station() {
        let fx = Fixture::new();
        let beer = fx.product(fx.category("Beer", true), "Pils", 4, None, Some(4));
        let wine = fx.product(fx.category("Wine", false), "Rioja", 7, None, None);
        stock(&fx, beer, 50);
        stock(&fx, wine, 50);

        let (alice, bob) = (UserId::new(), UserId::new());
        let (bar, terrace) = (StationId::new(), StationId::new());
        sell(&fx, alice, Some(bar), &[(beer, 2), (wine, 1)]);
        sell(&fx, alice, Some(bar), &[(beer, 1)]);
        sell(&fx, bob, Some(terrace), &[(wine, 3)]);
        sell(&fx, bob, None, &[(beer, 1)]);

        let q = queries(&fx);
        let by_actor = q.sales_by_actor(fx.tenant).unwrap();
        assert_eq!(by_actor.len(), 2);
        assert_eq!(by_actor[0].key, bob);
        assert_eq!(by_actor[0].sales_count, 2);
        assert_eq!(by_actor[0].units_sold, Quantity::from(4));
        assert_eq!(by_actor[0].revenue, Money::from(25));
        assert_eq!(by_actor[1].key, alice);
        assert_eq!(by_actor[1].sales_count, 2);
        assert_eq!(by_actor[1].units_sold, Quantity::from(4));
        assert_eq!(by_actor[1].revenue, Money::from(19));

        let by_station = q.sales_by_station(fx.tenant).unwrap();
        assert_eq!(by_station.len(), 2);
        assert_eq!(by_station[0].key, terrace);
        assert_eq!(by_station[0].revenue, Money::from(21));
        assert_eq!(by_station[1].key, bar);
        assert_eq!(by_station[1].sales_count, 2);
        assert_eq!(by_station[1].revenue, Money::from(19));

        assert!(q.sales_by_actor(fx.neighbour()).unwrap().is_empty());
    }
}
