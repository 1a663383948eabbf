//! Replays a scripted evening at a bar against the in-memory ledger and
//! prints how prices moved as a JSON report.
//!
//! Usage: `pricetide-sim [minutes]` (default 180).

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Serialize;

use pricetide_catalog::{RegisterCategory, RegisterOrganization, RegisterProduct};
use pricetide_core::{
    CategoryId, Entity, Money, ProductId, Quantity, StationId, TenantId, UserId,
};
use pricetide_infra::{
    AddStock, CatalogService, Clock, CorrectionSummary, InMemoryStore, InventoryLedgerEngine,
    LedgerConfig, LedgerQueries, ManualClock, PriceCorrectionJob, SalesProcessor, SalesStats,
};
use pricetide_sales::{SaleLine, Sell};

const DEFAULT_MINUTES: u32 = 180;

struct Item {
    name: &'static str,
    category: usize,
    base: i64,
    min: Option<i64>,
    max: Option<i64>,
    stock: i64,
    /// Sells one unit every `every` minutes; 0 never sells.
    every: u32,
}

const CATEGORIES: [(&str, bool); 3] = [("Beer", true), ("Wine", true), ("Snacks", false)];

const MENU: [Item; 6] = [
    Item { name: "Pils", category: 0, base: 4, min: Some(2), max: Some(8), stock: 400, every: 1 },
    Item { name: "Tripel", category: 0, base: 6, min: Some(4), max: Some(10), stock: 120, every: 7 },
    Item { name: "Stout", category: 0, base: 5, min: Some(3), max: None, stock: 80, every: 0 },
    Item { name: "Rioja", category: 1, base: 7, min: None, max: Some(9), stock: 60, every: 4 },
    Item { name: "Rosé", category: 1, base: 6, min: Some(3), max: None, stock: 40, every: 0 },
    Item { name: "Nuts", category: 2, base: 3, min: None, max: None, stock: 200, every: 3 },
];

#[derive(Debug, Serialize)]
struct ProductReport {
    name: String,
    base_price: Money,
    final_price: Money,
    final_quantity: Quantity,
    /// Price at the end of every simulated minute.
    prices: Vec<Money>,
}

#[derive(Debug, Serialize)]
struct Report {
    started_at: DateTime<Utc>,
    minutes: u32,
    products: Vec<ProductReport>,
    corrections: CorrectionSummary,
    revenue: Money,
    sales_by_station: Vec<SalesStats<StationId>>,
}

fn main() -> anyhow::Result<()> {
    pricetide_observability::init();

    let minutes = match std::env::args().nth(1) {
        Some(raw) => raw
            .parse::<u32>()
            .with_context(|| format!("invalid minute count '{raw}'"))?,
        None => DEFAULT_MINUTES,
    };
    let config = LedgerConfig::from_env();
    let started_at = Utc
        .with_ymd_and_hms(2025, 3, 14, 20, 0, 0)
        .single()
        .context("invalid start time")?;

    let report = simulate(&config, started_at, minutes)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn simulate(
    config: &LedgerConfig,
    started_at: DateTime<Utc>,
    minutes: u32,
) -> anyhow::Result<Report> {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(ManualClock::new(started_at));
    let catalog = CatalogService::new(store.clone(), clock.clone());
    let engine = InventoryLedgerEngine::new(store.clone(), store.clone(), clock.clone(), config);
    let sales = SalesProcessor::new(store.clone(), store.clone(), clock.clone(), config);
    let job = PriceCorrectionJob::new(store.clone(), store.clone(), config);
    let queries = LedgerQueries::new(store.clone(), store.clone());

    let tenant_id = TenantId::new();
    let manager = UserId::new();
    let bartenders = [UserId::new(), UserId::new()];
    let stations = [StationId::new(), StationId::new()];

    catalog.register_organization(RegisterOrganization {
        tenant_id,
        name: "Harbour Bar".to_string(),
        price_increase_step: None,
        price_decrease_step: None,
    })?;
    let mut categories: Vec<CategoryId> = Vec::with_capacity(CATEGORIES.len());
    for (name, dynamic_pricing) in CATEGORIES {
        let category = catalog.register_category(RegisterCategory {
            tenant_id,
            category_id: CategoryId::new(),
            name: name.to_string(),
            dynamic_pricing: Some(dynamic_pricing),
        })?;
        categories.push(category.id());
    }

    let mut products: Vec<ProductId> = Vec::with_capacity(MENU.len());
    for item in &MENU {
        let product = catalog.register_product(RegisterProduct {
            tenant_id,
            product_id: ProductId::new(),
            category_id: categories[item.category],
            name: item.name.to_string(),
            description: None,
            base_price: Money::from(item.base),
            min_price: item.min.map(Money::from),
            max_price: item.max.map(Money::from),
            occurred_at: clock.now(),
        })?;
        engine.add_stock(
            tenant_id,
            manager,
            AddStock {
                product_id: product.id(),
                quantity: Quantity::from(item.stock),
                notes: Some("opening stock".to_string()),
            },
        )?;
        products.push(product.id());
    }

    let mut prices: Vec<Vec<Money>> = vec![Vec::with_capacity(minutes as usize); MENU.len()];
    let mut corrections = CorrectionSummary::default();
    let mut revenue = Money::ZERO;

    for minute in 1..=minutes {
        clock.advance(Duration::minutes(1));

        let lines: Vec<SaleLine> = MENU
            .iter()
            .zip(&products)
            .filter(|(item, _)| item.every > 0 && minute % item.every == 0)
            .map(|(_, &product_id)| SaleLine {
                product_id,
                quantity: Quantity::from(1),
            })
            .collect();
        if !lines.is_empty() {
            let slot = (minute as usize) % stations.len();
            let receipt = sales.sell(
                tenant_id,
                bartenders[slot],
                Sell {
                    lines,
                    notes: None,
                    station_id: Some(stations[slot]),
                },
            )?;
            revenue = revenue + receipt.total_amount;
        }

        let pass = job.run_at(clock.now());
        corrections.active_tenants += pass.active_tenants;
        corrections.candidates += pass.candidates;
        corrections.updated += pass.updated;
        corrections.at_floor += pass.at_floor;
        corrections.failed += pass.failed;

        for ((item, timeline), &product_id) in MENU.iter().zip(prices.iter_mut()).zip(&products) {
            let snapshot = queries.inventory_snapshot(tenant_id, product_id)?;
            timeline.push(snapshot.unit_price);
            if snapshot.quantity == Quantity::ZERO {
                engine.add_stock(
                    tenant_id,
                    manager,
                    AddStock {
                        product_id,
                        quantity: Quantity::from(item.stock),
                        notes: Some("restock".to_string()),
                    },
                )?;
            }
        }
    }

    let mut report_products = Vec::with_capacity(MENU.len());
    for ((item, &product_id), timeline) in MENU.iter().zip(&products).zip(prices) {
        let snapshot = queries.inventory_snapshot(tenant_id, product_id)?;
        report_products.push(ProductReport {
            name: item.name.to_string(),
            base_price: snapshot.base_price,
            final_price: snapshot.unit_price,
            final_quantity: snapshot.quantity,
            prices: timeline,
        });
    }

    tracing::info!(minutes, revenue = %revenue, "simulation finished");

    Ok(Report {
        started_at,
        minutes,
        products: report_products,
        corrections,
        revenue,
        sales_by_station: queries.sales_by_station(tenant_id)?,
    })
}
