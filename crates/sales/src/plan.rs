use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

use pricetide_catalog::Product;
use pricetide_core::{DomainError, Money, ProductId, TenantId, UserId};
use pricetide_inventory::{Inventory, InventoryTransaction, MovementContext};
use pricetide_pricing::{PriceChange, PricingPolicy};

use crate::command::Sell;
use crate::receipt::{ReceiptLine, SaleReceipt};

/// Everything needed to validate lines for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleSubject {
    pub product: Product,
    /// Whether the product's category reacts to sales.
    pub dynamic_pricing: bool,
    pub inventory: Option<Inventory>,
}

/// A sale that failed validation. Nothing has been written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaleError {
    #[error("sale has no lines")]
    Empty,

    #[error("line {line} (product {product_id}): {source}")]
    Line {
        /// Zero-based index into `Sell::lines`.
        line: usize,
        product_id: ProductId,
        source: DomainError,
    },
}

impl SaleError {
    pub fn domain(&self) -> DomainError {
        match self {
            SaleError::Empty => DomainError::invalid("sale has no lines"),
            SaleError::Line { source, .. } => source.clone(),
        }
    }
}

/// Fully validated sale, ready to be committed as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalePlan {
    /// Final state of every touched inventory row, still at the version it was read at.
    pub rows: Vec<Inventory>,
    /// One `SALE` transaction per line, in line order.
    pub transactions: Vec<InventoryTransaction>,
    pub receipt: SaleReceipt,
}

/// Validate every line of `sell` and compute the resulting rows and transactions.
///
/// Lines naming the same product are applied cumulatively to the same row, so
/// their combined quantity is checked against stock on hand and each line sees
/// the price left behind by the previous one.
pub fn plan_sale(
    tenant_id: TenantId,
    actor: Option<UserId>,
    sell: &Sell,
    subjects: &HashMap<ProductId, SaleSubject>,
    policy: PricingPolicy,
    batch_id: &str,
    at: DateTime<Utc>,
) -> Result<SalePlan, SaleError> {
    if sell.lines.is_empty() {
        return Err(SaleError::Empty);
    }

    let mut touched: Vec<ProductId> = Vec::new();
    let mut working: HashMap<ProductId, Inventory> = HashMap::new();
    let mut transactions = Vec::with_capacity(sell.lines.len());
    let mut lines = Vec::with_capacity(sell.lines.len());

    for (idx, line) in sell.lines.iter().enumerate() {
        let reject = |source: DomainError| SaleError::Line {
            line: idx,
            product_id: line.product_id,
            source,
        };

        if !line.quantity.is_positive() {
            return Err(reject(DomainError::invalid("quantity must be greater than 0")));
        }

        let subject = subjects
            .get(&line.product_id)
            .ok_or_else(|| reject(DomainError::not_found(format!("product {}", line.product_id))))?;
        subject.product.ensure_tenant(tenant_id).map_err(reject)?;

        let current = match working.get(&line.product_id) {
            Some(inv) => inv,
            None => subject.inventory.as_ref().ok_or_else(|| {
                reject(DomainError::not_found(format!(
                    "no inventory for product {}",
                    line.product_id
                )))
            })?,
        };

        let unit_price = current.unit_price(&subject.product);
        let price = if subject.dynamic_pricing {
            policy.on_sale(&subject.product, unit_price)
        } else {
            PriceChange::unchanged(unit_price)
        };

        let ctx = MovementContext::by(actor, at)
            .with_reference(Some(batch_id.to_string()))
            .with_notes(sell.notes.clone())
            .with_station(sell.station_id);
        let movement = current
            .sell(&subject.product, line.quantity, price, ctx)
            .map_err(reject)?;

        lines.push(ReceiptLine {
            product_id: line.product_id,
            product_name: subject.product.name().to_string(),
            quantity: line.quantity,
            unit_price: price.before,
            total_price: line.quantity * price.before,
            price_after: price.after,
        });
        transactions.push(movement.transaction);
        if !touched.contains(&line.product_id) {
            touched.push(line.product_id);
        }
        working.insert(line.product_id, movement.inventory);
    }

    let rows = touched
        .iter()
        .filter_map(|id| working.remove(id))
        .collect();
    let total_amount: Money = lines.iter().map(|l| l.total_price).sum();

    Ok(SalePlan {
        rows,
        transactions,
        receipt: SaleReceipt {
            sale_id: batch_id.to_string(),
            lines,
            total_amount,
            notes: sell.notes.clone(),
            station_id: sell.station_id,
            timestamp: at,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pricetide_catalog::RegisterProduct;
    use pricetide_core::{CategoryId, Quantity, StationId, Versioned};
    use pricetide_inventory::TransactionKind;

    use crate::command::SaleLine;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 22, 0, 0).unwrap()
    }

    fn policy() -> PricingPolicy {
        PricingPolicy::new(Money::from(1), Money::from(1))
    }

    fn subject(
        tenant_id: TenantId,
        price: i64,
        max: Option<i64>,
        stock: i64,
        dynamic_pricing: bool,
    ) -> SaleSubject {
        let product = Product::register(RegisterProduct {
            tenant_id,
            product_id: ProductId::new(),
            category_id: CategoryId::new(),
            name: format!("Product {price}"),
            description: None,
            base_price: Money::from(price),
            min_price: None,
            max_price: max.map(Money::from),
            occurred_at: test_time(),
        })
        .unwrap();
        let mut inventory = Inventory::open(&product, test_time());
        if stock > 0 {
            inventory = inventory
                .add(
                    &product,
                    Quantity::from(stock),
                    MovementContext::by(None, test_time()),
                )
                .unwrap()
                .inventory;
        }
        SaleSubject {
            product,
            dynamic_pricing,
            inventory: Some(inventory),
        }
    }

    fn subjects(list: Vec<SaleSubject>) -> HashMap<ProductId, SaleSubject> {
        list.into_iter()
            .map(|s| (pricetide_core::Entity::id(&s.product), s))
            .collect()
    }

    fn pid(s: &SaleSubject) -> ProductId {
        pricetide_core::Entity::id(&s.product)
    }

    fn sell(lines: Vec<(ProductId, i64)>) -> Sell {
        Sell {
            lines: lines
                .into_iter()
                .map(|(product_id, q)| SaleLine {
                    product_id,
                    quantity: Quantity::from(q),
                })
                .collect(),
            notes: Some("table 4".to_string()),
            station_id: Some(StationId::new()),
        }
    }

    #[test]
    fn sale_at_price_ceiling_charges_pre_sale_price() {
        let tenant = TenantId::new();
        let beer = subject(tenant, 10, Some(10), 20, true);
        let id = pid(&beer);
        let subjects = subjects(vec![beer]);

        let plan = plan_sale(tenant, None, &sell(vec![(id, 2)]), &subjects, policy(), "SALE-1", test_time())
            .unwrap();

        assert_eq!(plan.rows.len(), 1);
        assert_eq!(plan.rows[0].quantity(), Quantity::from(18));
        assert_eq!(plan.rows[0].adjusted_price(), Some(Money::from(10)));
        let tx = &plan.transactions[0];
        assert_eq!(tx.kind, TransactionKind::Sale);
        assert_eq!(tx.quantity_change, Quantity::from(-2));
        assert_eq!(tx.price_before, Money::from(10));
        assert_eq!(tx.price_after, Money::from(10));
        assert_eq!(tx.reference_id.as_deref(), Some("SALE-1"));
        assert_eq!(plan.receipt.total_amount, Money::from(20));
    }

    #[test]
    fn dynamic_pricing_raises_price_after_sale() {
        let tenant = TenantId::new();
        let cider = subject(tenant, 5, Some(8), 10, true);
        let id = pid(&cider);
        let subjects = subjects(vec![cider]);

        let plan = plan_sale(tenant, None, &sell(vec![(id, 3)]), &subjects, policy(), "SALE-2", test_time())
            .unwrap();

        let line = &plan.receipt.lines[0];
        assert_eq!(line.unit_price, Money::from(5));
        assert_eq!(line.total_price, Money::from(15));
        assert_eq!(line.price_after, Money::from(6));
        assert_eq!(plan.rows[0].adjusted_price(), Some(Money::from(6)));
    }

    #[test]
    fn static_category_keeps_price() {
        let tenant = TenantId::new();
        let chips = subject(tenant, 3, None, 10, false);
        let id = pid(&chips);
        let subjects = subjects(vec![chips]);

        let plan = plan_sale(tenant, None, &sell(vec![(id, 1)]), &subjects, policy(), "SALE-3", test_time())
            .unwrap();
        assert_eq!(plan.receipt.lines[0].price_after, Money::from(3));
    }

    #[test]
    fn repeated_product_lines_accumulate_on_one_row() {
        let tenant = TenantId::new();
        let wine = subject(tenant, 7, None, 5, true);
        let id = pid(&wine);
        let version = wine.inventory.as_ref().unwrap().version();
        let subjects = subjects(vec![wine]);

        let plan = plan_sale(tenant, None, &sell(vec![(id, 2), (id, 2)]), &subjects, policy(), "SALE-4", test_time())
            .unwrap();
        assert_eq!(plan.rows.len(), 1);
        assert_eq!(plan.rows[0].quantity(), Quantity::from(1));
        assert_eq!(plan.rows[0].version(), version);
        assert_eq!(plan.transactions.len(), 2);
        // Second line pays the price left by the first.
        assert_eq!(plan.receipt.lines[1].unit_price, Money::from(8));
        assert_eq!(plan.receipt.total_amount, Money::from(30));

        let err = plan_sale(tenant, None, &sell(vec![(id, 3), (id, 3)]), &subjects, policy(), "SALE-5", test_time())
            .unwrap_err();
        match err {
            SaleError::Line { line: 1, source: DomainError::InsufficientStock { .. }, .. } => {}
            other => panic!("Expected InsufficientStock on line 1, got {other:?}"),
        }
    }

    #[test]
    fn failing_last_line_rejects_whole_sale() {
        let tenant = TenantId::new();
        let a = subject(tenant, 4, None, 10, true);
        let b = subject(tenant, 4, None, 1, true);
        let (ia, ib) = (pid(&a), pid(&b));
        let subjects = subjects(vec![a, b]);

        let err = plan_sale(tenant, None, &sell(vec![(ia, 1), (ib, 5)]), &subjects, policy(), "SALE-6", test_time())
            .unwrap_err();
        match err {
            SaleError::Line { line, product_id, source } => {
                assert_eq!(line, 1);
                assert_eq!(product_id, ib);
                assert_eq!(
                    source,
                    DomainError::insufficient_stock(Quantity::from(5), Quantity::from(1))
                );
            }
            other => panic!("Expected line rejection, got {other:?}"),
        }
    }

    #[test]
    fn rejects_foreign_missing_inactive_and_empty() {
        let tenant = TenantId::new();
        let foreign = subject(TenantId::new(), 4, None, 10, true);
        let mut inactive = subject(tenant, 4, None, 10, true);
        inactive.product.deactivate(test_time());
        let mut no_row = subject(tenant, 4, None, 10, true);
        no_row.inventory = None;
        let (ifo, iin, inr) = (pid(&foreign), pid(&inactive), pid(&no_row));
        let subjects = subjects(vec![foreign, inactive, no_row]);

        let kind = |lines| {
            plan_sale(tenant, None, &sell(lines), &subjects, policy(), "SALE-7", test_time())
                .unwrap_err()
                .domain()
                .kind()
        };

        use pricetide_core::ErrorKind;
        assert_eq!(kind(vec![(ifo, 1)]), ErrorKind::Forbidden);
        assert_eq!(kind(vec![(iin, 1)]), ErrorKind::InvalidArgument);
        assert_eq!(kind(vec![(inr, 1)]), ErrorKind::NotFound);
        assert_eq!(kind(vec![(ProductId::new(), 1)]), ErrorKind::NotFound);
        assert_eq!(kind(vec![(iin, 0)]), ErrorKind::InvalidArgument);
        assert_eq!(kind(vec![]), ErrorKind::InvalidArgument);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn plan_never_oversells(stock in 0i64..30, quantities in prop::collection::vec(1i64..10, 1..6)) {
                let tenant = TenantId::new();
                let item = subject(tenant, 5, Some(9), stock, true);
                let id = pid(&item);
                let subjects = subjects(vec![item]);
                let wanted: i64 = quantities.iter().sum();
                let cmd = sell(quantities.iter().map(|&q| (id, q)).collect());

                match plan_sale(tenant, None, &cmd, &subjects, policy(), "SALE-P", test_time()) {
                    Ok(plan) => {
                        prop_assert!(wanted <= stock);
                        prop_assert_eq!(plan.rows[0].quantity(), Quantity::from(stock - wanted));
                        prop_assert_eq!(plan.transactions.len(), quantities.len());
                        let net: Quantity = plan.transactions.iter().map(|t| t.quantity_change).sum();
                        prop_assert_eq!(net, Quantity::from(-wanted));
                        prop_assert!(plan.rows[0].adjusted_price() <= Some(Money::from(9)));
                    }
                    Err(SaleError::Line { source: DomainError::InsufficientStock { .. }, .. }) => {
                        prop_assert!(wanted > stock);
                    }
                    Err(e) => prop_assert!(false, "unexpected error {e:?}"),
                }
            }
        }
    }
}
