//! Sales domain module: multi-line point-of-sale transactions.
//!
//! Planning is pure: every line is validated against a snapshot of its
//! product and inventory row, and the resulting row states and transactions
//! are returned as one [`SalePlan`] for the infrastructure layer to commit
//! atomically. Nothing is decided after the first write.

pub mod command;
pub mod plan;
pub mod receipt;

pub use command::{SaleLine, Sell};
pub use plan::{SaleError, SalePlan, SaleSubject, plan_sale};
pub use receipt::{ReceiptLine, SaleReceipt};
