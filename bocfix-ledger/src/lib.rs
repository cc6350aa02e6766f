//! bocfix-ledger: Firefly III client used to apply corrections

pub mod client;
pub mod request;

pub use client::{FireflyClient, Ledger};
pub use request::{TransactionSplitUpdate, TransactionUpdateRequest};
