//! bocfix-ingest: bank-specific transaction description parsers.

pub mod types;
pub mod parsers;

pub use parsers::boc::DescriptionParser;
pub use types::{ExtractedFields, PurchaseType};
