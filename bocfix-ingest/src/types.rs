use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PurchaseType {
    Purchase,
    Inward,
}

impl PurchaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseType::Purchase => "PURCHASE",
            PurchaseType::Inward => "INWARD",
        }
    }
}

impl fmt::Display for PurchaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields carved out of a free-text card/transfer description.
///
/// Every field except `description` is independently optional: a pattern that
/// does not match leaves its field empty and never blocks the others.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Masked card number without the `Card` prefix, e.g. `5***3824`
    pub card: Option<String>,
    pub auth: Option<String>,
    pub trace: Option<String>,
    pub purchase_type: Option<PurchaseType>,
    /// Amount with ISO currency as printed, e.g. `71.41 EUR`
    pub amount: Option<String>,
    /// Value date (UTC calendar day, no time component)
    pub date: Option<NaiveDate>,
    /// Merchant country (two uppercase letters)
    pub country: Option<String>,
    /// Whatever is left after every other field was removed.
    pub description: String,
}

impl std::str::FromStr for PurchaseType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PURCHASE" => Ok(PurchaseType::Purchase),
            "INWARD" => Ok(PurchaseType::Inward),
            other => Err(anyhow::anyhow!("unknown purchase type: {other}")),
        }
    }
}
