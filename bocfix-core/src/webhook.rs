//! Inbound Firefly III webhook payload (only the fields the fixer reads).

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub content: WebhookContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookContent {
    /// Transaction journal id in the ledger
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transactions: Vec<WebhookTransaction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebhookTransaction {
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_iban: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub destination_iban: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// "withdrawal", "deposit", "transfer", ...
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

// Firefly sends `null` for IBANs of accounts that have none.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
