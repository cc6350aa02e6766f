//! Firefly III `PUT /api/v1/transactions/{id}` body.

use bocfix_core::CorrectionCommand;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionUpdateRequest {
    pub apply_rules: bool,
    pub fire_webhooks: bool,
    pub transactions: Vec<TransactionSplitUpdate>,
}

/// One split of the group. Omitted fields are left untouched by Firefly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionSplitUpdate {
    pub transaction_journal_id: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl From<&CorrectionCommand> for TransactionUpdateRequest {
    fn from(cmd: &CorrectionCommand) -> Self {
        Self {
            apply_rules: true,
            fire_webhooks: true,
            transactions: vec![TransactionSplitUpdate {
                transaction_journal_id: cmd.journal_id,
                description: cmd.description.clone(),
                date: Some(cmd.date),
                payment_date: Some(cmd.payment_date),
                tags: cmd.tags.clone(),
            }],
        }
    }
}
