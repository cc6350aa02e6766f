//! Bank of Cyprus transaction fixer.
//!
//! BoC books card payments on the settlement day; the real purchase date only
//! survives inside the description. The fixer pulls it out and produces a
//! correction for the ledger. Everything that is not a correctable BoC
//! transaction is a quiet no-op.

use anyhow::Result;
use bocfix_ingest::DescriptionParser;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::{debug, error_span, info};

use crate::time::at_midday_utc;
use crate::webhook::{WebhookPayload, WebhookTransaction};

pub const BOC_COUNTRY: &str = "CY";
pub const BOC_BANK_CODE: &str = "0020";
/// Marks a ledger transaction as already corrected.
pub const PROCESSED_TAG: &str = "Processed by BoC fixer";

/// `CYkk0020...`: country code, two check digits, then the bank code.
pub fn is_boc_iban(iban: &str) -> bool {
    iban.len() > 8 && iban.get(0..2) == Some(BOC_COUNTRY) && iban.get(4..8) == Some(BOC_BANK_CODE)
}

/// Update to apply to one ledger transaction journal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectionCommand {
    pub journal_id: i64,
    pub description: String,
    pub date: DateTime<Utc>,
    pub payment_date: DateTime<Utc>,
    /// Processed marker first, then the tags the transaction already had
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotSingleTransaction,
    UnsupportedType,
    ForeignAccount,
    AlreadyProcessed,
    MissingDate,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::NotSingleTransaction => "not exactly one transaction",
            SkipReason::UnsupportedType => "transaction type not handled",
            SkipReason::ForeignAccount => "account is not a BoC IBAN",
            SkipReason::AlreadyProcessed => "already processed",
            SkipReason::MissingDate => "no date in description",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FixOutcome {
    Correct(CorrectionCommand),
    Skip(SkipReason),
}

impl FixOutcome {
    pub fn command(&self) -> Option<&CorrectionCommand> {
        match self {
            FixOutcome::Correct(cmd) => Some(cmd),
            FixOutcome::Skip(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransactionFixer {
    parser: DescriptionParser,
}

impl TransactionFixer {
    pub fn new() -> Result<Self> {
        Ok(Self::with_parser(DescriptionParser::new()?))
    }

    pub fn with_parser(parser: DescriptionParser) -> Self {
        Self { parser }
    }

    /// Decide what to do with one webhook delivery.
    pub fn fix(&self, payload: &WebhookPayload) -> FixOutcome {
        // Enabled at every log level, so every event inside carries the id.
        let span = error_span!("fix", transaction_id = payload.content.id);
        let _enter = span.enter();

        let outcome = self.plan(payload);
        match &outcome {
            FixOutcome::Skip(reason) => debug!(%reason, "skipping transaction"),
            FixOutcome::Correct(cmd) => info!(
                journal_id = cmd.journal_id,
                date = %cmd.date,
                description = %cmd.description,
                "BoC transaction will be corrected"
            ),
        }
        outcome
    }

    fn plan(&self, payload: &WebhookPayload) -> FixOutcome {
        let [tx] = payload.content.transactions.as_slice() else {
            return FixOutcome::Skip(SkipReason::NotSingleTransaction);
        };

        if let Err(reason) = check_boc_account(tx) {
            return FixOutcome::Skip(reason);
        }

        if tx.tags.iter().any(|t| t == PROCESSED_TAG) {
            return FixOutcome::Skip(SkipReason::AlreadyProcessed);
        }

        let fields = self.parser.parse(&tx.description);
        debug!(?fields, "parsed BoC description");

        let Some(date) = fields.date else {
            return FixOutcome::Skip(SkipReason::MissingDate);
        };
        let at = at_midday_utc(date);

        let mut tags = Vec::with_capacity(tx.tags.len() + 1);
        tags.push(PROCESSED_TAG.to_string());
        tags.extend(tx.tags.iter().cloned());

        FixOutcome::Correct(CorrectionCommand {
            journal_id: payload.content.id,
            description: fields.description,
            date: at,
            payment_date: at,
            tags,
        })
    }
}

fn check_boc_account(tx: &WebhookTransaction) -> Result<(), SkipReason> {
    let iban = match tx.kind.as_str() {
        "withdrawal" => &tx.source_iban,
        "deposit" => &tx.destination_iban,
        _ => return Err(SkipReason::UnsupportedType),
    };
    if is_boc_iban(iban) {
        Ok(())
    } else {
        debug!(kind = %tx.kind, iban = %iban, "not a BoC account");
        Err(SkipReason::ForeignAccount)
    }
}
