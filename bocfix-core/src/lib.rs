//! bocfix-core: webhook authentication, payload model and the BoC transaction fixer

pub mod error;
pub mod fixer;
pub mod signature;
pub mod time;
pub mod webhook;

pub use error::SignatureError;
pub use fixer::{CorrectionCommand, FixOutcome, SkipReason, TransactionFixer, PROCESSED_TAG};
pub use signature::{Signature, SignatureVerifier, check_freshness, sign, verify};
pub use webhook::{WebhookContent, WebhookPayload, WebhookTransaction};
