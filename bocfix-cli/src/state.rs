//! Shared state handed to every webhook request.

use std::sync::Arc;

use bocfix_core::{SignatureVerifier, TransactionFixer};
use bocfix_ledger::Ledger;

pub struct AppState<L> {
    pub verifier: Arc<SignatureVerifier>,
    pub fixer: Arc<TransactionFixer>,
    pub ledger: Arc<L>,
}

impl<L: Ledger> AppState<L> {
    pub fn new(verifier: SignatureVerifier, fixer: TransactionFixer, ledger: Arc<L>) -> Self {
        Self {
            verifier: Arc::new(verifier),
            fixer: Arc::new(fixer),
            ledger,
        }
    }
}

// Manual impl: deriving would demand `L: Clone`.
impl<L> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            verifier: Arc::clone(&self.verifier),
            fixer: Arc::clone(&self.fixer),
            ledger: Arc::clone(&self.ledger),
        }
    }
}
