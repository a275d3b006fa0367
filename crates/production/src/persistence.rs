//! Transaction persistence collaborator.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::Utc;
use thiserror::Error;

use lumberyard_core::TransactionId;

use crate::transaction::{ProductionTransaction, TransactionPayload};

/// Failure reported by the persistence collaborator.
///
/// The composer does not interpret these beyond "the submit failed".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("persistence unavailable: {0}")]
    Unavailable(String),

    #[error("transaction {0} not found")]
    NotFound(TransactionId),
}

/// Create/update operations for production transactions.
#[async_trait::async_trait]
pub trait TransactionSink: Send + Sync {
    async fn create(&self, payload: &TransactionPayload) -> Result<TransactionId, PersistenceError>;

    async fn update(
        &self,
        id: TransactionId,
        payload: &TransactionPayload,
    ) -> Result<(), PersistenceError>;
}

#[async_trait::async_trait]
impl<S> TransactionSink for Arc<S>
where
    S: TransactionSink + ?Sized,
{
    async fn create(&self, payload: &TransactionPayload) -> Result<TransactionId, PersistenceError> {
        (**self).create(payload).await
    }

    async fn update(
        &self,
        id: TransactionId,
        payload: &TransactionPayload,
    ) -> Result<(), PersistenceError> {
        (**self).update(id, payload).await
    }
}

/// In-memory sink for tests/dev, with one-shot failure injection.
#[derive(Debug, Default)]
pub struct InMemoryTransactionSink {
    transactions: RwLock<HashMap<TransactionId, ProductionTransaction>>,
    fail_next: Mutex<Option<PersistenceError>>,
}

impl InMemoryTransactionSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next create/update call fail with `err`.
    pub fn fail_next(&self, err: PersistenceError) {
        *self.fail_next.lock().unwrap_or_else(PoisonError::into_inner) = Some(err);
    }

    /// Seed a transaction (e.g. one to open in edit mode).
    pub fn insert(&self, transaction: ProductionTransaction) {
        self.transactions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(transaction.id, transaction);
    }

    pub fn get(&self, id: TransactionId) -> Option<ProductionTransaction> {
        self.transactions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.transactions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take_failure(&self) -> Result<(), PersistenceError> {
        match self.fail_next.lock().unwrap_or_else(PoisonError::into_inner).take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl TransactionSink for InMemoryTransactionSink {
    async fn create(&self, payload: &TransactionPayload) -> Result<TransactionId, PersistenceError> {
        self.take_failure()?;
        let id = TransactionId::new();
        self.insert(ProductionTransaction::from_payload(id, payload.clone(), Utc::now()));
        Ok(id)
    }

    async fn update(
        &self,
        id: TransactionId,
        payload: &TransactionPayload,
    ) -> Result<(), PersistenceError> {
        self.take_failure()?;
        let mut transactions = self
            .transactions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let existing = transactions
            .get_mut(&id)
            .ok_or(PersistenceError::NotFound(id))?;
        existing.store_id = payload.store_id;
        existing.items = payload.items.clone();
        Ok(())
    }
}
