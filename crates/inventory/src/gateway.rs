//! Inventory lookup collaborator.
//!
//! The catalog itself lives elsewhere (a warehouse service); this module only
//! fixes the contract the production composer relies on, plus an in-memory
//! implementation for tests and local runs.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use lumberyard_core::{DomainError, DomainResult, SkuId};

use crate::query::InventoryQuery;
use crate::sku::{Sku, SkuRecord};

/// Lookup failure.
///
/// Callers in the composer never surface these: they are logged and turned
/// into an empty result (see [`lookup_or_empty`]).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("inventory service unavailable: {0}")]
    Unavailable(String),

    #[error("inventory lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("inventory returned an invalid record: {0}")]
    InvalidRecord(String),
}

/// Async, read-only view of the inventory catalog.
#[async_trait::async_trait]
pub trait InventoryGateway: Send + Sync {
    /// Return the SKUs matching `query`, one page at a time.
    async fn search(&self, query: &InventoryQuery) -> Result<Vec<Sku>, GatewayError>;
}

#[async_trait::async_trait]
impl<G> InventoryGateway for Arc<G>
where
    G: InventoryGateway + ?Sized,
{
    async fn search(&self, query: &InventoryQuery) -> Result<Vec<Sku>, GatewayError> {
        (**self).search(query).await
    }
}

/// Run a lookup with a deadline; failures and timeouts yield an empty list.
pub async fn lookup_or_empty<G>(gateway: &G, query: &InventoryQuery, timeout: Duration) -> Vec<Sku>
where
    G: InventoryGateway + ?Sized,
{
    match tokio::time::timeout(timeout, gateway.search(query)).await {
        Ok(Ok(items)) => {
            debug!(count = items.len(), category = query.category.as_str(), "inventory lookup done");
            items
        }
        Ok(Err(err)) => {
            warn!(error = %err, "inventory lookup failed; treating as empty");
            Vec::new()
        }
        Err(_) => {
            warn!(error = %GatewayError::Timeout(timeout), "inventory lookup timed out; treating as empty");
            Vec::new()
        }
    }
}

/// Convert raw records, dropping (and logging) those that break SKU invariants.
pub fn decode_records(records: impl IntoIterator<Item = SkuRecord>) -> Vec<Sku> {
    records
        .into_iter()
        .filter_map(|record| match Sku::try_from(record) {
            Ok(sku) => Some(sku),
            Err(err) => {
                warn!(error = %GatewayError::InvalidRecord(err.to_string()), "dropping inventory record");
                None
            }
        })
        .collect()
}

/// In-memory catalog for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryInventoryGateway {
    items: RwLock<Vec<Sku>>,
}

impl InMemoryInventoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a list of SKUs, rejecting duplicate identifiers.
    pub fn with_items(items: impl IntoIterator<Item = Sku>) -> DomainResult<Self> {
        let gateway = Self::new();
        for sku in items {
            gateway.insert(sku)?;
        }
        Ok(gateway)
    }

    pub fn insert(&self, sku: Sku) -> DomainResult<()> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        if items.iter().any(|s| s.id_typed() == sku.id_typed()) {
            return Err(DomainError::conflict(format!(
                "sku {} already exists",
                sku.id_typed()
            )));
        }
        items.push(sku);
        Ok(())
    }

    /// Overwrite the available quantity of one SKU (stock moved elsewhere).
    pub fn set_available(&self, id: SkuId, available: u64) -> DomainResult<()> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let slot = items
            .iter_mut()
            .find(|s| s.id_typed() == id)
            .ok_or_else(|| DomainError::not_found(format!("sku {id}")))?;
        let updated = Sku::new(
            slot.id_typed(),
            slot.name(),
            slot.category(),
            slot.dimensions(),
            slot.units().to_vec(),
            available,
        )?;
        *slot = updated;
        Ok(())
    }

    /// Distinct display names across the catalog (sorted).
    pub fn names(&self) -> Vec<String> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        let mut seen = HashSet::new();
        let mut names: Vec<String> = items
            .iter()
            .filter(|s| seen.insert(s.name()))
            .map(|s| s.name().to_string())
            .collect();
        names.sort();
        names
    }
}

#[async_trait::async_trait]
impl InventoryGateway for InMemoryInventoryGateway {
    async fn search(&self, query: &InventoryQuery) -> Result<Vec<Sku>, GatewayError> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        let mut matched: Vec<&Sku> = items.iter().filter(|s| query.matches(s)).collect();
        matched.sort_by(|a, b| {
            a.name()
                .cmp(b.name())
                .then_with(|| a.id_typed().cmp(&b.id_typed()))
        });
        Ok(matched
            .into_iter()
            .skip(query.page.offset())
            .take(query.page.size as usize)
            .cloned()
            .collect())
    }
}
