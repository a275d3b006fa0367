//! Production transaction composer.
//!
//! Owns one open form (consumed + produced rows, optional store) and the
//! per-row lookup state. Handlers take `&self`: form and store sit behind
//! mutexes that are never held across an `.await`, so lookups for different
//! rows can be in flight at the same time. Lock order is form, then store.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use lumberyard_core::{DomainError, SkuId, StoreId, TransactionId};
use lumberyard_inventory::{
    DimensionOptions, InventoryGateway, InventoryQuery, Page, ProductCategory, Resolution, Sku,
    lookup_or_empty,
};

use crate::assembler::{AssemblyError, assemble};
use crate::config::ComposerConfig;
use crate::controller::{self, Transition};
use crate::error::{ComposerError, ComposerResult};
use crate::hydrator::hydrate;
use crate::persistence::TransactionSink;
use crate::row::{LineList, LineRow, RowArena, RowKey};
use crate::store::{LookupKind, LookupOutcome, LookupTicket, RowStateStore};
use crate::transaction::ProductionTransaction;

/// Whether submit creates a new transaction or overwrites an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerMode {
    Create,
    Edit(TransactionId),
}

#[derive(Debug)]
struct FormState {
    store_id: Option<StoreId>,
    consumed: RowArena,
    produced: RowArena,
}

impl FormState {
    fn blank() -> Self {
        Self::with_rows(None, vec![LineRow::blank()], vec![LineRow::blank()])
    }

    fn with_rows(store_id: Option<StoreId>, consumed: Vec<LineRow>, produced: Vec<LineRow>) -> Self {
        Self {
            store_id,
            consumed: RowArena::with_rows(LineList::Consumed, consumed),
            produced: RowArena::with_rows(LineList::Produced, produced),
        }
    }

    fn arena(&self, list: LineList) -> &RowArena {
        match list {
            LineList::Consumed => &self.consumed,
            LineList::Produced => &self.produced,
        }
    }

    fn arena_mut(&mut self, list: LineList) -> &mut RowArena {
        match list {
            LineList::Consumed => &mut self.consumed,
            LineList::Produced => &mut self.produced,
        }
    }

    fn row(&self, key: RowKey) -> ComposerResult<&LineRow> {
        self.arena(key.list)
            .get(key)
            .ok_or(ComposerError::UnknownRow(key))
    }

    fn row_mut(&mut self, key: RowKey) -> ComposerResult<&mut LineRow> {
        self.arena_mut(key.list)
            .get_mut(key)
            .ok_or(ComposerError::UnknownRow(key))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears a lookup's loading flag however the lookup ends: applied,
/// superseded during debounce, or dropped mid-flight.
struct LookupGuard<'a> {
    store: &'a Mutex<RowStateStore>,
    ticket: Option<LookupTicket>,
}

impl<'a> LookupGuard<'a> {
    fn begin(store: &'a Mutex<RowStateStore>, key: RowKey, kind: LookupKind) -> Self {
        let ticket = lock(store).begin(key, kind);
        Self {
            store,
            ticket: Some(ticket),
        }
    }

    fn is_current(&self) -> bool {
        self.ticket
            .as_ref()
            .is_some_and(|t| lock(self.store).is_current(t))
    }

    fn finish(mut self, items: Vec<Sku>) -> LookupOutcome {
        match self.ticket.take() {
            Some(ticket) => lock(self.store).finish(ticket, items),
            None => LookupOutcome::Superseded,
        }
    }
}

impl Drop for LookupGuard<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            lock(self.store).abandon(ticket);
        }
    }
}

pub struct ProductionComposer<G, S> {
    gateway: G,
    sink: S,
    config: ComposerConfig,
    mode: ComposerMode,
    form: Mutex<FormState>,
    rows: Mutex<RowStateStore>,
}

impl<G, S> ProductionComposer<G, S>
where
    G: InventoryGateway,
    S: TransactionSink,
{
    /// Blank form for a new transaction: one empty row per side.
    pub fn new(gateway: G, sink: S, config: ComposerConfig) -> Self {
        Self {
            gateway,
            sink,
            config,
            mode: ComposerMode::Create,
            form: Mutex::new(FormState::blank()),
            rows: Mutex::new(RowStateStore::new()),
        }
    }

    /// Form pre-filled from a persisted transaction.
    pub fn for_edit(gateway: G, sink: S, config: ComposerConfig, transaction: &ProductionTransaction) -> Self {
        let hydrated = hydrate(&transaction.items);
        debug!(
            transaction = %transaction.id,
            consumed = hydrated.consumed.len(),
            produced = hydrated.produced.len(),
            "form hydrated for edit"
        );
        Self {
            gateway,
            sink,
            config,
            mode: ComposerMode::Edit(transaction.id),
            form: Mutex::new(FormState::with_rows(
                transaction.store_id,
                hydrated.consumed,
                hydrated.produced,
            )),
            rows: Mutex::new(RowStateStore::new()),
        }
    }

    pub fn mode(&self) -> ComposerMode {
        self.mode
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn store_id(&self) -> Option<StoreId> {
        lock(&self.form).store_id
    }

    pub fn set_store(&self, store_id: Option<StoreId>) {
        lock(&self.form).store_id = store_id;
    }

    pub fn add_row(&self, list: LineList) -> RowKey {
        lock(&self.form).arena_mut(list).push(LineRow::blank())
    }

    /// Remove a row before submit. Its cached lookups are dropped with it.
    pub fn remove_row(&self, key: RowKey) -> ComposerResult<LineRow> {
        let mut form = lock(&self.form);
        let row = form
            .arena_mut(key.list)
            .remove(key)
            .ok_or(ComposerError::UnknownRow(key))?;
        lock(&self.rows).remove(key);
        Ok(row)
    }

    pub fn row(&self, key: RowKey) -> Option<LineRow> {
        lock(&self.form).arena(key.list).get(key).cloned()
    }

    /// Rows of one list in display order.
    pub fn rows(&self, list: LineList) -> Vec<(RowKey, LineRow)> {
        lock(&self.form)
            .arena(list)
            .iter()
            .map(|(key, row)| (key, row.clone()))
            .collect()
    }

    pub fn is_loading(&self, key: RowKey) -> bool {
        lock(&self.rows).is_loading(key)
    }

    pub fn search_results(&self, key: RowKey) -> Vec<Sku> {
        lock(&self.rows).search_results(key).to_vec()
    }

    pub fn name_options(&self, key: RowKey) -> Vec<String> {
        lock(&self.rows).name_options(key)
    }

    pub fn variant_pool(&self, key: RowKey) -> Vec<Sku> {
        lock(&self.rows).pool(key).to_vec()
    }

    /// Option lists for the row's thickness/width/length selects.
    pub fn options(&self, key: RowKey) -> ComposerResult<DimensionOptions> {
        let form = lock(&self.form);
        let row = form.row(key)?;
        let rows = lock(&self.rows);
        Ok(controller::options(row, rows.pool(key)))
    }

    /// Free-text name discovery for a dimensioned row (debounced).
    pub async fn search_names(&self, key: RowKey, text: &str) -> ComposerResult<LookupOutcome> {
        self.search(key, ProductCategory::Dimensioned, text).await
    }

    /// Free-text product search for a simple-goods row (debounced).
    pub async fn search_products(&self, key: RowKey, text: &str) -> ComposerResult<LookupOutcome> {
        self.search(key, ProductCategory::Simple, text).await
    }

    async fn search(
        &self,
        key: RowKey,
        category: ProductCategory,
        text: &str,
    ) -> ComposerResult<LookupOutcome> {
        lock(&self.form).row(key)?;
        let guard = LookupGuard::begin(&self.rows, key, LookupKind::Search);

        tokio::time::sleep(self.config.search_debounce).await;
        if !guard.is_current() {
            debug!(row = %key, "search superseded during debounce");
            return Ok(LookupOutcome::Superseded);
        }

        let query = InventoryQuery::text_search(category, text, Page::first(self.config.search_page_size));
        let items = lookup_or_empty(&self.gateway, &query, self.config.lookup_timeout).await;
        Ok(guard.finish(items))
    }

    /// Commit a dimensioned row to a display name and fetch its variant pool.
    ///
    /// The row's SKU, dimensions and unit are cleared before the fetch starts.
    pub async fn select_name(&self, key: RowKey, name: &str) -> ComposerResult<LookupOutcome> {
        {
            let mut form = lock(&self.form);
            let row = form.row_mut(key)?;
            *row = controller::select_name(row, name);
        }
        let guard = LookupGuard::begin(&self.rows, key, LookupKind::VariantPool);

        let query = InventoryQuery::variant_pool(name, Page::first(self.config.pool_page_size));
        let pool = lookup_or_empty(&self.gateway, &query, self.config.lookup_timeout).await;
        let size = pool.len();
        let outcome = guard.finish(pool);
        debug!(row = %key, name, size, ?outcome, "variant pool fetched");
        Ok(outcome)
    }

    pub fn select_thickness(&self, key: RowKey, thickness: u32) -> ComposerResult<Resolution> {
        self.transition(key, |row, pool| controller::select_thickness(row, pool, thickness))
            .map(resolved)
    }

    pub fn select_width(&self, key: RowKey, width: u32) -> ComposerResult<Resolution> {
        self.transition(key, |row, pool| controller::select_width(row, pool, width))
            .map(resolved)
    }

    pub fn select_length(&self, key: RowKey, length: u32) -> ComposerResult<Resolution> {
        self.transition(key, |row, pool| controller::select_length(row, pool, length))
            .map(resolved)
    }

    /// Set the requested amount. Returns the new resolution for dimensioned
    /// rows, `None` for simple goods.
    pub fn set_amount(&self, key: RowKey, amount: u64) -> ComposerResult<Option<Resolution>> {
        if amount == 0 {
            return Err(DomainError::validation("amount must be a positive integer").into());
        }
        self.transition(key, |row, pool| controller::change_amount(row, pool, amount))
    }

    pub fn set_unit(&self, key: RowKey, unit: &str) -> ComposerResult<()> {
        if unit.trim().is_empty() {
            return Err(DomainError::validation("unit cannot be empty").into());
        }
        let mut form = lock(&self.form);
        let row = form.row_mut(key)?;
        *row = controller::select_unit(row, unit);
        Ok(())
    }

    /// Pick a simple good from the row's current search results.
    pub fn select_product(&self, key: RowKey, sku_id: SkuId) -> ComposerResult<()> {
        let mut form = lock(&self.form);
        let row = form.row_mut(key)?;
        let rows = lock(&self.rows);
        let sku = rows
            .search_results(key)
            .iter()
            .find(|s| s.id_typed() == sku_id)
            .ok_or_else(|| DomainError::not_found(format!("sku {sku_id} in results of {key}")))?;
        *row = controller::select_product(row, sku);
        Ok(())
    }

    fn transition<F>(&self, key: RowKey, f: F) -> ComposerResult<Option<Resolution>>
    where
        F: FnOnce(&LineRow, &[Sku]) -> Transition,
    {
        let mut form = lock(&self.form);
        let row = form.row_mut(key)?;
        let rows = lock(&self.rows);
        let Transition { row: next, resolution } = f(row, rows.pool(key));
        *row = next;
        if let Some(resolution) = &resolution {
            debug!(row = %key, ?resolution, "row re-resolved");
        }
        Ok(resolution)
    }

    /// Validate the form and hand the payload to the persistence collaborator.
    ///
    /// Reads the rows as they are right now; pending lookups are not awaited.
    /// Incomplete rows block the submit without any call going out. On a
    /// persistence failure the form is left untouched for a retry. A created
    /// transaction resets the form; an edited one keeps it.
    pub async fn submit(&self) -> ComposerResult<TransactionId> {
        let payload = {
            let form = lock(&self.form);
            assemble(&form.consumed.rows(), &form.produced.rows(), form.store_id).map_err(
                |AssemblyError::Unresolved { rows }| ComposerError::Incomplete {
                    rows: rows
                        .iter()
                        .filter_map(|p| form.arena(p.list).key_at(p.position))
                        .collect(),
                },
            )
        };
        let payload = match payload {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "submit blocked by incomplete rows");
                return Err(err);
            }
        };

        let result = match self.mode {
            ComposerMode::Create => self.sink.create(&payload).await,
            ComposerMode::Edit(id) => self.sink.update(id, &payload).await.map(|()| id),
        };
        match result {
            Ok(id) => {
                info!(transaction = %id, items = payload.items.len(), mode = ?self.mode, "production transaction saved");
                if self.mode == ComposerMode::Create {
                    self.reset();
                }
                Ok(id)
            }
            Err(err) => {
                warn!(error = %err, "production transaction not saved; form kept");
                Err(err.into())
            }
        }
    }

    /// Back to one blank row per side; all row caches are dropped.
    pub fn reset(&self) {
        let mut form = lock(&self.form);
        *form = FormState::blank();
        lock(&self.rows).clear();
    }
}

fn resolved(resolution: Option<Resolution>) -> Resolution {
    // Dimension handlers always consult the resolver.
    resolution.unwrap_or(Resolution::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::InMemoryTransactionSink;
    use lumberyard_inventory::{Dimensions, InMemoryInventoryGateway};
    use std::sync::Arc;

    fn board(t: u32, w: u32, qty: u64) -> Sku {
        Sku::dimensioned(
            SkuId::new(),
            "Pine Board",
            Dimensions::new(t, w, 2000).unwrap(),
            vec!["pcs".into()],
            qty,
        )
        .unwrap()
    }

    fn composer(items: Vec<Sku>) -> ProductionComposer<InMemoryInventoryGateway, Arc<InMemoryTransactionSink>> {
        let gateway = InMemoryInventoryGateway::with_items(items).unwrap();
        let config = ComposerConfig::default().with_search_debounce(std::time::Duration::ZERO);
        ProductionComposer::new(gateway, Arc::new(InMemoryTransactionSink::new()), config)
    }

    #[test]
    fn new_form_has_one_blank_row_per_side() {
        let c = composer(vec![]);
        assert_eq!(c.rows(LineList::Consumed).len(), 1);
        assert_eq!(c.rows(LineList::Produced).len(), 1);
        assert_eq!(c.mode(), ComposerMode::Create);
    }

    #[test]
    fn handlers_reject_unknown_rows() {
        let c = composer(vec![]);
        let ghost = RowKey::new(LineList::Consumed, 42);
        assert_eq!(c.select_thickness(ghost, 20), Err(ComposerError::UnknownRow(ghost)));
        assert!(c.remove_row(ghost).is_err());
    }

    #[test]
    fn zero_amount_is_rejected() {
        let c = composer(vec![]);
        let key = c.rows(LineList::Consumed)[0].0;
        assert!(matches!(c.set_amount(key, 0), Err(ComposerError::Domain(DomainError::Validation(_)))));
    }

    #[tokio::test]
    async fn name_selection_loads_pool_and_clears_loading() {
        let c = composer(vec![board(20, 100, 5), board(25, 100, 5)]);
        let key = c.rows(LineList::Consumed)[0].0;

        let outcome = c.select_name(key, "Pine Board").await.unwrap();
        assert_eq!(outcome, LookupOutcome::Applied);
        assert!(!c.is_loading(key));
        assert_eq!(c.variant_pool(key).len(), 2);
        assert_eq!(c.options(key).unwrap().thickness, vec![20, 25]);
    }

    #[tokio::test]
    async fn removed_row_drops_its_cache() {
        let c = composer(vec![board(20, 100, 5)]);
        let key = c.add_row(LineList::Produced);
        c.select_name(key, "Pine Board").await.unwrap();
        c.remove_row(key).unwrap();
        assert!(c.variant_pool(key).is_empty());
        assert!(c.row(key).is_none());
    }

    #[tokio::test]
    async fn incomplete_rows_are_reported_by_key() {
        let c = composer(vec![]);
        let extra = c.add_row(LineList::Produced);
        let err = c.submit().await.unwrap_err();
        match err {
            ComposerError::Incomplete { rows } => {
                assert_eq!(rows.len(), 3);
                assert!(rows.contains(&extra));
            }
            other => panic!("expected Incomplete, got {other:?}"),
        }
    }
}
