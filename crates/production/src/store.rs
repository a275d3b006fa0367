//! Row State Store: per-row lookup caches.
//!
//! Every row key owns a slot holding its latest free-text search results, the
//! variant pool of the name it committed to, and which lookups are in flight.
//! Lookups are issued with a [`LookupTicket`] carrying a monotonically
//! increasing sequence number; a response is only applied if its ticket is
//! still the latest one issued for that row and lookup kind, so a slow early
//! response can never overwrite a faster later one.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use lumberyard_inventory::Sku;

use crate::row::RowKey;

/// The two independent lookups a row can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    /// Free-text search (simple goods, or name discovery for dimensioned goods).
    Search,
    /// Exact-name variant pool fetch.
    VariantPool,
}

impl LookupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupKind::Search => "search",
            LookupKind::VariantPool => "variant_pool",
        }
    }
}

/// Proof of having issued a lookup; redeem it to apply the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTicket {
    pub key: RowKey,
    pub kind: LookupKind,
    pub seq: u64,
}

/// Whether a lookup's response made it into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Applied,
    /// A newer lookup for the same row was issued, or the row is gone.
    Superseded,
}

#[derive(Debug, Clone, Default)]
struct Pending {
    latest: Option<u64>,
    in_flight: bool,
}

#[derive(Debug, Clone, Default)]
struct RowSlot {
    search_results: Vec<Sku>,
    pool: Vec<Sku>,
    search: Pending,
    variant_pool: Pending,
}

impl RowSlot {
    fn pending(&self, kind: LookupKind) -> &Pending {
        match kind {
            LookupKind::Search => &self.search,
            LookupKind::VariantPool => &self.variant_pool,
        }
    }

    fn pending_mut(&mut self, kind: LookupKind) -> &mut Pending {
        match kind {
            LookupKind::Search => &mut self.search,
            LookupKind::VariantPool => &mut self.variant_pool,
        }
    }
}

#[derive(Debug, Default)]
pub struct RowStateStore {
    slots: HashMap<RowKey, RowSlot>,
    next_seq: u64,
}

impl RowStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new lookup for `key` and mark the row as loading.
    ///
    /// Starting a variant pool lookup discards the previous pool: the row has
    /// committed to a new name and the old pool no longer applies.
    pub fn begin(&mut self, key: RowKey, kind: LookupKind) -> LookupTicket {
        self.next_seq += 1;
        let seq = self.next_seq;
        let slot = self.slots.entry(key).or_default();
        if kind == LookupKind::VariantPool {
            slot.pool.clear();
        }
        let pending = slot.pending_mut(kind);
        pending.latest = Some(seq);
        pending.in_flight = true;
        debug!(row = %key, kind = kind.as_str(), seq, "lookup issued");
        LookupTicket { key, kind, seq }
    }

    /// Is `ticket` still the newest lookup of its kind for its row?
    pub fn is_current(&self, ticket: &LookupTicket) -> bool {
        self.slots
            .get(&ticket.key)
            .is_some_and(|slot| slot.pending(ticket.kind).latest == Some(ticket.seq))
    }

    /// Apply a lookup response if the ticket is still current.
    pub fn finish(&mut self, ticket: LookupTicket, items: Vec<Sku>) -> LookupOutcome {
        if !self.is_current(&ticket) {
            debug!(row = %ticket.key, kind = ticket.kind.as_str(), seq = ticket.seq, "stale lookup response dropped");
            return LookupOutcome::Superseded;
        }
        let Some(slot) = self.slots.get_mut(&ticket.key) else {
            return LookupOutcome::Superseded;
        };
        match ticket.kind {
            LookupKind::Search => slot.search_results = items,
            LookupKind::VariantPool => slot.pool = items,
        }
        slot.pending_mut(ticket.kind).in_flight = false;
        LookupOutcome::Applied
    }

    /// Clear the loading flag of a lookup that ended without a response
    /// (superseded during debounce, or its future was dropped).
    pub fn abandon(&mut self, ticket: LookupTicket) {
        if !self.is_current(&ticket) {
            return;
        }
        if let Some(slot) = self.slots.get_mut(&ticket.key) {
            slot.pending_mut(ticket.kind).in_flight = false;
        }
    }

    pub fn is_loading(&self, key: RowKey) -> bool {
        self.slots
            .get(&key)
            .is_some_and(|slot| slot.search.in_flight || slot.variant_pool.in_flight)
    }

    /// The row's variant pool (empty if none was fetched yet).
    pub fn pool(&self, key: RowKey) -> &[Sku] {
        self.slots.get(&key).map(|s| s.pool.as_slice()).unwrap_or_default()
    }

    pub fn search_results(&self, key: RowKey) -> &[Sku] {
        self.slots
            .get(&key)
            .map(|s| s.search_results.as_slice())
            .unwrap_or_default()
    }

    /// Distinct names among the row's search results, sorted.
    pub fn name_options(&self, key: RowKey) -> Vec<String> {
        self.search_results(key)
            .iter()
            .map(|s| s.name().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Drop a row's slot. In-flight responses for it become no-ops.
    pub fn remove(&mut self, key: RowKey) {
        self.slots.remove(&key);
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::LineList;
    use lumberyard_core::SkuId;
    use lumberyard_inventory::Dimensions;

    fn key(index: usize) -> RowKey {
        RowKey::new(LineList::Consumed, index)
    }

    fn board(name: &str, t: u32) -> Sku {
        Sku::dimensioned(
            SkuId::new(),
            name,
            Dimensions::new(t, 100, 2000).unwrap(),
            vec!["pcs".into()],
            10,
        )
        .unwrap()
    }

    #[test]
    fn begin_marks_loading_and_finish_clears_it() {
        let mut store = RowStateStore::new();
        let ticket = store.begin(key(0), LookupKind::VariantPool);
        assert!(store.is_loading(key(0)));

        let outcome = store.finish(ticket, vec![board("Pine", 20)]);
        assert_eq!(outcome, LookupOutcome::Applied);
        assert!(!store.is_loading(key(0)));
        assert_eq!(store.pool(key(0)).len(), 1);
    }

    #[test]
    fn late_response_of_older_lookup_is_dropped() {
        let mut store = RowStateStore::new();
        let first = store.begin(key(0), LookupKind::VariantPool);
        let second = store.begin(key(0), LookupKind::VariantPool);

        assert_eq!(store.finish(second, vec![board("Spruce", 20)]), LookupOutcome::Applied);
        assert_eq!(store.finish(first, vec![board("Pine", 20)]), LookupOutcome::Superseded);

        assert_eq!(store.pool(key(0))[0].name(), "Spruce");
        assert!(!store.is_loading(key(0)));
    }

    #[test]
    fn older_response_arriving_first_keeps_row_loading() {
        let mut store = RowStateStore::new();
        let first = store.begin(key(0), LookupKind::Search);
        let _second = store.begin(key(0), LookupKind::Search);

        assert_eq!(store.finish(first, vec![board("Pine", 20)]), LookupOutcome::Superseded);
        assert!(store.is_loading(key(0)));
        assert!(store.search_results(key(0)).is_empty());
    }

    #[test]
    fn rows_do_not_interfere() {
        let mut store = RowStateStore::new();
        let a = store.begin(key(0), LookupKind::VariantPool);
        let b = store.begin(RowKey::new(LineList::Produced, 0), LookupKind::VariantPool);

        store.finish(b, vec![board("Oak", 30)]);
        assert!(store.is_loading(key(0)));
        assert!(!store.is_loading(RowKey::new(LineList::Produced, 0)));

        store.finish(a, vec![board("Pine", 20)]);
        assert_eq!(store.pool(key(0))[0].name(), "Pine");
        assert_eq!(store.pool(RowKey::new(LineList::Produced, 0))[0].name(), "Oak");
    }

    #[test]
    fn search_and_pool_are_tracked_separately() {
        let mut store = RowStateStore::new();
        let search = store.begin(key(0), LookupKind::Search);
        let pool = store.begin(key(0), LookupKind::VariantPool);

        store.finish(pool, vec![board("Pine", 20)]);
        assert!(store.is_loading(key(0)), "search still in flight");
        store.finish(search, vec![board("Pine", 20), board("Pine", 25)]);
        assert!(!store.is_loading(key(0)));
    }

    #[test]
    fn new_pool_lookup_discards_old_pool() {
        let mut store = RowStateStore::new();
        let t = store.begin(key(0), LookupKind::VariantPool);
        store.finish(t, vec![board("Pine", 20)]);
        store.begin(key(0), LookupKind::VariantPool);
        assert!(store.pool(key(0)).is_empty());
    }

    #[test]
    fn response_for_removed_row_is_ignored() {
        let mut store = RowStateStore::new();
        let t = store.begin(key(2), LookupKind::Search);
        store.remove(key(2));
        assert_eq!(store.finish(t, vec![board("Pine", 20)]), LookupOutcome::Superseded);
        assert!(store.is_empty());
    }

    #[test]
    fn abandon_only_clears_the_current_lookup() {
        let mut store = RowStateStore::new();
        let old = store.begin(key(0), LookupKind::Search);
        let new = store.begin(key(0), LookupKind::Search);

        store.abandon(old);
        assert!(store.is_loading(key(0)));
        store.abandon(new);
        assert!(!store.is_loading(key(0)));
    }

    #[test]
    fn name_options_are_distinct_and_sorted() {
        let mut store = RowStateStore::new();
        let t = store.begin(key(0), LookupKind::Search);
        store.finish(t, vec![board("Spruce", 20), board("Pine", 20), board("Pine", 25)]);
        assert_eq!(store.name_options(key(0)), vec!["Pine", "Spruce"]);
    }
}
