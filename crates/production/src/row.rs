//! Line rows and their stable keys.

use serde::{Deserialize, Serialize};

use lumberyard_core::SkuId;
use lumberyard_inventory::{Constraints, Dimensions};

/// Which side of the production event a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineList {
    Consumed,
    Produced,
}

impl LineList {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineList::Consumed => "consumed",
            LineList::Produced => "produced",
        }
    }
}

/// Identifies one row's ephemeral state for the lifetime of a form.
///
/// Indices are slots handed out by [`RowArena`]; they are never renumbered
/// when other rows are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey {
    pub list: LineList,
    pub index: usize,
}

impl RowKey {
    pub fn new(list: LineList, index: usize) -> Self {
        Self { list, index }
    }
}

impl core::fmt::Display for RowKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}[{}]", self.list.as_str(), self.index)
    }
}

/// One editable entry in the consumed or produced list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineRow {
    /// Display name; dimensioned goods only (first-stage filter).
    pub name: Option<String>,
    /// Resolved SKU. Empty until uniquely resolved (or directly chosen).
    pub sku_id: Option<SkuId>,
    pub thickness: Option<u32>,
    pub width: Option<u32>,
    pub length: Option<u32>,
    pub unit: Option<String>,
    pub amount: Option<u64>,
    /// Read-only dimensions shown for a directly chosen simple good.
    pub display_dimensions: Option<Dimensions>,
}

impl LineRow {
    pub fn blank() -> Self {
        Self::default()
    }

    /// Minimal row carrying only an already known SKU and amount.
    pub fn resolved(sku_id: SkuId, amount: u64) -> Self {
        Self {
            sku_id: Some(sku_id),
            amount: Some(amount),
            ..Self::default()
        }
    }

    /// Rows entered by name go through the dimension cascade.
    pub fn is_dimensioned(&self) -> bool {
        self.name.is_some()
    }

    /// A row can be submitted once it names a SKU and a positive amount.
    pub fn is_submittable(&self) -> bool {
        self.sku_id.is_some() && self.amount.is_some_and(|a| a > 0)
    }

    /// Resolver input for the row as it currently stands.
    pub fn constraints(&self) -> Constraints {
        Constraints {
            thickness: self.thickness,
            width: self.width,
            length: self.length,
            min_available: self.amount,
        }
    }
}

/// Ordered rows of one list, each in a stable slot.
#[derive(Debug, Clone)]
pub struct RowArena {
    list: LineList,
    rows: Vec<(usize, LineRow)>,
    next_index: usize,
}

impl RowArena {
    pub fn new(list: LineList) -> Self {
        Self {
            list,
            rows: Vec::new(),
            next_index: 0,
        }
    }

    pub fn with_rows(list: LineList, rows: impl IntoIterator<Item = LineRow>) -> Self {
        let mut arena = Self::new(list);
        for row in rows {
            arena.push(row);
        }
        arena
    }

    pub fn list(&self) -> LineList {
        self.list
    }

    /// Append a row and return its key. Slots are never reused.
    pub fn push(&mut self, row: LineRow) -> RowKey {
        let index = self.next_index;
        self.next_index += 1;
        self.rows.push((index, row));
        RowKey::new(self.list, index)
    }

    pub fn get(&self, key: RowKey) -> Option<&LineRow> {
        if key.list != self.list {
            return None;
        }
        self.rows
            .iter()
            .find(|(index, _)| *index == key.index)
            .map(|(_, row)| row)
    }

    pub fn get_mut(&mut self, key: RowKey) -> Option<&mut LineRow> {
        if key.list != self.list {
            return None;
        }
        self.rows
            .iter_mut()
            .find(|(index, _)| *index == key.index)
            .map(|(_, row)| row)
    }

    pub fn remove(&mut self, key: RowKey) -> Option<LineRow> {
        if key.list != self.list {
            return None;
        }
        let position = self.rows.iter().position(|(index, _)| *index == key.index)?;
        Some(self.rows.remove(position).1)
    }

    /// Key of the row at `position` in display order.
    pub fn key_at(&self, position: usize) -> Option<RowKey> {
        self.rows
            .get(position)
            .map(|(index, _)| RowKey::new(self.list, *index))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RowKey, &LineRow)> {
        self.rows
            .iter()
            .map(|(index, row)| (RowKey::new(self.list, *index), row))
    }

    /// Rows in display order, without keys.
    pub fn rows(&self) -> Vec<LineRow> {
        self.rows.iter().map(|(_, row)| row.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removing_a_row_keeps_other_keys_stable() {
        let mut arena = RowArena::new(LineList::Consumed);
        let a = arena.push(LineRow::blank());
        let b = arena.push(LineRow::blank());
        let c = arena.push(LineRow::blank());

        arena.remove(b).unwrap();

        assert!(arena.get(a).is_some());
        assert!(arena.get(b).is_none());
        assert!(arena.get(c).is_some());
        assert_eq!(arena.key_at(1), Some(c));
    }

    #[test]
    fn slots_are_not_reused_after_removal() {
        let mut arena = RowArena::new(LineList::Produced);
        let a = arena.push(LineRow::blank());
        arena.remove(a).unwrap();
        let b = arena.push(LineRow::blank());
        assert_ne!(a, b);
    }

    #[test]
    fn keys_from_the_other_list_are_not_found() {
        let mut arena = RowArena::new(LineList::Produced);
        arena.push(LineRow::blank());
        assert!(arena.get(RowKey::new(LineList::Consumed, 0)).is_none());
    }

    #[test]
    fn submittable_requires_sku_and_positive_amount() {
        let id = SkuId::new();
        assert!(LineRow::resolved(id, 3).is_submittable());
        assert!(!LineRow::resolved(id, 0).is_submittable());

        let mut no_amount = LineRow::resolved(id, 1);
        no_amount.amount = None;
        assert!(!no_amount.is_submittable());
        assert!(!LineRow::blank().is_submittable());
    }

    #[test]
    fn row_key_display() {
        assert_eq!(RowKey::new(LineList::Consumed, 4).to_string(), "consumed[4]");
    }
}
