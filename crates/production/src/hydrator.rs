//! Edit-mode hydration: a persisted item list back into two row lists.

use crate::row::LineRow;
use crate::transaction::{ItemType, TransactionItem};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydratedRows {
    pub consumed: Vec<LineRow>,
    pub produced: Vec<LineRow>,
}

/// Split items by type into consumed/produced rows.
///
/// Rows carry only the SKU id and amount; name, dimensions and unit stay blank
/// and the SKU id is kept verbatim, so an untouched row re-submits unchanged.
/// Legacy `waste` items fold into the produced side. An empty side gets one
/// blank row so the form always offers a line to edit.
pub fn hydrate(items: &[TransactionItem]) -> HydratedRows {
    let mut consumed = Vec::new();
    let mut produced = Vec::new();
    for item in items {
        let row = LineRow::resolved(item.product_id, item.amount);
        match item.item_type {
            ItemType::In => consumed.push(row),
            ItemType::Out | ItemType::Waste => produced.push(row),
        }
    }
    for side in [&mut consumed, &mut produced] {
        if side.is_empty() {
            side.push(LineRow::blank());
        }
    }
    HydratedRows { consumed, produced }
}
