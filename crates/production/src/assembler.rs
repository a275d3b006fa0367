//! Transaction assembly: two row lists in, one typed item list out.

use thiserror::Error;

use lumberyard_core::StoreId;

use crate::row::{LineList, LineRow};
use crate::transaction::{ItemType, TransactionItem, TransactionPayload};

/// Position of a row within its list (display order).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowPosition {
    pub list: LineList,
    pub position: usize,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    /// At least one row has no resolved SKU or no positive amount.
    #[error("{} row(s) are incomplete", .rows.len())]
    Unresolved { rows: Vec<RowPosition> },
}

/// Merge consumed and produced rows into a submission payload.
///
/// All-or-nothing: if any row in either list is incomplete, no payload is
/// produced and every incomplete row is reported. Consumed rows come first,
/// tagged [`ItemType::In`], then produced rows tagged [`ItemType::Out`].
pub fn assemble(
    consumed: &[LineRow],
    produced: &[LineRow],
    store_id: Option<StoreId>,
) -> Result<TransactionPayload, AssemblyError> {
    let tagged = consumed
        .iter()
        .enumerate()
        .map(|(position, row)| (LineList::Consumed, position, row))
        .chain(
            produced
                .iter()
                .enumerate()
                .map(|(position, row)| (LineList::Produced, position, row)),
        );

    let mut items = Vec::with_capacity(consumed.len() + produced.len());
    let mut incomplete = Vec::new();
    for (list, position, row) in tagged {
        match (row.sku_id, row.amount) {
            (Some(product_id), Some(amount)) if amount > 0 => items.push(TransactionItem {
                product_id,
                item_type: ItemType::from(list),
                amount,
            }),
            _ => incomplete.push(RowPosition { list, position }),
        }
    }

    if !incomplete.is_empty() {
        return Err(AssemblyError::Unresolved { rows: incomplete });
    }
    Ok(TransactionPayload { store_id, items })
}
