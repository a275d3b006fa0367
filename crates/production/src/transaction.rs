//! Production transaction payloads and the persisted aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lumberyard_core::{SkuId, StoreId, TransactionId};

use crate::row::LineList;

/// Fixed item type stored with every transaction line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// Consumed by the production run.
    In,
    /// Produced by the production run.
    Out,
    /// Legacy waste outcome; only ever read back, never written.
    Waste,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::In => "in",
            ItemType::Out => "out",
            ItemType::Waste => "waste",
        }
    }
}

impl From<LineList> for ItemType {
    fn from(list: LineList) -> Self {
        match list {
            LineList::Consumed => ItemType::In,
            LineList::Produced => ItemType::Out,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionItem {
    pub product_id: SkuId,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub amount: u64,
}

/// What the persistence collaborator receives on create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    pub store_id: Option<StoreId>,
    pub items: Vec<TransactionItem>,
}

/// Persisted production transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionTransaction {
    pub id: TransactionId,
    pub store_id: Option<StoreId>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<TransactionItem>,
}

impl ProductionTransaction {
    pub fn from_payload(id: TransactionId, payload: TransactionPayload, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            store_id: payload.store_id,
            created_at,
            items: payload.items,
        }
    }
}
