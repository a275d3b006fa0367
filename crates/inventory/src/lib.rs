//! Inventory catalog module.
//!
//! This crate owns the SKU model, the contract of the inventory lookup
//! collaborator, and the pure candidate resolver that narrows a variant pool
//! down to one exact SKU.

pub mod gateway;
pub mod query;
pub mod resolver;
pub mod sku;

pub use gateway::{
    GatewayError, InMemoryInventoryGateway, InventoryGateway, decode_records, lookup_or_empty,
};
pub use query::{InventoryQuery, NameFilter, Page};
pub use resolver::{
    Candidates, Constraints, DimensionOptions, Resolution, length_options, resolve,
    thickness_options, width_options,
};
pub use sku::{Dimensions, ProductCategory, Sku, SkuRecord};
