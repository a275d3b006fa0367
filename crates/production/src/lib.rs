//! Production transaction composer.
//!
//! Records a manufacturing event: which inventory items were consumed and
//! which were produced. Dimensioned goods are entered by name and shape and
//! resolved to an exact SKU row by row; the finished form is assembled into a
//! flat, typed item list and handed to the persistence collaborator.
//!
//! Layers, leaf first:
//! - [`row`]: line rows, row keys and the per-list row arena.
//! - [`store`]: per-row lookup caches with stale-response sequencing.
//! - [`controller`]: pure field-change transitions (the cascade).
//! - [`assembler`] / [`hydrator`]: rows to payload and back.
//! - [`composer`]: async orchestration over the inventory gateway and sink.

pub mod assembler;
pub mod composer;
pub mod config;
pub mod controller;
pub mod error;
pub mod hydrator;
pub mod persistence;
pub mod row;
pub mod store;
pub mod transaction;

pub use assembler::{AssemblyError, RowPosition, assemble};
pub use composer::{ComposerMode, ProductionComposer};
pub use config::ComposerConfig;
pub use controller::Transition;
pub use error::{ComposerError, ComposerResult};
pub use hydrator::{HydratedRows, hydrate};
pub use persistence::{InMemoryTransactionSink, PersistenceError, TransactionSink};
pub use row::{LineList, LineRow, RowArena, RowKey};
pub use store::{LookupKind, LookupOutcome, LookupTicket, RowStateStore};
pub use transaction::{ItemType, ProductionTransaction, TransactionItem, TransactionPayload};
