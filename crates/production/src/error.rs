//! Composer error model.

use thiserror::Error;

use lumberyard_core::DomainError;

use crate::persistence::PersistenceError;
use crate::row::RowKey;

pub type ComposerResult<T> = Result<T, ComposerError>;

/// Errors surfaced to the form.
///
/// Only [`ComposerError::Incomplete`] and [`ComposerError::Persistence`] come
/// out of a submit. Lookup failures never appear here: they degrade to empty
/// results inside the composer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComposerError {
    /// The key does not name a row of the current form.
    #[error("unknown row {0}")]
    UnknownRow(RowKey),

    /// Submit blocked: these rows still lack a SKU or an amount.
    #[error("{} row(s) need a product and an amount", .rows.len())]
    Incomplete { rows: Vec<RowKey> },

    /// The persistence collaborator refused or failed; the form is unchanged.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
