//! Variant candidate resolution.
//!
//! Given every SKU that shares a display name (the variant pool) and the
//! dimensions/amount the operator has filled in so far, narrow the pool down
//! and decide whether exactly one SKU is meant.
//!
//! Everything here is pure: same pool + same constraints = same answer.

use std::collections::BTreeSet;

use lumberyard_core::SkuId;

use crate::sku::{Dimensions, Sku};

/// Partial constraint set. `None` fields impose no filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Constraints {
    pub thickness: Option<u32>,
    pub width: Option<u32>,
    pub length: Option<u32>,
    /// Requested amount; SKUs with less stock are excluded.
    pub min_available: Option<u64>,
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thickness(mut self, thickness: u32) -> Self {
        self.thickness = Some(thickness);
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_min_available(mut self, amount: u64) -> Self {
        self.min_available = Some(amount);
        self
    }

    /// Dimension and stock criteria are checked together, so a SKU that is
    /// the only dimensional match but is under-stocked is simply not a match.
    pub fn matches(&self, sku: &Sku) -> bool {
        self.matches_shape(sku.dimensions())
            && self.min_available.is_none_or(|min| sku.available() >= min)
    }

    fn matches_shape(&self, dims: Option<Dimensions>) -> bool {
        let specified = [self.thickness, self.width, self.length];
        let Some(d) = dims else {
            return specified.iter().all(Option::is_none);
        };
        self.thickness.is_none_or(|t| d.thickness == t)
            && self.width.is_none_or(|w| d.width == w)
            && self.length.is_none_or(|l| d.length == l)
    }
}

/// Outcome of narrowing a variant pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one candidate: its id and the unit a row should default to.
    Unique { sku_id: SkuId, unit: String },
    /// More than one candidate; more input is needed.
    Ambiguous { candidates: usize },
    /// Nothing matches (including an under-stocked single match).
    Empty,
}

impl Resolution {
    pub fn sku_id(&self) -> Option<SkuId> {
        match self {
            Resolution::Unique { sku_id, .. } => Some(*sku_id),
            _ => None,
        }
    }

    pub fn is_unique(&self) -> bool {
        matches!(self, Resolution::Unique { .. })
    }
}

/// The subset of a pool that satisfies a constraint set, in pool order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidates<'a> {
    items: Vec<&'a Sku>,
}

impl<'a> Candidates<'a> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Sku> + '_ {
        self.items.iter().copied()
    }

    pub fn ids(&self) -> Vec<SkuId> {
        self.items.iter().map(|s| s.id_typed()).collect()
    }

    pub fn resolution(&self) -> Resolution {
        match self.items.as_slice() {
            [] => Resolution::Empty,
            [only] => Resolution::Unique {
                sku_id: only.id_typed(),
                unit: only.first_unit().to_string(),
            },
            many => Resolution::Ambiguous {
                candidates: many.len(),
            },
        }
    }
}

/// Narrow `pool` to the SKUs matching every specified constraint.
pub fn resolve<'a>(pool: &'a [Sku], constraints: &Constraints) -> Candidates<'a> {
    Candidates {
        items: pool.iter().filter(|s| constraints.matches(s)).collect(),
    }
}

fn distinct<F>(pool: &[Sku], filter: &Constraints, pick: F) -> Vec<u32>
where
    F: Fn(&Dimensions) -> u32,
{
    pool.iter()
        .filter(|s| filter.matches_shape(s.dimensions()))
        .filter_map(|s| s.dimensions().map(|d| pick(&d)))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct thicknesses across the whole pool, ascending.
pub fn thickness_options(pool: &[Sku]) -> Vec<u32> {
    distinct(pool, &Constraints::new(), |d| d.thickness)
}

/// Distinct widths among entries with the chosen thickness (or all entries).
pub fn width_options(pool: &[Sku], thickness: Option<u32>) -> Vec<u32> {
    let filter = Constraints {
        thickness,
        ..Constraints::default()
    };
    distinct(pool, &filter, |d| d.width)
}

/// Distinct lengths among entries with the chosen thickness and width.
pub fn length_options(pool: &[Sku], thickness: Option<u32>, width: Option<u32>) -> Vec<u32> {
    let filter = Constraints {
        thickness,
        width,
        ..Constraints::default()
    };
    distinct(pool, &filter, |d| d.length)
}

/// Option lists for the three cascading dimension selects of one row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionOptions {
    pub thickness: Vec<u32>,
    pub width: Vec<u32>,
    pub length: Vec<u32>,
}

impl DimensionOptions {
    pub fn derive(pool: &[Sku], thickness: Option<u32>, width: Option<u32>) -> Self {
        Self {
            thickness: thickness_options(pool),
            width: width_options(pool, thickness),
            length: length_options(pool, thickness, width),
        }
    }
}
