use serde::{Deserialize, Serialize};

use lumberyard_core::{DomainError, DomainResult, Entity, SkuId, ValueObject};

/// Product category of a SKU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    /// Goods whose identity depends on thickness/width/length (e.g. sawn wood).
    Dimensioned,
    /// Goods identified by name alone (fasteners, glue, finished items).
    Simple,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Dimensioned => "dimensioned",
            ProductCategory::Simple => "simple",
        }
    }
}

/// Thickness x width x length, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub thickness: u32,
    pub width: u32,
    pub length: u32,
}

impl Dimensions {
    pub fn new(thickness: u32, width: u32, length: u32) -> DomainResult<Self> {
        if thickness == 0 || width == 0 || length == 0 {
            return Err(DomainError::validation("dimensions must be positive"));
        }
        Ok(Self {
            thickness,
            width,
            length,
        })
    }
}

impl ValueObject for Dimensions {}

impl core::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}x{}", self.thickness, self.width, self.length)
    }
}

/// Raw SKU record as returned by the inventory lookup.
///
/// Dimension fields are independently optional on the wire; converting into
/// [`Sku`] enforces the all-or-nothing rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuRecord {
    pub id: SkuId,
    pub name: String,
    pub category: ProductCategory,
    #[serde(default)]
    pub thickness: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub length: Option<u32>,
    pub units: Vec<String>,
    pub available_quantity: u64,
}

/// One exact, stockable inventory item (a warehouse product).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SkuRecord", into = "SkuRecord")]
pub struct Sku {
    id: SkuId,
    name: String,
    category: ProductCategory,
    dimensions: Option<Dimensions>,
    units: Vec<String>,
    available: u64,
}

impl Sku {
    /// Build a validated SKU.
    ///
    /// Rejects blank names, empty unit lists, and dimensioned goods without a
    /// dimension triple.
    pub fn new(
        id: SkuId,
        name: impl Into<String>,
        category: ProductCategory,
        dimensions: Option<Dimensions>,
        units: Vec<String>,
        available: u64,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if units.is_empty() {
            return Err(DomainError::invariant(format!(
                "sku {id} must be countable in at least one unit"
            )));
        }
        if category == ProductCategory::Dimensioned && dimensions.is_none() {
            return Err(DomainError::invariant(format!(
                "dimensioned sku {id} is missing its dimensions"
            )));
        }
        Ok(Self {
            id,
            name,
            category,
            dimensions,
            units,
            available,
        })
    }

    /// Shorthand for a dimensioned good.
    pub fn dimensioned(
        id: SkuId,
        name: impl Into<String>,
        dimensions: Dimensions,
        units: Vec<String>,
        available: u64,
    ) -> DomainResult<Self> {
        Self::new(
            id,
            name,
            ProductCategory::Dimensioned,
            Some(dimensions),
            units,
            available,
        )
    }

    /// Shorthand for a simple good without dimensions.
    pub fn simple(
        id: SkuId,
        name: impl Into<String>,
        units: Vec<String>,
        available: u64,
    ) -> DomainResult<Self> {
        Self::new(id, name, ProductCategory::Simple, None, units, available)
    }

    pub fn id_typed(&self) -> SkuId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> ProductCategory {
        self.category
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        self.dimensions
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    /// The unit a freshly resolved row defaults to.
    pub fn first_unit(&self) -> &str {
        // Non-empty by construction.
        self.units.first().map(String::as_str).unwrap_or_default()
    }

    pub fn available(&self) -> u64 {
        self.available
    }
}

impl Entity for Sku {
    type Id = SkuId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TryFrom<SkuRecord> for Sku {
    type Error = DomainError;

    fn try_from(record: SkuRecord) -> Result<Self, Self::Error> {
        let dimensions = match (record.thickness, record.width, record.length) {
            (Some(t), Some(w), Some(l)) => Some(Dimensions::new(t, w, l)?),
            (None, None, None) => None,
            _ => {
                return Err(DomainError::invariant(format!(
                    "sku {} has a partial dimension triple",
                    record.id
                )));
            }
        };
        Sku::new(
            record.id,
            record.name,
            record.category,
            dimensions,
            record.units,
            record.available_quantity,
        )
    }
}

impl From<Sku> for SkuRecord {
    fn from(sku: Sku) -> Self {
        let dims = sku.dimensions;
        Self {
            id: sku.id,
            name: sku.name,
            category: sku.category,
            thickness: dims.map(|d| d.thickness),
            width: dims.map(|d| d.width),
            length: dims.map(|d| d.length),
            units: sku.units,
            available_quantity: sku.available,
        }
    }
}
