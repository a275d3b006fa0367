//! Cascading field transitions.
//!
//! Each handler takes a row as it stands (plus the row's variant pool where
//! relevant) and returns the row as it should be afterwards together with the
//! resolver outcome. Nothing here mutates shared state; the composer applies
//! the returned row.
//!
//! Selection order is name -> thickness -> width -> length. Changing a field
//! clears every field after it. The amount narrows availability, not shape,
//! so it never clears dimensions.

use lumberyard_inventory::{Constraints, DimensionOptions, Resolution, Sku, resolve};

use crate::row::LineRow;

/// Result of one field change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub row: LineRow,
    /// `None` when the change does not involve the resolver (simple goods).
    pub resolution: Option<Resolution>,
}

/// Write a resolver outcome into a row.
///
/// A unique match sets the SKU and, if no unit was picked yet, defaults the
/// unit to the SKU's first one. Anything else clears the SKU.
pub fn apply_resolution(mut row: LineRow, resolution: &Resolution) -> LineRow {
    match resolution {
        Resolution::Unique { sku_id, unit } => {
            row.sku_id = Some(*sku_id);
            if row.unit.is_none() {
                row.unit = Some(unit.clone());
            }
        }
        Resolution::Ambiguous { .. } | Resolution::Empty => row.sku_id = None,
    }
    row
}

fn resolve_into(row: LineRow, pool: &[Sku], constraints: Constraints) -> Transition {
    let resolution = resolve(pool, &constraints).resolution();
    Transition {
        row: apply_resolution(row, &resolution),
        resolution: Some(resolution),
    }
}

/// The operator committed to a display name.
///
/// Everything derived from the previous name goes: SKU, dimensions and unit.
/// The caller is expected to fetch the new variant pool.
pub fn select_name(row: &LineRow, name: &str) -> LineRow {
    LineRow {
        name: Some(name.to_string()),
        sku_id: None,
        thickness: None,
        width: None,
        length: None,
        unit: None,
        display_dimensions: None,
        ..row.clone()
    }
}

pub fn select_thickness(row: &LineRow, pool: &[Sku], thickness: u32) -> Transition {
    let next = LineRow {
        thickness: Some(thickness),
        width: None,
        length: None,
        ..row.clone()
    };
    let constraints = Constraints {
        thickness: Some(thickness),
        min_available: next.amount,
        ..Constraints::default()
    };
    resolve_into(next, pool, constraints)
}

pub fn select_width(row: &LineRow, pool: &[Sku], width: u32) -> Transition {
    let next = LineRow {
        width: Some(width),
        length: None,
        ..row.clone()
    };
    let constraints = Constraints {
        thickness: next.thickness,
        width: Some(width),
        min_available: next.amount,
        ..Constraints::default()
    };
    resolve_into(next, pool, constraints)
}

pub fn select_length(row: &LineRow, pool: &[Sku], length: u32) -> Transition {
    let next = LineRow {
        length: Some(length),
        ..row.clone()
    };
    let constraints = next.constraints();
    resolve_into(next, pool, constraints)
}

/// Amount changed. Dimensioned rows re-resolve with the amount as the stock
/// floor; simple rows just take the new amount.
pub fn change_amount(row: &LineRow, pool: &[Sku], amount: u64) -> Transition {
    let next = LineRow {
        amount: Some(amount),
        ..row.clone()
    };
    if !next.is_dimensioned() {
        return Transition {
            row: next,
            resolution: None,
        };
    }
    let constraints = next.constraints();
    resolve_into(next, pool, constraints)
}

/// A simple good was picked straight from search results.
///
/// The unit is reset to the SKU's first unit and its dimensions, if any, are
/// copied for display only.
pub fn select_product(row: &LineRow, sku: &Sku) -> LineRow {
    LineRow {
        name: None,
        sku_id: Some(sku.id_typed()),
        thickness: None,
        width: None,
        length: None,
        unit: Some(sku.first_unit().to_string()),
        display_dimensions: sku.dimensions(),
        ..row.clone()
    }
}

pub fn select_unit(row: &LineRow, unit: &str) -> LineRow {
    LineRow {
        unit: Some(unit.to_string()),
        ..row.clone()
    }
}

/// Option lists for the row's dimension selects.
pub fn options(row: &LineRow, pool: &[Sku]) -> DimensionOptions {
    DimensionOptions::derive(pool, row.thickness, row.width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumberyard_core::SkuId;
    use lumberyard_inventory::Dimensions;

    fn board(t: u32, w: u32, l: u32, qty: u64) -> Sku {
        Sku::dimensioned(
            SkuId::new(),
            "Pine Board",
            Dimensions::new(t, w, l).unwrap(),
            vec!["pcs".into(), "m3".into()],
            qty,
        )
        .unwrap()
    }

    fn pine_pool() -> Vec<Sku> {
        vec![
            board(20, 100, 2000, 50),
            board(20, 150, 2000, 5),
            board(25, 100, 2000, 30),
        ]
    }

    fn named_row() -> LineRow {
        select_name(&LineRow::blank(), "Pine Board")
    }

    #[test]
    fn name_selection_clears_everything_derived() {
        let row = LineRow {
            name: Some("Oak".into()),
            sku_id: Some(SkuId::new()),
            thickness: Some(20),
            width: Some(100),
            length: Some(2000),
            unit: Some("pcs".into()),
            amount: Some(4),
            display_dimensions: None,
        };
        let next = select_name(&row, "Pine Board");
        assert_eq!(next.name.as_deref(), Some("Pine Board"));
        assert_eq!(next.sku_id, None);
        assert_eq!((next.thickness, next.width, next.length), (None, None, None));
        assert_eq!(next.unit, None);
        assert_eq!(next.amount, Some(4));
    }

    #[test]
    fn thickness_clears_width_and_length() {
        let pool = pine_pool();
        let row = LineRow {
            width: Some(150),
            length: Some(2000),
            ..named_row()
        };
        let t = select_thickness(&row, &pool, 25);
        assert_eq!(t.row.width, None);
        assert_eq!(t.row.length, None);
        // 25 has a single variant: resolved immediately.
        assert_eq!(t.row.sku_id, Some(pool[2].id_typed()));
    }

    #[test]
    fn width_clears_length_only() {
        let pool = pine_pool();
        let row = LineRow {
            thickness: Some(20),
            length: Some(2000),
            ..named_row()
        };
        let t = select_width(&row, &pool, 150);
        assert_eq!(t.row.thickness, Some(20));
        assert_eq!(t.row.length, None);
    }

    #[test]
    fn ambiguous_result_clears_previous_sku() {
        let pool = pine_pool();
        let row = LineRow {
            sku_id: Some(pool[2].id_typed()),
            ..named_row()
        };
        let t = select_thickness(&row, &pool, 20);
        assert_eq!(t.resolution, Some(Resolution::Ambiguous { candidates: 2 }));
        assert_eq!(t.row.sku_id, None);
    }

    #[test]
    fn unique_match_keeps_a_unit_already_chosen() {
        let pool = pine_pool();
        let row = LineRow {
            thickness: Some(20),
            unit: Some("m3".into()),
            ..named_row()
        };
        let t = select_width(&row, &pool, 100);
        assert_eq!(t.row.sku_id, Some(pool[0].id_typed()));
        assert_eq!(t.row.unit.as_deref(), Some("m3"));
    }

    #[test]
    fn amount_keeps_dimensions_and_gates_stock() {
        let pool = pine_pool();
        let row = select_width(&select_thickness(&named_row(), &pool, 20).row, &pool, 100).row;

        let short = change_amount(&row, &pool, 60);
        assert_eq!(short.row.thickness, Some(20));
        assert_eq!(short.row.width, Some(100));
        assert_eq!(short.resolution, Some(Resolution::Empty));
        assert_eq!(short.row.sku_id, None);

        let enough = change_amount(&short.row, &pool, 40);
        assert_eq!(enough.row.sku_id, Some(pool[0].id_typed()));
    }

    #[test]
    fn later_dimension_changes_respect_the_amount() {
        let pool = pine_pool();
        let row = change_amount(&named_row(), &pool, 10).row;
        // Thickness 20 alone is ambiguous, but B has only 5 in stock.
        let t = select_thickness(&row, &pool, 20);
        assert_eq!(t.row.sku_id, Some(pool[0].id_typed()));
    }

    #[test]
    fn amount_on_simple_row_skips_resolution() {
        let sku_id = SkuId::new();
        let row = LineRow::resolved(sku_id, 1);
        let t = change_amount(&row, &[], 7);
        assert_eq!(t.resolution, None);
        assert_eq!(t.row.sku_id, Some(sku_id));
        assert_eq!(t.row.amount, Some(7));
    }

    #[test]
    fn product_selection_fills_first_unit_and_display_dimensions() {
        let sku = Sku::new(
            SkuId::new(),
            "Dowel",
            lumberyard_inventory::ProductCategory::Simple,
            Some(Dimensions::new(8, 8, 40).unwrap()),
            vec!["box".into(), "pcs".into()],
            100,
        )
        .unwrap();
        let row = LineRow {
            unit: Some("kg".into()),
            ..LineRow::blank()
        };
        let next = select_product(&row, &sku);
        assert_eq!(next.sku_id, Some(sku.id_typed()));
        assert_eq!(next.unit.as_deref(), Some("box"));
        assert_eq!(next.display_dimensions, sku.dimensions());
        assert_eq!(next.thickness, None);
    }

    #[test]
    fn options_follow_current_selection() {
        let pool = pine_pool();
        let row = LineRow {
            thickness: Some(20),
            ..named_row()
        };
        let opts = options(&row, &pool);
        assert_eq!(opts.thickness, vec![20, 25]);
        assert_eq!(opts.width, vec![100, 150]);
        assert_eq!(opts.length, vec![2000]);
    }
}
