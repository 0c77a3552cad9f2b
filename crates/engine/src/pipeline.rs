use log::{debug, info};
use serde::Serialize;

use crate::config::TransferConfig;
use crate::decode::{decode_row, is_product_row, DecodeRules};
use crate::error::EngineError;
use crate::grid::RawGrid;
use crate::locate::{data_start, locate_anchor};
use crate::model::{RowDiagnostic, RowOutcome, SuggestionRecord};
use crate::schema::StoreSchema;
use crate::suggest::suggest_for_product;

/// Result of one full pass over a grid.
#[derive(Debug, Clone, Serialize)]
pub struct TransferRun {
    /// Zero-based index of the store header row.
    pub anchor_row: usize,
    /// Rows admitted as product rows, including ones later skipped.
    pub processed_products: usize,
    pub suggestions: Vec<SuggestionRecord>,
    /// Admitted rows that did not decode, in row order.
    pub diagnostics: Vec<RowDiagnostic>,
}

/// Locate the data region, decode every product row, and derive suggestions.
///
/// Only a missing layout fails the run. Rows that do not decode are
/// reported in `diagnostics` and never affect other rows.
pub fn run(grid: &RawGrid, config: &TransferConfig) -> Result<TransferRun, EngineError> {
    let schema = StoreSchema::from_config(config);
    let rules = DecodeRules::from_config(config);

    let anchor_row = locate_anchor(grid, config.anchor())?;
    debug!("store header found at row {anchor_row}");

    let mut processed_products = 0;
    let mut suggestions = Vec::new();
    let mut diagnostics = Vec::new();

    for (row_idx, row) in grid.rows().iter().enumerate().skip(data_start(anchor_row)) {
        if !is_product_row(row) {
            continue;
        }
        processed_products += 1;

        match decode_row(row, &schema, &rules) {
            RowOutcome::Decoded(product) => suggestions.extend(suggest_for_product(&product)),
            RowOutcome::Skipped(reason) => {
                debug!("row {row_idx} skipped: {reason}");
                diagnostics.push(RowDiagnostic { row: row_idx, reason });
            }
        }
    }

    info!(
        "processed {} product rows: {} suggestions, {} skipped",
        processed_products,
        suggestions.len(),
        diagnostics.len()
    );

    Ok(TransferRun {
        anchor_row,
        processed_products,
        suggestions,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;
    use crate::model::SkipReason;

    fn config() -> TransferConfig {
        TransferConfig {
            stores: vec!["LJ 1Norte".into(), "LJ 2Sul".into()],
            ..TransferConfig::default()
        }
    }

    fn product(code: &str, desc: &str, a: (f64, f64), b: (f64, f64)) -> Vec<Cell> {
        vec![
            Cell::text(code),
            Cell::text(desc),
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            a.0.into(),
            a.1.into(),
            b.0.into(),
            b.1.into(),
        ]
    }

    #[test]
    fn rows_above_data_region_are_ignored() {
        let grid = RawGrid::new(vec![
            product("1", "ABOVE", (0.0, 5.0), (3.0, 0.0)),
            vec![Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty, Cell::text("LJ 1Norte")],
            product("2", "SUBHEADER", (0.0, 5.0), (3.0, 0.0)),
            product("3", "DATA", (0.0, 5.0), (3.0, 0.0)),
        ]);
        let result = run(&grid, &config()).unwrap();
        assert_eq!(result.anchor_row, 1);
        assert_eq!(result.processed_products, 1);
        assert_eq!(result.suggestions.len(), 1);
        assert_eq!(result.suggestions[0].product_code, "3");
    }

    #[test]
    fn skipped_rows_count_as_processed_and_are_diagnosed() {
        let grid = RawGrid::new(vec![
            vec![Cell::text("Loja: LJ 1Norte")],
            vec![Cell::text("Vendas")],
            product("10", "Sub-Grupo FIXADORES", (0.0, 5.0), (3.0, 0.0)),
            vec![Cell::text("11")],
            product("12", "OK", (0.0, 5.0), (3.0, 0.0)),
            vec![Cell::text("TOTAL GERAL")],
        ]);
        let result = run(&grid, &config()).unwrap();
        assert_eq!(result.processed_products, 3);
        assert_eq!(result.suggestions.len(), 1);
        assert_eq!(
            result.diagnostics,
            vec![
                RowDiagnostic { row: 2, reason: SkipReason::SubGroupHeader },
                RowDiagnostic { row: 3, reason: SkipReason::MissingDescription },
            ]
        );
    }

    #[test]
    fn missing_layout_fails_the_run() {
        let grid = RawGrid::new(vec![vec![Cell::text("nothing here")]]);
        let err = run(&grid, &config()).unwrap_err();
        assert!(matches!(err, EngineError::LayoutNotFound { .. }));
    }
}
