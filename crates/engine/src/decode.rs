//! Row admission and decoding of product rows into per-store metrics.

use crate::config::TransferConfig;
use crate::grid::{cell_at, Cell};
use crate::model::{ProductRecord, RowOutcome, SkipReason, StoreMetrics};
use crate::schema::StoreSchema;

const CODE_COL: usize = 0;
const DESCRIPTION_COL: usize = 1;

/// Text-level rules applied while decoding a row.
#[derive(Debug, Clone)]
pub struct DecodeRules {
    pub subgroup_sentinel: String,
    pub placeholder: String,
}

impl DecodeRules {
    pub fn from_config(config: &TransferConfig) -> Self {
        Self {
            subgroup_sentinel: config.subgroup_sentinel.clone(),
            placeholder: config.placeholder.clone(),
        }
    }
}

impl Default for DecodeRules {
    fn default() -> Self {
        Self::from_config(&TransferConfig::default())
    }
}

/// A row is a product row when its first cell, with hyphens removed, is
/// all digits (any script). Rows failing this are never decoded.
pub fn is_product_row(row: &[Cell]) -> bool {
    let first = cell_at(row, CODE_COL);
    if first.is_missing() {
        return false;
    }
    let text = first.display();
    let mut digits = text.chars().filter(|c| *c != '-').peekable();
    digits.peek().is_some() && digits.all(char::is_numeric)
}

/// Best-effort numeric decode. Missing, placeholder, unparsable and
/// non-finite cells all read as 0; booleans read as 1 / 0.
pub fn decode_number(cell: &Cell, placeholder: &str) -> f64 {
    let value = match cell {
        Cell::Empty => return 0.0,
        Cell::Number(n) => *n,
        Cell::Bool(b) => return if *b { 1.0 } else { 0.0 },
        Cell::Text(s) => {
            if s == placeholder {
                return 0.0;
            }
            s.trim().parse::<f64>().unwrap_or(0.0)
        }
    };
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Decode one admitted row. Columns past the row's end read as missing.
pub fn decode_row(row: &[Cell], schema: &StoreSchema, rules: &DecodeRules) -> RowOutcome {
    let code = cell_at(row, CODE_COL);
    if code.is_missing() {
        return RowOutcome::Skipped(SkipReason::MissingCode);
    }
    let description = cell_at(row, DESCRIPTION_COL);
    if description.is_missing() {
        return RowOutcome::Skipped(SkipReason::MissingDescription);
    }

    let description = description.display();
    if description.contains(rules.subgroup_sentinel.as_str()) {
        return RowOutcome::Skipped(SkipReason::SubGroupHeader);
    }

    let metrics = schema
        .columns()
        .iter()
        .map(|cols| {
            let sales = decode_number(cell_at(row, cols.sales_col), &rules.placeholder);
            let stock = decode_number(cell_at(row, cols.stock_col), &rules.placeholder);
            (cols.store.clone(), StoreMetrics::new(sales, stock))
        })
        .collect();

    RowOutcome::Decoded(ProductRecord {
        code: code.display().into_owned(),
        description: description.into_owned(),
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> StoreSchema {
        StoreSchema::new(["A", "B", "C"], 6)
    }

    fn row(code: Cell, desc: Cell, pairs: &[(Cell, Cell)]) -> Vec<Cell> {
        let mut r = vec![code, desc, Cell::text("REF"), 0.0.into(), 0.0.into(), 0.0.into()];
        for (sales, stock) in pairs {
            r.push(sales.clone());
            r.push(stock.clone());
        }
        r
    }

    fn decoded(outcome: RowOutcome) -> ProductRecord {
        match outcome {
            RowOutcome::Decoded(p) => p,
            RowOutcome::Skipped(reason) => panic!("row skipped: {reason}"),
        }
    }

    #[test]
    fn admission_accepts_digits_and_hyphens() {
        assert!(is_product_row(&[Cell::text("12345")]));
        assert!(is_product_row(&[Cell::text("12-345-6")]));
        assert!(is_product_row(&[Cell::Number(987.0)]));
    }

    #[test]
    fn admission_rejects_other_first_cells() {
        assert!(!is_product_row(&[Cell::text("ABC")]));
        assert!(!is_product_row(&[Cell::text("12A")]));
        assert!(!is_product_row(&[Cell::text("---")]));
        assert!(!is_product_row(&[Cell::Number(1.5)]));
        assert!(!is_product_row(&[Cell::Empty]));
        assert!(!is_product_row(&[]));
        assert!(!is_product_row(&[Cell::Bool(true)]));
        assert!(!is_product_row(&[Cell::text("2024-01-15 00:00:00")]));
    }

    #[test]
    fn admission_accepts_non_ascii_digits() {
        assert!(is_product_row(&[Cell::text("١٢٣")]));
        assert!(is_product_row(&[Cell::text("١٢-٣")]));
    }

    #[test]
    fn numeric_decode_rules() {
        assert_eq!(decode_number(&Cell::Empty, "-"), 0.0);
        assert_eq!(decode_number(&Cell::text("-"), "-"), 0.0);
        assert_eq!(decode_number(&Cell::text("abc"), "-"), 0.0);
        assert_eq!(decode_number(&Cell::text("1,5"), "-"), 0.0);
        assert_eq!(decode_number(&Cell::text(" 12.5 "), "-"), 12.5);
        assert_eq!(decode_number(&Cell::text("NaN"), "-"), 0.0);
        assert_eq!(decode_number(&Cell::Number(f64::INFINITY), "-"), 0.0);
        assert_eq!(decode_number(&Cell::Number(4.0), "-"), 4.0);
        assert_eq!(decode_number(&Cell::Bool(true), "-"), 1.0);
        assert_eq!(decode_number(&Cell::Bool(false), "-"), 0.0);
        assert_eq!(decode_number(&Cell::text("2024-01-15 00:00:00"), "-"), 0.0);
    }

    #[test]
    fn decodes_store_pairs_in_order() {
        let r = row(
            Cell::Number(1001.0),
            Cell::text("PARAFUSO 10MM"),
            &[(0.0.into(), 10.0.into()), (5.0.into(), Cell::text("-")), (Cell::text("x"), 2.0.into())],
        );
        let p = decoded(decode_row(&r, &schema(), &DecodeRules::default()));
        assert_eq!(p.code, "1001");
        assert_eq!(p.description, "PARAFUSO 10MM");
        assert_eq!(p.metrics_for("A"), Some(StoreMetrics::new(0.0, 10.0)));
        assert_eq!(p.metrics_for("B"), Some(StoreMetrics::new(5.0, 0.0)));
        assert_eq!(p.metrics_for("C"), Some(StoreMetrics::new(0.0, 2.0)));
    }

    #[test]
    fn short_rows_pad_with_zero() {
        let r = row(Cell::text("7"), Cell::text("FITA"), &[(3.0.into(), 1.0.into())]);
        let p = decoded(decode_row(&r, &schema(), &DecodeRules::default()));
        assert_eq!(p.metrics.len(), 3);
        assert_eq!(p.metrics_for("B"), Some(StoreMetrics::default()));
        assert_eq!(p.metrics_for("C"), Some(StoreMetrics::default()));
    }

    #[test]
    fn skips_missing_description() {
        let r = row(Cell::text("7"), Cell::Empty, &[]);
        assert_eq!(
            decode_row(&r, &schema(), &DecodeRules::default()),
            RowOutcome::Skipped(SkipReason::MissingDescription)
        );
    }

    #[test]
    fn skips_sub_group_header() {
        let r = row(Cell::text("12"), Cell::text("Sub-Grupo: FERRAGENS"), &[]);
        assert_eq!(
            decode_row(&r, &schema(), &DecodeRules::default()),
            RowOutcome::Skipped(SkipReason::SubGroupHeader)
        );
    }

    #[test]
    fn skips_missing_code() {
        assert_eq!(
            decode_row(&[], &schema(), &DecodeRules::default()),
            RowOutcome::Skipped(SkipReason::MissingCode)
        );
    }
}
