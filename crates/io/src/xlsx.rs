// Excel grid import (xlsx, xls, xlsb, ods) and report export (xlsx only)
//
// Import: first worksheet only, as an untyped grid at absolute coordinates.
//         No header inference; the engine locates its own data region.
// Export: one worksheet per report table, header row in bold.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Reader, Sheets};
use log::{debug, info};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet};
use rebalance_engine::grid::{Cell, RawGrid};
use rebalance_engine::report::{Report, ReportTable, ReportValue};

/// Read the first worksheet of a spreadsheet file.
pub fn read_grid(path: &Path) -> Result<RawGrid, String> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open spreadsheet '{}': {}", path.display(), e))?;
    first_sheet_grid(&mut workbook)
}

/// Read the first worksheet of an in-memory spreadsheet (an upload body).
pub fn read_grid_from_bytes(bytes: &[u8]) -> Result<RawGrid, String> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| format!("Failed to open spreadsheet: {}", e))?;
    first_sheet_grid(&mut workbook)
}

fn first_sheet_grid<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> Result<RawGrid, String> {
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "Spreadsheet contains no sheets".to_string())?
        .map_err(|e| format!("Failed to read first sheet: {}", e))?;

    // Range start offset (data may not begin at A1). Pad so that grid
    // coordinates match sheet coordinates.
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let (start_row, start_col) = (start_row as usize, start_col as usize);

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col];
        cells.extend(row.iter().map(convert_cell));
        rows.push(cells);
    }

    debug!(
        "read grid: {} rows, data starts at ({}, {})",
        rows.len(),
        start_row,
        start_col
    );
    Ok(RawGrid::new(rows))
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::Error(e) => Cell::Text(format!("#{:?}", e)),
        // Dates are text, never metrics or product codes.
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(at) => Cell::Text(at.to_string()),
            None => Cell::Text(format!("#DATE({})", dt.as_f64())),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

/// Write every report table to `path` as an xlsx workbook.
pub fn write_report(report: &Report, path: &Path) -> Result<(), String> {
    let mut workbook = build_workbook(report)?;
    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;
    info!("wrote report ({} sheets) to {}", report.tables.len(), path.display());
    Ok(())
}

/// Serialize every report table into xlsx bytes.
pub fn write_report_to_buffer(report: &Report) -> Result<Vec<u8>, String> {
    let mut workbook = build_workbook(report)?;
    let bytes = workbook
        .save_to_buffer()
        .map_err(|e| format!("Failed to serialize XLSX workbook: {}", e))?;
    info!("serialized report ({} sheets, {} bytes)", report.tables.len(), bytes.len());
    Ok(bytes)
}

fn build_workbook(report: &Report) -> Result<XlsxWorkbook, String> {
    let mut workbook = XlsxWorkbook::new();
    let header_format = Format::new().set_bold();

    for table in &report.tables {
        let worksheet = workbook
            .add_worksheet()
            .set_name(&table.name)
            .map_err(|e| format!("Failed to create sheet '{}': {}", table.name, e))?;
        write_table(worksheet, table, &header_format)?;
        worksheet.autofit();
    }

    Ok(workbook)
}

fn write_table(worksheet: &mut Worksheet, table: &ReportTable, header_format: &Format) -> Result<(), String> {
    for (col, name) in table.columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, name, header_format)
            .map_err(|e| format!("Failed to write header '{}': {}", name, e))?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row32 = (row_idx + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            let col16 = col as u16;
            let written = match value {
                ReportValue::Text(s) => worksheet.write_string(row32, col16, s),
                ReportValue::Number(n) => worksheet.write_number(row32, col16, *n),
            };
            written.map_err(|e| format!("Failed to write cell ({}, {}) in '{}': {}", row32, col16, table.name, e))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rebalance_engine::report::{self, ReportBuilder};
    use rebalance_engine::schema::StoreId;
    use rebalance_engine::{run, SuggestionRecord, TransferConfig};
    use rust_xlsxwriter::ExcelDateTime;

    fn sheet_bytes(build: impl FnOnce(&mut Worksheet)) -> Vec<u8> {
        let mut workbook = XlsxWorkbook::new();
        build(workbook.add_worksheet());
        workbook.save_to_buffer().unwrap()
    }

    fn read_back(bytes: Vec<u8>) -> Sheets<Cursor<Vec<u8>>> {
        open_workbook_auto_from_rs(Cursor::new(bytes)).unwrap()
    }

    fn sample_report() -> Report {
        let suggestion = SuggestionRecord {
            product_code: "1001".into(),
            product_description: "PARAFUSO".into(),
            origin_store: StoreId::new("LJ 1Mega Loja"),
            origin_sales: 0.0,
            origin_stock: 10.0,
            destination_store: StoreId::new("LJ 2Mascote"),
            destination_sales: 5.0,
            transfer_quantity: 10.0,
        };
        let generated_at = NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap();
        ReportBuilder::default().build(&[suggestion], generated_at).unwrap()
    }

    #[test]
    fn test_read_preserves_absolute_coordinates() {
        let bytes = sheet_bytes(|ws| {
            ws.write_string(2, 1, "LJ 1Mega Loja").unwrap();
            ws.write_number(4, 3, 7.0).unwrap();
        });
        let grid = read_grid_from_bytes(&bytes).unwrap();

        assert_eq!(grid.height(), 5);
        assert!(grid.row(0).unwrap().is_empty());
        assert_eq!(grid.row(2).unwrap()[1], Cell::text("LJ 1Mega Loja"));
        assert_eq!(grid.row(2).unwrap()[0], Cell::Empty);
        assert_eq!(grid.row(4).unwrap()[3], Cell::Number(7.0));
    }

    #[test]
    fn test_read_cell_kinds() {
        let bytes = sheet_bytes(|ws| {
            ws.write_string(0, 0, "1001").unwrap();
            ws.write_number(0, 1, 2.5).unwrap();
            ws.write_string(0, 2, "-").unwrap();
            ws.write_boolean(0, 3, true).unwrap();
        });
        let grid = read_grid_from_bytes(&bytes).unwrap();
        let row = grid.row(0).unwrap();

        assert_eq!(row[0], Cell::text("1001"));
        assert_eq!(row[1], Cell::Number(2.5));
        assert_eq!(row[2], Cell::text("-"));
        assert_eq!(row[3], Cell::Bool(true));
    }

    #[test]
    fn test_read_dates_as_text() {
        let date = ExcelDateTime::from_ymd(2024, 1, 15).unwrap();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let bytes = sheet_bytes(|ws| {
            ws.write_datetime_with_format(0, 0, &date, &date_format).unwrap();
        });
        let grid = read_grid_from_bytes(&bytes).unwrap();

        assert_eq!(grid.row(0).unwrap()[0], Cell::text("2024-01-15 00:00:00"));
    }

    #[test]
    fn test_date_and_bool_cells_in_inventory() {
        let date = ExcelDateTime::from_ymd(2024, 1, 15).unwrap();
        let date_format = Format::new().set_num_format("dd/mm/yyyy");
        let config = TransferConfig {
            stores: vec!["LJ 1Norte".into(), "LJ 2Sul".into()],
            metrics_start_col: 2,
            ..TransferConfig::default()
        };
        let bytes = sheet_bytes(|ws| {
            ws.write_string(0, 2, "LJ 1Norte").unwrap();
            ws.write_string(0, 4, "LJ 2Sul").unwrap();
            // Date in a sales cell decodes to 0: no destination.
            ws.write_string(2, 0, "1001").unwrap();
            ws.write_string(2, 1, "PARAFUSO").unwrap();
            ws.write_number(2, 2, 0.0).unwrap();
            ws.write_number(2, 3, 10.0).unwrap();
            ws.write_datetime_with_format(2, 4, &date, &date_format).unwrap();
            ws.write_number(2, 5, 0.0).unwrap();
            // Date in the code column is not a product row.
            ws.write_datetime_with_format(3, 0, &date, &date_format).unwrap();
            ws.write_string(3, 1, "DATA").unwrap();
            // TRUE in a sales cell decodes to 1.
            ws.write_string(4, 0, "1002").unwrap();
            ws.write_string(4, 1, "PORCA").unwrap();
            ws.write_number(4, 2, 0.0).unwrap();
            ws.write_number(4, 3, 4.0).unwrap();
            ws.write_boolean(4, 4, true).unwrap();
            ws.write_number(4, 5, 0.0).unwrap();
        });
        let grid = read_grid_from_bytes(&bytes).unwrap();
        let result = run(&grid, &config).unwrap();

        assert_eq!(result.processed_products, 2);
        assert_eq!(result.suggestions.len(), 1);
        let s = &result.suggestions[0];
        assert_eq!(s.product_code, "1002");
        assert_eq!(s.destination_store.as_str(), "LJ 2Sul");
        assert_eq!(s.destination_sales, 1.0);
        assert_eq!(s.transfer_quantity, 4.0);
    }

    #[test]
    fn test_read_only_first_sheet() {
        let mut workbook = XlsxWorkbook::new();
        workbook.add_worksheet().write_string(0, 0, "first").unwrap();
        workbook.add_worksheet().write_string(0, 0, "second").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let grid = read_grid_from_bytes(&bytes).unwrap();
        assert_eq!(grid.height(), 1);
        assert_eq!(grid.row(0).unwrap()[0], Cell::text("first"));
    }

    #[test]
    fn test_read_rejects_non_spreadsheet_bytes() {
        let err = read_grid_from_bytes(b"codigo;descricao\n1;x\n").unwrap_err();
        assert!(err.starts_with("Failed to open spreadsheet"), "{err}");
    }

    #[test]
    fn test_read_from_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("estoque.xlsx");
        let mut workbook = XlsxWorkbook::new();
        workbook.add_worksheet().write_string(1, 0, "LJ 1Mega Loja").unwrap();
        workbook.save(&path).unwrap();

        let grid = read_grid(&path).unwrap();
        assert_eq!(grid.row(1).unwrap()[0], Cell::text("LJ 1Mega Loja"));
    }

    #[test]
    fn test_export_sheets_in_report_order() {
        let bytes = write_report_to_buffer(&sample_report()).unwrap();
        let workbook = read_back(bytes);

        assert_eq!(
            workbook.sheet_names(),
            vec![
                report::SHEET_SUGGESTIONS.to_string(),
                report::SHEET_SUMMARY.to_string(),
                report::SHEET_BY_ORIGIN.to_string(),
                report::SHEET_BY_DESTINATION.to_string(),
            ]
        );
    }

    #[test]
    fn test_export_values_roundtrip() {
        let bytes = write_report_to_buffer(&sample_report()).unwrap();
        let mut workbook = read_back(bytes);

        let list = workbook.worksheet_range(report::SHEET_SUGGESTIONS).unwrap();
        assert_eq!(list.get_value((0, 0)), Some(&Data::String(report::COL_PRODUCT_CODE.into())));
        assert_eq!(list.get_value((1, 0)), Some(&Data::String("1001".into())));
        assert_eq!(list.get_value((1, 2)), Some(&Data::String("Mega Loja".into())));
        assert_eq!(list.get_value((1, 7)), Some(&Data::Float(10.0)));

        let summary = workbook.worksheet_range(report::SHEET_SUMMARY).unwrap();
        assert_eq!(summary.get_value((5, 1)), Some(&Data::String("18/10/2026 14:05".into())));
    }

    #[test]
    fn test_export_to_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("sugestoes.xlsx");

        write_report(&sample_report(), &path).unwrap();

        assert!(path.exists());
        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 100);
    }
}
