use crate::error::EngineError;
use crate::grid::RawGrid;

/// Rows between the anchor row and the first data row (the anchor itself
/// plus the per-store "Vendas / Saldo" sub-header).
pub const DATA_ROW_OFFSET: usize = 2;

/// Find the first row whose cells contain `anchor` (case-sensitive substring
/// of the cell's textual form).
pub fn locate_anchor(grid: &RawGrid, anchor: &str) -> Result<usize, EngineError> {
    grid.rows()
        .iter()
        .position(|row| row.iter().any(|cell| cell.display().contains(anchor)))
        .ok_or_else(|| EngineError::LayoutNotFound {
            anchor: anchor.to_string(),
        })
}

/// Index of the first data row for a grid anchored at `anchor_row`.
pub fn data_start(anchor_row: usize) -> usize {
    anchor_row + DATA_ROW_OFFSET
}
