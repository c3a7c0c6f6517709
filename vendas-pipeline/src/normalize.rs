//! Numeric normalization and derived metrics.
//!
//! The total, quantidade and preço columns are coerced to numbers
//! (unparseable cells become `0.0`, rows are never dropped) and the derived
//! `ticket_medio` column is appended. The operation is total: it never fails.

use crate::schema::ColumnMap;
use crate::table::{Cell, Table};

/// Header of the derived average-ticket column.
pub const TICKET_MEDIO: &str = "ticket_medio";

/// Return a new table with numeric columns coerced and `ticket_medio`
/// appended. The average ticket is `total / quantidade`, with a divisor of
/// `1` whenever the row's quantidade is exactly zero.
pub fn normalize(table: &Table, columns: &ColumnMap) -> Table {
    let coerced: Vec<usize> = [&columns.total, &columns.quantidade, &columns.preco]
        .iter()
        .filter_map(|name| table.column_index(name))
        .collect();
    let total_index = table.column_index(&columns.total);
    let quantidade_index = table.column_index(&columns.quantidade);

    let mut headers = table.headers().to_vec();
    headers.push(TICKET_MEDIO.to_string());

    let mut out = Table::new(headers);
    for row in table.rows() {
        let mut cells: Vec<Cell> = row
            .iter()
            .enumerate()
            .map(|(index, cell)| {
                if coerced.contains(&index) {
                    Cell::Number(cell.coerce_number())
                } else {
                    cell.clone()
                }
            })
            .collect();

        let total = total_index
            .and_then(|index| row.get(index))
            .map_or(0.0, Cell::coerce_number);
        let quantidade = quantidade_index
            .and_then(|index| row.get(index))
            .map_or(0.0, Cell::coerce_number);
        let divisor = if quantidade == 0.0 { 1.0 } else { quantidade };
        cells.push(Cell::Number(total / divisor));

        out.push_row(cells);
    }
    out
}
