//! Row filtering.
//!
//! Filters are independent inclusion predicates combined with logical AND.
//! Each one narrows the surviving set; none can re-admit a removed row, so
//! the order they run in is irrelevant. Filtering always produces a fresh
//! table and never reorders the rows that survive.

use serde::Serialize;

use crate::schema::ColumnMap;
use crate::table::{Cell, Table};

/// Filter state, straight from the dashboard controls.
///
/// The two checkboxes are fixed-literal product filters; they combine with
/// the free-text fields instead of replacing them.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FilterConfig {
    /// Case-insensitive substring match against the product column.
    pub product_contains: Option<String>,
    /// Case-insensitive substring match against the brand column.
    pub brand_search: Option<String>,
    /// Keep only products containing "rasteira".
    pub only_rasteiras: bool,
    /// Keep only products containing "papete".
    pub only_papetes: bool,
}

impl FilterConfig {
    /// Whether any filter would actually run. [`apply_filters`] skips the
    /// per-row predicate pass entirely when this is false.
    pub fn is_active(&self) -> bool {
        self.only_rasteiras
            || self.only_papetes
            || self.product_contains.as_deref().is_some_and(|s| !s.is_empty())
            || self.brand_search.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// A row inclusion predicate. Enabled filters run sequentially; a row
/// survives only if every one of them keeps it.
pub trait RowFilter {
    /// Decide if this filter should run at all.
    fn enable(&self) -> bool {
        true
    }

    /// Whether the row stays in the filtered view.
    fn keeps(&self, row: &[Cell]) -> bool;

    /// Stable name for logging.
    fn name(&self) -> &'static str;
}

/// Case-insensitive substring match against one column.
///
/// Rows whose value in that column is missing or not text are excluded while
/// the filter is active.
pub struct ContainsFilter {
    name: &'static str,
    column: usize,
    needle: String,
}

impl ContainsFilter {
    pub fn new(name: &'static str, column: usize, needle: &str) -> Self {
        Self {
            name,
            column,
            needle: needle.to_lowercase(),
        }
    }
}

impl RowFilter for ContainsFilter {
    fn enable(&self) -> bool {
        !self.needle.is_empty()
    }

    fn keeps(&self, row: &[Cell]) -> bool {
        match row.get(self.column) {
            Some(Cell::Text(value)) => value.to_lowercase().contains(&self.needle),
            _ => false,
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Translate the config into the concrete filter list for this table.
fn build_filters(
    table: &Table,
    columns: &ColumnMap,
    config: &FilterConfig,
) -> Vec<Box<dyn RowFilter>> {
    let produto = table.column_index(&columns.produto);
    let marca = table.column_index(&columns.marca);

    let mut filters: Vec<Box<dyn RowFilter>> = Vec::new();
    if config.only_rasteiras {
        if let Some(column) = produto {
            filters.push(Box::new(ContainsFilter::new("rasteiras", column, "rasteira")));
        }
    }
    if config.only_papetes {
        if let Some(column) = produto {
            filters.push(Box::new(ContainsFilter::new("papetes", column, "papete")));
        }
    }
    if let Some(needle) = &config.product_contains {
        if let Some(column) = produto {
            filters.push(Box::new(ContainsFilter::new("produto", column, needle)));
        }
    }
    if let Some(needle) = &config.brand_search {
        if let Some(column) = marca {
            filters.push(Box::new(ContainsFilter::new("marca", column, needle)));
        }
    }
    filters
}

/// Apply every active filter, producing a fresh filtered table.
///
/// With no active filter the result is equal to the input by value, never a
/// shared view of it.
pub fn apply_filters(table: &Table, columns: &ColumnMap, config: &FilterConfig) -> Table {
    if !config.is_active() {
        // Still a fresh copy, never a shared view of the input.
        return table.clone();
    }

    let filters = build_filters(table, columns, config);

    let mut out = Table::new(table.headers().to_vec());
    for row in table.rows() {
        let keep = filters
            .iter()
            .filter(|filter| filter.enable())
            .all(|filter| filter.keeps(row));
        if keep {
            out.push_row(row.clone());
        }
    }

    log::debug!(
        "filters kept {} of {} rows",
        out.len(),
        table.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_csv;
    use crate::normalize::normalize;
    use crate::schema::resolve_columns;

    const SAMPLE_CSV: &str = "\
Produto,Marca,Vendedor,Total,Qtde,Preço
Rasteira Azul,Beira Rio,Ana,100,2,50
Papete Rosa,Grendha,Bruno,60,1,60
Rasteira Papete Mix,Grendha,Ana,80,2,40
,Beira Rio,Carla,30,1,30
";

    fn sample() -> (Table, ColumnMap) {
        let raw = load_csv(SAMPLE_CSV.as_bytes()).unwrap();
        let columns = resolve_columns(&raw).unwrap();
        let normalized = normalize(&raw, &columns);
        (normalized, columns)
    }

    #[test]
    fn no_active_filter_returns_equal_table() {
        let (table, columns) = sample();
        let filtered = apply_filters(&table, &columns, &FilterConfig::default());
        assert_eq!(filtered, table);
    }

    #[test]
    fn product_filter_is_case_insensitive() {
        let (table, columns) = sample();
        let config = FilterConfig {
            product_contains: Some("RASTEIRA".into()),
            ..FilterConfig::default()
        };
        let filtered = apply_filters(&table, &columns, &config);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn missing_product_value_is_excluded_when_filter_active() {
        let (table, columns) = sample();
        let config = FilterConfig {
            only_rasteiras: true,
            ..FilterConfig::default()
        };
        let filtered = apply_filters(&table, &columns, &config);
        // The row with a blank product never matches.
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn filters_combine_with_logical_and() {
        let (table, columns) = sample();
        let config = FilterConfig {
            only_rasteiras: true,
            only_papetes: true,
            ..FilterConfig::default()
        };
        let filtered = apply_filters(&table, &columns, &config);
        assert_eq!(filtered.len(), 1);
        let produto = filtered.column_index(&columns.produto).unwrap();
        assert_eq!(
            filtered.cell(0, produto),
            Some(&Cell::Text("Rasteira Papete Mix".into()))
        );
    }

    #[test]
    fn filtering_is_idempotent() {
        let (table, columns) = sample();
        let config = FilterConfig {
            brand_search: Some("grendha".into()),
            ..FilterConfig::default()
        };
        let once = apply_filters(&table, &columns, &config);
        let twice = apply_filters(&once, &columns, &config);
        assert_eq!(once, twice);
    }

    #[test]
    fn filter_order_is_irrelevant() {
        let (table, columns) = sample();
        let rasteiras = FilterConfig {
            only_rasteiras: true,
            ..FilterConfig::default()
        };
        let grendha = FilterConfig {
            brand_search: Some("grendha".into()),
            ..FilterConfig::default()
        };

        let a = apply_filters(&apply_filters(&table, &columns, &rasteiras), &columns, &grendha);
        let b = apply_filters(&apply_filters(&table, &columns, &grendha), &columns, &rasteiras);
        assert_eq!(a, b);
    }

    #[test]
    fn surviving_rows_keep_their_relative_order() {
        let (table, columns) = sample();
        let config = FilterConfig {
            brand_search: Some("beira".into()),
            ..FilterConfig::default()
        };
        let filtered = apply_filters(&table, &columns, &config);
        let vendedor = filtered.column_index(&columns.vendedor).unwrap();
        let order: Vec<_> = (0..filtered.len())
            .filter_map(|row| filtered.cell(row, vendedor).and_then(|c| c.as_text()))
            .collect();
        assert_eq!(order, vec!["Ana", "Carla"]);
    }

    #[test]
    fn empty_needle_is_a_no_op() {
        let (table, columns) = sample();
        let config = FilterConfig {
            product_contains: Some(String::new()),
            ..FilterConfig::default()
        };
        assert!(!config.is_active());
        let filtered = apply_filters(&table, &columns, &config);
        assert_eq!(filtered.len(), table.len());
    }
}
