//! Dashboard assembly.
//!
//! The one place the whole pipeline is wired together: resolve columns,
//! normalize, filter, then run every aggregation the dashboard displays.
//! The result is a plain value the presentation layer renders as it likes.

use serde::Serialize;

use crate::aggregate::{aggregate, AggregateResult, AggregateSpec, Measure, SortOrder};
use crate::error::PipelineResult;
use crate::filter::{apply_filters, FilterConfig};
use crate::normalize::{normalize, TICKET_MEDIO};
use crate::schema::{resolve_columns, ColumnMap};
use crate::table::{Cell, Table};

/// Slider bounds for the top-N rankings, same as the original controls.
pub const TOP_N_MIN: usize = 5;
pub const TOP_N_MAX: usize = 30;
pub const TOP_N_DEFAULT: usize = 10;

#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub filters: FilterConfig,
    /// Size of the brand ranking, clamped into `TOP_N_MIN..=TOP_N_MAX`.
    pub top_marcas: usize,
    /// Size of the salesperson ranking, clamped the same way.
    pub top_vendedores: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            filters: FilterConfig::default(),
            top_marcas: TOP_N_DEFAULT,
            top_vendedores: TOP_N_DEFAULT,
        }
    }
}

/// Everything one dashboard render needs. Optional series are `None` when
/// the column they depend on is absent; empty series are empty, not errors.
#[derive(Clone, Debug, Serialize)]
pub struct Dashboard {
    pub columns: ColumnMap,
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub total_vendido: f64,
    pub quantidade_vendida: f64,
    pub vendas_por_mes: Option<AggregateResult>,
    pub vendas_por_marca: AggregateResult,
    pub vendas_por_frete: Option<AggregateResult>,
    pub vendas_por_catalogo: Option<AggregateResult>,
    pub vendas_por_vendedor: AggregateResult,
    pub top_produtos: AggregateResult,
}

/// The month column is looked up by its literal name, not resolved as a
/// role; the monthly chart simply disappears when neither spelling exists.
fn month_column(table: &Table) -> Option<String> {
    ["mês", "mes"]
        .into_iter()
        .find(|name| table.column_index(name).is_some())
        .map(str::to_string)
}

fn column_sum(table: &Table, column: &str) -> f64 {
    match table.column_index(column) {
        Some(index) => table
            .rows()
            .iter()
            .map(|row| row.get(index).map_or(0.0, Cell::coerce_number))
            .sum(),
        None => 0.0,
    }
}

/// Run the full pipeline over a raw table and materialize every metric,
/// chart series and ranking of the dashboard.
pub fn build_dashboard(raw: &Table, config: &DashboardConfig) -> PipelineResult<Dashboard> {
    let columns = resolve_columns(raw)?;
    let normalized = normalize(raw, &columns);
    let filtered = apply_filters(&normalized, &columns, &config.filters);

    let top_marcas = config.top_marcas.clamp(TOP_N_MIN, TOP_N_MAX);
    let top_vendedores = config.top_vendedores.clamp(TOP_N_MIN, TOP_N_MAX);

    let vendas_por_mes = match month_column(&filtered) {
        Some(mes) => Some(aggregate(
            &filtered,
            &AggregateSpec {
                group_by: vec![mes],
                measures: vec![Measure::sum(&columns.total)],
                sort: SortOrder::KeyAscending,
                top_n: None,
            },
        )?),
        None => {
            log::warn!("no month column (mês/mes) in the table; monthly chart disabled");
            None
        }
    };

    let vendas_por_marca = aggregate(
        &filtered,
        &AggregateSpec {
            group_by: vec![columns.marca.clone()],
            measures: vec![Measure::sum(&columns.total)],
            sort: SortOrder::MeasureDescending(0),
            top_n: Some(top_marcas),
        },
    )?;

    let vendas_por_frete = match &columns.frete {
        Some(frete) => Some(aggregate(
            &filtered,
            &AggregateSpec {
                group_by: vec![frete.clone()],
                measures: vec![Measure::sum(&columns.total)],
                sort: SortOrder::MeasureDescending(0),
                top_n: None,
            },
        )?),
        None => None,
    };

    let vendas_por_catalogo = match &columns.catalogo {
        Some(catalogo) => Some(aggregate(
            &filtered,
            &AggregateSpec {
                group_by: vec![catalogo.clone()],
                measures: vec![Measure::sum(&columns.total)],
                sort: SortOrder::MeasureDescending(0),
                top_n: None,
            },
        )?),
        None => None,
    };

    let vendas_por_vendedor = aggregate(
        &filtered,
        &AggregateSpec {
            group_by: vec![columns.vendedor.clone()],
            measures: vec![Measure::sum(&columns.total)],
            sort: SortOrder::MeasureDescending(0),
            top_n: Some(top_vendedores),
        },
    )?;

    let top_produtos = aggregate(
        &filtered,
        &AggregateSpec {
            group_by: vec![columns.produto.clone(), columns.marca.clone()],
            measures: vec![
                Measure::sum(&columns.quantidade),
                Measure::sum(&columns.total),
                Measure::mean(&columns.preco),
                Measure::mean(TICKET_MEDIO),
            ],
            sort: SortOrder::MeasureDescending(1),
            top_n: None,
        },
    )?;

    Ok(Dashboard {
        total_rows: raw.len(),
        filtered_rows: filtered.len(),
        total_vendido: column_sum(&filtered, &columns.total),
        quantidade_vendida: column_sum(&filtered, &columns.quantidade),
        vendas_por_mes,
        vendas_por_marca,
        vendas_por_frete,
        vendas_por_catalogo,
        vendas_por_vendedor,
        top_produtos,
        columns,
    })
}
