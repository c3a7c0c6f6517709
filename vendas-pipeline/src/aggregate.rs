//! Group-by aggregation.
//!
//! Rows are grouped by the exact string form of one or two dimension
//! columns; a blank value is a perfectly valid key. Groups accumulate in
//! first-seen order, which is also the tie-break order when sorting.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};
use crate::table::{Cell, Table};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Reducer {
    Sum,
    Mean,
}

/// One aggregated measure: a source column and how to reduce it.
#[derive(Clone, Debug, Serialize)]
pub struct Measure {
    pub column: String,
    pub reducer: Reducer,
}

impl Measure {
    pub fn sum(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            reducer: Reducer::Sum,
        }
    }

    pub fn mean(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            reducer: Reducer::Mean,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    /// Descending by the measure at this index. The sort is stable, so tied
    /// groups keep their first-seen order; NaN sinks to the end.
    MeasureDescending(usize),
    /// Ascending by group key. Used by the monthly series, which reads as a
    /// timeline rather than a ranking.
    KeyAscending,
}

/// What to group by, what to measure, and how to order the result.
#[derive(Clone, Debug)]
pub struct AggregateSpec {
    /// One or two grouping columns.
    pub group_by: Vec<String>,
    pub measures: Vec<Measure>,
    pub sort: SortOrder,
    /// Keep only the first N groups after sorting.
    pub top_n: Option<usize>,
}

/// A set of rows sharing the same dimension value(s), reduced to one value
/// per measure.
#[derive(Clone, Debug, Serialize)]
pub struct Group {
    pub key: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AggregateResult {
    pub group_by: Vec<String>,
    pub measures: Vec<Measure>,
    pub groups: Vec<Group>,
}

struct Accumulator {
    key: Vec<String>,
    sums: Vec<f64>,
    count: usize,
}

/// Key components that both read as numbers compare numerically, so a
/// numeric month column orders 1, 2, ..., 10 rather than lexically.
fn compare_keys(a: &[String], b: &[String]) -> Ordering {
    for (left, right) in a.iter().zip(b.iter()) {
        let ordering = match (left.parse::<f64>(), right.parse::<f64>()) {
            (Ok(left), Ok(right)) => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
            _ => left.cmp(right),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.len().cmp(&b.len())
}

/// Group, reduce, sort and truncate in one pass over the table.
///
/// Groups partition the input exactly: every row lands in exactly one group
/// and no group is created for a key with no rows. Mean never divides by
/// zero because groups are non-empty by construction.
pub fn aggregate(table: &Table, spec: &AggregateSpec) -> PipelineResult<AggregateResult> {
    let key_indices: Vec<usize> = spec
        .group_by
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .ok_or_else(|| PipelineError::UnknownColumn(name.clone()))
        })
        .collect::<Result<_, _>>()?;
    let measure_indices: Vec<usize> = spec
        .measures
        .iter()
        .map(|measure| {
            table
                .column_index(&measure.column)
                .ok_or_else(|| PipelineError::UnknownColumn(measure.column.clone()))
        })
        .collect::<Result<_, _>>()?;

    let mut accumulators: Vec<Accumulator> = Vec::new();
    let mut slots: HashMap<Vec<String>, usize> = HashMap::new();

    for row in table.rows() {
        let key: Vec<String> = key_indices
            .iter()
            .map(|&index| row.get(index).map_or(String::new(), Cell::group_key))
            .collect();

        let slot = match slots.get(&key) {
            Some(&slot) => slot,
            None => {
                accumulators.push(Accumulator {
                    key: key.clone(),
                    sums: vec![0.0; measure_indices.len()],
                    count: 0,
                });
                let slot = accumulators.len() - 1;
                slots.insert(key, slot);
                slot
            }
        };

        let accumulator = &mut accumulators[slot];
        accumulator.count += 1;
        for (position, &index) in measure_indices.iter().enumerate() {
            accumulator.sums[position] += row.get(index).map_or(0.0, Cell::coerce_number);
        }
    }

    let mut groups: Vec<Group> = accumulators
        .into_iter()
        .map(|accumulator| {
            let values = spec
                .measures
                .iter()
                .enumerate()
                .map(|(position, measure)| match measure.reducer {
                    Reducer::Sum => accumulator.sums[position],
                    Reducer::Mean => accumulator.sums[position] / accumulator.count as f64,
                })
                .collect();
            Group {
                key: accumulator.key,
                values,
            }
        })
        .collect();

    match spec.sort {
        SortOrder::MeasureDescending(position) => {
            groups.sort_by(|a, b| {
                let a_value = a.values.get(position).copied().unwrap_or(f64::NEG_INFINITY);
                let b_value = b.values.get(position).copied().unwrap_or(f64::NEG_INFINITY);
                // Explicit total ordering: NaN goes to the end.
                match (a_value.is_nan(), b_value.is_nan()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) => b_value.partial_cmp(&a_value).unwrap_or(Ordering::Equal),
                }
            });
        }
        SortOrder::KeyAscending => groups.sort_by(|a, b| compare_keys(&a.key, &b.key)),
    }

    if let Some(top_n) = spec.top_n {
        groups.truncate(top_n);
    }

    Ok(AggregateResult {
        group_by: spec.group_by.clone(),
        measures: spec.measures.clone(),
        groups,
    })
}
