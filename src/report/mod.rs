// src/report/mod.rs
pub mod chart;

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

use crate::error::Result;
use crate::table::{entries, measure_values, ColumnSet, Entry, Table};

/// Which categories take part in an aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    /// No category restriction.
    All,
    /// Only these categories. An empty set selects nothing.
    Only(BTreeSet<String>),
}

/// A chosen period plus the category filter applied within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub period: String,
    pub categories: CategoryFilter,
}

/// Summed measure per group, iterated in sorted group order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Aggregate {
    groups: BTreeMap<String, f64>,
}

impl Aggregate {
    pub fn add(&mut self, group: &str, value: f64) {
        *self.groups.entry(group.to_string()).or_insert(0.0) += value;
    }

    pub fn from_entries(entries: &[Entry<'_>]) -> Self {
        let mut agg = Aggregate::default();
        for e in entries {
            agg.add(e.category, e.measure);
        }
        agg
    }

    pub fn get(&self, group: &str) -> Option<f64> {
        self.groups.get(group).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.groups.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.groups.values().sum()
    }
}

/// Result of the full period → categories → sum pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub period: String,
    /// Rows that survived both filters.
    pub rows: usize,
    pub groups: Aggregate,
    pub total: f64,
}

/// Rows whose period cell equals `period` exactly.
pub fn filter_by_period(table: &Table, columns: &ColumnSet, period: &str) -> Result<Table> {
    let idx = table.column_index(&columns.period)?;
    let out = table.filter_rows(|row| row[idx] == period);
    debug!(period, kept = out.len(), of = table.len(), "filtered by period");
    Ok(out)
}

/// Rows whose category cell is one of `categories`.
pub fn filter_by_categories(
    table: &Table,
    columns: &ColumnSet,
    categories: &BTreeSet<String>,
) -> Result<Table> {
    let idx = table.column_index(&columns.category)?;
    let out = table.filter_rows(|row| categories.contains(&row[idx]));
    debug!(
        categories = categories.len(),
        kept = out.len(),
        of = table.len(),
        "filtered by categories"
    );
    Ok(out)
}

/// Sum `measure_key` per distinct `group_key`. Blank measures count as 0;
/// any other non-numeric cell fails the whole aggregate.
pub fn aggregate_sum(table: &Table, group_key: &str, measure_key: &str) -> Result<Aggregate> {
    let groups = table.column(group_key)?;
    let values = measure_values(table, measure_key)?;

    let mut agg = Aggregate::default();
    for (group, value) in groups.zip(values) {
        agg.add(group, value);
    }
    Ok(agg)
}

/// Distinct tuples of `columns`, in order of first occurrence.
pub fn distinct_projection(table: &Table, columns: &[String]) -> Result<Vec<Vec<String>>> {
    let idxs = columns
        .iter()
        .map(|c| table.column_index(c))
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for row in table.rows() {
        let tuple: Vec<String> = idxs.iter().map(|&i| row[i].clone()).collect();
        if seen.insert(tuple.clone()) {
            out.push(tuple);
        }
    }
    Ok(out)
}

/// Sorted distinct values of one column.
pub fn distinct_values(table: &Table, column: &str) -> Result<Vec<String>> {
    let set: BTreeSet<&str> = table.column(column)?.collect();
    Ok(set.into_iter().map(str::to_string).collect())
}

/// Run the report pipeline for one selection.
///
/// Required columns are checked before any filtering, so a malformed table
/// fails even when the selection would match no rows. Measures are parsed
/// only for rows that reach the aggregate.
pub fn build_report(table: &Table, columns: &ColumnSet, selection: &Selection) -> Result<Report> {
    for name in [&columns.period, &columns.category, &columns.measure] {
        table.column_index(name)?;
    }

    let mut filtered = filter_by_period(table, columns, &selection.period)?;
    if let CategoryFilter::Only(categories) = &selection.categories {
        filtered = filter_by_categories(&filtered, columns, categories)?;
    }

    let typed = entries(&filtered, columns)?;
    let groups = Aggregate::from_entries(&typed);
    let total = groups.total();
    Ok(Report {
        period: selection.period.clone(),
        rows: filtered.len(),
        groups,
        total,
    })
}

/// Distinct detail tuples for one category within one period.
pub fn detail_for(
    table: &Table,
    columns: &ColumnSet,
    period: &str,
    category: &str,
) -> Result<Vec<Vec<String>>> {
    let in_period = filter_by_period(table, columns, period)?;
    let only = BTreeSet::from([category.to_string()]);
    let in_category = filter_by_categories(&in_period, columns, &only)?;
    distinct_projection(&in_category, &columns.detail)
}
