//! SELECT statement synthesis.

use std::sync::Arc;

use crate::predicate::PredicateBuilder;
use crate::qb::where_clause;
use crate::table::{Record, TableDescriptor};

/// Build a select statement from the accumulated filters.
///
/// Select never defaults to the key columns: an empty builder selects every
/// row.
pub fn select<T: Record>(builder: &PredicateBuilder<T>) -> String {
    let descriptor = builder.descriptor();

    let select_list: Vec<_> = descriptor
        .select_columns()
        .iter()
        .map(|column| column.ident().to_string())
        .collect();
    let mut lines = vec![
        format!("select {}", select_list.join(", ")),
        format!("from {}", descriptor.table_ident()),
    ];

    let filter_columns = builder.filter_columns(false);
    if !filter_columns.is_empty() {
        lines.push(where_clause(&filter_columns, false));
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(table = descriptor.table_name(), "built select statement");

    lines.join("\n")
}

/// Build an unfiltered select over every row.
pub fn select_all<T: Record>(descriptor: &Arc<TableDescriptor<T>>) -> String {
    select(&PredicateBuilder::for_descriptor(descriptor.clone()))
}

/// Build a select filtered on exactly the key columns.
pub fn select_by_key<T: Record>(descriptor: &Arc<TableDescriptor<T>>) -> String {
    select(&PredicateBuilder::for_descriptor(descriptor.clone()).key())
}
