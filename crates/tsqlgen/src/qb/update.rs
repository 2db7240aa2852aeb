//! UPDATE statement synthesis.

use std::collections::HashSet;
use std::sync::Arc;

use crate::column::MemberId;
use crate::error::{BuildError, BuildResult};
use crate::predicate::UpdateBuilder;
use crate::qb::{column_equals, where_clause};
use crate::table::{Record, TableDescriptor};

/// Build an update statement.
///
/// Assignments default to every updatable column, filters to the key
/// columns. When a filter column name collides with a set column name, the
/// filter-side parameters take an underscore prefix (`@_Col`) so "filter on
/// the old value, set the new value" cannot alias one parameter.
pub fn update<T: Record>(builder: &UpdateBuilder<T>) -> BuildResult<String> {
    let descriptor = builder.descriptor();

    let set_columns = builder.set_columns();
    if set_columns.is_empty() {
        return Err(BuildError::invalid_operation(format!(
            "table '{}' has no updatable columns",
            descriptor.table_name()
        )));
    }

    let filter_columns = builder.filter_columns(true);
    if filter_columns.is_empty() {
        return Err(BuildError::invalid_operation(format!(
            "an update of table '{}' requires a filter and the table has no key columns",
            descriptor.table_name()
        )));
    }

    let set_names: HashSet<_> = set_columns
        .iter()
        .map(|column| column.column_name())
        .collect();
    let collision = filter_columns
        .iter()
        .any(|column| set_names.contains(column.column_name()));

    let assignments: Vec<_> = set_columns
        .iter()
        .map(|column| column_equals(column, false))
        .collect();

    #[cfg(feature = "tracing")]
    tracing::debug!(table = descriptor.table_name(), "built update statement");

    Ok([
        format!("update {}", descriptor.table_ident()),
        format!("set {}", assignments.join(", ")),
        where_clause(&filter_columns, collision),
    ]
    .join("\n"))
}

/// Build an update assigning exactly the given members, filtered on the key
/// columns.
pub fn update_columns<T: Record>(
    descriptor: &Arc<TableDescriptor<T>>,
    members: &[MemberId],
) -> BuildResult<String> {
    let mut builder = UpdateBuilder::for_descriptor(descriptor.clone());
    for member in members {
        builder = builder.set(*member)?;
    }
    update(&builder)
}
