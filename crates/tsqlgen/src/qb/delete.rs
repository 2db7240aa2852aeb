//! DELETE statement synthesis.

use std::sync::Arc;

use crate::error::{BuildError, BuildResult};
use crate::predicate::PredicateBuilder;
use crate::qb::where_clause;
use crate::table::{Record, TableDescriptor};

/// Build a delete statement; filters default to the key columns.
///
/// A delete always requires a filter — with no explicit filters and no key
/// columns there is nothing safe to emit.
pub fn delete<T: Record>(builder: &PredicateBuilder<T>) -> BuildResult<String> {
    let descriptor = builder.descriptor();

    let filter_columns = builder.filter_columns(true);
    if filter_columns.is_empty() {
        return Err(BuildError::invalid_operation(format!(
            "a delete from table '{}' requires a filter and the table has no key columns",
            descriptor.table_name()
        )));
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(table = descriptor.table_name(), "built delete statement");

    Ok(format!(
        "delete from {}\n{}",
        descriptor.table_ident(),
        where_clause(&filter_columns, false)
    ))
}

/// Build a delete filtered on exactly the key columns.
pub fn delete_by_key<T: Record>(descriptor: &Arc<TableDescriptor<T>>) -> BuildResult<String> {
    delete(&PredicateBuilder::for_descriptor(descriptor.clone()))
}
